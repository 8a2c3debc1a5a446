//! OpenSSH certificates and the signing pipeline.
//!
//! A [`Certificate`] is one of four variants chosen from the subject key's
//! algorithm. Each variant is a [`TypedCertificate`] over the matching
//! public key codec, so the sub-layout of the subject key is fixed at
//! compile time while the rest of the wire layout is shared:
//!
//! ```text
//! type-tag nonce subject-key serial cert-type key-id principals
//! valid-after valid-before critical-options extensions reserved
//! ca-key signature
//! ```
//!
//! Everything up to and including the CA key is the *signable* buffer.

pub mod extensions;
pub mod params;

use std::fmt;
use std::path::Path;

use rand_core::{CryptoRngCore, OsRng};
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::{debug, warn};

use crate::encoding::Reader;
use crate::error::{Result, SshCertError};
use crate::fields::{
    CaPublicKeyField, CertAlgorithm, DEFAULT_NONCE_LEN, DsaPubkeyField, EcdsaPubkeyField,
    Ed25519PubkeyField, Field, FieldCodec, NonceField, PubkeyField, PubkeyTypeField,
    ReservedField, RsaPubkeyField, SignatureField,
};
use crate::key::{KeyKind, KeyPair, PublicKey, SignatureAlgorithm, SshSignature};
use crate::ssh_line;
use params::CertificateFields;

/// A certificate whose subject key is handled by the codec `K`.
///
/// The CA private key is borrowed for `'ca`; decoded certificates carry
/// only the CA public key and have no CA private key attached.
#[derive(Clone, Debug)]
pub struct TypedCertificate<'ca, K: PubkeyField> {
    pubkey_type: CertAlgorithm,
    nonce: Vec<u8>,
    subject: K::Value,
    fields: Option<CertificateFields>,
    ca_key: Option<&'ca KeyPair>,
    ca_pubkey: Option<PublicKey>,
    signature_algorithm: Option<SignatureAlgorithm>,
    signature: Option<SshSignature>,
}

pub type RsaCertificate<'ca> = TypedCertificate<'ca, RsaPubkeyField>;
pub type DsaCertificate<'ca> = TypedCertificate<'ca, DsaPubkeyField>;
pub type EcdsaCertificate<'ca> = TypedCertificate<'ca, EcdsaPubkeyField>;
pub type Ed25519Certificate<'ca> = TypedCertificate<'ca, Ed25519PubkeyField>;

impl<'ca, K: PubkeyField> TypedCertificate<'ca, K> {
    fn new(
        pubkey_type: CertAlgorithm,
        nonce: Vec<u8>,
        subject: K::Value,
        ca_key: Option<&'ca KeyPair>,
        fields: Option<CertificateFields>,
    ) -> Self {
        Self {
            pubkey_type,
            nonce,
            subject,
            fields,
            ca_key,
            ca_pubkey: None,
            signature_algorithm: None,
            signature: None,
        }
    }

    pub fn pubkey_type(&self) -> CertAlgorithm {
        self.pubkey_type
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn subject(&self) -> &K::Value {
        &self.subject
    }

    pub fn subject_public_key(&self) -> PublicKey {
        K::to_public_key(&self.subject)
    }

    pub fn fields(&self) -> Option<&CertificateFields> {
        self.fields.as_ref()
    }

    pub fn ca_key(&self) -> Option<&'ca KeyPair> {
        self.ca_key
    }

    /// The CA public key: derived from the attached CA key, or the one
    /// read from an encoded certificate.
    pub fn ca_public_key(&self) -> Option<PublicKey> {
        match self.ca_key {
            Some(ca) => Some(ca.public_key()),
            None => self.ca_pubkey.clone(),
        }
    }

    pub fn signature(&self) -> Option<&SshSignature> {
        self.signature.as_ref()
    }

    /// The algorithm the CA signs (or signed) with.
    pub fn signature_algorithm(&self) -> Option<SignatureAlgorithm> {
        self.signature_algorithm
            .or_else(|| self.ca_key.map(KeyPair::default_signature_algorithm))
    }

    /// Changes the type tag among those compatible with the subject key.
    pub fn set_pubkey_type(&mut self, tag: CertAlgorithm) -> Result<()> {
        if !K::accepts(tag, &self.subject) {
            return Err(SshCertError::InvalidData(format!(
                "{tag} cannot carry a {} subject key",
                K::KIND
            )));
        }
        self.pubkey_type = tag;
        Ok(())
    }

    pub fn set_nonce(&mut self, nonce: Vec<u8>) {
        self.nonce = nonce;
    }

    pub fn set_fields(&mut self, fields: CertificateFields) {
        self.fields = Some(fields);
    }

    /// Selects the CA signature algorithm, e.g. `ssh-rsa` instead of
    /// `rsa-sha2-512` for an RSA CA.
    pub fn set_signature_algorithm(&mut self, algorithm: SignatureAlgorithm) -> Result<()> {
        if let Some(ca) = self.ca_key
            && algorithm.key_kind() != ca.kind()
        {
            return Err(SshCertError::InvalidData(format!(
                "{algorithm} cannot be used with a {} CA key",
                ca.kind()
            )));
        }
        self.signature_algorithm = Some(algorithm);
        Ok(())
    }

    /// Attaches a (different) CA private key, dropping any signature.
    pub fn with_ca<'b>(self, ca_key: &'b KeyPair) -> TypedCertificate<'b, K> {
        let signature_algorithm = self
            .signature_algorithm
            .filter(|alg| alg.key_kind() == ca_key.kind());
        TypedCertificate {
            pubkey_type: self.pubkey_type,
            nonce: self.nonce,
            subject: self.subject,
            fields: self.fields,
            ca_key: Some(ca_key),
            ca_pubkey: None,
            signature_algorithm,
            signature: None,
        }
    }

    /// Collects every defect that would stop the signable buffer from
    /// being produced.
    pub fn validate(&self) -> std::result::Result<(), Vec<SshCertError>> {
        let mut defects = Vec::new();
        if !K::accepts(self.pubkey_type, &self.subject) {
            defects.push(SshCertError::InvalidData(format!(
                "{} cannot carry a {} subject key",
                self.pubkey_type,
                K::KIND
            )));
        }
        defects.extend(NonceField::check(&self.nonce));
        defects.extend(K::check(&self.subject));
        match &self.fields {
            Some(fields) => defects.extend(fields.validate().err().unwrap_or_default()),
            None => defects.push(SshCertError::InvalidData(
                "certificate fields are missing".to_string(),
            )),
        }
        match self.ca_public_key() {
            Some(ca) => defects.extend(CaPublicKeyField::check(&ca)),
            None => defects.push(SshCertError::InvalidData(
                "CA public key is missing".to_string(),
            )),
        }
        if defects.is_empty() {
            Ok(())
        } else {
            Err(defects)
        }
    }

    /// True if a CA key is attached and every field is present and valid.
    pub fn can_sign(&self) -> bool {
        self.ca_key.is_some() && self.validate().is_ok()
    }

    /// The bytes the CA signature covers: every field but the signature.
    pub fn get_signable(&self) -> Result<Vec<u8>> {
        if !K::accepts(self.pubkey_type, &self.subject) {
            return Err(SshCertError::InvalidData(format!(
                "{} cannot carry a {} subject key",
                self.pubkey_type,
                K::KIND
            )));
        }
        let fields = self.fields.as_ref().ok_or_else(|| {
            SshCertError::InvalidData("certificate fields are missing".to_string())
        })?;
        let ca = self
            .ca_public_key()
            .ok_or_else(|| SshCertError::InvalidData("CA public key is missing".to_string()))?;

        let mut out = Vec::new();
        PubkeyTypeField::encode_into(&self.pubkey_type, &mut out)?;
        NonceField::encode_into(&self.nonce, &mut out)?;
        K::encode_into(&self.subject, &mut out)?;
        fields.encode_into(&mut out)?;
        ReservedField::encode_into(&Vec::new(), &mut out)?;
        CaPublicKeyField::encode_into(&ca, &mut out)?;
        Ok(out)
    }

    /// Signs the certificate with the attached CA key, replacing any
    /// previous signature.
    pub fn sign(&mut self) -> Result<()> {
        let ca = self.ca_key.ok_or_else(|| {
            SshCertError::CertificateError("no CA private key attached".to_string())
        })?;
        if let Err(defects) = self.validate() {
            warn!(
                pubkey_type = %self.pubkey_type,
                defects = defects.len(),
                "refusing to sign an invalid certificate"
            );
            return Err(defects.into_iter().next().unwrap_or_else(|| {
                SshCertError::CertificateError("certificate is not valid".to_string())
            }));
        }
        let signable = self.get_signable()?;
        let algorithm = self
            .signature_algorithm
            .unwrap_or_else(|| ca.default_signature_algorithm());
        let signature = ca.sign_with(&signable, algorithm)?;
        debug!(
            pubkey_type = %self.pubkey_type,
            algorithm = %algorithm,
            serial = self.fields.as_ref().map(CertificateFields::serial),
            key_id = self.fields.as_ref().map(CertificateFields::key_id),
            signable_len = signable.len(),
            "signed certificate"
        );
        self.signature_algorithm = Some(algorithm);
        self.signature = Some(signature);
        Ok(())
    }

    /// The complete certificate: signable buffer followed by the signature.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let signature = self.signature.as_ref().ok_or_else(|| {
            SshCertError::CertificateError("certificate is not signed".to_string())
        })?;
        let mut out = self.get_signable()?;
        SignatureField::encode_into(signature, &mut out)?;
        Ok(out)
    }

    /// Checks the signature against the CA public key.
    pub fn verify(&self) -> Result<()> {
        let signature = self.signature.as_ref().ok_or_else(|| {
            SshCertError::CertificateError("certificate is not signed".to_string())
        })?;
        let ca = self
            .ca_public_key()
            .ok_or_else(|| SshCertError::InvalidData("CA public key is missing".to_string()))?;
        ca.verify(&self.get_signable()?, signature)
    }

    /// Reads everything after the type tag.
    fn read(pubkey_type: CertAlgorithm, reader: &mut Reader<'_>) -> Result<Self> {
        let nonce = NonceField::decode(reader)?;
        let subject = K::decode(reader)?;
        if !K::accepts(pubkey_type, &subject) {
            return Err(SshCertError::InvalidData(format!(
                "{pubkey_type} cannot carry a {} subject key",
                K::KIND
            )));
        }
        let fields = CertificateFields::read(reader)?;
        ReservedField::decode(reader)?;
        let ca_pubkey = CaPublicKeyField::decode(reader)?;
        let signature = SignatureField::decode(reader)?;
        Ok(Self {
            pubkey_type,
            nonce,
            subject,
            fields: Some(fields),
            ca_key: None,
            ca_pubkey: Some(ca_pubkey),
            signature_algorithm: Some(signature.algorithm),
            signature: Some(signature),
        })
    }
}

/// An OpenSSH certificate of any supported subject key algorithm.
#[derive(Clone, Debug)]
pub enum Certificate<'ca> {
    Rsa(RsaCertificate<'ca>),
    Dsa(DsaCertificate<'ca>),
    Ecdsa(EcdsaCertificate<'ca>),
    Ed25519(Ed25519Certificate<'ca>),
}

macro_rules! dispatch {
    ($cert:expr, $c:ident => $body:expr) => {
        match $cert {
            Certificate::Rsa($c) => $body,
            Certificate::Dsa($c) => $body,
            Certificate::Ecdsa($c) => $body,
            Certificate::Ed25519($c) => $body,
        }
    };
}

impl<'ca> Certificate<'ca> {
    /// Creates a certificate for `subject` with a random nonce.
    ///
    /// Without a CA key and fields the certificate can only be inspected;
    /// [`Certificate::sign`] needs both.
    ///
    /// # Example
    /// ```
    /// use sshcertkit::cert::{Certificate, params::CertificateFields};
    /// use sshcertkit::key::KeyPair;
    ///
    /// let ca = KeyPair::generate_ed25519();
    /// let user = KeyPair::generate_ecdsa_p256();
    /// let fields = CertificateFields::builder()
    ///     .key_id("alice")
    ///     .principals(vec!["alice".to_string()])
    ///     .build();
    ///
    /// let mut cert = Certificate::create(&user.public_key(), Some(&ca), Some(fields));
    /// assert!(cert.can_sign());
    /// cert.sign().unwrap();
    /// assert!(cert.verify().is_ok());
    /// ```
    pub fn create(
        subject: &PublicKey,
        ca_key: Option<&'ca KeyPair>,
        fields: Option<CertificateFields>,
    ) -> Self {
        Self::create_with_rng(&mut OsRng, subject, ca_key, fields)
    }

    /// Like [`Certificate::create`], drawing the nonce from `rng`.
    pub fn create_with_rng(
        rng: &mut impl CryptoRngCore,
        subject: &PublicKey,
        ca_key: Option<&'ca KeyPair>,
        fields: Option<CertificateFields>,
    ) -> Self {
        let tag = CertAlgorithm::default_for(subject);
        let nonce = NonceField::random(rng, DEFAULT_NONCE_LEN);
        match subject {
            PublicKey::Rsa(key) => {
                Certificate::Rsa(TypedCertificate::new(tag, nonce, key.clone(), ca_key, fields))
            }
            PublicKey::Dsa(key) => {
                Certificate::Dsa(TypedCertificate::new(tag, nonce, key.clone(), ca_key, fields))
            }
            PublicKey::Ecdsa(key) => {
                Certificate::Ecdsa(TypedCertificate::new(tag, nonce, key.clone(), ca_key, fields))
            }
            PublicKey::Ed25519(key) => {
                Certificate::Ed25519(TypedCertificate::new(tag, nonce, *key, ca_key, fields))
            }
        }
    }

    /// Decodes a complete certificate, rejecting trailing bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Certificate<'static>> {
        let mut reader = Reader::new(bytes);
        let tag = PubkeyTypeField::decode(&mut reader)?;
        let cert = match tag.key_kind() {
            KeyKind::Rsa => Certificate::Rsa(TypedCertificate::read(tag, &mut reader)?),
            KeyKind::Dsa => Certificate::Dsa(TypedCertificate::read(tag, &mut reader)?),
            KeyKind::Ecdsa => Certificate::Ecdsa(TypedCertificate::read(tag, &mut reader)?),
            KeyKind::Ed25519 => Certificate::Ed25519(TypedCertificate::read(tag, &mut reader)?),
        };
        reader.finish()?;
        debug!(pubkey_type = %tag, len = bytes.len(), "decoded certificate");
        Ok(cert)
    }

    /// Parses the OpenSSH one-line form `<type-tag> <base64> [comment]`.
    pub fn from_string(line: &str) -> Result<Certificate<'static>> {
        let parsed = ssh_line::decode_line(line)?;
        let cert = Certificate::from_bytes(&parsed.data)?;
        if cert.pubkey_type().as_str() != parsed.type_tag {
            return Err(SshCertError::InvalidData(format!(
                "line is tagged {:?} but holds a {} certificate",
                parsed.type_tag,
                cert.pubkey_type()
            )));
        }
        Ok(cert)
    }

    /// Reads a `*-cert.pub` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Certificate<'static>> {
        let contents = std::fs::read_to_string(path)?;
        Certificate::from_string(&contents)
    }

    /// The OpenSSH one-line form of the signed certificate.
    pub fn to_string_with_comment(&self, comment: Option<&str>) -> Result<String> {
        Ok(ssh_line::encode_line(
            self.pubkey_type().as_str(),
            &self.to_bytes()?,
            comment,
        ))
    }

    /// Writes the one-line form, newline terminated, to `path`.
    pub fn to_file(&self, path: impl AsRef<Path>, comment: Option<&str>) -> Result<()> {
        let mut line = self.to_string_with_comment(comment)?;
        line.push('\n');
        std::fs::write(path, line)?;
        Ok(())
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            Certificate::Rsa(_) => KeyKind::Rsa,
            Certificate::Dsa(_) => KeyKind::Dsa,
            Certificate::Ecdsa(_) => KeyKind::Ecdsa,
            Certificate::Ed25519(_) => KeyKind::Ed25519,
        }
    }

    pub fn pubkey_type(&self) -> CertAlgorithm {
        dispatch!(self, c => c.pubkey_type())
    }

    pub fn nonce(&self) -> &[u8] {
        dispatch!(self, c => c.nonce())
    }

    pub fn subject_public_key(&self) -> PublicKey {
        dispatch!(self, c => c.subject_public_key())
    }

    pub fn fields(&self) -> Option<&CertificateFields> {
        dispatch!(self, c => c.fields())
    }

    pub fn ca_public_key(&self) -> Option<PublicKey> {
        dispatch!(self, c => c.ca_public_key())
    }

    pub fn signature(&self) -> Option<&SshSignature> {
        dispatch!(self, c => c.signature())
    }

    pub fn signature_algorithm(&self) -> Option<SignatureAlgorithm> {
        dispatch!(self, c => c.signature_algorithm())
    }

    pub fn set_pubkey_type(&mut self, tag: CertAlgorithm) -> Result<()> {
        dispatch!(self, c => c.set_pubkey_type(tag))
    }

    pub fn set_nonce(&mut self, nonce: Vec<u8>) {
        dispatch!(self, c => c.set_nonce(nonce))
    }

    pub fn set_fields(&mut self, fields: CertificateFields) {
        dispatch!(self, c => c.set_fields(fields))
    }

    pub fn set_signature_algorithm(&mut self, algorithm: SignatureAlgorithm) -> Result<()> {
        dispatch!(self, c => c.set_signature_algorithm(algorithm))
    }

    pub fn with_ca<'b>(self, ca_key: &'b KeyPair) -> Certificate<'b> {
        match self {
            Certificate::Rsa(c) => Certificate::Rsa(c.with_ca(ca_key)),
            Certificate::Dsa(c) => Certificate::Dsa(c.with_ca(ca_key)),
            Certificate::Ecdsa(c) => Certificate::Ecdsa(c.with_ca(ca_key)),
            Certificate::Ed25519(c) => Certificate::Ed25519(c.with_ca(ca_key)),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), Vec<SshCertError>> {
        dispatch!(self, c => c.validate())
    }

    pub fn can_sign(&self) -> bool {
        dispatch!(self, c => c.can_sign())
    }

    pub fn get_signable(&self) -> Result<Vec<u8>> {
        dispatch!(self, c => c.get_signable())
    }

    pub fn sign(&mut self) -> Result<()> {
        dispatch!(self, c => c.sign())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        dispatch!(self, c => c.to_bytes())
    }

    pub fn verify(&self) -> Result<()> {
        dispatch!(self, c => c.verify())
    }

    fn subject_field_display(&self) -> String {
        match self {
            Certificate::Rsa(c) => Field::<RsaPubkeyField>::new(c.subject.clone()).to_string(),
            Certificate::Dsa(c) => Field::<DsaPubkeyField>::new(c.subject.clone()).to_string(),
            Certificate::Ecdsa(c) => Field::<EcdsaPubkeyField>::new(c.subject.clone()).to_string(),
            Certificate::Ed25519(c) => Field::<Ed25519PubkeyField>::new(c.subject).to_string(),
        }
    }
}

fn format_timestamp(seconds: u64) -> String {
    i64::try_from(seconds)
        .ok()
        .and_then(|s| OffsetDateTime::from_unix_timestamp(s).ok())
        .and_then(|at| {
            at.format(format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"))
                .ok()
        })
        .unwrap_or_else(|| seconds.to_string())
}

fn format_validity(after: u64, before: u64) -> String {
    match (after, before) {
        (0, u64::MAX) => "forever".to_string(),
        (after, u64::MAX) => format!("from {} to forever", format_timestamp(after)),
        (after, before) => format!(
            "from {} to {}",
            format_timestamp(after),
            format_timestamp(before)
        ),
    }
}

impl fmt::Display for Certificate<'_> {
    /// Summary in the layout of `ssh-keygen -L`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind().to_string().to_uppercase();
        let subject = self.subject_field_display();
        let fingerprint = subject.split_once(' ').map(|(_, fp)| fp).unwrap_or("");
        let Some(fields) = self.fields() else {
            return write!(f, "Type: {} (no fields)", self.pubkey_type());
        };

        writeln!(f, "Type: {} {} certificate", self.pubkey_type(), fields.cert_type())?;
        writeln!(f, "Public key: {kind}-CERT {fingerprint}")?;
        if let Some(ca) = self.ca_public_key() {
            let ca_fingerprint = ca.fingerprint().map_err(|_| fmt::Error)?;
            write!(
                f,
                "Signing CA: {} {ca_fingerprint}",
                ca.kind().to_string().to_uppercase()
            )?;
            match self.signature_algorithm() {
                Some(alg) => writeln!(f, " (using {alg})")?,
                None => writeln!(f)?,
            }
        }
        writeln!(f, "Key ID: {:?}", fields.key_id())?;
        writeln!(f, "Serial: {}", fields.serial())?;
        writeln!(
            f,
            "Valid: {}",
            format_validity(fields.valid_after(), fields.valid_before())
        )?;

        if fields.principals().is_empty() {
            writeln!(f, "Principals: (none)")?;
        } else {
            writeln!(f, "Principals:")?;
            for principal in fields.principals() {
                writeln!(f, "        {principal}")?;
            }
        }

        if fields.critical_options().is_empty() {
            writeln!(f, "Critical Options: (none)")?;
        } else {
            writeln!(f, "Critical Options:")?;
            for (name, value) in fields.critical_options() {
                if value.is_empty() {
                    writeln!(f, "        {name}")?;
                } else {
                    writeln!(f, "        {name} {value}")?;
                }
            }
        }

        if fields.extensions().is_empty() {
            write!(f, "Extensions: (none)")
        } else {
            write!(f, "Extensions:")?;
            for name in fields.extensions() {
                write!(f, "\n        {name}")?;
            }
            Ok(())
        }
    }
}
