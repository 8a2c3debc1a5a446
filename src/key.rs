//! Key generation, public key encoding, signing and verification.
//!
//! The RustCrypto implementations do the math; this module only maps each
//! algorithm onto the hash and signature layout OpenSSH expects.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use dsa::{Components, KeySize, SigningKey as DsaSigningKey, VerifyingKey as DsaVerifyingKey};
use ed25519_dalek::{
    Signature as Ed25519Signature, SigningKey as Ed25519SigningKey,
    VerifyingKey as Ed25519VerifyingKey,
};
use p256::ecdsa::{
    Signature as P256Signature, SigningKey as P256SigningKey, VerifyingKey as P256VerifyingKey,
};
use p384::ecdsa::{
    Signature as P384Signature, SigningKey as P384SigningKey, VerifyingKey as P384VerifyingKey,
};
use p521::ecdsa::{
    Signature as P521Signature, SigningKey as P521SigningKey, VerifyingKey as P521VerifyingKey,
};
use rand_core::OsRng;
use rsa::pkcs1v15::{
    Signature as RsaSignature, SigningKey as RsaSigningKey, VerifyingKey as RsaVerifyingKey,
};
use rsa::signature::{DigestSigner, DigestVerifier, SignatureEncoding, Signer, Verifier};
use rsa::traits::PrivateKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use zeroize::Zeroizing;

use crate::encoding::Reader;
use crate::error::{Result, SshCertError};
use crate::fields::PublicKeyField;
use crate::fields::primitives::{read_mpint, write_mpint};

/// The four key families a certificate can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Rsa,
    Dsa,
    Ecdsa,
    Ed25519,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyKind::Rsa => "Rsa",
            KeyKind::Dsa => "Dsa",
            KeyKind::Ecdsa => "Ecdsa",
            KeyKind::Ed25519 => "Ed25519",
        })
    }
}

/// NIST curves supported for ECDSA keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EcdsaCurve {
    NistP256,
    NistP384,
    NistP521,
}

impl EcdsaCurve {
    /// The curve identifier carried inside ECDSA public key blobs.
    pub fn identifier(&self) -> &'static str {
        match self {
            EcdsaCurve::NistP256 => "nistp256",
            EcdsaCurve::NistP384 => "nistp384",
            EcdsaCurve::NistP521 => "nistp521",
        }
    }

    pub fn from_identifier(identifier: &str) -> Result<Self> {
        match identifier {
            "nistp256" => Ok(EcdsaCurve::NistP256),
            "nistp384" => Ok(EcdsaCurve::NistP384),
            "nistp521" => Ok(EcdsaCurve::NistP521),
            other => Err(SshCertError::InvalidData(format!(
                "unsupported ECDSA curve {other:?}"
            ))),
        }
    }

    /// The SSH key type name, e.g. `ecdsa-sha2-nistp256`.
    pub fn key_type(&self) -> &'static str {
        self.signature_algorithm().as_str()
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            EcdsaCurve::NistP256 => SignatureAlgorithm::EcdsaSha2Nistp256,
            EcdsaCurve::NistP384 => SignatureAlgorithm::EcdsaSha2Nistp384,
            EcdsaCurve::NistP521 => SignatureAlgorithm::EcdsaSha2Nistp521,
        }
    }
}

/// Signature algorithms as named on the SSH wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// RSA PKCS#1 v1.5 with SHA-1.
    SshRsa,
    /// RSA PKCS#1 v1.5 with SHA-256.
    RsaSha2_256,
    /// RSA PKCS#1 v1.5 with SHA-512.
    RsaSha2_512,
    /// DSA with SHA-1.
    SshDss,
    EcdsaSha2Nistp256,
    EcdsaSha2Nistp384,
    EcdsaSha2Nistp521,
    SshEd25519,
}

impl SignatureAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureAlgorithm::SshRsa => "ssh-rsa",
            SignatureAlgorithm::RsaSha2_256 => "rsa-sha2-256",
            SignatureAlgorithm::RsaSha2_512 => "rsa-sha2-512",
            SignatureAlgorithm::SshDss => "ssh-dss",
            SignatureAlgorithm::EcdsaSha2Nistp256 => "ecdsa-sha2-nistp256",
            SignatureAlgorithm::EcdsaSha2Nistp384 => "ecdsa-sha2-nistp384",
            SignatureAlgorithm::EcdsaSha2Nistp521 => "ecdsa-sha2-nistp521",
            SignatureAlgorithm::SshEd25519 => "ssh-ed25519",
        }
    }

    pub fn key_kind(&self) -> KeyKind {
        match self {
            SignatureAlgorithm::SshRsa
            | SignatureAlgorithm::RsaSha2_256
            | SignatureAlgorithm::RsaSha2_512 => KeyKind::Rsa,
            SignatureAlgorithm::SshDss => KeyKind::Dsa,
            SignatureAlgorithm::EcdsaSha2Nistp256
            | SignatureAlgorithm::EcdsaSha2Nistp384
            | SignatureAlgorithm::EcdsaSha2Nistp521 => KeyKind::Ecdsa,
            SignatureAlgorithm::SshEd25519 => KeyKind::Ed25519,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = SshCertError;

    fn from_str(s: &str) -> Result<Self> {
        [
            SignatureAlgorithm::SshRsa,
            SignatureAlgorithm::RsaSha2_256,
            SignatureAlgorithm::RsaSha2_512,
            SignatureAlgorithm::SshDss,
            SignatureAlgorithm::EcdsaSha2Nistp256,
            SignatureAlgorithm::EcdsaSha2Nistp384,
            SignatureAlgorithm::EcdsaSha2Nistp521,
            SignatureAlgorithm::SshEd25519,
        ]
        .into_iter()
        .find(|alg| alg.as_str() == s)
        .ok_or_else(|| SshCertError::InvalidData(format!("unknown signature algorithm {s:?}")))
    }
}

/// A signature as carried in the certificate's signature field.
///
/// `blob` holds the algorithm-specific bytes: the PKCS#1 signature for RSA,
/// 20-byte `r` and `s` for DSA, two mpints for ECDSA, 64 bytes for Ed25519.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshSignature {
    pub algorithm: SignatureAlgorithm,
    pub blob: Vec<u8>,
}

/// ECDSA public key on one of the supported curves.
#[derive(Clone)]
pub enum EcdsaPublicKey {
    NistP256(P256VerifyingKey),
    NistP384(P384VerifyingKey),
    NistP521(P521VerifyingKey),
}

impl fmt::Debug for EcdsaPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaPublicKey")
            .field("curve", &self.curve())
            .finish_non_exhaustive()
    }
}

impl EcdsaPublicKey {
    pub fn curve(&self) -> EcdsaCurve {
        match self {
            EcdsaPublicKey::NistP256(_) => EcdsaCurve::NistP256,
            EcdsaPublicKey::NistP384(_) => EcdsaCurve::NistP384,
            EcdsaPublicKey::NistP521(_) => EcdsaCurve::NistP521,
        }
    }

    /// Uncompressed SEC1 encoding of the public point.
    pub fn to_sec1_bytes(&self) -> Vec<u8> {
        match self {
            EcdsaPublicKey::NistP256(key) => key.to_encoded_point(false).as_bytes().to_vec(),
            EcdsaPublicKey::NistP384(key) => key.to_encoded_point(false).as_bytes().to_vec(),
            EcdsaPublicKey::NistP521(key) => key.to_encoded_point(false).as_bytes().to_vec(),
        }
    }

    pub fn from_sec1_bytes(curve: EcdsaCurve, bytes: &[u8]) -> Result<Self> {
        let invalid = |e: ecdsa::Error| {
            SshCertError::InvalidData(format!("invalid {} point: {e}", curve.identifier()))
        };
        Ok(match curve {
            EcdsaCurve::NistP256 => {
                EcdsaPublicKey::NistP256(P256VerifyingKey::from_sec1_bytes(bytes).map_err(invalid)?)
            }
            EcdsaCurve::NistP384 => {
                EcdsaPublicKey::NistP384(P384VerifyingKey::from_sec1_bytes(bytes).map_err(invalid)?)
            }
            EcdsaCurve::NistP521 => {
                EcdsaPublicKey::NistP521(P521VerifyingKey::from_sec1_bytes(bytes).map_err(invalid)?)
            }
        })
    }
}

/// A public key of any supported algorithm.
#[derive(Debug, Clone)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    Dsa(DsaVerifyingKey),
    Ecdsa(EcdsaPublicKey),
    Ed25519(Ed25519VerifyingKey),
}

impl PublicKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            PublicKey::Rsa(_) => KeyKind::Rsa,
            PublicKey::Dsa(_) => KeyKind::Dsa,
            PublicKey::Ecdsa(_) => KeyKind::Ecdsa,
            PublicKey::Ed25519(_) => KeyKind::Ed25519,
        }
    }

    /// The SSH key type name that starts the public key blob.
    pub fn key_type(&self) -> &'static str {
        match self {
            PublicKey::Rsa(_) => SignatureAlgorithm::SshRsa.as_str(),
            PublicKey::Dsa(_) => SignatureAlgorithm::SshDss.as_str(),
            PublicKey::Ecdsa(key) => key.curve().key_type(),
            PublicKey::Ed25519(_) => SignatureAlgorithm::SshEd25519.as_str(),
        }
    }

    /// The SSH public key blob: key type name followed by the key's fields.
    pub fn to_blob(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        PublicKeyField::write_blob(self, &mut out)?;
        Ok(out)
    }

    /// Parses an SSH public key blob, rejecting trailing bytes.
    pub fn from_blob(blob: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(blob);
        let key = PublicKeyField::read_blob(&mut reader)?;
        reader.finish()?;
        Ok(key)
    }

    /// Raw bytes of the key, identical to [`PublicKey::to_blob`].
    pub fn raw_bytes(&self) -> Result<Vec<u8>> {
        self.to_blob()
    }

    /// `SHA256:` fingerprint as printed by `ssh-keygen -l`.
    pub fn fingerprint(&self) -> Result<String> {
        let digest = Sha256::digest(self.to_blob()?);
        Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(digest)))
    }

    /// Formats the key as an `authorized_keys` style line.
    pub fn to_openssh(&self, comment: Option<&str>) -> Result<String> {
        Ok(crate::ssh_line::encode_line(
            self.key_type(),
            &self.to_blob()?,
            comment,
        ))
    }

    /// Parses an `authorized_keys` style line.
    pub fn from_openssh(line: &str) -> Result<Self> {
        let parsed = crate::ssh_line::decode_line(line)?;
        let key = Self::from_blob(&parsed.data)?;
        if key.key_type() != parsed.type_tag {
            return Err(SshCertError::InvalidData(format!(
                "line is tagged {:?} but holds a {} key",
                parsed.type_tag,
                key.key_type()
            )));
        }
        Ok(key)
    }

    /// Checks `signature` over `data`.
    pub fn verify(&self, data: &[u8], signature: &SshSignature) -> Result<()> {
        let blob = signature.blob.as_slice();
        let result = match (self, signature.algorithm) {
            (PublicKey::Rsa(public), SignatureAlgorithm::SshRsa) => {
                RsaVerifyingKey::<Sha1>::new(public.clone()).verify(data, &rsa_signature(blob)?)
            }
            (PublicKey::Rsa(public), SignatureAlgorithm::RsaSha2_256) => {
                RsaVerifyingKey::<Sha256>::new(public.clone()).verify(data, &rsa_signature(blob)?)
            }
            (PublicKey::Rsa(public), SignatureAlgorithm::RsaSha2_512) => {
                RsaVerifyingKey::<Sha512>::new(public.clone()).verify(data, &rsa_signature(blob)?)
            }
            (PublicKey::Dsa(key), SignatureAlgorithm::SshDss) => {
                let signature = dsa_signature(blob)?;
                key.verify_digest(Sha1::new_with_prefix(data), &signature)
            }
            (PublicKey::Ecdsa(EcdsaPublicKey::NistP256(key)), SignatureAlgorithm::EcdsaSha2Nistp256) => {
                let rs = ecdsa_components(blob, 32)?;
                key.verify(data, &ecdsa_signature(P256Signature::from_slice(&rs))?)
            }
            (PublicKey::Ecdsa(EcdsaPublicKey::NistP384(key)), SignatureAlgorithm::EcdsaSha2Nistp384) => {
                let rs = ecdsa_components(blob, 48)?;
                key.verify(data, &ecdsa_signature(P384Signature::from_slice(&rs))?)
            }
            (PublicKey::Ecdsa(EcdsaPublicKey::NistP521(key)), SignatureAlgorithm::EcdsaSha2Nistp521) => {
                let rs = ecdsa_components(blob, 66)?;
                key.verify(data, &ecdsa_signature(P521Signature::from_slice(&rs))?)
            }
            (PublicKey::Ed25519(key), SignatureAlgorithm::SshEd25519) => {
                let signature = Ed25519Signature::from_slice(blob).map_err(|e| {
                    SshCertError::InvalidData(format!("malformed ed25519 signature: {e}"))
                })?;
                key.verify(data, &signature)
            }
            (key, algorithm) => {
                return Err(SshCertError::VerificationError(format!(
                    "{algorithm} signature cannot be checked with a {} key",
                    key.key_type()
                )));
            }
        };
        result.map_err(|e| SshCertError::VerificationError(e.to_string()))
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_blob(), other.to_blob()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Private keys: own generation and signing.
pub enum KeyPair {
    Rsa {
        private: Box<RsaPrivateKey>,
        public: RsaPublicKey,
    },
    Dsa {
        signing_key: DsaSigningKey,
    },
    EcdsaP256 {
        signing_key: P256SigningKey,
        verifying_key: P256VerifyingKey,
    },
    EcdsaP384 {
        signing_key: P384SigningKey,
        verifying_key: P384VerifyingKey,
    },
    EcdsaP521 {
        signing_key: P521SigningKey,
        verifying_key: P521VerifyingKey,
    },
    Ed25519 {
        signing_key: Ed25519SigningKey,
    },
}

impl KeyPair {
    /// Generate an RSA key pair with the specified number of bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        let mut rng = OsRng;
        let private = RsaPrivateKey::new(&mut rng, bits)
            .map_err(|e| SshCertError::KeyGenerationError(e.to_string()))?;
        let public = RsaPublicKey::from(&private);
        tracing::debug!(bits, "generated RSA key");
        Ok(KeyPair::Rsa {
            private: Box::new(private),
            public,
        })
    }

    /// Generate a DSA key pair with the 1024/160 parameters `ssh-dss` uses.
    pub fn generate_dsa() -> Self {
        let mut rng = OsRng;
        #[allow(deprecated)]
        let components = Components::generate(&mut rng, KeySize::DSA_1024_160);
        let signing_key = DsaSigningKey::generate(&mut rng, components);
        tracing::debug!("generated DSA key");
        KeyPair::Dsa { signing_key }
    }

    /// Generate an ECDSA P-256 key pair.
    pub fn generate_ecdsa_p256() -> Self {
        let signing_key = P256SigningKey::random(&mut OsRng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP256 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-384 key pair.
    pub fn generate_ecdsa_p384() -> Self {
        let signing_key = P384SigningKey::random(&mut OsRng);
        let verifying_key = signing_key.verifying_key().to_owned();
        KeyPair::EcdsaP384 {
            signing_key,
            verifying_key,
        }
    }

    /// Generate an ECDSA P-521 key pair.
    pub fn generate_ecdsa_p521() -> Self {
        let signing_key = P521SigningKey::random(&mut OsRng);
        let verifying_key = P521VerifyingKey::from(&signing_key);
        KeyPair::EcdsaP521 {
            signing_key,
            verifying_key,
        }
    }

    pub fn generate_ecdsa(curve: EcdsaCurve) -> Self {
        match curve {
            EcdsaCurve::NistP256 => Self::generate_ecdsa_p256(),
            EcdsaCurve::NistP384 => Self::generate_ecdsa_p384(),
            EcdsaCurve::NistP521 => Self::generate_ecdsa_p521(),
        }
    }

    /// Generate an Ed25519 key pair.
    pub fn generate_ed25519() -> Self {
        let signing_key = Ed25519SigningKey::generate(&mut OsRng);
        KeyPair::Ed25519 { signing_key }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            KeyPair::Rsa { .. } => KeyKind::Rsa,
            KeyPair::Dsa { .. } => KeyKind::Dsa,
            KeyPair::EcdsaP256 { .. } | KeyPair::EcdsaP384 { .. } | KeyPair::EcdsaP521 { .. } => {
                KeyKind::Ecdsa
            }
            KeyPair::Ed25519 { .. } => KeyKind::Ed25519,
        }
    }

    pub fn public_key(&self) -> PublicKey {
        match self {
            KeyPair::Rsa { public, .. } => PublicKey::Rsa(public.clone()),
            KeyPair::Dsa { signing_key } => PublicKey::Dsa(signing_key.verifying_key().clone()),
            KeyPair::EcdsaP256 { verifying_key, .. } => {
                PublicKey::Ecdsa(EcdsaPublicKey::NistP256(*verifying_key))
            }
            KeyPair::EcdsaP384 { verifying_key, .. } => {
                PublicKey::Ecdsa(EcdsaPublicKey::NistP384(*verifying_key))
            }
            KeyPair::EcdsaP521 { verifying_key, .. } => {
                PublicKey::Ecdsa(EcdsaPublicKey::NistP521(verifying_key.clone()))
            }
            KeyPair::Ed25519 { signing_key } => PublicKey::Ed25519(signing_key.verifying_key()),
        }
    }

    pub fn fingerprint(&self) -> Result<String> {
        self.public_key().fingerprint()
    }

    /// The secret scalar: RSA `d`, DSA `x`, the ECDSA scalar or the Ed25519
    /// seed. Wiped from memory when dropped.
    pub fn raw_bytes(&self) -> Zeroizing<Vec<u8>> {
        Zeroizing::new(match self {
            KeyPair::Rsa { private, .. } => private.d().to_bytes_be(),
            KeyPair::Dsa { signing_key } => signing_key.x().to_bytes_be(),
            KeyPair::EcdsaP256 { signing_key, .. } => signing_key.to_bytes().to_vec(),
            KeyPair::EcdsaP384 { signing_key, .. } => signing_key.to_bytes().to_vec(),
            KeyPair::EcdsaP521 { signing_key, .. } => signing_key.to_bytes().to_vec(),
            KeyPair::Ed25519 { signing_key } => signing_key.to_bytes().to_vec(),
        })
    }

    /// The algorithm [`KeyPair::sign`] uses.
    pub fn default_signature_algorithm(&self) -> SignatureAlgorithm {
        match self {
            KeyPair::Rsa { .. } => SignatureAlgorithm::RsaSha2_512,
            KeyPair::Dsa { .. } => SignatureAlgorithm::SshDss,
            KeyPair::EcdsaP256 { .. } => SignatureAlgorithm::EcdsaSha2Nistp256,
            KeyPair::EcdsaP384 { .. } => SignatureAlgorithm::EcdsaSha2Nistp384,
            KeyPair::EcdsaP521 { .. } => SignatureAlgorithm::EcdsaSha2Nistp521,
            KeyPair::Ed25519 { .. } => SignatureAlgorithm::SshEd25519,
        }
    }

    /// Signs `data` with the key's default algorithm.
    pub fn sign(&self, data: &[u8]) -> Result<SshSignature> {
        self.sign_with(data, self.default_signature_algorithm())
    }

    /// Signs `data` with an explicit algorithm, which must suit the key.
    pub fn sign_with(&self, data: &[u8], algorithm: SignatureAlgorithm) -> Result<SshSignature> {
        let failed = |e: rsa::signature::Error| SshCertError::SigningError(e.to_string());
        let blob = match (self, algorithm) {
            (KeyPair::Rsa { private, .. }, SignatureAlgorithm::SshRsa) => {
                let signing_key = RsaSigningKey::<Sha1>::new((**private).clone());
                signing_key.try_sign(data).map_err(failed)?.to_vec()
            }
            (KeyPair::Rsa { private, .. }, SignatureAlgorithm::RsaSha2_256) => {
                let signing_key = RsaSigningKey::<Sha256>::new((**private).clone());
                signing_key.try_sign(data).map_err(failed)?.to_vec()
            }
            (KeyPair::Rsa { private, .. }, SignatureAlgorithm::RsaSha2_512) => {
                let signing_key = RsaSigningKey::<Sha512>::new((**private).clone());
                signing_key.try_sign(data).map_err(failed)?.to_vec()
            }
            (KeyPair::Dsa { signing_key }, SignatureAlgorithm::SshDss) => {
                let signature: dsa::Signature = signing_key
                    .try_sign_digest(Sha1::new_with_prefix(data))
                    .map_err(failed)?;
                let mut blob = fixed_width(signature.r(), DSA_SIGNATURE_HALF)?;
                blob.extend(fixed_width(signature.s(), DSA_SIGNATURE_HALF)?);
                blob
            }
            (KeyPair::EcdsaP256 { signing_key, .. }, SignatureAlgorithm::EcdsaSha2Nistp256) => {
                let signature: P256Signature = signing_key.try_sign(data).map_err(failed)?;
                let (r, s) = signature.split_bytes();
                ecdsa_blob(&r, &s)?
            }
            (KeyPair::EcdsaP384 { signing_key, .. }, SignatureAlgorithm::EcdsaSha2Nistp384) => {
                let signature: P384Signature = signing_key.try_sign(data).map_err(failed)?;
                let (r, s) = signature.split_bytes();
                ecdsa_blob(&r, &s)?
            }
            (KeyPair::EcdsaP521 { signing_key, .. }, SignatureAlgorithm::EcdsaSha2Nistp521) => {
                let signature: P521Signature = signing_key.try_sign(data).map_err(failed)?;
                let (r, s) = signature.split_bytes();
                ecdsa_blob(&r, &s)?
            }
            (KeyPair::Ed25519 { signing_key }, SignatureAlgorithm::SshEd25519) => {
                let signature: Ed25519Signature = signing_key.try_sign(data).map_err(failed)?;
                signature.to_bytes().to_vec()
            }
            (key, algorithm) => {
                return Err(SshCertError::SigningError(format!(
                    "{algorithm} cannot be used with a {} key",
                    key.kind()
                )));
            }
        };
        Ok(SshSignature { algorithm, blob })
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("kind", &self.kind())
            .field("public_key", &self.public_key().key_type())
            .finish_non_exhaustive()
    }
}

const DSA_SIGNATURE_HALF: usize = 20;

/// Left-pads a big-endian integer to exactly `width` bytes.
fn fixed_width(value: &BigUint, width: usize) -> Result<Vec<u8>> {
    let bytes = value.to_bytes_be();
    let bytes: &[u8] = if value.bits() == 0 { &[] } else { &bytes };
    if bytes.len() > width {
        return Err(SshCertError::InvalidData(format!(
            "integer of {} bytes does not fit in {width}",
            bytes.len()
        )));
    }
    let mut out = vec![0u8; width - bytes.len()];
    out.extend_from_slice(bytes);
    Ok(out)
}

fn ecdsa_blob(r: &[u8], s: &[u8]) -> Result<Vec<u8>> {
    let mut blob = Vec::new();
    write_mpint(&BigUint::from_bytes_be(r), &mut blob)?;
    write_mpint(&BigUint::from_bytes_be(s), &mut blob)?;
    Ok(blob)
}

/// Reads the two mpints of an ECDSA signature blob into fixed-width `r‖s`.
fn ecdsa_components(blob: &[u8], width: usize) -> Result<Vec<u8>> {
    let mut reader = Reader::new(blob);
    let r = read_mpint(&mut reader)?;
    let s = read_mpint(&mut reader)?;
    reader.finish()?;
    let mut rs = fixed_width(&r, width)?;
    rs.extend(fixed_width(&s, width)?);
    Ok(rs)
}

fn ecdsa_signature<S>(parsed: std::result::Result<S, ecdsa::Error>) -> Result<S> {
    parsed.map_err(|e| SshCertError::InvalidData(format!("malformed ECDSA signature: {e}")))
}

fn rsa_signature(blob: &[u8]) -> Result<RsaSignature> {
    RsaSignature::try_from(blob)
        .map_err(|e| SshCertError::InvalidData(format!("malformed RSA signature: {e}")))
}

fn dsa_signature(blob: &[u8]) -> Result<dsa::Signature> {
    if blob.len() != 2 * DSA_SIGNATURE_HALF {
        return Err(SshCertError::InvalidData(format!(
            "DSA signature must be {} bytes, got {}",
            2 * DSA_SIGNATURE_HALF,
            blob.len()
        )));
    }
    let (r, s) = blob.split_at(DSA_SIGNATURE_HALF);
    dsa::Signature::from_components(BigUint::from_bytes_be(r), BigUint::from_bytes_be(s))
        .map_err(|e| SshCertError::InvalidData(format!("malformed DSA signature: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ed25519_sign_verify() {
        let key = KeyPair::generate_ed25519();
        let signature = key.sign(b"payload").unwrap();
        assert_eq!(signature.algorithm, SignatureAlgorithm::SshEd25519);
        assert_eq!(signature.blob.len(), 64);
        key.public_key().verify(b"payload", &signature).unwrap();
        assert!(key.public_key().verify(b"tampered", &signature).is_err());
    }

    #[test]
    fn test_ecdsa_sign_verify_all_curves() {
        for curve in [EcdsaCurve::NistP256, EcdsaCurve::NistP384, EcdsaCurve::NistP521] {
            let key = KeyPair::generate_ecdsa(curve);
            let signature = key.sign(b"payload").unwrap();
            assert_eq!(signature.algorithm, curve.signature_algorithm());
            key.public_key().verify(b"payload", &signature).unwrap();
        }
    }

    #[test]
    fn test_p521_public_key_matches_signing_key() {
        let key = KeyPair::generate_ecdsa_p521();
        let public = key.public_key();
        let PublicKey::Ecdsa(ecdsa) = &public else {
            panic!("expected an ECDSA public key");
        };
        assert_eq!(ecdsa.curve(), EcdsaCurve::NistP521);
        assert_eq!(ecdsa.to_sec1_bytes().len(), 1 + 2 * 66);
        assert!(format!("{ecdsa:?}").contains("NistP521"));

        let signature = key.sign(b"payload").unwrap();
        public.verify(b"payload", &signature).unwrap();
    }

    #[test]
    fn test_secret_bytes_lengths() {
        assert_eq!(KeyPair::generate_ed25519().raw_bytes().len(), 32);
        assert_eq!(KeyPair::generate_ecdsa_p384().raw_bytes().len(), 48);
        assert_eq!(KeyPair::generate_ecdsa_p521().raw_bytes().len(), 66);
    }

    #[test]
    fn test_rejects_mismatched_algorithm() {
        let key = KeyPair::generate_ed25519();
        let err = key.sign_with(b"x", SignatureAlgorithm::RsaSha2_256).unwrap_err();
        assert!(matches!(err, SshCertError::SigningError(_)));
    }

    #[test]
    fn test_fingerprint_format_is_stable() {
        let key = KeyPair::generate_ecdsa_p256().public_key();
        let first = key.fingerprint().unwrap();
        assert!(first.starts_with("SHA256:"));
        // 32 byte digest in unpadded base64.
        assert_eq!(first.len(), "SHA256:".len() + 43);
        assert_eq!(first, key.fingerprint().unwrap());
    }

    #[test]
    fn test_signature_algorithm_names() {
        for name in ["ssh-rsa", "rsa-sha2-256", "rsa-sha2-512", "ssh-dss", "ssh-ed25519"] {
            assert_eq!(name.parse::<SignatureAlgorithm>().unwrap().as_str(), name);
        }
        assert!("ssh-foo".parse::<SignatureAlgorithm>().is_err());
    }

    #[test]
    fn test_fixed_width_pads() {
        let value = BigUint::from_bytes_be(&[1, 2]);
        assert_eq!(fixed_width(&value, 4).unwrap(), [0, 0, 1, 2]);
        assert!(fixed_width(&value, 1).is_err());
    }
}
