//! Fields that only appear inside an OpenSSH certificate.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use rand_core::CryptoRngCore;

use super::primitives::{read_list, read_pairs, write_list, write_pairs};
use super::{
    FieldCodec, Integer32Field, Integer64Field, IntegerField, ParseField, PublicKeyField,
    parse_integer,
};
use crate::cert::extensions::{CriticalOption, Extension};
use crate::encoding::{Reader, WriteExt};
use crate::error::{Result, SshCertError};
use crate::key::{EcdsaCurve, KeyKind, PublicKey, SshSignature};

/// Nonce length used when the caller does not supply one.
pub const DEFAULT_NONCE_LEN: usize = 32;

/// The `*-cert-v01@openssh.com` certificate type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertAlgorithm {
    SshRsaCert,
    RsaSha2_256Cert,
    RsaSha2_512Cert,
    SshDssCert,
    EcdsaSha2Nistp256Cert,
    EcdsaSha2Nistp384Cert,
    EcdsaSha2Nistp521Cert,
    SshEd25519Cert,
}

impl CertAlgorithm {
    pub const ALL: [CertAlgorithm; 8] = [
        CertAlgorithm::SshRsaCert,
        CertAlgorithm::RsaSha2_256Cert,
        CertAlgorithm::RsaSha2_512Cert,
        CertAlgorithm::SshDssCert,
        CertAlgorithm::EcdsaSha2Nistp256Cert,
        CertAlgorithm::EcdsaSha2Nistp384Cert,
        CertAlgorithm::EcdsaSha2Nistp521Cert,
        CertAlgorithm::SshEd25519Cert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CertAlgorithm::SshRsaCert => "ssh-rsa-cert-v01@openssh.com",
            CertAlgorithm::RsaSha2_256Cert => "rsa-sha2-256-cert-v01@openssh.com",
            CertAlgorithm::RsaSha2_512Cert => "rsa-sha2-512-cert-v01@openssh.com",
            CertAlgorithm::SshDssCert => "ssh-dss-cert-v01@openssh.com",
            CertAlgorithm::EcdsaSha2Nistp256Cert => "ecdsa-sha2-nistp256-cert-v01@openssh.com",
            CertAlgorithm::EcdsaSha2Nistp384Cert => "ecdsa-sha2-nistp384-cert-v01@openssh.com",
            CertAlgorithm::EcdsaSha2Nistp521Cert => "ecdsa-sha2-nistp521-cert-v01@openssh.com",
            CertAlgorithm::SshEd25519Cert => "ssh-ed25519-cert-v01@openssh.com",
        }
    }

    /// The subject key family a certificate with this tag carries.
    pub fn key_kind(&self) -> KeyKind {
        match self {
            CertAlgorithm::SshRsaCert
            | CertAlgorithm::RsaSha2_256Cert
            | CertAlgorithm::RsaSha2_512Cert => KeyKind::Rsa,
            CertAlgorithm::SshDssCert => KeyKind::Dsa,
            CertAlgorithm::EcdsaSha2Nistp256Cert
            | CertAlgorithm::EcdsaSha2Nistp384Cert
            | CertAlgorithm::EcdsaSha2Nistp521Cert => KeyKind::Ecdsa,
            CertAlgorithm::SshEd25519Cert => KeyKind::Ed25519,
        }
    }

    pub fn ecdsa_curve(&self) -> Option<EcdsaCurve> {
        match self {
            CertAlgorithm::EcdsaSha2Nistp256Cert => Some(EcdsaCurve::NistP256),
            CertAlgorithm::EcdsaSha2Nistp384Cert => Some(EcdsaCurve::NistP384),
            CertAlgorithm::EcdsaSha2Nistp521Cert => Some(EcdsaCurve::NistP521),
            _ => None,
        }
    }

    /// The tag OpenSSH picks for a certificate over `key`.
    pub fn default_for(key: &PublicKey) -> Self {
        match key {
            PublicKey::Rsa(_) => CertAlgorithm::RsaSha2_512Cert,
            PublicKey::Dsa(_) => CertAlgorithm::SshDssCert,
            PublicKey::Ecdsa(key) => match key.curve() {
                EcdsaCurve::NistP256 => CertAlgorithm::EcdsaSha2Nistp256Cert,
                EcdsaCurve::NistP384 => CertAlgorithm::EcdsaSha2Nistp384Cert,
                EcdsaCurve::NistP521 => CertAlgorithm::EcdsaSha2Nistp521Cert,
            },
            PublicKey::Ed25519(_) => CertAlgorithm::SshEd25519Cert,
        }
    }
}

impl fmt::Display for CertAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertAlgorithm {
    type Err = SshCertError;

    fn from_str(s: &str) -> Result<Self> {
        CertAlgorithm::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| {
                SshCertError::InvalidData(format!("unknown certificate type tag {s:?}"))
            })
    }
}

/// Whether the certificate authenticates a user or a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum CertType {
    #[default]
    User = 1,
    Host = 2,
}

impl TryFrom<u32> for CertType {
    type Error = SshCertError;

    fn try_from(value: u32) -> Result<Self> {
        match value {
            1 => Ok(CertType::User),
            2 => Ok(CertType::Host),
            other => Err(SshCertError::InvalidData(format!(
                "certificate type must be 1 (user) or 2 (host), got {other}"
            ))),
        }
    }
}

impl fmt::Display for CertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertType::User => f.write_str("user"),
            CertType::Host => f.write_str("host"),
        }
    }
}

/// The certificate type tag, first field of every certificate.
#[derive(Debug, Clone, Copy)]
pub struct PubkeyTypeField;

impl FieldCodec for PubkeyTypeField {
    type Value = CertAlgorithm;
    const NAME: &'static str = "public key type";

    fn write(value: &CertAlgorithm, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(value.as_str().as_bytes())
    }

    fn read(reader: &mut Reader<'_>) -> Result<CertAlgorithm> {
        reader.read_utf8()?.parse()
    }
}

impl ParseField for PubkeyTypeField {
    fn parse_value(text: &str) -> Result<CertAlgorithm> {
        text.parse()
    }
}

/// CA-chosen random bytes that make the signed data unpredictable.
#[derive(Debug, Clone, Copy)]
pub struct NonceField;

impl NonceField {
    /// `len` fresh bytes from `rng`.
    pub fn random(rng: &mut impl CryptoRngCore, len: usize) -> Vec<u8> {
        let mut nonce = vec![0u8; len];
        rng.fill_bytes(&mut nonce);
        nonce
    }
}

impl FieldCodec for NonceField {
    type Value = Vec<u8>;
    const NAME: &'static str = "nonce";

    fn check(value: &Vec<u8>) -> Vec<SshCertError> {
        if value.is_empty() {
            vec![SshCertError::InvalidData("nonce must not be empty".to_string())]
        } else {
            Vec::new()
        }
    }

    fn write(value: &Vec<u8>, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(value)
    }

    fn read(reader: &mut Reader<'_>) -> Result<Vec<u8>> {
        Ok(reader.read_string()?.to_vec())
    }
}

impl ParseField for NonceField {
    fn parse_value(text: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}

/// CA-assigned serial number.
#[derive(Debug, Clone, Copy)]
pub struct SerialField;

impl FieldCodec for SerialField {
    type Value = u64;
    const NAME: &'static str = "serial";

    fn write(value: &u64, out: &mut Vec<u8>) -> Result<()> {
        Integer64Field::write(value, out)
    }

    fn read(reader: &mut Reader<'_>) -> Result<u64> {
        Integer64Field::read(reader)
    }
}

impl IntegerField for SerialField {
    fn from_wide(value: u128) -> Result<u64> {
        Integer64Field::from_wide(value)
    }
}

impl ParseField for SerialField {
    fn parse_value(text: &str) -> Result<u64> {
        parse_integer::<Self>(text)
    }
}

/// `uint32` holding [`CertType`].
#[derive(Debug, Clone, Copy)]
pub struct CertificateTypeField;

impl FieldCodec for CertificateTypeField {
    type Value = CertType;
    const NAME: &'static str = "certificate type";

    fn write(value: &CertType, out: &mut Vec<u8>) -> Result<()> {
        out.put_u32(*value as u32);
        Ok(())
    }

    fn read(reader: &mut Reader<'_>) -> Result<CertType> {
        CertType::try_from(reader.read_u32()?)
    }
}

impl IntegerField for CertificateTypeField {
    fn from_wide(value: u128) -> Result<CertType> {
        CertType::try_from(Integer32Field::from_wide(value)?)
    }
}

impl ParseField for CertificateTypeField {
    fn parse_value(text: &str) -> Result<CertType> {
        match text.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(CertType::User),
            "host" => Ok(CertType::Host),
            _ => parse_integer::<Self>(text),
        }
    }
}

/// Free-form identifier logged by the server on authentication.
#[derive(Debug, Clone, Copy)]
pub struct KeyIdField;

impl FieldCodec for KeyIdField {
    type Value = String;
    const NAME: &'static str = "key id";

    fn check(value: &String) -> Vec<SshCertError> {
        if value.is_empty() {
            vec![SshCertError::InvalidData("key id must not be empty".to_string())]
        } else {
            Vec::new()
        }
    }

    fn write(value: &String, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(value.as_bytes())
    }

    fn read(reader: &mut Reader<'_>) -> Result<String> {
        Ok(reader.read_utf8()?.to_string())
    }
}

impl ParseField for KeyIdField {
    fn parse_value(text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

/// User or host names the certificate is valid for; empty means any.
#[derive(Debug, Clone, Copy)]
pub struct PrincipalsField;

impl FieldCodec for PrincipalsField {
    type Value = Vec<String>;
    const NAME: &'static str = "principals";

    fn check(value: &Vec<String>) -> Vec<SshCertError> {
        value
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_empty())
            .map(|(i, _)| SshCertError::InvalidData(format!("principal #{i} is empty")))
            .collect()
    }

    fn write(value: &Vec<String>, out: &mut Vec<u8>) -> Result<()> {
        write_list(value.iter().map(String::as_str), out)
    }

    fn read(reader: &mut Reader<'_>) -> Result<Vec<String>> {
        read_list(reader)
    }
}

impl ParseField for PrincipalsField {
    /// Comma separated names, as `ssh-keygen -n` takes them.
    fn parse_value(text: &str) -> Result<Vec<String>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(text.split(',').map(|p| p.trim().to_string()).collect())
    }
}

macro_rules! timestamp_field {
    ($name:ident, $label:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl FieldCodec for $name {
            type Value = u64;
            const NAME: &'static str = $label;

            fn write(value: &u64, out: &mut Vec<u8>) -> Result<()> {
                out.put_u64(*value);
                Ok(())
            }

            fn read(reader: &mut Reader<'_>) -> Result<u64> {
                reader.read_u64()
            }
        }

        impl IntegerField for $name {
            fn from_wide(value: u128) -> Result<u64> {
                Integer64Field::from_wide(value)
            }
        }

        impl ParseField for $name {
            fn parse_value(text: &str) -> Result<u64> {
                parse_integer::<Self>(text)
            }
        }
    };
}

timestamp_field!(
    ValidAfterField,
    "valid after",
    "Start of the validity window, seconds since the epoch."
);
timestamp_field!(
    ValidBeforeField,
    "valid before",
    "End of the validity window; `u64::MAX` means forever."
);

/// Restrictions the server must enforce, keyed by option name.
#[derive(Debug, Clone, Copy)]
pub struct CriticalOptionsField;

impl CriticalOptionsField {
    /// The name-list form: every option with an empty value.
    pub fn from_names<I, S>(names: I) -> BTreeMap<String, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .map(|name| (name.into(), String::new()))
            .collect()
    }
}

impl FieldCodec for CriticalOptionsField {
    type Value = BTreeMap<String, String>;
    const NAME: &'static str = "critical options";

    fn check(value: &BTreeMap<String, String>) -> Vec<SshCertError> {
        value
            .iter()
            .filter_map(|(name, data)| match name.parse::<CriticalOption>() {
                Ok(option) => option.check_value(data),
                Err(e) => Some(e),
            })
            .collect()
    }

    fn write(value: &BTreeMap<String, String>, out: &mut Vec<u8>) -> Result<()> {
        write_pairs(value, out)
    }

    fn read(reader: &mut Reader<'_>) -> Result<BTreeMap<String, String>> {
        read_pairs(reader)
    }
}

/// Optional grants, each written as a name with empty data.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionsField;

impl ExtensionsField {
    /// The mapping form; every value must be empty.
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<BTreeSet<String>> {
        map.iter()
            .map(|(name, data)| {
                if data.is_empty() {
                    Ok(name.clone())
                } else {
                    Err(SshCertError::InvalidData(format!(
                        "extension {name} takes no value, got {data:?}"
                    )))
                }
            })
            .collect()
    }
}

impl FieldCodec for ExtensionsField {
    type Value = BTreeSet<String>;
    const NAME: &'static str = "extensions";

    fn check(value: &BTreeSet<String>) -> Vec<SshCertError> {
        value
            .iter()
            .filter_map(|name| name.parse::<Extension>().err())
            .collect()
    }

    fn write(value: &BTreeSet<String>, out: &mut Vec<u8>) -> Result<()> {
        let mut inner = Vec::new();
        for name in value {
            inner.put_string(name.as_bytes())?;
            inner.put_string(&[])?;
        }
        out.put_string(&inner)
    }

    fn read(reader: &mut Reader<'_>) -> Result<BTreeSet<String>> {
        Self::from_map(&read_pairs(reader)?)
    }
}

/// Always the empty string.
#[derive(Debug, Clone, Copy)]
pub struct ReservedField;

impl FieldCodec for ReservedField {
    type Value = Vec<u8>;
    const NAME: &'static str = "reserved";

    fn check(value: &Vec<u8>) -> Vec<SshCertError> {
        if value.is_empty() {
            Vec::new()
        } else {
            vec![SshCertError::InvalidData(format!(
                "reserved field must be empty, got {} bytes",
                value.len()
            ))]
        }
    }

    fn write(value: &Vec<u8>, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(value)
    }

    fn read(reader: &mut Reader<'_>) -> Result<Vec<u8>> {
        Ok(reader.read_string()?.to_vec())
    }
}

impl ParseField for ReservedField {
    fn parse_value(text: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}

/// The signing CA's public key blob.
#[derive(Debug, Clone, Copy)]
pub struct CaPublicKeyField;

impl FieldCodec for CaPublicKeyField {
    type Value = PublicKey;
    const NAME: &'static str = "CA public key";

    fn check(value: &PublicKey) -> Vec<SshCertError> {
        PublicKeyField::from_key(value.clone())
            .validate()
            .err()
            .unwrap_or_default()
    }

    fn write(value: &PublicKey, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(&value.to_blob()?)
    }

    fn read(reader: &mut Reader<'_>) -> Result<PublicKey> {
        PublicKey::from_blob(reader.read_string()?)
    }
}

/// The CA signature: algorithm name and signature blob in one string.
#[derive(Debug, Clone, Copy)]
pub struct SignatureField;

impl FieldCodec for SignatureField {
    type Value = SshSignature;
    const NAME: &'static str = "signature";

    fn check(value: &SshSignature) -> Vec<SshCertError> {
        if value.blob.is_empty() {
            vec![SshCertError::InvalidData("signature blob is empty".to_string())]
        } else {
            Vec::new()
        }
    }

    fn write(value: &SshSignature, out: &mut Vec<u8>) -> Result<()> {
        let mut inner = Vec::new();
        inner.put_string(value.algorithm.as_str().as_bytes())?;
        inner.put_string(&value.blob)?;
        out.put_string(&inner)
    }

    fn read(reader: &mut Reader<'_>) -> Result<SshSignature> {
        let mut inner = Reader::new(reader.read_string()?);
        let algorithm = inner.read_utf8()?.parse()?;
        let blob = inner.read_string()?.to_vec();
        inner.finish()?;
        Ok(SshSignature { algorithm, blob })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::Field;
    use crate::key::SignatureAlgorithm;

    fn tag_bytes(tag: CertAlgorithm) -> Vec<u8> {
        PubkeyTypeField::encode(&tag).unwrap()
    }

    #[test]
    fn test_pubkey_type_exact_bytes() {
        assert_eq!(
            tag_bytes(CertAlgorithm::SshRsaCert),
            b"\x00\x00\x00\x1cssh-rsa-cert-v01@openssh.com"
        );
        assert_eq!(
            tag_bytes(CertAlgorithm::RsaSha2_256Cert),
            b"\x00\x00\x00!rsa-sha2-256-cert-v01@openssh.com"
        );
        assert_eq!(
            tag_bytes(CertAlgorithm::RsaSha2_512Cert),
            b"\x00\x00\x00!rsa-sha2-512-cert-v01@openssh.com"
        );
        assert_eq!(
            tag_bytes(CertAlgorithm::SshDssCert),
            b"\x00\x00\x00\x1cssh-dss-cert-v01@openssh.com"
        );
        assert_eq!(
            tag_bytes(CertAlgorithm::EcdsaSha2Nistp256Cert),
            b"\x00\x00\x00(ecdsa-sha2-nistp256-cert-v01@openssh.com"
        );
        assert_eq!(
            tag_bytes(CertAlgorithm::EcdsaSha2Nistp384Cert),
            b"\x00\x00\x00(ecdsa-sha2-nistp384-cert-v01@openssh.com"
        );
        assert_eq!(
            tag_bytes(CertAlgorithm::EcdsaSha2Nistp521Cert),
            b"\x00\x00\x00(ecdsa-sha2-nistp521-cert-v01@openssh.com"
        );
        assert_eq!(
            tag_bytes(CertAlgorithm::SshEd25519Cert),
            b"\x00\x00\x00 ssh-ed25519-cert-v01@openssh.com"
        );
    }

    #[test]
    fn test_unknown_pubkey_type() {
        let field = Field::<PubkeyTypeField>::parse("ssh-unknown-cert-v01@openssh.com");
        assert!(field.validate().unwrap_err()[0].is_invalid_data());

        let mut buf = Vec::new();
        buf.put_string(b"ssh-rsa").unwrap();
        assert!(PubkeyTypeField::decode_prefix(&buf).is_err());
    }

    #[test]
    fn test_nonce_from_text() {
        let field = Field::<NonceField>::parse("abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz");
        assert_eq!(
            field.to_bytes().unwrap(),
            b"\x00\x00\x004abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz"
        );
        assert!(!Field::<NonceField>::new(Vec::new()).is_valid());
    }

    #[test]
    fn test_random_nonce_length() {
        let nonce = NonceField::random(&mut rand_core::OsRng, DEFAULT_NONCE_LEN);
        assert_eq!(nonce.len(), DEFAULT_NONCE_LEN);
        assert!(Field::<NonceField>::new(nonce).is_valid());
    }

    #[test]
    fn test_serial_range() {
        assert!(Field::<SerialField>::parse("InvalidData").validate().unwrap_err()[0].is_invalid_data());
        assert!(Field::<SerialField>::from_u128(u64::MAX as u128 + 1).validate().unwrap_err()[0].is_overflow());
        assert_eq!(
            Field::<SerialField>::new(1234567890).to_bytes().unwrap(),
            [0, 0, 0, 0, 0x49, 0x96, 0x02, 0xd2]
        );
    }

    #[test]
    fn test_certificate_type_bytes() {
        assert_eq!(CertificateTypeField::encode(&CertType::User).unwrap(), [0, 0, 0, 1]);
        assert_eq!(CertificateTypeField::encode(&CertType::Host).unwrap(), [0, 0, 0, 2]);
        assert!(CertificateTypeField::decode_prefix(&[0, 0, 0, 3]).is_err());
        assert!(!Field::<CertificateTypeField>::from_u128(0).is_valid());
        assert!(Field::<CertificateTypeField>::from_u128(u32::MAX as u128 + 1).validate().unwrap_err()[0].is_overflow());
        assert_eq!(Field::<CertificateTypeField>::parse("host").value(), Some(&CertType::Host));
        assert_eq!(Field::<CertificateTypeField>::parse("1").value(), Some(&CertType::User));
    }

    #[test]
    fn test_key_id_required() {
        assert!(!Field::<KeyIdField>::new(String::new()).is_valid());
        assert!(Field::<KeyIdField>::parse("KeyIdentifier").is_valid());
    }

    #[test]
    fn test_principals_parse_and_reject_empty() {
        let field = Field::<PrincipalsField>::parse("pr_a, pr_b,pr_c");
        assert_eq!(
            field.value().unwrap(),
            &vec!["pr_a".to_string(), "pr_b".to_string(), "pr_c".to_string()]
        );
        assert!(!Field::<PrincipalsField>::parse("a,,b").is_valid());
    }

    #[test]
    fn test_critical_options_allow_list() {
        let mut options = BTreeMap::new();
        options.insert("force-command".to_string(), "sftp-internal".to_string());
        options.insert("InvalidOption".to_string(), String::new());
        let defects = Field::<CriticalOptionsField>::new(options).validate().unwrap_err();
        assert_eq!(defects.len(), 1);
        assert!(defects[0].is_invalid_data());

        let names = CriticalOptionsField::from_names(["verify-required", "bogus"]);
        assert!(CriticalOptionsField::encode(&names).is_err());
    }

    #[test]
    fn test_critical_options_both_forms_agree() {
        let from_names = CriticalOptionsField::from_names(["verify-required"]);
        let mut from_map = BTreeMap::new();
        from_map.insert("verify-required".to_string(), String::new());

        let a = CriticalOptionsField::encode(&from_names).unwrap();
        let b = CriticalOptionsField::encode(&from_map).unwrap();
        assert_eq!(a, b);
        assert_eq!(CriticalOptionsField::decode_prefix(&a).unwrap().0, from_map);
    }

    #[test]
    fn test_critical_options_are_sorted() {
        let mut options = BTreeMap::new();
        options.insert("source-address".to_string(), "10.0.0.0/8".to_string());
        options.insert("force-command".to_string(), "ls".to_string());
        let bytes = CriticalOptionsField::encode(&options).unwrap();
        assert_eq!(&bytes[4..21], b"\x00\x00\x00\x0dforce-command");
    }

    #[test]
    fn test_extensions_allow_list_and_forms() {
        let set: BTreeSet<String> = ["permit-pty", "permit-X11-forwarding"]
            .into_iter()
            .map(String::from)
            .collect();
        let map: BTreeMap<String, String> = set.iter().map(|n| (n.clone(), String::new())).collect();
        assert_eq!(ExtensionsField::from_map(&map).unwrap(), set);

        let bytes = ExtensionsField::encode(&set).unwrap();
        assert_eq!(ExtensionsField::decode_prefix(&bytes).unwrap().0, set);
        // Lexical order puts the upper-case X11 name first.
        assert_eq!(&bytes[8..29], b"permit-X11-forwarding");

        let mut bad = set.clone();
        bad.insert("InvalidExtension".to_string());
        assert!(!Field::<ExtensionsField>::new(bad).is_valid());

        let mut valued = map;
        valued.insert("permit-pty".to_string(), "yes".to_string());
        assert!(ExtensionsField::from_map(&valued).is_err());
    }

    #[test]
    fn test_reserved_is_empty() {
        assert_eq!(ReservedField::encode(&Vec::new()).unwrap(), [0, 0, 0, 0]);
        assert!(!Field::<ReservedField>::parse("InvalidData").is_valid());
        assert!(ReservedField::decode_prefix(&[0, 0, 0, 1, b'x']).is_err());
    }

    #[test]
    fn test_signature_layout() {
        let signature = SshSignature {
            algorithm: SignatureAlgorithm::SshEd25519,
            blob: vec![7; 64],
        };
        let bytes = SignatureField::encode(&signature).unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 4 + 11 + 4 + 64]);
        assert_eq!(&bytes[4..19], b"\x00\x00\x00\x0bssh-ed25519");
        assert_eq!(SignatureField::decode_prefix(&bytes).unwrap().0, signature);
    }
}
