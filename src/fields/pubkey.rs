//! Algorithm-specific public key layouts.
//!
//! Inside a certificate the subject key is written as bare sub-fields
//! (no key type name); the CA key and standalone keys use the full blob,
//! which starts with the key type name.

use std::fmt;

use dsa::{Components, VerifyingKey as DsaVerifyingKey};
use ed25519_dalek::VerifyingKey as Ed25519VerifyingKey;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPublicKey};

use super::primitives::{read_mpint, write_mpint};
use super::{CertAlgorithm, Field, FieldCodec};
use crate::encoding::{Reader, WriteExt};
use crate::error::{Result, SshCertError};
use crate::key::{EcdsaCurve, EcdsaPublicKey, KeyKind, PublicKey};

/// Smallest RSA modulus OpenSSH accepts.
const RSA_MIN_MODULUS_BITS: usize = 1024;
/// `ssh-dss` signatures are fixed at 160-bit `q`.
const DSA_SUBGROUP_BITS: usize = 160;

/// A public key codec for one algorithm family.
pub trait PubkeyField: FieldCodec {
    const KIND: KeyKind;

    /// Extracts the concrete key if `key` belongs to this family.
    fn from_public_key(key: &PublicKey) -> Option<Self::Value>;

    fn to_public_key(value: &Self::Value) -> PublicKey;

    /// Whether a certificate tagged `tag` may carry `value`.
    fn accepts(tag: CertAlgorithm, _value: &Self::Value) -> bool {
        tag.key_kind() == Self::KIND
    }
}

impl<C: PubkeyField> fmt::Display for Field<C> {
    /// Renders `<Algorithm> <fingerprint>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value().ok_or(fmt::Error)?;
        let fingerprint = C::to_public_key(value)
            .fingerprint()
            .map_err(|_| fmt::Error)?;
        write!(f, "{} {}", C::KIND, fingerprint)
    }
}

/// RSA: public exponent `e` then modulus `n`, both mpints.
#[derive(Debug, Clone, Copy)]
pub struct RsaPubkeyField;

impl FieldCodec for RsaPubkeyField {
    type Value = RsaPublicKey;
    const NAME: &'static str = "RSA public key";

    fn check(value: &RsaPublicKey) -> Vec<SshCertError> {
        let bits = value.n().bits();
        if bits < RSA_MIN_MODULUS_BITS {
            vec![SshCertError::InvalidData(format!(
                "RSA modulus of {bits} bits is below the {RSA_MIN_MODULUS_BITS}-bit minimum"
            ))]
        } else {
            Vec::new()
        }
    }

    fn write(value: &RsaPublicKey, out: &mut Vec<u8>) -> Result<()> {
        write_mpint(value.e(), out)?;
        write_mpint(value.n(), out)
    }

    fn read(reader: &mut Reader<'_>) -> Result<RsaPublicKey> {
        let e = read_mpint(reader)?;
        let n = read_mpint(reader)?;
        RsaPublicKey::new(n, e)
            .map_err(|err| SshCertError::InvalidData(format!("invalid RSA public key: {err}")))
    }
}

impl PubkeyField for RsaPubkeyField {
    const KIND: KeyKind = KeyKind::Rsa;

    fn from_public_key(key: &PublicKey) -> Option<RsaPublicKey> {
        match key {
            PublicKey::Rsa(key) => Some(key.clone()),
            _ => None,
        }
    }

    fn to_public_key(value: &RsaPublicKey) -> PublicKey {
        PublicKey::Rsa(value.clone())
    }
}

/// DSA: `p`, `q`, `g`, `y` as mpints.
#[derive(Debug, Clone, Copy)]
pub struct DsaPubkeyField;

impl FieldCodec for DsaPubkeyField {
    type Value = DsaVerifyingKey;
    const NAME: &'static str = "DSA public key";

    fn check(value: &DsaVerifyingKey) -> Vec<SshCertError> {
        let bits = value.components().q().bits();
        if bits != DSA_SUBGROUP_BITS {
            vec![SshCertError::InvalidData(format!(
                "DSA subgroup order has {bits} bits, ssh-dss requires {DSA_SUBGROUP_BITS}"
            ))]
        } else {
            Vec::new()
        }
    }

    fn write(value: &DsaVerifyingKey, out: &mut Vec<u8>) -> Result<()> {
        let components = value.components();
        write_mpint(components.p(), out)?;
        write_mpint(components.q(), out)?;
        write_mpint(components.g(), out)?;
        write_mpint(value.y(), out)
    }

    fn read(reader: &mut Reader<'_>) -> Result<DsaVerifyingKey> {
        let invalid =
            |err: rsa::signature::Error| SshCertError::InvalidData(format!("invalid DSA key: {err}"));
        let p: BigUint = read_mpint(reader)?;
        let q = read_mpint(reader)?;
        let g = read_mpint(reader)?;
        let y = read_mpint(reader)?;
        let components = Components::from_components(p, q, g).map_err(invalid)?;
        DsaVerifyingKey::from_components(components, y).map_err(invalid)
    }
}

impl PubkeyField for DsaPubkeyField {
    const KIND: KeyKind = KeyKind::Dsa;

    fn from_public_key(key: &PublicKey) -> Option<DsaVerifyingKey> {
        match key {
            PublicKey::Dsa(key) => Some(key.clone()),
            _ => None,
        }
    }

    fn to_public_key(value: &DsaVerifyingKey) -> PublicKey {
        PublicKey::Dsa(value.clone())
    }
}

/// ECDSA: curve identifier then the SEC1 point, both strings.
#[derive(Debug, Clone, Copy)]
pub struct EcdsaPubkeyField;

impl FieldCodec for EcdsaPubkeyField {
    type Value = EcdsaPublicKey;
    const NAME: &'static str = "ECDSA public key";

    fn write(value: &EcdsaPublicKey, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(value.curve().identifier().as_bytes())?;
        out.put_string(&value.to_sec1_bytes())
    }

    fn read(reader: &mut Reader<'_>) -> Result<EcdsaPublicKey> {
        let curve = EcdsaCurve::from_identifier(reader.read_utf8()?)?;
        EcdsaPublicKey::from_sec1_bytes(curve, reader.read_string()?)
    }
}

impl PubkeyField for EcdsaPubkeyField {
    const KIND: KeyKind = KeyKind::Ecdsa;

    fn from_public_key(key: &PublicKey) -> Option<EcdsaPublicKey> {
        match key {
            PublicKey::Ecdsa(key) => Some(key.clone()),
            _ => None,
        }
    }

    fn to_public_key(value: &EcdsaPublicKey) -> PublicKey {
        PublicKey::Ecdsa(value.clone())
    }

    fn accepts(tag: CertAlgorithm, value: &EcdsaPublicKey) -> bool {
        tag.ecdsa_curve() == Some(value.curve())
    }
}

/// Ed25519: the 32-byte key as a string.
#[derive(Debug, Clone, Copy)]
pub struct Ed25519PubkeyField;

impl FieldCodec for Ed25519PubkeyField {
    type Value = Ed25519VerifyingKey;
    const NAME: &'static str = "Ed25519 public key";

    fn write(value: &Ed25519VerifyingKey, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(value.as_bytes())
    }

    fn read(reader: &mut Reader<'_>) -> Result<Ed25519VerifyingKey> {
        let bytes: [u8; 32] = reader.read_string()?.try_into().map_err(|_| {
            SshCertError::InvalidData("Ed25519 public key must be 32 bytes".to_string())
        })?;
        Ed25519VerifyingKey::from_bytes(&bytes)
            .map_err(|e| SshCertError::InvalidData(format!("invalid Ed25519 key: {e}")))
    }
}

impl PubkeyField for Ed25519PubkeyField {
    const KIND: KeyKind = KeyKind::Ed25519;

    fn from_public_key(key: &PublicKey) -> Option<Ed25519VerifyingKey> {
        match key {
            PublicKey::Ed25519(key) => Some(*key),
            _ => None,
        }
    }

    fn to_public_key(value: &Ed25519VerifyingKey) -> PublicKey {
        PublicKey::Ed25519(*value)
    }
}

/// A public key field of whichever family the key belongs to.
#[derive(Clone, Debug)]
pub enum PublicKeyField {
    Rsa(Field<RsaPubkeyField>),
    Dsa(Field<DsaPubkeyField>),
    Ecdsa(Field<EcdsaPubkeyField>),
    Ed25519(Field<Ed25519PubkeyField>),
}

impl PublicKeyField {
    /// Picks the field implementation matching the key's algorithm.
    pub fn from_key(key: PublicKey) -> Self {
        match key {
            PublicKey::Rsa(key) => PublicKeyField::Rsa(Field::new(key)),
            PublicKey::Dsa(key) => PublicKeyField::Dsa(Field::new(key)),
            PublicKey::Ecdsa(key) => PublicKeyField::Ecdsa(Field::new(key)),
            PublicKey::Ed25519(key) => PublicKeyField::Ed25519(Field::new(key)),
        }
    }

    pub fn kind(&self) -> KeyKind {
        match self {
            PublicKeyField::Rsa(_) => KeyKind::Rsa,
            PublicKeyField::Dsa(_) => KeyKind::Dsa,
            PublicKeyField::Ecdsa(_) => KeyKind::Ecdsa,
            PublicKeyField::Ed25519(_) => KeyKind::Ed25519,
        }
    }

    pub fn public_key(&self) -> Option<PublicKey> {
        match self {
            PublicKeyField::Rsa(f) => f.value().map(RsaPubkeyField::to_public_key),
            PublicKeyField::Dsa(f) => f.value().map(DsaPubkeyField::to_public_key),
            PublicKeyField::Ecdsa(f) => f.value().map(EcdsaPubkeyField::to_public_key),
            PublicKeyField::Ed25519(f) => f.value().map(Ed25519PubkeyField::to_public_key),
        }
    }

    pub fn validate(&self) -> std::result::Result<(), Vec<SshCertError>> {
        match self {
            PublicKeyField::Rsa(f) => f.validate(),
            PublicKeyField::Dsa(f) => f.validate(),
            PublicKeyField::Ecdsa(f) => f.validate(),
            PublicKeyField::Ed25519(f) => f.validate(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// The key's sub-fields, without the key type name.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            PublicKeyField::Rsa(f) => f.to_bytes(),
            PublicKeyField::Dsa(f) => f.to_bytes(),
            PublicKeyField::Ecdsa(f) => f.to_bytes(),
            PublicKeyField::Ed25519(f) => f.to_bytes(),
        }
    }

    /// Reads the sub-fields of a `kind` key.
    pub fn decode(kind: KeyKind, reader: &mut Reader<'_>) -> Result<PublicKey> {
        Ok(match kind {
            KeyKind::Rsa => PublicKey::Rsa(RsaPubkeyField::decode(reader)?),
            KeyKind::Dsa => PublicKey::Dsa(DsaPubkeyField::decode(reader)?),
            KeyKind::Ecdsa => PublicKey::Ecdsa(EcdsaPubkeyField::decode(reader)?),
            KeyKind::Ed25519 => PublicKey::Ed25519(Ed25519PubkeyField::decode(reader)?),
        })
    }

    /// Writes the sub-fields of `key`.
    pub fn encode_into(key: &PublicKey, out: &mut Vec<u8>) -> Result<()> {
        match key {
            PublicKey::Rsa(key) => RsaPubkeyField::encode_into(key, out),
            PublicKey::Dsa(key) => DsaPubkeyField::encode_into(key, out),
            PublicKey::Ecdsa(key) => EcdsaPubkeyField::encode_into(key, out),
            PublicKey::Ed25519(key) => Ed25519PubkeyField::encode_into(key, out),
        }
    }

    /// Writes the full blob: key type name, then the sub-fields.
    pub(crate) fn write_blob(key: &PublicKey, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(key.key_type().as_bytes())?;
        Self::encode_into(key, out)
    }

    pub(crate) fn read_blob(reader: &mut Reader<'_>) -> Result<PublicKey> {
        let key_type = reader.read_utf8()?;
        let kind = match key_type {
            "ssh-rsa" => KeyKind::Rsa,
            "ssh-dss" => KeyKind::Dsa,
            "ecdsa-sha2-nistp256" | "ecdsa-sha2-nistp384" | "ecdsa-sha2-nistp521" => {
                KeyKind::Ecdsa
            }
            "ssh-ed25519" => KeyKind::Ed25519,
            other => {
                return Err(SshCertError::InvalidData(format!(
                    "unsupported public key type {other:?}"
                )));
            }
        };
        let key = Self::decode(kind, reader)?;
        if key.key_type() != key_type {
            return Err(SshCertError::InvalidData(format!(
                "key blob is tagged {key_type:?} but holds a {} key",
                key.key_type()
            )));
        }
        Ok(key)
    }
}

impl fmt::Display for PublicKeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublicKeyField::Rsa(field) => field.fmt(f),
            PublicKeyField::Dsa(field) => field.fmt(f),
            PublicKeyField::Ecdsa(field) => field.fmt(f),
            PublicKeyField::Ed25519(field) => field.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeyPair;

    #[test]
    fn test_factory_picks_matching_field() {
        let field = PublicKeyField::from_key(KeyPair::generate_ed25519().public_key());
        assert!(matches!(field, PublicKeyField::Ed25519(_)));
        let field = PublicKeyField::from_key(KeyPair::generate_ecdsa_p384().public_key());
        assert!(matches!(field, PublicKeyField::Ecdsa(_)));
        assert!(field.is_valid());
    }

    #[test]
    fn test_ed25519_layout() {
        let key = KeyPair::generate_ed25519().public_key();
        let field = PublicKeyField::from_key(key.clone());
        let bytes = field.to_bytes().unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 32]);
        assert_eq!(bytes.len(), 36);

        let mut reader = Reader::new(&bytes);
        let decoded = PublicKeyField::decode(KeyKind::Ed25519, &mut reader).unwrap();
        assert!(reader.is_finished());
        assert_eq!(decoded.raw_bytes().unwrap(), key.raw_bytes().unwrap());
    }

    #[test]
    fn test_ecdsa_layout_starts_with_curve() {
        let key = KeyPair::generate_ecdsa_p256().public_key();
        let bytes = PublicKeyField::from_key(key).to_bytes().unwrap();
        assert_eq!(&bytes[..12], b"\x00\x00\x00\x08nistp256");
        // Uncompressed P-256 point: 0x04 || X || Y.
        assert_eq!(&bytes[12..17], &[0, 0, 0, 65, 0x04]);
    }

    #[test]
    fn test_display_is_kind_and_fingerprint() {
        let keys = [
            ("Rsa", KeyPair::generate_rsa(1024).unwrap()),
            ("Dsa", KeyPair::generate_dsa()),
            ("Ecdsa", KeyPair::generate_ecdsa_p521()),
            ("Ed25519", KeyPair::generate_ed25519()),
        ];
        for (name, pair) in keys {
            let key = pair.public_key();
            let field = PublicKeyField::from_key(key.clone());
            assert_eq!(
                field.to_string(),
                format!("{name} {}", key.fingerprint().unwrap())
            );

            let bytes = field.to_bytes().unwrap();
            let mut reader = Reader::new(&bytes);
            let decoded = PublicKeyField::decode(key.kind(), &mut reader).unwrap();
            assert!(reader.is_finished());
            assert_eq!(decoded.raw_bytes().unwrap(), key.raw_bytes().unwrap());
        }
    }

    #[test]
    fn test_blob_rejects_unknown_type() {
        let mut blob = Vec::new();
        blob.put_string(b"ssh-foo").unwrap();
        assert!(PublicKey::from_blob(&blob).unwrap_err().is_invalid_data());
    }

    #[test]
    fn test_truncated_blob_fails_closed() {
        let blob = KeyPair::generate_ed25519().public_key().to_blob().unwrap();
        assert!(PublicKey::from_blob(&blob[..blob.len() - 1]).is_err());
    }
}
