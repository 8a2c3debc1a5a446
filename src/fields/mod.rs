//! Typed SSH wire fields.
//!
//! Every field type is a [`FieldCodec`]: a stateless unit type that knows
//! how to check, write and read one logical value. A [`Field`] wraps a
//! single input value and offers the two validation modes used throughout
//! the crate:
//!
//! - [`Field::validate`] never fails, it returns every defect it found.
//! - [`Field::to_bytes`] and [`FieldCodec::encode`] are strict and stop at
//!   the first defect, so no partial buffer is ever produced.
//!
//! Decoding is a cursor operation over one shared buffer:
//!
//! ```
//! use sshcertkit::encoding::Reader;
//! use sshcertkit::fields::{FieldCodec, Integer32Field, StringField};
//!
//! let mut buf = StringField::encode(&"hello".to_string()).unwrap();
//! buf.extend(Integer32Field::encode(&42).unwrap());
//!
//! let mut reader = Reader::new(&buf);
//! assert_eq!(StringField::decode(&mut reader).unwrap(), "hello");
//! assert_eq!(Integer32Field::decode(&mut reader).unwrap(), 42);
//! assert!(reader.is_finished());
//! ```

pub mod certificate;
pub mod primitives;
pub mod pubkey;

use std::fmt;

use crate::encoding::Reader;
use crate::error::{Result, SshCertError};

pub use certificate::{
    CaPublicKeyField, CertAlgorithm, CertType, CertificateTypeField, CriticalOptionsField,
    DEFAULT_NONCE_LEN, ExtensionsField, KeyIdField, NonceField, PrincipalsField,
    PubkeyTypeField, ReservedField, SerialField, SignatureField, ValidAfterField,
    ValidBeforeField,
};
pub use primitives::{
    BooleanField, BytestringField, DateTimeField, Integer32Field, Integer64Field, KeyValueField,
    ListField, MpIntegerField, StringField,
};
pub use pubkey::{
    DsaPubkeyField, EcdsaPubkeyField, Ed25519PubkeyField, PubkeyField, PublicKeyField,
    RsaPubkeyField,
};

/// Encoding contract shared by all wire fields.
pub trait FieldCodec {
    /// The logical value carried by the field.
    type Value: Clone + fmt::Debug;

    /// Human readable field name used in error messages.
    const NAME: &'static str;

    /// Returns every defect of `value`; an empty vector means valid.
    fn check(_value: &Self::Value) -> Vec<SshCertError> {
        Vec::new()
    }

    /// Appends the wire form of an already checked value.
    fn write(value: &Self::Value, out: &mut Vec<u8>) -> Result<()>;

    /// Reads one value at the reader's position.
    fn read(reader: &mut Reader<'_>) -> Result<Self::Value>;

    /// Checks `value` and appends its wire form to `out`.
    fn encode_into(value: &Self::Value, out: &mut Vec<u8>) -> Result<()> {
        if let Some(defect) = Self::check(value).into_iter().next() {
            return Err(defect);
        }
        Self::write(value, out)
    }

    /// Checks `value` and returns its wire form.
    fn encode(value: &Self::Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        Self::encode_into(value, &mut out)?;
        Ok(out)
    }

    /// Reads one value and rejects it if it fails the field's checks.
    fn decode(reader: &mut Reader<'_>) -> Result<Self::Value> {
        let value = Self::read(reader)?;
        match Self::check(&value).into_iter().next() {
            Some(defect) => Err(defect),
            None => Ok(value),
        }
    }

    /// Decodes a value from the front of `bytes` and returns the rest.
    fn decode_prefix(bytes: &[u8]) -> Result<(Self::Value, &[u8])> {
        let mut reader = Reader::new(bytes);
        let value = Self::decode(&mut reader)?;
        Ok((value, reader.remaining()))
    }
}

/// Codecs whose values can be read from text, e.g. configuration input.
pub trait ParseField: FieldCodec {
    fn parse_value(text: &str) -> Result<Self::Value>;
}

/// Codecs holding an unsigned integer narrower than 128 bits.
pub trait IntegerField: FieldCodec {
    /// Narrows `value`, reporting an overflow if it does not fit.
    fn from_wide(value: u128) -> Result<Self::Value>;
}

/// Parses an unsigned decimal integer, separating overflow from bad input.
pub(crate) fn parse_integer<C: IntegerField>(text: &str) -> Result<C::Value> {
    use std::num::IntErrorKind;

    match text.trim().parse::<u128>() {
        Ok(wide) => C::from_wide(wide),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Err(SshCertError::IntegerOverflow(
            format!("{} value {text:?} exceeds 128 bits", C::NAME),
        )),
        Err(e) => Err(SshCertError::InvalidData(format!(
            "{} expects an unsigned integer, got {text:?}: {e}",
            C::NAME
        ))),
    }
}

/// A single field value together with its input defects.
#[derive(Clone, Debug)]
pub struct Field<C: FieldCodec> {
    input: Result<C::Value>,
}

impl<C: FieldCodec> Field<C> {
    pub fn new(value: C::Value) -> Self {
        Self { input: Ok(value) }
    }

    /// The value, if the input could be converted to the field's type.
    pub fn value(&self) -> Option<&C::Value> {
        self.input.as_ref().ok()
    }

    /// Collects every defect of the field without failing.
    pub fn validate(&self) -> std::result::Result<(), Vec<SshCertError>> {
        let defects = match &self.input {
            Ok(value) => C::check(value),
            Err(e) => vec![e.clone()],
        };
        if defects.is_empty() {
            Ok(())
        } else {
            Err(defects)
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Strict serialization; returns the first defect instead of bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match &self.input {
            Ok(value) => C::encode(value),
            Err(e) => Err(e.clone()),
        }
    }
}

impl<C: ParseField> Field<C> {
    /// Builds a field from text; unparsable input becomes a defect.
    pub fn parse(text: &str) -> Self {
        Self {
            input: C::parse_value(text),
        }
    }
}

impl<C: IntegerField> Field<C> {
    /// Builds a field from a wide integer; values that do not fit become
    /// an overflow defect.
    pub fn from_u128(value: u128) -> Self {
        Self {
            input: C::from_wide(value),
        }
    }
}
