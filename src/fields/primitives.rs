//! Atomic and composite wire values every SSH field is built from.

use std::collections::BTreeMap;

use rsa::BigUint;
use time::OffsetDateTime;

use super::{FieldCodec, IntegerField, ParseField, parse_integer};
use crate::encoding::{Reader, WriteExt};
use crate::error::{Result, SshCertError};

/// One byte, `0x00` is false and anything else is true.
#[derive(Debug, Clone, Copy)]
pub struct BooleanField;

impl FieldCodec for BooleanField {
    type Value = bool;
    const NAME: &'static str = "boolean";

    fn write(value: &bool, out: &mut Vec<u8>) -> Result<()> {
        out.put_u8(u8::from(*value));
        Ok(())
    }

    fn read(reader: &mut Reader<'_>) -> Result<bool> {
        Ok(reader.read_u8()? != 0)
    }
}

impl ParseField for BooleanField {
    fn parse_value(text: &str) -> Result<bool> {
        match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(SshCertError::InvalidData(format!(
                "boolean expects true or false, got {text:?}"
            ))),
        }
    }
}

/// Big-endian `uint32`.
#[derive(Debug, Clone, Copy)]
pub struct Integer32Field;

impl FieldCodec for Integer32Field {
    type Value = u32;
    const NAME: &'static str = "uint32";

    fn write(value: &u32, out: &mut Vec<u8>) -> Result<()> {
        out.put_u32(*value);
        Ok(())
    }

    fn read(reader: &mut Reader<'_>) -> Result<u32> {
        reader.read_u32()
    }
}

impl IntegerField for Integer32Field {
    fn from_wide(value: u128) -> Result<u32> {
        u32::try_from(value).map_err(|_| {
            SshCertError::IntegerOverflow(format!("{value} exceeds the uint32 maximum {}", u32::MAX))
        })
    }
}

impl ParseField for Integer32Field {
    fn parse_value(text: &str) -> Result<u32> {
        parse_integer::<Self>(text)
    }
}

/// Big-endian `uint64`.
#[derive(Debug, Clone, Copy)]
pub struct Integer64Field;

impl FieldCodec for Integer64Field {
    type Value = u64;
    const NAME: &'static str = "uint64";

    fn write(value: &u64, out: &mut Vec<u8>) -> Result<()> {
        out.put_u64(*value);
        Ok(())
    }

    fn read(reader: &mut Reader<'_>) -> Result<u64> {
        reader.read_u64()
    }
}

impl IntegerField for Integer64Field {
    fn from_wide(value: u128) -> Result<u64> {
        u64::try_from(value).map_err(|_| {
            SshCertError::IntegerOverflow(format!("{value} exceeds the uint64 maximum {}", u64::MAX))
        })
    }
}

impl ParseField for Integer64Field {
    fn parse_value(text: &str) -> Result<u64> {
        parse_integer::<Self>(text)
    }
}

/// Length-prefixed raw bytes.
#[derive(Debug, Clone, Copy)]
pub struct BytestringField;

impl FieldCodec for BytestringField {
    type Value = Vec<u8>;
    const NAME: &'static str = "bytestring";

    fn write(value: &Vec<u8>, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(value)
    }

    fn read(reader: &mut Reader<'_>) -> Result<Vec<u8>> {
        Ok(reader.read_string()?.to_vec())
    }
}

/// Length-prefixed UTF-8 text.
#[derive(Debug, Clone, Copy)]
pub struct StringField;

impl FieldCodec for StringField {
    type Value = String;
    const NAME: &'static str = "string";

    fn write(value: &String, out: &mut Vec<u8>) -> Result<()> {
        out.put_string(value.as_bytes())
    }

    fn read(reader: &mut Reader<'_>) -> Result<String> {
        Ok(reader.read_utf8()?.to_string())
    }
}

/// A point in time stored as a `uint64` count of seconds since the epoch.
#[derive(Debug, Clone, Copy)]
pub struct DateTimeField;

impl FieldCodec for DateTimeField {
    type Value = OffsetDateTime;
    const NAME: &'static str = "datetime";

    fn check(value: &OffsetDateTime) -> Vec<SshCertError> {
        let mut defects = Vec::new();
        if value.unix_timestamp() < 0 {
            defects.push(SshCertError::InvalidData(format!(
                "datetime {value} is before the UNIX epoch"
            )));
        }
        if value.nanosecond() != 0 {
            defects.push(SshCertError::InvalidData(format!(
                "datetime {value} has sub-second precision the wire format cannot hold"
            )));
        }
        defects
    }

    fn write(value: &OffsetDateTime, out: &mut Vec<u8>) -> Result<()> {
        let seconds = u64::try_from(value.unix_timestamp()).map_err(|_| {
            SshCertError::InvalidData(format!("datetime {value} is before the UNIX epoch"))
        })?;
        out.put_u64(seconds);
        Ok(())
    }

    fn read(reader: &mut Reader<'_>) -> Result<OffsetDateTime> {
        let seconds = reader.read_u64()?;
        let seconds = i64::try_from(seconds).map_err(|_| {
            SshCertError::IntegerOverflow(format!("timestamp {seconds} is out of range"))
        })?;
        OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|e| SshCertError::InvalidData(format!("timestamp {seconds}: {e}")))
    }
}

impl ParseField for DateTimeField {
    fn parse_value(text: &str) -> Result<OffsetDateTime> {
        let seconds = parse_integer::<Integer64Field>(text)?;
        let seconds = i64::try_from(seconds).map_err(|_| {
            SshCertError::IntegerOverflow(format!("timestamp {seconds} is out of range"))
        })?;
        OffsetDateTime::from_unix_timestamp(seconds)
            .map_err(|e| SshCertError::InvalidData(format!("timestamp {seconds}: {e}")))
    }
}

/// Multi-precision non-negative integer (`mpint`).
#[derive(Debug, Clone, Copy)]
pub struct MpIntegerField;

impl FieldCodec for MpIntegerField {
    type Value = BigUint;
    const NAME: &'static str = "mpint";

    fn write(value: &BigUint, out: &mut Vec<u8>) -> Result<()> {
        write_mpint(value, out)
    }

    fn read(reader: &mut Reader<'_>) -> Result<BigUint> {
        read_mpint(reader)
    }
}

impl IntegerField for MpIntegerField {
    fn from_wide(value: u128) -> Result<BigUint> {
        Ok(BigUint::from_bytes_be(&value.to_be_bytes()))
    }
}

impl ParseField for MpIntegerField {
    fn parse_value(text: &str) -> Result<BigUint> {
        let text = text.trim();
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SshCertError::InvalidData(format!(
                "mpint expects a non-negative decimal integer, got {text:?}"
            )));
        }
        BigUint::parse_bytes(text.as_bytes(), 10).ok_or_else(|| {
            SshCertError::InvalidData(format!("mpint could not parse {text:?}"))
        })
    }
}

/// Strings concatenated inside one length-prefixed blob.
#[derive(Debug, Clone, Copy)]
pub struct ListField;

impl FieldCodec for ListField {
    type Value = Vec<String>;
    const NAME: &'static str = "list";

    fn write(value: &Vec<String>, out: &mut Vec<u8>) -> Result<()> {
        write_list(value.iter().map(String::as_str), out)
    }

    fn read(reader: &mut Reader<'_>) -> Result<Vec<String>> {
        read_list(reader)
    }
}

/// Name/value pairs inside one length-prefixed blob.
///
/// Non-empty values are wrapped in an inner string, an empty value is an
/// empty string.
#[derive(Debug, Clone, Copy)]
pub struct KeyValueField;

impl FieldCodec for KeyValueField {
    type Value = BTreeMap<String, String>;
    const NAME: &'static str = "key-value map";

    fn check(value: &BTreeMap<String, String>) -> Vec<SshCertError> {
        value
            .keys()
            .filter(|k| k.is_empty())
            .map(|_| SshCertError::InvalidData("key-value map has an empty name".to_string()))
            .collect()
    }

    fn write(value: &BTreeMap<String, String>, out: &mut Vec<u8>) -> Result<()> {
        write_pairs(value, out)
    }

    fn read(reader: &mut Reader<'_>) -> Result<BTreeMap<String, String>> {
        read_pairs(reader)
    }
}

pub(crate) fn write_mpint(value: &BigUint, out: &mut Vec<u8>) -> Result<()> {
    if value.bits() == 0 {
        return out.put_string(&[]);
    }
    let mut bytes = value.to_bytes_be();
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    out.put_string(&bytes)
}

pub(crate) fn read_mpint(reader: &mut Reader<'_>) -> Result<BigUint> {
    let bytes = reader.read_string()?;
    if bytes.first().is_some_and(|b| b & 0x80 != 0) {
        return Err(SshCertError::InvalidData(
            "mpint is negative, only non-negative integers are supported".to_string(),
        ));
    }
    Ok(BigUint::from_bytes_be(bytes))
}

pub(crate) fn write_list<'a>(
    items: impl IntoIterator<Item = &'a str>,
    out: &mut Vec<u8>,
) -> Result<()> {
    let mut inner = Vec::new();
    for item in items {
        inner.put_string(item.as_bytes())?;
    }
    out.put_string(&inner)
}

pub(crate) fn read_list(reader: &mut Reader<'_>) -> Result<Vec<String>> {
    let mut inner = Reader::new(reader.read_string()?);
    let mut items = Vec::new();
    while !inner.is_finished() {
        items.push(inner.read_utf8()?.to_string());
    }
    Ok(items)
}

pub(crate) fn write_pairs(pairs: &BTreeMap<String, String>, out: &mut Vec<u8>) -> Result<()> {
    let mut inner = Vec::new();
    for (name, value) in pairs {
        inner.put_string(name.as_bytes())?;
        if value.is_empty() {
            inner.put_string(&[])?;
        } else {
            let mut data = Vec::new();
            data.put_string(value.as_bytes())?;
            inner.put_string(&data)?;
        }
    }
    out.put_string(&inner)
}

pub(crate) fn read_pairs(reader: &mut Reader<'_>) -> Result<BTreeMap<String, String>> {
    let mut inner = Reader::new(reader.read_string()?);
    let mut pairs = BTreeMap::new();
    while !inner.is_finished() {
        let name = inner.read_utf8()?.to_string();
        let data = inner.read_string()?;
        let value = if data.is_empty() {
            String::new()
        } else {
            let mut data = Reader::new(data);
            let value = data.read_utf8()?.to_string();
            data.finish()?;
            value
        };
        if pairs.insert(name.clone(), value).is_some() {
            return Err(SshCertError::InvalidData(format!(
                "name {name:?} appears more than once"
            )));
        }
    }
    Ok(pairs)
}
