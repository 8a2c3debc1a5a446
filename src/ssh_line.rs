//! OpenSSH single-line framing: `<type-tag> <base64> [comment]`.
//!
//! Used for `*.pub` public keys and `*-cert.pub` certificates alike.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Result, SshCertError};

/// A parsed OpenSSH line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshLine {
    pub type_tag: String,
    pub data: Vec<u8>,
    pub comment: Option<String>,
}

/// Formats `data` as one OpenSSH line, without a trailing newline.
pub fn encode_line(type_tag: &str, data: &[u8], comment: Option<&str>) -> String {
    let encoded = STANDARD.encode(data);
    match comment.filter(|c| !c.is_empty()) {
        Some(comment) => format!("{type_tag} {encoded} {comment}"),
        None => format!("{type_tag} {encoded}"),
    }
}

/// Parses one OpenSSH line; the comment may contain spaces.
pub fn decode_line(line: &str) -> Result<SshLine> {
    let mut parts = line.trim().splitn(3, char::is_whitespace);
    let type_tag = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| SshCertError::InvalidData("empty OpenSSH line".to_string()))?;
    let encoded = parts.next().ok_or_else(|| {
        SshCertError::InvalidData(format!("OpenSSH line for {type_tag} has no data"))
    })?;
    let data = STANDARD.decode(encoded)?;
    let comment = parts
        .next()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    Ok(SshLine {
        type_tag: type_tag.to_string(),
        data,
        comment,
    })
}
