//! use sshcertkit::error::SshCertError;

use thiserror::Error;

/// Represents errors that can occur in the sshcertkit library.
///
/// Field validation collects these values without failing; strict encoding
/// and decoding return the first one encountered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SshCertError {
    /// Malformed, wrongly typed, unknown or missing data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A numeric value does not fit the field's declared width.
    #[error("Integer overflow: {0}")]
    IntegerOverflow(String),

    /// Error during data decoding, e.g. a truncated buffer.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error during key generation.
    #[error("Key generation error: {0}")]
    KeyGenerationError(String),

    /// Error while producing a signature.
    #[error("Signing error: {0}")]
    SigningError(String),

    /// A signature did not verify.
    #[error("Signature verification failed: {0}")]
    VerificationError(String),

    /// Error related to certificate operations.
    #[error("Certificate error: {0}")]
    CertificateError(String),

    /// Error from RSA operations.
    #[error("RSA error: {0}")]
    RsaError(String),

    /// Error while reading or writing a file.
    #[error("I/O error: {0}")]
    Io(String),
}

impl SshCertError {
    /// Returns true for every defect in the data itself.
    ///
    /// An [`SshCertError::IntegerOverflow`] is a range defect and therefore
    /// also counts as invalid data.
    pub fn is_invalid_data(&self) -> bool {
        matches!(
            self,
            SshCertError::InvalidData(_)
                | SshCertError::IntegerOverflow(_)
                | SshCertError::DecodingError(_)
        )
    }

    /// Returns true if the error is a range defect.
    pub fn is_overflow(&self) -> bool {
        matches!(self, SshCertError::IntegerOverflow(_))
    }
}

pub type Result<T> = std::result::Result<T, SshCertError>;

impl From<rsa::Error> for SshCertError {
    fn from(err: rsa::Error) -> Self {
        SshCertError::RsaError(err.to_string())
    }
}

impl From<std::io::Error> for SshCertError {
    fn from(err: std::io::Error) -> Self {
        SshCertError::Io(err.to_string())
    }
}

impl From<base64::DecodeError> for SshCertError {
    /// Converts a `base64::DecodeError` into an `SshCertError`.
    fn from(err: base64::DecodeError) -> Self {
        SshCertError::DecodingError(err.to_string())
    }
}
