use crate::cert::Certificate;
use crate::cert::params::CertificateFields;
use crate::error::Result;
use crate::key::{KeyPair, PublicKey};

/// Represents an entity capable of issuing certificates.
///
/// The CA key is only borrowed: an issued certificate lives no longer than
/// its issuer. Implementors that are `Sync` can issue from several threads
/// at once, each call building its own certificate.
pub trait Issuer {
    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &KeyPair;

    /// Creates and signs a certificate for `subject`.
    ///
    /// # Example
    /// ```
    /// use sshcertkit::cert::params::CertificateFields;
    /// use sshcertkit::issuer::Issuer;
    /// use sshcertkit::key::KeyPair;
    ///
    /// let ca = KeyPair::generate_ed25519();
    /// let host = KeyPair::generate_ed25519();
    /// let cert = ca
    ///     .issue(&host.public_key(), CertificateFields::builder().key_id("web01").build())
    ///     .unwrap();
    /// assert!(cert.verify().is_ok());
    /// ```
    fn issue(&self, subject: &PublicKey, fields: CertificateFields) -> Result<Certificate<'_>> {
        let mut cert = Certificate::create(subject, Some(self.signing_key()), Some(fields));
        cert.sign()?;
        Ok(cert)
    }
}

impl Issuer for KeyPair {
    fn signing_key(&self) -> &KeyPair {
        self
    }
}
