//! # SshCertKit - A Pure Rust OpenSSH Certificate Library
//!
//! SshCertKit creates, encodes, decodes and signs OpenSSH certificates
//! (`*-cert-v01@openssh.com`) using only rustcrypto libraries, without
//! OpenSSL or ring. Certificates it writes are accepted by `ssh-keygen -L`
//! and `sshd`.
//!
//! ## Supported Key Types
//!
//! Both the subject key and the CA key may be any of:
//! - **RSA**: signed with `rsa-sha2-512` (default), `rsa-sha2-256` or `ssh-rsa`
//! - **DSA**: 1024-bit `ssh-dss`
//! - **ECDSA**: P-256, P-384, and P-521 curves
//! - **Ed25519**: Edwards curve digital signature algorithm
//!
//! ## Quick Start
//!
//! ### Issuing a User Certificate
//!
//! ```rust
//! use std::collections::{BTreeMap, BTreeSet};
//!
//! use sshcertkit::{
//!     cert::{Certificate, params::CertificateFields},
//!     fields::CertType,
//!     issuer::Issuer,
//!     key::KeyPair,
//! };
//!
//! # fn main() -> Result<(), sshcertkit::error::SshCertError> {
//! let ca_key = KeyPair::generate_ed25519();
//! let user_key = KeyPair::generate_ecdsa_p256();
//!
//! let fields = CertificateFields::builder()
//!     .serial(1)
//!     .cert_type(CertType::User)
//!     .key_id("alice@example.com")
//!     .principals(vec!["alice".to_string()])
//!     .critical_options(BTreeMap::from([(
//!         "force-command".to_string(),
//!         "sftp-internal".to_string(),
//!     )]))
//!     .extensions(BTreeSet::from(["permit-pty".to_string()]))
//!     .build();
//!
//! let cert = ca_key.issue(&user_key.public_key(), fields)?;
//! let line = cert.to_string_with_comment(Some("alice"))?;
//! assert!(line.starts_with("ecdsa-sha2-nistp256-cert-v01@openssh.com "));
//!
//! // Reading it back yields the same signed data.
//! let parsed = Certificate::from_string(&line)?;
//! assert_eq!(parsed.get_signable()?, cert.get_signable()?);
//! parsed.verify()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Validating Before Signing
//!
//! Every field can report all of its defects at once, while serialization
//! stops at the first one:
//!
//! ```rust
//! use sshcertkit::fields::{Field, SerialField};
//!
//! let serial = Field::<SerialField>::parse("not a number");
//! let defects = serial.validate().unwrap_err();
//! assert!(defects[0].is_invalid_data());
//! assert!(serial.to_bytes().is_err());
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: Key generation, fingerprints, signing and verification
//! - [`fields`]: Typed wire fields with validation, encoding and decoding
//! - [`cert`]: Certificate composition, signing and (de)serialization
//! - [`issuer`]: Certificate issuing by a CA key
//! - [`encoding`]: Low-level SSH wire reader and writer
//! - [`ssh_line`]: The OpenSSH `<type> <base64> [comment]` line format
//! - [`error`]: Error types

pub mod cert;
pub mod encoding;
pub mod error;
pub mod fields;
pub mod issuer;
pub mod key;
pub mod ssh_line;
