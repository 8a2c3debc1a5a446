use std::collections::BTreeMap;

use sshcertkit::cert::extensions::Extension;
use sshcertkit::cert::params::{CertificateFields, Validity};
use sshcertkit::error::SshCertError;
use sshcertkit::fields::CertType;
use sshcertkit::issuer::Issuer;
use sshcertkit::key::KeyPair;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), SshCertError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sshcertkit=debug")),
        )
        .init();

    // Generate a key pair for the CA using Ed25519 (or choose RSA/ECDSA/DSA)
    let ca_key = KeyPair::generate_ed25519();
    println!("CA public key:\n{}\n", ca_key.public_key().to_openssh(Some("demo-ca"))?);

    // A user certificate with the usual ssh-keygen grants, forced into SFTP, valid for a week
    let user_key = KeyPair::generate_ecdsa_p256();
    let user_fields = CertificateFields::builder()
        .serial(1)
        .cert_type(CertType::User)
        .key_id("alice@example.com")
        .principals(vec!["alice".to_string()])
        .critical_options(BTreeMap::from([(
            "force-command".to_string(),
            "internal-sftp".to_string(),
        )]))
        .extensions(Extension::defaults().iter().map(|e| e.to_string()).collect())
        .build()
        .with_validity(&Validity::for_days(7))?;

    let user_cert = ca_key.issue(&user_key.public_key(), user_fields)?;
    println!("{user_cert}\n");
    println!("{}\n", user_cert.to_string_with_comment(Some("alice"))?);

    // A host certificate signed with the same CA
    let host_key = KeyPair::generate_rsa(2048)?;
    let host_fields = CertificateFields::builder()
        .serial(2)
        .cert_type(CertType::Host)
        .key_id("web01")
        .principals(vec!["web01.example.com".to_string()])
        .build();

    let host_cert = ca_key.issue(&host_key.public_key(), host_fields)?;
    println!("{}", host_cert.to_string_with_comment(Some("web01"))?);

    Ok(())
}
