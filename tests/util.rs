use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use sshcertkit::cert::params::CertificateFields;
use sshcertkit::fields::CertType;
use sshcertkit::key::KeyPair;

/// One key per algorithm family, generated once per test binary.
fn generate_keys() -> Vec<KeyPair> {
    vec![
        KeyPair::generate_rsa(2048).expect("Failed to generate RSA key"),
        KeyPair::generate_dsa(),
        KeyPair::generate_ecdsa_p256(),
        KeyPair::generate_ed25519(),
    ]
}

pub fn ca_keys() -> &'static [KeyPair] {
    static KEYS: OnceLock<Vec<KeyPair>> = OnceLock::new();
    KEYS.get_or_init(generate_keys)
}

pub fn subject_keys() -> &'static [KeyPair] {
    static KEYS: OnceLock<Vec<KeyPair>> = OnceLock::new();
    KEYS.get_or_init(generate_keys)
}

pub fn ed25519_ca() -> &'static KeyPair {
    static KEY: OnceLock<KeyPair> = OnceLock::new();
    KEY.get_or_init(KeyPair::generate_ed25519)
}

/// The fields of a fully populated user certificate.
pub fn cert_fields() -> CertificateFields {
    CertificateFields::builder()
        .serial(1234567890)
        .cert_type(CertType::User)
        .key_id("KeyIdentifier")
        .principals(vec![
            "pr_a".to_string(),
            "pr_b".to_string(),
            "pr_c".to_string(),
        ])
        .valid_after(1968491468)
        .valid_before(1968534668)
        .critical_options(BTreeMap::from([
            ("force-command".to_string(), "sftp-internal".to_string()),
            (
                "source-address".to_string(),
                "1.2.3.4/8,5.6.7.8/16".to_string(),
            ),
            ("verify-required".to_string(), String::new()),
        ]))
        .extensions(BTreeSet::from([
            "permit-agent-forwarding".to_string(),
            "permit-X11-forwarding".to_string(),
        ]))
        .build()
}
