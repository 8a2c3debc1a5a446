mod util;

use std::collections::BTreeMap;

use rand_core::{CryptoRng, RngCore};
use sshcertkit::cert::Certificate;
use sshcertkit::cert::params::CertificateFields;
use sshcertkit::error::{Result, SshCertError};
use sshcertkit::fields::{CertAlgorithm, CertType};
use sshcertkit::issuer::Issuer;
use sshcertkit::key::{KeyPair, SignatureAlgorithm};

/// Fills buffers with an incrementing byte so nonces are reproducible.
struct CountingRng(u8);

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        rand_core::impls::next_u32_via_fill(self)
    }

    fn next_u64(&mut self) -> u64 {
        rand_core::impls::next_u64_via_fill(self)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest {
            *byte = self.0;
            self.0 = self.0.wrapping_add(1);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for CountingRng {}

/// Signs, serializes and reloads a certificate for every pair of CA and
/// subject algorithms.
#[test]
fn certificate_matrix_round_trip() -> Result<()> {
    for ca in util::ca_keys() {
        for subject in util::subject_keys() {
            let subject_key = subject.public_key();
            let mut cert = Certificate::create(&subject_key, Some(ca), Some(util::cert_fields()));
            assert_eq!(cert.kind(), subject.kind());
            assert!(cert.can_sign(), "{} CA / {} subject", ca.kind(), subject.kind());

            cert.sign()?;
            let signable = cert.get_signable()?;
            let bytes = cert.to_bytes()?;
            assert!(bytes.starts_with(&signable));

            let reloaded = Certificate::from_bytes(&bytes)?;
            assert_eq!(reloaded.get_signable()?, signable);
            assert_eq!(reloaded.pubkey_type(), cert.pubkey_type());
            assert_eq!(reloaded.fields(), cert.fields());
            assert_eq!(
                reloaded.subject_public_key().raw_bytes()?,
                subject_key.raw_bytes()?
            );
            assert_eq!(reloaded.ca_public_key(), Some(ca.public_key()));
            assert_eq!(reloaded.to_bytes()?, bytes);
            reloaded.verify()?;
        }
    }
    Ok(())
}

#[test]
fn example_scenario_survives_file_round_trip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("id_ecdsa-cert.pub");

    let subject = KeyPair::generate_ecdsa_p384();
    let cert = util::ed25519_ca().issue(&subject.public_key(), util::cert_fields())?;
    cert.to_file(&path, Some("user@example"))?;

    let contents = std::fs::read_to_string(&path)?;
    assert!(contents.starts_with("ecdsa-sha2-nistp384-cert-v01@openssh.com AAAA"));
    assert!(contents.ends_with(" user@example\n"));

    let loaded = Certificate::from_file(&path)?;
    assert_eq!(loaded.get_signable()?, cert.get_signable()?);

    let fields = loaded.fields().expect("decoded certificates carry fields");
    assert_eq!(fields.serial(), 1234567890);
    assert_eq!(fields.key_id(), "KeyIdentifier");
    assert_eq!(fields.principals(), ["pr_a", "pr_b", "pr_c"]);
    assert_eq!(fields.valid_after(), 1968491468);
    assert_eq!(fields.valid_before(), 1968534668);
    assert_eq!(fields.critical_options()["force-command"], "sftp-internal");
    assert_eq!(fields.critical_options()["verify-required"], "");
    assert!(fields.extensions().contains("permit-X11-forwarding"));
    Ok(())
}

#[test]
fn host_certificate_type() -> Result<()> {
    let fields = CertificateFields::builder()
        .cert_type(CertType::Host)
        .key_id("web01")
        .principals(vec!["web01.example.com".to_string()])
        .build();
    let host = KeyPair::generate_ed25519();
    let cert = util::ed25519_ca().issue(&host.public_key(), fields)?;

    let reloaded = Certificate::from_bytes(&cert.to_bytes()?)?;
    assert_eq!(reloaded.fields().map(|f| f.cert_type()), Some(CertType::Host));
    assert!(reloaded.to_string().contains("host certificate"));
    Ok(())
}

#[test]
fn rsa_tags_and_signature_algorithms() -> Result<()> {
    let rsa = &util::ca_keys()[0];
    let subject = rsa.public_key();
    let cases = [
        (CertAlgorithm::SshRsaCert, SignatureAlgorithm::SshRsa),
        (CertAlgorithm::RsaSha2_256Cert, SignatureAlgorithm::RsaSha2_256),
        (CertAlgorithm::RsaSha2_512Cert, SignatureAlgorithm::RsaSha2_512),
    ];
    for (tag, algorithm) in cases {
        let mut cert = Certificate::create(&subject, Some(rsa), Some(util::cert_fields()));
        cert.set_pubkey_type(tag)?;
        cert.set_signature_algorithm(algorithm)?;
        cert.sign()?;

        let reloaded = Certificate::from_bytes(&cert.to_bytes()?)?;
        assert_eq!(reloaded.pubkey_type(), tag);
        assert_eq!(reloaded.signature_algorithm(), Some(algorithm));
        reloaded.verify()?;
    }
    Ok(())
}

#[test]
fn all_ecdsa_curves_sign_and_verify() -> Result<()> {
    let keys = [
        KeyPair::generate_ecdsa_p256(),
        KeyPair::generate_ecdsa_p384(),
        KeyPair::generate_ecdsa_p521(),
    ];
    for ca in &keys {
        for subject in &keys {
            let cert = ca.issue(&subject.public_key(), util::cert_fields())?;
            Certificate::from_bytes(&cert.to_bytes()?)?.verify()?;
        }
    }
    Ok(())
}

#[test]
fn injected_rng_makes_output_reproducible() -> Result<()> {
    let ca = util::ed25519_ca();
    let subject = KeyPair::generate_ed25519().public_key();

    let mut first = Certificate::create_with_rng(
        &mut CountingRng(0),
        &subject,
        Some(ca),
        Some(util::cert_fields()),
    );
    let mut second = Certificate::create_with_rng(
        &mut CountingRng(0),
        &subject,
        Some(ca),
        Some(util::cert_fields()),
    );
    assert_eq!(first.nonce(), (0u8..32).collect::<Vec<_>>());

    first.sign()?;
    second.sign()?;
    assert_eq!(first.to_bytes()?, second.to_bytes()?);

    second.set_nonce(b"abcdefghijklmnopqrstuvwxyzabcdefghijklmnopqrstuvwxyz".to_vec());
    second.sign()?;
    assert_ne!(first.to_bytes()?, second.to_bytes()?);
    Ok(())
}

#[test]
fn invalid_fields_block_signing() {
    let fields = CertificateFields::builder()
        .key_id("bad")
        .critical_options(BTreeMap::from([(
            "InvalidOption".to_string(),
            String::new(),
        )]))
        .build();
    let subject = KeyPair::generate_ed25519().public_key();
    let mut cert = Certificate::create(&subject, Some(util::ed25519_ca()), Some(fields));

    assert!(!cert.can_sign());
    let defects = cert.validate().unwrap_err();
    assert_eq!(defects.len(), 1);
    assert!(matches!(defects[0], SshCertError::InvalidData(_)));
    assert!(cert.sign().unwrap_err().is_invalid_data());
    assert!(cert.signature().is_none());
}

#[test]
fn tampered_certificate_fails_verification() -> Result<()> {
    let subject = KeyPair::generate_ed25519().public_key();
    let cert = util::ed25519_ca().issue(&subject, util::cert_fields())?;
    let mut bytes = cert.to_bytes()?;

    // The serial follows the type tag, nonce and subject key.
    let serial_at = 4 + 32 + 4 + 32 + 4 + 32;
    assert_eq!(&bytes[serial_at..serial_at + 8], &1234567890u64.to_be_bytes());
    bytes[serial_at + 7] ^= 1;

    let tampered = Certificate::from_bytes(&bytes)?;
    assert!(matches!(
        tampered.verify().unwrap_err(),
        SshCertError::VerificationError(_)
    ));
    Ok(())
}

#[test]
fn resigning_a_decoded_certificate() -> Result<()> {
    let subject = KeyPair::generate_ed25519().public_key();
    let cert = util::ed25519_ca().issue(&subject, util::cert_fields())?;
    let decoded = Certificate::from_bytes(&cert.to_bytes()?)?;
    assert!(!decoded.can_sign());

    let new_ca = KeyPair::generate_ecdsa_p256();
    let mut resigned = decoded.with_ca(&new_ca);
    assert!(resigned.signature().is_none());
    resigned.sign()?;
    resigned.verify()?;
    assert_eq!(resigned.nonce(), cert.nonce());
    assert_eq!(resigned.ca_public_key(), Some(new_ca.public_key()));
    Ok(())
}

#[test]
fn concurrent_issuing_from_one_ca() -> Result<()> {
    let ca = util::ed25519_ca();
    let subjects: Vec<KeyPair> = (0..8).map(|_| KeyPair::generate_ed25519()).collect();

    let certs = std::thread::scope(|scope| {
        let handles: Vec<_> = subjects
            .iter()
            .enumerate()
            .map(|(serial, subject)| {
                scope.spawn(move || {
                    let fields = CertificateFields::builder()
                        .serial(serial as u64)
                        .key_id(format!("worker-{serial}"))
                        .build();
                    ca.issue(&subject.public_key(), fields)
                        .and_then(|cert| cert.to_bytes())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("issuing thread panicked"))
            .collect::<Result<Vec<_>>>()
    })?;

    for (serial, bytes) in certs.iter().enumerate() {
        let cert = Certificate::from_bytes(bytes)?;
        cert.verify()?;
        assert_eq!(cert.fields().map(|f| f.serial()), Some(serial as u64));
    }
    Ok(())
}
