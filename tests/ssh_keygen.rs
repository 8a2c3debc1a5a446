mod util;

use std::process::Command;

use regex::Regex;
use sshcertkit::cert::Certificate;
use sshcertkit::fields::CertAlgorithm;
use sshcertkit::issuer::Issuer;
use sshcertkit::key::KeyKind;

/// Lets OpenSSH parse every subject/CA combination we produce.
#[test]
#[ignore = "requires ssh-keygen on PATH"]
fn test_ssh_keygen_reads_certificates() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");

    for (i, ca) in util::ca_keys().iter().enumerate() {
        for (j, subject) in util::subject_keys().iter().enumerate() {
            let cert = ca
                .issue(&subject.public_key(), util::cert_fields())
                .expect("Failed to issue certificate");
            let path = dir.path().join(format!("cert_{i}_{j}-cert.pub"));
            cert.to_file(&path, Some("test@sshcertkit"))
                .expect("Failed to write certificate");

            let output = Command::new("ssh-keygen")
                .arg("-L")
                .arg("-f")
                .arg(&path)
                .output()
                .expect("Failed to execute ssh-keygen");

            assert!(
                output.status.success(),
                "ssh-keygen failed for {} CA / {} subject: {}",
                ca.kind(),
                subject.kind(),
                String::from_utf8_lossy(&output.stderr)
            );
            let output_text = String::from_utf8_lossy(&output.stdout);

            // ssh-keygen prints every RSA certificate under the legacy tag.
            let printed_tag = match cert.kind() {
                KeyKind::Rsa => CertAlgorithm::SshRsaCert,
                _ => cert.pubkey_type(),
            };
            assert!(
                output_text.contains(&format!("Type: {printed_tag} user certificate")),
                "Type line is incorrect:\n{output_text}"
            );
            assert!(
                output_text.contains("Key ID: \"KeyIdentifier\""),
                "Key ID is incorrect"
            );
            assert!(
                output_text.contains("Serial: 1234567890"),
                "Serial is incorrect"
            );

            let fingerprint = ca.fingerprint().expect("fingerprint");
            let signing_ca = Regex::new(r"Signing CA: \S+ (SHA256:\S+) \(using (\S+)\)").unwrap();
            let captures = signing_ca
                .captures(&output_text)
                .expect("Signing CA line missing");
            assert_eq!(&captures[1], fingerprint);
            assert_eq!(
                Some(&captures[2]),
                cert.signature_algorithm().map(|a| a.as_str())
            );

            for principal in ["pr_a", "pr_b", "pr_c"] {
                let line = Regex::new(&format!(r"(?m)^\s+{principal}$")).unwrap();
                assert!(line.is_match(&output_text), "principal {principal} missing");
            }
            let force_command = Regex::new(r"force-command\s+sftp-internal").unwrap();
            assert!(force_command.is_match(&output_text));
            assert!(output_text.contains("permit-X11-forwarding"));

            // Our own parser reads the same file.
            let reloaded = Certificate::from_file(&path).expect("Failed to reload");
            reloaded.verify().expect("signature must verify");
        }
    }
}
