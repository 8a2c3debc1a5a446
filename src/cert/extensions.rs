use std::fmt;
use std::str::FromStr;

use crate::error::SshCertError;

/// Critical options an SSH server must understand or reject the certificate.
///
/// # Example
/// ```
/// use sshcertkit::cert::extensions::CriticalOption;
/// let opt: CriticalOption = "force-command".parse().unwrap();
/// assert_eq!(opt, CriticalOption::ForceCommand);
/// assert!(opt.requires_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CriticalOption {
    /// Command executed instead of the one the user asked for.
    ForceCommand,
    /// Comma separated CIDR list the certificate may be used from.
    SourceAddress,
    /// Requires user verification (e.g. a FIDO PIN) on each signature.
    VerifyRequired,
}

impl CriticalOption {
    pub const ALL: [CriticalOption; 3] = [
        CriticalOption::ForceCommand,
        CriticalOption::SourceAddress,
        CriticalOption::VerifyRequired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CriticalOption::ForceCommand => "force-command",
            CriticalOption::SourceAddress => "source-address",
            CriticalOption::VerifyRequired => "verify-required",
        }
    }

    /// `force-command` and `source-address` carry data, `verify-required`
    /// is a flag with an empty value.
    pub fn requires_value(&self) -> bool {
        !matches!(self, CriticalOption::VerifyRequired)
    }

    /// Returns the defect of `value` under this option, if any.
    pub(crate) fn check_value(&self, value: &str) -> Option<SshCertError> {
        match (self.requires_value(), value.is_empty()) {
            (true, true) => Some(SshCertError::InvalidData(format!(
                "critical option {self} requires a value"
            ))),
            (false, false) => Some(SshCertError::InvalidData(format!(
                "critical option {self} takes no value, got {value:?}"
            ))),
            _ => None,
        }
    }
}

impl fmt::Display for CriticalOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CriticalOption {
    type Err = SshCertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CriticalOption::ALL
            .into_iter()
            .find(|opt| opt.as_str() == s)
            .ok_or_else(|| SshCertError::InvalidData(format!("unknown critical option {s:?}")))
    }
}

/// Optional grants a server may ignore if it does not know them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Extension {
    NoTouchRequired,
    PermitX11Forwarding,
    PermitAgentForwarding,
    PermitPortForwarding,
    PermitPty,
    PermitUserRc,
}

impl Extension {
    pub const ALL: [Extension; 6] = [
        Extension::NoTouchRequired,
        Extension::PermitX11Forwarding,
        Extension::PermitAgentForwarding,
        Extension::PermitPortForwarding,
        Extension::PermitPty,
        Extension::PermitUserRc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Extension::NoTouchRequired => "no-touch-required",
            Extension::PermitX11Forwarding => "permit-X11-forwarding",
            Extension::PermitAgentForwarding => "permit-agent-forwarding",
            Extension::PermitPortForwarding => "permit-port-forwarding",
            Extension::PermitPty => "permit-pty",
            Extension::PermitUserRc => "permit-user-rc",
        }
    }

    /// The grants `ssh-keygen` adds to user certificates by default.
    pub fn defaults() -> [Extension; 5] {
        [
            Extension::PermitX11Forwarding,
            Extension::PermitAgentForwarding,
            Extension::PermitPortForwarding,
            Extension::PermitPty,
            Extension::PermitUserRc,
        ]
    }
}

impl fmt::Display for Extension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Extension {
    type Err = SshCertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Extension::ALL
            .into_iter()
            .find(|ext| ext.as_str() == s)
            .ok_or_else(|| SshCertError::InvalidData(format!("unknown extension {s:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_option_names_round_trip() {
        for opt in CriticalOption::ALL {
            assert_eq!(opt.as_str().parse::<CriticalOption>().unwrap(), opt);
        }
        assert!("permit-pty".parse::<CriticalOption>().is_err());
    }

    #[test]
    fn test_critical_option_values() {
        assert!(CriticalOption::ForceCommand.check_value("").is_some());
        assert!(CriticalOption::ForceCommand.check_value("sftp-internal").is_none());
        assert!(CriticalOption::VerifyRequired.check_value("").is_none());
        assert!(CriticalOption::VerifyRequired.check_value("yes").is_some());
    }

    #[test]
    fn test_extension_names_round_trip() {
        for ext in Extension::ALL {
            assert_eq!(ext.as_str().parse::<Extension>().unwrap(), ext);
        }
        assert!("InvalidOption".parse::<Extension>().is_err());
        assert!("force-command".parse::<Extension>().is_err());
    }

    #[test]
    fn test_default_extensions_exclude_touch() {
        let defaults = Extension::defaults();
        assert!(!defaults.contains(&Extension::NoTouchRequired));
        assert!(defaults.contains(&Extension::PermitPty));
        assert_eq!(defaults.len(), Extension::ALL.len() - 1);
    }
}
