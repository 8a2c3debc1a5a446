use std::collections::{BTreeMap, BTreeSet};

use bon::Builder;
use time::{Duration, OffsetDateTime};

use crate::error::{Result, SshCertError};
use crate::fields::{
    CertType, CertificateTypeField, CriticalOptionsField, ExtensionsField, FieldCodec, KeyIdField,
    PrincipalsField, SerialField, ValidAfterField, ValidBeforeField,
};

/// Caller-supplied certificate metadata.
///
/// Everything except `key_id` has the default `ssh-keygen` would use: a
/// user certificate with serial 0, no principals, valid forever, without
/// critical options or extensions.
///
/// # Example
/// ```
/// use sshcertkit::cert::params::CertificateFields;
/// use sshcertkit::fields::CertType;
///
/// let fields = CertificateFields::builder()
///     .key_id("deploy@ci")
///     .cert_type(CertType::Host)
///     .principals(vec!["build01.example.com".to_string()])
///     .build();
/// assert!(fields.validate().is_ok());
/// assert_eq!(fields.valid_before(), u64::MAX);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Builder)]
pub struct CertificateFields {
    #[builder(default)]
    serial: u64,
    #[builder(default)]
    cert_type: CertType,
    #[builder(into)]
    key_id: String,
    #[builder(default)]
    principals: Vec<String>,
    #[builder(default)]
    valid_after: u64,
    #[builder(default = u64::MAX)]
    valid_before: u64,
    #[builder(default)]
    critical_options: BTreeMap<String, String>,
    #[builder(default)]
    extensions: BTreeSet<String>,
}

impl CertificateFields {
    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub fn cert_type(&self) -> CertType {
        self.cert_type
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn principals(&self) -> &[String] {
        &self.principals
    }

    pub fn valid_after(&self) -> u64 {
        self.valid_after
    }

    pub fn valid_before(&self) -> u64 {
        self.valid_before
    }

    pub fn critical_options(&self) -> &BTreeMap<String, String> {
        &self.critical_options
    }

    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    /// Replaces the validity window with `validity`.
    pub fn with_validity(mut self, validity: &Validity) -> Result<Self> {
        let (after, before) = validity.to_timestamps()?;
        self.valid_after = after;
        self.valid_before = before;
        Ok(self)
    }

    /// Collects the defects of every member without failing.
    pub fn validate(&self) -> std::result::Result<(), Vec<SshCertError>> {
        let mut defects = Vec::new();
        defects.extend(SerialField::check(&self.serial));
        defects.extend(CertificateTypeField::check(&self.cert_type));
        defects.extend(KeyIdField::check(&self.key_id));
        defects.extend(PrincipalsField::check(&self.principals));
        defects.extend(ValidAfterField::check(&self.valid_after));
        defects.extend(ValidBeforeField::check(&self.valid_before));
        if let Err(defect) = self.check_window() {
            defects.push(defect);
        }
        defects.extend(CriticalOptionsField::check(&self.critical_options));
        defects.extend(ExtensionsField::check(&self.extensions));
        if defects.is_empty() {
            Ok(())
        } else {
            Err(defects)
        }
    }

    fn check_window(&self) -> Result<()> {
        if self.valid_after > self.valid_before {
            return Err(SshCertError::InvalidData(format!(
                "valid after ({}) is later than valid before ({})",
                self.valid_after, self.valid_before
            )));
        }
        Ok(())
    }

    pub(crate) fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        self.check_window()?;
        SerialField::encode_into(&self.serial, out)?;
        CertificateTypeField::encode_into(&self.cert_type, out)?;
        KeyIdField::encode_into(&self.key_id, out)?;
        PrincipalsField::encode_into(&self.principals, out)?;
        ValidAfterField::encode_into(&self.valid_after, out)?;
        ValidBeforeField::encode_into(&self.valid_before, out)?;
        CriticalOptionsField::encode_into(&self.critical_options, out)?;
        ExtensionsField::encode_into(&self.extensions, out)
    }

    pub(crate) fn read(reader: &mut crate::encoding::Reader<'_>) -> Result<Self> {
        let fields = Self {
            serial: SerialField::decode(reader)?,
            cert_type: CertificateTypeField::decode(reader)?,
            key_id: KeyIdField::decode(reader)?,
            principals: PrincipalsField::decode(reader)?,
            valid_after: ValidAfterField::decode(reader)?,
            valid_before: ValidBeforeField::decode(reader)?,
            critical_options: CriticalOptionsField::decode(reader)?,
            extensions: ExtensionsField::decode(reader)?,
        };
        fields.check_window()?;
        Ok(fields)
    }
}

/// Certificate validity period.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    pub fn new(not_before: OffsetDateTime, not_after: OffsetDateTime) -> Self {
        Self {
            not_before,
            not_after,
        }
    }

    /// Creates a validity period starting now for the given number of days.
    pub fn for_days(days: i64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            not_before: now,
            not_after: now + Duration::days(days),
        }
    }

    /// Whole-second UNIX timestamps for the certificate's validity fields.
    pub fn to_timestamps(&self) -> Result<(u64, u64)> {
        let seconds = |at: OffsetDateTime| {
            u64::try_from(at.unix_timestamp()).map_err(|_| {
                SshCertError::InvalidData(format!("{at} is before the UNIX epoch"))
            })
        };
        Ok((seconds(self.not_before)?, seconds(self.not_after)?))
    }
}
