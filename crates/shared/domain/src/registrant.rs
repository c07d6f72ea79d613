//! Early-access registrants and the registry that holds them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One early-access sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrantRecord {
    /// Trimmed address, original casing preserved.
    pub email: String,
    #[serde(rename = "timestamp")]
    pub registered_at: RegisteredAt,
}

impl RegistrantRecord {
    /// Stamps a new record with the current time, truncated to milliseconds so the
    /// persisted form reloads to an equal value.
    pub fn new(email: impl Into<String>) -> Self {
        Self::at(email, Utc::now())
    }

    pub fn at(email: impl Into<String>, registered_at: DateTime<Utc>) -> Self {
        Self {
            email: email.into(),
            registered_at: RegisteredAt::Instant(registered_at.trunc_subsecs(3)),
        }
    }

    /// Case-insensitive address comparison.
    #[must_use]
    pub fn matches(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }
}

/// Ordered registrant list, serialized as a bare JSON array.
///
/// Holds at most one record per case-folded address when built through
/// [`Registry::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    records: Vec<RegistrantRecord>,
}

impl Registry {
    #[must_use]
    pub fn contains(&self, email: &str) -> bool {
        self.records.iter().any(|record| record.matches(email))
    }

    /// Appends `record` unless its address is already present.
    ///
    /// Returns whether the record was added.
    pub fn insert(&mut self, record: RegistrantRecord) -> bool {
        if self.contains(&record.email) {
            return false;
        }
        self.records.push(record);
        true
    }

    #[must_use]
    pub fn records(&self) -> &[RegistrantRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<RegistrantRecord>> for Registry {
    fn from(records: Vec<RegistrantRecord>) -> Self {
        Self { records }
    }
}

/// When a registrant signed up.
///
/// New values are written as RFC 3339 in UTC with exactly three fractional digits, e.g.
/// `2026-01-01T00:00:00.000Z`. Stored text in any other form (another offset, no
/// offset, a bare date, free text) is kept verbatim and written back unchanged, so one
/// odd record never makes the file unreadable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisteredAt {
    Instant(DateTime<Utc>),
    Verbatim(String),
}

impl RegisteredAt {
    /// The point in time, if the text can be read as ISO 8601.
    ///
    /// Verbatim values without an offset (`2026-01-02`, `2026-01-02T08:30:00`) are read
    /// as UTC.
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        let raw = match self {
            Self::Instant(at) => return Some(*at),
            Self::Verbatim(raw) => raw.as_str(),
        };

        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

fn canonical(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<&str> for RegisteredAt {
    fn from(raw: &str) -> Self {
        match DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc)) {
            Ok(at) if canonical(&at) == raw => Self::Instant(at),
            _ => Self::Verbatim(raw.to_owned()),
        }
    }
}

impl Serialize for RegisteredAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Instant(at) => serializer.serialize_str(&canonical(at)),
            Self::Verbatim(raw) => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for RegisteredAt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw.as_str()))
    }
}
