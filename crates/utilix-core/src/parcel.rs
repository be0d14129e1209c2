use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Canonical unit of work produced from one spreadsheet row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    /// 1-based position of the origin row in the input file.
    pub row_index: usize,
    pub apn: String,
    pub street_address: Option<String>,
    /// County name or municipal key.
    pub county: String,
    pub state: String,
}

impl LookupRequest {
    /// Returns the request as it is sent to the resolution service: apn with
    /// `-` and `.` removed, state trimmed and upper-cased, falling back to
    /// `default_state` when blank.
    #[must_use]
    pub fn prepared(&self, default_state: &str) -> Self {
        let state = match self.state.trim() {
            "" => default_state.trim().to_ascii_uppercase(),
            s => s.to_ascii_uppercase(),
        };
        Self {
            row_index: self.row_index,
            apn: strip_apn_punctuation(&self.apn),
            street_address: self.street_address.clone(),
            county: self.county.clone(),
            state,
        }
    }
}

/// Removes the `-` and `.` separators parcel identifiers are commonly written with.
#[must_use]
pub fn strip_apn_punctuation(apn: &str) -> String {
    apn.chars().filter(|c| !matches!(c, '-' | '.')).collect()
}

/// Utility availability for one parcel, as returned by the resolution service.
///
/// Fields the service adds later land in `extra` instead of failing
/// deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParcelUtilityInfo {
    pub apn: String,
    #[serde(default)]
    pub electric_available: bool,
    #[serde(default)]
    pub electric_provider: Option<String>,
    #[serde(default)]
    pub water_available: bool,
    #[serde(default)]
    pub water_provider: Option<String>,
    #[serde(default)]
    pub sewer_available: bool,
    #[serde(default)]
    pub sewer_provider: Option<String>,
    #[serde(default)]
    pub well_available: Option<bool>,
    #[serde(default)]
    pub well_use: Option<String>,
    #[serde(default)]
    pub septic_present: Option<bool>,
    #[serde(default)]
    pub sewer_connected: Option<bool>,
    #[serde(default)]
    pub water_connected: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ParcelUtilityInfo {
    /// Baseline record for a parcel whose lookup failed: nothing available,
    /// every optional attribute unknown.
    #[must_use]
    pub fn unavailable(apn: impl Into<String>) -> Self {
        Self {
            apn: apn.into(),
            ..Self::default()
        }
    }
}

/// Outcome of one lookup, tagged with the row it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupResult {
    Success {
        row_index: usize,
        info: ParcelUtilityInfo,
    },
    Failure {
        row_index: usize,
        /// Apn as it was sent, punctuation already stripped.
        apn: String,
        reason: String,
    },
}

impl LookupResult {
    #[must_use]
    pub fn row_index(&self) -> usize {
        match self {
            LookupResult::Success { row_index, .. } | LookupResult::Failure { row_index, .. } => {
                *row_index
            }
        }
    }

    #[must_use]
    pub fn apn(&self) -> &str {
        match self {
            LookupResult::Success { info, .. } => &info.apn,
            LookupResult::Failure { apn, .. } => apn,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, LookupResult::Success { .. })
    }

    /// The availability record for this row; failures read as
    /// [`ParcelUtilityInfo::unavailable`].
    #[must_use]
    pub fn utility_info(&self) -> Cow<'_, ParcelUtilityInfo> {
        match self {
            LookupResult::Success { info, .. } => Cow::Borrowed(info),
            LookupResult::Failure { apn, .. } => {
                Cow::Owned(ParcelUtilityInfo::unavailable(apn.as_str()))
            }
        }
    }
}

/// Rows processed so far out of the batch total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchProgress {
    pub done: usize,
    pub total: usize,
}

impl BatchProgress {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done == self.total
    }
}

impl std::fmt::Display for BatchProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {} processed", self.done, self.total)
    }
}
