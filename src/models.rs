use serde::Serialize;
use serde_json::Value;

/// Status tag the scanner assigns to dependencies that need explicit acceptance.
pub const RESTRICTED: &str = "restricted";

/// One line of the scanner's summary report.
///
/// Only `dependency` is always present; a short line leaves the trailing
/// fields as `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub dependency: String,
    pub license: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
}

impl SummaryEntry {
    pub fn is_restricted(&self) -> bool {
        self.status
            .as_deref()
            .is_some_and(|s| s.to_lowercase() == RESTRICTED)
    }

    /// License as printed in reports; `-` when the line had no license field.
    pub fn license_display(&self) -> &str {
        self.license.as_deref().unwrap_or("-")
    }
}

/// A baseline key that no current restricted finding matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleEntry {
    pub dependency: String,
    pub annotation: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::Pass => 0,
            Verdict::Fail => 1,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Fail => write!(f, "fail"),
        }
    }
}
