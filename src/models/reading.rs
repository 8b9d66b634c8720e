// Normalized smbg reading passed to the document renderer

use serde::Serialize;

/// A single glucose reading reduced to what the report prints.
/// Fields are private so a reading cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedReading {
    date: String,
    time: String,
    value: String,
}

impl NormalizedReading {
    pub fn new(date: impl Into<String>, time: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
            value: value.into(),
        }
    }

    /// `YYYY-MM-DD`, device-local.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// `HH:MM:SS`, device-local.
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Display-unit value (mg/dL), integer text.
    pub fn value(&self) -> &str {
        &self.value
    }
}
