// Per-request inputs: credentials, optional date range, measurement subtype

use chrono::NaiveDate;

/// Tidepool login. Lives for one request; never persisted or logged.
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Time of day and UTC marker Tidepool expects after the calendar date.
const RANGE_TIME_SUFFIX: &str = "T01:00:00.000Z";

/// Optional bounds on the data query; either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Parse form values (`YYYY-MM-DD`); blank means unbounded.
    pub fn from_form(start: &str, end: &str) -> Result<Self, String> {
        Ok(Self {
            start: parse_form_date("startdate", start)?,
            end: parse_form_date("enddate", end)?,
        })
    }

    /// Query-string suffix appended after `type=...`: start first, then end.
    pub fn query_suffix(&self) -> String {
        let mut qs = String::new();
        if let Some(start) = self.start {
            qs.push_str("&startDate=");
            qs.push_str(&service_timestamp(start));
        }
        if let Some(end) = self.end {
            qs.push_str("&endDate=");
            qs.push_str(&service_timestamp(end));
        }
        qs
    }
}

fn service_timestamp(date: NaiveDate) -> String {
    format!("{}{}", date.format("%Y-%m-%d"), RANGE_TIME_SUFFIX)
}

fn parse_form_date(field: &str, value: &str) -> Result<Option<NaiveDate>, String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("{} must be a date in YYYY-MM-DD form, got {:?}", field, value))
}

/// Measurement subtypes the report can render. Only self-monitored blood glucose today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Subtype {
    #[default]
    Smbg,
}

impl Subtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subtype::Smbg => "smbg",
        }
    }

    /// Parse the form's `datatype` value; blank selects the default.
    pub fn from_form(s: &str) -> Result<Self, String> {
        match s.trim() {
            "" | "smbg" => Ok(Subtype::Smbg),
            other => Err(format!("unsupported data type {:?}; only smbg is supported", other)),
        }
    }
}

impl std::fmt::Display for Subtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one report run needs from the caller.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub credentials: Credentials,
    pub range: DateRange,
    pub subtype: Subtype,
}
