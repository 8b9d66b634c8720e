// Tidepool session client: login, then one authenticated data query

use crate::error::{ReportError, status_text};
use crate::models::{Credentials, DateRange, Subtype};
use crate::version::USER_AGENT;
use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::instrument;

/// Header carrying the session token on the login response and the data request.
pub const SESSION_TOKEN_HEADER: &str = "x-tidepool-session-token";

/// Session token issued by `/auth/login`; valid for one retrieval only.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub account_id: String,
}

/// Stateless apart from the pooled HTTP client; safe to share across requests.
pub struct TidepoolClient {
    http: Client,
    base_url: Url,
}

impl TidepoolClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url)?;
        anyhow::ensure!(
            !base_url.cannot_be_a_base(),
            "Tidepool base url {} cannot carry a path",
            base_url
        );
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// POST /auth/login with basic auth. Token comes from the response header,
    /// account id from the `userid` body field.
    #[instrument(skip(self, credentials), fields(client = "tidepool", operation = "login"))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ReportError> {
        let url = endpoint(&self.base_url, &["auth", "login"]);
        let resp = self
            .http
            .post(url)
            .basic_auth(&credentials.identifier, Some(&credentials.secret))
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ReportError::Auth {
                status: status.as_u16(),
                status_text: status_text(status),
            });
        }

        let token = resp
            .headers()
            .get(SESSION_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(SessionToken::new)
            .ok_or_else(|| incomplete_login(status, "session token header"))?;

        let body = resp.bytes().await?;
        let account_id = account_id_from_body(&body).ok_or_else(|| incomplete_login(status, "userid"))?;

        tracing::info!(account_id = %account_id, "logged in to Tidepool");
        Ok(Session { token, account_id })
    }

    /// GET /data/<account>?type=<subtype>[&startDate=..][&endDate=..].
    /// Returns the raw body; whether it is the feed or an error object is decided later.
    #[instrument(skip(self, session), fields(client = "tidepool", operation = "fetch_measurements", subtype = %subtype))]
    pub async fn fetch_measurements(
        &self,
        session: &Session,
        subtype: Subtype,
        range: &DateRange,
    ) -> Result<Bytes, ReportError> {
        let url = data_url(&self.base_url, &session.account_id, subtype, range);
        let resp = self
            .http
            .get(url)
            .header(SESSION_TOKEN_HEADER, session.token.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(ReportError::Fetch {
                status: status.as_u16(),
                status_text: status_text(status),
            });
        }

        let body = resp.bytes().await?;
        tracing::debug!(bytes = body.len(), "fetched measurement payload");
        Ok(body)
    }
}

fn incomplete_login(status: StatusCode, missing: &str) -> ReportError {
    ReportError::Auth {
        status: status.as_u16(),
        status_text: format!("{} (login response missing {})", status_text(status), missing),
    }
}

/// `userid` as text. Strings and numbers are accepted; absent, null or
/// structured values are treated as a failed login, as are the dot segments
/// a url path would swallow.
pub(crate) fn account_id_from_body(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("userid")? {
        serde_json::Value::String(s) => {
            let id = s.trim();
            (!matches!(id, "" | "." | "..")).then(|| id.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Appends path segments to the base url. Each segment is percent-encoded, so a
/// `/`, `?` or `#` inside one cannot leave its segment.
fn endpoint(base_url: &Url, segments: &[&str]) -> Url {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    // base urls are checked in `TidepoolClient::new`, so this never fails
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// The account id is service-supplied and goes into the path as one escaped segment;
/// the query is built here only.
pub(crate) fn data_url(base_url: &Url, account_id: &str, subtype: Subtype, range: &DateRange) -> Url {
    let mut url = endpoint(base_url, &["data", account_id]);
    url.set_query(Some(&format!("type={}{}", subtype.as_str(), range.query_suffix())));
    url
}
