// Shared test helpers: an in-process fake Tidepool API

use axum::{
    Router,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine;
use glucose_report::tidepool::{SESSION_TOKEN_HEADER, TidepoolClient};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One account the fake service knows about.
#[derive(Clone)]
pub struct Account {
    pub email: String,
    pub password: String,
    /// Value placed in the login body's `userid` (None = field omitted).
    pub userid: Option<serde_json::Value>,
    /// Session token header (None = header omitted).
    pub token: Option<String>,
    pub data_status: u16,
    pub data_body: String,
    pub data_delay: Duration,
}

impl Account {
    pub fn new(email: &str, password: &str, userid: &str, token: &str, data_body: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            userid: Some(json!(userid)),
            token: Some(token.into()),
            data_status: 200,
            data_body: data_body.into(),
            data_delay: Duration::ZERO,
        }
    }
}

/// What the data endpoint saw.
#[derive(Debug, Clone)]
pub struct DataRequest {
    pub account_id: String,
    pub query: Option<String>,
    pub token: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone)]
struct FakeState {
    accounts: Arc<Vec<Account>>,
    data_requests: Arc<Mutex<Vec<DataRequest>>>,
}

pub struct FakeTidepool {
    pub base_url: String,
    pub data_requests: Arc<Mutex<Vec<DataRequest>>>,
    _server: tokio::task::JoinHandle<()>,
}

impl FakeTidepool {
    pub async fn spawn(accounts: Vec<Account>) -> Self {
        let data_requests = Arc::new(Mutex::new(Vec::new()));
        let state = FakeState {
            accounts: Arc::new(accounts),
            data_requests: data_requests.clone(),
        };
        let router = Router::new()
            .route("/auth/login", post(login))
            .route("/data/{account_id}", get(data))
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self {
            base_url: format!("http://{}", addr),
            data_requests,
            _server: server,
        }
    }

    pub fn client(&self) -> TidepoolClient {
        TidepoolClient::new(&self.base_url, Duration::from_secs(5)).unwrap()
    }

    pub fn client_with_timeout(&self, timeout: Duration) -> TidepoolClient {
        TidepoolClient::new(&self.base_url, timeout).unwrap()
    }

    pub fn recorded(&self) -> Vec<DataRequest> {
        self.data_requests.lock().unwrap().clone()
    }
}

fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = base64::engine::general_purpose::STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

async fn login(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    let Some((email, password)) = basic_credentials(&headers) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let Some(account) = state
        .accounts
        .iter()
        .find(|a| a.email == email && a.password == password)
    else {
        return StatusCode::UNAUTHORIZED.into_response();
    };
    let mut body = json!({ "emails": [email], "username": email });
    if let Some(userid) = &account.userid {
        body["userid"] = userid.clone();
    }
    let mut resp = axum::Json(body).into_response();
    if let Some(token) = &account.token {
        resp.headers_mut()
            .insert(SESSION_TOKEN_HEADER, HeaderValue::from_str(token).unwrap());
    }
    resp
}

async fn data(
    State(state): State<FakeState>,
    Path(account_id): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let token = headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.data_requests.lock().unwrap().push(DataRequest {
        account_id: account_id.clone(),
        query,
        token: token.clone(),
        content_type,
    });

    let account = state.accounts.iter().find(|a| {
        a.token.is_some()
            && a.token == token
            && a.userid.as_ref().map(userid_text).as_deref() == Some(account_id.as_str())
    });
    let Some(account) = account else {
        return StatusCode::FORBIDDEN.into_response();
    };
    if !account.data_delay.is_zero() {
        tokio::time::sleep(account.data_delay).await;
    }
    let status = StatusCode::from_u16(account.data_status).unwrap();
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        account.data_body.clone(),
    )
        .into_response()
}

fn userid_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Feed array with one entry per `(type, deviceTime, value)`.
pub fn feed(entries: &[(&str, &str, f64)]) -> String {
    let items: Vec<serde_json::Value> = entries
        .iter()
        .map(|(kind, device_time, value)| {
            json!({
                "type": kind,
                "deviceTime": device_time,
                "value": value,
                "units": "mmol/L",
                "id": format!("{}-{}", kind, device_time),
                "time": format!("{}.000Z", device_time),
                "timezoneOffset": 0,
                "uploadId": "upl-1",
                "deviceId": "meter-1",
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}
