// Handlers: home form, report submission, version

use axum::{
    Form,
    extract::State,
    http::header,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use super::{AppState, pages};
use crate::error::ReportError;
use crate::models::{Credentials, DateRange, ReportRequest, Subtype};
use crate::report::build_report;
use crate::version::{NAME, VERSION};

/// Fields posted by the options form.
#[derive(Deserialize)]
pub(super) struct ReportForm {
    #[serde(default)]
    useremail: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    startdate: String,
    #[serde(default)]
    enddate: String,
    #[serde(default)]
    datatype: String,
}

impl ReportForm {
    fn into_request(self) -> Result<ReportRequest, ReportError> {
        if self.useremail.trim().is_empty() || self.password.is_empty() {
            return Err(ReportError::InvalidInput(
                "email and password are required".into(),
            ));
        }
        let range =
            DateRange::from_form(&self.startdate, &self.enddate).map_err(ReportError::InvalidInput)?;
        if let (Some(start), Some(end)) = (range.start, range.end)
            && start > end
        {
            return Err(ReportError::InvalidInput(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        let subtype = Subtype::from_form(&self.datatype).map_err(ReportError::InvalidInput)?;
        Ok(ReportRequest {
            credentials: Credentials::new(self.useremail.trim(), self.password),
            range,
            subtype,
        })
    }
}

/// GET / — options form.
pub(super) async fn home_handler() -> Html<String> {
    Html(pages::home_page())
}

/// POST /opts — fetch readings and answer with the PDF inline.
pub(super) async fn report_handler(
    State(state): State<AppState>,
    Form(form): Form<ReportForm>,
) -> Result<Response, ReportError> {
    let request = form.into_request()?;
    let report = build_report(&state.client, &request, &state.layout).await?;
    tracing::info!(
        readings = report.readings,
        bytes = report.pdf.len(),
        "report generated"
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"tidepool.pdf\""),
        ],
        report.pdf,
    )
        .into_response())
}

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}
