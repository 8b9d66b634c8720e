// Retrieve-and-render pipeline: login -> fetch -> classify -> extract -> render.
// Every stage works on values owned by this call; concurrent reports share nothing mutable.

use crate::classify::classify;
use crate::error::ReportError;
use crate::extract::extract;
use crate::models::ReportRequest;
use crate::render::{ReportLayout, ReportRenderer};
use crate::tidepool::TidepoolClient;
use tracing::instrument;

/// Finished PDF plus what went into it.
#[derive(Debug, Clone)]
pub struct Report {
    pub pdf: Vec<u8>,
    pub readings: usize,
}

#[instrument(skip_all, fields(subtype = %request.subtype))]
pub async fn build_report(
    client: &TidepoolClient,
    request: &ReportRequest,
    layout: &ReportLayout,
) -> Result<Report, ReportError> {
    let session = client.login(&request.credentials).await?;
    let body = client
        .fetch_measurements(&session, request.subtype, &request.range)
        .await?;

    let measurements = classify(&body)?.into_measurements()?;
    let readings = extract(&measurements, request.subtype);
    tracing::info!(
        measurements = measurements.len(),
        readings = readings.len(),
        "classified Tidepool payload"
    );
    if readings.is_empty() {
        tracing::info!("no results were returned from Tidepool");
    }

    let layout = layout.clone();
    let count = readings.len();
    let pdf = tokio::task::spawn_blocking(move || ReportRenderer::new(layout).render(&readings))
        .await
        .map_err(|e| ReportError::Render(format!("render task join: {}", e)))?;

    Ok(Report {
        pdf,
        readings: count,
    })
}
