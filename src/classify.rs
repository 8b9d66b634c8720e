// Success vs error disambiguation for the data endpoint body.
// Tidepool answers 200 with either the measurement array or an error object,
// so the JSON shape is the only discriminator.

use crate::error::ReportError;
use crate::models::{RawMeasurement, ServiceError};
use serde::Deserialize;

/// Outcome of reading a data response body.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedResponse {
    Success(Vec<RawMeasurement>),
    Failure(ServiceError),
}

/// Try the feed array first, then the error object. Neither means the remote
/// contract changed: `MalformedPayload`.
pub fn classify(body: &[u8]) -> Result<FeedResponse, ReportError> {
    let feed_err = match serde_json::from_slice::<Vec<RawMeasurement>>(body) {
        Ok(measurements) => return Ok(FeedResponse::Success(measurements)),
        Err(e) => e,
    };

    match parse_service_error(body) {
        Ok(service_error) => Ok(FeedResponse::Failure(service_error)),
        Err(error_err) => Err(ReportError::MalformedPayload(format!(
            "not a measurement array ({}) nor an error object ({})",
            feed_err, error_err
        ))),
    }
}

/// Only a JSON object qualifies; a struct would otherwise also accept an array.
fn parse_service_error(body: &[u8]) -> Result<ServiceError, serde_json::Error> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)?;
    ServiceError::deserialize(serde_json::Value::Object(object))
}

impl FeedResponse {
    /// Turn a reported service error into the request's error channel.
    pub fn into_measurements(self) -> Result<Vec<RawMeasurement>, ReportError> {
        match self {
            FeedResponse::Success(measurements) => Ok(measurements),
            FeedResponse::Failure(service_error) => Err(ReportError::ServiceReported(service_error)),
        }
    }
}
