// Domain models: request inputs, Tidepool wire shapes, normalized readings

mod measurement;
mod reading;
mod request;

pub use measurement::{
    Annotation, ClientInfo, ClientPrivate, MeasurementPayload, RawMeasurement, ServiceError,
};
pub use reading::NormalizedReading;
pub use request::{Credentials, DateRange, ReportRequest, Subtype};
