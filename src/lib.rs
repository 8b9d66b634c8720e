// Library for tests to access modules

pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pdf;
pub mod render;
pub mod report;
pub mod routes;
pub mod tidepool;
pub mod version;
