use serde::Serialize;

/// Form body posted to the ingest endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Reading {
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub alert: u8,
}
