use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::clock::serialize_timestamp;

/// Raw ingest form as posted by a device. Every field is optional so that
/// presence checks produce the fixed `Missing parameters.` answer instead of
/// an extractor rejection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct IngestForm {
    pub device_id: Option<String>,
    pub temperature: Option<String>,
    pub humidity: Option<String>,
    pub alert: Option<String>,
}

/// A validated submission, ready to be written into its bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub alert: i32,
}

/// A stored reading as returned by the query endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Reading {
    pub id: i64,
    pub device_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub alert: i32,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Serialize)]
pub struct ReadingsResponse {
    pub status: &'static str,
    pub count: usize,
    pub data: Vec<Reading>,
}

impl ReadingsResponse {
    pub fn success(data: Vec<Reading>) -> Self {
        Self {
            status: "success",
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
        }
    }
}
