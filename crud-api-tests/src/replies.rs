//! The API's observed answers, served by a stub server for playback tests.
//!
//! Messages are copied verbatim from the live API, typos included.

use crate::fixtures::QUOTA;
use crud_harness::CannedResponse;
use serde_json::{json, Value};

pub const QUOTA_REACHED: &str = "you reached your quota";
pub const VALUE_DOES_NOT_EXIST: &str = "value dose not exist";
pub const NOT_JSON: &str = "Expecting value: line 1 column 1 (char 0)";

const BREEDS: [(&str, &str); QUOTA] = [
    ("Abyssinian", "Gerri Moss"),
    ("Balinese", "Tobias Rowe"),
    ("Bengal", "Maya Chen"),
    ("Birman", "Ola Nordmann"),
    ("Bombay", "Ines Duarte"),
    ("Burmese", "Kofi Mensah"),
    ("Chartreux", "Lena Vogel"),
    ("Havana Brown", "Ravi Iyer"),
    ("Manx", "Sofia Greco"),
    ("Ocicat", "Kellie Lind"),
];

/// `GET /` on a full store.
pub fn all_values() -> CannedResponse {
    let values: Vec<Value> = BREEDS
        .iter()
        .map(|(main_key, value)| json!({ "main_key": main_key, "value": value }))
        .collect();

    CannedResponse::json(200, Value::Array(values))
}

/// The API echoes what it stored or deleted.
pub fn echo(status_code: u16, body: Value) -> CannedResponse {
    CannedResponse::json(status_code, body)
}

pub fn quota_reached() -> CannedResponse {
    CannedResponse::json(400, Value::from(QUOTA_REACHED))
}

pub fn not_json() -> CannedResponse {
    CannedResponse::text(400, NOT_JSON)
}

/// Sent for POSTs of known and unknown keys alike; only the status differs.
pub fn value_does_not_exist(status_code: u16) -> CannedResponse {
    CannedResponse::json(status_code, Value::from(VALUE_DOES_NOT_EXIST))
}

pub fn not_found() -> CannedResponse {
    CannedResponse::json(404, json!({ "message": "Not Found" }))
}
