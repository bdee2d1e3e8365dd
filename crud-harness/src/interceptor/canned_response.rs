use crate::ResponseData;
use serde_json::Value;
use std::collections::HashMap;

/// A predetermined reply returned instead of contacting a real server.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl CannedResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    pub fn json(status_code: u16, body: Value) -> Self {
        Self::new(status_code)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    pub fn text<S: Into<String>>(status_code: u16, body: S) -> Self {
        Self::new(status_code)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(body)
    }

    pub fn with_header<S1: Into<String>, S2: Into<String>>(mut self, name: S1, value: S2) -> Self {
        self.headers
            .insert(name.into().to_lowercase(), value.into());
        self
    }

    pub fn with_body<S: Into<String>>(mut self, body: S) -> Self {
        self.body = body.into();
        self
    }

    pub(crate) fn to_response_data(&self) -> ResponseData {
        ResponseData::new(self.status_code, self.headers.clone(), self.body.clone())
    }
}
