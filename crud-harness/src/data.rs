use crate::error::Error;
use hyper::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

/// A request as it goes over the wire. Header names are lowercase.
#[derive(Debug, Clone)]
pub struct RequestData {
    pub uri: String,
    pub method: Method,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RequestData {
    /// The uri without its query string.
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or_default()
    }

    pub fn header<S: AsRef<str>>(&self, name: S) -> Option<&str> {
        self.headers
            .get(&name.as_ref().to_lowercase())
            .map(String::as_str)
    }
}

/// The response envelope returned by every wrapper call.
///
/// The body is kept as text; when the content type says JSON it is also
/// parsed, so assertions can look at either representation.
#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    json: Option<Value>,
}

impl ResponseData {
    pub fn new(status_code: u16, headers: HashMap<String, String>, body: String) -> Self {
        let headers: HashMap<String, String> = headers
            .into_iter()
            .map(|(key, value)| (key.to_lowercase(), value))
            .collect();

        let json = headers
            .get("content-type")
            .filter(|content_type| is_json_content_type(content_type))
            .and_then(|_| serde_json::from_str(&body).ok());

        Self {
            status_code,
            headers,
            body,
            json,
        }
    }

    pub fn header<S: AsRef<str>>(&self, name: S) -> Option<&str> {
        self.headers
            .get(&name.as_ref().to_lowercase())
            .map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    /// The parsed body, present only for JSON-typed responses.
    pub fn json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code)
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();

    mime == "application/json" || mime.ends_with("+json")
}
