use crate::{error::Error, RequestData};
use hyper::Method;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Raw(String),
}

impl RequestBody {
    fn default_content_type(&self) -> &'static str {
        match self {
            RequestBody::Json(_) => JSON_CONTENT_TYPE,
            RequestBody::Raw(_) => FORM_CONTENT_TYPE,
        }
    }

    fn encode(&self) -> String {
        match self {
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Raw(text) => text.clone(),
        }
    }
}

/// Describes one request: a path plus optional body, headers and expected status.
///
/// Only the verb is missing; it is picked by the [`Agent`](crate::Agent) method the
/// descriptor is passed to.
#[derive(Debug, Default)]
pub struct RequestConfig {
    path: String,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
    headers: HashMap<String, String>,
    expected_status: Option<u16>,
    // surfaced when the request is sent, like reqwest does for `.json()`
    body_error: Option<serde_json::Error>,
}

impl RequestConfig {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = Some(RequestBody::Json(value)),
            Err(e) => self.body_error = Some(e),
        }
        self
    }

    pub fn raw<S: Into<String>>(mut self, body: S) -> Self {
        self.body = Some(RequestBody::Raw(body.into()));
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Header names are case-insensitive; a later value replaces an earlier one.
    pub fn header<S1: AsRef<str>, S2: Into<String>>(mut self, name: S1, value: S2) -> Self {
        self.headers
            .insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    pub fn headers<K, V, I>(mut self, headers: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (name, value) in headers {
            self = self.header(name, value);
        }
        self
    }

    pub fn query<S1: Into<String>, S2: Into<String>>(mut self, key: S1, value: S2) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn expect_status(mut self, status_code: u16) -> Self {
        self.expected_status = Some(status_code);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn expected_status(&self) -> Option<u16> {
        self.expected_status
    }

    pub(crate) fn into_request_data(self, method: Method) -> Result<RequestData, Error> {
        if let Some(e) = self.body_error {
            return Err(e.into());
        }

        let mut headers = self.headers;
        let body = match &self.body {
            Some(body) => {
                headers
                    .entry(String::from("content-type"))
                    .or_insert_with(|| String::from(body.default_content_type()));
                body.encode()
            }
            None => String::new(),
        };

        Ok(RequestData {
            uri: with_query(self.path, &self.query),
            method,
            headers,
            body,
        })
    }
}

fn with_query(path: String, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return path;
    }

    let encoded = query
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&");
    let separator = if path.contains('?') { '&' } else { '?' };

    format!("{}{}{}", path, separator, encoded)
}

fn encode_component(component: &str) -> String {
    utf8_percent_encode(component, QUERY_COMPONENT).to_string()
}
