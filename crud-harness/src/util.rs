use crate::error::Error;
use hyper::{
    header::{HeaderName, HeaderValue},
    HeaderMap,
};
use std::collections::HashMap;

pub(crate) fn extract_headers(header_map: &HeaderMap) -> HashMap<String, String> {
    // header values with opaque characters are dropped; repeated names are joined
    let mut headers: HashMap<String, String> = HashMap::new();

    for (key, value) in header_map {
        if let Ok(value) = value.to_str() {
            headers
                .entry(String::from(key.as_str()))
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| String::from(value));
        }
    }

    headers
}

pub(crate) fn put_headers<'a, I: IntoIterator<Item = (&'a String, &'a String)>>(
    header_map: &mut HeaderMap<HeaderValue>,
    headers: I,
) -> Result<(), Error> {
    for (key, value) in headers {
        let header_name = HeaderName::from_lowercase(key.to_lowercase().as_bytes())?;
        let header_value = HeaderValue::from_str(value)?;
        header_map.append(header_name, header_value);
    }

    Ok(())
}

/// Joins a base url and a path so that exactly one slash separates them.
pub(crate) fn join_url(endpoint: &str, uri: &str) -> String {
    let endpoint = endpoint.trim_end_matches('/');

    if uri.starts_with('/') {
        format!("{}{}", endpoint, uri)
    } else {
        format!("{}/{}", endpoint, uri)
    }
}

pub(crate) fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_lowercase()
}
