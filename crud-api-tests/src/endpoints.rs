use crud_harness::Error;
use std::env;

pub const API_ENDPOINT_VAR: &str = "CRUD_API_ENDPOINT";
pub const INCORRECT_ENDPOINT_VAR: &str = "CRUD_API_INCORRECT_ENDPOINT";

/// Base urls of the API under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// Serves the key/value collection at `/`.
    pub api: String,
    /// Answers 404 for everything.
    pub incorrect: String,
}

impl ApiEndpoints {
    pub fn new<S1: Into<String>, S2: Into<String>>(api: S1, incorrect: S2) -> Self {
        Self {
            api: api.into(),
            incorrect: incorrect.into(),
        }
    }

    /// Reads both endpoints from `CRUD_API_ENDPOINT` and `CRUD_API_INCORRECT_ENDPOINT`.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::new(read_var(API_ENDPOINT_VAR)?, read_var(INCORRECT_ENDPOINT_VAR)?))
    }
}

fn read_var(name: &str) -> Result<String, Error> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().into()),
        _ => Err(Error::NotConfigured(format!("{} is not set", name))),
    }
}
