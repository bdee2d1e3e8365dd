use regex::Regex;
use std::{
    borrow::Cow,
    fmt::{self, Display},
};

#[derive(Debug, Clone)]
pub enum PathMatcher {
    Exact(String),
    Regex(Regex),
}

impl PathMatcher {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Exact(expected) => normalize(expected) == normalize(path),
            PathMatcher::Regex(pattern) => pattern.is_match(&normalize(path)),
        }
    }
}

/// Drops the query string and makes the path absolute, the way the url is joined.
fn normalize(path: &str) -> Cow<'_, str> {
    let path = path.split('?').next().unwrap_or_default();
    if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{}", path))
    }
}

impl From<&str> for PathMatcher {
    fn from(path: &str) -> Self {
        PathMatcher::Exact(path.into())
    }
}

impl From<String> for PathMatcher {
    fn from(path: String) -> Self {
        PathMatcher::Exact(path)
    }
}

impl From<Regex> for PathMatcher {
    fn from(pattern: Regex) -> Self {
        PathMatcher::Regex(pattern)
    }
}

impl Display for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathMatcher::Exact(path) => write!(f, "{}", path),
            PathMatcher::Regex(pattern) => write!(f, "/{}/", pattern),
        }
    }
}
