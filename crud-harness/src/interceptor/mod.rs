mod canned_response;
mod path_matcher;

pub use canned_response::CannedResponse;
pub use path_matcher::PathMatcher;

use crate::{
    error::Error, http_client::HttpClient, util, RequestData, ReqwestHttpClient, ResponseData,
};
use async_trait::async_trait;
use hyper::Method;
use lazy_static::lazy_static;
use std::sync::{Arc, Mutex};
use tracing::debug;

lazy_static! {
    static ref INTERCEPTORS: Mutex<InterceptorSet> = Mutex::new(InterceptorSet::default());
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum Remaining {
    Times(usize),
    Persist,
}

/// One canned reply bound to a verb and a path, and optionally to an endpoint.
#[derive(Debug, Clone)]
pub struct Interceptor {
    endpoint: Option<String>,
    method: Method,
    path: PathMatcher,
    response: CannedResponse,
    remaining: Remaining,
}

impl Interceptor {
    fn matches(&self, endpoint: Option<&str>, method: &Method, path: &str) -> bool {
        let endpoint_matches = match (&self.endpoint, endpoint) {
            (None, _) => true,
            (Some(expected), Some(actual)) => *expected == util::normalize_endpoint(actual),
            (Some(_), None) => false,
        };

        endpoint_matches && self.method == *method && self.path.matches(path)
    }

    pub fn describe(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => format!("{} {}{}", self.method, endpoint, self.path),
            None => format!("{} {}", self.method, self.path),
        }
    }
}

/// An ordered collection of interceptors. The first registered match wins.
#[derive(Debug, Default)]
pub struct InterceptorSet {
    interceptors: Vec<Interceptor>,
}

impl InterceptorSet {
    pub fn add(&mut self, interceptor: Interceptor) {
        self.interceptors.push(interceptor);
    }

    pub fn take_match(
        &mut self,
        endpoint: Option<&str>,
        method: &Method,
        path: &str,
    ) -> Option<CannedResponse> {
        let index = self
            .interceptors
            .iter()
            .position(|interceptor| interceptor.matches(endpoint, method, path))?;

        let response = self.interceptors[index].response.clone();
        let exhausted = match &mut self.interceptors[index].remaining {
            Remaining::Times(times) => {
                *times -= 1;
                *times == 0
            }
            Remaining::Persist => false,
        };

        if exhausted {
            self.interceptors.remove(index);
        }

        Some(response)
    }

    /// Interceptors that still expect to be matched. Persisted ones never do.
    pub fn pending(&self) -> Vec<String> {
        self.interceptors
            .iter()
            .filter(|interceptor| interceptor.remaining != Remaining::Persist)
            .map(Interceptor::describe)
            .collect()
    }

    pub fn clear(&mut self) {
        self.interceptors.clear();
    }
}

/// Entry point for registering interceptors on one endpoint.
pub struct Scope<'a> {
    target: &'a Mutex<InterceptorSet>,
    endpoint: Option<String>,
}

impl<'a> Scope<'a> {
    pub(crate) fn new(target: &'a Mutex<InterceptorSet>, endpoint: Option<String>) -> Self {
        Self { target, endpoint }
    }

    pub fn get<P: Into<PathMatcher>>(&self, path: P) -> InterceptorBuilder<'a> {
        self.method(Method::GET, path)
    }

    pub fn post<P: Into<PathMatcher>>(&self, path: P) -> InterceptorBuilder<'a> {
        self.method(Method::POST, path)
    }

    pub fn put<P: Into<PathMatcher>>(&self, path: P) -> InterceptorBuilder<'a> {
        self.method(Method::PUT, path)
    }

    pub fn delete<P: Into<PathMatcher>>(&self, path: P) -> InterceptorBuilder<'a> {
        self.method(Method::DELETE, path)
    }

    pub fn method<P: Into<PathMatcher>>(&self, method: Method, path: P) -> InterceptorBuilder<'a> {
        InterceptorBuilder {
            target: self.target,
            endpoint: self.endpoint.clone(),
            method,
            path: path.into(),
            remaining: Remaining::Times(1),
        }
    }
}

pub struct InterceptorBuilder<'a> {
    target: &'a Mutex<InterceptorSet>,
    endpoint: Option<String>,
    method: Method,
    path: PathMatcher,
    remaining: Remaining,
}

impl<'a> InterceptorBuilder<'a> {
    /// Answer the next `times` matching requests. Zero is treated as one.
    pub fn times(mut self, times: usize) -> Self {
        self.remaining = Remaining::Times(times.max(1));
        self
    }

    pub fn persist(mut self) -> Self {
        self.remaining = Remaining::Persist;
        self
    }

    pub fn reply(self, response: CannedResponse) -> Result<(), Error> {
        let interceptor = Interceptor {
            endpoint: self.endpoint,
            method: self.method,
            path: self.path,
            response,
            remaining: self.remaining,
        };

        debug!(interceptor = %interceptor.describe(), "registering interceptor");
        self.target.lock()?.add(interceptor);

        Ok(())
    }
}

/// Collects interceptors ahead of time, to be installed when a test session starts.
#[derive(Debug)]
pub struct InterceptorsBuilder {
    endpoint: String,
    interceptors: Vec<Interceptor>,
}

impl InterceptorsBuilder {
    pub(crate) fn new<S: AsRef<str>>(endpoint: S) -> Self {
        Self {
            endpoint: util::normalize_endpoint(endpoint.as_ref()),
            interceptors: Vec::new(),
        }
    }

    pub fn reply<P: Into<PathMatcher>>(
        &mut self,
        method: Method,
        path: P,
        response: CannedResponse,
    ) -> &mut Self {
        self.add(method, path, response, Remaining::Times(1))
    }

    pub fn reply_always<P: Into<PathMatcher>>(
        &mut self,
        method: Method,
        path: P,
        response: CannedResponse,
    ) -> &mut Self {
        self.add(method, path, response, Remaining::Persist)
    }

    fn add<P: Into<PathMatcher>>(
        &mut self,
        method: Method,
        path: P,
        response: CannedResponse,
        remaining: Remaining,
    ) -> &mut Self {
        self.interceptors.push(Interceptor {
            endpoint: Some(self.endpoint.clone()),
            method,
            path: path.into(),
            response,
            remaining,
        });
        self
    }

    pub fn into_interceptors(self) -> Vec<Interceptor> {
        self.interceptors
    }
}

/// Registers interceptors for requests sent to `endpoint` by any [`InterceptingHttpClient`].
pub fn intercept<S: AsRef<str>>(endpoint: S) -> Scope<'static> {
    Scope::new(
        &*INTERCEPTORS,
        Some(util::normalize_endpoint(endpoint.as_ref())),
    )
}

pub fn clean_all() -> Result<(), Error> {
    INTERCEPTORS.lock()?.clear();
    Ok(())
}

pub fn pending() -> Result<Vec<String>, Error> {
    Ok(INTERCEPTORS.lock()?.pending())
}

pub fn is_done() -> Result<bool, Error> {
    Ok(pending()?.is_empty())
}

pub(crate) fn install<I: IntoIterator<Item = Interceptor>>(interceptors: I) -> Result<(), Error> {
    let mut registry = INTERCEPTORS.lock()?;
    for interceptor in interceptors {
        registry.add(interceptor);
    }

    Ok(())
}

/// Answers requests from the global interceptors and hands everything else to `inner`.
#[derive(Debug, Clone)]
pub struct InterceptingHttpClient {
    inner: Arc<dyn HttpClient + Send + Sync>,
}

impl InterceptingHttpClient {
    pub fn new(inner: Arc<dyn HttpClient + Send + Sync>) -> Self {
        Self { inner }
    }
}

impl Default for InterceptingHttpClient {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

#[async_trait]
impl HttpClient for InterceptingHttpClient {
    async fn make_request(
        &self,
        endpoint: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error> {
        let canned = INTERCEPTORS.lock()?.take_match(
            Some(endpoint),
            &request_data.method,
            request_data.path(),
        );

        match canned {
            Some(response) => {
                debug!(
                    method = %request_data.method,
                    uri = %request_data.uri,
                    status = response.status_code,
                    "request intercepted"
                );
                Ok(response.to_response_data())
            }
            None => self.inner.make_request(endpoint, request_data).await,
        }
    }
}
