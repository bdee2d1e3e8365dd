use crate::{
    error::Error, http_client::HttpClient, interceptor::InterceptingHttpClient, RequestConfig,
    ResponseData,
};
use hyper::Method;
use std::sync::Arc;
use tracing::{debug, error};

/// Builder used to build an Agent instance
#[derive(Debug, Clone, Default)]
pub struct AgentBuilder {
    endpoint: Option<String>,
    http_client: Option<Arc<dyn HttpClient + Send + Sync>>,
}

impl AgentBuilder {
    /// Create a new AgentBuilder instance.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            http_client: None,
        }
    }

    /// Use the given endpoint when building an Agent instance.
    ///
    /// # Arguments
    /// `endpoint` - the base url every request is sent to, e.g. `http://localhost:5000`.
    ///
    /// # Returns
    /// This builder.
    pub fn with_endpoint<T: Into<String>>(mut self, endpoint: T) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Use the given client instead of the default intercepting reqwest client.
    ///
    /// A custom client bypasses the global interceptors unless it is wrapped in an
    /// [`InterceptingHttpClient`] itself.
    ///
    /// # Arguments
    /// `client` - the transport used for every request.
    ///
    /// # Returns
    /// This builder.
    pub fn with_http_client(mut self, client: Arc<dyn HttpClient + Send + Sync>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Consume the builder and create an Agent.
    ///
    /// # Returns
    /// An Agent sending through the configured client, or the intercepting reqwest client.
    ///
    /// # Errors
    /// `Error::NotConfigured` when no endpoint was given.
    pub fn build(mut self) -> Result<Agent, Error> {
        let endpoint = self
            .endpoint
            .take()
            .ok_or_else(|| Error::NotConfigured(String::from("agent endpoint")))?;

        Ok(Agent {
            endpoint,
            http_client: self
                .http_client
                .take()
                .unwrap_or_else(|| Arc::new(InterceptingHttpClient::default())),
        })
    }
}

/// Sends requests to one endpoint. Cloning is cheap and shares the transport.
#[derive(Debug, Clone)]
pub struct Agent {
    endpoint: String,
    http_client: Arc<dyn HttpClient + Send + Sync>,
}

impl Agent {
    pub fn new<T: Into<String>>(endpoint: T) -> Self {
        Agent {
            endpoint: endpoint.into(),
            http_client: Arc::new(InterceptingHttpClient::default()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn get(&self, request: RequestConfig) -> Result<ResponseData, Error> {
        self.send(Method::GET, request).await
    }

    pub async fn post(&self, request: RequestConfig) -> Result<ResponseData, Error> {
        self.send(Method::POST, request).await
    }

    pub async fn put(&self, request: RequestConfig) -> Result<ResponseData, Error> {
        self.send(Method::PUT, request).await
    }

    pub async fn delete(&self, request: RequestConfig) -> Result<ResponseData, Error> {
        self.send(Method::DELETE, request).await
    }

    /// Issues exactly one request and returns the whole response.
    ///
    /// # Errors
    /// Descriptor build errors and transport failures are returned as they are. When the
    /// descriptor carries an expected status and the response has another one, the
    /// response is returned inside `Error::UnexpectedStatus`. All are logged first.
    pub async fn send(&self, method: Method, request: RequestConfig) -> Result<ResponseData, Error> {
        let expected_status = request.expected_status();
        let request_data = match request.into_request_data(method.clone()) {
            Ok(request_data) => request_data,
            Err(e) => {
                error!(
                    endpoint = %self.endpoint,
                    %method,
                    error = %e,
                    "request could not be built"
                );
                return Err(e);
            }
        };

        debug!(
            endpoint = %self.endpoint,
            method = %request_data.method,
            uri = %request_data.uri,
            "sending request"
        );

        let response = match self
            .http_client
            .make_request(&self.endpoint, &request_data)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!(
                    endpoint = %self.endpoint,
                    method = %request_data.method,
                    uri = %request_data.uri,
                    error = %e,
                    "request failed"
                );
                return Err(e);
            }
        };

        debug!(status = response.status_code, body = %response.body, "received response");

        match expected_status {
            Some(expected) if expected != response.status_code => {
                error!(
                    method = %request_data.method,
                    uri = %request_data.uri,
                    expected,
                    actual = response.status_code,
                    response = ?response,
                    "unexpected status code"
                );

                Err(Error::UnexpectedStatus {
                    expected,
                    actual: response.status_code,
                    response: Box::new(response),
                })
            }
            _ => Ok(response),
        }
    }
}
