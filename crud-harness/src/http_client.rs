use crate::{error::Error, util, RequestData, ResponseData};
use async_trait::async_trait;
use std::fmt::Debug;
use tokio::sync::OnceCell;

#[async_trait]
pub trait HttpClient: Debug {
    async fn make_request(
        &self,
        endpoint: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error>;
}

/// Sends requests with reqwest. Redirects are never followed, so every call is exactly
/// one request and the status seen is the status the server sent.
#[derive(Debug, Default)]
pub struct ReqwestHttpClient {
    // built on first use; building only fails when the TLS backend cannot start
    client: OnceCell<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: OnceCell::new(),
        }
    }

    /// Use a pre-configured client, redirect policy included, as it is.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: OnceCell::new_with(Some(client)),
        }
    }

    async fn client(&self) -> Result<&reqwest::Client, Error> {
        self.client
            .get_or_try_init(|| async {
                reqwest::Client::builder()
                    .redirect(reqwest::redirect::Policy::none())
                    .build()
            })
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn make_request(
        &self,
        endpoint: &str,
        request_data: &RequestData,
    ) -> Result<ResponseData, Error> {
        let url = util::join_url(endpoint, &request_data.uri);
        let mut request = self
            .client()
            .await?
            .request(request_data.method.clone(), url.as_str())
            .body(request_data.body.clone());

        let mut headers = reqwest::header::HeaderMap::new();
        util::put_headers(
            &mut headers,
            request_data
                .headers
                .iter()
                .filter(|(header_name, _)| header_name.as_str() != "host"),
        )?;
        request = request.headers(headers);

        let response = request.send().await?;

        let status_code = response.status().as_u16();
        let headers = util::extract_headers(response.headers());
        let body = response.bytes().await?;

        Ok(ResponseData::new(
            status_code,
            headers,
            String::from_utf8_lossy(&body).into(),
        ))
    }
}
