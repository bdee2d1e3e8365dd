use crate::{
    error::Error,
    interceptor::{self, CannedResponse},
    Agent, RequestConfig, ResponseData,
};
use serde_json::json;

/// The reply a server gives when it falls over.
pub fn server_error_response() -> CannedResponse {
    CannedResponse::json(
        500,
        json!({
            "status": 500,
            "message": "Internal Server Error",
        }),
    )
}

/// Makes the next `GET /` sent to `endpoint` answer with a 500 instead of reaching the network.
pub fn mock_server_error<S: AsRef<str>>(endpoint: S) -> Result<(), Error> {
    interceptor::intercept(endpoint)
        .get("/")
        .reply(server_error_response())
}

/// Mocks a server error on `endpoint` and performs the `GET /` that observes it.
pub async fn mock_get_request_server_error<S: AsRef<str>>(
    endpoint: S,
) -> Result<ResponseData, Error> {
    mock_server_error(endpoint.as_ref())?;

    Agent::new(endpoint.as_ref())
        .get(RequestConfig::new("/"))
        .await
}
