use crate::{
    error::Error,
    interceptor::{CannedResponse, InterceptorSet, Scope},
    util, RequestData,
};
use hyper::{
    body,
    service::{make_service_fn, service_fn},
    Body, Request, Response, Server, StatusCode,
};
use serde_json::json;
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{sync::oneshot, task::JoinHandle};
use tracing::{debug, error, warn};

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// A local HTTP server answering with canned responses.
///
/// Routes are registered through [`StubServer::scope`] and consumed like interceptors.
/// Requests nothing matches get the fallback response, `404 {"message": "Not Found"}`
/// unless changed. Every received request is recorded.
#[derive(Debug)]
pub struct StubServer {
    address: SocketAddr,
    state: Arc<StubState>,
    shutdown: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<Result<(), hyper::Error>>>,
}

#[derive(Debug)]
struct StubState {
    routes: Mutex<InterceptorSet>,
    received_requests: Mutex<Vec<RequestData>>,
    fallback: Mutex<CannedResponse>,
    error: Mutex<Option<Error>>,
}

impl StubServer {
    /// Binds to an ephemeral port on 127.0.0.1 and serves on the current tokio runtime.
    pub async fn start() -> Result<Self, Error> {
        let state = Arc::new(StubState::new());
        let service_state = state.clone();

        let server = Server::try_bind(&SocketAddr::from(([127, 0, 0, 1], 0)))?.serve(
            make_service_fn(move |_| {
                let state = service_state.clone();
                async move {
                    Ok::<_, Infallible>(service_fn(move |request| {
                        let state = state.clone();
                        async move { Ok::<_, Infallible>(state.respond(request).await) }
                    }))
                }
            }),
        );

        let address = server.local_addr();
        let (shutdown, shutdown_signal) = oneshot::channel::<()>();
        let join_handle = tokio::spawn(server.with_graceful_shutdown(async {
            let _ = shutdown_signal.await;
        }));

        debug!(%address, "stub server listening");

        Ok(Self {
            address,
            state,
            shutdown: Some(shutdown),
            join_handle: Some(join_handle),
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn uri(&self) -> String {
        format!("http://{}", self.address)
    }

    /// Registers routes on this server only; the global interceptors are not involved.
    pub fn scope(&self) -> Scope<'_> {
        Scope::new(&self.state.routes, None)
    }

    pub fn set_fallback(&self, response: CannedResponse) -> Result<(), Error> {
        *self.state.fallback.lock()? = response;
        Ok(())
    }

    pub fn received_requests(&self) -> Result<Vec<RequestData>, Error> {
        Ok(self.state.received_requests.lock()?.clone())
    }

    pub fn pending(&self) -> Result<Vec<String>, Error> {
        Ok(self.state.routes.lock()?.pending())
    }

    /// Stops the server and reports the first error raised while answering requests.
    pub async fn shutdown(mut self) -> Result<(), Error> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        if let Some(mut join_handle) = self.join_handle.take() {
            match tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, &mut join_handle).await {
                Ok(Ok(result)) => result?,
                Ok(Err(e)) => warn!(error = %e, "stub server task ended abnormally"),
                Err(_) => {
                    warn!(address = %self.address, "stub server did not stop in time");
                    join_handle.abort();
                }
            }
        }

        match self.state.error.lock()?.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

impl StubState {
    fn new() -> Self {
        Self {
            routes: Mutex::new(InterceptorSet::default()),
            received_requests: Mutex::new(Vec::new()),
            fallback: Mutex::new(CannedResponse::json(404, json!({ "message": "Not Found" }))),
            error: Mutex::new(None),
        }
    }

    async fn respond(&self, request: Request<Body>) -> Response<Body> {
        match self.try_respond(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "stub server could not answer");
                if let Ok(mut error) = self.error.lock() {
                    error.get_or_insert(e);
                }

                let mut response = Response::new(Body::empty());
                *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        }
    }

    async fn try_respond(&self, request: Request<Body>) -> Result<Response<Body>, Error> {
        let request_data = read_request_data(request).await?;

        let route = self
            .routes
            .lock()?
            .take_match(None, &request_data.method, request_data.path());
        let canned = match route {
            Some(canned) => canned,
            None => {
                debug!(
                    method = %request_data.method,
                    uri = %request_data.uri,
                    "no stubbed route, using fallback"
                );
                self.fallback.lock()?.clone()
            }
        };

        self.received_requests.lock()?.push(request_data);

        let mut response_builder = Response::builder().status(canned.status_code);
        util::put_headers(
            response_builder.headers_mut().ok_or(Error::InvalidBody)?,
            &canned.headers,
        )?;

        Ok(response_builder.body(canned.body.into())?)
    }
}

async fn read_request_data(request: Request<Body>) -> Result<RequestData, Error> {
    let (parts, body) = request.into_parts();
    let headers = util::extract_headers(&parts.headers);

    let body = body::to_bytes(body).await.map_err(|_| Error::InvalidBody)?;

    Ok(RequestData {
        method: parts.method,
        uri: parts.uri.to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into(),
    })
}
