mod agent;
mod data;
mod error;
mod harness_configuration;
mod http_client;
pub mod interceptor;
mod logging;
pub mod mock;
mod request;
mod stub_server;
mod test_session;
mod util;

pub use agent::{Agent, AgentBuilder};
pub use crud_harness_codegen::harness_test;
pub use data::{RequestData, ResponseData};
pub use error::Error;
pub use harness_configuration::HarnessConfiguration;
pub use http_client::{HttpClient, ReqwestHttpClient};
pub use hyper::Method;
pub use interceptor::{intercept, CannedResponse, InterceptingHttpClient};
pub use logging::init_logging;
pub use request::{RequestBody, RequestConfig};
pub use stub_server::StubServer;
pub use test_session::TestSession;

#[doc(hidden)]
pub mod __private {
    pub use futures::FutureExt;
    pub use std::panic::{resume_unwind, AssertUnwindSafe};

    pub fn with_output<T, F: std::future::Future<Output = T>>(future: F) -> F {
        future
    }
}
