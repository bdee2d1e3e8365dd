use crate::{error::Error, interceptor, logging, HarnessConfiguration};
use futures::future::BoxFuture;
use lazy_static::lazy_static;
use std::{
    any::Any,
    future::Future,
    mem,
    sync::{Arc, Mutex},
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::{debug, error, warn};

type Teardown = BoxFuture<'static, Result<(), Error>>;

lazy_static! {
    static ref SESSION_LOCK: Arc<AsyncMutex<()>> = Arc::new(AsyncMutex::new(()));
}

tokio::task_local! {
    static CURRENT_SESSION: Arc<SessionResources>;
}

#[derive(Default)]
struct SessionResources {
    teardowns: Mutex<Vec<Teardown>>,
    resources: Mutex<Vec<Box<dyn Any + Send>>>,
}

/// One test case's claim on the process-wide harness state.
///
/// Sessions run one at a time: the global interceptors belong to whichever session
/// holds the lock. Teardowns and kept-alive resources belong to the session whose
/// [`TestSession::scope`] the calling code runs in.
#[must_use = "a test session has to be finished with `after_test`"]
pub struct TestSession {
    configuration: HarnessConfiguration,
    resources: Arc<SessionResources>,
    _guard: OwnedMutexGuard<()>,
}

impl TestSession {
    pub async fn before_test(mut configuration: HarnessConfiguration) -> Result<Self, Error> {
        let guard = SESSION_LOCK.clone().lock_owned().await;
        logging::init_logging(configuration.log_filter());

        interceptor::clean_all()?;
        interceptor::install(configuration.take_interceptors())?;

        debug!("test session started");

        Ok(Self {
            configuration,
            resources: Arc::new(SessionResources::default()),
            _guard: guard,
        })
    }

    /// Runs `future` as the body of this session, so that it can register teardowns
    /// and keep resources alive.
    pub fn scope<F: Future>(&self, future: F) -> impl Future<Output = F::Output> {
        CURRENT_SESSION.scope(self.resources.clone(), future)
    }

    /// Queues a cleanup action. Teardowns run in reverse registration order when the
    /// session ends, whether the test passed or panicked.
    ///
    /// # Errors
    /// `Error::NotConfigured` outside of a session's scope.
    pub fn register_teardown<F>(teardown: F) -> Result<(), Error>
    where
        F: Future<Output = Result<(), Error>> + Send + 'static,
    {
        current_session()?.teardowns.lock()?.push(Box::pin(teardown));
        Ok(())
    }

    /// Keeps `resource` alive until every teardown has run.
    ///
    /// # Errors
    /// `Error::NotConfigured` outside of a session's scope.
    pub fn keep_alive<T: Send + 'static>(resource: T) -> Result<(), Error> {
        current_session()?.resources.lock()?.push(Box::new(resource));
        Ok(())
    }

    /// Runs the teardowns, releases kept resources and resets the interceptors.
    ///
    /// # Errors
    /// The first failed teardown, or the pending interceptors when the configuration
    /// asks for it. Every teardown runs regardless.
    pub async fn after_test(self) -> Result<(), Error> {
        let mut result = Ok(());

        let teardowns = mem::take(&mut *self.resources.teardowns.lock()?);
        for teardown in teardowns.into_iter().rev() {
            if let Err(e) = teardown.await {
                error!(error = %e, "teardown failed");
                if result.is_ok() {
                    result = Err(Error::Teardown(Box::new(e)));
                }
            }
        }

        let resources = mem::take(&mut *self.resources.resources.lock()?);
        for resource in resources.into_iter().rev() {
            drop(resource);
        }

        let pending = interceptor::pending()?;
        if !pending.is_empty() {
            if self.configuration.fail_on_pending_interceptors() && result.is_ok() {
                result = Err(Error::PendingInterceptors(pending));
            } else {
                warn!(?pending, "interceptors left unused");
            }
        }

        interceptor::clean_all()?;
        debug!("test session finished");

        result
    }
}

fn current_session() -> Result<Arc<SessionResources>, Error> {
    CURRENT_SESSION
        .try_with(Arc::clone)
        .map_err(|_| Error::NotConfigured(String::from("no active test session")))
}
