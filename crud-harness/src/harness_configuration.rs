use crate::interceptor::{Interceptor, InterceptorsBuilder};

#[derive(Debug, Default)]
pub struct HarnessConfiguration {
    log_filter: Option<String>,
    fail_on_pending_interceptors: bool,
    interceptors: Vec<Interceptor>,
}

impl HarnessConfiguration {
    pub fn new() -> Self {
        Self {
            log_filter: None,
            fail_on_pending_interceptors: false,
            interceptors: Vec::new(),
        }
    }

    /// An `EnvFilter` directive such as `crud_harness=debug`. Overrides `RUST_LOG`.
    pub fn set_log_filter<S: Into<String>>(&mut self, filter: S) {
        self.log_filter = Some(filter.into());
    }

    pub fn log_filter(&self) -> Option<&str> {
        self.log_filter.as_deref()
    }

    /// Make the session fail when an interceptor registered during the test was never used.
    pub fn set_fail_on_pending_interceptors(&mut self, value: bool) {
        self.fail_on_pending_interceptors = value;
    }

    pub fn fail_on_pending_interceptors(&self) -> bool {
        self.fail_on_pending_interceptors
    }

    /// Interceptors for `endpoint` installed when the session starts.
    pub fn add_interceptors<S, F>(&mut self, endpoint: S, func: F)
    where
        S: AsRef<str>,
        F: FnOnce(&mut InterceptorsBuilder) -> &mut InterceptorsBuilder,
    {
        let mut interceptors = InterceptorsBuilder::new(endpoint);
        let _ = func(&mut interceptors);
        self.interceptors.extend(interceptors.into_interceptors());
    }

    pub(crate) fn take_interceptors(&mut self) -> Vec<Interceptor> {
        std::mem::take(&mut self.interceptors)
    }
}
