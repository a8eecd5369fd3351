//! BuildExecutor trait definition.

use gantry_types::error::DispatchError;
use gantry_types::workflow::DispatchRequest;

/// Raw response from the build executor's trigger endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorResponse {
    pub status: u16,
    pub body: String,
}

/// The external system that actually runs builds.
///
/// Implementations perform exactly one call per `trigger` and never retry;
/// classification of the response is left to `BuildDispatcher`. Transport
/// problems (connection refused, unreadable response) are reported as
/// `DispatchError`.
pub trait BuildExecutor: Send + Sync {
    fn trigger(
        &self,
        request: &DispatchRequest,
    ) -> impl std::future::Future<Output = Result<ExecutorResponse, DispatchError>> + Send;
}
