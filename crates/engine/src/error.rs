use thiserror::Error;

/// Errors from setting up or starting a timed match.
///
/// Ordinary gameplay never fails; these only cover resource setup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("no tokio runtime available to drive the move timer")]
    NoRuntime,

    #[error("match already started")]
    AlreadyStarted,
}
