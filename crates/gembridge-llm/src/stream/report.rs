use tokio::sync::mpsc::UnboundedSender;

use crate::error::DecodeError;

/// Receives decode errors that the stream recovers from
///
/// Implemented for closures, unbounded channels and [`TracingReporter`].
pub trait ErrorReporter: Send + Sync {
    /// Record a contained decode error
    fn report(&self, error: &DecodeError);
}

/// Default reporter that logs through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &DecodeError) {
        tracing::warn!(error = %error, "skipping undecodable response object");
    }
}

impl<F> ErrorReporter for F
where
    F: Fn(&DecodeError) + Send + Sync,
{
    fn report(&self, error: &DecodeError) {
        self(error);
    }
}

impl ErrorReporter for UnboundedSender<DecodeError> {
    fn report(&self, error: &DecodeError) {
        // Receiver gone means nobody is listening; nothing else to do
        let _ = self.send(error.clone());
    }
}
