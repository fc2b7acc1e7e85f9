use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// Stop signal shared between the turn-consuming loop and the UI.
///
/// Each request arms a fresh underlying token via [`StopToken::reset`];
/// [`StopToken::cancel`] trips the current one and is idempotent. The
/// consuming loop polls [`StopToken::is_cancelled`] between events and
/// selects on [`StopToken::cancelled`] while blocked on the network, so a
/// stop request interrupts a pending read instead of waiting for it.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    current: Arc<Mutex<CancellationToken>>,
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a fresh token for the next request, clearing any previous stop.
    pub fn reset(&self) {
        *self.lock() = CancellationToken::new();
    }

    pub fn cancel(&self) {
        self.lock().cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().is_cancelled()
    }

    /// Resolves once the current request is cancelled.
    pub async fn cancelled(&self) {
        let token = self.lock().clone();
        token.cancelled().await;
    }

    fn lock(&self) -> MutexGuard<'_, CancellationToken> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
