//! Cooperative cancellation for batch dispatch
//!
//! A `CancelHandle` can be fired any number of times from anywhere (signal
//! handlers included). The paired `CancelSignal` is only consulted by the
//! dispatcher, right before it hands out the next operation; running
//! transfers never look at it. Once a request has been observed the signal
//! stays cancelled, so a signal reused for a later batch stops it at once.

use crossbeam::channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};

/// Fires cancellation requests
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Sender<()>,
}

impl CancelHandle {
    /// Request cancellation; repeated calls queue repeated signals
    pub fn cancel(&self) {
        // The signal side may already be gone once the batch has finished
        let _ = self.tx.send(());
    }
}

/// Receives cancellation requests
#[derive(Debug)]
pub struct CancelSignal {
    rx: Receiver<()>,
    cancelled: AtomicBool,
    // Keeps the channel connected after every handle is dropped, so a
    // blocking select on `rx` only ever wakes for a real request.
    _keepalive: Sender<()>,
}

impl CancelSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_handle, signal) = cancel_channel();
        signal
    }

    /// Whether cancellation has been requested, without blocking
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        if self.rx.try_recv().is_ok() {
            self.latch();
            return true;
        }
        false
    }

    /// Record a request received through `receiver()`
    pub(crate) fn latch(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

/// Create a connected handle/signal pair
pub fn cancel_channel() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = unbounded();
    let signal = CancelSignal {
        rx,
        cancelled: AtomicBool::new(false),
        _keepalive: tx.clone(),
    };
    (CancelHandle { tx }, signal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_starts_clear() {
        let (_handle, signal) = cancel_channel();
        assert!(!signal.is_cancelled());
    }

    #[test]
    fn test_cancel_stays_latched() {
        let (handle, signal) = cancel_channel();
        handle.clone().cancel();

        assert!(signal.is_cancelled());
        assert!(signal.is_cancelled());
        assert!(signal.receiver().try_recv().is_err());
    }

    #[test]
    fn test_latch_from_receiver() {
        let (handle, signal) = cancel_channel();
        handle.cancel();
        signal.receiver().recv().unwrap();
        signal.latch();

        assert!(signal.is_cancelled());
    }

    #[test]
    fn test_never_signal_stays_clear() {
        let signal = CancelSignal::never();
        assert!(!signal.is_cancelled());
        let waited = signal
            .receiver()
            .recv_timeout(std::time::Duration::from_millis(20));
        assert!(waited.is_err());
    }

    #[test]
    fn test_cancel_after_signal_dropped_is_harmless() {
        let (handle, signal) = cancel_channel();
        drop(signal);
        handle.cancel();
    }
}
