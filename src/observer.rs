#![cfg(feature = "std")]

pub use crate::common::LogKind;

/// Sink for human-readable session notifications.
pub trait Observer: Send {
    fn on_message(&mut self, text: &str, kind: LogKind);
}

impl<F> Observer for F
where
    F: FnMut(&str, LogKind) + Send,
{
    fn on_message(&mut self, text: &str, kind: LogKind) {
        self(text, kind)
    }
}

/// Forwards notifications to the `log` facade, errors at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_message(&mut self, text: &str, kind: LogKind) {
        match kind {
            LogKind::Error => log::warn!("[{:?}] {}", kind, text),
            _ => log::info!("[{:?}] {}", kind, text),
        }
    }
}
