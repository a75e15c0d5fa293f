//! Channel plumbing for the long-lived actors. Every event travels with the
//! span it was sent under, so a display signal and the capture it triggers
//! share one trace.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::Span;

pub mod config_watcher;
pub mod reactor;

pub struct Sender<Event>(UnboundedSender<(Span, Event)>);
pub type Receiver<Event> = UnboundedReceiver<(Span, Event)>;

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = unbounded_channel();
    (Sender(tx), rx)
}

impl<Event> Sender<Event> {
    /// A failed send means the receiving actor is gone and the process is
    /// shutting down; there is nothing useful to do about it.
    pub fn send(&self, event: Event) {
        _ = self.0.send((Span::current(), event));
    }
}

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}
