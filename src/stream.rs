//! Async streams of overlay lifecycle events.
//!
//! Hosts subscribe to these to learn when to redraw: every push, settle, pop
//! and props change produces one [`OverlayEvent`].

use std::pin::Pin;

use futures_core::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::handler::Outcome;
use crate::stack::EntryId;
use crate::token::ViewToken;

/// Type alias for a boxed async stream of events.
pub type EventStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

/// Lifecycle event emitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    /// A show cycle pushed its entry onto the active stack.
    Pushed { token: ViewToken, entry: EntryId },
    /// The view resolved or rejected; the entry is now hidden.
    Settled {
        token: ViewToken,
        entry: EntryId,
        outcome: Outcome,
    },
    /// The grace delay elapsed and the entry left the stack.
    Popped { token: ViewToken, entry: EntryId },
    /// Props were buffered for a token that is not on the stack yet.
    PropsBuffered { token: ViewToken },
    /// Props of an active token were updated in place.
    PropsUpdated { token: ViewToken },
}

impl OverlayEvent {
    /// Token the event is about.
    pub fn token(&self) -> &ViewToken {
        match self {
            OverlayEvent::Pushed { token, .. }
            | OverlayEvent::Settled { token, .. }
            | OverlayEvent::Popped { token, .. }
            | OverlayEvent::PropsBuffered { token }
            | OverlayEvent::PropsUpdated { token } => token,
        }
    }
}

/// A sender for events in an async stream.
#[derive(Debug)]
pub struct EventSender<T> {
    tx: mpsc::Sender<T>,
}

impl<T> EventSender<T> {
    /// Create a new event sender from an mpsc sender.
    pub fn new(tx: mpsc::Sender<T>) -> Self {
        Self { tx }
    }

    /// Try to send an event without waiting.
    ///
    /// Returns `Err(event)` if the channel is full or closed.
    pub fn try_send(&self, event: T) -> Result<(), T> {
        self.tx.try_send(event).map_err(|e| match e {
            mpsc::error::TrySendError::Full(v) => v,
            mpsc::error::TrySendError::Closed(v) => v,
        })
    }

    /// Check if the receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<T> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Builder for creating event streams.
pub struct StreamBuilder<T> {
    buffer_size: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T: Send + 'static> StreamBuilder<T> {
    /// Create a new stream builder with default settings.
    pub fn new() -> Self {
        Self {
            buffer_size: 100,
            _marker: std::marker::PhantomData,
        }
    }

    /// Set the buffer size for the underlying channel.
    ///
    /// Default is 100.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Build the stream and sender.
    pub fn build(self) -> (EventSender<T>, EventStream<T>) {
        let (tx, rx) = mpsc::channel(self.buffer_size);
        let sender = EventSender::new(tx);
        let stream: EventStream<T> = Box::pin(ReceiverStream::new(rx));
        (sender, stream)
    }
}

impl<T: Send + 'static> Default for StreamBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_stream_builder() {
        let (sender, stream) = StreamBuilder::<OverlayEvent>::new().buffer_size(10).build();

        sender
            .try_send(OverlayEvent::PropsBuffered {
                token: "a".into(),
            })
            .unwrap();
        sender
            .try_send(OverlayEvent::PropsUpdated { token: "b".into() })
            .unwrap();
        drop(sender);

        let tokens: Vec<_> = stream.map(|event| event.token().to_string()).collect().await;
        assert_eq!(tokens, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_try_send_full_and_closed() {
        let (sender, stream) = StreamBuilder::<u32>::new().buffer_size(1).build();

        assert!(sender.try_send(1).is_ok());
        assert_eq!(sender.try_send(2), Err(2));

        drop(stream);
        assert!(sender.is_closed());
        assert_eq!(sender.try_send(3), Err(3));
    }
}
