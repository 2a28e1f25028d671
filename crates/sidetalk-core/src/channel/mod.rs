//! Push-only fan-out channels.
//!
//! A [`Channel`] delivers each value to every subscription that exists at
//! the moment it is sent. There is no replay: a late subscriber only sees
//! values sent after it subscribed.

use futures::Stream;
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;
use tracing::warn;

/// Publishing side, owned by whoever produces the values.
#[derive(Debug)]
pub struct Channel<T> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone + Send + 'static> Channel<T> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Push `value` to current subscribers, returning how many there were.
    pub fn send(&self, value: T) -> usize {
        // No subscribers is not an error for a push-only channel
        self.sender.send(value).unwrap_or(0)
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Receiving side of a [`Channel`].
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: broadcast::Receiver<T>,
}

impl<T: Clone + Send + 'static> Subscription<T> {
    /// Next value, or `None` once the channel has been dropped.
    ///
    /// A subscriber that falls more than the channel capacity behind skips
    /// the values it missed.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.recv().await {
                Ok(value) => return Some(value),
                Err(RecvError::Closed) => return None,
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber lagged, dropping missed values");
                }
            }
        }
    }

    /// Next already-delivered value, without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        loop {
            match self.receiver.try_recv() {
                Ok(value) => return Some(value),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Subscriber lagged, dropping missed values");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = T> + Send {
        BroadcastStream::new(self.receiver).filter_map(|item| match item {
            Ok(value) => Some(value),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "Subscriber lagged, dropping missed values");
                None
            }
        })
    }
}
