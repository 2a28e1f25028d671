//! Cold, restartable avatar stream
//!
//! Every subscription is its own pipeline run: it is seeded with `None` so
//! the UI can draw a fallback immediately, then a background task checks the
//! avatar store and, on a miss, asks the vCard service. Each run ends after
//! exactly one result. Nothing is shared between runs except the store.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, warn};

use sidetalk_protocol::Jid;

use super::{decode_photo, Avatar};
use crate::connection::Connection;

/// Avatar stream of one contact. Inert until subscribed.
pub struct AvatarStream {
    jid: Jid,
    connection: Arc<Connection>,
}

impl AvatarStream {
    pub(crate) fn new(jid: Jid, connection: Arc<Connection>) -> Self {
        Self { jid, connection }
    }

    /// Start a fresh pipeline run.
    ///
    /// The first item is always `None`. The fetch runs on the connection's
    /// runtime, or the ambient Tokio runtime; without either, the
    /// subscription ends after the sentinel.
    pub fn subscribe(&self) -> AvatarSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        // Seeded before any work so the fallback is there synchronously
        let _ = tx.send(None);

        match self.connection.runtime() {
            Some(runtime) => {
                let run = FetchRun {
                    jid: self.jid.clone(),
                    connection: Arc::clone(&self.connection),
                    tx,
                };
                runtime.spawn(run.execute());
            }
            None => warn!(jid = %self.jid, "No Tokio runtime available, avatar fetch skipped"),
        }

        AvatarSubscription {
            inner: UnboundedReceiverStream::new(rx),
        }
    }
}

/// One run of the avatar pipeline, as seen by its subscriber.
///
/// Yields `None` first, then the fetch result, then ends. Dropping it stops
/// delivery; work already in flight is left to finish.
#[derive(Debug)]
pub struct AvatarSubscription {
    inner: UnboundedReceiverStream<Option<Avatar>>,
}

impl Stream for AvatarSubscription {
    type Item = Option<Avatar>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

struct FetchRun {
    jid: Jid,
    connection: Arc<Connection>,
    tx: mpsc::UnboundedSender<Option<Avatar>>,
}

impl FetchRun {
    async fn execute(self) {
        let avatar = self.resolve().await;
        debug!(jid = %self.jid, found = avatar.is_some(), "Avatar fetch finished");
        if self.tx.send(avatar).is_err() {
            debug!(jid = %self.jid, "Avatar subscriber went away before the result");
        }
    }

    async fn resolve(&self) -> Option<Avatar> {
        if let Some(data) = self.connection.avatars().photo_data(&self.jid).await {
            debug!(jid = %self.jid, bytes = data.len(), "Avatar cache hit");
            return match Avatar::from_bytes(data) {
                Ok(avatar) => Some(avatar),
                Err(e) => {
                    warn!(jid = %self.jid, error = %e, "Cached avatar is undecodable");
                    None
                }
            };
        }

        debug!(jid = %self.jid, "Avatar cache miss");
        if self.tx.is_closed() {
            return None;
        }
        self.fetch_from_network().await
    }

    async fn fetch_from_network(&self) -> Option<Avatar> {
        let vcard = self.connection.vcard();
        let config = &self.connection.config().avatar;

        if let Err(e) = vcard.activate().await {
            warn!(jid = %self.jid, error = %e, "Could not activate vCard retrieval");
            return None;
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        vcard.request(&self.jid, config.ignore_storage, reply_tx);

        let card = match tokio::time::timeout(config.fetch_timeout(), reply_rx).await {
            Ok(Ok(card)) => card,
            Ok(Err(_)) => {
                warn!(jid = %self.jid, "vCard request ended without a reply");
                return None;
            }
            Err(_) => {
                warn!(
                    jid = %self.jid,
                    timeout_ms = config.fetch_timeout_ms,
                    "vCard request timed out"
                );
                return None;
            }
        };

        let Some(photo) = card.photo else {
            debug!(jid = %self.jid, "vCard has no photo");
            return None;
        };

        let avatar = match decode_photo(&photo).and_then(Avatar::from_bytes) {
            Ok(avatar) => avatar,
            Err(e) => {
                warn!(jid = %self.jid, error = %e, "vCard photo is undecodable");
                return None;
            }
        };

        if config.cache_fetched {
            self.connection
                .avatars()
                .save(&self.jid, avatar.data().clone())
                .await;
        }
        Some(avatar)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use base64::Engine as _;
    use bytes::Bytes;
    use tokio_stream::StreamExt;

    use super::*;
    use crate::avatar::{png_fixture, AvatarStore, InMemoryAvatarStore, VCardService, VCardTemp};
    use crate::config::{AvatarConfig, SyncConfig};
    use crate::error::{VCardError, VCardResult};

    #[derive(Clone)]
    enum Reply {
        Card(VCardTemp),
        Drop,
        Hang,
    }

    struct FakeVCard {
        reply: Reply,
        fail_activation: bool,
        activations: AtomicUsize,
        requests: Mutex<Vec<(Jid, bool)>>,
        pending: Mutex<Vec<oneshot::Sender<VCardTemp>>>,
    }

    impl FakeVCard {
        fn new(reply: Reply) -> Arc<Self> {
            Self::build(reply, false)
        }

        fn failing() -> Arc<Self> {
            Self::build(Reply::Drop, true)
        }

        fn build(reply: Reply, fail_activation: bool) -> Arc<Self> {
            Arc::new(Self {
                reply,
                fail_activation,
                activations: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                pending: Mutex::new(Vec::new()),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl VCardService for FakeVCard {
        async fn activate(&self) -> VCardResult<()> {
            self.activations.fetch_add(1, Ordering::SeqCst);
            if self.fail_activation {
                return Err(VCardError::NotConnected);
            }
            Ok(())
        }

        fn request(&self, jid: &Jid, ignore_storage: bool, reply: oneshot::Sender<VCardTemp>) {
            self.requests.lock().unwrap().push((jid.clone(), ignore_storage));
            match &self.reply {
                Reply::Card(card) => {
                    let _ = reply.send(card.clone());
                }
                Reply::Drop => drop(reply),
                Reply::Hang => self.pending.lock().unwrap().push(reply),
            }
        }
    }

    fn jid() -> Jid {
        "frank@example.com".parse().unwrap()
    }

    fn encoded_png() -> String {
        base64::engine::general_purpose::STANDARD.encode(png_fixture(4, 4))
    }

    fn stream_with(
        store: &InMemoryAvatarStore,
        vcard: Arc<FakeVCard>,
        avatar: AvatarConfig,
    ) -> AvatarStream {
        let connection = Connection::new(
            "me@example.com".parse().unwrap(),
            Arc::new(store.clone()),
            vcard,
        )
        .with_config(SyncConfig {
            avatar,
            ..Default::default()
        });
        AvatarStream::new(jid(), Arc::new(connection))
    }

    fn no_write_back() -> AvatarConfig {
        AvatarConfig {
            cache_fetched: false,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn cache_hit_skips_network() {
        let store = InMemoryAvatarStore::new();
        let cached = Bytes::from(png_fixture(2, 2));
        store.save(&jid(), cached.clone()).await;
        let vcard = FakeVCard::new(Reply::Drop);

        let stream = stream_with(&store, vcard.clone(), AvatarConfig::default());
        let items: Vec<_> = stream.subscribe().collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_none());
        assert_eq!(items[1].as_ref().unwrap().data(), &cached);
        assert_eq!(vcard.activations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cache_miss_fetches_and_writes_back() {
        let store = InMemoryAvatarStore::new();
        let vcard = FakeVCard::new(Reply::Card(VCardTemp::with_photo(encoded_png())));

        let stream = stream_with(&store, vcard.clone(), AvatarConfig::default());
        let items: Vec<_> = stream.subscribe().collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_none());
        assert_eq!(items[1].as_ref().unwrap().width(), 4);
        assert_eq!(vcard.requests.lock().unwrap().as_slice(), &[(jid(), true)]);
        assert_eq!(store.photo_data(&jid()).await, Some(Bytes::from(png_fixture(4, 4))));
    }

    #[tokio::test]
    async fn missing_photo_degrades_to_none() {
        let store = InMemoryAvatarStore::new();
        let vcard = FakeVCard::new(Reply::Card(VCardTemp::default()));

        let items: Vec<_> = stream_with(&store, vcard, AvatarConfig::default())
            .subscribe()
            .collect()
            .await;

        assert_eq!(items, vec![None, None]);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn undecodable_photo_degrades_to_none() {
        let store = InMemoryAvatarStore::new();
        let garbage = base64::engine::general_purpose::STANDARD.encode(b"not an image");
        let vcard = FakeVCard::new(Reply::Card(VCardTemp::with_photo(garbage)));

        let items: Vec<_> = stream_with(&store, vcard, AvatarConfig::default())
            .subscribe()
            .collect()
            .await;

        assert_eq!(items, vec![None, None]);
    }

    #[tokio::test]
    async fn undecodable_cache_entry_degrades_to_none() {
        let store = InMemoryAvatarStore::new();
        store.save(&jid(), Bytes::from_static(b"corrupt")).await;
        let vcard = FakeVCard::new(Reply::Drop);

        let items: Vec<_> = stream_with(&store, vcard.clone(), AvatarConfig::default())
            .subscribe()
            .collect()
            .await;

        assert_eq!(items, vec![None, None]);
        assert_eq!(vcard.request_count(), 0);
    }

    #[tokio::test]
    async fn dropped_reply_degrades_to_none() {
        let store = InMemoryAvatarStore::new();
        let items: Vec<_> = stream_with(&store, FakeVCard::new(Reply::Drop), AvatarConfig::default())
            .subscribe()
            .collect()
            .await;

        assert_eq!(items, vec![None, None]);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let store = InMemoryAvatarStore::new();
        let vcard = FakeVCard::new(Reply::Hang);
        let config = AvatarConfig {
            fetch_timeout_ms: 20,
            ..Default::default()
        };

        let items: Vec<_> = stream_with(&store, vcard.clone(), config)
            .subscribe()
            .collect()
            .await;

        assert_eq!(items, vec![None, None]);
        assert_eq!(vcard.pending.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn activation_failure_skips_request() {
        let store = InMemoryAvatarStore::new();
        let vcard = FakeVCard::failing();

        let items: Vec<_> = stream_with(&store, vcard.clone(), AvatarConfig::default())
            .subscribe()
            .collect()
            .await;

        assert_eq!(items, vec![None, None]);
        assert_eq!(vcard.activations.load(Ordering::SeqCst), 1);
        assert_eq!(vcard.request_count(), 0);
    }

    #[tokio::test]
    async fn each_subscription_runs_independently() {
        let store = InMemoryAvatarStore::new();
        let vcard = FakeVCard::new(Reply::Card(VCardTemp::with_photo(encoded_png())));
        let stream = stream_with(&store, vcard.clone(), no_write_back());

        let first: Vec<_> = stream.subscribe().collect().await;
        let second: Vec<_> = stream.subscribe().collect().await;

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert!(first[0].is_none() && first[1].is_some());
        assert_eq!(vcard.activations.load(Ordering::SeqCst), 2);
        assert_eq!(vcard.request_count(), 2);
    }

    #[tokio::test]
    async fn written_back_avatar_serves_later_runs() {
        let store = InMemoryAvatarStore::new();
        let vcard = FakeVCard::new(Reply::Card(VCardTemp::with_photo(encoded_png())));
        let stream = stream_with(&store, vcard.clone(), AvatarConfig::default());

        let first: Vec<_> = stream.subscribe().collect().await;
        let second: Vec<_> = stream.subscribe().collect().await;

        assert_eq!(first, second);
        assert_eq!(vcard.request_count(), 1);
    }

    #[tokio::test]
    async fn dropped_subscription_skips_network() {
        let store = InMemoryAvatarStore::new();
        let vcard = FakeVCard::new(Reply::Card(VCardTemp::with_photo(encoded_png())));
        let stream = stream_with(&store, vcard.clone(), AvatarConfig::default());

        drop(stream.subscribe());
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(vcard.request_count(), 0);
    }

    #[test]
    fn without_runtime_only_the_sentinel_arrives() {
        let store = InMemoryAvatarStore::new();
        let stream = stream_with(&store, FakeVCard::new(Reply::Drop), AvatarConfig::default());

        let items: Vec<_> = futures::executor::block_on(stream.subscribe().collect());
        assert_eq!(items, vec![None]);
    }

    #[test]
    fn explicit_runtime_runs_fetch_off_caller_thread() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let store = InMemoryAvatarStore::new();
        let vcard = FakeVCard::new(Reply::Card(VCardTemp::with_photo(encoded_png())));
        let connection = Connection::new(
            "me@example.com".parse().unwrap(),
            Arc::new(store.clone()),
            vcard,
        )
        .with_runtime(runtime.handle().clone());
        let stream = AvatarStream::new(jid(), Arc::new(connection));

        let items: Vec<_> = futures::executor::block_on(stream.subscribe().collect());
        assert_eq!(items.len(), 2);
        assert!(items[1].is_some());
    }
}
