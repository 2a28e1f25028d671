//! Avatar cache store trait and implementations

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use sidetalk_protocol::Jid;

/// Persistent cache of raw avatar bytes, keyed by bare JID
#[async_trait]
pub trait AvatarStore: Send + Sync {
    /// Cached photo for `jid`, if any
    async fn photo_data(&self, jid: &Jid) -> Option<Bytes>;

    /// Remember a photo fetched from the network
    async fn save(&self, jid: &Jid, data: Bytes);
}

/// In-memory avatar store, for tests and sessions without persistence
#[derive(Debug, Clone, Default)]
pub struct InMemoryAvatarStore {
    photos: Arc<RwLock<HashMap<Jid, Bytes>>>,
}

impl InMemoryAvatarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn remove(&self, jid: &Jid) -> Option<Bytes> {
        self.photos.write().await.remove(jid)
    }

    pub async fn len(&self) -> usize {
        self.photos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.photos.read().await.is_empty()
    }
}

#[async_trait]
impl AvatarStore for InMemoryAvatarStore {
    async fn photo_data(&self, jid: &Jid) -> Option<Bytes> {
        self.photos.read().await.get(jid).cloned()
    }

    async fn save(&self, jid: &Jid, data: Bytes) {
        self.photos.write().await.insert(jid.clone(), data);
    }
}
