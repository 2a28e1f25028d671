//! Session handle shared by every contact

use std::sync::Arc;

use sidetalk_protocol::Jid;
use tokio::runtime::Handle;

use crate::avatar::{AvatarStore, VCardService};
use crate::config::SyncConfig;

/// Read-only view of the live session: who we are, where avatars are
/// cached, and how to ask the server for vCards.
pub struct Connection {
    myself: Jid,
    avatars: Arc<dyn AvatarStore>,
    vcard: Arc<dyn VCardService>,
    config: SyncConfig,
    runtime: Option<Handle>,
}

impl Connection {
    pub fn new(myself: Jid, avatars: Arc<dyn AvatarStore>, vcard: Arc<dyn VCardService>) -> Self {
        Self {
            myself,
            avatars,
            vcard,
            config: SyncConfig::default(),
            runtime: None,
        }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Run avatar fetches on `runtime` instead of the caller's ambient one.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn myself(&self) -> &Jid {
        &self.myself
    }

    pub fn avatars(&self) -> &Arc<dyn AvatarStore> {
        &self.avatars
    }

    pub fn vcard(&self) -> &Arc<dyn VCardService> {
        &self.vcard
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub(crate) fn runtime(&self) -> Option<Handle> {
        self.runtime
            .clone()
            .or_else(|| Handle::try_current().ok())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("myself", &self.myself)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
