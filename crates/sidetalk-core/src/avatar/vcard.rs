//! vCard retrieval sub-protocol seam.
//!
//! The XMPP layer owns the actual `vcard-temp` machinery. The avatar
//! pipeline only needs to attach it to the stream and ask for one card,
//! receiving the reply through a oneshot rather than a delegate callback.

use async_trait::async_trait;
use tokio::sync::oneshot;

use sidetalk_protocol::Jid;

use crate::error::VCardResult;

/// The parts of a `vcard-temp` result the sync engine reads
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VCardTemp {
    /// Base64 `PHOTO/BINVAL`, as received
    pub photo: Option<String>,
}

impl VCardTemp {
    pub fn with_photo(photo: impl Into<String>) -> Self {
        Self {
            photo: Some(photo.into()),
        }
    }
}

#[async_trait]
pub trait VCardService: Send + Sync {
    /// Attach the vCard and avatar modules to the live stream.
    async fn activate(&self) -> VCardResult<()>;

    /// Request the vCard of `jid`; the reply goes to `reply`.
    ///
    /// Dropping `reply` without sending means no card will arrive.
    fn request(&self, jid: &Jid, ignore_storage: bool, reply: oneshot::Sender<VCardTemp>);
}
