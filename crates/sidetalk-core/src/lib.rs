//! Sidetalk Core - contact state synchronization
//!
//! This crate provides:
//! - Contact identity and display name derivation
//! - Change-only online/presence notifications over push channels
//! - A cold, cache-first avatar fetch stream per contact

pub mod avatar;
pub mod channel;
pub mod config;
pub mod connection;
pub mod contact;
pub mod conversation;
pub mod diff;
pub mod display;
pub mod error;
pub mod identity;

pub use avatar::{Avatar, AvatarStore, AvatarStream, AvatarSubscription, InMemoryAvatarStore};
pub use avatar::{VCardService, VCardTemp};
pub use channel::{Channel, Subscription};
pub use config::{AvatarConfig, SyncConfig};
pub use connection::Connection;
pub use contact::Contact;
pub use diff::SnapshotDiff;
pub use error::{AvatarError, AvatarResult, VCardError, VCardResult};
pub use sidetalk_protocol::{Jid, JidError, Presence, UserSnapshot};

pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::avatar::{Avatar, AvatarStore, VCardService, VCardTemp};
    pub use crate::connection::Connection;
    pub use crate::contact::Contact;
    pub use sidetalk_protocol::{Jid, Presence, UserSnapshot};
}
