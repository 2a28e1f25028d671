//! Contact aggregate
//!
//! One [`Contact`] per remote bare JID. The roster layer feeds it snapshots
//! through [`Contact::update`]; callers observe the online flag and presence
//! through push-only channels and the avatar through a cold stream.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use sidetalk_protocol::{Jid, Presence, UserSnapshot};
use tracing::{debug, warn};

use crate::avatar::AvatarStream;
use crate::channel::{Channel, Subscription};
use crate::connection::Connection;
use crate::conversation::Conversation;
use crate::diff::SnapshotDiff;
use crate::display;
use crate::identity::Identity;

pub struct Contact {
    identity: Identity,
    connection: Arc<Connection>,
    state: Mutex<UserSnapshot>,
    online: Channel<bool>,
    presence: Channel<Option<String>>,
    avatar: AvatarStream,
    conversation: Mutex<Conversation>,
}

impl Contact {
    /// Build a contact from its first snapshot.
    ///
    /// The initial state is pushed on both channels, and the avatar stream is
    /// prepared but not started.
    pub fn new(snapshot: UserSnapshot, connection: Arc<Connection>) -> Self {
        let jid = snapshot.jid.clone();
        let capacity = connection.config().effective_capacity();
        let contact = Self {
            identity: Identity::new(jid.clone()),
            avatar: AvatarStream::new(jid.clone(), Arc::clone(&connection)),
            conversation: Mutex::new(Conversation::new(jid)),
            state: Mutex::new(snapshot.clone()),
            online: Channel::new(capacity),
            presence: Channel::new(capacity),
            connection,
        };
        contact.apply(snapshot, true);
        contact
    }

    /// Replace the snapshot, emitting only what changed.
    pub fn update(&self, snapshot: UserSnapshot) -> SnapshotDiff {
        self.apply(snapshot, false)
    }

    /// Replace the snapshot and emit on every channel regardless.
    pub fn force_update(&self, snapshot: UserSnapshot) -> SnapshotDiff {
        self.apply(snapshot, true)
    }

    fn apply(&self, snapshot: UserSnapshot, force: bool) -> SnapshotDiff {
        if snapshot.jid != *self.identity.jid() {
            warn!(
                contact = %self.identity,
                snapshot = %snapshot.jid,
                "Snapshot for a different JID, identity is kept"
            );
        }

        // Held across compare, emit and replace so updates are applied and
        // observed in the order they arrive
        let mut state = self.lock_state();
        let diff = SnapshotDiff::between(&state, &snapshot, force);

        if let Some(online) = diff.online {
            debug!(contact = %self.identity, online, "Online changed");
            self.online.send(online);
        }
        if let Some(show) = &diff.presence {
            debug!(contact = %self.identity, show = ?show, "Presence changed");
            self.presence.send(show.clone());
        }

        *state = snapshot;
        diff
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn jid(&self) -> &Jid {
        self.identity.jid()
    }

    pub fn is_self(&self) -> bool {
        self.identity.is_self(self.connection.myself())
    }

    pub fn display_name(&self) -> String {
        display::display_name(&self.lock_state())
    }

    pub fn initials(&self) -> String {
        display::initials(&self.display_name())
    }

    /// Online flag changes from now on.
    pub fn online_updates(&self) -> Subscription<bool> {
        self.online.subscribe()
    }

    /// Primary `<show/>` changes from now on.
    pub fn presence_updates(&self) -> Subscription<Option<String>> {
        self.presence.subscribe()
    }

    pub fn avatar(&self) -> &AvatarStream {
        &self.avatar
    }

    pub fn is_online(&self) -> bool {
        self.lock_state().online
    }

    pub fn presence(&self) -> Option<String> {
        self.lock_state().primary_show.clone()
    }

    pub fn presence_state(&self) -> Presence {
        self.lock_state().presence()
    }

    pub fn snapshot(&self) -> UserSnapshot {
        self.lock_state().clone()
    }

    pub fn conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_state(&self) -> MutexGuard<'_, UserSnapshot> {
        // The snapshot is replaced in one assignment, so it is never torn
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PartialEq for Contact {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for Contact {}

impl Hash for Contact {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.hash(state);
    }
}

impl std::fmt::Debug for Contact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contact")
            .field("identity", &self.identity)
            .field("state", &*self.lock_state())
            .finish_non_exhaustive()
    }
}
