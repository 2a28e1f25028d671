//! Change detection between successive roster snapshots.

use sidetalk_protocol::UserSnapshot;

/// Which channels an update has to emit on, and with what.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// New online flag, when it changed
    pub online: Option<bool>,
    /// New primary `<show/>`, when it changed. The inner `None` means the
    /// contact has no explicit status.
    pub presence: Option<Option<String>>,
}

impl SnapshotDiff {
    /// Compare `old` against `new`. With `force`, every field counts as changed.
    pub fn between(old: &UserSnapshot, new: &UserSnapshot, force: bool) -> Self {
        let online = (force || old.online != new.online).then_some(new.online);
        let presence = (force || old.primary_show != new.primary_show)
            .then(|| new.primary_show.clone());
        Self { online, presence }
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_none() && self.presence.is_none()
    }
}
