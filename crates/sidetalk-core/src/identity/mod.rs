//! Contact identity.
//!
//! A contact is identified by its bare JID alone. Nothing else a contact
//! carries takes part in equality or hashing.

pub use sidetalk_protocol::Jid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    jid: Jid,
}

impl Identity {
    pub fn new(jid: Jid) -> Self {
        Self { jid }
    }

    pub fn jid(&self) -> &Jid {
        &self.jid
    }

    pub fn is_self(&self, myself: &Jid) -> bool {
        &self.jid == myself
    }
}

impl From<Jid> for Identity {
    fn from(jid: Jid) -> Self {
        Self::new(jid)
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.jid)
    }
}
