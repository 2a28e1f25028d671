//! Sidetalk protocol types.
//!
//! This crate holds the values handed to the sync engine by the XMPP layer:
//! - `Jid`: bare address of a remote party
//! - `UserSnapshot`: point-in-time copy of a roster user
//! - `Presence`: coarse presence derived from the online flag and `<show/>`

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JidError {
    #[error("invalid jid: cannot be empty")]
    Empty,
    #[error("invalid jid: domain cannot be empty")]
    EmptyDomain,
    #[error("invalid jid: local part cannot be empty when '@' is present")]
    EmptyLocalPart,
    #[error("invalid jid: unexpected character {0:?}")]
    InvalidCharacter(char),
}

/// Bare address (`local@domain`), independent of any connected resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Jid(String);

impl Jid {
    pub fn new(local: &str, domain: &str) -> Result<Self, JidError> {
        if local.is_empty() {
            return domain.parse();
        }
        format!("{local}@{domain}").parse()
    }

    pub fn local(&self) -> Option<&str> {
        self.0.split_once('@').map(|(local, _)| local)
    }

    pub fn domain(&self) -> &str {
        match self.0.split_once('@') {
            Some((_, domain)) => domain,
            None => &self.0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Jid {
    type Err = JidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(JidError::Empty);
        }
        // The resource is session-specific and never part of the identity.
        let bare = s.split_once('/').map_or(s, |(bare, _)| bare);

        if let Some(c) = bare.chars().find(|c| c.is_whitespace()) {
            return Err(JidError::InvalidCharacter(c));
        }

        match bare.split_once('@') {
            Some((local, domain)) => {
                if domain.contains('@') {
                    return Err(JidError::InvalidCharacter('@'));
                }
                if local.is_empty() {
                    return Err(JidError::EmptyLocalPart);
                }
                if domain.is_empty() {
                    return Err(JidError::EmptyDomain);
                }
                Ok(Self(format!(
                    "{}@{}",
                    local.to_lowercase(),
                    domain.to_lowercase()
                )))
            }
            None if bare.is_empty() => Err(JidError::EmptyDomain),
            None => Ok(Self(bare.to_lowercase())),
        }
    }
}

impl TryFrom<String> for Jid {
    type Error = JidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Jid> for String {
    fn from(jid: Jid) -> Self {
        jid.0
    }
}

impl std::fmt::Display for Jid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse presence of a roster user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Online,
    Offline,
    Away,
    Busy,
    /// Only ever selected locally; remote users never report it.
    Invisible,
    /// Online, but with a `<show/>` value we do not recognise.
    None,
}

impl Presence {
    pub fn from_snapshot(online: bool, show: Option<&str>) -> Self {
        if !online {
            return Presence::Offline;
        }
        match show {
            None | Some("chat") => Presence::Online,
            Some("away") | Some("xa") => Presence::Away,
            Some("dnd") => Presence::Busy,
            Some(_) => Presence::None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Presence::Online => "online",
            Presence::Offline => "offline",
            Presence::Away => "away",
            Presence::Busy => "busy",
            Presence::Invisible => "invisible",
            Presence::None => "none",
        }
    }
}

impl std::fmt::Display for Presence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Point-in-time copy of what the roster knows about a remote user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnapshot {
    pub jid: Jid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub online: bool,
    /// `<show/>` of whichever resource the roster considers primary.
    #[serde(rename = "primaryShow", skip_serializing_if = "Option::is_none")]
    pub primary_show: Option<String>,
}

impl UserSnapshot {
    pub fn new(jid: Jid) -> Self {
        Self {
            jid,
            nickname: None,
            online: false,
            primary_show: None,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    pub fn with_show(mut self, show: impl Into<String>) -> Self {
        self.primary_show = Some(show.into());
        self
    }

    pub fn presence(&self) -> Presence {
        Presence::from_snapshot(self.online, self.primary_show.as_deref())
    }
}
