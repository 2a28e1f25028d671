//! Human-readable names derived from a roster snapshot.

use std::sync::LazyLock;

use regex::Regex;
use sidetalk_protocol::UserSnapshot;

/// First letter of every word; words are split on space, `.`, `_` and `-`.
static WORD_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[ ._-])([^ ._-])").unwrap());

/// Nickname when the roster has a non-empty one, otherwise the bare JID.
pub fn display_name(snapshot: &UserSnapshot) -> String {
    match snapshot.nickname.as_deref() {
        Some(nickname) if !nickname.is_empty() => nickname.to_string(),
        _ => snapshot.jid.to_string(),
    }
}

/// Two-letter abbreviation of `full`.
///
/// Multi-word names use the first letters of their first two words. Anything
/// else falls back to the first two characters, or fewer if that is all
/// there is. Case is preserved.
pub fn initials(full: &str) -> String {
    let letters: Vec<&str> = WORD_START_RE
        .captures_iter(full)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .take(2)
        .collect();

    if letters.len() > 1 {
        letters.concat()
    } else {
        full.chars().take(2).collect()
    }
}
