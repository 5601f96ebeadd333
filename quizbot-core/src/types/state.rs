//! FSM state tag.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Opaque conversation state. The empty tag is the default state ("no active conversation").
///
/// A state may carry a group prefix before [`State::GROUP_SEPARATOR`] (e.g. `quiz:question`), so
/// callers can test membership of a whole group with [`State::in_group`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(Cow<'static, str>);

impl State {
    pub const GROUP_SEPARATOR: char = ':';

    /// The default state. Equal to `State::default()`.
    pub const DEFAULT: State = State(Cow::Borrowed(""));

    /// Creates a state usable in `const` items.
    pub const fn from_static(tag: &'static str) -> Self {
        State(Cow::Borrowed(tag))
    }

    pub fn new(tag: impl Into<String>) -> Self {
        State(Cow::Owned(tag.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the group prefix, or `None` when the tag has no separator.
    pub fn group(&self) -> Option<&str> {
        self.0
            .split_once(Self::GROUP_SEPARATOR)
            .map(|(group, _)| group)
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.group() == Some(group)
    }
}

impl From<&str> for State {
    fn from(tag: &str) -> Self {
        State::new(tag)
    }
}

impl From<String> for State {
    fn from(tag: String) -> Self {
        State(Cow::Owned(tag))
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            f.write_str("<default>")
        } else {
            f.write_str(&self.0)
        }
    }
}
