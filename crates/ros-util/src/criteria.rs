//! Item selectors.

use std::borrow::Cow;
use std::fmt;

use crate::request::Query;
use crate::response::Response;

/// One way of picking items at the current menu.
///
/// Passed to [`Util::resolve`](crate::Util::resolve) and the bulk commands
/// built on it. Numbers select by position in the menu's listing, exactly as
/// the numbers shown by a terminal `print`.
#[derive(Clone)]
pub enum Criteria<'a> {
    /// Position in the current menu's listing.
    Index(i64),
    /// A numeric string (position), a literal ID or name, or a comma list
    /// mixing both.
    Name(Cow<'a, str>),
    /// Items matched by a filtered `print`.
    Query(Query),
    /// Items for which the callback returns `true`.
    Predicate(&'a dyn Fn(&Response) -> bool),
}

impl<'a> Criteria<'a> {
    /// Select by callback.
    pub fn predicate(f: &'a dyn Fn(&Response) -> bool) -> Self {
        Criteria::Predicate(f)
    }
}

impl fmt::Debug for Criteria<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criteria::Index(n) => f.debug_tuple("Index").field(n).finish(),
            Criteria::Name(s) => f.debug_tuple("Name").field(s).finish(),
            Criteria::Query(q) => f.debug_tuple("Query").field(q).finish(),
            Criteria::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<i64> for Criteria<'_> {
    fn from(n: i64) -> Self {
        Criteria::Index(n)
    }
}

impl From<i32> for Criteria<'_> {
    fn from(n: i32) -> Self {
        Criteria::Index(n as i64)
    }
}

impl From<usize> for Criteria<'_> {
    fn from(n: usize) -> Self {
        Criteria::Index(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl<'a> From<&'a str> for Criteria<'a> {
    fn from(s: &'a str) -> Self {
        Criteria::Name(Cow::Borrowed(s))
    }
}

impl From<String> for Criteria<'_> {
    fn from(s: String) -> Self {
        Criteria::Name(Cow::Owned(s))
    }
}

impl From<Query> for Criteria<'_> {
    fn from(q: Query) -> Self {
        Criteria::Query(q)
    }
}

/// Parse a selector string that is purely a position.
///
/// Only the canonical spelling counts: `"2"` and `"-1"` are positions,
/// `"02"` and `"+2"` are names.
pub(crate) fn as_position(text: &str) -> Option<i64> {
    text.parse::<i64>()
        .ok()
        .filter(|n| n.to_string() == text)
}
