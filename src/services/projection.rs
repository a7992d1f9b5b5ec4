//! Field projection
//!
//! A shape declares its field names once, in output order, and knows how to
//! produce the value of each. `project` walks that declaration and keeps the
//! fields the allow-list permits.

use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// A serializable view over a record with a fixed, ordered field list
pub trait Shape {
    /// Field names in output order
    const FIELDS: &'static [&'static str];

    /// Value of one declared field
    fn value(&self, field: &str) -> Value;
}

/// Set of field names a response may carry
///
/// `AllowList::all()` places no restriction. Unknown names are kept in the
/// set but never match a declared field, so they are ignored on output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllowList(Option<BTreeSet<String>>);

impl AllowList {
    /// No restriction
    pub fn all() -> Self {
        Self(None)
    }

    /// Only the given names
    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(Some(fields.into_iter().map(Into::into).collect()))
    }

    /// Parse a comma-separated list such as `id,title`
    ///
    /// Blank input means no restriction.
    pub fn parse(raw: &str) -> Self {
        let names: BTreeSet<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            Self::all()
        } else {
            Self(Some(names))
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.0.is_none()
    }

    pub fn permits(&self, field: &str) -> bool {
        match &self.0 {
            None => true,
            Some(names) => names.contains(field),
        }
    }

    /// Names permitted by both lists
    pub fn intersect(&self, other: &AllowList) -> AllowList {
        match (&self.0, &other.0) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) => AllowList(Some(a.intersection(b).cloned().collect())),
        }
    }
}

/// Render `record` keeping only the declared fields `allowed` permits
pub fn project<S: Shape>(record: &S, allowed: &AllowList) -> Map<String, Value> {
    S::FIELDS
        .iter()
        .filter(|field| allowed.permits(field))
        .map(|field| (field.to_string(), record.value(field)))
        .collect()
}
