//! Interned identifiers for diagram nodes, clusters and categories.
//!
//! This module provides the [`Id`] type, a `Copy` handle into a process-wide
//! string interner. Comparing, hashing and copying an [`Id`] never touches the
//! underlying string.

use std::{
    fmt,
    str::FromStr,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner backing every [`Id`].
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Interned identifier.
///
/// # Examples
///
/// ```
/// use stratus_core::identifier::Id;
///
/// let gateway = Id::new("gateway");
/// assert_eq!(gateway, "gateway");
///
/// // Generated identifiers are stable for a given prefix and index
/// assert_eq!(Id::sequential("node", 3), Id::new("node_3"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates the identifier `<prefix>_<index>`.
    ///
    /// Used for identifiers the library generates itself, so that building the
    /// same diagram twice produces the same identifiers.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus_core::identifier::Id;
    ///
    /// let id = Id::sequential("cluster", 0);
    /// assert_eq!(id, "cluster_0");
    /// ```
    pub fn sequential(prefix: &str, index: usize) -> Self {
        Self::new(&format!("{prefix}_{index}"))
    }

    /// Returns the interned string as an owned `String`.
    pub fn as_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f.write_str(value)
    }
}

impl FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "gateway"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner.resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_new_interns_equal_strings() {
        let a = Id::new("frontdoor");
        let b = Id::new("frontdoor");
        let c = Id::new("appgw");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, "frontdoor");
    }

    #[test]
    fn test_sequential() {
        let first = Id::sequential("node", 0);
        let second = Id::sequential("node", 1);

        assert_ne!(first, second);
        assert_eq!(first, "node_0");
        assert_eq!(Id::sequential("cluster", 0), "cluster_0");
        assert_ne!(first, Id::sequential("cluster", 0));
    }

    #[test]
    fn test_display_and_from_str() {
        let id: Id = "Hub VNet".parse().unwrap();
        assert_eq!(id.to_string(), "Hub VNet");
        assert_eq!(format!("{id}"), "Hub VNet");
    }

    #[test]
    fn test_usable_as_map_key() {
        let mut map = HashMap::new();
        map.insert(Id::new("sql1"), "Azure SQL");
        map.insert(Id::new("sql2"), "Azure SQL");

        assert_eq!(map.get(&Id::new("sql1")), Some(&"Azure SQL"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("Web Pod 1");
        let name = String::from("Web Pod 1");

        assert!(id == "Web Pod 1");
        assert!(id == name.as_str());
        assert!(id != "Web Pod 2");

        let empty = Id::new("");
        assert!(empty == "");
    }
}
