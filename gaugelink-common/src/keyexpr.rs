use std::fmt;

use crate::error::{Error, Result};

/// Default key expression prefix for the GaugeLink store.
pub const KEY_PREFIX: &str = "gaugelink";

/// Characters that carry meaning in Zenoh key expressions and cannot
/// appear inside a store path chunk.
const RESERVED: [char; 4] = ['*', '$', '?', '#'];

/// A path inside the store, relative to the store root.
///
/// Paths are slash-separated chunks, like `Current Temperature` or
/// `clientModules/greger/current`. The empty path is the root collection.
///
/// # Example
/// ```
/// use gaugelink_common::keyexpr::StorePath;
///
/// let path = StorePath::new("/clientModules/greger/").unwrap();
/// assert_eq!(path.as_str(), "clientModules/greger");
/// assert_eq!(path.key_expr("gaugelink"), "gaugelink/clientModules/greger");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath(String);

impl StorePath {
    /// Parse and validate a store path.
    pub fn new(path: impl AsRef<str>) -> Result<Self> {
        let raw = path.as_ref();
        let trimmed = raw.trim_matches('/');

        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        for chunk in trimmed.split('/') {
            validate_chunk(raw, chunk)?;
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The root collection.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Whether this is the root collection.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path as a string (empty for the root).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last chunk of the path, `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// Parent path, `None` for the root.
    pub fn parent(&self) -> Option<StorePath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Path of a direct child.
    ///
    /// # Example
    /// ```
    /// use gaugelink_common::keyexpr::StorePath;
    ///
    /// let root = StorePath::root();
    /// assert_eq!(root.child("Heading").unwrap().as_str(), "Heading");
    ///
    /// let current = StorePath::new("clientModules/greger").unwrap();
    /// assert_eq!(current.child("current").unwrap().as_str(), "clientModules/greger/current");
    /// ```
    pub fn child(&self, name: &str) -> Result<StorePath> {
        let name = name.trim_matches('/');
        if name.is_empty() {
            return Err(Error::invalid_path(name, "child name is empty"));
        }
        if self.is_root() {
            StorePath::new(name)
        } else {
            StorePath::new(format!("{}/{}", self.0, name))
        }
    }

    /// Whether `other` lives below this path.
    pub fn is_ancestor_of(&self, other: &StorePath) -> bool {
        if self.is_root() {
            return !other.is_root();
        }
        other
            .0
            .strip_prefix(&self.0)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Full key expression under a prefix.
    pub fn key_expr(&self, prefix: &str) -> String {
        if self.is_root() {
            prefix.to_string()
        } else {
            format!("{}/{}", prefix, self.0)
        }
    }

    /// Key expression matching every descendant of this path.
    pub fn children_wildcard(&self, prefix: &str) -> String {
        format!("{}/**", self.key_expr(prefix))
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("/")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl TryFrom<&str> for StorePath {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        StorePath::new(value)
    }
}

fn validate_chunk(path: &str, chunk: &str) -> Result<()> {
    if chunk.is_empty() {
        return Err(Error::invalid_path(path, "empty path segment"));
    }
    if chunk.starts_with('@') {
        return Err(Error::invalid_path(path, "segments may not start with '@'"));
    }
    if let Some(c) = chunk.chars().find(|c| RESERVED.contains(c)) {
        return Err(Error::invalid_path(
            path,
            format!("reserved character '{}'", c),
        ));
    }
    Ok(())
}

/// Build a wildcard key expression for the whole store under a prefix.
///
/// # Example
/// ```
/// use gaugelink_common::keyexpr::store_wildcard;
///
/// assert_eq!(store_wildcard("gaugelink"), "gaugelink/**");
/// ```
pub fn store_wildcard(prefix: &str) -> String {
    format!("{}/**", prefix)
}

/// Recover the store path from a full key expression.
///
/// Returns `None` if the key is not under `prefix`.
pub fn parse_key_expr(prefix: &str, key: &str) -> Option<StorePath> {
    if key == prefix {
        return Some(StorePath::root());
    }
    let rest = key.strip_prefix(prefix)?.strip_prefix('/')?;
    StorePath::new(rest).ok()
}
