// StringName: the name type used for method and property keys.

use std::fmt;
use std::sync::Arc;

/// An immutable name. Cheap to clone and compare.
///
/// Names are owned on the Rust side; interning against the engine's own
/// string table happens in the host glue, not here.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringName(Arc<str>);

impl StringName {
    pub fn new(name: &str) -> Self {
        StringName(Arc::from(name))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for StringName {
    fn default() -> Self {
        StringName::new("")
    }
}

impl fmt::Display for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for StringName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{:?}", &*self.0)
    }
}

impl PartialEq<str> for StringName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for StringName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl From<&str> for StringName {
    fn from(s: &str) -> Self {
        StringName::new(s)
    }
}

impl From<String> for StringName {
    fn from(s: String) -> Self {
        StringName(Arc::from(s))
    }
}

impl AsRef<str> for StringName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
