//! Request-scoped context carrier.
//!
//! A [`Context`] is an immutable, persistent list of key/value pairs. Deriving
//! a child with [`Context::with_value`] never touches the parent, so one
//! context can be handed to many handlers (and threads) at once without
//! locking:
//!
//! ```text
//! background ─► ("user", "alice") ─► ("request_id", 42)
//!     ▲                ▲                     ▲
//!     cx0              cx1                   cx2      ← each one still valid
//! ```
//!
//! Lookups walk from the newest entry back to the root. The newest entry for
//! a key shadows older ones.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Immutable key/value carrier threaded through a handler chain.
///
/// Cloning is one atomic reference-count increment.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
}

struct Entry {
    key: &'static str,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

impl Context {
    /// The empty root context.
    ///
    /// Used whenever a handler is invoked without an explicit context.
    pub fn background() -> Self {
        Self { head: None }
    }

    /// Returns a child context carrying `key = value`.
    ///
    /// `self` is left unchanged.
    pub fn with_value<T>(&self, key: &'static str, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Entry {
                key,
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Looks up the newest value stored under `key`.
    ///
    /// Returns `None` if the key was never set, or if the newest value for it
    /// is not a `T`.
    pub fn value<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries()
            .find(|entry| entry.key == key)
            .and_then(|entry| (*entry.value).downcast_ref::<T>())
    }

    /// `true` when no value has been set on this context or its ancestors.
    pub fn is_background(&self) -> bool {
        self.head.is_none()
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> {
        std::iter::successors(self.head.as_deref(), |entry| entry.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("keys", &self.entries().map(|e| e.key).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_empty() {
        let cx = Context::background();
        assert!(cx.is_background());
        assert!(cx.value::<&'static str>("user").is_none());
    }

    #[test]
    fn with_value_leaves_parent_untouched() {
        let parent = Context::background().with_value("user", "alice");
        let child = parent.with_value("user", "bob").with_value("id", 7_u32);

        assert_eq!(parent.value::<&'static str>("user"), Some(&"alice"));
        assert_eq!(child.value::<&'static str>("user"), Some(&"bob"));
        assert_eq!(child.value::<u32>("id"), Some(&7));
        assert!(parent.value::<u32>("id").is_none());
    }

    #[test]
    fn type_mismatch_is_none() {
        let cx = Context::background().with_value("id", 7_u32);
        assert!(cx.value::<u64>("id").is_none());
    }

    #[test]
    fn newest_value_shadows_even_with_other_type() {
        let cx = Context::background()
            .with_value("id", 7_u32)
            .with_value("id", String::from("seven"));
        assert!(cx.value::<u32>("id").is_none());
        assert_eq!(cx.value::<String>("id").map(String::as_str), Some("seven"));
    }

    #[test]
    fn debug_lists_keys_newest_first() {
        let cx = Context::background().with_value("a", 1_u8).with_value("b", 2_u8);
        assert_eq!(format!("{cx:?}"), r#"Context { keys: ["b", "a"] }"#);
    }
}
