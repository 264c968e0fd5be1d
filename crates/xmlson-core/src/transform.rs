//! Shared tree walk for per-entry transforms.
//!
//! Both the decoder's reviver and the encoder's replacer are hooks of the
//! form `(key, value) -> Option<value>`. `None` is the omitted sentinel:
//! the entry is dropped from its container. Array entries are dropped by
//! omission, so the resulting array is compacted rather than padded.
//!
//! The hook sees each entry before its children (pre-order), and the walk
//! only descends into whatever the hook returned. A hook can therefore
//! swap in an entirely different sub-tree. Dates and other scalars are
//! leaves and are never descended into.

use crate::error::{Result, XmlsonError};
use crate::types::{Key, Map, Value};

/// Rebuild `value` by passing every container entry through `hook`.
///
/// `limit` bounds the nesting depth of the rebuilt tree. A hook that keeps
/// wrapping its input in new containers would otherwise never terminate,
/// so exceeding the limit is reported as [`XmlsonError::CycleDetected`].
pub fn walk<F>(value: Value, hook: &mut F, limit: usize) -> Result<Value>
where
    F: FnMut(&Key, Value) -> Option<Value>,
{
    walk_at(value, hook, 0, limit)
}

fn walk_at<F>(value: Value, hook: &mut F, depth: usize, limit: usize) -> Result<Value>
where
    F: FnMut(&Key, Value) -> Option<Value>,
{
    match value {
        Value::Array(items) => {
            check_depth(depth, limit)?;
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                if let Some(kept) = hook(&Key::Index(index), item) {
                    out.push(walk_at(kept, hook, depth + 1, limit)?);
                }
            }
            Ok(Value::Array(out))
        }
        Value::Object(map) => {
            check_depth(depth, limit)?;
            let mut out = Map::with_capacity(map.len());
            for (name, entry) in map {
                let key = Key::Name(name);
                if let Some(kept) = hook(&key, entry) {
                    let kept = walk_at(kept, hook, depth + 1, limit)?;
                    if let Key::Name(name) = key {
                        out.insert(name, kept);
                    }
                }
            }
            Ok(Value::Object(out))
        }
        leaf => Ok(leaf),
    }
}

fn check_depth(depth: usize, limit: usize) -> Result<()> {
    if depth >= limit {
        tracing::debug!(limit, "transform exceeded nesting limit");
        return Err(XmlsonError::CycleDetected { limit });
    }
    Ok(())
}

/// How the encoder filters entries before writing them.
pub enum Replacer<'a> {
    /// Keep every entry unchanged.
    All,
    /// Keep only object properties whose name is listed, at every level.
    /// Array elements are always kept.
    Keys(Vec<String>),
    /// Arbitrary per-entry hook; `None` omits the entry.
    Func(Box<dyn FnMut(&Key, Value) -> Option<Value> + 'a>),
}

impl<'a> Replacer<'a> {
    /// Allow-list replacer from any list of names.
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Replacer::Keys(keys.into_iter().map(Into::into).collect())
    }

    /// Wrap a closure as a replacer.
    pub fn func<F>(f: F) -> Self
    where
        F: FnMut(&Key, Value) -> Option<Value> + 'a,
    {
        Replacer::Func(Box::new(f))
    }

    /// Apply the replacer to one entry.
    pub fn apply(&mut self, key: &Key, value: Value) -> Option<Value> {
        match self {
            Replacer::All => Some(value),
            Replacer::Keys(allowed) => match key {
                Key::Index(_) => Some(value),
                Key::Name(name) => allowed.iter().any(|k| k == name).then_some(value),
            },
            Replacer::Func(f) => f(key, value),
        }
    }
}

impl Default for Replacer<'_> {
    fn default() -> Self {
        Replacer::All
    }
}

impl std::fmt::Debug for Replacer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Replacer::All => f.write_str("All"),
            Replacer::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
            Replacer::Func(_) => f.write_str("Func(..)"),
        }
    }
}
