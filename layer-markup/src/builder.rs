//! Text accumulator with a keyed set of open entity builders.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::entity::{EntityBuilder, EntityKind, MessageEntity};
use crate::utf16;

/// Collects plain text while tracking which entities are currently open.
///
/// At most one builder exists per key (an HTML tag name, a Markdown
/// delimiter). Every appended chunk grows each open builder by its UTF-16
/// length, so lengths never have to be recomputed by slicing.
pub(crate) struct Accumulator<K> {
    text: String,
    units: i32,
    open: HashMap<K, EntityBuilder>,
    entities: Vec<MessageEntity>,
}

impl<K: Hash + Eq> Accumulator<K> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            units: 0,
            open: HashMap::new(),
            entities: Vec::new(),
        }
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let n = utf16::len(s);
        for b in self.open.values_mut() {
            b.grow(n);
        }
        self.units = self.units.saturating_add(n);
        self.text.push_str(s);
    }

    pub(crate) fn push(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.push_str(c.encode_utf8(&mut buf));
    }

    /// The trailing `units` code units of the text.
    pub(crate) fn tail(&self, units: i32) -> &str {
        let mut remaining = units;
        let mut start = self.text.len();
        for (i, c) in self.text.char_indices().rev() {
            if remaining <= 0 {
                break;
            }
            remaining -= c.len_utf16() as i32;
            start = i;
        }
        &self.text[start..]
    }

    pub(crate) fn is_open<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.open.contains_key(key)
    }

    /// Opens a builder at the current position. Re-opening a key that is
    /// already open is ignored and returns `false`.
    pub(crate) fn open(&mut self, key: K, kind: EntityKind) -> bool {
        if self.open.contains_key(&key) {
            return false;
        }
        let b = EntityBuilder::new(self.units, kind);
        self.open.insert(key, b);
        true
    }

    pub(crate) fn builder<Q>(&self, key: &Q) -> Option<&EntityBuilder>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.open.get(key)
    }

    pub(crate) fn builder_mut<Q>(&mut self, key: &Q) -> Option<&mut EntityBuilder>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.open.get_mut(key)
    }

    /// The text covered so far by the builder for `key`.
    ///
    /// An open builder always spans up to the end of the text, so this is a
    /// suffix of [`Self::text`].
    pub(crate) fn covered<Q>(&self, key: &Q) -> Option<&str>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.open.get(key).map(|b| self.tail(b.length()))
    }

    /// Freezes the builder for `key` into the result list, if one is open.
    pub(crate) fn close<Q>(&mut self, key: &Q) -> Option<&MessageEntity>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let b = self.open.remove(key)?;
        self.entities.push(b.freeze());
        self.entities.last()
    }

    /// Drops the builder for `key` without emitting an entity.
    pub(crate) fn discard<Q>(&mut self, key: &Q) -> Option<EntityBuilder>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.open.remove(key)
    }

    /// Returns the text and the entities in the order they were closed.
    /// Builders still open are discarded.
    pub(crate) fn finish(self) -> (String, Vec<MessageEntity>) {
        if !self.open.is_empty() {
            log::trace!("[markup] {} unclosed entities discarded", self.open.len());
        }
        (self.text, self.entities)
    }
}
