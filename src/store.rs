//! Sparse element storage with stable integer identity.
//!
//! Deleting an element leaves a hole; every other element keeps its index.
//! Freed slots are reused by [`SparseStore::add`] (lowest index first), and
//! [`SparseStore::insert`] re-occupies one exact slot, which is how redo and
//! uncompaction reproduce historical IDs. Only explicit compaction ever
//! renumbers live elements.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ChangeError, TopologyError};
use crate::topology::ElementId;

/// A sparse, ID-stable container for one element kind.
#[derive(Clone)]
pub struct SparseStore<I: ElementId, T> {
    slots: Vec<Option<T>>,
    free: BinaryHeap<Reverse<u32>>,
    len: usize,
    _id: PhantomData<I>,
}

impl<I: ElementId, T> Default for SparseStore<I, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: BinaryHeap::new(),
            len: 0,
            _id: PhantomData,
        }
    }
}

impl<I: ElementId, T: fmt::Debug> fmt::Debug for SparseStore<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<I: ElementId, T> SparseStore<I, T> {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no live elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the highest slot index ever used; sizes parallel buffers.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if `id` refers to a live element.
    #[must_use]
    pub fn is_allocated(&self, id: I) -> bool {
        id.is_valid()
            && (id.index() as usize) < self.slots.len()
            && self.slots[id.index() as usize].is_some()
    }

    /// Allocates the lowest free slot (or appends) and returns its ID.
    pub fn add(&mut self, value: T) -> I {
        // Freed entries may have been re-occupied by `insert` in the
        // meantime, so pop until a genuinely free slot turns up.
        while let Some(Reverse(index)) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            if slot.is_none() {
                *slot = Some(value);
                self.len += 1;
                return I::new(index);
            }
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Some(value));
        self.len += 1;
        I::new(index)
    }

    /// Allocates exactly at `id`, growing the store if needed.
    ///
    /// Used by redo and uncompaction, where an ID must be reproduced
    /// exactly.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::SlotOccupied`] if the slot is already live.
    pub fn insert(&mut self, id: I, value: T) -> Result<(), TopologyError> {
        let index = id.index() as usize;
        while self.slots.len() <= index {
            self.free
                .push(Reverse(u32::try_from(self.slots.len()).unwrap_or(u32::MAX)));
            self.slots.push(None);
        }
        let slot = &mut self.slots[index];
        if slot.is_some() {
            return Err(TopologyError::SlotOccupied {
                kind: I::KIND,
                index: id.index(),
            });
        }
        *slot = Some(value);
        self.len += 1;
        Ok(())
    }

    /// Frees the slot at `id` and returns its element.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ElementNotFound`] if the slot is not live.
    pub fn remove(&mut self, id: I) -> Result<T, TopologyError> {
        let index = id.index() as usize;
        let value = self
            .slots
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(TopologyError::ElementNotFound {
                kind: I::KIND,
                index: id.index(),
            })?;
        self.free.push(Reverse(id.index()));
        self.len -= 1;
        Ok(value)
    }

    /// Returns a reference to the element at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ElementNotFound`] if the slot is not live.
    pub fn get(&self, id: I) -> Result<&T, TopologyError> {
        self.slots
            .get(id.index() as usize)
            .and_then(Option::as_ref)
            .ok_or(TopologyError::ElementNotFound {
                kind: I::KIND,
                index: id.index(),
            })
    }

    /// Returns a mutable reference to the element at `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::ElementNotFound`] if the slot is not live.
    pub fn get_mut(&mut self, id: I) -> Result<&mut T, TopologyError> {
        self.slots
            .get_mut(id.index() as usize)
            .and_then(Option::as_mut)
            .ok_or(TopologyError::ElementNotFound {
                kind: I::KIND,
                index: id.index(),
            })
    }

    /// Iterates live elements in index order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|value| (I::new(u32::try_from(index).unwrap_or(u32::MAX)), value))
        })
    }

    /// Iterates live elements mutably, in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            slot.as_mut()
                .map(|value| (I::new(u32::try_from(index).unwrap_or(u32::MAX)), value))
        })
    }

    /// Iterates the IDs of live elements in index order.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.as_ref()
                .map(|_| I::new(u32::try_from(index).unwrap_or(u32::MAX)))
        })
    }

    /// Densifies the store: live elements are renumbered to contiguous
    /// indices in iteration order. Returns the old→new remap table.
    pub fn compact(&mut self) -> Remap<I> {
        let mut remap = Remap::with_capacity(self.slots.len());
        let mut packed: Vec<Option<T>> = Vec::with_capacity(self.len);
        for (index, slot) in self.slots.drain(..).enumerate() {
            if let Some(value) = slot {
                let new_index = u32::try_from(packed.len()).unwrap_or(u32::MAX);
                remap.insert(
                    I::new(u32::try_from(index).unwrap_or(u32::MAX)),
                    I::new(new_index),
                );
                packed.push(Some(value));
            }
        }
        self.slots = packed;
        self.free.clear();
        remap
    }

    /// Re-scatters live elements to the slots named by `remap`, undoing a
    /// [`compact`](Self::compact).
    ///
    /// # Errors
    ///
    /// Returns [`ChangeError::MissingRemapEntry`] if a live element has no
    /// entry in the table; the table must be total over live IDs.
    pub fn uncompact(&mut self, remap: &Remap<I>) -> Result<(), ChangeError> {
        let mut scattered: Vec<Option<T>> = Vec::new();
        for (index, slot) in self.slots.drain(..).enumerate() {
            if let Some(value) = slot {
                let old_id = I::new(u32::try_from(index).unwrap_or(u32::MAX));
                let new_id = remap.get(old_id)?;
                let new_index = new_id.index() as usize;
                if scattered.len() <= new_index {
                    scattered.resize_with(new_index + 1, || None);
                }
                scattered[new_index] = Some(value);
            }
        }
        self.slots = scattered;
        self.free = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| Reverse(u32::try_from(index).unwrap_or(u32::MAX)))
            .collect();
        Ok(())
    }
}

/// An old-ID → new-ID lookup produced by compaction (or its inverse).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remap<I: ElementId> {
    entries: Vec<Option<I>>,
}

impl<I: ElementId> Default for Remap<I> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<I: ElementId> Remap<I> {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Records that `old` maps to `new`.
    pub fn insert(&mut self, old: I, new: I) {
        let index = old.index() as usize;
        if self.entries.len() <= index {
            self.entries.resize(index + 1, None);
        }
        self.entries[index] = Some(new);
    }

    /// Looks up the new ID for `old`.
    ///
    /// # Errors
    ///
    /// Returns [`ChangeError::MissingRemapEntry`] when the table has no
    /// entry — a structural consistency failure, since remap tables must be
    /// total over live IDs.
    pub fn get(&self, old: I) -> Result<I, ChangeError> {
        self.entries
            .get(old.index() as usize)
            .copied()
            .flatten()
            .ok_or(ChangeError::MissingRemapEntry {
                kind: I::KIND,
                index: old.index(),
            })
    }

    /// Builds the inverse table (new → old).
    #[must_use]
    pub fn invert(&self) -> Self {
        let mut inverted = Self::with_capacity(self.entries.len());
        for (index, entry) in self.entries.iter().enumerate() {
            if let Some(new) = entry {
                inverted.insert(*new, I::new(u32::try_from(index).unwrap_or(u32::MAX)));
            }
        }
        inverted
    }

    /// Iterates `(old, new)` pairs in old-index order.
    pub fn iter(&self) -> impl Iterator<Item = (I, I)> + '_ {
        self.entries.iter().enumerate().filter_map(|(index, entry)| {
            entry.map(|new| (I::new(u32::try_from(index).unwrap_or(u32::MAX)), new))
        })
    }
}

// Persistence is an allocation bitmap followed by the live elements in index
// order. A compact-on-save encoding would lose the holes, and with them the
// identity of every element after the first hole.

impl<I: ElementId, T: Serialize> Serialize for SparseStore<I, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let bitmap: Vec<bool> = self.slots.iter().map(Option::is_some).collect();
        let elements: Vec<&T> = self.slots.iter().filter_map(Option::as_ref).collect();
        let mut state = serializer.serialize_struct("SparseStore", 2)?;
        state.serialize_field("bitmap", &bitmap)?;
        state.serialize_field("elements", &elements)?;
        state.end()
    }
}

impl<'de, I: ElementId, T: Deserialize<'de>> Deserialize<'de> for SparseStore<I, T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StoreVisitor<I, T> {
            _marker: PhantomData<(I, T)>,
        }

        impl<'de, I: ElementId, T: Deserialize<'de>> Visitor<'de> for StoreVisitor<I, T> {
            type Value = SparseStore<I, T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a sparse store with bitmap and elements fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut bitmap: Option<Vec<bool>> = None;
                let mut elements: Option<Vec<T>> = None;
                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "bitmap" => bitmap = Some(map.next_value()?),
                        "elements" => elements = Some(map.next_value()?),
                        _ => {
                            let _ = map.next_value::<serde::de::IgnoredAny>()?;
                        }
                    }
                }
                let bitmap = bitmap.ok_or_else(|| serde::de::Error::missing_field("bitmap"))?;
                let elements =
                    elements.ok_or_else(|| serde::de::Error::missing_field("elements"))?;
                if bitmap.iter().filter(|live| **live).count() != elements.len() {
                    return Err(serde::de::Error::custom(
                        "allocation bitmap does not match element count",
                    ));
                }

                let mut store = SparseStore::new();
                let mut values = elements.into_iter();
                for (index, live) in bitmap.into_iter().enumerate() {
                    let index = u32::try_from(index)
                        .map_err(|_| serde::de::Error::custom("store index overflow"))?;
                    if live {
                        if let Some(value) = values.next() {
                            store
                                .insert(I::new(index), value)
                                .map_err(serde::de::Error::custom)?;
                        }
                    }
                }
                Ok(store)
            }
        }

        deserializer.deserialize_struct(
            "SparseStore",
            &["bitmap", "elements"],
            StoreVisitor {
                _marker: PhantomData,
            },
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::topology::VertexId;

    fn id(index: u32) -> VertexId {
        VertexId::new(index)
    }

    #[test]
    fn add_allocates_sequential_ids() {
        let mut store: SparseStore<VertexId, &str> = SparseStore::new();
        assert_eq!(store.add("a"), id(0));
        assert_eq!(store.add("b"), id(1));
        assert_eq!(store.add("c"), id(2));
        assert_eq!(store.len(), 3);
        assert_eq!(store.max_index(), 3);
    }

    #[test]
    fn remove_leaves_other_ids_stable() {
        let mut store: SparseStore<VertexId, &str> = SparseStore::new();
        store.add("a");
        store.add("b");
        store.add("c");
        store.remove(id(1)).unwrap();

        assert!(store.is_allocated(id(0)));
        assert!(!store.is_allocated(id(1)));
        assert!(store.is_allocated(id(2)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.max_index(), 3);
    }

    #[test]
    fn add_reuses_lowest_free_slot() {
        let mut store: SparseStore<VertexId, &str> = SparseStore::new();
        store.add("a");
        store.add("b");
        store.add("c");
        store.remove(id(2)).unwrap();
        store.remove(id(0)).unwrap();

        assert_eq!(store.add("d"), id(0));
        assert_eq!(store.add("e"), id(2));
        assert_eq!(store.add("f"), id(3));
    }

    #[test]
    fn insert_reproduces_exact_id() {
        let mut store: SparseStore<VertexId, &str> = SparseStore::new();
        store.add("a");
        store.add("b");
        store.remove(id(0)).unwrap();

        store.insert(id(0), "a2").unwrap();
        assert_eq!(*store.get(id(0)).unwrap(), "a2");

        // Inserting past the end grows the store and keeps the gap free
        store.insert(id(5), "far").unwrap();
        assert_eq!(store.max_index(), 6);
        assert!(!store.is_allocated(id(3)));
        assert_eq!(store.add("gap"), id(2));
    }

    #[test]
    fn insert_into_live_slot_is_an_error() {
        let mut store: SparseStore<VertexId, &str> = SparseStore::new();
        store.add("a");
        assert!(matches!(
            store.insert(id(0), "b"),
            Err(TopologyError::SlotOccupied { .. })
        ));
    }

    #[test]
    fn get_unallocated_is_an_error() {
        let store: SparseStore<VertexId, &str> = SparseStore::new();
        assert!(matches!(
            store.get(id(0)),
            Err(TopologyError::ElementNotFound { .. })
        ));
    }

    #[test]
    fn iteration_skips_holes_in_index_order() {
        let mut store: SparseStore<VertexId, &str> = SparseStore::new();
        store.add("a");
        store.add("b");
        store.add("c");
        store.remove(id(1)).unwrap();

        let items: Vec<_> = store.iter().collect();
        assert_eq!(items, vec![(id(0), &"a"), (id(2), &"c")]);
    }

    #[test]
    fn compact_then_uncompact_restores_ids() {
        let mut store: SparseStore<VertexId, &str> = SparseStore::new();
        store.add("a");
        store.add("b");
        store.add("c");
        store.add("d");
        store.remove(id(1)).unwrap();
        store.remove(id(2)).unwrap();

        let remap = store.compact();
        assert_eq!(store.len(), 2);
        assert_eq!(store.max_index(), 2);
        assert_eq!(remap.get(id(0)).unwrap(), id(0));
        assert_eq!(remap.get(id(3)).unwrap(), id(1));
        assert!(remap.get(id(1)).is_err());

        store.uncompact(&remap.invert()).unwrap();
        assert_eq!(*store.get(id(0)).unwrap(), "a");
        assert_eq!(*store.get(id(3)).unwrap(), "d");
        assert!(!store.is_allocated(id(1)));
        assert!(!store.is_allocated(id(2)));

        // Freed holes are reusable again after uncompact
        assert_eq!(store.add("e"), id(1));
    }

    #[test]
    fn remap_invert_round_trips() {
        let mut remap: Remap<VertexId> = Remap::default();
        remap.insert(id(0), id(0));
        remap.insert(id(4), id(1));
        remap.insert(id(7), id(2));

        let inverse = remap.invert();
        for (old, new) in remap.iter() {
            assert_eq!(inverse.get(new).unwrap(), old);
        }
    }

    #[test]
    fn serde_round_trip_preserves_holes() {
        let mut store: SparseStore<VertexId, String> = SparseStore::new();
        store.add("a".into());
        store.add("b".into());
        store.add("c".into());
        store.remove(id(1)).unwrap();

        let json = serde_json::to_string(&store).unwrap();
        let restored: SparseStore<VertexId, String> = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 2);
        assert_eq!(restored.max_index(), 3);
        assert!(!restored.is_allocated(id(1)));
        assert_eq!(restored.get(id(2)).unwrap(), "c");

        // The hole is still the preferred slot for the next allocation
        let mut restored = restored;
        assert_eq!(restored.add("d".into()), id(1));
    }
}
