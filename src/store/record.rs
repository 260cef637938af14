//! Record views into a Store

use std::fmt;

use super::{AttrSlot, ChildSlot, Extent, RecordSlot, Store};

/// A read-only view of one record
#[derive(Clone, Copy)]
pub struct Record<'s> {
    store: &'s Store,
    index: u32,
    slot: &'s RecordSlot,
}

impl<'s> Record<'s> {
    pub(super) fn new(store: &'s Store, index: u32, slot: &'s RecordSlot) -> Self {
        Record { store, index, slot }
    }

    #[inline]
    fn bytes(&self, extent: Extent) -> &'s [u8] {
        &self.store.tape[extent.range()]
    }

    /// Position of this record in the store
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// True for the synthetic document record at index 0
    #[inline]
    pub fn is_root(&self) -> bool {
        self.index == super::ROOT_RECORD
    }

    /// Tag name as written in the source; empty for the root
    pub fn name(&self) -> &'s [u8] {
        self.bytes(self.slot.name)
    }

    pub fn id(&self) -> Option<&'s [u8]> {
        self.slot.id.map(|e| self.bytes(e))
    }

    pub fn class(&self) -> Option<&'s [u8]> {
        self.slot.class.map(|e| self.bytes(e))
    }

    /// Attributes in source order, duplicates included; id and class are
    /// exposed separately
    pub fn attributes(&self) -> Attributes<'s> {
        let (start, count) = self.slot.attrs;
        let start = start as usize;
        Attributes {
            tape: &self.store.tape,
            slots: &self.store.attrs[start..start + count as usize],
        }
    }

    /// Value of the first attribute named `name` (ASCII case-insensitive).
    ///
    /// Returns `Some(None)` for a valueless attribute such as `disabled`.
    pub fn attribute(&self, name: &str) -> Option<Option<&'s [u8]>> {
        self.attributes()
            .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name.as_bytes()))
            .map(|(_, value)| value)
    }

    /// Inner HTML, if the query saved it
    pub fn inner_html(&self) -> Option<&'s [u8]> {
        self.slot.inner_html.map(|e| self.bytes(e))
    }

    /// Normalized text content, if the query saved it
    pub fn text_content(&self) -> Option<&'s str> {
        self.slot
            .text_content
            .map(|e| &self.store.text[e.range()])
    }

    /// Branch results as `(label, record indices)`, in branch order
    pub fn children(&self) -> Children<'s> {
        let (start, count) = self.slot.children;
        let start = start as usize;
        Children {
            store: self.store,
            slots: &self.store.children[start..start + count as usize],
        }
    }

    /// Record indices matched under `label`; `None` if nothing matched
    pub fn child(&self, label: &str) -> Option<&'s [u32]> {
        self.children()
            .find(|(child_label, _)| *child_label == label)
            .map(|(_, indices)| indices)
    }
}

impl fmt::Debug for Record<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("index", &self.index)
            .field("name", &String::from_utf8_lossy(self.name()))
            .field("id", &self.id().map(String::from_utf8_lossy))
            .field("class", &self.class().map(String::from_utf8_lossy))
            .field("text_content", &self.text_content())
            .field("children", &self.children().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Iterator over a record's `(name, value)` attribute pairs
#[derive(Debug, Clone)]
pub struct Attributes<'s> {
    tape: &'s [u8],
    slots: &'s [AttrSlot],
}

impl<'s> Iterator for Attributes<'s> {
    type Item = (&'s [u8], Option<&'s [u8]>);

    fn next(&mut self) -> Option<Self::Item> {
        let (first, rest) = self.slots.split_first()?;
        self.slots = rest;
        let tape = self.tape;
        Some((
            &tape[first.name.range()],
            first.value.map(|v| &tape[v.range()]),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.slots.len(), Some(self.slots.len()))
    }
}

impl ExactSizeIterator for Attributes<'_> {}

/// Iterator over a record's `(label, indices)` branch results
#[derive(Debug, Clone)]
pub struct Children<'s> {
    store: &'s Store,
    slots: &'s [ChildSlot],
}

impl<'s> Iterator for Children<'s> {
    type Item = (&'s str, &'s [u32]);

    fn next(&mut self) -> Option<Self::Item> {
        let (first, rest) = self.slots.split_first()?;
        self.slots = rest;
        let label = self
            .store
            .labels
            .get(first.label as usize)
            .map(|l| &**l)
            .unwrap_or_default();
        let start = first.start as usize;
        Some((label, &self.store.indices[start..start + first.len as usize]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.slots.len(), Some(self.slots.len()))
    }
}

impl ExactSizeIterator for Children<'_> {}
