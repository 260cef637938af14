//! Store - the flat result table
//!
//! Every record's bytes are copied into one shared tape, normalized text
//! into one shared string, and branch labels are interned. Records refer to
//! those buffers by range, so a Store owns everything it exposes and
//! outlives the document and input it was built from.

mod record;

pub use record::{Attributes, Children, Record};

use std::ops::Range;

/// Index of the synthetic root record
pub const ROOT_RECORD: u32 = 0;

/// A byte range into the tape or text buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Extent {
    start: usize,
    end: usize,
}

impl Extent {
    #[inline]
    fn range(self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AttrSlot {
    name: Extent,
    value: Option<Extent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChildSlot {
    label: u32,
    start: u32,
    len: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct RecordSlot {
    name: Extent,
    id: Option<Extent>,
    class: Option<Extent>,
    attrs: (u32, u32),
    inner_html: Option<Extent>,
    text_content: Option<Extent>,
    children: (u32, u32),
}

/// Fields copied into a record at allocation time
pub(crate) struct RecordFields<'a, A> {
    pub name: &'a [u8],
    pub id: Option<&'a [u8]>,
    pub class: Option<&'a [u8]>,
    /// `(name, value)` pairs in source order
    pub attributes: A,
    pub inner_html: Option<&'a [u8]>,
    pub text_content: Option<&'a str>,
}

/// Ordered, index-addressable table of matched elements.
///
/// Index 0 is the root record for the whole document; it has an empty
/// name and only children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Store {
    tape: Vec<u8>,
    text: String,
    labels: Vec<Box<str>>,
    records: Vec<RecordSlot>,
    attrs: Vec<AttrSlot>,
    children: Vec<ChildSlot>,
    indices: Vec<u32>,
}

impl Store {
    /// Create a store holding only the root record
    pub(crate) fn new(input_len: usize) -> Self {
        Store {
            // Typical selective queries keep well under a tenth of the input
            tape: Vec::with_capacity((input_len / 8).max(64)),
            text: String::new(),
            labels: Vec::new(),
            records: vec![RecordSlot::default()],
            attrs: Vec::new(),
            children: Vec::new(),
            indices: Vec::new(),
        }
    }

    /// Number of records, including the root
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always false: a store has at least its root record
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by index; `None` when out of range
    pub fn get(&self, index: usize) -> Option<Record<'_>> {
        self.records
            .get(index)
            .map(|slot| Record::new(self, index as u32, slot))
    }

    /// The root record
    pub fn root(&self) -> Record<'_> {
        Record::new(self, ROOT_RECORD, &self.records[ROOT_RECORD as usize])
    }

    /// Iterate over all records in index order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            store: self,
            next: 0,
        }
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Extent {
        let start = self.tape.len();
        self.tape.extend_from_slice(bytes);
        Extent {
            start,
            end: self.tape.len(),
        }
    }

    fn push_text(&mut self, text: &str) -> Extent {
        let start = self.text.len();
        self.text.push_str(text);
        Extent {
            start,
            end: self.text.len(),
        }
    }

    /// Allocate the next record and copy its fields in
    pub(crate) fn push_record<'a, A>(&mut self, fields: RecordFields<'a, A>) -> u32
    where
        A: IntoIterator<Item = (&'a [u8], Option<&'a [u8]>)>,
    {
        let index = self.records.len() as u32;

        let name = self.push_bytes(fields.name);
        let id = fields.id.map(|id| self.push_bytes(id));
        let class = fields.class.map(|class| self.push_bytes(class));

        let attr_start = self.attrs.len() as u32;
        for (attr_name, attr_value) in fields.attributes {
            let name = self.push_bytes(attr_name);
            let value = attr_value.map(|v| self.push_bytes(v));
            self.attrs.push(AttrSlot { name, value });
        }
        let attr_count = self.attrs.len() as u32 - attr_start;

        let inner_html = fields.inner_html.map(|html| self.push_bytes(html));
        let text_content = fields.text_content.map(|text| self.push_text(text));

        self.records.push(RecordSlot {
            name,
            id,
            class,
            attrs: (attr_start, attr_count),
            inner_html,
            text_content,
            children: (0, 0),
        });
        index
    }

    /// Record the branch results of `index`. Labels that repeat are merged
    /// under their first occurrence.
    pub(crate) fn set_children<'l>(
        &mut self,
        index: u32,
        branches: impl IntoIterator<Item = (&'l str, Vec<u32>)>,
    ) {
        let mut merged: Vec<(u32, Vec<u32>)> = Vec::new();
        for (label, matches) in branches {
            if matches.is_empty() {
                continue;
            }
            let label = self.intern(label);
            match merged.iter_mut().find(|(existing, _)| *existing == label) {
                Some((_, list)) => list.extend(matches),
                None => merged.push((label, matches)),
            }
        }

        let start = self.children.len() as u32;
        for (label, matches) in merged {
            let slot = ChildSlot {
                label,
                start: self.indices.len() as u32,
                len: matches.len() as u32,
            };
            self.indices.extend(matches);
            self.children.push(slot);
        }
        let count = self.children.len() as u32 - start;

        if let Some(record) = self.records.get_mut(index as usize) {
            record.children = (start, count);
        }
    }

    fn intern(&mut self, label: &str) -> u32 {
        match self.labels.iter().position(|l| &**l == label) {
            Some(pos) => pos as u32,
            None => {
                self.labels.push(label.into());
                (self.labels.len() - 1) as u32
            }
        }
    }

    /// Release over-allocated capacity
    pub(crate) fn shrink_to_fit(&mut self) {
        self.tape.shrink_to_fit();
        self.text.shrink_to_fit();
        self.records.shrink_to_fit();
        self.attrs.shrink_to_fit();
        self.children.shrink_to_fit();
        self.indices.shrink_to_fit();
    }
}

/// Iterator over a store's records, returned by [`Store::iter`]
#[derive(Debug, Clone)]
pub struct Iter<'s> {
    store: &'s Store,
    next: usize,
}

impl<'s> Iterator for Iter<'s> {
    type Item = Record<'s>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.store.get(self.next)?;
        self.next += 1;
        Some(record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.store.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'s> IntoIterator for &'s Store {
    type Item = Record<'s>;
    type IntoIter = Iter<'s>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(store: &mut Store, name: &str, attrs: &[(&str, Option<&str>)]) -> u32 {
        store.push_record(RecordFields {
            name: name.as_bytes(),
            id: None,
            class: Some(b"c"),
            attributes: attrs
                .iter()
                .map(|(n, v)| (n.as_bytes(), v.map(str::as_bytes))),
            inner_html: Some(b"<b>x</b>"),
            text_content: Some("x"),
        })
    }

    #[test]
    fn test_root_record_only() {
        let store = Store::new(0);
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
        let root = store.root();
        assert!(root.is_root());
        assert_eq!(root.name(), b"");
        assert_eq!(root.children().count(), 0);
        assert!(store.get(1).is_none());
    }

    #[test]
    fn test_push_and_read_back() {
        let mut store = Store::new(100);
        let idx = push(&mut store, "a", &[("href", Some("/x")), ("download", None)]);
        assert_eq!(idx, 1);

        let record = store.get(1).unwrap();
        assert_eq!(record.name(), b"a");
        assert_eq!(record.class(), Some(&b"c"[..]));
        assert_eq!(record.id(), None);
        assert_eq!(record.inner_html(), Some(&b"<b>x</b>"[..]));
        assert_eq!(record.text_content(), Some("x"));
        let attrs: Vec<_> = record.attributes().collect();
        assert_eq!(
            attrs,
            vec![(&b"href"[..], Some(&b"/x"[..])), (&b"download"[..], None)]
        );
    }

    #[test]
    fn test_children_merge_and_skip_empty() {
        let mut store = Store::new(0);
        let a = push(&mut store, "a", &[]);
        let b = push(&mut store, "b", &[]);
        let c = push(&mut store, "a", &[]);
        store.set_children(
            ROOT_RECORD,
            [("a", vec![a]), ("b", vec![b]), ("none", vec![]), ("a", vec![c])],
        );

        let root = store.root();
        let children: Vec<(&str, &[u32])> = root.children().collect();
        assert_eq!(children, vec![("a", &[1, 3][..]), ("b", &[2][..])]);
        assert_eq!(root.child("none"), None);
    }

    #[test]
    fn test_iter_and_into_iter() {
        let mut store = Store::new(0);
        push(&mut store, "p", &[]);
        assert_eq!(store.iter().len(), 2);
        let names: Vec<&[u8]> = (&store).into_iter().map(|r| r.name()).collect();
        assert_eq!(names, vec![&b""[..], b"p"]);
    }

    #[test]
    fn test_store_is_send_sync_static() {
        fn assert_owned<T: Send + Sync + 'static>() {}
        assert_owned::<Store>();
    }
}
