//! Query Evaluator
//!
//! Walks a [`Document`] under the direction of compiled programs and fills
//! a [`Store`]. Records are allocated in discovery order, so a match always
//! gets a lower index than anything found inside it.

use tracing::trace;

use super::builder::Mode;
use super::program::{Program, QueryNode};
use super::text::text_content;
use crate::dom::{Document, Element, Node, NodeId, ROOT};
use crate::store::{RecordFields, Store, ROOT_RECORD};

/// Evaluate `programs` against a parsed document.
///
/// Top-level matches are recorded under the root record, labeled by their
/// selector text. Evaluation never fails.
pub fn evaluate(doc: &Document<'_>, programs: &[Program]) -> Store {
    let mut evaluator = Evaluator {
        doc,
        store: Store::new(doc.input().len()),
        text_buf: String::new(),
    };

    let top: Vec<(&str, Vec<u32>)> = programs
        .iter()
        .map(|program| {
            let root = program.root();
            (root.label(), evaluator.run(ROOT, root))
        })
        .collect();

    let mut store = evaluator.store;
    store.set_children(ROOT_RECORD, top);
    store.shrink_to_fit();
    store
}

struct Evaluator<'d, 'a> {
    doc: &'d Document<'a>,
    store: Store,
    /// Reused across records
    text_buf: String,
}

impl Evaluator<'_, '_> {
    /// Match `query` against the descendants of `scope`; returns the record
    /// indices allocated for the matches
    fn run(&mut self, scope: NodeId, query: &QueryNode) -> Vec<u32> {
        let doc = self.doc;
        let input = doc.input();
        let mut matches = Vec::new();

        for id in doc.descendants(scope) {
            let Some(elem) = doc.node(id).and_then(Node::as_element) else {
                continue;
            };
            if !query.selector().matches(input, elem) {
                continue;
            }
            matches.push(self.record(id, elem, query));
            if query.mode() == Mode::First {
                break;
            }
        }

        trace!(
            selector = query.label(),
            scope,
            matches = matches.len(),
            "query evaluated"
        );
        matches
    }

    /// Allocate a record for a matched element and evaluate its branches
    fn record(&mut self, id: NodeId, elem: &Element, query: &QueryNode) -> u32 {
        let doc = self.doc;
        let input = doc.input();
        let save = query.save();

        let text = if save.text_content {
            text_content(doc, id, &mut self.text_buf);
            Some(self.text_buf.as_str())
        } else {
            None
        };

        let index = self.store.push_record(RecordFields {
            name: elem.name.slice(input),
            id: elem.id.map(|span| span.slice(input)),
            class: elem.class.map(|span| span.slice(input)),
            attributes: doc
                .attributes(id)
                .iter()
                .map(|attr| (attr.name(input), attr.value(input))),
            inner_html: save.inner_html.then(|| elem.inner.slice(input)),
            text_content: text,
        });

        if !query.branches().is_empty() {
            let branches: Vec<(&str, Vec<u32>)> = query
                .branches()
                .iter()
                .map(|branch| (branch.label(), self.run(id, branch)))
                .collect();
            self.store.set_children(index, branches);
        }

        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Query, Save};

    fn run(html: &str, programs: &[Program]) -> Store {
        let doc = Document::parse(html.as_bytes()).unwrap();
        evaluate(&doc, programs)
    }

    #[test]
    fn test_all_includes_nested_matches() {
        let program = Query::all("div", Save::none()).build().unwrap();
        let store = run("<div><div><div></div></div></div><div></div>", &[program]);
        assert_eq!(store.len(), 5);
        assert_eq!(store.root().child("div"), Some(&[1, 2, 3, 4][..]));
    }

    #[test]
    fn test_first_per_scope() {
        let program = Query::all("ul", Save::none())
            .first("li", Save::only_text_content())
            .build()
            .unwrap();
        let store = run(
            "<ul><li>a</li><li>b</li></ul><ul><li>c</li></ul><ul></ul>",
            &[program],
        );
        // 3 ul + 2 li + root
        assert_eq!(store.len(), 6);
        let first_ul = store.get(1).unwrap();
        assert_eq!(first_ul.child("li"), Some(&[2][..]));
        assert_eq!(store.get(2).unwrap().text_content(), Some("a"));
        assert_eq!(store.get(4).unwrap().text_content(), Some("c"));
        // Empty branch results are omitted
        assert_eq!(store.get(5).unwrap().children().count(), 0);
    }

    #[test]
    fn test_scope_excludes_itself() {
        let program = Query::all("div", Save::none())
            .all("div", Save::none())
            .build()
            .unwrap();
        let store = run("<div id=a><div id=b></div></div>", &[program]);
        let root_divs = store.root().child("div").unwrap();
        assert_eq!(root_divs, &[1, 3]);
        assert_eq!(store.get(1).unwrap().child("div"), Some(&[2][..]));
        assert_eq!(store.get(3).unwrap().child("div"), None);
    }

    #[test]
    fn test_branch_indices_above_parent() {
        let program = Query::all("section", Save::none())
            .then(|q| [q.all("h1", Save::none()), q.all("p", Save::none())])
            .build()
            .unwrap();
        let store = run(
            "<section><h1>a</h1><p>b</p></section><section><p>c</p></section>",
            &[program],
        );
        for record in store.iter() {
            for (_, indices) in record.children() {
                assert!(indices.iter().all(|&j| j > record.index()));
            }
        }
    }

    #[test]
    fn test_multiple_programs_with_same_label_merge() {
        let a = Query::first("p", Save::none()).build().unwrap();
        let b = Query::all("p", Save::none()).build().unwrap();
        let store = run("<p>1</p><p>2</p>", &[a, b]);
        let children: Vec<_> = store.root().children().collect();
        assert_eq!(children, vec![("p", &[1, 2, 3][..])]);
    }

    #[test]
    fn test_no_programs() {
        let store = run("<p>x</p>", &[]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_inner_html_of_void_is_empty() {
        let program = Query::all("img", Save::all()).build().unwrap();
        let store = run("<img src=a.png>", &[program]);
        let img = store.get(1).unwrap();
        assert_eq!(img.inner_html(), Some(&b""[..]));
        assert_eq!(img.text_content(), Some(""));
    }
}
