//! Query Program Builder
//!
//! Fluent construction of nested queries:
//!
//! ```
//! use spanscrape::{Query, Save};
//!
//! let program = Query::all("article", Save::none())
//!     .then(|q| {
//!         [
//!             q.first("h2", Save::only_text_content()),
//!             q.all("a", Save::none()),
//!         ]
//!     })
//!     .build()
//!     .unwrap();
//! # let _ = program;
//! ```
//!
//! Pending nodes live in a flat arena; `build` folds it into a
//! [`Program`] tree and compiles every selector.

use serde::{Deserialize, Serialize};

use super::program::{Program, QueryNode};
use crate::error::{Error, Result};
use crate::selector::Selector;

/// Which fields to materialize for each match. Name, id, class and
/// attributes are always kept.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Save {
    pub inner_html: bool,
    pub text_content: bool,
}

impl Save {
    pub const fn all() -> Self {
        Save {
            inner_html: true,
            text_content: true,
        }
    }

    pub const fn none() -> Self {
        Save {
            inner_html: false,
            text_content: false,
        }
    }

    pub const fn only_inner_html() -> Self {
        Save {
            inner_html: true,
            text_content: false,
        }
    }

    pub const fn only_text_content() -> Self {
        Save {
            inner_html: false,
            text_content: true,
        }
    }
}

/// How many matches a query node contributes per scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Every matching descendant, in document order
    All,
    /// Only the first matching descendant
    First,
}

/// Entry point for building queries
pub struct Query;

impl Query {
    /// Start a query matching every element selected by `selector`
    pub fn all(selector: impl Into<String>, save: Save) -> QueryBuilder {
        QueryBuilder::new(selector.into(), Mode::All, save)
    }

    /// Start a query matching only the first element selected by `selector`
    pub fn first(selector: impl Into<String>, save: Save) -> QueryBuilder {
        QueryBuilder::new(selector.into(), Mode::First, save)
    }
}

/// Passed to [`QueryBuilder::then`] closures to start sibling branches
#[derive(Debug, Clone, Copy)]
pub struct QueryFactory {
    _private: (),
}

impl QueryFactory {
    pub fn all(&self, selector: impl Into<String>, save: Save) -> QueryBuilder {
        Query::all(selector, save)
    }

    pub fn first(&self, selector: impl Into<String>, save: Save) -> QueryBuilder {
        Query::first(selector, save)
    }
}

#[derive(Debug, Clone)]
struct PendingNode {
    selector: String,
    mode: Mode,
    save: Save,
    branches: Vec<usize>,
}

/// A query under construction. Index 0 of the arena is the root node.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    nodes: Vec<PendingNode>,
    /// Node that `all`/`first`/`then` attach to
    current: usize,
}

impl QueryBuilder {
    fn new(selector: String, mode: Mode, save: Save) -> Self {
        QueryBuilder {
            nodes: vec![PendingNode {
                selector,
                mode,
                save,
                branches: Vec::new(),
            }],
            current: 0,
        }
    }

    fn push_branch(mut self, selector: String, mode: Mode, save: Save) -> Self {
        let idx = self.nodes.len();
        self.nodes.push(PendingNode {
            selector,
            mode,
            save,
            branches: Vec::new(),
        });
        self.nodes[self.current].branches.push(idx);
        self.current = idx;
        self
    }

    /// Match every element selected by `selector` inside each match of the
    /// current node; the new node becomes current
    pub fn all(self, selector: impl Into<String>, save: Save) -> Self {
        self.push_branch(selector.into(), Mode::All, save)
    }

    /// Match the first element selected by `selector` inside each match of
    /// the current node; the new node becomes current
    pub fn first(self, selector: impl Into<String>, save: Save) -> Self {
        self.push_branch(selector.into(), Mode::First, save)
    }

    /// Attach several sibling branches to the current node.
    ///
    /// The current node does not change, so a following `all`/`first`
    /// adds one more sibling after these.
    pub fn then<F, I>(mut self, func: F) -> Self
    where
        F: FnOnce(QueryFactory) -> I,
        I: IntoIterator<Item = QueryBuilder>,
    {
        for child in func(QueryFactory { _private: () }) {
            self.graft(child);
        }
        self
    }

    fn graft(&mut self, other: QueryBuilder) {
        let offset = self.nodes.len();
        self.nodes.extend(other.nodes.into_iter().map(|mut node| {
            for branch in &mut node.branches {
                *branch += offset;
            }
            node
        }));
        self.nodes[self.current].branches.push(offset);
    }

    /// Compile every selector and produce an immutable program
    pub fn build(self) -> Result<Program> {
        let selectors = self
            .nodes
            .iter()
            .map(|node| Selector::compile(&node.selector))
            .collect::<Result<Vec<_>>>()?;

        // Branches always point forward, so assembling back to front
        // finishes every child before its parent
        let mut built: Vec<Option<QueryNode>> = (0..self.nodes.len()).map(|_| None).collect();
        for (idx, (pending, selector)) in self.nodes.into_iter().zip(selectors).enumerate().rev() {
            let branches = pending
                .branches
                .iter()
                .filter_map(|&branch| built.get_mut(branch).and_then(Option::take))
                .collect();
            built[idx] = Some(QueryNode::new(selector, pending.mode, pending.save, branches));
        }

        built
            .into_iter()
            .next()
            .flatten()
            .map(Program::new)
            .ok_or_else(|| Error::invalid_selector("", "query has no nodes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Render a program as nested selector text
    fn outline(node: &QueryNode) -> String {
        let mode = match node.mode() {
            Mode::All => "",
            Mode::First => "1:",
        };
        let branches: Vec<String> = node.branches().iter().map(outline).collect();
        if branches.is_empty() {
            format!("{mode}{}", node.label())
        } else {
            format!("{mode}{}[{}]", node.label(), branches.join(","))
        }
    }

    #[test]
    fn test_chain_is_linear() {
        let program = Query::all("div", Save::none())
            .first("ul", Save::none())
            .all("li", Save::all())
            .build()
            .unwrap();
        assert_eq!(outline(program.root()), "div[1:ul[li]]");
    }

    #[test]
    fn test_then_adds_siblings_and_keeps_current() {
        let program = Query::all("main", Save::none())
            .then(|q| {
                [
                    q.first("h1", Save::none()).all("span", Save::none()),
                    q.all("p", Save::none()),
                ]
            })
            .all("footer", Save::none())
            .build()
            .unwrap();
        assert_eq!(outline(program.root()), "main[1:h1[span],p,footer]");
    }

    #[test]
    fn test_nested_then() {
        let program = Query::first("table", Save::none())
            .then(|q| {
                vec![q.all("tr", Save::none()).then(|q| {
                    [q.first("td", Save::only_text_content()), q.all("th", Save::none())]
                })]
            })
            .build()
            .unwrap();
        assert_eq!(outline(program.root()), "1:table[tr[1:td,th]]");
    }

    #[test]
    fn test_then_with_no_branches() {
        let program = Query::all("a", Save::none())
            .then(|_| Vec::new())
            .build()
            .unwrap();
        assert_eq!(outline(program.root()), "a");
    }

    #[test]
    fn test_invalid_selector_anywhere_fails_build() {
        let err = Query::all("div", Save::none())
            .then(|q| [q.all("a", Save::none()), q.all("p > a", Save::none())])
            .build()
            .unwrap_err();
        match err {
            Error::InvalidSelector { selector, .. } => assert_eq!(selector, "p > a"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_save_presets() {
        assert_eq!(Save::default(), Save::none());
        assert!(Save::all().inner_html && Save::all().text_content);
        assert!(!Save::only_inner_html().text_content);
        assert!(!Save::only_text_content().inner_html);
    }
}
