//! Compiled query programs
//!
//! A [`Program`] is an immutable tree of [`QueryNode`]s. It is cheap to
//! clone and can be shared across threads and reused for any number of
//! documents.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::builder::{Mode, Save};
use crate::error::{Error, Result};
use crate::selector::Selector;

/// Saved program format version
const FORMAT_VERSION: u32 = 1;

/// One node of a compiled program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryNode {
    selector: Selector,
    mode: Mode,
    save: Save,
    branches: Vec<QueryNode>,
}

impl QueryNode {
    pub(crate) fn new(selector: Selector, mode: Mode, save: Save, branches: Vec<QueryNode>) -> Self {
        QueryNode {
            selector,
            mode,
            save,
            branches,
        }
    }

    #[inline]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Label this node's matches are recorded under: its selector text
    #[inline]
    pub fn label(&self) -> &str {
        self.selector.as_str()
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    pub fn save(&self) -> Save {
        self.save
    }

    /// Child queries, evaluated inside each match of this node
    #[inline]
    pub fn branches(&self) -> &[QueryNode] {
        &self.branches
    }
}

/// A compiled, immutable query program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    root: Arc<QueryNode>,
}

impl Program {
    pub(crate) fn new(root: QueryNode) -> Self {
        Program {
            root: Arc::new(root),
        }
    }

    /// The top-level query node
    #[inline]
    pub fn root(&self) -> &QueryNode {
        &self.root
    }

    /// Serialize the program to JSON.
    ///
    /// Selector text, modes, field flags and branch structure are kept;
    /// labels are the selector text and so come back unchanged.
    pub fn save(&self) -> Result<String> {
        let saved = SavedProgram {
            version: FORMAT_VERSION,
            root: SavedNode::from(self.root()),
        };
        Ok(serde_json::to_string(&saved)?)
    }

    /// Load a program written by [`save`](Self::save), recompiling every
    /// selector
    pub fn load(json: &str) -> Result<Self> {
        let saved: SavedProgram = serde_json::from_str(json)?;
        if saved.version != FORMAT_VERSION {
            return Err(Error::Persist(serde::de::Error::custom(format!(
                "unsupported program format version {} (expected {FORMAT_VERSION})",
                saved.version
            ))));
        }
        Ok(Program::new(saved.root.compile()?))
    }
}

#[derive(Serialize, Deserialize)]
struct SavedProgram {
    version: u32,
    root: SavedNode,
}

#[derive(Serialize, Deserialize)]
struct SavedNode {
    selector: String,
    mode: Mode,
    #[serde(default)]
    save: Save,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    branches: Vec<SavedNode>,
}

impl From<&QueryNode> for SavedNode {
    fn from(node: &QueryNode) -> Self {
        SavedNode {
            selector: node.label().to_string(),
            mode: node.mode,
            save: node.save,
            branches: node.branches.iter().map(SavedNode::from).collect(),
        }
    }
}

impl SavedNode {
    fn compile(self) -> Result<QueryNode> {
        let selector = Selector::compile(&self.selector)?;
        let branches = self
            .branches
            .into_iter()
            .map(SavedNode::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(QueryNode::new(selector, self.mode, self.save, branches))
    }
}
