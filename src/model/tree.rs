//! Generic ordered tree and the index elements stored in it.

use serde::{Deserialize, Serialize};

use super::Link;

/// A node of an ordered tree. The node owns its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode<T> {
    pub data: T,
    pub children: Vec<TreeNode<T>>,
}

impl<T> TreeNode<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            children: Vec::new(),
        }
    }

    /// Append a child node and return a reference to it.
    pub fn append(&mut self, child: TreeNode<T>) -> &mut TreeNode<T> {
        self.children.push(child);
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    /// Append a leaf holding `data` and return a reference to it.
    pub fn append_data(&mut self, data: T) -> &mut TreeNode<T> {
        self.append(TreeNode::new(data))
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| 1 + child.descendant_count())
            .sum()
    }

    /// Visit every descendant depth-first, children before later siblings.
    ///
    /// The callback receives the depth (1 for direct children).
    pub fn walk<F: FnMut(usize, &T)>(&self, mut f: F) {
        fn visit<T, F: FnMut(usize, &T)>(node: &TreeNode<T>, depth: usize, f: &mut F) {
            for child in &node.children {
                f(depth, &child.data);
                visit(child, depth + 1, f);
            }
        }
        visit(self, 1, &mut f);
    }
}

/// One entry of a document index (table of contents).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexElement {
    pub title: String,
    pub link: Option<Link>,
}

impl IndexElement {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: None,
        }
    }

    pub fn with_link(title: impl Into<String>, link: Link) -> Self {
        Self {
            title: title.into(),
            link: Some(link),
        }
    }
}

/// The index handed to the host: a `ROOT` element with the outline below it.
pub type IndexTree = TreeNode<IndexElement>;
