//! Mailbox hierarchy
//!
//! The tree is an arena of nodes addressed by [`NodeId`]. Each id
//! carries a generation, so an id that survived a refresh of its
//! parent is detected as stale instead of silently pointing at a
//! recycled slot. Parents own their children; the parent link is only
//! an id used for navigation.
//!
//! Children are always kept sorted case-insensitively by mailbox name.

use crate::error::{Error, Result};
use crate::response::ListEntry;
use serde::Serialize;
use std::fmt;

/// Stable handle to a node, valid until the node's parent is refreshed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// One mailbox, or the synthetic root when `name` is `None`.
#[derive(Debug, Clone)]
pub struct MailboxNode {
    name: Option<String>,
    separator: char,
    attributes: Vec<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    fetched: bool,
}

impl MailboxNode {
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Whether a LIST for this node's children has completed.
    #[must_use]
    pub const fn is_fetched(&self) -> bool {
        self.fetched
    }

    /// Last component of the hierarchical name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        let Some(name) = self.name.as_deref() else {
            return "";
        };
        name.rsplit(self.separator).next().unwrap_or(name)
    }

    /// Name of the degenerate entry some servers return when listing
    /// this node's children: the node itself followed by its separator.
    #[must_use]
    pub fn self_listing(&self) -> String {
        format!("{}{}", self.name.as_deref().unwrap_or_default(), self.separator)
    }

    /// Wildcard pattern that lists this node's direct children.
    #[must_use]
    pub fn children_pattern(&self) -> String {
        match &self.name {
            None => "%".to_string(),
            Some(name) => format!("{name}{}%", self.separator),
        }
    }
}

/// What a caller wants to read from a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DataRole {
    DisplayName,
    MailboxName,
    HierarchySeparator,
    ChildCount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    None,
    Text(String),
    Char(char),
    Count(usize),
}

/// Serializable copy of a subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailboxSnapshot {
    pub name: Option<String>,
    pub separator: char,
    pub children: Vec<Self>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<MailboxNode>,
}

#[derive(Debug)]
pub struct MailboxTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
}

impl MailboxTree {
    #[must_use]
    pub fn new(root_separator: char) -> Self {
        let root = MailboxNode {
            name: None,
            separator: root_separator,
            attributes: Vec::new(),
            children: Vec::new(),
            parent: None,
            fetched: false,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether the root has no children yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root_node().children.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&MailboxNode> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` was invalidated by a refresh.
    pub fn node(&self, id: NodeId) -> Result<&MailboxNode> {
        self.get(id).ok_or(Error::StaleNode(id))
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` is no longer in the tree.
    pub fn children_of(&self, id: NodeId) -> Result<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` is no longer in the tree.
    pub fn parent_of(&self, id: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// Position of `id` among its siblings; `None` for the root.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` is no longer in the tree.
    pub fn index_in_parent(&self, id: NodeId) -> Result<Option<usize>> {
        let Some(parent) = self.node(id)?.parent else {
            return Ok(None);
        };
        Ok(self.node(parent)?.children.iter().position(|c| *c == id))
    }

    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` is no longer in the tree.
    pub fn data_of(&self, id: NodeId, role: DataRole) -> Result<NodeData> {
        let node = self.node(id)?;
        Ok(match role {
            DataRole::DisplayName if node.name.is_some() => {
                NodeData::Text(node.display_name().to_string())
            }
            DataRole::MailboxName => node
                .name
                .as_ref()
                .map_or(NodeData::None, |name| NodeData::Text(name.clone())),
            DataRole::HierarchySeparator => NodeData::Char(node.separator),
            DataRole::ChildCount => NodeData::Count(node.children.len()),
            DataRole::DisplayName => NodeData::None,
        })
    }

    /// Find a live mailbox by its full name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            if node.name.as_deref() == Some(name) {
                return Some(id);
            }
            stack.extend(node.children.iter().copied());
        }
        None
    }

    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` is no longer in the tree.
    pub fn snapshot(&self, id: NodeId) -> Result<MailboxSnapshot> {
        let node = self.node(id)?;
        let children = node
            .children
            .iter()
            .map(|child| self.snapshot(*child))
            .collect::<Result<Vec<_>>>()?;
        Ok(MailboxSnapshot {
            name: node.name.clone(),
            separator: node.separator,
            children,
        })
    }

    /// Replace the whole child list of `id` with one node per entry.
    ///
    /// Previous children and their subtrees are destroyed and their ids
    /// become stale. Returns the ids of the new children in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StaleNode`] if `id` is no longer in the tree.
    pub fn replace_children(
        &mut self,
        id: NodeId,
        entries: impl IntoIterator<Item = ListEntry>,
    ) -> Result<Vec<NodeId>> {
        let old = std::mem::take(&mut self.node_mut(id)?.children);
        for child in old {
            self.remove_subtree(child);
        }

        let mut entries: Vec<ListEntry> = entries.into_iter().collect();
        entries.sort_by_cached_key(|entry| entry.mailbox.to_lowercase());

        let children: Vec<NodeId> = entries
            .into_iter()
            .map(|entry| {
                self.alloc(MailboxNode {
                    name: Some(entry.mailbox),
                    separator: entry.separator,
                    attributes: entry.attributes,
                    children: Vec::new(),
                    parent: Some(id),
                    fetched: false,
                })
            })
            .collect();

        let node = self.node_mut(id)?;
        node.children.clone_from(&children);
        node.fetched = true;
        Ok(children)
    }

    fn root_node(&self) -> &MailboxNode {
        self.slots[self.root.index as usize]
            .node
            .as_ref()
            .unwrap_or_else(|| unreachable!("root slot is never freed"))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut MailboxNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(Error::StaleNode(id))
    }

    fn alloc(&mut self, node: MailboxNode) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = u32::try_from(self.slots.len())
            .unwrap_or_else(|_| unreachable!("mailbox tree exceeded u32 slots"));
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slots.get_mut(id.index as usize) else {
                continue;
            };
            if slot.generation != id.generation {
                continue;
            }
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
                stack.extend(node.children);
            }
        }
    }
}
