//! Arena-backed game tree. Each node holds the snapshot reached by one move,
//! and a node's first variation is its main-line continuation.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Index;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::TreeError;
use crate::nag::Nag;
use crate::state::GameState;
use crate::types::Move;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one tree; node ids from different trees never compare equal.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TreeId(u64);

/// A node's address: its tree, its arena slot, and the generation of that
/// slot when the node was created.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId {
    tree: TreeId,
    index: usize,
    generation: u32,
}

impl NodeId {
    pub fn tree(&self) -> TreeId {
        self.tree
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.{}", self.tree.0, self.index, self.generation)
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    state: GameState,
    parent: Option<NodeId>,
    last_move: Option<Move>,
    description: Option<String>,
    variations: Vec<NodeId>,
    comment: Option<String>,
    nags: BTreeSet<Nag>,
    show_variations: bool,
    show_line: bool,
}

impl Node {
    fn new(
        state: GameState,
        parent: Option<NodeId>,
        last_move: Option<Move>,
        description: Option<String>,
    ) -> Self {
        Self {
            state,
            parent,
            last_move,
            description,
            variations: Vec::new(),
            comment: None,
            nags: BTreeSet::new(),
            show_variations: true,
            show_line: true,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The move that produced this node; `None` at the root.
    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn variations(&self) -> &[NodeId] {
        &self.variations
    }

    pub fn main_line_child(&self) -> Option<NodeId> {
        self.variations.first().copied()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn nags(&self) -> &BTreeSet<Nag> {
        &self.nags
    }

    pub fn show_variations(&self) -> bool {
        self.show_variations
    }

    pub fn show_line(&self) -> bool {
        self.show_line
    }

    fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment.filter(|text| !text.is_empty());
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description().unwrap_or("start position"))
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Owns every node. Freed slots go on a free list and are reused with a
/// bumped generation, so ids of deleted nodes report
/// [`TreeError::Detached`] instead of aliasing a newer node.
#[derive(Debug)]
pub struct PositionTree {
    id: TreeId,
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl PositionTree {
    pub fn new(state: GameState) -> Self {
        Self {
            id: TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed)),
            slots: vec![Slot {
                generation: 0,
                node: Some(Node::new(state, None, None, None)),
            }],
            free: Vec::new(),
        }
    }

    pub fn id(&self) -> TreeId {
        self.id
    }

    pub fn root(&self) -> NodeId {
        NodeId {
            tree: self.id,
            index: 0,
            generation: 0,
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, TreeError> {
        if id.tree != self.id {
            return Err(TreeError::ForeignNode(id));
        }
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(TreeError::Detached(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        if id.tree != self.id {
            return Err(TreeError::ForeignNode(id));
        }
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(TreeError::Detached(id))
    }

    /// Stores `node` in a freed slot when there is one, else in a new slot.
    fn allocate(&mut self, node: Node) -> NodeId {
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index].node = Some(node);
                index
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                self.slots.len() - 1
            }
        };
        NodeId {
            tree: self.id,
            index,
            generation: self.slots[index].generation,
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_ok()
    }

    /// Live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Slots held by the arena, live or waiting for reuse.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn variation(&self, parent: NodeId, mv: &Move) -> Result<Option<NodeId>, TreeError> {
        Ok(self
            .node(parent)?
            .variations
            .iter()
            .copied()
            .find(|child| self[*child].last_move.as_ref() == Some(mv)))
    }

    /// Appends a new child under `parent`, after any existing variations.
    pub fn add_variation(
        &mut self,
        parent: NodeId,
        mv: Move,
        state: GameState,
        description: impl Into<String>,
    ) -> Result<NodeId, TreeError> {
        self.node(parent)?;
        let id = self.allocate(Node::new(state, Some(parent), Some(mv), Some(description.into())));
        self.node_mut(parent)?.variations.push(id);
        Ok(id)
    }

    /// Detaches `child` from `parent` and frees its whole subtree. Returns
    /// false when `child` is not a variation of `parent`.
    pub fn delete_variation(&mut self, parent: NodeId, child: NodeId) -> Result<bool, TreeError> {
        let variations = &mut self.node_mut(parent)?.variations;
        let Some(pos) = variations.iter().position(|id| *id == child) else {
            return Ok(false);
        };
        variations.remove(pos);
        self.free_subtree(child);
        Ok(true)
    }

    /// Drops every variation of `id`, returning how many there were.
    pub fn clear_variations(&mut self, id: NodeId) -> Result<usize, TreeError> {
        let children = std::mem::take(&mut self.node_mut(id)?.variations);
        for child in &children {
            self.free_subtree(*child);
        }
        Ok(children.len())
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(next.index)
                .filter(|slot| slot.generation == next.generation)
            else {
                continue;
            };
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(next.index);
                stack.extend(node.variations);
            }
        }
    }

    /// Moves `child` one place towards the main line. No-op when it is
    /// already first.
    pub fn promote_variation(&mut self, parent: NodeId, child: NodeId) -> Result<bool, TreeError> {
        let variations = &mut self.node_mut(parent)?.variations;
        match variations.iter().position(|id| *id == child) {
            Some(pos) if pos > 0 => {
                variations.swap(pos, pos - 1);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn demote_variation(&mut self, parent: NodeId, child: NodeId) -> Result<bool, TreeError> {
        let variations = &mut self.node_mut(parent)?.variations;
        match variations.iter().position(|id| *id == child) {
            Some(pos) if pos + 1 < variations.len() => {
                variations.swap(pos, pos + 1);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// True when every step from the root to `id` takes the first variation.
    pub fn is_main_line(&self, id: NodeId) -> Result<bool, TreeError> {
        let mut current = id;
        while let Some(parent) = self.node(current)?.parent {
            if self[parent].main_line_child() != Some(current) {
                return Ok(false);
            }
            current = parent;
        }
        Ok(true)
    }

    /// Nodes from the root down to `id`, both included.
    pub fn line_to(&self, id: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let mut line = vec![id];
        let mut current = self.node(id)?;
        while let Some(parent) = current.parent {
            line.push(parent);
            current = &self[parent];
        }
        line.reverse();
        Ok(line)
    }

    pub fn ply(&self, id: NodeId) -> Result<usize, TreeError> {
        Ok(self.line_to(id)?.len() - 1)
    }

    /// Root followed by each first variation.
    pub fn main_line(&self) -> Vec<NodeId> {
        let mut line = vec![self.root()];
        let mut current = self.root();
        while let Some(next) = self[current].main_line_child() {
            line.push(next);
            current = next;
        }
        line
    }

    pub fn end_of_main_line(&self) -> NodeId {
        let mut current = self.root();
        while let Some(next) = self[current].main_line_child() {
            current = next;
        }
        current
    }

    pub fn next_moves(&self, id: NodeId) -> Result<Vec<Move>, TreeError> {
        Ok(self
            .node(id)?
            .variations
            .iter()
            .filter_map(|child| self[*child].last_move)
            .collect())
    }

    /// Nodes exactly `depth` plies below `id`, in variation order.
    pub fn descendants_at(&self, id: NodeId, depth: usize) -> Result<Vec<NodeId>, TreeError> {
        let mut frontier = vec![id];
        self.node(id)?;
        for _ in 0..depth {
            frontier = frontier
                .iter()
                .flat_map(|node| self[*node].variations.iter().copied())
                .collect();
        }
        Ok(frontier)
    }

    pub fn set_comment(&mut self, id: NodeId, comment: &str) -> Result<(), TreeError> {
        self.node_mut(id)?.set_comment(Some(comment.to_string()));
        Ok(())
    }

    pub fn append_comment(&mut self, id: NodeId, text: &str) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        let comment = match node.comment.take() {
            Some(existing) => format!("{existing} {text}"),
            None => text.to_string(),
        };
        node.set_comment(Some(comment));
        Ok(())
    }

    /// Removes the last word of the comment. False when there was no comment.
    pub fn delete_word(&mut self, id: NodeId) -> Result<bool, TreeError> {
        let node = self.node_mut(id)?;
        let Some(comment) = node.comment.take() else {
            return Ok(false);
        };
        let mut words: Vec<&str> = comment.split_whitespace().collect();
        words.pop();
        node.set_comment(Some(words.join(" ")));
        Ok(true)
    }

    pub fn add_nag(&mut self, id: NodeId, nag: Nag) -> Result<bool, TreeError> {
        Ok(self.node_mut(id)?.nags.insert(nag))
    }

    pub fn remove_nag(&mut self, id: NodeId, nag: Nag) -> Result<bool, TreeError> {
        Ok(self.node_mut(id)?.nags.remove(&nag))
    }

    /// Ignored at the root, whose line is always shown.
    pub fn set_show_line(&mut self, id: NodeId, show: bool) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        if node.parent.is_some() {
            node.show_line = show;
        }
        Ok(())
    }

    pub fn set_show_variations(&mut self, id: NodeId, show: bool) -> Result<(), TreeError> {
        self.node_mut(id)?.show_variations = show;
        Ok(())
    }

    /// Hides the variations of `id` and of every node below it.
    pub fn collapse_subtree(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.node(id)?;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let node = self.node_mut(next)?;
            node.show_variations = false;
            stack.extend(node.variations.iter().copied());
        }
        Ok(())
    }
}

/// Panics on ids from another tree or of deleted nodes; use
/// [`PositionTree::node`] for ids that may be stale.
impl Index<NodeId> for PositionTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.node(id) {
            Ok(node) => node,
            Err(err) => panic!("{err}"),
        }
    }
}
