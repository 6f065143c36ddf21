use std::fmt;

use crate::error::TreeError;
use crate::tree::{NodeId, PositionTree};
use crate::types::Move;

/// A start node plus the moves leading from it to some later node. Walking a
/// path re-resolves every step, so it notices when the tree changed since
/// the path was recorded.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Path {
    start: NodeId,
    moves: Vec<Move>,
}

impl Path {
    pub fn new(start: NodeId, moves: Vec<Move>) -> Self {
        Self { start, moves }
    }

    /// Records the moves from `ancestor` down to `node`.
    pub fn between(tree: &PositionTree, ancestor: NodeId, node: NodeId) -> Result<Self, TreeError> {
        tree.node(ancestor)?;
        let mut moves = Vec::new();
        let mut current = node;
        while current != ancestor {
            let step = tree.node(current)?;
            match (step.parent(), step.last_move()) {
                (Some(parent), Some(mv)) => {
                    moves.push(mv);
                    current = parent;
                }
                _ => return Err(TreeError::NotAncestor { ancestor, node }),
            }
        }
        moves.reverse();
        Ok(Self::new(ancestor, moves))
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Yields the start node, then the node reached by each move. A step that
    /// cannot be resolved yields one error and ends the walk.
    pub fn walk<'a>(&'a self, tree: &'a PositionTree) -> Walk<'a> {
        Walk {
            tree,
            path: self,
            current: None,
            next_move: 0,
            done: false,
        }
    }

    /// The node at the end of the path.
    pub fn resolve(&self, tree: &PositionTree) -> Result<NodeId, TreeError> {
        let mut end = self.start;
        for step in self.walk(tree) {
            end = step?;
        }
        Ok(end)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-[", self.start)?;
        for (idx, mv) in self.moves.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{mv}")?;
        }
        f.write_str("]")
    }
}

pub struct Walk<'a> {
    tree: &'a PositionTree,
    path: &'a Path,
    current: Option<NodeId>,
    next_move: usize,
    done: bool,
}

impl Iterator for Walk<'_> {
    type Item = Result<NodeId, TreeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let Some(current) = self.current else {
            let start = self.path.start;
            return match self.tree.node(start) {
                Ok(_) => {
                    self.current = Some(start);
                    Some(Ok(start))
                }
                Err(err) => {
                    self.done = true;
                    Some(Err(err))
                }
            };
        };

        let mv = *self.path.moves.get(self.next_move)?;
        self.next_move += 1;
        match self.tree.variation(current, &mv) {
            Ok(Some(child)) => {
                self.current = Some(child);
                Some(Ok(child))
            }
            Ok(None) => {
                self.done = true;
                Some(Err(TreeError::Diverged {
                    parent: current,
                    mv,
                }))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
