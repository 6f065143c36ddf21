use thiserror::Error;

use crate::tree::NodeId;
use crate::types::Move;

/// A move the rules refuse, with the reason it was refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{mv}: {reason}")]
pub struct IllegalMove {
    pub mv: Move,
    pub reason: String,
}

impl IllegalMove {
    pub fn new(mv: Move, reason: impl Into<String>) -> Self {
        Self {
            mv,
            reason: reason.into(),
        }
    }

    /// Generic refusal for moves a piece simply cannot make.
    pub(crate) fn not_legal(mv: Move) -> Self {
        Self::new(mv, "not a legal move")
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("invalid piece placement: {0}")]
    Placement(String),
    #[error("invalid side to move '{0}'")]
    Turn(String),
    #[error("invalid castling rights '{0}'")]
    Castling(String),
    #[error("invalid en passant square '{0}'")]
    EnPassant(String),
    #[error("invalid move counter '{0}'")]
    Counter(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0} belongs to a different tree")]
    ForeignNode(NodeId),
    #[error("node {0} is no longer part of the tree")]
    Detached(NodeId),
    #[error("could not find {mv} variation under node {parent}")]
    Diverged { parent: NodeId, mv: Move },
    #[error("node {ancestor} is not an ancestor of node {node}")]
    NotAncestor { ancestor: NodeId, node: NodeId },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid square '{0}'")]
    Square(String),
    #[error("invalid move '{0}'")]
    Move(String),
    #[error("invalid promotion piece '{0}'")]
    Promotion(char),
    #[error("unknown annotation '{0}'")]
    Nag(String),
}
