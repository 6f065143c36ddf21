mod board;
mod error;
mod history;
mod listeners;
mod nag;
mod path;
mod position;
mod rules;
mod state;
mod tree;
mod types;

pub use crate::board::{Board, BoardListener};
pub use crate::error::{FenError, IllegalMove, ParseError, TreeError};
pub use crate::history::{HistoryListener, MoveHistory, OpeningClassifier};
pub use crate::listeners::Listeners;
pub use crate::nag::Nag;
pub use crate::path::{Path, Walk};
pub use crate::position::Position;
pub use crate::rules::{candidate_moves, ChessRules, Rules};
pub use crate::state::{CastlingRights, GameState, START_FEN};
pub use crate::tree::{Node, NodeId, PositionTree, TreeId};
pub use crate::types::{
    CastleSide, Color, DrawType, File, Move, Piece, PieceKind, Promotion, Rank, Square,
};
