use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{ensure, Context};
use engine::{Board, BoardListener, Color, GameState, PieceKind, Square};
use log::debug;

use crate::events::{Command, CommandHandler, LoggingListener, Reply, HELP};

/// Game state plus the rules, history and annotations behind it. Every
/// command goes through here.
pub struct Game {
    board: Board,
}

impl Game {
    pub fn new() -> Self {
        Self::with_board(Board::new())
    }

    pub fn from_fen(fen: &str) -> anyhow::Result<Self> {
        Ok(Self::with_board(Board::from_state(playable_state(fen)?)))
    }

    fn with_board(board: Board) -> Self {
        let listener: Arc<dyn BoardListener> = Arc::new(LoggingListener);
        board.add_listener(listener);
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// FEN plus the last move and anything notable about the position.
    pub fn status(&self) -> String {
        let board = &self.board;
        let mut out = board.state().to_fen();
        if let Some(description) = board.last_move_description() {
            let _ = write!(out, " after {description}");
        }
        if board.is_checkmate() {
            let _ = write!(out, " (checkmate, {} wins)", board.turn().opponent());
        } else if let Some(draw) = board.draw_type() {
            let _ = write!(out, " (draw by {draw})");
        } else if board.is_check() {
            out.push_str(" (check)");
        }
        out
    }

    /// The moves from the start to the current position, with glyphs and
    /// comments.
    pub fn line(&self) -> String {
        let history = self.board.history();
        let tree = history.tree();
        let mut parts = Vec::new();
        for id in history.current_line() {
            let node = &tree[id];
            let mut part = String::new();
            if let Some(description) = node.description() {
                part.push_str(description);
                for nag in node.nags() {
                    let _ = write!(part, "{nag}");
                }
            }
            if let Some(comment) = node.comment() {
                if !part.is_empty() {
                    part.push(' ');
                }
                let _ = write!(part, "{{{comment}}}");
            }
            if !part.is_empty() {
                parts.push(part);
            }
        }
        if parts.is_empty() {
            "start position".to_string()
        } else {
            parts.join(" ")
        }
    }

    fn legal_moves(&self, square: Square) -> String {
        let moves: Vec<String> = self
            .board
            .legal_moves_starting_on(square)
            .iter()
            .map(|mv| mv.long_algebraic())
            .collect();
        if moves.is_empty() {
            format!("no legal moves from {square}")
        } else {
            moves.join(" ")
        }
    }
}

/// Parses `fen`, refusing positions the rules cannot play from.
fn playable_state(fen: &str) -> anyhow::Result<GameState> {
    let state = GameState::from_fen(fen).with_context(|| format!("cannot start from '{fen}'"))?;
    for color in Color::ALL {
        let kings = state
            .position()
            .pieces()
            .filter(|(_, piece)| piece.color == color && piece.kind == PieceKind::King)
            .count();
        ensure!(kings == 1, "{color} needs exactly one king, found {kings}");
    }
    Ok(state)
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandHandler for Game {
    fn handle(&mut self, command: Command) -> anyhow::Result<Reply> {
        let text = match command {
            Command::Play(mv) => {
                self.board.play(mv)?;
                self.status()
            }
            Command::Undo => {
                self.board.undo();
                self.status()
            }
            Command::Redo => {
                self.board.redo();
                self.status()
            }
            Command::Reset => {
                self.board.reset();
                self.status()
            }
            Command::End => {
                self.board.to_end_of_main_line();
                self.status()
            }
            Command::Fen(None) => self.board.state().to_fen(),
            Command::Fen(Some(fen)) => {
                self.board.set_state(playable_state(&fen)?);
                self.status()
            }
            Command::Moves(square) => self.legal_moves(square),
            Command::Line => self.line(),
            Command::Promote => {
                self.board.history_mut().promote_variation();
                self.line()
            }
            Command::Demote => {
                self.board.history_mut().demote_variation();
                self.line()
            }
            Command::Delete => {
                self.board.history_mut().delete_current();
                self.status()
            }
            Command::Clear => {
                self.board.history_mut().clear_variations();
                self.status()
            }
            Command::Comment(text) => {
                self.board.history_mut().set_comment(&text);
                self.line()
            }
            Command::Nag(nag) => {
                self.board.history_mut().toggle_nag(nag);
                self.line()
            }
            Command::Draw => {
                self.board.offer_draw();
                format!("{} offers a draw", self.board.turn())
            }
            Command::Resign => {
                self.board.resign();
                format!("{} resigns", self.board.turn())
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        debug!("reply: {text}");
        Ok(Reply::Text(text))
    }
}
