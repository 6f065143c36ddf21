use std::fmt;
use std::fmt::Write as _;
use std::sync::Arc;

use log::{debug, info};

use crate::error::{FenError, IllegalMove};
use crate::history::{HistoryListener, MoveHistory};
use crate::listeners::Listeners;
use crate::position::Position;
use crate::rules::{ChessRules, Rules};
use crate::state::GameState;
use crate::tree::{NodeId, PositionTree};
use crate::types::{CastleSide, Color, DrawType, Move, Piece, PieceKind, Promotion, Rank, Square};

/// Observer of game results. Also receives every history notification of
/// the board it is registered on.
pub trait BoardListener: HistoryListener {
    /// `loser` is the side that was mated.
    fn checkmate(&self, _board: &Board, _loser: Color) {}

    fn drawn(&self, _board: &Board, _draw: DrawType) {}

    fn draw_offered(&self, _board: &Board) {}

    fn resigned(&self, _board: &Board, _side: Color) {}
}

/// A game in progress: a move history checked by a swappable rule-set.
pub struct Board {
    history: MoveHistory,
    rules: Box<dyn Rules>,
    listeners: Listeners<dyn BoardListener>,
}

impl Board {
    pub fn new() -> Self {
        Self::from_state(GameState::starting())
    }

    pub fn from_state(state: GameState) -> Self {
        Self {
            history: MoveHistory::new(state),
            rules: Box::new(ChessRules),
            listeners: Listeners::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self::from_state(GameState::from_fen(fen)?))
    }

    pub fn from_position(position: Position, turn: Color) -> Self {
        Self::from_state(GameState::new(position, turn))
    }

    pub fn set_rules(&mut self, rules: Box<dyn Rules>) -> &mut Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &dyn Rules {
        self.rules.as_ref()
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut MoveHistory {
        &mut self.history
    }

    pub fn add_listener(&self, listener: Arc<dyn BoardListener>) {
        self.history.add_listener(listener.clone());
        self.listeners.add(listener);
    }

    pub fn remove_listener(&self, listener: &Arc<dyn BoardListener>) -> bool {
        let as_history: Arc<dyn HistoryListener> = listener.clone();
        self.history.remove_listener(&as_history);
        self.listeners.remove(listener)
    }

    /// Plays `mv` from the current node. On success the history holds the
    /// resulting snapshot and listeners have heard about any mate or draw.
    pub fn play(&mut self, mv: Move) -> Result<&mut Self, IllegalMove> {
        let state = *self.state();
        if let Err(err) = self.rules.check_legal(&mv, &state) {
            debug!("rejected {err}");
            return Err(err);
        }

        let next = self.next_state(&mv, &state);
        let mut description = self.describe(&mv, &state);
        let mate = self.rules.is_checkmate(&next);
        if mate {
            description.push('#');
        } else if next.is_check() {
            description.push('+');
        }
        debug!("played {description} -> {next}");
        self.history.add_move(mv, next, description);

        if mate {
            let loser = next.turn();
            info!("checkmate, {loser} is mated");
            let this = &*self;
            this.listeners.notify(|l| l.checkmate(this, loser));
        } else if let Some(draw) = self.rules.draw_type(&self.history) {
            info!("game drawn by {draw}");
            let this = &*self;
            this.listeners.notify(|l| l.drawn(this, draw));
        }
        Ok(self)
    }

    pub fn play_squares(&mut self, from: Square, to: Square) -> Result<&mut Self, IllegalMove> {
        self.play(Move::new(from, to))
    }

    pub fn play_promotion(
        &mut self,
        from: Square,
        to: Square,
        promotion: Promotion,
    ) -> Result<&mut Self, IllegalMove> {
        self.play(Move::with_promotion(from, to, promotion))
    }

    fn next_state(&self, mv: &Move, state: &GameState) -> GameState {
        let position = state.position();
        let turn = state.turn();
        let is_pawn = position
            .get(mv.from)
            .is_some_and(|piece| piece.kind == PieceKind::Pawn);
        let capture = !position.is_empty(mv.to);

        let halfmove_clock = if is_pawn || capture {
            0
        } else {
            state.halfmove_clock().saturating_add(1)
        };
        let en_passant = if is_pawn && mv.from.rank_distance(mv.to) == 2 {
            mv.from.offset(0, turn.direction())
        } else {
            None
        };
        let fullmove_number = match turn {
            Color::White => state.fullmove_number(),
            Color::Black => state.fullmove_number().saturating_add(1),
        };

        state
            .with_position(self.rules.apply(mv, position))
            .with_castling(state.castling().without_square(mv.from))
            .with_turn(turn.opponent())
            .with_en_passant(en_passant)
            .with_halfmove_clock(halfmove_clock)
            .with_fullmove_number(fullmove_number)
    }

    /// Short algebraic text for `mv` played from `state`, without the check
    /// suffix.
    fn describe(&self, mv: &Move, state: &GameState) -> String {
        let mut out = String::new();
        let turn = state.turn();
        if turn == Color::White {
            let _ = write!(out, "{}.", state.fullmove_number());
        }
        let position = state.position();
        let Some(piece) = position.get(mv.from) else {
            return out;
        };

        let sideways = mv.from.file_distance(mv.to);
        if piece.kind == PieceKind::King && sideways > 1 {
            out.push_str(mv.to.file().side().notation());
            return out;
        }

        out.push_str(piece.kind.letter());
        let rivals = self.rival_squares(mv, piece, state);
        if !rivals.is_empty() {
            let same_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
            let same_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());
            if !same_file {
                out.push(mv.from.file().to_char());
            } else if !same_rank {
                let _ = write!(out, "{}", mv.from.rank());
            } else {
                let _ = write!(out, "{}", mv.from);
            }
        }

        let capture = !position.is_empty(mv.to);
        let en_passant = !capture && piece.kind == PieceKind::Pawn && sideways > 0;
        if capture || en_passant {
            if piece.kind == PieceKind::Pawn {
                out.push(mv.from.file().to_char());
            }
            out.push('x');
        }
        let _ = write!(out, "{}", mv.to);

        let promotes = piece.kind == PieceKind::Pawn && mv.to.rank().from_perspective(turn) == Rank::Eighth;
        match mv.promotion {
            Some(promo) if promotes => {
                let _ = write!(out, "={promo}");
            }
            _ if en_passant => out.push_str(" ep."),
            _ => {}
        }
        out
    }

    /// Other squares holding the same kind of piece that could also move to
    /// `mv.to`.
    fn rival_squares(&self, mv: &Move, piece: Piece, state: &GameState) -> Vec<Square> {
        if piece.kind == PieceKind::Pawn {
            return Vec::new();
        }
        let mut rivals: Vec<Square> = self
            .rules
            .legal_moves_ending_on(mv.to, state)
            .into_iter()
            .filter(|other| other.from != mv.from && state.position().get(other.from) == Some(piece))
            .map(|other| other.from)
            .collect();
        rivals.dedup();
        rivals
    }

    pub fn state(&self) -> &GameState {
        self.history.current_state()
    }

    pub fn position(&self) -> &Position {
        self.state().position()
    }

    pub fn turn(&self) -> Color {
        self.state().turn()
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.position().get(square)
    }

    pub fn is_check(&self) -> bool {
        self.state().is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.rules.is_checkmate(self.state())
    }

    pub fn draw_type(&self) -> Option<DrawType> {
        self.rules.draw_type(&self.history)
    }

    pub fn is_legal(&self, mv: &Move) -> bool {
        self.rules.is_legal(mv, self.state())
    }

    pub fn check_legal(&self, mv: &Move) -> Result<(), IllegalMove> {
        self.rules.check_legal(mv, self.state())
    }

    pub fn legal_moves_starting_on(&self, square: Square) -> Vec<Move> {
        self.rules.legal_moves_starting_on(square, self.state())
    }

    pub fn legal_moves_ending_on(&self, square: Square) -> Vec<Move> {
        self.rules.legal_moves_ending_on(square, self.state())
    }

    pub fn can_any_legal_move_start_on(&self, square: Square) -> bool {
        self.rules.can_any_legal_move_start_on(square, self.state())
    }

    pub fn can_any_legal_move_end_on(&self, square: Square) -> bool {
        self.rules.can_any_legal_move_end_on(square, self.state())
    }

    /// Whether the side to move still holds the right to castle on `side`.
    pub fn can_castle(&self, side: CastleSide) -> bool {
        self.state().can_castle(self.turn(), side)
    }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.state().en_passant()
    }

    pub fn half_moves_since_pawn_move_or_capture(&self) -> u32 {
        self.state().halfmove_clock()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.history.last_move()
    }

    pub fn last_move_description(&self) -> Option<&str> {
        self.history.current_node().description()
    }

    pub fn next_main_line_move(&self) -> Option<Move> {
        let next = self.history.current_node().main_line_child()?;
        self.history.tree()[next].last_move()
    }

    /// Description of the main-line continuation, numbered `12...` when it
    /// is Black's move.
    pub fn next_main_line_move_description(&self) -> Option<String> {
        let next = self.history.current_node().main_line_child()?;
        let description = self.history.tree()[next].description()?;
        Some(match self.turn() {
            Color::White => description.to_string(),
            Color::Black => format!("{}...{description}", self.state().fullmove_number()),
        })
    }

    pub fn find_node(&self, state: &GameState) -> Option<NodeId> {
        self.history.find_state(state)
    }

    pub fn undo(&mut self) {
        self.history.undo();
    }

    pub fn redo(&mut self) {
        self.history.redo();
    }

    pub fn reset(&mut self) {
        self.history.reset();
    }

    pub fn to_end_of_main_line(&mut self) {
        self.history.to_end_of_main_line();
    }

    /// Starts a fresh history from `state`, keeping listeners.
    pub fn set_state(&mut self, state: GameState) {
        self.history.start_over(PositionTree::new(state));
    }

    pub fn set_fen(&mut self, fen: &str) -> Result<(), FenError> {
        self.set_state(GameState::from_fen(fen)?);
        Ok(())
    }

    /// Throws away every move while keeping the starting snapshot.
    pub fn clear_all(&mut self) {
        if !self.history.tree()[self.history.tree().root()]
            .variations()
            .is_empty()
        {
            self.set_state(*self.history.initial_state());
        }
    }

    pub fn offer_draw(&self) {
        self.listeners.notify(|l| l.draw_offered(self));
    }

    /// The side to move resigns.
    pub fn resign(&self) {
        let side = self.turn();
        info!("{side} resigns");
        self.listeners.notify(|l| l.resigned(self, side));
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state())?;
        if let Some(mv) = self.last_move() {
            write!(f, " {mv}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("history", &self.history)
            .field("listeners", &self.listeners)
            .finish()
    }
}
