use crate::error::IllegalMove;
use crate::history::MoveHistory;
use crate::position::Position;
use crate::state::GameState;
use crate::types::{
    king_home, CastleSide, DrawType, File, Move, Piece, PieceKind, Promotion, Square,
};

/// A rule-set: decides legality and applies moves. Everything beyond those
/// two primitives is derived from them by generate-and-filter.
pub trait Rules {
    /// Fails with the reason `mv` cannot be played from `state`.
    fn check_legal(&self, mv: &Move, state: &GameState) -> Result<(), IllegalMove>;

    /// Plays `mv` on `position` without checking legality. Turn, castling
    /// rights and counters are the caller's business.
    fn apply(&self, mv: &Move, position: &Position) -> Position;

    fn is_legal(&self, mv: &Move, state: &GameState) -> bool {
        self.check_legal(mv, state).is_ok()
    }

    fn legal_moves_starting_on(&self, square: Square, state: &GameState) -> Vec<Move> {
        Square::all()
            .flat_map(|to| candidate_moves(square, to, state.position()))
            .filter(|mv| self.is_legal(mv, state))
            .collect()
    }

    fn legal_moves_ending_on(&self, square: Square, state: &GameState) -> Vec<Move> {
        movers(state)
            .flat_map(|from| candidate_moves(from, square, state.position()))
            .filter(|mv| self.is_legal(mv, state))
            .collect()
    }

    fn any_legal_move_starting_on(&self, square: Square, state: &GameState) -> Option<Move> {
        let piece = state.position().get(square)?;
        if piece.color != state.turn() {
            return None;
        }
        Square::all()
            .flat_map(|to| candidate_moves(square, to, state.position()))
            .find(|mv| self.is_legal(mv, state))
    }

    fn any_legal_move_ending_on(&self, square: Square, state: &GameState) -> Option<Move> {
        movers(state)
            .flat_map(|from| candidate_moves(from, square, state.position()))
            .find(|mv| self.is_legal(mv, state))
    }

    fn any_legal_move(&self, state: &GameState) -> Option<Move> {
        movers(state).find_map(|from| self.any_legal_move_starting_on(from, state))
    }

    fn can_any_legal_move_start_on(&self, square: Square, state: &GameState) -> bool {
        self.any_legal_move_starting_on(square, state).is_some()
    }

    fn can_any_legal_move_end_on(&self, square: Square, state: &GameState) -> bool {
        self.any_legal_move_ending_on(square, state).is_some()
    }

    fn is_checkmate(&self, state: &GameState) -> bool {
        self.any_legal_move(state).is_none() && state.is_check()
    }

    fn is_stalemate(&self, state: &GameState) -> bool {
        self.any_legal_move(state).is_none() && !state.is_check()
    }

    /// Draw classification of the history's current snapshot. The fifty-move
    /// rule wins over stalemate, which wins over repetition.
    fn draw_type(&self, history: &MoveHistory) -> Option<DrawType> {
        let state = history.current_state();
        if state.halfmove_clock() >= 100 {
            return Some(DrawType::FiftyMove);
        }
        if self.is_stalemate(state) {
            return Some(DrawType::Stalemate);
        }
        if history.is_threefold_repetition() {
            return Some(DrawType::ThreefoldRepetition);
        }
        None
    }
}

fn movers(state: &GameState) -> impl Iterator<Item = Square> + '_ {
    let turn = state.turn();
    state
        .position()
        .pieces()
        .filter(move |(_, piece)| piece.color == turn)
        .map(|(square, _)| square)
}

/// Moves worth testing between two squares: one plain move, or all four
/// promotions for a pawn reaching the back rank.
pub fn candidate_moves(from: Square, to: Square, position: &Position) -> Vec<Move> {
    let is_pawn = position
        .get(from)
        .is_some_and(|piece| piece.kind == PieceKind::Pawn);
    if is_pawn && to.is_back_rank() {
        Promotion::ALL
            .into_iter()
            .map(|promo| Move::with_promotion(from, to, promo))
            .collect()
    } else {
        vec![Move::new(from, to)]
    }
}

/// Standard chess.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ChessRules;

impl Rules for ChessRules {
    fn check_legal(&self, mv: &Move, state: &GameState) -> Result<(), IllegalMove> {
        let position = state.position();
        let turn = state.turn();
        let piece = position
            .get(mv.from)
            .ok_or_else(|| IllegalMove::new(*mv, format!("there is no piece on {}", mv.from)))?;
        if piece.color != turn {
            return Err(IllegalMove::new(*mv, format!("it is {turn}'s turn to move")));
        }
        if mv.from == mv.to {
            return Err(IllegalMove::not_legal(*mv));
        }
        if position.get(mv.to).is_some_and(|target| target.color == turn) {
            return Err(IllegalMove::not_legal(*mv));
        }

        match piece.kind {
            PieceKind::Queen => self.check_queen(mv, position)?,
            PieceKind::Rook => self.check_rook(mv, position)?,
            PieceKind::Bishop => self.check_bishop(mv, position)?,
            PieceKind::Knight => self.check_knight(mv)?,
            PieceKind::Pawn => self.check_pawn(mv, state)?,
            PieceKind::King => self.check_king(mv, state)?,
        }

        if mv.promotion.is_some() && !(piece.kind == PieceKind::Pawn && mv.to.is_back_rank()) {
            return Err(IllegalMove::new(*mv, "only a pawn reaching the back rank can promote"));
        }

        if self.apply(mv, position).is_in_check(turn) {
            return Err(IllegalMove::new(
                *mv,
                format!("the king would be in check on {}", mv.to),
            ));
        }
        Ok(())
    }

    fn apply(&self, mv: &Move, position: &Position) -> Position {
        let Some(piece) = position.get(mv.from) else {
            return *position;
        };
        let mut next = position.remove(mv.from).put(mv.to, piece);

        match piece.kind {
            PieceKind::Pawn => {
                // en passant: a sideways step onto an empty square
                if position.is_empty(mv.to) && mv.from.file() != mv.to.file() {
                    next = next.remove(Square::new(mv.to.file(), mv.from.rank()));
                }
                if let (true, Some(promo)) = (mv.to.is_back_rank(), mv.promotion) {
                    next = next.put(mv.to, Piece::new(piece.color, promo.kind()));
                }
            }
            PieceKind::King if mv.from.file() == File::E && mv.from.file_distance(mv.to) == 2 => {
                let (rook_file, rook_target) = match mv.to.file().side() {
                    CastleSide::KingSide => (File::H, File::F),
                    CastleSide::QueenSide => (File::A, File::D),
                };
                let rank = mv.from.rank();
                let rook_from = Square::new(rook_file, rank);
                next = next
                    .with(Square::new(rook_target, rank), position.get(rook_from))
                    .remove(rook_from);
            }
            _ => {}
        }
        next
    }
}

impl ChessRules {
    fn check_rook(&self, mv: &Move, position: &Position) -> Result<(), IllegalMove> {
        if mv.from.file_distance(mv.to) != 0 && mv.from.rank_distance(mv.to) != 0 {
            return Err(IllegalMove::not_legal(*mv));
        }
        if is_blocked(mv, position) {
            return Err(IllegalMove::new(*mv, "rooks cannot jump over pieces"));
        }
        Ok(())
    }

    fn check_bishop(&self, mv: &Move, position: &Position) -> Result<(), IllegalMove> {
        if mv.from.file_distance(mv.to) != mv.from.rank_distance(mv.to) {
            return Err(IllegalMove::not_legal(*mv));
        }
        if is_blocked(mv, position) {
            return Err(IllegalMove::new(*mv, "bishops cannot jump over pieces"));
        }
        Ok(())
    }

    fn check_queen(&self, mv: &Move, position: &Position) -> Result<(), IllegalMove> {
        let df = mv.from.file_distance(mv.to);
        let dr = mv.from.rank_distance(mv.to);
        if !(df == 0 || dr == 0 || df == dr) {
            return Err(IllegalMove::not_legal(*mv));
        }
        if is_blocked(mv, position) {
            return Err(IllegalMove::new(*mv, "queens cannot jump over pieces"));
        }
        Ok(())
    }

    fn check_knight(&self, mv: &Move) -> Result<(), IllegalMove> {
        match (mv.from.file_distance(mv.to), mv.from.rank_distance(mv.to)) {
            (1, 2) | (2, 1) => Ok(()),
            _ => Err(IllegalMove::not_legal(*mv)),
        }
    }

    fn check_pawn(&self, mv: &Move, state: &GameState) -> Result<(), IllegalMove> {
        let position = state.position();
        let color = state.turn();
        let sideways = mv.from.file_distance(mv.to);
        let forward = (mv.to.rank().index() as i8 - mv.from.rank().index() as i8) * color.direction();

        if sideways > 1 || forward <= 0 || forward > 2 {
            return Err(IllegalMove::not_legal(*mv));
        }
        if forward == 2 {
            let in_front = mv.from.offset(0, color.direction());
            let blocked = in_front.is_some_and(|sq| !position.is_empty(sq));
            if sideways != 0 || mv.from.rank() != color.pawn_rank() || blocked {
                return Err(IllegalMove::not_legal(*mv));
            }
        }

        let target = position.get(mv.to);
        if target.is_some() && sideways == 0 {
            return Err(IllegalMove::new(*mv, "pawns can only capture diagonally"));
        }
        if sideways == 1 && target.is_none() && state.en_passant() != Some(mv.to) {
            return Err(IllegalMove::not_legal(*mv));
        }
        if mv.to.is_back_rank() && mv.promotion.is_none() {
            return Err(IllegalMove::new(
                *mv,
                "no promotion piece was specified for this move",
            ));
        }
        Ok(())
    }

    fn check_king(&self, mv: &Move, state: &GameState) -> Result<(), IllegalMove> {
        let df = mv.from.file_distance(mv.to);
        let dr = mv.from.rank_distance(mv.to);
        if df <= 1 && dr <= 1 {
            return Ok(());
        }

        let color = state.turn();
        if !(df == 2 && dr == 0 && mv.from == king_home(color)) {
            return Err(IllegalMove::not_legal(*mv));
        }

        let position = state.position();
        let side = mv.to.file().side();
        if state.is_check() {
            return Err(IllegalMove::new(*mv, "castling out of check is illegal"));
        }
        let rook_home = side.rook_home(color);
        if !state.can_castle(color, side)
            || position.get(rook_home) != Some(Piece::new(color, PieceKind::Rook))
        {
            return Err(IllegalMove::new(*mv, "castling is illegal in this position"));
        }
        if mv
            .from
            .squares_between(rook_home)
            .into_iter()
            .any(|sq| !position.is_empty(sq))
        {
            return Err(IllegalMove::new(
                *mv,
                "castling is illegal with a piece between the king and rook",
            ));
        }
        let king = Piece::new(color, PieceKind::King);
        let passing = position.remove(mv.from).put(side.rook_target(color), king);
        if passing.is_in_check(color) {
            return Err(IllegalMove::new(*mv, "castling through check is illegal"));
        }
        Ok(())
    }
}

fn is_blocked(mv: &Move, position: &Position) -> bool {
    mv.from
        .squares_between(mv.to)
        .into_iter()
        .any(|sq| !position.is_empty(sq))
}
