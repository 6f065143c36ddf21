use std::fmt;
use std::str::FromStr;

use crate::error::FenError;
use crate::position::Position;
use crate::types::{king_home, CastleSide, Color, Piece, PieceKind, Square};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_king_side: true,
        white_queen_side: true,
        black_king_side: true,
        black_queen_side: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_king_side: false,
        white_queen_side: false,
        black_king_side: false,
        black_queen_side: false,
    };

    pub fn get(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_king_side,
            (Color::White, CastleSide::QueenSide) => self.white_queen_side,
            (Color::Black, CastleSide::KingSide) => self.black_king_side,
            (Color::Black, CastleSide::QueenSide) => self.black_queen_side,
        }
    }

    #[must_use]
    pub fn set(mut self, color: Color, side: CastleSide, allowed: bool) -> Self {
        let flag = match (color, side) {
            (Color::White, CastleSide::KingSide) => &mut self.white_king_side,
            (Color::White, CastleSide::QueenSide) => &mut self.white_queen_side,
            (Color::Black, CastleSide::KingSide) => &mut self.black_king_side,
            (Color::Black, CastleSide::QueenSide) => &mut self.black_queen_side,
        };
        *flag = allowed;
        self
    }

    /// Drops every right whose king or rook starts on `square`.
    #[must_use]
    pub fn without_square(mut self, square: Square) -> Self {
        for color in Color::ALL {
            for side in CastleSide::ALL {
                if square == king_home(color) || square == side.rook_home(color) {
                    self = self.set(color, side, false);
                }
            }
        }
        self
    }

    /// Keeps a right only while its king and rook stand on their home squares.
    #[must_use]
    pub fn validated(mut self, position: &Position) -> Self {
        for color in Color::ALL {
            let king_home_ok =
                position.get(king_home(color)) == Some(Piece::new(color, PieceKind::King));
            for side in CastleSide::ALL {
                let rook_home_ok = position.get(side.rook_home(color))
                    == Some(Piece::new(color, PieceKind::Rook));
                if !(king_home_ok && rook_home_ok) {
                    self = self.set(color, side, false);
                }
            }
        }
        self
    }

    pub fn any(&self) -> bool {
        *self != CastlingRights::NONE
    }

    fn fen_field(&self) -> String {
        let mut rights = String::new();
        for (flag, ch) in [
            (self.white_king_side, 'K'),
            (self.white_queen_side, 'Q'),
            (self.black_king_side, 'k'),
            (self.black_queen_side, 'q'),
        ] {
            if flag {
                rights.push(ch);
            }
        }
        if rights.is_empty() {
            rights.push('-');
        }
        rights
    }
}

/// Everything needed to continue a game from one moment: the position plus
/// side to move, castling rights, en-passant target and move counters.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct GameState {
    position: Position,
    turn: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl GameState {
    /// A fresh snapshot of `position` with every castling right the pieces
    /// still allow, no en-passant target and counters at `0 1`.
    pub fn new(position: Position, turn: Color) -> Self {
        Self {
            position,
            turn,
            castling: CastlingRights::ALL.validated(&position),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn starting() -> Self {
        Self::new(Position::starting(), Color::White)
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.turn
    }

    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    pub fn can_castle(&self, color: Color, side: CastleSide) -> bool {
        self.castling.get(color, side)
    }

    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn is_check(&self) -> bool {
        self.position.is_in_check(self.turn)
    }

    #[must_use]
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self.castling = self.castling.validated(&position);
        self
    }

    #[must_use]
    pub fn with_turn(mut self, turn: Color) -> Self {
        self.turn = turn;
        self
    }

    #[must_use]
    pub fn with_castling(mut self, castling: CastlingRights) -> Self {
        self.castling = castling.validated(&self.position);
        self
    }

    #[must_use]
    pub fn with_en_passant(mut self, square: Option<Square>) -> Self {
        self.en_passant = square;
        self
    }

    #[must_use]
    pub fn with_halfmove_clock(mut self, clock: u32) -> Self {
        self.halfmove_clock = clock;
        self
    }

    #[must_use]
    pub fn with_fullmove_number(mut self, number: u32) -> Self {
        self.fullmove_number = number.max(1);
        self
    }

    /// Equality that ignores both move counters.
    pub fn same_position(&self, other: &GameState) -> bool {
        self.position == other.position
            && self.turn == other.turn
            && self.castling == other.castling
            && self.en_passant == other.en_passant
    }

    /// Number of plies from this snapshot to `other`, judged by the counters.
    pub fn half_move_difference_to(&self, other: &GameState) -> i64 {
        other.ply() - self.ply()
    }

    fn ply(&self) -> i64 {
        let base = (self.fullmove_number as i64 - 1) * 2;
        match self.turn {
            Color::White => base,
            Color::Black => base + 1,
        }
    }

    /// Parses a FEN record, optionally wrapped as `[FEN "..."]`.
    pub fn from_fen(text: &str) -> Result<Self, FenError> {
        let text = unwrap_fen_tag(text.trim());
        let mut parts = text.split_whitespace();

        let placement = parts.next().ok_or(FenError::MissingField("placement"))?;
        let position = Position::from_placement(placement)?;

        let turn = match parts.next().ok_or(FenError::MissingField("side to move"))? {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::Turn(other.to_string())),
        };

        let castle_field = parts.next().ok_or(FenError::MissingField("castling"))?;
        let mut castling = CastlingRights::NONE;
        if castle_field != "-" {
            for ch in castle_field.chars() {
                castling = match ch {
                    'K' => castling.set(Color::White, CastleSide::KingSide, true),
                    'Q' => castling.set(Color::White, CastleSide::QueenSide, true),
                    'k' => castling.set(Color::Black, CastleSide::KingSide, true),
                    'q' => castling.set(Color::Black, CastleSide::QueenSide, true),
                    _ => return Err(FenError::Castling(castle_field.to_string())),
                };
            }
        }

        let en_passant = match parts.next().ok_or(FenError::MissingField("en passant"))? {
            "-" => None,
            field => Some(
                field
                    .parse::<Square>()
                    .map_err(|_| FenError::EnPassant(field.to_string()))?,
            ),
        };

        let halfmove_clock = parse_counter(parts.next(), 0)?;
        let fullmove_number = parse_counter(parts.next(), 1)?.max(1);

        Ok(Self {
            position,
            turn,
            castling: castling.validated(&position),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    pub fn to_fen(&self) -> String {
        let stm = match self.turn {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let enp = self
            .en_passant
            .map(|sq| sq.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {stm} {} {enp} {} {}",
            self.position.placement(),
            self.castling.fen_field(),
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn unwrap_fen_tag(text: &str) -> &str {
    text.strip_prefix("[FEN")
        .and_then(|rest| rest.trim_end().strip_suffix(']'))
        .map(|rest| rest.trim().trim_matches('"'))
        .unwrap_or(text)
}

fn parse_counter(field: Option<&str>, default: u32) -> Result<u32, FenError> {
    match field {
        None | Some("-") => Ok(default),
        Some(text) => text
            .parse::<u32>()
            .map_err(|_| FenError::Counter(text.to_string())),
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::starting()
    }
}

impl FromStr for GameState {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_state_matches_start_fen() {
        assert_eq!(GameState::starting().to_fen(), START_FEN);
        assert_eq!(GameState::from_fen(START_FEN).unwrap(), GameState::starting());
    }

    #[test]
    fn castling_letters_need_pieces_at_home() {
        let state = GameState::from_fen("4k3/8/8/8/8/8/8/4K2R w KQkq - 0 1").unwrap();
        assert!(state.can_castle(Color::White, CastleSide::KingSide));
        assert!(!state.can_castle(Color::White, CastleSide::QueenSide));
        assert!(!state.can_castle(Color::Black, CastleSide::KingSide));
        assert_eq!(state.to_fen(), "4k3/8/8/8/8/8/8/4K2R w K - 0 1");
    }

    #[test]
    fn counters_default_when_missing() {
        let state = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 b - -").unwrap();
        assert_eq!(state.halfmove_clock(), 0);
        assert_eq!(state.fullmove_number(), 1);
        let dashed = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 b - - - -").unwrap();
        assert_eq!(dashed, state);
        let zero = GameState::from_fen("4k3/8/8/8/8/8/8/4K3 b - - 3 0").unwrap();
        assert_eq!(zero.fullmove_number(), 1);
    }

    #[test]
    fn accepts_fen_tag_wrapper() {
        let state = GameState::from_fen(&format!("[FEN \"{START_FEN}\"]")).unwrap();
        assert_eq!(state, GameState::starting());
    }

    #[test]
    fn half_move_difference() {
        let start = GameState::starting();
        let later = GameState::from_fen(
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
        )
        .unwrap();
        assert_eq!(start.half_move_difference_to(&later), 2);
        assert_eq!(later.half_move_difference_to(&start), -2);
    }
}
