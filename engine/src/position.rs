use std::fmt;

use crate::error::FenError;
use crate::types::{Color, File, Piece, PieceKind, Rank, Square};

/// Immutable square to piece map. Every edit returns a new value.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Position {
    squares: [Option<Piece>; 64],
}

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

impl Position {
    pub const fn empty() -> Self {
        Self {
            squares: [None; 64],
        }
    }

    pub fn starting() -> Self {
        let mut position = Self::empty();
        for (file, kind) in File::ALL.into_iter().zip(BACK_RANK) {
            for color in Color::ALL {
                let back = Square::new(file, color.back_rank());
                let pawn = Square::new(file, color.pawn_rank());
                position.squares[back.index()] = Some(Piece::new(color, kind));
                position.squares[pawn.index()] = Some(Piece::new(color, PieceKind::Pawn));
            }
        }
        position
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares[square.index()]
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square).is_none()
    }

    #[must_use]
    pub fn put(&self, square: Square, piece: Piece) -> Position {
        self.with(square, Some(piece))
    }

    #[must_use]
    pub fn remove(&self, square: Square) -> Position {
        self.with(square, None)
    }

    #[must_use]
    pub fn with(&self, square: Square, piece: Option<Piece>) -> Position {
        let mut copy = *self;
        copy.squares[square.index()] = piece;
        copy
    }

    /// Occupied squares in index order, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(|square| self.get(square).map(|piece| (square, piece)))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        self.pieces()
            .find(|(_, piece)| *piece == king)
            .map(|(square, _)| square)
    }

    /// Whether `color`'s king is attacked.
    ///
    /// Panics when `color` has no king; positions without one cannot be
    /// reached through legal play and are a caller error.
    pub fn is_in_check(&self, color: Color) -> bool {
        let king = self
            .king_square(color)
            .unwrap_or_else(|| panic!("position has no {color} king: {}", self.placement()));
        self.is_attacked(king, color.opponent())
    }

    /// Whether any piece of color `by` attacks `square`.
    pub fn is_attacked(&self, square: Square, by: Color) -> bool {
        let holds = |sq: Option<Square>, kind: PieceKind| {
            sq.and_then(|sq| self.get(sq)) == Some(Piece::new(by, kind))
        };

        // an attacking pawn sits one rank behind the target from its own side
        let back = -by.direction();
        if holds(square.offset(-1, back), PieceKind::Pawn)
            || holds(square.offset(1, back), PieceKind::Pawn)
        {
            return true;
        }

        if KNIGHT_DELTAS
            .iter()
            .any(|&(df, dr)| holds(square.offset(df, dr), PieceKind::Knight))
        {
            return true;
        }

        if DIAGONAL_DELTAS
            .iter()
            .any(|&(df, dr)| self.scan_ray(square, df, dr, by, PieceKind::Bishop))
        {
            return true;
        }
        if ORTHO_DELTAS
            .iter()
            .any(|&(df, dr)| self.scan_ray(square, df, dr, by, PieceKind::Rook))
        {
            return true;
        }

        DIAGONAL_DELTAS
            .iter()
            .chain(ORTHO_DELTAS.iter())
            .any(|&(df, dr)| holds(square.offset(df, dr), PieceKind::King))
    }

    fn scan_ray(&self, start: Square, df: i8, dr: i8, color: Color, major: PieceKind) -> bool {
        let mut current = start.offset(df, dr);
        while let Some(sq) = current {
            if let Some(piece) = self.get(sq) {
                return piece.color == color
                    && (piece.kind == PieceKind::Queen || piece.kind == major);
            }
            current = sq.offset(df, dr);
        }
        false
    }

    /// First field of a FEN record.
    pub fn placement(&self) -> String {
        let mut rows = Vec::with_capacity(8);
        for rank in Rank::ALL.into_iter().rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in File::ALL {
                if let Some(piece) = self.get(Square::new(file, rank)) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.fen_char());
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }
        rows.join("/")
    }

    pub fn from_placement(text: &str) -> Result<Position, FenError> {
        let mut position = Position::empty();
        let mut rank = 7i8;
        let mut file = 0i8;
        for ch in text.chars() {
            match ch {
                '/' => {
                    if rank == 0 {
                        return Err(FenError::Placement("too many ranks".into()));
                    }
                    if file != 8 {
                        return Err(FenError::Placement(format!(
                            "rank {} does not contain 8 squares",
                            rank + 1
                        )));
                    }
                    rank -= 1;
                    file = 0;
                }
                '1'..='8' => {
                    file += (ch as u8 - b'0') as i8;
                    if file > 8 {
                        return Err(FenError::Placement(format!(
                            "too many squares in rank {}",
                            rank + 1
                        )));
                    }
                }
                _ => {
                    let piece = Piece::from_fen_char(ch).ok_or_else(|| {
                        FenError::Placement(format!("invalid piece char '{ch}'"))
                    })?;
                    let square = File::from_index(file)
                        .zip(Rank::from_index(rank))
                        .map(|(f, r)| Square::new(f, r))
                        .ok_or_else(|| FenError::Placement("square out of range".into()))?;
                    position.squares[square.index()] = Some(piece);
                    file += 1;
                }
            }
        }
        if rank != 0 || file != 8 {
            return Err(FenError::Placement("board must contain 8 full ranks".into()));
        }
        Ok(position)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            for file in File::ALL {
                let ch = self
                    .get(Square::new(file, rank))
                    .map_or('.', Piece::fen_char);
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({})", self.placement())
    }
}

pub(crate) const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

pub(crate) const DIAGONAL_DELTAS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub(crate) const ORTHO_DELTAS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
