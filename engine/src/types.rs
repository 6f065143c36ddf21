use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::position::Position;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::White, Color::Black];

    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Rank step a pawn of this color advances by.
    pub fn direction(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    pub fn back_rank(self) -> Rank {
        match self {
            Color::White => Rank::First,
            Color::Black => Rank::Eighth,
        }
    }

    pub(crate) fn pawn_rank(self) -> Rank {
        match self {
            Color::White => Rank::Second,
            Color::Black => Rank::Seventh,
        }
    }

    pub(crate) fn from_char(ch: char) -> Option<Color> {
        match ch {
            'P' | 'N' | 'B' | 'R' | 'Q' | 'K' => Some(Color::White),
            'p' | 'n' | 'b' | 'r' | 'q' | 'k' => Some(Color::Black),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum File {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl File {
    pub const ALL: [File; 8] = [
        File::A,
        File::B,
        File::C,
        File::D,
        File::E,
        File::F,
        File::G,
        File::H,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn from_index(index: i8) -> Option<File> {
        if (0..8).contains(&index) {
            Some(File::ALL[index as usize])
        } else {
            None
        }
    }

    pub fn offset(self, delta: i8) -> Option<File> {
        File::from_index(self.index() as i8 + delta)
    }

    /// Which castling side a king landing on this file belongs to.
    pub fn side(self) -> CastleSide {
        if self >= File::E {
            CastleSide::KingSide
        } else {
            CastleSide::QueenSide
        }
    }

    pub fn to_char(self) -> char {
        (b'a' + self.index()) as char
    }

    pub fn from_char(ch: char) -> Option<File> {
        match ch.to_ascii_lowercase() {
            c @ 'a'..='h' => File::from_index((c as u8 - b'a') as i8),
            _ => None,
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Rank {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
    Eighth,
}

impl Rank {
    pub const ALL: [Rank; 8] = [
        Rank::First,
        Rank::Second,
        Rank::Third,
        Rank::Fourth,
        Rank::Fifth,
        Rank::Sixth,
        Rank::Seventh,
        Rank::Eighth,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Rank number as written on the board, 1 through 8.
    pub fn number(self) -> u8 {
        self.index() + 1
    }

    pub fn from_index(index: i8) -> Option<Rank> {
        if (0..8).contains(&index) {
            Some(Rank::ALL[index as usize])
        } else {
            None
        }
    }

    pub fn offset(self, delta: i8) -> Option<Rank> {
        Rank::from_index(self.index() as i8 + delta)
    }

    /// The same rank seen from `color`'s side of the board.
    pub fn from_perspective(self, color: Color) -> Rank {
        match color {
            Color::White => self,
            Color::Black => Rank::ALL[7 - self.index() as usize],
        }
    }

    pub fn from_char(ch: char) -> Option<Rank> {
        match ch {
            '1'..='8' => Rank::from_index((ch as u8 - b'1') as i8),
            _ => None,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// One of the 64 squares, indexed `rank * 8 + file` (a1 = 0, h8 = 63).
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

macro_rules! named_squares {
    ($($name:ident = $idx:expr),* $(,)?) => {
        impl Square {
            $(pub const $name: Square = Square($idx);)*
        }
    };
}

named_squares! {
    A1 = 0, B1 = 1, C1 = 2, D1 = 3, E1 = 4, F1 = 5, G1 = 6, H1 = 7,
    A2 = 8, B2 = 9, C2 = 10, D2 = 11, E2 = 12, F2 = 13, G2 = 14, H2 = 15,
    A3 = 16, B3 = 17, C3 = 18, D3 = 19, E3 = 20, F3 = 21, G3 = 22, H3 = 23,
    A4 = 24, B4 = 25, C4 = 26, D4 = 27, E4 = 28, F4 = 29, G4 = 30, H4 = 31,
    A5 = 32, B5 = 33, C5 = 34, D5 = 35, E5 = 36, F5 = 37, G5 = 38, H5 = 39,
    A6 = 40, B6 = 41, C6 = 42, D6 = 43, E6 = 44, F6 = 45, G6 = 46, H6 = 47,
    A7 = 48, B7 = 49, C7 = 50, D7 = 51, E7 = 52, F7 = 53, G7 = 54, H7 = 55,
    A8 = 56, B8 = 57, C8 = 58, D8 = 59, E8 = 60, F8 = 61, G8 = 62, H8 = 63,
}

impl Square {
    pub fn new(file: File, rank: Rank) -> Square {
        Square(rank.index() * 8 + file.index())
    }

    pub fn from_index(index: u8) -> Option<Square> {
        (index < 64).then_some(Square(index))
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..64).map(Square)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn file(self) -> File {
        File::ALL[(self.0 % 8) as usize]
    }

    pub fn rank(self) -> Rank {
        Rank::ALL[(self.0 / 8) as usize]
    }

    pub fn offset(self, df: i8, dr: i8) -> Option<Square> {
        Some(Square::new(self.file().offset(df)?, self.rank().offset(dr)?))
    }

    pub fn is_back_rank(self) -> bool {
        matches!(self.rank(), Rank::First | Rank::Eighth)
    }

    pub fn is_light(self) -> bool {
        (self.file().index() + self.rank().index()) % 2 == 1
    }

    pub(crate) fn file_distance(self, other: Square) -> u8 {
        self.file().index().abs_diff(other.file().index())
    }

    pub(crate) fn rank_distance(self, other: Square) -> u8 {
        self.rank().index().abs_diff(other.rank().index())
    }

    /// Squares strictly between two squares on a shared rank, file or
    /// diagonal; empty for any other pair.
    pub fn squares_between(self, other: Square) -> Vec<Square> {
        let df = other.file().index() as i8 - self.file().index() as i8;
        let dr = other.rank().index() as i8 - self.rank().index() as i8;
        if !(df == 0 || dr == 0 || df.abs() == dr.abs()) {
            return Vec::new();
        }
        let (step_f, step_r) = (df.signum(), dr.signum());
        let mut out = Vec::new();
        let mut current = self.offset(step_f, step_r);
        while let Some(square) = current {
            if square == other {
                break;
            }
            out.push(square);
            current = square.offset(step_f, step_r);
        }
        out
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl fmt::Debug for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl FromStr for Square {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(f), Some(r), None) => File::from_char(f).zip(Rank::from_char(r)),
            _ => None,
        };
        parsed
            .map(|(file, rank)| Square::new(file, rank))
            .ok_or_else(|| ParseError::Square(s.to_string()))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Letter used in move descriptions; pawns have none.
    pub fn letter(self) -> &'static str {
        match self {
            PieceKind::Pawn => "",
            PieceKind::Knight => "N",
            PieceKind::Bishop => "B",
            PieceKind::Rook => "R",
            PieceKind::Queen => "Q",
            PieceKind::King => "K",
        }
    }

    pub(crate) fn fen_symbol(self, color: Color) -> char {
        let sym = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match color {
            Color::White => sym.to_ascii_uppercase(),
            Color::Black => sym,
        }
    }

    pub(crate) fn from_fen_symbol(ch: char) -> Option<PieceKind> {
        match ch.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Piece {
        Piece { color, kind }
    }

    pub fn fen_char(self) -> char {
        self.kind.fen_symbol(self.color)
    }

    pub fn from_fen_char(ch: char) -> Option<Piece> {
        Some(Piece::new(Color::from_char(ch)?, PieceKind::from_fen_symbol(ch)?))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fen_char())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Promotion {
    Queen,
    Knight,
    Bishop,
    Rook,
}

impl Promotion {
    pub const ALL: [Promotion; 4] = [
        Promotion::Queen,
        Promotion::Knight,
        Promotion::Bishop,
        Promotion::Rook,
    ];

    pub fn kind(self) -> PieceKind {
        match self {
            Promotion::Queen => PieceKind::Queen,
            Promotion::Knight => PieceKind::Knight,
            Promotion::Bishop => PieceKind::Bishop,
            Promotion::Rook => PieceKind::Rook,
        }
    }

    pub fn from_char(ch: char) -> Option<Promotion> {
        match ch.to_ascii_uppercase() {
            'Q' => Some(Promotion::Queen),
            'N' => Some(Promotion::Knight),
            'B' => Some(Promotion::Bishop),
            'R' => Some(Promotion::Rook),
            _ => None,
        }
    }
}

impl fmt::Display for Promotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().letter())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const ALL: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];

    pub(crate) fn rook_home(self, color: Color) -> Square {
        let file = match self {
            CastleSide::KingSide => File::H,
            CastleSide::QueenSide => File::A,
        };
        Square::new(file, color.back_rank())
    }

    /// Square the rook lands on, which is also the one the king passes over.
    pub(crate) fn rook_target(self, color: Color) -> Square {
        let file = match self {
            CastleSide::KingSide => File::F,
            CastleSide::QueenSide => File::D,
        };
        Square::new(file, color.back_rank())
    }

    pub fn notation(self) -> &'static str {
        match self {
            CastleSide::KingSide => "O-O",
            CastleSide::QueenSide => "O-O-O",
        }
    }
}

pub(crate) fn king_home(color: Color) -> Square {
    Square::new(File::E, color.back_rank())
}

/// A start square, an end square and, for pawns reaching the back rank, the
/// piece promoted to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Promotion>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: Promotion) -> Move {
        Move {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Builds a move, promoting to a queen when a pawn reaches the back rank.
    pub fn build(from: Square, to: Square, position: &Position) -> Move {
        let is_pawn = position
            .get(from)
            .is_some_and(|piece| piece.kind == PieceKind::Pawn);
        if is_pawn && to.is_back_rank() {
            Move::with_promotion(from, to, Promotion::Queen)
        } else {
            Move::new(from, to)
        }
    }

    pub fn long_algebraic(&self) -> String {
        let mut out = format!("{}{}", self.from, self.to);
        if let Some(promo) = self.promotion {
            out.push_str(promo.kind().letter());
        }
        out
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)?;
        if let Some(promo) = self.promotion {
            write!(f, "={promo}")?;
        }
        Ok(())
    }
}

/// Accepts `e2e4`, `e2-e4`, `e7e8q` and `e7-e8=Q`.
impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .trim()
            .chars()
            .filter(|ch| *ch != '-' && *ch != '=')
            .collect();
        let invalid = || ParseError::Move(s.to_string());
        if !(4..=5).contains(&compact.len()) || !compact.is_ascii() {
            return Err(invalid());
        }
        let from: Square = compact[0..2].parse().map_err(|_| invalid())?;
        let to: Square = compact[2..4].parse().map_err(|_| invalid())?;
        match compact[4..].chars().next() {
            None => Ok(Move::new(from, to)),
            Some(ch) => {
                let promo = Promotion::from_char(ch).ok_or(ParseError::Promotion(ch))?;
                Ok(Move::with_promotion(from, to, promo))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DrawType {
    Stalemate,
    FiftyMove,
    ThreefoldRepetition,
}

impl fmt::Display for DrawType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DrawType::Stalemate => "stalemate",
            DrawType::FiftyMove => "50 move rule",
            DrawType::ThreefoldRepetition => "3 move repetition",
        };
        f.write_str(text)
    }
}
