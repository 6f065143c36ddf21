use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Numeric annotation glyphs attached to moves. Ordered by declaration, so a
/// set of them prints move-quality marks before evaluations.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Nag {
    Good,
    Bad,
    VeryGood,
    VeryBad,
    Interesting,
    Dubious,
    Forced,
    Equal,
    EqualQuiet,
    EqualActive,
    Unclear,
    SlightAdvantageWhite,
    SlightAdvantageBlack,
    ModerateAdvantageWhite,
    ModerateAdvantageBlack,
    DecisiveAdvantageWhite,
    DecisiveAdvantageBlack,
    ZugzwangWhite,
    ZugzwangBlack,
    Idea,
    Novelty,
}

impl Nag {
    pub const ALL: [Nag; 21] = [
        Nag::Good,
        Nag::Bad,
        Nag::VeryGood,
        Nag::VeryBad,
        Nag::Interesting,
        Nag::Dubious,
        Nag::Forced,
        Nag::Equal,
        Nag::EqualQuiet,
        Nag::EqualActive,
        Nag::Unclear,
        Nag::SlightAdvantageWhite,
        Nag::SlightAdvantageBlack,
        Nag::ModerateAdvantageWhite,
        Nag::ModerateAdvantageBlack,
        Nag::DecisiveAdvantageWhite,
        Nag::DecisiveAdvantageBlack,
        Nag::ZugzwangWhite,
        Nag::ZugzwangBlack,
        Nag::Idea,
        Nag::Novelty,
    ];

    /// Best to worst.
    pub const MOVE_QUALITY: [Nag; 6] = [
        Nag::VeryGood,
        Nag::Good,
        Nag::Interesting,
        Nag::Dubious,
        Nag::Bad,
        Nag::VeryBad,
    ];

    /// White winning to Black winning.
    pub const POSITION_EVALUATION: [Nag; 7] = [
        Nag::DecisiveAdvantageWhite,
        Nag::ModerateAdvantageWhite,
        Nag::SlightAdvantageWhite,
        Nag::Equal,
        Nag::SlightAdvantageBlack,
        Nag::ModerateAdvantageBlack,
        Nag::DecisiveAdvantageBlack,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Nag::Good => "!",
            Nag::Bad => "?",
            Nag::VeryGood => "!!",
            Nag::VeryBad => "??",
            Nag::Interesting => "!?",
            Nag::Dubious => "?!",
            Nag::Forced => "",
            Nag::Equal | Nag::EqualQuiet | Nag::EqualActive => "=",
            Nag::Unclear => "\u{221E}",
            Nag::SlightAdvantageWhite => "+/=",
            Nag::SlightAdvantageBlack => "=/+",
            Nag::ModerateAdvantageWhite => "+/-",
            Nag::ModerateAdvantageBlack => "-/+",
            Nag::DecisiveAdvantageWhite => "+-",
            Nag::DecisiveAdvantageBlack => "-+",
            Nag::ZugzwangWhite | Nag::ZugzwangBlack => " zugzwang",
            Nag::Idea => "ie:",
            Nag::Novelty => " novelty",
        }
    }

    /// PGN `$n` number.
    pub fn number(self) -> u8 {
        match self {
            Nag::Good => 1,
            Nag::Bad => 2,
            Nag::VeryGood => 3,
            Nag::VeryBad => 4,
            Nag::Interesting => 5,
            Nag::Dubious => 6,
            Nag::Forced => 7,
            Nag::Equal => 10,
            Nag::EqualQuiet => 11,
            Nag::EqualActive => 12,
            Nag::Unclear => 13,
            Nag::SlightAdvantageWhite => 14,
            Nag::SlightAdvantageBlack => 15,
            Nag::ModerateAdvantageWhite => 16,
            Nag::ModerateAdvantageBlack => 17,
            Nag::DecisiveAdvantageWhite => 18,
            Nag::DecisiveAdvantageBlack => 19,
            Nag::ZugzwangWhite => 22,
            Nag::ZugzwangBlack => 23,
            Nag::Idea => 140,
            Nag::Novelty => 146,
        }
    }

    pub fn from_number(number: u8) -> Option<Nag> {
        Nag::ALL.into_iter().find(|nag| nag.number() == number)
    }

    pub fn is_move_quality(self) -> bool {
        Nag::MOVE_QUALITY.contains(&self)
    }

    pub fn is_position_evaluation(self) -> bool {
        Nag::POSITION_EVALUATION.contains(&self)
    }

    pub fn for_eval_centipawns(eval: i32) -> Nag {
        match eval {
            e if e > 139 => Nag::DecisiveAdvantageWhite,
            e if e > 69 => Nag::ModerateAdvantageWhite,
            e if e > 24 => Nag::SlightAdvantageWhite,
            e if e > -25 => Nag::Equal,
            e if e > -70 => Nag::SlightAdvantageBlack,
            e if e > -140 => Nag::ModerateAdvantageBlack,
            _ => Nag::DecisiveAdvantageBlack,
        }
    }

    pub fn choose_move_quality<'a>(nags: impl IntoIterator<Item = &'a Nag>) -> Option<Nag> {
        choose(nags, &Nag::MOVE_QUALITY)
    }

    pub fn choose_position_evaluation<'a>(nags: impl IntoIterator<Item = &'a Nag>) -> Option<Nag> {
        choose(nags, &Nag::POSITION_EVALUATION)
    }

    pub fn next_move_quality(current: Option<Nag>, forward: bool) -> Option<Nag> {
        next(current, forward, &Nag::MOVE_QUALITY)
    }

    pub fn next_position_evaluation(current: Option<Nag>, forward: bool) -> Option<Nag> {
        next(current, forward, &Nag::POSITION_EVALUATION)
    }
}

fn choose<'a>(nags: impl IntoIterator<Item = &'a Nag>, list: &[Nag]) -> Option<Nag> {
    nags.into_iter().copied().find(|nag| list.contains(nag))
}

/// Steps through `list`; no current glyph starts at an end, and stepping off
/// either end clears the glyph.
fn next(current: Option<Nag>, forward: bool, list: &[Nag]) -> Option<Nag> {
    let Some(nag) = current else {
        let start = if forward { list.first() } else { list.last() };
        return start.copied();
    };
    let index = list.iter().position(|n| *n == nag)?;
    if forward {
        list.get(index + 1).copied()
    } else {
        index.checked_sub(1).map(|i| list[i])
    }
}

impl fmt::Display for Nag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Parses a glyph (`!?`, `+-`) or a number with or without `$`. Glyphs shared
/// by several annotations resolve to the first declared.
impl FromStr for Nag {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let numbered = text.strip_prefix('$').unwrap_or(text);
        if let Ok(number) = numbered.parse::<u8>() {
            return Nag::from_number(number).ok_or_else(|| ParseError::Nag(s.to_string()));
        }
        Nag::ALL
            .into_iter()
            .find(|nag| !nag.symbol().is_empty() && nag.symbol().trim() == text)
            .ok_or_else(|| ParseError::Nag(s.to_string()))
    }
}
