use std::fmt;
use std::str::FromStr;

/// One of the 64 board cells, stored as `file + 8 * rank` (a1 = 0, h8 = 63).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    pub const COUNT: usize = 64;

    pub const fn new(index: u8) -> Option<Self> {
        if index < Self::COUNT as u8 {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn from_coords(file: u8, rank: u8) -> Option<Self> {
        if file < 8 && rank < 8 {
            Some(Self(file + 8 * rank))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 0 = a, 7 = h
    pub const fn file(self) -> u8 {
        self.0 % 8
    }

    /// 0 = first rank, 7 = eighth rank
    pub const fn rank(self) -> u8 {
        self.0 / 8
    }

    pub fn is_light(self) -> bool {
        self.file() % 2 != self.rank() % 2
    }

    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::COUNT as u8).map(Square)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.file()) as char,
            (b'1' + self.rank()) as char
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSquareError(String);

impl fmt::Display for ParseSquareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid square name {:?}", self.0)
    }
}

impl std::error::Error for ParseSquareError {}

impl FromStr for Square {
    type Err = ParseSquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseSquareError(s.to_owned()));
        }
        let file = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::from_coords(file, rank).ok_or_else(|| ParseSquareError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_for_every_square() {
        for square in Square::all() {
            let parsed: Square = square.to_string().parse().expect("parse square name");
            assert_eq!(parsed, square);
        }
    }

    #[test]
    fn e5_is_file_four_rank_four() {
        let e5: Square = "e5".parse().unwrap();
        assert_eq!(e5.file(), 4);
        assert_eq!(e5.rank(), 4);
        assert_eq!(e5.index(), 36);
    }

    #[test]
    fn rejects_out_of_range_names() {
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert!(Square::new(64).is_none());
    }

    #[test]
    fn a1_is_dark_and_h1_is_light() {
        assert!(!"a1".parse::<Square>().unwrap().is_light());
        assert!("h1".parse::<Square>().unwrap().is_light());
    }
}
