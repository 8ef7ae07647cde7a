//! 代数坐标编解码
//!
//! 棋盘格使用代数记法（列字母 a-h + 行数字 1-8），
//! 发往下位机时编码为从 0 开始的 (列, 行) 字节对：
//! - 列字节 = 字母 - 'a'
//! - 行字节 = 数字 - 1
//!
//! 备用棋子行位于棋盘之外，用 [`Coord`] 表示，行号允许为 -1 和 8。

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{BLACK_RESERVE_RANK, BOARD_SIZE, RESERVE_FILE, WHITE_RESERVE_RANK};
use crate::error::SquareError;
use crate::piece::Color;

/// 棋盘格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    /// 列 (0-7，对应 a-h)
    pub file: u8,
    /// 行 (0-7，对应 1-8)
    pub rank: u8,
}

impl Square {
    /// 创建新位置
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        if file < BOARD_SIZE && rank < BOARD_SIZE {
            Some(Self { file, rank })
        } else {
            None
        }
    }

    /// 创建新位置（不检查边界，内部使用）
    pub const fn new_unchecked(file: u8, rank: u8) -> Self {
        Self { file, rank }
    }

    /// 从代数坐标解析，如 "e4"
    pub fn from_label(label: &str) -> Result<Self, SquareError> {
        let invalid = || SquareError::InvalidLabel(label.to_string());

        let mut chars = label.chars();
        let (Some(file_char), Some(rank_char), None) = (chars.next(), chars.next(), chars.next())
        else {
            return Err(invalid());
        };

        let file_char = file_char.to_ascii_lowercase();
        if !('a'..='h').contains(&file_char) {
            return Err(invalid());
        }

        // 先把数字解析成整数再减一
        let rank_number = rank_char.to_digit(10).ok_or_else(invalid)?;
        if !(1..=8).contains(&rank_number) {
            return Err(invalid());
        }

        Ok(Self {
            file: file_char as u8 - b'a',
            rank: (rank_number - 1) as u8,
        })
    }

    /// 转换为代数坐标
    pub fn label(&self) -> String {
        format!("{}{}", (b'a' + self.file) as char, self.rank + 1)
    }

    /// 编码为 (列, 行) 字节对
    pub fn encode(&self) -> [u8; 2] {
        [self.file, self.rank]
    }

    /// 从 (列, 行) 字节对解码
    pub fn decode(bytes: [u8; 2]) -> Option<Self> {
        Self::new(bytes[0], bytes[1])
    }
}

impl FromStr for Square {
    type Err = SquareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s.trim())
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

/// 将代数坐标编码为 (列, 行) 字节对
pub fn encode(square: Square) -> (u8, u8) {
    (square.file, square.rank)
}

/// 将 (列, 行) 字节对解码为棋盘格，越界时返回 None
pub fn decode(file: u8, rank: u8) -> Option<Square> {
    Square::new(file, rank)
}

/// 下位机坐标，可以指向棋盘外的备用棋子行
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub file: i8,
    pub rank: i8,
}

impl Coord {
    pub const fn new(file: i8, rank: i8) -> Self {
        Self { file, rank }
    }

    /// 指定阵营的备用棋子位置
    pub fn reserve(color: Color) -> Self {
        let rank = match color {
            Color::White => WHITE_RESERVE_RANK,
            Color::Black => BLACK_RESERVE_RANK,
        };
        Self {
            file: RESERVE_FILE,
            rank,
        }
    }

    /// 是否在棋盘内
    pub fn is_on_board(&self) -> bool {
        (0..BOARD_SIZE as i8).contains(&self.file) && (0..BOARD_SIZE as i8).contains(&self.rank)
    }

    /// 编码为字节对（负数按补码，-1 即 0xFF）
    pub fn to_bytes(&self) -> [u8; 2] {
        [self.file as u8, self.rank as u8]
    }
}

impl From<Square> for Coord {
    fn from(square: Square) -> Self {
        Self {
            file: square.file as i8,
            rank: square.rank as i8,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_on_board() {
            write!(f, "{}", Square::new_unchecked(self.file as u8, self.rank as u8))
        } else {
            write!(f, "({}, {})", self.file, self.rank)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_corners() {
        assert_eq!(encode(Square::from_label("a1").unwrap()), (0, 0));
        assert_eq!(encode(Square::from_label("h8").unwrap()), (7, 7));
        assert_eq!(Square::from_label("e4").unwrap().encode(), [4, 3]);
    }

    #[test]
    fn test_decode_inverts_encode() {
        for file in 'a'..='h' {
            for rank in 1..=8 {
                let label = format!("{}{}", file, rank);
                let square = Square::from_label(&label).unwrap();
                let (f, r) = encode(square);
                let decoded = decode(f, r).unwrap();
                assert_eq!(decoded, square);
                assert_eq!(decoded.label(), label);
            }
        }
    }

    #[test]
    fn test_decode_out_of_range() {
        assert_eq!(decode(8, 0), None);
        assert_eq!(decode(0, 8), None);
        assert_eq!(Square::decode([0xFF, 0]), None);
    }

    #[test]
    fn test_invalid_labels() {
        for label in ["", "e", "e9", "i1", "e0", "e44", "4e"] {
            assert!(Square::from_label(label).is_err(), "{label} should be rejected");
        }
        // 大写列字母可以接受
        assert_eq!(Square::from_label("E2").unwrap(), Square::new_unchecked(4, 1));
    }

    #[test]
    fn test_from_str_and_display() {
        let square: Square = " d5 ".parse().unwrap();
        assert_eq!(square, Square::new_unchecked(3, 4));
        assert_eq!(square.to_string(), "d5");
    }

    #[test]
    fn test_reserve_coord_bytes() {
        assert_eq!(Coord::reserve(Color::White).to_bytes(), [0, 0xFF]);
        assert_eq!(Coord::reserve(Color::Black).to_bytes(), [0, 8]);
        assert!(!Coord::reserve(Color::White).is_on_board());
        assert_eq!(Coord::reserve(Color::White).to_string(), "(0, -1)");
    }

    #[test]
    fn test_coord_from_square() {
        let coord = Coord::from(Square::from_label("g1").unwrap());
        assert_eq!(coord, Coord::new(6, 0));
        assert!(coord.is_on_board());
        assert_eq!(coord.to_string(), "g1");
    }
}
