//! 棋子定义

use serde::{Deserialize, Serialize};

/// 升变可选的棋子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromotionPiece {
    /// 后
    Queen,
    /// 车
    Rook,
    /// 象
    Bishop,
    /// 马
    Knight,
}

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// 白方（先手，在第 1、2 行）
    White,
    /// 黑方（后手，在第 7、8 行）
    Black,
}

impl Color {
    /// 底线（王车易位所在行）
    pub fn home_rank(&self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// 兵前进方向
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::White => f.write_str("white"),
            Color::Black => f.write_str("black"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color() {
        assert_eq!(Color::Black.to_string(), "black");
        assert_eq!(Color::White.home_rank(), 0);
        assert_eq!(Color::Black.home_rank(), 7);
        assert_eq!(Color::Black.pawn_direction(), -1);
    }
}
