//! 规则引擎适配
//!
//! 走法合法性、轮次和将军判断全部交给 shakmaty，
//! 这里只负责把引擎的走法转换成 [`MoveResult`]。

use serde::{Deserialize, Serialize};
use shakmaty::{
    fen::Fen,
    san::{San, SanPlus},
    uci::Uci,
    CastlingMode, Chess, EnPassantMode, Move, Position, Role,
};

use board_protocol::{Color, PromotionPiece, Square};

use crate::error::RuleError;

/// 特殊走法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialMove {
    /// 吃过路兵
    EnPassant,
    /// 短易位
    KingSideCastle,
    /// 长易位
    QueenSideCastle,
}

/// 规则引擎确认后的走法
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    /// 起始格
    pub from: Square,
    /// 目标格（易位时为王的目标格）
    pub to: Square,
    /// 走子方
    pub color: Color,
    /// 是否吃子（含吃过路兵）
    pub captured: bool,
    /// 升变棋子
    pub promotion: Option<PromotionPiece>,
    pub special: Option<SpecialMove>,
    /// 标准代数记谱
    pub san: String,
}

impl MoveResult {
    /// 普通走法
    pub fn new(from: Square, to: Square, color: Color) -> Self {
        Self {
            from,
            to,
            color,
            captured: false,
            promotion: None,
            special: None,
            san: format!("{}{}", from, to),
        }
    }

    pub fn is_en_passant(&self) -> bool {
        self.special == Some(SpecialMove::EnPassant)
    }
}

/// 走法校验 trait：校验并应用到逻辑棋局
pub trait MoveValidator: Send {
    /// 校验走法，合法时应用并返回结构化结果
    fn apply(&mut self, input: &str) -> Result<MoveResult, RuleError>;

    /// 当前行棋方
    fn turn(&self) -> Color;

    /// 当前局面的 FEN
    fn fen(&self) -> String;
}

/// 基于 shakmaty 的国际象棋规则
#[derive(Debug, Clone, Default)]
pub struct ChessRules {
    position: Chess,
}

impl ChessRules {
    /// 标准初始局面
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 FEN 创建局面
    pub fn from_fen(fen: &str) -> Result<Self, RuleError> {
        let fen: Fen = fen
            .parse()
            .map_err(|e| RuleError::InvalidFen(format!("{e}")))?;
        let position: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| RuleError::InvalidFen(format!("{e}")))?;
        Ok(Self { position })
    }

    pub fn is_game_over(&self) -> bool {
        self.position.is_game_over()
    }

    /// 解析 UCI（e2e4、e7e8q）或 SAN（e4、exd5、O-O、e8=Q）
    fn parse_move(&self, input: &str) -> Result<Move, RuleError> {
        if let Ok(uci) = input.parse::<Uci>() {
            return uci
                .to_move(&self.position)
                .map_err(|_| RuleError::IllegalMove(input.to_string()));
        }

        let san: SanPlus = input
            .parse()
            .map_err(|_| RuleError::InvalidNotation(input.to_string()))?;
        san.san
            .to_move(&self.position)
            .map_err(|_| RuleError::IllegalMove(input.to_string()))
    }

    /// 在应用之前描述走法（SAN 依赖当前局面）
    fn describe(&self, m: &Move, input: &str) -> Result<MoveResult, RuleError> {
        let turn = self.position.turn();
        let from = m
            .from()
            .ok_or_else(|| RuleError::IllegalMove(input.to_string()))?;

        // shakmaty 的易位走法以车所在格为目标，这里换成王的目标格
        let color = color_of(turn);
        let (to, special) = match *m {
            Move::Castle { king, rook } if rook.file() as u8 > king.file() as u8 => (
                Square::new_unchecked(6, color.home_rank()),
                Some(SpecialMove::KingSideCastle),
            ),
            Move::Castle { .. } => (
                Square::new_unchecked(2, color.home_rank()),
                Some(SpecialMove::QueenSideCastle),
            ),
            Move::EnPassant { to, .. } => (square_of(to), Some(SpecialMove::EnPassant)),
            _ => (square_of(m.to()), None),
        };

        Ok(MoveResult {
            from: square_of(from),
            to,
            color,
            captured: m.is_capture(),
            promotion: m.promotion().and_then(promotion_of),
            special,
            san: San::from_move(&self.position, m).to_string(),
        })
    }
}

impl MoveValidator for ChessRules {
    fn apply(&mut self, input: &str) -> Result<MoveResult, RuleError> {
        if self.is_game_over() {
            return Err(RuleError::GameOver);
        }

        let input = input.trim();
        let m = self.parse_move(input)?;
        let result = self.describe(&m, input)?;
        self.position.play_unchecked(&m);
        Ok(result)
    }

    fn turn(&self) -> Color {
        color_of(self.position.turn())
    }

    fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }
}

fn square_of(square: shakmaty::Square) -> Square {
    Square::new_unchecked(square.file() as u8, square.rank() as u8)
}

fn color_of(color: shakmaty::Color) -> Color {
    match color {
        shakmaty::Color::White => Color::White,
        shakmaty::Color::Black => Color::Black,
    }
}

fn promotion_of(role: Role) -> Option<PromotionPiece> {
    match role {
        Role::Queen => Some(PromotionPiece::Queen),
        Role::Rook => Some(PromotionPiece::Rook),
        Role::Bishop => Some(PromotionPiece::Bishop),
        Role::Knight => Some(PromotionPiece::Knight),
        Role::King | Role::Pawn => None,
    }
}
