//! 错误类型定义

use board_protocol::{ActuationCommand, ProtocolError};
use thiserror::Error;

/// 规则引擎拒绝走法
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// 无法识别的记谱
    #[error("Invalid move notation: {0}")]
    InvalidNotation(String),

    /// 走法不合法
    #[error("Illegal move: {0}")]
    IllegalMove(String),

    /// 无效的 FEN 字符串
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),

    /// 对局已结束
    #[error("Game is already over")]
    GameOver,
}

/// 执行动作序列时失败，其余命令未发送
#[derive(Error, Debug)]
#[error("Actuation failed at {command} ({sent}/{total} commands done): {source}")]
pub struct ActuationError {
    /// 已成功执行的命令数
    pub sent: usize,
    /// 本步走法的命令总数
    pub total: usize,
    /// 失败的命令
    pub command: ActuationCommand,
    #[source]
    pub source: ProtocolError,
}

/// 走棋错误
#[derive(Error, Debug)]
pub enum MoveError {
    /// 走法被拒绝，未与下位机交互
    #[error("Move rejected: {0}")]
    Rejected(#[from] RuleError),

    /// 走法已记入对局，但实体棋盘执行失败
    #[error(transparent)]
    Actuation(#[from] ActuationError),
}
