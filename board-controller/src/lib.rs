//! 机器人棋盘控制器
//!
//! 包含:
//! - 规则引擎适配（走法校验与结构化结果）
//! - 走法翻译（拆分为下位机动作命令）
//! - 对局会话（持有规则引擎与串口链路）
//! - 配置加载

pub mod config;
pub mod error;
pub mod rules;
pub mod session;
pub mod translator;

#[cfg(test)]
mod test_support;

pub use config::{ControllerConfig, LogLevel};
pub use error::{ActuationError, MoveError, RuleError};
pub use rules::{ChessRules, MoveResult, MoveValidator, SpecialMove};
pub use session::{BoardSession, PlayedMove};
pub use translator::MoveTranslator;
