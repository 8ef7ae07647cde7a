//! 对局会话
//!
//! 会话独占规则引擎和命令链路，取代全局的棋局/串口状态。

use tracing::{info, warn};

use board_protocol::{ActuationCommand, CommandLink, DeviceMessage, ProtocolError, Square};

use crate::error::MoveError;
use crate::rules::{MoveResult, MoveValidator};
use crate::translator::MoveTranslator;

/// 已在实体棋盘上执行完毕的走法
#[derive(Debug, Clone)]
pub struct PlayedMove {
    pub result: MoveResult,
    pub commands: Vec<ActuationCommand>,
}

/// 对局会话
pub struct BoardSession<V, L> {
    rules: V,
    link: L,
}

impl<V: MoveValidator, L: CommandLink> BoardSession<V, L> {
    pub fn new(rules: V, link: L) -> Self {
        Self { rules, link }
    }

    /// 走一步棋
    ///
    /// 走法被拒绝时不会发出任何命令。执行失败时逻辑棋局已经更新，
    /// 实体棋盘可能停在中间状态，需要人工复位。
    pub async fn play(&mut self, input: &str) -> Result<PlayedMove, MoveError> {
        let result = self.rules.apply(input)?;
        info!(
            "{} 走 {} ({} -> {})",
            result.color, result.san, result.from, result.to
        );

        match MoveTranslator::execute(&mut self.link, &result).await {
            Ok(commands) => Ok(PlayedMove { result, commands }),
            Err(e) => {
                warn!("{} 已记入棋局，但实体棋盘未完成: {}", result.san, e);
                Err(e.into())
            }
        }
    }

    /// 读取末端位置
    pub async fn read_position(&mut self) -> Result<Vec<u8>, ProtocolError> {
        self.query(ActuationCommand::read_pos()).await
    }

    /// 读取关节角度
    pub async fn read_angles(&mut self) -> Result<Vec<u8>, ProtocolError> {
        self.query(ActuationCommand::read_angle()).await
    }

    /// 移动到棋盘格上方
    pub async fn move_to_square(&mut self, square: Square) -> Result<(), ProtocolError> {
        self.link
            .send(&ActuationCommand::move_chess_coord(square))
            .await?;
        Ok(())
    }

    async fn query(&mut self, command: ActuationCommand) -> Result<Vec<u8>, ProtocolError> {
        let payload = self.link.send(&command).await?;
        Ok(payload.unwrap_or_default())
    }

    /// 取出下位机发来的消息
    pub fn messages(&mut self) -> Vec<DeviceMessage> {
        self.link.take_messages()
    }

    pub fn rules(&self) -> &V {
        &self.rules
    }

    #[cfg(test)]
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}
