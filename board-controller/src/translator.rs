//! 走法翻译
//!
//! 把一步逻辑走法拆成下位机能执行的动作命令，按固定优先级：
//! 1. 普通吃子：先移走目标格上的棋子
//! 2. 升变：移走兵，再从备用行取子放到目标格
//! 3. 否则：把棋子从起始格搬到目标格
//! 4. 吃过路兵：移走被吃的兵（与目标格同列、相差一行）
//! 5. 王车易位：再搬车
//!
//! 命令逐条发送，每条等到确认后才发下一条；任何一条失败都会放弃剩余命令。

use tracing::{debug, warn};

use board_protocol::{ActuationCommand, Color, CommandLink, Coord};

use crate::error::ActuationError;
use crate::rules::{MoveResult, SpecialMove};

/// 短易位：车从 h 列到 f 列
const KING_SIDE_ROOK_FILES: (i8, i8) = (7, 5);

/// 长易位：车从 a 列到 d 列
const QUEEN_SIDE_ROOK_FILES: (i8, i8) = (0, 3);

/// 走法翻译器
pub struct MoveTranslator;

impl MoveTranslator {
    /// 生成动作命令序列
    pub fn plan(result: &MoveResult) -> Vec<ActuationCommand> {
        let mut commands = Vec::with_capacity(3);
        let from = Coord::from(result.from);
        let to = Coord::from(result.to);

        if result.captured && !result.is_en_passant() {
            commands.push(ActuationCommand::take_piece(to));
        }

        if result.promotion.is_some() {
            commands.push(ActuationCommand::take_piece(from));
            commands.push(ActuationCommand::move_piece(Coord::reserve(result.color), to));
        } else {
            commands.push(ActuationCommand::move_piece(from, to));
        }

        match result.special {
            Some(SpecialMove::EnPassant) => {
                commands.push(ActuationCommand::take_piece(Self::en_passant_victim(result)));
            }
            Some(SpecialMove::KingSideCastle) => {
                let (rook_from, rook_to) = Self::rook_squares(KING_SIDE_ROOK_FILES, result.color);
                commands.push(ActuationCommand::move_piece(rook_from, rook_to));
            }
            Some(SpecialMove::QueenSideCastle) => {
                let (rook_from, rook_to) = Self::rook_squares(QUEEN_SIDE_ROOK_FILES, result.color);
                commands.push(ActuationCommand::move_piece(rook_from, rook_to));
            }
            None => {}
        }

        commands
    }

    /// 逐条发送命令，返回已执行的命令序列
    pub async fn execute<L: CommandLink + ?Sized>(
        link: &mut L,
        result: &MoveResult,
    ) -> Result<Vec<ActuationCommand>, ActuationError> {
        let commands = Self::plan(result);
        let total = commands.len();

        for (index, command) in commands.iter().enumerate() {
            debug!("{} 第 {}/{} 条: {}", result.san, index + 1, total, command);
            if let Err(source) = link.send(command).await {
                warn!("{} 执行中断于 {}: {}", result.san, command, source);
                return Err(ActuationError {
                    sent: index,
                    total,
                    command: command.clone(),
                    source,
                });
            }
        }

        Ok(commands)
    }

    /// 被吃过路兵所在格：白方吃在目标格下一行，黑方吃在上一行
    fn en_passant_victim(result: &MoveResult) -> Coord {
        let rank = result.to.rank as i8 - result.color.pawn_direction();
        Coord::new(result.to.file as i8, rank)
    }

    fn rook_squares((from_file, to_file): (i8, i8), color: Color) -> (Coord, Coord) {
        let rank = color.home_rank() as i8;
        (Coord::new(from_file, rank), Coord::new(to_file, rank))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingLink;
    use board_protocol::{NackReason, Opcode, PromotionPiece, ProtocolError, Square};

    fn sq(label: &str) -> Square {
        Square::from_label(label).unwrap()
    }

    fn summary(commands: &[ActuationCommand]) -> Vec<(Opcode, Vec<u8>)> {
        commands
            .iter()
            .map(|c| (c.opcode, c.payload.clone()))
            .collect()
    }

    #[test]
    fn test_plain_move() {
        let result = MoveResult::new(sq("e2"), sq("e4"), Color::White);
        let plan = MoveTranslator::plan(&result);
        assert_eq!(summary(&plan), vec![(Opcode::MovePiece, vec![4, 1, 4, 3])]);
    }

    #[test]
    fn test_capture_removes_victim_first() {
        let mut result = MoveResult::new(sq("e4"), sq("d5"), Color::White);
        result.captured = true;

        let plan = MoveTranslator::plan(&result);
        assert_eq!(
            summary(&plan),
            vec![
                (Opcode::TakePiece, vec![3, 4]),
                (Opcode::MovePiece, vec![4, 3, 3, 4]),
            ]
        );
    }

    #[test]
    fn test_white_promotion_uses_white_reserve() {
        let mut result = MoveResult::new(sq("e7"), sq("e8"), Color::White);
        result.promotion = Some(PromotionPiece::Queen);

        let plan = MoveTranslator::plan(&result);
        assert_eq!(
            summary(&plan),
            vec![
                (Opcode::TakePiece, vec![4, 6]),
                (Opcode::MovePiece, vec![0, 0xFF, 4, 7]),
            ]
        );
    }

    #[test]
    fn test_black_capture_promotion() {
        let mut result = MoveResult::new(sq("d2"), sq("c1"), Color::Black);
        result.captured = true;
        result.promotion = Some(PromotionPiece::Knight);

        let plan = MoveTranslator::plan(&result);
        assert_eq!(
            summary(&plan),
            vec![
                (Opcode::TakePiece, vec![2, 0]),
                (Opcode::TakePiece, vec![3, 1]),
                (Opcode::MovePiece, vec![0, 8, 2, 0]),
            ]
        );
    }

    #[test]
    fn test_en_passant_white() {
        let mut result = MoveResult::new(sq("e5"), sq("f6"), Color::White);
        result.captured = true;
        result.special = Some(SpecialMove::EnPassant);

        let plan = MoveTranslator::plan(&result);
        assert_eq!(
            summary(&plan),
            vec![
                (Opcode::MovePiece, vec![4, 4, 5, 5]),
                (Opcode::TakePiece, vec![5, 4]),
            ]
        );
    }

    #[test]
    fn test_en_passant_black() {
        let mut result = MoveResult::new(sq("d4"), sq("e3"), Color::Black);
        result.captured = true;
        result.special = Some(SpecialMove::EnPassant);

        let plan = MoveTranslator::plan(&result);
        let victim = &plan[1];
        assert_eq!(victim.opcode, Opcode::TakePiece);
        assert_eq!(victim.payload, vec![4, 3]);
        assert_eq!(victim.payload[1] as i8 - result.to.rank as i8, 1);
    }

    #[test]
    fn test_white_king_side_castle() {
        let mut result = MoveResult::new(sq("e1"), sq("g1"), Color::White);
        result.special = Some(SpecialMove::KingSideCastle);

        let plan = MoveTranslator::plan(&result);
        assert_eq!(
            summary(&plan),
            vec![
                (Opcode::MovePiece, vec![4, 0, 6, 0]),
                (Opcode::MovePiece, vec![7, 0, 5, 0]),
            ]
        );
    }

    #[test]
    fn test_black_queen_side_castle_moves_rook_to_d_file() {
        let mut result = MoveResult::new(sq("e8"), sq("c8"), Color::Black);
        result.special = Some(SpecialMove::QueenSideCastle);

        let plan = MoveTranslator::plan(&result);
        assert_eq!(
            summary(&plan),
            vec![
                (Opcode::MovePiece, vec![4, 7, 2, 7]),
                (Opcode::MovePiece, vec![0, 7, 3, 7]),
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_sends_in_order() {
        let mut link = RecordingLink::new();
        let mut result = MoveResult::new(sq("e4"), sq("d5"), Color::White);
        result.captured = true;

        let sent = MoveTranslator::execute(&mut link, &result).await.unwrap();
        assert_eq!(sent, link.sent);
        assert_eq!(link.sent.len(), 2);
        assert_eq!(link.sent[0].opcode, Opcode::TakePiece);
    }

    #[tokio::test]
    async fn test_execute_aborts_on_first_failure() {
        let mut link = RecordingLink::failing_at(1, NackReason::NoGoal);
        let mut result = MoveResult::new(sq("e7"), sq("e8"), Color::White);
        result.captured = true;
        result.promotion = Some(PromotionPiece::Queen);

        let err = MoveTranslator::execute(&mut link, &result).await.unwrap_err();
        assert_eq!(err.sent, 1);
        assert_eq!(err.total, 3);
        assert_eq!(err.command, ActuationCommand::take_piece(sq("e7").into()));
        assert!(matches!(err.source, ProtocolError::Nack(NackReason::NoGoal)));
        // 失败之后的命令不再发送
        assert_eq!(link.sent.len(), 1);
    }
}
