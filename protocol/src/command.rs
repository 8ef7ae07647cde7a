//! 下位机命令与帧编码
//!
//! 帧格式：`[操作码:1][长度:1][负载:长度][校验和:1]`，
//! 校验和为负载字节累加后对 256 取模，空负载时为 0。

use serde::{Deserialize, Serialize};

use crate::constants::MAX_PAYLOAD_LEN;
use crate::error::{ProtocolError, Result};
use crate::square::{Coord, Square};

/// 操作码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Opcode {
    /// 读取机械臂关节角度（查询）
    ReadAngle = 0x01,
    /// 读取机械臂末端位置（查询）
    ReadPos = 0x02,
    /// 标定棋盘角点
    CornerDef = 0x03,
    /// 移动到棋盘格上方
    MoveChessCoord = 0x04,
    /// 搬运棋子
    MovePiece = 0x05,
    /// 移走棋子
    TakePiece = 0x06,
    /// 移动到任意位置
    Move = 0x07,
    /// 按关节角度移动
    MoveAngles = 0x08,
}

impl Opcode {
    /// 获取操作码字节
    pub fn code(self) -> u8 {
        self as u8
    }

    /// 从字节解析
    pub fn from_code(code: u8) -> Option<Opcode> {
        match code {
            0x01 => Some(Opcode::ReadAngle),
            0x02 => Some(Opcode::ReadPos),
            0x03 => Some(Opcode::CornerDef),
            0x04 => Some(Opcode::MoveChessCoord),
            0x05 => Some(Opcode::MovePiece),
            0x06 => Some(Opcode::TakePiece),
            0x07 => Some(Opcode::Move),
            0x08 => Some(Opcode::MoveAngles),
            _ => None,
        }
    }

    /// 查询类命令在 ACK 之后还会返回一段负载
    pub fn is_query(self) -> bool {
        matches!(self, Opcode::ReadAngle | Opcode::ReadPos)
    }

    /// 协议中的名称
    pub fn name(self) -> &'static str {
        match self {
            Opcode::ReadAngle => "READ_ANGLE",
            Opcode::ReadPos => "READ_POS",
            Opcode::CornerDef => "CORNER_DEF",
            Opcode::MoveChessCoord => "MOVE_CHESS_COORD",
            Opcode::MovePiece => "MOVE_PIECE",
            Opcode::TakePiece => "TAKE_PIECE",
            Opcode::Move => "MOVE",
            Opcode::MoveAngles => "MOVE_ANGLES",
        }
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 计算校验和
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// 发往下位机的一条动作命令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuationCommand {
    pub opcode: Opcode,
    pub payload: Vec<u8>,
}

impl ActuationCommand {
    pub fn new(opcode: Opcode, payload: Vec<u8>) -> Self {
        Self { opcode, payload }
    }

    /// 把 `from` 上的棋子搬到 `to`
    pub fn move_piece(from: Coord, to: Coord) -> Self {
        let mut payload = Vec::with_capacity(4);
        payload.extend_from_slice(&from.to_bytes());
        payload.extend_from_slice(&to.to_bytes());
        Self::new(Opcode::MovePiece, payload)
    }

    /// 把 `at` 上的棋子移出棋盘
    pub fn take_piece(at: Coord) -> Self {
        Self::new(Opcode::TakePiece, at.to_bytes().to_vec())
    }

    /// 移动到棋盘格上方
    pub fn move_chess_coord(square: Square) -> Self {
        Self::new(Opcode::MoveChessCoord, square.encode().to_vec())
    }

    pub fn read_angle() -> Self {
        Self::new(Opcode::ReadAngle, Vec::new())
    }

    pub fn read_pos() -> Self {
        Self::new(Opcode::ReadPos, Vec::new())
    }

    /// 编码为一帧
    pub fn encode_frame(&self) -> Result<Vec<u8>> {
        encode_frame(self.opcode, &self.payload)
    }
}

impl std::fmt::Display for ActuationCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:?}", self.opcode, self.payload)
    }
}

/// 按帧格式编码
pub fn encode_frame(opcode: Opcode, payload: &[u8]) -> Result<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }

    let mut frame = Vec::with_capacity(payload.len() + 3);
    frame.push(opcode.code());
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);
    frame.push(checksum(payload));
    Ok(frame)
}
