//! 机器人棋盘串口协议库
//!
//! 包含:
//! - 代数坐标编解码 (Square, Coord)
//! - 阵营与升变棋子
//! - 操作码与动作命令 (Opcode, ActuationCommand)
//! - 帧编码与校验和
//! - 串口链路 (CommandLink trait, SerialLink, SerialConnector)

mod command;
mod constants;
mod error;
mod piece;
pub mod square;
mod transport;

pub use command::{checksum, encode_frame, ActuationCommand, Opcode};
pub use constants::*;
pub use error::{NackReason, ProtocolError, Result, SquareError};
pub use piece::{Color, PromotionPiece};
pub use square::{Coord, Square};
pub use transport::{
    AckReader, CommandLink, DeviceMessage, FrameWriter, SerialConfig, SerialConnector,
    SerialLink,
};
