//! 协议常量定义

use std::time::Duration;

/// 棋盘边长（行数与列数）
pub const BOARD_SIZE: u8 = 8;

/// 单帧负载最大长度（长度字段为 1 字节）
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// 应答槽：否定应答
pub const NACK_TAG: u8 = 1;

/// 应答槽：肯定应答
pub const ACK_TAG: u8 = 2;

/// 应答槽：带内消息帧
pub const MESSAGE_TAG: u8 = 255;

/// 白方备用棋子行（棋盘外，第 1 行下方）
pub const WHITE_RESERVE_RANK: i8 = -1;

/// 黑方备用棋子行（棋盘外，第 8 行上方）
pub const BLACK_RESERVE_RANK: i8 = 8;

/// 备用棋子所在列
pub const RESERVE_FILE: i8 = 0;

/// 默认串口设备
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM0";

/// 默认波特率
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// 等待应答超时（毫秒）- 机械臂移动一次可能需要十几秒
pub const RESPONSE_TIMEOUT_MS: u64 = 30_000;

/// 等待应答超时 Duration
pub const RESPONSE_TIMEOUT: Duration = Duration::from_millis(RESPONSE_TIMEOUT_MS);
