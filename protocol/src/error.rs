//! 错误类型定义

use thiserror::Error;

/// 坐标解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SquareError {
    /// 无效的代数坐标
    #[error("Invalid square label: {0:?}")]
    InvalidLabel(String),
}

/// 下位机拒绝命令的原因（NACK 原因码）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NackReason {
    /// OP：未知或不支持的操作码
    UnknownOpcode,
    /// SUM：校验和不匹配
    ChecksumMismatch,
    /// ARG：参数或长度错误
    MalformedArgument,
    /// NOGOAL：目标位置不可达
    NoGoal,
}

impl NackReason {
    /// 获取原因码
    pub fn code(&self) -> u8 {
        match self {
            NackReason::UnknownOpcode => 0xFF,
            NackReason::ChecksumMismatch => 0xFE,
            NackReason::MalformedArgument => 0xFD,
            NackReason::NoGoal => 0xFC,
        }
    }

    /// 从原因码解析
    pub fn from_code(code: u8) -> Option<NackReason> {
        match code {
            0xFF => Some(NackReason::UnknownOpcode),
            0xFE => Some(NackReason::ChecksumMismatch),
            0xFD => Some(NackReason::MalformedArgument),
            0xFC => Some(NackReason::NoGoal),
            _ => None,
        }
    }
}

impl std::fmt::Display for NackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            NackReason::UnknownOpcode => "unknown opcode",
            NackReason::ChecksumMismatch => "checksum mismatch",
            NackReason::MalformedArgument => "malformed argument",
            NackReason::NoGoal => "goal unreachable",
        };
        f.write_str(text)
    }
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 串口打开失败
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// 下位机拒绝了命令
    #[error("Command rejected by board: {0}")]
    Nack(NackReason),

    /// 未知的 NACK 原因码
    #[error("Command rejected with unknown reason code {0:#04x}")]
    UnknownNackReason(u8),

    /// 应答槽中出现无法识别的字节
    #[error("Unexpected byte {0:#04x} in acknowledgement slot")]
    UnexpectedTag(u8),

    /// 负载超长
    #[error("Payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// 等待应答超时
    #[error("Timed out waiting for board response")]
    ResponseTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,
}

impl ProtocolError {
    /// 是否为通道层故障（需要人工重连）
    pub fn is_channel_error(&self) -> bool {
        matches!(
            self,
            ProtocolError::Io(_)
                | ProtocolError::Serial(_)
                | ProtocolError::ResponseTimeout
                | ProtocolError::ConnectionClosed
        )
    }
}

impl From<NackReason> for ProtocolError {
    fn from(reason: NackReason) -> Self {
        ProtocolError::Nack(reason)
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nack_reason_codes() {
        for reason in [
            NackReason::UnknownOpcode,
            NackReason::ChecksumMismatch,
            NackReason::MalformedArgument,
            NackReason::NoGoal,
        ] {
            assert_eq!(NackReason::from_code(reason.code()), Some(reason));
        }
        assert_eq!(NackReason::from_code(0xFE), Some(NackReason::ChecksumMismatch));
        assert_eq!(NackReason::from_code(0x00), None);
    }

    #[test]
    fn test_channel_error_classification() {
        assert!(ProtocolError::ConnectionClosed.is_channel_error());
        assert!(ProtocolError::ResponseTimeout.is_channel_error());
        assert!(!ProtocolError::Nack(NackReason::NoGoal).is_channel_error());
        assert!(!ProtocolError::UnexpectedTag(7).is_channel_error());
    }

    #[test]
    fn test_error_display() {
        let err = ProtocolError::Nack(NackReason::ChecksumMismatch);
        assert_eq!(err.to_string(), "Command rejected by board: checksum mismatch");

        let err = ProtocolError::UnexpectedTag(0x07);
        assert_eq!(err.to_string(), "Unexpected byte 0x07 in acknowledgement slot");
    }
}
