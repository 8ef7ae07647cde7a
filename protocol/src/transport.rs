//! 串口传输层
//!
//! `CommandLink` trait 把动作命令的收发与具体串口实现解耦，
//! 上层（走法翻译）只依赖这个 trait，测试时可以换成内存实现。
//!
//! 应答槽状态机：
//! - `MESSAGE` 标记：随后是一条 `[长度][文本]` 的带内消息，记录后继续等待
//! - `ACK` 标记：成功；查询类命令还会再跟一条 `[长度][负载]`
//! - `NACK` 标记：随后 1 字节原因码
//! - 其他字节：协议错误
//!
//! 协议错误或超时之后，链路在发送下一帧前丢弃已到达的残留字节。

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::time::timeout;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, info, warn};

use crate::command::{encode_frame, ActuationCommand, Opcode};
use crate::constants::{
    ACK_TAG, DEFAULT_BAUD_RATE, DEFAULT_SERIAL_PORT, MESSAGE_TAG, NACK_TAG, RESPONSE_TIMEOUT,
    RESPONSE_TIMEOUT_MS,
};
use crate::error::{NackReason, ProtocolError, Result};

/// 串口配置（8 数据位、无校验、1 停止位固定不变）
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// 设备路径
    pub port: String,
    /// 波特率
    pub baud_rate: u32,
    /// 等待应答超时（毫秒）
    pub response_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            response_timeout_ms: RESPONSE_TIMEOUT_MS,
        }
    }
}

impl SerialConfig {
    pub fn response_timeout(&self) -> Duration {
        Duration::from_millis(self.response_timeout_ms)
    }
}

/// 下位机主动发来的带内消息
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMessage {
    pub received_at: DateTime<Utc>,
    pub text: String,
}

/// 命令链路抽象 trait（核心抽象，用于走法翻译层）
#[async_trait]
pub trait CommandLink: Send {
    /// 发送一条命令并等待应答
    ///
    /// 查询类命令返回下位机附带的负载，其他命令成功时返回 `None`。
    /// 上一条命令以协议错误或超时结束时，先丢弃残留的应答字节再发送。
    async fn send(&mut self, command: &ActuationCommand) -> Result<Option<Vec<u8>>>;

    /// 取出等待应答期间收到的带内消息
    fn take_messages(&mut self) -> Vec<DeviceMessage>;
}

// ============================================================================
// 串口实现
// ============================================================================

/// 串口连接器
pub struct SerialConnector;

impl SerialConnector {
    /// 打开串口设备
    pub fn open(config: &SerialConfig) -> Result<SerialLink<SerialStream>> {
        let stream = tokio_serial::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .open_native_async()?;

        info!("已打开串口 {} ({} baud)", config.port, config.baud_rate);
        Ok(SerialLink::with_timeout(stream, config.response_timeout()))
    }
}

/// 帧链路：独占底层字节流，一次只有一条命令在途
pub struct SerialLink<T> {
    reader: AckReader<ReadHalf<T>>,
    writer: FrameWriter<WriteHalf<T>>,
    messages: Vec<DeviceMessage>,
    /// 上一次应答没有读完整
    desynced: bool,
}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> SerialLink<T> {
    /// 使用默认超时创建
    pub fn new(stream: T) -> Self {
        Self::with_timeout(stream, RESPONSE_TIMEOUT)
    }

    pub fn with_timeout(stream: T, response_timeout: Duration) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: AckReader::new(read_half, response_timeout),
            writer: FrameWriter::new(write_half),
            messages: Vec::new(),
            desynced: false,
        }
    }

    /// 编码、发送一帧并等待应答
    pub async fn send_raw(&mut self, opcode: Opcode, payload: &[u8]) -> Result<Option<Vec<u8>>> {
        let frame = encode_frame(opcode, payload)?;
        if self.desynced {
            let discarded = self.reader.discard_pending().await?;
            if discarded > 0 {
                warn!("丢弃 {} 字节残留应答", discarded);
            }
            self.desynced = false;
        }

        debug!("发送 {} {:02x?}", opcode, frame);
        self.writer.write_frame(&frame).await?;

        let result = self.read_ack(opcode).await;
        if matches!(
            result,
            Err(ProtocolError::UnexpectedTag(_))
                | Err(ProtocolError::UnknownNackReason(_))
                | Err(ProtocolError::ResponseTimeout)
        ) {
            self.desynced = true;
        }
        result
    }

    async fn read_ack(&mut self, opcode: Opcode) -> Result<Option<Vec<u8>>> {
        loop {
            let tag = self.reader.read_byte().await?;
            match tag {
                MESSAGE_TAG => {
                    let record = self.reader.read_record().await?;
                    let text = String::from_utf8_lossy(&record).into_owned();
                    info!("下位机消息: {}", text);
                    self.messages.push(DeviceMessage {
                        received_at: Utc::now(),
                        text,
                    });
                }
                ACK_TAG => {
                    debug!("{} 已确认", opcode);
                    if opcode.is_query() {
                        let payload = self.reader.read_record().await?;
                        return Ok(Some(payload));
                    }
                    return Ok(None);
                }
                NACK_TAG => {
                    let code = self.reader.read_byte().await?;
                    let reason = NackReason::from_code(code)
                        .ok_or(ProtocolError::UnknownNackReason(code))?;
                    warn!("{} 被拒绝: {}", opcode, reason);
                    return Err(ProtocolError::Nack(reason));
                }
                other => {
                    warn!("应答槽收到无法识别的字节 {:#04x}", other);
                    return Err(ProtocolError::UnexpectedTag(other));
                }
            }
        }
    }
}

#[async_trait]
impl<T: AsyncRead + AsyncWrite + Send + Unpin> CommandLink for SerialLink<T> {
    async fn send(&mut self, command: &ActuationCommand) -> Result<Option<Vec<u8>>> {
        self.send_raw(command.opcode, &command.payload).await
    }

    fn take_messages(&mut self) -> Vec<DeviceMessage> {
        std::mem::take(&mut self.messages)
    }
}

// ============================================================================
// 帧编解码
// ============================================================================

/// 应答读取器
pub struct AckReader<R> {
    reader: R,
    response_timeout: Duration,
}

impl<R: AsyncRead + Unpin + Send> AckReader<R> {
    pub fn new(reader: R, response_timeout: Duration) -> Self {
        Self {
            reader,
            response_timeout,
        }
    }

    /// 读取 1 字节，等待可读而不是轮询
    pub async fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte).await?;
        Ok(byte[0])
    }

    /// 读取一条 `[长度][数据]` 记录
    pub async fn read_record(&mut self) -> Result<Vec<u8>> {
        let length = self.read_byte().await? as usize;
        let mut buffer = vec![0u8; length];
        self.read_exact(&mut buffer).await?;
        Ok(buffer)
    }

    /// 丢弃已经到达的字节，不等待新数据
    pub async fn discard_pending(&mut self) -> Result<usize> {
        let mut scratch = [0u8; 64];
        let mut discarded = 0;
        while let Ok(read) = timeout(Duration::ZERO, self.reader.read(&mut scratch)).await {
            match read? {
                0 => break,
                n => discarded += n,
            }
        }
        Ok(discarded)
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        timeout(self.response_timeout, self.reader.read_exact(buf))
            .await
            .map_err(|_| ProtocolError::ResponseTimeout)?
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    ProtocolError::ConnectionClosed
                } else {
                    ProtocolError::Io(e)
                }
            })?;
        Ok(())
    }
}

/// 帧写入器
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 写入一帧已编码的数据
    pub async fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.writer.write_all(frame).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
