//! 测试用的内存命令链路

use async_trait::async_trait;
use board_protocol::{
    ActuationCommand, CommandLink, DeviceMessage, NackReason, ProtocolError, Result,
};

/// 记录所有已确认的命令，可在第 N 条命令上返回 NACK
pub struct RecordingLink {
    pub sent: Vec<ActuationCommand>,
    pub messages: Vec<DeviceMessage>,
    fail_at: Option<(usize, NackReason)>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            messages: Vec::new(),
            fail_at: None,
        }
    }

    pub fn failing_at(index: usize, reason: NackReason) -> Self {
        Self {
            fail_at: Some((index, reason)),
            ..Self::new()
        }
    }
}

#[async_trait]
impl CommandLink for RecordingLink {
    async fn send(&mut self, command: &ActuationCommand) -> Result<Option<Vec<u8>>> {
        if let Some((index, reason)) = self.fail_at {
            if index == self.sent.len() {
                return Err(ProtocolError::Nack(reason));
            }
        }
        self.sent.push(command.clone());
        if command.opcode.is_query() {
            return Ok(Some(vec![1, 2, 3]));
        }
        Ok(None)
    }

    fn take_messages(&mut self) -> Vec<DeviceMessage> {
        std::mem::take(&mut self.messages)
    }
}
