//! 实时通道
//!
//! `RealtimeChannel` 是同步器与传输层之间的接缝。`Hub` 是进程内实现：
//! 每个项目一个 tokio 广播通道，帧为 JSON 文本，订阅者跳过自己发出的帧。

use crate::error::SyncError;
use crate::message::{Envelope, SyncEvent};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// 项目级实时通道
#[async_trait]
pub trait RealtimeChannel: Send {
    /// 加入项目（重连时再次调用）
    fn join(&mut self, project_id: &str) -> Result<(), SyncError>;

    fn leave(&mut self);

    fn is_connected(&self) -> bool;

    /// 发送事件；没有其他订阅者时不视为错误
    fn emit(&mut self, event: SyncEvent) -> Result<(), SyncError>;

    /// 非阻塞接收下一条他人发出的事件
    fn try_recv(&mut self) -> Result<Option<SyncEvent>, SyncError>;

    /// 等待下一条他人发出的事件
    async fn recv(&mut self) -> Result<SyncEvent, SyncError>;
}

/// 默认通道容量
pub const DEFAULT_CAPACITY: usize = 256;

/// 进程内消息中心
#[derive(Clone)]
pub struct Hub {
    rooms: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
    capacity: usize,
}

impl Hub {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// 为用户创建一个未连接的通道
    pub fn connect(&self, user_id: impl Into<String>) -> HubChannel {
        HubChannel {
            hub: self.clone(),
            user_id: user_id.into(),
            project_id: None,
            sender: None,
            receiver: None,
        }
    }

    fn room(&self, project_id: &str) -> broadcast::Sender<String> {
        if let Some(sender) = self.rooms.read().get(project_id) {
            return sender.clone();
        }
        let mut rooms = self.rooms.write();
        rooms
            .entry(project_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("room {} created", project_id);
                broadcast::channel(self.capacity).0
            })
            .clone()
    }

    /// 没有订阅者的项目释放其广播通道
    fn prune(&self, project_id: &str) {
        let mut rooms = self.rooms.write();
        if rooms
            .get(project_id)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            rooms.remove(project_id);
            tracing::debug!("room {} closed", project_id);
        }
    }

    /// 当前仍有通道的项目数
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    /// 项目当前的订阅者数
    pub fn subscriber_count(&self, project_id: &str) -> usize {
        self.rooms
            .read()
            .get(project_id)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

pub struct HubChannel {
    hub: Hub,
    user_id: String,
    project_id: Option<String>,
    sender: Option<broadcast::Sender<String>>,
    receiver: Option<broadcast::Receiver<String>>,
}

impl HubChannel {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// 模拟网络中断：丢弃订阅，保留项目信息以便重连
    pub fn drop_connection(&mut self) {
        tracing::debug!("{} connection dropped", self.user_id);
        self.release();
    }

    /// 释放订阅并清理空项目
    fn release(&mut self) {
        self.sender = None;
        self.receiver = None;
        if let Some(project_id) = &self.project_id {
            self.hub.prune(project_id);
        }
    }

    /// 解码帧；自己发出的帧返回 None
    fn accept(&self, frame: &str) -> Result<Option<SyncEvent>, SyncError> {
        let envelope = Envelope::decode(frame)?;
        if envelope.sender == self.user_id {
            return Ok(None);
        }
        Ok(Some(envelope.event))
    }
}

impl Drop for HubChannel {
    fn drop(&mut self) {
        self.release();
    }
}

#[async_trait]
impl RealtimeChannel for HubChannel {
    fn join(&mut self, project_id: &str) -> Result<(), SyncError> {
        self.release();
        let sender = self.hub.room(project_id);
        self.receiver = Some(sender.subscribe());
        self.sender = Some(sender);
        self.project_id = Some(project_id.to_string());
        tracing::info!("{} joined project {}", self.user_id, project_id);
        Ok(())
    }

    fn leave(&mut self) {
        self.release();
        if let Some(project_id) = self.project_id.take() {
            tracing::info!("{} left project {}", self.user_id, project_id);
        }
    }

    fn is_connected(&self) -> bool {
        self.receiver.is_some()
    }

    fn emit(&mut self, event: SyncEvent) -> Result<(), SyncError> {
        let (Some(sender), Some(project_id)) = (&self.sender, &self.project_id) else {
            return Err(SyncError::NotConnected);
        };
        let frame = Envelope::new(project_id.as_str(), self.user_id.as_str(), event).encode()?;
        // 没有其他订阅者时 send 返回错误，帧直接丢弃
        let _ = sender.send(frame);
        Ok(())
    }

    fn try_recv(&mut self) -> Result<Option<SyncEvent>, SyncError> {
        loop {
            let receiver = self.receiver.as_mut().ok_or(SyncError::NotConnected)?;
            let frame = match receiver.try_recv() {
                Ok(frame) => frame,
                Err(TryRecvError::Empty) => return Ok(None),
                Err(TryRecvError::Lagged(n)) => return Err(SyncError::Lagged(n)),
                Err(TryRecvError::Closed) => return Err(SyncError::Disconnected),
            };
            if let Some(event) = self.accept(&frame)? {
                return Ok(Some(event));
            }
        }
    }

    async fn recv(&mut self) -> Result<SyncEvent, SyncError> {
        loop {
            let receiver = self.receiver.as_mut().ok_or(SyncError::NotConnected)?;
            let frame = match receiver.recv().await {
                Ok(frame) => frame,
                Err(RecvError::Lagged(n)) => return Err(SyncError::Lagged(n)),
                Err(RecvError::Closed) => return Err(SyncError::Disconnected),
            };
            if let Some(event) = self.accept(&frame)? {
                return Ok(event);
            }
        }
    }
}
