//! 协作同步器
//!
//! 把编辑器的本地事件发布到通道，并把收到的远端事件应用到编辑器：
//! 几何整体替换、光标与选择写入在场信息、响应几何请求、淘汰失联用户。

use crate::channel::RealtimeChannel;
use crate::error::SyncError;
use crate::message::SyncEvent;
use std::time::{Duration, Instant};
use zplan_core::math::Point2;
use zplan_core::model::Selection;
use zplan_core::presence::Participant;
use zplan_ui::{Editor, EditorEvent};

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connected,
}

impl ConnectionStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connected => "connected",
        }
    }
}

pub struct Synchronizer<C: RealtimeChannel> {
    channel: C,
    project_id: String,
    user: Participant,
    status: ConnectionStatus,
    cursor_interval: Duration,
    last_cursor_sent: Option<Instant>,
    pending_cursor: Option<Point2>,
    /// 尚未广播的选择变化（None 表示无变化）
    pending_selection: Option<Option<Selection>>,
    /// 本地文档变化尚未广播（断线期间保留）
    geometry_dirty: bool,
}

impl<C: RealtimeChannel> Synchronizer<C> {
    pub fn new(
        channel: C,
        project_id: impl Into<String>,
        user: Participant,
        cursor_interval: Duration,
    ) -> Self {
        Self {
            channel,
            project_id: project_id.into(),
            user,
            status: ConnectionStatus::Disconnected,
            cursor_interval,
            last_cursor_sent: None,
            pending_cursor: None,
            pending_selection: None,
            geometry_dirty: false,
        }
    }

    /// 以编辑器的用户与配置创建
    pub fn for_editor(channel: C, project_id: impl Into<String>, editor: &Editor) -> Self {
        let interval = Duration::from_millis(editor.store().config().cursor_interval_ms);
        Self::new(channel, project_id, editor.user().clone(), interval)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// 加入项目；重连时同样调用
    ///
    /// 断线期间有未发送的本地编辑时直接发布本地楼层，否则请求最新几何。
    pub fn connect(&mut self, editor: &mut Editor) -> Result<(), SyncError> {
        self.collect(editor);
        self.channel.join(&self.project_id)?;
        self.channel.emit(SyncEvent::JoinProject {
            project_id: self.project_id.clone(),
            user: self.user.clone(),
        })?;
        if self.geometry_dirty {
            self.channel.emit(Self::geometry(editor))?;
            self.geometry_dirty = false;
            tracing::info!("{} pushed offline edits on reconnect", self.user.user_name);
        } else {
            self.channel.emit(SyncEvent::RequestGeometry {
                user_id: self.user.user_id.clone(),
            })?;
        }
        self.status = ConnectionStatus::Connected;
        tracing::info!("{} connected to {}", self.user.user_name, self.project_id);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if self.channel.is_connected() {
            let leave = SyncEvent::LeaveProject {
                project_id: self.project_id.clone(),
                user_id: self.user.user_id.clone(),
            };
            if let Err(err) = self.channel.emit(leave) {
                tracing::debug!("leave not delivered: {}", err);
            }
        }
        self.channel.leave();
        self.status = ConnectionStatus::Disconnected;
    }

    fn emit(&mut self, event: SyncEvent) -> Result<(), SyncError> {
        tracing::trace!("emit {}", event.name());
        if let Err(err) = self.channel.emit(event) {
            if matches!(err, SyncError::NotConnected) {
                self.status = ConnectionStatus::Disconnected;
            }
            return Err(err);
        }
        Ok(())
    }

    fn geometry(editor: &Editor) -> SyncEvent {
        SyncEvent::GeometryUpdate {
            levels: editor.document().levels.clone(),
        }
    }

    /// 取走编辑器事件，合并为待发送状态
    fn collect(&mut self, editor: &mut Editor) {
        for event in editor.drain_events() {
            match event {
                EditorEvent::DocumentChanged { .. } => self.geometry_dirty = true,
                EditorEvent::SelectionChanged(selection) => {
                    self.pending_selection = Some(selection)
                }
                EditorEvent::CursorMoved(point) => self.pending_cursor = Some(point),
            }
        }
    }

    /// 发布编辑器积累的本地事件，返回发送的事件数
    ///
    /// 多次文档变化合并为一次几何广播；光标按间隔节流，只发送最新位置。
    pub fn publish(&mut self, editor: &mut Editor, now: Instant) -> Result<usize, SyncError> {
        self.collect(editor);

        if !self.channel.is_connected() {
            self.status = ConnectionStatus::Disconnected;
            return Ok(0);
        }

        let mut sent = 0;
        if self.geometry_dirty {
            self.emit(Self::geometry(editor))?;
            self.geometry_dirty = false;
            sent += 1;
        }
        if let Some(selection) = self.pending_selection.take() {
            self.emit(SyncEvent::SelectionUpdate {
                user_id: self.user.user_id.clone(),
                selection,
            })?;
            sent += 1;
        }
        let cursor_due = self
            .last_cursor_sent
            .map_or(true, |last| now.saturating_duration_since(last) >= self.cursor_interval);
        if let (Some(point), true) = (self.pending_cursor, cursor_due) {
            self.emit(SyncEvent::CursorUpdate {
                user_id: self.user.user_id.clone(),
                user_name: self.user.user_name.clone(),
                position: point.into(),
            })?;
            self.pending_cursor = None;
            self.last_cursor_sent = Some(now);
            sent += 1;
        }
        Ok(sent)
    }

    /// 应用所有已到达的远端事件并淘汰失联用户，返回应用的事件数
    pub fn pump(&mut self, editor: &mut Editor, now: Instant) -> Result<usize, SyncError> {
        let mut applied = 0;
        loop {
            match self.channel.try_recv() {
                Ok(Some(event)) => {
                    self.apply(editor, event, now)?;
                    applied += 1;
                }
                Ok(None) => break,
                Err(SyncError::Lagged(n)) => {
                    tracing::warn!("{} missed {} messages, requesting geometry", self.user.user_name, n);
                    self.emit(SyncEvent::RequestGeometry {
                        user_id: self.user.user_id.clone(),
                    })?;
                }
                Err(err @ (SyncError::Disconnected | SyncError::NotConnected)) => {
                    self.status = ConnectionStatus::Disconnected;
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!("dropping malformed frame: {}", err);
                }
            }
        }

        let evicted = editor.presence_mut().evict_stale(now);
        if !evicted.is_empty() {
            tracing::info!("evicted stale collaborators: {:?}", evicted);
        }
        Ok(applied)
    }

    /// 等待并应用下一条远端事件
    pub async fn next(&mut self, editor: &mut Editor) -> Result<(), SyncError> {
        let event = self.channel.recv().await?;
        self.apply(editor, event, Instant::now())
    }

    fn apply(&mut self, editor: &mut Editor, event: SyncEvent, now: Instant) -> Result<(), SyncError> {
        tracing::debug!("{} received {}", self.user.user_name, event.name());
        match event {
            SyncEvent::JoinProject { user, .. } => {
                tracing::info!("{} joined {}", user.user_name, self.project_id);
                editor.presence_mut().touch(&user.user_id, now);
            }
            SyncEvent::LeaveProject { user_id, .. } => {
                editor.presence_mut().remove_user(&user_id);
            }
            SyncEvent::GeometryUpdate { levels } => {
                if let Err(err) = editor.apply_remote_levels(levels) {
                    tracing::warn!("remote geometry rejected: {}", err);
                }
            }
            SyncEvent::CursorUpdate {
                user_id,
                user_name,
                position,
            } => {
                if user_id != self.user.user_id {
                    editor
                        .presence_mut()
                        .update_cursor(&user_id, &user_name, position.into(), now);
                }
            }
            SyncEvent::SelectionUpdate { user_id, selection } => {
                if user_id != self.user.user_id {
                    editor
                        .presence_mut()
                        .update_selection(&user_id, selection.as_ref(), now);
                }
            }
            SyncEvent::RequestGeometry { user_id } => {
                if user_id != self.user.user_id {
                    editor.presence_mut().touch(&user_id, now);
                    self.emit(Self::geometry(editor))?;
                }
            }
            SyncEvent::ErrorMessage { message } => {
                editor.store_mut().notifications_mut().error(message);
            }
        }
        Ok(())
    }
}
