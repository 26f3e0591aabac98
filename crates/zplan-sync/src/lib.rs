//! ZPlan 实时协作同步
//!
//! 三条相互独立的数据流共用一个按项目划分的通道：
//! - 几何广播：整体替换楼层集合（最后写入者获胜）
//! - 光标广播：节流后发送，接收端按用户着色
//! - 选择广播：驱动平面视图上的软锁

pub mod channel;
pub mod error;
pub mod message;
pub mod synchronizer;

pub use channel::{Hub, HubChannel, RealtimeChannel};
pub use error::SyncError;
pub use message::{Envelope, SyncEvent};
pub use synchronizer::{ConnectionStatus, Synchronizer};
