//! 实时消息模块
//!
//! - [`RoomBus`] - 按房间投递的广播总线 (WebSocket 会话注册在这里)
//! - [`BroadcastPort`] - 订单引擎依赖的推送接口
//! - [`emit`] - 领域事件的推送辅助函数

pub mod bus;
pub mod emit;

pub use bus::{Audience, BroadcastPort, Delivery, RoomBus};
