//! 服务层 - 跨实体的业务服务
//!
//! # 服务列表
//!
//! - [`MenuLedger`] - 库存与可用性的唯一写入口
//! - [`ImageStore`] - 菜品图片存储 (默认本地磁盘 [`LocalImageStore`])

pub mod image_store;
pub mod ledger;

pub use image_store::{ImageStore, ImageStoreError, LocalImageStore, StoredImage};
pub use ledger::MenuLedger;
