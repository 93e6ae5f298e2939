//! Identifier mapping persistence
//!
//! # 模块结构
//!
//! - [`FileLock`] - 文件级互斥锁（有界忙等待）
//! - [`MappingStore`] - 商品 ID 双向映射表（JSON 持久化 + 内存索引）
//! - [`OrderMappingStore`] - 订单 ID 映射日志（追加/更新）
//! - [`Mapper`] - 统一查询门面（含命中率指标）

pub mod lock;
pub mod mapper;
pub mod order_store;
pub mod store;

pub use lock::{FileLock, LockGuard};
pub use mapper::{LookupMetrics, Mapper};
pub use order_store::OrderMappingStore;
pub use store::MappingStore;

use std::io;
use std::path::Path;

/// Write `bytes` to `path` atomically: temp file in the same directory,
/// then rename over the target.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}
