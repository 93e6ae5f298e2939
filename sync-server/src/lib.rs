//! Sync Server - 库存/订单双向同步服务
//!
//! # 架构概述
//!
//! 本服务在上游 ERP（Inventory）和下游销售渠道（Marketplace）之间保持
//! 库存和订单一致。两个平台各自分配 ID，互不相等，必须双向翻译：
//!
//! - **映射存储** (`mapping`): 文件锁保护的双向 ID 映射表 + 订单映射日志
//! - **平台客户端** (`clients`): 两个 HTTP 客户端 + 共享重试策略
//! - **库存同步** (`stock`): Webhook 增量推送 + 定时全量对账
//! - **订单同步** (`orders`): 轮询拉取、行项目翻译、发货回传
//! - **HTTP API** (`api`): Webhook 接收、健康检查、运维接口
//!
//! # 模块结构
//!
//! ```text
//! sync-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── mapping/       # ID 映射持久化 + 查询门面
//! ├── clients/       # Inventory / Marketplace 客户端 + 重试
//! ├── stock/         # 库存同步引擎 + 定时器
//! ├── orders/        # 订单同步引擎 + 定时器
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志等工具函数
//! ```

pub mod api;
pub mod clients;
pub mod core;
pub mod mapping;
pub mod orders;
pub mod stock;
pub mod utils;

// Re-export 公共类型
pub use clients::{InventoryApi, InventoryClient, MarketplaceApi, MarketplaceClient, RetryConfig};
pub use core::{Config, Server, ServerState};
pub use mapping::{Mapper, MappingStore, OrderMappingStore};
pub use orders::OrderSynchronizer;
pub use stock::StockSynchronizer;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional; ignore a missing file
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____                  _____
  / ___/__  ______  _____/ ___/___  ______   _____  _____
  \__ \/ / / / __ \/ ___/\__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ / /_/ / / / / /__ ___/ /  __/ /   | |/ /  __/ /
/____/\__, /_/ /_/\___//____/\___/_/    |___/\___/_/
     /____/
    "#
    );
}
