use std::sync::Arc;
use std::time::Duration;

use shared::util::now_millis;

use crate::clients::{
    InventoryApi, InventoryClient, MarketplaceApi, MarketplaceClient,
};
use crate::core::{Config, Result, ServerError};
use crate::mapping::{Mapper, MappingStore, OrderMappingStore};
use crate::orders::OrderSynchronizer;
use crate::stock::StockSynchronizer;

/// 服务器状态 - 持有所有服务的单例引用
///
/// ServerState 是同步服务的核心数据结构，持有所有服务的共享引用。
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | mapper | Arc<Mapper> | ID 映射门面 |
/// | stock_sync | Arc<StockSynchronizer> | 库存同步引擎 |
/// | order_sync | Arc<OrderSynchronizer> | 订单同步引擎 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// ID 映射门面
    pub mapper: Arc<Mapper>,
    /// 库存同步引擎
    pub stock_sync: Arc<StockSynchronizer>,
    /// 订单同步引擎
    pub order_sync: Arc<OrderSynchronizer>,
    /// 启动时间戳（毫秒）
    pub started_at_ms: i64,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 映射存储 + 初始加载（损坏的映射文件或锁超时在此处是致命错误）
    /// 3. 两个平台客户端
    /// 4. 两个同步引擎
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let products = MappingStore::new(config.mapping_file_path());
        let orders = OrderMappingStore::new(config.order_mapping_file_path());
        let mapper = Arc::new(Mapper::new(products, orders));

        // Fatal on corrupt file or lock timeout: a process that cannot
        // translate ids has nothing useful to do.
        let count = mapper.load_mappings().await?;
        tracing::info!(count, "product mappings loaded");

        let timeout = Duration::from_millis(config.request_timeout_ms);
        let inventory: Arc<dyn InventoryApi> = Arc::new(
            InventoryClient::new(
                config.inventory_api_url.clone(),
                config.inventory_api_token.clone(),
                timeout,
            )
            .map_err(|e| ServerError::Config(e.to_string()))?,
        );
        let marketplace: Arc<dyn MarketplaceApi> = Arc::new(
            MarketplaceClient::new(
                config.marketplace_api_url.clone(),
                config.marketplace_api_token.clone(),
                timeout,
            )
            .map_err(|e| ServerError::Config(e.to_string()))?,
        );

        let stock_sync = Arc::new(StockSynchronizer::new(
            mapper.clone(),
            inventory.clone(),
            marketplace.clone(),
            config.warehouse_id,
        ));
        let order_sync = Arc::new(OrderSynchronizer::new(
            mapper.clone(),
            inventory,
            marketplace,
        ));

        Ok(Self {
            config: config.clone(),
            mapper,
            stock_sync,
            order_sync,
            started_at_ms: now_millis(),
        })
    }

    /// 运行时间（秒）
    pub fn uptime_seconds(&self) -> i64 {
        (now_millis() - self.started_at_ms) / 1000
    }
}
