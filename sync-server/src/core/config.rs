use std::path::PathBuf;

use validator::Validate;

/// 服务器配置 - 同步服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/sync-server | 工作目录（映射文件、日志） |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | INVENTORY_API_URL | http://localhost:8080 | 上游 ERP 地址 |
/// | INVENTORY_API_TOKEN | - | 上游 ERP Bearer Token |
/// | MARKETPLACE_API_URL | http://localhost:8081 | 下游销售渠道地址 |
/// | MARKETPLACE_API_TOKEN | - | 下游销售渠道 Bearer Token |
/// | STOCK_SYNC_INTERVAL_MINUTES | 30 | 库存全量同步间隔（分钟，≥1） |
/// | ORDER_POLL_INTERVAL_MINUTES | 5 | 订单轮询间隔（分钟，≥1） |
/// | REQUEST_TIMEOUT_MS | 30000 | 出站请求超时（毫秒） |
/// | WAREHOUSE_ID | 0 | 推送库存的仓库编号 |
/// | WEBHOOK_TOKEN | - | Webhook 共享密钥（可选） |
/// | WEBHOOK_USER_AGENT | Inventory-Webhook/1.0 | 期望的 Webhook User-Agent |
/// | MAPPING_FILE | work_dir/mappings/product_mappings.json | 商品映射文件路径 |
/// | ORDER_MAPPING_FILE | work_dir/mappings/order_mappings.json | 订单映射文件路径 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/sync STOCK_SYNC_INTERVAL_MINUTES=15 cargo run
/// ```
#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// 工作目录，存储映射文件、日志等
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 外部平台 ===
    /// 上游 ERP（Inventory）地址
    pub inventory_api_url: String,
    pub inventory_api_token: Option<String>,
    /// 下游销售渠道（Marketplace）地址
    pub marketplace_api_url: String,
    pub marketplace_api_token: Option<String>,

    // === 同步调度 ===
    /// 库存全量同步间隔（分钟）
    #[validate(range(min = 1))]
    pub stock_sync_interval_minutes: u64,
    /// 订单轮询间隔（分钟）
    #[validate(range(min = 1))]
    pub order_poll_interval_minutes: u64,
    /// 出站请求超时（毫秒）
    #[validate(range(min = 1000))]
    pub request_timeout_ms: u64,
    /// 推送库存的仓库编号
    pub warehouse_id: u32,

    // === Webhook ===
    /// Webhook 共享密钥（设置后校验 X-Webhook-Token）
    pub webhook_token: Option<String>,
    /// 期望的 Webhook 发送方 User-Agent（仅记录，不拒绝）
    pub webhook_user_agent: String,

    // === 映射文件路径覆盖 ===
    mapping_file: Option<String>,
    order_mapping_file: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/sync-server".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            inventory_api_url: std::env::var("INVENTORY_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            inventory_api_token: std::env::var("INVENTORY_API_TOKEN").ok(),
            marketplace_api_url: std::env::var("MARKETPLACE_API_URL")
                .unwrap_or_else(|_| "http://localhost:8081".into()),
            marketplace_api_token: std::env::var("MARKETPLACE_API_TOKEN").ok(),

            stock_sync_interval_minutes: std::env::var("STOCK_SYNC_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            order_poll_interval_minutes: std::env::var("ORDER_POLL_INTERVAL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            warehouse_id: std::env::var("WAREHOUSE_ID")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),

            webhook_token: std::env::var("WEBHOOK_TOKEN").ok(),
            webhook_user_agent: std::env::var("WEBHOOK_USER_AGENT")
                .unwrap_or_else(|_| "Inventory-Webhook/1.0".into()),

            mapping_file: std::env::var("MAPPING_FILE").ok(),
            order_mapping_file: std::env::var("ORDER_MAPPING_FILE").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 商品映射文件路径
    pub fn mapping_file_path(&self) -> PathBuf {
        match &self.mapping_file {
            Some(path) => PathBuf::from(path),
            None => self.mappings_dir().join("product_mappings.json"),
        }
    }

    /// 订单映射文件路径
    pub fn order_mapping_file_path(&self) -> PathBuf {
        match &self.order_mapping_file {
            Some(path) => PathBuf::from(path),
            None => self.mappings_dir().join("order_mappings.json"),
        }
    }

    pub fn mappings_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("mappings")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.mappings_dir())?;
        std::fs::create_dir_all(self.log_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
