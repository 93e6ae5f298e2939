//! 端到端同步流程测试
//!
//! 使用临时目录中的真实映射文件和内存 mock 平台客户端，
//! 走完整条链路：映射加载 → 库存全量同步 → 订单轮询 → 发货回传。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use shared::ApiError;
use shared::inventory::{
    CreatedOrder, CreatedShipment, InventoryOrderRequest, ShipmentRequest, StockLevel,
};
use shared::marketplace::{
    MarketplaceLineItem, MarketplaceOrder, OrderStatus, StockPushResponse, StockUpdateItem,
};
use sync_server::{
    InventoryApi, MarketplaceApi, Mapper, MappingStore, OrderMappingStore, OrderSynchronizer,
    StockSynchronizer,
};

/// 内存 mock：上游 ERP
#[derive(Default)]
struct FakeInventory {
    stocks: HashMap<String, StockLevel>,
    created_orders: Mutex<Vec<InventoryOrderRequest>>,
    shipments: Mutex<Vec<ShipmentRequest>>,
    next_order_id: AtomicU32,
}

#[async_trait]
impl InventoryApi for FakeInventory {
    async fn stock_level(&self, product_id: &str) -> Result<StockLevel, ApiError> {
        self.stocks
            .get(product_id)
            .cloned()
            .ok_or_else(|| ApiError::from_status(500, "stock lookup failed"))
    }

    async fn create_order(&self, request: &InventoryOrderRequest) -> Result<CreatedOrder, ApiError> {
        self.created_orders.lock().unwrap().push(request.clone());
        let n = self.next_order_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(CreatedOrder {
            order_id: format!("SO-{n}"),
        })
    }

    async fn create_shipment(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CreatedShipment, ApiError> {
        self.shipments.lock().unwrap().push(request.clone());
        Ok(CreatedShipment {
            shipment_id: format!("SH-{}", request.order_id),
        })
    }
}

/// 内存 mock：下游销售渠道
#[derive(Default)]
struct FakeMarketplace {
    orders: Mutex<Vec<MarketplaceOrder>>,
    pushes: Mutex<Vec<StockUpdateItem>>,
}

#[async_trait]
impl MarketplaceApi for FakeMarketplace {
    async fn orders(&self, status: OrderStatus) -> Result<Vec<MarketplaceOrder>, ApiError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.status == status)
            .cloned()
            .collect())
    }

    async fn push_stock_batch(
        &self,
        items: &[StockUpdateItem],
    ) -> Result<StockPushResponse, ApiError> {
        self.pushes.lock().unwrap().extend(items.iter().cloned());
        Ok(StockPushResponse {
            accepted: items.len() as u32,
            errors: Vec::new(),
        })
    }
}

fn line_item(sku: &str, quantity: u32, price: &str) -> MarketplaceLineItem {
    MarketplaceLineItem {
        sku: sku.to_string(),
        quantity,
        unit_price: price.parse().unwrap(),
    }
}

async fn mapper_in(dir: &tempfile::TempDir, mappings: &[(&str, &str)]) -> Arc<Mapper> {
    let products = MappingStore::new(dir.path().join("product_mappings.json"));
    let orders = OrderMappingStore::new(dir.path().join("order_mappings.json"));
    let table: BTreeMap<String, String> = mappings
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    products.save(&table).await.unwrap();
    let mapper = Mapper::new(products, orders);
    mapper.load_mappings().await.unwrap();
    Arc::new(mapper)
}

#[tokio::test]
async fn stock_sweep_then_order_flow_converges() {
    let dir = tempfile::tempdir().unwrap();
    let mapper = mapper_in(&dir, &[("P1", "OFF1"), ("P2", "OFF2")]).await;

    // P1 有库存，P2 的库存查询会失败
    let inventory = Arc::new(FakeInventory {
        stocks: HashMap::from([(
            "P1".to_string(),
            StockLevel {
                on_hand: 15,
                reserved: 2,
            },
        )]),
        ..Default::default()
    });
    let marketplace = Arc::new(FakeMarketplace::default());

    let stock_sync = StockSynchronizer::new(
        mapper.clone(),
        inventory.clone(),
        marketplace.clone(),
        0,
    );
    let order_sync = OrderSynchronizer::new(mapper.clone(), inventory.clone(), marketplace.clone());

    // 1. 全量库存同步：P1 推送 13 件，P2 记为错误
    let stats = stock_sync.full_sweep().await.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.synced, 1);
    assert_eq!(stats.errors.len(), 1);
    assert!(stats.is_complete());
    {
        let pushes = marketplace.pushes.lock().unwrap();
        assert_eq!(pushes.len(), 1);
        assert_eq!(pushes[0].sku, "OFF1");
        assert_eq!(pushes[0].items[0].count, 13);
    }

    // 2. 订单轮询：两个行项目中有一个无法映射，订单仍然创建
    marketplace.orders.lock().unwrap().push(MarketplaceOrder {
        order_id: "MP-100".to_string(),
        status: OrderStatus::Processing,
        line_items: vec![line_item("OFF1", 2, "19.99"), line_item("OFF-UNKNOWN", 1, "5.00")],
        buyer: None,
        shipping_address: None,
        created_at: None,
    });

    let stats = order_sync.poll_and_process().await.unwrap();
    assert_eq!(stats.successful, 1);
    {
        let created = inventory.created_orders.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].positions.len(), 1);
        assert_eq!(created[0].positions[0].product_id, "P1");
        assert_eq!(created[0].positions[0].unit_price_minor, 1999);
    }
    assert_eq!(mapper.internal_order_id("MP-100").as_deref(), Some("SO-1"));

    // 3. 订单发货：映射指向刚创建的 Inventory 订单
    {
        let mut orders = marketplace.orders.lock().unwrap();
        orders[0].status = OrderStatus::Shipped;
    }
    let stats = order_sync.process_shipped().await.unwrap();
    assert_eq!(stats.successful, 1);
    {
        let shipments = inventory.shipments.lock().unwrap();
        assert_eq!(shipments.len(), 1);
        assert_eq!(shipments[0].order_id, "SO-1");
    }
}

#[tokio::test]
async fn order_mapping_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mapper = mapper_in(&dir, &[("P1", "OFF1")]).await;

    let inventory = Arc::new(FakeInventory::default());
    let marketplace = Arc::new(FakeMarketplace::default());
    marketplace.orders.lock().unwrap().push(MarketplaceOrder {
        order_id: "MP-200".to_string(),
        status: OrderStatus::Processing,
        line_items: vec![line_item("OFF1", 1, "3.00")],
        buyer: None,
        shipping_address: None,
        created_at: None,
    });

    let order_sync = OrderSynchronizer::new(mapper, inventory.clone(), marketplace.clone());
    assert_eq!(order_sync.poll_and_process().await.unwrap().successful, 1);

    // 模拟重启：同一目录下重新构建存储。去重集合随进程消失，
    // 但订单映射必须还在，发货回传依然能找到目标订单。
    let mapper = mapper_in(&dir, &[("P1", "OFF1")]).await;
    assert_eq!(mapper.internal_order_id("MP-200").as_deref(), Some("SO-1"));

    {
        let mut orders = marketplace.orders.lock().unwrap();
        orders[0].status = OrderStatus::Shipped;
    }
    let order_sync = OrderSynchronizer::new(mapper, inventory.clone(), marketplace);
    assert_eq!(order_sync.process_shipped().await.unwrap().successful, 1);
    assert_eq!(inventory.shipments.lock().unwrap()[0].order_id, "SO-1");
}
