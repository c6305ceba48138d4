use std::sync::Arc;

use shared::models::{Role, StaffCreate};

use crate::analytics::ReportService;
use crate::auth::JwtService;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::repository::{
    AddOnRepository, AnalyticsRepository, CategoryRepository, MenuItemRepository,
    SettingsRepository, StaffRepository,
};
use crate::message::{BroadcastPort, RoomBus};
use crate::orders::OrdersManager;
use crate::services::{ImageStore, LocalImageStore, MenuLedger};

/// 服务器状态 - 持有所有服务的共享引用
///
/// ServerState 是 POS 节点的核心状态容器，通过 Clone 在所有 HTTP 处理器和
/// WebSocket 会话间共享。所有字段都是浅拷贝 (Arc / redb 句柄)。
///
/// # 组件说明
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 进程配置 (不可变) |
/// | db | DbService | redb 数据库句柄 |
/// | jwt_service | `Arc<JwtService>` | JWT 签发/校验 |
/// | staff / categories / add_ons / menu_items / settings / analytics | Repository | 实体存取 |
/// | ledger | MenuLedger | 库存与可用性 |
/// | bus | RoomBus | 房间广播 |
/// | orders | `Arc<OrdersManager>` | 订单生命周期引擎 |
/// | reports | ReportService | 报表 |
/// | images | `Arc<dyn ImageStore>` | 图片存储 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub jwt_service: Arc<JwtService>,
    pub staff: StaffRepository,
    pub categories: CategoryRepository,
    pub add_ons: AddOnRepository,
    pub menu_items: MenuItemRepository,
    pub settings: SettingsRepository,
    pub analytics: AnalyticsRepository,
    pub ledger: MenuLedger,
    pub bus: RoomBus,
    pub orders: Arc<OrdersManager>,
    pub reports: ReportService,
    pub images: Arc<dyn ImageStore>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("db", &self.db)
            .field("connections", &self.bus.connection_count())
            .finish()
    }
}

impl ServerState {
    /// 在已打开的数据库上组装所有服务
    pub fn with_database(config: Config, db: DbService) -> Self {
        let bus = RoomBus::new(config.event_channel_capacity);
        let port: Arc<dyn BroadcastPort> = Arc::new(bus.clone());
        let tz = config.timezone;

        Self {
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            staff: StaffRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            add_ons: AddOnRepository::new(db.clone()),
            menu_items: MenuItemRepository::new(db.clone()),
            settings: SettingsRepository::new(db.clone()),
            analytics: AnalyticsRepository::new(db.clone()),
            ledger: MenuLedger::new(db.clone()),
            orders: Arc::new(OrdersManager::new(db.clone(), port, tz)),
            reports: ReportService::new(db.clone(), tz),
            images: Arc::new(LocalImageStore::new(
                config.images_dir(),
                config.upload_max_bytes,
            )),
            bus,
            db,
            config,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录结构 (database / uploads/images / logs)
    /// 2. 打开 redb 数据库 (`work_dir/database/pos.redb`)
    /// 3. 组装服务
    /// 4. 员工表为空时创建初始店主账号
    pub fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db = DbService::open(config.database_path())?;
        let state = Self::with_database(config.clone(), db);

        state.seed_owner()?;
        state
            .settings
            .get_or_create()
            .map_err(|e| ServerError::Config(format!("Failed to load settings: {}", e)))?;

        Ok(state)
    }

    /// 首次启动时创建店主账号
    fn seed_owner(&self) -> Result<()> {
        let count = self
            .staff
            .count()
            .map_err(|e| ServerError::Config(format!("Failed to count staff: {}", e)))?;
        if count > 0 {
            return Ok(());
        }

        let owner = self
            .staff
            .create(StaffCreate {
                full_name: "Owner".to_string(),
                username: self.config.seed_owner_username.clone(),
                pin: self.config.seed_owner_pin.clone(),
                role: Role::Owner,
            })
            .map_err(|e| ServerError::Config(format!("Failed to seed owner account: {}", e)))?;

        tracing::warn!(
            username = %owner.username,
            "No staff found, created initial owner account. Change its PIN after first login"
        );
        Ok(())
    }
}
