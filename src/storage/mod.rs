use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::errors::Result;

pub mod backend;
pub mod memory;
pub mod models;
pub mod tree;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStore;
pub use models::{
    AnalyticsEvent, EventType, IconRef, Link, LinkPatch, NewLink, NewSubsite, NewTheme,
    ResourceCount, ResourceType, Subsite, SubsitePatch, Theme, ThemeColors, ThemePatch,
};

/// 内容存储：主题、子站点、链接
///
/// `list_*` / `child_subsites` / `links_by_subsite` 按 `order` 升序返回。
/// `update_*` 在 id 不存在时返回 `Ok(None)` 且不写入；`delete_*` 返回是否删除。
#[async_trait]
pub trait ContentStore: Send + Sync {
    fn backend_name(&self) -> &str;

    /// 存储健康检查
    async fn ping(&self) -> Result<()>;

    async fn list_themes(&self) -> Result<Vec<Theme>>;
    async fn get_theme(&self, id: &str) -> Result<Option<Theme>>;
    async fn create_theme(&self, new: NewTheme) -> Result<Theme>;
    async fn update_theme(&self, id: &str, patch: ThemePatch) -> Result<Option<Theme>>;
    async fn delete_theme(&self, id: &str) -> Result<bool>;

    async fn list_subsites(&self) -> Result<Vec<Subsite>>;
    async fn get_subsite(&self, id: &str) -> Result<Option<Subsite>>;
    async fn child_subsites(&self, parent_id: &str) -> Result<Vec<Subsite>>;
    async fn create_subsite(&self, new: NewSubsite) -> Result<Subsite>;
    async fn update_subsite(&self, id: &str, patch: SubsitePatch) -> Result<Option<Subsite>>;
    /// 原子地删除子站点及其所有链接；子站点的下级保持原样（parent_id 悬空）
    async fn delete_subsite(&self, id: &str) -> Result<bool>;

    async fn list_links(&self) -> Result<Vec<Link>>;
    async fn get_link(&self, id: &str) -> Result<Option<Link>>;
    async fn links_by_subsite(&self, subsite_id: &str) -> Result<Vec<Link>>;
    async fn create_link(&self, new: NewLink) -> Result<Link>;
    async fn update_link(&self, id: &str, patch: LinkPatch) -> Result<Option<Link>>;
    async fn delete_link(&self, id: &str) -> Result<bool>;

    /// 批量重排：`order = 下标`，任一 id 不存在则整体失败
    async fn reorder_subsites(&self, ids: &[String]) -> Result<()>;
    /// 批量重排某个子站点下的链接，所有 id 必须属于该子站点
    async fn reorder_links(&self, subsite_id: &str, ids: &[String]) -> Result<()>;

    /// 面包屑：[根, ..., 自身]
    async fn breadcrumb_trail(&self, subsite_id: &str) -> Result<Vec<Subsite>> {
        tree::breadcrumb_trail(self, subsite_id).await
    }
}

/// 统计事件日志（只追加）
#[async_trait]
pub trait EventLog: Send + Sync {
    async fn append_event(
        &self,
        event_type: EventType,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<AnalyticsEvent>;

    /// 计数；过滤条件为 None 时不限制该维度
    async fn count_events(
        &self,
        event_type: Option<EventType>,
        resource_type: Option<ResourceType>,
    ) -> Result<u64>;

    /// 按 resource_id 分组计数，计数降序、id 升序
    async fn top_resources(
        &self,
        event_type: EventType,
        resource_type: ResourceType,
        limit: u64,
    ) -> Result<Vec<ResourceCount>>;

    /// 最近事件，时间降序
    async fn recent_events(&self, limit: u64) -> Result<Vec<AnalyticsEvent>>;
}

/// 同一个后端实例的两种视图
#[derive(Clone)]
pub struct Storage {
    pub content: Arc<dyn ContentStore>,
    pub events: Arc<dyn EventLog>,
}

impl Storage {
    pub fn from_backend<T>(backend: Arc<T>) -> Self
    where
        T: ContentStore + EventLog + 'static,
    {
        Self {
            content: backend.clone(),
            events: backend,
        }
    }

    /// 进程内存储（测试与 `memory://`）
    pub fn in_memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }
}

pub struct StorageFactory;

impl StorageFactory {
    /// 按配置中的 database_url 创建存储
    pub async fn create() -> Result<Storage> {
        let config = crate::config::get_config();
        Self::create_for_url(&config.database.database_url).await
    }

    pub async fn create_for_url(database_url: &str) -> Result<Storage> {
        if database_url.starts_with(memory::MEMORY_URL_SCHEME) {
            info!("Using in-memory storage; data will not be persisted");
            return Ok(Storage::in_memory());
        }

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = SeaOrmStorage::new(database_url, &backend_type).await?;
        Ok(Storage::from_backend(Arc::new(storage)))
    }
}
