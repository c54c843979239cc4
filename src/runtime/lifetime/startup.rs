use crate::config::get_config;
use crate::services::{AnalyticsService, ContentService, LocalObjectStore};
use crate::storage::{Storage, StorageFactory};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// 服务器运行所需的共享组件
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Storage,
    pub content_service: Arc<ContentService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub object_store: Arc<LocalObjectStore>,
}

impl StartupContext {
    /// 由已创建的存储装配服务（测试同样走这里）
    pub fn from_storage(storage: Storage, object_store: LocalObjectStore) -> Self {
        let config = get_config();
        let content_service = Arc::new(ContentService::new(storage.content.clone()));
        let analytics_service = Arc::new(
            AnalyticsService::new(storage.events.clone(), storage.content.clone())
                .with_recording(config.analytics.enabled),
        );

        Self {
            storage,
            content_service,
            analytics_service,
            object_store: Arc::new(object_store),
        }
    }
}

/// 准备服务器启动的上下文：存储、服务与对象目录
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.content.backend_name());

    let object_store = LocalObjectStore::from_config(&config.objects);
    tokio::fs::create_dir_all(object_store.root())
        .await
        .with_context(|| {
            format!(
                "Failed to create object storage directory {}",
                object_store.root().display()
            )
        })?;
    debug!("Object storage rooted at {}", object_store.root().display());

    if !config.analytics.enabled {
        info!("Server-side click recording is disabled");
    }

    let context = StartupContext::from_storage(storage, object_store);
    info!("Pre-startup completed in {:?}", start_time.elapsed());
    Ok(context)
}
