//! 健康检查
//!
//! 直接探测存储，不经过 ContentService。

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, trace};
use ts_rs::TS;

use crate::storage::ContentStore;
use crate::storage::models::TS_EXPORT_PATH;

/// 存储探测超时
const STORAGE_PING_TIMEOUT: Duration = Duration::from_secs(5);

// 应用启动时间
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: DateTime<Utc>,
}

impl AppStartTime {
    pub fn now() -> Self {
        Self {
            start_datetime: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct StorageCheck {
    pub status: String,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct HealthReport {
    pub status: String,
    pub timestamp: String,
    pub uptime: u64,
    pub storage: StorageCheck,
    pub response_time_ms: u64,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

pub async fn check_health(store: &Arc<dyn ContentStore>, started: &AppStartTime) -> HealthReport {
    let ping_start = Instant::now();
    let backend = store.backend_name().to_string();

    let storage = match tokio::time::timeout(STORAGE_PING_TIMEOUT, store.ping()).await {
        Ok(Ok(())) => {
            trace!("Storage health check passed ({})", backend);
            StorageCheck {
                status: "healthy".to_string(),
                backend,
                error: None,
            }
        }
        Ok(Err(e)) => {
            error!("Storage health check failed: {}", e);
            StorageCheck {
                status: "unhealthy".to_string(),
                backend,
                error: Some(format!("database error: {}", e)),
            }
        }
        Err(_) => {
            error!("Storage health check timeout");
            StorageCheck {
                status: "unhealthy".to_string(),
                backend,
                error: Some("timeout".to_string()),
            }
        }
    };

    let now = Utc::now();
    HealthReport {
        status: storage.status.clone(),
        timestamp: now.to_rfc3339(),
        uptime: (now - started.start_datetime).num_seconds().max(0) as u64,
        storage,
        response_time_ms: ping_start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_memory_store_is_healthy() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
        let report = check_health(&store, &AppStartTime::now()).await;
        assert!(report.is_healthy());
        assert_eq!(report.storage.backend, "memory");
        assert!(report.storage.error.is_none());
    }
}
