//! Analytics service layer
//!
//! 事件写入与聚合查询。客户端通过 `track` 显式上报；服务端调用点（链接跳转）
//! 使用 `record`，失败只记日志不影响响应。

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::errors::Result;
use crate::storage::models::TS_EXPORT_PATH;
use crate::storage::{AnalyticsEvent, ContentStore, EventLog, EventType, ResourceType};

/// 排行榜默认条数
pub const DEFAULT_TOP_LIMIT: u64 = 5;
/// 最近活动默认条数
pub const DEFAULT_RECENT_LIMIT: u64 = 10;
/// 查询条数上限
pub const MAX_QUERY_LIMIT: u64 = 100;

pub const DELETED_SUBSITE_NAME: &str = "Deleted subsite";
pub const DELETED_LINK_NAME: &str = "Deleted link";

/// 把可选的 limit 限制在 1..=MAX_QUERY_LIMIT
pub fn clamp_limit(limit: Option<u64>, default: u64) -> u64 {
    limit.unwrap_or(default).clamp(1, MAX_QUERY_LIMIT)
}

// ============ 公共类型定义 ============

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventRequest {
    pub event_type: EventType,
    pub resource_type: ResourceType,
    pub resource_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub subsite_views: u64,
    pub link_clicks: u64,
    pub total_events: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TopSubsite {
    pub id: String,
    pub name: String,
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct TopLink {
    pub id: String,
    pub name: String,
    pub clicks: u64,
}

// ============ AnalyticsService ============

/// Analytics 服务
pub struct AnalyticsService {
    events: Arc<dyn EventLog>,
    content: Arc<dyn ContentStore>,
    record_enabled: bool,
}

impl AnalyticsService {
    pub fn new(events: Arc<dyn EventLog>, content: Arc<dyn ContentStore>) -> Self {
        Self {
            events,
            content,
            record_enabled: true,
        }
    }

    /// 关闭服务端自动记录（`analytics.enabled = false`）
    pub fn with_recording(mut self, enabled: bool) -> Self {
        self.record_enabled = enabled;
        self
    }

    /// 追加一条事件，每次调用写入一行
    pub async fn track(&self, req: TrackEventRequest) -> Result<AnalyticsEvent> {
        let resource_id = crate::utils::validators::require_non_empty("resourceId", &req.resource_id)?;
        let event = self
            .events
            .append_event(req.event_type, req.resource_type, &resource_id)
            .await?;
        debug!(
            "Tracked {} on {} {}",
            event.event_type.as_ref(),
            event.resource_type.as_ref(),
            event.resource_id
        );
        Ok(event)
    }

    /// 后台写入，不等待结果
    pub fn record(&self, event_type: EventType, resource_type: ResourceType, resource_id: &str) {
        if !self.record_enabled {
            return;
        }

        let events = Arc::clone(&self.events);
        let resource_id = resource_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = events
                .append_event(event_type, resource_type, &resource_id)
                .await
            {
                warn!(
                    "Failed to record {} event for {} {}: {}",
                    event_type.as_ref(),
                    resource_type.as_ref(),
                    resource_id,
                    e
                );
            }
        });
    }

    pub async fn summary(&self) -> Result<AnalyticsSummary> {
        let subsite_views = self
            .events
            .count_events(Some(EventType::View), Some(ResourceType::Subsite))
            .await?;
        let link_clicks = self
            .events
            .count_events(Some(EventType::Click), Some(ResourceType::Link))
            .await?;
        let total_events = self.events.count_events(None, None).await?;

        Ok(AnalyticsSummary {
            subsite_views,
            link_clicks,
            total_events,
        })
    }

    pub async fn top_subsites(&self, limit: Option<u64>) -> Result<Vec<TopSubsite>> {
        let limit = clamp_limit(limit, DEFAULT_TOP_LIMIT);
        let counts = self
            .events
            .top_resources(EventType::View, ResourceType::Subsite, limit)
            .await?;

        let mut result = Vec::with_capacity(counts.len());
        for item in counts {
            let name = self
                .content
                .get_subsite(&item.resource_id)
                .await?
                .map(|s| s.name)
                .unwrap_or_else(|| DELETED_SUBSITE_NAME.to_string());
            result.push(TopSubsite {
                id: item.resource_id,
                name,
                views: item.count,
            });
        }
        Ok(result)
    }

    pub async fn top_links(&self, limit: Option<u64>) -> Result<Vec<TopLink>> {
        let limit = clamp_limit(limit, DEFAULT_TOP_LIMIT);
        let counts = self
            .events
            .top_resources(EventType::Click, ResourceType::Link, limit)
            .await?;

        let mut result = Vec::with_capacity(counts.len());
        for item in counts {
            let name = self
                .content
                .get_link(&item.resource_id)
                .await?
                .map(|l| l.name)
                .unwrap_or_else(|| DELETED_LINK_NAME.to_string());
            result.push(TopLink {
                id: item.resource_id,
                name,
                clicks: item.count,
            });
        }
        Ok(result)
    }

    pub async fn recent_activity(&self, limit: Option<u64>) -> Result<Vec<AnalyticsEvent>> {
        self.events
            .recent_events(clamp_limit(limit, DEFAULT_RECENT_LIMIT))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None, DEFAULT_TOP_LIMIT), 5);
        assert_eq!(clamp_limit(None, DEFAULT_RECENT_LIMIT), 10);
        assert_eq!(clamp_limit(Some(0), DEFAULT_TOP_LIMIT), 1);
        assert_eq!(clamp_limit(Some(500), DEFAULT_TOP_LIMIT), 100);
        assert_eq!(clamp_limit(Some(7), DEFAULT_TOP_LIMIT), 7);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = AnalyticsSummary {
            subsite_views: 1,
            link_clicks: 2,
            total_events: 3,
        };
        assert_eq!(
            serde_json::to_value(summary).unwrap(),
            serde_json::json!({"subsiteViews": 1, "linkClicks": 2, "totalEvents": 3})
        );
    }
}
