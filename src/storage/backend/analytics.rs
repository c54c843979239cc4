//! Analytics 事件日志的数据库读写
//!
//! 事件只追加；统计通过 COUNT / GROUP BY 在数据库侧完成。

use chrono::Utc;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};
use tracing::{trace, warn};
use uuid::Uuid;

use super::converters::{event_to_active_model, model_to_event};
use super::{SeaOrmStorage, retry};
use crate::errors::{PortalError, Result};
use crate::storage::models::{AnalyticsEvent, EventType, ResourceCount, ResourceType};

use migration::entities::analytics_event;

/// top-N 分组查询结果行
#[derive(Debug, FromQueryResult)]
struct ResourceCountRow {
    resource_id: String,
    count: i64,
}

impl SeaOrmStorage {
    pub(super) async fn insert_event(
        &self,
        event_type: EventType,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<AnalyticsEvent> {
        let event = AnalyticsEvent {
            id: Uuid::new_v4().to_string(),
            event_type,
            resource_type,
            resource_id: resource_id.to_string(),
            timestamp: Utc::now(),
        };
        let active = event_to_active_model(&event);
        let db = &self.db;

        retry::with_retry("append_event", self.retry_config, || {
            let active = active.clone();
            async move { analytics_event::Entity::insert(active).exec(db).await }
        })
        .await
        .map_err(|e| PortalError::database_operation(format!("Failed to record event: {}", e)))?;

        trace!(
            "Recorded {} event for {} {}",
            event_type.as_ref(),
            resource_type.as_ref(),
            resource_id
        );
        Ok(event)
    }

    pub(super) async fn count_matching_events(
        &self,
        event_type: Option<EventType>,
        resource_type: Option<ResourceType>,
    ) -> Result<u64> {
        let mut select = analytics_event::Entity::find();
        if let Some(event_type) = event_type {
            select = select.filter(analytics_event::Column::EventType.eq(event_type.as_ref()));
        }
        if let Some(resource_type) = resource_type {
            select =
                select.filter(analytics_event::Column::ResourceType.eq(resource_type.as_ref()));
        }

        select
            .count(&self.db)
            .await
            .map_err(|e| PortalError::database_operation(format!("Failed to count events: {}", e)))
    }

    pub(super) async fn group_top_resources(
        &self,
        event_type: EventType,
        resource_type: ResourceType,
        limit: u64,
    ) -> Result<Vec<ResourceCount>> {
        let rows = analytics_event::Entity::find()
            .select_only()
            .column(analytics_event::Column::ResourceId)
            .column_as(analytics_event::Column::Id.count(), "count")
            .filter(analytics_event::Column::EventType.eq(event_type.as_ref()))
            .filter(analytics_event::Column::ResourceType.eq(resource_type.as_ref()))
            .group_by(analytics_event::Column::ResourceId)
            .order_by_desc(Expr::cust("count"))
            .order_by_asc(analytics_event::Column::ResourceId)
            .limit(limit)
            .into_model::<ResourceCountRow>()
            .all(&self.db)
            .await
            .map_err(|e| {
                PortalError::database_operation(format!("Failed to aggregate events: {}", e))
            })?;

        Ok(rows
            .into_iter()
            .map(|row| ResourceCount {
                resource_id: row.resource_id,
                count: row.count.max(0) as u64,
            })
            .collect())
    }

    pub(super) async fn latest_events(&self, limit: u64) -> Result<Vec<AnalyticsEvent>> {
        let models = analytics_event::Entity::find()
            .order_by_desc(analytics_event::Column::Timestamp)
            .order_by_desc(analytics_event::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| {
                PortalError::database_operation(format!("Failed to load recent events: {}", e))
            })?;

        Ok(models
            .into_iter()
            .filter_map(|model| {
                let id = model.id.clone();
                let event = model_to_event(model);
                if event.is_none() {
                    warn!("Skipping analytics event {} with unknown type", id);
                }
                event
            })
            .collect())
    }
}
