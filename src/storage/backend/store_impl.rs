//! ContentStore / EventLog for SeaOrmStorage

use async_trait::async_trait;

use super::{SeaOrmStorage, connection};
use crate::errors::Result;
use crate::storage::models::{
    AnalyticsEvent, EventType, Link, LinkPatch, NewLink, NewSubsite, NewTheme, ResourceCount,
    ResourceType, Subsite, SubsitePatch, Theme, ThemePatch,
};
use crate::storage::{ContentStore, EventLog};

#[async_trait]
impl ContentStore for SeaOrmStorage {
    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    async fn ping(&self) -> Result<()> {
        connection::ping(&self.db).await
    }

    async fn list_themes(&self) -> Result<Vec<Theme>> {
        self.query_themes().await
    }

    async fn get_theme(&self, id: &str) -> Result<Option<Theme>> {
        self.query_theme(id).await
    }

    async fn create_theme(&self, new: NewTheme) -> Result<Theme> {
        self.insert_theme(new).await
    }

    async fn update_theme(&self, id: &str, patch: ThemePatch) -> Result<Option<Theme>> {
        self.patch_theme(id, patch).await
    }

    async fn delete_theme(&self, id: &str) -> Result<bool> {
        self.remove_theme(id).await
    }

    async fn list_subsites(&self) -> Result<Vec<Subsite>> {
        self.query_subsites(None).await
    }

    async fn get_subsite(&self, id: &str) -> Result<Option<Subsite>> {
        self.query_subsite(id).await
    }

    async fn child_subsites(&self, parent_id: &str) -> Result<Vec<Subsite>> {
        self.query_subsites(Some(parent_id)).await
    }

    async fn create_subsite(&self, new: NewSubsite) -> Result<Subsite> {
        self.insert_subsite(new).await
    }

    async fn update_subsite(&self, id: &str, patch: SubsitePatch) -> Result<Option<Subsite>> {
        self.patch_subsite(id, patch).await
    }

    async fn delete_subsite(&self, id: &str) -> Result<bool> {
        self.remove_subsite_cascade(id).await
    }

    async fn list_links(&self) -> Result<Vec<Link>> {
        self.query_links(None).await
    }

    async fn get_link(&self, id: &str) -> Result<Option<Link>> {
        self.query_link(id).await
    }

    async fn links_by_subsite(&self, subsite_id: &str) -> Result<Vec<Link>> {
        self.query_links(Some(subsite_id)).await
    }

    async fn create_link(&self, new: NewLink) -> Result<Link> {
        self.insert_link(new).await
    }

    async fn update_link(&self, id: &str, patch: LinkPatch) -> Result<Option<Link>> {
        self.patch_link(id, patch).await
    }

    async fn delete_link(&self, id: &str) -> Result<bool> {
        self.remove_link(id).await
    }

    async fn reorder_subsites(&self, ids: &[String]) -> Result<()> {
        self.reorder_subsites_txn(ids).await
    }

    async fn reorder_links(&self, subsite_id: &str, ids: &[String]) -> Result<()> {
        self.reorder_links_txn(subsite_id, ids).await
    }
}

#[async_trait]
impl EventLog for SeaOrmStorage {
    async fn append_event(
        &self,
        event_type: EventType,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<AnalyticsEvent> {
        self.insert_event(event_type, resource_type, resource_id)
            .await
    }

    async fn count_events(
        &self,
        event_type: Option<EventType>,
        resource_type: Option<ResourceType>,
    ) -> Result<u64> {
        self.count_matching_events(event_type, resource_type).await
    }

    async fn top_resources(
        &self,
        event_type: EventType,
        resource_type: ResourceType,
        limit: u64,
    ) -> Result<Vec<ResourceCount>> {
        self.group_top_resources(event_type, resource_type, limit)
            .await
    }

    async fn recent_events(&self, limit: u64) -> Result<Vec<AnalyticsEvent>> {
        self.latest_events(limit).await
    }
}
