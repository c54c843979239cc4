//! 进程内存储
//!
//! 每个实例独立持有数据，不做持久化。集合按插入顺序保存，
//! 排序使用稳定排序，因此 `order` 相同的元素保持插入顺序。

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::models::{
    AnalyticsEvent, EventType, Link, LinkPatch, NewLink, NewSubsite, NewTheme, ResourceCount,
    ResourceType, Subsite, SubsitePatch, Theme, ThemePatch,
};
use super::tree::{ParentMap, check_placement};
use super::{ContentStore, EventLog};
use crate::errors::{PortalError, Result};

pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Default)]
struct State {
    themes: Vec<Theme>,
    subsites: Vec<Subsite>,
    links: Vec<Link>,
    events: Vec<AnalyticsEvent>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn sorted_by_order<T: Clone>(items: impl Iterator<Item = T>, order: impl Fn(&T) -> i32) -> Vec<T> {
    let mut items: Vec<T> = items.collect();
    items.sort_by_key(|item| order(item));
    items
}

/// 校验重排列表：无重复，且每个 id 都满足 `exists`
fn check_reorder_ids(ids: &[String], exists: impl Fn(&str) -> bool) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(PortalError::validation(format!(
                "Duplicate id in reorder request: {}",
                id
            )));
        }
        if !exists(id) {
            return Err(PortalError::validation(format!(
                "Unknown id in reorder request: {}",
                id
            )));
        }
    }
    Ok(())
}

impl State {
    fn parent_map(&self) -> ParentMap {
        self.subsites
            .iter()
            .map(|s| (s.id.clone(), s.parent_id.clone()))
            .collect()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 跳过层级校验直接改写父节点，只用于构造损坏数据
    #[cfg(test)]
    pub(crate) fn set_parent_unchecked(&self, id: &str, parent_id: Option<&str>) {
        if let Some(subsite) = self.state.write().subsites.iter_mut().find(|s| s.id == id) {
            subsite.parent_id = parent_id.map(str::to_string);
        }
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    // ---------- themes ----------

    async fn list_themes(&self) -> Result<Vec<Theme>> {
        Ok(self.state.read().themes.clone())
    }

    async fn get_theme(&self, id: &str) -> Result<Option<Theme>> {
        Ok(self.state.read().themes.iter().find(|t| t.id == id).cloned())
    }

    async fn create_theme(&self, new: NewTheme) -> Result<Theme> {
        let theme = Theme {
            id: new_id(),
            name: new.name,
            colors: new.colors,
            logo_url: new.logo_url,
        };
        self.state.write().themes.push(theme.clone());
        Ok(theme)
    }

    async fn update_theme(&self, id: &str, patch: ThemePatch) -> Result<Option<Theme>> {
        let mut state = self.state.write();
        Ok(state.themes.iter_mut().find(|t| t.id == id).map(|theme| {
            theme.apply(patch);
            theme.clone()
        }))
    }

    async fn delete_theme(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write();
        let before = state.themes.len();
        state.themes.retain(|t| t.id != id);
        Ok(state.themes.len() != before)
    }

    // ---------- subsites ----------

    async fn list_subsites(&self) -> Result<Vec<Subsite>> {
        let state = self.state.read();
        Ok(sorted_by_order(state.subsites.iter().cloned(), |s| s.order))
    }

    async fn get_subsite(&self, id: &str) -> Result<Option<Subsite>> {
        Ok(self.state.read().subsites.iter().find(|s| s.id == id).cloned())
    }

    async fn child_subsites(&self, parent_id: &str) -> Result<Vec<Subsite>> {
        let state = self.state.read();
        Ok(sorted_by_order(
            state
                .subsites
                .iter()
                .filter(|s| s.parent_id.as_deref() == Some(parent_id))
                .cloned(),
            |s| s.order,
        ))
    }

    async fn create_subsite(&self, new: NewSubsite) -> Result<Subsite> {
        let subsite = Subsite {
            id: new_id(),
            name: new.name,
            description: new.description,
            icon: new.icon,
            url: new.url,
            custom_domain: new.custom_domain,
            parent_id: new.parent_id,
            order: new.order,
        };
        let mut state = self.state.write();
        if let Some(parent_id) = &subsite.parent_id {
            check_placement(&state.parent_map(), None, parent_id)?;
        }
        state.subsites.push(subsite.clone());
        Ok(subsite)
    }

    async fn update_subsite(&self, id: &str, patch: SubsitePatch) -> Result<Option<Subsite>> {
        let mut state = self.state.write();
        if !state.subsites.iter().any(|s| s.id == id) {
            return Ok(None);
        }
        if let Some(Some(parent_id)) = &patch.parent_id {
            check_placement(&state.parent_map(), Some(id), parent_id)?;
        }

        Ok(state.subsites.iter_mut().find(|s| s.id == id).map(|subsite| {
            subsite.apply(patch);
            subsite.clone()
        }))
    }

    async fn delete_subsite(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write();
        if !state.subsites.iter().any(|s| s.id == id) {
            return Ok(false);
        }

        let links_before = state.links.len();
        state.links.retain(|l| l.subsite_id != id);
        let removed_links = links_before - state.links.len();
        state.subsites.retain(|s| s.id != id);

        debug!(
            "MemoryStore: deleted subsite {} with {} links",
            id, removed_links
        );
        Ok(true)
    }

    // ---------- links ----------

    async fn list_links(&self) -> Result<Vec<Link>> {
        let state = self.state.read();
        Ok(sorted_by_order(state.links.iter().cloned(), |l| l.order))
    }

    async fn get_link(&self, id: &str) -> Result<Option<Link>> {
        Ok(self.state.read().links.iter().find(|l| l.id == id).cloned())
    }

    async fn links_by_subsite(&self, subsite_id: &str) -> Result<Vec<Link>> {
        let state = self.state.read();
        Ok(sorted_by_order(
            state
                .links
                .iter()
                .filter(|l| l.subsite_id == subsite_id)
                .cloned(),
            |l| l.order,
        ))
    }

    async fn create_link(&self, new: NewLink) -> Result<Link> {
        let link = Link {
            id: new_id(),
            subsite_id: new.subsite_id,
            name: new.name,
            url: new.url,
            description: new.description,
            icon: new.icon,
            order: new.order,
        };
        self.state.write().links.push(link.clone());
        Ok(link)
    }

    async fn update_link(&self, id: &str, patch: LinkPatch) -> Result<Option<Link>> {
        let mut state = self.state.write();
        Ok(state.links.iter_mut().find(|l| l.id == id).map(|link| {
            link.apply(patch);
            link.clone()
        }))
    }

    async fn delete_link(&self, id: &str) -> Result<bool> {
        let mut state = self.state.write();
        let before = state.links.len();
        state.links.retain(|l| l.id != id);
        Ok(state.links.len() != before)
    }

    // ---------- ordering ----------

    async fn reorder_subsites(&self, ids: &[String]) -> Result<()> {
        let mut state = self.state.write();
        check_reorder_ids(ids, |id| state.subsites.iter().any(|s| s.id == id))?;

        for (index, id) in ids.iter().enumerate() {
            if let Some(subsite) = state.subsites.iter_mut().find(|s| &s.id == id) {
                subsite.order = index as i32;
            }
        }
        info!("MemoryStore: reordered {} subsites", ids.len());
        Ok(())
    }

    async fn reorder_links(&self, subsite_id: &str, ids: &[String]) -> Result<()> {
        let mut state = self.state.write();
        check_reorder_ids(ids, |id| {
            state
                .links
                .iter()
                .any(|l| l.id == id && l.subsite_id == subsite_id)
        })?;

        for (index, id) in ids.iter().enumerate() {
            if let Some(link) = state.links.iter_mut().find(|l| &l.id == id) {
                link.order = index as i32;
            }
        }
        info!(
            "MemoryStore: reordered {} links of subsite {}",
            ids.len(),
            subsite_id
        );
        Ok(())
    }
}

#[async_trait]
impl EventLog for MemoryStore {
    async fn append_event(
        &self,
        event_type: EventType,
        resource_type: ResourceType,
        resource_id: &str,
    ) -> Result<AnalyticsEvent> {
        let event = AnalyticsEvent {
            id: new_id(),
            event_type,
            resource_type,
            resource_id: resource_id.to_string(),
            timestamp: Utc::now(),
        };
        self.state.write().events.push(event.clone());
        Ok(event)
    }

    async fn count_events(
        &self,
        event_type: Option<EventType>,
        resource_type: Option<ResourceType>,
    ) -> Result<u64> {
        let state = self.state.read();
        let count = state
            .events
            .iter()
            .filter(|e| event_type.is_none_or(|t| e.event_type == t))
            .filter(|e| resource_type.is_none_or(|t| e.resource_type == t))
            .count();
        Ok(count as u64)
    }

    async fn top_resources(
        &self,
        event_type: EventType,
        resource_type: ResourceType,
        limit: u64,
    ) -> Result<Vec<ResourceCount>> {
        let state = self.state.read();
        let mut counts: std::collections::HashMap<&str, u64> = std::collections::HashMap::new();
        for event in state
            .events
            .iter()
            .filter(|e| e.event_type == event_type && e.resource_type == resource_type)
        {
            *counts.entry(event.resource_id.as_str()).or_insert(0) += 1;
        }

        let mut rows: Vec<ResourceCount> = counts
            .into_iter()
            .map(|(resource_id, count)| ResourceCount {
                resource_id: resource_id.to_string(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.resource_id.cmp(&b.resource_id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn recent_events(&self, limit: u64) -> Result<Vec<AnalyticsEvent>> {
        let state = self.state.read();
        // 追加顺序即时间顺序，倒序取前 limit 条
        Ok(state
            .events
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
