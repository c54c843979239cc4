//! Query operations for SeaOrmStorage
//!
//! Read-only access to themes, subsites and links. Ordered listings sort by
//! `sort_order` and then by `id` so that ties come back in a stable order.

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use super::converters::{model_to_link, model_to_subsite, model_to_theme};
use super::{SeaOrmStorage, retry};
use crate::errors::{PortalError, Result};
use crate::storage::models::{Link, Subsite, Theme};

use migration::entities::{link, subsite, theme};

impl SeaOrmStorage {
    pub(super) async fn query_themes(&self) -> Result<Vec<Theme>> {
        let db = &self.db;
        let models = retry::with_retry("list_themes", self.retry_config, || async {
            theme::Entity::find()
                .order_by_asc(theme::Column::Name)
                .all(db)
                .await
        })
        .await
        .map_err(|e| PortalError::database_operation(format!("Failed to list themes: {}", e)))?;

        Ok(models.into_iter().map(model_to_theme).collect())
    }

    pub(super) async fn query_theme(&self, id: &str) -> Result<Option<Theme>> {
        let db = &self.db;
        let model = retry::with_retry(&format!("get_theme({})", id), self.retry_config, || async {
            theme::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| PortalError::database_operation(format!("Failed to load theme: {}", e)))?;

        Ok(model.map(model_to_theme))
    }

    pub(super) async fn query_subsites(&self, parent_id: Option<&str>) -> Result<Vec<Subsite>> {
        let db = &self.db;
        let models = retry::with_retry("list_subsites", self.retry_config, || async {
            let mut select = subsite::Entity::find();
            if let Some(parent_id) = parent_id {
                select = select.filter(subsite::Column::ParentId.eq(parent_id));
            }
            select
                .order_by_asc(subsite::Column::SortOrder)
                .order_by_asc(subsite::Column::Id)
                .all(db)
                .await
        })
        .await
        .map_err(|e| PortalError::database_operation(format!("Failed to list subsites: {}", e)))?;

        Ok(models.into_iter().map(model_to_subsite).collect())
    }

    pub(super) async fn query_subsite(&self, id: &str) -> Result<Option<Subsite>> {
        let db = &self.db;
        let model =
            retry::with_retry(&format!("get_subsite({})", id), self.retry_config, || async {
                subsite::Entity::find_by_id(id).one(db).await
            })
            .await
            .map_err(|e| {
                PortalError::database_operation(format!("Failed to load subsite: {}", e))
            })?;

        Ok(model.map(model_to_subsite))
    }

    pub(super) async fn query_links(&self, subsite_id: Option<&str>) -> Result<Vec<Link>> {
        let db = &self.db;
        let models = retry::with_retry("list_links", self.retry_config, || async {
            let mut select = link::Entity::find();
            if let Some(subsite_id) = subsite_id {
                select = select.filter(link::Column::SubsiteId.eq(subsite_id));
            }
            select
                .order_by_asc(link::Column::SortOrder)
                .order_by_asc(link::Column::Id)
                .all(db)
                .await
        })
        .await
        .map_err(|e| PortalError::database_operation(format!("Failed to list links: {}", e)))?;

        Ok(models.into_iter().map(model_to_link).collect())
    }

    pub(super) async fn query_link(&self, id: &str) -> Result<Option<Link>> {
        let db = &self.db;
        let model = retry::with_retry(&format!("get_link({})", id), self.retry_config, || async {
            link::Entity::find_by_id(id).one(db).await
        })
        .await
        .map_err(|e| PortalError::database_operation(format!("Failed to load link: {}", e)))?;

        Ok(model.map(model_to_link))
    }
}
