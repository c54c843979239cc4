//! Mutation operations for SeaOrmStorage
//!
//! Write operations. Cascade delete and batch reorder run inside a
//! transaction so a failure leaves no partial state behind.

use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::SeaOrmStorage;
use super::converters::{
    link_to_active_model, model_to_subsite, order_only_link, order_only_subsite,
    subsite_to_active_model, theme_to_active_model,
};
use super::retry;
use crate::errors::{PortalError, Result};
use crate::storage::models::{
    Link, LinkPatch, NewLink, NewSubsite, NewTheme, Subsite, SubsitePatch, Theme, ThemePatch,
};
use crate::storage::tree::{ParentMap, check_placement};
use migration::entities::{link, subsite, theme};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn db_error(action: &str) -> impl Fn(sea_orm::DbErr) -> PortalError + '_ {
    move |e| PortalError::database_operation(format!("{}: {}", action, e))
}

/// 检查重排列表无重复
fn ensure_unique(ids: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id.as_str()) {
            return Err(PortalError::validation(format!(
                "Duplicate id in reorder request: {}",
                id
            )));
        }
    }
    Ok(())
}

async fn rollback_with<T>(txn: DatabaseTransaction, err: PortalError) -> Result<T> {
    txn.rollback()
        .await
        .map_err(db_error("Failed to roll back transaction"))?;
    Err(err)
}

/// 在事务内读取整棵层级的父子关系
///
/// 非 SQLite 后端对读到的行加排他锁，并发的层级写入因此串行；SQLite 的写事务
/// 本身互斥，快照过期的一方提交时会失败，不会写出环。
async fn load_parent_map(txn: &DatabaseTransaction) -> Result<ParentMap> {
    let mut select = subsite::Entity::find()
        .select_only()
        .column(subsite::Column::Id)
        .column(subsite::Column::ParentId);
    if txn.get_database_backend() != DbBackend::Sqlite {
        select = select.lock_exclusive();
    }

    let rows: Vec<(String, Option<String>)> = select
        .into_tuple()
        .all(txn)
        .await
        .map_err(db_error("Failed to load subsite hierarchy"))?;
    Ok(rows.into_iter().collect())
}

impl SeaOrmStorage {
    async fn begin_txn(&self) -> Result<DatabaseTransaction> {
        self.db
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))
    }

    // ---------- themes ----------

    pub(super) async fn insert_theme(&self, new: NewTheme) -> Result<Theme> {
        let theme = Theme {
            id: new_id(),
            name: new.name,
            colors: new.colors,
            logo_url: new.logo_url,
        };
        let active = theme_to_active_model(&theme)?;
        let db = &self.db;

        retry::with_retry("create_theme", self.retry_config, || {
            let active = active.clone();
            async move { theme::Entity::insert(active).exec(db).await }
        })
        .await
        .map_err(db_error("Failed to create theme"))?;

        info!("Theme created: {}", theme.id);
        Ok(theme)
    }

    pub(super) async fn patch_theme(&self, id: &str, patch: ThemePatch) -> Result<Option<Theme>> {
        let Some(mut theme) = self.query_theme(id).await? else {
            return Ok(None);
        };
        theme.apply(patch);

        let active = theme_to_active_model(&theme)?;
        active
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update theme"))?;

        info!("Theme updated: {}", id);
        Ok(Some(theme))
    }

    pub(super) async fn remove_theme(&self, id: &str) -> Result<bool> {
        let db = &self.db;
        let result = retry::with_retry(&format!("delete_theme({})", id), self.retry_config, || async {
            theme::Entity::delete_by_id(id).exec(db).await
        })
        .await
        .map_err(db_error("Failed to delete theme"))?;

        Ok(result.rows_affected > 0)
    }

    // ---------- subsites ----------

    pub(super) async fn insert_subsite(&self, new: NewSubsite) -> Result<Subsite> {
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
        let active = subsite_to_active_model(&subsite);

        if let Some(parent_id) = &subsite.parent_id {
            // 挂到父节点下：层级校验与插入在同一事务
            let txn = self.begin_txn().await?;
            let parents = load_parent_map(&txn).await?;
            if let Err(e) = check_placement(&parents, None, parent_id) {
                return rollback_with(txn, e).await;
            }
            subsite::Entity::insert(active)
                .exec(&txn)
                .await
                .map_err(db_error("Failed to create subsite"))?;
            txn.commit()
                .await
                .map_err(db_error("Failed to commit transaction"))?;
        } else {
            let db = &self.db;
            retry::with_retry("create_subsite", self.retry_config, || {
                let active = active.clone();
                async move { subsite::Entity::insert(active).exec(db).await }
            })
            .await
            .map_err(db_error("Failed to create subsite"))?;
        }

        info!("Subsite created: {}", subsite.id);
        Ok(subsite)
    }

    pub(super) async fn patch_subsite(
        &self,
        id: &str,
        patch: SubsitePatch,
    ) -> Result<Option<Subsite>> {
        if let Some(Some(parent_id)) = patch.parent_id.clone() {
            return self.reparent_subsite(id, &parent_id, patch).await;
        }

        let Some(mut subsite) = self.query_subsite(id).await? else {
            return Ok(None);
        };
        subsite.apply(patch);

        subsite_to_active_model(&subsite)
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update subsite"))?;

        info!("Subsite updated: {}", id);
        Ok(Some(subsite))
    }

    /// 修改父节点：重新读取层级、校验并写入，全部在一个事务内
    async fn reparent_subsite(
        &self,
        id: &str,
        parent_id: &str,
        patch: SubsitePatch,
    ) -> Result<Option<Subsite>> {
        let txn = self.begin_txn().await?;

        let Some(model) = subsite::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(db_error("Failed to load subsite"))?
        else {
            txn.rollback()
                .await
                .map_err(db_error("Failed to roll back transaction"))?;
            return Ok(None);
        };

        let parents = load_parent_map(&txn).await?;
        if let Err(e) = check_placement(&parents, Some(id), parent_id) {
            return rollback_with(txn, e).await;
        }

        let mut subsite = model_to_subsite(model);
        subsite.apply(patch);
        subsite_to_active_model(&subsite)
            .update(&txn)
            .await
            .map_err(db_error("Failed to update subsite"))?;
        txn.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!("Subsite {} moved under {}", id, parent_id);
        Ok(Some(subsite))
    }

    /// 在同一事务中删除子站点的链接和子站点本身
    pub(super) async fn remove_subsite_cascade(&self, id: &str) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let links = link::Entity::delete_many()
            .filter(link::Column::SubsiteId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_error("Failed to delete subsite links"))?;

        let removed = subsite::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(db_error("Failed to delete subsite"))?;

        if removed.rows_affected == 0 {
            // 子站点不存在，但仍可能清理了孤立链接；回滚保持“无写入”
            txn.rollback()
                .await
                .map_err(db_error("Failed to roll back transaction"))?;
            return Ok(false);
        }

        txn.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!(
            "Subsite deleted: {} (with {} links)",
            id, links.rows_affected
        );
        Ok(true)
    }

    // ---------- links ----------

    pub(super) async fn insert_link(&self, new: NewLink) -> Result<Link> {
        let link = Link {
            id: new_id(),
            subsite_id: new.subsite_id,
            name: new.name,
            url: new.url,
            description: new.description,
            icon: new.icon,
            order: new.order,
        };
        let active = link_to_active_model(&link);
        let db = &self.db;

        retry::with_retry("create_link", self.retry_config, || {
            let active = active.clone();
            async move { link::Entity::insert(active).exec(db).await }
        })
        .await
        .map_err(db_error("Failed to create link"))?;

        info!("Link created: {}", link.id);
        Ok(link)
    }

    pub(super) async fn patch_link(&self, id: &str, patch: LinkPatch) -> Result<Option<Link>> {
        let Some(mut link) = self.query_link(id).await? else {
            return Ok(None);
        };
        link.apply(patch);

        link_to_active_model(&link)
            .update(&self.db)
            .await
            .map_err(db_error("Failed to update link"))?;

        info!("Link updated: {}", id);
        Ok(Some(link))
    }

    pub(super) async fn remove_link(&self, id: &str) -> Result<bool> {
        let db = &self.db;
        let result = retry::with_retry(&format!("delete_link({})", id), self.retry_config, || async {
            link::Entity::delete_by_id(id).exec(db).await
        })
        .await
        .map_err(db_error("Failed to delete link"))?;

        Ok(result.rows_affected > 0)
    }

    // ---------- ordering ----------

    pub(super) async fn reorder_subsites_txn(&self, ids: &[String]) -> Result<()> {
        ensure_unique(ids)?;
        if ids.is_empty() {
            return Ok(());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let found = subsite::Entity::find()
            .filter(subsite::Column::Id.is_in(ids.iter().cloned()))
            .count(&txn)
            .await
            .map_err(db_error("Failed to check subsites"))?;
        if found != ids.len() as u64 {
            return rollback_with(
                txn,
                PortalError::validation("Reorder request references unknown subsites"),
            )
            .await;
        }

        for (index, id) in ids.iter().enumerate() {
            order_only_subsite(id, index as i32)
                .update(&txn)
                .await
                .map_err(db_error("Failed to reorder subsites"))?;
        }

        txn.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!("Reordered {} subsites", ids.len());
        Ok(())
    }

    pub(super) async fn reorder_links_txn(&self, subsite_id: &str, ids: &[String]) -> Result<()> {
        ensure_unique(ids)?;
        if ids.is_empty() {
            return Ok(());
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let found = link::Entity::find()
            .filter(link::Column::Id.is_in(ids.iter().cloned()))
            .filter(link::Column::SubsiteId.eq(subsite_id))
            .count(&txn)
            .await
            .map_err(db_error("Failed to check links"))?;
        if found != ids.len() as u64 {
            return rollback_with(
                txn,
                PortalError::validation(format!(
                    "Reorder request references links outside subsite {}",
                    subsite_id
                )),
            )
            .await;
        }

        for (index, id) in ids.iter().enumerate() {
            order_only_link(id, index as i32)
                .update(&txn)
                .await
                .map_err(db_error("Failed to reorder links"))?;
        }

        txn.commit()
            .await
            .map_err(db_error("Failed to commit transaction"))?;

        info!("Reordered {} links of subsite {}", ids.len(), subsite_id);
        Ok(())
    }
}
