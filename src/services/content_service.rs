//! Content management service
//!
//! Validation and referential checks for themes, subsites and links,
//! shared by every HTTP handler that mutates the content tree.

use std::sync::Arc;

use tracing::info;

use super::icons::is_known_icon;
use super::theme_templates::{ThemeTemplate, theme_templates};
use crate::errors::{PortalError, Result};
use crate::storage::{
    ContentStore, IconRef, Link, LinkPatch, NewLink, NewSubsite, NewTheme, Subsite, SubsitePatch,
    Theme, ThemeColors, ThemePatch,
};
use crate::utils::validators::{
    is_valid_domain, normalize_optional_text, normalize_optional_url, require_non_empty,
    validate_url,
};

/// 对象存储内的图片路径前缀
const OBJECT_PATH_PREFIX: &str = "/objects/";

// ============ 校验辅助 ============

fn validate_colors(colors: &ThemeColors) -> Result<()> {
    for (slot, value) in colors.slots() {
        if value.trim().is_empty() {
            return Err(PortalError::validation(format!(
                "colors.{} cannot be empty",
                slot
            )));
        }
    }
    Ok(())
}

/// 图片地址：http(s) URL 或对象存储路径
fn validate_image_ref(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.starts_with(OBJECT_PATH_PREFIX) {
        return Ok(value.to_string());
    }
    validate_url(value).map_err(|e| PortalError::validation(format!("{}: {}", field, e)))?;
    Ok(value.to_string())
}

fn normalize_optional_image(field: &str, value: Option<String>) -> Result<Option<String>> {
    match normalize_optional_text(value) {
        Some(v) => validate_image_ref(field, &v).map(Some),
        None => Ok(None),
    }
}

fn validate_icon(icon: Option<IconRef>) -> Result<Option<IconRef>> {
    match icon {
        None => Ok(None),
        Some(IconRef::Symbol { name }) => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Ok(None);
            }
            if !is_known_icon(&name) {
                return Err(PortalError::validation(format!("Unknown icon: {}", name)));
            }
            Ok(Some(IconRef::Symbol { name }))
        }
        Some(IconRef::Image { url }) => {
            let url = validate_image_ref("icon.url", &url)?;
            Ok(Some(IconRef::Image { url }))
        }
    }
}

/// 链接地址必填，保留用户原文（仅去除首尾空白）
fn require_link_url(value: &str) -> Result<String> {
    validate_url(value).map_err(|e| PortalError::validation(format!("url: {}", e)))?;
    Ok(value.trim().to_string())
}

fn normalize_custom_domain(value: Option<String>) -> Result<Option<String>> {
    match normalize_optional_text(value) {
        None => Ok(None),
        Some(domain) => {
            let domain = domain.to_lowercase();
            if !is_valid_domain(&domain) {
                return Err(PortalError::validation(format!(
                    "customDomain is not a valid domain: {}",
                    domain
                )));
            }
            Ok(Some(domain))
        }
    }
}

// ============ ContentService ============

pub struct ContentService {
    store: Arc<dyn ContentStore>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    async fn require_subsite(&self, id: &str) -> Result<Subsite> {
        self.store
            .get_subsite(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Subsite not found: {}", id)))
    }

    /// 引用的父节点/所属子站点必须存在，否则视为输入错误
    async fn ensure_subsite_reference(&self, field: &str, id: &str) -> Result<()> {
        if self.store.get_subsite(id).await?.is_none() {
            return Err(PortalError::validation(format!(
                "{} refers to a missing subsite: {}",
                field, id
            )));
        }
        Ok(())
    }

    // ============ Themes ============

    pub async fn list_themes(&self) -> Result<Vec<Theme>> {
        self.store.list_themes().await
    }

    pub async fn get_theme(&self, id: &str) -> Result<Theme> {
        self.store
            .get_theme(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Theme not found: {}", id)))
    }

    pub fn templates(&self) -> Vec<ThemeTemplate> {
        theme_templates()
    }

    pub async fn create_theme(&self, new: NewTheme) -> Result<Theme> {
        let name = require_non_empty("name", &new.name)?;
        validate_colors(&new.colors)?;
        let logo_url = normalize_optional_image("logoUrl", new.logo_url)?;

        let theme = self
            .store
            .create_theme(NewTheme {
                name,
                colors: new.colors,
                logo_url,
            })
            .await?;
        info!("ContentService: created theme '{}' ({})", theme.name, theme.id);
        Ok(theme)
    }

    pub async fn update_theme(&self, id: &str, patch: ThemePatch) -> Result<Theme> {
        let name = patch
            .name
            .as_deref()
            .map(|n| require_non_empty("name", n))
            .transpose()?;
        if let Some(colors) = &patch.colors {
            validate_colors(colors)?;
        }
        let logo_url = match patch.logo_url {
            Some(value) => Some(normalize_optional_image("logoUrl", value)?),
            None => None,
        };

        let updated = self
            .store
            .update_theme(
                id,
                ThemePatch {
                    name,
                    colors: patch.colors,
                    logo_url,
                },
            )
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Theme not found: {}", id)))?;
        info!("ContentService: updated theme {}", id);
        Ok(updated)
    }

    pub async fn delete_theme(&self, id: &str) -> Result<bool> {
        let deleted = self.store.delete_theme(id).await?;
        if deleted {
            info!("ContentService: deleted theme {}", id);
        }
        Ok(deleted)
    }

    // ============ Subsites ============

    pub async fn list_subsites(&self) -> Result<Vec<Subsite>> {
        self.store.list_subsites().await
    }

    pub async fn get_subsite(&self, id: &str) -> Result<Subsite> {
        self.require_subsite(id).await
    }

    pub async fn child_subsites(&self, parent_id: &str) -> Result<Vec<Subsite>> {
        self.store.child_subsites(parent_id).await
    }

    pub async fn breadcrumb(&self, id: &str) -> Result<Vec<Subsite>> {
        self.store.breadcrumb_trail(id).await
    }

    pub async fn create_subsite(&self, new: NewSubsite) -> Result<Subsite> {
        let name = require_non_empty("name", &new.name)?;
        let parent_id = normalize_optional_text(new.parent_id);
        if let Some(parent_id) = &parent_id {
            self.ensure_subsite_reference("parentId", parent_id).await?;
        }

        let subsite = self
            .store
            .create_subsite(NewSubsite {
                name,
                description: normalize_optional_text(new.description),
                icon: validate_icon(new.icon)?,
                url: normalize_optional_url("url", new.url)?,
                custom_domain: normalize_custom_domain(new.custom_domain)?,
                parent_id,
                order: new.order,
            })
            .await?;
        info!(
            "ContentService: created subsite '{}' ({})",
            subsite.name, subsite.id
        );
        Ok(subsite)
    }

    pub async fn update_subsite(&self, id: &str, patch: SubsitePatch) -> Result<Subsite> {
        self.require_subsite(id).await?;

        let name = patch
            .name
            .as_deref()
            .map(|n| require_non_empty("name", n))
            .transpose()?;
        let url = match patch.url {
            Some(value) => Some(normalize_optional_url("url", value)?),
            None => None,
        };
        let custom_domain = match patch.custom_domain {
            Some(value) => Some(normalize_custom_domain(value)?),
            None => None,
        };
        let icon = match patch.icon {
            Some(value) => Some(validate_icon(value)?),
            None => None,
        };
        let parent_id = patch.parent_id.map(normalize_optional_text);

        if let Some(Some(parent_id)) = &parent_id {
            // 成环与深度由存储层在写入时校验
            self.ensure_subsite_reference("parentId", parent_id).await?;
        }

        let updated = self
            .store
            .update_subsite(
                id,
                SubsitePatch {
                    name,
                    description: patch.description.map(normalize_optional_text),
                    icon,
                    url,
                    custom_domain,
                    parent_id,
                    order: patch.order,
                },
            )
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Subsite not found: {}", id)))?;
        info!("ContentService: updated subsite {}", id);
        Ok(updated)
    }

    /// 级联删除该子站点的链接；下级子站点保留
    pub async fn delete_subsite(&self, id: &str) -> Result<bool> {
        let deleted = self.store.delete_subsite(id).await?;
        if deleted {
            info!("ContentService: deleted subsite {} and its links", id);
        }
        Ok(deleted)
    }

    pub async fn reorder_subsites(&self, ids: &[String]) -> Result<()> {
        self.store.reorder_subsites(ids).await?;
        info!("ContentService: reordered {} subsites", ids.len());
        Ok(())
    }

    // ============ Links ============

    pub async fn list_links(&self) -> Result<Vec<Link>> {
        self.store.list_links().await
    }

    pub async fn get_link(&self, id: &str) -> Result<Link> {
        self.store
            .get_link(id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Link not found: {}", id)))
    }

    pub async fn links_by_subsite(&self, subsite_id: &str) -> Result<Vec<Link>> {
        self.store.links_by_subsite(subsite_id).await
    }

    pub async fn create_link(&self, new: NewLink) -> Result<Link> {
        let subsite_id = require_non_empty("subsiteId", &new.subsite_id)?;
        let name = require_non_empty("name", &new.name)?;
        let url = require_link_url(&new.url)?;
        self.ensure_subsite_reference("subsiteId", &subsite_id)
            .await?;

        let link = self
            .store
            .create_link(NewLink {
                subsite_id,
                name,
                url,
                description: normalize_optional_text(new.description),
                icon: validate_icon(new.icon)?,
                order: new.order,
            })
            .await?;
        info!(
            "ContentService: created link '{}' ({}) in subsite {}",
            link.name, link.id, link.subsite_id
        );
        Ok(link)
    }

    pub async fn update_link(&self, id: &str, patch: LinkPatch) -> Result<Link> {
        if self.store.get_link(id).await?.is_none() {
            return Err(PortalError::not_found(format!("Link not found: {}", id)));
        }

        let name = patch
            .name
            .as_deref()
            .map(|n| require_non_empty("name", n))
            .transpose()?;
        let url = patch.url.as_deref().map(require_link_url).transpose()?;
        let subsite_id = patch
            .subsite_id
            .as_deref()
            .map(|s| require_non_empty("subsiteId", s))
            .transpose()?;
        if let Some(subsite_id) = &subsite_id {
            self.ensure_subsite_reference("subsiteId", subsite_id)
                .await?;
        }
        let icon = match patch.icon {
            Some(value) => Some(validate_icon(value)?),
            None => None,
        };

        let updated = self
            .store
            .update_link(
                id,
                LinkPatch {
                    subsite_id,
                    name,
                    url,
                    description: patch.description.map(normalize_optional_text),
                    icon,
                    order: patch.order,
                },
            )
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Link not found: {}", id)))?;
        info!("ContentService: updated link {}", id);
        Ok(updated)
    }

    pub async fn delete_link(&self, id: &str) -> Result<bool> {
        let deleted = self.store.delete_link(id).await?;
        if deleted {
            info!("ContentService: deleted link {}", id);
        }
        Ok(deleted)
    }

    pub async fn reorder_links(&self, subsite_id: &str, ids: &[String]) -> Result<()> {
        self.require_subsite(subsite_id).await?;
        self.store.reorder_links(subsite_id, ids).await?;
        info!(
            "ContentService: reordered {} links in subsite {}",
            ids.len(),
            subsite_id
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_icon() {
        assert_eq!(
            validate_icon(Some(IconRef::Symbol {
                name: " Home ".to_string()
            }))
            .unwrap(),
            Some(IconRef::Symbol {
                name: "Home".to_string()
            })
        );
        assert!(
            validate_icon(Some(IconRef::Symbol {
                name: "NotAnIcon".to_string()
            }))
            .is_err()
        );
        assert!(
            validate_icon(Some(IconRef::Image {
                url: "/objects/uploads/abc".to_string()
            }))
            .is_ok()
        );
        assert!(
            validate_icon(Some(IconRef::Image {
                url: "javascript:alert(1)".to_string()
            }))
            .is_err()
        );
    }

    #[test]
    fn test_custom_domain_is_lowercased() {
        assert_eq!(
            normalize_custom_domain(Some("Sales.Example.COM".to_string())).unwrap(),
            Some("sales.example.com".to_string())
        );
        assert_eq!(normalize_custom_domain(Some(" ".to_string())).unwrap(), None);
        assert!(normalize_custom_domain(Some("not a domain".to_string())).is_err());
    }

    #[test]
    fn test_validate_colors_rejects_blank_slot() {
        let mut colors = ThemeColors::default();
        assert!(validate_colors(&colors).is_ok());
        colors.text_secondary = " ".to_string();
        let err = validate_colors(&colors).unwrap_err();
        assert!(err.message().contains("textSecondary"));
    }
}
