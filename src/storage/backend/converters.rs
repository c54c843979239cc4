use sea_orm::ActiveValue::Set;
use tracing::warn;

use crate::storage::models::{
    AnalyticsEvent, EventType, IconRef, Link, ResourceType, Subsite, Theme, ThemeColors,
};
use migration::entities::{analytics_event, link, subsite, theme};

fn split_icon(icon: Option<&IconRef>) -> (Option<String>, Option<String>) {
    match icon {
        Some(icon) => (Some(icon.kind().to_string()), Some(icon.value().to_string())),
        None => (None, None),
    }
}

/// 将 theme Model 转换为 Theme
///
/// colors 列损坏时回退到默认调色板
pub fn model_to_theme(model: theme::Model) -> Theme {
    let colors = serde_json::from_str::<ThemeColors>(&model.colors).unwrap_or_else(|e| {
        warn!("Theme {} has unreadable colors ({}), using defaults", model.id, e);
        ThemeColors::default()
    });
    Theme {
        id: model.id,
        name: model.name,
        colors,
        logo_url: model.logo_url,
    }
}

/// 将 Theme 转换为 ActiveModel（用于插入/更新）
pub fn theme_to_active_model(theme: &Theme) -> crate::errors::Result<theme::ActiveModel> {
    Ok(theme::ActiveModel {
        id: Set(theme.id.clone()),
        name: Set(theme.name.clone()),
        colors: Set(serde_json::to_string(&theme.colors)?),
        logo_url: Set(theme.logo_url.clone()),
    })
}

pub fn model_to_subsite(model: subsite::Model) -> Subsite {
    Subsite {
        icon: IconRef::from_parts(model.icon_kind.as_deref(), model.icon_value),
        id: model.id,
        name: model.name,
        description: model.description,
        url: model.url,
        custom_domain: model.custom_domain,
        parent_id: model.parent_id,
        order: model.sort_order,
    }
}

pub fn subsite_to_active_model(subsite: &Subsite) -> subsite::ActiveModel {
    let (icon_kind, icon_value) = split_icon(subsite.icon.as_ref());
    subsite::ActiveModel {
        id: Set(subsite.id.clone()),
        name: Set(subsite.name.clone()),
        description: Set(subsite.description.clone()),
        icon_kind: Set(icon_kind),
        icon_value: Set(icon_value),
        url: Set(subsite.url.clone()),
        custom_domain: Set(subsite.custom_domain.clone()),
        parent_id: Set(subsite.parent_id.clone()),
        sort_order: Set(subsite.order),
    }
}

pub fn model_to_link(model: link::Model) -> Link {
    Link {
        icon: IconRef::from_parts(model.icon_kind.as_deref(), model.icon_value),
        id: model.id,
        subsite_id: model.subsite_id,
        name: model.name,
        url: model.url,
        description: model.description,
        order: model.sort_order,
    }
}

pub fn link_to_active_model(link: &Link) -> link::ActiveModel {
    let (icon_kind, icon_value) = split_icon(link.icon.as_ref());
    link::ActiveModel {
        id: Set(link.id.clone()),
        subsite_id: Set(link.subsite_id.clone()),
        name: Set(link.name.clone()),
        url: Set(link.url.clone()),
        description: Set(link.description.clone()),
        icon_kind: Set(icon_kind),
        icon_value: Set(icon_value),
        sort_order: Set(link.order),
    }
}

/// 只更新排序字段
pub fn order_only_subsite(id: &str, order: i32) -> subsite::ActiveModel {
    subsite::ActiveModel {
        id: Set(id.to_string()),
        sort_order: Set(order),
        ..Default::default()
    }
}

pub fn order_only_link(id: &str, order: i32) -> link::ActiveModel {
    link::ActiveModel {
        id: Set(id.to_string()),
        sort_order: Set(order),
        ..Default::default()
    }
}

/// 事件类型存储为小写字符串，无法识别的行返回 None
pub fn model_to_event(model: analytics_event::Model) -> Option<AnalyticsEvent> {
    let event_type = model.event_type.parse::<EventType>().ok()?;
    let resource_type = model.resource_type.parse::<ResourceType>().ok()?;
    Some(AnalyticsEvent {
        id: model.id,
        event_type,
        resource_type,
        resource_id: model.resource_id,
        timestamp: model.timestamp,
    })
}

pub fn event_to_active_model(event: &AnalyticsEvent) -> analytics_event::ActiveModel {
    analytics_event::ActiveModel {
        id: Set(event.id.clone()),
        event_type: Set(event.event_type.as_ref().to_string()),
        resource_type: Set(event.resource_type.as_ref().to_string()),
        resource_id: Set(event.resource_id.clone()),
        timestamp: Set(event.timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::ActiveValue;

    fn subsite_model() -> subsite::Model {
        subsite::Model {
            id: "s1".to_string(),
            name: "Sales".to_string(),
            description: Some("Sales portal".to_string()),
            icon_kind: Some("symbol".to_string()),
            icon_value: Some("Briefcase".to_string()),
            url: None,
            custom_domain: Some("sales.example.com".to_string()),
            parent_id: None,
            sort_order: 3,
        }
    }

    #[test]
    fn test_model_to_subsite_restores_icon() {
        let subsite = model_to_subsite(subsite_model());
        assert_eq!(subsite.order, 3);
        assert_eq!(
            subsite.icon,
            Some(IconRef::Symbol {
                name: "Briefcase".to_string()
            })
        );
    }

    #[test]
    fn test_legacy_icon_value_without_kind_is_classified() {
        let mut model = subsite_model();
        model.icon_kind = None;
        model.icon_value = Some("/objects/uploads/abc".to_string());
        let subsite = model_to_subsite(model);
        assert_eq!(subsite.icon.map(|i| i.kind()), Some("image"));
    }

    #[test]
    fn test_subsite_active_model_splits_icon() {
        let subsite = model_to_subsite(subsite_model());
        let active = subsite_to_active_model(&subsite);
        assert_eq!(active.icon_kind, ActiveValue::Set(Some("symbol".to_string())));
        assert_eq!(
            active.icon_value,
            ActiveValue::Set(Some("Briefcase".to_string()))
        );
        assert_eq!(active.sort_order, ActiveValue::Set(3));
    }

    #[test]
    fn test_order_only_link_leaves_other_columns() {
        let active = order_only_link("l1", 7);
        assert_eq!(active.sort_order, ActiveValue::Set(7));
        assert!(matches!(active.url, ActiveValue::NotSet));
        assert!(matches!(active.subsite_id, ActiveValue::NotSet));
    }

    #[test]
    fn test_theme_colors_roundtrip_through_text_column() {
        let theme = Theme {
            id: "t1".to_string(),
            name: "Corp".to_string(),
            colors: ThemeColors::default(),
            logo_url: None,
        };
        let active = theme_to_active_model(&theme).unwrap();
        let ActiveValue::Set(colors) = active.colors else {
            panic!("colors should be set");
        };
        assert!(colors.contains("\"textSecondary\""));

        let restored = model_to_theme(theme::Model {
            id: "t1".to_string(),
            name: "Corp".to_string(),
            colors,
            logo_url: None,
        });
        assert_eq!(restored, theme);
    }

    #[test]
    fn test_corrupt_colors_fall_back_to_default() {
        let theme = model_to_theme(theme::Model {
            id: "t1".to_string(),
            name: "Broken".to_string(),
            colors: "not json".to_string(),
            logo_url: None,
        });
        assert_eq!(theme.colors, ThemeColors::default());
    }

    #[test]
    fn test_event_roundtrip() {
        let model = analytics_event::Model {
            id: "e1".to_string(),
            event_type: "click".to_string(),
            resource_type: "link".to_string(),
            resource_id: "l1".to_string(),
            timestamp: Utc::now(),
        };
        let event = model_to_event(model.clone()).unwrap();
        assert_eq!(event.event_type, EventType::Click);
        let active = event_to_active_model(&event);
        assert_eq!(active.event_type, ActiveValue::Set("click".to_string()));

        let bogus = analytics_event::Model {
            event_type: "hover".to_string(),
            ..model
        };
        assert!(model_to_event(bogus).is_none());
    }
}
