//! 领域模型与请求载荷
//!
//! 所有对外 JSON 字段使用 camelCase。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, EnumString};
use ts_rs::TS;

/// TypeScript 类型输出路径
pub const TS_EXPORT_PATH: &str = "../client/src/types.generated.ts";

// ============ Theme ============

/// 主题调色板（固定 7 个颜色槽位）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct ThemeColors {
    pub primary: String,
    pub background: String,
    pub surface: String,
    pub accent: String,
    pub text: String,
    pub text_secondary: String,
    pub border: String,
}

impl ThemeColors {
    /// 按固定顺序遍历 (字段名, 值)
    pub fn slots(&self) -> [(&'static str, &str); 7] {
        [
            ("primary", self.primary.as_str()),
            ("background", self.background.as_str()),
            ("surface", self.surface.as_str()),
            ("accent", self.accent.as_str()),
            ("text", self.text.as_str()),
            ("textSecondary", self.text_secondary.as_str()),
            ("border", self.border.as_str()),
        ]
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: "#3b82f6".to_string(),
            background: "#0f172a".to_string(),
            surface: "#1e293b".to_string(),
            accent: "#8b5cf6".to_string(),
            text: "#f8fafc".to_string(),
            text_secondary: "#cbd5e1".to_string(),
            border: "#334155".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub colors: ThemeColors,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct NewTheme {
    pub name: String,
    pub colors: ThemeColors,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// 主题部分更新；`Some(None)` 表示显式清空
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemePatch {
    pub name: Option<String>,
    pub colors: Option<ThemeColors>,
    #[serde(default, deserialize_with = "double_option")]
    pub logo_url: Option<Option<String>>,
}

// ============ Icon ============

/// 图标引用：注册表中的符号图标，或图片地址
///
/// 写入时也接受旧式裸字符串，以 `http` 或 `/objects` 开头视为图片，其余视为符号。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IconRef {
    Symbol { name: String },
    Image { url: String },
}

impl IconRef {
    pub const KIND_SYMBOL: &'static str = "symbol";
    pub const KIND_IMAGE: &'static str = "image";

    /// 对旧式字符串做一次性分类
    pub fn classify(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http") || raw.starts_with("/objects") {
            IconRef::Image {
                url: raw.to_string(),
            }
        } else {
            IconRef::Symbol {
                name: raw.to_string(),
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            IconRef::Symbol { .. } => Self::KIND_SYMBOL,
            IconRef::Image { .. } => Self::KIND_IMAGE,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            IconRef::Symbol { name } => name,
            IconRef::Image { url } => url,
        }
    }

    /// 从存储列 (icon_kind, icon_value) 还原
    pub fn from_parts(kind: Option<&str>, value: Option<String>) -> Option<Self> {
        let value = value?;
        match kind {
            Some(Self::KIND_SYMBOL) => Some(IconRef::Symbol { name: value }),
            Some(Self::KIND_IMAGE) => Some(IconRef::Image { url: value }),
            _ => Some(IconRef::classify(&value)),
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum TaggedIcon {
    Symbol { name: String },
    Image { url: String },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IconInput {
    Tagged(TaggedIcon),
    Legacy(String),
}

impl<'de> Deserialize<'de> for IconRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match IconInput::deserialize(deserializer)? {
            IconInput::Tagged(TaggedIcon::Symbol { name }) => IconRef::Symbol { name },
            IconInput::Tagged(TaggedIcon::Image { url }) => IconRef::Image { url },
            IconInput::Legacy(raw) => IconRef::classify(&raw),
        })
    }
}

// ============ Subsite ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct Subsite {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub icon: Option<IconRef>,
    pub url: Option<String>,
    pub custom_domain: Option<String>,
    pub parent_id: Option<String>,
    pub order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct NewSubsite {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "iconUrl")]
    pub icon: Option<IconRef>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub custom_domain: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "coerce_order")]
    pub order: i32,
}

/// 子站点部分更新；可空字段用 `Option<Option<_>>` 区分“未提供”和“置空”
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsitePatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, alias = "iconUrl", deserialize_with = "double_option")]
    pub icon: Option<Option<IconRef>>,
    #[serde(default, deserialize_with = "double_option")]
    pub url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub custom_domain: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "coerce_optional_order")]
    pub order: Option<i32>,
}

impl Subsite {
    /// 合并部分更新，保留 id
    pub fn apply(&mut self, patch: SubsitePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(custom_domain) = patch.custom_domain {
            self.custom_domain = custom_domain;
        }
        if let Some(parent_id) = patch.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }
}

// ============ Link ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,
    pub subsite_id: String,
    pub name: String,
    pub url: String,
    pub description: Option<String>,
    pub icon: Option<IconRef>,
    pub order: i32,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct NewLink {
    pub subsite_id: String,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "iconUrl")]
    pub icon: Option<IconRef>,
    #[serde(default, deserialize_with = "coerce_order")]
    pub order: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPatch {
    pub subsite_id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, alias = "iconUrl", deserialize_with = "double_option")]
    pub icon: Option<Option<IconRef>>,
    #[serde(default, deserialize_with = "coerce_optional_order")]
    pub order: Option<i32>,
}

impl Link {
    /// 合并部分更新，保留 id
    pub fn apply(&mut self, patch: LinkPatch) {
        if let Some(subsite_id) = patch.subsite_id {
            self.subsite_id = subsite_id;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(order) = patch.order {
            self.order = order;
        }
    }
}

impl Theme {
    pub fn apply(&mut self, patch: ThemePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(colors) = patch.colors {
            self.colors = colors;
        }
        if let Some(logo_url) = patch.logo_url {
            self.logo_url = logo_url;
        }
    }
}

// ============ Analytics ============

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, AsRefStr, EnumString,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventType {
    View,
    Click,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, AsRefStr, EnumString,
)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ResourceType {
    Subsite,
    Link,
}

/// 一条不可变的浏览/点击记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: String,
    pub event_type: EventType,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub timestamp: DateTime<Utc>,
}

/// 按资源分组的计数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCount {
    pub resource_id: String,
    pub count: u64,
}

// ============ serde helpers ============

/// 区分字段缺失（None）与显式 null（Some(None)）
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OrderInput {
    Int(i64),
    Float(f64),
    Text(String),
}

fn order_from_input<E: serde::de::Error>(input: OrderInput) -> Result<i32, E> {
    let value = match input {
        OrderInput::Int(v) => v,
        OrderInput::Float(v) if v.fract() == 0.0 && v.is_finite() => v as i64,
        OrderInput::Float(v) => {
            return Err(E::custom(format!("order must be an integer, got {}", v)));
        }
        OrderInput::Text(s) if s.trim().is_empty() => 0,
        OrderInput::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| E::custom(format!("order must be a number, got {:?}", s)))?,
    };
    i32::try_from(value).map_err(|_| E::custom(format!("order out of range: {}", value)))
}

/// `order` 接受数字或数字字符串，null 视为 0
fn coerce_order<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<OrderInput>::deserialize(deserializer)? {
        Some(input) => order_from_input(input),
        None => Ok(0),
    }
}

fn coerce_optional_order<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<OrderInput>::deserialize(deserializer)? {
        Some(input) => order_from_input(input).map(Some),
        None => Ok(None),
    }
}
