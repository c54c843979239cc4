//! 符号图标注册表
//!
//! 名称与客户端图标组件一一对应，关键字用于搜索。

use serde::Serialize;
use ts_rs::TS;

use crate::storage::models::TS_EXPORT_PATH;

#[derive(Debug, Clone, Copy, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct IconInfo {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
pub struct IconCategory {
    pub name: &'static str,
    pub description: &'static str,
    pub icons: &'static [IconInfo],
}

const fn icon(name: &'static str, keywords: &'static [&'static str]) -> IconInfo {
    IconInfo { name, keywords }
}

pub static ICON_LIBRARY: &[IconCategory] = &[
    IconCategory {
        name: "Business & Office",
        description: "Icons for corporate and professional applications",
        icons: &[
            icon("Home", &["home", "house", "main", "dashboard"]),
            icon("Building", &["office", "company", "building", "corporate"]),
            icon("Briefcase", &["business", "work", "briefcase", "professional"]),
            icon("Users", &["team", "people", "group", "users"]),
            icon("Target", &["goal", "objective", "target", "aim"]),
            icon("Award", &["achievement", "success", "award", "medal"]),
            icon("Trophy", &["winner", "champion", "trophy", "prize"]),
        ],
    },
    IconCategory {
        name: "Communication",
        description: "Icons for messaging and contact",
        icons: &[
            icon("Mail", &["email", "message", "mail", "contact"]),
            icon("Phone", &["call", "telephone", "phone", "contact"]),
            icon("MessageCircle", &["chat", "message", "talk", "conversation"]),
            icon("Bell", &["notification", "alert", "bell", "reminder"]),
        ],
    },
    IconCategory {
        name: "Files & Data",
        description: "Icons for documents and data management",
        icons: &[
            icon("FileText", &["document", "file", "text", "paper"]),
            icon("Folder", &["directory", "folder", "files", "organize"]),
            icon("Archive", &["storage", "archive", "box", "save"]),
            icon("Database", &["data", "database", "storage", "sql"]),
            icon("Server", &["server", "hosting", "cloud", "infrastructure"]),
            icon("Cloud", &["cloud", "storage", "online", "sync"]),
            icon("HardDrive", &["drive", "disk", "storage", "hardware"]),
        ],
    },
    IconCategory {
        name: "Commerce",
        description: "Icons for e-commerce and finance",
        icons: &[
            icon("ShoppingCart", &["cart", "shopping", "buy", "purchase"]),
            icon("CreditCard", &["payment", "card", "credit", "transaction"]),
            icon("DollarSign", &["money", "dollar", "currency", "price"]),
            icon("TrendingUp", &["growth", "increase", "trending", "rise"]),
            icon("BarChart", &["chart", "graph", "analytics", "stats"]),
        ],
    },
    IconCategory {
        name: "Actions",
        description: "Icons for common actions and interactions",
        icons: &[
            icon("Search", &["find", "search", "look", "magnify"]),
            icon("Filter", &["filter", "sort", "organize", "select"]),
            icon("Download", &["download", "save", "export", "get"]),
            icon("Upload", &["upload", "import", "send", "add"]),
            icon("Share", &["share", "send", "forward", "distribute"]),
        ],
    },
    IconCategory {
        name: "Technology",
        description: "Icons for tech and development",
        icons: &[
            icon("Code", &["code", "programming", "dev", "development"]),
            icon("Terminal", &["console", "terminal", "command", "cli"]),
            icon("Cpu", &["processor", "cpu", "hardware", "computing"]),
            icon("Smartphone", &["mobile", "phone", "smartphone", "device"]),
            icon("Monitor", &["screen", "display", "monitor", "desktop"]),
        ],
    },
    IconCategory {
        name: "Location",
        description: "Icons for maps and navigation",
        icons: &[
            icon("Globe", &["world", "global", "internet", "web"]),
            icon("Map", &["map", "location", "navigation", "directions"]),
            icon("MapPin", &["location", "pin", "marker", "place"]),
            icon("Navigation", &["navigate", "direction", "compass", "guide"]),
            icon("Compass", &["compass", "direction", "orientation", "navigate"]),
        ],
    },
    IconCategory {
        name: "Education",
        description: "Icons for learning and knowledge",
        icons: &[
            icon("Book", &["book", "read", "library", "learn"]),
            icon("GraduationCap", &["education", "graduate", "school", "university"]),
            icon("Bookmark", &["bookmark", "save", "favorite", "mark"]),
            icon("Lightbulb", &["idea", "innovation", "light", "think"]),
            icon("Zap", &["energy", "power", "fast", "quick"]),
        ],
    },
    IconCategory {
        name: "Media",
        description: "Icons for multimedia content",
        icons: &[
            icon("Camera", &["photo", "camera", "picture", "snapshot"]),
            icon("Image", &["image", "picture", "photo", "gallery"]),
            icon("Video", &["video", "movie", "film", "play"]),
            icon("Music", &["music", "audio", "sound", "song"]),
            icon("Film", &["film", "movie", "cinema", "video"]),
        ],
    },
    IconCategory {
        name: "Time & Scheduling",
        description: "Icons for time management",
        icons: &[
            icon("Calendar", &["calendar", "date", "schedule", "event"]),
            icon("Clock", &["time", "clock", "watch", "hour"]),
        ],
    },
    IconCategory {
        name: "Status & Feedback",
        description: "Icons for alerts and status indicators",
        icons: &[
            icon("AlertCircle", &["alert", "warning", "error", "attention"]),
            icon("Info", &["information", "info", "help", "details"]),
            icon("Star", &["favorite", "star", "rating", "featured"]),
            icon("Heart", &["like", "love", "heart", "favorite"]),
        ],
    },
];

pub fn all_icons() -> impl Iterator<Item = &'static IconInfo> {
    ICON_LIBRARY.iter().flat_map(|category| category.icons.iter())
}

/// 按名称或关键字子串搜索（不区分大小写）；空查询返回全部
pub fn search_icons(query: &str) -> Vec<&'static IconInfo> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return all_icons().collect();
    }

    all_icons()
        .filter(|info| {
            info.name.to_lowercase().contains(&query)
                || info.keywords.iter().any(|k| k.contains(query.as_str()))
        })
        .collect()
}

/// 名称精确匹配
pub fn is_known_icon(name: &str) -> bool {
    all_icons().any(|info| info.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_shape() {
        assert_eq!(ICON_LIBRARY.len(), 11);
        assert_eq!(all_icons().count(), 54);
        assert!(is_known_icon("GraduationCap"));
        assert!(!is_known_icon("graduationcap"));
        assert!(!is_known_icon("Settings"));
    }

    #[test]
    fn test_search_by_name_and_keyword() {
        let names: Vec<&str> = search_icons("MAP").iter().map(|i| i.name).collect();
        assert!(names.contains(&"Map"));
        assert!(names.contains(&"MapPin"));

        // 仅关键字命中
        let names: Vec<&str> = search_icons("money").iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["DollarSign"]);
    }

    #[test]
    fn test_empty_query_returns_all() {
        assert_eq!(search_icons("  ").len(), all_icons().count());
        assert!(search_icons("zzzz").is_empty());
    }
}
