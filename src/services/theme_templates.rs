//! 内置主题模板（只读）

use serde::Serialize;
use ts_rs::TS;

use crate::storage::models::{TS_EXPORT_PATH, ThemeColors};

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = TS_EXPORT_PATH)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTemplate {
    pub name: String,
    pub colors: ThemeColors,
}

fn template(name: &str, palette: [&str; 7]) -> ThemeTemplate {
    let [primary, background, surface, accent, text, text_secondary, border] = palette;
    ThemeTemplate {
        name: name.to_string(),
        colors: ThemeColors {
            primary: primary.to_string(),
            background: background.to_string(),
            surface: surface.to_string(),
            accent: accent.to_string(),
            text: text.to_string(),
            text_secondary: text_secondary.to_string(),
            border: border.to_string(),
        },
    }
}

pub fn theme_templates() -> Vec<ThemeTemplate> {
    vec![
        template(
            "Corporate Blue",
            ["#1e40af", "#0f172a", "#1e293b", "#3b82f6", "#f8fafc", "#cbd5e1", "#334155"],
        ),
        template(
            "Tech Purple",
            ["#7c3aed", "#18181b", "#27272a", "#a78bfa", "#fafafa", "#d4d4d8", "#3f3f46"],
        ),
        template(
            "Creative Orange",
            ["#ea580c", "#1c1917", "#292524", "#fb923c", "#fafaf9", "#d6d3d1", "#44403c"],
        ),
        template(
            "Minimal Gray",
            ["#0f172a", "#ffffff", "#f8fafc", "#475569", "#0f172a", "#64748b", "#e2e8f0"],
        ),
        template(
            "Forest Green",
            ["#059669", "#0c1713", "#1a2e25", "#10b981", "#f0fdf4", "#d1fae5", "#2d4a3e"],
        ),
        template(
            "Sunset Red",
            ["#dc2626", "#1f0c0c", "#2d1414", "#ef4444", "#fef2f2", "#fecaca", "#451a1a"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_are_complete() {
        let templates = theme_templates();
        assert_eq!(templates.len(), 6);
        for t in &templates {
            assert!(
                t.colors.slots().iter().all(|(_, v)| v.starts_with('#')),
                "{} has a malformed color",
                t.name
            );
        }
        assert_eq!(templates[3].name, "Minimal Gray");
        assert_eq!(templates[3].colors.background, "#ffffff");
    }
}
