use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{load_toml, save_toml};
use crate::utils::ScrapeResult;

/// 按名称关键词归类的规则，按顺序匹配，命中第一条即停止
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordRule {
    pub category: String,
    pub keywords: Vec<String>,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryConfig {
    /// 可识别的等级标记，比较时不区分大小写
    pub tiers: Vec<String>,
    pub keyword_rules: Vec<KeywordRule>,
    /// 缺少稀有度时根据等级补全
    pub tier_rarity: BTreeMap<String, String>,
    /// 缺少状态时，行内任一字段包含该词（不区分大小写）即补全
    pub status_keyword: String,
    /// 只按整词匹配状态关键词，"Unstable" 不再算命中
    #[serde(default)]
    pub status_whole_word: bool,
    pub status_value: String,
    /// 导出报告中每个分类的底色
    pub colors: BTreeMap<String, String>,
}

impl CategoryConfig {
    pub fn load() -> ScrapeResult<Self> {
        Self::load_from(Path::new(super::CONFIG_DIR).join("categories.toml"))
    }

    pub fn load_from(path: impl AsRef<Path>) -> ScrapeResult<Self> {
        load_toml(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ScrapeResult<()> {
        save_toml(self, path)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            tiers: strings(&["S", "A", "B", "C", "C-"]),
            keyword_rules: vec![
                KeywordRule {
                    category: "Secret Units".to_string(),
                    keywords: strings(&["Secret"]),
                    case_sensitive: true,
                },
                KeywordRule {
                    category: "Star Units".to_string(),
                    keywords: strings(&["Star"]),
                    case_sensitive: true,
                },
                KeywordRule {
                    category: "Relics".to_string(),
                    keywords: strings(&["relic", "artifact"]),
                    case_sensitive: false,
                },
                KeywordRule {
                    category: "Game Pass".to_string(),
                    keywords: strings(&["gamepass", "game pass"]),
                    case_sensitive: false,
                },
            ],
            tier_rarity: [
                ("S", "Legendary"),
                ("A", "Epic"),
                ("B", "Rare"),
                ("C", "Common"),
                ("C-", "Common"),
            ]
            .iter()
            .map(|(tier, rarity)| (tier.to_string(), rarity.to_string()))
            .collect(),
            status_keyword: "stable".to_string(),
            status_whole_word: false,
            status_value: "Stable".to_string(),
            colors: [
                ("S Tier", "#ffd966"),
                ("A Tier", "#c9a0dc"),
                ("B Tier", "#9fc5e8"),
                ("C Tier", "#b6d7a8"),
                ("C- Tier", "#d9ead3"),
                ("Secret Units", "#ea9999"),
                ("Star Units", "#ffe599"),
                ("Relics", "#f9cb9c"),
                ("Game Pass", "#a4c2f4"),
                ("Skins", "#d5a6bd"),
                ("Stats", "#d9d9d9"),
            ]
            .iter()
            .map(|(category, color)| (category.to_string(), color.to_string()))
            .collect(),
        }
    }
}
