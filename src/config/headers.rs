use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{load_toml, save_toml};
use crate::utils::ScrapeResult;

/// 原始表头 → 规范字段的映射表。
///
/// 该页面的很多列只有单字母表头（"a".."o"），这里的对应关系是针对
/// 单个页面整理出来的，因此放在配置文件里，换页面时直接替换即可。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HeaderConfig {
    /// 这些列的内容既可能是角色名，也可能是 `File:` 图片引用
    pub name_labels: Vec<String>,
    /// 其余列的直接映射，大小写敏感
    pub fields: BTreeMap<String, String>,
}

impl HeaderConfig {
    pub fn load() -> ScrapeResult<Self> {
        Self::load_from(Path::new(super::CONFIG_DIR).join("headers.toml"))
    }

    pub fn load_from(path: impl AsRef<Path>) -> ScrapeResult<Self> {
        load_toml(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ScrapeResult<()> {
        save_toml(self, path)
    }
}

impl Default for HeaderConfig {
    fn default() -> Self {
        let pairs = [
            ("f", "Rarity"),
            ("g", "Rarity"),
            ("h", "Tier"),
            ("i", "Tier"),
            ("j", "Status"),
            ("l", "Value"),
            ("m", "Value"),
            ("a", "Quantity"),
            ("b", "Quantity"),
            ("c", "Quantity"),
            ("Section", "Section"),
        ];

        Self {
            name_labels: ["e", "d", "name", "Name"].iter().map(|s| s.to_string()).collect(),
            fields: pairs
                .iter()
                .map(|(raw, field)| (raw.to_string(), field.to_string()))
                .collect(),
        }
    }
}
