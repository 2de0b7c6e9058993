use regex::Regex;

use super::{Field, NormalizedRow};
use crate::config::{CategoryConfig, KeywordRule};
use crate::utils::{ScrapeError, ScrapeResult};

/// 分类结果，以及可顺带补全的稀有度和状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub category: String,
    pub rarity: Option<String>,
    pub status: Option<String>,
}

pub struct RowClassifier {
    config: CategoryConfig,
    status_re: Regex,
}

impl RowClassifier {
    pub fn new(config: &CategoryConfig) -> ScrapeResult<Self> {
        let status_re = Regex::new(&status_pattern(config))
            .map_err(|e| ScrapeError::Config(format!("状态关键词无效: {}", e)))?;

        Ok(Self {
            config: config.clone(),
            status_re,
        })
    }

    /// 依次套用：章节默认值 → 等级 → 名称关键词，后命中的规则覆盖前面的结果
    pub fn classify(&self, row: &NormalizedRow) -> Classification {
        let mut category = row.section().to_string();

        let tier = self.canonical_tier(row);
        if let Some(tier) = tier {
            category = format!("{} Tier", tier);
        }

        let names: Vec<&str> = [Field::CharacterName, Field::FileName]
            .iter()
            .filter_map(|f| row.get(f))
            .collect();
        if let Some(rule) = self
            .config
            .keyword_rules
            .iter()
            .find(|rule| names.iter().any(|name| keyword_hit(rule, name)))
        {
            category = rule.category.clone();
        }

        let rarity = if row.has(&Field::Rarity) {
            None
        } else {
            tier.and_then(|t| self.config.tier_rarity.get(t).cloned())
        };

        let status = if row.has(&Field::Status) {
            None
        } else {
            self.status_hint(row).then(|| self.config.status_value.clone())
        };

        Classification {
            category,
            rarity,
            status,
        }
    }

    pub fn apply(&self, mut row: NormalizedRow) -> NormalizedRow {
        let classification = self.classify(&row);
        row.insert(Field::Category, classification.category);
        if let Some(rarity) = classification.rarity {
            row.insert(Field::Rarity, rarity);
        }
        if let Some(status) = classification.status {
            row.insert(Field::Status, status);
        }
        row
    }

    /// 行内的等级按配置里的写法返回，比较不区分大小写
    fn canonical_tier(&self, row: &NormalizedRow) -> Option<&str> {
        let tier = row.get(&Field::Tier)?.trim();
        self.config
            .tiers
            .iter()
            .find(|t| t.eq_ignore_ascii_case(tier))
            .map(String::as_str)
    }

    fn status_hint(&self, row: &NormalizedRow) -> bool {
        row.iter()
            .filter(|(field, _)| {
                !matches!(
                    field,
                    Field::CharacterName | Field::FileName | Field::Section | Field::Category
                )
            })
            .any(|(_, value)| self.status_re.is_match(value))
    }
}

impl Default for RowClassifier {
    fn default() -> Self {
        let config = CategoryConfig::default();
        let status_re = Regex::new(&status_pattern(&config)).unwrap();
        Self { config, status_re }
    }
}

// 默认按子串匹配，配置了 status_whole_word 时才要求整词
fn status_pattern(config: &CategoryConfig) -> String {
    let keyword = regex::escape(&config.status_keyword);
    if config.status_whole_word {
        format!(r"(?i)\b{}\b", keyword)
    } else {
        format!("(?i){}", keyword)
    }
}

fn keyword_hit(rule: &KeywordRule, text: &str) -> bool {
    if rule.case_sensitive {
        rule.keywords.iter().any(|k| text.contains(k.as_str()))
    } else {
        let text = text.to_lowercase();
        rule.keywords
            .iter()
            .any(|k| text.contains(&k.to_lowercase()))
    }
}
