use std::collections::{HashMap, HashSet};

use super::Field;
use crate::config::HeaderConfig;

/// 表头解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderTarget {
    /// 内容决定落到角色名还是文件名，见 `TextCleaner`
    NameOrFile,
    Field(Field),
}

/// 原始表头 → 规范字段。映射表以外的表头原样透传
pub struct HeaderNormalizer {
    name_labels: HashSet<String>,
    fields: HashMap<String, Field>,
}

impl HeaderNormalizer {
    pub fn new(config: &HeaderConfig) -> Self {
        Self {
            name_labels: config.name_labels.iter().cloned().collect(),
            fields: config
                .fields
                .iter()
                .map(|(raw, field)| (raw.clone(), Field::from_label(field)))
                .collect(),
        }
    }

    pub fn resolve(&self, label: &str) -> HeaderTarget {
        if self.name_labels.contains(label) {
            return HeaderTarget::NameOrFile;
        }

        match self.fields.get(label) {
            Some(field) => HeaderTarget::Field(field.clone()),
            None => HeaderTarget::Field(Field::from_label(label)),
        }
    }
}

impl Default for HeaderNormalizer {
    fn default() -> Self {
        Self::new(&HeaderConfig::default())
    }
}
