use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::{Field, HeaderNormalizer, HeaderTarget, NormalizedRow, RawRow};

// `File:` 前缀区分大小写且必须独立成词，"Profile:" 不算；扩展名不区分大小写
static FILE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<lead>.*?)\bFile:\s*(?P<name>.+?)\.(?i:png|jpe?g|gif|webp|svg)(?P<rest>.*)$")
        .unwrap()
});

// 页面文本中残留的标记：编辑链接、脚注编号、未解码的实体和标签
static MARKUP_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"(?i)\[\s*edit(\s*\|\s*edit source)?\s*\]").unwrap(), ""),
        (Regex::new(r"(?i)\[\s*(\d+|citation needed)\s*\]").unwrap(), ""),
        (Regex::new(r"</?[a-zA-Z][^<>]*>").unwrap(), " "),
        (Regex::new(r"&nbsp;|&#160;").unwrap(), " "),
        (Regex::new(r"&amp;").unwrap(), "&"),
        (Regex::new(r"&#39;|&apos;").unwrap(), "'"),
        (Regex::new(r"&quot;").unwrap(), "\""),
    ]
});

/// 名称列单元格的两种形态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameCell {
    /// `File:<name>.<ext>` 加上前后的说明文字
    FileReference { name: String, caption: Option<String> },
    PlainName(String),
}

impl NameCell {
    pub fn resolve(text: &str) -> Self {
        if let Some(caps) = FILE_TOKEN_RE.captures(text) {
            let name = normalize_ws(&caps["name"]);
            // 图片前面的文字同样属于说明文字
            let caption = format!("{} {}", &caps["lead"], &caps["rest"]);
            let caption = collapse_duplicates(&strip_markup(&caption));
            return NameCell::FileReference {
                name,
                caption: (!caption.is_empty()).then_some(caption),
            };
        }

        NameCell::PlainName(collapse_duplicates(&strip_markup(text)))
    }

    /// 角色名永远不为空：没有说明文字时退回文件名
    pub fn character_name(&self) -> &str {
        match self {
            NameCell::FileReference { name, caption } => caption.as_deref().unwrap_or(name),
            NameCell::PlainName(text) => text,
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        match self {
            NameCell::FileReference { name, .. } => Some(name),
            NameCell::PlainName(_) => None,
        }
    }
}

pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn strip_markup(s: &str) -> String {
    let mut out = s.to_string();
    for (pattern, replacement) in MARKUP_PATTERNS.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    normalize_ws(&out)
}

/// 合并重复出现的名称，例如 "NarutoNaruto"、"Naruto Naruto"，反复执行直到不再变化
pub fn collapse_duplicates(s: &str) -> String {
    let mut current = normalize_ws(s);
    loop {
        let next = collapse_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn collapse_once(s: &str) -> String {
    if let Some(half) = doubled(s) {
        return half.to_string();
    }

    let mut words: Vec<&str> = Vec::new();
    for word in s.split(' ') {
        let word = doubled(word).unwrap_or(word);
        if words.last() != Some(&word) {
            words.push(word);
        }
    }
    words.join(" ")
}

/// 文本是 "XX" 或 "X X" 时返回 X
fn doubled(s: &str) -> Option<&str> {
    let len = s.len();
    if len < 2 {
        return None;
    }

    let mid = len / 2;
    if len % 2 == 1 {
        if s.as_bytes()[mid] != b' ' {
            return None;
        }
        let (left, right) = (&s[..mid], &s[mid + 1..]);
        return (left == right && !left.is_empty()).then_some(left);
    }

    if !s.is_char_boundary(mid) {
        return None;
    }
    let (left, right) = s.split_at(mid);
    (left == right && is_name_unit(left)).then_some(left)
}

// 无分隔的重复只认首字母大写、至少三个字符的单元，"Momo" 这类名字保持原样
fn is_name_unit(unit: &str) -> bool {
    unit.chars().count() >= 3 && unit.chars().next().is_some_and(char::is_uppercase)
}

/// 原始行 → 规范行
pub struct TextCleaner {
    normalizer: HeaderNormalizer,
}

impl TextCleaner {
    pub fn new(normalizer: HeaderNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn clean(&self, raw: &RawRow) -> NormalizedRow {
        let mut row = NormalizedRow::new();

        for (label, text) in &raw.cells {
            match self.normalizer.resolve(label) {
                HeaderTarget::NameOrFile => {
                    let cell = NameCell::resolve(text);
                    if let Some(file_name) = cell.file_name() {
                        debug!("拆分文件引用: {} -> {}", text, file_name);
                        row.merge(Field::FileName, file_name);
                    }
                    row.merge(Field::CharacterName, cell.character_name());
                }
                HeaderTarget::Field(field) => row.merge(field, text.trim()),
            }
        }

        row.insert(Field::Section, raw.section.clone());
        row
    }
}
