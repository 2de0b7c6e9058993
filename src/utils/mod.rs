pub mod logger;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("未提取到任何数据行，没有可导出的内容")]
    NoDataExtracted,

    #[error("文档结构异常: {0}")]
    MalformedDocument(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("CSS选择器无效 '{0}'")]
    Selector(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置解析错误: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("配置序列化错误: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("网络请求错误: {0}")]
    Network(#[from] reqwest::Error),
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
