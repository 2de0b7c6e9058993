use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::FetchConfig;

const SCRIPT_MARKERS: &[&str] = &["Enable JavaScript", "requires JavaScript"];

#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    /// 页面提示需要执行脚本，表格可能是动态渲染的
    pub fn needs_javascript(&self) -> bool {
        SCRIPT_MARKERS.iter().any(|m| self.body.contains(m))
    }
}

pub struct WikiFetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl WikiFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("无法创建HTTP客户端")?;

        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// 抓取页面，网络错误和 429/502/503 会按次数线性退避重试
    pub async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        info!("正在抓取页面: {}", url);

        let mut last_error = None;
        for attempt in 1..=self.max_retries {
            if attempt > 1 {
                let backoff = self.retry_delay * (attempt - 1);
                info!("等待 {}ms 后重试 (第 {}/{} 次)", backoff.as_millis(), attempt, self.max_retries);
                tokio::time::sleep(backoff).await;
            }

            let response = match self.client.get(url).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    warn!("请求失败 (第 {}/{} 次): {}", attempt, self.max_retries, e);
                    last_error = Some(anyhow::anyhow!(e));
                    continue;
                }
            };

            let status = response.status();
            if matches!(status.as_u16(), 429 | 502 | 503) {
                warn!("服务端返回 {} (第 {}/{} 次)", status, attempt, self.max_retries);
                last_error = Some(anyhow::anyhow!("服务端返回 {}", status));
                continue;
            }

            if !status.is_success() {
                return Err(anyhow::anyhow!("抓取失败，状态码: {}", status));
            }

            let body = response.text().await?;
            info!("响应状态: {}, 内容长度: {} 字节", status, body.len());

            return Ok(FetchedPage {
                status: status.as_u16(),
                body,
            });
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("未发出任何请求"))
            .context(format!("{} 次尝试后仍无法抓取 {}", self.max_retries, url)))
    }

    /// 单次请求，不论状态码都返回页面内容，供排查页面结构使用
    pub async fn probe(&self, url: &str) -> Result<FetchedPage> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(FetchedPage {
            status,
            body,
        })
    }
}
