//! 注册表模块 — 对 npms.io 搜索 / 详情接口的封装

pub mod error;
pub mod types;

pub use error::ApiError;
pub use types::{browsable_url, PackageDetail};

use crate::config::Config;
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use types::SearchResponse;

/// 排除已弃用包的查询后缀
pub const NOT_DEPRECATED: &str = "+not:deprecated";

#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

/// 搜索地址：`{base}/search?q=<编码后的关键词>[+not:deprecated]`
pub fn search_url(base_url: &str, query: &str, exclude_deprecated: bool) -> String {
    let mut url = format!("{}/search?q={}", base_url, urlencoding::encode(query));
    if exclude_deprecated {
        url.push_str(NOT_DEPRECATED);
    }
    url
}

/// 详情地址：`{base}/package/<编码后的包名>`
pub fn detail_url(base_url: &str, name: &str) -> String {
    format!("{}/package/{}", base_url, urlencoding::encode(name))
}

impl RegistryClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("创建 HTTP 客户端失败")?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
        })
    }

    /// 按名称搜索，只返回包名
    pub async fn search(
        &self,
        query: &str,
        exclude_deprecated: bool,
    ) -> Result<Vec<String>, ApiError> {
        let url = search_url(&self.base_url, query, exclude_deprecated);
        let body = self.get_text(&url).await?;

        let response: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        let names: Vec<String> = response
            .results
            .into_iter()
            .map(|hit| hit.package.name)
            .collect();
        log::debug!("搜索 {:?} 返回 {} 条结果", query, names.len());
        Ok(names)
    }

    /// 获取单个包的完整详情
    pub async fn get_detail(&self, name: &str) -> Result<PackageDetail, ApiError> {
        let url = detail_url(&self.base_url, name);
        let body = self.get_text(&url).await?;

        serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse(e.to_string()))
    }

    async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        log::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        Ok(response.text().await?)
    }
}
