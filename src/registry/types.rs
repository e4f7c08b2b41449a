//! npms.io 返回数据结构
//!
//! 除 `collected.metadata` 外的所有嵌套字段都可能缺失，统一用 `Option` 表达。

use serde::Deserialize;

/// 搜索接口响应，只保留包名
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchHit {
    pub package: SearchPackage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchPackage {
    pub name: String,
}

/// 单个包的详情
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDetail {
    pub collected: Collected,
    #[serde(default)]
    pub score: Option<Score>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collected {
    pub metadata: Metadata,
    #[serde(default)]
    pub github: Option<GithubStats>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub links: Links,
    #[serde(default)]
    pub repository: Option<Repository>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub npm: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubStats {
    #[serde(default)]
    pub stars_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub issues: Option<Issues>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issues {
    #[serde(default)]
    pub open_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Score {
    #[serde(default, rename = "final")]
    pub overall: Option<f64>,
    #[serde(default)]
    pub detail: Option<ScoreDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreDetail {
    #[serde(default)]
    pub quality: Option<f64>,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub maintenance: Option<f64>,
}

impl Metadata {
    /// 仓库地址（原始值，打开前经 [`browsable_url`] 转换）
    pub fn repository_url(&self) -> Option<&str> {
        self.repository.as_ref().and_then(|r| r.url.as_deref())
    }

    /// 非空的关键词列表
    pub fn keyword_list(&self) -> &[String] {
        self.keywords.as_deref().unwrap_or(&[])
    }
}

/// 去掉 `git+` 前缀和 `.git` 后缀，其余原样返回
pub fn browsable_url(url: &str) -> String {
    let url = url.strip_prefix("git+").unwrap_or(url);
    let url = url.strip_suffix(".git").unwrap_or(url);
    if let Some(rest) = url.strip_prefix("git://") {
        format!("https://{rest}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_detail_deserializes() {
        let json = r#"{
            "analyzedAt": "2024-01-01T00:00:00.000Z",
            "collected": {
                "metadata": {
                    "name": "react",
                    "version": "18.2.0",
                    "description": "React is a JavaScript library for building user interfaces.",
                    "date": "2022-06-14T19:46:38.369Z",
                    "keywords": ["react"],
                    "links": {
                        "npm": "https://www.npmjs.com/package/react",
                        "homepage": "https://reactjs.org/"
                    },
                    "repository": {"type": "git", "url": "git+https://github.com/facebook/react.git"}
                },
                "github": {"starsCount": 200000, "forksCount": 41000, "issues": {"count": 900, "openCount": 120}}
            },
            "score": {"final": 0.88, "detail": {"quality": 0.82, "popularity": 0.95, "maintenance": 0.99}}
        }"#;
        let detail: PackageDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.collected.metadata.version, "18.2.0");
        let github = detail.collected.github.unwrap();
        assert_eq!(github.stars_count, 200000);
        assert_eq!(github.issues.unwrap().open_count, 120);
        let score = detail.score.unwrap();
        assert_eq!(score.overall, Some(0.88));
        assert_eq!(score.detail.unwrap().maintenance, Some(0.99));
    }

    #[test]
    fn only_metadata_is_required() {
        let detail: PackageDetail =
            serde_json::from_str(r#"{"collected": {"metadata": {"name": "tiny", "version": "0.0.1"}}}"#)
                .unwrap();
        assert!(detail.score.is_none());
        assert!(detail.collected.github.is_none());
        assert!(detail.collected.metadata.keyword_list().is_empty());
        assert!(detail.collected.metadata.repository_url().is_none());

        assert!(serde_json::from_str::<PackageDetail>(r#"{"collected": {}}"#).is_err());
    }

    #[test]
    fn repository_urls_become_browsable() {
        assert_eq!(
            browsable_url("git+https://github.com/facebook/react.git"),
            "https://github.com/facebook/react"
        );
        assert_eq!(
            browsable_url("git://github.com/sass/dart-sass.git"),
            "https://github.com/sass/dart-sass"
        );
        assert_eq!(browsable_url("https://example.com"), "https://example.com");
    }
}
