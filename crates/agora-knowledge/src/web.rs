//! Web search source

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::KnowledgeError;

/// One ranked web result.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchHit {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_snippet")]
    pub snippet: String,
    #[serde(default = "default_link")]
    pub link: String,
}

fn default_title() -> String {
    "Unknown Title".to_string()
}

fn default_snippet() -> String {
    "No description available".to_string()
}

fn default_link() -> String {
    "#".to_string()
}

impl SearchHit {
    pub fn new(title: &str, snippet: &str, link: &str) -> Self {
        Self {
            title: title.to_string(),
            snippet: snippet.to_string(),
            link: link.to_string(),
        }
    }

    /// Render as `"<title>: <snippet> [Source: <link>]"`
    pub fn render(&self) -> String {
        format!("{}: {} [Source: {}]", self.title, self.snippet, self.link)
    }
}

/// A search capability: query in, ranked hits out.
#[async_trait]
pub trait WebSearch: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// At most `limit` hits, most relevant first. An empty list means no results.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, KnowledgeError>;
}

#[derive(Debug, Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

/// Google Custom Search JSON API client
#[derive(Debug, Clone)]
pub struct GoogleSearch {
    api_key: String,
    cx: String,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleSearch {
    pub fn new(api_key: &str, cx: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            cx: cx.to_string(),
            client: reqwest::Client::new(),
            base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
        }
    }

    /// Build from `GOOGLE_API_KEY` and `GOOGLE_CX`, if both are set.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GOOGLE_API_KEY").ok().filter(|v| !v.is_empty())?;
        let cx = std::env::var("GOOGLE_CX").ok().filter(|v| !v.is_empty())?;
        Some(Self::new(&api_key, &cx))
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }
}

fn parse_hits(body: &str, limit: usize) -> Result<Vec<SearchHit>, KnowledgeError> {
    let response: CustomSearchResponse =
        serde_json::from_str(body).map_err(|e| KnowledgeError::InvalidResponse(e.to_string()))?;
    Ok(response.items.into_iter().take(limit).collect())
}

#[async_trait]
impl WebSearch for GoogleSearch {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, KnowledgeError> {
        // The API serves at most 10 results per page
        let num = limit.clamp(1, 10).to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("key", self.api_key.as_str()),
                ("cx", self.cx.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| KnowledgeError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KnowledgeError::Network(format!(
                "Status: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| KnowledgeError::Network(e.to_string()))?;
        parse_hits(&body, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hits_fills_missing_fields() {
        let body = r#"{"items":[
            {"title":"Grid storage","snippet":"Batteries smooth demand","link":"https://a.example"},
            {"title":"No snippet here"}
        ]}"#;
        let hits = parse_hits(body, 5).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(
            hits[0].render(),
            "Grid storage: Batteries smooth demand [Source: https://a.example]"
        );
        assert_eq!(hits[1].snippet, "No description available");
        assert_eq!(hits[1].link, "#");
    }

    #[test]
    fn test_parse_hits_limits_and_handles_empty() {
        let items: Vec<String> = (0..8)
            .map(|i| format!(r#"{{"title":"t{i}","snippet":"s","link":"l"}}"#))
            .collect();
        let body = format!(r#"{{"items":[{}]}}"#, items.join(","));
        assert_eq!(parse_hits(&body, 5).unwrap().len(), 5);

        assert!(parse_hits(r#"{"kind":"customsearch#search"}"#, 5).unwrap().is_empty());
        assert!(parse_hits("not json", 5).is_err());
    }
}
