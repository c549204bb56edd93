use crate::traits::{Action, SearchClient};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Write;
use std::sync::Arc;

const SNIPPET_MAX_CHARS: usize = 500;

pub struct SearchAction {
    client: Arc<dyn SearchClient>,
}

impl SearchAction {
    pub fn new(client: Arc<dyn SearchClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Action for SearchAction {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Searches the web and returns relevant information"
    }

    fn example(&self) -> &str {
        "What is the capital of France?"
    }

    async fn run(&self, input: &str) -> String {
        match self.client.search(input).await {
            Ok(response) => render_results(&response),
            Err(e) => {
                tracing::warn!(client = self.client.name(), "Search failed: {}", e);
                format!("Search failed: {e}")
            }
        }
    }
}

/// Renders a `{"results": [{title, url, content}]}` response as numbered
/// lines. Any other shape is passed through as JSON text.
fn render_results(response: &Value) -> String {
    let Some(results) = response.get("results").and_then(Value::as_array) else {
        return response.to_string();
    };

    if results.is_empty() {
        return "No results found".to_string();
    }

    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        let title = result["title"].as_str().unwrap_or("(untitled)");
        let _ = write!(out, "{}. {}", i + 1, title);

        if let Some(url) = result["url"].as_str() {
            let _ = write!(out, " ({url})");
        }

        if let Some(content) = result["content"].as_str()
            && !content.trim().is_empty()
        {
            let snippet: String = content.trim().chars().take(SNIPPET_MAX_CHARS).collect();
            let _ = write!(out, ": {snippet}");
        }

        out.push('\n');
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedSearch(Value);

    #[async_trait]
    impl SearchClient for FixedSearch {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn search(&self, _query: &str) -> anyhow::Result<Value> {
            Ok(self.0.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchClient for FailingSearch {
        fn name(&self) -> &str {
            "failing"
        }

        async fn search(&self, _query: &str) -> anyhow::Result<Value> {
            anyhow::bail!("connection refused")
        }
    }

    #[tokio::test]
    async fn renders_results() {
        let action = SearchAction::new(Arc::new(FixedSearch(json!({
            "results": [
                {"title": "Example University - BSc Computer Science", "url": "https://example.ac.uk"},
                {"title": "Paris", "url": "https://example.org/paris", "content": "About 2.1 million people"}
            ]
        }))));

        assert_eq!(
            action.run("cs courses").await,
            "1. Example University - BSc Computer Science (https://example.ac.uk)\n\
             2. Paris (https://example.org/paris): About 2.1 million people"
        );
    }

    #[tokio::test]
    async fn empty_results() {
        let action = SearchAction::new(Arc::new(FixedSearch(json!({"results": []}))));
        assert_eq!(action.run("nothing").await, "No results found");
    }

    #[tokio::test]
    async fn unexpected_shape_passes_through() {
        let action = SearchAction::new(Arc::new(FixedSearch(json!({"answer": "42"}))));
        assert_eq!(action.run("meaning").await, r#"{"answer":"42"}"#);
    }

    #[tokio::test]
    async fn failure_becomes_observation_text() {
        let action = SearchAction::new(Arc::new(FailingSearch));
        assert_eq!(action.run("x").await, "Search failed: connection refused");
    }
}
