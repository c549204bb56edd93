use async_trait::async_trait;

#[async_trait]
pub trait SearchClient: Send + Sync {
    fn name(&self) -> &str;

    /// Runs a web search. The result is opaque to the agent beyond being
    /// rendered into an observation.
    async fn search(&self, query: &str) -> anyhow::Result<serde_json::Value>;
}
