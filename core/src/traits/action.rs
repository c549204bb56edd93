use async_trait::async_trait;

/// A single action the model can request with `Action: <name>: <input>`.
///
/// Actions never fail from the loop's point of view: any error is rendered
/// into the returned text so the model can read it and try again.
#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Sample input shown to the model in the system prompt.
    fn example(&self) -> &str;

    async fn run(&self, input: &str) -> String;
}
