use crate::expr::evaluate;
use crate::traits::Action;
use async_trait::async_trait;

pub struct CalculateAction;

#[async_trait]
impl Action for CalculateAction {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Runs a calculation and returns the number. Supports + - * / and parentheses; use plain numbers only"
    }

    fn example(&self) -> &str {
        "4 * 7 / 3"
    }

    async fn run(&self, input: &str) -> String {
        match evaluate(input) {
            Ok(value) => format!("{value:?}"),
            Err(e) => format!("Error calculating: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn formats_result_as_real() {
        assert_eq!(CalculateAction.run("(48 + 40 + 32)").await, "120.0");
        assert_eq!(CalculateAction.run("(85 + 92) / 2").await, "88.5");
    }

    #[tokio::test]
    async fn errors_become_observation_text() {
        assert_eq!(
            CalculateAction.run("10 / 0").await,
            "Error calculating: division by zero"
        );
        assert!(
            CalculateAction
                .run("__import__('os')")
                .await
                .starts_with("Error calculating: disallowed character")
        );
    }
}
