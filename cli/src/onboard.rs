use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Select};
use rea_core::config::Config;

const BANNER: &str = r"
    -------------------------------------
      rea  ·  Thought → Action → Answer
    -------------------------------------
";

const PROVIDERS: &[(&str, &str)] = &[
    ("openrouter", "deepseek/deepseek-r1-0528-qwen3-8b:free"),
    ("openai", "gpt-4o-mini"),
    ("ollama", "llama3.2"),
];

const TOTAL_STEPS: usize = 4;

fn print_step(step: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, TOTAL_STEPS, title))
            .cyan()
            .bold()
    );
    println!();
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan());

    let mut config = Config::load_or_init()?;

    print_step(1, "Model provider");
    let names: Vec<&str> = PROVIDERS.iter().map(|(name, _)| *name).collect();
    let current = PROVIDERS
        .iter()
        .position(|(name, _)| *name == config.provider_name())
        .unwrap_or(0);
    let choice = Select::new()
        .with_prompt("Provider")
        .items(&names)
        .default(current)
        .interact()
        .context("Failed to read provider selection")?;
    let (provider, default_model) = PROVIDERS[choice];
    let provider_changed = provider != config.provider_name();
    config.provider = Some(provider.to_string());

    print_step(2, "Credentials");
    if provider == "ollama" {
        println!("{} Ollama runs locally, no API key needed", style("✓").green());
        config.api_key = String::new();
    } else {
        config.api_key = Input::new()
            .with_prompt(format!("{} API key", provider))
            .with_initial_text(config.api_key.clone())
            .allow_empty(true)
            .interact_text()
            .context("Failed to read API key")?;
    }

    print_step(3, "Model");
    let model_default = if provider_changed || config.model.is_empty() {
        default_model.to_string()
    } else {
        config.model.clone()
    };
    config.model = Input::new()
        .with_prompt("Model")
        .default(model_default)
        .interact_text()
        .context("Failed to read model")?;

    print_step(4, "Web search");
    println!("The search action uses Tavily (https://tavily.com).");
    config.search.api_key = Input::new()
        .with_prompt("Tavily API key")
        .with_initial_text(config.search.api_key.clone())
        .allow_empty(true)
        .interact_text()
        .context("Failed to read Tavily API key")?;

    config.max_turns = Input::new()
        .with_prompt("Max turns per question")
        .default(config.max_turns)
        .interact_text()
        .context("Failed to read max turns")?;

    println!();
    println!("{} Setup complete", style("✓").green().bold());
    println!("  Try: {}", style("rea ask \"What is (48 + 40 + 32) / 3?\"").bold());

    Ok(config)
}
