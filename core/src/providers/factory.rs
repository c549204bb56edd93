use crate::config::Config;
use crate::providers::{OllamaProvider, OpenAIProvider, OpenRouterProvider, TavilySearch};
use crate::traits::{Provider, SearchClient};
use anyhow::{Result, anyhow};
use std::sync::Arc;
use std::time::Duration;

pub fn create_provider(config: &Config) -> Result<Arc<dyn Provider>> {
    let provider_name = config.provider_name();
    let timeout = Duration::from_secs(config.request_timeout_secs);

    match provider_name.to_lowercase().as_str() {
        "ollama" => {
            let mut provider = OllamaProvider::new()
                .with_model(config.model.clone())
                .with_temperature(config.temperature)
                .with_timeout(timeout);
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        "openai" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENAI_API_KEY", "REA_OPENAI_API_KEY"],
                &config.api_key,
            )?;
            let mut provider = OpenAIProvider::new(api_key)
                .with_model(config.model.clone())
                .with_temperature(config.temperature)
                .with_timeout(timeout);
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        "openrouter" => {
            let api_key = resolve_api_key_with_fallback(
                &["OPENROUTER_API_KEY", "REA_OPENROUTER_API_KEY"],
                &config.api_key,
            )?;
            let mut provider = OpenRouterProvider::new(api_key)
                .with_model(config.model.clone())
                .with_temperature(config.temperature)
                .with_timeout(timeout);
            if let Some(base_url) = &config.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        _ => Err(anyhow!(
            "Unknown provider: {}. Available: openrouter, openai, ollama",
            provider_name
        )),
    }
}

pub fn create_search(config: &Config) -> Result<Arc<dyn SearchClient>> {
    let api_key = resolve_api_key_with_fallback(
        &["TAVILY_API_KEY", "REA_TAVILY_API_KEY"],
        &config.search.api_key,
    )
    .map_err(|_| anyhow!("No Tavily API key found. Set TAVILY_API_KEY or [search] api_key"))?;

    let mut search = TavilySearch::new(api_key)
        .with_max_results(config.search.max_results)
        .with_timeout(Duration::from_secs(config.request_timeout_secs));
    if let Some(base_url) = &config.search.base_url {
        search = search.with_base_url(base_url.clone());
    }

    Ok(Arc::new(search))
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: &str) -> Result<String> {
    for var_name in env_vars {
        if let Ok(key) = std::env::var(var_name)
            && !key.trim().is_empty()
        {
            return Ok(key);
        }
    }
    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!("No API key found (tried {})", env_vars.join(", ")))
    }
}
