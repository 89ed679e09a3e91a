pub mod config;

use anyhow::Context;
use shelfprice_lookup::{read_identifiers, FileSink, PipelineReport, PricePipeline};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

/// Reads the identifier list, opens both sinks and runs the pipeline.
pub async fn run(config: &Config) -> anyhow::Result<PipelineReport> {
    let identifiers = read_identifiers(&config.input_path)
        .await
        .with_context(|| format!("reading {}", config.input_path.display()))?;

    // Invalid provider settings must fail before any output file exists.
    let pipeline = PricePipeline::new(config.pipeline_config())?;

    let success = FileSink::open_append(&config.price_output)
        .await
        .with_context(|| format!("opening {}", config.price_output.display()))?;
    let failure = FileSink::open_append(&config.error_output)
        .await
        .with_context(|| format!("opening {}", config.error_output.display()))?;

    tracing::info!(
        "Writing prices to {} and failures to {}",
        config.price_output.display(),
        config.error_output.display()
    );

    let report = pipeline
        .run(identifiers, Box::new(success), Box::new(failure))
        .await?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_invalid_provider_creates_no_output_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("upcList.txt");
        let prices = dir.path().join("PriceList.sql");
        let errors = dir.path().join("ErroredUPC.txt");
        tokio::fs::write(&input, "111\n").await.unwrap();

        let vars: HashMap<&str, String> = HashMap::from([
            ("SP_PROVIDER", "barcode_lookup".to_string()),
            ("SP_INPUT_PATH", input.display().to_string()),
            ("SP_PRICE_OUTPUT", prices.display().to_string()),
            ("SP_ERROR_OUTPUT", errors.display().to_string()),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        // No SP_API_KEY for a provider that requires one.
        assert!(run(&config).await.is_err());
        assert!(!prices.exists());
        assert!(!errors.exists());
    }
}
