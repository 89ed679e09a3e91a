//! Environment-driven configuration for the `shelfprice` binary.
//!
//! Values come from the process environment, optionally seeded from a `.env`
//! file in the working directory.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use shelfprice_lookup::{
    AllowList, ExtractionPolicy, FallbackPolicy, LaunchPolicy, PipelineConfig, PriceStatement,
    ProviderConfig, ProviderKind, StatementStyle,
};
use shelfprice_lookup::pipeline::DEFAULT_POOL_SIZE;
use shelfprice_lookup::router::DEFAULT_TABLE;

const DEFAULT_INPUT_PATH: &str = "upcList.txt";
const DEFAULT_PRICE_OUTPUT: &str = "PriceList.sql";
const DEFAULT_ERROR_OUTPUT: &str = "ErroredUPC.txt";
const DEFAULT_LAUNCH_DELAY_MS: u64 = 2000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct Config {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub input_path: PathBuf,
    pub price_output: PathBuf,
    pub error_output: PathBuf,
    pub launch: LaunchPolicy,
    pub pool_size: usize,
    pub request_timeout: Duration,
    pub statement_style: StatementStyle,
    pub table: String,
    pub allowed_retailers: Option<Vec<String>>,
    pub fallback: Option<FallbackPolicy>,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let provider: ProviderKind = var("SP_PROVIDER")
            .ok_or_else(|| anyhow!("SP_PROVIDER is required (barcode_lookup | upcitemdb)"))?
            .parse()?;

        let delay_ms = parse_number(var("SP_LAUNCH_DELAY_MS"), "SP_LAUNCH_DELAY_MS")?
            .unwrap_or(DEFAULT_LAUNCH_DELAY_MS);
        let launch = LaunchPolicy::from_parts(
            var("SP_LAUNCH_POLICY").as_deref().unwrap_or("staggered"),
            delay_ms,
        )?;

        let pool_size = match parse_number(var("SP_POOL_SIZE"), "SP_POOL_SIZE")? {
            Some(size) => usize::try_from(size)
                .with_context(|| format!("SP_POOL_SIZE {} does not fit this platform", size))?,
            None => DEFAULT_POOL_SIZE,
        };
        if pool_size == 0 {
            return Err(anyhow!("SP_POOL_SIZE must be at least 1"));
        }

        let timeout_secs = parse_number(var("SP_REQUEST_TIMEOUT_SECS"), "SP_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let statement_style = match var("SP_STATEMENT_STYLE") {
            Some(style) => style.parse::<StatementStyle>()?,
            None => StatementStyle::default(),
        };

        let allowed_retailers = var("SP_ALLOWED_RETAILERS").map(|list| {
            list.split(',')
                .map(|entry| entry.trim().to_string())
                .filter(|entry| !entry.is_empty())
                .collect::<Vec<_>>()
        });
        if matches!(&allowed_retailers, Some(list) if list.is_empty()) {
            return Err(anyhow!("SP_ALLOWED_RETAILERS has no entries"));
        }

        let fallback = var("SP_FALLBACK").map(|value| value.parse::<FallbackPolicy>()).transpose()?;

        Ok(Self {
            provider,
            api_key: var("SP_API_KEY"),
            base_url: var("SP_BASE_URL"),
            input_path: var("SP_INPUT_PATH")
                .unwrap_or_else(|| DEFAULT_INPUT_PATH.to_string())
                .into(),
            price_output: var("SP_PRICE_OUTPUT")
                .unwrap_or_else(|| DEFAULT_PRICE_OUTPUT.to_string())
                .into(),
            error_output: var("SP_ERROR_OUTPUT")
                .unwrap_or_else(|| DEFAULT_ERROR_OUTPUT.to_string())
                .into(),
            launch,
            pool_size,
            request_timeout: Duration::from_secs(timeout_secs),
            statement_style,
            table: var("SP_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            allowed_retailers,
            fallback,
            log_format: var("SP_LOG_FORMAT").unwrap_or_else(|| "text".to_string()),
        })
    }

    /// Pipeline configuration with provider defaults and any overrides applied.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let defaults = self.provider.default_extraction();
        let extraction = ExtractionPolicy::new(
            self.allowed_retailers
                .as_ref()
                .map(AllowList::new)
                .unwrap_or(defaults.allow_list),
            self.fallback.unwrap_or(defaults.fallback),
        );

        let mut provider = ProviderConfig::new(self.provider).with_extraction(extraction);
        if let Some(key) = &self.api_key {
            provider = provider.with_api_key(key);
        }
        if let Some(url) = &self.base_url {
            provider = provider.with_base_url(url);
        }

        PipelineConfig::new(provider)
            .with_launch(self.launch)
            .with_pool_size(self.pool_size)
            .with_request_timeout(self.request_timeout)
            .with_statement(PriceStatement::new(&self.table, self.statement_style))
    }
}

fn parse_number(value: Option<String>, key: &str) -> anyhow::Result<Option<u64>> {
    value
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("{} must be a non-negative integer, got '{}'", key, raw))
        })
        .transpose()
}
