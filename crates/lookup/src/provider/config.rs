//! Provider selection and per-provider configuration.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::PipelineError;
use crate::extractor::{AllowList, ExtractionPolicy, FallbackPolicy};

use super::barcode_lookup::BarcodeLookupProvider;
use super::upcitemdb::UpcItemDbProvider;
use super::PriceProvider;

/// The pricing APIs this crate can talk to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    /// barcodelookup.com: `products[].stores[]`, keyed by store name.
    BarcodeLookup,
    /// upcitemdb.com: `items[].offers[]`, keyed by retailer domain.
    UpcItemDb,
}

impl ProviderKind {
    /// Allow-list and fallback the provider uses unless overridden.
    pub fn default_extraction(&self) -> ExtractionPolicy {
        match self {
            Self::BarcodeLookup => {
                ExtractionPolicy::new(AllowList::retailer_names(), FallbackPolicy::None)
            }
            Self::UpcItemDb => ExtractionPolicy::new(
                AllowList::retailer_domains(),
                FallbackPolicy::HighestRecorded,
            ),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "barcode_lookup" | "barcodelookup" => Ok(Self::BarcodeLookup),
            "upcitemdb" | "upc_item_db" => Ok(Self::UpcItemDb),
            other => Err(PipelineError::Config(format!("unknown provider '{}'", other))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BarcodeLookup => f.write_str("barcode_lookup"),
            Self::UpcItemDb => f.write_str("upcitemdb"),
        }
    }
}

/// Everything needed to construct one provider adapter.
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    /// Overrides the provider's endpoint (tests, proxies).
    pub base_url: Option<String>,
    pub extraction: ExtractionPolicy,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            base_url: None,
            extraction: kind.default_extraction(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_extraction(mut self, extraction: ExtractionPolicy) -> Self {
        self.extraction = extraction;
        self
    }

    /// Builds the configured adapter.
    pub fn build(&self) -> Result<Arc<dyn PriceProvider>, PipelineError> {
        let provider: Arc<dyn PriceProvider> = match self.kind {
            ProviderKind::BarcodeLookup => Arc::new(BarcodeLookupProvider::new(
                self.api_key.clone(),
                self.base_url.as_deref(),
                self.extraction.clone(),
            )?),
            ProviderKind::UpcItemDb => Arc::new(UpcItemDbProvider::new(
                self.api_key.clone(),
                self.base_url.as_deref(),
                self.extraction.clone(),
            )?),
        };
        Ok(provider)
    }
}
