//! Price extraction policy.
//!
//! Maps the first item of a provider response to a single canonical price.
//! The scan is pure: no I/O, no shared state. Allow-list and fallback are
//! supplied per provider through [`ExtractionPolicy`].

use std::str::FromStr;

use log::debug;
use rust_decimal::Decimal;

use crate::errors::{LookupError, PipelineError};
use crate::models::NormalizedItem;

/// Retailers trusted by name (store-name keyed providers).
pub const DEFAULT_RETAILER_NAMES: &[&str] = &["walgreens", "cvs", "publix", "walmart", "target"];

/// The same retailers keyed by domain.
pub const DEFAULT_RETAILER_DOMAINS: &[&str] = &[
    "walgreens.com",
    "cvs.com",
    "publix.com",
    "walmart.com",
    "target.com",
];

/// Decimal places of a recorded price.
pub const PRICE_SCALE: u32 = 2;

/// Rounds to the recorded precision, always with [`PRICE_SCALE`] places.
pub fn round_to_cents(price: Decimal) -> Decimal {
    let mut rounded = price.round_dp(PRICE_SCALE);
    rounded.rescale(PRICE_SCALE);
    rounded
}

/// Case-insensitive set of trusted retailer identities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowList {
    entries: Vec<String>,
}

impl AllowList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| normalize_retailer(entry.as_ref()))
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }

    pub fn retailer_names() -> Self {
        Self::new(DEFAULT_RETAILER_NAMES)
    }

    pub fn retailer_domains() -> Self {
        Self::new(DEFAULT_RETAILER_DOMAINS)
    }

    pub fn contains(&self, retailer: &str) -> bool {
        let retailer = normalize_retailer(retailer);
        self.entries.iter().any(|entry| *entry == retailer)
    }
}

/// Lowercases and drops a leading `www.` so `WWW.Walmart.com` matches `walmart.com`.
fn normalize_retailer(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    match lowered.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

/// What to do when no allow-listed offer yields a positive price.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// The identifier fails with `NoApprovedOffer`.
    #[default]
    None,
    /// Use the item's highest recorded price when the provider supplies a
    /// positive one.
    HighestRecorded,
}

impl FromStr for FallbackPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "none" => Ok(Self::None),
            "highest_recorded" | "highest" => Ok(Self::HighestRecorded),
            other => Err(PipelineError::Config(format!("unknown fallback '{}'", other))),
        }
    }
}

/// Allow-list and fallback for one provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionPolicy {
    pub allow_list: AllowList,
    pub fallback: FallbackPolicy,
}

impl ExtractionPolicy {
    pub fn new(allow_list: AllowList, fallback: FallbackPolicy) -> Self {
        Self {
            allow_list,
            fallback,
        }
    }

    /// Resolves a positive price for `item`.
    ///
    /// Offers are scanned in provider order and the first allow-listed one
    /// wins, even if a later one is cheaper. Prices are rounded to cents
    /// before the check, so anything that rounds to zero counts as
    /// unresolved.
    pub fn extract(&self, item: &NormalizedItem) -> Result<Decimal, LookupError> {
        let approved = item
            .offers
            .iter()
            .find(|offer| self.allow_list.contains(&offer.retailer));

        if let Some(offer) = approved {
            let price = round_to_cents(offer.price);
            if price > Decimal::ZERO {
                debug!("Approved offer from '{}' at {}", offer.retailer, price);
                return Ok(price);
            }
        }

        if self.fallback == FallbackPolicy::HighestRecorded {
            if let Some(highest) = item.highest_recorded_price.map(round_to_cents) {
                if highest > Decimal::ZERO {
                    debug!("Falling back to highest recorded price {}", highest);
                    return Ok(highest);
                }
            }
        }

        let message = match approved {
            Some(offer) => format!("approved offer from {} has no price", offer.retailer),
            None => format!("no approved offer among {} offers", item.offers.len()),
        };
        Err(LookupError::NoApprovedOffer { message })
    }
}
