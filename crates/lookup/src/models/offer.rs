use log::debug;
use rust_decimal::Decimal;
use serde::Deserialize;

/// A price as it appears on the wire.
///
/// Some providers send `"4.50"`, others `4.5`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    /// Converts to a non-negative decimal.
    ///
    /// Unparseable and negative values become zero, which the extractor
    /// treats as "no price".
    pub fn to_decimal(&self) -> Decimal {
        let parsed = match self {
            Self::Number(value) => Decimal::try_from(*value).ok(),
            Self::Text(text) => {
                let cleaned = text.trim().trim_start_matches('$').replace(',', "");
                cleaned.parse::<Decimal>().ok()
            }
        };

        match parsed {
            Some(price) if price.is_sign_positive() => price,
            Some(price) => {
                debug!("Discarding negative price {}", price);
                Decimal::ZERO
            }
            None => {
                debug!("Unparseable price {:?}", self);
                Decimal::ZERO
            }
        }
    }
}

/// One retailer listing for an item.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedOffer {
    /// Retailer name or domain, as the provider reports it.
    pub retailer: String,
    pub price: Decimal,
}

impl NormalizedOffer {
    pub fn new(retailer: impl Into<String>, price: Decimal) -> Self {
        Self {
            retailer: retailer.into(),
            price,
        }
    }
}

/// A product entry from a provider response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedItem {
    /// Offers in provider order.
    pub offers: Vec<NormalizedOffer>,
    /// Highest price the provider has ever recorded for the item.
    pub highest_recorded_price: Option<Decimal>,
}

/// Provider response reduced to what the pipeline needs.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderResponse {
    /// Whether the provider considers the request successful.
    pub success: bool,
    /// Provider status text (e.g. "OK", "NOT_FOUND", "404 Not Found").
    pub status: String,
    /// Optional human-readable message accompanying the status.
    pub message: Option<String>,
    pub items: Vec<NormalizedItem>,
}

impl ProviderResponse {
    /// A failed response carrying only status text.
    pub fn failure(status: impl Into<String>, message: Option<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            message,
            items: Vec::new(),
        }
    }

    /// Status and message joined for failure records.
    pub fn diagnostic(&self) -> String {
        match self.message.as_deref() {
            Some(message) if !message.is_empty() => format!("{} - {}", self.status, message),
            _ => self.status.clone(),
        }
    }

    /// The first item, the only one the extractor considers.
    pub fn first_item(&self) -> Option<&NormalizedItem> {
        self.items.first()
    }
}
