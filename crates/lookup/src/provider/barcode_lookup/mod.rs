//! Barcode Lookup provider implementation.
//!
//! # API Endpoint
//!
//! - Product lookup: `https://api.barcodelookup.com/v3/products?barcode={upc}&key={key}`
//!
//! # Response Format
//!
//! Success is signalled by the HTTP status alone. Products carry a list of
//! stores with a display name and a price encoded as a string. Older API
//! versions name the store fields `store_name` / `store_price`.

use log::debug;
use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::errors::{LookupError, PipelineError};
use crate::extractor::ExtractionPolicy;
use crate::models::{
    LookupRequest, NormalizedItem, NormalizedOffer, ProviderResponse, RawPrice,
};
use crate::provider::PriceProvider;

const BASE_URL: &str = "https://api.barcodelookup.com/v3/products";
const PROVIDER_ID: &str = "BARCODE_LOOKUP";

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    stores: Vec<Store>,
}

#[derive(Debug, Deserialize)]
struct Store {
    #[serde(alias = "store_name", default)]
    name: String,
    #[serde(alias = "store_price", default)]
    price: Option<RawPrice>,
}

/// Barcode Lookup adapter. The API key travels in the query string.
pub struct BarcodeLookupProvider {
    base_url: Url,
    api_key: String,
    extraction: ExtractionPolicy,
}

impl BarcodeLookupProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<&str>,
        extraction: ExtractionPolicy,
    ) -> Result<Self, PipelineError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PipelineError::Config(format!("{} requires an API key", PROVIDER_ID)))?;
        let base_url = Url::parse(base_url.unwrap_or(BASE_URL))
            .map_err(|e| PipelineError::Config(format!("invalid base URL: {}", e)))?;

        Ok(Self {
            base_url,
            api_key,
            extraction,
        })
    }

    fn normalize(product: Product) -> NormalizedItem {
        let offers = product
            .stores
            .into_iter()
            .map(|store| {
                let price = store
                    .price
                    .as_ref()
                    .map(RawPrice::to_decimal)
                    .unwrap_or_default();
                NormalizedOffer::new(store.name, price)
            })
            .collect();

        NormalizedItem {
            offers,
            highest_recorded_price: None,
        }
    }
}

impl PriceProvider for BarcodeLookupProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn build_request(&self, identifier: &str) -> LookupRequest {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair("barcode", identifier)
            .append_pair("key", &self.api_key);
        LookupRequest::new(identifier, url)
    }

    fn parse_response(
        &self,
        status: StatusCode,
        body: &str,
    ) -> Result<ProviderResponse, LookupError> {
        if !status.is_success() {
            debug!("{} answered {}", PROVIDER_ID, status);
            return Ok(ProviderResponse::failure(status.to_string(), None));
        }

        let parsed: ProductsResponse =
            serde_json::from_str(body).map_err(|e| LookupError::Provider {
                provider: PROVIDER_ID.to_string(),
                message: format!("{} - Failed to parse response: {}", status, e),
            })?;

        Ok(ProviderResponse {
            success: true,
            status: status.to_string(),
            message: None,
            items: parsed.products.into_iter().map(Self::normalize).collect(),
        })
    }

    fn extraction(&self) -> &ExtractionPolicy {
        &self.extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderKind;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn provider() -> BarcodeLookupProvider {
        BarcodeLookupProvider::new(
            Some("secret".to_string()),
            None,
            ProviderKind::BarcodeLookup.default_extraction(),
        )
        .unwrap()
    }

    #[test]
    fn test_requires_api_key() {
        let result = BarcodeLookupProvider::new(
            None,
            None,
            ProviderKind::BarcodeLookup.default_extraction(),
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_build_request() {
        let request = provider().build_request("012345678905");
        assert_eq!(request.identifier, "012345678905");
        assert_eq!(
            request.url.as_str(),
            "https://api.barcodelookup.com/v3/products?barcode=012345678905&key=secret"
        );
    }

    #[test]
    fn test_identifier_is_query_encoded() {
        let request = provider().build_request("12 34&x");
        assert!(request.url.as_str().contains("barcode=12+34%26x"));
    }

    #[test]
    fn test_parse_v3_stores() {
        let body = r#"{
            "products": [{
                "barcode_number": "111",
                "stores": [
                    {"name": "Amazon", "price": "3.10"},
                    {"name": "Walmart", "price": "4.50"}
                ]
            }]
        }"#;
        let response = provider().parse_response(StatusCode::OK, body).unwrap();

        assert!(response.success);
        assert_eq!(response.status, "200 OK");
        let item = response.first_item().unwrap();
        assert_eq!(item.offers[1], NormalizedOffer::new("Walmart", dec!(4.50)));
    }

    #[test]
    fn test_parse_v2_store_fields() {
        let body = r#"{"products":[{"stores":[{"store_name":"CVS","store_price":"2.99"}]}]}"#;
        let response = provider().parse_response(StatusCode::OK, body).unwrap();
        let item = response.first_item().unwrap();
        assert_eq!(item.offers, vec![NormalizedOffer::new("CVS", dec!(2.99))]);
    }

    #[test]
    fn test_missing_price_is_zero() {
        let body = r#"{"products":[{"stores":[{"name":"Target"}]}]}"#;
        let response = provider().parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(response.items[0].offers[0].price, Decimal::ZERO);
    }

    #[test]
    fn test_http_failure_keeps_status_text() {
        let response = provider()
            .parse_response(StatusCode::NOT_FOUND, "")
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.diagnostic(), "404 Not Found");
    }

    #[test]
    fn test_malformed_body_is_provider_error() {
        let error = provider()
            .parse_response(StatusCode::OK, "<html>")
            .unwrap_err();
        assert!(matches!(error, LookupError::Provider { .. }));
    }
}
