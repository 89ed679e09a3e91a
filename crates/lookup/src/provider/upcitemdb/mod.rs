//! UPCitemdb provider implementation.
//!
//! # API Endpoints
//!
//! - Trial (no key): `https://api.upcitemdb.com/prod/trial/lookup?upc={upc}`
//! - Paid: `https://api.upcitemdb.com/prod/v1/lookup?upc={upc}` with
//!   `user_key` and `key_type` headers
//!
//! # Response Format
//!
//! Every body carries a `code` field (`"OK"` on success, e.g. `"INVALID_UPC"`
//! or `"TOO_FAST"` otherwise) and an optional `message`. Offers are keyed by
//! retailer domain with numeric prices, and items report their highest
//! recorded price.

use log::debug;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::Deserialize;

use crate::errors::{LookupError, PipelineError};
use crate::extractor::ExtractionPolicy;
use crate::models::{
    LookupRequest, NormalizedItem, NormalizedOffer, ProviderResponse, RawPrice,
};
use crate::provider::PriceProvider;

const TRIAL_URL: &str = "https://api.upcitemdb.com/prod/trial/lookup";
const PAID_URL: &str = "https://api.upcitemdb.com/prod/v1/lookup";
const PROVIDER_ID: &str = "UPCITEMDB";
const STATUS_OK: &str = "OK";

#[derive(Debug, Deserialize)]
struct LookupResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    offers: Vec<Offer>,
    #[serde(default)]
    highest_recorded_price: Option<RawPrice>,
}

#[derive(Debug, Deserialize)]
struct Offer {
    #[serde(default)]
    domain: String,
    #[serde(default)]
    merchant: String,
    #[serde(default)]
    price: Option<RawPrice>,
}

/// UPCitemdb adapter. Uses the keyless trial endpoint unless a key is set.
pub struct UpcItemDbProvider {
    base_url: Url,
    api_key: Option<String>,
    extraction: ExtractionPolicy,
}

impl UpcItemDbProvider {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<&str>,
        extraction: ExtractionPolicy,
    ) -> Result<Self, PipelineError> {
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        let default_url = if api_key.is_some() { PAID_URL } else { TRIAL_URL };
        let base_url = Url::parse(base_url.unwrap_or(default_url))
            .map_err(|e| PipelineError::Config(format!("invalid base URL: {}", e)))?;

        Ok(Self {
            base_url,
            api_key,
            extraction,
        })
    }

    fn normalize(item: Item) -> NormalizedItem {
        let offers = item
            .offers
            .into_iter()
            .map(|offer| {
                let retailer = if offer.domain.trim().is_empty() {
                    offer.merchant
                } else {
                    offer.domain
                };
                let price = offer
                    .price
                    .as_ref()
                    .map(RawPrice::to_decimal)
                    .unwrap_or_default();
                NormalizedOffer::new(retailer, price)
            })
            .collect();

        NormalizedItem {
            offers,
            highest_recorded_price: item.highest_recorded_price.as_ref().map(RawPrice::to_decimal),
        }
    }
}

impl PriceProvider for UpcItemDbProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn build_request(&self, identifier: &str) -> LookupRequest {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("upc", identifier);
        LookupRequest::new(identifier, url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("user_key", key).header("key_type", "3scale"),
            None => request,
        }
    }

    fn parse_response(
        &self,
        status: StatusCode,
        body: &str,
    ) -> Result<ProviderResponse, LookupError> {
        let parsed: LookupResponse = match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                debug!("{} answered {} without a readable body", PROVIDER_ID, status);
                return Ok(ProviderResponse::failure(status.to_string(), None));
            }
            Err(e) => {
                return Err(LookupError::Provider {
                    provider: PROVIDER_ID.to_string(),
                    message: format!("{} - Failed to parse response: {}", status, e),
                })
            }
        };

        let success = status.is_success() && parsed.code.eq_ignore_ascii_case(STATUS_OK);

        Ok(ProviderResponse {
            success,
            status: parsed.code,
            message: parsed.message,
            items: parsed.items.into_iter().map(Self::normalize).collect(),
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
    use rust_decimal_macros::dec;

    fn provider(api_key: Option<&str>) -> UpcItemDbProvider {
        UpcItemDbProvider::new(
            api_key.map(str::to_string),
            None,
            ProviderKind::UpcItemDb.default_extraction(),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_depends_on_key() {
        let request = provider(None).build_request("111");
        assert_eq!(
            request.url.as_str(),
            "https://api.upcitemdb.com/prod/trial/lookup?upc=111"
        );

        let request = provider(Some("k")).build_request("111");
        assert_eq!(
            request.url.as_str(),
            "https://api.upcitemdb.com/prod/v1/lookup?upc=111"
        );
    }

    #[test]
    fn test_authorize_adds_key_headers() {
        let client = reqwest::Client::new();
        let provider = provider(Some("abc"));
        let request = provider
            .authorize(client.get(provider.build_request("111").url))
            .build()
            .unwrap();
        assert_eq!(request.headers()["user_key"], "abc");
        assert_eq!(request.headers()["key_type"], "3scale");
    }

    #[test]
    fn test_parse_offers_and_history() {
        let body = r#"{
            "code": "OK",
            "total": 1,
            "items": [{
                "upc": "111",
                "offers": [
                    {"merchant": "eBay", "domain": "ebay.com", "price": 3.0},
                    {"merchant": "Walmart", "domain": "walmart.com", "price": 4.5}
                ],
                "highest_recorded_price": 7.99
            }]
        }"#;
        let response = provider(None).parse_response(StatusCode::OK, body).unwrap();

        assert!(response.success);
        let item = response.first_item().unwrap();
        assert_eq!(item.offers[1], NormalizedOffer::new("walmart.com", dec!(4.5)));
        assert_eq!(item.highest_recorded_price, Some(dec!(7.99)));
    }

    #[test]
    fn test_merchant_used_when_domain_missing() {
        let body = r#"{"code":"OK","items":[{"offers":[{"merchant":"Publix","price":"1.25"}]}]}"#;
        let response = provider(None).parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(response.items[0].offers[0].retailer, "Publix");
    }

    #[test]
    fn test_error_code_is_status() {
        let body = r#"{"code":"INVALID_UPC","message":"Not a valid UPC code."}"#;
        let response = provider(None)
            .parse_response(StatusCode::BAD_REQUEST, body)
            .unwrap();
        assert!(!response.success);
        assert_eq!(response.diagnostic(), "INVALID_UPC - Not a valid UPC code.");
    }

    #[test]
    fn test_non_ok_code_with_http_200_is_failure() {
        let body = r#"{"code":"NOT_FOUND","items":[]}"#;
        let response = provider(None).parse_response(StatusCode::OK, body).unwrap();
        assert!(!response.success);
        assert_eq!(response.diagnostic(), "NOT_FOUND");
    }

    #[test]
    fn test_unreadable_error_body_uses_http_status() {
        let response = provider(None)
            .parse_response(StatusCode::BAD_GATEWAY, "<html>")
            .unwrap();
        assert_eq!(response.status, "502 Bad Gateway");
    }

    #[test]
    fn test_malformed_success_body_is_provider_error() {
        let error = provider(None)
            .parse_response(StatusCode::OK, "{\"items\": 3}")
            .unwrap_err();
        assert!(matches!(error, LookupError::Provider { .. }));
    }
}
