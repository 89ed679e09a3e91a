//! Pricing provider abstractions and implementations.
//!
//! This module contains:
//! - The `PriceProvider` trait that every adapter implements
//! - Provider selection and configuration (`ProviderKind`, `ProviderConfig`)
//! - Concrete adapters for Barcode Lookup and UPCitemdb
//!
//! Adapters only translate: identifier to request, response to
//! `ProviderResponse`. Sending, retrying and price selection live in the
//! worker and extractor so both adapters share one pipeline.

mod config;
mod traits;

pub mod barcode_lookup;
pub mod upcitemdb;

pub use config::{ProviderConfig, ProviderKind};
pub use traits::PriceProvider;
