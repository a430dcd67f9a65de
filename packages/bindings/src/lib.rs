use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use landed_cost_core::pricing::{catalogue, quote, settings};
use landed_cost_core::{LandedCostError, PricingConfiguration};
use rust_decimal::Decimal;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse a JSON argument, reporting failures as serialization errors.
fn parse<T: DeserializeOwned>(json: &str) -> NapiResult<T> {
    serde_json::from_str(json)
        .map_err(LandedCostError::from)
        .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CalculateRequest {
    sourcing_price: Decimal,
    weight_kg: Decimal,
    settings: settings::SettingsRecord,
}

/// Price from a sourcing price, a weight and a settings record in store
/// column format. A missing column is reported as an invalid configuration.
#[napi]
pub fn calculate_final_price(input_json: String) -> NapiResult<String> {
    let request: CalculateRequest = parse(&input_json)?;
    let config = PricingConfiguration::try_from(request.settings).map_err(to_napi_error)?;
    let output = landed_cost_core::calculate_final_price(
        request.sourcing_price,
        request.weight_kg,
        &config,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Products
// ---------------------------------------------------------------------------

/// Quote one product. Inline `settings` must be complete; omit them to use
/// the defaults.
#[napi]
pub fn quote_product(input_json: String) -> NapiResult<String> {
    let input = quote::QuoteInput::from_json(&input_json).map_err(to_napi_error)?;
    let output = quote::quote_product(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn reprice_catalogue(input_json: String) -> NapiResult<String> {
    let input = catalogue::CatalogueInput::from_json(&input_json).map_err(to_napi_error)?;
    let output = catalogue::reprice_catalogue(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Resolve a fetched settings row (or `null`) into the effective
/// configuration, falling back to defaults.
#[napi]
pub fn resolve_settings(record_json: String) -> NapiResult<String> {
    let record: Option<settings::SettingsRecord> = parse(&record_json)?;
    let resolved = settings::resolve_settings(record);
    serde_json::to_string(&resolved).map_err(to_napi_error)
}

#[napi]
pub fn validate_settings(record_json: String) -> NapiResult<String> {
    let record: settings::SettingsRecord = parse(&record_json)?;
    let config = settings::validate_for_save(&record).map_err(to_napi_error)?;
    serde_json::to_string(&config).map_err(to_napi_error)
}
