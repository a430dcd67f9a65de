use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use landed_cost_core::pricing::catalogue::{self, CatalogueInput};
use landed_cost_core::pricing::quote::{self, ProductLine, QuoteInput};
use landed_cost_core::PricingConfiguration;

use crate::commands::settings::load_settings;
use crate::input;

/// Flags overriding individual fields of the resolved settings
#[derive(Args, Debug, Default)]
pub struct SettingsOverrides {
    /// Local currency per yuan (e.g. 90)
    #[arg(long)]
    pub exchange_rate: Option<Decimal>,

    /// Freight per kilogram in local currency (e.g. 9000)
    #[arg(long)]
    pub shipping_per_kg: Option<Decimal>,

    /// Customs duty in percent (e.g. 10 for 10%)
    #[arg(long)]
    pub customs_percent: Option<Decimal>,

    /// Margin in percent (e.g. 25 for 25%)
    #[arg(long)]
    pub margin_percent: Option<Decimal>,
}

impl SettingsOverrides {
    fn apply(&self, config: &mut PricingConfiguration) {
        if let Some(v) = self.exchange_rate {
            config.exchange_rate = v;
        }
        if let Some(v) = self.shipping_per_kg {
            config.shipping_per_kg = v;
        }
        if let Some(v) = self.customs_percent {
            config.customs_percent = v;
        }
        if let Some(v) = self.margin_percent {
            config.margin_percent = v;
        }
    }
}

/// Arguments for single product pricing
#[derive(Args)]
pub struct PriceArgs {
    /// Unit sourcing price in yuan
    #[arg(long)]
    pub sourcing_price: Option<Decimal>,

    /// Unit weight in kilograms
    #[arg(long)]
    pub weight_kg: Option<Decimal>,

    /// Product title or SKU echoed in the output
    #[arg(long)]
    pub reference: Option<String>,

    /// Struck-through reference price in local currency
    #[arg(long)]
    pub compare_at_price: Option<Decimal>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,

    /// Path to JSON input file (used when --sourcing-price is absent)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for catalogue repricing
#[derive(Args)]
pub struct CatalogueArgs {
    /// Path to JSON input file with a "products" array
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

pub fn run_price(
    args: PriceArgs,
    settings_path: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let product = product_from_flags(&args)?;
    let resolved = load_settings(settings_path);

    let mut quote_input = if let Some(product) = product {
        QuoteInput {
            product,
            settings: resolved.configuration,
        }
    } else if let Some(data) = input::load_document(args.input.as_deref())? {
        QuoteInput::from_value(with_settings(data, &resolved.configuration)?)?
    } else {
        return Err("--sourcing-price and --weight-kg, --input <file.json> or stdin required for pricing".into());
    };
    args.overrides.apply(&mut quote_input.settings);

    tracing::debug!(settings = ?quote_input.settings, "pricing product");
    let result = quote::quote_product(&quote_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_catalogue(
    args: CatalogueArgs,
    settings_path: Option<&str>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut catalogue_input = match input::load_document(args.input.as_deref())? {
        Some(data) => {
            let resolved = load_settings(settings_path);
            CatalogueInput::from_value(with_settings(data, &resolved.configuration)?)?
        }
        None => {
            return Err("--input <file.json> or stdin required for catalogue repricing".into())
        }
    };
    args.overrides.apply(&mut catalogue_input.settings);

    tracing::debug!(
        products = catalogue_input.products.len(),
        settings = ?catalogue_input.settings,
        "repricing catalogue"
    );
    let result = catalogue::reprice_catalogue(&catalogue_input)?;
    if result.result.rejected_count > 0 {
        tracing::warn!(
            rejected = result.result.rejected_count,
            "some catalogue lines could not be priced"
        );
    }
    Ok(serde_json::to_value(result)?)
}

/// Product line from `--sourcing-price`/`--weight-kg`, or `None` when
/// neither is given and the product comes from a document.
fn product_from_flags(args: &PriceArgs) -> Result<Option<ProductLine>, Box<dyn std::error::Error>> {
    match (args.sourcing_price, args.weight_kg) {
        (Some(sourcing_price), Some(weight_kg)) => Ok(Some(ProductLine {
            reference: args.reference.clone(),
            sourcing_price_yuan: sourcing_price,
            weight_kg,
            compare_at_price: args.compare_at_price,
        })),
        (Some(_), None) => Err("--weight-kg is required with --sourcing-price".into()),
        (None, Some(_)) => Err("--sourcing-price is required with --weight-kg".into()),
        (None, None) => Ok(None),
    }
}

/// Fill in the resolved configuration when the document carries no
/// `settings` of its own.
fn with_settings(
    mut document: Value,
    configuration: &PricingConfiguration,
) -> Result<Value, Box<dyn std::error::Error>> {
    let map = document
        .as_object_mut()
        .ok_or("Input document must be a JSON object")?;
    if !map.contains_key("settings") {
        map.insert("settings".into(), serde_json::to_value(configuration)?);
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let mut config = PricingConfiguration::default();
        let overrides = SettingsOverrides {
            margin_percent: Some(dec!(40)),
            ..SettingsOverrides::default()
        };
        overrides.apply(&mut config);
        assert_eq!(config.margin_percent, dec!(40));
        assert_eq!(config.exchange_rate, dec!(90));
    }

    #[test]
    fn test_with_settings_keeps_inline_settings() {
        let inline = json!({"exchange_rate": "80", "shipping_per_kg": "1", "customs_percent": "0", "margin_percent": "0"});
        let doc = json!({"products": [], "settings": inline.clone()});
        let filled = with_settings(doc, &PricingConfiguration::default()).unwrap();
        assert_eq!(filled["settings"], inline);
    }

    #[test]
    fn test_with_settings_inserts_resolved() {
        let doc = json!({"product": {"sourcing_price_yuan": 100, "weight_kg": 1}});
        let filled = with_settings(doc, &PricingConfiguration::default()).unwrap();
        let input = QuoteInput::from_value(filled).unwrap();
        assert_eq!(input.settings, PricingConfiguration::default());
    }

    fn price_args(sourcing_price: Option<Decimal>, weight_kg: Option<Decimal>) -> PriceArgs {
        PriceArgs {
            sourcing_price,
            weight_kg,
            reference: None,
            compare_at_price: None,
            overrides: SettingsOverrides::default(),
            input: None,
        }
    }

    #[test]
    fn test_weight_without_sourcing_price_rejected() {
        let err = product_from_flags(&price_args(None, Some(dec!(1)))).unwrap_err();
        assert_eq!(err.to_string(), "--sourcing-price is required with --weight-kg");
    }

    #[test]
    fn test_sourcing_price_without_weight_rejected() {
        let err = product_from_flags(&price_args(Some(dec!(100)), None)).unwrap_err();
        assert_eq!(err.to_string(), "--weight-kg is required with --sourcing-price");
    }

    #[test]
    fn test_no_product_flags_defers_to_document() {
        assert!(product_from_flags(&price_args(None, None)).unwrap().is_none());
        let line = product_from_flags(&price_args(Some(dec!(100)), Some(dec!(1))))
            .unwrap()
            .unwrap();
        assert_eq!(line.sourcing_price_yuan, dec!(100));
    }

    #[test]
    fn test_incomplete_inline_settings_rejected() {
        let doc = json!({
            "product": {"sourcing_price_yuan": 100, "weight_kg": 1},
            "settings": {"exchange_rate": 90, "shipping_per_kg": 9000, "customs_percent": 10}
        });
        let filled = with_settings(doc, &PricingConfiguration::default()).unwrap();
        let err = QuoteInput::from_value(filled).unwrap_err();
        assert!(err.to_string().contains("margin_percent"), "{err}");
    }

    #[test]
    fn test_with_settings_rejects_non_object() {
        assert!(with_settings(json!([1, 2]), &PricingConfiguration::default()).is_err());
    }
}
