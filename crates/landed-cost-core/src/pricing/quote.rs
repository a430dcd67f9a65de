use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LandedCostError;
use crate::pricing::calculator::{calculate_final_price, CostBreakdown};
use crate::pricing::settings::{configuration_or_default, ConfigurationFields, PricingConfiguration};
use crate::types::{with_metadata, ComputationOutput, Kilograms, Money, Percent};
use crate::LandedCostResult;

/// Smallest sourcing price and weight the product form accepts.
pub const MIN_PRODUCT_QUANTITY: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Pricing fields of a catalogue product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductLine {
    /// Free-form label (title or SKU) echoed back in the quote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Unit price in yuan.
    pub sourcing_price_yuan: Money,
    /// Unit weight in kilograms.
    pub weight_kg: Kilograms,
    /// Struck-through reference price in local currency, whole units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Money>,
}

/// Input for quoting a single product.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteInput {
    pub product: ProductLine,
    pub settings: PricingConfiguration,
}

#[derive(Deserialize)]
struct QuoteDocument {
    product: ProductLine,
    #[serde(default)]
    settings: Option<ConfigurationFields>,
}

impl QuoteInput {
    /// Read a quote request document. Without `settings` the defaults apply;
    /// a `settings` object lacking a field is an `InvalidConfiguration`.
    pub fn from_value(value: serde_json::Value) -> LandedCostResult<Self> {
        let document: QuoteDocument = serde_json::from_value(value)?;
        Ok(Self {
            product: document.product,
            settings: configuration_or_default(document.settings)?,
        })
    }

    pub fn from_json(json: &str) -> LandedCostResult<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }
}

/// Priced product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuote {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub final_price: Money,
    pub breakdown: CostBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_at_price: Option<Money>,
    /// Markdown against the compare-at price, in percent (2 dp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<Percent>,
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// Quote one product line against the given settings.
pub fn quote_product(input: &QuoteInput) -> LandedCostResult<ComputationOutput<ProductQuote>> {
    let start = Instant::now();

    input.settings.validate()?;
    let mut warnings = configuration_warnings(&input.settings);
    let quote = price_product_line(&input.product, &input.settings, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Landed cost (purchase + freight) with customs and margin, rounded up to 50",
        &serde_json::json!({
            "sourcing_price_yuan": input.product.sourcing_price_yuan.to_string(),
            "weight_kg": input.product.weight_kg.to_string(),
            "exchange_rate": input.settings.exchange_rate.to_string(),
            "shipping_per_kg": input.settings.shipping_per_kg.to_string(),
            "customs_percent": input.settings.customs_percent.to_string(),
            "margin_percent": input.settings.margin_percent.to_string(),
        }),
        warnings,
        elapsed,
        quote,
    ))
}

/// Price one line, appending line-level warnings. Shared with catalogue
/// repricing.
pub(crate) fn price_product_line(
    line: &ProductLine,
    settings: &PricingConfiguration,
    warnings: &mut Vec<String>,
) -> LandedCostResult<ProductQuote> {
    validate_product_line(line)?;

    let calculation =
        calculate_final_price(line.sourcing_price_yuan, line.weight_kg, settings)?;
    let final_price = calculation.final_price;

    let discount_percent = match line.compare_at_price {
        Some(compare_at) if compare_at > final_price => {
            Some(((compare_at - final_price) / compare_at * dec!(100)).round_dp(2))
        }
        Some(compare_at) => {
            warnings.push(format!(
                "{}compare_at_price {compare_at} is not above final price {final_price}; no discount shown",
                label_prefix(line)
            ));
            None
        }
        None => None,
    };

    Ok(ProductQuote {
        reference: line.reference.clone(),
        final_price,
        breakdown: calculation.breakdown,
        compare_at_price: line.compare_at_price,
        discount_percent,
    })
}

/// Product form gating: both quantities at least 0.01, compare-at price a
/// non-negative whole amount.
pub fn validate_product_line(line: &ProductLine) -> LandedCostResult<()> {
    let minimums = [
        ("sourcing_price_yuan", line.sourcing_price_yuan),
        ("weight_kg", line.weight_kg),
    ];
    for (field, value) in minimums {
        if value < MIN_PRODUCT_QUANTITY {
            return Err(LandedCostError::InvalidInput {
                field: field.into(),
                reason: format!("Must be at least {MIN_PRODUCT_QUANTITY}, got {value}"),
            });
        }
    }

    if let Some(compare_at) = line.compare_at_price {
        if compare_at < Decimal::ZERO || compare_at != compare_at.trunc() {
            return Err(LandedCostError::InvalidInput {
                field: "compare_at_price".into(),
                reason: format!("Must be a non-negative whole amount, got {compare_at}"),
            });
        }
    }

    Ok(())
}

/// Warnings about settings that are valid but commercially suspicious.
pub(crate) fn configuration_warnings(settings: &PricingConfiguration) -> Vec<String> {
    let mut warnings = Vec::new();
    if settings.exchange_rate.is_zero() {
        warnings.push("Exchange rate is zero; purchase cost will be zero".to_string());
    }
    if settings.shipping_per_kg.is_zero() {
        warnings.push("Shipping rate is zero; transport cost will be zero".to_string());
    }
    if settings.customs_percent > dec!(100) {
        warnings.push(format!(
            "Customs rate of {}% exceeds 100%",
            settings.customs_percent
        ));
    }
    if settings.margin_percent > dec!(100) {
        warnings.push(format!(
            "Margin of {}% exceeds 100%",
            settings.margin_percent
        ));
    }
    warnings
}

fn label_prefix(line: &ProductLine) -> String {
    match &line.reference {
        Some(reference) => format!("{reference}: "),
        None => String::new(),
    }
}
