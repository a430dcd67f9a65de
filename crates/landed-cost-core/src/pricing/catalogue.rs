use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LandedCostError;
use crate::pricing::quote::{configuration_warnings, price_product_line, ProductLine, ProductQuote};
use crate::pricing::settings::{configuration_or_default, ConfigurationFields, PricingConfiguration};
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::LandedCostResult;

/// Products to reprice against one configuration.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogueInput {
    pub settings: PricingConfiguration,
    pub products: Vec<ProductLine>,
}

#[derive(Deserialize)]
struct CatalogueDocument {
    #[serde(default)]
    settings: Option<ConfigurationFields>,
    products: Vec<ProductLine>,
}

impl CatalogueInput {
    /// Read a catalogue document; settings are handled as for
    /// [`QuoteInput::from_value`](crate::pricing::quote::QuoteInput::from_value).
    pub fn from_value(value: serde_json::Value) -> LandedCostResult<Self> {
        let document: CatalogueDocument = serde_json::from_value(value)?;
        Ok(Self {
            settings: configuration_or_default(document.settings)?,
            products: document.products,
        })
    }

    pub fn from_json(json: &str) -> LandedCostResult<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }
}

/// Outcome for one catalogue line, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CatalogueLine {
    Priced(ProductQuote),
    Rejected {
        #[serde(skip_serializing_if = "Option::is_none")]
        reference: Option<String>,
        error: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueOutput {
    pub lines: Vec<CatalogueLine>,
    pub priced_count: usize,
    pub rejected_count: usize,
    pub total_final_price: Money,
    pub total_margin_amount: Money,
    /// Realised margin over final price across priced lines, in percent (2 dp).
    pub average_margin_percent_of_price: Percent,
}

/// Reprice every product line.
///
/// A bad configuration fails the whole run. A bad line is reported as
/// rejected and does not affect the others.
pub fn reprice_catalogue(
    input: &CatalogueInput,
) -> LandedCostResult<ComputationOutput<CatalogueOutput>> {
    let start = Instant::now();

    if input.products.is_empty() {
        return Err(LandedCostError::InsufficientData(
            "Catalogue contains no products".into(),
        ));
    }
    input.settings.validate()?;

    let mut warnings = configuration_warnings(&input.settings);
    let mut lines = Vec::with_capacity(input.products.len());
    let mut total_final_price = Decimal::ZERO;
    let mut total_margin_amount = Decimal::ZERO;

    for (index, product) in input.products.iter().enumerate() {
        match price_product_line(product, &input.settings, &mut warnings) {
            Ok(quote) => {
                total_final_price = total_final_price
                    .checked_add(quote.final_price)
                    .ok_or_else(|| overflow("total_final_price"))?;
                total_margin_amount = total_margin_amount
                    .checked_add(quote.breakdown.margin_amount)
                    .ok_or_else(|| overflow("total_margin_amount"))?;
                lines.push(CatalogueLine::Priced(quote));
            }
            Err(e @ LandedCostError::InvalidInput { .. }) => {
                let label = product
                    .reference
                    .clone()
                    .unwrap_or_else(|| format!("line {}", index + 1));
                warnings.push(format!("{label} rejected: {e}"));
                lines.push(CatalogueLine::Rejected {
                    reference: product.reference.clone(),
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    let priced_count = lines
        .iter()
        .filter(|l| matches!(l, CatalogueLine::Priced(_)))
        .count();
    let rejected_count = lines.len() - priced_count;

    let average_margin_percent_of_price = if total_final_price.is_zero() {
        Decimal::ZERO
    } else {
        (total_margin_amount / total_final_price * dec!(100)).round_dp(2)
    };

    let output = CatalogueOutput {
        lines,
        priced_count,
        rejected_count,
        total_final_price,
        total_margin_amount,
        average_margin_percent_of_price,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Catalogue repricing: landed cost with customs and margin, rounded up to 50 per line",
        &serde_json::json!({
            "product_count": input.products.len(),
            "exchange_rate": input.settings.exchange_rate.to_string(),
            "shipping_per_kg": input.settings.shipping_per_kg.to_string(),
            "customs_percent": input.settings.customs_percent.to_string(),
            "margin_percent": input.settings.margin_percent.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn overflow(context: &str) -> LandedCostError {
    LandedCostError::ArithmeticOverflow {
        context: context.into(),
    }
}
