use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LandedCostError;
use crate::types::{Money, Percent};
use crate::LandedCostResult;

// ---------------------------------------------------------------------------
// Calculator configuration
// ---------------------------------------------------------------------------

/// Pricing parameters consumed by the calculator.
///
/// Percentages are expressed as entered by the operator (10 = 10%), not as
/// decimal fractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfiguration {
    /// Local currency units per one unit of sourcing currency.
    pub exchange_rate: Decimal,
    /// Freight cost per kilogram, in local currency.
    pub shipping_per_kg: Money,
    /// Customs duty applied to landed cost, in percent.
    pub customs_percent: Percent,
    /// Margin applied on top of the duty-inclusive cost, in percent.
    pub margin_percent: Percent,
}

impl Default for PricingConfiguration {
    /// Fallback used when the settings store is unreachable or empty.
    fn default() -> Self {
        Self {
            exchange_rate: dec!(90.0),
            shipping_per_kg: dec!(9000),
            customs_percent: dec!(10),
            margin_percent: dec!(25),
        }
    }
}

impl PricingConfiguration {
    /// Build a configuration from floating-point values, rejecting NaN and
    /// infinities instead of letting them reach the arithmetic.
    pub fn try_from_f64(
        exchange_rate: f64,
        shipping_per_kg: f64,
        customs_percent: f64,
        margin_percent: f64,
    ) -> LandedCostResult<Self> {
        let config = Self {
            exchange_rate: finite_decimal("exchange_rate", exchange_rate)?,
            shipping_per_kg: finite_decimal("shipping_per_kg", shipping_per_kg)?,
            customs_percent: finite_decimal("customs_percent", customs_percent)?,
            margin_percent: finite_decimal("margin_percent", margin_percent)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is non-negative.
    ///
    /// Zero exchange or shipping rates are accepted here; they are
    /// economically meaningless but arithmetically sound.
    pub fn validate(&self) -> LandedCostResult<()> {
        for (field, value) in self.fields() {
            non_negative(field, value)?;
        }
        Ok(())
    }

    fn fields(&self) -> [(&'static str, Decimal); 4] {
        [
            ("exchange_rate", self.exchange_rate),
            ("shipping_per_kg", self.shipping_per_kg),
            ("customs_percent", self.customs_percent),
            ("margin_percent", self.margin_percent),
        ]
    }
}

fn finite_decimal(field: &str, value: f64) -> LandedCostResult<Decimal> {
    if !value.is_finite() {
        return Err(LandedCostError::InvalidConfiguration {
            field: field.into(),
            reason: format!("Must be a finite number, got {value}"),
        });
    }
    Decimal::from_f64(value).ok_or_else(|| LandedCostError::InvalidConfiguration {
        field: field.into(),
        reason: format!("{value} is outside the decimal range"),
    })
}

fn non_negative(field: &str, value: Decimal) -> LandedCostResult<Decimal> {
    if value < Decimal::ZERO {
        return Err(LandedCostError::InvalidConfiguration {
            field: field.into(),
            reason: format!("Must be non-negative, got {value}"),
        });
    }
    Ok(value)
}

/// Present and non-negative, otherwise an error naming `field`.
fn required(field: &str, value: Option<Decimal>, missing: &str) -> LandedCostResult<Decimal> {
    let value = value.ok_or_else(|| LandedCostError::InvalidConfiguration {
        field: field.into(),
        reason: missing.into(),
    })?;
    non_negative(field, value)
}

// ---------------------------------------------------------------------------
// Inline configuration
// ---------------------------------------------------------------------------

/// Configuration object as supplied inline with a quote or catalogue
/// request. Fields are optional here so that a missing one is reported as an
/// invalid configuration rather than a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationFields {
    pub exchange_rate: Option<Decimal>,
    pub shipping_per_kg: Option<Money>,
    pub customs_percent: Option<Percent>,
    pub margin_percent: Option<Percent>,
}

impl From<&PricingConfiguration> for ConfigurationFields {
    fn from(config: &PricingConfiguration) -> Self {
        Self {
            exchange_rate: Some(config.exchange_rate),
            shipping_per_kg: Some(config.shipping_per_kg),
            customs_percent: Some(config.customs_percent),
            margin_percent: Some(config.margin_percent),
        }
    }
}

impl TryFrom<ConfigurationFields> for PricingConfiguration {
    type Error = LandedCostError;

    fn try_from(fields: ConfigurationFields) -> Result<Self, Self::Error> {
        const MISSING: &str = "Missing from configuration";
        Ok(PricingConfiguration {
            exchange_rate: required("exchange_rate", fields.exchange_rate, MISSING)?,
            shipping_per_kg: required("shipping_per_kg", fields.shipping_per_kg, MISSING)?,
            customs_percent: required("customs_percent", fields.customs_percent, MISSING)?,
            margin_percent: required("margin_percent", fields.margin_percent, MISSING)?,
        })
    }
}

/// Inline settings if given, otherwise the default configuration.
pub fn configuration_or_default(
    fields: Option<ConfigurationFields>,
) -> LandedCostResult<PricingConfiguration> {
    match fields {
        Some(fields) => PricingConfiguration::try_from(fields),
        None => Ok(PricingConfiguration::default()),
    }
}

// ---------------------------------------------------------------------------
// Persisted settings record
// ---------------------------------------------------------------------------

/// Settings row as stored by the backend. Every column may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub exchange_rate_yuan_xof: Option<Decimal>,
    pub shipping_price_per_kg: Option<Money>,
    pub customs_percentage: Option<Percent>,
    pub margin_percentage: Option<Percent>,
}

impl From<&PricingConfiguration> for SettingsRecord {
    fn from(config: &PricingConfiguration) -> Self {
        Self {
            exchange_rate_yuan_xof: Some(config.exchange_rate),
            shipping_price_per_kg: Some(config.shipping_per_kg),
            customs_percentage: Some(config.customs_percent),
            margin_percentage: Some(config.margin_percent),
        }
    }
}

impl TryFrom<SettingsRecord> for PricingConfiguration {
    type Error = LandedCostError;

    /// Errors name the store column, as the save rules do.
    fn try_from(record: SettingsRecord) -> Result<Self, Self::Error> {
        const MISSING: &str = "Missing from settings record";
        Ok(PricingConfiguration {
            exchange_rate: required("exchange_rate_yuan_xof", record.exchange_rate_yuan_xof, MISSING)?,
            shipping_per_kg: required("shipping_price_per_kg", record.shipping_price_per_kg, MISSING)?,
            customs_percent: required("customs_percentage", record.customs_percentage, MISSING)?,
            margin_percent: required("margin_percentage", record.margin_percentage, MISSING)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Fallback resolution
// ---------------------------------------------------------------------------

/// Where the effective configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsSource {
    /// Read from the settings store.
    Store,
    /// Store unavailable, empty or unusable; defaults applied.
    Default,
}

/// Effective configuration together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSettings {
    pub configuration: PricingConfiguration,
    pub source: SettingsSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl ResolvedSettings {
    /// Default configuration, recording why the store was not used.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            configuration: PricingConfiguration::default(),
            source: SettingsSource::Default,
            fallback_reason: Some(reason.into()),
        }
    }
}

/// Resolve the configuration to price with from whatever the store returned.
///
/// An absent, incomplete, or negative-valued record falls back to
/// [`PricingConfiguration::default`].
pub fn resolve_settings(record: Option<SettingsRecord>) -> ResolvedSettings {
    let Some(record) = record else {
        return ResolvedSettings::fallback("No settings record found");
    };
    match PricingConfiguration::try_from(record) {
        Ok(configuration) => ResolvedSettings {
            configuration,
            source: SettingsSource::Store,
            fallback_reason: None,
        },
        Err(e) => ResolvedSettings::fallback(e.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Save-time validation
// ---------------------------------------------------------------------------

/// Apply the settings form rules before a record is persisted.
///
/// Stricter than [`PricingConfiguration::validate`]: both rates must be at
/// least 1 and both percentages must lie in [0, 100].
pub fn validate_for_save(record: &SettingsRecord) -> LandedCostResult<PricingConfiguration> {
    let config = PricingConfiguration::try_from(record.clone())?;

    let minimums = [
        ("exchange_rate_yuan_xof", config.exchange_rate),
        ("shipping_price_per_kg", config.shipping_per_kg),
    ];
    for (column, value) in minimums {
        if value < Decimal::ONE {
            return Err(LandedCostError::InvalidConfiguration {
                field: column.into(),
                reason: format!("Must be at least 1, got {value}"),
            });
        }
    }

    let percentages = [
        ("customs_percentage", config.customs_percent),
        ("margin_percentage", config.margin_percent),
    ];
    for (column, value) in percentages {
        if value > dec!(100) {
            return Err(LandedCostError::InvalidConfiguration {
                field: column.into(),
                reason: format!("Must be between 0 and 100, got {value}"),
            });
        }
    }

    Ok(config)
}
