use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LandedCostError;
use crate::pricing::settings::PricingConfiguration;
use crate::types::{Kilograms, Money};
use crate::LandedCostResult;

/// Retail prices are rounded up to the next multiple of this amount.
pub const NICE_PRICE_STEP: Decimal = dec!(50);

const ONE_HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Per-unit quantities to price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationInput {
    /// Unit price in the sourcing (foreign) currency.
    pub sourcing_price: Money,
    /// Shipment weight of one unit in kilograms.
    pub weight_kg: Kilograms,
}

impl CalculationInput {
    /// Build an input from floating-point values, rejecting NaN and
    /// infinities.
    pub fn try_from_f64(sourcing_price: f64, weight_kg: f64) -> LandedCostResult<Self> {
        let input = Self {
            sourcing_price: finite_input("sourcing_price", sourcing_price)?,
            weight_kg: finite_input("weight_kg", weight_kg)?,
        };
        input.validate()?;
        Ok(input)
    }

    /// Both quantities must be strictly positive.
    pub fn validate(&self) -> LandedCostResult<()> {
        require_positive("sourcing_price", self.sourcing_price)?;
        require_positive("weight_kg", self.weight_kg)
    }

    /// Price this input against `config`.
    pub fn calculate(&self, config: &PricingConfiguration) -> LandedCostResult<CalculationResult> {
        calculate_final_price(self.sourcing_price, self.weight_kg, config)
    }
}

/// Cost components behind a final price, all in local currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// sourcing_price * exchange_rate
    pub purchase_cost: Money,
    /// weight_kg * shipping_per_kg
    pub transport_cost: Money,
    /// purchase_cost + transport_cost
    pub landed_cost: Money,
    /// landed_cost * customs_percent / 100
    pub customs_amount: Money,
    /// landed_cost + customs_amount
    pub with_customs: Money,
    /// with_customs * (1 + margin_percent / 100), before rounding
    pub selling_price_raw: Money,
    /// final_price - with_customs; includes the rounding adjustment
    pub margin_amount: Money,
}

/// Final retail price and how it was built up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Integral retail price, a multiple of [`NICE_PRICE_STEP`].
    pub final_price: Money,
    pub breakdown: CostBreakdown,
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Convert a sourcing price and weight into a rounded local retail price.
///
/// Steps, in order:
///
/// 1. purchase = price * exchange_rate
/// 2. transport = weight * shipping_per_kg
/// 3. landed = purchase + transport
/// 4. customs = landed * customs% / 100
/// 5. with_customs = landed + customs
/// 6. raw = with_customs * (1 + margin% / 100)
/// 7. final = ceil(raw / 50) * 50
/// 8. margin = final - with_customs
///
/// The reported margin is the realised one, so `with_customs + margin`
/// equals `final_price` exactly.
pub fn calculate_final_price(
    sourcing_price: Money,
    weight_kg: Kilograms,
    config: &PricingConfiguration,
) -> LandedCostResult<CalculationResult> {
    // -- Validation --
    CalculationInput {
        sourcing_price,
        weight_kg,
    }
    .validate()?;
    config.validate()?;

    // -- Costs --
    let purchase_cost = checked(
        sourcing_price.checked_mul(config.exchange_rate),
        "purchase_cost",
    )?;
    let transport_cost = checked(
        weight_kg.checked_mul(config.shipping_per_kg),
        "transport_cost",
    )?;
    let landed_cost = checked(purchase_cost.checked_add(transport_cost), "landed_cost")?;

    // -- Customs --
    let customs_rate = config.customs_percent / ONE_HUNDRED;
    let customs_amount = checked(landed_cost.checked_mul(customs_rate), "customs_amount")?;
    let with_customs = checked(landed_cost.checked_add(customs_amount), "with_customs")?;

    // -- Margin and rounding --
    let markup = Decimal::ONE + config.margin_percent / ONE_HUNDRED;
    let selling_price_raw = checked(with_customs.checked_mul(markup), "selling_price_raw")?;
    let final_price = round_up_to_nice_price(selling_price_raw)?;
    let margin_amount = final_price - with_customs;

    Ok(CalculationResult {
        final_price,
        breakdown: CostBreakdown {
            purchase_cost,
            transport_cost,
            landed_cost,
            customs_amount,
            with_customs,
            selling_price_raw,
            margin_amount,
        },
    })
}

/// Round `amount` up to the next multiple of [`NICE_PRICE_STEP`].
///
/// Exact multiples are left unchanged: 14300 stays 14300, 14320 becomes 14350.
pub fn round_up_to_nice_price(amount: Money) -> LandedCostResult<Money> {
    let steps = (amount / NICE_PRICE_STEP).ceil();
    checked(steps.checked_mul(NICE_PRICE_STEP), "final_price")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn checked(value: Option<Decimal>, context: &str) -> LandedCostResult<Decimal> {
    value.ok_or_else(|| LandedCostError::ArithmeticOverflow {
        context: context.into(),
    })
}

fn require_positive(field: &str, value: Decimal) -> LandedCostResult<()> {
    if value <= Decimal::ZERO {
        return Err(LandedCostError::InvalidInput {
            field: field.into(),
            reason: format!("Must be positive, got {value}"),
        });
    }
    Ok(())
}

fn finite_input(field: &str, value: f64) -> LandedCostResult<Decimal> {
    if !value.is_finite() {
        return Err(LandedCostError::InvalidInput {
            field: field.into(),
            reason: format!("Must be a finite number, got {value}"),
        });
    }
    Decimal::from_f64(value).ok_or_else(|| LandedCostError::InvalidInput {
        field: field.into(),
        reason: format!("{value} is outside the decimal range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> PricingConfiguration {
        PricingConfiguration::default()
    }

    fn assert_invariants(result: &CalculationResult, label: &str) {
        let b = &result.breakdown;
        assert!(
            (result.final_price % NICE_PRICE_STEP).is_zero(),
            "{label}: {} is not a multiple of 50",
            result.final_price
        );
        let adjustment = result.final_price - b.selling_price_raw;
        assert!(
            adjustment >= Decimal::ZERO && adjustment < NICE_PRICE_STEP,
            "{label}: rounding adjustment {adjustment} outside [0, 50)"
        );
        assert_eq!(b.purchase_cost + b.transport_cost, b.landed_cost, "{label}");
        assert_eq!(b.landed_cost + b.customs_amount, b.with_customs, "{label}");
        assert_eq!(b.with_customs + b.margin_amount, result.final_price, "{label}");
    }

    // -----------------------------------------------------------------------
    // Reference scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn test_reference_one_unit_one_kilo() {
        let r = calculate_final_price(dec!(100), dec!(1), &default_config()).unwrap();
        let b = &r.breakdown;
        assert_eq!(b.purchase_cost, dec!(9000));
        assert_eq!(b.transport_cost, dec!(9000));
        assert_eq!(b.landed_cost, dec!(18000));
        assert_eq!(b.customs_amount, dec!(1800));
        assert_eq!(b.with_customs, dec!(19800));
        assert_eq!(b.selling_price_raw, dec!(24750));
        assert_eq!(r.final_price, dec!(24750));
        assert_eq!(b.margin_amount, dec!(4950));
    }

    #[test]
    fn test_reference_half_kilo_rounds_up() {
        let r = calculate_final_price(dec!(50), dec!(0.5), &default_config()).unwrap();
        let b = &r.breakdown;
        assert_eq!(b.purchase_cost, dec!(4500));
        assert_eq!(b.transport_cost, dec!(4500));
        assert_eq!(b.landed_cost, dec!(9000));
        assert_eq!(b.customs_amount, dec!(900));
        assert_eq!(b.with_customs, dec!(9900));
        assert_eq!(b.selling_price_raw, dec!(12375));
        assert_eq!(r.final_price, dec!(12400));
        assert_eq!(b.margin_amount, dec!(2500));
    }

    #[test]
    fn test_exact_multiple_not_over_rounded() {
        let r = calculate_final_price(dec!(100), dec!(1), &default_config()).unwrap();
        assert_eq!(r.final_price, r.breakdown.selling_price_raw);
    }

    #[test]
    fn test_final_price_is_integral() {
        let r = calculate_final_price(dec!(12.37), dec!(0.213), &default_config()).unwrap();
        assert_eq!(r.final_price, r.final_price.trunc());
        assert_invariants(&r, "fractional inputs");
    }

    // -----------------------------------------------------------------------
    // Rounding
    // -----------------------------------------------------------------------

    #[test]
    fn test_nice_price_rounding_examples() {
        assert_eq!(round_up_to_nice_price(dec!(14320)).unwrap(), dec!(14350));
        assert_eq!(round_up_to_nice_price(dec!(14370)).unwrap(), dec!(14400));
        assert_eq!(round_up_to_nice_price(dec!(14300)).unwrap(), dec!(14300));
        assert_eq!(round_up_to_nice_price(dec!(14300.01)).unwrap(), dec!(14350));
        assert_eq!(round_up_to_nice_price(Decimal::ZERO).unwrap(), Decimal::ZERO);
    }

    // -----------------------------------------------------------------------
    // Invariants across a spread of inputs
    // -----------------------------------------------------------------------

    #[test]
    fn test_invariants_hold_across_inputs() {
        let prices = [dec!(0.01), dec!(1), dec!(7.5), dec!(49.99), dec!(333.33), dec!(12500)];
        let weights = [dec!(0.01), dec!(0.25), dec!(1), dec!(3.7), dec!(42)];
        let configs = [
            default_config(),
            PricingConfiguration {
                exchange_rate: dec!(87.35),
                shipping_per_kg: dec!(7250),
                customs_percent: dec!(18.5),
                margin_percent: dec!(33.3),
            },
            PricingConfiguration {
                exchange_rate: dec!(1),
                shipping_per_kg: dec!(1),
                customs_percent: Decimal::ZERO,
                margin_percent: Decimal::ZERO,
            },
        ];
        for config in &configs {
            for &p in &prices {
                for &w in &weights {
                    let r = calculate_final_price(p, w, config).unwrap();
                    assert_invariants(&r, &format!("p={p} w={w} cfg={config:?}"));
                }
            }
        }
    }

    #[test]
    fn test_idempotent() {
        let config = default_config();
        let a = calculate_final_price(dec!(73.2), dec!(1.35), &config).unwrap();
        let b = calculate_final_price(dec!(73.2), dec!(1.35), &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    // -----------------------------------------------------------------------
    // Monotonicity
    // -----------------------------------------------------------------------

    #[test]
    fn test_monotonic_in_sourcing_price() {
        let config = default_config();
        let mut previous = Decimal::ZERO;
        let mut price = dec!(0.5);
        while price <= dec!(60) {
            let r = calculate_final_price(price, dec!(0.4), &config).unwrap();
            assert!(r.final_price >= previous, "price {price}");
            previous = r.final_price;
            price += dec!(0.37);
        }
    }

    #[test]
    fn test_monotonic_in_weight() {
        let config = default_config();
        let mut previous = Decimal::ZERO;
        let mut weight = dec!(0.01);
        while weight <= dec!(5) {
            let r = calculate_final_price(dec!(20), weight, &config).unwrap();
            assert!(r.final_price >= previous, "weight {weight}");
            previous = r.final_price;
            weight += dec!(0.013);
        }
    }

    #[test]
    fn test_monotonic_in_margin() {
        let mut previous = Decimal::ZERO;
        let mut margin = Decimal::ZERO;
        while margin <= dec!(100) {
            let config = PricingConfiguration {
                margin_percent: margin,
                ..default_config()
            };
            let r = calculate_final_price(dec!(31), dec!(0.7), &config).unwrap();
            assert!(r.final_price >= previous, "margin {margin}");
            previous = r.final_price;
            margin += dec!(0.5);
        }
    }

    // -----------------------------------------------------------------------
    // Rejections
    // -----------------------------------------------------------------------

    #[test]
    fn test_zero_sourcing_price_rejected() {
        let err = calculate_final_price(Decimal::ZERO, dec!(1), &default_config()).unwrap_err();
        assert!(matches!(
            err,
            LandedCostError::InvalidInput { ref field, .. } if field == "sourcing_price"
        ));
    }

    #[test]
    fn test_zero_weight_rejected() {
        let err = calculate_final_price(dec!(10), Decimal::ZERO, &default_config()).unwrap_err();
        assert!(matches!(
            err,
            LandedCostError::InvalidInput { ref field, .. } if field == "weight_kg"
        ));
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let config = default_config();
        assert!(calculate_final_price(dec!(-1), dec!(1), &config).is_err());
        assert!(calculate_final_price(dec!(1), dec!(-0.2), &config).is_err());
    }

    #[test]
    fn test_negative_configuration_rejected() {
        let config = PricingConfiguration {
            customs_percent: dec!(-1),
            ..default_config()
        };
        let err = calculate_final_price(dec!(10), dec!(1), &config).unwrap_err();
        assert!(matches!(err, LandedCostError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_try_from_f64_rejects_non_finite() {
        assert!(matches!(
            CalculationInput::try_from_f64(f64::NAN, 1.0),
            Err(LandedCostError::InvalidInput { .. })
        ));
        assert!(matches!(
            CalculationInput::try_from_f64(10.0, f64::NEG_INFINITY),
            Err(LandedCostError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_try_from_f64_then_calculate() {
        let input = CalculationInput::try_from_f64(50.0, 0.5).unwrap();
        let r = input.calculate(&default_config()).unwrap();
        assert_eq!(r.final_price, dec!(12400));
    }

    #[test]
    fn test_overflow_reported_not_panicking() {
        let config = PricingConfiguration {
            exchange_rate: Decimal::MAX,
            ..default_config()
        };
        let err = calculate_final_price(dec!(1000), dec!(1), &config).unwrap_err();
        assert!(matches!(err, LandedCostError::ArithmeticOverflow { .. }));
    }
}
