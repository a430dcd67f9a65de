pub mod error;
pub mod pricing;
pub mod types;

pub use error::LandedCostError;
pub use pricing::calculator::{calculate_final_price, CalculationResult, CostBreakdown};
pub use pricing::settings::PricingConfiguration;
pub use types::*;

/// Standard result type for all landed-cost operations
pub type LandedCostResult<T> = Result<T, LandedCostError>;
