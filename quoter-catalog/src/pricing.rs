use quoter_shared::{Category, PriceBreakdown, UnknownCategory};

use crate::multipliers::Attribute;
use crate::product::{DeviceInput, Priceable, SupplementInput};
use crate::rounding::{ceil_to_step, round_half_even};
use crate::validation::{Fields, ValidationError};

/// Markup over total cost for supplements
pub const SUPPLEMENT_MARGIN: f64 = 0.37;
/// Markup over total cost for devices
pub const DEVICE_MARGIN: f64 = 0.15;
/// Final prices are rounded up to a multiple of this
pub const PRICE_STEP: f64 = 50.0;

const OPERATING_OVERHEAD: f64 = 380.0;
const OVERHEAD_FACTOR: f64 = 1.4;
const SHIPPING_PER_KG: f64 = 32.0;
const FALLBACK_SUPPLY_DAYS: f64 = 30.0;
const DAYS_PER_MONTH: f64 = 30.0;
const MAX_DOSE_FACTOR: f64 = 3.0;
const DOSAGE_STEP: f64 = 50.0;
const VOLUME_DIVISOR: f64 = 4000.0;
const WEIGHT_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid category. Must be 'supplement' or 'device'")]
    UnknownCategory(String),

    /// Inputs large enough to overflow f64. Not a user error.
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
}

impl From<UnknownCategory> for PricingError {
    fn from(err: UnknownCategory) -> Self {
        PricingError::UnknownCategory(err.0)
    }
}

/// Intermediate supplement figures, before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplementCosts {
    pub xfactor: f64,
    pub base_product_cost: f64,
    pub weight_cost: f64,
    pub adjusted_cost: f64,
    pub days_supply: f64,
    pub months_supply: f64,
    pub dose_factor: f64,
    pub dosage_adjustment: f64,
    pub total_cost: f64,
    pub final_price_raw: f64,
    pub final_price: f64,
}

impl SupplementInput {
    pub fn costs(&self) -> SupplementCosts {
        let xfactor = Attribute::ProductShape.multiplier(self.product_shape.as_deref())
            * Attribute::PackingMaterial.multiplier(self.packing_material.as_deref())
            * Attribute::BottleSize.multiplier(self.bottle_size.as_deref())
            * Attribute::MaleSupport.multiplier(self.male_support.as_deref())
            * Attribute::ImportOrigin.multiplier(self.import_from.as_deref());

        let base_product_cost = self.purchase_price * xfactor * self.fx_rate;
        let weight_cost = (self.weight_grams * SHIPPING_PER_KG * self.fx_rate) / 1000.0;
        let adjusted_cost = OPERATING_OVERHEAD + OVERHEAD_FACTOR * (base_product_cost + weight_cost);

        // Zero dose would divide by zero; assume a month's supply instead
        let days_supply = if self.daily_dose > 0.0 {
            self.count / self.daily_dose
        } else {
            FALLBACK_SUPPLY_DAYS
        };
        let months_supply = days_supply / DAYS_PER_MONTH;

        let dose_factor = if months_supply > 0.0 {
            MAX_DOSE_FACTOR / months_supply
        } else {
            MAX_DOSE_FACTOR
        };
        let dose_factor = dose_factor.min(MAX_DOSE_FACTOR);
        let dosage_adjustment = DOSAGE_STEP * (MAX_DOSE_FACTOR - dose_factor);

        let total_cost = adjusted_cost + dosage_adjustment;
        let final_price_raw = total_cost * (1.0 + SUPPLEMENT_MARGIN);

        SupplementCosts {
            xfactor,
            base_product_cost,
            weight_cost,
            adjusted_cost,
            days_supply,
            months_supply,
            dose_factor,
            dosage_adjustment,
            total_cost,
            final_price_raw,
            final_price: ceil_to_step(final_price_raw, PRICE_STEP),
        }
    }
}

impl Priceable for SupplementInput {
    fn price(&self) -> Result<PriceBreakdown, PricingError> {
        let costs = self.costs();
        breakdown(self.purchase_price * self.fx_rate, costs.total_cost, costs.final_price)
    }
}

/// Intermediate device figures, before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceCosts {
    pub base_cost: f64,
    pub volume: f64,
    pub dim_factor: f64,
    pub total_cost: f64,
    pub final_price_raw: f64,
    pub final_price: f64,
}

impl DeviceInput {
    pub fn costs(&self) -> DeviceCosts {
        let base_cost = self.purchase_price * self.fx_rate;
        let volume = self.length_cm * self.width_cm * self.height_cm;
        let dim_factor = 1.0 + (volume / VOLUME_DIVISOR) + (self.weight_kg * WEIGHT_FACTOR);

        let total_cost = base_cost
            * dim_factor
            * Attribute::MaleSupport.multiplier(self.male_support.as_deref())
            * Attribute::ImportOrigin.multiplier(self.import_from.as_deref());
        let final_price_raw = total_cost * (1.0 + DEVICE_MARGIN);

        DeviceCosts {
            base_cost,
            volume,
            dim_factor,
            total_cost,
            final_price_raw,
            final_price: ceil_to_step(final_price_raw, PRICE_STEP),
        }
    }
}

impl Priceable for DeviceInput {
    fn price(&self) -> Result<PriceBreakdown, PricingError> {
        let costs = self.costs();
        breakdown(costs.base_cost, costs.total_cost, costs.final_price)
    }
}

/// Round the raw figures into the shape returned to callers.
///
/// A zero final price (all-zero device inputs) reports a margin of 0
/// instead of dividing by zero.
fn breakdown(base_cost: f64, total_cost: f64, final_price: f64) -> Result<PriceBreakdown, PricingError> {
    for (stage, value) in [("baseCost", base_cost), ("totalCost", total_cost), ("finalPrice", final_price)] {
        if !value.is_finite() {
            return Err(PricingError::NonFinite(stage));
        }
    }

    let profit = final_price - total_cost;
    let margin = if final_price > 0.0 {
        (profit / final_price) * 100.0
    } else {
        0.0
    };

    Ok(PriceBreakdown {
        base_cost: round_half_even(base_cost, 2),
        total_cost: round_half_even(total_cost, 0),
        final_price: round_half_even(final_price, 0),
        profit: round_half_even(profit, 0),
        margin: round_half_even(margin, 1),
    })
}

/// Validate raw supplement fields and price them
pub fn price_supplement(fields: &Fields) -> Result<PriceBreakdown, PricingError> {
    SupplementInput::from_fields(fields)?.price()
}

/// Validate raw device fields and price them
pub fn price_device(fields: &Fields) -> Result<PriceBreakdown, PricingError> {
    DeviceInput::from_fields(fields)?.price()
}

pub fn quote(category: Category, fields: &Fields) -> Result<PriceBreakdown, PricingError> {
    match category {
        Category::Supplement => price_supplement(fields),
        Category::Device => price_device(fields),
    }
}

/// Resolve a wire category tag, then price. Unknown tags fail before any
/// field is looked at.
pub fn quote_tagged(tag: &str, fields: &Fields) -> Result<(Category, PriceBreakdown), PricingError> {
    let category: Category = tag.parse()?;
    let breakdown = quote(category, fields)?;
    Ok((category, breakdown))
}
