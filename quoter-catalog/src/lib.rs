//! Quote pricing engine.
//!
//! Pure functions only: no I/O, no logging, no shared mutable state.

pub mod multipliers;
pub mod pricing;
pub mod product;
pub mod rounding;
pub mod validation;

pub use multipliers::Attribute;
pub use pricing::{price_device, price_supplement, quote, quote_tagged, PricingError};
pub use product::{DeviceInput, Priceable, SupplementInput};
pub use validation::{validate_required, Fields, ValidationError};
