pub mod models;
pub mod pii;

pub use models::calculation::{CalculationPage, CalculationRecord, NewCalculation};
pub use models::quote::{Category, PriceBreakdown, UnknownCategory};
pub use models::user::{NewUser, User};
pub use pii::Masked;
