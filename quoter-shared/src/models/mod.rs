pub mod calculation;
pub mod quote;
pub mod user;
