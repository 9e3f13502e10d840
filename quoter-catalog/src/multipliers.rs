//! Fixed attribute multipliers.
//!
//! The tables are static data, so every request reads the same values and
//! nothing needs locking.

/// Product attributes that scale a base cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    MaleSupport,
    ProductShape,
    BottleSize,
    PackingMaterial,
    ImportOrigin,
}

const MALE_SUPPORT: &[(&str, f64)] = &[("Yes", 1.25), ("No", 1.0)];

const PRODUCT_SHAPE: &[(&str, f64)] = &[
    ("Capsules/Tablets", 1.0),
    ("Softgels/Chews", 1.0),
    ("Powder/Creamy", 1.0),
    ("Gummies", 1.1),
    ("Liquid", 1.05),
    ("Injection", 1.2),
];

const BOTTLE_SIZE: &[(&str, f64)] = &[
    ("Small", 0.9),
    ("Normal", 1.0),
    ("Big", 1.1),
    ("Massive", 1.2),
];

const PACKING_MATERIAL: &[(&str, f64)] = &[("Plastic", 1.0), ("Glass", 1.12), ("Paper", 1.06)];

const IMPORT_ORIGIN: &[(&str, f64)] = &[("US", 1.0), ("UK", 1.25), ("EU", 1.1)];

/// Multiplier applied when a value is missing or not in the table
pub const NEUTRAL: f64 = 1.0;

impl Attribute {
    pub fn table(&self) -> &'static [(&'static str, f64)] {
        match self {
            Attribute::MaleSupport => MALE_SUPPORT,
            Attribute::ProductShape => PRODUCT_SHAPE,
            Attribute::BottleSize => BOTTLE_SIZE,
            Attribute::PackingMaterial => PACKING_MATERIAL,
            Attribute::ImportOrigin => IMPORT_ORIGIN,
        }
    }

    /// Exact, case-sensitive lookup. Misses are never an error.
    pub fn multiplier(&self, value: Option<&str>) -> f64 {
        let Some(value) = value else {
            return NEUTRAL;
        };

        self.table()
            .iter()
            .find(|(key, _)| *key == value)
            .map(|(_, factor)| *factor)
            .unwrap_or(NEUTRAL)
    }
}
