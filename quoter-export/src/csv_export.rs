use chrono::{DateTime, SecondsFormat, Utc};
use quoter_shared::PriceBreakdown;

use crate::ExportError;

pub const HEADER: [&str; 7] = [
    "Category",
    "Final Price",
    "Total Cost",
    "Profit",
    "Margin %",
    "Base Cost",
    "Timestamp",
];

/// Header plus one data row for a single quote
pub fn to_csv(category: &str, results: &PriceBreakdown, at: DateTime<Utc>) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(HEADER)?;
    writer.write_record([
        category.to_string(),
        results.final_price.to_string(),
        results.total_cost.to_string(),
        results.profit.to_string(),
        results.margin.to_string(),
        results.base_cost.to_string(),
        at.to_rfc3339_opts(SecondsFormat::Secs, true),
    ])?;

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
