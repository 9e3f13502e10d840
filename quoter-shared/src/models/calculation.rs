use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::quote::{Category, PriceBreakdown};

/// A quote about to be written to the ledger
#[derive(Debug, Clone)]
pub struct NewCalculation {
    pub category: Category,
    /// Raw request payload, kept verbatim
    pub inputs: serde_json::Value,
    pub results: PriceBreakdown,
    pub user_id: Option<Uuid>,
}

/// A stored quote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationRecord {
    pub id: Uuid,
    pub category: Category,
    pub inputs: serde_json::Value,
    pub results: PriceBreakdown,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
}

impl CalculationRecord {
    pub fn from_new(new: NewCalculation) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: new.category,
            inputs: new.inputs,
            results: new.results,
            timestamp: Utc::now(),
            user_id: new.user_id,
        }
    }
}

/// One page of ledger history, newest first
#[derive(Debug, Clone)]
pub struct CalculationPage {
    pub records: Vec<CalculationRecord>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl CalculationPage {
    pub fn pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
