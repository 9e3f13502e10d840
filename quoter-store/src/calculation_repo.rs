use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;
use serde_json::Value;

use quoter_core::repository::{page_offset, CalculationRepository};
use quoter_core::BoxError;
use quoter_shared::{CalculationPage, CalculationRecord, Category, NewCalculation, PriceBreakdown};

pub struct StoreCalculationRepository {
    pool: PgPool,
}

impl StoreCalculationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CalculationRow {
    id: Uuid,
    category: String,
    inputs: Json<Value>,
    results: Json<PriceBreakdown>,
    created_at: DateTime<Utc>,
    user_id: Option<Uuid>,
}

impl TryFrom<CalculationRow> for CalculationRecord {
    type Error = BoxError;

    fn try_from(row: CalculationRow) -> Result<Self, Self::Error> {
        Ok(CalculationRecord {
            id: row.id,
            category: row.category.parse::<Category>()?,
            inputs: row.inputs.0,
            results: row.results.0,
            timestamp: row.created_at,
            user_id: row.user_id,
        })
    }
}

#[async_trait]
impl CalculationRepository for StoreCalculationRepository {
    async fn record(
        &self,
        calculation: NewCalculation,
    ) -> Result<CalculationRecord, BoxError> {
        let record = CalculationRecord::from_new(calculation);

        sqlx::query(
            r#"
            INSERT INTO calculations (id, category, inputs, results, created_at, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.category.as_str())
        .bind(Json(&record.inputs))
        .bind(Json(&record.results))
        .bind(record.timestamp)
        .bind(record.user_id)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list(
        &self,
        page: u64,
        per_page: u64,
        category: Option<Category>,
    ) -> Result<CalculationPage, BoxError> {
        let filter = category.map(|c| c.as_str());
        let offset = page_offset(page, per_page) as i64;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM calculations WHERE ($1::TEXT IS NULL OR category = $1)",
        )
        .bind(filter)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, CalculationRow>(
            r#"
            SELECT id, category, inputs, results, created_at, user_id
            FROM calculations
            WHERE ($1::TEXT IS NULL OR category = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter)
        .bind(per_page as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let records = rows
            .into_iter()
            .map(CalculationRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CalculationPage {
            records,
            total: total.max(0) as u64,
            page,
            per_page,
        })
    }

    async fn ping(&self) -> Result<(), BoxError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
