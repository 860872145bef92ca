//! Hedge registry repository.
//!
//! Enum columns are stored as their canonical upper-case strings.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use hedgebot_core::{HedgeClose, HedgeRow, HedgeStatus, HedgeStore, NewHedge};

const HEDGE_COLUMNS: &str = "id, symbol, hedge_symbol, side, qty, reason, status, score, \
                             metadata, close_price, opened_at, closed_at";

/// `PostgreSQL`-backed [`HedgeStore`].
#[derive(Debug, Clone)]
pub struct PgHedgeRepository {
    pool: PgPool,
}

impl PgHedgeRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_hedge_row(row: &PgRow) -> Result<HedgeRow> {
    let side: String = row.try_get("side")?;
    let reason: String = row.try_get("reason")?;
    let status: String = row.try_get("status")?;

    Ok(HedgeRow {
        id: row.try_get("id")?,
        symbol: row.try_get("symbol")?,
        hedge_symbol: row.try_get("hedge_symbol")?,
        side: side.parse()?,
        qty: row.try_get("qty")?,
        reason: reason.parse()?,
        status: status.parse()?,
        score: row.try_get("score")?,
        metadata: row.try_get("metadata")?,
        close_price: row.try_get("close_price")?,
        opened_at: row.try_get("opened_at")?,
        closed_at: row.try_get("closed_at")?,
    })
}

#[async_trait]
impl HedgeStore for PgHedgeRepository {
    async fn active_hedges(&self) -> Result<Vec<HedgeRow>> {
        self.list_hedges(Some(HedgeStatus::Open)).await
    }

    async fn list_hedges(&self, status: Option<HedgeStatus>) -> Result<Vec<HedgeRow>> {
        let rows = sqlx::query(&format!(
            r"
            SELECT {HEDGE_COLUMNS}
            FROM hedges
            WHERE $1::TEXT IS NULL OR status = $1
            ORDER BY id ASC
            "
        ))
        .bind(status.map(HedgeStatus::as_str))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_hedge_row).collect()
    }

    async fn insert_hedge(&self, hedge: &NewHedge) -> Result<HedgeRow> {
        let row = sqlx::query(&format!(
            r"
            INSERT INTO hedges (symbol, hedge_symbol, side, qty, reason, status, score, metadata)
            VALUES ($1, $2, $3, $4, $5, 'OPEN', $6, $7)
            RETURNING {HEDGE_COLUMNS}
            "
        ))
        .bind(&hedge.symbol)
        .bind(&hedge.hedge_symbol)
        .bind(hedge.side.as_str())
        .bind(hedge.qty)
        .bind(hedge.reason.as_str())
        .bind(hedge.score)
        .bind(&hedge.metadata)
        .fetch_one(&self.pool)
        .await?;

        map_hedge_row(&row)
    }

    async fn close_hedge(&self, id: i64, close: &HedgeClose) -> Result<HedgeRow> {
        let row = sqlx::query(&format!(
            r"
            UPDATE hedges
            SET status = 'CLOSED',
                close_price = $2,
                closed_at = NOW(),
                metadata = metadata || $3
            WHERE id = $1 AND status = 'OPEN'
            RETURNING {HEDGE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(close.close_price)
        .bind(&close.metadata)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| anyhow!("hedge {id} not found or not open"))?;

        map_hedge_row(&row)
    }
}
