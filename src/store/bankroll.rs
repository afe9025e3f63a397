use std::time::Duration;

use tracing::warn;

use crate::domain::Bankroll;
use crate::error::{Error, Result};

use super::Pool;

#[derive(sqlx::FromRow)]
struct BankrollRow {
    current_balance: i64,
    piggybank_balance: i64,
    peak_balance: i64,
    trough_balance: i64,
    version: i64,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl BankrollRow {
    fn into_bankroll(self) -> Bankroll {
        use crate::domain::Cents;
        Bankroll {
            current_balance: Cents(self.current_balance),
            piggybank_balance: Cents(self.piggybank_balance),
            peak_balance: Cents(self.peak_balance),
            trough_balance: Cents(self.trough_balance),
            version: self.version,
            updated_at: self.updated_at,
        }
    }
}

pub async fn load_bankroll(pool: &Pool) -> Result<Bankroll> {
    let row: BankrollRow = sqlx::query_as(
        r"
        SELECT current_balance, piggybank_balance, peak_balance, trough_balance, version, updated_at
        FROM bankroll
        WHERE id = 1
        ",
    )
    .fetch_one(pool)
    .await?;
    Ok(row.into_bankroll())
}

/// Optimistic-concurrency CAS (§4.7/§8 scenario 6): `UPDATE ... WHERE
/// version = $expected`. On zero rows affected, reload and retry up to 3
/// times with 50ms backoff; fail cleanly if still contested.
pub async fn update_bankroll(pool: &Pool, apply: impl Fn(&Bankroll) -> Bankroll) -> Result<Bankroll> {
    let mut attempt = 0;
    loop {
        let current = load_bankroll(pool).await?;
        let next = apply(&current);
        let result = sqlx::query(
            r"
            UPDATE bankroll
            SET current_balance = $1, piggybank_balance = $2, peak_balance = $3,
                trough_balance = $4, version = $5, updated_at = $6
            WHERE id = 1 AND version = $7
            ",
        )
        .bind(next.current_balance.0)
        .bind(next.piggybank_balance.0)
        .bind(next.peak_balance.0)
        .bind(next.trough_balance.0)
        .bind(next.version)
        .bind(next.updated_at)
        .bind(current.version)
        .execute(pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(next);
        }

        attempt += 1;
        warn!(attempt, expected_version = current.version, "bankroll CAS conflict");
        if attempt >= 3 {
            return Err(Error::Conflict(
                "bankroll update lost CAS race after 3 attempts".to_string(),
            ));
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
