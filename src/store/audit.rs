use crate::domain::AuditRecord;
use crate::error::Result;

use super::Pool;

/// Append-only, §3: "No logical information leaves the system without an
/// audit row." Never updated or deleted.
pub async fn record_audit(pool: &Pool, record: &AuditRecord) -> Result<()> {
    sqlx::query(
        r"
        INSERT INTO audit_log (op, timestamp, old, new)
        VALUES ($1, $2, $3, $4)
        ",
    )
    .bind(serde_json::to_value(record.op)?.as_str().unwrap_or_default())
    .bind(record.timestamp)
    .bind(&record.old)
    .bind(&record.new)
    .execute(pool)
    .await?;
    Ok(())
}
