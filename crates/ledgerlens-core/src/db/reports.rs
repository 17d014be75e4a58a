//! Insight report history

use rusqlite::{params, OptionalExtension, Row};

use super::{parse_value_date, Database};
use crate::error::{Error, Result};
use crate::insights::{InsightReport, StoredReport, REPORT_SCHEMA_VERSION};

fn decode_row(row: &Row<'_>) -> rusqlite::Result<(i64, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn to_stored(id: i64, user_id: String, generated_at: &str, body: &str) -> Result<StoredReport> {
    let report = InsightReport::from_json(body)?;
    let generated_at = parse_value_date(generated_at).ok_or_else(|| {
        Error::InvalidData(format!("Bad generated_at on report {}: {}", id, generated_at))
    })?;
    Ok(StoredReport {
        id,
        user_id,
        generated_at,
        report,
    })
}

impl Database {
    /// Append a report to the user's history
    pub fn append_report(&self, user_id: &str, report: &InsightReport) -> Result<i64> {
        let conn = self.conn()?;
        let body = report.to_json()?;

        conn.execute(
            r#"
            INSERT INTO insight_reports (user_id, generated_at, schema_version, report_json)
            VALUES (?, ?, ?, ?)
            "#,
            params![
                user_id,
                report.generated_at.to_rfc3339(),
                REPORT_SCHEMA_VERSION,
                body
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// A user's reports, newest first
    ///
    /// Rows that fail to decode are skipped with a warning.
    pub fn report_history(&self, user_id: &str, limit: usize) -> Result<Vec<StoredReport>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, user_id, generated_at, report_json
            FROM insight_reports
            WHERE user_id = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(params![user_id, limit], decode_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut reports = Vec::with_capacity(rows.len());
        for (id, user_id, generated_at, body) in rows {
            match to_stored(id, user_id, &generated_at, &body) {
                Ok(stored) => reports.push(stored),
                Err(e) => {
                    tracing::warn!(report_id = id, error = %e, "Skipping undecodable report");
                }
            }
        }
        Ok(reports)
    }

    /// The most recent report for a user
    pub fn latest_report(&self, user_id: &str) -> Result<Option<StoredReport>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT id, user_id, generated_at, report_json
                FROM insight_reports
                WHERE user_id = ?
                ORDER BY id DESC
                LIMIT 1
                "#,
                params![user_id],
                decode_row,
            )
            .optional()?;

        row.map(|(id, user_id, generated_at, body)| to_stored(id, user_id, &generated_at, &body))
            .transpose()
    }

    /// Count reports across all users
    pub fn count_reports(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM insight_reports", [], |row| row.get(0))?;
        Ok(count)
    }
}
