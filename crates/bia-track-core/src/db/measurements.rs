//! Measurement log operations (append-only).

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use super::{Database, DbError, DbResult};
use crate::models::{Condition, Measurement, NewMeasurement, Status};

const SELECT_COLUMNS: &str =
    "SELECT seq, id, recorded_at, weight_kg, impedance_ohm, condition, status FROM measurements";

impl Database {
    /// Append a classified measurement, assigning its sequence number,
    /// identity and timestamp.
    pub fn append_measurement(&self, new: &NewMeasurement) -> DbResult<Measurement> {
        let recorded_at = self.next_timestamp(Utc::now())?;
        let id = uuid::Uuid::new_v4().to_string();

        self.conn.execute(
            r#"
            INSERT INTO measurements (
                id, recorded_at, weight_kg, impedance_ohm, condition, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                id,
                recorded_at,
                new.weight_kg,
                new.impedance_ohm,
                new.condition.tag(),
                new.status.code(),
            ],
        )?;
        let seq = self.conn.last_insert_rowid();
        debug!(seq, condition = %new.condition, "measurement appended");

        Ok(Measurement {
            seq,
            id,
            recorded_at,
            weight_kg: new.weight_kg,
            impedance_ohm: new.impedance_ohm,
            condition: new.condition.clone(),
            status: new.status,
        })
    }

    /// Up to `n` most recent measurements for a condition, oldest first.
    pub fn latest_measurements(&self, condition: &Condition, n: usize) -> DbResult<Vec<Measurement>> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(n).unwrap_or(i64::MAX);

        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE condition = ?1 ORDER BY seq DESC LIMIT ?2",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map(params![condition.tag(), limit], MeasurementRow::from_row)?;

        let mut measurements = collect_measurements(rows)?;
        measurements.reverse();
        Ok(measurements)
    }

    /// The most recent measurement for a condition, if any.
    pub fn previous_measurement(&self, condition: &Condition) -> DbResult<Option<Measurement>> {
        self.conn
            .query_row(
                &format!(
                    "{} WHERE condition = ?1 ORDER BY seq DESC LIMIT 1",
                    SELECT_COLUMNS
                ),
                [condition.tag()],
                MeasurementRow::from_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Full history for a condition, newest first.
    pub fn all_measurements(&self, condition: &Condition) -> DbResult<Vec<Measurement>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE condition = ?1 ORDER BY seq DESC",
            SELECT_COLUMNS
        ))?;
        let rows = stmt.query_map([condition.tag()], MeasurementRow::from_row)?;

        collect_measurements(rows)
    }

    /// Count measurements, optionally scoped to one condition.
    pub fn count_measurements(&self, condition: Option<&Condition>) -> DbResult<usize> {
        let count: i64 = match condition {
            Some(condition) => self.conn.query_row(
                "SELECT COUNT(*) FROM measurements WHERE condition = ?1",
                [condition.tag()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM measurements", [], |row| row.get(0))?,
        };
        Ok(count as usize)
    }

    /// Distinct condition tags in order of first use.
    pub fn list_conditions(&self) -> DbResult<Vec<Condition>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT condition FROM measurements
            GROUP BY condition
            ORDER BY MIN(seq)
            "#,
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut conditions = Vec::new();
        for tag in rows {
            conditions.push(Condition::from_tag(&tag?));
        }
        Ok(conditions)
    }

    /// Timestamp for the next append: the wall clock, clamped so it never
    /// precedes the last stored measurement.
    fn next_timestamp(&self, now: DateTime<Utc>) -> DbResult<DateTime<Utc>> {
        let last: Option<DateTime<Utc>> = self
            .conn
            .query_row(
                "SELECT recorded_at FROM measurements ORDER BY seq DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match last {
            Some(last) if last > now => {
                warn!(%last, %now, "clock behind last measurement, reusing last timestamp");
                Ok(last)
            }
            _ => Ok(now),
        }
    }
}

/// Raw row before status/condition decoding.
struct MeasurementRow {
    seq: i64,
    id: String,
    recorded_at: DateTime<Utc>,
    weight_kg: f64,
    impedance_ohm: i64,
    condition: String,
    status: String,
}

impl MeasurementRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            seq: row.get(0)?,
            id: row.get(1)?,
            recorded_at: row.get(2)?,
            weight_kg: row.get(3)?,
            impedance_ohm: row.get(4)?,
            condition: row.get(5)?,
            status: row.get(6)?,
        })
    }
}

impl TryFrom<MeasurementRow> for Measurement {
    type Error = DbError;

    fn try_from(row: MeasurementRow) -> Result<Self, Self::Error> {
        let status = Status::from_code(&row.status).ok_or_else(|| {
            DbError::Corrupt(format!("measurement {} has unknown status {}", row.seq, row.status))
        })?;
        let impedance_ohm = u32::try_from(row.impedance_ohm).map_err(|_| {
            DbError::Corrupt(format!(
                "measurement {} has impedance out of range: {}",
                row.seq, row.impedance_ohm
            ))
        })?;

        Ok(Measurement {
            seq: row.seq,
            id: row.id,
            recorded_at: row.recorded_at,
            weight_kg: row.weight_kg,
            impedance_ohm,
            condition: Condition::from_tag(&row.condition),
            status,
        })
    }
}

fn collect_measurements<I>(rows: I) -> DbResult<Vec<Measurement>>
where
    I: Iterator<Item = rusqlite::Result<MeasurementRow>>,
{
    let mut measurements = Vec::new();
    for row in rows {
        measurements.push(row?.try_into()?);
    }
    Ok(measurements)
}
