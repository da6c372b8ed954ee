//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use launchdeck_core::{
  launch::LaunchRecord,
  launchpad::LaunchpadRecord,
  query::{
    LaunchGrouping, LaunchQuery, LaunchSort, LaunchStats, NameCount, Page, SortDirection,
    YearStats, success_rate,
  },
  record::{Stored, Upserted},
  rocket::RocketRecord,
  store::RecordStore,
};
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value};
use tracing::{debug, info};

use crate::{
  Result,
  encode::{
    LAUNCH_COLUMNS, LAUNCH_SYNCED, LAUNCHPAD_COLUMNS, LAUNCHPAD_SYNCED, ROCKET_COLUMNS,
    ROCKET_SYNCED, RawLaunch, RawLaunchpad, RawRocket, count, decode_dt, encode_dt,
    launch_values, launchpad_values, now, rocket_values,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A launchdeck store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Where an upsert landed.
struct RowWrite {
  id:          i64,
  created_at:  DateTime<Utc>,
  updated_at:  DateTime<Utc>,
  was_created: bool,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    info!(path = %path.as_ref().display(), "opening sqlite store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Create-or-update one row keyed by `external_id`, inside a single
  /// transaction. `values` line up with `columns`; `columns[0]` is
  /// `external_id`.
  async fn upsert_row(
    &self,
    table: &'static str,
    columns: &'static [&'static str],
    values: Vec<Value>,
  ) -> Result<RowWrite> {
    let external_id = values.first().cloned().unwrap_or(Value::Null);
    let at = now();
    let at_str = encode_dt(at);

    let (id, created_at, was_created): (i64, String, bool) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<(i64, String)> = tx
          .query_row(
            &format!("SELECT id, created_at FROM {table} WHERE external_id = ?1"),
            [&external_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?;

        let n = columns.len();
        let mut params = values;
        let written = match existing {
          Some((id, created_at)) => {
            let assignments = columns
              .iter()
              .enumerate()
              .map(|(i, c)| format!("{c} = ?{}", i + 1))
              .collect::<Vec<_>>()
              .join(", ");
            params.push(Value::Text(at_str));
            params.push(Value::Integer(id));
            tx.execute(
              &format!(
                "UPDATE {table} SET {assignments}, updated_at = ?{} WHERE id = ?{}",
                n + 1,
                n + 2
              ),
              params_from_iter(params.iter()),
            )?;
            (id, created_at, false)
          }
          None => {
            let placeholders = (1..=n + 2)
              .map(|i| format!("?{i}"))
              .collect::<Vec<_>>()
              .join(", ");
            params.push(Value::Text(at_str.clone()));
            params.push(Value::Text(at_str.clone()));
            tx.execute(
              &format!(
                "INSERT INTO {table} ({}, created_at, updated_at) VALUES ({placeholders})",
                columns.join(", ")
              ),
              params_from_iter(params.iter()),
            )?;
            (tx.last_insert_rowid(), at_str, true)
          }
        };

        tx.commit()?;
        Ok(written)
      })
      .await?;

    debug!(table, id, was_created, "row upserted");
    Ok(RowWrite { id, created_at: decode_dt(&created_at)?, updated_at: at, was_created })
  }

  async fn query_launches(&self, sql: String, params: Vec<Value>) -> Result<Vec<Stored<LaunchRecord>>> {
    let raws: Vec<RawLaunch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params.iter()), RawLaunch::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLaunch::into_stored).collect()
  }

  async fn query_rockets(&self, sql: String, params: Vec<Value>) -> Result<Vec<Stored<RocketRecord>>> {
    let raws: Vec<RawRocket> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params.iter()), RawRocket::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRocket::into_stored).collect()
  }

  async fn query_launchpads(
    &self,
    sql: String,
    params: Vec<Value>,
  ) -> Result<Vec<Stored<LaunchpadRecord>>> {
    let raws: Vec<RawLaunchpad> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(params.iter()), RawLaunchpad::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLaunchpad::into_stored).collect()
  }
}

/// Translate a [`LaunchQuery`] into a `WHERE` clause plus its parameters.
fn launch_filters(query: &LaunchQuery) -> (String, Vec<Value>) {
  let mut conds: Vec<&'static str> = vec![];
  let mut params: Vec<Value> = vec![];

  if let Some(year) = query.year {
    conds.push("strftime('%Y', date_utc) = ?");
    params.push(Value::Text(format!("{year:04}")));
  }
  if let Some(success) = query.success {
    conds.push("success = ?");
    params.push(Value::Integer(i64::from(success)));
  }
  if let Some(upcoming) = query.upcoming {
    conds.push("upcoming = ?");
    params.push(Value::Integer(i64::from(upcoming)));
  }
  if let Some(id) = &query.rocket_id {
    conds.push("rocket_id = ?");
    params.push(Value::Text(id.clone()));
  }
  if let Some(id) = &query.launchpad_id {
    conds.push("launchpad_id = ?");
    params.push(Value::Text(id.clone()));
  }
  if let Some(text) = &query.search {
    conds.push("(name LIKE ? OR details LIKE ? OR CAST(flight_number AS TEXT) LIKE ?)");
    let pattern = format!("%{text}%");
    params.extend(std::iter::repeat_n(Value::Text(pattern), 3));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  (where_clause, params)
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Natural-key access ────────────────────────────────────────────────────

  async fn find_launch(&self, external_id: &str) -> Result<Option<Stored<LaunchRecord>>> {
    let sql = format!("SELECT {LAUNCH_COLUMNS} FROM launches WHERE external_id = ?1");
    let rows = self.query_launches(sql, vec![Value::Text(external_id.to_owned())]).await?;
    Ok(rows.into_iter().next())
  }

  async fn find_rocket(&self, external_id: &str) -> Result<Option<Stored<RocketRecord>>> {
    let sql = format!("SELECT {ROCKET_COLUMNS} FROM rockets WHERE external_id = ?1");
    let rows = self.query_rockets(sql, vec![Value::Text(external_id.to_owned())]).await?;
    Ok(rows.into_iter().next())
  }

  async fn find_launchpad(&self, external_id: &str) -> Result<Option<Stored<LaunchpadRecord>>> {
    let sql = format!("SELECT {LAUNCHPAD_COLUMNS} FROM launchpads WHERE external_id = ?1");
    let rows = self.query_launchpads(sql, vec![Value::Text(external_id.to_owned())]).await?;
    Ok(rows.into_iter().next())
  }

  // ── Upserts ───────────────────────────────────────────────────────────────

  async fn upsert_launch(&self, record: LaunchRecord) -> Result<Upserted<LaunchRecord>> {
    let write = self.upsert_row("launches", LAUNCH_SYNCED, launch_values(&record)?).await?;
    Ok(Upserted {
      stored:      Stored {
        id: write.id,
        record,
        created_at: write.created_at,
        updated_at: write.updated_at,
      },
      was_created: write.was_created,
    })
  }

  async fn upsert_rocket(&self, record: RocketRecord) -> Result<Upserted<RocketRecord>> {
    let write = self.upsert_row("rockets", ROCKET_SYNCED, rocket_values(&record)?).await?;
    Ok(Upserted {
      stored:      Stored {
        id: write.id,
        record,
        created_at: write.created_at,
        updated_at: write.updated_at,
      },
      was_created: write.was_created,
    })
  }

  async fn upsert_launchpad(&self, record: LaunchpadRecord) -> Result<Upserted<LaunchpadRecord>> {
    let write = self
      .upsert_row("launchpads", LAUNCHPAD_SYNCED, launchpad_values(&record)?)
      .await?;
    Ok(Upserted {
      stored:      Stored {
        id: write.id,
        record,
        created_at: write.created_at,
        updated_at: write.updated_at,
      },
      was_created: write.was_created,
    })
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  async fn list_launches(&self, query: &LaunchQuery) -> Result<Page<Stored<LaunchRecord>>> {
    let query = query.clone().normalized();
    let (where_clause, params) = launch_filters(&query);

    let count_sql = format!("SELECT COUNT(*) FROM launches {where_clause}");
    let count_params = params.clone();
    let total: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&count_sql, params_from_iter(count_params.iter()), |r| r.get(0))?)
      })
      .await?;

    let order_col = match query.sort_by {
      LaunchSort::DateUtc => "date_utc",
      LaunchSort::Name => "name",
      LaunchSort::FlightNumber => "flight_number",
    };
    let direction = match query.direction {
      SortDirection::Asc => "ASC",
      SortDirection::Desc => "DESC",
    };

    let sql = format!(
      "SELECT {LAUNCH_COLUMNS} FROM launches {where_clause}
       ORDER BY {order_col} {direction}, id ASC
       LIMIT ? OFFSET ?"
    );
    let mut page_params = params;
    page_params.push(Value::Integer(i64::from(query.per_page)));
    page_params.push(Value::Integer(i64::try_from(query.offset()).unwrap_or(i64::MAX)));

    let items = self.query_launches(sql, page_params).await?;
    Ok(Page::new(items, count(total), query.page, query.per_page))
  }

  async fn list_rockets(&self, active_only: bool) -> Result<Vec<Stored<RocketRecord>>> {
    let filter = if active_only { "WHERE active = 1" } else { "" };
    let sql = format!("SELECT {ROCKET_COLUMNS} FROM rockets {filter} ORDER BY name ASC");
    self.query_rockets(sql, vec![]).await
  }

  async fn list_launchpads(&self, active_only: bool) -> Result<Vec<Stored<LaunchpadRecord>>> {
    let (filter, params) = if active_only {
      ("WHERE status = ?1", vec![Value::Text(LaunchpadRecord::ACTIVE_STATUS.to_owned())])
    } else {
      ("", vec![])
    };
    let sql = format!("SELECT {LAUNCHPAD_COLUMNS} FROM launchpads {filter} ORDER BY name ASC");
    self.query_launchpads(sql, params).await
  }

  async fn recent_launches(&self, limit: usize) -> Result<Vec<Stored<LaunchRecord>>> {
    let sql = format!(
      "SELECT {LAUNCH_COLUMNS} FROM launches WHERE upcoming = 0
       ORDER BY date_utc DESC, id DESC LIMIT ?1"
    );
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    self.query_launches(sql, vec![Value::Integer(limit)]).await
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn next_launch(&self, now: DateTime<Utc>) -> Result<Option<Stored<LaunchRecord>>> {
    let now_str = encode_dt(now);

    let flagged = format!(
      "SELECT {LAUNCH_COLUMNS} FROM launches WHERE upcoming = 1 AND date_utc > ?1
       ORDER BY date_utc ASC LIMIT 1"
    );
    if let Some(launch) = self
      .query_launches(flagged, vec![Value::Text(now_str.clone())])
      .await?
      .into_iter()
      .next()
    {
      return Ok(Some(launch));
    }

    let any = format!(
      "SELECT {LAUNCH_COLUMNS} FROM launches WHERE date_utc > ?1
       ORDER BY date_utc ASC LIMIT 1"
    );
    Ok(self.query_launches(any, vec![Value::Text(now_str)]).await?.into_iter().next())
  }

  async fn launch_stats(&self, now: DateTime<Utc>) -> Result<LaunchStats> {
    let now_str = encode_dt(now);

    let (completed, successful, failed, upcoming): (i64, i64, i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COALESCE(SUM(upcoming = 0), 0),
             COALESCE(SUM(upcoming = 0 AND success = 1), 0),
             COALESCE(SUM(upcoming = 0 AND success = 0), 0),
             COALESCE(SUM(date_utc > ?1), 0)
           FROM launches",
          [now_str],
          |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )?)
      })
      .await?;

    let (completed, successful) = (count(completed), count(successful));
    Ok(LaunchStats {
      total_launches:      completed,
      successful_launches: successful,
      failed_launches:     count(failed),
      upcoming_launches:   count(upcoming),
      success_rate:        success_rate(successful, completed),
    })
  }

  async fn launches_by_year(&self) -> Result<Vec<YearStats>> {
    let rows: Vec<(i32, i64, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT CAST(strftime('%Y', date_utc) AS INTEGER) AS year,
                  COUNT(*),
                  COALESCE(SUM(success = 1), 0)
           FROM launches
           WHERE upcoming = 0 AND date_utc IS NOT NULL
           GROUP BY year
           ORDER BY year ASC",
        )?;
        let rows = stmt
          .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(year, total, successful)| YearStats::new(year, count(total), count(successful)))
        .collect(),
    )
  }

  async fn available_years(&self) -> Result<Vec<i32>> {
    let years = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT CAST(strftime('%Y', date_utc) AS INTEGER) AS year
           FROM launches
           WHERE date_utc IS NOT NULL
           ORDER BY year DESC",
        )?;
        let years = stmt
          .query_map([], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i32>>>()?;
        Ok(years)
      })
      .await?;
    Ok(years)
  }

  async fn launch_counts_by(
    &self,
    grouping: LaunchGrouping,
    limit: usize,
  ) -> Result<Vec<NameCount>> {
    let column = match grouping {
      LaunchGrouping::Rocket => "rocket_name",
      LaunchGrouping::Launchpad => "launchpad_name",
    };
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {column}, COUNT(*) AS n
           FROM launches
           WHERE {column} IS NOT NULL
           GROUP BY {column}
           ORDER BY n DESC, {column} ASC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map([limit], |r| Ok((r.get(0)?, r.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(rows.into_iter().map(|(name, n)| NameCount { name, count: count(n) }).collect())
  }
}
