use std::{collections::HashMap, marker::PhantomData};

use chrono::{DateTime, Utc};
use rusqlite::{params_from_iter, types::Type, types::Value, Connection, OptionalExtension, Row};

use super::{
    options::{id_value, window, CompiledQuery, Page, Preload, QueryOption},
    traits::{CrudRepository, Entity},
};
use crate::{
    error::{StoreError, StoreResult},
    model::Timestamps,
};

/// SQLite's default bound-parameter ceiling is 999; stay under it.
const IN_CHUNK: usize = 900;

/// Plain repository for entities that need nothing beyond CRUD, plus the
/// base for entity-specific query helpers.
pub struct Repo<'c, T> {
    conn: &'c Connection,
    _entity: PhantomData<fn() -> T>,
}

impl<'c, T: Entity> Repo<'c, T> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> CrudRepository<T> for Repo<'_, T> {
    fn conn(&self) -> &Connection {
        self.conn
    }
}

pub(crate) fn select_columns<T: Entity>() -> String {
    let t = T::TABLE;
    ["id", "created_at", "updated_at"]
        .iter()
        .chain(T::COLUMNS.iter())
        .map(|c| format!("{t}.{c}"))
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn read_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let raw: i64 = row.get(idx)?;
    raw.try_into()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(err)))
}

pub(crate) fn read_bool(row: &Row<'_>, idx: usize) -> rusqlite::Result<bool> {
    let raw: i64 = row.get(idx)?;
    Ok(raw != 0)
}

fn read_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}

/// Reads the `created_at`/`updated_at` pair that follows the id at `at`.
pub(crate) fn read_timestamps(row: &Row<'_>, at: usize) -> rusqlite::Result<Timestamps> {
    Ok(Timestamps {
        created_at: read_datetime(row, at + 1)?,
        updated_at: read_datetime(row, at + 2)?,
    })
}

fn datetime_value(dt: &DateTime<Utc>) -> Value {
    Value::Text(dt.to_rfc3339())
}

pub(crate) fn insert<T: Entity>(conn: &Connection, entity: &mut T) -> StoreResult<()> {
    let stamps = Timestamps::now();
    let columns = ["created_at", "updated_at"]
        .iter()
        .chain(T::COLUMNS.iter())
        .copied()
        .collect::<Vec<_>>();
    let placeholders = vec!["?"; columns.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::TABLE,
        columns.join(", "),
        placeholders
    );

    let mut params = vec![
        datetime_value(&stamps.created_at),
        datetime_value(&stamps.updated_at),
    ];
    params.extend(entity.values());
    conn.execute(&sql, params_from_iter(params))?;

    entity.set_id(conn.last_insert_rowid() as u64);
    *entity.timestamps_mut() = stamps;
    Ok(())
}

/// Full-row update by primary key. `created_at` is never rewritten.
pub(crate) fn update<T: Entity>(conn: &Connection, entity: &mut T) -> StoreResult<()> {
    let updated_at = Utc::now();
    let assignments = std::iter::once("updated_at")
        .chain(T::COLUMNS.iter().copied())
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("UPDATE {} SET {} WHERE id = ?", T::TABLE, assignments);

    let mut params = vec![datetime_value(&updated_at)];
    params.extend(entity.values());
    params.push(id_value(entity.id()));
    let rows = conn.execute(&sql, params_from_iter(params))?;
    if rows == 0 {
        return Err(StoreError::not_found(T::NAME, entity.id()));
    }

    entity.timestamps_mut().updated_at = updated_at;
    Ok(())
}

pub(crate) fn delete<T: Entity>(conn: &Connection, id: u64) -> StoreResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
    let rows = conn.execute(&sql, [id_value(id)])?;
    if rows == 0 {
        return Err(StoreError::not_found(T::NAME, id));
    }
    Ok(())
}

pub(crate) fn find_by_id<T: Entity>(
    conn: &Connection,
    id: u64,
    opts: &[QueryOption],
) -> StoreResult<T> {
    let mut q = CompiledQuery::new(T::TABLE, opts);
    q.and(format!("{}.id = ?", T::TABLE), [id_value(id)]);
    find_first_compiled(conn, &q)?.ok_or_else(|| StoreError::not_found(T::NAME, id))
}

/// First row (by id, unless ordered otherwise) matching `opts`.
pub(crate) fn find_first<T: Entity>(
    conn: &Connection,
    opts: &[QueryOption],
) -> StoreResult<Option<T>> {
    find_first_compiled(conn, &CompiledQuery::new(T::TABLE, opts))
}

fn find_first_compiled<T: Entity>(conn: &Connection, q: &CompiledQuery) -> StoreResult<Option<T>> {
    let sql = format!(
        "SELECT {} FROM {} {} {} LIMIT 1",
        select_columns::<T>(),
        T::TABLE,
        q.where_sql(),
        q.order_sql()
    );
    let found = conn
        .query_row(&sql, params_from_iter(q.params.iter()), |row| {
            T::from_row_at(row, 0)
        })
        .optional()?;

    match found {
        Some(mut entity) => {
            apply_preloads(conn, std::slice::from_mut(&mut entity), &q.preloads)?;
            Ok(Some(entity))
        }
        None => Ok(None),
    }
}

/// Every row matching `opts`, unpaginated.
pub(crate) fn find_all<T: Entity>(conn: &Connection, opts: &[QueryOption]) -> StoreResult<Vec<T>> {
    let q = CompiledQuery::new(T::TABLE, opts);
    let sql = format!(
        "SELECT {} FROM {} {} {}",
        select_columns::<T>(),
        T::TABLE,
        q.where_sql(),
        q.order_sql()
    );
    let mut items = query_all::<T>(conn, &sql, q.params.iter())?;
    apply_preloads(conn, &mut items, &q.preloads)?;
    Ok(items)
}

/// Counts first, then fetches the requested page: two round-trips.
pub(crate) fn list<T: Entity>(
    conn: &Connection,
    page: Page,
    opts: &[QueryOption],
) -> StoreResult<(Vec<T>, u64)> {
    let q = CompiledQuery::new(T::TABLE, opts);

    let count_sql = format!("SELECT COUNT(*) FROM {} {}", T::TABLE, q.where_sql());
    let total: i64 = conn.query_row(&count_sql, params_from_iter(q.params.iter()), |row| {
        row.get(0)
    })?;

    let sql = format!(
        "SELECT {} FROM {} {} {} LIMIT ? OFFSET ?",
        select_columns::<T>(),
        T::TABLE,
        q.where_sql(),
        q.order_sql()
    );
    let params = q
        .params
        .iter()
        .cloned()
        .chain(window(page.offset(), page.page_size))
        .collect::<Vec<_>>();
    let mut items = query_all::<T>(conn, &sql, params.iter())?;
    apply_preloads(conn, &mut items, &q.preloads)?;

    Ok((items, total.max(0) as u64))
}

pub(crate) fn query_all<'p, T: Entity>(
    conn: &Connection,
    sql: &str,
    params: impl Iterator<Item = &'p Value>,
) -> StoreResult<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params_from_iter(params), |row| T::from_row_at(row, 0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

pub(crate) fn apply_preloads<T: Entity>(
    conn: &Connection,
    items: &mut [T],
    preloads: &[Preload],
) -> StoreResult<()> {
    if items.is_empty() {
        return Ok(());
    }
    for relation in preloads {
        T::preload(conn, items, *relation)?;
    }
    Ok(())
}

/// Runs `sql` once per chunk of `ids`, substituting the chunk's placeholder
/// list for `{ids}`, and collects every mapped row.
pub(crate) fn query_in_chunks<R, F>(
    conn: &Connection,
    sql: &str,
    ids: &[u64],
    mut map: F,
) -> StoreResult<Vec<R>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<R>,
{
    let mut out = Vec::new();
    for chunk in ids.chunks(IN_CHUNK) {
        let placeholders = vec!["?"; chunk.len()].join(", ");
        let sql = sql.replace("{ids}", &placeholders);
        let mut stmt = conn.prepare(&sql)?;
        let mapped = stmt
            .query_map(params_from_iter(chunk.iter().map(|id| *id as i64)), &mut map)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        out.extend(mapped);
    }
    Ok(out)
}

/// Groups related rows under the id of the row they belong to.
pub(crate) fn group_by<R>(rows: Vec<R>, key: impl Fn(&R) -> u64) -> HashMap<u64, Vec<R>> {
    let mut grouped: HashMap<u64, Vec<R>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

pub(crate) fn unique_ids<T>(items: &[T], id: impl Fn(&T) -> u64) -> Vec<u64> {
    let mut ids = items.iter().map(id).collect::<Vec<_>>();
    ids.sort_unstable();
    ids.dedup();
    ids
}
