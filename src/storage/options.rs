use rusqlite::types::Value;

/// Page size used by admin listings when none is requested.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Page size used by the machine-consumable content API.
pub const API_PAGE_SIZE: u64 = 100;

/// Related rows a query can eager-load alongside its primary entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preload {
    /// Collection -> its Fields.
    Fields,
    /// Content -> its owning Collection (without fields).
    Collection,
    /// Content -> every ContentValue, each with its Field attached.
    ContentValues,
    /// Content -> only ContentValues whose Field is a display field.
    DisplayContentValues,
    /// ContentValue -> its Field.
    Field,
}

/// A composable query modifier. Options are applied in order; filters are
/// AND-ed together, preloads run after the primary fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryOption {
    Eq(&'static str, Value),
    In(&'static str, Vec<Value>),
    OrderBy(&'static str),
    Preload(Preload),
}

impl QueryOption {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        QueryOption::Eq(column, value.into())
    }

    pub fn id_eq(column: &'static str, id: u64) -> Self {
        QueryOption::Eq(column, id_value(id))
    }

    pub fn preload(relation: Preload) -> Self {
        QueryOption::Preload(relation)
    }
}

pub(crate) fn id_value(id: u64) -> Value {
    Value::Integer(id as i64)
}

/// SQL fragments compiled from a list of options for one table.
#[derive(Debug, Default)]
pub(crate) struct CompiledQuery {
    clauses: Vec<String>,
    order: Vec<String>,
    pub params: Vec<Value>,
    pub preloads: Vec<Preload>,
}

impl CompiledQuery {
    pub fn new(table: &str, opts: &[QueryOption]) -> Self {
        let mut q = CompiledQuery::default();
        for opt in opts {
            match opt {
                QueryOption::Eq(column, value) => {
                    q.clauses.push(format!("{table}.{column} = ?"));
                    q.params.push(value.clone());
                }
                QueryOption::In(column, values) if values.is_empty() => {
                    q.clauses.push(format!("0 /* {table}.{column} IN () */"));
                }
                QueryOption::In(column, values) => {
                    let placeholders = vec!["?"; values.len()].join(", ");
                    q.clauses
                        .push(format!("{table}.{column} IN ({placeholders})"));
                    q.params.extend(values.iter().cloned());
                }
                QueryOption::OrderBy(column) => q.order.push(format!("{table}.{column}")),
                QueryOption::Preload(relation) => q.preloads.push(*relation),
            }
        }
        q.order.push(format!("{table}.id"));
        q
    }

    /// Adds a raw clause (already table-qualified) with its parameters.
    pub fn and(&mut self, clause: impl Into<String>, params: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause.into());
        self.params.extend(params);
    }

    pub fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.clauses.join(" AND "))
        }
    }

    pub fn order_sql(&self) -> String {
        format!("ORDER BY {}", self.order.join(", "))
    }
}

/// A 1-based page request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub page_size: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl Page {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// Parses raw query-string values, falling back to page 1 and
    /// `default_size` for anything missing or malformed.
    pub fn parse(page: Option<&str>, page_size: Option<&str>, default_size: u64) -> Self {
        let page = page.and_then(|p| p.trim().parse().ok()).unwrap_or(1);
        let page_size = page_size
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(default_size);
        Self::new(page, page_size)
    }

    /// Rows skipped before this page. Saturates for page numbers far past
    /// any stored data.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }
}

/// `LIMIT ? OFFSET ?` parameters where a zero limit means unbounded. Both
/// are clamped to SQLite's signed range; a negative OFFSET would be read
/// as zero.
pub(crate) fn window(offset: u64, limit: u64) -> [Value; 2] {
    let limit = if limit == 0 { -1 } else { clamp_i64(limit) };
    [Value::Integer(limit), Value::Integer(clamp_i64(offset))]
}

fn clamp_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
