//! Generic resource repository.
//!
//! A [`Resource`] describes how a table is listed: which column free-text
//! search matches, which equality filters exist, which columns may be sorted
//! on, and whether the table carries an explicit `sort_order`. [`list`] turns a
//! [`ListQuery`] into one `COUNT(*)` and one page `SELECT` sharing the same
//! `WHERE` clause.
//!
//! Result order is always total: the last sort key is the primary key, so the
//! same input yields the same page. Drag reordering relies on this because it
//! addresses rows by their page-relative index.

use chrono::NaiveDate;
use quillboard_core::{Page, PageMeta, PageParams};
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// Listing metadata for a table.
///
/// All column names are unqualified; they are prefixed with [`Resource::ALIAS`]
/// when the SQL is built.
pub trait Resource: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    const TABLE: &'static str;
    const ALIAS: &'static str;
    /// Select list, e.g. `b.*, c.name AS category_name`.
    const COLUMNS: &'static str;
    /// Extra `JOIN` clauses appended after `FROM {TABLE} {ALIAS}`.
    const JOINS: &'static str = "";
    /// Columns matched case-insensitively by `search`.
    const SEARCH_COLUMNS: &'static [&'static str];
    /// Columns accepted as equality filters. Anything else is ignored.
    const FILTER_COLUMNS: &'static [&'static str] = &[];
    /// Columns accepted as `sort_by`.
    const SORTABLE: &'static [&'static str];
    /// Whether the table has an explicit `sort_order` primary sort key.
    const ORDERED: bool = false;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `asc` in any case is ascending; anything else is descending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Resource-independent list request.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub filters: Vec<(String, FilterValue)>,
    /// Inclusive lower bound on the creation date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the creation date.
    pub date_to: Option<NaiveDate>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: PageParams,
}

impl ListQuery {
    pub fn new(page: PageParams) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }

    pub fn search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }

    /// Adds an equality filter when `value` is present.
    pub fn filter<V: Into<FilterValue>>(mut self, column: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.filters.push((column.to_string(), value.into()));
        }
        self
    }

    pub fn created_between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn sort(mut self, sort_by: Option<String>, sort_order: Option<String>) -> Self {
        self.sort_by = sort_by;
        self.sort_order = sort_order;
        self
    }
}

/// Escapes `LIKE` wildcards so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_from<T: Resource>(qb: &mut QueryBuilder<'_, Postgres>) {
    qb.push(" FROM ")
        .push(T::TABLE)
        .push(" ")
        .push(T::ALIAS);
    if !T::JOINS.is_empty() {
        qb.push(" ").push(T::JOINS);
    }
}

fn push_where<'a, T: Resource>(qb: &mut QueryBuilder<'a, Postgres>, query: &'a ListQuery) {
    let alias = T::ALIAS;
    qb.push(" WHERE 1=1");

    if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty())
        && !T::SEARCH_COLUMNS.is_empty()
    {
        let pattern = like_pattern(search);
        qb.push(" AND (");
        for (i, column) in T::SEARCH_COLUMNS.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(format!("{alias}.{column} ILIKE "))
                .push_bind(pattern.clone());
        }
        qb.push(")");
    }

    for (column, value) in &query.filters {
        let Some(column) = T::FILTER_COLUMNS.iter().find(|c| **c == column.as_str()) else {
            debug!(filter = %column, table = T::TABLE, "Ignoring unknown filter");
            continue;
        };
        qb.push(format!(" AND {alias}.{column} = "));
        match value {
            FilterValue::Text(v) => qb.push_bind(v.as_str()),
            FilterValue::Int(v) => qb.push_bind(*v),
            FilterValue::Bool(v) => qb.push_bind(*v),
        };
    }

    if let Some(from) = query.date_from {
        qb.push(format!(" AND {alias}.created_at::date >= "))
            .push_bind(from);
    }
    if let Some(to) = query.date_to {
        qb.push(format!(" AND {alias}.created_at::date <= "))
            .push_bind(to);
    }
}

/// `ORDER BY` clause. Ordered resources sort by `sort_order` first with the
/// requested column as tiebreaker; others sort by the requested column or
/// newest first. The primary key always closes the clause.
pub fn order_clause<T: Resource>(query: &ListQuery) -> String {
    let alias = T::ALIAS;
    let requested = query
        .sort_by
        .as_deref()
        .map(str::trim)
        .and_then(|s| T::SORTABLE.iter().find(|c| **c == s));

    let secondary = match requested {
        Some(column) => format!(
            "{alias}.{column} {}",
            SortDirection::parse(query.sort_order.as_deref()).as_sql()
        ),
        None => format!("{alias}.created_at DESC"),
    };

    if T::ORDERED {
        format!(" ORDER BY {alias}.sort_order ASC, {secondary}, {alias}.id ASC")
    } else {
        format!(" ORDER BY {secondary}, {alias}.id ASC")
    }
}

pub fn build_count<'a, T: Resource>(query: &'a ListQuery) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*)");
    push_from::<T>(&mut qb);
    push_where::<T>(&mut qb, query);
    qb
}

/// Page `SELECT`. With `paged = false` every matching row is returned, which
/// is what export uses.
pub fn build_select<'a, T: Resource>(query: &'a ListQuery, paged: bool) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {}", T::COLUMNS));
    push_from::<T>(&mut qb);
    push_where::<T>(&mut qb, query);
    qb.push(order_clause::<T>(query));
    if paged {
        qb.push(" LIMIT ")
            .push_bind(query.page.per_page())
            .push(" OFFSET ")
            .push_bind(query.page.offset());
    }
    qb
}

#[instrument(skip(db, query), fields(db.table = T::TABLE, db.operation = "SELECT"))]
pub async fn list<T: Resource>(db: &PgPool, query: &ListQuery) -> Result<Page<T>, sqlx::Error> {
    let total: i64 = build_count::<T>(query)
        .build_query_scalar()
        .fetch_one(db)
        .await?;

    let rows = build_select::<T>(query, true)
        .build_query_as::<T>()
        .fetch_all(db)
        .await?;

    debug!(total, returned = rows.len(), "Listed records");

    Ok(Page::new(rows, PageMeta::new(&query.page, total)))
}

/// Every row matching the filters, in list order.
#[instrument(skip(db, query), fields(db.table = T::TABLE, db.operation = "SELECT"))]
pub async fn list_all<T: Resource>(db: &PgPool, query: &ListQuery) -> Result<Vec<T>, sqlx::Error> {
    build_select::<T>(query, false)
        .build_query_as::<T>()
        .fetch_all(db)
        .await
}

#[instrument(skip(db), fields(db.table = T::TABLE, db.operation = "SELECT"))]
pub async fn find<T: Resource>(db: &PgPool, id: i64) -> Result<Option<T>, sqlx::Error> {
    let mut qb = QueryBuilder::new(format!("SELECT {}", T::COLUMNS));
    push_from::<T>(&mut qb);
    qb.push(format!(" WHERE {}.id = ", T::ALIAS)).push_bind(id);
    qb.build_query_as::<T>().fetch_optional(db).await
}

pub async fn exists(db: &PgPool, table: &'static str, id: i64) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(&format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)"))
        .bind(id)
        .fetch_one(db)
        .await
}

/// Deletes one row. Returns `false` when no row had that id.
#[instrument(skip(db), fields(db.table = T::TABLE, db.operation = "DELETE"))]
pub async fn delete<T: Resource>(db: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", T::TABLE))
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes every listed row that exists; unknown ids are skipped.
#[instrument(skip(db, ids), fields(db.table = T::TABLE, db.operation = "DELETE", ids.count = ids.len()))]
pub async fn bulk_delete<T: Resource>(db: &PgPool, ids: &[i64]) -> Result<u64, sqlx::Error> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ANY($1)", T::TABLE))
        .bind(ids)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}
