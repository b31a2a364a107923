//! Typed filter clauses rendered into parameterised SQLite SELECTs.
//!
//! A search is a tree of `{column, operator, value}` clauses combined with `All`/`Any`.
//! Columns are `'static` SQL expressions taken from the field allow-lists; values are always
//! bound. Every statement selects from a named sub-query (`base`) whose columns are the
//! JSON-extracted pseudo-columns of one media table.

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use warehouse_core::models::{Page, SphericalPoint};

/// A column reference or computed expression over `base`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// SQL expression over `base` columns, e.g. `make` or `CAST(id AS TEXT)`
    Expr(&'static str),
    /// Cosine of the central angle between the row's coordinates and a fixed point
    GeoCos(SphericalPoint),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Case-insensitive substring match
    Contains,
    /// Case-insensitive for text, exact for numbers
    Equals,
    NotEquals,
    AtLeast,
    AtMost,
    Above,
    Below,
    /// Inclusive range; takes an `Operand::Range`
    Between,
    /// NULL or whitespace-only
    IsBlank,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Text(String),
    Int(i64),
    Real(f64),
    Range(Box<Operand>, Box<Operand>),
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub column: Column,
    pub operator: Operator,
    pub value: Operand,
}

impl Clause {
    pub fn new(column: Column, operator: Operator, value: Operand) -> Self {
        Self {
            column,
            operator,
            value,
        }
    }

    pub fn contains(column: &'static str, value: impl Into<String>) -> Self {
        Self::new(Column::Expr(column), Operator::Contains, Operand::Text(value.into()))
    }

    pub fn equals(column: &'static str, value: impl Into<String>) -> Self {
        Self::new(Column::Expr(column), Operator::Equals, Operand::Text(value.into()))
    }

    pub fn at_least(column: &'static str, value: Operand) -> Self {
        Self::new(Column::Expr(column), Operator::AtLeast, value)
    }

    pub fn at_most(column: &'static str, value: Operand) -> Self {
        Self::new(Column::Expr(column), Operator::AtMost, value)
    }

    pub fn below(column: &'static str, value: Operand) -> Self {
        Self::new(Column::Expr(column), Operator::Below, value)
    }

    pub fn above(column: &'static str, value: Operand) -> Self {
        Self::new(Column::Expr(column), Operator::Above, value)
    }

    pub fn between(column: &'static str, low: Operand, high: Operand) -> Self {
        Self::new(
            Column::Expr(column),
            Operator::Between,
            Operand::Range(Box::new(low), Box::new(high)),
        )
    }

    pub fn is_blank(column: &'static str) -> Self {
        Self::new(Column::Expr(column), Operator::IsBlank, Operand::None)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Clause(Clause),
    All(Vec<Filter>),
    Any(Vec<Filter>),
}

impl Filter {
    /// Matches every row.
    pub fn everything() -> Self {
        Filter::All(Vec::new())
    }

    /// Number of leaf clauses in the tree.
    pub fn clause_count(&self) -> usize {
        match self {
            Filter::Clause(_) => 1,
            Filter::All(parts) | Filter::Any(parts) => parts.iter().map(Filter::clause_count).sum(),
        }
    }
}

impl From<Clause> for Filter {
    fn from(clause: Clause) -> Self {
        Filter::Clause(clause)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderTerm {
    Asc(Column),
    Desc(Column),
    /// Rows satisfying the clause first
    MatchesFirst(Clause),
    Random,
}

/// Escape LIKE wildcards and wrap the value as a case-folded substring pattern.
pub fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_column(qb: &mut QueryBuilder<'static, Sqlite>, column: &Column) {
    match column {
        Column::Expr(expr) => {
            qb.push(*expr);
        }
        Column::GeoCos(point) => {
            qb.push("(sin_lat * ");
            qb.push_bind(point.sin_lat);
            qb.push(" + cos_lat * ");
            qb.push_bind(point.cos_lat);
            qb.push(" * (cos_lon * ");
            qb.push_bind(point.cos_lon);
            qb.push(" + sin_lon * ");
            qb.push_bind(point.sin_lon);
            qb.push("))");
        }
    }
}

fn push_operand(qb: &mut QueryBuilder<'static, Sqlite>, operand: &Operand) {
    match operand {
        Operand::Text(value) => {
            qb.push_bind(value.clone());
        }
        Operand::Int(value) => {
            qb.push_bind(*value);
        }
        Operand::Real(value) => {
            qb.push_bind(*value);
        }
        Operand::Range(low, high) => {
            push_operand(qb, low);
            qb.push(" AND ");
            push_operand(qb, high);
        }
        Operand::None => {
            qb.push("NULL");
        }
    }
}

fn push_comparison(qb: &mut QueryBuilder<'static, Sqlite>, clause: &Clause, symbol: &str) {
    push_column(qb, &clause.column);
    qb.push(symbol);
    push_operand(qb, &clause.value);
}

fn push_clause(qb: &mut QueryBuilder<'static, Sqlite>, clause: &Clause) {
    match (clause.operator, &clause.value) {
        (Operator::Contains, value) => {
            let text = match value {
                Operand::Text(text) => text.clone(),
                Operand::Int(n) => n.to_string(),
                Operand::Real(x) => x.to_string(),
                Operand::Range(..) | Operand::None => String::new(),
            };
            qb.push("LOWER(");
            push_column(qb, &clause.column);
            qb.push(") LIKE ");
            qb.push_bind(like_pattern(&text));
            qb.push(" ESCAPE '\\'");
        }
        (Operator::Equals, Operand::Text(text)) => {
            qb.push("LOWER(");
            push_column(qb, &clause.column);
            qb.push(") = ");
            qb.push_bind(text.to_lowercase());
        }
        (Operator::Equals, _) => push_comparison(qb, clause, " = "),
        (Operator::NotEquals, _) => push_comparison(qb, clause, " <> "),
        (Operator::AtLeast, _) => push_comparison(qb, clause, " >= "),
        (Operator::AtMost, _) => push_comparison(qb, clause, " <= "),
        (Operator::Above, _) => push_comparison(qb, clause, " > "),
        (Operator::Below, _) => push_comparison(qb, clause, " < "),
        (Operator::Between, _) => push_comparison(qb, clause, " BETWEEN "),
        (Operator::IsBlank, _) => {
            qb.push("(");
            push_column(qb, &clause.column);
            qb.push(" IS NULL OR TRIM(");
            push_column(qb, &clause.column);
            qb.push(") = '')");
        }
    }
}

/// Render a filter tree. Empty `All` is true, empty `Any` is false.
pub fn push_filter(qb: &mut QueryBuilder<'static, Sqlite>, filter: &Filter) {
    match filter {
        Filter::Clause(clause) => push_clause(qb, clause),
        Filter::All(parts) if parts.is_empty() => {
            qb.push("1 = 1");
        }
        Filter::Any(parts) if parts.is_empty() => {
            qb.push("1 = 0");
        }
        Filter::All(parts) | Filter::Any(parts) => {
            let joiner = if matches!(filter, Filter::All(_)) {
                " AND "
            } else {
                " OR "
            };
            qb.push("(");
            for (i, part) in parts.iter().enumerate() {
                if i > 0 {
                    qb.push(joiner);
                }
                push_filter(qb, part);
            }
            qb.push(")");
        }
    }
}

fn push_order(qb: &mut QueryBuilder<'static, Sqlite>, order: &[OrderTerm]) {
    if order.is_empty() {
        return;
    }
    qb.push(" ORDER BY ");
    for (i, term) in order.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        match term {
            OrderTerm::Asc(column) => {
                push_column(qb, column);
                qb.push(" ASC");
            }
            OrderTerm::Desc(column) => {
                push_column(qb, column);
                qb.push(" DESC");
            }
            OrderTerm::MatchesFirst(clause) => {
                qb.push("(");
                push_clause(qb, clause);
                qb.push(") DESC");
            }
            OrderTerm::Random => {
                qb.push("RANDOM()");
            }
        }
    }
}

/// A SELECT over one media table's pseudo-columns.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    source: &'static str,
    computed: Vec<(Column, &'static str)>,
    filter: Filter,
    order: Vec<OrderTerm>,
}

impl SelectQuery {
    /// `source` is a complete SELECT producing the `base` columns.
    pub fn from_source(source: &'static str) -> Self {
        Self {
            source,
            computed: Vec::new(),
            filter: Filter::everything(),
            order: Vec::new(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Add an extra output column computed per row.
    pub fn computed(mut self, column: Column, alias: &'static str) -> Self {
        self.computed.push((column, alias));
        self
    }

    pub fn order_by(mut self, term: OrderTerm) -> Self {
        self.order.push(term);
        self
    }

    fn push_from_where(&self, qb: &mut QueryBuilder<'static, Sqlite>) {
        qb.push(" FROM (");
        qb.push(self.source);
        qb.push(") AS base WHERE ");
        push_filter(qb, &self.filter);
    }

    /// SELECT of one page of rows.
    pub fn select(&self, page: Page) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT base.*");
        for (column, alias) in &self.computed {
            qb.push(", ");
            push_column(&mut qb, column);
            qb.push(" AS ");
            qb.push(*alias);
        }
        self.push_from_where(&mut qb);
        push_order(&mut qb, &self.order);
        qb.push(" LIMIT ");
        qb.push_bind(page.limit);
        qb.push(" OFFSET ");
        qb.push_bind(page.offset);
        qb
    }

    /// COUNT(*) of all rows matching the filter.
    pub fn count(&self) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*)");
        self.push_from_where(&mut qb);
        qb
    }
}

/// Run the page query and the matching COUNT.
pub async fn fetch_page<T>(
    pool: &SqlitePool,
    query: &SelectQuery,
    page: Page,
) -> Result<(Vec<T>, i64), sqlx::Error>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let mut select = query.select(page);
    let rows = select.build_query_as::<T>().fetch_all(pool).await?;
    let mut count = query.count();
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;
    Ok((rows, total))
}
