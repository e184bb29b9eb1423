//! Select-query AST handed to a [`QueryCompiler`](super::QueryCompiler).
//!
//! Only the shapes catalog introspection needs are modelled: a single source
//! table, plain or aliased selections, AND-ed filters built from comparisons,
//! `IN` lists and `OR` groups, an ordering and a row limit.

use crate::models::QueryParam;

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub expr: Expr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference; `table.column` is split and wrapped part by part
    Column(String),
    /// Bound value, compiled to a placeholder
    Value(QueryParam),
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    In {
        expr: Box<Expr>,
        values: Vec<QueryParam>,
    },
    Or(Vec<Expr>),
}

impl Expr {
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column(name.into())
    }

    pub fn val(value: impl Into<QueryParam>) -> Self {
        Self::Value(value.into())
    }

    pub fn eq(self, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(self),
            op: BinaryOp::Eq,
            right: Box::new(right),
        }
    }

    pub fn in_list<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryParam>,
    {
        Self::In {
            expr: Box::new(self),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn or(exprs: Vec<Expr>) -> Self {
        Self::Or(exprs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    pub from: TableRef,
    pub selections: Vec<Selection>,
    /// Combined with `and`
    pub filters: Vec<Expr>,
    pub order_by: Vec<String>,
    pub fetch: Option<u64>,
}

impl SelectQuery {
    /// Start a query against `table`.
    pub fn select_from(table: impl Into<String>) -> Self {
        Self {
            from: TableRef {
                name: table.into(),
                alias: None,
            },
            selections: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            fetch: None,
        }
    }

    /// Alias the source table.
    pub fn from_alias(mut self, alias: impl Into<String>) -> Self {
        self.from.alias = Some(alias.into());
        self
    }

    /// Add plain column selections.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.selections
            .extend(columns.iter().map(|column| Selection {
                expr: Expr::column(*column),
                alias: None,
            }));
        self
    }

    /// Add an aliased selection.
    pub fn select_as(mut self, expr: Expr, alias: impl Into<String>) -> Self {
        self.selections.push(Selection {
            expr,
            alias: Some(alias.into()),
        });
        self
    }

    /// Add a filter; multiple filters are AND-ed.
    pub fn where_expr(mut self, expr: Expr) -> Self {
        self.filters.push(expr);
        self
    }

    /// Add `column in (values)`.
    pub fn where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryParam>,
    {
        self.where_expr(Expr::column(column).in_list(values))
    }

    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by.push(column.into());
        self
    }

    /// Limit the number of rows returned.
    pub fn fetch(mut self, rows: u64) -> Self {
        self.fetch = Some(rows);
        self
    }
}
