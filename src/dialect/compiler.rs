//! Query compilation.
//!
//! [`QueryCompiler`] carries the generic rendering rules as default methods:
//! double-quoted identifiers, `expr as alias`, `$N` placeholders. A dialect
//! overrides only the rules it disagrees with; [`OracleQueryCompiler`]
//! overrides identifier wrapping and alias rendering.

use super::query::{Expr, SelectQuery, Selection, TableRef};
use crate::models::{CompiledQuery, QueryParam};

/// Output buffer shared by the visitor methods during one compilation.
#[derive(Debug, Default)]
pub struct CompileContext {
    sql: String,
    parameters: Vec<QueryParam>,
}

impl CompileContext {
    pub fn append(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Record a bind value and return its 1-based position.
    pub fn push_parameter(&mut self, value: QueryParam) -> usize {
        self.parameters.push(value);
        self.parameters.len()
    }

    pub fn finish(self) -> CompiledQuery {
        CompiledQuery::new(self.sql, self.parameters)
    }
}

/// Node being aliased.
#[derive(Debug, Clone, Copy)]
pub enum AliasTarget<'a> {
    Expr(&'a Expr),
    Table(&'a str),
}

pub trait QueryCompiler: Send + Sync {
    fn left_identifier_wrapper(&self) -> &str {
        "\""
    }

    fn right_identifier_wrapper(&self) -> &str {
        "\""
    }

    /// Placeholder for the bind value at 1-based `position`.
    fn parameter_placeholder(&self, position: usize) -> String {
        format!("${}", position)
    }

    fn compile(&self, query: &SelectQuery) -> CompiledQuery {
        let mut cx = CompileContext::default();
        self.visit_select(query, &mut cx);
        cx.finish()
    }

    fn visit_select(&self, query: &SelectQuery, cx: &mut CompileContext) {
        cx.append("select ");
        if query.selections.is_empty() {
            cx.append("*");
        }
        for (i, selection) in query.selections.iter().enumerate() {
            if i > 0 {
                cx.append(", ");
            }
            self.visit_selection(selection, cx);
        }

        cx.append(" from ");
        self.visit_table(&query.from, cx);

        for (i, filter) in query.filters.iter().enumerate() {
            cx.append(if i == 0 { " where " } else { " and " });
            self.visit_expr(filter, cx);
        }

        for (i, column) in query.order_by.iter().enumerate() {
            cx.append(if i == 0 { " order by " } else { ", " });
            self.visit_identifier(column, cx);
        }

        if let Some(rows) = query.fetch {
            cx.append(" fetch next ");
            self.visit_value(&QueryParam::Int(rows as i64), cx);
            cx.append(" rows only");
        }
    }

    fn visit_selection(&self, selection: &Selection, cx: &mut CompileContext) {
        match &selection.alias {
            Some(alias) => self.visit_alias(AliasTarget::Expr(&selection.expr), alias, cx),
            None => self.visit_expr(&selection.expr, cx),
        }
    }

    fn visit_table(&self, table: &TableRef, cx: &mut CompileContext) {
        match &table.alias {
            Some(alias) => self.visit_alias(AliasTarget::Table(&table.name), alias, cx),
            None => self.visit_identifier(&table.name, cx),
        }
    }

    fn visit_alias(&self, node: AliasTarget<'_>, alias: &str, cx: &mut CompileContext) {
        self.visit_alias_target(node, cx);
        cx.append(" as ");
        self.visit_identifier(alias, cx);
    }

    fn visit_alias_target(&self, node: AliasTarget<'_>, cx: &mut CompileContext) {
        match node {
            AliasTarget::Expr(expr) => self.visit_expr(expr, cx),
            AliasTarget::Table(name) => self.visit_identifier(name, cx),
        }
    }

    fn visit_identifier(&self, name: &str, cx: &mut CompileContext) {
        let left = self.left_identifier_wrapper();
        let right = self.right_identifier_wrapper();
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                cx.append(".");
            }
            cx.append(left);
            if right.is_empty() {
                cx.append(part);
            } else {
                cx.append(&part.replace(right, &right.repeat(2)));
            }
            cx.append(right);
        }
    }

    fn visit_expr(&self, expr: &Expr, cx: &mut CompileContext) {
        match expr {
            Expr::Column(name) => self.visit_identifier(name, cx),
            Expr::Value(value) => self.visit_value(value, cx),
            Expr::Binary { left, op, right } => {
                self.visit_expr(left, cx);
                cx.append(" ");
                cx.append(op.as_str());
                cx.append(" ");
                self.visit_expr(right, cx);
            }
            Expr::In { expr, values } => {
                self.visit_expr(expr, cx);
                cx.append(" in (");
                if values.is_empty() {
                    // Matches nothing instead of producing `in ()`
                    cx.append("null");
                }
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        cx.append(", ");
                    }
                    self.visit_value(value, cx);
                }
                cx.append(")");
            }
            Expr::Or(exprs) => self.visit_group(exprs, " or ", cx),
        }
    }

    fn visit_group(&self, exprs: &[Expr], separator: &str, cx: &mut CompileContext) {
        cx.append("(");
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                cx.append(separator);
            }
            self.visit_expr(expr, cx);
        }
        cx.append(")");
    }

    fn visit_value(&self, value: &QueryParam, cx: &mut CompileContext) {
        let position = cx.push_parameter(value.clone());
        cx.append(&self.parameter_placeholder(position));
    }
}

/// Generic rendering with no dialect overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultQueryCompiler;

impl QueryCompiler for DefaultQueryCompiler {}

/// Oracle rendering: unquoted identifiers and aliases without `as`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleQueryCompiler;

impl QueryCompiler for OracleQueryCompiler {
    fn left_identifier_wrapper(&self) -> &str {
        ""
    }

    fn right_identifier_wrapper(&self) -> &str {
        ""
    }

    fn visit_alias(&self, node: AliasTarget<'_>, alias: &str, cx: &mut CompileContext) {
        self.visit_alias_target(node, cx);
        cx.append(" ");
        self.visit_identifier(alias, cx);
    }
}
