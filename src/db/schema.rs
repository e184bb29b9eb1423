//! Schema introspection against the Oracle data dictionary.
//!
//! Metadata is resolved in stages, each one a single catalog query whose
//! result feeds the next: schemas from `all_users`, then tables or views of
//! those schemas, then the columns of exactly those objects. Every stage
//! accepts an optional allow-list; an empty allow-list matches everything.

use crate::config::GeneratorConfig;
use crate::db::database::Database;
use crate::db::native::NativePool;
use crate::dialect::query::{Expr, SelectQuery};
use crate::error::{DbError, DbResult};
use crate::logger::Logger;
use crate::models::{
    ColumnMetadata, DatabaseMetadata, MetadataOptions, QueryParam, Row, SchemaMetadata,
    TableMetadata,
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Largest allow-list sent in one `IN (...)`; Oracle rejects more than 1000.
pub const MAX_IN_LIST: usize = 999;

/// Row limit of the schema and object stages.
pub const MAX_ROWS: u64 = 999;

pub const SYSTEM_SCHEMA: &str = "SYS";
pub const DUAL_TABLE: &str = "DUAL";

#[derive(Debug, Clone, Copy)]
enum ObjectKind {
    Table,
    View,
}

impl ObjectKind {
    fn catalog(self) -> &'static str {
        match self {
            Self::Table => "all_tables",
            Self::View => "all_views",
        }
    }

    fn name_column(self) -> &'static str {
        match self {
            Self::Table => "table_name",
            Self::View => "view_name",
        }
    }

    fn is_view(self) -> bool {
        matches!(self, Self::View)
    }
}

/// Catalog reader for one database handle.
pub struct OracleIntrospector<P: NativePool> {
    db: Arc<Database<P>>,
    schemas: Vec<String>,
    tables: Vec<String>,
    views: Vec<String>,
    log: Logger,
}

impl<P: NativePool> OracleIntrospector<P> {
    pub fn new(db: Arc<Database<P>>) -> Self {
        let log = db.log().clone();
        Self {
            db,
            schemas: Vec::new(),
            tables: Vec::new(),
            views: Vec::new(),
            log,
        }
    }

    /// Take the allow-lists from a generator configuration.
    pub fn from_config(db: Arc<Database<P>>, config: &GeneratorConfig) -> Self {
        Self::new(db)
            .with_schemas(config.schemas.clone())
            .with_tables(config.tables.clone())
            .with_views(config.views.clone())
    }

    pub fn with_schemas(mut self, schemas: Vec<String>) -> Self {
        self.schemas = schemas;
        self
    }

    pub fn with_tables(mut self, tables: Vec<String>) -> Self {
        self.tables = tables;
        self
    }

    pub fn with_views(mut self, views: Vec<String>) -> Self {
        self.views = views;
        self
    }

    pub async fn get_schemas(&self) -> DbResult<Vec<SchemaMetadata>> {
        let query = SelectQuery::select_from("all_users")
            .select(&["username"])
            .where_expr(self.allow_list_filter("username", &self.schemas))
            .fetch(MAX_ROWS);

        let result = self.db.execute(&query).await?;
        let schemas = result
            .rows
            .iter()
            .map(|row| {
                Ok(SchemaMetadata {
                    name: string_field(row, "username", "all_users")?,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        self.log
            .scope(|| debug!(count = schemas.len(), "Resolved schemas"));
        Ok(schemas)
    }

    /// Tables of the resolved schemas, plus `SYS.DUAL`.
    pub async fn get_tables(&self) -> DbResult<Vec<TableMetadata>> {
        let schemas = self.get_schemas().await?;
        self.objects(ObjectKind::Table, &schemas).await
    }

    pub async fn get_views(&self) -> DbResult<Vec<TableMetadata>> {
        let schemas = self.get_schemas().await?;
        self.objects(ObjectKind::View, &schemas).await
    }

    /// Resolve schemas once, then tables and/or views per the resolution mode.
    /// Tables come first when both are requested.
    pub async fn get_metadata(&self, options: MetadataOptions) -> DbResult<DatabaseMetadata> {
        let schemas = self.get_schemas().await?;
        let mode = options.resolution_mode;

        let mut tables = Vec::new();
        if mode.includes_tables() {
            tables.extend(self.objects(ObjectKind::Table, &schemas).await?);
        }
        if mode.includes_views() {
            tables.extend(self.objects(ObjectKind::View, &schemas).await?);
        }

        self.log.scope(|| {
            debug!(
                resolution_mode = %mode,
                count = tables.len(),
                "Resolved metadata"
            )
        });
        Ok(DatabaseMetadata { tables })
    }

    async fn objects(
        &self,
        kind: ObjectKind,
        schemas: &[SchemaMetadata],
    ) -> DbResult<Vec<TableMetadata>> {
        let allow_list = match kind {
            ObjectKind::Table => &self.tables,
            ObjectKind::View => &self.views,
        };
        let owners: Vec<QueryParam> = schemas.iter().map(|s| s.name.as_str().into()).collect();
        let query = SelectQuery::select_from(kind.catalog())
            .select(&["owner", kind.name_column()])
            .where_in("owner", owners)
            .where_expr(self.allow_list_filter(kind.name_column(), allow_list))
            .order_by("owner")
            .order_by(kind.name_column())
            .fetch(MAX_ROWS);

        let result = self.db.execute(&query).await?;
        let mut objects = result
            .rows
            .iter()
            .map(|row| {
                Ok(TableMetadata::new(
                    string_field(row, "owner", kind.catalog())?,
                    string_field(row, kind.name_column(), kind.catalog())?,
                    kind.is_view(),
                ))
            })
            .collect::<DbResult<Vec<_>>>()?;

        if matches!(kind, ObjectKind::Table)
            && !objects
                .iter()
                .any(|t| t.schema == SYSTEM_SCHEMA && t.name == DUAL_TABLE)
        {
            objects.push(TableMetadata::new(SYSTEM_SCHEMA, DUAL_TABLE, false));
        }

        self.log.scope(|| {
            debug!(
                catalog = kind.catalog(),
                count = objects.len(),
                "Resolved catalog objects"
            )
        });

        let mut objects = self.attach_columns(kind, schemas, objects).await?;
        if kind.is_view() {
            for view in &mut objects {
                view.name = denormalize_view_name(&view.schema, &view.name);
            }
        }
        Ok(objects)
    }

    async fn attach_columns(
        &self,
        kind: ObjectKind,
        schemas: &[SchemaMetadata],
        objects: Vec<TableMetadata>,
    ) -> DbResult<Vec<TableMetadata>> {
        if objects.is_empty() {
            return Ok(objects);
        }

        let mut owners: Vec<&str> = schemas.iter().map(|s| s.name.as_str()).collect();
        if matches!(kind, ObjectKind::Table) && !owners.contains(&SYSTEM_SCHEMA) {
            owners.push(SYSTEM_SCHEMA);
        }
        let names: Vec<QueryParam> = objects.iter().map(|t| t.name.as_str().into()).collect();

        let query = SelectQuery::select_from("all_tab_columns")
            .select(&[
                "owner",
                "table_name",
                "column_name",
                "data_type",
                "data_length",
                "data_precision",
                "data_scale",
                "nullable",
                "data_default",
                "identity_column",
            ])
            .where_in("owner", owners)
            .where_in("table_name", names)
            .order_by("owner")
            .order_by("table_name")
            .order_by("column_id");

        let result = self.db.execute(&query).await?;
        let mut by_object: HashMap<(String, String), Vec<ColumnMetadata>> = HashMap::new();
        for row in &result.rows {
            let owner = string_field(row, "owner", "all_tab_columns")?;
            let table = string_field(row, "table_name", "all_tab_columns")?;
            by_object
                .entry((owner, table))
                .or_default()
                .push(column_from_row(row)?);
        }

        Ok(objects
            .into_iter()
            .map(|object| {
                let key = (object.schema.clone(), object.name.clone());
                let columns = by_object.remove(&key).unwrap_or_default();
                object.with_columns(columns)
            })
            .collect())
    }

    /// `(:len = 0 or column in (...))`. An empty allow-list binds a single
    /// null so the `in` stays valid SQL while the first branch matches all.
    fn allow_list_filter(&self, column: &str, allow_list: &[String]) -> Expr {
        let allowed = if allow_list.len() > MAX_IN_LIST {
            self.log.scope(|| {
                warn!(
                    column = column,
                    count = allow_list.len(),
                    max = MAX_IN_LIST,
                    "Allow-list truncated"
                )
            });
            &allow_list[..MAX_IN_LIST]
        } else {
            allow_list
        };

        let values: Vec<QueryParam> = if allowed.is_empty() {
            vec![QueryParam::Null]
        } else {
            allowed.iter().map(|v| v.as_str().into()).collect()
        };

        Expr::or(vec![
            Expr::val(allowed.len() as i64).eq(Expr::val(0)),
            Expr::column(column).in_list(values),
        ])
    }
}

fn column_from_row(row: &Row) -> DbResult<ColumnMetadata> {
    const OBJECT: &str = "all_tab_columns";
    let mut column = ColumnMetadata::new(
        string_field(row, "column_name", OBJECT)?,
        string_field(row, "data_type", OBJECT)?,
    )
    .nullable(optional_string(row, "nullable").as_deref() == Some("Y"))
    .with_default(row.get("data_default").is_some_and(|v| !v.is_null()))
    .auto_incrementing(optional_string(row, "identity_column").as_deref() == Some("YES"));

    column.data_length = optional_i64(row, "data_length");
    column.data_precision = optional_i64(row, "data_precision");
    column.data_scale = optional_i64(row, "data_scale");
    Ok(column)
}

fn string_field(row: &Row, field: &str, object: &str) -> DbResult<String> {
    optional_string(row, field)
        .ok_or_else(|| DbError::schema(format!("missing string column '{}'", field), object))
}

fn optional_string(row: &Row, field: &str) -> Option<String> {
    row.get(field).and_then(JsonValue::as_str).map(String::from)
}

/// Oracle `NUMBER` columns may arrive as JSON numbers or numeric strings.
fn optional_i64(row: &Row, field: &str) -> Option<i64> {
    match row.get(field)? {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// The dictionary stores dynamic performance views as `V_$X`; they are
/// queried by their public synonym `V$X`.
fn denormalize_view_name(schema: &str, name: &str) -> String {
    if schema != SYSTEM_SCHEMA {
        return name.to_string();
    }
    for prefix in ["GV", "V"] {
        if let Some(rest) = name
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix("_$"))
        {
            return format!("{}${}", prefix, rest);
        }
    }
    name.to_string()
}
