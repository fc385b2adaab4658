//! Ownership discovery and privilege repair.
//!
//! When the college tables were created by another role, the student role
//! can connect but sees nothing. The repair grants it schema usage and full
//! table privileges, then points its `search_path` at the owning schema so
//! unqualified table names resolve there.

use std::collections::BTreeMap;

use campus_core::catalog::CollegeTable;
use serde::Serialize;
use sqlx::PgPool;

use crate::identifiers::quote_ident;
use crate::provision::AdminError;
use crate::repositories::CollegeRepo;

/// College tables owned by the connected role, sorted by name.
pub async fn owned_college_tables(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT tablename::text FROM pg_tables \
         WHERE tableowner = current_user AND tablename = ANY($1) \
         ORDER BY tablename",
    )
    .bind(college_table_names())
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(name,)| name).collect())
}

/// Owning schema of each college table, as seen by an admin connection.
///
/// Tables that exist in more than one schema keep the first schema in
/// alphabetical order.
pub async fn find_table_schemas(admin: &PgPool) -> Result<BTreeMap<String, String>, AdminError> {
    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT tablename::text, schemaname::text, tableowner::text FROM pg_tables \
         WHERE tablename = ANY($1) \
         ORDER BY schemaname, tablename",
    )
    .bind(college_table_names())
    .fetch_all(admin)
    .await?;

    if rows.is_empty() {
        return Err(AdminError::NoTables);
    }

    let mut schemas = BTreeMap::new();
    for (table, schema, owner) in rows {
        tracing::debug!(table = %table, schema = %schema, owner = %owner, "Found table");
        schemas.entry(table).or_insert(schema);
    }
    Ok(schemas)
}

/// Outcome of a grant pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GrantReport {
    pub granted: Vec<String>,
    pub failed: Vec<(String, String)>,
}

/// Grant `role` USAGE on each owning schema and ALL on each table.
///
/// A failed table grant is logged and skipped so one bad table does not
/// block the rest.
pub async fn grant_table_access(
    admin: &PgPool,
    tables: &BTreeMap<String, String>,
    role: &str,
) -> Result<GrantReport, AdminError> {
    let role_ident = quote_ident(role)?;

    let mut schemas: Vec<&str> = tables.values().map(String::as_str).collect();
    schemas.sort_unstable();
    schemas.dedup();
    for schema in schemas {
        let schema_ident = quote_ident(schema)?;
        sqlx::query(&format!("GRANT USAGE ON SCHEMA {schema_ident} TO {role_ident}"))
            .execute(admin)
            .await?;
        tracing::info!(schema, role, "Granted schema usage");
    }

    let mut report = GrantReport::default();
    for (table, schema) in tables {
        let statement = match (quote_ident(schema), quote_ident(table)) {
            (Ok(s), Ok(t)) => format!("GRANT ALL PRIVILEGES ON {s}.{t} TO {role_ident}"),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(table = %table, error = %e, "Skipping grant");
                report.failed.push((table.clone(), e.to_string()));
                continue;
            }
        };
        match sqlx::query(&statement).execute(admin).await {
            Ok(_) => {
                tracing::info!(table = %table, schema = %schema, "Granted table privileges");
                report.granted.push(table.clone());
            }
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "Grant failed, skipping");
                report.failed.push((table.clone(), e.to_string()));
            }
        }
    }
    Ok(report)
}

/// Make unqualified names resolve in `schema` for future sessions of `role`.
pub async fn set_search_path(admin: &PgPool, role: &str, schema: &str) -> Result<(), AdminError> {
    let role_ident = quote_ident(role)?;
    let schema_ident = quote_ident(schema)?;
    sqlx::query(&format!(
        "ALTER ROLE {role_ident} SET search_path TO {schema_ident}, public"
    ))
    .execute(admin)
    .await?;
    tracing::info!(role, schema, "Set search_path");
    Ok(())
}

/// Per-table access check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableAccess {
    pub table: CollegeTable,
    pub rows: Option<i64>,
    pub error: Option<String>,
}

impl TableAccess {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Count every college table over `pool`, recording failures instead of
/// stopping at the first one.
pub async fn verify_access(pool: &PgPool) -> Vec<TableAccess> {
    let mut checks = Vec::with_capacity(CollegeTable::ALL.len());
    for table in CollegeTable::ALL {
        let check = match CollegeRepo::count(pool, table).await {
            Ok(rows) => TableAccess {
                table,
                rows: Some(rows),
                error: None,
            },
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "Table not accessible");
                TableAccess {
                    table,
                    rows: None,
                    error: Some(e.to_string()),
                }
            }
        };
        checks.push(check);
    }
    checks
}

fn college_table_names() -> Vec<String> {
    CollegeTable::ALL
        .iter()
        .map(|t| t.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_cover_catalog() {
        let names = college_table_names();
        assert_eq!(names.len(), 8);
        assert_eq!(names.first().map(String::as_str), Some("departments"));
        assert_eq!(names.last().map(String::as_str), Some("activities"));
    }

    #[test]
    fn access_ok_means_no_error() {
        let ok = TableAccess {
            table: CollegeTable::Fees,
            rows: Some(0),
            error: None,
        };
        let bad = TableAccess {
            table: CollegeTable::Fees,
            rows: None,
            error: Some("permission denied".into()),
        };
        assert!(ok.is_ok());
        assert!(!bad.is_ok());
    }
}
