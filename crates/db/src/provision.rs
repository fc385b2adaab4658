//! Login role creation and schema rebuild.
//!
//! Provisioning runs in two halves. The admin connection (re)creates the
//! student role, gives it a schema to build in and points its `search_path`
//! there. The student connection then drops whatever college tables it
//! already has in that schema and applies the migrations, so the student
//! ends up owning the schema objects.

use sqlx::migrate::MigrateError;
use sqlx::{PgConnection, PgPool};

use campus_core::catalog::CollegeTable;

use crate::identifiers::{escape_ident, quote_ident, quote_literal, InvalidIdentifier};
use crate::repositories::CollegeRepo;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] MigrateError),

    #[error("No college tables found. Run setup first.")]
    NoTables,

    #[error(
        "Schema {schema} already holds college tables owned by {owner} ({}). \
         Pick another CAMPUS_SCHEMA or use fix-access.",
        tables.join(", ")
    )]
    ForeignTables {
        schema: String,
        owner: String,
        tables: Vec<String>,
    },
}

/// Drop `role` if it exists, then create it as a login role with `password`.
///
/// The role gets CONNECT on the current database and a place to build in:
/// `schema` is created with the role as owner when it does not exist,
/// otherwise the role is granted USAGE and CREATE on it. Either way the
/// role's `search_path` is set to `schema`.
pub async fn provision_role(
    admin: &PgPool,
    role: &str,
    password: &str,
    schema: &str,
) -> Result<(), AdminError> {
    let role_ident = quote_ident(role)?;
    let schema_ident = quote_ident(schema)?;

    if role_exists(admin, role).await? {
        tracing::info!(role, "Dropping existing role");
        // Also drops a schema the old role owned.
        sqlx::query(&format!("DROP OWNED BY {role_ident} CASCADE"))
            .execute(admin)
            .await?;
        sqlx::query(&format!("DROP ROLE {role_ident}"))
            .execute(admin)
            .await?;
    }

    sqlx::query(&format!(
        "CREATE ROLE {role_ident} LOGIN PASSWORD {}",
        quote_literal(password)
    ))
    .execute(admin)
    .await?;
    tracing::info!(role, "Created login role");

    let (database,): (String,) = sqlx::query_as("SELECT current_database()::text")
        .fetch_one(admin)
        .await?;
    let database_ident = escape_ident(&database);

    sqlx::query(&format!(
        "GRANT CONNECT ON DATABASE {database_ident} TO {role_ident}"
    ))
    .execute(admin)
    .await?;

    if schema_exists(admin, schema).await? {
        sqlx::query(&format!(
            "GRANT USAGE, CREATE ON SCHEMA {schema_ident} TO {role_ident}"
        ))
        .execute(admin)
        .await?;
    } else {
        sqlx::query(&format!(
            "CREATE SCHEMA {schema_ident} AUTHORIZATION {role_ident}"
        ))
        .execute(admin)
        .await?;
        tracing::info!(schema, role, "Created schema");
    }

    sqlx::query(&format!(
        "ALTER ROLE {role_ident} SET search_path TO {schema_ident}"
    ))
    .execute(admin)
    .await?;
    tracing::info!(role, database = %database, schema, "Granted privileges");

    Ok(())
}

pub async fn role_exists(pool: &PgPool, role: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM pg_roles WHERE rolname = $1)")
            .bind(role)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

pub async fn schema_exists(pool: &PgPool, schema: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) =
        sqlx::query_as("SELECT EXISTS (SELECT 1 FROM pg_namespace WHERE nspname = $1)")
            .bind(schema)
            .fetch_one(pool)
            .await?;
    Ok(exists)
}

/// As the connected (student) role: drop existing college tables in
/// `schema`, apply the migrations there, and return the tables now present.
///
/// Runs on one connection whose `search_path` is pinned to `schema`, so the
/// tables, sequences and migration history all land in it regardless of the
/// role's defaults. Fails with [`AdminError::ForeignTables`] before touching
/// anything when another role owns college tables in `schema`.
pub async fn rebuild_schema(pool: &PgPool, schema: &str) -> Result<Vec<String>, AdminError> {
    let schema_ident = quote_ident(schema)?;

    let mut conn = pool.acquire().await?;
    // The pinned search_path must not leak back into the pool.
    conn.close_on_drop();

    sqlx::query(&format!("SET search_path TO {schema_ident}"))
        .execute(&mut *conn)
        .await?;

    check_foreign_tables(&mut conn, schema).await?;

    CollegeRepo::drop_all(&mut conn).await?;
    tracing::info!(schema, "Dropped existing college tables");

    crate::MIGRATOR.run(&mut *conn).await?;
    tracing::info!(schema, "Applied migrations");
    drop(conn);

    let tables = CollegeRepo::list_tables(pool, schema).await?;
    if tables.is_empty() {
        return Err(AdminError::NoTables);
    }
    Ok(tables)
}

async fn check_foreign_tables(conn: &mut PgConnection, schema: &str) -> Result<(), AdminError> {
    let names: Vec<String> = CollegeTable::ALL
        .iter()
        .map(|t| t.as_str().to_string())
        .collect();
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT tablename::text, tableowner::text FROM pg_tables \
         WHERE schemaname = $1 AND tablename = ANY($2) AND tableowner <> current_user \
         ORDER BY tablename",
    )
    .bind(schema)
    .bind(names)
    .fetch_all(&mut *conn)
    .await?;

    match rows.first() {
        None => Ok(()),
        Some((_, owner)) => Err(AdminError::ForeignTables {
            schema: schema.to_string(),
            owner: owner.clone(),
            tables: rows.iter().map(|(table, _)| table.clone()).collect(),
        }),
    }
}
