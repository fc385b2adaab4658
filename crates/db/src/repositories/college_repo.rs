//! Repository for the eight college tables as a group.

use campus_core::catalog::CollegeTable;
use serde::Serialize;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use super::insert_row::InsertRow;

/// Sequences created next to the tables.
pub const SEQUENCES: &[&str] = &[
    "seq_student_id",
    "seq_enroll_id",
    "seq_attendance_id",
    "seq_result_id",
    "seq_receipt_id",
    "seq_activity_id",
];

/// Row count of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: CollegeTable,
    pub rows: i64,
}

/// Bulk inserts, counts and truncation across the college schema.
pub struct CollegeRepo;

impl CollegeRepo {
    /// Insert `rows` with a single multi-row `INSERT`.
    ///
    /// Returns the number of rows written. An empty slice is a no-op.
    pub async fn insert_batch<T: InsertRow>(
        conn: &mut PgConnection,
        rows: &[T],
    ) -> Result<u64, sqlx::Error> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            T::TABLE.as_str(),
            T::COLUMNS.join(", ")
        ));
        builder.push_values(rows, |mut row, record| record.push_binds(&mut row));

        let result = builder.build().execute(conn).await?;
        Ok(result.rows_affected())
    }

    /// Count the rows of one table.
    pub async fn count(pool: &PgPool, table: CollegeTable) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {}", table.as_str());
        let (count,): (i64,) = sqlx::query_as(&query).fetch_one(pool).await?;
        Ok(count)
    }

    /// Count every table, in load order.
    pub async fn count_all(pool: &PgPool) -> Result<Vec<TableCount>, sqlx::Error> {
        let mut counts = Vec::with_capacity(CollegeTable::ALL.len());
        for table in CollegeTable::ALL {
            counts.push(TableCount {
                table,
                rows: Self::count(pool, table).await?,
            });
        }
        Ok(counts)
    }

    /// Empty all eight tables in one statement and restart the id sequences,
    /// in a single transaction.
    ///
    /// Listing every referencing table together lets the truncate pass the
    /// foreign-key checks without disabling constraints. The `seq_*`
    /// sequences are not owned by any column, so they are restarted
    /// explicitly.
    pub async fn truncate_all(pool: &PgPool) -> Result<(), sqlx::Error> {
        let tables: Vec<&str> = CollegeTable::drop_order().map(|t| t.as_str()).collect();
        let mut tx = pool.begin().await?;

        sqlx::query(&format!("TRUNCATE TABLE {}", tables.join(", ")))
            .execute(&mut *tx)
            .await?;
        for sequence in SEQUENCES {
            sqlx::query(&format!("ALTER SEQUENCE {sequence} RESTART"))
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        tracing::info!(tables = tables.len(), sequences = SEQUENCES.len(), "Truncated college tables");
        Ok(())
    }

    /// Drop the tables, sequences and migration history so the schema can be
    /// rebuilt from scratch. Names resolve through the connection's
    /// `search_path`; missing objects are ignored.
    pub async fn drop_all(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        for table in CollegeTable::drop_order() {
            let query = format!("DROP TABLE IF EXISTS {} CASCADE", table.as_str());
            sqlx::query(&query).execute(&mut *conn).await?;
            tracing::debug!(table = %table, "Dropped table");
        }
        for sequence in SEQUENCES {
            sqlx::query(&format!("DROP SEQUENCE IF EXISTS {sequence}"))
                .execute(&mut *conn)
                .await?;
        }
        sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Tables in `schema` visible to the connected role, sorted by name.
    pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT table_name::text \
             FROM information_schema.tables \
             WHERE table_schema = $1 \
               AND table_type = 'BASE TABLE' \
               AND table_name != '_sqlx_migrations' \
             ORDER BY table_name",
        )
        .bind(schema)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}
