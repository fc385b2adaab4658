//! Batched CSV loading into the college tables.
//!
//! Each file is streamed row by row. Rows accumulate until the table's batch
//! size is reached, then go out as one multi-row `INSERT` in its own
//! transaction. A failure rolls back the batch in flight and stops the
//! load; batches already committed stay.

use std::fs::File;
use std::path::{Path, PathBuf};

use campus_core::catalog::CollegeTable;
use campus_core::records::{
    Activity, Attendance, Course, Department, Enrollment, ExamResult, FeePayment, Student,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::PgPool;

use crate::repositories::{CollegeRepo, InsertRow};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Cannot open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}, line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Insert into {table} failed after {loaded} rows: {source}")]
    Database {
        table: CollegeTable,
        loaded: usize,
        #[source]
        source: sqlx::Error,
    },
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of loading one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableLoad {
    pub table: CollegeTable,
    pub rows: usize,
    pub batches: usize,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load the given tables from `<data_dir>/<table>.csv`, in the order given.
///
/// Callers pass tables in dependency order (see [`CollegeTable::ALL`]).
pub async fn load_tables(
    pool: &PgPool,
    data_dir: &Path,
    tables: &[CollegeTable],
) -> Result<Vec<TableLoad>, LoadError> {
    let mut loads = Vec::with_capacity(tables.len());
    for (idx, table) in tables.iter().enumerate() {
        tracing::info!(
            step = idx + 1,
            of = tables.len(),
            table = %table,
            "Loading {}",
            table.label()
        );
        let load = load_table(pool, data_dir, *table).await?;
        tracing::info!(table = %table, rows = load.rows, batches = load.batches, "Loaded");
        loads.push(load);
    }
    Ok(loads)
}

/// Load one table from its CSV file with the table's batch size.
pub async fn load_table(
    pool: &PgPool,
    data_dir: &Path,
    table: CollegeTable,
) -> Result<TableLoad, LoadError> {
    let path = data_dir.join(table.csv_file());
    let batch_size = table.batch_size();
    match table {
        CollegeTable::Departments => load_csv::<Department>(pool, &path, batch_size).await,
        CollegeTable::Courses => load_csv::<Course>(pool, &path, batch_size).await,
        CollegeTable::Students => load_csv::<Student>(pool, &path, batch_size).await,
        CollegeTable::Enrollments => load_csv::<Enrollment>(pool, &path, batch_size).await,
        CollegeTable::Attendance => load_csv::<Attendance>(pool, &path, batch_size).await,
        CollegeTable::Results => load_csv::<ExamResult>(pool, &path, batch_size).await,
        CollegeTable::Fees => load_csv::<FeePayment>(pool, &path, batch_size).await,
        CollegeTable::Activities => load_csv::<Activity>(pool, &path, batch_size).await,
    }
}

/// Stream `path` into `T::TABLE`, committing every `batch_size` rows.
pub async fn load_csv<T>(pool: &PgPool, path: &Path, batch_size: usize) -> Result<TableLoad, LoadError>
where
    T: InsertRow + DeserializeOwned,
{
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let batch_size = batch_size.max(1);
    let mut batch: Vec<T> = Vec::with_capacity(batch_size);
    let mut loaded = 0usize;
    let mut batches = 0usize;

    for record in reader.deserialize::<T>() {
        let row = record.map_err(|e| parse_error(path, &e))?;
        batch.push(row);

        if batch.len() >= batch_size {
            loaded += flush(pool, &batch, loaded).await?;
            batches += 1;
            batch.clear();
            tracing::info!(table = %T::TABLE, rows = loaded, "Batch committed");
        }
    }

    if !batch.is_empty() {
        loaded += flush(pool, &batch, loaded).await?;
        batches += 1;
    }

    Ok(TableLoad {
        table: T::TABLE,
        rows: loaded,
        batches,
    })
}

/// Insert one batch inside its own transaction.
async fn flush<T: InsertRow>(pool: &PgPool, batch: &[T], loaded: usize) -> Result<usize, LoadError> {
    let db_err = |source| LoadError::Database {
        table: T::TABLE,
        loaded,
        source,
    };

    let mut tx = pool.begin().await.map_err(db_err)?;
    CollegeRepo::insert_batch(&mut tx, batch)
        .await
        .map_err(db_err)?;
    tx.commit().await.map_err(db_err)?;
    Ok(batch.len())
}

fn parse_error(path: &Path, err: &csv::Error) -> LoadError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let message = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => match err.field() {
            Some(field) => format!("column {}: {err}", field + 1),
            None => err.to_string(),
        },
        _ => err.to_string(),
    };
    LoadError::Parse {
        path: path.to_path_buf(),
        line,
        message,
    }
}
