//! Command handlers. Each one opens the connections it needs, runs its
//! steps in order and prints a summary table at the end.

use std::collections::BTreeMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use campus_core::catalog::CollegeTable;
use campus_core::generate::{college, messy, sales, DatasetSummary};
use campus_db::repositories::{CollegeRepo, TableCount};
use campus_db::{access, loader, provision, DbPool};

use crate::commands::{Commands, Dataset};
use crate::config::ToolConfig;

/// Run one parsed command.
pub async fn dispatch(command: Commands, config: &ToolConfig) -> anyhow::Result<()> {
    match command {
        Commands::Setup => setup(config).await,
        Commands::Generate { dataset } => generate(dataset, config),
        Commands::Load { data_dir, table } => {
            let dir = data_dir.unwrap_or_else(|| config.data_dir.clone());
            load(config, &dir, table).await
        }
        Commands::FixAccess => fix_access(config).await,
        Commands::Clear { yes } => clear(config, yes).await,
        Commands::Verify => verify(config).await,
    }
}

async fn connect(url: &str, who: &str) -> anyhow::Result<DbPool> {
    let pool = campus_db::create_pool(url)
        .await
        .with_context(|| format!("Failed to connect as {who}"))?;
    let user = campus_db::current_user(&pool).await?;
    let version = campus_db::server_version(&pool).await?;
    tracing::info!(user = %user, server_version = %version, "Connected");
    Ok(pool)
}

// ---------------------------------------------------------------------------
// setup
// ---------------------------------------------------------------------------

pub async fn setup(config: &ToolConfig) -> anyhow::Result<()> {
    let admin = connect(config.admin_url()?, "admin").await?;
    provision::provision_role(
        &admin,
        &config.student_role,
        &config.student_password,
        &config.schema,
    )
    .await
    .context("Failed to provision the student role")?;
    admin.close().await;

    let student = connect(config.student_url()?, &config.student_role).await?;
    let tables = provision::rebuild_schema(&student, &config.schema)
        .await
        .context("Failed to create the college tables")?;

    println!("Tables in schema {}:", config.schema);
    for table in &tables {
        println!("  {table}");
    }
    println!("Setup complete: {} tables", tables.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

pub fn generate(dataset: Dataset, config: &ToolConfig) -> anyhow::Result<()> {
    let summary = match dataset {
        Dataset::College {
            students,
            courses_per_student,
            activity_share,
            output,
        } => {
            let dir = output_dir(output.out, config);
            let generator = college::CollegeConfig {
                students,
                courses_per_student,
                activity_share,
                seed: output.seed,
            };
            tracing::info!(students, seed = output.seed, dir = %dir.display(), "Generating college dataset");
            college::generate(&generator)?.write(&dir)?
        }
        Dataset::Messy {
            rows,
            duplicates,
            output,
        } => {
            let dir = output_dir(output.out, config);
            let generator = messy::MessyConfig {
                rows,
                duplicates,
                seed: output.seed,
                ..messy::MessyConfig::default()
            };
            tracing::info!(rows, duplicates, seed = output.seed, dir = %dir.display(), "Generating messy dataset");
            messy::write(&messy::generate(&generator)?, &dir)?
        }
        Dataset::Sales { orders, output } => {
            let dir = output_dir(output.out, config);
            let generator = sales::SalesConfig {
                orders,
                seed: output.seed,
            };
            tracing::info!(orders, seed = output.seed, dir = %dir.display(), "Generating sales dataset");
            sales::write(&sales::generate(&generator)?, &dir)?
        }
    };

    print_summary(&summary);
    Ok(())
}

fn output_dir(out: Option<PathBuf>, config: &ToolConfig) -> PathBuf {
    out.unwrap_or_else(|| config.data_dir.clone())
}

fn print_summary(summary: &DatasetSummary) {
    for file in &summary.files {
        println!("  {:<40} {:>8}", file.file_name, file.rows);
    }
    println!("  {:<40} {:>8}", "total", summary.total_rows());
}

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

pub async fn load(
    config: &ToolConfig,
    data_dir: &Path,
    table: Option<CollegeTable>,
) -> anyhow::Result<()> {
    if !data_dir.is_dir() {
        bail!("Data directory {} does not exist", data_dir.display());
    }
    let tables: Vec<CollegeTable> = match table {
        Some(table) => vec![table],
        None => CollegeTable::ALL.to_vec(),
    };

    let pool = connect(config.student_url()?, &config.student_role).await?;
    let loads = loader::load_tables(&pool, data_dir, &tables).await?;
    let total: usize = loads.iter().map(|l| l.rows).sum();
    tracing::info!(tables = loads.len(), rows = total, "Load complete");

    print_counts(&CollegeRepo::count_all(&pool).await?);
    Ok(())
}

// ---------------------------------------------------------------------------
// fix-access
// ---------------------------------------------------------------------------

pub async fn fix_access(config: &ToolConfig) -> anyhow::Result<()> {
    let student_url = config.student_url()?;
    let student = connect(student_url, &config.student_role).await?;
    let owned = access::owned_college_tables(&student).await?;
    if !owned.is_empty() {
        println!(
            "{} already owns {} college tables; nothing to fix.",
            config.student_role,
            owned.len()
        );
        return Ok(());
    }
    student.close().await;

    let admin = connect(config.admin_url()?, "admin").await?;
    let schemas = access::find_table_schemas(&admin).await?;
    let report = access::grant_table_access(&admin, &schemas, &config.student_role).await?;
    if let Some(owner_schema) = owner_schema(schemas.values().map(String::as_str)) {
        access::set_search_path(&admin, &config.student_role, owner_schema).await?;
    }
    admin.close().await;

    for (table, error) in &report.failed {
        println!("  grant failed on {table}: {error}");
    }

    // search_path applies to new sessions only.
    let student = connect(student_url, &config.student_role).await?;
    let checks = access::verify_access(&student).await;
    let mut failures = 0;
    for check in &checks {
        match (&check.rows, &check.error) {
            (Some(rows), _) => println!("  {:<12} {:>10}", check.table, rows),
            (None, Some(error)) => {
                failures += 1;
                println!("  {:<12} {error}", check.table);
            }
            (None, None) => println!("  {:<12} ?", check.table),
        }
    }
    if failures > 0 {
        bail!("{failures} of {} tables are still not accessible", checks.len());
    }
    println!("Access fixed for {}", config.student_role);
    Ok(())
}

/// The schema holding most of the college tables. Ties go to the
/// alphabetically first schema.
fn owner_schema<'a>(schemas: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for schema in schemas {
        *tally.entry(schema).or_default() += 1;
    }
    // max_by_key keeps the last maximum, so walk the names in reverse.
    tally
        .into_iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(schema, _)| schema)
}

// ---------------------------------------------------------------------------
// clear
// ---------------------------------------------------------------------------

pub async fn clear(config: &ToolConfig, yes: bool) -> anyhow::Result<()> {
    if !yes {
        let stdin = std::io::stdin();
        let confirmed = confirm(
            &mut stdin.lock(),
            &mut std::io::stdout(),
            "This deletes every row from all college tables. Type 'yes' to continue: ",
        )?;
        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    let pool = connect(config.student_url()?, &config.student_role).await?;
    CollegeRepo::truncate_all(&pool)
        .await
        .context("Failed to truncate the college tables")?;
    print_counts(&CollegeRepo::count_all(&pool).await?);
    Ok(())
}

/// Prompt once and accept only `yes`.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> std::io::Result<bool> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

// ---------------------------------------------------------------------------
// verify
// ---------------------------------------------------------------------------

pub async fn verify(config: &ToolConfig) -> anyhow::Result<()> {
    let pool = connect(config.student_url()?, &config.student_role).await?;
    let user = campus_db::current_user(&pool).await?;
    let tables = CollegeRepo::list_tables(&pool, &config.schema).await?;

    println!("Connected as {user}");
    println!("Tables in schema {}: {}", config.schema, tables.join(", "));
    for check in access::verify_access(&pool).await {
        match check.rows {
            Some(rows) => println!("  {:<12} {:>10}", check.table, rows),
            None => println!("  {:<12} not accessible", check.table),
        }
    }
    Ok(())
}

fn print_counts(counts: &[TableCount]) {
    for count in counts {
        println!("  {:<12} {:>10}", count.table, count.rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn confirm_accepts_only_yes() {
        for (answer, expected) in [("yes\n", true), ("  YES  \n", true), ("y\n", false), ("\n", false)] {
            let mut out = Vec::new();
            let ok = confirm(&mut Cursor::new(answer), &mut out, "Continue? ").unwrap();
            assert_eq!(ok, expected, "{answer:?}");
            assert_eq!(String::from_utf8(out).unwrap(), "Continue? ");
        }
    }

    #[test]
    fn owner_schema_prefers_majority() {
        let schemas = ["admin", "public", "admin"];
        assert_eq!(owner_schema(schemas.into_iter()), Some("admin"));
        assert_eq!(owner_schema(std::iter::empty()), None);
    }

    #[test]
    fn owner_schema_ties_go_to_first_name() {
        assert_eq!(owner_schema(["zeta", "alpha"].into_iter()), Some("alpha"));
        assert_eq!(
            owner_schema(["zeta", "alpha", "zeta", "alpha"].into_iter()),
            Some("alpha")
        );
        assert_eq!(owner_schema(["alpha", "zeta"].into_iter()), Some("alpha"));
    }

    #[test]
    fn generate_writes_into_out_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("sales");
        let config = ToolConfig::from_lookup(|_| None).unwrap();
        let dataset = Dataset::Sales {
            orders: 20,
            output: crate::commands::OutputArgs {
                out: Some(dir.clone()),
                seed: 1,
            },
        };
        generate(dataset, &config).unwrap();
        assert!(dir.join(sales::SALES_FILE).is_file());
    }
}
