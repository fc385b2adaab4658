//! `campusctl` -- college-management schema tooling.
//!
//! Creates the student login role and the college tables, generates
//! synthetic CSV datasets, bulk-loads them, repairs table privileges and
//! clears the tables.
//!
//! # Environment variables
//!
//! | Variable             | Required            | Default          | Description                       |
//! |----------------------|---------------------|------------------|-----------------------------------|
//! | `ADMIN_DATABASE_URL` | setup, fix-access   | --               | Connection with CREATEROLE rights |
//! | `DATABASE_URL`       | all but generate    | --               | Connection as the student role    |
//! | `STUDENT_ROLE`       | no                  | `student`        | Role created by setup             |
//! | `STUDENT_PASSWORD`   | no                  | `student123`     | Password for that role            |
//! | `CAMPUS_SCHEMA`      | no                  | `STUDENT_ROLE`   | Schema the tables live in         |
//! | `DATA_DIR`           | no                  | `sample dataset` | CSV directory for generate/load   |

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use campus_cli::commands::Cli;
use campus_cli::config::ToolConfig;
use campus_cli::handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let level = cli.level().as_str();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("campusctl={level},campus_cli={level},campus_db={level},campus_core={level}")
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ToolConfig::from_env()?;
    handlers::dispatch(cli.command, &config).await
}
