use std::path::PathBuf;

use campus_db::identifiers::{self, InvalidIdentifier};

/// Default location of the clean dataset CSVs.
pub const DEFAULT_DATA_DIR: &str = "sample dataset";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var}: {source}")]
    Invalid {
        var: &'static str,
        #[source]
        source: InvalidIdentifier,
    },
}

/// Connection and naming settings loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ToolConfig {
    /// Connection used to create roles and grant privileges.
    pub admin_database_url: Option<String>,
    /// Connection as the student role.
    pub database_url: Option<String>,
    pub student_role: String,
    pub student_password: String,
    /// Schema the student creates its tables in. Setup creates it, owned by
    /// the student, when it does not exist.
    pub schema: String,
    pub data_dir: PathBuf,
}

impl ToolConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default                        |
    /// |----------------------|--------------------------------|
    /// | `ADMIN_DATABASE_URL` | none (needed by setup, fix-access) |
    /// | `DATABASE_URL`       | none (needed by everything touching the tables) |
    /// | `STUDENT_ROLE`       | `student`                      |
    /// | `STUDENT_PASSWORD`   | `student123`                   |
    /// | `CAMPUS_SCHEMA`      | the student role's name        |
    /// | `DATA_DIR`           | `sample dataset`               |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let student_role = get("STUDENT_ROLE").unwrap_or_else(|| "student".into());
        let schema = get("CAMPUS_SCHEMA").unwrap_or_else(|| student_role.clone());

        identifiers::validate(&student_role).map_err(|source| ConfigError::Invalid {
            var: "STUDENT_ROLE",
            source,
        })?;
        identifiers::validate(&schema).map_err(|source| ConfigError::Invalid {
            var: "CAMPUS_SCHEMA",
            source,
        })?;

        Ok(Self {
            admin_database_url: get("ADMIN_DATABASE_URL"),
            database_url: get("DATABASE_URL"),
            student_role,
            student_password: get("STUDENT_PASSWORD").unwrap_or_else(|| "student123".into()),
            schema,
            data_dir: get("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        })
    }

    pub fn admin_url(&self) -> Result<&str, ConfigError> {
        self.admin_database_url
            .as_deref()
            .ok_or(ConfigError::Missing("ADMIN_DATABASE_URL"))
    }

    pub fn student_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use assert_matches::assert_matches;

    fn config(vars: &[(&str, &str)]) -> Result<ToolConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ToolConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.student_role, "student");
        assert_eq!(config.student_password, "student123");
        assert_eq!(config.schema, "student");
        assert_eq!(config.data_dir, PathBuf::from("sample dataset"));
        assert_matches!(config.admin_url(), Err(ConfigError::Missing("ADMIN_DATABASE_URL")));
        assert_matches!(config.student_url(), Err(ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("DATABASE_URL", "postgres://student:pw@localhost/campus"),
            ("STUDENT_ROLE", "reader"),
            ("CAMPUS_SCHEMA", "college"),
            ("DATA_DIR", "/tmp/data"),
        ])
        .unwrap();
        assert_eq!(config.student_url().unwrap(), "postgres://student:pw@localhost/campus");
        assert_eq!(config.student_role, "reader");
        assert_eq!(config.schema, "college");
        assert_eq!(config.data_dir, PathBuf::from("/tmp/data"));
    }

    #[test]
    fn schema_follows_role() {
        let config = config(&[("STUDENT_ROLE", "reader")]).unwrap();
        assert_eq!(config.schema, "reader");
    }

    #[test]
    fn blank_values_fall_back() {
        let config = config(&[("STUDENT_ROLE", "  "), ("DATABASE_URL", "")]).unwrap();
        assert_eq!(config.student_role, "student");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn rejects_unsafe_role() {
        let err = config(&[("STUDENT_ROLE", "student; DROP ROLE admin")]).unwrap_err();
        assert_matches!(err, ConfigError::Invalid { var: "STUDENT_ROLE", .. });
    }
}
