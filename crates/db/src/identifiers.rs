//! Safe interpolation of names into DDL.
//!
//! Role, schema and table names cannot be bound as parameters in utility
//! statements (`CREATE ROLE`, `GRANT`, `ALTER ROLE`), so they are validated
//! and quoted before being spliced into SQL text.

use std::sync::LazyLock;

use regex::Regex;

/// Longest identifier PostgreSQL keeps without truncation.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier pattern is valid")
});

/// Rejected identifier, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid identifier {name:?}: {reason}")]
pub struct InvalidIdentifier {
    pub name: String,
    pub reason: &'static str,
}

/// Check that `name` is a plain SQL identifier.
pub fn validate(name: &str) -> Result<(), InvalidIdentifier> {
    let reject = |reason| {
        Err(InvalidIdentifier {
            name: name.to_string(),
            reason,
        })
    };
    if name.is_empty() {
        return reject("must not be empty");
    }
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return reject("longer than 63 bytes");
    }
    if !IDENTIFIER.is_match(name) {
        return reject("only letters, digits, '_' and '$' are allowed, starting with a letter or '_'");
    }
    Ok(())
}

/// Validate and double-quote an identifier.
pub fn quote_ident(name: &str) -> Result<String, InvalidIdentifier> {
    validate(name)?;
    Ok(format!("\"{name}\""))
}

/// Double-quote a name the server handed back (such as
/// `current_database()`), escaping embedded quotes instead of validating.
pub fn escape_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
