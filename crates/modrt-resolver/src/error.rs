use thiserror::Error;

use crate::module::ModuleRef;
use crate::package::EntryRef;

#[derive(Error, Debug)]
pub enum ResolverError {
    // Resolution outcomes
    #[error("Could not resolve {module}: missing {}", describe_entries(.imports))]
    Unresolved {
        module: ModuleRef,
        imports: Vec<EntryRef>,
    },

    #[error("Re-entrant {operation} while this thread holds the resolver")]
    Reentrant { operation: &'static str },

    // Declaration errors
    #[error("Invalid package declaration: {0}")]
    InvalidDeclaration(String),

    // Version errors
    #[error("Invalid version: {0}")]
    Version(#[from] modrt_semver::VersionParserError),

    // Config errors
    #[error("Failed to parse resolver config: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResolverError {
    /// The imports that could not be satisfied, if this is a resolution failure.
    pub fn unresolved_imports(&self) -> Option<&[EntryRef]> {
        match self {
            ResolverError::Unresolved { imports, .. } => Some(imports),
            _ => None,
        }
    }

    /// Whether this error signals a caller bug rather than a data condition.
    pub fn is_internal(&self) -> bool {
        matches!(self, ResolverError::Reentrant { .. })
    }
}

fn describe_entries(entries: &[EntryRef]) -> String {
    entries
        .iter()
        .map(|e| match e.range() {
            Some(range) => format!("{} {}", e.name(), range),
            None => e.name().to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, ResolverError>;
