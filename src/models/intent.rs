use serde::{Deserialize, Serialize};

/// The operation the caller issued against the stack.
///
/// Decides which terminal statuses count as success: `DELETE_COMPLETE` is the
/// goal of a delete but a failure for a create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    #[default]
    Create,
    Update,
    Delete,
    Import,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intent::Create => write!(f, "create"),
            Intent::Update => write!(f, "update"),
            Intent::Delete => write!(f, "delete"),
            Intent::Import => write!(f, "import"),
        }
    }
}

impl std::str::FromStr for Intent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(Intent::Create),
            "update" => Ok(Intent::Update),
            "delete" => Ok(Intent::Delete),
            "import" => Ok(Intent::Import),
            _ => anyhow::bail!("Invalid intent: {s}. Must be one of: create, update, delete, import"),
        }
    }
}
