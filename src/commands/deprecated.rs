use serde::Serialize;

/// Why a main command is no longer accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Deprecation {
    /// Replaced one-for-one by another main command.
    Renamed { to: String, rationale: String },
    /// Removed with no replacement.
    Discontinued { rationale: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeprecationKind {
    Renamed,
    Discontinued,
}

impl DeprecationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeprecationKind::Renamed => "renamed",
            DeprecationKind::Discontinued => "discontinued",
        }
    }
}

impl Deprecation {
    pub fn renamed(to: impl Into<String>, rationale: impl Into<String>) -> Self {
        Deprecation::Renamed {
            to: to.into(),
            rationale: rationale.into(),
        }
    }

    pub fn discontinued(rationale: impl Into<String>) -> Self {
        Deprecation::Discontinued {
            rationale: rationale.into(),
        }
    }

    pub fn kind(&self) -> DeprecationKind {
        match self {
            Deprecation::Renamed { .. } => DeprecationKind::Renamed,
            Deprecation::Discontinued { .. } => DeprecationKind::Discontinued,
        }
    }

    /// The replacement command, if there is one.
    pub fn replacement(&self) -> Option<&str> {
        match self {
            Deprecation::Renamed { to, .. } => Some(to),
            Deprecation::Discontinued { .. } => None,
        }
    }

    pub fn rationale(&self) -> &str {
        match self {
            Deprecation::Renamed { rationale, .. } | Deprecation::Discontinued { rationale } => {
                rationale
            }
        }
    }
}
