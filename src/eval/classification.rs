use std::fmt;

use serde::Serialize;

use crate::commands::DeprecationKind;
use crate::parse::ParsedCommand;
use crate::suggest::SimilarityResult;

/// Outcome of checking a parsed command against the dictionary.
///
/// Every [`ParsedCommand`] maps to exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Classification {
    Valid,
    /// Main command is neither known nor deprecated.
    InvalidMainCommand { command: String },
    /// Main command is retired, renamed or discontinued.
    Deprecated {
        command: String,
        kind: DeprecationKind,
        replacement: Option<String>,
        rationale: String,
    },
    /// Known main command with a subcommand it does not accept.
    InvalidSubcommand { command: String, subcommand: String },
    /// Standalone command given a subcommand.
    StandaloneCommandMisuse { command: String, subcommand: String },
}

impl Classification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Classification::Valid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Valid => "valid",
            Classification::InvalidMainCommand { .. } => "invalid_main_command",
            Classification::Deprecated { .. } => "deprecated",
            Classification::InvalidSubcommand { .. } => "invalid_subcommand",
            Classification::StandaloneCommandMisuse { .. } => "standalone_command_misuse",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Classification::Valid => "OK",
            Classification::InvalidMainCommand { .. } => "UNKNOWN",
            Classification::Deprecated { .. } => "DEPRECATED",
            Classification::InvalidSubcommand { .. } => "UNKNOWN SUB",
            Classification::StandaloneCommandMisuse { .. } => "MISUSE",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Valid => f.write_str("valid"),
            Classification::InvalidMainCommand { command } => {
                write!(f, "unrecognized command: {command}")
            }
            Classification::Deprecated {
                command,
                replacement: Some(to),
                rationale,
                ..
            } => write!(f, "{command} is deprecated, use {to} ({rationale})"),
            Classification::Deprecated {
                command, rationale, ..
            } => write!(f, "{command} was discontinued ({rationale})"),
            Classification::InvalidSubcommand {
                command,
                subcommand,
            } => write!(f, "unrecognized subcommand for {command}: {subcommand}"),
            Classification::StandaloneCommandMisuse {
                command,
                subcommand,
            } => write!(f, "{command} takes no subcommand (got {subcommand})"),
        }
    }
}

/// A parsed command, its classification, and ranked corrections.
#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub command: ParsedCommand,
    pub classification: Classification,
    pub suggestions: Vec<SimilarityResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        assert_eq!(Classification::Valid.to_string(), "valid");
        assert_eq!(
            Classification::InvalidMainCommand {
                command: "srvr".into()
            }
            .to_string(),
            "unrecognized command: srvr"
        );
        assert_eq!(
            Classification::Deprecated {
                command: "iso-image".into(),
                kind: DeprecationKind::Renamed,
                replacement: Some("cdrom".into()),
                rationale: "renamed".into(),
            }
            .to_string(),
            "iso-image is deprecated, use cdrom (renamed)"
        );
        assert_eq!(
            Classification::Deprecated {
                command: "summary".into(),
                kind: DeprecationKind::Discontinued,
                replacement: None,
                rationale: "gone".into(),
            }
            .to_string(),
            "summary was discontinued (gone)"
        );
    }

    #[test]
    fn serializes_with_outcome_tag() {
        let json = serde_json::to_value(Classification::InvalidSubcommand {
            command: "server".into(),
            subcommand: "x".into(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "invalid_subcommand");
        assert_eq!(json["subcommand"], "x");
    }

    #[test]
    fn only_valid_is_valid() {
        assert!(Classification::Valid.is_valid());
        assert!(
            !Classification::InvalidMainCommand {
                command: String::new()
            }
            .is_valid()
        );
    }
}
