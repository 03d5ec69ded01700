//! Command dictionary: what the current release of the wrapped tool accepts.
//!
//! Holds valid main commands with their subcommands, standalone commands
//! that take no subcommand, and deprecated main commands (renamed or
//! discontinued).

/// Deprecation records for retired main commands.
pub mod deprecated;
/// The immutable main command / subcommand registry.
pub mod dictionary;

pub use deprecated::{Deprecation, DeprecationKind};
pub use dictionary::CommandDictionary;
