pub mod command;
pub mod tokenize;
pub mod types;

pub use command::parse;
pub use tokenize::{QuoteMap, is_invocation, leading_word, tokenize};
pub use types::{ParseError, ParsedCommand, Token};
