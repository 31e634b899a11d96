//! Collaboration protocol
//!
//! Roles steer the session by embedding bracketed **markers** in their
//! replies. The protocol layer turns raw model output into clean display text,
//! an ordered list of [`Directive`]s and any tool requests:
//!
//! ```text
//! raw reply ──▶ tool blocks ──▶ Lexer ──▶ ProtocolParser ──▶ ParsedOutput
//!               (```tool)       (tokens)   (role lookup)     { directives,
//!                                                              tool_calls,
//!                                                              clean_text }
//! ```
//!
//! # Marker grammar
//!
//! ```text
//! marker  := "[" keyword ( ":" ws* role ws* )? "]"
//! keyword := REQUEST_HELP | SHARE_DISCOVERY | /SHARE_DISCOVERY
//!          | DELEGATE | HANDOFF | COMPLETE
//! role    := [A-Za-z0-9_-]+
//! ```
//!
//! Keywords are case-sensitive. A known keyword with a missing, extra or
//! invalid argument is a malformed marker: it becomes a
//! [`Directive::RecoverableError`] and is stripped from the clean text.
//! Any other bracketed text (`[see docs]`, `vec[0]`) is ordinary content.
//!
//! Parsing the clean text again yields no directives.

pub mod directive;
pub mod lexer;
pub mod parser;
pub mod tool_block;

pub use directive::Directive;
pub use lexer::{Keyword, Lexer, Token, TokenKind};
pub use parser::{ParsedOutput, ProtocolParser};
pub use tool_block::{MalformedToolBlock, ToolBlocks, extract_tool_blocks};
