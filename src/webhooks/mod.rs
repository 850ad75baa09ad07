//! Webhook intake: signature verification, typed events, payload parsing.

pub mod events;
pub mod parser;
pub mod signature;

pub use events::{CardAction, ProjectCardEvent};
pub use parser::{ParseError, parse_webhook};
pub use signature::{compute_signature, format_signature_header, verify_signature};
