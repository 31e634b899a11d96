//! Shared conversation context
//!
//! All roles in a session read from one [`ContextStore`]:
//!
//! - the **history**: an append-only sequence of [`Message`]s from the
//!   operator, roles, tools and the system, each stamped with a
//!   monotonically increasing sequence number;
//! - the **discovery ledger**: an append-only list of [`Discovery`] entries
//!   published with `[SHARE_DISCOVERY]`, visible to every later turn of
//!   every role.
//!
//! Only the collaboration router holds the store mutably; everything else
//! sees shared references.

pub mod entities;
pub mod store;

pub use entities::{Author, Discovery, Message};
pub use store::ContextStore;
