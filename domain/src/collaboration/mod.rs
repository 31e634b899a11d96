//! Collaboration state machine
//!
//! The [`CollaborationRouter`] owns the session: which role is active, the
//! pending-delegation stack, outstanding help requests, the shared context
//! and the approval flags. Each role turn is applied through
//! [`CollaborationRouter::apply_turn`], which turns the directives found in
//! the reply into at most one control transfer.
//!
//! ```text
//!            ┌───────── /role ─────────┐
//!            ▼                         │
//!   Idle ─▶ RoleActive(r) ──REQUEST_HELP──▶ AwaitingHelp(r, t) ──reply──▶ RoleActive(t)
//!            │   ▲  ▲                                                       │
//!            │   │  └──── COMPLETE (helper) / HANDOFF to requester ─────────┘
//!            │   └─────── COMPLETE (delegate) / HANDOFF to delegator ───────┐
//!            ├──DELEGATE──▶ Delegated(r, t, s) ──reply──▶ RoleActive(t) ────┘
//!            ├──HANDOFF───▶ HandedOff(t) ──reply──▶ RoleActive(t)
//!            └──COMPLETE (no frames left)──▶ Complete
//! ```
//!
//! Help requests are tracked apart from the delegation stack: a helper's
//! `[COMPLETE]` returns to the requester without popping any delegation.

pub mod frames;
pub mod outcome;
pub mod router;
pub mod session;
pub mod status;

pub use frames::{Briefing, DelegationFrame, HelpFrame};
pub use outcome::{Transition, TurnOutcome};
pub use router::{CollaborationRouter, RouterSettings};
pub use session::{Autopilot, CollaborationSession};
pub use status::CollaborationStatus;
