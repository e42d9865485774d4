//! Teleport verbs and the plans they reduce to.
//!
//! Each verb is a thin adapter over [`crate::engine::Engine`]: it validates its
//! own preconditions, picks a destination and hands an [`ActionPlan`] to the
//! shared warmup pipeline. Negotiated verbs (TPA/TPR) live in the engine's
//! negotiation module since their state is shared.
mod back;
mod home;
mod info;
mod kind;
mod plan;
mod spawn;

pub use home::{HomeError, normalize_home_name};
pub use info::{HelpSection, VERSION};
pub use kind::{ActionKind, Direction, Module, NegotiationKind};
pub use plan::{ActionPlan, Destination, FollowUp};
