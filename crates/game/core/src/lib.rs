//! Deferred teleport actions and two-party negotiation for game servers.
//!
//! `essentials-core` holds the rules shared by the `home`, `back`, `spawn`,
//! `tpa` and `tpr` verbs: cooldowns, pending requests, cancelable warmups and
//! the teleport itself. It performs no I/O; the host supplies collaborators
//! through [`env::Env`] and drives time with [`engine::Engine::tick`].
pub mod action;
pub mod command;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use action::{
    ActionKind, ActionPlan, Destination, Direction, FollowUp, HomeError, Module, NegotiationKind,
    normalize_home_name,
};
pub use command::{Command, CommandParseError, Outcome, Verb, strip_quotes};
pub use config::{
    ActionSettings, BypassPolicy, EngineConfig, HomeSettings, InfoSettings, RulesSettings,
    SpawnSettings,
};
pub use engine::{
    CancelReason, CooldownLedger, Engine, PendingRegistry, PendingRequest, Scheduler, TaskHandle,
    TickReport, WarmupSession, WarmupSupervisor, WatchFlags,
};
pub use env::{
    Env, LocationStore, MessageKey, Messenger, Notice, PlayerDirectory, PlayerHomes, StoreError,
    Substitutions, WorldError, WorldOracle,
};
pub use error::{ActionError, CommandError, ErrorSeverity, EssentialsError};
pub use state::{Location, Orientation, PlayerId, PlayerRef, Tick, Vec3};
