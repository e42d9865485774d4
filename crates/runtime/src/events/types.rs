use essentials_core::{Notice, Outcome, PlayerId, Tick, TickReport};

/// Result of one dispatched chat command.
#[derive(Debug, Clone)]
pub struct CommandEvent {
    pub player: PlayerId,
    pub verb: String,
    pub tick: Tick,
    /// Outcome, or the error message shown in logs.
    pub result: std::result::Result<Outcome, String>,
}

#[derive(Debug, Clone)]
pub enum Event {
    /// Player-facing notice emitted by the engine.
    Notice(Notice),
    Command(CommandEvent),
    /// Summary of a tick that executed or canceled at least one warmup.
    Tick { tick: Tick, report: TickReport },
}
