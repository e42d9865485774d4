//! Stdin loop driving the runtime from a host script.
use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use essentials_content::MessageCatalog;
use essentials_core::{CommandParseError, PlayerId, Vec3};
use essentials_runtime::{Event, RuntimeError, RuntimeHandle, Topic};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::script::{self, HELP, ScriptCommand};

/// Ground height of the simulated world.
const GROUND_Y: f64 = 64.0;

/// Name to id mapping for players introduced by the script.
#[derive(Debug, Default)]
struct Roster {
    ids: BTreeMap<String, PlayerId>,
    next_id: u64,
}

impl Roster {
    fn id_for_join(&mut self, name: &str) -> PlayerId {
        let key = name.to_ascii_lowercase();
        if let Some(id) = self.ids.get(&key) {
            return *id;
        }
        self.next_id += 1;
        let id = PlayerId(self.next_id);
        self.ids.insert(key, id);
        id
    }

    fn lookup(&self, name: &str) -> Result<PlayerId> {
        self.ids
            .get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| anyhow!("nobody named '{}' has joined", name))
    }
}

/// Reads script lines until end of input or `quit`.
pub async fn run(handle: RuntimeHandle) -> Result<()> {
    let mut roster = Roster::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match script::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("! {err}");
                continue;
            }
        };
        if command == ScriptCommand::Quit {
            break;
        }
        if let Err(err) = execute(&handle, &mut roster, command).await {
            if err.downcast_ref::<RuntimeError>().is_some_and(is_fatal) {
                return Err(err);
            }
            println!("! {err}");
        }
    }
    Ok(())
}

fn is_fatal(err: &RuntimeError) -> bool {
    matches!(
        err,
        RuntimeError::CommandChannelClosed | RuntimeError::ReplyChannelClosed(_)
    )
}

async fn execute(handle: &RuntimeHandle, roster: &mut Roster, command: ScriptCommand) -> Result<()> {
    match command {
        ScriptCommand::Join {
            name,
            role,
            position,
        } => {
            let id = roster.id_for_join(&name);
            let position =
                position.unwrap_or_else(|| Vec3::new(id.0 as f64 * 10.0, GROUND_Y, 0.0));
            let status = handle.join(id, &name, role.as_deref(), position).await?;
            println!("* {} joined as {} at {}", status.name, status.id, status.position);
        }
        ScriptCommand::Leave(name) => {
            handle.leave(roster.lookup(&name)?).await?;
            println!("* {name} left");
        }
        ScriptCommand::Move { player, position } => {
            handle.move_player(roster.lookup(&player)?, position).await?;
        }
        ScriptCommand::Damage { player, amount } => {
            let health = handle.damage(roster.lookup(&player)?, amount).await?;
            println!("* {player} health {health:.1}");
        }
        ScriptCommand::Kill(name) => {
            handle.kill(roster.lookup(&name)?).await?;
            println!("* {name} died");
        }
        ScriptCommand::Tick(ticks) => {
            let now = handle.advance(ticks).await?;
            println!("* tick {now}");
        }
        ScriptCommand::Status(name) => {
            let id = roster.lookup(&name)?;
            match handle.player(id).await? {
                Some(status) => println!("* {status:?}"),
                None => println!("* {name} is unknown"),
            }
        }
        ScriptCommand::Chat { player, verb, args } => {
            let id = roster.lookup(&player)?;
            match handle.dispatch(id, verb, args).await {
                Ok(outcome) => tracing::debug!(player = %id, ?outcome, "command succeeded"),
                // The player already got a notice explaining the rejection.
                Err(RuntimeError::Command(_))
                | Err(RuntimeError::Parse(
                    CommandParseError::MissingArgument(_)
                    | CommandParseError::UnknownSubcommand(..),
                )) => {}
                Err(err) => return Err(err.into()),
            }
        }
        ScriptCommand::Reload => {
            handle.reload().await?;
            println!("* settings reloaded");
        }
        ScriptCommand::Help => println!("{HELP}"),
        ScriptCommand::Quit => {}
    }
    Ok(())
}

/// Prints every notice as the chat line its recipient would see.
pub async fn print_notices(handle: RuntimeHandle, catalog: MessageCatalog) {
    let mut notices = handle.subscribe(Topic::Notices);
    loop {
        match notices.recv().await {
            Ok(Event::Notice(notice)) => {
                let name = match handle.player(notice.recipient).await {
                    Ok(Some(status)) => status.name,
                    _ => notice.recipient.to_string(),
                };
                println!("[to {name}] {}", catalog.render(&notice));
            }
            Ok(_) => {}
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "notice printer fell behind");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}
