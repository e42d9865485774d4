//! Line-oriented host script.
//!
//! Each stdin line either simulates something the game server would report
//! (a join, a step, a hit) or is a chat command typed by a player:
//!
//! ```text
//! join Alice suplayer
//! join Bob crplayer 10 64 -3
//! Alice: /tpa Bob
//! Bob: /tpaccept
//! move Alice 1 64 0
//! damage Bob 4
//! kill Bob
//! tick 50
//! status Alice
//! ```
use anyhow::{Context, Result, anyhow, bail};
use essentials_core::Vec3;

pub const HELP: &str = "\
commands:
  join <name> [role] [x y z]   bring a player online
  leave <name>                 disconnect a player
  move <name> <x> <y> <z>      walk a player somewhere
  damage <name> <amount>       hurt a player (0 health kills)
  kill <name>                  kill a player on the spot
  tick [n]                     advance the clock by n ticks (default 1)
  status <name>                show a player's state
  reload                       re-read the settings file
  <name>: /<verb> [args]       run a chat command as a player
  help | quit";

#[derive(Clone, Debug, PartialEq)]
pub enum ScriptCommand {
    Join {
        name: String,
        role: Option<String>,
        position: Option<Vec3>,
    },
    Leave(String),
    Move {
        player: String,
        position: Vec3,
    },
    Damage {
        player: String,
        amount: f64,
    },
    Kill(String),
    Tick(u64),
    Status(String),
    Reload,
    Chat {
        player: String,
        verb: String,
        args: String,
    },
    Help,
    Quit,
}

/// Parses one script line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if let Some((player, chat)) = line.split_once(':') {
        let chat = chat.trim();
        if chat.starts_with('/') {
            let (verb, args) = chat.split_once(char::is_whitespace).unwrap_or((chat, ""));
            return Ok(Some(ScriptCommand::Chat {
                player: player.trim().to_string(),
                verb: verb.to_string(),
                args: args.trim().to_string(),
            }));
        }
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let command = match words.as_slice() {
        ["join", name, rest @ ..] => {
            let (role, coords) = match rest {
                [] => (None, &[][..]),
                [first, tail @ ..] if first.parse::<f64>().is_err() => {
                    (Some(first.to_string()), tail)
                }
                coords => (None, coords),
            };
            let position = match coords {
                [] => None,
                coords => Some(parse_vec3(coords)?),
            };
            ScriptCommand::Join {
                name: name.to_string(),
                role,
                position,
            }
        }
        ["leave", name] => ScriptCommand::Leave(name.to_string()),
        ["move", name, coords @ ..] => ScriptCommand::Move {
            player: name.to_string(),
            position: parse_vec3(coords)?,
        },
        ["damage", name, amount] => ScriptCommand::Damage {
            player: name.to_string(),
            amount: parse_number(amount)?,
        },
        ["kill", name] => ScriptCommand::Kill(name.to_string()),
        ["tick"] => ScriptCommand::Tick(1),
        ["tick", n] => ScriptCommand::Tick(
            n.parse()
                .with_context(|| format!("'{n}' is not a tick count"))?,
        ),
        ["status", name] => ScriptCommand::Status(name.to_string()),
        ["reload"] => ScriptCommand::Reload,
        ["help"] => ScriptCommand::Help,
        ["quit"] | ["exit"] => ScriptCommand::Quit,
        _ => bail!("unrecognized line '{line}' (try 'help')"),
    };
    Ok(Some(command))
}

fn parse_number(raw: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|e| anyhow!("'{}' is not a number: {}", raw, e))
}

fn parse_vec3(coords: &[&str]) -> Result<Vec3> {
    match coords {
        [x, y, z] => Ok(Vec3::new(
            parse_number(x)?,
            parse_number(y)?,
            parse_number(z)?,
        )),
        _ => bail!("expected three coordinates, got {}", coords.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> ScriptCommand {
        parse_line(line)
            .expect("line should parse")
            .expect("line should not be empty")
    }

    #[test]
    fn chat_lines_split_verb_and_arguments() {
        assert_eq!(
            parse("Alice: /sethome  \"my base\" "),
            ScriptCommand::Chat {
                player: "Alice".into(),
                verb: "/sethome".into(),
                args: "\"my base\"".into(),
            }
        );
        assert_eq!(
            parse("Bob:/tpaccept"),
            ScriptCommand::Chat {
                player: "Bob".into(),
                verb: "/tpaccept".into(),
                args: String::new(),
            }
        );
    }

    #[test]
    fn join_accepts_optional_role_and_position() {
        assert_eq!(
            parse("join Alice"),
            ScriptCommand::Join {
                name: "Alice".into(),
                role: None,
                position: None,
            }
        );
        assert_eq!(
            parse("join Bob admin 1 64 -2.5"),
            ScriptCommand::Join {
                name: "Bob".into(),
                role: Some("admin".into()),
                position: Some(Vec3::new(1.0, 64.0, -2.5)),
            }
        );
        assert_eq!(
            parse("join Carol 0 70 0"),
            ScriptCommand::Join {
                name: "Carol".into(),
                role: None,
                position: Some(Vec3::new(0.0, 70.0, 0.0)),
            }
        );
    }

    #[test]
    fn host_events_parse() {
        assert_eq!(parse("tick"), ScriptCommand::Tick(1));
        assert_eq!(parse("tick 50"), ScriptCommand::Tick(50));
        assert_eq!(
            parse("damage Bob 4.5"),
            ScriptCommand::Damage {
                player: "Bob".into(),
                amount: 4.5,
            }
        );
        assert_eq!(parse("kill Bob"), ScriptCommand::Kill("Bob".into()));
        assert_eq!(parse("reload"), ScriptCommand::Reload);
        assert_eq!(parse("exit"), ScriptCommand::Quit);
    }

    #[test]
    fn blank_comment_and_garbage_lines() {
        assert_eq!(parse_line("   ").expect("blank"), None);
        assert_eq!(parse_line("# setup").expect("comment"), None);
        assert!(parse_line("move Alice 1 2").is_err());
        assert!(parse_line("tick soon").is_err());
        assert!(parse_line("dance").is_err());
    }
}
