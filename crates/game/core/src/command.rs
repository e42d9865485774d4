//! Chat command surface.
//!
//! Hosts hand the engine a verb and the raw argument text; [`Command::parse`]
//! turns them into a typed [`Command`] for [`crate::engine::Engine::dispatch`].
use std::str::FromStr;

use crate::action::{Module, NegotiationKind};
use crate::env::{MessageKey, Notice};
use crate::state::{Location, PlayerId};

/// Chat verbs, matched case-insensitively.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Verb {
    SetHome,
    DelHome,
    Home,
    Homes,
    Back,
    Spawn,
    SetSpawn,
    Tpa,
    TpAccept,
    TpDeny,
    TpCancel,
    Tpr,
    TprAccept,
    TprDeny,
    TprCancel,
    Rules,
    EssentialsX,
}

impl Verb {
    /// Usage line shown when a required argument is missing.
    pub const fn usage(self) -> &'static str {
        match self {
            Self::SetHome => "/sethome <name>",
            Self::DelHome => "/delhome <name>",
            Self::Home => "/home [name]",
            Self::Homes => "/homes",
            Self::Back => "/back",
            Self::Spawn => "/spawn",
            Self::SetSpawn => "/setspawn",
            Self::Tpa => "/tpa <player>",
            Self::TpAccept => "/tpaccept",
            Self::TpDeny => "/tpdeny",
            Self::TpCancel => "/tpcancel",
            Self::Tpr => "/tpr <player>",
            Self::TprAccept => "/tpraccept",
            Self::TprDeny => "/tprdeny",
            Self::TprCancel => "/tprcancel",
            Self::Rules => "/rules [page]",
            Self::EssentialsX => "/essentialsx [info | help [module] | reload]",
        }
    }

    /// One-line summary for help pages.
    pub const fn description(self) -> &'static str {
        match self {
            Self::SetHome => "Set a new home",
            Self::DelHome => "Delete a home",
            Self::Home => "Teleport to your home",
            Self::Homes => "List all homes",
            Self::Back => "Return to where you last died",
            Self::Spawn => "Teleport to the server spawn",
            Self::SetSpawn => "Make your position the server spawn",
            Self::Tpa => "Request to teleport to a player",
            Self::TpAccept => "Accept a teleport request",
            Self::TpDeny => "Deny a teleport request",
            Self::TpCancel => "Cancel your teleport request",
            Self::Tpr => "Request a player to teleport to you",
            Self::TprAccept => "Accept a summon request",
            Self::TprDeny => "Deny a summon request",
            Self::TprCancel => "Cancel your summon request",
            Self::Rules => "Show server rules",
            Self::EssentialsX => "Show mod info and help",
        }
    }

    /// Module whose prefix and settings the verb uses.
    pub const fn module(self) -> Module {
        match self {
            Self::SetHome | Self::DelHome | Self::Home | Self::Homes => Module::Home,
            Self::Back => Module::Back,
            Self::Spawn | Self::SetSpawn => Module::Spawn,
            Self::Tpa | Self::TpAccept | Self::TpDeny | Self::TpCancel => Module::Tpa,
            Self::Tpr | Self::TprAccept | Self::TprDeny | Self::TprCancel => Module::Tpr,
            Self::Rules => Module::Rules,
            Self::EssentialsX => Module::Info,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("unknown command '{0}'")]
    UnknownVerb(String),

    #[error("usage: {}", .0.usage())]
    MissingArgument(Verb),

    #[error("unknown subcommand '{1}', usage: {usage}", usage = .0.usage())]
    UnknownSubcommand(Verb, String),
}

impl CommandParseError {
    /// Usage reminder for the caller. Unknown verbs belong to other plugins,
    /// so they produce no notice.
    pub fn notice(&self, recipient: PlayerId) -> Option<Notice> {
        match self {
            Self::UnknownVerb(_) => None,
            Self::MissingArgument(verb) | Self::UnknownSubcommand(verb, _) => Some(
                Notice::new(recipient, verb.module(), MessageKey::Usage)
                    .with("usage", verb.usage()),
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SetHome { name: String },
    DelHome { name: String },
    Home { name: Option<String> },
    ListHomes,
    Back,
    Spawn,
    SetSpawn,
    Request { kind: NegotiationKind, target: String },
    Accept(NegotiationKind),
    Deny(NegotiationKind),
    Cancel(NegotiationKind),
    /// One page of the server rules, counted from 1.
    Rules { page: usize },
    Info,
    Help { topic: Option<String> },
    Reload,
}

impl Command {
    /// Parses `verb` (with or without a leading `/`) and its raw argument.
    pub fn parse(verb: &str, raw: &str) -> Result<Self, CommandParseError> {
        let name = verb.trim().trim_start_matches('/');
        let verb =
            Verb::from_str(name).map_err(|_| CommandParseError::UnknownVerb(name.to_string()))?;
        let arg = strip_quotes(raw.trim());
        let required = |verb: Verb| {
            if arg.is_empty() {
                Err(CommandParseError::MissingArgument(verb))
            } else {
                Ok(arg.to_string())
            }
        };

        Ok(match verb {
            Verb::SetHome => Command::SetHome {
                name: required(verb)?,
            },
            Verb::DelHome => Command::DelHome {
                name: required(verb)?,
            },
            Verb::Home => Command::Home {
                name: (!arg.is_empty()).then(|| arg.to_string()),
            },
            Verb::Homes => Command::ListHomes,
            Verb::Back => Command::Back,
            Verb::Spawn => Command::Spawn,
            Verb::SetSpawn => Command::SetSpawn,
            Verb::Tpa => Command::Request {
                kind: NegotiationKind::Tpa,
                target: required(verb)?,
            },
            Verb::Tpr => Command::Request {
                kind: NegotiationKind::Tpr,
                target: required(verb)?,
            },
            Verb::TpAccept => Command::Accept(NegotiationKind::Tpa),
            Verb::TprAccept => Command::Accept(NegotiationKind::Tpr),
            Verb::TpDeny => Command::Deny(NegotiationKind::Tpa),
            Verb::TprDeny => Command::Deny(NegotiationKind::Tpr),
            Verb::TpCancel => Command::Cancel(NegotiationKind::Tpa),
            Verb::TprCancel => Command::Cancel(NegotiationKind::Tpr),
            // Anything that is not a positive page number shows the first page.
            Verb::Rules => Command::Rules {
                page: arg.parse().ok().filter(|page| *page >= 1).unwrap_or(1),
            },
            Verb::EssentialsX => {
                let (sub, rest) = arg.split_once(char::is_whitespace).unwrap_or((arg, ""));
                let rest = strip_quotes(rest.trim());
                match sub.to_ascii_lowercase().as_str() {
                    "" => Command::Help { topic: None },
                    "help" => Command::Help {
                        topic: (!rest.is_empty()).then(|| rest.to_string()),
                    },
                    "info" => Command::Info,
                    "reload" => Command::Reload,
                    _ => return Err(CommandParseError::UnknownSubcommand(verb, sub.to_string())),
                }
            }
        })
    }

    /// Module used for settings lookup and notice prefixes.
    pub fn module(&self) -> Module {
        match self {
            Command::SetHome { .. }
            | Command::DelHome { .. }
            | Command::Home { .. }
            | Command::ListHomes => Module::Home,
            Command::Back => Module::Back,
            Command::Spawn | Command::SetSpawn => Module::Spawn,
            Command::Request { kind, .. }
            | Command::Accept(kind)
            | Command::Deny(kind)
            | Command::Cancel(kind) => kind.action_kind().into(),
            Command::Rules { .. } => Module::Rules,
            Command::Info | Command::Help { .. } | Command::Reload => Module::Info,
        }
    }
}

/// Removes one pair of matching surrounding quotes.
pub fn strip_quotes(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return &raw[1..raw.len() - 1];
        }
    }
    raw
}

/// Successful result of a dispatched command.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Requested { receiver: PlayerId },
    WarmupStarted { ticks: u64 },
    Teleported(Location),
    Denied,
    Canceled,
    HomeSaved(String),
    HomeDeleted(String),
    HomeList(Vec<String>),
    SpawnSet(Location),
    /// Page shown and page count; both zero when no rules are configured.
    Rules { page: usize, pages: usize },
    Info,
    Help,
    /// Caller may reload; the host re-reads settings and hands them to
    /// [`crate::engine::Engine::reconfigure`].
    ReloadRequested,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_parse_with_slash_and_any_case() {
        assert_eq!(Command::parse("/TPAccept", "").unwrap(), Command::Accept(NegotiationKind::Tpa));
        assert_eq!(Command::parse("homes", "ignored").unwrap(), Command::ListHomes);
        assert_eq!(
            Command::parse("tprcancel", "").unwrap(),
            Command::Cancel(NegotiationKind::Tpr)
        );
    }

    #[test]
    fn missing_argument_becomes_usage_notice() {
        let err = Command::parse("delhome", "  ").unwrap_err();
        let notice = err.notice(PlayerId(4)).unwrap();
        assert_eq!(notice.module, Module::Home);
        assert_eq!(notice.key, MessageKey::Usage);
        assert_eq!(notice.subs.get("usage"), Some("/delhome <name>"));

        let unknown = Command::parse("warp", "x").unwrap_err();
        assert!(unknown.notice(PlayerId(4)).is_none());
    }

    #[test]
    fn arguments_are_trimmed_and_unquoted() {
        assert_eq!(
            Command::parse("sethome", "  \"my base\" ").unwrap(),
            Command::SetHome {
                name: "my base".into()
            }
        );
        assert_eq!(
            Command::parse("tpa", "'Steve'").unwrap(),
            Command::Request {
                kind: NegotiationKind::Tpa,
                target: "Steve".into()
            }
        );
        assert_eq!(strip_quotes("\"half"), "\"half");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn missing_required_argument_reports_usage() {
        let err = Command::parse("tpr", "   ").unwrap_err();
        assert_eq!(err, CommandParseError::MissingArgument(Verb::Tpr));
        assert_eq!(err.to_string(), "usage: /tpr <player>");
        assert_eq!(Command::parse("home", "").unwrap(), Command::Home { name: None });
    }

    #[test]
    fn rules_page_defaults_to_first() {
        assert_eq!(Command::parse("rules", "").unwrap(), Command::Rules { page: 1 });
        assert_eq!(Command::parse("rules", "3").unwrap(), Command::Rules { page: 3 });
        assert_eq!(Command::parse("rules", "0").unwrap(), Command::Rules { page: 1 });
        assert_eq!(Command::parse("rules", "last").unwrap(), Command::Rules { page: 1 });
    }

    #[test]
    fn essentialsx_subcommands() {
        assert_eq!(
            Command::parse("/EssentialsX", "").unwrap(),
            Command::Help { topic: None }
        );
        assert_eq!(
            Command::parse("essentialsx", "help  homes").unwrap(),
            Command::Help {
                topic: Some("homes".into())
            }
        );
        assert_eq!(Command::parse("essentialsx", "INFO").unwrap(), Command::Info);
        assert_eq!(Command::parse("essentialsx", "reload").unwrap(), Command::Reload);

        let err = Command::parse("essentialsx", "fly").unwrap_err();
        assert_eq!(
            err,
            CommandParseError::UnknownSubcommand(Verb::EssentialsX, "fly".into())
        );
        let notice = err.notice(PlayerId(1)).unwrap();
        assert_eq!(notice.module, Module::Info);
        assert_eq!(notice.key, MessageKey::Usage);
    }

    #[test]
    fn unknown_verb_is_rejected() {
        assert_eq!(
            Command::parse("fly", ""),
            Err(CommandParseError::UnknownVerb("fly".into()))
        );
    }
}
