//! `rules` and `essentialsx` (info, help, reload).
//!
//! None of these touch the engine tables. Output is a run of notices, one per
//! chat line, so hosts render them with the same catalog as teleport text.
use strum::IntoEnumIterator;

use crate::action::Module;
use crate::command::{Outcome, Verb};
use crate::engine::Engine;
use crate::env::{Env, MessageKey, Notice};
use crate::error::ActionError;
use crate::state::PlayerRef;

/// Reported by `/essentialsx info`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One block of the help index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum HelpSection {
    Teleport,
    Homes,
    Rules,
    Spawn,
    Back,
    Admin,
}

impl HelpSection {
    /// Resolves a `/essentialsx help <module>` argument.
    pub fn from_topic(topic: &str) -> Option<Self> {
        match topic.trim().to_ascii_lowercase().as_str() {
            "teleport" | "tp" | "tpa" | "tpr" => Some(Self::Teleport),
            "homes" | "home" => Some(Self::Homes),
            "rules" => Some(Self::Rules),
            "spawn" => Some(Self::Spawn),
            "back" => Some(Self::Back),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    const fn verbs(self) -> &'static [Verb] {
        match self {
            Self::Teleport => &[
                Verb::Tpa,
                Verb::TpAccept,
                Verb::TpDeny,
                Verb::TpCancel,
                Verb::Tpr,
                Verb::TprAccept,
                Verb::TprDeny,
                Verb::TprCancel,
            ],
            Self::Homes => &[Verb::Home, Verb::SetHome, Verb::DelHome, Verb::Homes],
            Self::Rules => &[Verb::Rules],
            Self::Spawn => &[Verb::Spawn, Verb::SetSpawn],
            Self::Back => &[Verb::Back],
            Self::Admin => &[],
        }
    }
}

impl Engine {
    pub(crate) fn show_rules(
        &self,
        caller: &PlayerRef,
        page: usize,
        env: Env<'_>,
    ) -> Result<Outcome, ActionError> {
        let rules = &self.config.rules;
        if !rules.enabled {
            return Err(ActionError::Disabled(Module::Rules));
        }
        if rules.lines.is_empty() {
            env.notify(Notice::new(caller.id, Module::Rules, MessageKey::NoRules));
            return Ok(Outcome::Rules { page: 0, pages: 0 });
        }

        let per_page = rules.lines_per_page.max(1);
        let pages = rules.lines.len().div_ceil(per_page);
        let page = page.clamp(1, pages);
        let first = (page - 1) * per_page;

        for (index, text) in rules.lines.iter().enumerate().skip(first).take(per_page) {
            env.notify(
                Notice::new(caller.id, Module::Rules, MessageKey::RulesLine)
                    .with("index", index + 1)
                    .with("text", text),
            );
        }
        env.notify(
            Notice::new(caller.id, Module::Rules, MessageKey::RulesPage)
                .with("page", page)
                .with("total", pages),
        );
        Ok(Outcome::Rules { page, pages })
    }

    pub(crate) fn show_info(&self, caller: &PlayerRef, env: Env<'_>) -> Outcome {
        let enabled: Vec<Module> = Module::iter()
            .filter(|m| self.config.module_enabled(*m))
            .collect();
        let names: Vec<&str> = enabled.iter().map(|m| m.as_ref()).collect();
        env.notify(
            Notice::new(caller.id, Module::Info, MessageKey::Info)
                .with("version", VERSION)
                .with("status", format!("{}/{}", enabled.len(), Module::iter().count()))
                .with("modules", names.join(", ")),
        );
        Outcome::Info
    }

    /// Help index, or one section when `topic` names an available one.
    pub(crate) fn show_help(
        &self,
        caller: &PlayerRef,
        topic: Option<&str>,
        env: Env<'_>,
    ) -> Outcome {
        let admin = self.is_admin(caller, env);
        let available: Vec<(HelpSection, Vec<(&str, &str)>)> = HelpSection::iter()
            .map(|section| (section, self.help_lines(section, caller, admin, env)))
            .filter(|(_, lines)| !lines.is_empty())
            .collect();

        // Unknown or unavailable topics fall back to the index.
        let wanted = topic.and_then(HelpSection::from_topic);
        let shown: Vec<_> = match available.iter().find(|(s, _)| Some(*s) == wanted) {
            Some(one) => vec![one],
            None => available.iter().collect(),
        };

        env.notify(Notice::new(caller.id, Module::Info, MessageKey::HelpTitle));
        for (section, lines) in shown {
            env.notify(
                Notice::new(caller.id, Module::Info, MessageKey::HelpSection)
                    .with("section", section),
            );
            for (usage, description) in lines {
                env.notify(
                    Notice::new(caller.id, Module::Info, MessageKey::HelpLine)
                        .with("usage", usage)
                        .with("description", description),
                );
            }
        }
        Outcome::Help
    }

    fn help_lines(
        &self,
        section: HelpSection,
        caller: &PlayerRef,
        admin: bool,
        env: Env<'_>,
    ) -> Vec<(&'static str, &'static str)> {
        if section == HelpSection::Admin {
            return if admin {
                vec![("/essentialsx reload", "Reload settings from disk")]
            } else {
                Vec::new()
            };
        }
        let role = env.players().role(caller.id);
        section
            .verbs()
            .iter()
            .filter(|verb| self.config.module_enabled(verb.module()))
            .filter(|verb| {
                **verb != Verb::SetSpawn || self.config.spawn.set_spawn.allows(caller, role.as_deref())
            })
            .map(|verb| (verb.usage(), verb.description()))
            .collect()
    }

    /// Checks the caller may reload. The reload itself is the host's job.
    pub(crate) fn request_reload(
        &self,
        caller: &PlayerRef,
        env: Env<'_>,
    ) -> Result<Outcome, ActionError> {
        if !self.is_admin(caller, env) {
            return Err(ActionError::PermissionDenied);
        }
        tracing::info!(player = %caller, "settings reload requested");
        env.notify(Notice::new(caller.id, Module::Info, MessageKey::Reloading));
        Ok(Outcome::ReloadRequested)
    }

    fn is_admin(&self, caller: &PlayerRef, env: Env<'_>) -> bool {
        let role = env.players().role(caller.id);
        self.config.info.admin.allows(caller, role.as_deref())
    }
}
