//! Player-facing text for engine notices.
//!
//! A [`Notice`] carries only a [`MessageKey`], the module it belongs to and
//! named substitutions. The catalog picks a template (per-module override
//! first, then the shared template, then the built-in English text), fills
//! in `{placeholder}` tokens and prepends the module's prefix.
use std::collections::BTreeMap;

use essentials_core::{ActionKind, MessageKey, Module, Notice};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageCatalog {
    prefixes: BTreeMap<Module, String>,
    templates: BTreeMap<MessageKey, String>,
    per_kind: BTreeMap<(Module, MessageKey), String>,
}

impl MessageCatalog {
    /// Catalog with no overrides: every key renders its English default.
    pub fn new() -> Self {
        let prefixes = [
            (Module::Home, "[Home]"),
            (Module::Back, "[Back]"),
            (Module::Spawn, "[Spawn]"),
            (Module::Tpa, "[TPA]"),
            (Module::Tpr, "[TPR]"),
            (Module::Rules, "[Rules]"),
            (Module::Info, "[EssentialsX]"),
        ]
        .into_iter()
        .map(|(kind, prefix)| (kind, prefix.to_string()))
        .collect();

        let per_kind = [
            (
                ActionKind::Home,
                MessageKey::WarmupStarted,
                "Teleporting home in {seconds}s. Don't move!",
            ),
            (
                ActionKind::Back,
                MessageKey::WarmupStarted,
                "Teleporting to your death point in {seconds}s. Don't move!",
            ),
            (
                ActionKind::Back,
                MessageKey::NoDestination,
                "No saved death location.",
            ),
            (
                ActionKind::Home,
                MessageKey::NoDestination,
                "You don't have any homes yet. Use /sethome <name> first.",
            ),
            (
                ActionKind::Tpa,
                MessageKey::RequestSent,
                "You asked {player} to let you teleport to them.",
            ),
            (
                ActionKind::Tpa,
                MessageKey::RequestReceived,
                "{player} wants to teleport to you. /tpaccept or /tpdeny within {seconds}s.",
            ),
            (
                ActionKind::Tpr,
                MessageKey::RequestSent,
                "You asked {player} to teleport to you.",
            ),
            (
                ActionKind::Tpr,
                MessageKey::RequestReceived,
                "{player} wants you to teleport to them. /tpraccept or /tprdeny within {seconds}s.",
            ),
        ]
        .into_iter()
        .map(|(kind, key, text)| ((Module::from(kind), key), text.to_string()))
        .collect();

        Self {
            prefixes,
            templates: BTreeMap::new(),
            per_kind,
        }
    }

    pub fn set_prefix(&mut self, module: impl Into<Module>, prefix: impl Into<String>) {
        self.prefixes.insert(module.into(), prefix.into());
    }

    /// Replaces the shared template for `key`.
    pub fn set_template(&mut self, key: MessageKey, template: impl Into<String>) {
        self.templates.insert(key, template.into());
    }

    /// Replaces the template for `key` when sent by one module only.
    pub fn set_kind_template(
        &mut self,
        module: impl Into<Module>,
        key: MessageKey,
        template: impl Into<String>,
    ) {
        self.per_kind.insert((module.into(), key), template.into());
    }

    pub fn prefix(&self, module: impl Into<Module>) -> &str {
        self.prefixes
            .get(&module.into())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Template that will be used for `key` under `module`.
    pub fn template(&self, module: impl Into<Module>, key: MessageKey) -> &str {
        self.per_kind
            .get(&(module.into(), key))
            .or_else(|| self.templates.get(&key))
            .map(String::as_str)
            .unwrap_or_else(|| english(key))
    }

    /// Renders the notice body without the prefix.
    pub fn render_body(&self, notice: &Notice) -> String {
        let mut text = self.template(notice.module, notice.key).to_string();
        for (name, value) in notice.subs.iter() {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }

    /// Renders the full line shown to the player.
    pub fn render(&self, notice: &Notice) -> String {
        let body = self.render_body(notice);
        match self.prefix(notice.module) {
            "" => body,
            prefix => format!("{prefix} {body}"),
        }
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in English text for every key.
pub const fn english(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        RequestSent => "You sent {player} a teleport request.",
        RequestReceived => "You received a teleport request from {player}.",
        RequestAccepted => "{player} accepted your request.",
        RequestDenied => "{player} denied your request.",
        DenyConfirmed => "You denied {player}'s request.",
        RequestCanceled => "{player} canceled their request.",
        CancelConfirmed => "You canceled your request to {player}.",
        RequestExpired => "Your request to {player} expired.",

        WarmupStarted => "Teleporting in {seconds}s. Don't move!",
        Teleported => "Teleported.",
        PartnerTeleported => "{player} teleported successfully.",
        CanceledMoved => "You moved; teleport canceled.",
        CanceledDamaged => "You took damage; teleport canceled.",
        CanceledExplicit => "Teleport canceled.",
        CanceledDisconnected => "Teleport canceled.",
        PartnerCanceled => "Teleport with {player} canceled ({reason}).",

        AlreadyBusy => "A teleport is already in progress.",
        DuplicatePending => "You already have a pending request.",
        NothingPending => "You have no request to answer.",
        NothingToCancel => "You have no pending request or warmup to cancel.",
        OnCooldown => "You must wait {seconds}s before using this again.",
        SelfTarget => "You cannot teleport to yourself.",
        TargetNotFound => "Player not found or offline.",
        ExecutionFailed => "Teleport failed.",
        Disabled => "This command is disabled on this server.",
        NoDestination => "There is nowhere to teleport to.",
        PermissionDenied => "You don't have permission to do that.",
        CombatTagged => "You were hurt recently. Wait {seconds}s.",

        HomeSaved => "Home '{name}' saved.",
        HomeDeleted => "Home '{name}' deleted.",
        HomeList => "Homes ({count}): {list}",
        InvalidName => "Home name contains invalid characters.",
        NameTooLong => "Home name is too long (max {max} chars).",
        LimitReached => "You reached your home limit ({count}). Delete a home first.",
        DuplicateName => "A home named '{name}' already exists.",
        NoSuchHome => "No home named '{name}'.",
        NotOnGround => "Stand on solid ground to set a home.",
        InLiquid => "Cannot set a home while in liquid.",
        StorageFailed => "Could not save your data. Try again later.",

        DeathSaved => "Death point saved at {position}.",
        SpawnSet => "Server spawn updated to {position}.",

        RulesLine => "{index}. {text}",
        RulesPage => "Page {page}/{total}",
        NoRules => "No rules configured.",
        Info => "EssentialsX {version}, modules {status}: {modules}",
        HelpTitle => "EssentialsX Help",
        HelpSection => "{section}:",
        HelpLine => "  {usage} : {description}",
        Reloading => "Reloading configs...",
        Reloaded => "Configs reloaded.",
        ReloadFailed => "Reload failed, check the server log.",

        Usage => "Usage: {usage}",
    }
}
