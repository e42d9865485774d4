//! Engine configuration and tunable parameters.
//!
//! All durations are stored in ticks. Hosts that author settings in seconds
//! convert with [`EngineConfig::seconds_to_ticks`].
use std::collections::BTreeMap;

use crate::action::{ActionKind, Module};
use crate::engine::WatchFlags;
use crate::state::PlayerRef;

/// Role- and name-based exemption list. Matching is case-insensitive.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BypassPolicy {
    pub roles: Vec<String>,
    pub players: Vec<String>,
}

impl BypassPolicy {
    pub fn new<R, P>(roles: R, players: P) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
            players: players.into_iter().map(Into::into).collect(),
        }
    }

    /// Nobody is exempt.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn allows(&self, player: &PlayerRef, role: Option<&str>) -> bool {
        if self
            .players
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&player.name))
        {
            return true;
        }
        role.is_some_and(|role| self.roles.iter().any(|r| r.eq_ignore_ascii_case(role)))
    }
}

/// Per-kind knobs of the shared warmup pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionSettings {
    pub enabled: bool,
    pub warmup_ticks: u64,
    pub cooldown_ticks: u64,
    /// Lifetime of an unanswered request. Ignored by single-party kinds.
    pub request_ttl_ticks: u64,
    pub watch: WatchFlags,
    pub bypass: BypassPolicy,
    /// Drop the mover onto the nearest solid ground below the destination.
    pub safe_teleport: bool,
}

impl ActionSettings {
    pub fn new(warmup_ticks: u64, cooldown_ticks: u64, watch: WatchFlags) -> Self {
        Self {
            enabled: true,
            warmup_ticks,
            cooldown_ticks,
            request_ttl_ticks: 0,
            watch,
            bypass: BypassPolicy::none(),
            safe_teleport: false,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ticks: u64) -> Self {
        self.request_ttl_ticks = ticks;
        self
    }

    #[must_use]
    pub fn with_bypass(mut self, bypass: BypassPolicy) -> Self {
        self.bypass = bypass;
        self
    }

    #[must_use]
    pub fn with_safe_teleport(mut self, safe: bool) -> Self {
        self.safe_teleport = safe;
        self
    }
}

/// Home management limits.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HomeSettings {
    pub max_name_length: usize,
    pub case_insensitive_names: bool,
    pub trim_names: bool,
    /// Home limit per role, keyed by lowercase role name.
    pub max_homes_by_role: BTreeMap<String, usize>,
    /// Per-player overrides, keyed by lowercase player name.
    pub player_overrides: BTreeMap<String, usize>,
    /// Limit for roles missing from `max_homes_by_role`.
    pub default_limit: usize,
    pub combat_tag_ticks: u64,
    pub combat_tag_blocks_set_home: bool,
    pub require_solid_ground: bool,
    pub deny_in_liquid: bool,
}

impl HomeSettings {
    pub const DEFAULT_MAX_NAME_LENGTH: usize = 24;
    pub const DEFAULT_LIMIT: usize = 1;

    /// Effective home limit for a player.
    ///
    /// A player override wins; a player without a role gets zero homes.
    pub fn limit_for(&self, player: &PlayerRef, role: Option<&str>) -> usize {
        if let Some(limit) = self.player_overrides.get(&player.name.to_ascii_lowercase()) {
            return *limit;
        }
        match role.map(str::trim).filter(|r| !r.is_empty()) {
            None => 0,
            Some(role) => self
                .max_homes_by_role
                .get(&role.to_ascii_lowercase())
                .copied()
                .unwrap_or(self.default_limit),
        }
    }
}

impl Default for HomeSettings {
    fn default() -> Self {
        let max_homes_by_role = [
            ("suvisitor", 0),
            ("crvisitor", 0),
            ("suplayer", 1),
            ("crplayer", 2),
            ("sumod", 5),
            ("crmod", 5),
            ("admin", 999),
        ]
        .into_iter()
        .map(|(role, limit)| (role.to_string(), limit))
        .collect();

        Self {
            max_name_length: Self::DEFAULT_MAX_NAME_LENGTH,
            case_insensitive_names: true,
            trim_names: true,
            max_homes_by_role,
            player_overrides: BTreeMap::new(),
            default_limit: Self::DEFAULT_LIMIT,
            combat_tag_ticks: 5 * EngineConfig::DEFAULT_TICK_RATE_HZ,
            combat_tag_blocks_set_home: true,
            require_solid_ground: true,
            deny_in_liquid: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnSettings {
    /// Who may run `setspawn`.
    pub set_spawn: BypassPolicy,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            set_spawn: BypassPolicy::new(["admin", "sumod", "crmod"], ["Notch"]),
        }
    }
}

/// `/rules` text and paging.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RulesSettings {
    pub enabled: bool,
    pub lines_per_page: usize,
    pub lines: Vec<String>,
}

impl Default for RulesSettings {
    fn default() -> Self {
        let lines = [
            "Be respectful to other players.",
            "No cheating, exploiting, or griefing.",
            "Keep chat civil; no hate speech.",
            "No advertising without admin permission.",
            "English in global chat; other languages in groups.",
            "Report bugs and issues to admins.",
        ];
        Self {
            enabled: true,
            lines_per_page: 8,
            lines: lines.into_iter().map(str::to_string).collect(),
        }
    }
}

/// `/essentialsx` settings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoSettings {
    /// Who may reload settings and see the admin help page.
    pub admin: BypassPolicy,
}

impl Default for InfoSettings {
    fn default() -> Self {
        Self {
            admin: BypassPolicy::new(["admin"], ["Notch"]),
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    pub tick_rate_hz: u64,
    /// Period of the warmup watcher.
    pub watch_interval_ticks: u64,
    /// Distance the mover may drift before a warmup is canceled.
    pub move_tolerance: f64,
    /// Health drop ignored by the damage watcher.
    pub damage_epsilon: f64,
    pub actions: BTreeMap<ActionKind, ActionSettings>,
    pub homes: HomeSettings,
    pub spawn: SpawnSettings,
    pub rules: RulesSettings,
    pub info: InfoSettings,
}

impl EngineConfig {
    pub const DEFAULT_TICK_RATE_HZ: u64 = 10;
    pub const DEFAULT_WATCH_INTERVAL_TICKS: u64 = 1;
    pub const DEFAULT_MOVE_TOLERANCE: f64 = 0.05;
    pub const DEFAULT_DAMAGE_EPSILON: f64 = 0.01;

    pub fn new() -> Self {
        let secs = |s: u64| s * Self::DEFAULT_TICK_RATE_HZ;
        let staff = BypassPolicy::new(["admin", "sumod", "crmod"], ["Notch"]);
        let admin = BypassPolicy::new(["admin"], Vec::<String>::new());
        let both = WatchFlags::MOVE | WatchFlags::DAMAGE;

        let actions = [
            (
                ActionKind::Home,
                ActionSettings::new(secs(5), secs(60), both).with_bypass(staff.clone()),
            ),
            (
                ActionKind::Back,
                ActionSettings::new(secs(5), secs(600), WatchFlags::MOVE)
                    .with_bypass(staff.clone())
                    .with_safe_teleport(true),
            ),
            (
                ActionKind::Spawn,
                ActionSettings::new(secs(10), secs(120), both)
                    .with_bypass(staff)
                    .with_safe_teleport(true),
            ),
            (
                ActionKind::Tpa,
                ActionSettings::new(secs(5), secs(60), both)
                    .with_ttl(secs(30))
                    .with_bypass(admin.clone()),
            ),
            (
                ActionKind::Tpr,
                ActionSettings::new(secs(5), secs(60), both)
                    .with_ttl(secs(30))
                    .with_bypass(admin),
            ),
        ]
        .into_iter()
        .collect();

        Self {
            tick_rate_hz: Self::DEFAULT_TICK_RATE_HZ,
            watch_interval_ticks: Self::DEFAULT_WATCH_INTERVAL_TICKS,
            move_tolerance: Self::DEFAULT_MOVE_TOLERANCE,
            damage_epsilon: Self::DEFAULT_DAMAGE_EPSILON,
            actions,
            homes: HomeSettings::default(),
            spawn: SpawnSettings::default(),
            rules: RulesSettings::default(),
            info: InfoSettings::default(),
        }
    }

    /// Settings for `kind`. A kind missing from the map is treated as disabled.
    pub fn settings(&self, kind: ActionKind) -> Option<&ActionSettings> {
        self.actions.get(&kind).filter(|s| s.enabled)
    }

    pub fn settings_mut(&mut self, kind: ActionKind) -> Option<&mut ActionSettings> {
        self.actions.get_mut(&kind)
    }

    /// Whether a module's commands are available. Info is always on.
    pub fn module_enabled(&self, module: Module) -> bool {
        match module.action_kind() {
            Some(kind) => self.settings(kind).is_some(),
            None => module != Module::Rules || self.rules.enabled,
        }
    }

    pub fn seconds_to_ticks(&self, seconds: f64) -> u64 {
        if seconds <= 0.0 {
            return 0;
        }
        (seconds * self.tick_rate_hz as f64).round() as u64
    }

    /// Whole seconds covering `ticks`, rounded up.
    pub fn ticks_to_seconds_ceil(&self, ticks: u64) -> u64 {
        let rate = self.tick_rate_hz.max(1);
        ticks.div_ceil(rate)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
