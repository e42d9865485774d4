//! Settings file loader.
//!
//! Server owners author durations in seconds; the engine counts ticks. The
//! file is layered over [`EngineConfig::default`]: every key is optional and
//! missing durations keep their default length in seconds even when
//! `tick_rate_hz` changes.

use std::collections::BTreeMap;
use std::path::Path;

use essentials_core::{ActionKind, ActionSettings, BypassPolicy, EngineConfig, WatchFlags};
use serde::Deserialize;

use crate::loaders::{LoadResult, read_file};

/// Settings template written on first start.
pub const DEFAULT_SETTINGS: &str = include_str!("../../data/essentials.toml");

/// Top-level layout of `essentials.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub tick_rate_hz: Option<u64>,
    pub watch_interval_ticks: Option<u64>,
    pub move_tolerance: Option<f64>,
    pub damage_epsilon: Option<f64>,
    pub home: ActionSection,
    pub back: ActionSection,
    pub spawn: ActionSection,
    pub tpa: ActionSection,
    pub tpr: ActionSection,
    pub homes: HomesSection,
    pub set_spawn: PolicySection,
    pub rules: RulesSection,
    /// Who may run `/essentialsx reload`.
    pub admin: PolicySection,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActionSection {
    pub enabled: Option<bool>,
    pub warmup_seconds: Option<f64>,
    pub cooldown_seconds: Option<f64>,
    pub request_expire_seconds: Option<f64>,
    pub cancel_on_move: Option<bool>,
    pub cancel_on_damage: Option<bool>,
    pub safe_teleport: Option<bool>,
    pub bypass_roles: Option<Vec<String>>,
    pub bypass_players: Option<Vec<String>>,
}

/// Role and player allow-list.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySection {
    pub roles: Option<Vec<String>>,
    pub players: Option<Vec<String>>,
}

impl PolicySection {
    fn apply(self, policy: &mut BypassPolicy) {
        if let Some(roles) = self.roles {
            policy.roles = roles;
        }
        if let Some(players) = self.players {
            policy.players = players;
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesSection {
    pub enabled: Option<bool>,
    pub lines_per_page: Option<usize>,
    pub lines: Option<Vec<String>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomesSection {
    pub max_name_length: Option<usize>,
    pub case_insensitive_names: Option<bool>,
    pub trim_names: Option<bool>,
    pub default_limit: Option<usize>,
    pub combat_tag_seconds: Option<f64>,
    pub combat_tag_blocks_set_home: Option<bool>,
    pub require_solid_ground: Option<bool>,
    pub deny_in_liquid: Option<bool>,
    pub max_homes_by_role: Option<BTreeMap<String, usize>>,
    pub player_overrides: Option<BTreeMap<String, usize>>,
}

/// Converts seconds to ticks at `rate`, keeping the default duration when unset.
fn ticks(seconds: Option<f64>, default_ticks: u64, rate: u64) -> u64 {
    let default_seconds = default_ticks as f64 / EngineConfig::DEFAULT_TICK_RATE_HZ as f64;
    let seconds = seconds.unwrap_or(default_seconds);
    if seconds <= 0.0 {
        return 0;
    }
    (seconds * rate as f64).round() as u64
}

impl ActionSection {
    fn apply(&self, settings: &mut ActionSettings, rate: u64) {
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        settings.warmup_ticks = ticks(self.warmup_seconds, settings.warmup_ticks, rate);
        settings.cooldown_ticks = ticks(self.cooldown_seconds, settings.cooldown_ticks, rate);
        settings.request_ttl_ticks =
            ticks(self.request_expire_seconds, settings.request_ttl_ticks, rate);

        if let Some(on) = self.cancel_on_move {
            settings.watch.set(WatchFlags::MOVE, on);
        }
        if let Some(on) = self.cancel_on_damage {
            settings.watch.set(WatchFlags::DAMAGE, on);
        }
        if let Some(safe) = self.safe_teleport {
            settings.safe_teleport = safe;
        }
        if let Some(roles) = &self.bypass_roles {
            settings.bypass.roles = roles.clone();
        }
        if let Some(players) = &self.bypass_players {
            settings.bypass.players = players.clone();
        }
    }
}

impl SettingsFile {
    /// Parses the TOML text of a settings file.
    pub fn parse(content: &str) -> LoadResult<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse settings TOML: {}", e))
    }

    /// Layers this file over the built-in defaults.
    pub fn into_config(self) -> LoadResult<EngineConfig> {
        let mut config = EngineConfig::default();
        let rate = self.tick_rate_hz.unwrap_or(config.tick_rate_hz);
        if rate == 0 {
            anyhow::bail!("tick_rate_hz must be at least 1");
        }
        config.tick_rate_hz = rate;
        if let Some(interval) = self.watch_interval_ticks {
            config.watch_interval_ticks = interval.max(1);
        }
        if let Some(tolerance) = self.move_tolerance {
            config.move_tolerance = tolerance;
        }
        if let Some(epsilon) = self.damage_epsilon {
            config.damage_epsilon = epsilon;
        }

        let sections = [
            (ActionKind::Home, &self.home),
            (ActionKind::Back, &self.back),
            (ActionKind::Spawn, &self.spawn),
            (ActionKind::Tpa, &self.tpa),
            (ActionKind::Tpr, &self.tpr),
        ];
        for (kind, section) in sections {
            let settings = config
                .actions
                .entry(kind)
                .or_insert_with(|| ActionSettings::new(0, 0, WatchFlags::all()));
            section.apply(settings, rate);
        }

        self.set_spawn.apply(&mut config.spawn.set_spawn);
        self.admin.apply(&mut config.info.admin);

        let rules = &mut config.rules;
        if let Some(on) = self.rules.enabled {
            rules.enabled = on;
        }
        if let Some(per_page) = self.rules.lines_per_page {
            rules.lines_per_page = per_page.max(1);
        }
        if let Some(lines) = self.rules.lines {
            rules.lines = lines;
        }

        let homes = &mut config.homes;
        let section = self.homes;
        if let Some(max) = section.max_name_length {
            homes.max_name_length = max;
        }
        if let Some(on) = section.case_insensitive_names {
            homes.case_insensitive_names = on;
        }
        if let Some(on) = section.trim_names {
            homes.trim_names = on;
        }
        if let Some(limit) = section.default_limit {
            homes.default_limit = limit;
        }
        homes.combat_tag_ticks = ticks(section.combat_tag_seconds, homes.combat_tag_ticks, rate);
        if let Some(on) = section.combat_tag_blocks_set_home {
            homes.combat_tag_blocks_set_home = on;
        }
        if let Some(on) = section.require_solid_ground {
            homes.require_solid_ground = on;
        }
        if let Some(on) = section.deny_in_liquid {
            homes.deny_in_liquid = on;
        }
        if let Some(limits) = section.max_homes_by_role {
            homes.max_homes_by_role = rekey(limits);
        }
        if let Some(overrides) = section.player_overrides {
            homes.player_overrides = rekey(overrides);
        }

        Ok(config)
    }
}

/// Role and player keys are matched in lowercase.
fn rekey(map: BTreeMap<String, usize>) -> BTreeMap<String, usize> {
    map.into_iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect()
}

/// Loader for engine settings from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        let config = SettingsFile::parse(&content)?.into_config()?;
        tracing::debug!(path = %path.display(), tick_rate_hz = config.tick_rate_hz, "settings loaded");
        Ok(config)
    }

    /// Load settings, writing the default template first when the file is missing.
    pub fn load_or_create(path: &Path) -> LoadResult<EngineConfig> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    anyhow::anyhow!("Failed to create {}: {}", parent.display(), e)
                })?;
            }
            std::fs::write(path, DEFAULT_SETTINGS)
                .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))?;
            tracing::info!(path = %path.display(), "default settings written");
        }
        Self::load(path)
    }
}
