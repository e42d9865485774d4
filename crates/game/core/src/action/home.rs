//! Named homes: `sethome`, `delhome`, `homes` and `home`.
use crate::action::{ActionKind, ActionPlan, Destination, FollowUp};
use crate::command::Outcome;
use crate::config::HomeSettings;
use crate::engine::Engine;
use crate::env::{Env, MessageKey, Notice, PlayerHomes, StoreError};
use crate::error::{ActionError, CommandError, ErrorSeverity, EssentialsError};
use crate::state::{Location, PlayerRef, Tick};

/// Failures of the home management verbs.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HomeError {
    #[error("home names may only contain letters, digits, spaces, '_' and '-'")]
    InvalidName,

    #[error("home name is longer than {max} characters")]
    NameTooLong { max: usize },

    #[error("home limit of {limit} reached")]
    LimitReached { limit: usize },

    #[error("a home named '{0}' already exists")]
    DuplicateName(String),

    #[error("no home named '{0}'")]
    NoSuchHome(String),

    #[error("must stand on solid ground")]
    NotOnGround,

    #[error("cannot set a home in liquid")]
    InLiquid,

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl EssentialsError for HomeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Storage(_) => ErrorSeverity::Internal,
            Self::LimitReached { .. } | Self::NotOnGround | Self::InLiquid => {
                ErrorSeverity::Recoverable
            }
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidName => "HOME_INVALID_NAME",
            Self::NameTooLong { .. } => "HOME_NAME_TOO_LONG",
            Self::LimitReached { .. } => "HOME_LIMIT_REACHED",
            Self::DuplicateName(_) => "HOME_DUPLICATE_NAME",
            Self::NoSuchHome(_) => "HOME_NO_SUCH_HOME",
            Self::NotOnGround => "HOME_NOT_ON_GROUND",
            Self::InLiquid => "HOME_IN_LIQUID",
            Self::Storage(_) => "HOME_STORAGE",
        }
    }
}

/// Applies trimming, quote stripping and case folding from `settings`.
pub fn normalize_home_name(raw: &str, settings: &HomeSettings) -> String {
    let trimmed = if settings.trim_names { raw.trim() } else { raw };
    let name = crate::command::strip_quotes(trimmed);
    if settings.case_insensitive_names {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '-'))
}

fn find_key(data: &PlayerHomes, name: &str, case_insensitive: bool) -> Option<String> {
    if case_insensitive {
        data.homes
            .keys()
            .find(|key| key.eq_ignore_ascii_case(name))
            .cloned()
    } else {
        data.homes.contains_key(name).then(|| name.to_string())
    }
}

impl Engine {
    pub(crate) fn set_home(
        &mut self,
        caller: &PlayerRef,
        raw: &str,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, CommandError> {
        self.enabled(ActionKind::Home)?;
        let settings = &self.config.homes;

        if settings.combat_tag_blocks_set_home {
            if let Some(seconds) = self.combat_seconds(caller.id, now) {
                return Err(ActionError::CombatTagged { seconds }.into());
            }
        }

        let name = normalize_home_name(raw, settings);
        if name.chars().count() > settings.max_name_length {
            return Err(HomeError::NameTooLong {
                max: settings.max_name_length,
            }
            .into());
        }
        if !is_valid_name(&name) {
            return Err(HomeError::InvalidName.into());
        }

        let mut data = env.store().load_homes(caller.id).map_err(HomeError::from)?;
        let role = env.players().role(caller.id);
        let limit = settings.limit_for(caller, role.as_deref());
        if find_key(&data, &name, settings.case_insensitive_names).is_some() {
            return Err(HomeError::DuplicateName(name).into());
        }
        if data.len() >= limit {
            return Err(HomeError::LimitReached { limit }.into());
        }

        let position = env
            .players()
            .position(caller.id)
            .ok_or_else(|| ActionError::ExecutionFailed("player is not in the world".into()))?;
        let world = env.world();
        if settings.require_solid_ground && !world.is_solid_ground_below(position) {
            return Err(HomeError::NotOnGround.into());
        }
        if settings.deny_in_liquid && world.is_liquid(position) {
            return Err(HomeError::InLiquid.into());
        }

        let location = Location {
            position,
            orientation: env.players().orientation(caller.id),
        };
        data.homes.insert(name.clone(), location);
        data.last_used = Some(name.clone());
        env.store()
            .save_homes(caller.id, &data)
            .map_err(HomeError::from)?;

        tracing::info!(player = %caller, home = %name, position = %position, "home saved");
        env.notify(
            Notice::new(caller.id, ActionKind::Home, MessageKey::HomeSaved).with("name", &name),
        );
        Ok(Outcome::HomeSaved(name))
    }

    pub(crate) fn delete_home(
        &mut self,
        caller: &PlayerRef,
        raw: &str,
        env: Env<'_>,
    ) -> Result<Outcome, CommandError> {
        self.enabled(ActionKind::Home)?;
        let settings = &self.config.homes;
        let name = normalize_home_name(raw, settings);

        let mut data = env.store().load_homes(caller.id).map_err(HomeError::from)?;
        let key = find_key(&data, &name, settings.case_insensitive_names)
            .ok_or(HomeError::NoSuchHome(name))?;
        data.homes.remove(&key);
        if data.last_used.as_deref() == Some(key.as_str()) {
            data.last_used = None;
        }
        env.store()
            .save_homes(caller.id, &data)
            .map_err(HomeError::from)?;

        tracing::info!(player = %caller, home = %key, "home deleted");
        env.notify(
            Notice::new(caller.id, ActionKind::Home, MessageKey::HomeDeleted).with("name", &key),
        );
        Ok(Outcome::HomeDeleted(key))
    }

    pub(crate) fn list_homes(
        &mut self,
        caller: &PlayerRef,
        env: Env<'_>,
    ) -> Result<Outcome, CommandError> {
        self.enabled(ActionKind::Home)?;
        let data = env.store().load_homes(caller.id).map_err(HomeError::from)?;
        let names = data.names();

        env.notify(
            Notice::new(caller.id, ActionKind::Home, MessageKey::HomeList)
                .with("count", names.len())
                .with("list", names.join(", ")),
        );
        Ok(Outcome::HomeList(names))
    }

    /// Travels to the named home, or the last used one without a name.
    pub(crate) fn go_home(
        &mut self,
        caller: &PlayerRef,
        name: Option<&str>,
        now: Tick,
        env: Env<'_>,
    ) -> Result<Outcome, CommandError> {
        self.enabled(ActionKind::Home)?;
        if self.warmups.is_busy(caller.id) {
            return Err(ActionError::AlreadyBusy.into());
        }
        if let Some(seconds) = self.combat_seconds(caller.id, now) {
            return Err(ActionError::CombatTagged { seconds }.into());
        }
        let exempt = self.is_exempt(ActionKind::Home, caller, env);
        if !exempt {
            self.ensure_ready(ActionKind::Home, caller.id, now)?;
        }

        let data = env.store().load_homes(caller.id).map_err(HomeError::from)?;
        let key = match name {
            Some(raw) => {
                let wanted = normalize_home_name(raw, &self.config.homes);
                find_key(&data, &wanted, self.config.homes.case_insensitive_names)
                    .ok_or(HomeError::NoSuchHome(wanted))?
            }
            None => data
                .last_used
                .clone()
                .filter(|key| data.homes.contains_key(key))
                .ok_or(ActionError::NoDestination)?,
        };
        let location = *data.get(&key).ok_or(ActionError::NoDestination)?;

        let plan = ActionPlan::solo(ActionKind::Home, caller.id, Destination::Fixed(location))
            .exempt(exempt)
            .with_follow_up(FollowUp::MarkHomeUsed(key));
        Ok(self.launch(plan, now, env)?)
    }

    /// Records `name` as the last used home and persists it.
    pub(crate) fn mark_home_used(&self, plan: &ActionPlan, name: &str, env: Env<'_>) {
        let player = plan.mover;
        let result = env.store().load_homes(player).and_then(|mut data| {
            data.last_used = Some(name.to_string());
            env.store().save_homes(player, &data)
        });
        if let Err(err) = result {
            tracing::warn!(player = %player, home = %name, error = %err, "failed to record last used home");
        }
    }
}
