use crate::stats::{CompletionPlaceholder, FixedPlaceholder, RandomPlaceholder};
use crate::store::{AddPolicy, TrackingMode};
use std::{env, path::PathBuf, sync::Arc};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub tracking: TrackingMode,
    pub add_policy: AddPolicy,
    /// Fixed percentage for calendar cells other than today; random when unset.
    pub placeholder_percent: Option<u8>,
    pub seed_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            tracking: TrackingMode::default(),
            add_policy: AddPolicy::default(),
            placeholder_percent: None,
            seed_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = lookup("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let tracking = match lookup("DOSE_TRACKING").as_deref().map(str::trim) {
            None | Some("") => defaults.tracking,
            Some("session") => TrackingMode::Session,
            Some("dated") => TrackingMode::Dated,
            Some(other) => {
                warn!("unknown DOSE_TRACKING value {other:?}, using session");
                defaults.tracking
            }
        };

        let add_policy = match lookup("DOSE_ADD_POLICY").as_deref().map(str::trim) {
            None | Some("") => defaults.add_policy,
            Some("append") => AddPolicy::Append,
            Some("discard") => AddPolicy::Discard,
            Some(other) => {
                warn!("unknown DOSE_ADD_POLICY value {other:?}, using append");
                defaults.add_policy
            }
        };

        let placeholder_percent = lookup("DOSE_PLACEHOLDER_PERCENT").and_then(|value| {
            match value.trim().parse::<u8>() {
                Ok(percent) if percent <= 100 => Some(percent),
                _ => {
                    warn!("ignoring DOSE_PLACEHOLDER_PERCENT {value:?}, expected 0-100");
                    None
                }
            }
        });

        let seed_path = lookup("DOSE_SEED_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Self {
            port,
            tracking,
            add_policy,
            placeholder_percent,
            seed_path,
        }
    }

    pub fn placeholder(&self) -> Arc<dyn CompletionPlaceholder> {
        match self.placeholder_percent {
            Some(percent) => Arc::new(FixedPlaceholder(percent)),
            None => Arc::new(RandomPlaceholder),
        }
    }
}
