//! Runtime settings, read from the environment (and `.env` when present).
//!
//! | Variable | Default |
//! |---|---|
//! | `CARTSHAME_HOURLY_RATE` | `50` |
//! | `CARTSHAME_ROLE` | `partner` |
//! | `CARTSHAME_DEBOUNCE_MS` | `500` |
//! | `CARTSHAME_SITE_DEBOUNCE_SECS` | `300` |
//! | `CARTSHAME_POLL_SCHEDULE` | `*/30 * * * * *` |
//! | `CARTSHAME_OVERRIDE_POLICY` | `exclusive` |

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::detector::OverridePolicy;
use crate::tracking::{DEFAULT_SITE_DEBOUNCE_SECS, Role};
use crate::watcher::DEFAULT_DEBOUNCE;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub hourly_rate: f64,
    pub role: Role,
    pub debounce: Duration,
    pub site_debounce: chrono::Duration,
    pub poll_schedule: String,
    pub override_policy: OverridePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hourly_rate: 50.0,
            role: Role::default(),
            debounce: DEFAULT_DEBOUNCE,
            site_debounce: chrono::Duration::seconds(DEFAULT_SITE_DEBOUNCE_SECS),
            poll_schedule: "*/30 * * * * *".to_string(),
            override_policy: OverridePolicy::default(),
        }
    }
}

impl Settings {
    /// Load `.env` if there is one, then read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup, starting from the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(rate) = parsed::<f64>(&lookup, "CARTSHAME_HOURLY_RATE")? {
            if !rate.is_finite() || rate <= 0.0 {
                bail!("CARTSHAME_HOURLY_RATE must be positive, got {rate}");
            }
            settings.hourly_rate = rate;
        }
        if let Some(role) = parsed::<Role>(&lookup, "CARTSHAME_ROLE")? {
            settings.role = role;
        }
        if let Some(ms) = parsed::<u64>(&lookup, "CARTSHAME_DEBOUNCE_MS")? {
            settings.debounce = Duration::from_millis(ms);
        }
        if let Some(secs) = parsed::<i64>(&lookup, "CARTSHAME_SITE_DEBOUNCE_SECS")? {
            if secs < 0 {
                bail!("CARTSHAME_SITE_DEBOUNCE_SECS must not be negative, got {secs}");
            }
            settings.site_debounce = chrono::Duration::seconds(secs);
        }
        if let Some(schedule) = lookup("CARTSHAME_POLL_SCHEDULE") {
            settings.poll_schedule = schedule;
        }
        if let Some(policy) = parsed::<OverridePolicy>(&lookup, "CARTSHAME_OVERRIDE_POLICY")? {
            settings.override_policy = policy;
        }

        Ok(settings)
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("Invalid {key}: {raw:?}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(settings(&[]).unwrap(), Settings::default());
    }

    #[test]
    fn reads_every_variable() {
        let s = settings(&[
            ("CARTSHAME_HOURLY_RATE", "32.5"),
            ("CARTSHAME_ROLE", "self"),
            ("CARTSHAME_DEBOUNCE_MS", "250"),
            ("CARTSHAME_SITE_DEBOUNCE_SECS", "60"),
            ("CARTSHAME_POLL_SCHEDULE", "0 * * * * *"),
            ("CARTSHAME_OVERRIDE_POLICY", "fallthrough"),
        ])
        .unwrap();

        assert_eq!(s.hourly_rate, 32.5);
        assert_eq!(s.role, Role::Myself);
        assert_eq!(s.debounce, Duration::from_millis(250));
        assert_eq!(s.site_debounce, chrono::Duration::seconds(60));
        assert_eq!(s.poll_schedule, "0 * * * * *");
        assert_eq!(s.override_policy, OverridePolicy::FallThrough);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(settings(&[("CARTSHAME_HOURLY_RATE", "0")]).is_err());
        assert!(settings(&[("CARTSHAME_HOURLY_RATE", "lots")]).is_err());

        let err = settings(&[("CARTSHAME_DEBOUNCE_MS", "-1")]).unwrap_err();
        assert!(format!("{err:#}").contains("CARTSHAME_DEBOUNCE_MS"));

        let err = settings(&[("CARTSHAME_SITE_DEBOUNCE_SECS", "-5")]).unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
        assert!(settings(&[("CARTSHAME_SITE_DEBOUNCE_SECS", "0")]).is_ok());
    }
}
