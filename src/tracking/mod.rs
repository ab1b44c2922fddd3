//! Cart view tracking: hour conversion, per-site de-duplication and
//! in-memory lifetime and weekly aggregates.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::CartView;

/// Views of the same site closer together than this count once
pub const DEFAULT_SITE_DEBOUNCE_SECS: i64 = 5 * 60;

/// `total / hourly_rate`, rounded to one decimal place.
pub fn hours_of_work(total: f64, hourly_rate: f64) -> f64 {
    if hourly_rate <= 0.0 {
        return 0.0;
    }
    (total / hourly_rate * 10.0).round() / 10.0
}

/// Whose hours the message talks about
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Partner,
    #[serde(rename = "self")]
    Myself,
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "partner" => Ok(Self::Partner),
            "self" | "me" => Ok(Self::Myself),
            other => Err(anyhow::anyhow!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Partner => f.write_str("partner"),
            Self::Myself => f.write_str("self"),
        }
    }
}

pub fn shame_message(hours: f64, role: Role) -> String {
    let subject = match role {
        Role::Partner => "him",
        Role::Myself => "you",
    };
    format!("This cart costs {subject} {hours:.1} hours of work!")
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteStats {
    pub total_value: f64,
    pub visits: u32,
    pub last_seen: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LifetimeStats {
    pub cart_value: f64,
    pub hours_equivalent: f64,
    pub sightings: u32,
    pub sites: HashMap<String, SiteStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyReport {
    pub week_start: DateTime<Utc>,
    pub carts: Vec<CartView>,
    pub total_value: f64,
    pub total_hours: f64,
}

impl WeeklyReport {
    fn starting(week_start: DateTime<Utc>) -> Self {
        Self {
            week_start,
            carts: Vec::new(),
            total_value: 0.0,
            total_hours: 0.0,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "This week, you almost spent {:.1} hours of work (${:.2}) browsing shopping carts!",
            self.total_hours, self.total_value
        )
    }
}

/// In-memory record of cart sightings
#[derive(Debug, Clone)]
pub struct CartLedger {
    site_debounce: Duration,
    last_seen: HashMap<String, DateTime<Utc>>,
    lifetime: LifetimeStats,
    weekly: WeeklyReport,
}

impl Default for CartLedger {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_SITE_DEBOUNCE_SECS))
    }
}

impl CartLedger {
    pub fn new(site_debounce: Duration) -> Self {
        Self {
            site_debounce,
            last_seen: HashMap::new(),
            lifetime: LifetimeStats::default(),
            weekly: WeeklyReport::starting(Utc::now()),
        }
    }

    /// Record a sighting; returns `false` when it was debounced.
    pub fn record(&mut self, view: CartView) -> bool {
        if let Some(last) = self.last_seen.get(&view.site)
            && view.timestamp - *last < self.site_debounce
        {
            debug!("Debounced cart view for {}", view.site);
            return false;
        }
        self.last_seen.insert(view.site.clone(), view.timestamp);

        self.lifetime.cart_value += view.value;
        self.lifetime.hours_equivalent += view.hours;
        self.lifetime.sightings += 1;

        let site = self.lifetime.sites.entry(view.site.clone()).or_default();
        site.total_value += view.value;
        site.visits += 1;
        site.last_seen = Some(view.timestamp);

        self.weekly.total_value += view.value;
        self.weekly.total_hours += view.hours;
        info!(
            "Tracked cart view: {} ${:.2} = {:.1} hours",
            view.site, view.value, view.hours
        );
        self.weekly.carts.push(view);

        true
    }

    pub fn lifetime(&self) -> &LifetimeStats {
        &self.lifetime
    }

    pub fn weekly(&self) -> &WeeklyReport {
        &self.weekly
    }

    /// Hand out this week's report and start a new week now.
    pub fn take_weekly_report(&mut self) -> WeeklyReport {
        std::mem::replace(&mut self.weekly, WeeklyReport::starting(Utc::now()))
    }
}
