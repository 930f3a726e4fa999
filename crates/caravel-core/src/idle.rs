//! Idle sweep.
//!
//! Watches router activity and puts apps to sleep once every one of their
//! hosts has been quiet past the configured threshold. Waking is not this
//! module's job; something upstream clears the sleep flag when traffic
//! returns.

use crate::converge::Converger;
use crate::error::{CoreError, Result};
use crate::registry::AppUpdate;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tracing::{debug, info, info_span, Instrument};

impl Converger {
    /// Sweeps router activity and marks long-idle apps as sleeping.
    ///
    /// Host names look like `{service}.{app}`; the app is the last
    /// dot-separated component. Hostnames with fewer than two components
    /// are skipped. An app's activity is the max across its hosts.
    ///
    /// # Errors
    ///
    /// Returns an error if the rack cannot be fetched or an app update
    /// fails; the first failure aborts the sweep.
    pub async fn idle(&self) -> Result<()> {
        self.idle_inner().instrument(info_span!("idle")).await
    }

    async fn idle_inner(&self) -> Result<()> {
        let rack = self
            .router()
            .rack_get(&self.config().rack)
            .await
            .map_err(|e| CoreError::Router(format!("rack get failed: {e}")))?;

        let mut activity: HashMap<String, DateTime<Utc>> = HashMap::new();

        for h in &rack.hosts {
            let parts: Vec<&str> = h.hostname.split('.').collect();

            if parts.len() < 2 {
                continue;
            }

            let app = parts[parts.len() - 1].to_string();

            let latest = activity.entry(app).or_insert(h.activity);
            if h.activity > *latest {
                *latest = h.activity;
            }
        }

        let cutoff = Utc::now() - Duration::seconds(self.config().idle_after_secs as i64);

        for (app, latest) in &activity {
            debug!(app = %app, latest = %latest, "activity");

            if *latest < cutoff {
                self.registry()
                    .app_update(app, AppUpdate { sleep: Some(true) })
                    .await
                    .map_err(|e| CoreError::Registry(format!("app update failed: {e}")))?;
                info!(app = %app, "sleeping idle app");
            }
        }

        Ok(())
    }
}
