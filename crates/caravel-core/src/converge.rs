//! Convergence coordinator.
//!
//! One `converge` call drives a single app from observed state to desired
//! state: build the desired container set, diff it against the runtime's
//! observations by label identity, stop extras, start missing, then
//! republish the app's routing table. The whole tick runs under a
//! process-wide lock so the runtime and router only ever have one writer.

use crate::config::ConvergerConfig;
use crate::container::{diff, labels, Container};
use crate::desired::desired_containers;
use crate::error::{CoreError, Result};
use crate::registry::{DynAppRegistry, DynReleaseStore};
use crate::router::DynRouter;
use crate::runtime::DynContainerRuntime;
use caravel_manifest::Manifest;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};

/// Frontend listeners created for every routed service. Both terminate at
/// the router and forward to the same backend pool.
const FRONTENDS: [(&str, u16); 2] = [("http", 80), ("https", 443)];

/// The convergence coordinator.
///
/// Holds the trait objects for every external collaborator plus the
/// process-wide convergence lock. Cheap to clone behind an [`Arc`]; all
/// clones created via [`Converger::with_lock`] from the same lock serialize
/// against each other.
pub struct Converger {
    config: ConvergerConfig,
    runtime: DynContainerRuntime,
    router: DynRouter,
    registry: DynAppRegistry,
    releases: DynReleaseStore,
    lock: Arc<Mutex<()>>,
}

impl Converger {
    /// Creates a converger with a fresh convergence lock.
    #[must_use]
    pub fn new(
        config: ConvergerConfig,
        runtime: DynContainerRuntime,
        router: DynRouter,
        registry: DynAppRegistry,
        releases: DynReleaseStore,
    ) -> Self {
        Self::with_lock(
            config,
            runtime,
            router,
            registry,
            releases,
            Arc::new(Mutex::new(())),
        )
    }

    /// Creates a converger with an injected convergence lock.
    ///
    /// Anything that must serialize against this converger (another
    /// converger instance, a test asserting single-writer behavior) can
    /// share the same lock.
    #[must_use]
    pub fn with_lock(
        config: ConvergerConfig,
        runtime: DynContainerRuntime,
        router: DynRouter,
        registry: DynAppRegistry,
        releases: DynReleaseStore,
        lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            config,
            runtime,
            router,
            registry,
            releases,
            lock,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ConvergerConfig {
        &self.config
    }

    /// Drives the app's containers and routes to match its manifest.
    ///
    /// Holds the process-wide convergence lock for the entire tick. A
    /// sleeping app converges toward the empty set, tearing down all of its
    /// containers and routing targets.
    ///
    /// # Errors
    ///
    /// Returns an error if the app or its manifest is missing, the manifest
    /// declares an unknown resource type, or any runtime or router call
    /// fails. A failed tick leaves the system partially converged; the next
    /// tick starts from fresh observation.
    pub async fn converge(&self, app: &str) -> Result<()> {
        let _guard = self.lock.lock().await;

        self.converge_locked(app)
            .instrument(info_span!("converge", app = %app))
            .await
    }

    async fn converge_locked(&self, app: &str) -> Result<()> {
        let record = self.registry.app_get(app).await?;
        let (manifest, release) = self.releases.manifest(app).await?;

        let desired = if record.sleep {
            vec![]
        } else {
            desired_containers(&self.config, &manifest, app, &release)?
        };

        let current = self
            .runtime
            .list(&self.app_selector(app))
            .await
            .map_err(|e| CoreError::Runtime(format!("container list failed: {e}")))?;

        let extra = diff(&current, &desired);
        let needed = diff(&desired, &current);

        debug!(
            current = current.len(),
            desired = desired.len(),
            extra = extra.len(),
            needed = needed.len(),
            "computed diff"
        );

        for c in &extra {
            self.runtime
                .stop(&c.id)
                .await
                .map_err(|e| CoreError::Runtime(format!("container stop failed: {e}")))?;
            debug!(container = %c.name, "stopped");
        }

        for c in &needed {
            self.runtime
                .start(c, app, &release.id)
                .await
                .map_err(|e| CoreError::Runtime(format!("container start failed: {e}")))?;
            debug!(container = %c.name, "started");
        }

        self.route(app, &manifest).await?;

        info!("converged");
        Ok(())
    }

    /// Converges every registered app, logging and skipping over per-app
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns an error only if the app list itself cannot be fetched.
    pub async fn converge_all(&self) -> Result<()> {
        let apps = self
            .registry
            .app_list()
            .await
            .map_err(|e| CoreError::Registry(format!("app list failed: {e}")))?;

        for a in apps {
            if let Err(e) = self.converge(&a.name).await {
                warn!(app = %a.name, "converge failed: {e}");
            }
        }

        Ok(())
    }

    /// Reconciles the router's endpoint and target sets for the app.
    ///
    /// Hosts are created for every service (routed or not) so DNS resolves
    /// as soon as the app exists. Target sets are rebuilt from the live
    /// containers' listeners and diffed against the router's view.
    async fn route(&self, app: &str, manifest: &Manifest) -> Result<()> {
        for s in &manifest.services {
            let host = format!("{}.{}", s.name, app);

            self.router
                .host_create(&self.config.rack, &host)
                .await
                .map_err(|e| CoreError::Router(format!("host create failed: {e}")))?;

            if s.port.port == 0 {
                continue;
            }

            let containers = self
                .runtime
                .list(&self.service_selector(app, &s.name))
                .await
                .map_err(|e| CoreError::Runtime(format!("container list failed: {e}")))?;

            let targets = listener_targets(&containers, &s.port.scheme);
            let want = targets.get(&s.port.port).cloned().unwrap_or_default();

            for (proto, port) in FRONTENDS {
                let endpoint = match self.router.endpoint_get(&self.config.rack, &host, port).await
                {
                    Ok(e) => e,
                    Err(e) if e.is_not_found() => self
                        .router
                        .endpoint_create(&self.config.rack, &host, proto, port)
                        .await
                        .map_err(|e| {
                            CoreError::Router(format!("endpoint create failed: {e}"))
                        })?,
                    Err(e) => {
                        return Err(CoreError::Router(format!("endpoint get failed: {e}")))
                    }
                };

                let missing = diff_targets(&want, &endpoint.targets);
                let extra = diff_targets(&endpoint.targets, &want);

                for t in &missing {
                    self.router
                        .target_add(&self.config.rack, &host, port, t)
                        .await
                        .map_err(|e| CoreError::Router(format!("target add failed: {e}")))?;
                    debug!(host = %host, port, target = %t, "target added");
                }

                for t in &extra {
                    self.router
                        .target_remove(&self.config.rack, &host, port, t)
                        .await
                        .map_err(|e| CoreError::Router(format!("target remove failed: {e}")))?;
                    debug!(host = %host, port, target = %t, "target removed");
                }
            }
        }

        Ok(())
    }

    pub(crate) fn router(&self) -> &DynRouter {
        &self.router
    }

    pub(crate) fn registry(&self) -> &DynAppRegistry {
        &self.registry
    }

    fn app_selector(&self, app: &str) -> HashMap<String, String> {
        HashMap::from([
            (labels::RACK.to_string(), self.config.rack.clone()),
            (labels::APP.to_string(), app.to_string()),
        ])
    }

    fn service_selector(&self, app: &str, service: &str) -> HashMap<String, String> {
        HashMap::from([
            (labels::RACK.to_string(), self.config.rack.clone()),
            (labels::APP.to_string(), app.to_string()),
            (labels::SERVICE.to_string(), service.to_string()),
        ])
    }
}

/// Groups the containers' published listeners by container port, rendering
/// each as a `{scheme}://{host:port}` target URL.
fn listener_targets(containers: &[Container], scheme: &str) -> HashMap<u16, Vec<String>> {
    let mut targets: HashMap<u16, Vec<String>> = HashMap::new();

    for c in containers {
        for (port, addr) in &c.listeners {
            targets
                .entry(*port)
                .or_default()
                .push(format!("{scheme}://{addr}"));
        }
    }

    targets
}

/// Sequence-based string set difference, `a \ b`.
fn diff_targets(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().filter(|t| !b.contains(*t)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_targets_is_a_set_difference() {
        let a = vec!["http://a".to_string(), "http://b".to_string()];
        let b = vec!["http://b".to_string(), "http://c".to_string()];
        assert_eq!(diff_targets(&a, &b), vec!["http://a"]);
        assert_eq!(diff_targets(&b, &a), vec!["http://c"]);
        assert!(diff_targets(&a, &a).is_empty());
        assert_eq!(diff_targets(&a, &[]), a);
    }

    #[test]
    fn listener_targets_group_by_container_port() {
        let mut c1 = Container::default();
        c1.listeners.insert(5000, "127.0.0.1:30001".to_string());
        let mut c2 = Container::default();
        c2.listeners.insert(5000, "127.0.0.1:30002".to_string());
        c2.listeners.insert(9090, "127.0.0.1:30003".to_string());

        let targets = listener_targets(&[c1, c2], "http");
        let mut on_5000 = targets[&5000].clone();
        on_5000.sort();
        assert_eq!(on_5000, vec!["http://127.0.0.1:30001", "http://127.0.0.1:30002"]);
        assert_eq!(targets[&9090], vec!["http://127.0.0.1:30003"]);
    }
}
