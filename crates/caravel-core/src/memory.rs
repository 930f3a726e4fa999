//! In-memory collaborators.
//!
//! Reference implementations of the runtime, router, registry, and release
//! store seams, backed by locked maps. They carry the full observable
//! behavior the converger depends on (label-superset listing, listener
//! publication, endpoint/target bookkeeping, activity timestamps) and make
//! a rack fully exercisable in-process.
//!
//! Every mutating call is appended to an operation log that tests can
//! drain with `take_ops` to assert exactly which actuations a tick issued.

use crate::container::Container;
use crate::error::{CoreError, Result};
use crate::registry::{App, AppRegistry, AppUpdate, Release, ReleaseStore};
use crate::router::{Endpoint, HostInfo, RackInfo, Router};
use crate::runtime::ContainerRuntime;
use async_trait::async_trait;
use caravel_manifest::Manifest;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

fn poisoned() -> CoreError {
    CoreError::internal("lock poisoned")
}

/// In-memory container runtime.
///
/// Started containers get a random id and, when the spec carries a port, a
/// synthesized `127.0.0.1:{host_port}` listener that stays stable for the
/// container's lifetime.
pub struct MemoryRuntime {
    containers: Mutex<HashMap<String, Container>>,
    next_host_port: AtomicU32,
    ops: Mutex<Vec<String>>,
}

impl Default for MemoryRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRuntime {
    /// Creates an empty runtime.
    #[must_use]
    pub fn new() -> Self {
        Self {
            containers: Mutex::new(HashMap::new()),
            next_host_port: AtomicU32::new(30000),
            ops: Mutex::new(Vec::new()),
        }
    }

    /// Drains and returns the recorded mutating operations.
    #[must_use]
    pub fn take_ops(&self) -> Vec<String> {
        self.ops.lock().map(|mut o| o.drain(..).collect()).unwrap_or_default()
    }

    fn record(&self, op: String) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }
}

#[async_trait]
impl ContainerRuntime for MemoryRuntime {
    async fn list(&self, selector: &HashMap<String, String>) -> Result<Vec<Container>> {
        let containers = self.containers.lock().map_err(|_| poisoned())?;

        let mut matched: Vec<Container> = containers
            .values()
            .filter(|c| selector.iter().all(|(k, v)| c.labels.get(k) == Some(v)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matched)
    }

    async fn start(&self, spec: &Container, _app: &str, _release: &str) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string().replace('-', "")[..12].to_string();

        let mut started = spec.clone();
        started.id = id.clone();

        if spec.port != 0 {
            let host_port = self.next_host_port.fetch_add(1, Ordering::SeqCst);
            started
                .listeners
                .insert(spec.port, format!("127.0.0.1:{host_port}"));
        }

        self.record(format!("start {}", spec.name));

        let mut containers = self.containers.lock().map_err(|_| poisoned())?;
        containers.insert(id.clone(), started);
        Ok(id)
    }

    async fn stop(&self, id: &str) -> Result<()> {
        let mut containers = self.containers.lock().map_err(|_| poisoned())?;

        let removed = containers
            .remove(id)
            .ok_or_else(|| CoreError::not_found(format!("container {id}")))?;

        drop(containers);
        self.record(format!("stop {}", removed.name));
        Ok(())
    }
}

/// In-memory router.
#[derive(Default)]
pub struct MemoryRouter {
    hosts: Mutex<HashMap<(String, String), DateTime<Utc>>>,
    endpoints: Mutex<HashMap<(String, String, u16), Endpoint>>,
    ops: Mutex<Vec<String>>,
}

impl MemoryRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides a host's last-activity time.
    pub fn set_activity(&self, rack: &str, host: &str, at: DateTime<Utc>) {
        if let Ok(mut hosts) = self.hosts.lock() {
            hosts.insert((rack.to_string(), host.to_string()), at);
        }
    }

    /// Returns the current targets of an endpoint, empty if absent.
    #[must_use]
    pub fn targets(&self, rack: &str, host: &str, port: u16) -> Vec<String> {
        self.endpoints
            .lock()
            .ok()
            .and_then(|e| {
                e.get(&(rack.to_string(), host.to_string(), port))
                    .map(|e| e.targets.clone())
            })
            .unwrap_or_default()
    }

    /// Drains and returns the recorded mutating operations.
    #[must_use]
    pub fn take_ops(&self) -> Vec<String> {
        self.ops.lock().map(|mut o| o.drain(..).collect()).unwrap_or_default()
    }

    fn record(&self, op: String) {
        if let Ok(mut ops) = self.ops.lock() {
            ops.push(op);
        }
    }
}

#[async_trait]
impl Router for MemoryRouter {
    async fn rack_get(&self, rack: &str) -> Result<RackInfo> {
        let hosts = self.hosts.lock().map_err(|_| poisoned())?;

        let mut infos: Vec<HostInfo> = hosts
            .iter()
            .filter(|((r, _), _)| r == rack)
            .map(|((_, hostname), activity)| HostInfo {
                hostname: hostname.clone(),
                activity: *activity,
            })
            .collect();

        infos.sort_by(|a, b| a.hostname.cmp(&b.hostname));
        Ok(RackInfo { hosts: infos })
    }

    async fn host_create(&self, rack: &str, host: &str) -> Result<()> {
        let mut hosts = self.hosts.lock().map_err(|_| poisoned())?;
        let key = (rack.to_string(), host.to_string());

        if !hosts.contains_key(&key) {
            hosts.insert(key, Utc::now());
            drop(hosts);
            self.record(format!("host_create {host}"));
        }

        Ok(())
    }

    async fn endpoint_get(&self, rack: &str, host: &str, port: u16) -> Result<Endpoint> {
        let endpoints = self.endpoints.lock().map_err(|_| poisoned())?;

        endpoints
            .get(&(rack.to_string(), host.to_string(), port))
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("endpoint {host}:{port}")))
    }

    async fn endpoint_create(
        &self,
        rack: &str,
        host: &str,
        proto: &str,
        port: u16,
    ) -> Result<Endpoint> {
        let mut endpoints = self.endpoints.lock().map_err(|_| poisoned())?;

        let endpoint = endpoints
            .entry((rack.to_string(), host.to_string(), port))
            .or_insert_with(|| Endpoint {
                proto: proto.to_string(),
                port,
                targets: vec![],
            })
            .clone();

        drop(endpoints);
        self.record(format!("endpoint_create {host}:{port}"));
        Ok(endpoint)
    }

    async fn target_add(&self, rack: &str, host: &str, port: u16, target: &str) -> Result<()> {
        let mut endpoints = self.endpoints.lock().map_err(|_| poisoned())?;

        let endpoint = endpoints
            .get_mut(&(rack.to_string(), host.to_string(), port))
            .ok_or_else(|| CoreError::not_found(format!("endpoint {host}:{port}")))?;

        endpoint.targets.push(target.to_string());
        drop(endpoints);
        self.record(format!("target_add {host}:{port} {target}"));
        Ok(())
    }

    async fn target_remove(&self, rack: &str, host: &str, port: u16, target: &str) -> Result<()> {
        let mut endpoints = self.endpoints.lock().map_err(|_| poisoned())?;

        let endpoint = endpoints
            .get_mut(&(rack.to_string(), host.to_string(), port))
            .ok_or_else(|| CoreError::not_found(format!("endpoint {host}:{port}")))?;

        endpoint.targets.retain(|t| t != target);
        drop(endpoints);
        self.record(format!("target_remove {host}:{port} {target}"));
        Ok(())
    }
}

/// In-memory app registry.
#[derive(Default)]
pub struct MemoryRegistry {
    apps: Mutex<HashMap<String, App>>,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an app record.
    pub fn put(&self, app: App) {
        if let Ok(mut apps) = self.apps.lock() {
            apps.insert(app.name.clone(), app);
        }
    }
}

#[async_trait]
impl AppRegistry for MemoryRegistry {
    async fn app_get(&self, name: &str) -> Result<App> {
        let apps = self.apps.lock().map_err(|_| poisoned())?;

        apps.get(name)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("app {name}")))
    }

    async fn app_update(&self, name: &str, update: AppUpdate) -> Result<()> {
        let mut apps = self.apps.lock().map_err(|_| poisoned())?;

        let app = apps
            .get_mut(name)
            .ok_or_else(|| CoreError::not_found(format!("app {name}")))?;

        if let Some(sleep) = update.sleep {
            app.sleep = sleep;
        }

        Ok(())
    }

    async fn app_list(&self) -> Result<Vec<App>> {
        let apps = self.apps.lock().map_err(|_| poisoned())?;

        let mut all: Vec<App> = apps.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

/// In-memory release store.
#[derive(Default)]
pub struct MemoryReleases {
    releases: Mutex<HashMap<String, (Manifest, Release)>>,
}

impl MemoryReleases {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Promotes a manifest and release for an app.
    pub fn put(&self, app: &str, manifest: Manifest, release: Release) {
        if let Ok(mut releases) = self.releases.lock() {
            releases.insert(app.to_string(), (manifest, release));
        }
    }
}

#[async_trait]
impl ReleaseStore for MemoryReleases {
    async fn manifest(&self, app: &str) -> Result<(Manifest, Release)> {
        let releases = self.releases.lock().map_err(|_| poisoned())?;

        releases
            .get(app)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("manifest for app {app}")))
    }
}
