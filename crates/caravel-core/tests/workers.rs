//! Tests for the single-writer guarantee and the background workers.

use async_trait::async_trait;
use caravel_core::memory::{MemoryRegistry, MemoryReleases, MemoryRouter, MemoryRuntime};
use caravel_core::worker::{spawn_converge_worker, spawn_idle_worker};
use caravel_core::{
    App, Container, ContainerRuntime, Converger, ConvergerConfig, Release, Result,
};
use caravel_manifest::{Manifest, Service};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runtime wrapper that measures call overlap. Every call parks for a
/// moment so that two unserialized ticks would be caught in flight
/// together.
struct SlowRuntime {
    inner: MemoryRuntime,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl SlowRuntime {
    fn new() -> Self {
        Self {
            inner: MemoryRuntime::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContainerRuntime for SlowRuntime {
    async fn list(&self, selector: &HashMap<String, String>) -> Result<Vec<Container>> {
        self.enter().await;
        let r = self.inner.list(selector).await;
        self.exit();
        r
    }

    async fn start(&self, spec: &Container, app: &str, release: &str) -> Result<String> {
        self.enter().await;
        let r = self.inner.start(spec, app, release).await;
        self.exit();
        r
    }

    async fn stop(&self, id: &str) -> Result<()> {
        self.enter().await;
        let r = self.inner.stop(id).await;
        self.exit();
        r
    }
}

fn seed(registry: &MemoryRegistry, releases: &MemoryReleases, app: &str) {
    registry.put(App {
        name: app.to_string(),
        sleep: false,
        release: "R1".to_string(),
    });
    releases.put(
        app,
        Manifest {
            services: vec![Service {
                name: "api".to_string(),
                ..Service::default()
            }],
            resources: vec![],
        },
        Release {
            id: "R1".to_string(),
            build: "B1".to_string(),
        },
    );
}

// Two concurrent converges never overlap inside the runtime.
#[tokio::test]
async fn converges_are_serialized() {
    let runtime = Arc::new(SlowRuntime::new());
    let router = Arc::new(MemoryRouter::new());
    let registry = Arc::new(MemoryRegistry::new());
    let releases = Arc::new(MemoryReleases::new());
    seed(&registry, &releases, "web");
    seed(&registry, &releases, "blog");

    let converger = Arc::new(Converger::new(
        ConvergerConfig::for_rack("local"),
        runtime.clone(),
        router,
        registry,
        releases,
    ));

    let a = tokio::spawn({
        let c = converger.clone();
        async move { c.converge("web").await }
    });
    let b = tokio::spawn({
        let c = converger.clone();
        async move { c.converge("blog").await }
    });

    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    assert_eq!(runtime.max_in_flight.load(Ordering::SeqCst), 1);
}

fn rigged_converger() -> (Arc<Converger>, Arc<MemoryRuntime>) {
    let runtime = Arc::new(MemoryRuntime::new());
    let router = Arc::new(MemoryRouter::new());
    let registry = Arc::new(MemoryRegistry::new());
    let releases = Arc::new(MemoryReleases::new());
    seed(&registry, &releases, "web");

    let converger = Arc::new(Converger::new(
        ConvergerConfig::for_rack("local"),
        runtime.clone(),
        router,
        registry,
        releases,
    ));
    (converger, runtime)
}

// The converge worker ticks once immediately on startup.
#[tokio::test]
async fn converge_worker_ticks_on_startup() {
    let (converger, runtime) = rigged_converger();
    let token = CancellationToken::new();

    let handle = spawn_converge_worker(converger, Duration::from_secs(3600), token.clone());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!runtime.take_ops().is_empty());

    token.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker should stop after cancellation")
        .unwrap();
}

// A cancelled idle worker exits without further sweeps.
#[tokio::test]
async fn idle_worker_stops_on_cancellation() {
    let (converger, _runtime) = rigged_converger();
    let token = CancellationToken::new();

    let handle = spawn_idle_worker(converger, Duration::from_secs(3600), token.clone());
    token.cancel();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("worker should stop after cancellation")
        .unwrap();
}
