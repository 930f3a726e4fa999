//! End-to-end smoke run of the converger against the in-memory
//! collaborators.
//!
//! ```bash
//! cargo run -p caravel-core --example converge-smoke
//! ```

use anyhow::Context;
use caravel_core::memory::{MemoryRegistry, MemoryReleases, MemoryRouter, MemoryRuntime};
use caravel_core::{App, Container, ContainerRuntime, Converger, ConvergerConfig, Release};
use caravel_manifest::{CountRange, Manifest, Resource, Scale, Service, ServicePort};
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "caravel_core=debug".parse().unwrap()),
        )
        .init();

    let runtime = Arc::new(MemoryRuntime::new());
    let router = Arc::new(MemoryRouter::new());
    let registry = Arc::new(MemoryRegistry::new());
    let releases = Arc::new(MemoryReleases::new());

    registry.put(App {
        name: "web".to_string(),
        sleep: false,
        release: "R1".to_string(),
    });
    releases.put(
        "web",
        Manifest {
            services: vec![Service {
                name: "api".to_string(),
                command: "bin/api".to_string(),
                scale: Scale {
                    count: CountRange { min: 2, max: None },
                    memory: 512,
                },
                resources: vec!["db".to_string()],
                port: ServicePort {
                    port: 5000,
                    scheme: "http".to_string(),
                },
                ..Service::default()
            }],
            resources: vec![Resource {
                name: "db".to_string(),
                kind: "postgres".to_string(),
            }],
        },
        Release {
            id: "R1".to_string(),
            build: "B1".to_string(),
        },
    );

    let converger = Converger::new(
        ConvergerConfig::for_rack("local"),
        runtime.clone(),
        router.clone(),
        registry.clone(),
        releases,
    );

    println!("=== fresh converge ===");
    converger.converge("web").await.context("fresh converge")?;
    print_rack(&runtime, &router).await;

    println!("\n=== converge again (fixed point, no mutations) ===");
    converger.converge("web").await.context("second converge")?;
    print_rack(&runtime, &router).await;

    println!("\n=== idle sweep after an hour of quiet ===");
    router.set_activity("local", "api.web", Utc::now() - Duration::minutes(61));
    converger.idle().await.context("idle sweep")?;
    converger.converge("web").await.context("sleep converge")?;
    print_rack(&runtime, &router).await;

    println!("\nSmoke run passed.");
    Ok(())
}

async fn print_rack(runtime: &MemoryRuntime, router: &MemoryRouter) {
    let containers: Vec<Container> = runtime.list(&HashMap::new()).await.unwrap_or_default();
    println!("  containers: {}", containers.len());
    for c in &containers {
        println!("    - {} image={} port={}", c.name, c.image, c.port);
    }
    for port in [80, 443] {
        println!(
            "  targets api.web:{port}: {:?}",
            router.targets("local", "api.web", port)
        );
    }
}
