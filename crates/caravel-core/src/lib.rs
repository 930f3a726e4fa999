//! # caravel-core
//!
//! Local application converger for Caravel.
//!
//! Given an app name, one convergence tick drives the container host and
//! the edge router toward the app's manifest:
//!
//! - [`desired::desired_containers`]: pure translation of
//!   `(manifest, app, release)` into container specs
//! - [`container::diff`]: symmetric difference by label identity
//! - [`Converger::converge`]: the serialized stop/start/route tick
//! - [`Converger::idle`]: activity sweep that puts quiet apps to sleep
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  Converger                   │
//! │   desired set ──diff── observed set          │
//! │        │                    │                │
//! │        ▼                    ▼                │
//! │   start missing        stop extras           │
//! │        └────────┬───────────┘                │
//! │                 ▼                            │
//! │          route reconcile                     │
//! └──────┬───────────┬───────────┬───────────────┘
//!        ▼           ▼           ▼
//!  ContainerRuntime  Router  AppRegistry/ReleaseStore
//! ```
//!
//! The collaborators at the bottom are trait seams; `memory` carries
//! in-process implementations for local development and tests.

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod container;
pub mod converge;
pub mod desired;
pub mod error;
mod idle;
pub mod memory;
pub mod registry;
pub mod resource;
pub mod router;
pub mod runtime;
pub mod worker;

pub use config::ConvergerConfig;
pub use container::{diff, Container};
pub use converge::Converger;
pub use desired::desired_containers;
pub use error::{CoreError, Result};
pub use registry::{App, AppRegistry, AppUpdate, DynAppRegistry, DynReleaseStore, Release, ReleaseStore};
pub use resource::ResourceKind;
pub use router::{DynRouter, Endpoint, HostInfo, RackInfo, Router};
pub use runtime::{ContainerRuntime, DynContainerRuntime};
pub use worker::{spawn_converge_worker, spawn_idle_worker};
