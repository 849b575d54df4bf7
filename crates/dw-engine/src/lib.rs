//! dw-engine: services over ductwork entity snapshots.
//!
//! This crate provides:
//! - Endpoint-proximity connection detection between ducts
//! - Leaf-peeling airflow accumulation and source capacity checks
//! - Cascading parametric updates with velocity validation
//! - A [`DesignEngine`] facade owning the config and graph cache
//!
//! It is the shared backend for the CLI and any other frontend.

pub mod config;
pub mod detection;
pub mod engine;
pub mod error;
pub mod flow;
pub mod issues;
pub mod parametric;
pub mod snapshot_service;

pub use config::{CacheConfig, DetectionConfig, EngineConfig, ParametricConfig, TraversalConfig};
pub use detection::{ConnectionDetectionService, DetectedConnection, DuctEndpoint, EndPoint};
pub use engine::DesignEngine;
pub use error::{EngineError, EngineResult};
pub use flow::{FlowMap, FlowPropagationService};
pub use issues::{IssueCode, Severity, ValidationIssue};
pub use parametric::{
    CascadeProperty, CascadeUpdate, DimensionChange, DimensionProperty, ParametricUpdateResult,
    ParametricUpdateService,
};
pub use snapshot_service::{SnapshotSummary, load_snapshot, require_entity, summarize};
