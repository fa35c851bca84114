//! Aibom 분석 파이프라인 크레이트
//!
//! 로컬 프로젝트를 원격 정적 분석 서비스에 등록하고, 그 findings를
//! CycloneDX 1.6 AI Bill of Materials로 변환합니다.
//!
//! # Module Structure
//!
//! - [`error`]: Domain error types (`PipelineError`, classification into `AibomError`)
//! - [`types`]: Domain types (`ProjectFile`, `Bundle`, `DepGraphArtifact`)
//! - [`filters`]: Analysis filter set (`FilterSet`)
//! - [`client`]: Blocking HTTP client for the analysis service
//! - [`scan`]: Deterministic project scanner (`ProjectScanner`)
//! - [`bundle`]: Content fingerprints and the extend/upload handshake (`BundleReconciler`)
//! - [`depgraph`]: Dependency graph augmentation (`DepGraphSource`, `DepGraphAugmenter`)
//! - [`analysis`]: Analysis submission and polling (`AnalysisOrchestrator`)
//! - [`sarif`]: Tolerant SARIF findings parser
//! - [`bom`]: Finding-to-component mapping and document rendering
//! - [`pipeline`]: Stage sequencing (`BomPipeline`)
//!
//! # Architecture
//!
//! ```text
//! filters --> scan --> reconcile --> augment --> analyze --> map --> render
//! ```
//!
//! 모든 단계는 순차 실행되며, 원격 호출 실패는 호출 지점에서 즉시 분류되어
//! 상위로 전파됩니다.

pub mod analysis;
pub mod bom;
pub mod bundle;
pub mod client;
pub mod depgraph;
pub mod error;
pub mod filters;
pub mod pipeline;
pub mod sarif;
pub mod scan;
pub mod types;

// --- Public API Re-exports ---

// Pipeline (main orchestrator)
pub use pipeline::BomPipeline;

// Error
pub use error::PipelineError;

// Types
pub use filters::FilterSet;
pub use types::{Bundle, DepGraphArtifact, ProjectFile};

// Stages
pub use analysis::{AnalysisOrchestrator, AnalysisReport};
pub use bundle::BundleReconciler;
pub use depgraph::{DepGraphAugmenter, DepGraphSource, RequirementsDepGraphSource};
pub use scan::ProjectScanner;

// BOM
pub use bom::{Bom, Component, ComponentType, DocumentFormat, FindingMapper, render};

// Client
pub use client::AnalysisServiceClient;
