//! 메트릭 상수 정의
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다. 각 모듈은 이 상수를 사용하여
//! `metrics::counter!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `aibom_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(aibom_core::metrics::REMOTE_CALLS_TOTAL, aibom_core::metrics::LABEL_CALL => "filters")
//!     .increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 원격 호출 이름 레이블 키 (filters, create-bundle, extend-bundle, upload, analysis)
pub const LABEL_CALL: &str = "call";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── 파이프라인 메트릭 ─────────────────────────────────────────────

/// 시작된 파이프라인 실행 수 (counter)
pub const RUNS_TOTAL: &str = "aibom_runs_total";

/// 발행된 원격 호출 수 (counter, label: call)
pub const REMOTE_CALLS_TOTAL: &str = "aibom_remote_calls_total";

/// 번들에 포함된 파일 수 (counter)
pub const FILES_BUNDLED_TOTAL: &str = "aibom_files_bundled_total";

/// 업로드된 누락 파일 수 (counter)
pub const FILES_UPLOADED_TOTAL: &str = "aibom_files_uploaded_total";

/// BOM에 포함된 컴포넌트 수 (counter)
pub const COMPONENTS_TOTAL: &str = "aibom_components_total";

/// BOM 생성을 위해 건너뛴 finding 수 (counter)
pub const FINDINGS_SKIPPED_TOTAL: &str = "aibom_findings_skipped_total";
