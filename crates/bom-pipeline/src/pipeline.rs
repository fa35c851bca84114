//! 파이프라인 오케스트레이터 -- 전체 생성 흐름 관리
//!
//! [`BomPipeline`]은 필터 조회부터 BOM 매핑까지의 단계를 엄격히 순차적으로
//! 실행합니다. 각 단계는 이전 단계의 출력에 의존하며, 원격 호출만이 유일한
//! 대기 지점입니다. 치명적 에러가 발생하면 부분 문서를 만들지 않고 즉시
//! 중단합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! fetch_filters --> ProjectScanner --> Vec<ProjectFile>
//!                                            |
//!                                     BundleReconciler  (create | extend+upload)
//!                                            |
//!                                     DepGraphAugmenter (매니페스트 있을 때만)
//!                                            |
//!                                   AnalysisOrchestrator --> AnalysisReport
//!                                            |
//!                                      FindingMapper --> Bom
//! ```

use std::path::Path;
use std::time::Duration;

use metrics::counter;
use tracing::info;

use aibom_core::config::ApiConfig;
use aibom_core::metrics::{COMPONENTS_TOTAL, FILES_BUNDLED_TOTAL, RUNS_TOTAL};

use crate::analysis::AnalysisOrchestrator;
use crate::bom::{Bom, FindingMapper};
use crate::bundle::BundleReconciler;
use crate::client::AnalysisServiceClient;
use crate::depgraph::{DepGraphAugmenter, DepGraphSource, RequirementsDepGraphSource};
use crate::error::PipelineError;
use crate::scan::ProjectScanner;

/// BOM 생성 파이프라인
///
/// 실행 간 공유 상태가 없으며, 호출마다 독립적으로 동작합니다. 이전 번들
/// ID는 외부에서 공급되는 입력일 뿐 파이프라인이 보관하지 않습니다.
pub struct BomPipeline {
    client: AnalysisServiceClient,
    scanner: ProjectScanner,
    depgraph_source: Box<dyn DepGraphSource>,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl BomPipeline {
    /// API 설정으로 파이프라인을 생성합니다.
    pub fn new(api: &ApiConfig) -> Self {
        Self {
            client: AnalysisServiceClient::new(api),
            scanner: ProjectScanner::default(),
            depgraph_source: Box::new(RequirementsDepGraphSource),
            poll_interval: Duration::from_millis(api.poll_interval_ms),
            poll_attempts: api.poll_attempts,
        }
    }

    /// 의존성 그래프 공급자를 교체합니다 (외부 추출 도구 연결점).
    pub fn with_depgraph_source(mut self, source: Box<dyn DepGraphSource>) -> Self {
        self.depgraph_source = source;
        self
    }

    /// 프로젝트를 분석하여 BOM을 생성합니다.
    ///
    /// `prior_bundle_id`가 있으면 번들 확장 경로를 사용합니다. 스캔 결과가
    /// 비어 있으면 번들/분석 호출 없이 `NoSupportedFiles`로 끝납니다.
    pub fn generate(
        &self,
        project_root: &Path,
        prior_bundle_id: Option<&str>,
    ) -> Result<Bom, PipelineError> {
        counter!(RUNS_TOTAL).increment(1);
        info!(project = %project_root.display(), "starting BOM generation");

        let filters = self.client.fetch_filters()?;
        info!(
            extensions = filters.extensions.len(),
            config_files = filters.config_files.len(),
            "fetched analysis filters"
        );

        let files = self.scanner.scan(project_root, &filters)?;
        if files.is_empty() {
            return Err(PipelineError::NoSupportedFiles);
        }
        info!(files = files.len(), "selected files for analysis");
        counter!(FILES_BUNDLED_TOTAL).increment(files.len() as u64);

        let reconciler = BundleReconciler::new(&self.client);
        let bundle = reconciler.reconcile(&files, prior_bundle_id)?;
        info!(bundle_id = %bundle.id, files = bundle.file_count(), "bundle ready");

        let augmenter = DepGraphAugmenter::new(&self.client, self.depgraph_source.as_ref());
        let bundle = augmenter.augment(bundle, project_root)?;

        let orchestrator =
            AnalysisOrchestrator::new(&self.client, self.poll_interval, self.poll_attempts);
        let report = orchestrator.analyze(&bundle)?;

        let bom = FindingMapper::new().map(&report.findings);
        info!(components = bom.components.len(), "BOM generated");
        counter!(COMPONENTS_TOTAL).increment(bom.components.len() as u64);

        Ok(bom)
    }
}
