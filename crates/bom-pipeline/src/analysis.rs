//! 분석 오케스트레이터 -- 제출과 완료 대기
//!
//! 확정된 번들을 분석에 제출하고 결과를 수거합니다. 현재 프로토콜은
//! 동기적으로 완료되는 경우가 많지만, 비동기 완료 모델을 견디도록 상태가
//! `ANALYZING`인 동안 고정 간격으로 폴링합니다. 폴링 예산을 소진하면
//! 재시도 없이 실패로 처리합니다.
//!
//! 원격이 200 본문 안에서 `FAILED`를 보고하는 것과 전송 계층 실패는 서로
//! 다른 에러입니다.

use std::time::Duration;

use tracing::{debug, info};

use crate::client::{AnalysisServiceClient, CALL_ANALYSIS};
use crate::error::PipelineError;
use crate::sarif::{self, SarifResult};
use crate::types::Bundle;

/// 분석 상태 문자열 상수
const STATUS_COMPLETE: &str = "COMPLETE";
const STATUS_ANALYZING: &str = "ANALYZING";
const STATUS_FAILED: &str = "FAILED";

/// 완료된 분석의 findings 리포트
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    /// 리포트 순서를 보존한 finding 목록
    pub findings: Vec<SarifResult>,
}

/// 분석 오케스트레이터
pub struct AnalysisOrchestrator<'a> {
    client: &'a AnalysisServiceClient,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl<'a> AnalysisOrchestrator<'a> {
    /// 클라이언트와 폴링 정책으로 오케스트레이터를 생성합니다.
    pub fn new(
        client: &'a AnalysisServiceClient,
        poll_interval: Duration,
        poll_attempts: u32,
    ) -> Self {
        Self {
            client,
            poll_interval,
            poll_attempts,
        }
    }

    /// 번들을 분석에 제출하고 완료까지 대기합니다.
    pub fn analyze(&self, bundle: &Bundle) -> Result<AnalysisReport, PipelineError> {
        info!(bundle_id = %bundle.id, "submitting bundle for analysis");

        for attempt in 1..=self.poll_attempts {
            let response = self.client.run_analysis(&bundle.id)?;
            match response.status.as_str() {
                STATUS_COMPLETE => {
                    let sarif = response.sarif.ok_or(PipelineError::MalformedResponse {
                        call: CALL_ANALYSIS,
                        reason: "COMPLETE response without sarif payload".to_owned(),
                    })?;
                    let findings = sarif::parse_report(&sarif)?;
                    info!(findings = findings.len(), "analysis complete");
                    return Ok(AnalysisReport { findings });
                }
                STATUS_ANALYZING => {
                    debug!(attempt, "analysis still in progress");
                    std::thread::sleep(self.poll_interval);
                }
                STATUS_FAILED => {
                    return Err(PipelineError::AnalysisFailed {
                        reason: "remote analysis ended in FAILED status".to_owned(),
                    });
                }
                other => {
                    return Err(PipelineError::MalformedResponse {
                        call: CALL_ANALYSIS,
                        reason: format!("unexpected analysis status '{other}'"),
                    });
                }
            }
        }

        Err(PipelineError::AnalysisFailed {
            reason: format!(
                "analysis did not complete after {} polling attempts",
                self.poll_attempts
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    // 오케스트레이터의 폴링/분류 동작은 mock 서비스를 사용하는
    // tests/pipeline_tests.rs 통합 테스트에서 검증한다.
}
