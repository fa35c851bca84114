//! SARIF 리포트 파서 -- 관용적 해석
//!
//! 분석 서비스가 반환하는 findings 리포트는 SARIF 형태이지만 스키마는 원격이
//! 소유합니다. 여기서는 버전에 관대한 파서로 취급합니다: 알 수 없는 필드는
//! 무시하고, 없는 필드는 기본값으로 채우며, finding 단위의 이상한 속성
//! 형태는 BOM 매핑 단계에서 해당 finding을 건너뛰는 것으로 끝나야 합니다.
//! 리포트 전체가 해석 불가능할 때만 에러입니다.

use serde::Deserialize;

use crate::error::PipelineError;

/// SARIF 최상위 구조
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SarifReport {
    /// 분석 실행 목록
    pub runs: Vec<SarifRun>,
}

/// 단일 분석 실행
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SarifRun {
    /// 실행의 finding 목록 (리포트 순서 보존)
    pub results: Vec<SarifResult>,
}

/// 단일 finding
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SarifResult {
    /// 규칙 식별자 (예: "aibom/model")
    pub rule_id: Option<String>,
    /// 소스 위치 목록
    pub locations: Vec<SarifLocation>,
    /// 컴포넌트 식별에 쓰이는 자유 형식 메타데이터
    pub properties: serde_json::Value,
}

/// finding 위치
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SarifLocation {
    /// 물리적 위치
    pub physical_location: Option<SarifPhysicalLocation>,
}

/// 파일 기반 위치
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SarifPhysicalLocation {
    /// 아티팩트(파일) 참조
    pub artifact_location: Option<SarifArtifactLocation>,
}

/// 아티팩트 참조
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SarifArtifactLocation {
    /// 파일 URI
    pub uri: Option<String>,
}

impl SarifResult {
    /// 첫 위치의 파일 URI를 반환합니다.
    pub fn primary_uri(&self) -> Option<&str> {
        self.locations
            .first()
            .and_then(|l| l.physical_location.as_ref())
            .and_then(|p| p.artifact_location.as_ref())
            .and_then(|a| a.uri.as_deref())
    }

    /// properties에서 문자열 값을 읽습니다.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }
}

/// SARIF 리포트 값에서 모든 finding을 리포트 순서대로 추출합니다.
pub fn parse_report(value: &serde_json::Value) -> Result<Vec<SarifResult>, PipelineError> {
    let report: SarifReport =
        serde_json::from_value(value.clone()).map_err(|e| PipelineError::MalformedResponse {
            call: "analysis",
            reason: format!("sarif report: {e}"),
        })?;
    Ok(report.runs.into_iter().flat_map(|r| r.results).collect())
}
