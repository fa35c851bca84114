//! BOM 생성 -- finding 매핑과 문서 렌더링
//!
//! 분석 findings를 CycloneDX 1.6 컴포넌트로 변환하고, 구조화된 JSON 또는
//! 자체 완결형 HTML 리포트로 직렬화합니다.
//!
//! # 불변식
//!
//! - 최종 문서에 같은 (type, name, version) 컴포넌트가 두 번 나오지 않는다.
//! - 컴포넌트 순서는 최초 발견 순서이며, 같은 입력에 대해 재실행해도
//!   안정적이다.
//! - findings가 없으면 컴포넌트가 0개인 문서를 만든다 -- 매퍼는 실패하지
//!   않으며, 그것을 에러로 볼지는 호출자의 정책이다.

pub mod cyclonedx;
pub mod html;
pub(crate) mod util;

use std::collections::HashMap;
use std::fmt;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use aibom_core::metrics::FINDINGS_SKIPPED_TOTAL;

use crate::error::PipelineError;
use crate::sarif::SarifResult;

/// CycloneDX 스키마 URI (문서에 리터럴로 포함되어야 함)
pub const BOM_SCHEMA_URL: &str = "https://cyclonedx.org/schema/bom-1.6.schema.json";
/// CycloneDX 사양 버전
pub const BOM_SPEC_VERSION: &str = "1.6";
/// 문서 형식 이름
pub const BOM_FORMAT: &str = "CycloneDX";
/// 문서 metadata에 기록되는 도구 이름
pub const TOOL_NAME: &str = "aibom";

/// AI/ML 규칙 네임스페이스 접두사
const RULE_NAMESPACE: &str = "aibom/";

/// BOM 컴포넌트 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    /// 머신러닝 모델
    MachineLearningModel,
    /// 데이터셋
    Data,
    /// ML 프레임워크
    Framework,
    /// 일반 라이브러리
    Library,
}

impl ComponentType {
    /// CycloneDX `type` 필드 값을 반환합니다.
    pub fn as_cyclonedx(&self) -> &'static str {
        match self {
            Self::MachineLearningModel => "machine-learning-model",
            Self::Data => "data",
            Self::Framework => "framework",
            Self::Library => "library",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cyclonedx())
    }
}

/// 단일 BOM 컴포넌트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// 컴포넌트 분류
    pub component_type: ComponentType,
    /// 컴포넌트 이름
    pub name: String,
    /// 버전 (유도 가능한 경우)
    pub version: Option<String>,
    /// Package URL 식별자
    pub purl: Option<String>,
}

/// AI Bill of Materials
#[derive(Debug, Clone)]
pub struct Bom {
    /// 문서 시리얼 번호 (`urn:uuid:...`)
    pub serial_number: String,
    /// 생성 시각 (RFC3339)
    pub timestamp: String,
    /// 최초 발견 순서의 컴포넌트 목록
    pub components: Vec<Component>,
}

impl Bom {
    /// 컴포넌트 목록으로 BOM을 생성하고 시리얼 번호와 타임스탬프를 채웁니다.
    pub fn new(components: Vec<Component>) -> Self {
        Self {
            serial_number: format!("urn:uuid:{}", uuid::Uuid::new_v4()),
            timestamp: util::current_timestamp(),
            components,
        }
    }
}

/// finding → 컴포넌트 매퍼
#[derive(Debug, Default)]
pub struct FindingMapper;

impl FindingMapper {
    /// 매퍼를 생성합니다.
    pub fn new() -> Self {
        Self
    }

    /// findings를 중복 제거된 컴포넌트 목록으로 매핑합니다.
    ///
    /// AI/ML 규칙이 아니거나 속성에서 이름을 얻을 수 없는 finding은
    /// 건너뜁니다. (type, name, version)이 같은 뒤따르는 finding은 기존
    /// 항목에 누락된 식별자만 보탭니다.
    pub fn map(&self, findings: &[SarifResult]) -> Bom {
        let mut components: Vec<Component> = Vec::new();
        let mut index: HashMap<(ComponentType, String, Option<String>), usize> = HashMap::new();
        let mut skipped = 0u64;

        for finding in findings {
            let Some(component) = component_from_finding(finding) else {
                skipped += 1;
                continue;
            };

            let key = (
                component.component_type,
                component.name.clone(),
                component.version.clone(),
            );
            match index.get(&key) {
                Some(&i) => {
                    // 중복 finding: 식별자만 병합
                    if components[i].purl.is_none() {
                        components[i].purl = component.purl;
                    }
                }
                None => {
                    index.insert(key, components.len());
                    components.push(component);
                }
            }
        }

        if skipped > 0 {
            debug!(skipped, "findings skipped during BOM mapping");
            counter!(FINDINGS_SKIPPED_TOTAL).increment(skipped);
        }

        Bom::new(components)
    }
}

/// finding 하나에서 컴포넌트를 유도합니다.
///
/// 규칙이 `aibom/` 네임스페이스가 아니거나 속성 형태가 알 수 없는 경우
/// `None`입니다.
fn component_from_finding(finding: &SarifResult) -> Option<Component> {
    let rule_id = finding.rule_id.as_deref()?;
    let component_type = rule_component_type(rule_id)?;

    let name = finding.property_str("name")?.trim();
    if name.is_empty() {
        return None;
    }

    let version = finding
        .property_str("version")
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty());
    let purl = finding
        .property_str("purl")
        .map(|p| p.trim().to_owned())
        .filter(|p| !p.is_empty());

    Some(Component {
        component_type,
        name: name.to_owned(),
        version,
        purl,
    })
}

/// 규칙 ID의 카테고리 세그먼트를 컴포넌트 분류로 변환합니다.
///
/// 예: `aibom/model/torch-hub-load` → `MachineLearningModel`
fn rule_component_type(rule_id: &str) -> Option<ComponentType> {
    let rest = rule_id.strip_prefix(RULE_NAMESPACE)?;
    let category = rest.split('/').next().unwrap_or(rest);
    match category {
        "model" => Some(ComponentType::MachineLearningModel),
        "dataset" => Some(ComponentType::Data),
        "framework" => Some(ComponentType::Framework),
        "library" => Some(ComponentType::Library),
        _ => None,
    }
}

/// 출력 문서 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// CycloneDX 1.6 JSON
    Json,
    /// 자체 완결형 HTML 리포트
    Html,
}

/// BOM을 요청된 형식의 바이트로 직렬화합니다.
pub fn render(bom: &Bom, format: DocumentFormat) -> Result<Vec<u8>, PipelineError> {
    match format {
        DocumentFormat::Json => cyclonedx::render(bom).map(String::into_bytes),
        DocumentFormat::Html => Ok(html::render(bom).into_bytes()),
    }
}
