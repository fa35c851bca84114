//! 의존성 그래프 증강 -- 매니페스트 기반 번들 보강
//!
//! 프로젝트에 인식 가능한 패키지 매니페스트가 있으면 의존성 그래프 산출물을
//! 만들어 합성 경로로 번들에 첨부합니다. 매니페스트가 없으면 입력 번들을
//! 그대로 반환하며 에러가 아닙니다.
//!
//! 그래프 생성 자체는 [`DepGraphSource`] trait 뒤의 외부 관심사입니다.
//! 기본 구현은 `requirements.txt`의 고정 핀을 읽어 작은 JSON 그래프를
//! 만듭니다.

use std::path::Path;

use tracing::{debug, info};

use crate::bundle::{file_hash, settle_missing};
use crate::client::AnalysisServiceClient;
use crate::error::PipelineError;
use crate::types::{Bundle, DepGraphArtifact, ProjectFile};

/// 번들에 첨부되는 그래프 산출물의 합성 경로
///
/// 확장자는 서비스 필터가 광고하는 `.aibomdepgraph`입니다.
pub const DEPGRAPH_BUNDLE_PATH: &str = "project.aibomdepgraph";

/// 의존성 그래프 산출물 공급자
///
/// 외부 추출 도구는 이 trait 구현으로 연결됩니다. `Ok(None)`은
/// "이 프로젝트에는 그래프를 만들 매니페스트가 없다"는 뜻입니다.
pub trait DepGraphSource {
    /// 프로젝트에서 그래프 산출물을 해석합니다.
    fn resolve(&self, project_root: &Path) -> Result<Option<DepGraphArtifact>, PipelineError>;
}

/// `requirements.txt` 고정 핀 기반의 내장 그래프 공급자
#[derive(Debug, Default)]
pub struct RequirementsDepGraphSource;

impl DepGraphSource for RequirementsDepGraphSource {
    fn resolve(&self, project_root: &Path) -> Result<Option<DepGraphArtifact>, PipelineError> {
        let manifest = project_root.join("requirements.txt");
        if !manifest.is_file() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&manifest).map_err(|e| PipelineError::Io {
            path: manifest.display().to_string(),
            source: e,
        })?;

        let deps = parse_requirements(&content);
        if deps.is_empty() {
            debug!("requirements.txt contains no resolvable dependencies");
            return Ok(None);
        }

        let pkgs: Vec<serde_json::Value> = deps
            .iter()
            .map(|(name, version)| {
                let id = match version {
                    Some(v) => format!("{name}@{v}"),
                    None => name.clone(),
                };
                serde_json::json!({
                    "id": id,
                    "info": { "name": name, "version": version },
                })
            })
            .collect();

        let graph = serde_json::json!({
            "schemaVersion": "1.2.0",
            "pkgManager": { "name": "pip" },
            "pkgs": pkgs,
        });
        let payload = serde_json::to_vec(&graph)
            .map_err(|e| PipelineError::Render(format!("depgraph serialization failed: {e}")))?;

        Ok(Some(DepGraphArtifact {
            bundle_path: DEPGRAPH_BUNDLE_PATH.to_owned(),
            payload,
        }))
    }
}

/// `requirements.txt` 본문에서 (이름, 버전) 쌍을 추출합니다.
///
/// 고정 핀(`name==version`)은 버전을 보존하고, 범위 지정자는 이름만
/// 남깁니다. 주석, 빈 줄, `-r` 같은 옵션 줄은 무시합니다.
fn parse_requirements(content: &str) -> Vec<(String, Option<String>)> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() || line.starts_with('-') {
                return None;
            }
            let (name_part, version) = match line.split_once("==") {
                Some((name, version)) => (name, Some(version.trim().to_owned())),
                None => {
                    let end = line
                        .find(|c| ['<', '>', '!', '~', '='].contains(&c))
                        .unwrap_or(line.len());
                    (&line[..end], None)
                }
            };
            // extras 표기 "name[extra]"에서 이름만 취한다
            let name = name_part.split('[').next().unwrap_or(name_part).trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_lowercase(), version.filter(|v| !v.is_empty())))
        })
        .collect()
}

/// 의존성 그래프 증강기
pub struct DepGraphAugmenter<'a> {
    client: &'a AnalysisServiceClient,
    source: &'a dyn DepGraphSource,
}

impl<'a> DepGraphAugmenter<'a> {
    /// 클라이언트와 그래프 공급자로 증강기를 생성합니다.
    pub fn new(client: &'a AnalysisServiceClient, source: &'a dyn DepGraphSource) -> Self {
        Self { client, source }
    }

    /// 번들에 그래프 산출물을 첨부합니다.
    ///
    /// 산출물이 없으면 입력 번들을 그대로 반환합니다. 있으면 기존 번들을
    /// 합성 파일 하나가 추가된 집합으로 확장하고, 그 파일에 대한 업로드
    /// 핸드셰이크를 수렴시킵니다.
    pub fn augment(&self, bundle: Bundle, project_root: &Path) -> Result<Bundle, PipelineError> {
        let Some(artifact) = self.source.resolve(project_root)? else {
            debug!("no dependency manifest, bundle unchanged");
            return Ok(bundle);
        };

        info!(
            path = %artifact.bundle_path,
            bytes = artifact.payload.len(),
            "attaching dependency graph artifact"
        );

        let mut files = bundle.files.clone();
        files.insert(artifact.bundle_path.clone(), file_hash(&artifact.payload));

        let response = self.client.extend_bundle(&bundle.id, &files)?;
        let synthetic = ProjectFile {
            path: artifact.bundle_path,
            content: artifact.payload,
        };
        let bundle_id = settle_missing(self.client, response, std::slice::from_ref(&synthetic))?;

        Ok(Bundle {
            id: bundle_id,
            parent_id: Some(bundle.id),
            files,
            missing_files: Vec::new(),
        })
    }
}
