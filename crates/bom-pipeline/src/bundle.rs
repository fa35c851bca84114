//! 번들 조정 -- 콘텐츠 지문 계산과 extend/upload 핸드셰이크
//!
//! [`BundleReconciler`]는 선별된 파일 집합을 원격 번들로 만듭니다. 이전 번들
//! ID가 없으면 생성 경로, 있으면 확장 경로를 사용하며, 두 경로는 명시적으로
//! 분리된 코드입니다 (하나가 다른 하나를 포섭한다고 가정하지 않습니다).
//!
//! # 핸드셰이크 상태 기계
//!
//! ```text
//! Unverified --(missingFiles 비어 있음)--> Complete
//!     |
//!     +--(missingFiles 있음)--> AwaitingUpload --(업로드 후 비어 있음)--> Complete
//!                                    |
//!                                    +--(업로드 후에도 남음)--> Incomplete (치명적)
//! ```
//!
//! 업로드 본문은 누락 집합에서 결정적으로 구성되므로 같은 누락 집합에 대한
//! 반복 호출은 같은 번들을 만듭니다. 부분 승인은 유효한 종료 상태가
//! 아닙니다 -- 업로드 후에도 누락이 남으면 `BundleIncomplete`입니다.

use std::collections::BTreeMap;

use metrics::counter;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use aibom_core::metrics::FILES_UPLOADED_TOTAL;

use crate::client::{AnalysisServiceClient, BundleResponse, FileUpload};
use crate::error::PipelineError;
use crate::types::{Bundle, ProjectFile};

/// 파일 내용의 SHA-256 해시를 16진수 문자열로 반환합니다.
pub fn file_hash(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// 정렬된 경로→해시 매핑 전체에 대한 결정적 지문을 계산합니다.
///
/// `BTreeMap` 순회가 경로 사전순이므로 같은 파일 집합은 항상 같은 지문을
/// 만듭니다.
pub fn bundle_fingerprint(files: &BTreeMap<String, String>) -> String {
    let mut hasher = Sha256::new();
    for (path, hash) in files {
        hasher.update(path.as_bytes());
        hasher.update([0]);
        hasher.update(hash.as_bytes());
        hasher.update([b'\n']);
    }
    hex::encode(hasher.finalize())
}

/// extend/upload 핸드셰이크의 명시적 상태
#[derive(Debug)]
enum ReconcileState {
    /// 원격 응답을 아직 검증하지 않음
    Unverified { response: BundleResponse },
    /// 원격이 요구한 누락 파일을 업로드해야 함
    AwaitingUpload {
        bundle_id: String,
        missing: Vec<String>,
    },
    /// 원격이 모든 내용을 확보함
    Complete { bundle_id: String },
    /// 업로드 후에도 누락이 남음 -- 치명적
    Incomplete { missing: usize },
}

/// 번들 조정기
///
/// 생성과 확장 양쪽 경로에서 핸드셰이크를 수렴시키는 책임을 가집니다.
pub struct BundleReconciler<'a> {
    client: &'a AnalysisServiceClient,
}

impl<'a> BundleReconciler<'a> {
    /// 클라이언트를 받아 조정기를 생성합니다.
    pub fn new(client: &'a AnalysisServiceClient) -> Self {
        Self { client }
    }

    /// 파일 집합을 원격 번들로 만듭니다.
    ///
    /// `prior_bundle_id`가 없으면 전체 파일 집합으로 새 번들을 생성하고,
    /// 있으면 이전 번들을 확장하여 변경되지 않은 내용의 재업로드를
    /// 피합니다. 어느 경로든 핸드셰이크가 수렴해야 반환합니다.
    pub fn reconcile(
        &self,
        files: &[ProjectFile],
        prior_bundle_id: Option<&str>,
    ) -> Result<Bundle, PipelineError> {
        let hashes: BTreeMap<String, String> = files
            .iter()
            .map(|f| (f.path.clone(), file_hash(&f.content)))
            .collect();
        let fingerprint = bundle_fingerprint(&hashes);
        debug!(%fingerprint, files = hashes.len(), "computed bundle fingerprint");

        let response = match prior_bundle_id {
            Some(prior) => {
                info!(prior, "extending existing bundle");
                self.client.extend_bundle(prior, &hashes)?
            }
            None => {
                info!("creating new bundle");
                self.client.create_bundle(&hashes)?
            }
        };

        let bundle_id = settle_missing(self.client, response, files)?;
        Ok(Bundle {
            id: bundle_id,
            parent_id: prior_bundle_id.map(str::to_owned),
            files: hashes,
            missing_files: Vec::new(),
        })
    }
}

/// 번들 응답의 누락 파일을 업로드하여 핸드셰이크를 수렴시킵니다.
///
/// 수렴하면 최종 번들 ID를 반환합니다. `files`에 없는 경로를 원격이
/// 요구하면 공급할 수 없으므로 수렴 실패입니다.
pub(crate) fn settle_missing(
    client: &AnalysisServiceClient,
    response: BundleResponse,
    files: &[ProjectFile],
) -> Result<String, PipelineError> {
    let mut state = ReconcileState::Unverified { response };

    loop {
        state = match state {
            ReconcileState::Unverified { response } => {
                if response.missing_files.is_empty() {
                    ReconcileState::Complete {
                        bundle_id: response.bundle_hash,
                    }
                } else {
                    ReconcileState::AwaitingUpload {
                        bundle_id: response.bundle_hash,
                        missing: response.missing_files,
                    }
                }
            }
            ReconcileState::AwaitingUpload { bundle_id, missing } => {
                info!(bundle_id = %bundle_id, missing = missing.len(), "uploading missing files");
                let uploads = build_uploads(&missing, files);
                if uploads.len() < missing.len() {
                    warn!(
                        requested = missing.len(),
                        available = uploads.len(),
                        "remote requested files outside the scanned set"
                    );
                }
                let after = client.upload_files(&bundle_id, &uploads)?;
                counter!(FILES_UPLOADED_TOTAL).increment(uploads.len() as u64);
                if after.missing_files.is_empty() {
                    ReconcileState::Complete {
                        bundle_id: after.bundle_hash,
                    }
                } else {
                    ReconcileState::Incomplete {
                        missing: after.missing_files.len(),
                    }
                }
            }
            ReconcileState::Complete { bundle_id } => {
                debug!(bundle_id = %bundle_id, "bundle handshake complete");
                return Ok(bundle_id);
            }
            ReconcileState::Incomplete { missing } => {
                return Err(PipelineError::BundleIncomplete { missing });
            }
        };
    }
}

/// 누락 경로 목록에 해당하는 업로드 본문을 결정적으로 구성합니다.
fn build_uploads(missing: &[String], files: &[ProjectFile]) -> BTreeMap<String, FileUpload> {
    let by_path: BTreeMap<&str, &ProjectFile> =
        files.iter().map(|f| (f.path.as_str(), f)).collect();
    missing
        .iter()
        .filter_map(|path| {
            by_path.get(path.as_str()).map(|f| {
                (
                    f.path.clone(),
                    FileUpload {
                        hash: file_hash(&f.content),
                        content: String::from_utf8_lossy(&f.content).into_owned(),
                    },
                )
            })
        })
        .collect()
}
