//! 분석 서비스 HTTP 클라이언트
//!
//! 원격 프로토콜의 다섯 호출(filters, create, extend, upload, analysis)을
//! 감싸는 blocking 클라이언트입니다. 모든 실패는 호출 지점에서 즉시
//! [`PipelineError`]로 분류됩니다. 이 계층은 자동 재시도를 하지 않습니다 --
//! extend/upload 핸드셰이크의 2단계 호출은 [`crate::bundle`]이 소유하는
//! 프로토콜의 일부이며 에러 복구가 아닙니다.

use std::collections::BTreeMap;
use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use aibom_core::config::ApiConfig;
use aibom_core::metrics::{LABEL_CALL, LABEL_RESULT, REMOTE_CALLS_TOTAL};

use crate::error::PipelineError;
use crate::filters::FilterSet;

/// 호출 이름 상수 -- 에러 메시지와 메트릭 레이블에 사용
pub const CALL_FILTERS: &str = "filters";
pub const CALL_CREATE_BUNDLE: &str = "create-bundle";
pub const CALL_EXTEND_BUNDLE: &str = "extend-bundle";
pub const CALL_UPLOAD: &str = "upload";
pub const CALL_ANALYSIS: &str = "analysis";

/// 세션 토큰 헤더 이름
const SESSION_TOKEN_HEADER: &str = "Session-Token";
/// 조직 식별자 헤더 이름
const ORG_HEADER: &str = "X-Org";

/// 번들 생성/확장/업로드 응답
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleResponse {
    /// 원격이 부여한 번들 해시
    pub bundle_hash: String,
    /// 원격이 내용을 요구하는 경로 목록
    #[serde(default)]
    pub missing_files: Vec<String>,
}

/// 분석 제출 응답
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    /// 분석 상태 (COMPLETE, ANALYZING, FAILED)
    pub status: String,
    /// 완료 시 SARIF 형태의 findings 리포트
    #[serde(default)]
    pub sarif: Option<serde_json::Value>,
}

/// 누락 파일 업로드 본문의 단일 항목
#[derive(Debug, Clone, Serialize)]
pub struct FileUpload {
    /// 콘텐츠 해시
    pub hash: String,
    /// 파일 내용 (UTF-8)
    pub content: String,
}

/// 분석 서비스 클라이언트
///
/// 실행마다 하나 생성되며 내부 상태는 연결 설정뿐입니다.
pub struct AnalysisServiceClient {
    agent: ureq::Agent,
    base_url: String,
    token: Option<String>,
    org: Option<String>,
}

impl AnalysisServiceClient {
    /// API 설정에서 클라이언트를 생성합니다.
    pub fn new(api: &ApiConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build();
        Self {
            agent,
            base_url: api.url.trim_end_matches('/').to_owned(),
            token: api.token.clone(),
            org: api.org.clone(),
        }
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let mut req = self.agent.request(method, &format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.set(SESSION_TOKEN_HEADER, token);
        }
        if let Some(org) = &self.org {
            req = req.set(ORG_HEADER, org);
        }
        req
    }

    /// 지원 파일 필터를 조회합니다. 실행당 한 번 호출됩니다.
    pub fn fetch_filters(&self) -> Result<FilterSet, PipelineError> {
        debug!("GET /filters");
        let result = self.request("GET", "/filters").call();
        let resp = finish(CALL_FILTERS, result)?;
        parse_body(CALL_FILTERS, resp)
    }

    /// 전체 파일 집합으로 새 번들을 생성합니다.
    pub fn create_bundle(
        &self,
        files: &BTreeMap<String, String>,
    ) -> Result<BundleResponse, PipelineError> {
        debug!(files = files.len(), "POST /bundle");
        let body = serde_json::json!({ "files": files });
        let result = self.request("POST", "/bundle").send_json(body);
        let resp = finish(CALL_CREATE_BUNDLE, result)?;
        parse_body(CALL_CREATE_BUNDLE, resp)
    }

    /// 기존 번들을 새 파일 집합으로 확장합니다.
    pub fn extend_bundle(
        &self,
        bundle_id: &str,
        files: &BTreeMap<String, String>,
    ) -> Result<BundleResponse, PipelineError> {
        debug!(bundle_id, files = files.len(), "PUT /bundle (extend)");
        let body = serde_json::json!({ "files": files, "removedFiles": [] });
        let result = self
            .request("PUT", &format!("/bundle/{bundle_id}"))
            .send_json(body);
        let resp = finish(CALL_EXTEND_BUNDLE, result)?;
        parse_body(CALL_EXTEND_BUNDLE, resp)
    }

    /// 누락 파일의 내용을 공급합니다 (extend와 동일 엔드포인트의 2차 호출).
    pub fn upload_files(
        &self,
        bundle_id: &str,
        files: &BTreeMap<String, FileUpload>,
    ) -> Result<BundleResponse, PipelineError> {
        debug!(bundle_id, files = files.len(), "PUT /bundle (upload)");
        let body = serde_json::json!({ "files": files });
        let result = self
            .request("PUT", &format!("/bundle/{bundle_id}"))
            .send_json(body);
        let resp = finish(CALL_UPLOAD, result)?;
        parse_body(CALL_UPLOAD, resp)
    }

    /// 번들을 분석에 제출하고 현재 상태를 조회합니다.
    ///
    /// 401은 인증 실패, 403은 권한 실패로 분류됩니다. 그 외 비정상 상태는
    /// 호출자에서 `AnalysisFailed`로 이어집니다.
    pub fn run_analysis(&self, bundle_id: &str) -> Result<AnalysisResponse, PipelineError> {
        debug!(bundle_id, "POST /analysis");
        let body = serde_json::json!({ "bundleHash": bundle_id });
        let result = self.request("POST", "/analysis").send_json(body);
        let resp = match result {
            Ok(resp) => {
                observe(CALL_ANALYSIS, true);
                resp
            }
            Err(err) => {
                observe(CALL_ANALYSIS, false);
                return Err(match err {
                    ureq::Error::Status(401, _) => PipelineError::Unauthorized,
                    ureq::Error::Status(403, _) => PipelineError::Forbidden,
                    ureq::Error::Status(status, _) => PipelineError::Status {
                        call: CALL_ANALYSIS,
                        status,
                    },
                    other => PipelineError::Transport {
                        call: CALL_ANALYSIS,
                        reason: other.to_string(),
                    },
                });
            }
        };
        parse_body(CALL_ANALYSIS, resp)
    }
}

/// 호출 결과를 기록하고 비정상 응답을 분류합니다 (분석 호출 제외).
fn finish(
    call: &'static str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, PipelineError> {
    match result {
        Ok(resp) => {
            observe(call, true);
            Ok(resp)
        }
        Err(err) => {
            observe(call, false);
            Err(match err {
                ureq::Error::Status(status, _) => PipelineError::Status { call, status },
                other => PipelineError::Transport {
                    call,
                    reason: other.to_string(),
                },
            })
        }
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(
    call: &'static str,
    resp: ureq::Response,
) -> Result<T, PipelineError> {
    resp.into_json::<T>()
        .map_err(|e| PipelineError::MalformedResponse {
            call,
            reason: e.to_string(),
        })
}

fn observe(call: &'static str, ok: bool) {
    let result = if ok { "success" } else { "failure" };
    counter!(REMOTE_CALLS_TOTAL, LABEL_CALL => call, LABEL_RESULT => result).increment(1);
}
