//! 파이프라인 에러 타입
//!
//! [`PipelineError`]는 파이프라인 모듈 내에서 발생할 수 있는 모든 에러를
//! 나타냅니다. `From<PipelineError> for AibomError` 구현을 통해 `?` 연산자로
//! 분류된 상위 에러 타입으로 전파됩니다. 원격 호출 실패는 호출 이름을 담아
//! 어느 단계에서 실패했는지 보존합니다.

use aibom_core::error::AibomError;

/// 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// 원격 호출 자체가 완료되지 못함 (연결 실패, 타임아웃)
    #[error("{call} call failed: {reason}")]
    Transport {
        /// 실패한 호출 이름
        call: &'static str,
        /// 전송 계층 실패 사유
        reason: String,
    },

    /// 원격이 비정상 상태 코드로 응답 (분석 호출의 401/403은 별도 종류)
    #[error("{call} call returned HTTP {status}")]
    Status {
        /// 실패한 호출 이름
        call: &'static str,
        /// HTTP 상태 코드
        status: u16,
    },

    /// 분석 호출에서 401 수신
    #[error("analysis call returned HTTP 401")]
    Unauthorized,

    /// 분석 호출에서 403 수신
    #[error("analysis call returned HTTP 403")]
    Forbidden,

    /// 분석이 실패 상태로 종료되었거나 완료되지 못함
    #[error("analysis failed: {reason}")]
    AnalysisFailed {
        /// 실패 사유
        reason: String,
    },

    /// extend/upload 핸드셰이크가 수렴하지 않음
    #[error("bundle incomplete: {missing} file(s) still missing after upload")]
    BundleIncomplete {
        /// 업로드 후에도 남은 누락 파일 수
        missing: usize,
    },

    /// 스캔 결과 분석 가능한 파일 없음
    #[error("no supported files found in project")]
    NoSupportedFiles,

    /// 응답 본문을 기대한 형태로 해석할 수 없음
    #[error("{call} call returned a malformed response: {reason}")]
    MalformedResponse {
        /// 실패한 호출 이름
        call: &'static str,
        /// 해석 실패 사유
        reason: String,
    },

    /// 프로젝트 파일 I/O 실패
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// BOM 문서 직렬화 실패
    #[error("render error: {0}")]
    Render(String),
}

impl From<PipelineError> for AibomError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Transport { call, reason } => AibomError::ServiceUnavailable {
                reason: format!("{call} call failed: {reason}"),
            },
            PipelineError::Status { call, status } => AibomError::ServiceUnavailable {
                reason: format!("{call} call returned HTTP {status}"),
            },
            PipelineError::Unauthorized => AibomError::AuthenticationError,
            PipelineError::Forbidden => AibomError::AuthorizationError,
            PipelineError::AnalysisFailed { reason } => AibomError::AnalysisFailed { reason },
            PipelineError::BundleIncomplete { missing } => AibomError::BundleIncomplete {
                reason: format!("{missing} file(s) still missing after upload"),
            },
            PipelineError::NoSupportedFiles => AibomError::NoSupportedFiles,
            PipelineError::MalformedResponse { call, reason } => AibomError::ServiceUnavailable {
                reason: format!("{call} call returned a malformed response: {reason}"),
            },
            PipelineError::Io { path, source } => AibomError::Io(std::io::Error::new(
                source.kind(),
                format!("{path}: {source}"),
            )),
            PipelineError::Render(msg) => AibomError::Render(msg),
        }
    }
}
