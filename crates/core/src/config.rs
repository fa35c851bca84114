//! 설정 관리 — aibom.toml 파싱 및 런타임 설정
//!
//! [`AibomConfig`]는 CLI와 파이프라인이 공유하는 최상위 설정 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`AIBOM_API_URL=...` 형식)
//! 3. 설정 파일 (`aibom.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), aibom_core::error::AibomError> {
//! use aibom_core::config::AibomConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = AibomConfig::load("aibom.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = AibomConfig::parse("[api]\nurl = \"https://analysis.example.com\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AibomError, ConfigError};

/// Aibom 통합 설정
///
/// `aibom.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AibomConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 분석 서비스 설정
    #[serde(default)]
    pub api: ApiConfig,
}

impl AibomConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AibomError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에 환경변수 오버라이드만 적용합니다.
    ///
    /// CLI가 기본 경로(`aibom.toml`)로 호출할 때 사용합니다. 파일이 존재하지만
    /// 읽거나 파싱할 수 없으면 에러입니다.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, AibomError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AibomError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AibomError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                AibomError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, AibomError> {
        toml::from_str(toml_str).map_err(|e| {
            AibomError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `AIBOM_{SECTION}_{FIELD}`
    /// 예: `AIBOM_API_URL=https://analysis.example.com`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "AIBOM_GENERAL_LOG_LEVEL");

        // API
        override_string(&mut self.api.url, "AIBOM_API_URL");
        override_opt_string(&mut self.api.token, "AIBOM_API_TOKEN");
        override_opt_string(&mut self.api.org, "AIBOM_API_ORG");
        override_u64(&mut self.api.timeout_secs, "AIBOM_API_TIMEOUT_SECS");
        override_u64(&mut self.api.poll_interval_ms, "AIBOM_API_POLL_INTERVAL_MS");
        override_u32(&mut self.api.poll_attempts, "AIBOM_API_POLL_ATTEMPTS");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), AibomError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        self.api.validate()?;
        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
        }
    }
}

/// 설정 상한값 상수
const MAX_TIMEOUT_SECS: u64 = 600;
const MAX_POLL_INTERVAL_MS: u64 = 60_000;
const MAX_POLL_ATTEMPTS: u32 = 1_000;

/// 분석 서비스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 분석 서비스 기본 URL
    pub url: String,
    /// 세션 토큰 (없으면 헤더를 보내지 않음)
    pub token: Option<String>,
    /// 조직 식별자 (없으면 헤더를 보내지 않음)
    pub org: Option<String>,
    /// 원격 호출 타임아웃 (초)
    pub timeout_secs: u64,
    /// 분석 상태 폴링 간격 (밀리초)
    pub poll_interval_ms: u64,
    /// 분석 상태 폴링 최대 시도 횟수
    pub poll_attempts: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "https://analysis.aibom.dev".to_owned(),
            token: None,
            org: None,
            timeout_secs: 60,
            poll_interval_ms: 500,
            poll_attempts: 120,
        }
    }
}

impl ApiConfig {
    /// API 설정값의 유효성을 검증합니다.
    ///
    /// # 검증 규칙
    ///
    /// - `url`: 비어있지 않고 http:// 또는 https://로 시작
    /// - `timeout_secs`: 1-600
    /// - `poll_interval_ms`: 10-60000
    /// - `poll_attempts`: 1-1000
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "api.url".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            });
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_TIMEOUT_SECS}"),
            });
        }

        if self.poll_interval_ms < 10 || self.poll_interval_ms > MAX_POLL_INTERVAL_MS {
            return Err(ConfigError::InvalidValue {
                field: "api.poll_interval_ms".to_owned(),
                reason: format!("must be 10-{MAX_POLL_INTERVAL_MS}"),
            });
        }

        if self.poll_attempts == 0 || self.poll_attempts > MAX_POLL_ATTEMPTS {
            return Err(ConfigError::InvalidValue {
                field: "api.poll_attempts".to_owned(),
                reason: format!("must be 1-{MAX_POLL_ATTEMPTS}"),
            });
        }

        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_opt_string(target: &mut Option<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = Some(val).filter(|v| !v.is_empty());
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}
