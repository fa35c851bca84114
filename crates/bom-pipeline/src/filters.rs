//! 분석 필터 -- 원격이 처리할 수 있는 파일의 기준
//!
//! [`FilterSet`]은 실행 시작 시 `GET /filters`로 한 번 조회되며, 실행 범위
//! 안에서 불변입니다. 확장자 집합과 설정 파일 이름 집합으로 스캔 대상
//! 여부를 판별합니다.

use std::collections::BTreeSet;

use serde::Deserialize;

/// 원격 분석 서비스가 지원하는 파일 필터
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSet {
    /// 이름으로 매칭되는 설정 파일 (예: "requirements.txt")
    pub config_files: BTreeSet<String>,
    /// 지원 확장자, 선행 점 포함 (예: ".py")
    pub extensions: BTreeSet<String>,
    /// 자동 수정 지원 확장자 (스캔 판별에는 사용하지 않음)
    pub autofix_extensions: BTreeSet<String>,
}

impl FilterSet {
    /// 주어진 상대 경로가 분석 대상인지 판별합니다.
    ///
    /// 베이스네임이 `config_files`에 있거나 확장자가 `extensions`에 있으면
    /// 대상입니다. 숨김 파일(`.env` 등)은 확장자로 취급하지 않습니다.
    pub fn matches(&self, path: &str) -> bool {
        let basename = path.rsplit('/').next().unwrap_or(path);
        if self.config_files.contains(basename) {
            return true;
        }
        match basename.rfind('.') {
            Some(idx) if idx > 0 => self.extensions.contains(&basename[idx..]),
            _ => false,
        }
    }

    /// 필터가 비어 있어 아무 파일도 매칭할 수 없는지 여부를 반환합니다.
    pub fn is_empty(&self) -> bool {
        self.config_files.is_empty() && self.extensions.is_empty()
    }
}
