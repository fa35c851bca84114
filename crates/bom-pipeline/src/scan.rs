//! 프로젝트 스캐너 -- 분석 대상 파일 선별
//!
//! 프로젝트 트리를 사전순으로 결정적으로 순회하며 [`FilterSet`]에 매칭되는
//! 파일을 수집합니다. 결과가 비어 있는 것은 이 계층의 에러가 아닙니다 --
//! 분류는 호출자가 합니다.

use std::path::Path;

use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::filters::FilterSet;
use crate::types::ProjectFile;

/// 순회에서 제외하는 디렉토리 이름
const EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".venv",
    "venv",
    "node_modules",
    "target",
    "__pycache__",
    "dist",
    "build",
];

/// 파일 하나의 기본 최대 크기 (바이트)
const DEFAULT_MAX_FILE_SIZE: u64 = 4 * 1024 * 1024; // 4 MB

/// 프로젝트 스캐너
///
/// 하나의 실행 동안 상태를 갖지 않으며, 같은 입력에 대해 같은 순서의 결과를
/// 반환합니다.
pub struct ProjectScanner {
    max_file_size: u64,
}

impl Default for ProjectScanner {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ProjectScanner {
    /// 파일 크기 상한을 지정하여 스캐너를 생성합니다.
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    /// 프로젝트 루트를 순회하여 분석 대상 파일 목록을 반환합니다.
    ///
    /// 결과는 경로 사전순으로 정렬됩니다. 읽을 수 없는 개별 파일, 크기 초과
    /// 파일, UTF-8이 아닌 파일은 경고 후 건너뜁니다. 루트 디렉토리 자체를
    /// 읽을 수 없으면 에러입니다.
    pub fn scan(
        &self,
        root: &Path,
        filters: &FilterSet,
    ) -> Result<Vec<ProjectFile>, PipelineError> {
        let mut files = Vec::new();
        self.walk(root, root, filters, &mut files)?;
        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(selected = files.len(), "project scan finished");
        Ok(files)
    }

    fn walk(
        &self,
        root: &Path,
        dir: &Path,
        filters: &FilterSet,
        out: &mut Vec<ProjectFile>,
    ) -> Result<(), PipelineError> {
        let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;

        let mut entries: Vec<_> = entries.filter_map(Result::ok).collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                debug!(path = %path.display(), "skipping non-UTF-8 file name");
                continue;
            };

            let file_type = match entry.file_type() {
                Ok(ft) => ft,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cannot stat entry, skipping");
                    continue;
                }
            };

            if file_type.is_symlink() {
                debug!(path = %path.display(), "skipping symlink");
                continue;
            }

            if file_type.is_dir() {
                if EXCLUDED_DIRS.contains(&name) {
                    debug!(dir = name, "skipping excluded directory");
                    continue;
                }
                self.walk(root, &path, filters, out)?;
                continue;
            }

            let rel = relative_posix(root, &path);
            if !filters.matches(&rel) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(e) => {
                    warn!(path = %rel, error = %e, "cannot read metadata, skipping");
                    continue;
                }
            };
            if metadata.len() > self.max_file_size {
                warn!(
                    path = %rel,
                    size = metadata.len(),
                    max = self.max_file_size,
                    "file exceeds size limit, skipping"
                );
                continue;
            }

            let content = match std::fs::read(&path) {
                Ok(c) => c,
                Err(e) => {
                    warn!(path = %rel, error = %e, "cannot read file, skipping");
                    continue;
                }
            };
            if std::str::from_utf8(&content).is_err() {
                warn!(path = %rel, "file is not valid UTF-8, skipping");
                continue;
            }

            out.push(ProjectFile { path: rel, content });
        }

        Ok(())
    }
}

/// 루트 기준 상대 경로를 POSIX 구분자로 반환합니다.
fn relative_posix(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn py_filters() -> FilterSet {
        FilterSet {
            config_files: BTreeSet::from(["requirements.txt".to_owned()]),
            extensions: BTreeSet::from([".py".to_owned()]),
            autofix_extensions: BTreeSet::new(),
        }
    }

    #[test]
    fn scan_selects_matching_files_in_lexicographic_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.py"), "import torch").unwrap();
        std::fs::write(dir.path().join("a.py"), "import numpy").unwrap();
        std::fs::write(dir.path().join("notes.md"), "# notes").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/c.py"), "import flask").unwrap();

        let files = ProjectScanner::default()
            .scan(dir.path(), &py_filters())
            .unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["a.py", "b.py", "src/c.py"]);
    }

    #[test]
    fn scan_selects_config_files_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("requirements.txt"), "torch==2.0.1").unwrap();

        let files = ProjectScanner::default()
            .scan(dir.path(), &py_filters())
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "requirements.txt");
    }

    #[test]
    fn scan_skips_excluded_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules/x.py"), "dep").unwrap();
        std::fs::create_dir(dir.path().join("__pycache__")).unwrap();
        std::fs::write(dir.path().join("__pycache__/y.py"), "cache").unwrap();
        std::fs::write(dir.path().join("main.py"), "entry").unwrap();

        let files = ProjectScanner::default()
            .scan(dir.path(), &py_filters())
            .unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["main.py"]);
    }

    #[test]
    fn scan_skips_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.py"), "x".repeat(64)).unwrap();
        std::fs::write(dir.path().join("small.py"), "ok").unwrap();

        let files = ProjectScanner::new(16).scan(dir.path(), &py_filters()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["small.py"]);
    }

    #[test]
    fn scan_skips_non_utf8_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bin.py"), [0xff, 0xfe, 0x00]).unwrap();
        std::fs::write(dir.path().join("ok.py"), "print()").unwrap();

        let files = ProjectScanner::default()
            .scan(dir.path(), &py_filters())
            .unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["ok.py"]);
    }

    #[test]
    fn scan_empty_project_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let files = ProjectScanner::default()
            .scan(dir.path(), &py_filters())
            .unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn scan_missing_root_is_an_error() {
        let result =
            ProjectScanner::default().scan(Path::new("/nonexistent/aibom-test"), &py_filters());
        assert!(matches!(result, Err(PipelineError::Io { .. })));
    }

    #[test]
    fn scan_is_deterministic_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["z.py", "m.py", "a.py"] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        let scanner = ProjectScanner::default();
        let first = scanner.scan(dir.path(), &py_filters()).unwrap();
        let second = scanner.scan(dir.path(), &py_filters()).unwrap();
        assert_eq!(first, second);
    }
}
