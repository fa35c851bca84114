//! aibom CLI -- AI Bill of Materials 생성 명령
//!
//! 프로젝트 경로 하나를 받아 원격 분석 서비스로 AI/ML 컴포넌트를 찾고,
//! CycloneDX 1.6 문서(또는 HTML 리포트)를 stdout으로 출력합니다.
//! 성공 시 종료 코드 0, 분류된 실패는 모두 2입니다. 취소되거나 실패한
//! 실행은 부분 문서를 출력하지 않습니다.

mod cli;
mod error;
mod output;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use aibom_core::config::AibomConfig;
use aibom_core::error::AibomError;
use aibom_pipeline::{BomPipeline, bom};

use crate::cli::Cli;
use crate::error::CliError;

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => {}
        Err(err) => {
            // 분류된 에러 메시지는 문서 대신 stdout으로 나간다
            println!("{err}");
            std::process::exit(err.exit_code());
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    // 게이트 검사는 어떤 네트워크 호출보다도 먼저다
    ensure_gate(cli.experimental)?;

    let config = AibomConfig::load_or_default(&cli.config)?;
    init_tracing(cli.debug, &config.general.log_level);
    debug!(config = %cli.config.display(), api = %config.api.url, "configuration loaded");

    let pipeline = BomPipeline::new(&config.api);
    let document = pipeline.generate(&cli.path, cli.bundle_id.as_deref())?;
    let rendered = bom::render(&document, cli.document_format())?;
    output::print_document(&rendered)?;

    Ok(())
}

/// experimental 게이트 검사. 실패 시 원격 호출 없이 즉시 종료됩니다.
fn ensure_gate(experimental: bool) -> Result<(), CliError> {
    if experimental {
        Ok(())
    } else {
        Err(AibomError::GateNotEnabled.into())
    }
}

/// stderr 기반 tracing 구독자를 초기화합니다.
///
/// 우선순위: `AIBOM_LOG` 환경변수 > `-d` 플래그 > 설정 파일의 log_level.
fn init_tracing(debug: bool, config_level: &str) {
    let default_level = if debug { "debug" } else { config_level };
    let filter = EnvFilter::try_from_env("AIBOM_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
