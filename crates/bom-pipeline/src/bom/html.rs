//! 자체 완결형 HTML 리포트 렌더링
//!
//! 외부 리소스 없이 열 수 있는 단일 HTML 문서를 만듭니다. 문서에는 검증
//! 도구가 확인하는 CycloneDX 스키마 URI가 리터럴로 포함됩니다.

use std::fmt::Write;

use super::{BOM_SCHEMA_URL, BOM_SPEC_VERSION, Bom};

/// BOM을 HTML 리포트 문자열로 렌더링합니다.
pub fn render(bom: &Bom) -> String {
    let mut body = String::new();
    if bom.components.is_empty() {
        body.push_str("<p class=\"empty\">No AI components were found in this project.</p>\n");
    } else {
        body.push_str("<table>\n<thead><tr><th>Type</th><th>Name</th><th>Version</th><th>Package URL</th></tr></thead>\n<tbody>\n");
        for component in &bom.components {
            let _ = writeln!(
                body,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(component.component_type.as_cyclonedx()),
                escape(&component.name),
                escape(component.version.as_deref().unwrap_or("-")),
                escape(component.purl.as_deref().unwrap_or("-")),
            );
        }
        body.push_str("</tbody>\n</table>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>AI Bill of Materials</title>
<style>
body {{ font-family: sans-serif; margin: 2rem auto; max-width: 60rem; color: #1c1c1c; }}
h1 {{ font-size: 1.4rem; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }}
th {{ background: #f2f2f2; }}
.meta {{ color: #555; font-size: 0.85rem; }}
.empty {{ color: #555; font-style: italic; }}
</style>
</head>
<body>
<h1>AI Bill of Materials</h1>
<p class="meta">CycloneDX {spec_version} &mdash; <a href="{schema}">{schema}</a></p>
<p class="meta">Serial: {serial} &middot; Generated: {timestamp} &middot; Components: {count}</p>
{body}</body>
</html>
"#,
        spec_version = BOM_SPEC_VERSION,
        schema = BOM_SCHEMA_URL,
        serial = escape(&bom.serial_number),
        timestamp = escape(&bom.timestamp),
        count = bom.components.len(),
        body = body,
    )
}

/// HTML 특수 문자를 이스케이프합니다.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
