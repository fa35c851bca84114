//! CycloneDX 1.6 JSON 직렬화
//!
//! [CycloneDX](https://cyclonedx.org/) 1.6 사양에 맞는 JSON 문서를
//! 생성합니다. `$schema`, `bomFormat`, `specVersion`은 고정 값이며
//! 컴포넌트 내용과 무관하게 항상 포함됩니다.

use serde::Serialize;

use super::{BOM_FORMAT, BOM_SCHEMA_URL, BOM_SPEC_VERSION, Bom, TOOL_NAME};
use crate::error::PipelineError;

/// CycloneDX 1.6 BOM 루트 구조
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxBom<'a> {
    #[serde(rename = "$schema")]
    schema: &'static str,
    bom_format: &'static str,
    spec_version: &'static str,
    serial_number: &'a str,
    version: u32,
    metadata: CycloneDxMetadata<'a>,
    components: Vec<CycloneDxComponent<'a>>,
}

/// CycloneDX 메타데이터
#[derive(Serialize)]
struct CycloneDxMetadata<'a> {
    timestamp: &'a str,
    tools: CycloneDxTools,
}

/// CycloneDX 1.6 도구 목록 (components 형태)
#[derive(Serialize)]
struct CycloneDxTools {
    components: Vec<CycloneDxToolComponent>,
}

/// 도구 컴포넌트 항목
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxToolComponent {
    #[serde(rename = "type")]
    component_type: &'static str,
    name: &'static str,
    version: &'static str,
}

/// CycloneDX 컴포넌트
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CycloneDxComponent<'a> {
    #[serde(rename = "type")]
    component_type: &'static str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purl: Option<&'a str>,
}

/// BOM을 CycloneDX 1.6 JSON 문자열로 직렬화합니다.
pub fn render(bom: &Bom) -> Result<String, PipelineError> {
    let components: Vec<CycloneDxComponent<'_>> = bom
        .components
        .iter()
        .map(|c| CycloneDxComponent {
            component_type: c.component_type.as_cyclonedx(),
            name: &c.name,
            version: c.version.as_deref(),
            purl: c.purl.as_deref(),
        })
        .collect();

    let doc = CycloneDxBom {
        schema: BOM_SCHEMA_URL,
        bom_format: BOM_FORMAT,
        spec_version: BOM_SPEC_VERSION,
        serial_number: &bom.serial_number,
        version: 1,
        metadata: CycloneDxMetadata {
            timestamp: &bom.timestamp,
            tools: CycloneDxTools {
                components: vec![CycloneDxToolComponent {
                    component_type: "application",
                    name: TOOL_NAME,
                    version: env!("CARGO_PKG_VERSION"),
                }],
            },
        },
        components,
    };

    serde_json::to_string_pretty(&doc)
        .map_err(|e| PipelineError::Render(format!("CycloneDX serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::{Component, ComponentType};

    fn sample_bom() -> Bom {
        Bom::new(vec![
            Component {
                component_type: ComponentType::MachineLearningModel,
                name: "gpt2".to_owned(),
                version: Some("1.0".to_owned()),
                purl: Some("pkg:huggingface/gpt2@1.0".to_owned()),
            },
            Component {
                component_type: ComponentType::Framework,
                name: "torch".to_owned(),
                version: None,
                purl: None,
            },
        ])
    }

    #[test]
    fn render_contains_fixed_schema_fields() {
        let json = render(&sample_bom()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["$schema"], BOM_SCHEMA_URL);
        assert_eq!(parsed["bomFormat"], "CycloneDX");
        assert_eq!(parsed["specVersion"], "1.6");
        assert!(parsed["serialNumber"]
            .as_str()
            .unwrap()
            .starts_with("urn:uuid:"));
    }

    #[test]
    fn render_contains_tool_identity() {
        let json = render(&sample_bom()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let tool = &parsed["metadata"]["tools"]["components"][0];
        assert_eq!(tool["name"], "aibom");
        assert_eq!(tool["type"], "application");
    }

    #[test]
    fn render_maps_component_fields() {
        let json = render(&sample_bom()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let components = parsed["components"].as_array().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(components[0]["type"], "machine-learning-model");
        assert_eq!(components[0]["name"], "gpt2");
        assert_eq!(components[0]["purl"], "pkg:huggingface/gpt2@1.0");
        // 없는 버전/purl 필드는 생략된다
        assert!(components[1].get("version").is_none());
        assert!(components[1].get("purl").is_none());
    }

    #[test]
    fn render_empty_bom_keeps_schema_fields() {
        let json = render(&Bom::new(vec![])).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["specVersion"], "1.6");
        assert_eq!(parsed["components"].as_array().unwrap().len(), 0);
    }
}
