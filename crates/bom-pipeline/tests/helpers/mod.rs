//! Mock analysis service for integration tests
//!
//! Runs a real HTTP endpoint on a loopback port. `MockAnalysisService::start`
//! binds the listener before it returns, so readiness is the return of the
//! start routine itself -- no shared counters or callbacks. Every received
//! request is recorded for call-sequence assertions.

use std::collections::BTreeSet;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tiny_http::{Header, Response, Server};

/// 테스트가 단언에 사용하는 수신 요청 기록
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: serde_json::Value,
}

/// Mock 서비스 동작 설정
pub struct MockBehavior {
    /// GET /filters 응답 본문
    pub filters: serde_json::Value,
    /// POST /analysis 응답 시퀀스 (상태 코드, 본문); 마지막 항목이 반복된다
    pub analysis_responses: Vec<(u16, serde_json::Value)>,
    /// create 응답이 전체 경로의 내용을 요구하는지
    pub create_requests_content: bool,
    /// 업로드를 받아도 누락 목록을 유지하는지 (수렴 실패 시나리오)
    pub never_complete_uploads: bool,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            filters: serde_json::json!({
                "configFiles": ["requirements.txt"],
                "extensions": [".py", ".ipynb", ".aibomdepgraph"],
                "autofixExtensions": [],
            }),
            analysis_responses: vec![(200, complete_analysis(sample_sarif()))],
            create_requests_content: false,
            never_complete_uploads: false,
        }
    }
}

/// COMPLETE 분석 응답 본문을 만든다.
pub fn complete_analysis(sarif: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "status": "COMPLETE", "sarif": sarif })
}

/// 모델/프레임워크 finding이 섞인 샘플 SARIF 리포트 (중복 포함).
pub fn sample_sarif() -> serde_json::Value {
    serde_json::json!({
        "runs": [{
            "results": [
                {
                    "ruleId": "aibom/framework/import",
                    "locations": [{ "physicalLocation": { "artifactLocation": { "uri": "app.py" } } }],
                    "properties": { "name": "torch", "version": "2.0.1", "purl": "pkg:pypi/torch@2.0.1" }
                },
                {
                    "ruleId": "aibom/model",
                    "locations": [{ "physicalLocation": { "artifactLocation": { "uri": "app.py" } } }],
                    "properties": { "name": "gpt2", "purl": "pkg:huggingface/gpt2" }
                },
                {
                    "ruleId": "aibom/framework/import",
                    "locations": [{ "physicalLocation": { "artifactLocation": { "uri": "train.py" } } }],
                    "properties": { "name": "torch", "version": "2.0.1" }
                }
            ]
        }]
    })
}

/// 테스트용 mock 분석 서비스 핸들
pub struct MockAnalysisService {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
}

impl MockAnalysisService {
    /// 루프백 포트에 바인드하고 처리 스레드를 시작한다.
    ///
    /// 반환 시점에 리스너가 이미 열려 있으므로 호출자는 바로 요청을 보낼 수
    /// 있다.
    pub fn start(behavior: MockBehavior) -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("failed to bind mock server"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("mock server address")
            .port();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let server_for_thread = Arc::clone(&server);
        let requests_for_thread = Arc::clone(&requests);
        let handle = std::thread::spawn(move || {
            serve(&server_for_thread, &behavior, &requests_for_thread);
        });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            requests,
            server,
            handle: Some(handle),
        }
    }

    /// 서비스 기본 URL을 반환한다.
    pub fn url(&self) -> &str {
        &self.base_url
    }

    /// 수신한 요청 전체를 반환한다.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// "METHOD:path" 형태의 호출 시퀀스를 반환한다.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{}:{}", r.method, r.url))
            .collect()
    }
}

impl Drop for MockAnalysisService {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(
    server: &Server,
    behavior: &MockBehavior,
    requests: &Mutex<Vec<RecordedRequest>>,
) {
    // 서버가 내용을 확보한 콘텐츠 해시
    let mut known_hashes: BTreeSet<String> = BTreeSet::new();
    let mut analysis_call = 0usize;

    for mut request in server.incoming_requests() {
        let method = request.method().to_string();
        let url = request.url().to_string();
        let mut body_str = String::new();
        let _ = request.as_reader().read_to_string(&mut body_str);
        let body: serde_json::Value =
            serde_json::from_str(&body_str).unwrap_or(serde_json::Value::Null);

        requests.lock().unwrap().push(RecordedRequest {
            method: method.clone(),
            url: url.clone(),
            body: body.clone(),
        });

        let (status, response_body) = route(
            behavior,
            &method,
            &url,
            &body,
            &mut known_hashes,
            &mut analysis_call,
        );

        let header = Header::from_bytes("Content-Type", "application/json")
            .expect("static header is valid");
        let response = Response::from_string(response_body.to_string())
            .with_status_code(status)
            .with_header(header);
        let _ = request.respond(response);
    }
}

fn route(
    behavior: &MockBehavior,
    method: &str,
    url: &str,
    body: &serde_json::Value,
    known_hashes: &mut BTreeSet<String>,
    analysis_call: &mut usize,
) -> (u16, serde_json::Value) {
    match (method, url) {
        ("GET", "/filters") => (200, behavior.filters.clone()),

        ("POST", "/bundle") => {
            let files = match body["files"].as_object() {
                Some(map) => map,
                None => return (400, serde_json::json!({ "error": "files required" })),
            };
            let id = bundle_id(files);
            let missing: Vec<&String> = if behavior.create_requests_content {
                files.keys().collect()
            } else {
                for hash in files.values().filter_map(|v| v.as_str()) {
                    known_hashes.insert(hash.to_owned());
                }
                Vec::new()
            };
            (
                200,
                serde_json::json!({ "bundleHash": id, "missingFiles": missing }),
            )
        }

        ("POST", "/analysis") => {
            let idx = (*analysis_call).min(behavior.analysis_responses.len() - 1);
            *analysis_call += 1;
            behavior.analysis_responses[idx].clone()
        }

        (method, url) if method == "PUT" && url.starts_with("/bundle/") => {
            let id = &url["/bundle/".len()..];
            let files = match body["files"].as_object() {
                Some(map) => map,
                None => return (400, serde_json::json!({ "error": "files required" })),
            };
            let is_upload = files.values().any(serde_json::Value::is_object);

            if is_upload {
                // 2차 호출: 내용 공급. 같은 누락 집합에 대해 같은 번들이 나온다.
                if behavior.never_complete_uploads {
                    let missing: Vec<&String> = files.keys().collect();
                    return (
                        200,
                        serde_json::json!({ "bundleHash": id, "missingFiles": missing }),
                    );
                }
                for upload in files.values() {
                    if let Some(hash) = upload["hash"].as_str() {
                        known_hashes.insert(hash.to_owned());
                    }
                }
                (
                    200,
                    serde_json::json!({ "bundleHash": id, "missingFiles": [] }),
                )
            } else {
                // 1차 호출: 확장. 모르는 해시만 누락으로 보고한다.
                let missing: Vec<&String> = files
                    .iter()
                    .filter(|(_, hash)| {
                        hash.as_str().is_none_or(|h| !known_hashes.contains(h))
                    })
                    .map(|(path, _)| path)
                    .collect();
                let new_id = bundle_id(files);
                (
                    200,
                    serde_json::json!({ "bundleHash": new_id, "missingFiles": missing }),
                )
            }
        }

        _ => (404, serde_json::json!({ "error": "not found" })),
    }
}

/// 파일 맵에서 결정적 번들 ID를 만든다.
fn bundle_id(files: &serde_json::Map<String, serde_json::Value>) -> String {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for (path, hash) in files {
        path.hash(&mut hasher);
        hash.to_string().hash(&mut hasher);
    }
    format!("bundle-{:016x}", hasher.finish())
}
