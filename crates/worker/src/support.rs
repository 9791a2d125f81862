//! Shared test fixtures: a scripted network and a small manifest.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use stratus_client::Network;
use stratus_core::{AssetManifest, Error, Request, ResponseSnapshot};

/// Scripted network: serves exactly the URLs it was given, counts calls,
/// and fails everything else with a transport error. Urls can be
/// unplugged later to simulate going offline.
pub(crate) struct ScriptedNetwork {
    responses: Mutex<HashMap<String, ResponseSnapshot>>,
    calls: AtomicUsize,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self { responses: Mutex::new(HashMap::new()), calls: AtomicUsize::new(0) }
    }

    pub(crate) fn serve(self, url: &str, status: u16, body: &[u8]) -> Self {
        self.responses.lock().unwrap().insert(
            url.to_string(),
            ResponseSnapshot {
                status,
                content_type: Some("application/octet-stream".to_string()),
                headers: Vec::new(),
                body: body.to_vec(),
                fetched_at: chrono::Utc::now().to_rfc3339(),
            },
        );
        self
    }

    /// Drop every scripted response; subsequent fetches all fail.
    pub(crate) fn go_offline(&self) {
        self.responses.lock().unwrap().clear();
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<ResponseSnapshot, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .ok_or_else(|| Error::Network(format!("unreachable: {}", request.url)))
    }
}

/// The manifest used across handler tests.
pub(crate) fn make_manifest() -> AssetManifest {
    AssetManifest {
        cache_name: "appquiz-cache-v1".to_string(),
        origin: "https://quiz.example.com".to_string(),
        core_assets: vec!["./".to_string(), "./index.html".to_string(), "./favicon.ico".to_string()],
        external_assets: vec!["https://unpkg.com/xlsx@0.18.5/dist/xlsx.full.min.js".to_string()],
        navigation_fallback: "./index.html".to_string(),
        resource_fallback: "./favicon.ico".to_string(),
    }
}

/// Script the three core assets of [`make_manifest`].
pub(crate) fn serve_core(network: ScriptedNetwork) -> ScriptedNetwork {
    network
        .serve("https://quiz.example.com/", 200, b"root")
        .serve("https://quiz.example.com/index.html", 200, b"index")
        .serve("https://quiz.example.com/favicon.ico", 200, b"icon")
}
