use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::LazyLock;
use std::time::Duration;

use tempfile::TempDir;

// Build once per test binary; every TestServer reuses the same artifact.
static RELEASE_BINARY: LazyLock<PathBuf> = LazyLock::new(|| {
    let status = Command::new("cargo")
        .args(["build", "--release"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("build release binary");
    assert!(status.success(), "Failed to build release binary");
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/release/fangate")
});

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr").port()
}

/// A server process on its own port with a throwaway data directory. The
/// process is killed and the directory removed on drop.
pub struct TestServer {
    base_url: String,
    process: Option<Child>,
    _data_dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        let binary = &*RELEASE_BINARY;
        let data_dir = TempDir::new().expect("create temp dir");
        let port = free_port();
        let base_url = format!("http://127.0.0.1:{port}");

        let process = Command::new(binary)
            .arg("serve")
            .args(["--host", "127.0.0.1"])
            .args(["--port", &port.to_string()])
            .arg("--data-dir")
            .arg(data_dir.path())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("start server");

        let server = Self {
            base_url,
            process: Some(process),
            _data_dir: data_dir,
        };
        server.wait_until_ready().await;
        server
    }

    /// Absolute URL for an API path, e.g. `server.url("/api/v1/videos")`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn wait_until_ready(&self) {
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client.get(self.url("/health")).send().await.is_ok() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        panic!("Server did not become ready at {}", self.base_url);
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(mut process) = self.process.take() {
            let _ = process.kill();
            let _ = process.wait();
        }
    }
}
