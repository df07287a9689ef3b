use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use std::{fs, thread};
use tempfile::TempDir;

/// Endpoint that refuses connections
pub const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

/// Isolated config/data directories for one spawned binary
pub struct TestDirs {
    pub temp_dir: TempDir,
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl TestDirs {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config_dir = temp_dir.path().join("config");
        let data_dir = temp_dir.path().join("data");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");
        fs::create_dir_all(&data_dir).expect("Failed to create data dir");
        Self {
            temp_dir,
            config_dir,
            data_dir,
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join("context-explainer").join("config.json")
    }

    pub fn history_path(&self) -> PathBuf {
        self.config_dir.join("context-explainer").join("history.log")
    }

    pub fn write_settings(&self, settings: serde_json::Value) {
        let path = self.settings_path();
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create settings dir");
        fs::write(&path, settings.to_string()).expect("Failed to write settings");
    }

    /// Command for the binary with XDG dirs pointed at the temp dir
    pub fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_context-explainer"));
        command
            .env("XDG_CONFIG_HOME", &self.config_dir)
            .env("XDG_DATA_HOME", &self.data_dir)
            .env_remove("RUST_LOG");
        command
    }
}

/// A relay daemon running on a socket inside its own temp dir
pub struct TestContext {
    pub dirs: TestDirs,
    pub child: Child,
    pub socket_path: PathBuf,
}

impl TestContext {
    /// Spawn the daemon, optionally with a settings file written beforehand
    pub fn new(settings: Option<serde_json::Value>) -> Self {
        let dirs = TestDirs::new();
        if let Some(settings) = settings {
            dirs.write_settings(settings);
        }

        let socket_path = dirs.temp_dir.path().join("relay.sock");

        let child = dirs
            .command()
            .arg("serve")
            .arg("--socket")
            .arg(&socket_path)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .expect("Failed to spawn relay daemon");

        let ctx = TestContext {
            dirs,
            child,
            socket_path,
        };

        ctx.wait_for_socket();
        ctx
    }

    /// Daemon whose Ollama endpoint is `endpoint`
    pub fn with_ollama(endpoint: &str) -> Self {
        Self::new(Some(serde_json::json!({
            "llmProvider": "ollama",
            "ollamaEndpoint": endpoint,
            "ollamaModel": "llama2"
        })))
    }

    fn wait_for_socket(&self) {
        let start = std::time::Instant::now();
        while start.elapsed() < Duration::from_secs(10) {
            if self.socket_path.exists() {
                return;
            }
            thread::sleep(Duration::from_millis(50));
        }
        panic!("Timed out waiting for socket at {:?}", self.socket_path);
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
