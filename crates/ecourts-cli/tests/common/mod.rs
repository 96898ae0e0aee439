use assert_cmd::Command;
use chrono::Local;
use ecourts_portal::fake_portal::FakePortal;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::runtime::Runtime;

pub struct TestEnv {
    _tmp: TempDir,
    _runtime: Runtime,
    pub portal: FakePortal,
    pub out: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let out = tmp.path().join("output");

        // Multi-threaded so the fake portal keeps serving while the test
        // thread blocks on the child process.
        let runtime = Runtime::new().expect("start tokio runtime");
        let portal = runtime
            .block_on(FakePortal::spawn(Local::now().date_naive()))
            .expect("spawn fake portal");

        Self {
            _tmp: tmp,
            _runtime: runtime,
            portal,
            out,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("ecourts").expect("binary built");
        cmd.env("ECOURTS_BASE_URL", &self.portal.base_url)
            .env_remove("ECOURTS_STATE")
            .env_remove("ECOURTS_DISTRICT")
            .env_remove("ECOURTS_TIMEOUT")
            .env("RUST_LOG", "warn")
            .arg("--output-dir")
            .arg(&self.out);
        cmd
    }

    pub fn files(&self) -> Vec<String> {
        list(&self.out)
    }
}

fn list(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
