//! Shared test fixtures

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// Paragraph lengths of [`article`]: 100, 50 and 150 characters.
pub const ARTICLE_LENGTHS: [usize; 3] = [100, 50, 150];

/// Article with three paragraphs of known length.
///
/// Over 30 seconds the paragraphs end at 10s, 15s and 30s.
pub fn article() -> String {
    ARTICLE_LENGTHS
        .iter()
        .zip(['a', 'b', 'c'])
        .map(|(&len, c)| c.to_string().repeat(len))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Temporary directory holding an article, a state file and a config file.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("article.txt"), article()).expect("Failed to write article");
        Self { dir }
    }

    pub fn article_path(&self) -> PathBuf {
        self.dir.path().join("article.txt")
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("state.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write config");
    }

    /// Command for the binary with config and store pointed into the workspace.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_readalong"));
        cmd.env("READALONG_CONFIG", self.config_path())
            .env_remove("RUST_LOG")
            .arg("--store")
            .arg(self.store_path());
        cmd
    }

    /// Run with `args`, returning (stdout, stderr, exit code).
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = self
            .command()
            .args(args)
            .output()
            .expect("Failed to execute readalong");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        (stdout, stderr, exit_code)
    }

    pub fn article_arg(&self) -> String {
        self.article_path().to_string_lossy().to_string()
    }
}
