//! Shared integration-test harness for running the `shadowcue` binary.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

/// Default timeout for waiting on a line of output.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A running `run` session with piped stdin/stdout.
///
/// The child process is killed on drop via `kill_on_drop(true)`.
pub struct ShadowCueProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    lines: Lines<BufReader<ChildStdout>>,
}

impl ShadowCueProcess {
    /// Path of the built binary.
    #[must_use]
    pub fn bin() -> &'static str {
        env!("CARGO_BIN_EXE_shadowcue")
    }

    /// Runs a one-shot command to completion with stdin closed.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_command(args: &[&str]) -> Output {
        std::process::Command::new(Self::bin())
            .args(args)
            .stdin(Stdio::null())
            .env_remove("SHADOWCUE_CONFIG")
            .env_remove("SHADOWCUE_LEVEL")
            .output()
            .expect("failed to run shadowcue")
    }

    /// Starts `shadowcue run --quiet --no-speech` with extra arguments.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn_session(extra: &[&str]) -> Self {
        let mut child = Command::new(Self::bin())
            .args(["run", "--quiet", "--no-speech"])
            .args(extra)
            .env_remove("SHADOWCUE_CONFIG")
            .env_remove("SHADOWCUE_LEVEL")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn shadowcue");

        let stdin = child.stdin.take().expect("stdin not captured");
        let stdout = child.stdout.take().expect("stdout not captured");
        Self {
            child,
            stdin: Some(stdin),
            lines: BufReader::new(stdout).lines(),
        }
    }

    /// Writes one control line.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_line(&mut self, line: &str) {
        self.send_bytes(format!("{line}\n").as_bytes()).await;
    }

    /// Writes raw bytes to stdin.
    #[allow(clippy::missing_panics_doc)]
    pub async fn send_bytes(&mut self, bytes: &[u8]) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        stdin.write_all(bytes).await.expect("failed to write to stdin");
        stdin.flush().await.expect("failed to flush stdin");
    }

    /// Reads output until a line contains `needle` and returns it.
    ///
    /// Panics on EOF or if nothing matches within [`DEFAULT_TIMEOUT`].
    #[allow(clippy::missing_panics_doc)]
    pub async fn expect_line(&mut self, needle: &str) -> String {
        let result = tokio::time::timeout(DEFAULT_TIMEOUT, async {
            loop {
                let line = self
                    .lines
                    .next_line()
                    .await
                    .expect("read_line I/O error")
                    .unwrap_or_else(|| panic!("unexpected EOF waiting for '{needle}'"));
                if line.contains(needle) {
                    return line;
                }
            }
        })
        .await;
        result.unwrap_or_else(|_| panic!("timed out waiting for '{needle}'"))
    }

    /// Closes stdin and waits for the process to exit.
    #[allow(clippy::missing_panics_doc)]
    pub async fn finish(mut self) -> ExitStatus {
        drop(self.stdin.take());
        self.wait().await
    }

    /// Waits for the process to exit without touching stdin.
    #[allow(clippy::missing_panics_doc)]
    pub async fn wait(&mut self) -> ExitStatus {
        tokio::time::timeout(DEFAULT_TIMEOUT, self.child.wait())
            .await
            .expect("timed out waiting for exit")
            .expect("failed to wait on child")
    }

    /// Returns the path to a test fixture.
    #[must_use]
    pub fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    /// Fixture path as `&str` for argument lists.
    #[must_use]
    pub fn fixture_arg(path: &Path) -> &str {
        path.to_str().expect("non-UTF-8 fixture path")
    }
}
