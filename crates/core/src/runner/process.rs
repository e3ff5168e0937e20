//! Child-process runner for chdman.

use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use super::config::RunnerConfig;
use super::error::RunnerError;
use super::history::OutputHistory;
use super::traits::{LineSink, ToolRunner};
use super::types::{ExecutableLocation, OutputLine};

/// Package-manager install directories searched before the inherited `PATH`.
pub const EXTRA_SEARCH_DIRS: [&str; 2] = ["/opt/homebrew/bin", "/usr/local/bin"];

const FALLBACK_SEARCH_PATH: &str = "/usr/bin:/bin";

/// Runs chdman as a child process and streams its output.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    config: RunnerConfig,
}

impl ProcessRunner {
    /// Creates a runner with the given configuration.
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Creates a runner with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(RunnerConfig::default())
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    async fn run_process(
        &self,
        executable: &ExecutableLocation,
        args: &[String],
        on_line: LineSink<'_>,
    ) -> Result<(), RunnerError> {
        check_executable(executable.path())?;

        let start = Instant::now();
        debug!(executable = %executable.path().display(), ?args, "Launching chdman");

        let mut child = Command::new(executable.path())
            .args(args)
            .env("PATH", search_path(std::env::var_os("PATH").as_deref()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(RunnerError::Spawn)?;

        // Both readers feed one consumer, which owns the history and the sink.
        let (tx, mut rx) = mpsc::unbounded_channel::<Vec<u8>>();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(stdout, tx.clone(), self.config.read_buffer_bytes));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(stderr, tx.clone(), self.config.read_buffer_bytes));
        }
        drop(tx);

        let mut collector = LineCollector::new();
        let mut streams_open = true;

        let status = loop {
            tokio::select! {
                chunk = rx.recv(), if streams_open => match chunk {
                    Some(bytes) => collector.ingest(&bytes, &mut *on_line),
                    None => streams_open = false,
                },
                status = child.wait() => break status,
            }
        };

        if streams_open {
            let grace = Duration::from_millis(self.config.drain_grace_ms);
            let drained = timeout(grace, async {
                while let Some(bytes) = rx.recv().await {
                    collector.ingest(&bytes, &mut *on_line);
                }
            })
            .await;
            if drained.is_err() {
                debug!("Output streams still open after exit, detaching readers");
            }
        }
        for reader in &readers {
            reader.abort();
        }

        let status = status?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        if status.success() {
            info!(
                elapsed_ms,
                lines = collector.history.total_lines(),
                skipped_chunks = collector.skipped_chunks,
                "chdman finished successfully"
            );
            return Ok(());
        }

        let code = status.code().unwrap_or(-1);
        warn!(
            code,
            elapsed_ms,
            lines = collector.history.total_lines(),
            skipped_chunks = collector.skipped_chunks,
            "chdman exited with failure"
        );
        Err(RunnerError::exited(code, collector.history.into_tail()))
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(
        &self,
        executable: &ExecutableLocation,
        args: &[String],
        on_line: LineSink<'_>,
    ) -> Result<(), RunnerError> {
        self.run_process(executable, args, on_line).await
    }
}

/// Accumulates decoded lines into the history and forwards them to the sink.
struct LineCollector {
    history: OutputHistory,
    skipped_chunks: u64,
}

impl LineCollector {
    fn new() -> Self {
        Self {
            history: OutputHistory::default(),
            skipped_chunks: 0,
        }
    }

    fn ingest(&mut self, chunk: &[u8], on_line: LineSink<'_>) {
        let text = match std::str::from_utf8(chunk) {
            Ok(text) => text,
            Err(e) => {
                self.skipped_chunks += 1;
                debug!(bytes = chunk.len(), error = %e, "Dropping undecodable output chunk");
                return;
            }
        };

        for line in split_lines(text) {
            self.history.push(line);
            on_line(OutputLine::new(line));
        }
    }
}

/// Splits a decoded chunk into lines.
///
/// A chunk ending in `\n` yields a trailing empty line. Bare `\r` separates
/// in-place progress redraws; `\r\n` counts as a single terminator.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').flat_map(|line| {
        let line = line.strip_suffix('\r').unwrap_or(line);
        line.split('\r')
    })
}

fn spawn_reader<R>(
    mut stream: R,
    tx: mpsc::UnboundedSender<Vec<u8>>,
    buffer_bytes: usize,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; buffer_bytes.max(256)];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    if tx.send(buf[..n].to_vec()).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "Output stream read failed");
                    break;
                }
            }
        }
    })
}

/// Fails with `ExecutableNotFound` unless `path` is a regular file the
/// current user may execute.
pub fn check_executable(path: &Path) -> Result<(), RunnerError> {
    let not_found = || RunnerError::ExecutableNotFound {
        path: path.to_path_buf(),
    };
    let meta = std::fs::metadata(path).map_err(|_| not_found())?;
    if meta.is_file() && user_may_execute(path) {
        Ok(())
    } else {
        Err(not_found())
    }
}

#[cfg(unix)]
fn user_may_execute(path: &Path) -> bool {
    use rustix::fs::{access, Access};
    access(path, Access::EXEC_OK).is_ok()
}

#[cfg(not(unix))]
fn user_may_execute(_path: &Path) -> bool {
    true
}

/// Builds the child's `PATH`: the extra install directories, then `existing`.
pub fn search_path(existing: Option<&OsStr>) -> OsString {
    let mut path = OsString::from(EXTRA_SEARCH_DIRS.join(":"));
    path.push(":");
    match existing {
        Some(existing) if !existing.is_empty() => path.push(existing),
        _ => path.push(FALLBACK_SEARCH_PATH),
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::DEFAULT_HISTORY_LINES;
    use std::sync::{Arc, Mutex};

    fn split(text: &str) -> Vec<&str> {
        split_lines(text).collect()
    }

    #[test]
    fn test_split_lines_trailing_terminator() {
        assert_eq!(split("a\nb\n"), vec!["a", "b", ""]);
        assert_eq!(split("a\nb"), vec!["a", "b"]);
        assert_eq!(split("a\r\nb\r\n"), vec!["a", "b", ""]);
    }

    #[test]
    fn test_split_lines_carriage_return_redraws() {
        assert_eq!(
            split("Compressing, 5% complete...\rCompressing, 9% complete...\r"),
            vec!["Compressing, 5% complete...", "Compressing, 9% complete..."]
        );
    }

    #[test]
    fn test_search_path_prepends_install_dirs() {
        let path = search_path(Some(OsStr::new("/usr/bin:/home/me/bin")));
        assert_eq!(
            path,
            OsString::from("/opt/homebrew/bin:/usr/local/bin:/usr/bin:/home/me/bin")
        );
    }

    #[test]
    fn test_search_path_fallback() {
        let expected = OsString::from("/opt/homebrew/bin:/usr/local/bin:/usr/bin:/bin");
        assert_eq!(search_path(None), expected);
        assert_eq!(search_path(Some(OsStr::new(""))), expected);
    }

    #[test]
    fn test_collector_drops_undecodable_chunk() {
        let mut collector = LineCollector::new();
        let mut seen = Vec::new();
        collector.ingest(&[0xff, 0xfe, b'\n'], &mut |line: OutputLine| seen.push(line));
        assert!(seen.is_empty());
        assert!(collector.history.is_empty());
        assert_eq!(collector.skipped_chunks, 1);

        collector.ingest(b"42% complete\n", &mut |line: OutputLine| seen.push(line));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].progress, Some(0.42));
        assert_eq!(seen[1].text, "");
        assert_eq!(collector.history.tail(), vec!["42% complete", ""]);
    }

    #[test]
    fn test_check_executable_missing() {
        let err = check_executable(Path::new("/definitely/not/here/chdman")).unwrap_err();
        assert!(matches!(err, RunnerError::ExecutableNotFound { .. }));
    }

    #[test]
    fn test_check_executable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_executable(dir.path()).unwrap_err();
        assert!(matches!(err, RunnerError::ExecutableNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_check_executable_requires_mode_bit() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chdman");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        assert!(check_executable(&path).is_err());

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        assert!(check_executable(&path).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_check_executable_ignores_bits_of_other_classes() {
        use std::os::unix::fs::PermissionsExt;

        // Root may execute anything with an execute bit.
        if rustix::process::getuid().is_root() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chdman");
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        // Owner (us) has no execute bit; group and others do.
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o655)).unwrap();

        let err = check_executable(&path).unwrap_err();
        assert!(matches!(err, RunnerError::ExecutableNotFound { .. }));
        assert!(err.hint().is_some());
    }

    // The tests below run /bin/sh directly so no freshly written file is
    // executed while other test threads fork.

    fn sh() -> ExecutableLocation {
        ExecutableLocation::verified("/bin/sh")
    }

    fn script(body: &str) -> Vec<String> {
        vec!["-c".to_string(), body.to_string()]
    }

    async fn run_capture(body: &str) -> (Result<(), RunnerError>, Vec<OutputLine>) {
        let runner = ProcessRunner::new(RunnerConfig::default().with_drain_grace(2000));
        let mut lines = Vec::new();
        let result = runner
            .run(&sh(), &script(body), &mut |line: OutputLine| lines.push(line))
            .await;
        (result, lines)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_success_reports_progress() {
        let (result, lines) =
            run_capture("echo 'Compressing, 10% complete'; echo 'Compressing, 55% complete'").await;
        assert!(result.is_ok());
        let progress: Vec<f64> = lines.iter().filter_map(|l| l.progress).collect();
        assert_eq!(progress, vec![0.10, 0.55]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_both_streams() {
        let (result, lines) = run_capture("echo from-stdout; echo from-stderr 1>&2").await;
        assert!(result.is_ok());
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert!(texts.contains(&"from-stdout"));
        assert!(texts.contains(&"from-stderr"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_failure_carries_tail() {
        let (result, _) = run_capture(
            "for i in 1 2 3 4 5 6 7; do echo \"line $i\"; done; echo 'Error: bad input'; exit 3",
        )
        .await;
        match result {
            Err(RunnerError::ExitedNonZero { code, tail }) => {
                assert_eq!(code, 3);
                assert!(!tail.is_empty());
                assert!(tail.len() <= 5);
                assert!(tail.iter().any(|l| l == "Error: bad input"));
            }
            other => panic!("expected ExitedNonZero, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_failure_tail_is_five_lines() {
        let (result, lines) = run_capture(
            "for i in 1 2 3 4 5 6 7 8 9 10; do echo \"line$i\"; done; exit 3",
        )
        .await;
        assert!(lines.len() > DEFAULT_HISTORY_LINES);
        match result {
            Err(RunnerError::ExitedNonZero { code, tail }) => {
                assert_eq!(code, 3);
                assert_eq!(tail.len(), DEFAULT_HISTORY_LINES);
                assert!(tail.iter().any(|l| l == "line10"));
                assert!(!tail.iter().any(|l| l == "line1"));
            }
            other => panic!("expected ExitedNonZero, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_silent_failure_message() {
        let (result, lines) = run_capture("exit 7").await;
        assert!(lines.is_empty());
        let err = result.unwrap_err();
        assert_eq!(err.exit_code(), Some(7));
        assert_eq!(err.to_string(), "chdman exited with code 7");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_prepends_search_path() {
        let (result, lines) = run_capture("echo \"$PATH\"").await;
        assert!(result.is_ok());
        let reported = lines
            .iter()
            .find(|l| !l.text.is_empty())
            .map(|l| l.text.clone())
            .unwrap();
        assert!(reported.starts_with("/opt/homebrew/bin:/usr/local/bin:"));
        if let Some(parent) = std::env::var_os("PATH").filter(|p| !p.is_empty()) {
            assert!(reported.ends_with(parent.to_str().unwrap()));
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_carriage_return_progress() {
        let (result, lines) = run_capture("printf '20%%\\r40%%\\r'; printf 'done\\n'").await;
        assert!(result.is_ok());
        let progress: Vec<f64> = lines.iter().filter_map(|l| l.progress).collect();
        assert_eq!(progress, vec![0.20, 0.40]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_binary_output_does_not_fail_run() {
        let (result, lines) = run_capture("printf '\\377\\376\\375'").await;
        assert!(result.is_ok());
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn test_run_missing_executable_never_calls_back() {
        let runner = ProcessRunner::with_defaults();
        let calls = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&calls);
        let result = runner
            .run(
                &ExecutableLocation::unverified("/no/such/chdman"),
                &["createcd".to_string()],
                &mut move |_line: OutputLine| *counter.lock().unwrap() += 1,
            )
            .await;
        assert!(matches!(result, Err(RunnerError::ExecutableNotFound { .. })));
        assert_eq!(*calls.lock().unwrap(), 0);
    }
}
