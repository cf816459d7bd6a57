// src/exec/task_runner.rs

//! Runs one shell command with a prompt on stdin and collects its stdout.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Maximum number of stderr characters carried into an error message.
const STDERR_TAIL_CHARS: usize = 2000;

/// Run `cmd` through the platform shell.
///
/// - `input` is written to the child's stdin, which is then closed.
/// - `envs` are added to the child's environment.
/// - On exit status 0 the trimmed stdout is returned; otherwise the error
///   carries the exit code and the tail of stderr.
///
/// The child is killed if the returned future is dropped (e.g. by a timeout).
pub async fn run_shell_command(
    label: &str,
    cmd: &str,
    input: String,
    envs: &[(&str, &str)],
) -> Result<String> {
    info!(label, cmd = %cmd, "starting command");

    // Build a shell command appropriate for the platform.
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    };

    command
        .envs(envs.iter().copied())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning process for {label}"))?;

    // Feed stdin from a separate task so a chatty child can't deadlock us
    // by filling its stdout pipe before reading all of its input.
    if let Some(mut stdin) = child.stdin.take() {
        let label = label.to_string();
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                debug!(label = %label, error = %e, "child closed stdin early");
            }
        });
    }

    let output = child
        .wait_with_output()
        .await
        .with_context(|| format!("waiting for process of {label}"))?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines() {
        debug!(label, "stderr: {}", line);
    }

    let code = output.status.code().unwrap_or(-1);
    info!(label, exit_code = code, success = output.status.success(), "command exited");

    if !output.status.success() {
        let tail = stderr_tail(&stderr);
        warn!(label, exit_code = code, "command failed");
        if tail.is_empty() {
            bail!("command exited with status {code}");
        }
        bail!("command exited with status {code}: {tail}");
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let count = trimmed.chars().count();
    if count <= STDERR_TAIL_CHARS {
        return trimmed.to_string();
    }
    trimmed.chars().skip(count - STDERR_TAIL_CHARS).collect()
}
