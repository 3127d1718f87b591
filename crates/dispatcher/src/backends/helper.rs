//! Tier 2: persistent helper process.
//!
//! Every action becomes one [`HelperCommand`] line on the helper's stdin.
//! Delivery is fire-and-forget: a successful write reports
//! [`ActionOutcome::Forwarded`]. The helper's stdout and stderr are relayed
//! into the log.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use gestureflow_common::config::ExternalCommand;
use gestureflow_common::error::{GestureflowError, GestureflowResult};
use gestureflow_protocol::helper::HelperCommand;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Mutex;

use crate::action::{ActionClass, TargetAction};
use crate::executor::{ActionExecutor, ActionOutcome, Tier};

/// Grace period for the helper to exit after its stdin closes.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub struct HelperExecutor {
    name: String,
    stdin: Mutex<Option<ChildStdin>>,
    child: Mutex<Child>,
    written: AtomicU64,
}

impl HelperExecutor {
    /// Start the helper. A program that cannot be spawned leaves the tier
    /// unavailable.
    pub fn spawn(command: &ExternalCommand) -> GestureflowResult<Self> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                GestureflowError::backend_unavailable(format!(
                    "failed to start helper {}: {e}",
                    command.program
                ))
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GestureflowError::backend_unavailable("helper has no stdin pipe"))?;
        let name = format!("helper:{}", command.program);

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(relay_output(name.clone(), stdout, false));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(relay_output(name.clone(), stderr, true));
        }

        tracing::info!(helper = %name, pid = ?child.id(), "Persistent helper started");

        Ok(Self {
            name,
            stdin: Mutex::new(Some(stdin)),
            child: Mutex::new(child),
            written: AtomicU64::new(0),
        })
    }

    /// Commands written so far.
    pub fn written(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Write one command line. Concurrent callers are serialized so lines
    /// never interleave.
    pub async fn send_command(&self, command: &HelperCommand) -> GestureflowResult<()> {
        let line = command.encode_line()?;
        let mut guard = self.stdin.lock().await;
        let Some(stdin) = guard.as_mut() else {
            return Err(GestureflowError::execution(format!(
                "{} is no longer accepting commands",
                self.name
            )));
        };

        let result = async {
            stdin.write_all(line.as_bytes()).await?;
            stdin.flush().await
        }
        .await;

        if let Err(e) = result {
            *guard = None;
            return Err(GestureflowError::execution(format!(
                "write to {} failed: {e}",
                self.name
            )));
        }
        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[async_trait]
impl ActionExecutor for HelperExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn tier(&self) -> Tier {
        Tier::Helper
    }

    fn supports(&self, _class: ActionClass) -> bool {
        true
    }

    async fn execute(&self, action: &TargetAction) -> GestureflowResult<ActionOutcome> {
        self.send_command(&action.helper_command()).await?;
        Ok(ActionOutcome::Forwarded)
    }

    async fn shutdown(&self) {
        // Closing stdin is the helper's signal to exit.
        self.stdin.lock().await.take();

        let mut child = self.child.lock().await;
        match tokio::time::timeout(SHUTDOWN_GRACE, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(helper = %self.name, %status, "Helper exited");
            }
            Ok(Err(e)) => {
                tracing::warn!(helper = %self.name, error = %e, "Failed to wait for helper");
            }
            Err(_) => {
                tracing::warn!(helper = %self.name, "Helper did not exit, killing it");
                if let Err(e) = child.kill().await {
                    tracing::warn!(helper = %self.name, error = %e, "Failed to kill helper");
                }
            }
        }
    }
}

async fn relay_output<R>(name: String, stream: R, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if is_stderr => tracing::warn!(helper = %name, "{line}"),
            Ok(Some(line)) => tracing::info!(helper = %name, "{line}"),
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(helper = %name, error = %e, "Helper output closed");
                break;
            }
        }
    }
}
