//! Node process supervision.
//!
//! # Responsibilities
//! - Spawn the node binary in development / ephemeral storage mode
//! - Hand out its stdout and stderr exactly once
//! - Terminate it exactly once, tolerating a process that is already gone

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio::time::timeout;

use crate::config::NodeConfig;
use crate::process::types::{ProcessError, ProcessResult};

/// Fixed arguments: development chain with temporary storage.
pub const NODE_ARGS: [&str; 2] = ["--dev", "--tmp"];

/// A readable output stream of the supervised process.
pub type OutputStream = Box<dyn AsyncRead + Send + Unpin>;

/// The two output streams of a supervised process.
#[derive(Default)]
pub struct NodeOutput {
    pub stdout: Option<OutputStream>,
    pub stderr: Option<OutputStream>,
}

/// Something that can start the node.
pub trait Launch {
    type Handle: Supervised;

    fn launch(&self) -> ProcessResult<Self::Handle>;
}

/// A running node the runner owns.
pub trait Supervised {
    /// Take the output streams. Later calls return empty output.
    fn take_output(&mut self) -> NodeOutput;

    /// Stop the process. Idempotent; a process that is already gone is success.
    fn terminate(&mut self) -> impl Future<Output = ProcessResult<()>>;
}

/// Launches the node binary described by [`NodeConfig`].
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    binary: PathBuf,
    rust_log: String,
    grace: Duration,
}

impl ProcessSupervisor {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            binary: PathBuf::from(&config.binary),
            rust_log: config.rust_log.clone(),
            grace: Duration::from_secs(config.shutdown_grace_secs),
        }
    }
}

impl Launch for ProcessSupervisor {
    type Handle = ProcessHandle;

    fn launch(&self) -> ProcessResult<ProcessHandle> {
        let child = Command::new(&self.binary)
            .args(NODE_ARGS)
            .env("RUST_LOG", &self.rust_log)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        tracing::info!(
            binary = %self.binary.display(),
            pid = child.id(),
            args = ?NODE_ARGS,
            "Node process launched"
        );

        Ok(ProcessHandle {
            child: Some(child),
            grace: self.grace,
        })
    }
}

/// Exclusive owner of the node process.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Option<Child>,
    grace: Duration,
}

impl ProcessHandle {
    /// OS process id, while the process is still owned.
    pub fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }
}

impl Supervised for ProcessHandle {
    fn take_output(&mut self) -> NodeOutput {
        let Some(child) = self.child.as_mut() else {
            return NodeOutput::default();
        };
        NodeOutput {
            stdout: child.stdout.take().map(|s| Box::new(s) as OutputStream),
            stderr: child.stderr.take().map(|s| Box::new(s) as OutputStream),
        }
    }

    async fn terminate(&mut self) -> ProcessResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };

        // `id()` is None once the child has been reaped.
        let Some(pid) = child.id() else {
            tracing::debug!("Node process already reaped");
            return Ok(());
        };

        if !interrupt(&mut child, pid)? {
            tracing::debug!(pid, "Node process already gone");
            return Ok(());
        }

        match timeout(self.grace, child.wait()).await {
            Ok(Ok(status)) => {
                tracing::info!(pid, %status, "Node process exited");
                Ok(())
            }
            Ok(Err(e)) => Err(ProcessError::Wait(e)),
            Err(_) => {
                tracing::warn!(
                    pid,
                    grace_secs = self.grace.as_secs(),
                    "Node ignored interrupt, killing"
                );
                match child.kill().await {
                    Ok(()) => Ok(()),
                    // Exited between the timeout and the kill.
                    Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
                    Err(e) => Err(ProcessError::Kill(e)),
                }
            }
        }
    }
}

/// Send SIGINT. Returns `false` if the process no longer exists.
#[cfg(unix)]
fn interrupt(_child: &mut Child, pid: u32) -> ProcessResult<bool> {
    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| ProcessError::Signal(Errno::EINVAL))?;
    match kill(Pid::from_raw(raw), Signal::SIGINT) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(errno) => Err(ProcessError::Signal(errno)),
    }
}

#[cfg(not(unix))]
fn interrupt(child: &mut Child, _pid: u32) -> ProcessResult<bool> {
    match child.start_kill() {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(false),
        Err(e) => Err(ProcessError::Kill(e)),
    }
}
