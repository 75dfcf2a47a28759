//! Service supervision: restart the streaming unit through the service manager.

use std::io::Read;
use std::process::{Child, Command, Output, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::error::RestartError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Restarts a supervised unit so it re-reads its config.
///
/// A non-error return means the service manager accepted the restart.
pub trait ServiceController: Send + Sync {
    fn restart(&self, unit: &str) -> Result<(), RestartError>;
}

/// `systemctl restart <unit>`, optionally through `sudo -n`.
#[derive(Debug, Clone)]
pub struct Systemctl {
    use_sudo: bool,
    timeout: Option<Duration>,
    program: String,
}

impl Systemctl {
    pub fn new(use_sudo: bool, timeout: Option<Duration>) -> Self {
        Self {
            use_sudo,
            timeout,
            program: "systemctl".to_string(),
        }
    }

    /// Substitute the `systemctl` binary (used by tests and non-systemd hosts).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Full argv for restarting `unit`.
    pub fn command_line(&self, unit: &str) -> Vec<String> {
        let mut argv = Vec::with_capacity(5);
        if self.use_sudo {
            argv.push("sudo".to_string());
            argv.push("-n".to_string());
        }
        argv.push(self.program.clone());
        argv.push("restart".to_string());
        argv.push(unit.to_string());
        argv
    }
}

impl ServiceController for Systemctl {
    fn restart(&self, unit: &str) -> Result<(), RestartError> {
        let argv = self.command_line(unit);
        let command = argv.join(" ");
        let (program, args) = argv.split_first().ok_or_else(|| RestartError::Dispatch {
            program: self.program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        })?;

        tracing::info!(%command, "restarting service");
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| RestartError::Dispatch {
                program: program.clone(),
                source,
            })?;

        let output = match self.timeout {
            Some(timeout) => wait_with_deadline(child, &command, timeout)?,
            None => child.wait_with_output().map_err(|source| RestartError::Dispatch {
                program: program.clone(),
                source,
            })?,
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Err(RestartError::Failed {
            command,
            status: output.status.to_string(),
            output: format!("{stdout} {stderr}").trim().to_string(),
        })
    }
}

fn wait_with_deadline(
    mut child: Child,
    command: &str,
    timeout: Duration,
) -> Result<Output, RestartError> {
    let deadline = Instant::now() + timeout;
    let dispatch_err = |source| RestartError::Dispatch {
        program: command.to_string(),
        source,
    };

    // Drain both pipes while polling so a chatty child cannot block on a full pipe.
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    loop {
        if let Some(status) = child.try_wait().map_err(dispatch_err)? {
            return Ok(Output {
                status,
                stdout: collect(stdout),
                stderr: collect(stderr),
            });
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!(%command, timeout_secs = timeout.as_secs(), "restart timed out");
            return Err(RestartError::Timeout {
                command: command.to_string(),
                timeout,
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}
