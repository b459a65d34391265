use crate::error::ToolError;
use std::io::{ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(25);
const DRAIN_GRACE: Duration = Duration::from_millis(200);
const CHUNK: usize = 8 * 1024;

/// One external program call: what to run and its arguments, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// stdout and stderr of one run, interleaved in the order the bytes arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    pub bytes: Vec<u8>,
}

impl CapturedOutput {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

pub trait ProcessRunner: Send + Sync {
    /// Runs to completion. A non-zero exit is an error carrying the captured output.
    fn run(&self, invocation: &Invocation) -> Result<CapturedOutput, ToolError>;
}

#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

enum Exit {
    Finished(ExitStatus),
    TimedOut(Duration),
}

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<CapturedOutput, ToolError> {
        tracing::debug!(program = %invocation.program, args = ?invocation.args, "spawning");

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let buffer = SharedBuffer::default();
        let readers: Vec<JoinHandle<()>> = [
            child.stdout.take().map(|pipe| spawn_reader(pipe, Arc::clone(&buffer))),
            child.stderr.take().map(|pipe| spawn_reader(pipe, Arc::clone(&buffer))),
        ]
        .into_iter()
        .flatten()
        .collect();

        let exit = match self.timeout {
            Some(limit) => wait_with_deadline(&mut child, limit),
            None => child.wait().map(Exit::Finished),
        }
        .map_err(|err| ToolError::io(format!("failed to wait for {}", invocation.program), err))?;

        match exit {
            Exit::Finished(status) => {
                for reader in readers {
                    let _ = reader.join();
                }
                let output = snapshot(&buffer);
                if status.success() {
                    return Ok(output);
                }
                tracing::warn!(program = %invocation.program, %status, "external process failed");
                Err(ToolError::Process {
                    program: invocation.program.clone(),
                    status,
                    output: output.text(),
                })
            }
            Exit::TimedOut(elapsed) => {
                // Descendants of the killed child can keep the pipes open, so the
                // readers are left to finish on their own.
                drain(&readers, DRAIN_GRACE);
                tracing::warn!(program = %invocation.program, ?elapsed, "external process timed out");
                Err(ToolError::Timeout {
                    program: invocation.program.clone(),
                    elapsed,
                    output: snapshot(&buffer).text(),
                })
            }
        }
    }
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> std::io::Result<Exit> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Exit::Finished(status));
        }
        let elapsed = started.elapsed();
        if elapsed >= limit {
            // The child may have exited between the poll and the kill.
            let _ = child.kill();
            child.wait()?;
            return Ok(Exit::TimedOut(elapsed));
        }
        thread::sleep(POLL_INTERVAL.min(limit - elapsed));
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut reader: R, buffer: SharedBuffer) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut chunk = [0u8; CHUNK];
        loop {
            match reader.read(&mut chunk) {
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Ok(0) | Err(_) => break,
                Ok(read) => buffer
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(&chunk[..read]),
            }
        }
    })
}

fn drain(readers: &[JoinHandle<()>], grace: Duration) {
    let started = Instant::now();
    while started.elapsed() < grace && !readers.iter().all(JoinHandle::is_finished) {
        thread::sleep(POLL_INTERVAL);
    }
}

fn snapshot(buffer: &SharedBuffer) -> CapturedOutput {
    CapturedOutput {
        bytes: buffer.lock().unwrap_or_else(PoisonError::into_inner).clone(),
    }
}
