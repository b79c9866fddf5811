use crate::ShellError;
use crate::bin_path::BinPath;
use crate::parser::Command;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{self, ExitStatus};

/// Interpreter used for files the loader refuses to run directly.
pub const FALLBACK_SHELL: &str = "/bin/sh";

pub struct ExternalProcess {
    program: PathBuf,
    child: process::Child,
}

impl ExternalProcess {
    /// Resolves the command, opens its output file and starts it. A file the
    /// loader rejects is retried once through `/bin/sh`.
    pub fn spawn(cmd: &Command, bin_path: &BinPath) -> Result<Self, ShellError> {
        if cmd.args.is_empty() {
            return Err(ShellError::EmptyCommand);
        }

        let Some(program) = bin_path.lookup(cmd.name()) else {
            return Err(ShellError::NotFound(cmd.name().to_os_string()));
        };

        let output = cmd.output.as_deref().map(open_output).transpose()?;

        let child = match launch(&program, cmd.name(), &[], &cmd.args[1..], &output) {
            Ok(child) => child,
            Err(err) if needs_interpreter(&err) => {
                log::debug!(
                    "{} cannot be loaded directly ({err}), retrying through {FALLBACK_SHELL}",
                    program.display()
                );
                launch(
                    Path::new(FALLBACK_SHELL),
                    OsStr::new(FALLBACK_SHELL),
                    &[program.as_os_str()],
                    &cmd.args[1..],
                    &output,
                )
                .map_err(|source| ShellError::Exec {
                    program: program.clone(),
                    source,
                })?
            }
            Err(source) => return Err(ShellError::Spawn { program, source }),
        };

        log::debug!("started {} as pid {}", program.display(), child.id());
        Ok(Self { program, child })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn wait(&mut self) -> io::Result<ExitStatus> {
        self.child.wait()
    }
}

fn open_output(path: &OsStr) -> Result<File, ShellError> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o644)
        .open(path)
        .map_err(|source| ShellError::OutputFile {
            path: PathBuf::from(path),
            source,
        })
}

fn launch(
    program: &Path,
    arg0: &OsStr,
    leading: &[&OsStr],
    args: &[OsString],
    output: &Option<File>,
) -> io::Result<process::Child> {
    let mut cmd = process::Command::new(program);
    cmd.arg0(arg0).args(leading).args(args);

    if let Some(file) = output {
        cmd.stdout(file.try_clone()?);
    }

    cmd.spawn()
}

/// Permission denied or an unknown binary format: the file exists but the
/// loader will not run it as is.
fn needs_interpreter(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EACCES) | Some(libc::ENOEXEC))
}

/// Children started while handling one input line.
#[derive(Default)]
pub struct Batch {
    processes: Vec<ExternalProcess>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, process: ExternalProcess) {
        self.processes.push(process);
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    /// Blocks until every child in the batch has terminated.
    pub fn wait_all(self) -> Vec<ExitStatus> {
        let mut statuses = Vec::with_capacity(self.processes.len());

        for mut process in self.processes {
            match process.wait() {
                Ok(status) => {
                    log::debug!(
                        "{} (pid {}) finished: {status}",
                        process.program.display(),
                        process.id()
                    );
                    statuses.push(status);
                }
                Err(err) => log::warn!("waiting for pid {}: {err}", process.id()),
            }
        }

        statuses
    }
}
