pub mod bin_path;
pub mod builtin;
pub mod completion;
pub mod config;
pub mod editor;
pub mod lexer;
pub mod logging;
pub mod macros;
pub mod parser;
pub mod process;
pub mod read_line;
pub mod shell;

use std::ffi::OsString;
use std::io;
use std::path::PathBuf;

pub static BUILTIN_COMMANDS: &[&str] = &["exit", "cd", "path"];

/// The only diagnostic the user ever sees, whatever went wrong.
pub const ERROR_MESSAGE: &str = "An error has occurred\n";

#[derive(thiserror::Error, Debug)]
pub enum ShellError {
    #[error("usage: wish [batch-file]")]
    Usage,
    #[error("cannot open batch file {path}: {source}")]
    BatchFile { path: String, source: io::Error },
    #[error("cannot open {} for output: {source}", .path.display())]
    OutputFile { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Parse(#[from] parser::ParseError),
    #[error("{name}: {reason}")]
    BuiltinArguments { name: &'static str, reason: &'static str },
    #[error("{}: builtins do not support output redirection", .0.display())]
    BuiltinRedirect(OsString),
    #[error("cd: {}: {source}", .path.display())]
    ChangeDirectory { path: PathBuf, source: io::Error },
    #[error("empty command")]
    EmptyCommand,
    #[error("{}: command not found", .0.display())]
    NotFound(OsString),
    #[error("cannot start {}: {source}", .program.display())]
    Spawn { program: PathBuf, source: io::Error },
    #[error("cannot execute {} through the shell: {source}", .program.display())]
    Exec { program: PathBuf, source: io::Error },
}
