use crate::ShellError;
use crate::bin_path::BinPath;
use std::env;
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

/// Commands run inside the interpreter itself, never in a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Cd,
    Path,
}

/// What the main loop should do after a builtin ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

impl Builtin {
    pub fn from_name(name: &OsStr) -> Option<Self> {
        match name.as_bytes() {
            b"exit" => Some(Builtin::Exit),
            b"cd" => Some(Builtin::Cd),
            b"path" => Some(Builtin::Path),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => "exit",
            Builtin::Cd => "cd",
            Builtin::Path => "path",
        }
    }

    /// Runs the builtin. `args` holds the words after the builtin's name.
    pub fn run(self, args: &[OsString], bin_path: &mut BinPath) -> Result<Flow, ShellError> {
        match self {
            Builtin::Exit => exit_builtin(args),
            Builtin::Cd => cd_builtin(args),
            Builtin::Path => {
                bin_path.set(args);
                log::debug!("search path is now {:?}", bin_path.dirs());
                Ok(Flow::Continue)
            }
        }
    }
}

fn exit_builtin(args: &[OsString]) -> Result<Flow, ShellError> {
    if !args.is_empty() {
        return Err(ShellError::BuiltinArguments {
            name: "exit",
            reason: "takes no arguments",
        });
    }

    Ok(Flow::Exit)
}

fn cd_builtin(args: &[OsString]) -> Result<Flow, ShellError> {
    let [path] = args else {
        return Err(ShellError::BuiltinArguments {
            name: "cd",
            reason: "takes exactly one argument",
        });
    };

    env::set_current_dir(path).map_err(|source| ShellError::ChangeDirectory {
        path: PathBuf::from(path),
        source,
    })?;

    Ok(Flow::Continue)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    /// Serializes tests that touch the process working directory.
    pub(crate) fn lock_current_dir() -> MutexGuard<'static, ()> {
        static MUTEX: OnceLock<Mutex<()>> = OnceLock::new();
        MUTEX
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn args(words: &[&str]) -> Vec<OsString> {
        words.iter().cloned().map(OsString::from).collect()
    }

    fn builtin(name: &str) -> Option<Builtin> {
        Builtin::from_name(OsStr::new(name))
    }

    #[test]
    fn recognizes_only_the_three_builtins() {
        assert_eq!(builtin("exit"), Some(Builtin::Exit));
        assert_eq!(builtin("cd"), Some(Builtin::Cd));
        assert_eq!(builtin("path"), Some(Builtin::Path));
        assert_eq!(builtin("echo"), None);
        assert_eq!(builtin("EXIT"), None);
        assert_eq!(Builtin::from_name(OsStr::from_bytes(b"exit\xff")), None);
        for name in crate::BUILTIN_COMMANDS {
            assert_eq!(builtin(name).map(Builtin::name), Some(*name));
        }
    }

    #[test]
    fn exit_without_arguments_stops_the_loop() {
        let mut bin_path = BinPath::default();
        let flow = Builtin::Exit.run(&[], &mut bin_path).unwrap();
        assert_eq!(flow, Flow::Exit);
    }

    #[test]
    fn exit_with_arguments_is_an_error() {
        let mut bin_path = BinPath::default();
        let result = Builtin::Exit.run(&args(&["0"]), &mut bin_path);
        assert!(matches!(
            result,
            Err(ShellError::BuiltinArguments { name: "exit", .. })
        ));
    }

    #[test]
    fn path_replaces_the_search_path() {
        let mut bin_path = BinPath::new(args(&["/bin", "/usr/bin"]));
        let flow = Builtin::Path
            .run(&args(&["/opt/bin", "/tmp/testbin"]), &mut bin_path)
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(
            bin_path.dirs(),
            [PathBuf::from("/opt/bin"), PathBuf::from("/tmp/testbin")]
        );
    }

    #[test]
    fn path_without_arguments_empties_the_search_path() {
        let mut bin_path = BinPath::new(args(&["/bin"]));
        Builtin::Path.run(&[], &mut bin_path).unwrap();
        assert!(bin_path.is_empty());
        assert_eq!(bin_path.lookup("sh"), None);
    }

    #[test]
    fn cd_changes_the_working_directory() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let target = fs::canonicalize(dir.path()).unwrap();

        let mut bin_path = BinPath::default();
        let result = Builtin::Cd.run(&[target.clone().into_os_string()], &mut bin_path);
        let now = fs::canonicalize(env::current_dir().unwrap()).unwrap();
        env::set_current_dir(&orig).unwrap();

        assert_eq!(result.unwrap(), Flow::Continue);
        assert_eq!(now, target);
    }

    #[test]
    fn cd_to_missing_directory_leaves_cwd_alone() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");

        let mut bin_path = BinPath::default();
        let result = Builtin::Cd.run(&[missing.into_os_string()], &mut bin_path);

        assert!(matches!(result, Err(ShellError::ChangeDirectory { .. })));
        assert_eq!(env::current_dir().unwrap(), orig);
    }

    #[test]
    fn cd_to_a_file_is_an_error() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();

        let mut bin_path = BinPath::default();
        let result = Builtin::Cd.run(&[OsString::from(file.path())], &mut bin_path);

        assert!(matches!(result, Err(ShellError::ChangeDirectory { .. })));
        assert_eq!(env::current_dir().unwrap(), orig);
    }

    #[test]
    fn cd_needs_exactly_one_argument() {
        let _lock = lock_current_dir();
        let orig = env::current_dir().unwrap();
        let mut bin_path = BinPath::default();

        for words in [vec![], vec!["/tmp", "/"]] {
            let result = Builtin::Cd.run(&args(&words), &mut bin_path);
            assert!(matches!(
                result,
                Err(ShellError::BuiltinArguments { name: "cd", .. })
            ));
        }
        assert_eq!(env::current_dir().unwrap(), orig);
    }
}
