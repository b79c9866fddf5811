use crate::lexer::trim_separators;
use std::env;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::slice::Iter;

pub const DEFAULT_PATH: &str = "/bin";

/// Ordered list of directories searched for commands. The first directory
/// holding a matching file wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinPath {
    path: Vec<PathBuf>,
}

impl BinPath {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            path: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Seeds the search path from a `PATH`-style value. Empty components are
    /// dropped; a missing or empty value falls back to `/bin`.
    pub fn from_search_path(value: Option<&OsStr>) -> Self {
        let path: Vec<PathBuf> = env::split_paths(value.unwrap_or_default())
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();

        if path.is_empty() {
            return Self::new([DEFAULT_PATH]);
        }

        Self { path }
    }

    /// Replaces every directory at once. An empty list leaves nothing to search.
    pub fn set<I, S>(&mut self, dirs: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.path = dirs
            .into_iter()
            .filter(|dir| !trim_separators(dir.as_ref().as_bytes()).is_empty())
            .map(|dir| PathBuf::from(dir.as_ref()))
            .collect();
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Any existing file counts as a match, executable or not. Whether it can
    /// actually run is decided when it is launched.
    pub fn lookup(&self, bin: impl AsRef<OsStr>) -> Option<PathBuf> {
        let bin = trim_separators(bin.as_ref().as_bytes());
        if bin.is_empty() {
            return None;
        }

        self.path
            .iter()
            .map(|dir| candidate(dir, bin))
            .find(|path| fs::metadata(path).is_ok())
    }

    pub fn bins(&self) -> Bins<'_> {
        Bins::new(self.path.iter())
    }
}

fn candidate(dir: &Path, bin: &[u8]) -> PathBuf {
    let mut path = dir.as_os_str().as_bytes().to_vec();
    if !path.ends_with(b"/") {
        path.push(b'/');
    }
    path.extend_from_slice(bin);

    PathBuf::from(OsString::from_vec(path))
}

/// Executables found in the search directories, in search order. Directories
/// that cannot be read are skipped.
pub struct Bins<'a> {
    paths: Iter<'a, PathBuf>,
    dir_data: Option<fs::ReadDir>,
}

impl<'a> Bins<'a> {
    fn new(paths: Iter<'a, PathBuf>) -> Self {
        Self {
            paths,
            dir_data: None,
        }
    }
}

impl<'a> Iterator for Bins<'a> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.dir_data.as_mut() {
                Some(read_dir) => match read_dir.next() {
                    Some(Ok(dir_entry)) => match dir_entry.metadata() {
                        Ok(metadata) if is_executable_file(&metadata) => {
                            return Some(dir_entry.path());
                        }
                        _ => {}
                    },
                    Some(Err(err)) => log::debug!("skipping directory entry: {err}"),
                    None => self.dir_data = None,
                },
                None => {
                    let dir = self.paths.next()?;
                    match fs::read_dir(dir) {
                        Ok(data) => self.dir_data = Some(data),
                        Err(err) => {
                            log::debug!("skipping search directory {}: {err}", dir.display());
                        }
                    }
                }
            }
        }
    }
}

fn is_executable_file(attr: &fs::Metadata) -> bool {
    attr.is_file() && attr.permissions().mode() & 0o111 != 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs::File;

    fn touch(path: &Path, mode: u32) {
        File::create(path).unwrap();
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    fn paths(dirs: &[&str]) -> Vec<PathBuf> {
        dirs.iter().map(PathBuf::from).collect()
    }

    fn seeded(value: Option<&str>) -> Vec<PathBuf> {
        BinPath::from_search_path(value.map(OsStr::new)).dirs().to_vec()
    }

    #[test]
    fn seeds_from_path_variable() {
        assert_eq!(
            seeded(Some("/usr/local/bin::/usr/bin:/bin:")),
            paths(&["/usr/local/bin", "/usr/bin", "/bin"])
        );
    }

    #[test]
    fn missing_or_empty_path_defaults_to_bin() {
        assert_eq!(seeded(None), paths(&["/bin"]));
        assert_eq!(seeded(Some("")), paths(&["/bin"]));
        assert_eq!(seeded(Some(":::")), paths(&["/bin"]));
    }

    #[test]
    fn path_variable_need_not_be_utf8() {
        let value = OsString::from_vec(b"/opt/\xffbin:/bin".to_vec());
        let bin_path = BinPath::from_search_path(Some(value.as_os_str()));
        assert_eq!(
            bin_path.dirs(),
            [
                PathBuf::from(OsString::from_vec(b"/opt/\xffbin".to_vec())),
                PathBuf::from("/bin"),
            ]
        );
    }

    #[test]
    fn set_replaces_everything() {
        let mut bin_path = BinPath::new(["/bin"]);
        bin_path.set(["/a", "  ", "/b", ""]);
        assert_eq!(bin_path.dirs(), paths(&["/a", "/b"]));

        bin_path.set(Vec::<OsString>::new());
        assert!(bin_path.is_empty());
    }

    #[test]
    fn first_directory_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch(&first.path().join("tool"), 0o755);
        touch(&second.path().join("tool"), 0o755);

        let bin_path = BinPath::new([second.path(), first.path()]);
        assert_eq!(bin_path.lookup("tool"), Some(second.path().join("tool")));
    }

    #[test]
    fn trailing_slash_is_not_doubled() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("tool"), 0o755);

        let with_slash = format!("{}/", dir.path().display());
        let bin_path = BinPath::new(vec![with_slash.clone()]);
        assert_eq!(
            bin_path.lookup("tool"),
            Some(PathBuf::from(format!("{with_slash}tool")))
        );
    }

    #[test]
    fn non_executable_file_is_still_found() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("script"), 0o644);

        let bin_path = BinPath::new([dir.path()]);
        assert_eq!(bin_path.lookup("script"), Some(dir.path().join("script")));
    }

    #[test]
    fn lookup_trims_the_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("tool"), 0o755);

        let bin_path = BinPath::new([dir.path()]);
        assert_eq!(bin_path.lookup(" tool\t"), Some(dir.path().join("tool")));
    }

    #[test]
    fn not_found_cases() {
        let dir = tempfile::tempdir().unwrap();
        let bin_path = BinPath::new([dir.path()]);

        assert_eq!(bin_path.lookup("missing"), None);
        assert_eq!(bin_path.lookup(""), None);
        assert_eq!(bin_path.lookup("   "), None);
        assert_eq!(BinPath::default().lookup("sh"), None);
    }

    #[test]
    fn bins_lists_only_executable_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("runnable"), 0o755);
        touch(&dir.path().join("data"), 0o644);
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let bin_path = BinPath::new([Path::new("/definitely/not/a/dir"), dir.path()]);
        let bins: Vec<PathBuf> = bin_path.bins().collect();
        assert_eq!(bins, vec![dir.path().join("runnable")]);
    }
}
