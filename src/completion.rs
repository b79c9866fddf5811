use crate::BUILTIN_COMMANDS;
use crate::editor::Helper;
use rustyline::completion;
use std::collections::BTreeSet;
use std::path::PathBuf;

impl completion::Completer for Helper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let (start, word) = completion::extract_word(line, pos, None, |c| c == ' ' || c == '\t');
        let bin_path = self.bin_path.borrow();

        let executables = bin_path.bins().filter_map(file_name);

        let candidates: BTreeSet<Pair> = BUILTIN_COMMANDS
            .iter()
            .map(|name| name.to_string())
            .chain(executables)
            .filter(|name| name.starts_with(word))
            .map(Pair::new)
            .collect();

        Ok((start, candidates.into_iter().collect()))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Pair {
    pub display: String,
    pub replacement: String,
}

impl Pair {
    fn new(display: String) -> Pair {
        Self {
            replacement: append_trailing_space(&display),
            display,
        }
    }
}

impl completion::Candidate for Pair {
    fn display(&self) -> &str {
        self.display.as_str()
    }

    fn replacement(&self) -> &str {
        self.replacement.as_str()
    }
}

fn file_name(bin: PathBuf) -> Option<String> {
    Some(bin.file_name()?.to_string_lossy().into_owned())
}

fn append_trailing_space(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 1);
    result.push_str(name);
    result.push(' ');

    result
}
