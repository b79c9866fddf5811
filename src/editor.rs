use crate::bin_path::BinPath;
use crate::print_to;
use crate::read_line::LineSource;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use std::cell::RefCell;
use std::io;
use std::rc::Rc;

pub const PROMPT: &str = "wish> ";

pub struct Helper {
    pub(crate) bin_path: Rc<RefCell<BinPath>>,
}

impl rustyline::hint::Hinter for Helper {
    type Hint = String;
}

impl rustyline::highlight::Highlighter for Helper {}
impl rustyline::validate::Validator for Helper {}

impl rustyline::Helper for Helper {}

/// Line source for an attended terminal: prompt, history and completion
/// against the live search path.
pub struct Editor {
    editor: rustyline::Editor<Helper, DefaultHistory>,
}

impl Editor {
    pub fn new(bin_path: Rc<RefCell<BinPath>>) -> anyhow::Result<Self> {
        let mut editor = rustyline::Editor::<Helper, DefaultHistory>::new()?;
        editor.set_helper(Some(Helper { bin_path }));

        Ok(Self { editor })
    }

    pub fn readline(&mut self, prompt: &str) -> rustyline::Result<String> {
        self.editor.readline(prompt)
    }
}

impl LineSource for Editor {
    fn next_line(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        match self.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line.into_bytes()))
            }
            // Ctrl-C drops the line being typed.
            Err(ReadlineError::Interrupted) => Ok(Some(Vec::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

pub fn print_banner(out: &mut impl io::Write) -> io::Result<()> {
    print_to!(out, "\n");
    print_to!(out, "  wish: a small Unix command interpreter\n");
    print_to!(out, "  builtins: {}\n", crate::BUILTIN_COMMANDS.join(", "));
    print_to!(out, "  `a & b` runs commands side by side\n");
    print_to!(out, "  `cmd > file` sends output to a file\n");
    print_to!(out, "\n");
    out.flush()
}
