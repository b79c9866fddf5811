use argh::{EarlyExit, FromArgs};
use std::cell::RefCell;
use std::env;
use std::fs::File;
use std::io::{self, BufReader, IsTerminal, Write};
use std::process::exit;
use std::rc::Rc;
use wish::bin_path::BinPath;
use wish::config::Config;
use wish::editor::{self, Editor};
use wish::read_line::{BatchReader, LineSource};
use wish::shell::Shell;
use wish::{ERROR_MESSAGE, ShellError, logging};

#[derive(FromArgs)]
/// Run commands typed at the terminal, or read them from a batch file.
struct Args {
    #[argh(positional)]
    /// file to read commands from instead of standard input
    batch_file: Option<String>,
}

fn main() {
    let config = Config::from_env();
    let _ = logging::init(&config);

    let args = parse_args();
    let bin_path = Rc::new(RefCell::new(BinPath::from_search_path(
        config.search_path.as_deref(),
    )));

    let mut source = match open_source(args.batch_file.as_deref(), &bin_path) {
        Ok(source) => source,
        Err(err) => fail(&err),
    };

    let mut shell = Shell::new(bin_path, io::stderr());
    if let Err(err) = shell.run(&mut source) {
        // A failed read ends the input just like end of file does.
        log::error!("reading input: {err:#}");
    }

    exit(0);
}

fn parse_args() -> Args {
    let argv: Vec<String> = env::args().collect();
    let cmd = argv.first().map(String::as_str).unwrap_or("wish");
    let rest: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();

    match Args::from_args(&[cmd], &rest) {
        Ok(args) => args,
        Err(EarlyExit { output, status }) => {
            if status.is_ok() {
                print!("{output}");
                exit(0);
            }
            log::debug!("{}", output.trim_end());
            fail(&ShellError::Usage)
        }
    }
}

fn open_source(
    batch_file: Option<&str>,
    bin_path: &Rc<RefCell<BinPath>>,
) -> Result<Box<dyn LineSource>, ShellError> {
    if let Some(name) = batch_file {
        let path = name.trim_end();
        let file = File::open(path).map_err(|source| ShellError::BatchFile {
            path: path.to_string(),
            source,
        })?;
        log::debug!("batch mode: {path}");
        return Ok(Box::new(BatchReader::new(BufReader::new(file))));
    }

    if !io::stdin().is_terminal() {
        log::debug!("batch mode: standard input");
        return Ok(Box::new(BatchReader::new(io::stdin().lock())));
    }

    log::debug!("interactive mode");
    let editor = match Editor::new(Rc::clone(bin_path)) {
        Ok(editor) => editor,
        Err(err) => {
            log::warn!("line editor unavailable, reading plain lines: {err:#}");
            return Ok(Box::new(BatchReader::new(io::stdin().lock())));
        }
    };
    let _ = editor::print_banner(&mut io::stdout());

    Ok(Box::new(editor))
}

fn fail(err: &ShellError) -> ! {
    log::error!("{err}");
    let _ = io::stderr().write_all(ERROR_MESSAGE.as_bytes());
    exit(1);
}
