use crate::bin_path::BinPath;
use crate::builtin::{Builtin, Flow};
use crate::lexer::trim_separators;
use crate::parser::{self, Command};
use crate::process::{Batch, ExternalProcess};
use crate::read_line::LineSource;
use crate::{ERROR_MESSAGE, ShellError, print_to};
use std::cell::RefCell;
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::rc::Rc;

/// The main loop. Owns the search path and the stream diagnostics go to.
pub struct Shell<W: Write> {
    bin_path: Rc<RefCell<BinPath>>,
    errors: W,
}

impl<W: Write> Shell<W> {
    pub fn new(bin_path: Rc<RefCell<BinPath>>, errors: W) -> Self {
        Self { bin_path, errors }
    }

    /// Runs lines until the input ends or `exit` is called.
    pub fn run(&mut self, source: &mut impl LineSource) -> anyhow::Result<()> {
        while let Some(line) = source.next_line()? {
            if self.run_line(&line).is_break() {
                log::debug!("exit requested");
                return Ok(());
            }
        }

        log::debug!("end of input");
        Ok(())
    }

    /// Dispatches every segment of the line in order, then waits for all
    /// children the line started. `exit` returns at once without waiting.
    pub fn run_line(&mut self, line: impl AsRef<[u8]>) -> ControlFlow<()> {
        let (batch, flow) = self.dispatch_line(line.as_ref());
        if flow.is_continue() {
            batch.wait_all();
        }

        flow
    }

    fn dispatch_line(&mut self, line: &[u8]) -> (Batch, ControlFlow<()>) {
        let mut batch = Batch::new();

        let line = trim_separators(line);
        if line.is_empty() || line.starts_with(b"#") {
            return (batch, ControlFlow::Continue(()));
        }

        log::debug!("line: {:?}", String::from_utf8_lossy(line));
        for parsed in parser::parse_line(line) {
            let result = parsed
                .map_err(ShellError::from)
                .and_then(|command| match command {
                    Some(command) => self.dispatch(&command, &mut batch),
                    None => Ok(Flow::Continue),
                });

            match result {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => return (batch, ControlFlow::Break(())),
                Err(err) => self.report(&err),
            }
        }

        (batch, ControlFlow::Continue(()))
    }

    fn dispatch(&mut self, command: &Command, batch: &mut Batch) -> Result<Flow, ShellError> {
        if let Some(builtin) = Builtin::from_name(command.name()) {
            if command.output.is_some() {
                let name = command.name().to_os_string();
                return Err(ShellError::BuiltinRedirect(name));
            }

            log::debug!("builtin {:?}", command.args);
            let mut bin_path = self.bin_path.borrow_mut();
            return builtin.run(&command.args[1..], &mut bin_path);
        }

        let process = ExternalProcess::spawn(command, &self.bin_path.borrow())?;
        batch.push(process);

        Ok(Flow::Continue)
    }

    fn report(&mut self, err: &ShellError) {
        log::warn!("{err}");
        if let Err(write_err) = self.write_error() {
            log::error!("cannot write diagnostic: {write_err}");
        }
    }

    fn write_error(&mut self) -> io::Result<()> {
        print_to!(self.errors, "{ERROR_MESSAGE}");
        self.errors.flush()
    }
}
