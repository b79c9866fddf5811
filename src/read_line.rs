use std::io::BufRead;

/// Anything that hands the main loop one input line at a time.
pub trait LineSource {
    /// Returns `Ok(None)` once the input is exhausted. Line terminators are
    /// already removed; every other byte is passed through untouched.
    fn next_line(&mut self) -> anyhow::Result<Option<Vec<u8>>>;
}

/// Reads commands from a script file or a redirected stream. No prompt is
/// ever printed.
pub struct BatchReader<R> {
    reader: R,
}

impl<R: BufRead> BatchReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for BatchReader<R> {
    fn next_line(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }

        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }

        Ok(Some(line))
    }
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn next_line(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        (**self).next_line()
    }
}
