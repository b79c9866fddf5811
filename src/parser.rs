use crate::lexer::{Lexer, Token, TokenKind};
use std::ffi::{OsStr, OsString};
use std::os::unix::ffi::OsStrExt;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("more than one output redirection")]
    AmbiguousRedirect,
    #[error("redirection without a command")]
    MissingCommand,
    #[error("redirection without a target")]
    MissingTarget,
    #[error("unexpected `{}` after redirection target", .0.display())]
    ExtraTarget(OsString),
}

/// One unit of work: the argument words (program name first) and the file
/// that should receive its standard output, if any. Words keep the exact
/// bytes they were typed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub args: Vec<OsString>,
    pub output: Option<OsString>,
}

impl Command {
    pub fn name(&self) -> &OsStr {
        self.args.first().map_or(OsStr::new(""), OsString::as_os_str)
    }
}

pub struct Parser {
    input: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(line: &[u8]) -> Self {
        Self {
            input: Lexer::new(line).lex(),
            position: 0,
        }
    }

    /// Splits the line on `&`. Pieces holding nothing but whitespace are
    /// dropped, so a trailing `&` or a doubled `&&` is not an error.
    pub fn segments(&mut self) -> Vec<Segment> {
        let mut output: Vec<Segment> = Vec::new();
        let mut current: Vec<Token> = Vec::new();

        while !self.is_eof() {
            let token = self.current_token().clone();
            self.position += 1;

            match token.kind {
                TokenKind::Parallel | TokenKind::EOF => {
                    let tokens = std::mem::take(&mut current);
                    if tokens.iter().any(|t| t.kind != TokenKind::Whitespace) {
                        output.push(Segment { tokens });
                    }
                }
                _ => current.push(token),
            }
        }

        output
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn current_token(&self) -> &Token {
        &self.input[self.position]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    tokens: Vec<Token>,
}

impl Segment {
    /// Validates the redirection syntax and collects the argument words.
    /// `Ok(None)` means the segment holds no command at all.
    pub fn parse(&self) -> Result<Option<Command>, ParseError> {
        let redirects: Vec<usize> = self
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.kind == TokenKind::Redirect)
            .map(|(i, _)| i)
            .collect();

        let (command_part, redirect_part) = match redirects.as_slice() {
            [] => (&self.tokens[..], None),
            [at] => (&self.tokens[..*at], Some(&self.tokens[at + 1..])),
            _ => return Err(ParseError::AmbiguousRedirect),
        };

        let args: Vec<OsString> = words(command_part).map(OsStr::to_os_string).collect();

        let output = match redirect_part {
            None => None,
            Some(_) if args.is_empty() => return Err(ParseError::MissingCommand),
            Some(part) => {
                let mut targets = words(part);
                match (targets.next(), targets.next()) {
                    (None, _) => return Err(ParseError::MissingTarget),
                    (Some(_), Some(extra)) => {
                        return Err(ParseError::ExtraTarget(extra.to_os_string()));
                    }
                    (Some(target), None) => Some(target.to_os_string()),
                }
            }
        };

        if args.is_empty() {
            return Ok(None);
        }

        Ok(Some(Command { args, output }))
    }
}

fn words(tokens: &[Token]) -> impl Iterator<Item = &OsStr> {
    tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Word)
        .map(|t| OsStr::from_bytes(&t.lexeme))
        .filter(|lexeme| !lexeme.is_empty())
}

/// Parses every segment of a line, keeping the order in which they appear.
pub fn parse_line(line: &[u8]) -> Vec<Result<Option<Command>, ParseError>> {
    Parser::new(line)
        .segments()
        .iter()
        .map(Segment::parse)
        .collect()
}
