pub struct Lexer {
    input: Vec<u8>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &[u8]) -> Self {
        Self {
            input: input.to_vec(),
            position: 0,
        }
    }

    pub fn lex(&mut self) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::new();
        while !self.is_eof() {
            tokens.push(self.next_token());
        }
        tokens.push(Token::eof());
        tokens
    }

    fn next_token(&mut self) -> Token {
        match self.input[self.position] {
            b'>' => self.handle_operator(TokenKind::Redirect),
            b'&' => self.handle_operator(TokenKind::Parallel),
            byte if is_separator(byte) => self.handle_whitespace(),
            _ => self.handle_word(),
        }
    }

    fn is_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    fn handle_operator(&mut self, kind: TokenKind) -> Token {
        let lexeme = vec![self.input[self.position]];
        self.position += 1;

        Token { kind, lexeme }
    }

    fn handle_word(&mut self) -> Token {
        let end_position = self.scan(is_word_byte);
        let lexeme = self.input[self.position..end_position].to_vec();
        self.position = end_position;

        Token {
            kind: TokenKind::Word,
            lexeme,
        }
    }

    fn handle_whitespace(&mut self) -> Token {
        let end_position = self.scan(is_separator);
        let lexeme = self.input[self.position..end_position].to_vec();
        self.position = end_position;

        Token {
            kind: TokenKind::Whitespace,
            lexeme,
        }
    }

    fn scan(&self, accept: fn(u8) -> bool) -> usize {
        let mut end_position = self.position;
        while end_position < self.input.len() && accept(self.input[end_position]) {
            end_position += 1;
        }
        end_position
    }
}

/// Bytes that separate words. Carriage returns and newlines can survive
/// from batch files written on other platforms, so they count too.
pub fn is_separator(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\r' | b'\n')
}

/// Strips separators from both ends, and nothing else.
pub fn trim_separators(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|&byte| !is_separator(byte))
        .unwrap_or(line.len());
    let end = line
        .iter()
        .rposition(|&byte| !is_separator(byte))
        .map_or(start, |last| last + 1);

    &line[start..end]
}

fn is_word_byte(byte: u8) -> bool {
    !is_separator(byte) && byte != b'>' && byte != b'&'
}

#[derive(PartialEq, Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Vec<u8>,
}

impl Token {
    fn eof() -> Self {
        Self {
            kind: TokenKind::EOF,
            lexeme: Vec::new(),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum TokenKind {
    Word,
    Whitespace,
    Redirect,
    Parallel,
    EOF,
}
