//! Minimal Lua tokenizer
//!
//! Covers only what block extraction needs: names and keywords, symbols,
//! string and number literals. Comments and whitespace are dropped, so
//! keywords inside them never affect nesting.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Identifier or keyword
    Name,
    Symbol,
    /// String or number literal
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset of the first character
    pub start: usize,
}

impl Token<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn is_name(&self, name: &str) -> bool {
        self.kind == TokenKind::Name && self.text == name
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }
}

const MULTI_CHAR_SYMBOLS: [&str; 10] = ["...", "==", "~=", "<=", ">=", "..", "::", "//", "<<", ">>"];

pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut lexer = Lexer {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        tokens: Vec::new(),
    };
    lexer.run();
    lexer.tokens
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    fn run(&mut self) {
        while let Some(&byte) = self.bytes.get(self.pos) {
            let start = self.pos;
            match byte {
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'-' if self.peek(1) == Some(b'-') => self.skip_comment(),
                b'"' | b'\'' => {
                    self.skip_short_string(byte);
                    self.push(TokenKind::Literal, start);
                }
                b'[' if self.long_bracket_level(start).is_some() => {
                    self.skip_long_bracket(start);
                    self.push(TokenKind::Literal, start);
                }
                b if b.is_ascii_digit()
                    || (b == b'.' && self.peek(1).is_some_and(|n| n.is_ascii_digit())) =>
                {
                    self.skip_number();
                    self.push(TokenKind::Literal, start);
                }
                b if b.is_ascii_alphabetic() || b == b'_' => {
                    while self
                        .bytes
                        .get(self.pos)
                        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
                    {
                        self.pos += 1;
                    }
                    self.push(TokenKind::Name, start);
                }
                _ => {
                    self.skip_symbol();
                    self.push(TokenKind::Symbol, start);
                }
            }
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            text: &self.source[start..self.pos],
            start,
        });
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    /// `--[[ ... ]]`, `--[==[ ... ]==]` or `-- ...` to end of line
    fn skip_comment(&mut self) {
        self.pos += 2;
        if self.bytes.get(self.pos) == Some(&b'[') && self.long_bracket_level(self.pos).is_some() {
            self.skip_long_bracket(self.pos);
            return;
        }
        while self.bytes.get(self.pos).is_some_and(|b| *b != b'\n') {
            self.pos += 1;
        }
    }

    /// Number of `=` in an opening long bracket `[==[` starting at `at`
    fn long_bracket_level(&self, at: usize) -> Option<usize> {
        let mut cursor = at + 1;
        while self.bytes.get(cursor) == Some(&b'=') {
            cursor += 1;
        }
        (self.bytes.get(cursor) == Some(&b'[')).then_some(cursor - at - 1)
    }

    fn skip_long_bracket(&mut self, at: usize) {
        let level = self.long_bracket_level(at).unwrap_or(0);
        let closing = format!("]{}]", "=".repeat(level));
        let body_start = at + level + 2;
        self.pos = self.source[body_start..]
            .find(&closing)
            .map_or(self.bytes.len(), |offset| body_start + offset + closing.len());
    }

    /// Quoted string with backslash escapes; an unterminated string stops at end of line
    fn skip_short_string(&mut self, quote: u8) {
        self.pos += 1;
        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'\\' => self.pos += 2,
                b'\n' => return,
                b if b == quote => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
        self.pos = self.pos.min(self.bytes.len());
    }

    fn skip_number(&mut self) {
        while let Some(&byte) = self.bytes.get(self.pos) {
            let exponent_sign = matches!(byte, b'+' | b'-')
                && self.pos > 0
                && matches!(self.bytes[self.pos - 1], b'e' | b'E' | b'p' | b'P');
            if byte.is_ascii_alphanumeric() || byte == b'.' || byte == b'_' || exponent_sign {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn skip_symbol(&mut self) {
        let rest = &self.source[self.pos..];
        if let Some(symbol) = MULTI_CHAR_SYMBOLS.iter().find(|s| rest.starts_with(**s)) {
            self.pos += symbol.len();
            return;
        }
        self.pos += rest.chars().next().map_or(1, char::len_utf8);
    }
}
