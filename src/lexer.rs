use crate::error::LexingError;
use crate::token::{keyword, Kind, Literal, Token};
use log::{debug, trace};

pub struct Lexer {
    chars: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    fn at(&self) -> char {
        self.peek_at(self.current)
    }

    fn peek_next(&self) -> char {
        self.peek_at(self.current + 1)
    }

    fn peek_at(&self, index: usize) -> char {
        if index >= self.chars.len() {
            '\0'
        } else {
            self.chars[index]
        }
    }

    fn advance(&mut self) -> char {
        let ch = self.at();
        self.current += 1;
        ch
    }

    fn eat(&mut self, expecting: char) -> bool {
        if self.is_eof() || self.at() != expecting {
            return false;
        }

        self.current += 1;
        true
    }

    fn is_eof(&self) -> bool {
        self.current >= self.chars.len()
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.current].iter().collect()
    }

    fn create_token(&mut self, kind: Kind, literal: Option<Literal>) {
        let token = Token::new(kind, self.lexeme(), literal, self.line);
        trace!("line {}: {:?} {:?}", token.line, token.kind, token.lexeme);
        self.tokens.push(token);
    }

    pub fn tokenize(mut self, mut on_error: impl FnMut(LexingError)) -> Vec<Token> {
        while !self.is_eof() {
            self.start = self.current;
            let ch = self.advance();

            match ch {
                '(' => self.create_token(Kind::LeftParen, None),
                ')' => self.create_token(Kind::RightParen, None),
                '{' => self.create_token(Kind::LeftBrace, None),
                '}' => self.create_token(Kind::RightBrace, None),
                ',' => self.create_token(Kind::Comma, None),
                '.' => self.create_token(Kind::Dot, None),
                '-' => self.create_token(Kind::Minus, None),
                '+' => self.create_token(Kind::Plus, None),
                ';' => self.create_token(Kind::Semicolon, None),
                '*' => self.create_token(Kind::Star, None),
                '!' => {
                    let kind = if self.eat('=') { Kind::BangEqual } else { Kind::Bang };
                    self.create_token(kind, None);
                }
                '=' => {
                    let kind = if self.eat('=') { Kind::EqualEqual } else { Kind::Equal };
                    self.create_token(kind, None);
                }
                '<' => {
                    let kind = if self.eat('=') { Kind::LessEqual } else { Kind::Less };
                    self.create_token(kind, None);
                }
                '>' => {
                    let kind = if self.eat('=') { Kind::GreaterEqual } else { Kind::Greater };
                    self.create_token(kind, None);
                }
                '/' => {
                    if self.eat('/') {
                        // Single-line comment, never emitted.
                        while !self.is_eof() && self.at() != '\n' {
                            self.advance();
                        }
                    } else {
                        self.create_token(Kind::Slash, None);
                    }
                }
                ' ' | '\r' | '\t' => {}
                '\n' => self.line += 1,
                '"' => {
                    if let Err(err) = self.string() {
                        on_error(err);
                    }
                }
                c if c.is_ascii_digit() => self.number(),
                c if is_alpha(c) => self.identifier(),
                _ => on_error(LexingError::new(self.line, "Unexpected character.")),
            }
        }

        self.tokens.push(Token::new(Kind::Eof, "", None, self.line));
        debug!("scanned {} tokens over {} lines", self.tokens.len(), self.line);

        self.tokens
    }

    fn string(&mut self) -> Result<(), LexingError> {
        while !self.is_eof() && self.at() != '"' {
            if self.at() == '\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_eof() {
            return Err(LexingError::new(self.line, "Unterminated string."));
        }

        // The closing quote.
        self.advance();

        let value: String = self.chars[self.start + 1..self.current - 1].iter().collect();
        self.create_token(Kind::String, Some(Literal::Str(value)));
        Ok(())
    }

    fn number(&mut self) {
        while self.at().is_ascii_digit() {
            self.advance();
        }

        // A trailing '.' without a digit after it belongs to the next token.
        if self.at() == '.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.at().is_ascii_digit() {
                self.advance();
            }
        }

        // Digits with at most one interior '.' always parse.
        let value = self.lexeme().parse::<f64>().unwrap_or_default();
        self.create_token(Kind::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while is_alpha(self.at()) || self.at().is_ascii_digit() {
            self.advance();
        }

        let kind = keyword(&self.lexeme()).unwrap_or(Kind::Identifier);
        self.create_token(kind, None);
    }
}

fn is_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

pub fn scan(source: &str, on_error: impl FnMut(LexingError)) -> Vec<Token> {
    Lexer::new(source).tokenize(on_error)
}
