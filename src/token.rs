use serde::Serialize;
use std::fmt;

#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct Token {
    pub kind: Kind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub line: usize,
}

impl Token {
    pub fn new(kind: Kind, lexeme: impl Into<String>, literal: Option<Literal>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            literal,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.literal {
            Some(literal) => write!(f, "{:?} {} {}", self.kind, self.lexeme, literal),
            None => write!(f, "{:?} {} nil", self.kind, self.lexeme),
        }
    }
}

/// Decoded value of a literal. Tokens only carry `Number` and `Str`.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{}", n),
            Literal::Str(s) => write!(f, "{}", s),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Nil => write!(f, "nil"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum Kind {
    // Single-character tokens
    LeftParen,   // (
    RightParen,  // )
    LeftBrace,   // {
    RightBrace,  // }
    Comma,       // ,
    Dot,         // .
    Minus,       // -
    Plus,        // +
    Semicolon,   // ;
    Slash,       // /
    Star,        // *

    // One or two character tokens
    Bang,         // !
    BangEqual,    // !=
    Equal,        // =
    EqualEqual,   // ==
    Greater,      // >
    GreaterEqual, // >=
    Less,         // <
    LessEqual,    // <=

    // Literals
    Identifier,
    String,
    Number,

    // Keywords
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    Eof // End of file marker
}

pub fn keyword(ident: &str) -> Option<Kind> {
    match ident {
        "and" => Some(Kind::And),
        "class" => Some(Kind::Class),
        "else" => Some(Kind::Else),
        "false" => Some(Kind::False),
        "for" => Some(Kind::For),
        "fun" => Some(Kind::Fun),
        "if" => Some(Kind::If),
        "nil" => Some(Kind::Nil),
        "or" => Some(Kind::Or),
        "print" => Some(Kind::Print),
        "return" => Some(Kind::Return),
        "super" => Some(Kind::Super),
        "this" => Some(Kind::This),
        "true" => Some(Kind::True),
        "var" => Some(Kind::Var),
        "while" => Some(Kind::While),
        _ => None,
    }
}
