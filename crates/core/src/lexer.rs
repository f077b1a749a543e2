//! Total lexer for Vesper source text.
//!
//! `lex` never fails: unscannable input becomes a [`Token::Error`] token and
//! scanning resumes at the next character. Newlines are significant tokens
//! because the parser terminates statements at them and several recovery
//! rules key off "found '<newline>'".

/// Message carried by the fatal unterminated-string error token.
pub const UNTERMINATED_STRING: &str = "expecting anything but ''\\n''; got it anyway";

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords -- distinguished in the parser
    Word(String),
    /// Quoted string literal (content without quotes, escapes resolved)
    Str(String),
    /// Integer literal
    Int(i64),
    /// Decimal literal -- kept as string to preserve exact representation
    Float(String),
    // Punctuation
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Semi,
    Comma,
    Dot,
    SafeDot,   // ?.
    Range,     // ..
    RangeOpen, // ..<
    Ellipsis,  // ...
    Question,
    Pipe,
    At,
    Arrow, // ->
    // Assignment operators
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PowAssign, // **=
    // Comparison operators
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Pow, // **
    Bang,
    /// Statement separator
    Newline,
    /// Unscannable input. `fatal` marks lexical corruption (an unterminated
    /// string) that renders the unit's skeleton untrustworthy.
    Error { message: String, fatal: bool },
    /// End of input
    Eof,
}

impl Token {
    /// Rendering used by "unexpected token: X" messages.
    /// Newline and EOF print as the empty string, matching the diagnostic
    /// format downstream tooling asserts on.
    pub fn describe(&self) -> String {
        match self {
            Token::Word(w) => w.clone(),
            Token::Str(s) => s.clone(),
            Token::Int(n) => n.to_string(),
            Token::Float(f) => f.clone(),
            Token::Newline | Token::Eof => String::new(),
            Token::Error { .. } => String::new(),
            other => other.symbol().to_owned(),
        }
    }

    /// Rendering used by "expecting X, found 'Y'" messages.
    pub fn describe_quoted(&self) -> String {
        match self {
            Token::Newline => "<newline>".to_owned(),
            _ => self.describe(),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::Colon => ":",
            Token::Semi => ";",
            Token::Comma => ",",
            Token::Dot => ".",
            Token::SafeDot => "?.",
            Token::Range => "..",
            Token::RangeOpen => "..<",
            Token::Ellipsis => "...",
            Token::Question => "?",
            Token::Pipe => "|",
            Token::At => "@",
            Token::Arrow => "->",
            Token::Assign => "=",
            Token::PlusAssign => "+=",
            Token::MinusAssign => "-=",
            Token::StarAssign => "*=",
            Token::SlashAssign => "/=",
            Token::PowAssign => "**=",
            Token::Eq => "==",
            Token::Neq => "!=",
            Token::Lt => "<",
            Token::Lte => "<=",
            Token::Gt => ">",
            Token::Gte => ">=",
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Percent => "%",
            Token::Pow => "**",
            Token::Bang => "!",
            _ => "",
        }
    }
}

/// A token with its source position. `line` and `col` are 1-based,
/// `len` is the token's width in characters.
#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
    pub col: u32,
    pub len: u32,
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
    tokens: Vec<Spanned>,
}

impl Lexer {
    fn cur(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.cur();
        if let Some(ch) = c {
            self.pos += 1;
            if ch == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
        c
    }

    fn push(&mut self, token: Token, line: u32, col: u32, len: u32) {
        self.tokens.push(Spanned {
            token,
            line,
            col,
            len,
        });
    }

    /// Emit `token` for the next `n` characters and consume them.
    fn take(&mut self, token: Token, n: usize) {
        let (line, col) = (self.line, self.col);
        for _ in 0..n {
            self.bump();
        }
        self.push(token, line, col, n as u32);
    }

    fn string_literal(&mut self, quote: char) {
        let (line, col) = (self.line, self.col);
        self.bump(); // opening quote
        let mut s = String::new();
        loop {
            match self.cur() {
                None => {
                    // EOF inside the literal: same corruption as a raw newline
                    self.push(
                        Token::Error {
                            message: UNTERMINATED_STRING.to_owned(),
                            fatal: true,
                        },
                        self.line,
                        self.col,
                        1,
                    );
                    return;
                }
                Some('\n') => {
                    self.push(
                        Token::Error {
                            message: UNTERMINATED_STRING.to_owned(),
                            fatal: true,
                        },
                        self.line,
                        self.col,
                        1,
                    );
                    // The newline still terminates the statement.
                    self.push(Token::Newline, self.line, self.col, 1);
                    self.bump(); // resume scanning on the next line
                    return;
                }
                Some(c) if c == quote => {
                    self.bump();
                    let len = s.chars().count() as u32 + 2;
                    self.push(Token::Str(s), line, col, len);
                    return;
                }
                Some('\\') => {
                    self.bump();
                    match self.bump() {
                        Some('n') => s.push('\n'),
                        Some('t') => s.push('\t'),
                        Some('\\') => s.push('\\'),
                        Some(c) if c == quote => s.push(c),
                        Some(other) => {
                            s.push('\\');
                            s.push(other);
                        }
                        None => {}
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.bump();
                }
            }
        }
    }

    fn number(&mut self) {
        let (line, col) = (self.line, self.col);
        let start = self.pos;
        while self.cur().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        // A '.' only belongs to the number when a digit follows; otherwise it
        // is a range or member-access dot.
        if self.cur() == Some('.') && self.at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.cur().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
            let s: String = self.chars[start..self.pos].iter().collect();
            let len = (self.pos - start) as u32;
            self.push(Token::Float(s), line, col, len);
            return;
        }
        // Numeric suffix (42L, 0g style) is folded into the literal
        if self.cur().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.bump();
        }
        let s: String = self.chars[start..self.pos].iter().collect();
        let len = (self.pos - start) as u32;
        match s.parse::<i64>() {
            Ok(n) => self.push(Token::Int(n), line, col, len),
            Err(_) => self.push(Token::Float(s), line, col, len),
        }
    }

    fn word(&mut self) {
        let (line, col) = (self.line, self.col);
        let start = self.pos;
        while self
            .cur()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.bump();
        }
        let w: String = self.chars[start..self.pos].iter().collect();
        let len = (self.pos - start) as u32;
        self.push(Token::Word(w), line, col, len);
    }
}

pub fn lex(src: &str) -> Vec<Spanned> {
    let mut lx = Lexer {
        chars: src.chars().collect(),
        pos: 0,
        line: 1,
        col: 1,
        tokens: Vec::new(),
    };

    while let Some(c) = lx.cur() {
        // Line comment
        if c == '/' && lx.at(1) == Some('/') {
            while lx.cur().is_some_and(|c| c != '\n') {
                lx.bump();
            }
            continue;
        }

        // Block comment -- an unterminated one just runs to EOF
        if c == '/' && lx.at(1) == Some('*') {
            lx.bump();
            lx.bump();
            while lx.cur().is_some() {
                if lx.cur() == Some('*') && lx.at(1) == Some('/') {
                    lx.bump();
                    lx.bump();
                    break;
                }
                lx.bump();
            }
            continue;
        }

        if c == '\n' {
            lx.take(Token::Newline, 1);
            continue;
        }
        if c.is_whitespace() {
            lx.bump();
            continue;
        }

        if c == '\'' || c == '"' {
            lx.string_literal(c);
            continue;
        }
        if c.is_ascii_digit() {
            lx.number();
            continue;
        }
        if c.is_alphabetic() || c == '_' || c == '$' {
            lx.word();
            continue;
        }

        let c1 = lx.at(1);
        let c2 = lx.at(2);
        match c {
            '{' => lx.take(Token::LBrace, 1),
            '}' => lx.take(Token::RBrace, 1),
            '[' => lx.take(Token::LBracket, 1),
            ']' => lx.take(Token::RBracket, 1),
            '(' => lx.take(Token::LParen, 1),
            ')' => lx.take(Token::RParen, 1),
            ':' => lx.take(Token::Colon, 1),
            ';' => lx.take(Token::Semi, 1),
            ',' => lx.take(Token::Comma, 1),
            '@' => lx.take(Token::At, 1),
            '|' => lx.take(Token::Pipe, 1),
            '%' => lx.take(Token::Percent, 1),
            '.' => {
                if c1 == Some('.') && c2 == Some('.') {
                    lx.take(Token::Ellipsis, 3);
                } else if c1 == Some('.') && c2 == Some('<') {
                    lx.take(Token::RangeOpen, 3);
                } else if c1 == Some('.') {
                    lx.take(Token::Range, 2);
                } else {
                    lx.take(Token::Dot, 1);
                }
            }
            '?' => {
                if c1 == Some('.') {
                    lx.take(Token::SafeDot, 2);
                } else {
                    lx.take(Token::Question, 1);
                }
            }
            '=' => {
                if c1 == Some('=') {
                    lx.take(Token::Eq, 2);
                } else {
                    lx.take(Token::Assign, 1);
                }
            }
            '!' => {
                if c1 == Some('=') {
                    lx.take(Token::Neq, 2);
                } else {
                    lx.take(Token::Bang, 1);
                }
            }
            '<' => {
                if c1 == Some('=') {
                    lx.take(Token::Lte, 2);
                } else {
                    lx.take(Token::Lt, 1);
                }
            }
            '>' => {
                if c1 == Some('=') {
                    lx.take(Token::Gte, 2);
                } else {
                    lx.take(Token::Gt, 1);
                }
            }
            '+' => {
                if c1 == Some('=') {
                    lx.take(Token::PlusAssign, 2);
                } else {
                    lx.take(Token::Plus, 1);
                }
            }
            '-' => {
                if c1 == Some('>') {
                    lx.take(Token::Arrow, 2);
                } else if c1 == Some('=') {
                    lx.take(Token::MinusAssign, 2);
                } else {
                    lx.take(Token::Minus, 1);
                }
            }
            '*' => {
                if c1 == Some('*') && c2 == Some('=') {
                    lx.take(Token::PowAssign, 3);
                } else if c1 == Some('*') {
                    lx.take(Token::Pow, 2);
                } else if c1 == Some('=') {
                    lx.take(Token::StarAssign, 2);
                } else {
                    lx.take(Token::Star, 1);
                }
            }
            '/' => {
                if c1 == Some('=') {
                    lx.take(Token::SlashAssign, 2);
                } else {
                    lx.take(Token::Slash, 1);
                }
            }
            other => {
                lx.take(
                    Token::Error {
                        message: format!("Unexpected character: '{}'", other),
                        fatal: false,
                    },
                    1,
                );
            }
        }
    }

    lx.tokens.push(Spanned {
        token: Token::Eof,
        line: lx.line,
        col: lx.col,
        len: 1,
    });
    lx.tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<Token> {
        lex(src).into_iter().map(|s| s.token).collect()
    }

    #[test]
    fn words_and_punctuation_with_positions() {
        let tokens = lex("class X {\n}");
        assert_eq!(tokens[0].token, Token::Word("class".into()));
        assert_eq!((tokens[0].line, tokens[0].col, tokens[0].len), (1, 1, 5));
        assert_eq!(tokens[1].token, Token::Word("X".into()));
        assert_eq!((tokens[1].line, tokens[1].col), (1, 7));
        assert_eq!(tokens[2].token, Token::LBrace);
        assert_eq!(tokens[3].token, Token::Newline);
        assert_eq!((tokens[3].line, tokens[3].col), (1, 10));
        assert_eq!(tokens[4].token, Token::RBrace);
        assert_eq!((tokens[4].line, tokens[4].col), (2, 1));
        assert_eq!(tokens[5].token, Token::Eof);
        assert_eq!((tokens[5].line, tokens[5].col), (2, 2));
    }

    #[test]
    fn range_operators_disambiguate_from_dots() {
        assert_eq!(
            kinds("0..5"),
            vec![Token::Int(0), Token::Range, Token::Int(5), Token::Eof]
        );
        assert_eq!(
            kinds("0..<5"),
            vec![Token::Int(0), Token::RangeOpen, Token::Int(5), Token::Eof]
        );
        assert_eq!(
            kinds("a.b"),
            vec![
                Token::Word("a".into()),
                Token::Dot,
                Token::Word("b".into()),
                Token::Eof
            ]
        );
        assert_eq!(kinds("1.5"), vec![Token::Float("1.5".into()), Token::Eof]);
    }

    #[test]
    fn compound_assignment_operators() {
        assert_eq!(
            kinds("x **= 2"),
            vec![
                Token::Word("x".into()),
                Token::PowAssign,
                Token::Int(2),
                Token::Eof
            ]
        );
        assert_eq!(kinds("*=")[0], Token::StarAssign);
        assert_eq!(kinds("?.")[0], Token::SafeDot);
        assert_eq!(kinds("->")[0], Token::Arrow);
    }

    #[test]
    fn string_escapes_resolved() {
        let tokens = lex("'c:\\test'");
        assert_eq!(tokens[0].token, Token::Str("c:\\test".into()));
        let tokens = lex("\"a\\nb\"");
        assert_eq!(tokens[0].token, Token::Str("a\nb".into()));
    }

    #[test]
    fn unterminated_string_is_fatal_error_token() {
        let tokens = lex("def x=\"\n}");
        let err = tokens
            .iter()
            .find(|s| matches!(s.token, Token::Error { .. }))
            .expect("error token");
        match &err.token {
            Token::Error { message, fatal } => {
                assert_eq!(message, UNTERMINATED_STRING);
                assert!(*fatal);
            }
            _ => unreachable!(),
        }
        // Positioned at the offending newline, one past the line end
        assert_eq!((err.line, err.col), (1, 8));
        // Scanning resumed: the closing brace on line 2 is still there
        assert!(tokens.iter().any(|s| s.token == Token::RBrace));
    }

    #[test]
    fn unknown_character_is_nonfatal_and_scanning_continues() {
        let tokens = lex("a # b");
        match &tokens[1].token {
            Token::Error { message, fatal } => {
                assert_eq!(message, "Unexpected character: '#'");
                assert!(!fatal);
            }
            other => panic!("expected error token, got {:?}", other),
        }
        assert_eq!(tokens[2].token, Token::Word("b".into()));
    }

    #[test]
    fn empty_input_yields_single_eof() {
        let tokens = lex("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].token, Token::Eof);
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("a // rest\nb"),
            vec![
                Token::Word("a".into()),
                Token::Newline,
                Token::Word("b".into()),
                Token::Eof
            ]
        );
        assert_eq!(
            kinds("a /* x\ny */ b"),
            vec![Token::Word("a".into()), Token::Word("b".into()), Token::Eof]
        );
    }
}
