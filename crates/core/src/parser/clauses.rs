//! Package and import clauses, and annotation uses.
//!
//! Malformed clauses never abort the unit: a broken `package` falls back to
//! `java.lang`, a broken `import` to `java.lang.Object`, both with one
//! diagnostic. Annotation uses are parsed structurally here; whether the
//! named class exists and its attributes line up is a batch-wide question
//! recorded as a pending check.

use super::Parser;
use crate::ast::{Annotation, Expr, ImportDecl, PackageDecl};
use crate::diag::Span;
use crate::lexer::Token;
use crate::resolve::Pending;

impl Parser<'_> {
    /// Dotted name with no intervening whitespace assumed: `a.b.C`. Stops
    /// before a dot that is not followed by a word, so `a.b.` leaves the
    /// trailing dot for the caller to judge.
    pub(super) fn parse_dotted_name(&mut self) -> Option<(String, Span)> {
        let start = self.pos;
        let mut name = self.take_word()?;
        while matches!(self.peek(), Token::Dot)
            && matches!(self.peek_ahead(1), Token::Word(_))
        {
            self.advance();
            if let Some(w) = self.take_word() {
                name.push('.');
                name.push_str(&w);
            }
        }
        let first = self.span_at(start);
        let len = name.chars().count() as u32;
        Some((name, Span::new(first.line, first.col, len)))
    }

    pub(super) fn parse_package(&mut self) {
        let line = self.cur().line;
        self.advance();
        let parsed = self.parse_dotted_name();
        let clean = matches!(
            self.peek(),
            Token::Newline | Token::Semi | Token::Eof
        );
        match parsed {
            Some((name, _)) if clean => {
                self.builder.set_package(PackageDecl {
                    name,
                    synthetic: false,
                    line,
                });
            }
            _ => {
                let span = self.clause_end_span(line);
                self.error_span(span, "Invalid package statement");
                self.builder.set_default_package(line);
                self.skip_line();
            }
        }
    }

    pub(super) fn parse_import(&mut self) {
        let line = self.cur().line;
        self.advance();
        let statik = self.eat_word("static");
        let parsed = self.parse_dotted_name();
        let star = matches!(self.peek(), Token::Dot)
            && matches!(self.peek_ahead(1), Token::Star);
        if star {
            self.advance();
            self.advance();
        }
        let clean = matches!(
            self.peek(),
            Token::Newline | Token::Semi | Token::Eof
        );
        match parsed {
            Some((path, _)) if clean => {
                self.builder.add_import(ImportDecl {
                    path,
                    star,
                    statik,
                    synthetic: false,
                    line,
                });
            }
            _ => {
                let span = self.clause_end_span(line);
                self.error_span(span, "Invalid import statement");
                self.builder.add_default_import(line);
                self.skip_line();
            }
        }
    }

    /// Where an invalid clause is blamed: the character just before the
    /// token parsing stopped at, i.e. the end of what was consumed. A
    /// dangling dot (`package com.`) is taken as part of the clause first
    /// so the caret lands on it.
    fn clause_end_span(&mut self, line: u32) -> Span {
        self.eat(&Token::Dot);
        let col = self.cur().col.saturating_sub(1).max(1);
        Span::new(line, col, 1)
    }

    // -- Annotations --------------------------------------------

    /// Zero or more `@Name(args)` uses. Stops before `@interface`, which is
    /// a type declaration, not an annotation.
    pub(super) fn parse_annotations(&mut self) -> Vec<Annotation> {
        let mut anns = Vec::new();
        loop {
            if !matches!(self.peek(), Token::At) {
                // Annotations may sit on their own lines above the target.
                let mut i = self.pos;
                while matches!(self.token_at(i), Token::Newline) {
                    i += 1;
                }
                if !anns.is_empty() && matches!(self.token_at(i), Token::At) {
                    self.skip_newlines();
                } else {
                    return anns;
                }
            }
            if matches!(self.peek_ahead(1), Token::Word(w) if w == "interface") {
                return anns;
            }
            anns.push(self.parse_annotation());
        }
    }

    fn parse_annotation(&mut self) -> Annotation {
        let at = self.cur().clone();
        self.advance();
        match self.parse_dotted_name() {
            Some((name, _)) => {
                let args = if matches!(self.peek(), Token::LParen) {
                    self.parse_annotation_args()
                } else {
                    Vec::new()
                };
                let arg_names = args.iter().map(|(n, _)| n.clone()).collect();
                self.pending.push(Pending::CheckAnnotation {
                    name: name.clone(),
                    arg_names,
                    line: at.line,
                    col: at.col,
                });
                Annotation {
                    name,
                    args,
                    line: at.line,
                    col: at.col,
                }
            }
            None => {
                // `@` with nothing usable after it
                self.error_span(
                    Span::new(at.line, at.col, 2),
                    "class ? is not an annotation in @?",
                );
                self.pending.push(Pending::CheckAnnotation {
                    name: "?".to_owned(),
                    arg_names: Vec::new(),
                    line: at.line,
                    col: at.col,
                });
                Annotation {
                    name: "?".to_owned(),
                    args: Vec::new(),
                    line: at.line,
                    col: at.col,
                }
            }
        }
    }

    /// `(name = value, ...)`. A name with no value after its `=` gets the
    /// marker value `ERROR` and no token-level diagnostic; whether the name
    /// is a real attribute is checked after the batch parses. A trailing
    /// comma is tolerated.
    fn parse_annotation_args(&mut self) -> Vec<(String, Expr)> {
        self.advance(); // (
        let mut args = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(&Token::RParen) {
                return args;
            }
            if self.at_eof() {
                self.error_tok(self.pos, "expecting ')', found ''");
                return args;
            }
            if let Token::Word(name) = self.peek().clone() {
                match self.peek_ahead(1) {
                    Token::Assign => {
                        self.advance();
                        self.advance();
                        let value = if self.starts_expr() {
                            self.parse_expr()
                        } else {
                            Expr::Var("ERROR".to_owned())
                        };
                        args.push((name, value));
                    }
                    Token::Comma | Token::RParen => {
                        // Bare identifier: taken as an attribute name with a
                        // missing value.
                        self.advance();
                        args.push((name, Expr::Var("ERROR".to_owned())));
                    }
                    _ => {
                        let value = self.parse_expr();
                        args.push(("value".to_owned(), value));
                    }
                }
            } else {
                let value = self.parse_expr();
                args.push(("value".to_owned(), value));
            }
            self.skip_newlines();
            if self.eat(&Token::Comma) {
                continue;
            }
            if self.eat(&Token::RParen) {
                return args;
            }
            let q = self.peek().describe_quoted();
            self.error_tok(self.pos, format!("expecting ')', found '{}'", q));
            self.resync(super::SyncContext::Paren);
            return args;
        }
    }
}
