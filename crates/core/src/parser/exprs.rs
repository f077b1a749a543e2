//! Expressions.
//!
//! A straightforward precedence ladder. Missing operands go through the
//! right-hand-side probe (`Parser::probe_target`): the blamed token is the
//! current one, except that a newline defers to a closing brace visible past
//! the line break. Every recovery substitutes a placeholder so callers
//! always get an expression back.

use super::Parser;
use crate::ast::{Expr, Literal, Param};
use crate::diag::Span;
use crate::lexer::Token;
use crate::resolve::Pending;

impl Parser<'_> {
    /// Can the current token begin an expression?
    pub(super) fn starts_expr(&self) -> bool {
        match self.peek() {
            Token::Word(w) => !matches!(
                w.as_str(),
                "in" | "case" | "default" | "else" | "catch" | "finally" | "extends"
                    | "implements"
            ),
            Token::Str(_)
            | Token::Int(_)
            | Token::Float(_)
            | Token::LParen
            | Token::LBracket
            | Token::LBrace
            | Token::Minus
            | Token::Bang => true,
            // Lexical garbage where an operand belongs is consumed (and
            // reported) by parse_primary, not blamed by the probe.
            Token::Error { .. } => true,
            _ => false,
        }
    }

    pub(super) fn parse_expr(&mut self) -> Expr {
        self.parse_assignment()
    }

    /// Right-hand side of `=` and friends: probe-and-placeholder when the
    /// operand is missing.
    pub(super) fn parse_rhs(&mut self) -> Expr {
        if self.starts_expr() {
            self.parse_expr()
        } else {
            let t = self.probe_target();
            self.unexpected_at(t);
            Expr::placeholder()
        }
    }

    fn operand(&mut self, next: fn(&mut Self) -> Expr) -> Expr {
        if self.starts_expr() {
            next(self)
        } else {
            let t = self.probe_target();
            self.unexpected_at(t);
            Expr::placeholder()
        }
    }

    // -- Precedence ladder --------------------------------------

    fn parse_assignment(&mut self) -> Expr {
        let left = self.parse_ternary();
        let op = match self.peek() {
            Token::Assign => "=",
            Token::PlusAssign => "+=",
            Token::MinusAssign => "-=",
            Token::StarAssign => "*=",
            Token::SlashAssign => "/=",
            Token::PowAssign => "**=",
            _ => return left,
        };
        self.advance();
        let right = self.operand(Self::parse_assignment);
        Expr::Binary {
            op: op.to_owned(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn parse_ternary(&mut self) -> Expr {
        let cond = self.parse_range();
        if !self.eat(&Token::Question) {
            return cond;
        }
        self.skip_newlines();
        let then = self.operand(Self::parse_expr);
        let els = if self.eat(&Token::Colon) {
            self.skip_newlines();
            self.operand(Self::parse_expr)
        } else {
            let t = self.probe_target();
            let q = self.token_at(t).describe_quoted();
            self.error_tok(t, format!("expecting ':', found '{}'", q));
            Expr::placeholder()
        };
        Expr::Ternary {
            cond: Box::new(cond),
            then: Box::new(then),
            els: Box::new(els),
        }
    }

    fn parse_range(&mut self) -> Expr {
        let from = self.parse_equality();
        let exclusive = match self.peek() {
            Token::Range => false,
            Token::RangeOpen => true,
            _ => return from,
        };
        self.advance();
        let to = self.operand(Self::parse_equality);
        Expr::Range {
            from: Box::new(from),
            to: Box::new(to),
            exclusive,
        }
    }

    fn parse_equality(&mut self) -> Expr {
        let mut left = self.parse_comparison();
        loop {
            let op = match self.peek() {
                Token::Eq => "==",
                Token::Neq => "!=",
                _ => return left,
            };
            self.advance();
            let right = self.operand(Self::parse_comparison);
            left = Expr::Binary {
                op: op.to_owned(),
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_comparison(&mut self) -> Expr {
        let mut left = self.parse_additive();
        loop {
            let op = match self.peek() {
                Token::Lt => "<",
                Token::Lte => "<=",
                Token::Gt => ">",
                Token::Gte => ">=",
                _ => return left,
            };
            self.advance();
            let right = self.operand(Self::parse_additive);
            left = Expr::Binary {
                op: op.to_owned(),
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_additive(&mut self) -> Expr {
        let mut left = self.parse_multiplicative();
        loop {
            let op = match self.peek() {
                Token::Plus => "+",
                Token::Minus => "-",
                _ => return left,
            };
            self.advance();
            let right = self.operand(Self::parse_multiplicative);
            left = Expr::Binary {
                op: op.to_owned(),
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn parse_multiplicative(&mut self) -> Expr {
        let mut left = self.parse_power();
        loop {
            let op = match self.peek() {
                Token::Star => "*",
                Token::Slash => "/",
                Token::Percent => "%",
                _ => return left,
            };
            self.advance();
            let right = self.operand(Self::parse_power);
            left = Expr::Binary {
                op: op.to_owned(),
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    // `**` is right-associative.
    fn parse_power(&mut self) -> Expr {
        let base = self.parse_unary();
        if !self.eat(&Token::Pow) {
            return base;
        }
        let exp = self.operand(Self::parse_power);
        Expr::Binary {
            op: "**".to_owned(),
            left: Box::new(base),
            right: Box::new(exp),
        }
    }

    fn parse_unary(&mut self) -> Expr {
        let op = match self.peek() {
            Token::Minus => "-",
            Token::Bang => "!",
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.operand(Self::parse_unary);
        Expr::Unary {
            op: op.to_owned(),
            operand: Box::new(operand),
        }
    }

    // -- Postfix ------------------------------------------------

    fn parse_postfix(&mut self) -> Expr {
        let mut expr = self.parse_primary();
        loop {
            match self.peek() {
                Token::Dot | Token::SafeDot => {
                    self.advance();
                    match self.peek().clone() {
                        Token::Word(name) => {
                            self.advance();
                            if matches!(self.peek(), Token::LParen) {
                                let args = self.parse_call_args();
                                expr = Expr::Call {
                                    recv: Some(Box::new(expr)),
                                    name,
                                    args,
                                };
                            } else {
                                expr = push_segment(expr, name);
                            }
                        }
                        _ => {
                            // Dangling dot: report it, keep the truncated
                            // path for content-assist consumers.
                            self.unexpected_at(self.pos);
                            expr = truncate_path(expr);
                            return expr;
                        }
                    }
                }
                Token::LBracket => {
                    self.advance();
                    self.skip_newlines();
                    let index = self.parse_rhs();
                    self.skip_newlines();
                    if !self.eat(&Token::RBracket) {
                        let q = self.peek().describe_quoted();
                        self.error_tok(self.pos, format!("expecting ']', found '{}'", q));
                        return expr;
                    }
                    expr = Expr::Index {
                        base: Box::new(expr),
                        index: Box::new(index),
                    };
                }
                _ => return expr,
            }
        }
    }

    // -- Primary ------------------------------------------------

    fn parse_primary(&mut self) -> Expr {
        match self.peek().clone() {
            Token::Int(n) => {
                self.advance();
                Expr::Literal(Literal::Int(n))
            }
            Token::Float(f) => {
                self.advance();
                Expr::Literal(Literal::Float(f))
            }
            Token::Str(s) => {
                self.advance();
                Expr::Literal(Literal::Str(s))
            }
            Token::Word(w) => match w.as_str() {
                "true" => {
                    self.advance();
                    Expr::Literal(Literal::Bool(true))
                }
                "false" => {
                    self.advance();
                    Expr::Literal(Literal::Bool(false))
                }
                "null" => {
                    self.advance();
                    Expr::Literal(Literal::Null)
                }
                "new" => self.parse_new(),
                _ => {
                    self.advance();
                    if matches!(self.peek(), Token::LParen) {
                        let args = self.parse_call_args();
                        Expr::Call {
                            recv: None,
                            name: w,
                            args,
                        }
                    } else if matches!(self.peek(), Token::Dot | Token::SafeDot)
                        && w.chars().next().is_some_and(char::is_uppercase)
                    {
                        Expr::ClassRef(w)
                    } else {
                        Expr::Var(w)
                    }
                }
            },
            Token::LParen => {
                self.advance();
                self.skip_newlines();
                let inner = self.parse_rhs();
                self.skip_newlines();
                if !self.eat(&Token::RParen) {
                    let q = self.peek().describe_quoted();
                    self.error_tok(self.pos, format!("expecting ')', found '{}'", q));
                    self.resync(super::SyncContext::Paren);
                }
                inner
            }
            Token::LBracket => self.parse_list_literal(),
            Token::LBrace => self.parse_closure(),
            Token::Error { .. } => {
                self.report_error_token();
                Expr::placeholder()
            }
            _ => {
                self.unexpected_at(self.pos);
                // Consume the offender so the parse always makes progress.
                self.advance();
                Expr::placeholder()
            }
        }
    }

    /// Parenthesized argument list, cursor on `(`. Newlines inside the
    /// parens are insignificant.
    pub(super) fn parse_call_args(&mut self) -> Vec<Expr> {
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
            if self.starts_expr() {
                args.push(self.parse_expr());
            } else {
                self.unexpected_at(self.pos);
                self.advance();
                args.push(Expr::placeholder());
                continue;
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

    /// `new T(...)` or `new T[n]`. With neither continuation the expression
    /// is reported here and the type name resolved batch-wide afterwards.
    fn parse_new(&mut self) -> Expr {
        let new_idx = self.pos;
        self.advance();
        let Some((type_name, span)) = self.parse_dotted_name() else {
            self.error_tok(new_idx, "missing type for constructor call");
            return Expr::placeholder();
        };
        match self.peek() {
            Token::LParen => {
                let args = self.parse_call_args();
                Expr::New {
                    type_name,
                    args,
                    array: false,
                }
            }
            Token::LBracket => {
                self.advance();
                let size = self.parse_rhs();
                if !self.eat(&Token::RBracket) {
                    let q = self.peek().describe_quoted();
                    self.error_tok(self.pos, format!("expecting ']', found '{}'", q));
                }
                Expr::New {
                    type_name,
                    args: vec![size],
                    array: true,
                }
            }
            _ => {
                self.error_span(
                    Span::new(span.line, span.col, 1),
                    "expecting '(' or '[' after type name to continue new expression",
                );
                self.pending.push(Pending::ResolveClass {
                    name: type_name.clone(),
                    span,
                });
                Expr::New {
                    type_name,
                    args: Vec::new(),
                    array: false,
                }
            }
        }
    }

    fn parse_list_literal(&mut self) -> Expr {
        self.advance(); // [
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(&Token::RBracket) {
                return Expr::ListLit(items);
            }
            if self.at_eof() {
                self.error_tok(self.pos, "expecting ']', found ''");
                return Expr::ListLit(items);
            }
            items.push(self.parse_rhs());
            self.skip_newlines();
            if self.eat(&Token::Comma) {
                continue;
            }
            if !self.eat(&Token::RBracket) {
                let q = self.peek().describe_quoted();
                self.error_tok(self.pos, format!("expecting ']', found '{}'", q));
                self.skip_line();
            }
            return Expr::ListLit(items);
        }
    }

    /// `{ a, b -> stmts }` or `{ stmts }`. Whether a parameter list is
    /// present is decided by scanning for `->` at brace depth one.
    fn parse_closure(&mut self) -> Expr {
        self.advance(); // {
        let mut params = Vec::new();
        if self.closure_has_params() {
            self.skip_newlines();
            loop {
                let Some(w1) = self.take_word() else {
                    break;
                };
                let param = if let Token::Word(name) = self.peek().clone() {
                    self.advance();
                    Param {
                        name,
                        type_name: w1,
                        varargs: false,
                        generated_name: false,
                    }
                } else {
                    Param {
                        name: w1,
                        type_name: "def".to_owned(),
                        varargs: false,
                        generated_name: false,
                    }
                };
                params.push(param);
                if !self.eat(&Token::Comma) {
                    break;
                }
                self.skip_newlines();
            }
            // The arrow is known to be ahead; tolerate junk before it.
            while !matches!(self.peek(), Token::Arrow | Token::RBrace | Token::Eof) {
                self.advance();
            }
            self.eat(&Token::Arrow);
        }
        let body = self.parse_block_stmts();
        Expr::Closure { params, body }
    }

    fn closure_has_params(&self) -> bool {
        let mut depth = 1usize;
        let mut i = self.pos;
        loop {
            match self.token_at(i) {
                Token::LBrace => depth += 1,
                Token::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return false;
                    }
                }
                Token::Arrow if depth == 1 => return true,
                Token::Eof => return false,
                _ => {}
            }
            i += 1;
        }
    }
}

fn push_segment(expr: Expr, name: String) -> Expr {
    match expr {
        Expr::Path {
            base,
            mut segments,
            truncated,
        } => {
            segments.push(name);
            Expr::Path {
                base,
                segments,
                truncated,
            }
        }
        other => Expr::Path {
            base: Box::new(other),
            segments: vec![name],
            truncated: false,
        },
    }
}

fn truncate_path(expr: Expr) -> Expr {
    match expr {
        Expr::Path { base, segments, .. } => Expr::Path {
            base,
            segments,
            truncated: true,
        },
        other => Expr::Path {
            base: Box::new(other),
            segments: Vec::new(),
            truncated: true,
        },
    }
}
