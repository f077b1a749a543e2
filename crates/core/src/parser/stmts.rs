//! Statements.
//!
//! Statements are newline-terminated. Each parse_* returns a [`Stmt`] even
//! on broken input; the terminator check afterwards decides whether trailing
//! junk is `unexpected token:` (inside braces) or `expecting EOF, found`
//! (script level).

use super::{is_type_word, Parser, StmtCtx, SyncContext, STATEMENT_KEYWORDS};
use crate::ast::{CaseClause, CatchClause, Expr, Literal, Param, Stmt};
use crate::diag::Span;
use crate::lexer::Token;

impl Parser<'_> {
    pub(super) fn parse_statement(&mut self, ctx: StmtCtx) -> Stmt {
        let line = self.cur().line;
        match self.peek().clone() {
            Token::LBrace => {
                self.advance();
                Stmt::Block(self.parse_block_stmts())
            }
            Token::Semi => {
                self.advance();
                Stmt::Empty
            }
            Token::Error { .. } => {
                self.report_error_token();
                Stmt::Error { line }
            }
            Token::Word(w) => match w.as_str() {
                "return" => {
                    self.advance();
                    let value = if self.starts_expr() {
                        self.parse_expr()
                    } else {
                        Expr::Literal(Literal::Null)
                    };
                    Stmt::Return(value)
                }
                "if" => self.parse_if(ctx),
                "while" => self.parse_while(),
                "for" => self.parse_for(),
                "switch" => self.parse_switch(),
                "try" => self.parse_try(),
                "do" => {
                    // No do/while loop form; complain about the keyword and
                    // parse what follows as an ordinary statement.
                    self.unexpected_at(self.pos);
                    self.advance();
                    self.skip_newlines();
                    self.parse_statement(ctx)
                }
                _ if matches!(self.peek_ahead(1), Token::Colon)
                    && !STATEMENT_KEYWORDS.contains(&w.as_str()) =>
                {
                    // Label; the labeled statement stands on its own.
                    self.advance();
                    self.advance();
                    self.skip_newlines();
                    self.parse_statement(ctx)
                }
                _ => self.parse_expr_statement(line),
            },
            _ => self.parse_expr_statement(line),
        }
    }

    /// Statements inside `{ ... }`, consuming the closing brace.
    pub(super) fn parse_block_stmts(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&Token::RBrace) || self.at_eof() {
                return stmts;
            }
            let line = self.cur().line;
            if self.report_error_token() {
                stmts.push(Stmt::Error { line });
                continue;
            }
            stmts.push(self.parse_statement(StmtCtx::Block));
            self.terminate_statement(StmtCtx::Block);
        }
    }

    pub(super) fn terminate_statement(&mut self, ctx: StmtCtx) {
        loop {
            if self.eat(&Token::Semi) || self.report_error_token() {
                continue;
            }
            break;
        }
        match self.peek() {
            Token::Newline => {
                self.advance();
            }
            Token::RBrace | Token::Eof => {}
            _ => {
                match ctx {
                    StmtCtx::TopLevel => {
                        let q = self.peek().describe_quoted();
                        self.error_tok(self.pos, format!("expecting EOF, found '{}'", q));
                    }
                    StmtCtx::Block => self.unexpected_at(self.pos),
                }
                self.skip_line();
            }
        }
    }

    // -- Control flow -------------------------------------------

    fn parse_if(&mut self, ctx: StmtCtx) -> Stmt {
        self.advance();
        let cond = self.parse_paren_cond();
        self.skip_newlines();
        let then = Box::new(self.parse_statement(StmtCtx::Block));
        let mut els = None;
        let mut i = self.pos;
        while matches!(self.token_at(i), Token::Newline) && i < self.tokens.len() - 1 {
            i += 1;
        }
        if matches!(self.token_at(i), Token::Word(w) if w == "else") {
            self.pos = i;
            self.advance();
            self.skip_newlines();
            els = Some(Box::new(self.parse_statement(ctx)));
        }
        Stmt::If { cond, then, els }
    }

    fn parse_while(&mut self) -> Stmt {
        self.advance();
        let cond = self.parse_paren_cond();
        self.skip_newlines();
        let body = Box::new(self.parse_statement(StmtCtx::Block));
        Stmt::While { cond, body }
    }

    /// `for (x in expr) stmt`, with an optional type before the variable.
    fn parse_for(&mut self) -> Stmt {
        self.advance();
        if !self.eat(&Token::LParen) {
            self.unexpected_at(self.pos);
            self.resync(SyncContext::Statement);
            return Stmt::Error { line: self.cur().line };
        }
        let var = match self.take_word() {
            Some(w) if matches!(self.peek(), Token::Word(n) if n != "in") && is_type_word(&w) => {
                self.take_word().unwrap_or(w)
            }
            Some(w) => w,
            None => {
                self.unexpected_at(self.pos);
                self.resync(SyncContext::Paren);
                return Stmt::Error { line: self.cur().line };
            }
        };
        if !self.eat_word("in") {
            self.unexpected_at(self.pos);
            self.resync(SyncContext::Paren);
            self.skip_newlines();
            let body = Box::new(self.parse_statement(StmtCtx::Block));
            return Stmt::ForIn {
                var,
                iterable: Expr::placeholder(),
                body,
            };
        }
        let iterable = if self.starts_expr() {
            self.parse_expr()
        } else {
            let t = self.probe_target();
            self.unexpected_at(t);
            Expr::placeholder()
        };
        self.close_paren();
        self.skip_newlines();
        let body = Box::new(self.parse_statement(StmtCtx::Block));
        Stmt::ForIn {
            var,
            iterable,
            body,
        }
    }

    fn parse_switch(&mut self) -> Stmt {
        self.advance();
        let subject = self.parse_paren_cond();
        self.skip_newlines();
        if !self.eat(&Token::LBrace) {
            self.unexpected_at(self.pos);
            self.skip_line();
            return Stmt::Switch {
                subject,
                cases: Vec::new(),
            };
        }
        let mut cases = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(&Token::RBrace) || self.at_eof() {
                break;
            }
            let line = self.cur().line;
            if self.eat_word("case") {
                let label = if self.starts_expr() {
                    self.parse_expr()
                } else {
                    let t = self.probe_target();
                    self.unexpected_at(t);
                    Expr::placeholder()
                };
                self.case_colon();
                cases.push(CaseClause {
                    label: Some(label),
                    stmts: self.parse_case_stmts(),
                    line,
                });
            } else if self.eat_word("default") {
                self.case_colon();
                cases.push(CaseClause {
                    label: None,
                    stmts: self.parse_case_stmts(),
                    line,
                });
            } else {
                self.unexpected_at(self.pos);
                self.skip_line();
            }
        }
        Stmt::Switch { subject, cases }
    }

    /// The `:` after a case label. When missing at the end of the line, the
    /// line break itself is blamed; a `}` on the following line earns its
    /// own complaint but stays unconsumed so the switch still closes. The
    /// case is kept either way.
    fn case_colon(&mut self) {
        if self.eat(&Token::Colon) {
            return;
        }
        let q = self.peek().describe_quoted();
        self.error_tok(self.pos, format!("expecting ':', found '{}'", q));
        if matches!(self.peek(), Token::Newline) {
            let mut i = self.pos;
            while matches!(self.token_at(i), Token::Newline) && i < self.tokens.len() - 1 {
                i += 1;
            }
            if matches!(self.token_at(i), Token::RBrace) {
                self.unexpected_at(i);
            }
        }
    }

    fn parse_case_stmts(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            if matches!(self.peek(), Token::RBrace | Token::Eof)
                || self.is_word("case")
                || self.is_word("default")
            {
                return stmts;
            }
            let line = self.cur().line;
            if self.report_error_token() {
                stmts.push(Stmt::Error { line });
                continue;
            }
            stmts.push(self.parse_statement(StmtCtx::Block));
            self.terminate_statement(StmtCtx::Block);
        }
    }

    fn parse_try(&mut self) -> Stmt {
        self.advance();
        self.skip_newlines();
        let body = if self.eat(&Token::LBrace) {
            self.parse_block_stmts()
        } else {
            self.unexpected_at(self.pos);
            self.skip_line();
            Vec::new()
        };
        let mut catches = Vec::new();
        loop {
            let mut i = self.pos;
            while matches!(self.token_at(i), Token::Newline) && i < self.tokens.len() - 1 {
                i += 1;
            }
            if matches!(self.token_at(i), Token::Word(w) if w == "catch") {
                self.pos = i;
                self.advance();
                catches.push(self.parse_catch_clause());
            } else {
                break;
            }
        }
        let mut finally = None;
        let mut i = self.pos;
        while matches!(self.token_at(i), Token::Newline) && i < self.tokens.len() - 1 {
            i += 1;
        }
        if matches!(self.token_at(i), Token::Word(w) if w == "finally") {
            self.pos = i;
            self.advance();
            self.skip_newlines();
            if self.eat(&Token::LBrace) {
                finally = Some(self.parse_block_stmts());
            } else {
                self.unexpected_at(self.pos);
                self.skip_line();
            }
        }
        Stmt::Try {
            body,
            catches,
            finally,
        }
    }

    /// `catch (A | B name) { ... }`. A multi-catch with no binding name gets
    /// a generated one so the clause survives in the AST.
    fn parse_catch_clause(&mut self) -> CatchClause {
        let mut types = Vec::new();
        let mut name = None;
        let mut generated = false;
        if self.eat(&Token::LParen) {
            let mut words = Vec::new();
            loop {
                match self.take_word() {
                    Some(w) => words.push(w),
                    None => break,
                }
                if !self.eat(&Token::Pipe) {
                    break;
                }
            }
            // A single lowercase word before `)` is an untyped binding.
            if words.len() == 1
                && matches!(self.peek(), Token::RParen)
                && words[0].chars().next().is_some_and(char::is_lowercase)
            {
                name = words.pop();
            } else {
                types = words;
                if let Token::Word(n) = self.peek().clone() {
                    self.advance();
                    name = Some(n);
                }
            }
            if name.is_none() {
                // Blamed at whatever sits where the binding should be,
                // usually the closing paren.
                let q = self.peek().describe_quoted();
                self.error_tok(self.pos, format!("expecting an identifier, found '{}'", q));
                generated = true;
            }
            if !self.eat(&Token::RParen) {
                let q = self.peek().describe_quoted();
                self.error_tok(self.pos, format!("expecting ')', found '{}'", q));
                self.resync(SyncContext::Paren);
            }
        } else {
            self.unexpected_at(self.pos);
            generated = true;
        }
        let param = Param {
            name: name.unwrap_or_else(|| {
                let n = format!("__ex{}", self.catch_counter);
                self.catch_counter += 1;
                n
            }),
            type_name: types.first().cloned().unwrap_or_else(|| "def".to_owned()),
            varargs: false,
            generated_name: generated,
        };
        self.skip_newlines();
        let body = if self.eat(&Token::LBrace) {
            self.parse_block_stmts()
        } else {
            Vec::new()
        };
        CatchClause { types, param, body }
    }

    // -- Expression statements ----------------------------------

    fn parse_expr_statement(&mut self, line: u32) -> Stmt {
        if let Token::Word(t) = self.peek().clone() {
            if is_type_word(&t) && matches!(self.peek_ahead(1), Token::Word(_)) {
                return self.parse_declaration(line);
            }
        }
        let expr = self.parse_expr();
        // Command call: `print x` applies a bare name to the rest of the
        // line as arguments.
        if let Expr::Var(callee) = &expr {
            if self.starts_expr() && !matches!(self.peek(), Token::LBrace) {
                let args = self.parse_command_args();
                return Stmt::Expr(Expr::Call {
                    recv: None,
                    name: callee.clone(),
                    args,
                });
            }
        }
        Stmt::Expr(expr)
    }

    fn parse_declaration(&mut self, line: u32) -> Stmt {
        let type_name = self.take_word().unwrap_or_default();
        let name_idx = self.pos;
        let name = self.take_word().unwrap_or_default();
        // A brace cannot follow a declared name; drop the declaration and
        // the rest of its line only. The brace is NOT paired with a later
        // `}` -- that one must stay free to close the enclosing block, or
        // a broken statement would swallow its sibling members.
        if matches!(self.peek(), Token::LBrace) {
            let span = self.span_at(name_idx);
            self.error_span(
                Span::new(span.line, span.col, 1),
                format!("unexpected token: {}", name),
            );
            self.skip_line();
            return Stmt::Error { line };
        }
        let init = if self.eat(&Token::Assign) {
            Some(Box::new(self.parse_rhs()))
        } else {
            None
        };
        Stmt::Expr(Expr::Declaration {
            type_name,
            name,
            init,
        })
    }

    pub(super) fn parse_command_args(&mut self) -> Vec<Expr> {
        let mut args = Vec::new();
        loop {
            if self.starts_expr() {
                args.push(self.parse_expr());
            } else {
                let t = self.probe_target();
                self.unexpected_at(t);
                args.push(Expr::placeholder());
            }
            if !self.eat(&Token::Comma) {
                return args;
            }
        }
    }

    /// `( expr )` for conditions and switch subjects, with paren-scoped
    /// resynchronization.
    pub(super) fn parse_paren_cond(&mut self) -> Expr {
        if !self.eat(&Token::LParen) {
            self.unexpected_at(self.pos);
            return Expr::placeholder();
        }
        let cond = if self.starts_expr() {
            self.parse_expr()
        } else {
            let t = self.probe_target();
            self.unexpected_at(t);
            Expr::placeholder()
        };
        self.close_paren();
        cond
    }

    fn close_paren(&mut self) {
        if self.eat(&Token::RParen) {
            return;
        }
        let q = self.peek().describe_quoted();
        self.error_tok(self.pos, format!("expecting ')', found '{}'", q));
        self.resync(SyncContext::Paren);
    }
}
