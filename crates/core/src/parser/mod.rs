//! Recovery-aware recursive-descent parser.
//!
//! Parsing is total: every input produces a [`Module`] plus diagnostics,
//! never an `Err`. When a production fails mid-way the parser reports one
//! diagnostic, resynchronizes at a boundary chosen by the enclosing context
//! (see `recover`), substitutes a placeholder where a subtree is required,
//! and keeps going. Checks that need the whole batch (class resolution,
//! annotation attributes) are recorded as [`Pending`] and applied after all
//! units have parsed.

use crate::ast::Module;
use crate::builder::ModuleBuilder;
use crate::classify::classify;
use crate::diag::{Diagnostic, Diagnostics, Span};
use crate::lexer::{lex, Spanned, Token};
use crate::resolve::{self, Pending, TypeTable};
use crate::source::{SourceSet, SourceUnit};

mod clauses;
mod decls;
mod exprs;
mod recover;
mod stmts;

pub use recover::SyncContext;

/// Everything a parse call yields for one unit. `module` is always present,
/// even for badly broken input.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
    /// True when the committed structure should not be trusted.
    pub unrecoverable: bool,
}

/// Parse a batch. Units resolve class names against every unit in the set,
/// so a later unit can declare a class an earlier one mentions.
pub fn parse_units(set: &SourceSet) -> Vec<ParseOutcome> {
    let mut partials: Vec<Partial> = set.units().iter().map(parse_phase_a).collect();

    let modules: Vec<Module> = partials.iter().map(|p| p.module.clone()).collect();
    let table = TypeTable::build(&modules);
    for partial in &mut partials {
        resolve::apply(
            &partial.pending,
            &table,
            &partial.module.imports,
            &mut partial.diags,
        );
    }

    partials
        .into_iter()
        .map(|p| {
            let unrecoverable = classify(&p.diags, &p.module);
            ParseOutcome {
                module: p.module,
                diagnostics: p.diags.finish(),
                unrecoverable,
            }
        })
        .collect()
}

/// Single-unit convenience wrapper around [`parse_units`].
pub fn parse_unit(name: &str, text: &str) -> ParseOutcome {
    let mut set = SourceSet::new();
    set.add(name, text);
    parse_units(&set)
        .pop()
        .unwrap_or_else(|| unreachable!("one unit in, one outcome out"))
}

struct Partial {
    module: Module,
    diags: Diagnostics,
    pending: Vec<Pending>,
}

fn parse_phase_a(unit: &SourceUnit) -> Partial {
    let tokens = lex(&unit.text);
    let mut parser = Parser::new(&tokens, unit);
    parser.parse_compilation_unit();
    Partial {
        module: parser.builder.finish(),
        diags: parser.diags,
        pending: parser.pending,
    }
}

// ──────────────────────────────────────────────
// Keyword tables
// ──────────────────────────────────────────────

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
];

/// Words that can never name a local variable's type in a declaration.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "else", "while", "for", "switch", "case", "default", "try", "catch", "finally",
    "return", "new", "do", "in", "class", "interface", "extends", "implements", "package",
    "import", "static",
];

const PRIMITIVE_TYPES: &[&str] = &[
    "int", "long", "short", "byte", "double", "float", "boolean", "char", "void",
];

fn is_modifier(w: &str) -> bool {
    MODIFIERS.contains(&w)
}

/// Heuristic separating `String s` (declaration) from `print a` (command
/// call): `def`, primitive names, and capitalized words read as types.
fn is_type_word(w: &str) -> bool {
    if STATEMENT_KEYWORDS.contains(&w) {
        return false;
    }
    w == "def"
        || PRIMITIVE_TYPES.contains(&w)
        || w.chars().next().is_some_and(char::is_uppercase)
}

/// Statement context, selects the terminator recovery message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StmtCtx {
    /// Script level: junk after a statement is `expecting EOF, found 'x'`.
    TopLevel,
    /// Inside braces: junk is `unexpected token: x`.
    Block,
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
    diags: Diagnostics,
    pending: Vec<Pending>,
    builder: ModuleBuilder,
    /// Counter for generated catch parameter names (`__ex0`, `__ex1`, ...).
    catch_counter: u32,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned], unit: &SourceUnit) -> Self {
        Parser {
            tokens,
            pos: 0,
            diags: Diagnostics::new(&unit.name),
            pending: Vec::new(),
            builder: ModuleBuilder::new(&unit.name, unit.stem()),
            catch_counter: 0,
        }
    }

    // -- Cursor -------------------------------------------------

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn token_at(&self, i: usize) -> &Token {
        &self.tokens[i.min(self.tokens.len() - 1)].token
    }

    fn peek_ahead(&self, n: usize) -> &Token {
        self.token_at(self.pos + n)
    }

    fn advance(&mut self) -> Spanned {
        let t = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn at_eof(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn is_word(&self, w: &str) -> bool {
        matches!(self.peek(), Token::Word(x) if x == w)
    }

    fn eat_word(&mut self, w: &str) -> bool {
        if self.is_word(w) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat(&mut self, t: &Token) -> bool {
        if self.peek() == t {
            self.advance();
            true
        } else {
            false
        }
    }

    fn take_word(&mut self) -> Option<String> {
        if let Token::Word(w) = self.peek().clone() {
            self.advance();
            Some(w)
        } else {
            None
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek(), Token::Newline) {
            self.advance();
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Token::Newline | Token::Semi) {
            self.advance();
        }
    }

    // -- Diagnostics --------------------------------------------

    fn span_at(&self, i: usize) -> Span {
        let s = &self.tokens[i.min(self.tokens.len() - 1)];
        Span::new(s.line, s.col, s.len)
    }

    fn error_tok(&mut self, i: usize, message: impl Into<String>) {
        let span = self.span_at(i);
        self.diags.error_at(span.line, span.col, span.len, message);
    }

    fn error_span(&mut self, span: Span, message: impl Into<String>) {
        self.diags.error_at(span.line, span.col, span.len, message);
    }

    /// `unexpected token: X` at token `i`, with newline and EOF printing as
    /// the empty string.
    fn unexpected_at(&mut self, i: usize) {
        let desc = self.token_at(i).describe();
        self.error_tok(i, format!("unexpected token: {}", desc));
    }

    /// Report a lexical error token at the cursor, if there is one. Fatal
    /// ones (unterminated string) also flip the hard-fail flag.
    fn report_error_token(&mut self) -> bool {
        if let Token::Error { message, fatal } = self.peek().clone() {
            let s = self.cur().clone();
            self.diags.error_at(s.line, s.col, s.len, message);
            if fatal {
                self.diags.mark_hard_fail();
            }
            self.advance();
            true
        } else {
            false
        }
    }

    /// Token to blame for a missing right-hand side: the current token,
    /// except that a newline defers to a `}` visible past any newline run
    /// (which stays unconsumed so the enclosing block still closes).
    fn probe_target(&self) -> usize {
        if !matches!(self.peek(), Token::Newline) {
            return self.pos;
        }
        let mut i = self.pos;
        while matches!(self.token_at(i), Token::Newline) && i < self.tokens.len() - 1 {
            i += 1;
        }
        if matches!(self.token_at(i), Token::RBrace) {
            i
        } else {
            self.pos
        }
    }

    // -- Compilation unit ---------------------------------------

    fn parse_compilation_unit(&mut self) {
        self.skip_separators();
        if self.is_word("package") {
            self.parse_package();
        }
        loop {
            self.skip_separators();
            if self.is_word("import") {
                self.parse_import();
            } else {
                break;
            }
        }
        while !self.at_eof() {
            self.skip_separators();
            if self.at_eof() {
                break;
            }
            if self.report_error_token() {
                continue;
            }
            if self.looks_like_type_decl() {
                self.parse_type_decl();
            } else {
                let stmt = self.parse_statement(StmtCtx::TopLevel);
                self.builder.push_stmt(stmt);
                self.terminate_statement(StmtCtx::TopLevel);
            }
        }
    }

    /// Lookahead: does a type declaration start here? Scans over any leading
    /// annotations and modifiers without consuming.
    fn looks_like_type_decl(&self) -> bool {
        let mut i = self.pos;
        loop {
            match self.token_at(i) {
                Token::Newline => i += 1,
                Token::At => {
                    if matches!(self.token_at(i + 1), Token::Word(w) if w == "interface") {
                        return true;
                    }
                    i += 1;
                    if matches!(self.token_at(i), Token::Word(_)) {
                        i += 1;
                        while matches!(self.token_at(i), Token::Dot)
                            && matches!(self.token_at(i + 1), Token::Word(_))
                        {
                            i += 2;
                        }
                    }
                    if matches!(self.token_at(i), Token::LParen) {
                        i = self.skip_balanced(i);
                    }
                }
                Token::Word(w) if w == "class" || w == "interface" => return true,
                Token::Word(w) if is_modifier(w) => i += 1,
                _ => return false,
            }
            if i >= self.tokens.len() {
                return false;
            }
        }
    }

    /// Index one past the group opened at `i` (`(`, `[` or `{`), treating
    /// EOF as a closer.
    fn skip_balanced(&self, open: usize) -> usize {
        let mut depth = 0usize;
        let mut i = open;
        loop {
            match self.token_at(i) {
                Token::LParen | Token::LBracket | Token::LBrace => depth += 1,
                Token::RParen | Token::RBracket | Token::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return i + 1;
                    }
                }
                Token::Eof => return i,
                _ => {}
            }
            i += 1;
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Stmt};

    #[test]
    fn clean_class_parses_without_diagnostics() {
        let out = parse_unit("Foo.vsp", "class Foo {\n  int x\n  void m() {\n  }\n}\n");
        assert!(out.diagnostics.is_empty());
        assert!(!out.unrecoverable);
        let foo = out.module.class("Foo").unwrap();
        assert_eq!(foo.fields.len(), 1);
        assert_eq!(foo.fields[0].name, "x");
        assert!(foo.method("m").is_some());
        assert_eq!(foo.ctors.len(), 1);
        assert!(foo.ctors[0].generated);
    }

    #[test]
    fn script_statements_land_in_generated_run() {
        let out = parse_unit("Run.vsp", "def x = 1\nprint x\n");
        assert!(out.diagnostics.is_empty());
        let script = &out.module.classes[0];
        assert!(script.script);
        assert_eq!(script.name, "Run");
        let run = script.method("run").unwrap();
        assert_eq!(run.body.len(), 2);
        match &run.body[0] {
            Stmt::Expr(Expr::Declaration { type_name, name, .. }) => {
                assert_eq!(type_name, "def");
                assert_eq!(name, "x");
            }
            other => panic!("expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn batch_units_resolve_each_others_classes() {
        let mut set = SourceSet::new();
        set.add("A.vsp", "class A {\n  void m() {\n    new B\n  }\n}\n");
        set.add("B.vsp", "class B {\n}\n");
        let outs = parse_units(&set);
        // The dangling `new B` still reports its missing parens, but B
        // resolves because the second unit declares it.
        assert!(outs[0]
            .diagnostics
            .iter()
            .all(|d| !d.message.contains("unable to resolve")));
        assert!(outs[1].diagnostics.is_empty());
    }

    #[test]
    fn every_input_produces_a_module() {
        for src in ["", "!!!", "class", "def x = \n}", "\n\n\n", "package"] {
            let out = parse_unit("X.vsp", src);
            assert_eq!(out.module.unit, "X.vsp");
        }
    }

    #[test]
    fn top_level_junk_after_statement() {
        let out = parse_unit("X.vsp", "def x = 1 1\n");
        assert_eq!(out.diagnostics.len(), 1);
        assert_eq!(out.diagnostics[0].message, "expecting EOF, found '1'");
    }
}
