//! Type declarations and their members.
//!
//! A class is committed to the module as soon as its header parses, so a
//! broken body still leaves the declaration in the AST. Member recovery is
//! line-scoped: a member that cannot be parsed costs one diagnostic and the
//! rest of its line, never the rest of the class.

use super::{is_modifier, Parser, SyncContext};
use crate::ast::{
    Annotation, AttrDecl, ClassDecl, FieldDecl, MethodDecl, Param, Stmt, TypeKind,
};
use crate::diag::Span;
use crate::lexer::Token;
use crate::resolve::Pending;

const MISSING_BODY: &str =
    "You defined a method without a body. Try adding a body, or declare it abstract.";

impl Parser<'_> {
    pub(super) fn parse_type_decl(&mut self) {
        self.skip_newlines();
        let annotations = self.parse_annotations();
        self.skip_newlines();
        let modifiers = self.parse_modifiers();

        let kind = if self.eat_word("class") {
            TypeKind::Class
        } else if self.eat_word("interface") {
            TypeKind::Interface
        } else if matches!(self.peek(), Token::At)
            && matches!(self.peek_ahead(1), Token::Word(w) if w == "interface")
        {
            self.advance();
            self.advance();
            TypeKind::Annotation
        } else {
            self.unexpected_at(self.pos);
            self.skip_line();
            return;
        };

        let name_idx = self.pos;
        let Some(name) = self.take_word() else {
            self.unexpected_at(self.pos);
            self.skip_line();
            return;
        };
        let name_span = self.span_at(name_idx);

        let mut class = ClassDecl::new(name, kind, name_span.line);
        class.annotations = annotations;
        class.modifiers = modifiers;

        let mut malformed = false;
        if self.eat_word("extends") {
            match self.parse_dotted_name() {
                Some((superclass, span)) => {
                    self.pending.push(Pending::ResolveClass {
                        name: superclass.clone(),
                        span,
                    });
                    class.superclass = Some(superclass);
                }
                None => {
                    self.malformed_class(name_span);
                    malformed = true;
                }
            }
        }
        if self.eat_word("implements") {
            loop {
                match self.parse_dotted_name() {
                    Some((iface, _)) => class.interfaces.push(iface),
                    None => {
                        if !malformed {
                            self.malformed_class(name_span);
                            malformed = true;
                        }
                        break;
                    }
                }
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        self.skip_newlines();
        if self.eat(&Token::LBrace) {
            self.parse_class_body(&mut class);
        } else if !malformed {
            // Header cut off before the body: keep the class anyway.
            self.malformed_class(name_span);
            malformed = true;
            self.skip_line();
        }
        class.malformed = malformed;
        self.builder.add_class(class);
    }

    /// Blames the last character of the class name, matching where an editor
    /// wants the fix-it anchor.
    fn malformed_class(&mut self, name_span: Span) {
        let col = name_span.col + name_span.len.saturating_sub(1);
        self.error_span(
            Span::new(name_span.line, col, 1),
            "Malformed class declaration",
        );
    }

    fn parse_modifiers(&mut self) -> Vec<String> {
        let mut modifiers = Vec::new();
        while let Token::Word(w) = self.peek() {
            if is_modifier(w) {
                modifiers.push(w.clone());
                self.advance();
            } else {
                break;
            }
        }
        modifiers
    }

    // -- Class body ---------------------------------------------

    fn parse_class_body(&mut self, class: &mut ClassDecl) {
        loop {
            self.skip_separators();
            if self.eat(&Token::RBrace) || self.at_eof() {
                return;
            }
            if self.report_error_token() {
                continue;
            }
            self.parse_member(class);
        }
    }

    fn parse_member(&mut self, class: &mut ClassDecl) {
        let annotations = self.parse_annotations();
        self.skip_newlines();
        let modifiers = self.parse_modifiers();

        if modifiers.iter().any(|m| m == "static") && matches!(self.peek(), Token::LBrace) {
            self.advance();
            let body = self.parse_block_stmts();
            class.static_init = Some(body);
            return;
        }

        if class.kind == TypeKind::Annotation {
            self.parse_attr_decl(class);
            return;
        }

        let w1_idx = self.pos;
        let Some(w1) = self.take_word() else {
            self.unexpected_at(self.pos);
            self.skip_line();
            return;
        };
        let line = self.span_at(w1_idx).line;

        // Constructor: the class's own name followed by a parameter list.
        if w1 == class.name && matches!(self.peek(), Token::LParen) {
            let Some(params) = self.parse_params() else {
                self.skip_line();
                return;
            };
            let body = self.parse_member_body(class, &modifiers, w1_idx);
            class.ctors.push(MethodDecl {
                name: w1,
                return_type: String::new(),
                modifiers,
                annotations,
                params,
                body,
                generated: false,
                line,
            });
            return;
        }

        // Untyped method: `foo() { ... }`.
        if matches!(self.peek(), Token::LParen) {
            self.parse_method(class, w1, "def".to_owned(), w1_idx, modifiers, annotations, line);
            return;
        }

        if let Token::Word(name) = self.peek().clone() {
            self.advance();
            if matches!(self.peek(), Token::LParen) {
                self.parse_method(class, name, w1, w1_idx, modifiers, annotations, line);
                return;
            }
            // Field, with an optional initializer.
            let init = if self.eat(&Token::Assign) {
                Some(self.parse_rhs())
            } else {
                None
            };
            class.fields.push(FieldDecl {
                name,
                type_name: w1,
                modifiers,
                annotations,
                init,
                line,
            });
            self.terminate_member();
            return;
        }

        // A lone word is not a member.
        self.unexpected_at(w1_idx);
        self.skip_line();
    }

    #[allow(clippy::too_many_arguments)]
    fn parse_method(
        &mut self,
        class: &mut ClassDecl,
        name: String,
        return_type: String,
        blame_idx: usize,
        modifiers: Vec<String>,
        annotations: Vec<Annotation>,
        line: u32,
    ) {
        let Some(params) = self.parse_params() else {
            // The parameter diagnostic already fired; the method is dropped.
            self.skip_line();
            return;
        };
        let body = self.parse_member_body(class, &modifiers, blame_idx);
        class.methods.push(MethodDecl {
            name,
            return_type,
            modifiers,
            annotations,
            params,
            body,
            generated: false,
            line,
        });
    }

    /// Body of a method or constructor. A brace may sit on the next line;
    /// if none follows at all, the method is registered with an empty body
    /// and -- for concrete class methods -- one diagnostic at `blame_idx`.
    fn parse_member_body(
        &mut self,
        class: &ClassDecl,
        modifiers: &[String],
        blame_idx: usize,
    ) -> Vec<Stmt> {
        let mut i = self.pos;
        while matches!(self.token_at(i), Token::Newline) && i < self.tokens.len() - 1 {
            i += 1;
        }
        if matches!(self.token_at(i), Token::LBrace) {
            self.pos = i;
            self.advance();
            return self.parse_block_stmts();
        }
        let abstract_ok = class.kind != TypeKind::Class
            || modifiers.iter().any(|m| m == "abstract");
        if !abstract_ok {
            self.error_tok(blame_idx, MISSING_BODY);
        }
        Vec::new()
    }

    /// Parenthesized parameter list. `None` means the list was broken badly
    /// enough that the member should not be registered; the diagnostic
    /// blaming the offending parameter has already been emitted.
    fn parse_params(&mut self) -> Option<Vec<Param>> {
        self.advance(); // (
        let mut params = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(&Token::RParen) {
                return Some(params);
            }
            if self.at_eof() {
                self.error_tok(self.pos, "expecting ')', found ''");
                return Some(params);
            }
            let start_idx = self.pos;
            let Some(w1) = self.take_word() else {
                self.unexpected_at(self.pos);
                return None;
            };
            let param = match self.peek().clone() {
                Token::Word(name) => {
                    self.advance();
                    Param {
                        name,
                        type_name: w1,
                        varargs: false,
                        generated_name: false,
                    }
                }
                Token::Ellipsis => {
                    self.advance();
                    match self.take_word() {
                        Some(name) => Param {
                            name,
                            type_name: w1,
                            varargs: true,
                            generated_name: false,
                        },
                        None => {
                            self.unexpected_at(self.pos);
                            return None;
                        }
                    }
                }
                _ => Param {
                    name: w1,
                    type_name: "def".to_owned(),
                    varargs: false,
                    generated_name: false,
                },
            };
            params.push(param);
            match self.peek() {
                Token::Comma => {
                    self.advance();
                }
                Token::RParen => {
                    self.advance();
                    return Some(params);
                }
                _ => {
                    // Blame the token that began the unfinished parameter.
                    self.unexpected_at(start_idx);
                    return None;
                }
            }
        }
    }

    /// `@interface` body entry: `Type name()` with an optional default.
    fn parse_attr_decl(&mut self, class: &mut ClassDecl) {
        let Some(type_name) = self.take_word() else {
            self.unexpected_at(self.pos);
            self.skip_line();
            return;
        };
        let Some(name) = self.take_word() else {
            self.unexpected_at(self.pos);
            self.skip_line();
            return;
        };
        if self.eat(&Token::LParen) && !self.eat(&Token::RParen) {
            let q = self.peek().describe_quoted();
            self.error_tok(self.pos, format!("expecting ')', found '{}'", q));
            self.resync(SyncContext::Paren);
        }
        let has_default = if self.eat_word("default") {
            let _ = self.parse_rhs();
            true
        } else {
            false
        };
        class.attrs.push(AttrDecl {
            name,
            type_name,
            has_default,
        });
        self.terminate_member();
    }

    fn terminate_member(&mut self) {
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
                self.unexpected_at(self.pos);
                self.skip_line();
            }
        }
    }
}
