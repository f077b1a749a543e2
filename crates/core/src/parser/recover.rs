//! Resynchronization after a reported error.
//!
//! Every recovery site names the boundary it skips to; nothing here emits
//! diagnostics. The offending tokens are consumed, except that a closing
//! brace is always left for the enclosing block to consume.

use super::Parser;
use crate::lexer::Token;

/// Where to resume after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncContext {
    /// Skip to the end of the current line, consuming the newline.
    Statement,
    /// Skip to `)` or the end of the line, consuming the `)` if found.
    Paren,
}

impl Parser<'_> {
    pub(super) fn resync(&mut self, ctx: SyncContext) {
        match ctx {
            SyncContext::Statement => self.skip_line(),
            SyncContext::Paren => {
                while !matches!(
                    self.peek(),
                    Token::RParen | Token::Newline | Token::Eof
                ) {
                    self.advance();
                }
                self.eat(&Token::RParen);
            }
        }
    }

    pub(super) fn skip_line(&mut self) {
        while !matches!(self.peek(), Token::Newline | Token::Eof) {
            self.advance();
        }
        self.eat(&Token::Newline);
    }
}
