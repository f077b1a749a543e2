use serde::{Deserialize, Serialize};

/// Half-open source region, 1-based line and column, width in characters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Span {
    pub line: u32,
    pub col: u32,
    pub len: u32,
}

impl Span {
    pub fn new(line: u32, col: u32, len: u32) -> Self {
        Span { line, col, len }
    }
}

/// One recoverable parse or resolution error. `span` is `None` for
/// diagnostics that have no source anchor (undefined annotation attributes).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnostic {
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    pub message: String,
    /// 1-based position in the final presentation order.
    pub ordinal: u32,
}

impl Diagnostic {
    /// Serialize to the stable external JSON shape. All fields are always
    /// present (null for a missing span), not skip_serializing_if.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "unit":    self.unit,
            "line":    self.span.map(|s| s.line),
            "column":  self.span.map(|s| s.col),
            "length":  self.span.map(|s| s.len),
            "message": self.message,
            "ordinal": self.ordinal,
        })
    }
}

// ──────────────────────────────────────────────
// Collection
// ──────────────────────────────────────────────

/// Per-unit diagnostic sink. Errors are appended in emission order and only
/// sorted into presentation order by [`Diagnostics::finish`].
#[derive(Debug, Clone)]
pub struct Diagnostics {
    unit: String,
    list: Vec<Diagnostic>,
    hard_fail: bool,
}

impl Diagnostics {
    pub fn new(unit: &str) -> Self {
        Diagnostics {
            unit: unit.to_owned(),
            list: Vec::new(),
            hard_fail: false,
        }
    }

    pub fn error_at(&mut self, line: u32, col: u32, len: u32, message: impl Into<String>) {
        self.list.push(Diagnostic {
            unit: self.unit.clone(),
            span: Some(Span::new(line, col, len)),
            message: message.into(),
            ordinal: 0,
        });
    }

    /// A diagnostic with no source anchor; sorts before all spanned ones.
    pub fn error_spanless(&mut self, message: impl Into<String>) {
        self.list.push(Diagnostic {
            unit: self.unit.clone(),
            span: None,
            message: message.into(),
            ordinal: 0,
        });
    }

    /// Record fatal lexical corruption. The classifier treats the unit as
    /// unrecoverable regardless of how much structure was still committed.
    pub fn mark_hard_fail(&mut self) {
        self.hard_fail = true;
    }

    pub fn hard_fail(&self) -> bool {
        self.hard_fail
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Sort into presentation order and assign ordinals. The sort is stable
    /// on span start so same-position diagnostics keep emission order, and
    /// span-less diagnostics come first.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.list
            .sort_by_key(|d| d.span.map_or((0, 0), |s| (s.line, s.col)));
        for (i, d) in self.list.iter_mut().enumerate() {
            d.ordinal = i as u32 + 1;
        }
        self.list
    }
}

// ──────────────────────────────────────────────
// Text rendering
// ──────────────────────────────────────────────

/// Render diagnostics as the classic framed error listing, byte-stable.
pub fn render(diags: &[Diagnostic], source: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let mut out = String::new();
    for d in diags {
        render_one(&mut out, d, &lines);
    }
    out
}

fn render_one(out: &mut String, d: &Diagnostic, lines: &[&str]) {
    out.push_str("----------\n");
    match d.span {
        None => {
            out.push_str(&format!("{}. ERROR in {}\n", d.ordinal, d.unit));
            out.push_str(&d.message);
            out.push('\n');
        }
        Some(sp) => {
            out.push_str(&format!(
                "{}. ERROR in {} (at line {})\n",
                d.ordinal, d.unit, sp.line
            ));
            let raw = lines.get(sp.line as usize - 1).copied().unwrap_or("");
            let ws = raw.len() - raw.trim_start().len();
            let trimmed = &raw[ws..];
            let col0 = (sp.col as usize)
                .saturating_sub(1)
                .saturating_sub(ws);

            let mut excerpt = trimmed.to_owned();
            if sp.col as usize > raw.chars().count() {
                // Errors reported at the line break show where the next
                // line picks up.
                let next = lines.get(sp.line as usize).copied().unwrap_or("");
                excerpt.push('\n');
                excerpt.push_str(next);
            }

            let mut caret = String::new();
            let mut prefix = trimmed.chars();
            for _ in 0..col0 {
                // Tabs in the prefix must stay tabs or the caret drifts.
                caret.push(match prefix.next() {
                    Some('\t') => '\t',
                    _ => ' ',
                });
            }
            for _ in 0..sp.len.max(1) {
                caret.push('^');
            }

            out.push_str(&format!("\t{}\n\t{}\n{}\n", excerpt, caret, d.message));
        }
    }
    out.push_str("----------\n");
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_sorts_by_position_and_renumbers() {
        let mut d = Diagnostics::new("X.vsp");
        d.error_at(3, 1, 1, "later");
        d.error_at(1, 5, 2, "earlier");
        let out = d.finish();
        assert_eq!(out[0].message, "earlier");
        assert_eq!(out[0].ordinal, 1);
        assert_eq!(out[1].message, "later");
        assert_eq!(out[1].ordinal, 2);
    }

    #[test]
    fn spanless_sorts_first_and_keeps_emission_order() {
        let mut d = Diagnostics::new("X.vsp");
        d.error_at(1, 1, 1, "spanned");
        d.error_spanless("first");
        d.error_spanless("second");
        let out = d.finish();
        assert_eq!(out[0].message, "first");
        assert_eq!(out[1].message, "second");
        assert_eq!(out[2].message, "spanned");
    }

    #[test]
    fn render_trims_indent_and_adjusts_caret() {
        let mut d = Diagnostics::new("X.vsp");
        d.error_at(1, 9, 3, "unexpected token: foo");
        let text = render(&d.finish(), "        foo bar\n");
        assert_eq!(
            text,
            "----------\n\
             1. ERROR in X.vsp (at line 1)\n\
             \tfoo bar\n\
             \t^^^\n\
             unexpected token: foo\n\
             ----------\n"
        );
    }

    #[test]
    fn render_preserves_tabs_in_caret_prefix() {
        let mut d = Diagnostics::new("X.vsp");
        d.error_at(1, 3, 1, "boom");
        // Line starts with a word, then a tab, then the blamed token.
        let text = render(&d.finish(), "a\tb\n");
        assert!(text.contains("\ta\tb\n\t \t^\nboom\n"));
    }

    #[test]
    fn render_past_line_end_appends_next_line() {
        let mut d = Diagnostics::new("X.vsp");
        // Column 6 on a 5-character line: the break itself is blamed.
        d.error_at(1, 6, 1, "expecting ':', found '<newline>'");
        let text = render(&d.finish(), "case \nmore\n");
        assert!(text.contains("\tcase \nmore\n"));
    }

    #[test]
    fn spanless_block_has_no_excerpt() {
        let mut d = Diagnostics::new("X.vsp");
        d.error_spanless("The attribute b is undefined for the annotation type A");
        let text = render(&d.finish(), "@A(b = 1)\n");
        assert_eq!(
            text,
            "----------\n\
             1. ERROR in X.vsp\n\
             The attribute b is undefined for the annotation type A\n\
             ----------\n"
        );
    }

    #[test]
    fn json_shape_is_stable() {
        let mut d = Diagnostics::new("X.vsp");
        d.error_at(2, 3, 4, "msg");
        let v = d.finish()[0].to_json_value();
        assert_eq!(v["unit"], "X.vsp");
        assert_eq!(v["line"], 2);
        assert_eq!(v["column"], 3);
        assert_eq!(v["length"], 4);
        assert_eq!(v["ordinal"], 1);
    }
}
