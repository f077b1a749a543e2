//! AST produced by the recovering parser.
//!
//! Every node owns its children exclusively: the tree has no sharing and no
//! cycles. Where a subtree could not be parsed the builder substitutes a
//! tagged placeholder instead of dropping to an optional child, so consumers
//! never deal with half-built nodes. All nodes carry the 1-based source line
//! of their introducing token.

/// Synthetic type bound to placeholders and untyped declarations.
pub const OBJECT_TYPE: &str = "java.lang.Object";
/// Superclass of the implicit class synthesized for script units.
pub const SCRIPT_BASE: &str = "vesper.lang.Script";

// ──────────────────────────────────────────────
// Compilation unit
// ──────────────────────────────────────────────

/// One parsed unit. `classes` preserves source declaration order, with the
/// synthesized script class (if any) at index 0.
#[derive(Debug, Clone)]
pub struct Module {
    pub unit: String,
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    pub classes: Vec<ClassDecl>,
}

impl Module {
    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct PackageDecl {
    pub name: String,
    /// True when the clause was malformed and `java.lang` was substituted.
    pub synthetic: bool,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub path: String,
    pub star: bool,
    pub statik: bool,
    /// True when the clause was malformed and `java.lang.Object` was
    /// substituted.
    pub synthetic: bool,
    pub line: u32,
}

impl ImportDecl {
    /// Simple name this import makes resolvable ("a.b.C" -> "C").
    pub fn simple_name(&self) -> Option<&str> {
        if self.star {
            return None;
        }
        Some(self.path.rsplit('.').next().unwrap_or(&self.path))
    }
}

// ──────────────────────────────────────────────
// Type declarations and members
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
    Annotation,
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDecl>,
    pub ctors: Vec<MethodDecl>,
    pub methods: Vec<MethodDecl>,
    /// Attribute declarations, populated only for `TypeKind::Annotation`.
    pub attrs: Vec<AttrDecl>,
    pub static_init: Option<Vec<Stmt>>,
    /// Synthesized from top-level statements of a script unit.
    pub script: bool,
    /// Header was truncated; the class is still registered.
    pub malformed: bool,
    pub line: u32,
}

impl ClassDecl {
    pub fn new(name: String, kind: TypeKind, line: u32) -> Self {
        ClassDecl {
            name,
            kind,
            modifiers: Vec::new(),
            annotations: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            ctors: Vec::new(),
            methods: Vec::new(),
            attrs: Vec::new(),
            static_init: None,
            script: false,
            malformed: false,
            line,
        }
    }

    pub fn method(&self, name: &str) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    /// Declared type as written; `def` means dynamically typed.
    pub type_name: String,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub init: Option<Expr>,
    pub line: u32,
}

/// A method or constructor. Constructors live in `ClassDecl::ctors` and
/// ignore `return_type`.
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: String,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    /// Compiler-synthesized (default constructor, script `run`).
    pub generated: bool,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub type_name: String,
    pub varargs: bool,
    /// Name was invented during recovery (e.g. missing multi-catch binding).
    pub generated_name: bool,
}

/// Attribute declaration inside an `@interface` body: `String foo()` with an
/// optional `default` literal.
#[derive(Debug, Clone)]
pub struct AttrDecl {
    pub name: String,
    pub type_name: String,
    pub has_default: bool,
}

#[derive(Debug, Clone)]
pub struct Annotation {
    /// `?` when the annotation name could not be parsed.
    pub name: String,
    pub args: Vec<(String, Expr)>,
    pub line: u32,
    pub col: u32,
}

// ──────────────────────────────────────────────
// Statements
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Return(Expr),
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then: Box<Stmt>,
        els: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    ForIn {
        var: String,
        iterable: Expr,
        body: Box<Stmt>,
    },
    Switch {
        subject: Expr,
        cases: Vec<CaseClause>,
    },
    Try {
        body: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
    },
    Empty,
    /// Stands in for a statement whose text was elided by recovery.
    Error {
        line: u32,
    },
}

/// One `case expr:` or `default:` entry. Registered even when the trailing
/// `:` was missing, so case-count invariants hold after recovery.
#[derive(Debug, Clone)]
pub struct CaseClause {
    /// `None` for `default`.
    pub label: Option<Expr>,
    pub stmts: Vec<Stmt>,
    pub line: u32,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub types: Vec<String>,
    pub param: Param,
    pub body: Vec<Stmt>,
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Expr {
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Local declaration: `int x = e`, `def y`.
    Declaration {
        type_name: String,
        name: String,
        init: Option<Box<Expr>>,
    },
    Var(String),
    /// Reference to a type by name (path bases that look like class names).
    ClassRef(String),
    Call {
        recv: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
    },
    /// Property-access chain. `truncated` records a dangling dot kept for
    /// downstream tooling (content assist) rather than discarded.
    Path {
        base: Box<Expr>,
        segments: Vec<String>,
        truncated: bool,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    New {
        type_name: String,
        args: Vec<Expr>,
        array: bool,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        els: Box<Expr>,
    },
    Range {
        from: Box<Expr>,
        to: Box<Expr>,
        exclusive: bool,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
    },
    Closure {
        params: Vec<Param>,
        body: Vec<Stmt>,
    },
    ListLit(Vec<Expr>),
    Literal(Literal),
    /// Stands in for an expression that could not be parsed; bound to the
    /// top object type so containing declarations stay structurally typed.
    Placeholder {
        type_name: String,
    },
}

impl Expr {
    pub fn placeholder() -> Expr {
        Expr::Placeholder {
            type_name: OBJECT_TYPE.to_owned(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Expr::Placeholder { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(String),
    Str(String),
    Bool(bool),
    Null,
}
