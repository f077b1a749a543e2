//! Batch name resolution for checks recorded during parse.
//!
//! Recovery sites that mention a type (`new T` with missing parens, an
//! `extends` clause cut off at EOF, annotation uses) cannot be judged until
//! every unit of the batch has parsed: a later unit may declare the class.
//! The parser records a [`Pending`] check instead; after all units parse,
//! [`apply`] resolves each check against the batch-wide [`TypeTable`] and
//! appends diagnostics in recorded order.

use std::collections::{HashMap, HashSet};

use crate::ast::{AttrDecl, ImportDecl, Module};
use crate::diag::{Diagnostics, Span};

/// Core names every unit can resolve without an import.
const BUILTIN_CLASSES: &[&str] = &[
    "Object",
    "String",
    "Integer",
    "Long",
    "Short",
    "Byte",
    "Double",
    "Float",
    "Boolean",
    "Character",
    "Number",
    "Math",
    "System",
    "Thread",
    "Class",
    "Void",
    "Iterable",
    "Comparable",
    "Runnable",
    "StringBuilder",
    "Throwable",
    "Exception",
    "RuntimeException",
    "Error",
];

const BUILTIN_ANNOTATIONS: &[&str] = &["Override", "Deprecated", "SuppressWarnings"];

const PRIMITIVES: &[&str] = &[
    "def", "int", "long", "short", "byte", "double", "float", "boolean", "char", "void",
];

/// A check deferred until the whole batch has parsed.
#[derive(Debug, Clone)]
pub enum Pending {
    /// `unable to resolve class {name}` unless the table resolves it.
    ResolveClass { name: String, span: Span },
    /// Annotation use `@name(args...)`. `line`/`col` locate the `@`.
    CheckAnnotation {
        name: String,
        arg_names: Vec<String>,
        line: u32,
        col: u32,
    },
}

// ──────────────────────────────────────────────
// Type table
// ──────────────────────────────────────────────

/// Names resolvable somewhere in the batch. Simple names cover built-ins and
/// every declared class; qualified names cover their package-prefixed forms.
/// Explicit imports extend the simple-name set per unit (star imports
/// contribute nothing, their targets are outside the batch).
#[derive(Debug, Default)]
pub struct TypeTable {
    simple: HashSet<String>,
    qualified: HashSet<String>,
    /// Attribute lists of `@interface` types declared in the batch.
    annotations: HashMap<String, Vec<AttrDecl>>,
}

impl TypeTable {
    pub fn build(modules: &[Module]) -> Self {
        let mut table = TypeTable::default();
        for name in BUILTIN_CLASSES.iter().chain(BUILTIN_ANNOTATIONS) {
            table.simple.insert((*name).to_owned());
            table.qualified.insert(format!("java.lang.{}", name));
        }
        for name in ["Script", "Generated"] {
            table.simple.insert(name.to_owned());
            table.qualified.insert(format!("vesper.lang.{}", name));
        }
        for module in modules {
            for class in &module.classes {
                table.simple.insert(class.name.clone());
                if let Some(pkg) = &module.package {
                    table.qualified.insert(format!("{}.{}", pkg.name, class.name));
                }
                if class.kind == crate::ast::TypeKind::Annotation {
                    table
                        .annotations
                        .insert(class.name.clone(), class.attrs.clone());
                }
            }
        }
        table
    }

    pub fn resolves(&self, name: &str, imports: &[ImportDecl]) -> bool {
        if name.contains('.') {
            return self.qualified.contains(name);
        }
        if PRIMITIVES.contains(&name) || self.simple.contains(name) {
            return true;
        }
        imports.iter().any(|i| i.simple_name() == Some(name))
    }

    fn annotation_attrs(&self, name: &str) -> Option<&[AttrDecl]> {
        self.annotations.get(name).map(Vec::as_slice)
    }
}

// ──────────────────────────────────────────────
// Applying pending checks
// ──────────────────────────────────────────────

pub fn apply(
    pendings: &[Pending],
    table: &TypeTable,
    imports: &[ImportDecl],
    diags: &mut Diagnostics,
) {
    for pending in pendings {
        match pending {
            Pending::ResolveClass { name, span } => {
                if !table.resolves(name, imports) {
                    diags.error_at(
                        span.line,
                        span.col,
                        span.len,
                        format!("unable to resolve class {}", name),
                    );
                }
            }
            Pending::CheckAnnotation {
                name,
                arg_names,
                line,
                col,
            } => check_annotation(name, arg_names, *line, *col, table, imports, diags),
        }
    }
}

fn check_annotation(
    name: &str,
    arg_names: &[String],
    line: u32,
    col: u32,
    table: &TypeTable,
    imports: &[ImportDecl],
    diags: &mut Diagnostics,
) {
    if name == "?" || !table.resolves(name, imports) {
        diags.error_at(
            line,
            col + 1,
            name.chars().count().max(1) as u32,
            format!("unable to resolve class {} for annotation", name),
        );
        return;
    }
    // Attribute checks only apply to annotation types declared in the batch;
    // built-ins resolve but their attribute sets are not modeled.
    let Some(attrs) = table.annotation_attrs(name) else {
        return;
    };
    for arg in arg_names {
        if !attrs.iter().any(|a| &a.name == arg) {
            diags.error_spanless(format!(
                "The attribute {} is undefined for the annotation type {}",
                arg, name
            ));
        }
    }
    for attr in attrs {
        if !attr.has_default && !arg_names.iter().any(|a| a == &attr.name) {
            diags.error_at(
                line,
                col,
                1 + name.chars().count() as u32,
                format!(
                    "No explicit/default value found for annotation attribute '{}' in @{}",
                    attr.name, name
                ),
            );
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
