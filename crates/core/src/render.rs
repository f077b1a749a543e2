//! Canonical declaration rendering.
//!
//! A stable, whitespace-normalized picture of a module's declared shape:
//! package, imports, then each class with fields, static initializer,
//! constructors and methods in that order. Method bodies contribute only
//! their top-level local declarations. Tooling diffs this text, so the
//! format is part of the crate's contract and changes to it are breaking.

use crate::ast::{
    ClassDecl, Expr, FieldDecl, MethodDecl, Module, Stmt, TypeKind, OBJECT_TYPE,
};

pub fn render_module(module: &Module) -> String {
    let mut out = String::new();
    if let Some(pkg) = &module.package {
        out.push_str(&format!("package {};\n", pkg.name));
    }
    for import in &module.imports {
        let mut line = String::from("import ");
        if import.statik {
            line.push_str("static ");
        }
        line.push_str(&import.path);
        if import.star {
            line.push_str(".*");
        }
        out.push_str(&line);
        out.push_str(";\n");
    }
    for class in &module.classes {
        render_class(&mut out, class);
    }
    out
}

fn render_class(out: &mut String, class: &ClassDecl) {
    let kind = match class.kind {
        TypeKind::Class => "class",
        TypeKind::Interface => "interface",
        TypeKind::Annotation => "@interface",
    };
    out.push_str(&format!(
        "{} {} {}",
        visibility(&class.modifiers, "public"),
        kind,
        class.name
    ));
    if let Some(superclass) = &class.superclass {
        out.push_str(&format!(" extends {}", superclass));
    }
    if !class.interfaces.is_empty() {
        out.push_str(&format!(" implements {}", class.interfaces.join(", ")));
    }
    out.push_str(" {\n");

    for field in &class.fields {
        render_field(out, field);
    }
    if class.static_init.is_some() {
        out.push_str("  static {\n  }\n");
    }
    for attr in &class.attrs {
        out.push_str(&format!("  {} {}();\n", map_type(&attr.type_name), attr.name));
    }
    // Generated constructor first, then explicit ones in source order.
    for ctor in class.ctors.iter().filter(|c| c.generated) {
        render_ctor(out, ctor);
    }
    for ctor in class.ctors.iter().filter(|c| !c.generated) {
        render_ctor(out, ctor);
    }
    for method in &class.methods {
        render_method(out, method, class.kind);
    }
    out.push_str("}\n");
}

fn render_field(out: &mut String, field: &FieldDecl) {
    out.push_str(&format!(
        "  {} {} {};\n",
        visibility(&field.modifiers, "private"),
        map_type(&field.type_name),
        field.name
    ));
}

fn render_ctor(out: &mut String, ctor: &MethodDecl) {
    let marker = if ctor.generated { "@Generated " } else { "" };
    out.push_str(&format!(
        "  {} {}{}({}) {{\n  }}\n",
        visibility(&ctor.modifiers, "public"),
        marker,
        ctor.name,
        params(ctor)
    ));
}

fn render_method(out: &mut String, method: &MethodDecl, kind: TypeKind) {
    let mut anns = String::new();
    for ann in &method.annotations {
        anns.push_str(&format!("@{} ", ann.name));
    }
    let head = format!(
        "  {} {}{} {}({})",
        visibility(&method.modifiers, "public"),
        anns,
        map_type(&method.return_type),
        method.name,
        params(method)
    );
    out.push_str(&head);
    // Interface and annotation members have no bodies to show.
    if kind != TypeKind::Class {
        out.push_str(";\n");
        return;
    }
    out.push_str(" {\n");
    for stmt in &method.body {
        if let Stmt::Expr(Expr::Declaration {
            type_name, name, ..
        }) = stmt
        {
            out.push_str(&format!("    {} {};\n", map_type(type_name), name));
        }
    }
    out.push_str("  }\n");
}

fn params(method: &MethodDecl) -> String {
    method
        .params
        .iter()
        .map(|p| {
            if p.varargs {
                format!("{}... {}", map_type(&p.type_name), p.name)
            } else {
                format!("{} {}", map_type(&p.type_name), p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn visibility(modifiers: &[String], default: &'static str) -> String {
    let vis = modifiers
        .iter()
        .find(|m| matches!(m.as_str(), "public" | "private" | "protected"))
        .map(String::as_str)
        .unwrap_or(default);
    let mut out = vis.to_owned();
    for extra in ["static", "final", "abstract"] {
        if modifiers.iter().any(|m| m == extra) {
            out.push(' ');
            out.push_str(extra);
        }
    }
    out
}

fn map_type(t: &str) -> &str {
    if t == "def" || t.is_empty() {
        OBJECT_TYPE
    } else {
        t
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_unit;

    #[test]
    fn class_with_members_renders_in_canonical_order() {
        let out = parse_unit(
            "Foo.vsp",
            "class Foo extends Bar {\n\
             \x20 int count\n\
             \x20 void touch(String name) {\n\
             \x20   def tmp = name\n\
             \x20 }\n\
             }\n\
             class Bar {\n}\n",
        );
        let text = render_module(&out.module);
        assert_eq!(
            text,
            "public class Foo extends Bar {\n\
             \x20 private int count;\n\
             \x20 public @Generated Foo() {\n\
             \x20 }\n\
             \x20 public void touch(String name) {\n\
             \x20   java.lang.Object tmp;\n\
             \x20 }\n\
             }\n\
             public class Bar {\n\
             \x20 public @Generated Bar() {\n\
             \x20 }\n\
             }\n"
        );
    }

    #[test]
    fn script_unit_renders_generated_run() {
        let out = parse_unit("Run.vsp", "def x = 1\n");
        let text = render_module(&out.module);
        assert_eq!(
            text,
            "public class Run extends vesper.lang.Script {\n\
             \x20 public @Generated Run() {\n\
             \x20 }\n\
             \x20 public @Override java.lang.Object run() {\n\
             \x20   java.lang.Object x;\n\
             \x20 }\n\
             }\n"
        );
    }

    #[test]
    fn interface_methods_render_without_bodies() {
        let out = parse_unit("I.vsp", "interface I {\n  int size()\n}\n");
        let text = render_module(&out.module);
        assert_eq!(text, "public interface I {\n  public int size();\n}\n");
    }

    #[test]
    fn package_and_imports_lead() {
        let out = parse_unit(
            "A.vsp",
            "package a.b\nimport java.util.List\nimport a.c.*\nclass A {\n}\n",
        );
        let text = render_module(&out.module);
        assert!(text.starts_with(
            "package a.b;\nimport java.util.List;\nimport a.c.*;\npublic class A {\n"
        ));
    }

    #[test]
    fn varargs_param_renders_with_ellipsis() {
        let out = parse_unit("V.vsp", "class V {\n  void all(String... rest) {\n  }\n}\n");
        let text = render_module(&out.module);
        assert!(text.contains("public void all(String... rest)"));
    }
}
