//! Integration tests for template rendering

use pretty_assertions::assert_eq;
use serde_json::json;
use std::fs;
use std::path::Path;
use template::{context, TemplateEnv, TemplateError};

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_render_named_template() {
    let root = tempfile::tempdir().unwrap();
    write(root.path(), "letter.tex", r"\starttext {{ greeting }} \stoptext");

    let env = TemplateEnv::new([root.path()]);
    let source = env
        .render("letter.tex", context! { greeting => "Hallo" })
        .unwrap();

    assert_eq!(source, r"\starttext Hallo \stoptext");
}

#[test]
fn test_first_root_wins() {
    let custom = tempfile::tempdir().unwrap();
    let default = tempfile::tempdir().unwrap();
    write(custom.path(), "footer.tex", "custom");
    write(default.path(), "footer.tex", "default");
    write(default.path(), "header.tex", "default header");

    let env = TemplateEnv::new([custom.path(), default.path()]);

    assert_eq!(env.render("footer.tex", context! {}).unwrap(), "custom");
    assert_eq!(env.render("header.tex", context! {}).unwrap(), "default header");
}

#[test]
fn test_missing_template() {
    let root = tempfile::tempdir().unwrap();
    let env = TemplateEnv::new([root.path()]);

    let result = env.render("nope.tex", context! {});

    assert!(matches!(result, Err(TemplateError::NotFoundError(name)) if name == "nope.tex"));
}

#[test]
fn test_parent_segments_never_leave_roots() {
    let outer = tempfile::tempdir().unwrap();
    write(outer.path(), "secret.tex", "secret");
    let root = outer.path().join("templates");
    fs::create_dir_all(&root).unwrap();

    let env = TemplateEnv::new([&root]);

    assert!(matches!(
        env.render("../secret.tex", context! {}),
        Err(TemplateError::NotFoundError(_))
    ));
}

#[test]
fn test_render_str_with_tex_safe_filter() {
    let env = TemplateEnv::new(Vec::<&Path>::new());

    let out = env
        .render_str("Hello {{ name|tex_safe }}", context! { name => "World & Co" })
        .unwrap();

    assert_eq!(out, r"Hello World \& Co");
}

#[test]
fn test_render_str_with_serde_json_context() {
    let env = TemplateEnv::new(Vec::<&Path>::new());
    let data = json!({
        "customer": { "name": "Müller_Söhne" },
        "amount": 12.5,
        "missing": null,
    });

    let out = env
        .render_str(
            "{{ customer.name|tex_safe }}: {{ amount|tex_safe }}{{ missing|tex_safe }}",
            &data,
        )
        .unwrap();

    assert_eq!(out, r"Müller\_Söhne: 12.5");
}

#[test]
fn test_render_str_syntax_error() {
    let env = TemplateEnv::new(Vec::<&Path>::new());

    let result = env.render_str("{% if %}", context! {});

    assert!(matches!(result, Err(TemplateError::SyntaxError(_))));
}

#[test]
fn test_render_str_includes_from_roots() {
    let root = tempfile::tempdir().unwrap();
    write(root.path(), "parts/signature.tex", "{{ sender|tex_safe }}");

    let env = TemplateEnv::new([root.path()]);
    let out = env
        .render_str(
            "Regards, {% include 'parts/signature.tex' %}",
            context! { sender => "A & B" },
        )
        .unwrap();

    assert_eq!(out, r"Regards, A \& B");
}

#[test]
fn test_list_templates() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    write(first.path(), "letter.tex", "");
    write(first.path(), "parts/signature.tex", "");
    write(second.path(), "letter.tex", "");
    write(second.path(), "invoice.tex", "");

    let env = TemplateEnv::new([first.path(), second.path()]);

    assert_eq!(
        env.list_templates(),
        vec!["invoice.tex", "letter.tex", "parts/signature.tex"]
    );
}

#[test]
fn test_list_templates_ignores_missing_roots() {
    let env = TemplateEnv::new(["/nonexistent/texpdf/templates"]);
    assert!(env.list_templates().is_empty());
}
