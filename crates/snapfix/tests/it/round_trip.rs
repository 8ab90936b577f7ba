use pretty_assertions::assert_eq;
use snapfix::Value;

use crate::common::TestContext;

#[test]
fn test_multi_line_literal() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect!(manifest(), "to equal snapshot");
}
"#,
    );

    let subject = Value::object([
        ("name", Value::from("snapfix")),
        ("tags", Value::array(["a", "b"])),
    ]);
    context.check(
        context.site("tests/foo.rs", 3, 5),
        subject.clone(),
        "to equal snapshot",
        None,
    );
    context.finish();

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        expect!(manifest(), "to equal snapshot", snapfix::Value::object([
            ("name", snapfix::Value::from("snapfix")),
            ("tags", snapfix::Value::array(["a", "b"])),
        ]));
    }
    "#);

    let pasted = snapfix::Value::object([
        ("name", snapfix::Value::from("snapfix")),
        ("tags", snapfix::Value::array(["a", "b"])),
    ]);
    assert!(subject.freeze().deep_eq(&pasted.freeze()));
}

#[test]
fn test_patched_snapshot_passes() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect!(status(), "to equal snapshot");
}
"#,
    );
    let site = context.site("tests/foo.rs", 3, 5);
    let subject = Value::object([("ok", true), ("retries", false)]);

    context.check(site.clone(), subject.clone(), "to equal snapshot", None);
    context.finish();
    assert_eq!(
        context.read_file("tests/foo.rs"),
        "#[test]\nfn foo() {\n    expect!(status(), \"to equal snapshot\", snapfix::Value::object([(\"ok\", true), (\"retries\", false)]));\n}\n"
    );

    let pasted = snapfix::Value::object([("ok", true), ("retries", false)]);
    assert_eq!(context.check(site, subject, "to equal snapshot", Some(pasted)), None);
}

#[test]
fn test_quotes_pick_raw_string_hashes() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect!(html(), "to equal snapshot");
}
"#,
    );

    let subject = "<a href=\"#top\">\n  up\n</a>";
    context.check(context.site("tests/foo.rs", 3, 5), subject, "to equal snapshot", None);
    context.finish();

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r###"
    #[test]
    fn foo() {
        expect!(html(), "to equal snapshot", snapfix::unindent(r##"
            <a href="#top">
              up
            </a>
        "##));
    }
    "###);

    let pasted = snapfix::unindent(
        r##"
            <a href="#top">
              up
            </a>
        "##,
    );
    assert_eq!(pasted, subject);
}
