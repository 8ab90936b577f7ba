use snapfix::Value;

use crate::common::TestContext;

#[test]
fn test_patched_file_is_stable() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    let subject = "first\n  second";
    expect!(subject, "to equal snapshot");
}
"#,
    );
    let site = context.site("tests/foo.rs", 4, 5);

    context.check(site.clone(), "first\n  second", "to equal snapshot", None);
    context.finish();
    let patched = context.read_file("tests/foo.rs");

    let snapshot = snapfix::unindent(
        r"
        first
          second
        ",
    );
    assert_eq!(
        context.check(site, "first\n  second", "to equal snapshot", Some(Value::from(snapshot))),
        None
    );
    assert_eq!(context.finish(), "");
    assert_eq!(context.read_file("tests/foo.rs"), patched);
}

#[test]
fn test_unmatched_coordinates_leave_file_alone() {
    let source = r#"
#[test]
fn foo() {
    expect!("foo", "to equal snapshot");
}
"#;
    let context = TestContext::with_file("tests/foo.rs", source);

    context.check(context.site("tests/foo.rs", 3, 9), "foo", "to equal snapshot", None);
    assert_eq!(context.finish(), "");
    assert_eq!(context.read_file("tests/foo.rs"), source.trim_start_matches('\n'));
}

#[test]
fn test_already_patched_call_is_skipped() {
    let source = r#"
#[test]
fn foo() {
    expect!("foo", "to equal snapshot", "foo");
}
"#;
    let context = TestContext::with_file("tests/foo.rs", source);

    // A missing snapshot recorded against a call that already has one.
    context.check(context.site("tests/foo.rs", 3, 5), "foo", "to equal snapshot", None);
    assert_eq!(context.finish(), "");
    assert_eq!(context.read_file("tests/foo.rs"), source.trim_start_matches('\n'));
}

#[test]
fn test_unparseable_file_does_not_block_others() {
    let context = TestContext::new();
    context.write_file(
        "tests/broken.rs",
        r#"
fn foo() {
    expect!(1, "to equal snapshot");
    let = ;
}
"#,
    );
    context.write_file(
        "tests/fine.rs",
        r#"
fn foo() {
    expect!(1, "to equal snapshot");
}
"#,
    );

    context.check(context.site("tests/broken.rs", 2, 5), 1, "to equal snapshot", None);
    context.check(context.site("tests/fine.rs", 2, 5), 1, "to equal snapshot", None);
    let summary = context.finish();

    assert!(summary.contains("tests/broken.rs"), "{summary}");
    assert!(summary.contains("snapfix was able to patch up 1 expect call(s) in 1 source file(s)"));
    assert!(context.read_file("tests/broken.rs").contains("expect!(1, \"to equal snapshot\");"));
    assert_eq!(
        context.read_file("tests/fine.rs"),
        "fn foo() {\n    expect!(1, \"to equal snapshot\", 1);\n}\n"
    );
}

#[test]
fn test_missing_file_is_skipped() {
    let context = TestContext::new();
    context.check(context.site("tests/gone.rs", 1, 1), 1, "to equal snapshot", None);

    assert_eq!(context.finish(), "");
    assert!(!context.project_dir().join("tests/gone.rs").exists());
}

#[test]
fn test_unknown_phrase_records_nothing() {
    let context = TestContext::with_file("tests/foo.rs", "fn foo() {\n    expect!(1, \"to be one\");\n}\n");

    let message = context.check(context.site("tests/foo.rs", 2, 5), 1, "to be one", None);
    assert_eq!(message.as_deref(), Some("unknown assertion `to be one`"));
    assert_eq!(context.registry().pending(), 0);
}
