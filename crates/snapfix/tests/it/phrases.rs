use snapfix::Value;

use crate::common::TestContext;

#[test]
fn test_adapter_prefix_is_kept() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect!(vec![3, 1, 2], "when sorted to equal snapshot");
}
"#,
    );

    context.check(
        context.site("tests/foo.rs", 3, 5),
        vec![3, 1, 2],
        "when sorted to equal snapshot",
        None,
    );
    context.finish();

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        expect!(vec![3, 1, 2], "when sorted to equal snapshot", snapfix::Value::array([1, 2, 3]));
    }
    "#);
}

#[test]
fn test_adapter_prefix_survives_switch_to_inspection() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect!(points(), "when sorted to equal snapshot");
}
"#,
    );

    let points = Value::array([
        Value::instance("Point", [(0, 2), (1, 1)]),
        Value::instance("Point", [(0, 1), (1, 2)]),
    ]);
    context.check(
        context.site("tests/foo.rs", 3, 5),
        points,
        "when sorted to equal snapshot",
        None,
    );
    context.finish();

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        expect!(points(), "when sorted to inspect as snapshot", "[Point(1, 2), Point(2, 1)]");
    }
    "#);
}

#[test]
fn test_inspect_mismatch_keeps_phrase() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect!(person(), "to inspect as snapshot", "Person { name: \"Eigil\" }");
}
"#,
    );

    let person = Value::instance("Person", [("name", "Jonas")]);
    let message = context.check(
        context.site("tests/foo.rs", 3, 5),
        person,
        "to inspect as snapshot",
        Some(Value::from("Person { name: \"Eigil\" }")),
    );
    assert!(message.is_some());
    context.finish();

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        expect!(person(), "to inspect as snapshot", "Person { name: \"Jonas\" }");
    }
    "#);
}

#[test]
fn test_edited_phrase_is_left_alone() {
    let source = r#"
#[test]
fn foo() {
    expect!(1, "to inspect as snapshot");
}
"#;
    let context = TestContext::with_file("tests/foo.rs", source);

    // The failure was recorded for an equality assertion, but the source
    // has been changed to an inspection since.
    context.check(context.site("tests/foo.rs", 3, 5), 1, "to equal snapshot", None);
    assert_eq!(context.finish(), "");
    assert_eq!(context.read_file("tests/foo.rs"), source.trim_start_matches('\n'));
}

#[test]
fn test_chained_call_is_renamed_for_inspection() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect(person()).to_equal_snapshot("");
}
"#,
    );

    // Chained calls are reported at the method name.
    let person = Value::instance("Person", [("name", "Jonas")]);
    let message = context.check(
        context.site("tests/foo.rs", 3, 22),
        person,
        "to equal snapshot",
        Some(Value::from("")),
    );
    assert!(message.is_some());
    context.finish();

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        expect(person()).to_inspect_as_snapshot("Person { name: \"Jonas\" }");
    }
    "#);
}

#[test]
fn test_chained_call_on_its_own_line() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect(greeting())
        .to_equal_snapshot("Hi");
}
"#,
    );

    context.check(
        context.site("tests/foo.rs", 4, 10),
        "Hello",
        "to equal snapshot",
        Some(Value::from("Hi")),
    );
    insta::assert_snapshot!(context.finish(), @r"
    snapfix was able to patch up 1 expect call(s) in 1 source file(s)
    snapfix: Wrote 1 file(s)
    ");

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        expect(greeting())
            .to_equal_snapshot("Hello");
    }
    "#);
}
