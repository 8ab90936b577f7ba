use snapfix::Value;

use crate::common::TestContext;

#[test]
fn test_missing_string_is_inserted() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect!("foo", "to equal snapshot");
}
"#,
    );

    let message = context.check(
        context.site("tests/foo.rs", 3, 5),
        "foo",
        "to equal snapshot",
        None,
    );
    insta::assert_snapshot!(message.unwrap_or_default(), @r#"
    expected "foo" to equal snapshot

    Rerun the tests with SNAPFIX_UPDATE=yes to update the snapshots
    "#);

    insta::assert_snapshot!(context.finish(), @r"
    snapfix was able to patch up 1 expect call(s) in 1 source file(s)
    snapfix: Wrote 1 file(s)
    ");
    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        expect!("foo", "to equal snapshot", "foo");
    }
    "#);
}

#[test]
fn test_multi_line_string_becomes_a_block() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    let subject = "foo\nbar";
    expect!(subject, "to equal snapshot");
}
"#,
    );

    context.check(
        context.site("tests/foo.rs", 4, 5),
        "foo\nbar",
        "to equal snapshot",
        None,
    );
    context.finish();

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        let subject = "foo\nbar";
        expect!(subject, "to equal snapshot", snapfix::unindent(r"
            foo
            bar
        "));
    }
    "#);
}

#[test]
fn test_mismatch_is_replaced() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect!("foo", "to equal snapshot", "bar");
}
"#,
    );

    let message = context
        .check(
            context.site("tests/foo.rs", 3, 5),
            "foo",
            "to equal snapshot",
            Some(Value::from("bar")),
        )
        .expect("mismatch should fail");
    assert!(message.starts_with("expected \"foo\" to equal snapshot \"bar\""));

    context.finish();
    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        expect!("foo", "to equal snapshot", "foo");
    }
    "#);
}

#[test]
fn test_circular_subject_switches_to_inspection() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    let foo = circular();
    expect!(foo, "to equal snapshot");
}
"#,
    );

    let foo = Value::object([("a", 1)]);
    foo.insert("quux", &foo).expect("object accepts insert");
    context.check(context.site("tests/foo.rs", 4, 5), foo, "to equal snapshot", None);
    context.finish();

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        let foo = circular();
        expect!(foo, "to inspect as snapshot", "{ a: 1, quux: [Circular] }");
    }
    "#);
}

#[test]
fn test_two_assertions_in_one_file() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
#[test]
fn foo() {
    expect!(1 + 1, "to equal snapshot");
    expect!(vec![true, false], "to equal snapshot");
}
"#,
    );

    context.check(context.site("tests/foo.rs", 4, 5), vec![true, false], "to equal snapshot", None);
    context.check(context.site("tests/foo.rs", 3, 5), 2, "to equal snapshot", None);

    insta::assert_snapshot!(context.finish(), @r"
    snapfix was able to patch up 2 expect call(s) in 1 source file(s)
    snapfix: Wrote 1 file(s)
    ");
    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    #[test]
    fn foo() {
        expect!(1 + 1, "to equal snapshot", 2);
        expect!(vec![true, false], "to equal snapshot", snapfix::Value::array([true, false]));
    }
    "#);
}

#[test]
fn test_fixes_across_files() {
    let context = TestContext::new();
    for name in ["tests/a.rs", "tests/b.rs"] {
        context.write_file(
            name,
            r#"
fn t() {
    expect!(1, "to equal snapshot");
}
"#,
        );
        context.check(context.site(name, 2, 5), 1, "to equal snapshot", None);
    }

    insta::assert_snapshot!(context.finish(), @r"
    snapfix was able to patch up 2 expect call(s) in 2 source file(s)
    snapfix: Wrote 2 file(s)
    ");
    assert_eq!(context.read_file("tests/a.rs"), context.read_file("tests/b.rs"));
}
