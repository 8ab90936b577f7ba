use crate::common::TestContext;

#[test]
fn test_two_space_file() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
fn foo() {
  let s = "a\nb";
  expect!(s, "to equal snapshot");
}
"#,
    );

    context.check(context.site("tests/foo.rs", 3, 3), "a\nb", "to equal snapshot", None);
    context.finish();

    assert_eq!(
        context.read_file("tests/foo.rs"),
        "fn foo() {\n  let s = \"a\\nb\";\n  expect!(s, \"to equal snapshot\", snapfix::unindent(r\"\n    a\n    b\n  \"));\n}\n"
    );
}

#[test]
fn test_tab_file() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        "fn foo() {\n\tlet s = \"a\\nb\";\n\texpect!(s, \"to equal snapshot\");\n}\n",
    );

    context.check(context.site("tests/foo.rs", 3, 2), "a\nb", "to equal snapshot", None);
    context.finish();

    assert_eq!(
        context.read_file("tests/foo.rs"),
        "fn foo() {\n\tlet s = \"a\\nb\";\n\texpect!(s, \"to equal snapshot\", snapfix::unindent(r\"\n\t\ta\n\t\tb\n\t\"));\n}\n"
    );
}

#[test]
fn test_tab_display_column() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        "fn foo() {\n\texpect!(1, \"to equal snapshot\");\n}\n",
    );

    context.check(context.site("tests/foo.rs", 2, 5), 1, "to equal snapshot", None);
    context.finish();

    assert_eq!(
        context.read_file("tests/foo.rs"),
        "fn foo() {\n\texpect!(1, \"to equal snapshot\", 1);\n}\n"
    );
}

#[test]
fn test_nested_call_indent() {
    let context = TestContext::with_file(
        "tests/foo.rs",
        r#"
mod inner {
    #[test]
    fn foo() {
        expect!("x\ny", "to equal snapshot");
    }
}
"#,
    );

    context.check(context.site("tests/foo.rs", 4, 9), "x\ny", "to equal snapshot", None);
    context.finish();

    insta::assert_snapshot!(context.read_file("tests/foo.rs"), @r#"
    mod inner {
        #[test]
        fn foo() {
            expect!("x\ny", "to equal snapshot", snapfix::unindent(r"
                x
                y
            "));
        }
    }
    "#);
}
