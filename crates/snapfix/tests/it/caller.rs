use std::panic::catch_unwind;

use pretty_assertions::assert_eq;
use snapfix::{Identity, Registry, Value};

/// Every failing call below reports its own location to the global registry.
/// Finalizing here drains it, so the end of run hook finds nothing to write.
#[test]
fn test_real_call_sites_resolve() {
    let _ = catch_unwind(|| {
        snapfix::expect!(1 + 1, "to equal snapshot");
    });
    let _ = catch_unwind(|| {
        let _ = ("日本語", snapfix::expect!(3, "to equal snapshot"));
    });
    let _ = catch_unwind(|| {
        snapfix::expect("foo").to_equal_snapshot("");
    });
    let _ = catch_unwind(|| {
        let point = Value::instance("Point", [(0, 1), (1, 2)]);
        snapfix::expect(point).to_equal_snapshot("");
    });

    let report = Registry::global().finalize_with(&Identity);

    assert!(report.skipped.is_empty(), "{:?}", report.skipped);
    assert_eq!(report.num_fixed_expects, 4);
    let (path, fixed) = report
        .fixed
        .iter()
        .next()
        .expect("this file should be patched");
    assert!(path.ends_with("tests/it/caller.rs"), "{path}");
    for patched in [
        "snapfix::expect!(1 + 1, \"to equal snapshot\", 2);",
        "let _ = (\"日本語\", snapfix::expect!(3, \"to equal snapshot\", 3));",
        "snapfix::expect(\"foo\").to_equal_snapshot(\"foo\");",
        "snapfix::expect(point).to_inspect_as_snapshot(\"Point(1, 2)\");",
    ] {
        assert!(fixed.contains(patched), "missing `{patched}` in\n{fixed}");
    }
}
