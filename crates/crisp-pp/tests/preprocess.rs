//! End-to-end preprocessor scenarios.

use std::fs;

use crisp_pp::{PpFlags, Preprocessor};

fn run(source: &str) -> String {
    Preprocessor::new(PpFlags::empty())
        .process_buffer(source, "test")
        .unwrap()
}

#[test]
fn square_substitutes_textually() {
    let out = run("#define SQUARE(x) ((x) * (x))\nSQUARE(3+1)");
    assert!(out.contains("((3+1) * (3+1))"), "got: {out}");
}

#[test]
fn paste_produces_single_identifier() {
    let out = run("#define A(x) x##_tag\nA(foo)");
    assert!(out.contains("foo_tag"), "got: {out}");
    assert!(!out.contains("foo _tag"));
    assert!(!out.contains("## _tag"));
}

#[test]
fn conditional_takes_true_branch() {
    let out = run("#if (1 << 1) ^ (1 << 2)\nY\n#else\nN\n#endif");
    assert!(out.contains('Y'));
    assert!(!out.contains('N'));
}

#[test]
fn variadic_joins_extra_arguments() {
    let out = run("#define V(x, ...) f(x, __VA_ARGS__)\nV(1, 2, 3)");
    assert!(out.contains("f(1, 2, 3)"), "got: {out}");
}

#[test]
fn eval_emits_float_with_twenty_digits() {
    let out = run("$eval(2 * cos(0))");
    assert!(out.contains("2.00000000000000000000"), "got: {out}");
}

#[test]
fn pragma_once_makes_second_inclusion_inert() {
    let dir = tempfile::tempdir().unwrap();
    let header = dir.path().join("a");
    fs::write(&header, "#pragma once\nonce_body\n").unwrap();

    let main = dir.path().join("main");
    fs::write(
        &main,
        "#include \"a\"\n#include \"a\"\nafter\n",
    )
    .unwrap();

    let mut pp = Preprocessor::new(PpFlags::empty());
    let out = pp.process_file(&main).unwrap();
    assert_eq!(out.matches("once_body").count(), 1, "got: {out}");
    assert!(out.contains("after"));
    assert_eq!(pp.error_count(), 0);
}

#[test]
fn self_referential_macro_reports_itself() {
    let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
    let err = pp.process_buffer("#define X X\nX", "test").unwrap_err();
    assert!(
        err.to_string().contains("references itself"),
        "got: {err}"
    );
}

#[test]
fn elif_branch_wins_when_its_name_is_defined() {
    let source = "#define BAR 1\n\
                  #if defined(FOO)\n\
                  foo_branch\n\
                  #elif defined(BAR)\n\
                  bar_branch\n\
                  #else\n\
                  else_branch\n\
                  #endif";
    let out = run(source);
    assert!(out.contains("bar_branch"), "got: {out}");
    assert!(!out.contains("foo_branch"));
    assert!(!out.contains("else_branch"));
}

#[test]
fn nested_includes_resolve_relative_to_includer() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    fs::write(sub.join("inner"), "inner_token\n").unwrap();
    fs::write(sub.join("outer"), "#include \"inner\"\nouter_token\n").unwrap();
    let main = dir.path().join("main");
    fs::write(&main, "#include \"sub/outer\"\nmain_token\n").unwrap();

    let mut pp = Preprocessor::new(PpFlags::empty());
    let out = pp.process_file(&main).unwrap();
    assert!(out.contains("inner_token"), "got: {out}");
    assert!(out.contains("outer_token"));
    assert!(out.contains("main_token"));
    assert_eq!(pp.error_count(), 0);
}

#[test]
fn base_include_uses_search_paths() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("base.h"), "from_base\n").unwrap();

    let mut pp = Preprocessor::new(PpFlags::empty());
    pp.add_search_path(dir.path());
    let out = pp
        .process_buffer("#include <base.h>\nrest\n", "test")
        .unwrap();
    assert!(out.contains("from_base"), "got: {out}");
    assert!(out.contains("rest"));
}

#[test]
fn include_defines_are_visible_to_includer() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("defs"), "#define FROM_HEADER 11\n").unwrap();
    let main = dir.path().join("main");
    fs::write(&main, "#include \"defs\"\nFROM_HEADER\n").unwrap();

    let mut pp = Preprocessor::new(PpFlags::empty());
    let out = pp.process_file(&main).unwrap();
    assert!(out.contains("11"), "got: {out}");
}

#[test]
fn conditionals_span_only_their_own_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken"), "#if 1\nno_endif\n").unwrap();
    let main = dir.path().join("main");
    fs::write(&main, "#include \"broken\"\n").unwrap();

    let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
    assert!(pp.process_file(&main).is_err());
    assert_eq!(pp.error_count(), 1);
}

#[test]
fn macro_roundtrip_identifier_integer_string() {
    assert_eq!(run("#define X banana\nX"), "banana");
    assert_eq!(run("#define X 42\nX"), "42");
    assert_eq!(run("#define X \"a b\"\nX"), "\"a b\"");
}

#[test]
fn output_is_minified() {
    let out = run("int   x   =   1   ;\nint y = 2 ;");
    assert_eq!(out, "int x=1;int y=2;");
}

#[test]
fn error_counters_are_monotonic_across_inputs() {
    let mut pp = Preprocessor::new(PpFlags::NO_ERRORS | PpFlags::NO_FATAL_ERRORS);
    let mut last = 0;
    for source in ["#endif", "ok", "#bogus", "#define X X\nX"] {
        pp.process_buffer(source, "test").unwrap();
        assert!(pp.error_count() >= last);
        last = pp.error_count();
    }
    assert!(last >= 3);
}
