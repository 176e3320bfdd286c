//! Parser-level integration tests: ASI, early errors, the regex/division
//! split, and directive prologues, checked over whole programs.

use girder_core::parser::ast::{Expr, LitValue, Stmt};
use girder_core::parser::parse_string;

fn parses(src: &str) {
    parse_string(src, None).unwrap_or_else(|e| panic!("{src:?} should parse: {e}"));
}

fn rejects(src: &str) {
    assert!(
        parse_string(src, None).is_err(),
        "{src:?} should be a SyntaxError"
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Automatic Semicolon Insertion (§7.9)
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_asi_at_line_breaks_and_eof() {
    parses("var a = 1\nvar b = 2");
    parses("a = 1");
    parses("{ a = 1 }");
    rejects("var a = 1 var b = 2");
}

#[test]
fn test_asi_restricted_return() {
    let program = parse_string("function f() { return\n1; }", None).unwrap();
    // The return statement has no argument; the `1` became its own
    // statement.
    if let Stmt::FnDecl(f) = &program.body[0] {
        assert_eq!(f.body.len(), 2);
        match &f.body[0] {
            Stmt::Return(r) => assert!(r.argument.is_none()),
            other => panic!("expected return, got {other:?}"),
        }
    } else {
        panic!("expected function declaration");
    }
}

#[test]
fn test_asi_restricted_throw_and_postfix() {
    rejects("throw\nnew Error('x');");
    // `a\n++b` is two statements, not `a++` then `b`.
    let program = parse_string("a\n++b", None).unwrap();
    assert_eq!(program.body.len(), 2);
}

#[test]
fn test_asi_restricted_break_continue() {
    let program = parse_string(
        "outer: while (1) { while (1) { break\nouter; } }",
        None,
    );
    // `break` takes no label across the newline; `outer;` is then an
    // expression statement referencing the (undeclared) name.
    assert!(program.is_ok());
}

#[test]
fn test_no_asi_inside_for_header() {
    rejects("for (var i = 0\ni < 10\ni++) {}");
    rejects("for (;;\n");
    parses("for (var i = 0; i < 10; i++) {}");
}

#[test]
fn test_do_while_semicolon_optional() {
    parses("do {} while (false) var x = 1;");
    parses("do {} while (false); var x = 1;");
}

// ─────────────────────────────────────────────────────────────────────────────
// Regex vs. division
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_regex_and_division_positions() {
    // Expression start: regex.
    let program = parse_string("var re = /ab/g;", None).unwrap();
    if let Stmt::Var(v) = &program.body[0] {
        match &v.declarations[0].init {
            Some(Expr::Literal(lit)) => {
                assert!(matches!(&lit.value, LitValue::Regex { pattern, flags }
                    if pattern == "ab" && flags == "g"))
            }
            other => panic!("expected regex literal, got {other:?}"),
        }
    }
    // Operator position: division.
    parses("var q = a / b / c;");
    parses("var q = (a) / 2;");
    // After return on same line: regex.
    parses("function f() { return /x/.test('x'); }");
    // Statement position: regex, not a comment-ambiguous division chain.
    parses("/x/.test('y');");
}

#[test]
fn test_regex_in_call_argument() {
    parses("f(/re/, 2);");
    parses("x = 1 / 2; y = /z/;");
}

// ─────────────────────────────────────────────────────────────────────────────
// Early errors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_strict_early_errors() {
    rejects("\"use strict\"; with (o) {}");
    parses("with (o) {}");

    rejects("\"use strict\"; var eval = 1;");
    rejects("\"use strict\"; var arguments = 1;");
    rejects("\"use strict\"; eval = 1;");
    rejects("\"use strict\"; arguments += 1;");
    rejects("\"use strict\"; eval++;");
    parses("var eval = 1;");

    rejects("\"use strict\"; function eval() {}");
    rejects("\"use strict\"; function f(eval) {}");
    rejects("\"use strict\"; function f(a, a) {}");
    rejects("function f(a, a) { \"use strict\"; }");
    parses("function f(a, a) {}");

    rejects("\"use strict\"; delete x;");
    parses("delete x;");
    parses("\"use strict\"; delete x.y;");

    rejects("\"use strict\"; var o = 017;");
    parses("var o = 017;");
    rejects("\"use strict\"; var s = '\\017';");
    parses("var s = '\\017';");

    rejects("\"use strict\"; var let = 1;");
    rejects("\"use strict\"; var yield = 1;");
    parses("var let = 1;");

    rejects("\"use strict\"; try {} catch (eval) {}");
}

#[test]
fn test_directive_prologue_shape() {
    assert!(parse_string("\"use strict\";", None).unwrap().strict);
    assert!(parse_string("'use strict';", None).unwrap().strict);
    assert!(parse_string("\"x\"; \"use strict\";", None).unwrap().strict);
    // Not in the prologue:
    assert!(!parse_string("var a; \"use strict\";", None).unwrap().strict);
    // Escaped spelling is not the directive:
    assert!(!parse_string("\"use\\u0020strict\";", None).unwrap().strict);
    // Parenthesized is an expression, not a directive:
    assert!(!parse_string("(\"use strict\");", None).unwrap().strict);
}

#[test]
fn test_strict_inheritance_into_function_bodies() {
    let program = parse_string("\"use strict\"; function f() {}", None).unwrap();
    if let Stmt::FnDecl(f) = &program.body[1] {
        assert!(f.strict);
    } else {
        panic!("expected function declaration");
    }
    let program = parse_string("function f() { \"use strict\"; function g() {} }", None).unwrap();
    if let Stmt::FnDecl(f) = &program.body[0] {
        assert!(f.strict);
    } else {
        panic!("expected function declaration");
    }
}

#[test]
fn test_object_literal_property_conflicts() {
    rejects("var o = {get a() {}, get a() {}};");
    rejects("var o = {set a(v) {}, set a(v) {}};");
    rejects("var o = {a: 1, get a() {}};");
    rejects("var o = {get a() {}, a: 1};");
    parses("var o = {get a() {}, set a(v) {}};");
    parses("var o = {a: 1, a: 2};");
    rejects("\"use strict\"; var o = {a: 1, a: 2};");
}

#[test]
fn test_label_early_errors() {
    rejects("x: x: while (1) {}");
    rejects("while (1) { break missing; }");
    rejects("while (1) { continue missing; }");
    rejects("x: { continue x; }");
    rejects("break;");
    rejects("continue;");
    parses("x: while (1) { break x; }");
    parses("x: while (1) { continue x; }");
    parses("x: { break x; }");
}

#[test]
fn test_return_outside_function() {
    rejects("return 1;");
    parses("function f() { return 1; }");
}

#[test]
fn test_switch_single_default() {
    rejects("switch (x) { default: ; default: ; }");
    parses("switch (x) { case 1: ; default: ; case 2: ; }");
}

#[test]
fn test_reserved_words() {
    rejects("var class = 1;");
    rejects("var enum = 1;");
    rejects("class;");
    // Reserved words are fine as property names.
    parses("a.delete = 1;");
    parses("var o = {new: 1, in: 2, class: 3};");
}

#[test]
fn test_invalid_assignment_targets() {
    rejects("1 = 2;");
    rejects("a + b = c;");
    rejects("f() = 1;");
    parses("a.b = 1;");
    parses("a[0] = 1;");
}

// ─────────────────────────────────────────────────────────────────────────────
// Grammar coverage
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_for_disambiguation() {
    let program = parse_string("for (var k in o) {}", None).unwrap();
    assert!(matches!(program.body[0], Stmt::ForIn(_)));
    let program = parse_string("for (var i = 0; i < 1; i++) {}", None).unwrap();
    assert!(matches!(program.body[0], Stmt::For(_)));
    let program = parse_string("for (x in o) {}", None).unwrap();
    assert!(matches!(program.body[0], Stmt::ForIn(_)));
    // NoIn: the `in` belongs to the header, not the initializer.
    parses("for (var x = ('a' in o); x; ) {}");
    parses("for (var x = a ? b in o : c; ; ) {}");
}

#[test]
fn test_new_expression_forms() {
    parses("new F;");
    parses("new F();");
    parses("new a.b.C(1, 2);");
    parses("new new F()();");
    parses("new (f())();");
}

#[test]
fn test_trailing_tokens_rejected() {
    rejects("var a = ;");
    rejects("a +;");
    rejects("function () {}");
    rejects("{");
    rejects("try {}");
}

#[test]
fn test_entry_points() {
    use girder_core::Parser;
    let mut p = Parser::new("a + b * c", None);
    let expr = p.parse_expression().unwrap();
    assert!(matches!(expr, Expr::Binary(_)));

    let mut p = Parser::new("function f(x) { return x; }", None);
    let f = p.parse_function_declaration().unwrap();
    assert_eq!(f.name.as_deref(), Some("f"));
    assert_eq!(f.params, vec!["x"]);

    let mut p = Parser::new("if (a) b(); else c();", None);
    let stmt = p.parse_statement().unwrap();
    assert!(matches!(stmt, Stmt::If(_)));
}
