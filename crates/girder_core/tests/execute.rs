//! End-to-end evaluation tests: whole programs through parse + execute,
//! checked against the observable values ES5.1 requires.

use girder_core::runtime::completion::Completion;
use girder_core::{parse_string, Interpreter, Value};

fn eval(src: &str) -> Value {
    Interpreter::new()
        .execute_string(src, None)
        .unwrap_or_else(|e| panic!("parse failed for {src:?}: {e}"))
}

fn eval_number(src: &str) -> f64 {
    match eval(src) {
        Value::Number(n) => n,
        other => panic!("expected number from {src:?}, got {other:?}"),
    }
}

fn eval_string(src: &str) -> String {
    match eval(src) {
        Value::String(s) => s,
        other => panic!("expected string from {src:?}, got {other:?}"),
    }
}

fn eval_bool(src: &str) -> bool {
    match eval(src) {
        Value::Boolean(b) => b,
        other => panic!("expected boolean from {src:?}, got {other:?}"),
    }
}

/// Run and expect an uncaught throw; return the thrown error's `name`
/// (the part of `toString()` before the colon).
fn uncaught_name(src: &str) -> String {
    let mut interp = Interpreter::new();
    let program = parse_string(src, None).expect("parse");
    match interp.run_program(&program) {
        Completion::Throw(thrown) => {
            let rendered = interp.to_display_string(&thrown);
            rendered.split(':').next().unwrap_or("").to_string()
        }
        other => panic!("expected uncaught throw from {src:?}, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// The canonical end-to-end scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_hello_world_iife() {
    assert_eq!(
        eval_string("(function(){ return \"Hello World!\"; })()"),
        "Hello World!"
    );
}

#[test]
fn test_loop_accumulation() {
    assert_eq!(eval_number("var x = 0; for (var i = 0; i < 10; i++) x += i; x;"), 45.0);
}

#[test]
fn test_finally_overrides_catch_return() {
    let src = "function f(){ try { throw new TypeError(\"oops\"); } \
               catch (e) { return e.message; } finally { return \"fin\"; } } f();";
    assert_eq!(eval_string(src), "fin");
}

#[test]
fn test_array_length_invariant() {
    assert_eq!(eval_number("var a = []; a[2] = 1; a.length;"), 3.0);
    assert!(eval("var a = []; a[2] = 1; a.length = 1; a[2];").is_undefined());
}

#[test]
fn test_strict_this_is_undefined() {
    assert!(eval("\"use strict\"; function f(){ return this; } f();").is_undefined());
    // Without the directive, `this` coerces to the global object.
    assert!(!eval_bool("function f(){ return this === undefined; } f();"));
    assert!(eval_bool("var g = this; function f(){ return this === g; } f();"));
}

#[test]
fn test_typeof_undeclared_vs_bare_reference() {
    assert_eq!(eval_string("typeof undeclaredName"), "undefined");
    assert_eq!(uncaught_name("undeclaredName"), "ReferenceError");
}

// ─────────────────────────────────────────────────────────────────────────────
// Boundary behaviors
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_ieee_addition() {
    assert_eq!(eval_bool("0.1 + 0.2 === 0.3"), false);
    let sum = eval_number("0.1 + 0.2");
    assert_eq!(sum.to_bits(), 0x3FD3333333333334);
}

#[test]
fn test_coercion_classics() {
    assert_eq!(eval_string("[] + []"), "");
    assert_eq!(eval_string("[] + {}"), "[object Object]");
    // At statement position `{}` is a block, so `+[]` is what evaluates.
    assert_eq!(eval_number("{} + []"), 0.0);
}

#[test]
fn test_equality_table() {
    assert_eq!(eval_bool("null == undefined"), true);
    assert_eq!(eval_bool("null === undefined"), false);
    assert_eq!(eval_bool("NaN == NaN"), false);
    assert_eq!(eval_bool("'1' == 1"), true);
    assert_eq!(eval_bool("true == 1"), true);
    assert_eq!(eval_bool("[1] == 1"), true);
    assert_eq!(eval_bool("null == 0"), false);
}

#[test]
fn test_strict_duplicate_property_is_parse_error() {
    assert!(parse_string("\"use strict\"; var o = {a:1, a:2};", None).is_err());
    // Without the directive, the second definition wins.
    assert_eq!(eval_number("var o = {a:1, a:2}; o.a;"), 2.0);
}

#[test]
fn test_delete_global_var_binding() {
    assert_eq!(eval_bool("var x = 1; delete x;"), false);
    assert_eq!(eval_number("var x = 1; delete x; x;"), 1.0);
    // Plain (non-declared) global properties are deletable.
    assert_eq!(eval_bool("y = 1; delete y;"), true);
}

#[test]
fn test_typeof_never_throws() {
    for expr in [
        "typeof undefined",
        "typeof null",
        "typeof true",
        "typeof 1",
        "typeof 'x'",
        "typeof {}",
        "typeof [1]",
        "typeof function () {}",
        "typeof missingEntirely",
    ] {
        let result = eval_string(expr);
        assert!(
            matches!(
                result.as_str(),
                "undefined" | "boolean" | "number" | "string" | "object" | "function"
            ),
            "{expr} -> {result}"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Functions, closures, scopes
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_closure_captures_environment() {
    let src = "function counter() { var n = 0; return function () { n += 1; return n; }; } \
               var c = counter(); c(); c(); c();";
    assert_eq!(eval_number(src), 3.0);
}

#[test]
fn test_hoisting() {
    assert_eq!(eval_number("function f() { return g(); } function g() { return 4; } f();"), 4.0);
    assert!(eval("typeof h; var h = 1;").as_str() == Some("undefined"));
    assert_eq!(eval_string("typeof i; function i() {}"), "function");
}

#[test]
fn test_named_function_expression_self_reference() {
    let src = "var f = function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); }; f(5);";
    assert_eq!(eval_number(src), 120.0);
    assert_eq!(eval_string("var f = function g() {}; typeof g;"), "undefined");
}

#[test]
fn test_arguments_object() {
    assert_eq!(eval_number("function f() { return arguments.length; } f(1, 2, 3);"), 3.0);
    assert_eq!(eval_number("function f() { return arguments[1]; } f(5, 7);"), 7.0);
    assert_eq!(
        eval_bool("function f() { return arguments.callee === f; } f();"),
        true
    );
}

#[test]
fn test_arguments_alias_named_parameters() {
    // §10.6 parameter map: the alias is live in both directions.
    assert_eq!(
        eval_number("function f(a) { arguments[0] = 99; return a; } f(1);"),
        99.0
    );
    assert_eq!(
        eval_number("function f(a) { a = 7; return arguments[0]; } f(1);"),
        7.0
    );
    // Deleting the index severs the alias for good.
    assert_eq!(
        eval_number(
            "function f(a) { delete arguments[0]; arguments[0] = 5; return a; } f(1);"
        ),
        1.0
    );
    // Unsupplied formals were never mapped.
    assert!(eval("function f(a, b) { arguments[1] = 2; return b; } f(1);").is_undefined());
    // Strict activations do not alias.
    assert_eq!(
        eval_number("\"use strict\"; function f(a) { arguments[0] = 99; return a; } f(1);"),
        1.0
    );
}

#[test]
fn test_call_apply_bind() {
    assert_eq!(
        eval_number("function f(a, b) { return this.x + a + b; } f.call({x: 1}, 2, 3);"),
        6.0
    );
    assert_eq!(
        eval_number("function f(a, b) { return this.x + a + b; } f.apply({x: 1}, [2, 3]);"),
        6.0
    );
    assert_eq!(
        eval_number("function f(a, b) { return this.x + a + b; } var g = f.bind({x: 10}, 1); g(2);"),
        13.0
    );
    assert_eq!(eval_number("function f(a, b, c) {} f.bind(null, 1).length;"), 2.0);
}

#[test]
fn test_construct_semantics() {
    let src = "function P(name) { this.name = name; } P.prototype.greet = function () { \
               return 'hi ' + this.name; }; new P('x').greet();";
    assert_eq!(eval_string(src), "hi x");
    // A constructor returning an object overrides the fresh instance.
    assert_eq!(
        eval_number("function C() { return {v: 9}; } new C().v;"),
        9.0
    );
    // A primitive return is ignored.
    assert_eq!(
        eval_number("function C() { this.v = 4; return 7; } new C().v;"),
        4.0
    );
    assert_eq!(eval_bool("function C() {} new C() instanceof C;"), true);
}

// ─────────────────────────────────────────────────────────────────────────────
// Statements
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_switch_fall_through() {
    let src = "var s = ''; switch (2) { case 1: s += 'a'; case 2: s += 'b'; \
               case 3: s += 'c'; break; case 4: s += 'd'; } s;";
    assert_eq!(eval_string(src), "bc");
    let src = "var s = ''; switch (9) { case 1: s += 'a'; default: s += 'd'; case 3: s += 'c'; } s;";
    assert_eq!(eval_string(src), "dc");
}

#[test]
fn test_labeled_break_and_continue() {
    let src = "var s = ''; outer: for (var i = 0; i < 3; i++) { \
               for (var j = 0; j < 3; j++) { if (j === 1) continue outer; s += i + '' + j; } } s;";
    assert_eq!(eval_string(src), "001020");
    let src = "var n = 0; outer: for (var i = 0; i < 3; i++) { \
               for (var j = 0; j < 3; j++) { if (i === 1) break outer; n++; } } n;";
    assert_eq!(eval_number(src), 3.0);
}

#[test]
fn test_for_in_insertion_order() {
    let src = "var o = {b: 1, a: 2, c: 3}; var s = ''; for (var k in o) s += k; s;";
    assert_eq!(eval_string(src), "bac");
}

#[test]
fn test_for_in_skips_shadowed_and_walks_prototype() {
    let src = "function B() {} B.prototype.p = 1; B.prototype.q = 2; \
               var o = new B(); o.p = 3; o.own = 4; \
               var s = []; for (var k in o) s.push(k); s.join(',');";
    assert_eq!(eval_string(src), "p,own,q");
}

#[test]
fn test_for_in_over_null_is_empty() {
    assert_eq!(eval_number("var n = 0; for (var k in null) n++; n;"), 0.0);
}

#[test]
fn test_with_statement() {
    assert_eq!(eval_number("var o = {x: 5}; var r; with (o) { r = x; } r;"), 5.0);
    assert_eq!(eval_number("var o = {x: 5}; with (o) { x = 9; } o.x;"), 9.0);
}

#[test]
fn test_try_catch_binding_is_scoped() {
    let src = "var e = 'outer'; try { throw 'inner'; } catch (e) {} e;";
    assert_eq!(eval_string(src), "outer");
}

#[test]
fn test_do_while() {
    assert_eq!(eval_number("var n = 0; do { n++; } while (n < 5); n;"), 5.0);
    assert_eq!(eval_number("var n = 0; do { n++; } while (false); n;"), 1.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Strict mode
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_strict_propagates_to_nested_functions() {
    let src = "\"use strict\"; function outer() { return (function () { return this; })(); } outer();";
    assert!(eval(src).is_undefined());
}

#[test]
fn test_inner_directive_does_not_leak_out() {
    let src = "function strictish() { \"use strict\"; return this; } \
               typeof strictish() + ',' + typeof this;";
    assert_eq!(eval_string(src), "undefined,object");
}

#[test]
fn test_strict_assignment_to_undeclared_throws() {
    assert_eq!(uncaught_name("\"use strict\"; undeclared = 1;"), "ReferenceError");
    // Sloppy mode creates the global property instead.
    assert_eq!(eval_number("undeclared = 1; undeclared;"), 1.0);
}

#[test]
fn test_strict_write_to_readonly_throws() {
    let src = "\"use strict\"; var o = {}; Object.defineProperty(o, 'x', \
               {value: 1, writable: false}); o.x = 2;";
    assert_eq!(uncaught_name(src), "TypeError");
}

// ─────────────────────────────────────────────────────────────────────────────
// Object model
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_accessors_in_object_literal() {
    let src = "var o = { _v: 1, get v() { return this._v; }, set v(x) { this._v = x * 2; } }; \
               o.v = 10; o.v;";
    assert_eq!(eval_number(src), 20.0);
}

#[test]
fn test_define_property_and_enumerability() {
    let src = "var o = {a: 1}; Object.defineProperty(o, 'b', {value: 2, enumerable: false}); \
               Object.keys(o).join(',');";
    assert_eq!(eval_string(src), "a");
    assert_eq!(
        eval_string(
            "var o = {a: 1}; Object.defineProperty(o, 'b', {value: 2}); \
             Object.getOwnPropertyNames(o).join(',');"
        ),
        "a,b"
    );
}

#[test]
fn test_freeze_and_seal() {
    assert_eq!(eval_bool("var o = Object.freeze({a: 1}); o.a = 2; o.a === 1;"), true);
    assert_eq!(eval_bool("Object.isFrozen(Object.freeze({}));"), true);
    assert_eq!(
        eval_bool("var o = Object.seal({a: 1}); delete o.a; o.a === 1;"),
        true
    );
    assert_eq!(eval_bool("var o = Object.seal({a: 1}); o.a = 5; o.a === 5;"), true);
    assert_eq!(eval_bool("var o = Object.preventExtensions({}); o.x = 1; 'x' in o;"), false);
}

#[test]
fn test_object_create_and_prototypes() {
    let src = "var base = {greet: function () { return 'hello'; }}; \
               var child = Object.create(base); child.greet();";
    assert_eq!(eval_string(src), "hello");
    assert_eq!(eval_bool("Object.getPrototypeOf({}) === Object.prototype;"), true);
    assert_eq!(eval_bool("Object.create(null) instanceof Object;"), false);
}

#[test]
fn test_has_own_property_vs_in() {
    assert_eq!(eval_bool("var o = {a: 1}; o.hasOwnProperty('a');"), true);
    assert_eq!(eval_bool("var o = {a: 1}; o.hasOwnProperty('toString');"), false);
    assert_eq!(eval_bool("var o = {a: 1}; 'toString' in o;"), true);
}

#[test]
fn test_primitive_boxing_on_property_access() {
    assert_eq!(eval_number("'abc'.length"), 3.0);
    assert_eq!(eval_string("(5).toString(2)"), "101");
    assert_eq!(eval_bool("true.valueOf()"), true);
    // Writes to transient wrappers vanish silently outside strict mode.
    assert!(eval("var s = 'x'; s.prop = 1; s.prop;").is_undefined());
}

// ─────────────────────────────────────────────────────────────────────────────
// eval and Function
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_direct_eval_sees_local_scope() {
    assert_eq!(
        eval_number("function f() { var secret = 6; return eval('secret * 7'); } f();"),
        42.0
    );
}

#[test]
fn test_eval_var_leaks_into_caller() {
    assert_eq!(eval_number("function f() { eval('var v = 3;'); return v; } f();"), 3.0);
}

#[test]
fn test_function_constructor() {
    assert_eq!(eval_number("var add = new Function('a', 'b', 'return a + b;'); add(2, 3);"), 5.0);
    assert_eq!(eval_number("Function('return 1 + 1;')();"), 2.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Host error contract
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_uncaught_throw_returns_error_value() {
    let mut interp = Interpreter::new();
    let value = interp
        .execute_string("throw new RangeError('boom');", None)
        .unwrap();
    assert!(value.is_object());
    let rendered = interp.to_display_string(&value);
    assert_eq!(rendered, "RangeError: boom");
}

#[test]
fn test_interpreters_are_independent() {
    let mut a = Interpreter::new();
    let mut b = Interpreter::new();
    a.execute_string("var shared = 1;", None).unwrap();
    let program = parse_string("typeof shared;", None).unwrap();
    assert_eq!(b.execute_program(&program).as_str(), Some("undefined"));
    assert_eq!(a.execute_program(&program).as_str(), Some("number"));
}

#[test]
fn test_side_effect_free_program_preserves_globals() {
    let mut interp = Interpreter::new();
    let before = interp.execute_string(
        "Object.getOwnPropertyNames(this).length;",
        None,
    );
    let _ = interp.execute_string("1 + 2; 'x'.slice(0); [1, 2].length; Math.abs(-1);", None);
    let after = interp.execute_string(
        "Object.getOwnPropertyNames(this).length;",
        None,
    );
    assert_eq!(before.unwrap().as_number(), after.unwrap().as_number());
}

#[test]
fn test_deep_recursion_is_range_error_not_crash() {
    assert_eq!(
        uncaught_name("function f() { return f(); } f();"),
        "RangeError"
    );
}
