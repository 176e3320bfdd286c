//! RegExp objects (§15.10 subset) over the backing `regex` engine.
//!
//! ES5.1 patterns mostly translate verbatim; the constructs the backing
//! engine cannot express (backreferences, lookaround) fail at construction
//! with a SyntaxError, never silently misbehave. `lastIndex` is honored by
//! `exec`/`test` for global regexps.

use regex::RegexBuilder;

use crate::intrinsics::{add_method, arg, make_constructor};
use crate::objects::object::RegExpData;
use crate::objects::{JsObject, ObjectData, ObjectHandle, Property, PropertyAttributes};
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let proto = interp.intrinsics.regexp_prototype;
    add_method(interp, proto, "exec", 1, proto_exec);
    add_method(interp, proto, "test", 1, proto_test);
    add_method(interp, proto, "toString", 0, proto_to_string);
    make_constructor(interp, "RegExp", 2, ctor_call, ctor_construct, proto);
}

// ─────────────────────────────────────────────────────────────────────────────
// Construction (§15.10.4)
// ─────────────────────────────────────────────────────────────────────────────

/// Build a RegExp object from pattern/flags source text. Shared by the
/// literal evaluator and the constructor.
pub(crate) fn make_regexp(
    interp: &mut Interpreter,
    pattern: &str,
    flags: &str,
) -> Result<ObjectHandle, Value> {
    let mut global = false;
    let mut ignore_case = false;
    let mut multiline = false;
    for c in flags.chars() {
        let slot = match c {
            'g' => &mut global,
            'i' => &mut ignore_case,
            'm' => &mut multiline,
            _ => {
                return interp.throw_syntax_error(&format!("invalid regular expression flag '{c}'"));
            }
        };
        if *slot {
            return interp.throw_syntax_error(&format!("duplicate regular expression flag '{c}'"));
        }
        *slot = true;
    }

    let source = if pattern.is_empty() {
        // An empty pattern would print as `//` (a comment); the spec uses
        // this placeholder (§15.10.4.1).
        "(?:)".to_string()
    } else {
        pattern.to_string()
    };

    let matcher = RegexBuilder::new(&translate_pattern(&source))
        .case_insensitive(ignore_case)
        .multi_line(multiline)
        .build();
    let matcher = match matcher {
        Ok(m) => m,
        Err(e) => {
            return interp.throw_syntax_error(&format!("invalid regular expression: {e}"));
        }
    };

    let proto = interp.intrinsics.regexp_prototype;
    let mut obj = JsObject::with_data(
        "RegExp",
        Some(proto),
        ObjectData::RegExp(RegExpData {
            source: source.clone(),
            global,
            ignore_case,
            multiline,
            matcher: Some(matcher),
        }),
    );
    obj.define_property_raw(
        "source",
        Property::data(Value::string(source), PropertyAttributes::empty()),
    );
    obj.define_property_raw(
        "global",
        Property::data(Value::Boolean(global), PropertyAttributes::empty()),
    );
    obj.define_property_raw(
        "ignoreCase",
        Property::data(Value::Boolean(ignore_case), PropertyAttributes::empty()),
    );
    obj.define_property_raw(
        "multiline",
        Property::data(Value::Boolean(multiline), PropertyAttributes::empty()),
    );
    obj.define_property_raw(
        "lastIndex",
        Property::data(Value::Number(0.0), PropertyAttributes::WRITABLE),
    );
    Ok(interp.heap.allocate(obj))
}

/// Map the ES5.1 escape spellings the backing engine rejects onto
/// equivalents it accepts. Everything else passes through.
fn translate_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.peek() {
                // \cX control escapes and \uXXXX are spelled differently.
                Some('u') => {
                    chars.next();
                    let digits: String = chars.by_ref().take(4).collect();
                    out.push_str(&format!("\\x{{{digits}}}"));
                }
                Some(other) => {
                    let other = *other;
                    chars.next();
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn ctor_call(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    // §15.10.3.1: RegExp(re) with no flags passes the object through.
    if args.len() == 1 {
        if let Some(h) = args[0].as_object() {
            if matches!(interp.heap.get(h).data, ObjectData::RegExp(_)) {
                return Ok(args[0].clone());
            }
        }
    }
    ctor_construct(interp, this, args)
}

fn ctor_construct(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let pattern_arg = arg(args, 0);
    let flags_arg = arg(args, 1);

    // Rebuilding from an existing RegExp (§15.10.4.1).
    if let Some(h) = pattern_arg.as_object() {
        let rebuild = if let ObjectData::RegExp(data) = &interp.heap.get(h).data {
            let source = data.source.clone();
            let mut flags = String::new();
            if data.global {
                flags.push('g');
            }
            if data.ignore_case {
                flags.push('i');
            }
            if data.multiline {
                flags.push('m');
            }
            Some((source, flags))
        } else {
            None
        };
        if let Some((source, flags)) = rebuild {
            if !flags_arg.is_undefined() {
                return interp
                    .throw_type_error("cannot supply flags when constructing one RegExp from another");
            }
            let built = make_regexp(interp, &source, &flags)?;
            return Ok(Value::Object(built));
        }
    }

    let pattern = match &pattern_arg {
        Value::Undefined => String::new(),
        other => interp.to_string_value(other)?,
    };
    let flags = match &flags_arg {
        Value::Undefined => String::new(),
        other => interp.to_string_value(other)?,
    };
    Ok(Value::Object(make_regexp(interp, &pattern, &flags)?))
}

// ─────────────────────────────────────────────────────────────────────────────
// Interrogation helpers used by String.prototype
// ─────────────────────────────────────────────────────────────────────────────

/// The compiled matcher of a RegExp value, if it is one.
pub(crate) fn regexp_matcher(interp: &Interpreter, value: &Value) -> Option<regex::Regex> {
    let h = value.as_object()?;
    match &interp.heap.get(h).data {
        ObjectData::RegExp(data) => data.matcher.clone(),
        _ => None,
    }
}

/// The `g` flag of a RegExp value.
pub(crate) fn is_global(interp: &Interpreter, value: &Value) -> bool {
    value
        .as_object()
        .map(|h| match &interp.heap.get(h).data {
            ObjectData::RegExp(data) => data.global,
            _ => false,
        })
        .unwrap_or(false)
}

/// §15.10.6.2 exec against an explicit subject string, producing the match
/// array (`index` and `input` properties included) or null.
pub(crate) fn exec_on_string(
    interp: &mut Interpreter,
    regexp_value: &Value,
    subject: &str,
) -> Result<Value, Value> {
    let Some(h) = regexp_value.as_object() else {
        return interp.throw_type_error("RegExp.prototype.exec called on a non-RegExp");
    };
    let matched = match &interp.heap.get(h).data {
        ObjectData::RegExp(data) => Some((
            data.matcher.clone().expect("constructed regexps compile"),
            data.global,
        )),
        _ => None,
    };
    let (matcher, global) = match matched {
        Some(pair) => pair,
        None => return interp.throw_type_error("RegExp.prototype.exec called on a non-RegExp"),
    };

    let start = if global {
        let last_index = interp.get_property(h, "lastIndex", regexp_value)?;
        let i = interp.to_integer(&last_index)?;
        if i < 0.0 || i > subject.len() as f64 {
            interp.put_property(h, "lastIndex", Value::Number(0.0), false)?;
            return Ok(Value::Null);
        }
        i as usize
    } else {
        0
    };

    // Clamp to a char boundary so slicing cannot panic mid-scalar.
    let mut boundary = start.min(subject.len());
    while boundary < subject.len() && !subject.is_char_boundary(boundary) {
        boundary += 1;
    }

    let captures = match matcher.captures(&subject[boundary..]) {
        Some(c) => c,
        None => {
            if global {
                interp.put_property(h, "lastIndex", Value::Number(0.0), false)?;
            }
            return Ok(Value::Null);
        }
    };

    let whole = captures.get(0).expect("group 0 always present");
    let match_start = boundary + whole.start();
    let match_end = boundary + whole.end();
    if global {
        interp.put_property(h, "lastIndex", Value::Number(match_end as f64), false)?;
    }

    let mut elements = Vec::with_capacity(captures.len());
    for i in 0..captures.len() {
        elements.push(match captures.get(i) {
            Some(group) => Value::string(group.as_str().to_string()),
            None => Value::Undefined,
        });
    }
    let result = interp.make_array(elements);
    // `index` counts characters, not bytes.
    let char_index = subject[..match_start].chars().count();
    interp
        .heap
        .get_mut(result)
        .set_simple_property("index", Value::Number(char_index as f64));
    interp
        .heap
        .get_mut(result)
        .set_simple_property("input", Value::string(subject.to_string()));
    Ok(Value::Object(result))
}

// ─────────────────────────────────────────────────────────────────────────────
// RegExp.prototype.* (§15.10.6)
// ─────────────────────────────────────────────────────────────────────────────

fn proto_exec(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let subject_value = arg(args, 0);
    let subject = interp.to_string_value(&subject_value)?;
    exec_on_string(interp, &this, &subject)
}

fn proto_test(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let result = proto_exec(interp, this, args)?;
    Ok(Value::Boolean(!result.is_null()))
}

fn proto_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let Some(h) = this.as_object() else {
        return interp.throw_type_error("RegExp.prototype.toString called on a non-RegExp");
    };
    let rendered_opt = match &interp.heap.get(h).data {
        ObjectData::RegExp(data) => {
            let mut flags = String::new();
            if data.global {
                flags.push('g');
            }
            if data.ignore_case {
                flags.push('i');
            }
            if data.multiline {
                flags.push('m');
            }
            Some(format!("/{}/{}", data.source, flags))
        }
        _ => None,
    };
    let rendered = match rendered_opt {
        Some(s) => s,
        None => return interp.throw_type_error("RegExp.prototype.toString called on a non-RegExp"),
    };
    Ok(Value::string(rendered))
}

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::runtime::Interpreter;

    fn eval(src: &str) -> Value {
        Interpreter::new().execute_string(src, None).unwrap()
    }

    #[test]
    fn test_literal_and_test() {
        assert!(eval("/ab+c/.test('xabbcx');").to_boolean());
        assert!(!eval("/ab+c/.test('ac');").to_boolean());
        assert!(eval("/AB/i.test('ab');").to_boolean());
    }

    #[test]
    fn test_exec_result_shape() {
        assert_eq!(eval("/(b)(c)/.exec('abc')[1];").as_str(), Some("b"));
        assert_eq!(eval("/(b)(c)/.exec('abc').index;").as_number(), Some(1.0));
        assert_eq!(eval("/(b)(c)/.exec('abc').input;").as_str(), Some("abc"));
        assert!(eval("/z/.exec('abc');").is_null());
    }

    #[test]
    fn test_global_last_index() {
        let src = "var re = /a/g; re.exec('aa'); re.lastIndex;";
        assert_eq!(eval(src).as_number(), Some(1.0));
        let src = "var re = /a/g; re.exec('aa'); re.exec('aa'); re.lastIndex;";
        assert_eq!(eval(src).as_number(), Some(2.0));
        let src = "var re = /a/g; re.exec('aa'); re.exec('aa'); re.exec('aa'); re.lastIndex;";
        assert_eq!(eval(src).as_number(), Some(0.0));
    }

    #[test]
    fn test_constructor_and_flags() {
        assert!(eval("new RegExp('a.c').test('abc');").to_boolean());
        assert_eq!(eval("new RegExp('x', 'gi').toString();").as_str(), Some("/x/gi"));
        assert_eq!(eval("String(/a/m);").as_str(), Some("/a/m"));
    }

    #[test]
    fn test_invalid_flags_throw() {
        let thrown = eval("try { new RegExp('a', 'q'); } catch (e) { e.name; }");
        assert_eq!(thrown.as_str(), Some("SyntaxError"));
        let thrown = eval("try { new RegExp('a', 'gg'); } catch (e) { e.name; }");
        assert_eq!(thrown.as_str(), Some("SyntaxError"));
    }

    #[test]
    fn test_untranslatable_pattern_is_syntax_error() {
        // Backreferences are not expressible in the backing engine.
        let thrown = eval("try { new RegExp('(a)\\\\1'); } catch (e) { e.name; }");
        assert_eq!(thrown.as_str(), Some("SyntaxError"));
    }
}
