//! The `String` constructor and `String.prototype` (§15.5).
//!
//! Methods operate on Unicode scalar values. The `replace`/`match`/`split`
//! trio accepts both string and RegExp arguments, delegating pattern work
//! to the shared RegExp backing (see [`crate::intrinsics::regexp`]).

use crate::intrinsics::{add_method, arg, make_constructor, regexp};
use crate::objects::{ObjectData, Property, PropertyAttributes};
use crate::runtime::conversions::{to_integer_f, to_uint16_f};
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let proto = interp.intrinsics.string_prototype;
    interp.heap.get_mut(proto).define_property_raw(
        "length",
        Property::data(Value::Number(0.0), PropertyAttributes::empty()),
    );
    add_method(interp, proto, "toString", 0, proto_value_of);
    add_method(interp, proto, "valueOf", 0, proto_value_of);
    add_method(interp, proto, "charAt", 1, proto_char_at);
    add_method(interp, proto, "charCodeAt", 1, proto_char_code_at);
    add_method(interp, proto, "indexOf", 1, proto_index_of);
    add_method(interp, proto, "lastIndexOf", 1, proto_last_index_of);
    add_method(interp, proto, "concat", 1, proto_concat);
    add_method(interp, proto, "slice", 2, proto_slice);
    add_method(interp, proto, "substring", 2, proto_substring);
    add_method(interp, proto, "substr", 2, proto_substr);
    add_method(interp, proto, "split", 2, proto_split);
    add_method(interp, proto, "replace", 2, proto_replace);
    add_method(interp, proto, "match", 1, proto_match);
    add_method(interp, proto, "toLowerCase", 0, proto_to_lower_case);
    add_method(interp, proto, "toUpperCase", 0, proto_to_upper_case);
    add_method(interp, proto, "trim", 0, proto_trim);

    let ctor = make_constructor(interp, "String", 1, ctor_call, ctor_construct, proto);
    add_method(interp, ctor, "fromCharCode", 1, from_char_code);
}

// ─────────────────────────────────────────────────────────────────────────────
// Constructor (§15.5.1 / §15.5.2)
// ─────────────────────────────────────────────────────────────────────────────

fn ctor_call(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    if args.is_empty() {
        return Ok(Value::string(""));
    }
    let s = interp.to_string_value(&args[0])?;
    Ok(Value::string(s))
}

fn ctor_construct(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let s = if args.is_empty() {
        String::new()
    } else {
        interp.to_string_value(&args[0])?
    };
    Ok(Value::Object(interp.make_string_object(s)))
}

fn from_char_code(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let mut out = String::with_capacity(args.len());
    for a in args {
        let unit = to_uint16_f(interp.to_number(a)?);
        out.push(char::from_u32(unit as u32).unwrap_or('\u{FFFD}'));
    }
    Ok(Value::string(out))
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────────────────────────────────────

/// §15.5.4 methods begin with CheckObjectCoercible + ToString(this).
fn this_string(interp: &mut Interpreter, this: &Value) -> Result<String, Value> {
    interp.check_object_coercible(this)?;
    // A String wrapper short-circuits to its primitive value.
    if let Some(h) = this.as_object() {
        if let ObjectData::String(s) = &interp.heap.get(h).data {
            return Ok(s.clone());
        }
    }
    interp.to_string_value(this)
}

fn chars_of(s: &str) -> Vec<char> {
    s.chars().collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// String.prototype.* (§15.5.4)
// ─────────────────────────────────────────────────────────────────────────────

fn proto_value_of(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    match &this {
        Value::String(s) => Ok(Value::string(s.clone())),
        Value::Object(h) => {
            if let ObjectData::String(s) = &interp.heap.get(*h).data {
                return Ok(Value::string(s.clone()));
            }
            interp.throw_type_error("String.prototype.valueOf is not generic")
        }
        _ => interp.throw_type_error("String.prototype.valueOf is not generic"),
    }
}

fn proto_char_at(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let position = to_integer_f(interp.to_number(&arg(args, 0))?);
    if position < 0.0 {
        return Ok(Value::string(""));
    }
    match s.chars().nth(position as usize) {
        Some(c) => Ok(Value::string(c.to_string())),
        None => Ok(Value::string("")),
    }
}

fn proto_char_code_at(
    interp: &mut Interpreter,
    this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let position = to_integer_f(interp.to_number(&arg(args, 0))?);
    if position < 0.0 {
        return Ok(Value::Number(f64::NAN));
    }
    match s.chars().nth(position as usize) {
        Some(c) => Ok(Value::Number(c as u32 as f64)),
        None => Ok(Value::Number(f64::NAN)),
    }
}

fn proto_index_of(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let needle_value = arg(args, 0);
    let needle = interp.to_string_value(&needle_value)?;
    let start = to_integer_f(interp.to_number(&arg(args, 1))?).max(0.0);
    let haystack = chars_of(&s);
    let needle_chars = chars_of(&needle);
    let from = (start as usize).min(haystack.len());
    for i in from..=haystack.len().saturating_sub(needle_chars.len()).max(from) {
        if i + needle_chars.len() <= haystack.len()
            && haystack[i..i + needle_chars.len()] == needle_chars[..]
        {
            return Ok(Value::Number(i as f64));
        }
    }
    Ok(Value::Number(-1.0))
}

fn proto_last_index_of(
    interp: &mut Interpreter,
    this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let needle_value = arg(args, 0);
    let needle = interp.to_string_value(&needle_value)?;
    let position = interp.to_number(&arg(args, 1))?;
    let haystack = chars_of(&s);
    let needle_chars = chars_of(&needle);
    let limit = if position.is_nan() {
        haystack.len()
    } else {
        to_integer_f(position).max(0.0) as usize
    };
    if needle_chars.len() > haystack.len() {
        return Ok(Value::Number(-1.0));
    }
    let mut best: Option<usize> = None;
    for i in 0..=haystack.len() - needle_chars.len() {
        if i > limit {
            break;
        }
        if haystack[i..i + needle_chars.len()] == needle_chars[..] {
            best = Some(i);
        }
    }
    Ok(Value::Number(best.map(|i| i as f64).unwrap_or(-1.0)))
}

fn proto_concat(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let mut out = this_string(interp, &this)?;
    for a in args {
        out.push_str(&interp.to_string_value(a)?);
    }
    Ok(Value::string(out))
}

fn proto_slice(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let chars = chars_of(&s);
    let len = chars.len() as f64;
    let start_arg = to_integer_f(interp.to_number(&arg(args, 0))?);
    let end_arg = match arg(args, 1) {
        Value::Undefined => len,
        other => to_integer_f(interp.to_number(&other)?),
    };
    let from = if start_arg < 0.0 {
        (len + start_arg).max(0.0)
    } else {
        start_arg.min(len)
    } as usize;
    let to = if end_arg < 0.0 {
        (len + end_arg).max(0.0)
    } else {
        end_arg.min(len)
    } as usize;
    if from >= to {
        return Ok(Value::string(""));
    }
    Ok(Value::string(chars[from..to].iter().collect::<String>()))
}

fn proto_substring(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let chars = chars_of(&s);
    let len = chars.len() as f64;
    let raw_start = to_integer_f(interp.to_number(&arg(args, 0))?);
    let raw_end = match arg(args, 1) {
        Value::Undefined => len,
        other => to_integer_f(interp.to_number(&other)?),
    };
    let a = raw_start.max(0.0).min(len);
    let b = raw_end.max(0.0).min(len);
    let (from, to) = if a <= b { (a, b) } else { (b, a) };
    Ok(Value::string(
        chars[from as usize..to as usize].iter().collect::<String>(),
    ))
}

/// Annex B §B.2.3 substr.
fn proto_substr(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let chars = chars_of(&s);
    let len = chars.len() as f64;
    let raw_start = to_integer_f(interp.to_number(&arg(args, 0))?);
    let length = match arg(args, 1) {
        Value::Undefined => f64::INFINITY,
        other => to_integer_f(interp.to_number(&other)?),
    };
    let start = if raw_start < 0.0 {
        (len + raw_start).max(0.0)
    } else {
        raw_start.min(len)
    };
    let count = length.max(0.0).min(len - start);
    if count <= 0.0 {
        return Ok(Value::string(""));
    }
    let from = start as usize;
    let to = from + count as usize;
    Ok(Value::string(chars[from..to].iter().collect::<String>()))
}

fn proto_split(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let separator = arg(args, 0);
    let limit = match arg(args, 1) {
        Value::Undefined => u32::MAX,
        other => interp.to_uint32(&other)?,
    };
    if limit == 0 {
        let array = interp.make_array(Vec::new());
        return Ok(Value::Object(array));
    }
    if separator.is_undefined() {
        let array = interp.make_array(vec![Value::string(s)]);
        return Ok(Value::Object(array));
    }

    let pieces: Vec<String> = if let Some(matcher) = regexp::regexp_matcher(interp, &separator) {
        let mut out = Vec::new();
        let mut last = 0usize;
        for m in matcher.find_iter(&s) {
            // A zero-width match at the cursor would loop forever; step
            // past it without splitting.
            if m.start() == m.end() && m.start() == last {
                continue;
            }
            out.push(s[last..m.start()].to_string());
            last = m.end();
        }
        out.push(s[last..].to_string());
        out
    } else {
        let sep = interp.to_string_value(&separator)?;
        if sep.is_empty() {
            s.chars().map(|c| c.to_string()).collect()
        } else {
            s.split(sep.as_str()).map(|p| p.to_string()).collect()
        }
    };

    let values: Vec<Value> = pieces
        .into_iter()
        .take(limit as usize)
        .map(Value::String)
        .collect();
    Ok(Value::Object(interp.make_array(values)))
}

fn proto_replace(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let pattern = arg(args, 0);
    let replacement = arg(args, 1);

    // Collect (start, end, matched, captures) for each replacement site.
    let sites: Vec<(usize, usize, String, Vec<Option<String>>)> =
        if let Some(matcher) = regexp::regexp_matcher(interp, &pattern) {
            let global = regexp::is_global(interp, &pattern);
            let mut out = Vec::new();
            for caps in matcher.captures_iter(&s) {
                let whole = caps.get(0).expect("group 0 always present");
                let groups = (1..caps.len())
                    .map(|i| caps.get(i).map(|g| g.as_str().to_string()))
                    .collect();
                out.push((whole.start(), whole.end(), whole.as_str().to_string(), groups));
                if !global {
                    break;
                }
            }
            out
        } else {
            let needle = interp.to_string_value(&pattern)?;
            match s.find(&needle) {
                Some(start) => vec![(start, start + needle.len(), needle, Vec::new())],
                None => Vec::new(),
            }
        };

    let mut out = String::new();
    let mut cursor = 0usize;
    for (start, end, matched, captures) in sites {
        out.push_str(&s[cursor..start]);
        let replaced = if interp.is_callable(&replacement) {
            let mut call_args = vec![Value::string(matched.clone())];
            for c in &captures {
                call_args.push(match c {
                    Some(text) => Value::string(text.clone()),
                    None => Value::Undefined,
                });
            }
            call_args.push(Value::Number(start as f64));
            call_args.push(Value::string(s.clone()));
            let result = interp.call_value(&replacement, Value::Undefined, &call_args)?;
            interp.to_string_value(&result)?
        } else {
            let template = interp.to_string_value(&replacement)?;
            expand_replacement(&template, &matched, &captures, &s, start, end)
        };
        out.push_str(&replaced);
        cursor = end;
    }
    out.push_str(&s[cursor..]);
    Ok(Value::string(out))
}

/// §15.5.4.11 `$`-substitution in a replacement template.
fn expand_replacement(
    template: &str,
    matched: &str,
    captures: &[Option<String>],
    subject: &str,
    start: usize,
    end: usize,
) -> String {
    let bytes = template.as_bytes();
    let mut out = String::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && i + 1 < bytes.len() {
            match bytes[i + 1] {
                b'$' => {
                    out.push('$');
                    i += 2;
                }
                b'&' => {
                    out.push_str(matched);
                    i += 2;
                }
                b'`' => {
                    out.push_str(&subject[..start]);
                    i += 2;
                }
                b'\'' => {
                    out.push_str(&subject[end..]);
                    i += 2;
                }
                b'1'..=b'9' => {
                    // Prefer two-digit group numbers when they resolve.
                    let d1 = (bytes[i + 1] - b'0') as usize;
                    let two = if i + 2 < bytes.len() && bytes[i + 2].is_ascii_digit() {
                        Some(d1 * 10 + (bytes[i + 2] - b'0') as usize)
                    } else {
                        None
                    };
                    if let Some(n) = two.filter(|n| *n >= 1 && *n <= captures.len()) {
                        if let Some(Some(text)) = captures.get(n - 1) {
                            out.push_str(text);
                        }
                        i += 3;
                    } else if d1 >= 1 && d1 <= captures.len() {
                        if let Some(Some(text)) = captures.get(d1 - 1) {
                            out.push_str(text);
                        }
                        i += 2;
                    } else {
                        out.push('$');
                        i += 1;
                    }
                }
                _ => {
                    out.push('$');
                    i += 1;
                }
            }
        } else {
            out.push(template[i..].chars().next().expect("in bounds"));
            i += template[i..].chars().next().expect("in bounds").len_utf8();
        }
    }
    out
}

fn proto_match(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    let pattern = arg(args, 0);
    // A non-RegExp argument is promoted to one (§15.5.4.10).
    let regexp_value = if regexp::regexp_matcher(interp, &pattern).is_some() {
        pattern
    } else {
        let source = match &pattern {
            Value::Undefined => String::new(),
            other => interp.to_string_value(other)?,
        };
        Value::Object(regexp::make_regexp(interp, &regex::escape(&source), "")?)
    };

    let matcher = regexp::regexp_matcher(interp, &regexp_value).expect("constructed above");
    if regexp::is_global(interp, &regexp_value) {
        let matches: Vec<Value> = matcher
            .find_iter(&s)
            .map(|m| Value::string(m.as_str().to_string()))
            .collect();
        if matches.is_empty() {
            return Ok(Value::Null);
        }
        return Ok(Value::Object(interp.make_array(matches)));
    }
    regexp::exec_on_string(interp, &regexp_value, &s)
}

fn proto_to_lower_case(
    interp: &mut Interpreter,
    this: Value,
    _args: &[Value],
) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    Ok(Value::string(s.to_lowercase()))
}

fn proto_to_upper_case(
    interp: &mut Interpreter,
    this: Value,
    _args: &[Value],
) -> Result<Value, Value> {
    let s = this_string(interp, &this)?;
    Ok(Value::string(s.to_uppercase()))
}

fn proto_trim(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    use crate::parser::scanner::{is_es_whitespace, is_line_terminator};
    let s = this_string(interp, &this)?;
    let trimmed = s.trim_matches(|c: char| is_es_whitespace(c) || is_line_terminator(c));
    Ok(Value::string(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::runtime::Interpreter;

    fn eval(src: &str) -> Value {
        Interpreter::new().execute_string(src, None).unwrap()
    }

    fn eval_string(src: &str) -> String {
        match eval(src) {
            Value::String(s) => s,
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_char_access() {
        assert_eq!(eval_string("'abc'.charAt(1);"), "b");
        assert_eq!(eval_string("'abc'.charAt(9);"), "");
        assert_eq!(eval("'abc'.charCodeAt(0);").as_number(), Some(97.0));
        assert!(eval("'abc'.charCodeAt(9);").as_number().unwrap().is_nan());
        assert_eq!(eval_string("'abc'[1];"), "b");
        assert_eq!(eval("'abc'.length;").as_number(), Some(3.0));
    }

    #[test]
    fn test_search() {
        assert_eq!(eval("'hello'.indexOf('l');").as_number(), Some(2.0));
        assert_eq!(eval("'hello'.indexOf('l', 3);").as_number(), Some(3.0));
        assert_eq!(eval("'hello'.lastIndexOf('l');").as_number(), Some(3.0));
        assert_eq!(eval("'hello'.indexOf('z');").as_number(), Some(-1.0));
    }

    #[test]
    fn test_extraction() {
        assert_eq!(eval_string("'hello'.slice(1, 3);"), "el");
        assert_eq!(eval_string("'hello'.slice(-3);"), "llo");
        assert_eq!(eval_string("'hello'.substring(3, 1);"), "el");
        assert_eq!(eval_string("'hello'.substr(1, 3);"), "ell");
        assert_eq!(eval_string("'hello'.substr(-2);"), "lo");
    }

    #[test]
    fn test_split_and_case() {
        assert_eq!(eval_string("'a,b,c'.split(',').join('|');"), "a|b|c");
        assert_eq!(eval_string("'abc'.split('').join('-');"), "a-b-c");
        assert_eq!(eval("'a,b'.split(',', 1).length;").as_number(), Some(1.0));
        assert_eq!(eval_string("'AbC'.toLowerCase();"), "abc");
        assert_eq!(eval_string("'AbC'.toUpperCase();"), "ABC");
        assert_eq!(eval_string("'  x \\t '.trim();"), "x");
    }

    #[test]
    fn test_replace() {
        assert_eq!(eval_string("'aaa'.replace('a', 'b');"), "baa");
        assert_eq!(eval_string("'aaa'.replace(/a/g, 'b');"), "bbb");
        assert_eq!(eval_string("'abc'.replace(/(b)/, '[$1]');"), "a[b]c");
        assert_eq!(
            eval_string(
                "'abc'.replace(/b/, function (m) { return m.toUpperCase(); });"
            ),
            "aBc"
        );
    }

    #[test]
    fn test_match() {
        assert_eq!(eval("'a1b2'.match(/\\d/g).length;").as_number(), Some(2.0));
        assert!(eval("'abc'.match(/\\d/);").is_null());
        assert_eq!(eval_string("'a1b2'.match(/\\d/)[0];"), "1");
    }

    #[test]
    fn test_from_char_code() {
        assert_eq!(eval_string("String.fromCharCode(72, 105);"), "Hi");
    }

    #[test]
    fn test_wrapper_object() {
        assert_eq!(eval_string("new String('hi').toString();"), "hi");
        assert_eq!(eval("typeof new String('hi');").as_str(), Some("object"));
        assert_eq!(eval("typeof String('hi');").as_str(), Some("string"));
    }
}
