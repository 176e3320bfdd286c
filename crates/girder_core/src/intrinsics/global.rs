//! Global value properties and function properties (§15.1).

use crate::intrinsics::{add_frozen_value, arg};
use crate::parser::scanner::{is_es_whitespace, is_line_terminator};
use crate::runtime::conversions::to_int32_f;
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let global = interp.global_object;
    add_frozen_value(interp, global, "NaN", Value::Number(f64::NAN));
    add_frozen_value(interp, global, "Infinity", Value::Number(f64::INFINITY));
    add_frozen_value(interp, global, "undefined", Value::Undefined);

    // The intrinsic eval is registered by identity so the evaluator can
    // recognize direct calls (§15.1.2.1.1).
    let eval_fn = interp.new_native_function("eval", 1, global_eval);
    interp.intrinsics.eval_function = eval_fn;
    interp
        .heap
        .get_mut(global)
        .set_builtin_property("eval", Value::Object(eval_fn));

    interp.define_native("parseInt", 2, parse_int);
    interp.define_native("parseFloat", 1, parse_float);
    interp.define_native("isNaN", 1, is_nan);
    interp.define_native("isFinite", 1, is_finite);
    interp.define_native("encodeURI", 1, encode_uri);
    interp.define_native("decodeURI", 1, decode_uri);
    interp.define_native("encodeURIComponent", 1, encode_uri_component);
    interp.define_native("decodeURIComponent", 1, decode_uri_component);
}

// ─────────────────────────────────────────────────────────────────────────────
// eval (§15.1.2.1) — the *indirect* path; direct calls are intercepted by
// the call evaluator and run in the caller's context.
// ─────────────────────────────────────────────────────────────────────────────

fn global_eval(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    match arg(args, 0) {
        Value::String(source) => interp.eval_code(&source, false),
        other => Ok(other),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Numeric parsing (§15.1.2.2, §15.1.2.3)
// ─────────────────────────────────────────────────────────────────────────────

fn trim_start(s: &str) -> &str {
    s.trim_start_matches(|c: char| is_es_whitespace(c) || is_line_terminator(c))
}

fn parse_int(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let input_value = arg(args, 0);
    let input = interp.to_string_value(&input_value)?;
    let radix_value = arg(args, 1);
    let mut radix = to_int32_f(interp.to_number(&radix_value)?);

    let mut s = trim_start(&input);
    let mut sign = 1.0;
    if let Some(rest) = s.strip_prefix('-') {
        sign = -1.0;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    let mut strip_prefix = true;
    if radix != 0 {
        if !(2..=36).contains(&radix) {
            return Ok(Value::Number(f64::NAN));
        }
        strip_prefix = radix == 16;
    } else {
        radix = 10;
    }
    if strip_prefix && (s.starts_with("0x") || s.starts_with("0X")) {
        s = &s[2..];
        radix = 16;
    }

    let mut value = 0f64;
    let mut digits = 0usize;
    for c in s.chars() {
        match c.to_digit(radix as u32) {
            Some(d) => {
                value = value * radix as f64 + d as f64;
                digits += 1;
            }
            None => break,
        }
    }
    if digits == 0 {
        return Ok(Value::Number(f64::NAN));
    }
    Ok(Value::Number(sign * value))
}

fn parse_float(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let input_value = arg(args, 0);
    let input = interp.to_string_value(&input_value)?;
    let s = trim_start(&input);

    // Longest prefix forming a StrDecimalLiteral (§15.1.2.3).
    let bytes = s.as_bytes();
    let mut i = 0usize;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    if s[i..].starts_with("Infinity") {
        let v = if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
        return Ok(Value::Number(v));
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - digits_start;
    let mut frac_digits = 0usize;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        frac_digits = i - start;
    }
    if int_digits == 0 && frac_digits == 0 {
        return Ok(Value::Number(f64::NAN));
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    Ok(Value::Number(s[..i].parse::<f64>().unwrap_or(f64::NAN)))
}

fn is_nan(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let n = interp.to_number(&arg(args, 0))?;
    Ok(Value::Boolean(n.is_nan()))
}

fn is_finite(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let n = interp.to_number(&arg(args, 0))?;
    Ok(Value::Boolean(n.is_finite()))
}

// ─────────────────────────────────────────────────────────────────────────────
// URI handling (§15.1.3)
// ─────────────────────────────────────────────────────────────────────────────

const URI_MARK: &str = "-_.!~*'()";
const URI_RESERVED: &str = ";/?:@&=+$,";

fn uri_unescaped(c: char, include_reserved: bool) -> bool {
    c.is_ascii_alphanumeric()
        || URI_MARK.contains(c)
        || (include_reserved && (URI_RESERVED.contains(c) || c == '#'))
}

fn encode(
    interp: &mut Interpreter,
    args: &[Value],
    include_reserved: bool,
) -> Result<Value, Value> {
    let input_value = arg(args, 0);
    let input = interp.to_string_value(&input_value)?;
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if uri_unescaped(c, include_reserved) {
            out.push(c);
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                out.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    Ok(Value::string(out))
}

fn decode(
    interp: &mut Interpreter,
    args: &[Value],
    preserve_reserved: bool,
) -> Result<Value, Value> {
    let input_value = arg(args, 0);
    let input = interp.to_string_value(&input_value)?;
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            // Multibyte UTF-8 in the input passes through untouched.
            let c = input[i..].chars().next().expect("in bounds");
            out.push(c);
            i += c.len_utf8();
            continue;
        }
        // Collect the full percent-encoded byte run.
        let mut decoded = Vec::new();
        while i < bytes.len() && bytes[i] == b'%' {
            if i + 2 >= bytes.len()
                || !bytes[i + 1].is_ascii_hexdigit()
                || !bytes[i + 2].is_ascii_hexdigit()
            {
                return throw_uri_error(interp);
            }
            let hi = (bytes[i + 1] as char).to_digit(16).expect("hex digit");
            let lo = (bytes[i + 2] as char).to_digit(16).expect("hex digit");
            decoded.push((hi * 16 + lo) as u8);
            i += 3;
        }
        match std::str::from_utf8(&decoded) {
            Ok(text) => {
                for c in text.chars() {
                    if preserve_reserved && c.is_ascii() && (URI_RESERVED.contains(c) || c == '#') {
                        // decodeURI leaves encoded reserved characters
                        // encoded (§15.1.3.1).
                        out.push_str(&format!("%{:02X}", c as u32));
                    } else {
                        out.push(c);
                    }
                }
            }
            Err(_) => return throw_uri_error(interp),
        }
    }
    Ok(Value::string(out))
}

fn throw_uri_error(interp: &mut Interpreter) -> Result<Value, Value> {
    Err(interp.make_error(crate::runtime::ErrorKind::Uri, "URI malformed"))
}

fn encode_uri(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    encode(interp, args, true)
}

fn encode_uri_component(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    encode(interp, args, false)
}

fn decode_uri(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    decode(interp, args, true)
}

fn decode_uri_component(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    decode(interp, args, false)
}

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::runtime::Interpreter;

    fn eval(src: &str) -> Value {
        Interpreter::new().execute_string(src, None).unwrap()
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(eval("parseInt('42');").as_number(), Some(42.0));
        assert_eq!(eval("parseInt('  -17px');").as_number(), Some(-17.0));
        assert_eq!(eval("parseInt('0x10');").as_number(), Some(16.0));
        assert_eq!(eval("parseInt('10', 2);").as_number(), Some(2.0));
        assert_eq!(eval("parseInt('ff', 16);").as_number(), Some(255.0));
        assert!(eval("parseInt('x');").as_number().unwrap().is_nan());
        assert!(eval("parseInt('1', 1);").as_number().unwrap().is_nan());
        // ES5 dropped octal auto-detection.
        assert_eq!(eval("parseInt('017');").as_number(), Some(17.0));
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(eval("parseFloat('1.5rem');").as_number(), Some(1.5));
        assert_eq!(eval("parseFloat('  -0.5  ');").as_number(), Some(-0.5));
        assert_eq!(eval("parseFloat('1e2x');").as_number(), Some(100.0));
        assert_eq!(eval("parseFloat('-Infinity');").as_number(), Some(f64::NEG_INFINITY));
        assert!(eval("parseFloat('.');").as_number().unwrap().is_nan());
    }

    #[test]
    fn test_is_nan_is_finite() {
        assert!(eval("isNaN(NaN);").to_boolean());
        assert!(eval("isNaN('abc');").to_boolean());
        assert!(!eval("isNaN('12');").to_boolean());
        assert!(eval("isFinite(1);").to_boolean());
        assert!(!eval("isFinite(Infinity);").to_boolean());
        assert!(!eval("isFinite(NaN);").to_boolean());
    }

    #[test]
    fn test_uri_coding() {
        assert_eq!(
            eval("encodeURIComponent('a b&c');").as_str(),
            Some("a%20b%26c")
        );
        assert_eq!(eval("encodeURI('a b&c');").as_str(), Some("a%20b&c"));
        assert_eq!(eval("decodeURIComponent('a%20b%26c');").as_str(), Some("a b&c"));
        assert_eq!(
            eval("encodeURIComponent('\u{00E9}');").as_str(),
            Some("%C3%A9")
        );
        assert_eq!(
            eval("decodeURIComponent('%C3%A9');").as_str(),
            Some("\u{00E9}")
        );
        assert_eq!(
            eval("try { decodeURIComponent('%zz'); } catch (e) { e.name; }").as_str(),
            Some("URIError")
        );
    }

    #[test]
    fn test_eval_function() {
        assert_eq!(eval("eval('1 + 2');").as_number(), Some(3.0));
        assert_eq!(eval("eval(42);").as_number(), Some(42.0));
        assert_eq!(
            eval("function f() { var x = 7; return eval('x'); } f();").as_number(),
            Some(7.0)
        );
        assert_eq!(
            eval("var g = eval; var x = 'global'; function f() { var x = 'local'; return g('x'); } f();")
                .as_str(),
            Some("global")
        );
    }

    #[test]
    fn test_global_constants() {
        assert!(eval("NaN !== NaN;").to_boolean());
        assert_eq!(eval("Infinity;").as_number(), Some(f64::INFINITY));
        assert!(eval("undefined;").is_undefined());
        // Frozen bindings: assignment is a silent no-op outside strict.
        assert!(eval("undefined = 5; undefined;").is_undefined());
    }
}
