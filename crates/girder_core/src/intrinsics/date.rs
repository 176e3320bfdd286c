//! The `Date` stub (§15.9 subset).
//!
//! Carries `[[PrimitiveValue]]` in milliseconds since the epoch, `Date.now`,
//! and the accessors the evaluator's own machinery needs (`getTime`,
//! `valueOf`, `toString`). The only calendar arithmetic is the UTC
//! Gregorian conversion `toString` needs; component getters and local-time
//! handling are out of scope.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::intrinsics::{add_method, make_constructor};
use crate::objects::{JsObject, ObjectData};
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let proto = interp.intrinsics.date_prototype;
    add_method(interp, proto, "getTime", 0, proto_get_time);
    add_method(interp, proto, "valueOf", 0, proto_get_time);
    add_method(interp, proto, "toString", 0, proto_to_string);

    let ctor = make_constructor(interp, "Date", 7, ctor_call, ctor_construct, proto);
    add_method(interp, ctor, "now", 0, now);
}

fn now_millis() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

fn now(_interp: &mut Interpreter, _this: Value, _args: &[Value]) -> Result<Value, Value> {
    Ok(Value::Number(now_millis()))
}

/// §15.9.2: `Date(...)` called as a function ignores its arguments and
/// returns the current time as a string.
fn ctor_call(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let date = ctor_construct(interp, this, &[])?;
    let s = interp.to_string_value(&date)?;
    Ok(Value::string(s))
}

fn ctor_construct(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let millis = match args {
        [] => now_millis(),
        [value, ..] => {
            let prim = interp.to_number(value)?;
            // TimeClip (§15.9.1.14).
            if prim.is_finite() && prim.abs() <= 8.64e15 {
                prim.trunc()
            } else {
                f64::NAN
            }
        }
    };
    let proto = interp.intrinsics.date_prototype;
    Ok(Value::Object(interp.heap.allocate(JsObject::with_data(
        "Date",
        Some(proto),
        ObjectData::Date(millis),
    ))))
}

fn this_time(interp: &mut Interpreter, this: &Value) -> Result<f64, Value> {
    if let Some(h) = this.as_object() {
        if let ObjectData::Date(t) = &interp.heap.get(h).data {
            return Ok(*t);
        }
    }
    interp.throw_type_error("Date.prototype method called on a non-Date")
}

fn proto_get_time(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    Ok(Value::Number(this_time(interp, &this)?))
}

fn proto_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let t = this_time(interp, &this)?;
    if t.is_nan() {
        return Ok(Value::string("Invalid Date"));
    }
    Ok(Value::string(format_iso_utc(t)))
}

/// Render a millisecond timestamp as an ISO-8601 UTC string
/// (`1970-01-01T00:00:00.000Z`; expanded signed six-digit years outside
/// 0000–9999). The input is an integral, TimeClip-bounded double.
fn format_iso_utc(t: f64) -> String {
    let ms = t as i64;
    let days = ms.div_euclid(86_400_000);
    let mut rem = ms.rem_euclid(86_400_000);
    let millis = rem % 1000;
    rem /= 1000;
    let seconds = rem % 60;
    rem /= 60;
    let minutes = rem % 60;
    let hours = rem / 60;
    let (year, month, day) = civil_from_days(days);
    let year_text = if (0..=9999).contains(&year) {
        format!("{year:04}")
    } else {
        format!("{year:+07}")
    };
    format!("{year_text}-{month:02}-{day:02}T{hours:02}:{minutes:02}:{seconds:02}.{millis:03}Z")
}

/// Gregorian `(year, month, day)` for a day count relative to 1970-01-01,
/// via the era-based civil-calendar decomposition (exact over the whole
/// TimeClip range).
fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use crate::runtime::value::Value;
    use crate::runtime::Interpreter;

    fn eval(src: &str) -> Value {
        Interpreter::new().execute_string(src, None).unwrap()
    }

    #[test]
    fn test_explicit_millis() {
        assert_eq!(eval("new Date(12345).getTime();").as_number(), Some(12345.0));
        assert_eq!(eval("new Date(12.9).valueOf();").as_number(), Some(12.0));
        assert!(eval("new Date(9e15 * 10).getTime();").as_number().unwrap().is_nan());
    }

    #[test]
    fn test_now_is_monotonic_enough() {
        let v = eval("Date.now();").as_number().unwrap();
        assert!(v > 1.0e12, "epoch millis expected, got {v}");
    }

    #[test]
    fn test_to_string_is_iso_utc() {
        assert_eq!(
            eval("String(new Date(0));").as_str(),
            Some("1970-01-01T00:00:00.000Z")
        );
        assert_eq!(
            eval("new Date(86400000 + 3723004).toString();").as_str(),
            Some("1970-01-02T01:02:03.004Z")
        );
        // Pre-epoch times borrow from the previous day.
        assert_eq!(
            eval("String(new Date(-1));").as_str(),
            Some("1969-12-31T23:59:59.999Z")
        );
        assert_eq!(eval("String(new Date(NaN));").as_str(), Some("Invalid Date"));
    }

    #[test]
    fn test_date_hint_is_string() {
        // [[DefaultValue]] for Date prefers toString (§8.12.8).
        assert_eq!(
            eval("new Date(1) + '';").as_str(),
            Some("1970-01-01T00:00:00.001Z")
        );
    }
}
