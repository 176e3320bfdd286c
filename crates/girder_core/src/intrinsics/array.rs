//! The `Array` constructor and `Array.prototype` (§15.4).
//!
//! The iteration methods are generic per the spec: they read `length`,
//! probe element presence with `[[HasProperty]]`, and work on any
//! array-like `this`.

use crate::intrinsics::{add_method, arg, make_constructor};
use crate::objects::ObjectHandle;
use crate::runtime::conversions::to_integer_f;
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let proto = interp.intrinsics.array_prototype;
    add_method(interp, proto, "toString", 0, proto_to_string);
    add_method(interp, proto, "join", 1, proto_join);
    add_method(interp, proto, "push", 1, proto_push);
    add_method(interp, proto, "pop", 0, proto_pop);
    add_method(interp, proto, "shift", 0, proto_shift);
    add_method(interp, proto, "unshift", 1, proto_unshift);
    add_method(interp, proto, "slice", 2, proto_slice);
    add_method(interp, proto, "splice", 2, proto_splice);
    add_method(interp, proto, "concat", 1, proto_concat);
    add_method(interp, proto, "reverse", 0, proto_reverse);
    add_method(interp, proto, "indexOf", 1, proto_index_of);
    add_method(interp, proto, "lastIndexOf", 1, proto_last_index_of);
    add_method(interp, proto, "forEach", 1, proto_for_each);
    add_method(interp, proto, "map", 1, proto_map);
    add_method(interp, proto, "filter", 1, proto_filter);
    add_method(interp, proto, "reduce", 1, proto_reduce);
    add_method(interp, proto, "reduceRight", 1, proto_reduce_right);
    add_method(interp, proto, "every", 1, proto_every);
    add_method(interp, proto, "some", 1, proto_some);
    add_method(interp, proto, "sort", 1, proto_sort);

    let ctor = make_constructor(interp, "Array", 1, ctor_call, ctor_call, proto);
    add_method(interp, ctor, "isArray", 1, is_array);
}

// ─────────────────────────────────────────────────────────────────────────────
// Constructor (§15.4.1 / §15.4.2)
// ─────────────────────────────────────────────────────────────────────────────

/// `Array(...)` behaves identically called or constructed.
fn ctor_call(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    if args.len() == 1 {
        if let Value::Number(n) = &args[0] {
            let len = crate::runtime::conversions::to_uint32_f(*n);
            if len as f64 != *n {
                return interp.throw_range_error("invalid array length");
            }
            let array = interp.make_array(Vec::new());
            interp
                .heap
                .get_mut(array)
                .set_data_value("length", Value::Number(len as f64));
            return Ok(Value::Object(array));
        }
    }
    Ok(Value::Object(interp.make_array(args.to_vec())))
}

fn is_array(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let result = arg(args, 0)
        .as_object()
        .map(|h| interp.heap.get(h).class() == "Array")
        .unwrap_or(false);
    Ok(Value::Boolean(result))
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared access helpers
// ─────────────────────────────────────────────────────────────────────────────

fn this_and_length(interp: &mut Interpreter, this: &Value) -> Result<(ObjectHandle, f64), Value> {
    let obj = interp.to_object(this)?;
    let this_value = Value::Object(obj);
    let length = interp.get_property(obj, "length", &this_value)?;
    let n = interp.to_number(&length)?;
    Ok((obj, crate::runtime::conversions::to_uint32_f(n) as f64))
}

fn get_index(interp: &mut Interpreter, obj: ObjectHandle, index: f64) -> Result<Value, Value> {
    let this = Value::Object(obj);
    interp.get_property(obj, &index_key(index), &this)
}

fn has_index(interp: &mut Interpreter, obj: ObjectHandle, index: f64) -> bool {
    interp.has_property(obj, &index_key(index))
}

fn set_index(
    interp: &mut Interpreter,
    obj: ObjectHandle,
    index: f64,
    value: Value,
) -> Result<(), Value> {
    interp.put_property(obj, &index_key(index), value, true)
}

fn delete_index(interp: &mut Interpreter, obj: ObjectHandle, index: f64) -> Result<(), Value> {
    interp.delete_property(obj, &index_key(index), true)?;
    Ok(())
}

fn set_length(interp: &mut Interpreter, obj: ObjectHandle, length: f64) -> Result<(), Value> {
    interp.put_property(obj, "length", Value::Number(length), true)
}

fn index_key(index: f64) -> String {
    crate::runtime::conversions::number_to_string(index)
}

/// Clamp a relative index argument per §15.4.4.10.
fn relative_index(index: f64, length: f64) -> f64 {
    if index < 0.0 {
        (length + index).max(0.0)
    } else {
        index.min(length)
    }
}

fn callback_or_type_error(
    interp: &mut Interpreter,
    value: &Value,
    who: &str,
) -> Result<ObjectHandle, Value> {
    match value.as_object() {
        Some(h) if interp.heap.get(h).is_callable() => Ok(h),
        _ => interp.throw_type_error(&format!("{who} callback is not a function")),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion and joining (§15.4.4.2, §15.4.4.5)
// ─────────────────────────────────────────────────────────────────────────────

fn proto_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    proto_join(interp, this, &[])
}

fn proto_join(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let separator = match arg(args, 0) {
        Value::Undefined => ",".to_string(),
        other => interp.to_string_value(&other)?,
    };
    let mut out = String::new();
    let mut i = 0.0;
    while i < length {
        if i > 0.0 {
            out.push_str(&separator);
        }
        let element = get_index(interp, obj, i)?;
        if !element.is_nullish() {
            out.push_str(&interp.to_string_value(&element)?);
        }
        i += 1.0;
    }
    Ok(Value::string(out))
}

// ─────────────────────────────────────────────────────────────────────────────
// Stack / queue mutations (§15.4.4.6–§15.4.4.13)
// ─────────────────────────────────────────────────────────────────────────────

fn proto_push(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, mut length) = this_and_length(interp, &this)?;
    for value in args {
        set_index(interp, obj, length, value.clone())?;
        length += 1.0;
    }
    set_length(interp, obj, length)?;
    Ok(Value::Number(length))
}

fn proto_pop(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    if length == 0.0 {
        set_length(interp, obj, 0.0)?;
        return Ok(Value::Undefined);
    }
    let last = length - 1.0;
    let element = get_index(interp, obj, last)?;
    delete_index(interp, obj, last)?;
    set_length(interp, obj, last)?;
    Ok(element)
}

fn proto_shift(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    if length == 0.0 {
        set_length(interp, obj, 0.0)?;
        return Ok(Value::Undefined);
    }
    let first = get_index(interp, obj, 0.0)?;
    let mut i = 1.0;
    while i < length {
        if has_index(interp, obj, i) {
            let value = get_index(interp, obj, i)?;
            set_index(interp, obj, i - 1.0, value)?;
        } else {
            delete_index(interp, obj, i - 1.0)?;
        }
        i += 1.0;
    }
    delete_index(interp, obj, length - 1.0)?;
    set_length(interp, obj, length - 1.0)?;
    Ok(first)
}

fn proto_unshift(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let count = args.len() as f64;
    let mut i = length;
    while i > 0.0 {
        let from = i - 1.0;
        if has_index(interp, obj, from) {
            let value = get_index(interp, obj, from)?;
            set_index(interp, obj, from + count, value)?;
        } else {
            delete_index(interp, obj, from + count)?;
        }
        i -= 1.0;
    }
    for (j, value) in args.iter().enumerate() {
        set_index(interp, obj, j as f64, value.clone())?;
    }
    set_length(interp, obj, length + count)?;
    Ok(Value::Number(length + count))
}

fn proto_slice(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let start_arg = interp.to_integer(&arg(args, 0))?;
    let start = relative_index(start_arg, length);
    let end = match arg(args, 1) {
        Value::Undefined => length,
        other => {
            let e = interp.to_integer(&other)?;
            relative_index(e, length)
        }
    };
    let result = interp.make_array(Vec::new());
    let mut from = start;
    let mut to = 0.0;
    while from < end {
        if has_index(interp, obj, from) {
            let value = get_index(interp, obj, from)?;
            set_index(interp, result, to, value)?;
        }
        from += 1.0;
        to += 1.0;
    }
    set_length(interp, result, (end - start).max(0.0))?;
    Ok(Value::Object(result))
}

fn proto_splice(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let start_arg = interp.to_integer(&arg(args, 0))?;
    let start = relative_index(start_arg, length);
    let delete_count = if args.len() < 2 {
        length - start
    } else {
        let d = interp.to_integer(&arg(args, 1))?;
        d.max(0.0).min(length - start)
    };
    let items: Vec<Value> = if args.len() > 2 { args[2..].to_vec() } else { Vec::new() };
    let item_count = items.len() as f64;

    // Removed elements become the result array.
    let removed = interp.make_array(Vec::new());
    let mut k = 0.0;
    while k < delete_count {
        let from = start + k;
        if has_index(interp, obj, from) {
            let value = get_index(interp, obj, from)?;
            set_index(interp, removed, k, value)?;
        }
        k += 1.0;
    }
    set_length(interp, removed, delete_count)?;

    // Shift the tail into place.
    if item_count < delete_count {
        let mut k = start;
        while k < length - delete_count {
            let from = k + delete_count;
            let to = k + item_count;
            if has_index(interp, obj, from) {
                let value = get_index(interp, obj, from)?;
                set_index(interp, obj, to, value)?;
            } else {
                delete_index(interp, obj, to)?;
            }
            k += 1.0;
        }
        let mut k = length;
        while k > length - delete_count + item_count {
            delete_index(interp, obj, k - 1.0)?;
            k -= 1.0;
        }
    } else if item_count > delete_count {
        let mut k = length - delete_count;
        while k > start {
            let from = k + delete_count - 1.0;
            let to = k + item_count - 1.0;
            if has_index(interp, obj, from) {
                let value = get_index(interp, obj, from)?;
                set_index(interp, obj, to, value)?;
            } else {
                delete_index(interp, obj, to)?;
            }
            k -= 1.0;
        }
    }
    for (j, item) in items.into_iter().enumerate() {
        set_index(interp, obj, start + j as f64, item)?;
    }
    set_length(interp, obj, length - delete_count + item_count)?;
    Ok(Value::Object(removed))
}

fn proto_concat(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let obj = interp.to_object(&this)?;
    let result = interp.make_array(Vec::new());
    let mut n = 0.0;

    let append = |interp: &mut Interpreter, item: &Value, n: &mut f64| -> Result<(), Value> {
        let is_array = item
            .as_object()
            .map(|h| interp.heap.get(h).class() == "Array")
            .unwrap_or(false);
        if is_array {
            let h = item.as_object().expect("checked above");
            let this_item = Value::Object(h);
            let length = interp.get_property(h, "length", &this_item)?;
            let len = interp.to_number(&length)?;
            let mut k = 0.0;
            while k < len {
                if has_index(interp, h, k) {
                    let value = get_index(interp, h, k)?;
                    set_index(interp, result, *n, value)?;
                }
                *n += 1.0;
                k += 1.0;
            }
        } else {
            set_index(interp, result, *n, item.clone())?;
            *n += 1.0;
        }
        Ok(())
    };

    append(interp, &Value::Object(obj), &mut n)?;
    for item in args {
        append(interp, item, &mut n)?;
    }
    set_length(interp, result, n)?;
    Ok(Value::Object(result))
}

fn proto_reverse(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let middle = (length / 2.0).floor();
    let mut lower = 0.0;
    while lower != middle {
        let upper = length - lower - 1.0;
        let lower_present = has_index(interp, obj, lower);
        let upper_present = has_index(interp, obj, upper);
        let lower_value = get_index(interp, obj, lower)?;
        let upper_value = get_index(interp, obj, upper)?;
        match (lower_present, upper_present) {
            (true, true) => {
                set_index(interp, obj, lower, upper_value)?;
                set_index(interp, obj, upper, lower_value)?;
            }
            (false, true) => {
                set_index(interp, obj, lower, upper_value)?;
                delete_index(interp, obj, upper)?;
            }
            (true, false) => {
                set_index(interp, obj, upper, lower_value)?;
                delete_index(interp, obj, lower)?;
            }
            (false, false) => {}
        }
        lower += 1.0;
    }
    Ok(Value::Object(obj))
}

// ─────────────────────────────────────────────────────────────────────────────
// Search (§15.4.4.14, §15.4.4.15)
// ─────────────────────────────────────────────────────────────────────────────

fn proto_index_of(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    if length == 0.0 {
        return Ok(Value::Number(-1.0));
    }
    let target = arg(args, 0);
    let start = if args.len() > 1 {
        to_integer_f(interp.to_number(&arg(args, 1))?)
    } else {
        0.0
    };
    let mut k = if start >= 0.0 {
        start
    } else {
        (length + start).max(0.0)
    };
    while k < length {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            if Value::strict_equals(&element, &target) {
                return Ok(Value::Number(k));
            }
        }
        k += 1.0;
    }
    Ok(Value::Number(-1.0))
}

fn proto_last_index_of(
    interp: &mut Interpreter,
    this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    if length == 0.0 {
        return Ok(Value::Number(-1.0));
    }
    let target = arg(args, 0);
    let start = if args.len() > 1 {
        to_integer_f(interp.to_number(&arg(args, 1))?)
    } else {
        length - 1.0
    };
    let mut k = if start >= 0.0 {
        start.min(length - 1.0)
    } else {
        length + start
    };
    while k >= 0.0 {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            if Value::strict_equals(&element, &target) {
                return Ok(Value::Number(k));
            }
        }
        k -= 1.0;
    }
    Ok(Value::Number(-1.0))
}

// ─────────────────────────────────────────────────────────────────────────────
// Iteration methods (§15.4.4.16–§15.4.4.22)
// ─────────────────────────────────────────────────────────────────────────────

fn proto_for_each(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let callback = callback_or_type_error(interp, &arg(args, 0), "forEach")?;
    let this_arg = arg(args, 1);
    let mut k = 0.0;
    while k < length {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            interp.call_function(
                callback,
                this_arg.clone(),
                &[element, Value::Number(k), Value::Object(obj)],
            )?;
        }
        k += 1.0;
    }
    Ok(Value::Undefined)
}

fn proto_map(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let callback = callback_or_type_error(interp, &arg(args, 0), "map")?;
    let this_arg = arg(args, 1);
    let result = interp.make_array(Vec::new());
    set_length(interp, result, length)?;
    let mut k = 0.0;
    while k < length {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            let mapped = interp.call_function(
                callback,
                this_arg.clone(),
                &[element, Value::Number(k), Value::Object(obj)],
            )?;
            set_index(interp, result, k, mapped)?;
        }
        k += 1.0;
    }
    Ok(Value::Object(result))
}

fn proto_filter(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let callback = callback_or_type_error(interp, &arg(args, 0), "filter")?;
    let this_arg = arg(args, 1);
    let result = interp.make_array(Vec::new());
    let mut to = 0.0;
    let mut k = 0.0;
    while k < length {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            let selected = interp.call_function(
                callback,
                this_arg.clone(),
                &[element.clone(), Value::Number(k), Value::Object(obj)],
            )?;
            if selected.to_boolean() {
                set_index(interp, result, to, element)?;
                to += 1.0;
            }
        }
        k += 1.0;
    }
    set_length(interp, result, to)?;
    Ok(Value::Object(result))
}

fn proto_every(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let callback = callback_or_type_error(interp, &arg(args, 0), "every")?;
    let this_arg = arg(args, 1);
    let mut k = 0.0;
    while k < length {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            let outcome = interp.call_function(
                callback,
                this_arg.clone(),
                &[element, Value::Number(k), Value::Object(obj)],
            )?;
            if !outcome.to_boolean() {
                return Ok(Value::Boolean(false));
            }
        }
        k += 1.0;
    }
    Ok(Value::Boolean(true))
}

fn proto_some(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let callback = callback_or_type_error(interp, &arg(args, 0), "some")?;
    let this_arg = arg(args, 1);
    let mut k = 0.0;
    while k < length {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            let outcome = interp.call_function(
                callback,
                this_arg.clone(),
                &[element, Value::Number(k), Value::Object(obj)],
            )?;
            if outcome.to_boolean() {
                return Ok(Value::Boolean(true));
            }
        }
        k += 1.0;
    }
    Ok(Value::Boolean(false))
}

fn proto_reduce(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let callback = callback_or_type_error(interp, &arg(args, 0), "reduce")?;
    let mut k = 0.0;
    let mut accumulator = if args.len() > 1 {
        arg(args, 1)
    } else {
        // Seek the first present element.
        loop {
            if k >= length {
                return interp.throw_type_error("reduce of empty array with no initial value");
            }
            if has_index(interp, obj, k) {
                let first = get_index(interp, obj, k)?;
                k += 1.0;
                break first;
            }
            k += 1.0;
        }
    };
    while k < length {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            accumulator = interp.call_function(
                callback,
                Value::Undefined,
                &[accumulator, element, Value::Number(k), Value::Object(obj)],
            )?;
        }
        k += 1.0;
    }
    Ok(accumulator)
}

fn proto_reduce_right(
    interp: &mut Interpreter,
    this: Value,
    args: &[Value],
) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let callback = callback_or_type_error(interp, &arg(args, 0), "reduceRight")?;
    let mut k = length - 1.0;
    let mut accumulator = if args.len() > 1 {
        arg(args, 1)
    } else {
        loop {
            if k < 0.0 {
                return interp
                    .throw_type_error("reduceRight of empty array with no initial value");
            }
            if has_index(interp, obj, k) {
                let first = get_index(interp, obj, k)?;
                k -= 1.0;
                break first;
            }
            k -= 1.0;
        }
    };
    while k >= 0.0 {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            accumulator = interp.call_function(
                callback,
                Value::Undefined,
                &[accumulator, element, Value::Number(k), Value::Object(obj)],
            )?;
        }
        k -= 1.0;
    }
    Ok(accumulator)
}

// ─────────────────────────────────────────────────────────────────────────────
// sort (§15.4.4.11)
// ─────────────────────────────────────────────────────────────────────────────

fn proto_sort(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, Value> {
    let (obj, length) = this_and_length(interp, &this)?;
    let comparator = match arg(args, 0) {
        Value::Undefined => None,
        other => Some(callback_or_type_error(interp, &other, "sort")?),
    };

    // Collect present elements; holes sink past undefineds at the end.
    let mut present = Vec::new();
    let mut undefined_count = 0usize;
    let mut hole_count = 0usize;
    let mut k = 0.0;
    while k < length {
        if has_index(interp, obj, k) {
            let element = get_index(interp, obj, k)?;
            if element.is_undefined() {
                undefined_count += 1;
            } else {
                present.push(element);
            }
        } else {
            hole_count += 1;
        }
        k += 1.0;
    }

    // Insertion sort: the comparator is user code and can throw, so the
    // std slice sorts (infallible comparators) do not fit.
    for i in 1..present.len() {
        let mut j = i;
        while j > 0 {
            let ordered = sort_compare(interp, &present[j - 1], &present[j], comparator)?;
            if ordered <= 0.0 {
                break;
            }
            present.swap(j - 1, j);
            j -= 1;
        }
    }

    let mut k = 0.0;
    for value in present {
        set_index(interp, obj, k, value)?;
        k += 1.0;
    }
    for _ in 0..undefined_count {
        set_index(interp, obj, k, Value::Undefined)?;
        k += 1.0;
    }
    for _ in 0..hole_count {
        delete_index(interp, obj, k)?;
        k += 1.0;
    }
    Ok(Value::Object(obj))
}

/// §15.4.4.11 SortCompare for two non-undefined, present elements.
fn sort_compare(
    interp: &mut Interpreter,
    x: &Value,
    y: &Value,
    comparator: Option<ObjectHandle>,
) -> Result<f64, Value> {
    match comparator {
        Some(f) => {
            let result = interp.call_function(f, Value::Undefined, &[x.clone(), y.clone()])?;
            let n = interp.to_number(&result)?;
            Ok(if n.is_nan() { 0.0 } else { n })
        }
        None => {
            let xs = interp.to_string_value(x)?;
            let ys = interp.to_string_value(y)?;
            Ok(match xs.cmp(&ys) {
                std::cmp::Ordering::Less => -1.0,
                std::cmp::Ordering::Equal => 0.0,
                std::cmp::Ordering::Greater => 1.0,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

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
    fn test_push_pop_shift_unshift() {
        assert_eq!(
            eval("var a = [1, 2]; a.push(3, 4); a.join('-');").as_str(),
            Some("1-2-3-4")
        );
        assert_eq!(eval("var a = [1, 2, 3]; a.pop();").as_number(), Some(3.0));
        assert_eq!(eval("var a = [1, 2]; a.pop(); a.length;").as_number(), Some(1.0));
        assert_eq!(eval("var a = [1, 2, 3]; a.shift();").as_number(), Some(1.0));
        assert_eq!(eval_string("var a = [3]; a.unshift(1, 2); a.join();"), "1,2,3");
    }

    #[test]
    fn test_slice_splice_concat() {
        assert_eq!(eval_string("[1, 2, 3, 4].slice(1, 3).join();"), "2,3");
        assert_eq!(eval_string("[1, 2, 3, 4].slice(-2).join();"), "3,4");
        assert_eq!(
            eval_string("var a = [1, 2, 3, 4]; a.splice(1, 2, 'x'); a.join();"),
            "1,x,4"
        );
        assert_eq!(
            eval_string("var a = [1, 2, 3, 4]; a.splice(1, 2).join();"),
            "2,3"
        );
        assert_eq!(eval_string("[1].concat([2, 3], 4).join();"), "1,2,3,4");
    }

    #[test]
    fn test_index_of_and_last_index_of() {
        assert_eq!(eval("[1, 2, 3, 2].indexOf(2);").as_number(), Some(1.0));
        assert_eq!(eval("[1, 2, 3, 2].lastIndexOf(2);").as_number(), Some(3.0));
        assert_eq!(eval("[1, 2].indexOf(9);").as_number(), Some(-1.0));
        // strict equality: no coercion.
        assert_eq!(eval("[1, 2].indexOf('1');").as_number(), Some(-1.0));
    }

    #[test]
    fn test_iteration_methods() {
        assert_eq!(
            eval_string("[1, 2, 3].map(function (x) { return x * 2; }).join();"),
            "2,4,6"
        );
        assert_eq!(
            eval_string("[1, 2, 3, 4].filter(function (x) { return x % 2 === 0; }).join();"),
            "2,4"
        );
        assert_eq!(
            eval("[1, 2, 3].reduce(function (a, b) { return a + b; });").as_number(),
            Some(6.0)
        );
        assert_eq!(
            eval("[1, 2, 3].reduce(function (a, b) { return a + b; }, 10);").as_number(),
            Some(16.0)
        );
        assert_eq!(
            eval_string("['a', 'b'].reduceRight(function (a, b) { return a + b; });"),
            "ba"
        );
        assert_eq!(
            eval("[2, 4].every(function (x) { return x % 2 === 0; });").to_boolean(),
            true
        );
        assert_eq!(
            eval("[1, 2].some(function (x) { return x > 1; });").to_boolean(),
            true
        );
    }

    #[test]
    fn test_sort() {
        assert_eq!(eval_string("[3, 1, 2].sort().join();"), "1,2,3");
        // Default sort is lexicographic.
        assert_eq!(eval_string("[10, 9, 1].sort().join();"), "1,10,9");
        assert_eq!(
            eval_string("[10, 9, 1].sort(function (a, b) { return a - b; }).join();"),
            "1,9,10"
        );
        assert_eq!(eval_string("[undefined, 2, 1].sort().join();"), "1,2,");
    }

    #[test]
    fn test_length_invariant() {
        assert_eq!(eval("var a = []; a[2] = 1; a.length;").as_number(), Some(3.0));
        assert!(eval("var a = [1, 2, 3]; a.length = 1; a[2];").is_undefined());
        assert_eq!(eval("var a = [1, 2, 3]; a.length = 1; a.length;").as_number(), Some(1.0));
    }

    #[test]
    fn test_holes() {
        assert_eq!(eval_string("[1, , 3].join();"), "1,,3");
        assert_eq!(eval("[1, , 3].length;").as_number(), Some(3.0));
        assert_eq!(
            eval("var n = 0; [1, , 3].forEach(function () { n++; }); n;").as_number(),
            Some(2.0)
        );
    }
}
