//! The host `console` hook.
//!
//! The engine performs no I/O itself: `console.log` stringifies its
//! arguments (ToString semantics) and hands the joined line to the sink the
//! embedder installed, which defaults to stdout.

use crate::objects::JsObject;
use crate::runtime::value::Value;
use crate::runtime::Interpreter;

pub(crate) fn install(interp: &mut Interpreter) {
    let object_proto = interp.intrinsics.object_prototype;
    let console = interp
        .heap
        .allocate(JsObject::ordinary("Object", Some(object_proto)));
    let log = interp.new_native_function("log", 0, console_log);
    interp
        .heap
        .get_mut(console)
        .set_builtin_property("log", Value::Object(log));
    // `error` shares the sink; the split is a host concern.
    interp
        .heap
        .get_mut(console)
        .set_builtin_property("error", Value::Object(log));
    let global = interp.global_object;
    interp
        .heap
        .get_mut(global)
        .set_builtin_property("console", Value::Object(console));
}

fn console_log(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, Value> {
    let mut pieces = Vec::with_capacity(args.len());
    for a in args {
        pieces.push(interp.to_string_value(a)?);
    }
    let line = pieces.join(" ");
    (interp.console_sink)(&line);
    Ok(Value::Undefined)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::runtime::Interpreter;

    #[test]
    fn test_log_goes_through_sink() {
        let captured = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&captured);
        let mut interp = Interpreter::new();
        interp.set_console_sink(Box::new(move |line| {
            sink.borrow_mut().push(line.to_string());
        }));
        interp
            .execute_string("console.log('a', 1, true); console.log([1, 2]);", None)
            .unwrap();
        assert_eq!(
            *captured.borrow(),
            vec!["a 1 true".to_string(), "1,2".to_string()]
        );
    }
}
