#![no_main]

use libfuzzer_sys::fuzz_target;
use girder_core::parser::{dump, parse_string, printer};

// Parse arbitrary source; when it parses, exercise the printer round-trip
// invariant: printing the AST and reparsing the output must succeed and
// produce a structurally equal tree.
fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(first) = parse_string(source, None) else {
        return;
    };
    let printed = printer::print_program(&first);
    let second = parse_string(&printed, None)
        .unwrap_or_else(|e| panic!("printed source failed to reparse: {e}\n{printed}"));
    let mut a = dump::program_to_json(&first);
    let mut b = dump::program_to_json(&second);
    dump::strip_locations(&mut a);
    dump::strip_locations(&mut b);
    assert_eq!(a, b, "round trip changed structure:\n{printed}");
});
