//! AST → JSON tree.
//!
//! This is the navigation surface for hosts that want to walk a parse
//! without linking against the node types: every node becomes a JSON object
//! carrying a `kind` tag, its ordered child fields, scalar attributes, and
//! `loc`. Terminals appear as plain strings, numbers, booleans, null, or
//! arrays thereof.

use serde_json::Value;

use crate::parser::ast::{Expr, Program, Stmt};

/// Serialize a whole program.
pub fn program_to_json(program: &Program) -> Value {
    serde_json::to_value(program).expect("AST serialization is infallible")
}

/// Serialize a single statement.
pub fn stmt_to_json(stmt: &Stmt) -> Value {
    serde_json::to_value(stmt).expect("AST serialization is infallible")
}

/// Serialize a single expression.
pub fn expr_to_json(expr: &Expr) -> Value {
    serde_json::to_value(expr).expect("AST serialization is infallible")
}

/// Remove every `loc` attribute in place, leaving pure structure. Useful for
/// structural comparisons (the printer round-trip test relies on this).
pub fn strip_locations(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("loc");
            for v in map.values_mut() {
                strip_locations(v);
            }
        }
        Value::Array(items) => {
            for v in items {
                strip_locations(v);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_string;

    #[test]
    fn test_nodes_carry_kind_tags() {
        let program = parse_string("var x = 1 + 2;", None).unwrap();
        let json = program_to_json(&program);
        let stmt = &json["body"][0];
        assert_eq!(stmt["kind"], "Var");
        let init = &stmt["declarations"][0]["init"];
        assert_eq!(init["kind"], "Binary");
        assert_eq!(init["op"], "Add");
    }

    #[test]
    fn test_loc_present_and_strippable() {
        let program = parse_string("f(1);", None).unwrap();
        let mut json = program_to_json(&program);
        assert!(json["body"][0]["loc"]["start"]["line"].is_number());
        strip_locations(&mut json);
        assert!(json["body"][0].get("loc").is_none());
    }

    #[test]
    fn test_terminals_are_plain_values() {
        let program = parse_string("var s = \"hi\", n = 2.5, b = true, z = null;", None).unwrap();
        let json = program_to_json(&program);
        let decls = &json["body"][0]["declarations"];
        assert_eq!(decls[0]["init"]["value"]["String"], "hi");
        assert_eq!(decls[1]["init"]["value"]["Number"], 2.5);
        assert_eq!(decls[2]["init"]["value"]["Bool"], true);
        assert_eq!(decls[3]["init"]["value"], "Null");
    }
}
