//! AST → canonical source text.
//!
//! The printer emits valid ES5.1 source whose reparse is structurally equal
//! to the input tree (locations aside). Statements always get explicit
//! semicolons; expressions are parenthesized by operator precedence, so no
//! printing decision can rebind an operand.

use crate::parser::ast::*;
use crate::runtime::conversions::number_to_string;

/// Print a whole program.
pub fn print_program(program: &Program) -> String {
    let mut p = Printer::new();
    for stmt in &program.body {
        p.stmt(stmt);
    }
    p.out
}

/// Print a single statement (used by tests and the REPL echo).
pub fn print_stmt(stmt: &Stmt) -> String {
    let mut p = Printer::new();
    p.stmt(stmt);
    p.out
}

// Precedence of an expression node when printed, mirroring the grammar
// levels. Higher binds tighter.
fn prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Sequence(_) => 0,
        Expr::Assign(_) => 1,
        Expr::Conditional(_) => 2,
        Expr::Logical(e) => match e.op {
            LogicalOp::Or => 3,
            LogicalOp::And => 4,
        },
        Expr::Binary(e) => binary_prec(e.op),
        Expr::Unary(_) => 13,
        Expr::Update(e) => {
            if e.prefix {
                13
            } else {
                14
            }
        }
        Expr::Call(_) => 15,
        Expr::Member(_) | Expr::New(_) => 16,
        _ => 18,
    }
}

fn binary_prec(op: BinaryOp) -> u8 {
    use BinaryOp::*;
    match op {
        BitOr => 5,
        BitXor => 6,
        BitAnd => 7,
        Eq | Ne | StrictEq | StrictNe => 8,
        Lt | Gt | Le | Ge | In | Instanceof => 9,
        Shl | Shr | UShr => 10,
        Add | Sub => 11,
        Mul | Div | Mod => 12,
    }
}

fn binary_op_text(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Mul => "*",
        Div => "/",
        Mod => "%",
        Add => "+",
        Sub => "-",
        Shl => "<<",
        Shr => ">>",
        UShr => ">>>",
        Lt => "<",
        Gt => ">",
        Le => "<=",
        Ge => ">=",
        In => "in",
        Instanceof => "instanceof",
        Eq => "==",
        Ne => "!=",
        StrictEq => "===",
        StrictNe => "!==",
        BitAnd => "&",
        BitXor => "^",
        BitOr => "|",
    }
}

fn assign_op_text(op: AssignOp) -> &'static str {
    use AssignOp::*;
    match op {
        Assign => "=",
        Mul => "*=",
        Div => "/=",
        Mod => "%=",
        Add => "+=",
        Sub => "-=",
        Shl => "<<=",
        Shr => ">>=",
        UShr => ">>>=",
        BitAnd => "&=",
        BitXor => "^=",
        BitOr => "|=",
    }
}

/// Quote and escape a string literal. The output decodes back to the exact
/// input, and the plain-ASCII common case stays verbatim (so directive
/// prologues survive printing).
fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000B}' => out.push_str("\\v"),
            '\u{000C}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            // NUL prints as \x00: `\0` would be ambiguous before a digit.
            c if (c as u32) < 0x20 || c == '\0' => {
                out.push_str(&format!("\\x{:02X}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Does this expression's leftmost token open with `{` or `function`?
/// Such expressions need parentheses at statement position.
fn starts_ambiguously(expr: &Expr) -> bool {
    match expr {
        Expr::Object(_) | Expr::Function(_) => true,
        Expr::Member(e) => starts_ambiguously(&e.object),
        Expr::Call(e) => starts_ambiguously(&e.callee),
        Expr::Binary(e) => starts_ambiguously(&e.left),
        Expr::Logical(e) => starts_ambiguously(&e.left),
        Expr::Assign(e) => starts_ambiguously(&e.target),
        Expr::Conditional(e) => starts_ambiguously(&e.test),
        Expr::Sequence(e) => e.exprs.first().is_some_and(starts_ambiguously),
        Expr::Update(e) if !e.prefix => starts_ambiguously(&e.argument),
        _ => false,
    }
}

struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Printer {
            out: String::new(),
            indent: 0,
        }
    }

    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    // ── Statements ──────────────────────────────────────────────────────────

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(b) => self.block(b),
            Stmt::Var(v) => {
                self.var_stmt(v);
                self.push(";");
            }
            Stmt::Empty(_) => self.push(";"),
            Stmt::Expr(e) => {
                if starts_ambiguously(&e.expr) {
                    self.push("(");
                    self.expr(&e.expr, 0);
                    self.push(")");
                } else {
                    self.expr(&e.expr, 0);
                }
                self.push(";");
            }
            Stmt::If(s) => {
                self.push("if (");
                self.expr(&s.test, 0);
                self.push(") ");
                self.stmt(&s.consequent);
                if let Some(alt) = &s.alternate {
                    self.push(" else ");
                    self.stmt(alt);
                }
            }
            Stmt::DoWhile(s) => {
                self.push("do ");
                self.stmt(&s.body);
                self.push(" while (");
                self.expr(&s.test, 0);
                self.push(");");
            }
            Stmt::While(s) => {
                self.push("while (");
                self.expr(&s.test, 0);
                self.push(") ");
                self.stmt(&s.body);
            }
            Stmt::For(s) => {
                self.push("for (");
                match &s.init {
                    Some(ForInit::Var(v)) => self.var_stmt(v),
                    Some(ForInit::Expr(e)) => self.expr(e, 0),
                    None => {}
                }
                self.push("; ");
                if let Some(test) = &s.test {
                    self.expr(test, 0);
                }
                self.push("; ");
                if let Some(update) = &s.update {
                    self.expr(update, 0);
                }
                self.push(") ");
                self.stmt(&s.body);
            }
            Stmt::ForIn(s) => {
                self.push("for (");
                match &s.left {
                    ForInLeft::Var(d) => {
                        self.push("var ");
                        self.var_decl(d);
                    }
                    ForInLeft::Expr(e) => self.expr(e, 15),
                }
                self.push(" in ");
                self.expr(&s.right, 0);
                self.push(") ");
                self.stmt(&s.body);
            }
            Stmt::Continue(s) => {
                self.push("continue");
                if let Some(label) = &s.label {
                    self.push(" ");
                    self.push(label);
                }
                self.push(";");
            }
            Stmt::Break(s) => {
                self.push("break");
                if let Some(label) = &s.label {
                    self.push(" ");
                    self.push(label);
                }
                self.push(";");
            }
            Stmt::Return(s) => {
                self.push("return");
                if let Some(arg) = &s.argument {
                    self.push(" ");
                    self.expr(arg, 0);
                }
                self.push(";");
            }
            Stmt::With(s) => {
                self.push("with (");
                self.expr(&s.object, 0);
                self.push(") ");
                self.stmt(&s.body);
            }
            Stmt::Switch(s) => {
                self.push("switch (");
                self.expr(&s.discriminant, 0);
                self.push(") {");
                self.indent += 1;
                for case in &s.cases {
                    self.newline();
                    match &case.test {
                        Some(test) => {
                            self.push("case ");
                            self.expr(test, 0);
                            self.push(":");
                        }
                        None => self.push("default:"),
                    }
                    self.indent += 1;
                    for stmt in &case.consequent {
                        self.newline();
                        self.stmt(stmt);
                    }
                    self.indent -= 1;
                }
                self.indent -= 1;
                self.newline();
                self.push("}");
            }
            Stmt::Labeled(s) => {
                self.push(&s.label);
                self.push(": ");
                self.stmt(&s.body);
            }
            Stmt::Throw(s) => {
                self.push("throw ");
                self.expr(&s.argument, 0);
                self.push(";");
            }
            Stmt::Try(s) => {
                self.push("try ");
                self.block(&s.block);
                if let Some(h) = &s.handler {
                    self.push(" catch (");
                    self.push(&h.param);
                    self.push(") ");
                    self.block(&h.body);
                }
                if let Some(f) = &s.finalizer {
                    self.push(" finally ");
                    self.block(f);
                }
            }
            Stmt::Debugger(_) => self.push("debugger;"),
            Stmt::FnDecl(f) => self.function(f),
        }
    }

    fn block(&mut self, block: &BlockStmt) {
        if block.body.is_empty() {
            self.push("{}");
            return;
        }
        self.push("{");
        self.indent += 1;
        for stmt in &block.body {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn var_stmt(&mut self, v: &VarStmt) {
        self.push("var ");
        for (i, d) in v.declarations.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.var_decl(d);
        }
    }

    fn var_decl(&mut self, d: &VarDecl) {
        self.push(&d.name);
        if let Some(init) = &d.init {
            self.push(" = ");
            self.expr(init, 1);
        }
    }

    fn function(&mut self, f: &FnLiteral) {
        self.push("function ");
        if let Some(name) = &f.name {
            self.push(name);
        }
        self.push("(");
        for (i, p) in f.params.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(p);
        }
        self.push(") {");
        self.indent += 1;
        for stmt in &f.body {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    // ── Expressions ─────────────────────────────────────────────────────────

    /// Print `expr`; parenthesize when its own precedence falls below
    /// `min_prec`.
    fn expr(&mut self, expr: &Expr, min_prec: u8) {
        if prec(expr) < min_prec {
            self.push("(");
            self.expr_inner(expr);
            self.push(")");
        } else {
            self.expr_inner(expr);
        }
    }

    fn expr_inner(&mut self, expr: &Expr) {
        match expr {
            Expr::This(_) => self.push("this"),
            Expr::Ident(id) => self.push(&id.name),
            Expr::Literal(lit) => self.literal(lit),
            Expr::Array(a) => {
                self.push("[");
                let len = a.elements.len();
                for (i, el) in a.elements.iter().enumerate() {
                    match el {
                        Some(e) => {
                            self.expr(e, 1);
                            if i + 1 < len {
                                self.push(", ");
                            }
                        }
                        // An elision is a bare comma; a trailing hole needs
                        // its comma kept so the length survives.
                        None => self.push(", "),
                    }
                }
                self.push("]");
            }
            Expr::Object(o) => {
                if o.properties.is_empty() {
                    self.push("{}");
                    return;
                }
                self.push("{ ");
                for (i, prop) in o.properties.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.property(prop);
                }
                self.push(" }");
            }
            Expr::Function(f) => self.function(f),
            Expr::Member(m) => {
                // A numeric literal base would swallow the dot.
                let needs_parens = matches!(
                    m.object.as_ref(),
                    Expr::Literal(Lit {
                        value: LitValue::Number(_),
                        ..
                    })
                );
                if needs_parens {
                    self.push("(");
                    self.expr(&m.object, 0);
                    self.push(")");
                } else {
                    self.expr(&m.object, 15);
                }
                match &m.property {
                    MemberKey::Dot(name) => {
                        self.push(".");
                        self.push(name);
                    }
                    MemberKey::Computed(key) => {
                        self.push("[");
                        self.expr(key, 0);
                        self.push("]");
                    }
                }
            }
            Expr::New(n) => {
                self.push("new ");
                self.expr(&n.callee, 16);
                self.push("(");
                self.arguments(&n.arguments);
                self.push(")");
            }
            Expr::Call(c) => {
                self.expr(&c.callee, 15);
                self.push("(");
                self.arguments(&c.arguments);
                self.push(")");
            }
            Expr::Update(u) => {
                let op = match u.op {
                    UpdateOp::Inc => "++",
                    UpdateOp::Dec => "--",
                };
                if u.prefix {
                    self.push(op);
                    self.expr(&u.argument, 13);
                } else {
                    self.expr(&u.argument, 14);
                    self.push(op);
                }
            }
            Expr::Unary(u) => {
                match u.op {
                    UnaryOp::Delete => self.push("delete "),
                    UnaryOp::Void => self.push("void "),
                    UnaryOp::Typeof => self.push("typeof "),
                    // A space keeps `- -x` from fusing into `--x`.
                    UnaryOp::Plus => self.push("+ "),
                    UnaryOp::Minus => self.push("- "),
                    UnaryOp::BitNot => self.push("~"),
                    UnaryOp::Not => self.push("!"),
                }
                self.expr(&u.argument, 13);
            }
            Expr::Binary(b) => {
                let p = binary_prec(b.op);
                self.expr(&b.left, p);
                self.push(" ");
                self.push(binary_op_text(b.op));
                self.push(" ");
                self.expr(&b.right, p + 1);
            }
            Expr::Logical(l) => {
                let p = prec(expr);
                self.expr(&l.left, p);
                self.push(match l.op {
                    LogicalOp::And => " && ",
                    LogicalOp::Or => " || ",
                });
                self.expr(&l.right, p + 1);
            }
            Expr::Assign(a) => {
                self.expr(&a.target, 15);
                self.push(" ");
                self.push(assign_op_text(a.op));
                self.push(" ");
                self.expr(&a.value, 1);
            }
            Expr::Conditional(c) => {
                self.expr(&c.test, 3);
                self.push(" ? ");
                self.expr(&c.consequent, 1);
                self.push(" : ");
                self.expr(&c.alternate, 1);
            }
            Expr::Sequence(s) => {
                for (i, e) in s.exprs.iter().enumerate() {
                    if i > 0 {
                        self.push(", ");
                    }
                    self.expr(e, 1);
                }
            }
        }
    }

    fn arguments(&mut self, args: &[Expr]) {
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expr(arg, 1);
        }
    }

    fn property(&mut self, prop: &PropertyDef) {
        match &prop.value {
            PropertyValue::Init(value) => {
                self.property_key(&prop.key);
                self.push(": ");
                self.expr(value, 1);
            }
            PropertyValue::Get(f) => {
                self.push("get ");
                self.property_key(&prop.key);
                self.push("() {");
                self.accessor_body(f);
            }
            PropertyValue::Set(f) => {
                self.push("set ");
                self.property_key(&prop.key);
                self.push("(");
                if let Some(p) = f.params.first() {
                    self.push(p);
                }
                self.push(") {");
                self.accessor_body(f);
            }
        }
    }

    fn accessor_body(&mut self, f: &FnLiteral) {
        self.indent += 1;
        for stmt in &f.body {
            self.newline();
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.newline();
        self.push("}");
    }

    fn property_key(&mut self, key: &PropertyKey) {
        match key {
            PropertyKey::Ident(name) => self.push(name),
            PropertyKey::String(s) => {
                let quoted = quote_string(s);
                self.push(&quoted);
            }
            PropertyKey::Number(n) => {
                let text = number_to_string(*n);
                self.push(&text);
            }
        }
    }

    fn literal(&mut self, lit: &Lit) {
        match &lit.value {
            LitValue::Null => self.push("null"),
            LitValue::Bool(true) => self.push("true"),
            LitValue::Bool(false) => self.push("false"),
            LitValue::Number(n) => {
                let text = number_to_string(*n);
                self.push(&text);
            }
            LitValue::String(s) => {
                let quoted = quote_string(s);
                self.push(&quoted);
            }
            LitValue::Regex { pattern, flags } => {
                self.push("/");
                self.push(pattern);
                self.push("/");
                self.push(flags);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_string;

    fn round_trips(src: &str) {
        let first = parse_string(src, None).unwrap();
        let printed = print_program(&first);
        let second = parse_string(&printed, None)
            .unwrap_or_else(|e| panic!("printed source failed to parse: {e}\n{printed}"));
        let mut a = crate::parser::dump::program_to_json(&first);
        let mut b = crate::parser::dump::program_to_json(&second);
        crate::parser::dump::strip_locations(&mut a);
        crate::parser::dump::strip_locations(&mut b);
        assert_eq!(a, b, "round trip changed structure:\n{printed}");
    }

    #[test]
    fn test_round_trip_statements() {
        round_trips("var x = 1, y; if (x) y = 2; else y = 3;");
        round_trips("for (var i = 0; i < 10; i++) x += i;");
        round_trips("for (var k in o) { s += k; }");
        round_trips("do { i--; } while (i > 0);");
        round_trips("outer: while (a) { continue outer; }");
        round_trips("switch (x) { case 1: a(); default: b(); }");
        round_trips("try { f(); } catch (e) { g(e); } finally { h(); }");
        round_trips("with (o) { x = y; }");
        round_trips("debugger;");
    }

    #[test]
    fn test_round_trip_expressions() {
        round_trips("x = a + b * c - d / e % f;");
        round_trips("x = (a + b) * c;");
        round_trips("x = a < b == c;");
        round_trips("x = a && b || c && d;");
        round_trips("x = a ? b : c ? d : e;");
        round_trips("x = -(-y);");
        round_trips("x = typeof delete a.b;");
        round_trips("x = a[b + 1].c(d, e).f;");
        round_trips("x = new Foo(1)(2);");
        round_trips("x = new a.b.C;");
        round_trips("x = [1, , 2, ];");
        round_trips("x = { a: 1, \"b c\": 2, 3: 4, get d() { return 1; } };");
        round_trips("x = function (a, b) { return a + b; };");
        round_trips("f(function () { return 1; });");
        round_trips("x = a, y = b;");
        round_trips("f((a, b), c);");
        round_trips("x = /ab+c/gi.test(s);");
    }

    #[test]
    fn test_statement_start_ambiguity_gets_parens() {
        // An expression statement may not begin with `{` or `function`.
        let program = parse_string("x = {a: 1};", None).unwrap();
        // Rebuild a bare object-literal expression statement by hand.
        if let Stmt::Expr(es) = &program.body[0] {
            if let Expr::Assign(assign) = es.expr.as_ref() {
                let stmt = Stmt::Expr(ExprStmt {
                    loc: es.loc,
                    expr: assign.value.clone(),
                });
                let printed = print_stmt(&stmt);
                assert!(printed.starts_with('('), "{printed}");
                parse_string(&printed, None).unwrap();
                return;
            }
        }
        panic!("unexpected parse shape");
    }

    #[test]
    fn test_string_escaping() {
        round_trips("x = \"a\\nb\\\\c\\\"d\";");
        round_trips("s = \"nul\\x00tab\\t\";");
        round_trips("\"use strict\"; var x = 1;");
        let program = parse_string("\"use strict\";", None).unwrap();
        let printed = print_program(&program);
        assert!(printed.contains("\"use strict\""));
    }

    #[test]
    fn test_directive_survives_printing() {
        let program = parse_string("\"use strict\"; var x;", None).unwrap();
        assert!(program.strict);
        let printed = print_program(&program);
        let reparsed = parse_string(&printed, None).unwrap();
        assert!(reparsed.strict);
    }
}
