//! Statement semantics (§12).
//!
//! Every evaluator returns a [`Completion`]; abrupt completions propagate by
//! explicit matching, never by unwinding, so `try/finally` can observe and
//! override them. Loop evaluators take the active label set so labeled
//! `break`/`continue` land on the right statement.

use crate::parser::ast::*;
use crate::runtime::completion::Completion;
use crate::runtime::reference::Evaluated;
use crate::runtime::value::Value;
use crate::runtime::{ErrorKind, Interpreter};

/// Convert a thrown value into a `Throw` completion at statement level.
macro_rules! jstry {
    ($e:expr) => {
        match $e {
            Ok(v) => v,
            Err(thrown) => return Completion::Throw(thrown),
        }
    };
}

/// Does this `break`/`continue` target select the statement carrying
/// `labels`? An empty target always does.
fn targets(label: &Option<String>, labels: &[String]) -> bool {
    match label {
        None => true,
        Some(name) => labels.iter().any(|l| l == name),
    }
}

impl Interpreter {
    /// Evaluate a statement list, threading the statement value per §12.1.
    pub(crate) fn eval_statements(&mut self, stmts: &[Stmt]) -> Completion {
        let mut value: Option<Value> = None;
        for stmt in stmts {
            match self.eval_statement(stmt) {
                Completion::Normal(v) => {
                    if v.is_some() {
                        value = v;
                    }
                }
                abrupt => return abrupt,
            }
        }
        Completion::Normal(value)
    }

    /// Evaluate one statement.
    pub(crate) fn eval_statement(&mut self, stmt: &Stmt) -> Completion {
        self.eval_statement_labeled(stmt, &[])
    }

    fn eval_statement_labeled(&mut self, stmt: &Stmt, labels: &[String]) -> Completion {
        match stmt {
            Stmt::Block(block) => self.eval_statements(&block.body),
            Stmt::Var(var) => self.eval_var_statement(var),
            Stmt::Empty(_) => Completion::empty(),
            Stmt::Expr(es) => {
                let value = jstry!(self.eval_expr_value(&es.expr));
                Completion::Normal(Some(value))
            }
            Stmt::If(s) => {
                let test = jstry!(self.eval_expr_value(&s.test));
                if test.to_boolean() {
                    self.eval_statement(&s.consequent)
                } else if let Some(alternate) = &s.alternate {
                    self.eval_statement(alternate)
                } else {
                    Completion::empty()
                }
            }
            Stmt::DoWhile(s) => self.eval_do_while(s, labels),
            Stmt::While(s) => self.eval_while(s, labels),
            Stmt::For(s) => self.eval_for(s, labels),
            Stmt::ForIn(s) => self.eval_for_in(s, labels),
            Stmt::Continue(s) => Completion::Continue(s.label.clone()),
            Stmt::Break(s) => Completion::Break(s.label.clone()),
            Stmt::Return(s) => {
                let value = match &s.argument {
                    Some(expr) => jstry!(self.eval_expr_value(expr)),
                    None => Value::Undefined,
                };
                Completion::Return(value)
            }
            Stmt::With(s) => self.eval_with(s),
            Stmt::Switch(s) => self.eval_switch(s, labels),
            Stmt::Labeled(_) => {
                // Collect the whole contiguous label chain so a multiply
                // labeled loop sees every name.
                let mut chain: Vec<String> = labels.to_vec();
                let mut inner = stmt;
                while let Stmt::Labeled(l) = inner {
                    chain.push(l.label.clone());
                    inner = l.body.as_ref();
                }
                match self.eval_statement_labeled(inner, &chain) {
                    Completion::Break(target) if targets(&target, &chain) => Completion::empty(),
                    other => other,
                }
            }
            Stmt::Throw(s) => {
                let value = jstry!(self.eval_expr_value(&s.argument));
                Completion::Throw(value)
            }
            Stmt::Try(s) => self.eval_try(s),
            Stmt::Debugger(_) => Completion::empty(),
            // Bound during declaration instantiation (§10.5); inert here.
            Stmt::FnDecl(_) => Completion::empty(),
        }
    }

    // ── var (§12.2) ─────────────────────────────────────────────────────────

    fn eval_var_statement(&mut self, var: &VarStmt) -> Completion {
        for decl in &var.declarations {
            jstry!(self.eval_var_declaration(decl));
        }
        Completion::empty()
    }

    fn eval_var_declaration(&mut self, decl: &VarDecl) -> Result<(), Value> {
        if let Some(init) = &decl.init {
            let reference = self.resolve_identifier(&decl.name);
            let value = self.eval_expr_value(init)?;
            self.put_value(&reference, value)?;
        }
        Ok(())
    }

    // ── Loops (§12.6) ───────────────────────────────────────────────────────

    fn eval_do_while(&mut self, s: &DoWhileStmt, labels: &[String]) -> Completion {
        let mut value: Option<Value> = None;
        loop {
            match self.eval_statement(&s.body) {
                Completion::Normal(v) => {
                    if v.is_some() {
                        value = v;
                    }
                }
                Completion::Continue(target) if targets(&target, labels) => {}
                Completion::Break(target) if targets(&target, labels) => {
                    return Completion::Normal(value);
                }
                abrupt => return abrupt,
            }
            let test = jstry!(self.eval_expr_value(&s.test));
            if !test.to_boolean() {
                return Completion::Normal(value);
            }
        }
    }

    fn eval_while(&mut self, s: &WhileStmt, labels: &[String]) -> Completion {
        let mut value: Option<Value> = None;
        loop {
            let test = jstry!(self.eval_expr_value(&s.test));
            if !test.to_boolean() {
                return Completion::Normal(value);
            }
            match self.eval_statement(&s.body) {
                Completion::Normal(v) => {
                    if v.is_some() {
                        value = v;
                    }
                }
                Completion::Continue(target) if targets(&target, labels) => {}
                Completion::Break(target) if targets(&target, labels) => {
                    return Completion::Normal(value);
                }
                abrupt => return abrupt,
            }
        }
    }

    fn eval_for(&mut self, s: &ForStmt, labels: &[String]) -> Completion {
        match &s.init {
            Some(ForInit::Var(var)) => {
                for decl in &var.declarations {
                    jstry!(self.eval_var_declaration(decl));
                }
            }
            Some(ForInit::Expr(expr)) => {
                jstry!(self.eval_expr_value(expr));
            }
            None => {}
        }
        let mut value: Option<Value> = None;
        loop {
            if let Some(test) = &s.test {
                let t = jstry!(self.eval_expr_value(test));
                if !t.to_boolean() {
                    return Completion::Normal(value);
                }
            }
            match self.eval_statement(&s.body) {
                Completion::Normal(v) => {
                    if v.is_some() {
                        value = v;
                    }
                }
                Completion::Continue(target) if targets(&target, labels) => {}
                Completion::Break(target) if targets(&target, labels) => {
                    return Completion::Normal(value);
                }
                abrupt => return abrupt,
            }
            if let Some(update) = &s.update {
                jstry!(self.eval_expr_value(update));
            }
        }
    }

    /// §12.6.4 for-in: own enumerable keys in insertion order, then up the
    /// prototype chain, skipping names shadowed nearer the start. Keys are
    /// re-checked before each step so deletions during the loop are
    /// honored.
    fn eval_for_in(&mut self, s: &ForInStmt, labels: &[String]) -> Completion {
        // A `var` left-hand side evaluates its initializer once, before
        // the enumerated expression (§12.6.4 step 1).
        if let ForInLeft::Var(decl) = &s.left {
            jstry!(self.eval_var_declaration(decl));
        }
        let subject = jstry!(self.eval_expr_value(&s.right));
        if subject.is_nullish() {
            return Completion::empty();
        }
        let root = jstry!(self.to_object(&subject));

        let mut value: Option<Value> = None;
        let mut shadowed: Vec<String> = Vec::new();
        let mut current = Some(root);
        while let Some(object) = current {
            let keys = self.heap.get(object).own_keys();
            for key in keys {
                if shadowed.iter().any(|k| *k == key) {
                    continue;
                }
                shadowed.push(key.clone());
                // The property may have been deleted or made
                // non-enumerable by a previous iteration.
                let live = self
                    .get_own_property(object, &key)
                    .map(|p| p.is_enumerable())
                    .unwrap_or(false);
                if !live {
                    continue;
                }

                let reference = match &s.left {
                    ForInLeft::Var(decl) => self.resolve_identifier(&decl.name),
                    ForInLeft::Expr(expr) => match jstry!(self.eval_expression(expr)) {
                        Evaluated::Ref(r) => r,
                        Evaluated::Value(_) => {
                            // The parser only admits reference shapes here.
                            let error =
                                self.make_error(ErrorKind::Reference, "invalid for-in target");
                            return Completion::Throw(error);
                        }
                    },
                };
                jstry!(self.put_value(&reference, Value::string(key)));

                match self.eval_statement(&s.body) {
                    Completion::Normal(v) => {
                        if v.is_some() {
                            value = v;
                        }
                    }
                    Completion::Continue(target) if targets(&target, labels) => {}
                    Completion::Break(target) if targets(&target, labels) => {
                        return Completion::Normal(value);
                    }
                    abrupt => return abrupt,
                }
            }
            current = self.heap.get(object).prototype();
        }
        Completion::Normal(value)
    }

    // ── with (§12.10) ───────────────────────────────────────────────────────

    fn eval_with(&mut self, s: &WithStmt) -> Completion {
        let subject = jstry!(self.eval_expr_value(&s.object));
        let object = jstry!(self.to_object(&subject));
        let saved = self.current_lexical_environment();
        self.push_with_environment(object);
        let result = self.eval_statement(&s.body);
        self.restore_lexical_environment(saved);
        result
    }

    // ── switch (§12.11) ─────────────────────────────────────────────────────

    fn eval_switch(&mut self, s: &SwitchStmt, labels: &[String]) -> Completion {
        let discriminant = jstry!(self.eval_expr_value(&s.discriminant));

        // Select the first clause whose selector === discriminant; fall
        // back to `default`. Later selectors are not evaluated once one
        // matches.
        let mut start = None;
        for (i, case) in s.cases.iter().enumerate() {
            if let Some(test) = &case.test {
                let selector = jstry!(self.eval_expr_value(test));
                if Value::strict_equals(&discriminant, &selector) {
                    start = Some(i);
                    break;
                }
            }
        }
        let start = match start.or_else(|| s.cases.iter().position(|c| c.test.is_none())) {
            Some(i) => i,
            None => return Completion::empty(),
        };

        // Fall through from the selected clause to the end.
        let mut value: Option<Value> = None;
        for case in &s.cases[start..] {
            match self.eval_statements(&case.consequent) {
                Completion::Normal(v) => {
                    if v.is_some() {
                        value = v;
                    }
                }
                Completion::Break(target) if targets(&target, labels) => {
                    return Completion::Normal(value);
                }
                abrupt => return abrupt,
            }
        }
        Completion::Normal(value)
    }

    // ── try / catch / finally (§12.14) ──────────────────────────────────────

    fn eval_try(&mut self, s: &TryStmt) -> Completion {
        let mut result = self.eval_statements(&s.block.body);

        if let Completion::Throw(thrown) = &result {
            if let Some(handler) = &s.handler {
                let thrown = thrown.clone();
                let saved = self.current_lexical_environment();
                self.push_catch_environment(&handler.param, thrown);
                result = self.eval_statements(&handler.body.body);
                self.restore_lexical_environment(saved);
            }
        }

        if let Some(finalizer) = &s.finalizer {
            // The finally block runs on every path; its own abrupt
            // completion supersedes the protected block's.
            let fin = self.eval_statements(&finalizer.body);
            if fin.is_abrupt() {
                return fin;
            }
        }
        result
    }
}
