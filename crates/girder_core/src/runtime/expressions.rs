//! Expression semantics (§11).
//!
//! Every evaluator returns [`ExprResult`]: either an [`Evaluated`] (value or
//! reference) or a thrown value in flight. References are only
//! dereferenced where the spec calls GetValue, so `typeof`, `delete`, and
//! assignment observe unresolved bindings exactly as §11 prescribes.

use crate::intrinsics::regexp;
use crate::parser::ast::*;
use crate::runtime::reference::{Evaluated, ExprResult, RefBase, Reference, ValueResult};
use crate::runtime::value::Value;
use crate::runtime::{Interpreter, PrimitiveHint};

impl Interpreter {
    /// Evaluate an expression to a value or reference.
    pub(crate) fn eval_expression(&mut self, expr: &Expr) -> ExprResult {
        match expr {
            Expr::This(_) => Ok(Evaluated::Value(self.context().this_binding.clone())),
            Expr::Ident(id) => Ok(Evaluated::Ref(self.resolve_identifier(&id.name))),
            Expr::Literal(lit) => self.eval_literal(lit),
            Expr::Array(a) => self.eval_array_literal(a),
            Expr::Object(o) => self.eval_object_literal(o),
            Expr::Function(literal) => {
                let f = self.instantiate_function_literal(literal, true);
                Ok(Evaluated::Value(Value::Object(f)))
            }
            Expr::Member(m) => self.eval_member(m),
            Expr::New(n) => self.eval_new(n),
            Expr::Call(c) => self.eval_call(c),
            Expr::Update(u) => self.eval_update(u),
            Expr::Unary(u) => self.eval_unary(u),
            Expr::Binary(b) => self.eval_binary(b),
            Expr::Logical(l) => self.eval_logical(l),
            Expr::Assign(a) => self.eval_assignment(a),
            Expr::Conditional(c) => self.eval_conditional(c),
            Expr::Sequence(s) => self.eval_sequence(s),
        }
    }

    /// Evaluate and dereference in one step (the common GetValue pairing).
    pub(crate) fn eval_expr_value(&mut self, expr: &Expr) -> ValueResult {
        let evaluated = self.eval_expression(expr)?;
        self.get_value(evaluated)
    }

    // ── Literals (§11.1) ────────────────────────────────────────────────────

    fn eval_literal(&mut self, lit: &Lit) -> ExprResult {
        let value = match &lit.value {
            LitValue::Null => Value::Null,
            LitValue::Bool(b) => Value::Boolean(*b),
            LitValue::Number(n) => Value::Number(*n),
            LitValue::String(s) => Value::string(s.clone()),
            LitValue::Regex { pattern, flags } => {
                // §7.8.5: each evaluation of the literal builds a fresh
                // RegExp object.
                let handle = regexp::make_regexp(self, pattern, flags)?;
                Value::Object(handle)
            }
        };
        Ok(Evaluated::Value(value))
    }

    /// §11.1.4: elisions occupy indices but define no properties.
    fn eval_array_literal(&mut self, a: &ArrayLit) -> ExprResult {
        let array = self.make_array(Vec::new());
        for (i, element) in a.elements.iter().enumerate() {
            if let Some(expr) = element {
                let value = self.eval_expr_value(expr)?;
                self.heap
                    .get_mut(array)
                    .set_simple_property(&i.to_string(), value);
            }
        }
        let length = Value::Number(a.elements.len() as f64);
        self.heap.get_mut(array).set_data_value("length", length);
        Ok(Evaluated::Value(Value::Object(array)))
    }

    /// §11.1.5 (runtime half; the parser already rejected conflicting
    /// definitions).
    fn eval_object_literal(&mut self, o: &ObjectLit) -> ExprResult {
        use crate::objects::PropertyDescriptor;

        let object = self.make_object();
        for prop in &o.properties {
            let name = prop.key.as_property_name();
            let desc = match &prop.value {
                PropertyValue::Init(expr) => {
                    let value = self.eval_expr_value(expr)?;
                    PropertyDescriptor {
                        value: Some(value),
                        writable: Some(true),
                        enumerable: Some(true),
                        configurable: Some(true),
                        ..PropertyDescriptor::default()
                    }
                }
                PropertyValue::Get(literal) => {
                    let f = self.instantiate_function_literal(literal, true);
                    PropertyDescriptor {
                        get: Some(Some(f)),
                        enumerable: Some(true),
                        configurable: Some(true),
                        ..PropertyDescriptor::default()
                    }
                }
                PropertyValue::Set(literal) => {
                    let f = self.instantiate_function_literal(literal, true);
                    PropertyDescriptor {
                        set: Some(Some(f)),
                        enumerable: Some(true),
                        configurable: Some(true),
                        ..PropertyDescriptor::default()
                    }
                }
            };
            self.define_own_property(object, &name, &desc, false)?;
        }
        Ok(Evaluated::Value(Value::Object(object)))
    }

    // ── Property access (§11.2.1) ───────────────────────────────────────────

    fn eval_member(&mut self, m: &MemberExpr) -> ExprResult {
        let base = self.eval_expr_value(&m.object)?;
        let name = match &m.property {
            MemberKey::Dot(name) => name.clone(),
            MemberKey::Computed(key) => {
                let key_value = self.eval_expr_value(key)?;
                self.to_string_value(&key_value)?
            }
        };
        self.check_object_coercible(&base)?;
        Ok(Evaluated::Ref(Reference {
            base: RefBase::Value(base),
            name,
            strict: self.strict(),
        }))
    }

    // ── new (§11.2.2) ───────────────────────────────────────────────────────

    fn eval_new(&mut self, n: &NewExpr) -> ExprResult {
        let callee = self.eval_expr_value(&n.callee)?;
        let mut args = Vec::with_capacity(n.arguments.len());
        for arg in &n.arguments {
            args.push(self.eval_expr_value(arg)?);
        }
        let Some(handle) = callee.as_object() else {
            let shown = self.typeof_value(&callee);
            return self.throw_type_error(&format!("{shown} is not a constructor"));
        };
        let result = self.construct(handle, &args)?;
        Ok(Evaluated::Value(result))
    }

    // ── Call (§11.2.3) ──────────────────────────────────────────────────────

    fn eval_call(&mut self, c: &CallExpr) -> ExprResult {
        let callee = self.eval_expression(&c.callee)?;
        let func = self.get_value(callee.clone())?;
        let mut args = Vec::with_capacity(c.arguments.len());
        for arg in &c.arguments {
            args.push(self.eval_expr_value(arg)?);
        }

        // §10.4.2 / §15.1.2.1.1: a direct call to the intrinsic eval runs
        // in the caller's context.
        if let Evaluated::Ref(r) = &callee {
            if matches!(r.base, RefBase::Env(_)) && r.name == "eval" {
                if let Some(h) = func.as_object() {
                    if h == self.intrinsics.eval_function {
                        let result = match args.first() {
                            Some(Value::String(source)) => {
                                let source = source.clone();
                                self.eval_code(&source, true)?
                            }
                            Some(other) => other.clone(),
                            None => Value::Undefined,
                        };
                        return Ok(Evaluated::Value(result));
                    }
                }
            }
        }

        if !self.is_callable(&func) {
            let described = match &callee {
                Evaluated::Ref(r) => r.name.clone(),
                Evaluated::Value(v) => self.typeof_value(v).to_string(),
            };
            return self.throw_type_error(&format!("{described} is not a function"));
        }

        let this_value = match &callee {
            Evaluated::Ref(r) => match &r.base {
                RefBase::Value(base) => base.clone(),
                RefBase::Env(env) => self.env_implicit_this(*env),
                RefBase::Unresolvable => Value::Undefined,
            },
            Evaluated::Value(_) => Value::Undefined,
        };

        let handle = func.as_object().expect("callable implies object");
        let result = self.call_function(handle, this_value, &args)?;
        Ok(Evaluated::Value(result))
    }

    // ── Update expressions (§11.3, §11.4.4, §11.4.5) ────────────────────────

    fn eval_update(&mut self, u: &UpdateExpr) -> ExprResult {
        let target = self.eval_expression(&u.argument)?;
        let Evaluated::Ref(reference) = target else {
            return self.throw_reference_error("invalid increment/decrement target");
        };
        let old_value = {
            let current = self.get_reference_value(&reference)?;
            self.to_number(&current)?
        };
        let new_value = match u.op {
            UpdateOp::Inc => old_value + 1.0,
            UpdateOp::Dec => old_value - 1.0,
        };
        self.put_value(&reference, Value::Number(new_value))?;
        let produced = if u.prefix { new_value } else { old_value };
        Ok(Evaluated::Value(Value::Number(produced)))
    }

    // ── Unary operators (§11.4) ─────────────────────────────────────────────

    fn eval_unary(&mut self, u: &UnaryExpr) -> ExprResult {
        match u.op {
            UnaryOp::Delete => {
                let target = self.eval_expression(&u.argument)?;
                let Evaluated::Ref(reference) = target else {
                    return Ok(Evaluated::Value(Value::Boolean(true)));
                };
                let result = match &reference.base {
                    RefBase::Unresolvable => true,
                    RefBase::Value(base) => {
                        let base = base.clone();
                        let obj = self.to_object(&base)?;
                        self.delete_property(obj, &reference.name, reference.strict)?
                    }
                    RefBase::Env(env) => self.env_delete_binding(*env, &reference.name),
                };
                Ok(Evaluated::Value(Value::Boolean(result)))
            }
            UnaryOp::Void => {
                self.eval_expr_value(&u.argument)?;
                Ok(Evaluated::Value(Value::Undefined))
            }
            UnaryOp::Typeof => {
                let target = self.eval_expression(&u.argument)?;
                let value = match target {
                    Evaluated::Ref(r) if r.is_unresolvable() => {
                        return Ok(Evaluated::Value(Value::string("undefined")));
                    }
                    other => self.get_value(other)?,
                };
                Ok(Evaluated::Value(Value::string(self.typeof_value(&value))))
            }
            UnaryOp::Plus => {
                let value = self.eval_expr_value(&u.argument)?;
                let n = self.to_number(&value)?;
                Ok(Evaluated::Value(Value::Number(n)))
            }
            UnaryOp::Minus => {
                let value = self.eval_expr_value(&u.argument)?;
                let n = self.to_number(&value)?;
                Ok(Evaluated::Value(Value::Number(-n)))
            }
            UnaryOp::BitNot => {
                let value = self.eval_expr_value(&u.argument)?;
                let n = self.to_int32(&value)?;
                Ok(Evaluated::Value(Value::Number(!n as f64)))
            }
            UnaryOp::Not => {
                let value = self.eval_expr_value(&u.argument)?;
                Ok(Evaluated::Value(Value::Boolean(!value.to_boolean())))
            }
        }
    }

    // ── Binary operators (§11.5–§11.9) ──────────────────────────────────────

    fn eval_binary(&mut self, b: &BinaryExpr) -> ExprResult {
        let lval = self.eval_expr_value(&b.left)?;
        let rval = self.eval_expr_value(&b.right)?;
        let result = self.apply_binary_operator(b.op, &lval, &rval)?;
        Ok(Evaluated::Value(result))
    }

    /// Apply a (non-short-circuiting) binary operator to two values.
    /// Compound assignment reuses this.
    pub(crate) fn apply_binary_operator(
        &mut self,
        op: BinaryOp,
        lval: &Value,
        rval: &Value,
    ) -> ValueResult {
        use BinaryOp::*;
        match op {
            Mul => {
                let (l, r) = (self.to_number(lval)?, self.to_number(rval)?);
                Ok(Value::Number(l * r))
            }
            Div => {
                let (l, r) = (self.to_number(lval)?, self.to_number(rval)?);
                Ok(Value::Number(l / r))
            }
            Mod => {
                let (l, r) = (self.to_number(lval)?, self.to_number(rval)?);
                Ok(Value::Number(l % r))
            }
            Sub => {
                let (l, r) = (self.to_number(lval)?, self.to_number(rval)?);
                Ok(Value::Number(l - r))
            }
            Add => {
                // §11.6.1: string concatenation wins if either primitive
                // is a string.
                let lprim = self.to_primitive(lval, PrimitiveHint::Default)?;
                let rprim = self.to_primitive(rval, PrimitiveHint::Default)?;
                if lprim.is_string() || rprim.is_string() {
                    let mut s = self.to_string_value(&lprim)?;
                    s.push_str(&self.to_string_value(&rprim)?);
                    Ok(Value::string(s))
                } else {
                    let (l, r) = (self.to_number(&lprim)?, self.to_number(&rprim)?);
                    Ok(Value::Number(l + r))
                }
            }
            Shl => {
                let l = self.to_int32(lval)?;
                let shift = self.to_uint32(rval)? & 0x1F;
                Ok(Value::Number((l << shift) as f64))
            }
            Shr => {
                let l = self.to_int32(lval)?;
                let shift = self.to_uint32(rval)? & 0x1F;
                Ok(Value::Number((l >> shift) as f64))
            }
            UShr => {
                let l = self.to_uint32(lval)?;
                let shift = self.to_uint32(rval)? & 0x1F;
                Ok(Value::Number((l >> shift) as f64))
            }
            Lt => {
                let r = self.abstract_compare(lval, rval, true)?;
                Ok(Value::Boolean(r == Some(true)))
            }
            Gt => {
                let r = self.abstract_compare(rval, lval, false)?;
                Ok(Value::Boolean(r == Some(true)))
            }
            Le => {
                let r = self.abstract_compare(rval, lval, false)?;
                Ok(Value::Boolean(!matches!(r, Some(true) | None)))
            }
            Ge => {
                let r = self.abstract_compare(lval, rval, true)?;
                Ok(Value::Boolean(!matches!(r, Some(true) | None)))
            }
            In => {
                let Some(obj) = rval.as_object() else {
                    return self
                        .throw_type_error("right-hand side of 'in' is not an object");
                };
                let name = self.to_string_value(lval)?;
                Ok(Value::Boolean(self.has_property(obj, &name)))
            }
            Instanceof => {
                let Some(obj) = rval.as_object() else {
                    return self
                        .throw_type_error("right-hand side of instanceof is not an object");
                };
                if !self.heap.get(obj).is_callable() {
                    return self
                        .throw_type_error("right-hand side of instanceof is not callable");
                }
                let result = self.has_instance(obj, lval)?;
                Ok(Value::Boolean(result))
            }
            Eq => {
                let result = self.abstract_equals(lval, rval)?;
                Ok(Value::Boolean(result))
            }
            Ne => {
                let result = self.abstract_equals(lval, rval)?;
                Ok(Value::Boolean(!result))
            }
            StrictEq => Ok(Value::Boolean(Value::strict_equals(lval, rval))),
            StrictNe => Ok(Value::Boolean(!Value::strict_equals(lval, rval))),
            BitAnd => {
                let (l, r) = (self.to_int32(lval)?, self.to_int32(rval)?);
                Ok(Value::Number((l & r) as f64))
            }
            BitXor => {
                let (l, r) = (self.to_int32(lval)?, self.to_int32(rval)?);
                Ok(Value::Number((l ^ r) as f64))
            }
            BitOr => {
                let (l, r) = (self.to_int32(lval)?, self.to_int32(rval)?);
                Ok(Value::Number((l | r) as f64))
            }
        }
    }

    /// §11.8.5 abstract relational comparison: `Some(bool)` or `None` for
    /// *undefined* (NaN involved).
    fn abstract_compare(
        &mut self,
        x: &Value,
        y: &Value,
        left_first: bool,
    ) -> Result<Option<bool>, Value> {
        let (px, py) = if left_first {
            let px = self.to_primitive(x, PrimitiveHint::Number)?;
            let py = self.to_primitive(y, PrimitiveHint::Number)?;
            (px, py)
        } else {
            let py = self.to_primitive(y, PrimitiveHint::Number)?;
            let px = self.to_primitive(x, PrimitiveHint::Number)?;
            (px, py)
        };
        if let (Value::String(a), Value::String(b)) = (&px, &py) {
            return Ok(Some(a < b));
        }
        let nx = self.to_number(&px)?;
        let ny = self.to_number(&py)?;
        if nx.is_nan() || ny.is_nan() {
            return Ok(None);
        }
        Ok(Some(nx < ny))
    }

    /// §11.9.3 the abstract equality algorithm.
    pub(crate) fn abstract_equals(&mut self, x: &Value, y: &Value) -> Result<bool, Value> {
        use Value::*;
        match (x, y) {
            (Undefined, Undefined)
            | (Null, Null)
            | (Undefined, Null)
            | (Null, Undefined) => Ok(true),
            (Number(_), Number(_))
            | (String(_), String(_))
            | (Boolean(_), Boolean(_))
            | (Object(_), Object(_)) => Ok(Value::strict_equals(x, y)),
            (Number(a), String(s)) => Ok(*a == crate::runtime::conversions::string_to_number(s)),
            (String(s), Number(b)) => Ok(crate::runtime::conversions::string_to_number(s) == *b),
            (Boolean(b), _) => {
                let n = Number(if *b { 1.0 } else { 0.0 });
                self.abstract_equals(&n, y)
            }
            (_, Boolean(b)) => {
                let n = Number(if *b { 1.0 } else { 0.0 });
                self.abstract_equals(x, &n)
            }
            (Number(_) | String(_), Object(_)) => {
                let yprim = self.to_primitive(y, PrimitiveHint::Default)?;
                self.abstract_equals(x, &yprim)
            }
            (Object(_), Number(_) | String(_)) => {
                let xprim = self.to_primitive(x, PrimitiveHint::Default)?;
                self.abstract_equals(&xprim, y)
            }
            _ => Ok(false),
        }
    }

    // ── Logical operators (§11.11) ──────────────────────────────────────────

    fn eval_logical(&mut self, l: &LogicalExpr) -> ExprResult {
        let lval = self.eval_expr_value(&l.left)?;
        let short_circuit = match l.op {
            LogicalOp::And => !lval.to_boolean(),
            LogicalOp::Or => lval.to_boolean(),
        };
        if short_circuit {
            return Ok(Evaluated::Value(lval));
        }
        let rval = self.eval_expr_value(&l.right)?;
        Ok(Evaluated::Value(rval))
    }

    // ── Assignment (§11.13) ─────────────────────────────────────────────────

    fn eval_assignment(&mut self, a: &AssignExpr) -> ExprResult {
        let target = self.eval_expression(&a.target)?;
        let Evaluated::Ref(reference) = target else {
            return self.throw_reference_error("invalid assignment target");
        };
        let value = match a.op.binary_op() {
            None => self.eval_expr_value(&a.value)?,
            Some(op) => {
                let lval = self.get_reference_value(&reference)?;
                let rval = self.eval_expr_value(&a.value)?;
                self.apply_binary_operator(op, &lval, &rval)?
            }
        };
        self.put_value(&reference, value.clone())?;
        Ok(Evaluated::Value(value))
    }

    // ── Conditional and sequence (§11.12, §11.14) ───────────────────────────

    fn eval_conditional(&mut self, c: &CondExpr) -> ExprResult {
        let test = self.eval_expr_value(&c.test)?;
        let branch = if test.to_boolean() {
            &c.consequent
        } else {
            &c.alternate
        };
        let value = self.eval_expr_value(branch)?;
        Ok(Evaluated::Value(value))
    }

    fn eval_sequence(&mut self, s: &SeqExpr) -> ExprResult {
        let mut last = Value::Undefined;
        for expr in &s.exprs {
            last = self.eval_expr_value(expr)?;
        }
        Ok(Evaluated::Value(last))
    }
}
