//! Recursive-descent parser for the ECMAScript 5.1 grammar.
//!
//! Beyond grammar shape, this module owns the context-sensitive machinery
//! ES5.1 demands of a parser:
//!
//! - **Automatic Semicolon Insertion** (§7.9), including the restricted
//!   productions (`return` / `throw` / `break` / `continue` / postfix
//!   `++` `--`) and the rule that ASI never supplies a semicolon inside a
//!   `for (;;)` header.
//! - **Directive prologues** (§14.1): `"use strict"` switches the body to
//!   strict mode; strictness is lexically inherited by nested function
//!   bodies and never revoked.
//! - **Early errors**: the strict-mode catalogue (octal literals and
//!   escapes, `with`, `delete identifier`, `eval`/`arguments` in binding
//!   and assignment positions, duplicate formals, reserved words),
//!   duplicate/conflicting object-literal properties, label uniqueness and
//!   `break`/`continue` target existence, `return` outside a function,
//!   multiple `default` clauses.
//! - **Lexical-goal selection**: `InputElementRegExp` wherever an
//!   expression may begin, `InputElementDiv` wherever an operator may
//!   continue one (§7).
//! - **NoIn variants** for `for` headers, with the §11.12 carve-out that
//!   the middle of `?:` re-admits `in`.

use std::mem;
use std::rc::Rc;

use crate::error::{EngineError, EngineResult, LexErrorKind};
use crate::parser::ast::*;
use crate::parser::scanner::{
    is_strict_future_reserved, token_word, LexGoal, Position, Span, Token, TokenKind, TokenValue,
};
use crate::parser::token_stream::TokenStream;

/// Binding-power table for binary operators, used by the precedence-climbing
/// loop. Higher binds tighter.
fn binary_op_for(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    Some(match kind {
        TokenKind::PipePipe | TokenKind::AmpersandAmpersand => return None, // handled as Logical
        TokenKind::Pipe => (BinaryOp::BitOr, 3),
        TokenKind::Caret => (BinaryOp::BitXor, 4),
        TokenKind::Ampersand => (BinaryOp::BitAnd, 5),
        TokenKind::EqualEqual => (BinaryOp::Eq, 6),
        TokenKind::BangEqual => (BinaryOp::Ne, 6),
        TokenKind::EqualEqualEqual => (BinaryOp::StrictEq, 6),
        TokenKind::BangEqualEqual => (BinaryOp::StrictNe, 6),
        TokenKind::Less => (BinaryOp::Lt, 7),
        TokenKind::Greater => (BinaryOp::Gt, 7),
        TokenKind::LessEqual => (BinaryOp::Le, 7),
        TokenKind::GreaterEqual => (BinaryOp::Ge, 7),
        TokenKind::In => (BinaryOp::In, 7),
        TokenKind::Instanceof => (BinaryOp::Instanceof, 7),
        TokenKind::LessLess => (BinaryOp::Shl, 8),
        TokenKind::GreaterGreater => (BinaryOp::Shr, 8),
        TokenKind::GreaterGreaterGreater => (BinaryOp::UShr, 8),
        TokenKind::Plus => (BinaryOp::Add, 9),
        TokenKind::Minus => (BinaryOp::Sub, 9),
        TokenKind::Star => (BinaryOp::Mul, 10),
        TokenKind::Slash => (BinaryOp::Div, 10),
        TokenKind::Percent => (BinaryOp::Mod, 10),
        _ => return None,
    })
}

fn assign_op_for(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Equal => AssignOp::Assign,
        TokenKind::StarEqual => AssignOp::Mul,
        TokenKind::SlashEqual => AssignOp::Div,
        TokenKind::PercentEqual => AssignOp::Mod,
        TokenKind::PlusEqual => AssignOp::Add,
        TokenKind::MinusEqual => AssignOp::Sub,
        TokenKind::LessLessEqual => AssignOp::Shl,
        TokenKind::GreaterGreaterEqual => AssignOp::Shr,
        TokenKind::GreaterGreaterGreaterEqual => AssignOp::UShr,
        TokenKind::AmpersandEqual => AssignOp::BitAnd,
        TokenKind::CaretEqual => AssignOp::BitXor,
        TokenKind::PipeEqual => AssignOp::BitOr,
        _ => return None,
    })
}

/// What the parser knows about an active label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    /// The label is known to label an iteration statement.
    Iteration,
    /// The label is known to label a non-iteration statement.
    Plain,
    /// The label is followed by another label; iteration-ness unknown.
    Chained,
}

/// ECMAScript 5.1 recursive-descent parser.
///
/// Create one with [`Parser::new`], then call [`Parser::parse_program`] (or
/// one of the single-production entry points) exactly once.
pub struct Parser<'src> {
    ts: TokenStream<'src>,
    filename: String,
    /// Strictness of the code currently being parsed.
    strict: bool,
    /// `true` while parsing a production that excludes the `in` operator.
    no_in: bool,
    /// Function-body nesting depth; `return` requires > 0.
    function_depth: u32,
    /// Iteration-statement nesting depth within the current function.
    iteration_depth: u32,
    /// `switch` nesting depth within the current function.
    switch_depth: u32,
    /// Active labels, innermost last.
    labels: Vec<(String, LabelKind)>,
    /// Per-function-scope hoisting collectors, innermost last.
    scopes: Vec<ScopeData>,
}

impl<'src> Parser<'src> {
    /// Create a parser over `source`. `filename` is used in error messages.
    pub fn new(source: &'src str, filename: Option<&str>) -> Self {
        Self {
            ts: TokenStream::new(source),
            filename: filename.unwrap_or("<anonymous>").to_string(),
            strict: false,
            no_in: false,
            function_depth: 0,
            iteration_depth: 0,
            switch_depth: 0,
            labels: Vec::new(),
            scopes: vec![ScopeData::default()],
        }
    }

    // ── Errors ──────────────────────────────────────────────────────────────

    fn error_at(&self, message: impl Into<String>, pos: Position) -> EngineError {
        EngineError::Parse {
            message: message.into(),
            filename: self.filename.clone(),
            line: pos.line,
            column: pos.column,
        }
    }

    fn describe(&self, token: &Token) -> String {
        match token.kind {
            TokenKind::Eof => "end of input".to_string(),
            _ => format!("'{}'", self.ts.lexeme(&token.span)),
        }
    }

    fn unexpected(&self, token: &Token) -> EngineError {
        self.error_at(
            format!("unexpected token {}", self.describe(token)),
            token.span.start,
        )
    }

    fn unexpected_expecting(&self, token: &Token, expected: &str) -> EngineError {
        self.error_at(
            format!(
                "unexpected token {}, expected '{}'",
                self.describe(token),
                expected
            ),
            token.span.start,
        )
    }

    /// Lift a lexical error into a parse error carrying the filename.
    fn lift(&self, err: EngineError) -> EngineError {
        match err {
            EngineError::Lex { kind, line, column } => EngineError::Parse {
                message: kind.to_string(),
                filename: self.filename.clone(),
                line,
                column,
            },
            other => other,
        }
    }

    // ── Token-stream shims ──────────────────────────────────────────────────

    fn next(&mut self, goal: LexGoal) -> EngineResult<Token> {
        self.ts.next(goal).map_err(|e| self.lift(e))
    }

    fn peek_kind(&mut self, goal: LexGoal) -> EngineResult<TokenKind> {
        self.ts.peek_kind(goal).map_err(|e| self.lift(e))
    }

    fn peek_clone(&mut self, goal: LexGoal) -> EngineResult<Token> {
        match self.ts.peek(goal) {
            Ok(t) => Ok(t.clone()),
            Err(e) => Err(self.lift(e)),
        }
    }

    fn eat(&mut self, kind: TokenKind, goal: LexGoal) -> EngineResult<bool> {
        if self.peek_kind(goal)? == kind {
            self.next(goal)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str, goal: LexGoal) -> EngineResult<Token> {
        let tok = self.next(goal)?;
        if tok.kind != kind {
            return Err(self.unexpected_expecting(&tok, what));
        }
        Ok(tok)
    }

    fn line_terminator_ahead(&mut self) -> EngineResult<bool> {
        self.ts
            .had_line_terminator_before_next()
            .map_err(|e| self.lift(e))
    }

    /// §7.9 Automatic Semicolon Insertion at a `;`-required point.
    fn expect_semicolon(&mut self) -> EngineResult<()> {
        let tok = self.peek_clone(LexGoal::Div)?;
        match tok.kind {
            TokenKind::Semicolon => {
                self.next(LexGoal::Div)?;
                Ok(())
            }
            TokenKind::RightBrace | TokenKind::Eof => Ok(()),
            _ if tok.had_line_terminator_before => Ok(()),
            _ => Err(self.unexpected_expecting(&tok, ";")),
        }
    }

    // ── Scope collection ────────────────────────────────────────────────────

    fn declare_var(&mut self, name: &str) {
        self.scopes
            .last_mut()
            .expect("scope stack never empty")
            .var_names
            .push(name.to_string());
    }

    fn declare_fn(&mut self, f: Rc<FnLiteral>) {
        self.scopes
            .last_mut()
            .expect("scope stack never empty")
            .fn_decls
            .push(f);
    }

    // ── Identifier helpers ──────────────────────────────────────────────────

    /// Consume an Identifier token, enforcing the strict-mode reserved-word
    /// rule (§7.6.1.2).
    fn identifier(&mut self, what: &str) -> EngineResult<Token> {
        let tok = self.next(LexGoal::Div)?;
        match tok.kind {
            TokenKind::Identifier => {
                let name = tok.str_value().expect("identifier token carries name");
                if self.strict && is_strict_future_reserved(name) {
                    return Err(self.error_at(
                        format!("'{name}' is a reserved word in strict mode"),
                        tok.span.start,
                    ));
                }
                Ok(tok)
            }
            TokenKind::FutureReserved => Err(self.error_at(
                format!(
                    "'{}' is a reserved word",
                    tok.str_value().unwrap_or_default()
                ),
                tok.span.start,
            )),
            _ => Err(self.unexpected_expecting(&tok, what)),
        }
    }

    /// Consume an identifier in a *binding* position (var name, parameter,
    /// function name, catch parameter), which strict mode additionally
    /// forbids to be `eval` or `arguments` (§12.2.1, §13.1).
    fn binding_identifier(&mut self, what: &str) -> EngineResult<(String, Span)> {
        let tok = self.identifier(what)?;
        let name = tok.str_value().expect("identifier token").to_string();
        if self.strict && (name == "eval" || name == "arguments") {
            return Err(self.error_at(
                format!("'{name}' may not be bound in strict mode"),
                tok.span.start,
            ));
        }
        Ok((name, tok.span))
    }

    /// Check a literal token's strict-mode octal restriction (§7.8.3 /
    /// Annex B).
    fn check_octal(&self, tok: &Token) -> EngineResult<()> {
        if self.strict && tok.contains_octal {
            Err(self.error_at(
                LexErrorKind::OctalInStrict.to_string(),
                tok.span.start,
            ))
        } else {
            Ok(())
        }
    }

    /// Returns whether `expr` is a syntactically valid assignment /
    /// for-in / update target.
    fn is_valid_reference_target(expr: &Expr) -> bool {
        matches!(expr, Expr::Ident(_) | Expr::Member(_))
    }

    /// Early errors on a reference target: shape plus the strict-mode
    /// `eval`/`arguments` restriction (§11.13.1).
    fn check_reference_target(&self, expr: &Expr, what: &str) -> EngineResult<()> {
        if !Self::is_valid_reference_target(expr) {
            return Err(self.error_at(
                format!("invalid left-hand side in {what}"),
                expr.loc().start,
            ));
        }
        if self.strict {
            if let Expr::Ident(id) = expr {
                if id.name == "eval" || id.name == "arguments" {
                    return Err(self.error_at(
                        format!("cannot modify '{}' in strict mode", id.name),
                        expr.loc().start,
                    ));
                }
            }
        }
        Ok(())
    }

    fn span_from(&mut self, start: Position) -> Span {
        // The end of the previous token is not tracked separately; the
        // start of the upcoming token bounds every production we close.
        let end = self
            .ts
            .peek(LexGoal::Div)
            .map(|t| t.span.start)
            .unwrap_or(start);
        Span { start, end }
    }

    // ── Program / source elements ───────────────────────────────────────────

    /// Parse a complete Program (§14).
    pub fn parse_program(&mut self) -> EngineResult<Program> {
        let start = Position {
            offset: 0,
            line: 1,
            column: 1,
        };
        let mut body = Vec::new();
        self.strict = self.parse_directive_prologue(&mut body)?;
        while self.peek_kind(LexGoal::RegExp)? != TokenKind::Eof {
            body.push(self.parse_source_element()?);
        }
        let scope = mem::take(self.scopes.last_mut().expect("program scope"));
        Ok(Program {
            loc: self.span_from(start),
            strict: self.strict,
            body,
            scope,
        })
    }

    fn parse_source_element(&mut self) -> EngineResult<Stmt> {
        if self.peek_kind(LexGoal::RegExp)? == TokenKind::Function {
            let f = self.parse_function_literal(true)?;
            self.declare_fn(Rc::clone(&f));
            Ok(Stmt::FnDecl(f))
        } else {
            self.parse_statement()
        }
    }

    /// Parse a directive prologue (§14.1), pushing its statements into
    /// `body`. Returns `true` if a `"use strict"` directive was present.
    fn parse_directive_prologue(&mut self, body: &mut Vec<Stmt>) -> EngineResult<bool> {
        let mut strict = self.strict;
        let mut octal_at: Option<Position> = None;
        loop {
            if self.peek_kind(LexGoal::RegExp)? != TokenKind::StringLiteral {
                break;
            }
            let tok = self.peek_clone(LexGoal::RegExp)?;
            let stmt = self.parse_statement()?;
            // A directive is an ExpressionStatement consisting solely of
            // the string literal we peeked.
            let is_directive = matches!(
                &stmt,
                Stmt::Expr(es) if matches!(
                    es.expr.as_ref(),
                    Expr::Literal(lit) if lit.loc == tok.span
                )
            );
            body.push(stmt);
            if !is_directive {
                break;
            }
            if tok.contains_octal && octal_at.is_none() {
                octal_at = Some(tok.span.start);
            }
            // The verbatim lexeme decides; escaped spellings are not the
            // directive (§14.1).
            let lexeme = self.ts.lexeme(&tok.span);
            if lexeme == "\"use strict\"" || lexeme == "'use strict'" {
                strict = true;
                // Later prologue directives already parse under strict
                // rules (a prologue is strict as a whole once the
                // directive appears anywhere in it).
                self.strict = true;
            }
        }
        if strict {
            if let Some(pos) = octal_at {
                return Err(self.error_at(LexErrorKind::OctalInStrict.to_string(), pos));
            }
        }
        Ok(strict)
    }

    // ── Statements (§12) ────────────────────────────────────────────────────

    /// Parse a single Statement. Public entry point; also used internally.
    pub fn parse_statement(&mut self) -> EngineResult<Stmt> {
        match self.peek_kind(LexGoal::RegExp)? {
            TokenKind::LeftBrace => self.parse_block().map(Stmt::Block),
            TokenKind::Var => self.parse_variable_statement(),
            TokenKind::Semicolon => {
                let tok = self.next(LexGoal::Div)?;
                Ok(Stmt::Empty(EmptyStmt { loc: tok.span }))
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::Continue => self.parse_continue_statement(),
            TokenKind::Break => self.parse_break_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::With => self.parse_with_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Debugger => {
                let tok = self.next(LexGoal::Div)?;
                self.expect_semicolon()?;
                Ok(Stmt::Debugger(DebuggerStmt { loc: tok.span }))
            }
            // Function declarations at statement position are an extension
            // every mainstream ES5 engine supports; the binding hoists to
            // the enclosing function scope.
            TokenKind::Function => {
                let f = self.parse_function_literal(true)?;
                self.declare_fn(Rc::clone(&f));
                Ok(Stmt::FnDecl(f))
            }
            _ => self.parse_expression_or_labeled_statement(),
        }
    }

    fn parse_block(&mut self) -> EngineResult<BlockStmt> {
        let open = self.expect(TokenKind::LeftBrace, "{", LexGoal::Div)?;
        let mut body = Vec::new();
        while self.peek_kind(LexGoal::RegExp)? != TokenKind::RightBrace {
            if self.peek_kind(LexGoal::RegExp)? == TokenKind::Eof {
                let tok = self.peek_clone(LexGoal::Div)?;
                return Err(self.unexpected_expecting(&tok, "}"));
            }
            body.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RightBrace, "}", LexGoal::Div)?;
        Ok(BlockStmt {
            loc: self.span_from(open.span.start),
            body,
        })
    }

    fn parse_variable_statement(&mut self) -> EngineResult<Stmt> {
        let var = self.expect(TokenKind::Var, "var", LexGoal::Div)?;
        let declarations = self.parse_variable_declaration_list()?;
        self.expect_semicolon()?;
        Ok(Stmt::Var(VarStmt {
            loc: self.span_from(var.span.start),
            declarations,
        }))
    }

    fn parse_variable_declaration_list(&mut self) -> EngineResult<Vec<VarDecl>> {
        let mut declarations = Vec::new();
        loop {
            declarations.push(self.parse_variable_declaration()?);
            if !self.eat(TokenKind::Comma, LexGoal::Div)? {
                break;
            }
        }
        Ok(declarations)
    }

    fn parse_variable_declaration(&mut self) -> EngineResult<VarDecl> {
        let (name, span) = self.binding_identifier("variable name")?;
        self.declare_var(&name);
        let init = if self.eat(TokenKind::Equal, LexGoal::Div)? {
            Some(self.parse_assignment_expression()?)
        } else {
            None
        };
        Ok(VarDecl {
            loc: self.span_from(span.start),
            name,
            init,
        })
    }

    fn parse_if_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::If, "if", LexGoal::Div)?;
        self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
        let consequent = Box::new(self.parse_statement()?);
        let alternate = if self.eat(TokenKind::Else, LexGoal::Div)? {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Stmt::If(IfStmt {
            loc: self.span_from(kw.span.start),
            test: Box::new(test),
            consequent,
            alternate,
        }))
    }

    fn parse_iteration_body(&mut self) -> EngineResult<Box<Stmt>> {
        self.iteration_depth += 1;
        let body = self.parse_statement();
        self.iteration_depth -= 1;
        Ok(Box::new(body?))
    }

    fn parse_do_while_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::Do, "do", LexGoal::Div)?;
        let body = self.parse_iteration_body()?;
        self.expect(TokenKind::While, "while", LexGoal::Div)?;
        self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
        // §7.9.1: the semicolon after do-while is always insertable.
        self.eat(TokenKind::Semicolon, LexGoal::Div)?;
        Ok(Stmt::DoWhile(DoWhileStmt {
            loc: self.span_from(kw.span.start),
            body,
            test: Box::new(test),
        }))
    }

    fn parse_while_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::While, "while", LexGoal::Div)?;
        self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;
        let test = self.parse_expression()?;
        self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
        let body = self.parse_iteration_body()?;
        Ok(Stmt::While(WhileStmt {
            loc: self.span_from(kw.span.start),
            test: Box::new(test),
            body,
        }))
    }

    /// §12.6.3 / §12.6.4: parse the initializer in NoIn mode, then decide
    /// between `for (;;)` and `for (… in …)`.
    fn parse_for_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::For, "for", LexGoal::Div)?;
        self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;

        let init: Option<ForInit>;
        match self.peek_kind(LexGoal::RegExp)? {
            TokenKind::Semicolon => init = None,
            TokenKind::Var => {
                let var = self.next(LexGoal::Div)?;
                let saved = mem::replace(&mut self.no_in, true);
                let declarations = self.parse_variable_declaration_list();
                self.no_in = saved;
                let declarations = declarations?;
                if declarations.len() == 1 && self.peek_kind(LexGoal::Div)? == TokenKind::In {
                    self.next(LexGoal::Div)?;
                    let right = self.parse_expression()?;
                    self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
                    let body = self.parse_iteration_body()?;
                    let left = declarations.into_iter().next().expect("one declaration");
                    return Ok(Stmt::ForIn(ForInStmt {
                        loc: self.span_from(kw.span.start),
                        left: ForInLeft::Var(left),
                        right: Box::new(right),
                        body,
                    }));
                }
                init = Some(ForInit::Var(VarStmt {
                    loc: self.span_from(var.span.start),
                    declarations,
                }));
            }
            _ => {
                let saved = mem::replace(&mut self.no_in, true);
                let expr = self.parse_expression();
                self.no_in = saved;
                let expr = expr?;
                if self.peek_kind(LexGoal::Div)? == TokenKind::In {
                    self.check_reference_target(&expr, "for-in")?;
                    self.next(LexGoal::Div)?;
                    let right = self.parse_expression()?;
                    self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
                    let body = self.parse_iteration_body()?;
                    return Ok(Stmt::ForIn(ForInStmt {
                        loc: self.span_from(kw.span.start),
                        left: ForInLeft::Expr(Box::new(expr)),
                        right: Box::new(right),
                        body,
                    }));
                }
                init = Some(ForInit::Expr(Box::new(expr)));
            }
        }

        // ASI never applies inside the header: real semicolons required.
        self.expect(TokenKind::Semicolon, ";", LexGoal::Div)?;
        let test = if self.peek_kind(LexGoal::RegExp)? != TokenKind::Semicolon {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, ";", LexGoal::Div)?;
        let update = if self.peek_kind(LexGoal::RegExp)? != TokenKind::RightParen {
            Some(Box::new(self.parse_expression()?))
        } else {
            None
        };
        self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
        let body = self.parse_iteration_body()?;
        Ok(Stmt::For(ForStmt {
            loc: self.span_from(kw.span.start),
            init,
            test,
            update,
            body,
        }))
    }

    fn parse_continue_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::Continue, "continue", LexGoal::Div)?;
        let mut label = None;
        if !self.line_terminator_ahead()?
            && self.peek_kind(LexGoal::Div)? == TokenKind::Identifier
        {
            let tok = self.identifier("label")?;
            let name = tok.str_value().expect("identifier").to_string();
            match self.labels.iter().rev().find(|(n, _)| *n == name) {
                None => {
                    return Err(self.error_at(
                        format!("continue target '{name}' is not a visible label"),
                        tok.span.start,
                    ));
                }
                Some((_, LabelKind::Plain)) => {
                    return Err(self.error_at(
                        format!("continue target '{name}' does not label a loop"),
                        tok.span.start,
                    ));
                }
                Some(_) => {}
            }
            label = Some(name);
        } else if self.iteration_depth == 0 {
            return Err(self.error_at("continue outside of a loop", kw.span.start));
        }
        self.expect_semicolon()?;
        Ok(Stmt::Continue(ContinueStmt {
            loc: self.span_from(kw.span.start),
            label,
        }))
    }

    fn parse_break_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::Break, "break", LexGoal::Div)?;
        let mut label = None;
        if !self.line_terminator_ahead()?
            && self.peek_kind(LexGoal::Div)? == TokenKind::Identifier
        {
            let tok = self.identifier("label")?;
            let name = tok.str_value().expect("identifier").to_string();
            if !self.labels.iter().any(|(n, _)| *n == name) {
                return Err(self.error_at(
                    format!("break target '{name}' is not a visible label"),
                    tok.span.start,
                ));
            }
            label = Some(name);
        } else if self.iteration_depth == 0 && self.switch_depth == 0 {
            return Err(self.error_at("break outside of a loop or switch", kw.span.start));
        }
        self.expect_semicolon()?;
        Ok(Stmt::Break(BreakStmt {
            loc: self.span_from(kw.span.start),
            label,
        }))
    }

    fn parse_return_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::Return, "return", LexGoal::Div)?;
        if self.function_depth == 0 {
            return Err(self.error_at("return outside of a function", kw.span.start));
        }
        let mut argument = None;
        if !self.line_terminator_ahead()? {
            let kind = self.peek_kind(LexGoal::RegExp)?;
            if !matches!(
                kind,
                TokenKind::Semicolon | TokenKind::RightBrace | TokenKind::Eof
            ) {
                argument = Some(Box::new(self.parse_expression()?));
            }
        }
        self.expect_semicolon()?;
        Ok(Stmt::Return(ReturnStmt {
            loc: self.span_from(kw.span.start),
            argument,
        }))
    }

    fn parse_with_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::With, "with", LexGoal::Div)?;
        if self.strict {
            return Err(self.error_at(
                "the with statement is not allowed in strict mode",
                kw.span.start,
            ));
        }
        self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;
        let object = self.parse_expression()?;
        self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
        let body = Box::new(self.parse_statement()?);
        Ok(Stmt::With(WithStmt {
            loc: self.span_from(kw.span.start),
            object: Box::new(object),
            body,
        }))
    }

    fn parse_switch_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::Switch, "switch", LexGoal::Div)?;
        self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;
        let discriminant = self.parse_expression()?;
        self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
        self.expect(TokenKind::LeftBrace, "{", LexGoal::Div)?;
        self.switch_depth += 1;
        let result = self.parse_case_clauses();
        self.switch_depth -= 1;
        let cases = result?;
        self.expect(TokenKind::RightBrace, "}", LexGoal::Div)?;
        Ok(Stmt::Switch(SwitchStmt {
            loc: self.span_from(kw.span.start),
            discriminant: Box::new(discriminant),
            cases,
        }))
    }

    fn parse_case_clauses(&mut self) -> EngineResult<Vec<SwitchCase>> {
        let mut cases = Vec::new();
        let mut seen_default = false;
        while self.peek_kind(LexGoal::Div)? != TokenKind::RightBrace {
            let tok = self.peek_clone(LexGoal::Div)?;
            let test = match tok.kind {
                TokenKind::Case => {
                    self.next(LexGoal::Div)?;
                    Some(self.parse_expression()?)
                }
                TokenKind::Default => {
                    if seen_default {
                        return Err(
                            self.error_at("more than one default clause in switch", tok.span.start)
                        );
                    }
                    seen_default = true;
                    self.next(LexGoal::Div)?;
                    None
                }
                _ => return Err(self.unexpected_expecting(&tok, "case")),
            };
            self.expect(TokenKind::Colon, ":", LexGoal::Div)?;
            let mut consequent = Vec::new();
            loop {
                let kind = self.peek_kind(LexGoal::RegExp)?;
                if matches!(
                    kind,
                    TokenKind::Case | TokenKind::Default | TokenKind::RightBrace | TokenKind::Eof
                ) {
                    break;
                }
                consequent.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                loc: self.span_from(tok.span.start),
                test,
                consequent,
            });
        }
        Ok(cases)
    }

    fn parse_throw_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::Throw, "throw", LexGoal::Div)?;
        // Restricted production: no line terminator after `throw`.
        if self.line_terminator_ahead()? {
            return Err(self.error_at(
                "illegal newline after throw",
                kw.span.start,
            ));
        }
        let argument = self.parse_expression()?;
        self.expect_semicolon()?;
        Ok(Stmt::Throw(ThrowStmt {
            loc: self.span_from(kw.span.start),
            argument: Box::new(argument),
        }))
    }

    fn parse_try_statement(&mut self) -> EngineResult<Stmt> {
        let kw = self.expect(TokenKind::Try, "try", LexGoal::Div)?;
        let block = self.parse_block()?;
        let mut handler = None;
        if self.peek_kind(LexGoal::Div)? == TokenKind::Catch {
            let catch = self.next(LexGoal::Div)?;
            self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;
            let (param, _) = self.binding_identifier("catch parameter")?;
            self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
            let body = self.parse_block()?;
            handler = Some(CatchClause {
                loc: self.span_from(catch.span.start),
                param,
                body,
            });
        }
        let finalizer = if self.eat(TokenKind::Finally, LexGoal::Div)? {
            Some(self.parse_block()?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error_at("missing catch or finally after try", kw.span.start));
        }
        Ok(Stmt::Try(TryStmt {
            loc: self.span_from(kw.span.start),
            block,
            handler,
            finalizer,
        }))
    }

    /// Parse an ExpressionStatement, or a LabelledStatement when the
    /// expression turns out to be a lone identifier followed by `:`.
    fn parse_expression_or_labeled_statement(&mut self) -> EngineResult<Stmt> {
        let start = self.peek_clone(LexGoal::RegExp)?.span.start;
        let expr = self.parse_expression()?;
        if let Expr::Ident(id) = &expr {
            if self.peek_kind(LexGoal::Div)? == TokenKind::Colon {
                self.next(LexGoal::Div)?;
                return self.parse_labeled_tail(id.name.clone(), start);
            }
        }
        self.expect_semicolon()?;
        Ok(Stmt::Expr(ExprStmt {
            loc: self.span_from(start),
            expr: Box::new(expr),
        }))
    }

    fn parse_labeled_tail(&mut self, label: String, start: Position) -> EngineResult<Stmt> {
        if self.labels.iter().any(|(n, _)| *n == label) {
            return Err(self.error_at(format!("label '{label}' declared twice"), start));
        }
        let kind = match self.peek_kind(LexGoal::RegExp)? {
            TokenKind::Do | TokenKind::While | TokenKind::For => LabelKind::Iteration,
            TokenKind::Identifier => LabelKind::Chained,
            _ => LabelKind::Plain,
        };
        self.labels.push((label.clone(), kind));
        let body = self.parse_statement();
        self.labels.pop();
        Ok(Stmt::Labeled(LabeledStmt {
            loc: self.span_from(start),
            label,
            body: Box::new(body?),
        }))
    }

    // ── Functions (§13) ─────────────────────────────────────────────────────

    /// Public entry point: parse exactly one FunctionDeclaration.
    pub fn parse_function_declaration(&mut self) -> EngineResult<Rc<FnLiteral>> {
        self.parse_function_literal(true)
    }

    /// Parse `function name? ( params ) { body }`.
    fn parse_function_literal(&mut self, require_name: bool) -> EngineResult<Rc<FnLiteral>> {
        let kw = self.expect(TokenKind::Function, "function", LexGoal::Div)?;
        let mut name = None;
        let mut name_span = kw.span;
        if self.peek_kind(LexGoal::Div)? == TokenKind::Identifier {
            let tok = self.identifier("function name")?;
            name_span = tok.span;
            name = Some(tok.str_value().expect("identifier").to_string());
        } else if require_name {
            let tok = self.peek_clone(LexGoal::Div)?;
            return Err(self.unexpected_expecting(&tok, "function name"));
        }

        self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;
        let mut params = Vec::new();
        let mut param_spans = Vec::new();
        if self.peek_kind(LexGoal::Div)? != TokenKind::RightParen {
            loop {
                let tok = self.identifier("parameter name")?;
                params.push(tok.str_value().expect("identifier").to_string());
                param_spans.push(tok.span);
                if !self.eat(TokenKind::Comma, LexGoal::Div)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;

        let (body, strict, scope) = self.parse_function_body()?;

        // §13.1: these are checked against the *body's* strictness, which
        // may come from its own directive prologue.
        if strict {
            if let Some(n) = &name {
                if n == "eval" || n == "arguments" {
                    return Err(self.error_at(
                        format!("function may not be named '{n}' in strict mode"),
                        name_span.start,
                    ));
                }
                if is_strict_future_reserved(n) {
                    return Err(self.error_at(
                        format!("'{n}' is a reserved word in strict mode"),
                        name_span.start,
                    ));
                }
            }
            for (i, p) in params.iter().enumerate() {
                if p == "eval" || p == "arguments" {
                    return Err(self.error_at(
                        format!("parameter may not be named '{p}' in strict mode"),
                        param_spans[i].start,
                    ));
                }
                if is_strict_future_reserved(p) {
                    return Err(self.error_at(
                        format!("'{p}' is a reserved word in strict mode"),
                        param_spans[i].start,
                    ));
                }
                if params[..i].contains(p) {
                    return Err(self.error_at(
                        format!("duplicate parameter name '{p}' in strict mode"),
                        param_spans[i].start,
                    ));
                }
            }
        }

        Ok(Rc::new(FnLiteral {
            loc: self.span_from(kw.span.start),
            name,
            params,
            body,
            strict,
            scope,
        }))
    }

    /// Parse `{ FunctionBody }`, managing strictness, scope collection, and
    /// the label/iteration context reset a function boundary implies.
    fn parse_function_body(&mut self) -> EngineResult<(Vec<Stmt>, bool, ScopeData)> {
        self.expect(TokenKind::LeftBrace, "{", LexGoal::Div)?;

        let outer_strict = self.strict;
        let outer_labels = mem::take(&mut self.labels);
        let outer_iteration = mem::replace(&mut self.iteration_depth, 0);
        let outer_switch = mem::replace(&mut self.switch_depth, 0);
        self.function_depth += 1;
        self.scopes.push(ScopeData::default());

        let result = (|| -> EngineResult<(Vec<Stmt>, bool)> {
            let mut body = Vec::new();
            let strict = self.parse_directive_prologue(&mut body)?;
            self.strict = strict;
            while self.peek_kind(LexGoal::RegExp)? != TokenKind::RightBrace {
                if self.peek_kind(LexGoal::RegExp)? == TokenKind::Eof {
                    let tok = self.peek_clone(LexGoal::Div)?;
                    return Err(self.unexpected_expecting(&tok, "}"));
                }
                body.push(self.parse_source_element()?);
            }
            self.expect(TokenKind::RightBrace, "}", LexGoal::Div)?;
            Ok((body, strict))
        })();

        let scope = self.scopes.pop().expect("function scope");
        self.function_depth -= 1;
        self.strict = outer_strict;
        self.labels = outer_labels;
        self.iteration_depth = outer_iteration;
        self.switch_depth = outer_switch;

        let (body, strict) = result?;
        Ok((body, strict, scope))
    }

    // ── Expressions (§11) ───────────────────────────────────────────────────

    /// Parse a full Expression (the comma operator level). Public entry
    /// point; also used internally.
    pub fn parse_expression(&mut self) -> EngineResult<Expr> {
        let start = self.peek_clone(LexGoal::RegExp)?.span.start;
        let first = self.parse_assignment_expression()?;
        if self.peek_kind(LexGoal::Div)? != TokenKind::Comma {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat(TokenKind::Comma, LexGoal::Div)? {
            exprs.push(self.parse_assignment_expression()?);
        }
        Ok(Expr::Sequence(SeqExpr {
            loc: self.span_from(start),
            exprs,
        }))
    }

    fn parse_assignment_expression(&mut self) -> EngineResult<Expr> {
        let start = self.peek_clone(LexGoal::RegExp)?.span.start;
        let expr = self.parse_conditional_expression()?;
        let Some(op) = assign_op_for(self.peek_kind(LexGoal::Div)?) else {
            return Ok(expr);
        };
        self.check_reference_target(&expr, "assignment")?;
        self.next(LexGoal::Div)?;
        let value = self.parse_assignment_expression()?;
        Ok(Expr::Assign(AssignExpr {
            loc: self.span_from(start),
            op,
            target: Box::new(expr),
            value: Box::new(value),
        }))
    }

    fn parse_conditional_expression(&mut self) -> EngineResult<Expr> {
        let start = self.peek_clone(LexGoal::RegExp)?.span.start;
        let test = self.parse_binary_expression(1)?;
        if !self.eat(TokenKind::Question, LexGoal::Div)? {
            return Ok(test);
        }
        // §11.12: the consequent re-admits `in` even inside a NoIn parse.
        let saved = mem::replace(&mut self.no_in, false);
        let consequent = self.parse_assignment_expression();
        self.no_in = saved;
        let consequent = consequent?;
        self.expect(TokenKind::Colon, ":", LexGoal::Div)?;
        let alternate = self.parse_assignment_expression()?;
        Ok(Expr::Conditional(CondExpr {
            loc: self.span_from(start),
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        }))
    }

    /// Precedence-climbing loop over the binary operator levels, `&&`/`||`
    /// included (they form [`LogicalExpr`] nodes for short-circuiting).
    fn parse_binary_expression(&mut self, min_prec: u8) -> EngineResult<Expr> {
        let start = self.peek_clone(LexGoal::RegExp)?.span.start;
        let mut left = self.parse_unary_expression()?;
        loop {
            let kind = self.peek_kind(LexGoal::Div)?;
            let (logical, prec) = match kind {
                TokenKind::PipePipe => (Some(LogicalOp::Or), 1),
                TokenKind::AmpersandAmpersand => (Some(LogicalOp::And), 2),
                _ => (None, 0),
            };
            if let Some(op) = logical {
                if prec < min_prec {
                    break;
                }
                self.next(LexGoal::Div)?;
                let right = self.parse_binary_expression(prec + 1)?;
                left = Expr::Logical(LogicalExpr {
                    loc: self.span_from(start),
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                });
                continue;
            }
            let Some((op, prec)) = binary_op_for(kind) else {
                break;
            };
            if op == BinaryOp::In && self.no_in {
                break;
            }
            if prec < min_prec {
                break;
            }
            self.next(LexGoal::Div)?;
            let right = self.parse_binary_expression(prec + 1)?;
            left = Expr::Binary(BinaryExpr {
                loc: self.span_from(start),
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
        }
        Ok(left)
    }

    fn parse_unary_expression(&mut self) -> EngineResult<Expr> {
        let tok = self.peek_clone(LexGoal::RegExp)?;
        let op = match tok.kind {
            TokenKind::Delete => Some(UnaryOp::Delete),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.next(LexGoal::Div)?;
            let argument = self.parse_unary_expression()?;
            if op == UnaryOp::Delete && self.strict {
                if matches!(argument, Expr::Ident(_)) {
                    return Err(self.error_at(
                        "delete of an unqualified identifier in strict mode",
                        tok.span.start,
                    ));
                }
            }
            return Ok(Expr::Unary(UnaryExpr {
                loc: self.span_from(tok.span.start),
                op,
                argument: Box::new(argument),
            }));
        }
        if matches!(tok.kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
            let op = if tok.kind == TokenKind::PlusPlus {
                UpdateOp::Inc
            } else {
                UpdateOp::Dec
            };
            self.next(LexGoal::Div)?;
            let argument = self.parse_unary_expression()?;
            self.check_reference_target(&argument, "prefix operation")?;
            return Ok(Expr::Update(UpdateExpr {
                loc: self.span_from(tok.span.start),
                op,
                prefix: true,
                argument: Box::new(argument),
            }));
        }
        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> EngineResult<Expr> {
        let start = self.peek_clone(LexGoal::RegExp)?.span.start;
        let expr = self.parse_left_hand_side_expression(true)?;
        // Restricted production: no line terminator before postfix ++/--.
        if !self.line_terminator_ahead()? {
            let kind = self.peek_kind(LexGoal::Div)?;
            if matches!(kind, TokenKind::PlusPlus | TokenKind::MinusMinus) {
                self.check_reference_target(&expr, "postfix operation")?;
                self.next(LexGoal::Div)?;
                let op = if kind == TokenKind::PlusPlus {
                    UpdateOp::Inc
                } else {
                    UpdateOp::Dec
                };
                return Ok(Expr::Update(UpdateExpr {
                    loc: self.span_from(start),
                    op,
                    prefix: false,
                    argument: Box::new(expr),
                }));
            }
        }
        Ok(expr)
    }

    /// MemberExpression / NewExpression / CallExpression (§11.2).
    fn parse_left_hand_side_expression(&mut self, allow_call: bool) -> EngineResult<Expr> {
        let start = self.peek_clone(LexGoal::RegExp)?.span.start;
        let mut expr = match self.peek_kind(LexGoal::RegExp)? {
            TokenKind::New => self.parse_new_expression()?,
            TokenKind::Function => Expr::Function(self.parse_function_literal(false)?),
            _ => self.parse_primary_expression()?,
        };

        loop {
            match self.peek_kind(LexGoal::Div)? {
                TokenKind::Dot => {
                    self.next(LexGoal::Div)?;
                    let name = self.identifier_name("property name")?;
                    expr = Expr::Member(MemberExpr {
                        loc: self.span_from(start),
                        object: Box::new(expr),
                        property: MemberKey::Dot(name),
                    });
                }
                TokenKind::LeftBracket => {
                    self.next(LexGoal::Div)?;
                    let key = self.parse_in_allowed_expression()?;
                    self.expect(TokenKind::RightBracket, "]", LexGoal::Div)?;
                    expr = Expr::Member(MemberExpr {
                        loc: self.span_from(start),
                        object: Box::new(expr),
                        property: MemberKey::Computed(Box::new(key)),
                    });
                }
                TokenKind::LeftParen if allow_call => {
                    let arguments = self.parse_arguments()?;
                    expr = Expr::Call(CallExpr {
                        loc: self.span_from(start),
                        callee: Box::new(expr),
                        arguments,
                    });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_new_expression(&mut self) -> EngineResult<Expr> {
        let kw = self.expect(TokenKind::New, "new", LexGoal::Div)?;
        let callee = self.parse_left_hand_side_expression(false)?;
        let arguments = if self.peek_kind(LexGoal::Div)? == TokenKind::LeftParen {
            self.parse_arguments()?
        } else {
            Vec::new()
        };
        Ok(Expr::New(NewExpr {
            loc: self.span_from(kw.span.start),
            callee: Box::new(callee),
            arguments,
        }))
    }

    fn parse_arguments(&mut self) -> EngineResult<Vec<Expr>> {
        self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;
        let mut arguments = Vec::new();
        if self.peek_kind(LexGoal::RegExp)? != TokenKind::RightParen {
            loop {
                arguments.push(self.parse_assignment_expression()?);
                if !self.eat(TokenKind::Comma, LexGoal::Div)? {
                    break;
                }
            }
        }
        self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
        Ok(arguments)
    }

    /// An IdentifierName position: reserved words are plain names here.
    fn identifier_name(&mut self, what: &str) -> EngineResult<String> {
        let tok = self.next(LexGoal::Div)?;
        if let Some(word) = token_word(tok.kind) {
            return Ok(word.to_string());
        }
        match tok.kind {
            TokenKind::Identifier | TokenKind::FutureReserved => {
                Ok(tok.str_value().expect("name token").to_string())
            }
            _ => Err(self.unexpected_expecting(&tok, what)),
        }
    }

    /// Parse an Expression with `in` re-admitted (parenthesized and
    /// bracketed positions).
    fn parse_in_allowed_expression(&mut self) -> EngineResult<Expr> {
        let saved = mem::replace(&mut self.no_in, false);
        let result = self.parse_expression();
        self.no_in = saved;
        result
    }

    fn parse_primary_expression(&mut self) -> EngineResult<Expr> {
        let tok = self.peek_clone(LexGoal::RegExp)?;
        match tok.kind {
            TokenKind::This => {
                self.next(LexGoal::Div)?;
                Ok(Expr::This(ThisExpr { loc: tok.span }))
            }
            TokenKind::Identifier => {
                let tok = self.identifier("expression")?;
                Ok(Expr::Ident(Ident {
                    loc: tok.span,
                    name: tok.str_value().expect("identifier").to_string(),
                }))
            }
            TokenKind::Null => {
                self.next(LexGoal::Div)?;
                Ok(Expr::Literal(Lit {
                    loc: tok.span,
                    value: LitValue::Null,
                }))
            }
            TokenKind::True | TokenKind::False => {
                self.next(LexGoal::Div)?;
                Ok(Expr::Literal(Lit {
                    loc: tok.span,
                    value: LitValue::Bool(tok.kind == TokenKind::True),
                }))
            }
            TokenKind::NumericLiteral => {
                let tok = self.next(LexGoal::Div)?;
                self.check_octal(&tok)?;
                Ok(Expr::Literal(Lit {
                    loc: tok.span,
                    value: LitValue::Number(tok.number_value().expect("numeric token")),
                }))
            }
            TokenKind::StringLiteral => {
                let tok = self.next(LexGoal::Div)?;
                self.check_octal(&tok)?;
                let value = match tok.value {
                    TokenValue::Str(s) => s,
                    _ => unreachable!("string token carries a string"),
                };
                Ok(Expr::Literal(Lit {
                    loc: tok.span,
                    value: LitValue::String(value),
                }))
            }
            TokenKind::RegExpLiteral => {
                let tok = self.next(LexGoal::RegExp)?;
                let (pattern, flags) = match tok.value {
                    TokenValue::Regex { pattern, flags } => (pattern, flags),
                    _ => unreachable!("regex token carries pattern and flags"),
                };
                Ok(Expr::Literal(Lit {
                    loc: tok.span,
                    value: LitValue::Regex { pattern, flags },
                }))
            }
            TokenKind::LeftBracket => self.parse_array_literal(),
            TokenKind::LeftBrace => self.parse_object_literal(),
            TokenKind::LeftParen => {
                self.next(LexGoal::Div)?;
                let expr = self.parse_in_allowed_expression()?;
                self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
                Ok(expr)
            }
            _ => Err(self.unexpected(&tok)),
        }
    }

    fn parse_array_literal(&mut self) -> EngineResult<Expr> {
        let open = self.expect(TokenKind::LeftBracket, "[", LexGoal::Div)?;
        let mut elements = Vec::new();
        loop {
            match self.peek_kind(LexGoal::RegExp)? {
                TokenKind::RightBracket => break,
                TokenKind::Comma => {
                    // Elision.
                    self.next(LexGoal::Div)?;
                    elements.push(None);
                }
                _ => {
                    elements.push(Some(self.parse_assignment_expression()?));
                    if self.peek_kind(LexGoal::Div)? != TokenKind::RightBracket {
                        self.expect(TokenKind::Comma, ",", LexGoal::Div)?;
                    }
                }
            }
        }
        self.expect(TokenKind::RightBracket, "]", LexGoal::Div)?;
        Ok(Expr::Array(ArrayLit {
            loc: self.span_from(open.span.start),
            elements,
        }))
    }

    fn parse_object_literal(&mut self) -> EngineResult<Expr> {
        let open = self.expect(TokenKind::LeftBrace, "{", LexGoal::Div)?;
        let mut properties: Vec<PropertyDef> = Vec::new();
        // name -> (has_data, has_get, has_set), for §11.1.5 early errors.
        let mut seen: Vec<(String, bool, bool, bool)> = Vec::new();

        while self.peek_kind(LexGoal::Div)? != TokenKind::RightBrace {
            let prop = self.parse_property_definition()?;
            let name = prop.key.as_property_name();
            let (is_data, is_get, is_set) = match &prop.value {
                PropertyValue::Init(_) => (true, false, false),
                PropertyValue::Get(_) => (false, true, false),
                PropertyValue::Set(_) => (false, false, true),
            };
            match seen.iter_mut().find(|(n, ..)| *n == name) {
                Some((_, data, get, set)) => {
                    let conflict = (is_data && *data && self.strict)
                        || (is_data && (*get || *set))
                        || (!is_data && *data)
                        || (is_get && *get)
                        || (is_set && *set);
                    if conflict {
                        return Err(self.error_at(
                            format!("conflicting definitions of property '{name}'"),
                            prop.loc.start,
                        ));
                    }
                    *data |= is_data;
                    *get |= is_get;
                    *set |= is_set;
                }
                None => seen.push((name, is_data, is_get, is_set)),
            }
            properties.push(prop);
            if self.peek_kind(LexGoal::Div)? != TokenKind::RightBrace {
                self.expect(TokenKind::Comma, ",", LexGoal::Div)?;
            }
        }
        self.expect(TokenKind::RightBrace, "}", LexGoal::Div)?;
        Ok(Expr::Object(ObjectLit {
            loc: self.span_from(open.span.start),
            properties,
        }))
    }

    fn parse_property_definition(&mut self) -> EngineResult<PropertyDef> {
        let tok = self.peek_clone(LexGoal::Div)?;
        let start = tok.span.start;

        // `get` / `set` introduce an accessor unless followed by `:`
        // (where they are ordinary keys).
        if tok.kind == TokenKind::Identifier {
            let word = tok.str_value().unwrap_or_default().to_string();
            if word == "get" || word == "set" {
                self.next(LexGoal::Div)?;
                if self.peek_kind(LexGoal::Div)? != TokenKind::Colon
                    && self.peek_kind(LexGoal::Div)? != TokenKind::Comma
                    && self.peek_kind(LexGoal::Div)? != TokenKind::RightBrace
                    && self.peek_kind(LexGoal::Div)? != TokenKind::LeftParen
                {
                    let key = self.parse_property_key()?;
                    let f = self.parse_accessor_body(word == "get", start)?;
                    let value = if word == "get" {
                        PropertyValue::Get(f)
                    } else {
                        PropertyValue::Set(f)
                    };
                    return Ok(PropertyDef {
                        loc: self.span_from(start),
                        key,
                        value,
                    });
                }
                // Plain property whose key is `get` / `set`.
                self.expect(TokenKind::Colon, ":", LexGoal::Div)?;
                let value = self.parse_assignment_expression()?;
                return Ok(PropertyDef {
                    loc: self.span_from(start),
                    key: PropertyKey::Ident(word),
                    value: PropertyValue::Init(value),
                });
            }
        }

        let key = self.parse_property_key()?;
        self.expect(TokenKind::Colon, ":", LexGoal::Div)?;
        let value = self.parse_assignment_expression()?;
        Ok(PropertyDef {
            loc: self.span_from(start),
            key,
            value: PropertyValue::Init(value),
        })
    }

    /// PropertyName :: IdentifierName | StringLiteral | NumericLiteral.
    fn parse_property_key(&mut self) -> EngineResult<PropertyKey> {
        let tok = self.next(LexGoal::Div)?;
        if let Some(word) = token_word(tok.kind) {
            return Ok(PropertyKey::Ident(word.to_string()));
        }
        match tok.kind {
            TokenKind::Identifier | TokenKind::FutureReserved => Ok(PropertyKey::Ident(
                tok.str_value().expect("name token").to_string(),
            )),
            TokenKind::StringLiteral => {
                self.check_octal(&tok)?;
                match tok.value {
                    TokenValue::Str(s) => Ok(PropertyKey::String(s)),
                    _ => unreachable!("string token carries a string"),
                }
            }
            TokenKind::NumericLiteral => {
                self.check_octal(&tok)?;
                Ok(PropertyKey::Number(
                    tok.number_value().expect("numeric token"),
                ))
            }
            _ => Err(self.unexpected_expecting(&tok, "property name")),
        }
    }

    /// Parse `( params ) { body }` for a getter (no parameters) or setter
    /// (exactly one).
    fn parse_accessor_body(&mut self, is_getter: bool, start: Position) -> EngineResult<Rc<FnLiteral>> {
        self.expect(TokenKind::LeftParen, "(", LexGoal::Div)?;
        let mut params = Vec::new();
        if !is_getter {
            let (name, _) = self.binding_identifier("setter parameter")?;
            params.push(name);
        }
        self.expect(TokenKind::RightParen, ")", LexGoal::Div)?;
        let (body, strict, scope) = self.parse_function_body()?;
        if strict {
            if let Some(p) = params.iter().find(|p| *p == "eval" || *p == "arguments") {
                return Err(self.error_at(
                    format!("parameter may not be named '{p}' in strict mode"),
                    start,
                ));
            }
        }
        Ok(Rc::new(FnLiteral {
            loc: self.span_from(start),
            name: None,
            params,
            body,
            strict,
            scope,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Convenience constructors
// ─────────────────────────────────────────────────────────────────────────────

/// Parse `source` into a [`Program`].
pub fn parse_string(source: &str, filename: Option<&str>) -> EngineResult<Program> {
    Parser::new(source, filename).parse_program()
}

/// Read `path` as UTF-8 and parse it into a [`Program`].
pub fn parse_file(path: &std::path::Path) -> EngineResult<Program> {
    let source = std::fs::read_to_string(path)?;
    parse_string(&source, path.to_str())
}
