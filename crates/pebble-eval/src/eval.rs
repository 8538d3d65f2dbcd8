//! The tree-walking evaluator.
//!
//! # Non-local control flow without exceptions
//!
//! A `return` statement has to unwind out of however many nested blocks,
//! loops, and `if`s lie between it and the function call it's returning
//! from. A host-exception-based interpreter would model that with a
//! `panic`/`catch_unwind` pair or a custom `Result`-incompatible error
//! type; instead every statement visitor here returns
//! `Result<Control, RuntimeError>`, and [`Control::Returning`] is just
//! data that every caller up the chain explicitly checks for and
//! re-propagates. A `return` inside three nested `if`s is three ordinary
//! `match` arms forwarding the same value, not a special unwinding
//! mechanism — the call stack is the Rust call stack the whole way up.

use rustc_hash::FxHashMap;

use pebble_par::ast::{
    ArrayDecl, Assign, BinOpKind, Block, Expr, For, FunctionDecl, If, LiteralValue, Program, Return, Stmt, TopDecl,
    UnaryOpKind, VarDecl, While,
};
use pebble_util::{Interner, RuntimeError, Symbol};

use crate::builtins;
use crate::env::Env;
use crate::value::Value;

/// What a statement did, as seen by whoever evaluated it.
pub enum Control {
    /// Ran to completion; keep going with the next statement.
    Continue,
    /// A `return` is ascending through the caller. Every statement
    /// visitor that receives this from a sub-statement must stop
    /// executing its own remaining work and forward it unchanged.
    Returning(Value),
}

pub struct Evaluator<'a> {
    interner: &'a Interner,
    functions: FxHashMap<Symbol, &'a FunctionDecl>,
    globals: Env,
}

impl<'a> Evaluator<'a> {
    /// Runs a whole program: registers every top-level function and
    /// global variable, then calls `main` with no arguments.
    ///
    /// Mirrors the reference interpreter's two-pass structure — globals
    /// and function signatures are all visible to every function body,
    /// regardless of where in the file they're declared, before any
    /// statement actually executes.
    pub fn run(program: &'a Program, interner: &'a Interner) -> Result<Value, RuntimeError> {
        let globals = Env::root();
        let mut functions = FxHashMap::default();

        for decl in &program.declarations {
            if let TopDecl::Function(f) = decl {
                functions.insert(f.name, f);
            }
        }

        let mut evaluator = Evaluator {
            interner,
            functions,
            globals: globals.clone(),
        };

        for decl in &program.declarations {
            match decl {
                TopDecl::Var(v) => evaluator.eval_var_decl(&globals, v)?,
                TopDecl::Array(a) => evaluator.eval_array_decl(&globals, a)?,
                TopDecl::Function(_) => {}
            }
        }

        let main = *evaluator
            .functions
            .values()
            .find(|f| interner.resolve(f.name) == "main")
            .ok_or_else(|| RuntimeError::new("no main function found"))?;

        evaluator.call_function(main, Vec::new())
    }

    fn call_function(&mut self, func: &'a FunctionDecl, args: Vec<Value>) -> Result<Value, RuntimeError> {
        if args.len() != func.params.len() {
            return Err(RuntimeError::new(format!(
                "function '{}' expects {} argument(s), got {}",
                self.interner.resolve(func.name),
                func.params.len(),
                args.len()
            )));
        }

        // Functions close over globals only, never over the caller's
        // locals — this is the frame `call_function` binds parameters
        // into, one level below globals.
        let param_frame = self.globals.child();
        for (param, arg) in func.params.iter().zip(args) {
            param_frame.define(param.name, arg);
        }

        match self.eval_block(&param_frame, &func.body)? {
            Control::Returning(value) => Ok(value),
            Control::Continue => Ok(Value::Absent),
        }
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn eval_block(&mut self, env: &Env, block: &'a Block) -> Result<Control, RuntimeError> {
        let inner = env.child();
        for stmt in &block.statements {
            match self.eval_stmt(&inner, stmt)? {
                Control::Continue => {}
                returning => return Ok(returning),
            }
        }
        Ok(Control::Continue)
    }

    fn eval_stmt(&mut self, env: &Env, stmt: &'a Stmt) -> Result<Control, RuntimeError> {
        match stmt {
            Stmt::VarDecl(v) => {
                self.eval_var_decl(env, v)?;
                Ok(Control::Continue)
            }
            Stmt::ArrayDecl(a) => {
                self.eval_array_decl(env, a)?;
                Ok(Control::Continue)
            }
            Stmt::Block(b) => self.eval_block(env, b),
            Stmt::Assign(a) => {
                self.eval_assign(env, a)?;
                Ok(Control::Continue)
            }
            Stmt::If(i) => self.eval_if(env, i),
            Stmt::While(w) => self.eval_while(env, w),
            Stmt::For(f) => self.eval_for(env, f),
            Stmt::Return(r) => self.eval_return(env, r),
            Stmt::ExprStmt(e) => {
                self.eval_expr(env, e)?;
                Ok(Control::Continue)
            }
        }
    }

    fn eval_var_decl(&mut self, env: &Env, decl: &'a VarDecl) -> Result<(), RuntimeError> {
        let value = match &decl.init {
            Some(expr) => self.eval_expr(env, expr)?,
            None => Value::default_for(decl.ty),
        };
        env.define(decl.name, value);
        Ok(())
    }

    fn eval_array_decl(&mut self, env: &Env, decl: &'a ArrayDecl) -> Result<(), RuntimeError> {
        match decl {
            ArrayDecl::Sized { ty, name, size, .. } => {
                let len = (*size).max(0) as usize;
                let elements = vec![Value::default_for(*ty); len];
                env.define(*name, Value::new_array(elements));
            }
            ArrayDecl::Initialized { name, initializers, .. } => {
                let mut elements = Vec::with_capacity(initializers.len());
                for expr in initializers {
                    elements.push(self.eval_expr(env, expr)?);
                }
                env.define(*name, Value::new_array(elements));
            }
        }
        Ok(())
    }

    fn eval_assign(&mut self, env: &Env, assign: &'a Assign) -> Result<(), RuntimeError> {
        let value = self.eval_expr(env, &assign.value)?;

        if let Some(index_expr) = &assign.index {
            let index = self.eval_index(env, index_expr)?;
            let current = env
                .get(assign.target_name)
                .ok_or_else(|| RuntimeError::new(format!("undefined variable '{}'", self.name(assign.target_name))))?;
            let array = current
                .as_array()
                .ok_or_else(|| RuntimeError::new(format!("'{}' is not an array", self.name(assign.target_name))))?;
            let mut elements = array.borrow_mut();
            let len = elements.len() as i64;
            if index < 0 || index >= len {
                return Err(RuntimeError::new(format!("array index out of bounds: {index}")));
            }
            elements[index as usize] = value;
        } else if !env.assign(assign.target_name, value) {
            return Err(RuntimeError::new(format!(
                "undefined variable '{}'",
                self.name(assign.target_name)
            )));
        }
        Ok(())
    }

    fn eval_if(&mut self, env: &Env, stmt: &'a If) -> Result<Control, RuntimeError> {
        if self.eval_bool(env, &stmt.condition)? {
            self.eval_stmt(env, &stmt.then_branch)
        } else if let Some(else_branch) = &stmt.else_branch {
            self.eval_stmt(env, else_branch)
        } else {
            Ok(Control::Continue)
        }
    }

    fn eval_while(&mut self, env: &Env, stmt: &'a While) -> Result<Control, RuntimeError> {
        while self.eval_bool(env, &stmt.condition)? {
            match self.eval_stmt(env, &stmt.body)? {
                Control::Continue => {}
                returning => return Ok(returning),
            }
        }
        Ok(Control::Continue)
    }

    fn eval_for(&mut self, env: &Env, stmt: &'a For) -> Result<Control, RuntimeError> {
        let loop_env = env.child();

        if let Some(init) = &stmt.init {
            self.eval_stmt(&loop_env, init)?;
        }

        loop {
            if let Some(condition) = &stmt.condition {
                if !self.eval_bool(&loop_env, condition)? {
                    break;
                }
            }
            // A `for` with no condition loops forever unless `return`
            // ascends out of it — Pebble has no `break` statement.

            match self.eval_stmt(&loop_env, &stmt.body)? {
                Control::Continue => {}
                returning => return Ok(returning),
            }

            if let Some(update) = &stmt.update {
                self.eval_stmt(&loop_env, update)?;
            }
        }
        Ok(Control::Continue)
    }

    fn eval_return(&mut self, env: &Env, stmt: &'a Return) -> Result<Control, RuntimeError> {
        let value = match &stmt.value {
            Some(expr) => self.eval_expr(env, expr)?,
            None => Value::Absent,
        };
        Ok(Control::Returning(value))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    /// The truth value of a condition or `&&`/`||` operand: integers are
    /// truthy iff nonzero, strings iff nonempty, booleans as themselves.
    /// Arrays and `void` results have no truth value.
    fn eval_bool(&mut self, env: &Env, expr: &'a Expr) -> Result<bool, RuntimeError> {
        let value = self.eval_expr(env, expr)?;
        value
            .truthy()
            .ok_or_else(|| RuntimeError::new(format!("{} has no truth value", value.type_name())))
    }

    fn eval_index(&mut self, env: &Env, expr: &'a Expr) -> Result<i64, RuntimeError> {
        match self.eval_expr(env, expr)? {
            Value::Int(n) => Ok(n),
            other => Err(RuntimeError::new(format!(
                "expected an int array index, got {}",
                other.type_name()
            ))),
        }
    }

    fn eval_expr(&mut self, env: &Env, expr: &'a Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal { value, .. } => Ok(self.eval_literal(value)),
            Expr::Var { name, .. } => env
                .get(*name)
                .ok_or_else(|| RuntimeError::new(format!("undefined variable '{}'", self.name(*name)))),
            Expr::ArrayAccess { name, index, .. } => {
                let idx = self.eval_index(env, index)?;
                let current = env
                    .get(*name)
                    .ok_or_else(|| RuntimeError::new(format!("undefined variable '{}'", self.name(*name))))?;
                let array = current
                    .as_array()
                    .ok_or_else(|| RuntimeError::new(format!("'{}' is not an array", self.name(*name))))?;
                let elements = array.borrow();
                let len = elements.len() as i64;
                if idx < 0 || idx >= len {
                    return Err(RuntimeError::new(format!("array index out of bounds: {idx}")));
                }
                Ok(elements[idx as usize].clone())
            }
            Expr::UnaryOp { op, operand, .. } => {
                let value = self.eval_expr(env, operand)?;
                self.eval_unary(*op, value)
            }
            Expr::BinOp { left, op, right, .. } => self.eval_binop(env, *op, left, right),
            Expr::Call { name, args, .. } => self.eval_call(env, *name, args),
        }
    }

    fn eval_literal(&self, literal: &LiteralValue) -> Value {
        match literal {
            LiteralValue::Int(n) => Value::Int(*n),
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Str(sym) => Value::Str(self.interner.resolve(*sym).into()),
        }
    }

    fn eval_unary(&self, op: UnaryOpKind, value: Value) -> Result<Value, RuntimeError> {
        match op {
            // `!` negates truthiness, not strictly a bool operand.
            UnaryOpKind::Not => value
                .truthy()
                .map(|b| Value::Bool(!b))
                .ok_or_else(|| RuntimeError::new(format!("{} has no truth value", value.type_name()))),
            UnaryOpKind::Neg => match value {
                Value::Int(n) => Ok(Value::Int(-n)),
                other => Err(RuntimeError::new(format!("unary '-' expects an int, got {}", other.type_name()))),
            },
            UnaryOpKind::Pos => match value {
                Value::Int(n) => Ok(Value::Int(n)),
                other => Err(RuntimeError::new(format!("unary '+' expects an int, got {}", other.type_name()))),
            },
        }
    }

    fn eval_binop(&mut self, env: &Env, op: BinOpKind, left: &'a Expr, right: &'a Expr) -> Result<Value, RuntimeError> {
        // Short-circuit before evaluating the right-hand side at all.
        if op == BinOpKind::And {
            return if self.eval_bool(env, left)? {
                Ok(Value::Bool(self.eval_bool(env, right)?))
            } else {
                Ok(Value::Bool(false))
            };
        }
        if op == BinOpKind::Or {
            return if self.eval_bool(env, left)? {
                Ok(Value::Bool(true))
            } else {
                Ok(Value::Bool(self.eval_bool(env, right)?))
            };
        }

        let lhs = self.eval_expr(env, left)?;
        let rhs = self.eval_expr(env, right)?;

        match op {
            BinOpKind::Add => self.eval_add(lhs, rhs),
            BinOpKind::Sub => self.numeric_op(lhs, rhs, "-", |a, b| Ok(a - b)),
            BinOpKind::Mul => self.numeric_op(lhs, rhs, "*", |a, b| Ok(a * b)),
            BinOpKind::Div => self.numeric_op(lhs, rhs, "/", |a, b| {
                if b == 0 {
                    Err(RuntimeError::new("division by zero"))
                } else {
                    Ok(a / b) // truncates toward zero, same as the host's int(a/b)
                }
            }),
            BinOpKind::Mod => self.numeric_op(lhs, rhs, "%", |a, b| {
                if b == 0 {
                    Err(RuntimeError::new("division by zero"))
                } else {
                    Ok(a % b)
                }
            }),
            BinOpKind::Eq => Ok(Value::Bool(lhs == rhs)),
            BinOpKind::Neq => Ok(Value::Bool(lhs != rhs)),
            BinOpKind::Lt => self.compare(lhs, rhs, "<", |o| o.is_lt()),
            BinOpKind::Lte => self.compare(lhs, rhs, "<=", |o| o.is_le()),
            BinOpKind::Gt => self.compare(lhs, rhs, ">", |o| o.is_gt()),
            BinOpKind::Gte => self.compare(lhs, rhs, ">=", |o| o.is_ge()),
            BinOpKind::And | BinOpKind::Or => unreachable!("handled above"),
        }
    }

    fn eval_add(&self, left: Value, right: Value) -> Result<Value, RuntimeError> {
        if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
            return Ok(Value::Str(format!("{left}{right}").into()));
        }
        match (left, right) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a + b)),
            (left, right) => Err(RuntimeError::new(format!(
                "cannot add {} and {}",
                left.type_name(),
                right.type_name()
            ))),
        }
    }

    fn numeric_op(
        &self,
        left: Value,
        right: Value,
        symbol: &str,
        f: impl FnOnce(i64, i64) -> Result<i64, RuntimeError>,
    ) -> Result<Value, RuntimeError> {
        match (&left, &right) {
            (Value::Int(a), Value::Int(b)) => f(*a, *b).map(Value::Int),
            _ => Err(RuntimeError::new(format!(
                "'{symbol}' expects two ints, got {} and {}",
                left.type_name(),
                right.type_name()
            ))),
        }
    }

    /// `<`, `<=`, `>`, `>=`: integers numerically, strings lexicographically.
    /// Any other pairing, including a matched pair of bools or arrays, is a
    /// fatal type error.
    fn compare(
        &self,
        left: Value,
        right: Value,
        symbol: &str,
        accept: impl FnOnce(std::cmp::Ordering) -> bool,
    ) -> Result<Value, RuntimeError> {
        let ordering = match (&left, &right) {
            (Value::Str(a), Value::Str(b)) => a.as_ref().cmp(b.as_ref()),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            _ => {
                return Err(RuntimeError::new(format!(
                    "'{symbol}' cannot compare {} and {}",
                    left.type_name(),
                    right.type_name()
                )))
            }
        };
        Ok(Value::Bool(accept(ordering)))
    }

    fn eval_call(&mut self, env: &Env, name: Symbol, args: &'a [Expr]) -> Result<Value, RuntimeError> {
        let name_text = self.interner.resolve(name);

        // Built-ins are checked first: a user function named `print` is
        // shadowed, never called.
        if builtins::is_builtin(name_text) {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(self.eval_expr(env, arg)?);
            }
            return builtins::call(name_text, values);
        }

        let func = *self
            .functions
            .get(&name)
            .ok_or_else(|| RuntimeError::new(format!("undefined function '{name_text}'")))?;

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(env, arg)?);
        }
        self.call_function(func, values)
    }

    fn name(&self, sym: Symbol) -> &str {
        self.interner.resolve(sym)
    }
}
