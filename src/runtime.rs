use std::rc::Rc;

use crate::{
    ast::{BinaryOp, Block, Expr, Program, Stmt, UnaryOp},
    diagnostics::{CloverError, Result},
    environment::{Environment, EnvironmentRef},
    parser,
    value::{FunctionValue, Value, ValueKind},
};

/// The tree-walking evaluator. Holds the canonical `true`, `false`, and
/// `null` values; every boolean or null result is a clone of one of these,
/// so the whole session shares three allocations and `==` can fall back to
/// pointer identity.
///
/// Runtime failures never surface as `Err`: they come back as
/// `ValueKind::Error` values, and every evaluation step checks its
/// sub-results and propagates the first error it sees.
pub struct Evaluator {
    true_value: Value,
    false_value: Value,
    null_value: Value,
}

impl Evaluator {
    pub fn new() -> Self {
        Self {
            true_value: Value::new(ValueKind::Bool(true)),
            false_value: Value::new(ValueKind::Bool(false)),
            null_value: Value::new(ValueKind::Null),
        }
    }

    /// Evaluates a whole program. A `return` at any depth stops execution
    /// and yields its unwrapped operand; an error value stops execution and
    /// is returned as-is. An empty program is `null`.
    pub fn eval_program(&self, program: &Program, env: &EnvironmentRef) -> Value {
        let mut result = self.null_value.clone();
        for statement in &program.statements {
            result = self.eval_statement(statement, env);
            match &*result.0 {
                ValueKind::Return(value) => return value.clone(),
                ValueKind::Error(_) => return result.clone(),
                _ => {}
            }
        }
        result
    }

    fn eval_statement(&self, statement: &Stmt, env: &EnvironmentRef) -> Value {
        match statement {
            Stmt::Let { name, value } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return value;
                }
                env.borrow_mut().set(name.clone(), value);
                self.null_value.clone()
            }
            Stmt::Return(expression) => {
                let value = self.eval_expression(expression, env);
                if value.is_error() {
                    return value;
                }
                Value::new(ValueKind::Return(value))
            }
            Stmt::Expr(expression) => self.eval_expression(expression, env),
        }
    }

    // Blocks relay a Return wrapper untouched so that a `return` nested in
    // several blocks still unwinds the whole function, not just the block
    // it sits in.
    fn eval_block(&self, block: &Block, env: &EnvironmentRef) -> Value {
        let mut result = self.null_value.clone();
        for statement in &block.statements {
            result = self.eval_statement(statement, env);
            if matches!(&*result.0, ValueKind::Return(_) | ValueKind::Error(_)) {
                return result;
            }
        }
        result
    }

    fn eval_expression(&self, expression: &Expr, env: &EnvironmentRef) -> Value {
        match expression {
            Expr::IntegerLiteral(value) => Value::int(*value),
            Expr::Boolean(value) => self.boolean(*value),
            Expr::Identifier(name) => match env.borrow().get(name) {
                Some(value) => value,
                None => Value::error(format!("identifier not found: {name}")),
            },
            Expr::Prefix { op, right } => {
                let right = self.eval_expression(right, env);
                if right.is_error() {
                    return right;
                }
                self.eval_prefix(op, right)
            }
            Expr::Infix { op, left, right } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(right, env);
                if right.is_error() {
                    return right;
                }
                self.eval_infix(op, left, right)
            }
            Expr::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, env);
                if condition.is_error() {
                    return condition;
                }
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    self.null_value.clone()
                }
            }
            Expr::Function { params, body } => Value::new(ValueKind::Function(FunctionValue {
                params: params.clone(),
                body: Rc::clone(body),
                env: Rc::clone(env),
            })),
            Expr::Call { function, args } => {
                let callee = self.eval_expression(function, env);
                if callee.is_error() {
                    return callee;
                }
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    let value = self.eval_expression(arg, env);
                    if value.is_error() {
                        return value;
                    }
                    evaluated.push(value);
                }
                self.apply_function(callee, evaluated)
            }
        }
    }

    fn eval_prefix(&self, op: &UnaryOp, right: Value) -> Value {
        match op {
            UnaryOp::Not => self.boolean(!right.is_truthy()),
            UnaryOp::Negate => match &*right.0 {
                ValueKind::Int(value) => Value::int(value.wrapping_neg()),
                _ => Value::error(format!("unknown operator: -{}", right.type_name())),
            },
        }
    }

    /// Operator dispatch for `left op right`. Two integers use integer
    /// arithmetic and ordering. Otherwise `==` and `!=` compare identity,
    /// which is exact for booleans and null since those are singletons; note
    /// this makes a mixed comparison like `5 == true` simply `false` rather
    /// than a type mismatch. Everything else is an error: operands of two
    /// different types are a type mismatch, same-typed operands without a
    /// defined operator are an unknown operator.
    fn eval_infix(&self, op: &BinaryOp, left: Value, right: Value) -> Value {
        if let (ValueKind::Int(l), ValueKind::Int(r)) = (&*left.0, &*right.0) {
            return self.eval_integer_infix(op, *l, *r);
        }
        match op {
            BinaryOp::Equal => self.boolean(Rc::ptr_eq(&left.0, &right.0)),
            BinaryOp::NotEqual => self.boolean(!Rc::ptr_eq(&left.0, &right.0)),
            _ if left.type_name() != right.type_name() => Value::error(format!(
                "type mismatch: {} {op} {}",
                left.type_name(),
                right.type_name()
            )),
            _ => Value::error(format!(
                "unknown operator: {} {op} {}",
                left.type_name(),
                right.type_name()
            )),
        }
    }

    fn eval_integer_infix(&self, op: &BinaryOp, left: i64, right: i64) -> Value {
        match op {
            BinaryOp::Add => Value::int(left.wrapping_add(right)),
            BinaryOp::Sub => Value::int(left.wrapping_sub(right)),
            BinaryOp::Mul => Value::int(left.wrapping_mul(right)),
            BinaryOp::Div => {
                if right == 0 {
                    Value::error("division by zero")
                } else {
                    // wrapping_div keeps i64::MIN / -1 defined.
                    Value::int(left.wrapping_div(right))
                }
            }
            BinaryOp::Less => self.boolean(left < right),
            BinaryOp::Greater => self.boolean(left > right),
            BinaryOp::Equal => self.boolean(left == right),
            BinaryOp::NotEqual => self.boolean(left != right),
        }
    }

    fn apply_function(&self, callee: Value, args: Vec<Value>) -> Value {
        match &*callee.0 {
            ValueKind::Function(function) => {
                if args.len() != function.params.len() {
                    return Value::error(format!(
                        "wrong number of arguments: expected {}, got {}",
                        function.params.len(),
                        args.len()
                    ));
                }
                // The call scope encloses the environment captured at the
                // function literal, not the caller's, so lookups follow
                // lexical structure.
                let env = Environment::enclosing(Rc::clone(&function.env));
                for (param, arg) in function.params.iter().zip(args) {
                    env.borrow_mut().set(param.clone(), arg);
                }
                let result = self.eval_block(&function.body, &env);
                match &*result.0 {
                    ValueKind::Return(value) => value.clone(),
                    _ => result,
                }
            }
            _ => Value::error(format!("not a function: {}", callee.type_name())),
        }
    }

    fn boolean(&self, value: bool) -> Value {
        if value {
            self.true_value.clone()
        } else {
            self.false_value.clone()
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// A persistent interpreter session: one evaluator plus one global
/// environment, shared by every source string fed through it. The REPL and
/// the CLI both sit on top of this.
pub struct Interpreter {
    evaluator: Evaluator,
    env: EnvironmentRef,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            evaluator: Evaluator::new(),
            env: Environment::new(),
        }
    }

    /// Parses and evaluates one source string against the session
    /// environment. `Err` means the source did not parse; a runtime failure
    /// comes back as `Ok` holding an error value.
    pub fn eval_source(&mut self, source: &str) -> Result<Value> {
        let program = parser::parse_program(source).map_err(CloverError::from)?;
        Ok(self.evaluator.eval_program(&program, &self.env))
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}
