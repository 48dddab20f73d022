use std::{fmt, rc::Rc};

use crate::{ast::Block, environment::EnvironmentRef};

/// A runtime value. The shared `Rc` makes cloning cheap and gives boolean and
/// null values a stable identity: the evaluator allocates `true`, `false`,
/// and `null` exactly once and hands out clones, so `==` on non-integer
/// operands can compare pointers.
#[derive(Clone)]
pub struct Value(pub Rc<ValueKind>);

pub enum ValueKind {
    Int(i64),
    Bool(bool),
    Null,
    /// Wraps the operand of a `return` statement while it unwinds through
    /// enclosing blocks. Never escapes the evaluator: the program and
    /// function-call boundaries unwrap it.
    Return(Value),
    /// A runtime failure travelling as an ordinary value. Any evaluation
    /// step that sees one of these stops and hands it upward.
    Error(String),
    Function(FunctionValue),
}

pub struct FunctionValue {
    pub params: Vec<String>,
    pub body: Rc<Block>,
    /// The environment the literal was evaluated in. Calls chain their local
    /// scope onto this, which is what makes closures lexical.
    pub env: EnvironmentRef,
}

impl Value {
    pub fn new(kind: ValueKind) -> Self {
        Self(Rc::new(kind))
    }

    pub fn int(value: i64) -> Self {
        Self::new(ValueKind::Int(value))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ValueKind::Error(message.into()))
    }

    /// Only `null` and `false` are falsy. Every other value, including zero,
    /// counts as true.
    pub fn is_truthy(&self) -> bool {
        match &*self.0 {
            ValueKind::Null => false,
            ValueKind::Bool(b) => *b,
            _ => true,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(&*self.0, ValueKind::Error(_))
    }

    /// Type tag used in runtime error messages.
    pub fn type_name(&self) -> &'static str {
        match &*self.0 {
            ValueKind::Int(_) => "INTEGER",
            ValueKind::Bool(_) => "BOOLEAN",
            ValueKind::Null => "NULL",
            ValueKind::Return(_) => "RETURN_VALUE",
            ValueKind::Error(_) => "ERROR",
            ValueKind::Function(_) => "FUNCTION",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Int(n) => write!(f, "{n}"),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Null => write!(f, "null"),
            ValueKind::Return(value) => write!(f, "{value}"),
            ValueKind::Error(message) => write!(f, "{message}"),
            ValueKind::Function(fun) => {
                write!(f, "fn({}) {}", fun.params.join(", "), fun.body)
            }
        }
    }
}

// Debug must not follow a function's captured environment: the environment
// usually holds the function itself, and chasing the cycle would never
// terminate.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            ValueKind::Int(n) => write!(f, "{n}"),
            ValueKind::Bool(b) => write!(f, "{b}"),
            ValueKind::Null => write!(f, "null"),
            ValueKind::Return(value) => write!(f, "return({value:?})"),
            ValueKind::Error(message) => write!(f, "error({message})"),
            ValueKind::Function(fun) => write!(f, "<fn({})>", fun.params.join(", ")),
        }
    }
}
