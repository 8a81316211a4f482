//! Lazy Earth Engine expression graph
//!
//! Nothing here talks to the network: builders assemble a tree of function
//! invocations which is encoded into the REST `Expression` form only when a
//! value is computed.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// A node of a remote computation
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    Invocation {
        function: String,
        arguments: BTreeMap<String, Expr>,
    },
    /// Reference to an argument of the enclosing function definition
    ArgumentRef(String),
    Function {
        arguments: Vec<String>,
        body: Box<Expr>,
    },
    Array(Vec<Expr>),
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    /// Invoke a named server-side function
    pub fn call<'a>(function: &str, arguments: impl IntoIterator<Item = (&'a str, Expr)>) -> Self {
        Expr::Invocation {
            function: function.to_string(),
            arguments: arguments.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    /// Name of the invoked function, if this node is an invocation
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Expr::Invocation { function, .. } => Some(function),
            _ => None,
        }
    }

    pub fn argument(&self, name: &str) -> Option<&Expr> {
        match self {
            Expr::Invocation { arguments, .. } => arguments.get(name),
            _ => None,
        }
    }

    pub fn as_constant(&self) -> Option<&Value> {
        match self {
            Expr::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Whether any node of this tree invokes `function`
    pub fn invokes(&self, function: &str) -> bool {
        match self {
            Expr::Invocation { function: f, arguments } => {
                f == function || arguments.values().any(|arg| arg.invokes(function))
            }
            Expr::Function { body, .. } => body.invokes(function),
            Expr::Array(items) => items.iter().any(|item| item.invokes(function)),
            Expr::Constant(_) | Expr::ArgumentRef(_) => false,
        }
    }

    /// Encode as a REST `Expression`: `{"values": {...}, "result": "<key>"}`
    ///
    /// Function bodies must live in the values map, so they are hoisted there;
    /// every other node is encoded inline.
    pub fn to_expression(&self) -> Value {
        let mut encoder = Encoder::default();
        let root = encoder.encode(self);
        let result = encoder.push(root);
        json!({ "values": encoder.values, "result": result })
    }
}

#[derive(Default)]
struct Encoder {
    values: Map<String, Value>,
}

impl Encoder {
    fn push(&mut self, node: Value) -> String {
        let key = self.values.len().to_string();
        self.values.insert(key.clone(), node);
        key
    }

    fn encode(&mut self, expr: &Expr) -> Value {
        match expr {
            Expr::Constant(value) => json!({ "constantValue": value }),
            Expr::Invocation { function, arguments } => {
                let arguments: Map<String, Value> =
                    arguments.iter().map(|(k, v)| (k.clone(), self.encode(v))).collect();
                json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": arguments,
                    }
                })
            }
            Expr::ArgumentRef(name) => json!({ "argumentReference": name }),
            Expr::Function { arguments, body } => {
                let body = self.encode(body);
                let body_key = self.push(body);
                json!({
                    "functionDefinitionValue": {
                        "argumentNames": arguments,
                        "body": body_key,
                    }
                })
            }
            Expr::Array(items) => {
                let values: Vec<Value> = items.iter().map(|item| self.encode(item)).collect();
                json!({ "arrayValue": { "values": values } })
            }
        }
    }
}
