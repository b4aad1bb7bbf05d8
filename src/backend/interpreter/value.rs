use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::ast::Literal;
use crate::environment::Type;
use crate::error::RuntimeError;

/// Runtime value model used by the tree-walking interpreter. Arithmetic
/// stays arbitrary-precision even though the analyzer narrows literals to
/// 32-bit / double semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum PlcObject {
    Nil,
    Boolean(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Character(char),
    String(String),
    /// A finite sequence of values, e.g. the result of `range`.
    Iterable(Rc<Vec<PlcObject>>),
    /// A typed object carrying named fields. Shared so that a field update
    /// through one handle is visible through every other.
    Instance(Rc<RefCell<Instance>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub ty: Type,
    pub fields: HashMap<String, PlcObject>,
}

impl PlcObject {
    pub fn type_name(&self) -> &'static str {
        match self {
            PlcObject::Nil => "Nil",
            PlcObject::Boolean(_) => "Boolean",
            PlcObject::Integer(_) => "Integer",
            PlcObject::Decimal(_) => "Decimal",
            PlcObject::Character(_) => "Character",
            PlcObject::String(_) => "String",
            PlcObject::Iterable(_) => "IntegerIterable",
            PlcObject::Instance(instance) => instance.borrow().ty.name(),
        }
    }

    pub fn get_field(&self, name: &str) -> Result<PlcObject, RuntimeError> {
        match self {
            PlcObject::Instance(instance) => {
                instance.borrow().fields.get(name).cloned().ok_or_else(|| {
                    RuntimeError::new(format!(
                        "The object has no field '{name}'.",
                    ))
                })
            }
            other => Err(RuntimeError::new(format!(
                "The type {} has no field '{name}'.",
                other.type_name()
            ))),
        }
    }

    pub fn set_field(&self, name: &str, value: PlcObject) -> Result<(), RuntimeError> {
        match self {
            PlcObject::Instance(instance) => {
                instance.borrow_mut().fields.insert(name.to_string(), value);
                Ok(())
            }
            other => Err(RuntimeError::new(format!(
                "The type {} has no field '{name}'.",
                other.type_name()
            ))),
        }
    }

    /// Rendering used by `print`: host formatting without quotes.
    pub fn to_output(&self) -> String {
        match self {
            PlcObject::Nil => "nil".to_string(),
            PlcObject::Boolean(value) => value.to_string(),
            PlcObject::Integer(value) => value.to_string(),
            PlcObject::Decimal(value) => value.to_string(),
            PlcObject::Character(value) => value.to_string(),
            PlcObject::String(value) => value.clone(),
            PlcObject::Iterable(values) => {
                let rendered = values
                    .iter()
                    .map(PlcObject::to_output)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("[{rendered}]")
            }
            PlcObject::Instance(instance) => format!("{} object", instance.borrow().ty),
        }
    }
}

impl fmt::Display for PlcObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_output())
    }
}

impl From<&Literal> for PlcObject {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Nil => PlcObject::Nil,
            Literal::Boolean(value) => PlcObject::Boolean(*value),
            Literal::Integer(value) => PlcObject::Integer(value.clone()),
            Literal::Decimal(value) => PlcObject::Decimal(value.clone()),
            Literal::Character(value) => PlcObject::Character(*value),
            Literal::String(value) => PlcObject::String(value.clone()),
        }
    }
}
