use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::AnalysisError;

/// The built-in types of the language. `jvm_name` is the identifier the
/// generator emits for the type in the target language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Any,
    Nil,
    Boolean,
    Integer,
    Decimal,
    Character,
    String,
    Comparable,
    IntegerIterable,
}

impl Type {
    pub fn from_name(name: &str) -> Result<Type, AnalysisError> {
        match name {
            "Any" => Ok(Type::Any),
            "Nil" => Ok(Type::Nil),
            "Boolean" => Ok(Type::Boolean),
            "Integer" => Ok(Type::Integer),
            "Decimal" => Ok(Type::Decimal),
            "Character" => Ok(Type::Character),
            "String" => Ok(Type::String),
            "Comparable" => Ok(Type::Comparable),
            "IntegerIterable" => Ok(Type::IntegerIterable),
            _ => Err(AnalysisError::new(format!("Unknown type '{name}'."))),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Type::Any => "Any",
            Type::Nil => "Nil",
            Type::Boolean => "Boolean",
            Type::Integer => "Integer",
            Type::Decimal => "Decimal",
            Type::Character => "Character",
            Type::String => "String",
            Type::Comparable => "Comparable",
            Type::IntegerIterable => "IntegerIterable",
        }
    }

    pub fn jvm_name(self) -> &'static str {
        match self {
            Type::Any => "Object",
            Type::Nil => "Void",
            Type::Boolean => "boolean",
            Type::Integer => "int",
            Type::Decimal => "double",
            Type::Character => "char",
            Type::String => "String",
            Type::Comparable => "Comparable",
            Type::IntegerIterable => "Iterable<Integer>",
        }
    }

    /// Field table of the type. No built-in exposes fields, so receiver
    /// accesses resolve here to the error path.
    pub fn field(self, _name: &str) -> Option<Variable> {
        None
    }

    /// Method table of the type, keyed by name and arity. Parameter slot 0
    /// of a resolved method is reserved for the receiver. No built-in
    /// exposes methods today.
    pub fn method(self, _name: &str, _arity: usize) -> Option<Function> {
        None
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, typed variable symbol. `jvm_name` is what the generator emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub jvm_name: String,
    pub ty: Type,
}

impl Variable {
    pub fn new(name: impl Into<String>, jvm_name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            jvm_name: jvm_name.into(),
            ty,
        }
    }
}

/// A function symbol: its signature plus the generator-facing name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub jvm_name: String,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
}

impl Function {
    pub fn new(
        name: impl Into<String>,
        jvm_name: impl Into<String>,
        parameter_types: Vec<Type>,
        return_type: Type,
    ) -> Self {
        Self {
            name: name.into(),
            jvm_name: jvm_name.into(),
            parameter_types,
            return_type,
        }
    }

    pub fn arity(&self) -> usize {
        self.parameter_types.len()
    }
}

/// A node in the tree of symbol tables. Cloning a `Scope` clones a handle
/// to the same node; lookups walk toward the root, definitions always
/// install into this node (hiding any parent entry of the same name).
#[derive(Debug, Clone, Default)]
pub struct Scope {
    inner: Rc<RefCell<ScopeData>>,
}

#[derive(Debug, Default)]
struct ScopeData {
    parent: Option<Scope>,
    variables: HashMap<String, Variable>,
    functions: HashMap<(String, usize), Function>,
}

impl Scope {
    pub fn root() -> Scope {
        Scope::default()
    }

    pub fn nested(&self) -> Scope {
        Scope {
            inner: Rc::new(RefCell::new(ScopeData {
                parent: Some(self.clone()),
                variables: HashMap::new(),
                functions: HashMap::new(),
            })),
        }
    }

    pub fn parent(&self) -> Option<Scope> {
        self.inner.borrow().parent.clone()
    }

    pub fn define_variable(&self, variable: Variable) {
        self.inner
            .borrow_mut()
            .variables
            .insert(variable.name.clone(), variable);
    }

    pub fn define_function(&self, function: Function) {
        self.inner
            .borrow_mut()
            .functions
            .insert((function.name.clone(), function.arity()), function);
    }

    pub fn lookup_variable(&self, name: &str) -> Option<Variable> {
        let data = self.inner.borrow();
        match data.variables.get(name) {
            Some(variable) => Some(variable.clone()),
            None => data
                .parent
                .as_ref()
                .and_then(|parent| parent.lookup_variable(name)),
        }
    }

    pub fn lookup_function(&self, name: &str, arity: usize) -> Option<Function> {
        let data = self.inner.borrow();
        match data.functions.get(&(name.to_string(), arity)) {
            Some(function) => Some(function.clone()),
            None => data
                .parent
                .as_ref()
                .and_then(|parent| parent.lookup_function(name, arity)),
        }
    }
}
