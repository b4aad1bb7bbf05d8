//! Tree-walking backend.
//!
//! Executes the analyzed AST directly. Non-local return is threaded as a
//! `Flow` result bubbling out of statement execution and is caught only at
//! the method-invocation boundary; methods capture the scope they were
//! defined in, not their caller's.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use bigdecimal::RoundingMode;
use num_traits::Zero;

use crate::ast::{BinOp, Expr, Method, Source, Stmt};
use crate::error::RuntimeError;

pub mod value;

pub use value::PlcObject;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Control-flow marker for statement execution.
enum Flow {
    Continue,
    Return(PlcObject),
}

#[derive(Clone)]
enum Callable {
    Builtin(fn(&mut Interpreter, Vec<PlcObject>) -> RuntimeResult<PlcObject>),
    Method {
        /// The scope the method was defined in; invocations chain onto it.
        definition: RtScope,
        method: Rc<Method>,
    },
}

/// Runtime scope chain. Cloning clones a handle to the same node.
#[derive(Clone, Default)]
struct RtScope {
    inner: Rc<RefCell<RtScopeData>>,
}

#[derive(Default)]
struct RtScopeData {
    parent: Option<RtScope>,
    variables: HashMap<String, PlcObject>,
    functions: HashMap<(String, usize), Callable>,
}

impl RtScope {
    fn nested(&self) -> RtScope {
        RtScope {
            inner: Rc::new(RefCell::new(RtScopeData {
                parent: Some(self.clone()),
                variables: HashMap::new(),
                functions: HashMap::new(),
            })),
        }
    }

    fn define_variable(&self, name: String, value: PlcObject) {
        self.inner.borrow_mut().variables.insert(name, value);
    }

    fn define_function(&self, name: String, arity: usize, callable: Callable) {
        self.inner
            .borrow_mut()
            .functions
            .insert((name, arity), callable);
    }

    fn lookup_variable(&self, name: &str) -> Option<PlcObject> {
        let data = self.inner.borrow();
        match data.variables.get(name) {
            Some(value) => Some(value.clone()),
            None => data
                .parent
                .as_ref()
                .and_then(|parent| parent.lookup_variable(name)),
        }
    }

    fn lookup_function(&self, name: &str, arity: usize) -> Option<Callable> {
        let data = self.inner.borrow();
        match data.functions.get(&(name.to_string(), arity)) {
            Some(callable) => Some(callable.clone()),
            None => data
                .parent
                .as_ref()
                .and_then(|parent| parent.lookup_function(name, arity)),
        }
    }

    /// Replaces the value of an existing variable, walking toward the root
    /// to find the scope that owns it.
    fn assign(&self, name: &str, value: PlcObject) -> RuntimeResult<()> {
        let mut data = self.inner.borrow_mut();
        if let Some(slot) = data.variables.get_mut(name) {
            *slot = value;
            return Ok(());
        }
        match &data.parent {
            Some(parent) => parent.assign(name, value),
            None => Err(RuntimeError::new(format!(
                "The variable '{name}' is not defined."
            ))),
        }
    }
}

pub struct Interpreter {
    scope: RtScope,
    output: Vec<String>,
}

impl Interpreter {
    pub fn new() -> Self {
        let scope = RtScope::default();
        scope.define_function("print".to_string(), 1, Callable::Builtin(builtin_print));
        scope.define_function("range".to_string(), 2, Callable::Builtin(builtin_range));
        Self {
            scope,
            output: Vec::new(),
        }
    }

    /// Binds fields and methods in the root scope, then runs `main` and
    /// returns its value.
    pub fn evaluate(&mut self, source: &Source) -> RuntimeResult<PlcObject> {
        for field in &source.fields {
            let value = match &field.value {
                Some(expr) => self.eval(expr)?,
                None => PlcObject::Nil,
            };
            self.scope.define_variable(field.name.clone(), value);
        }
        for method in &source.methods {
            self.scope.define_function(
                method.name.clone(),
                method.parameters.len(),
                Callable::Method {
                    definition: self.scope.clone(),
                    method: Rc::new(method.clone()),
                },
            );
        }
        let main = self
            .scope
            .lookup_function("main", 0)
            .ok_or_else(|| RuntimeError::new("The function 'main/0' is not defined."))?;
        self.call(main, Vec::new())
    }

    /// Lines emitted by `print` so far. The host owns flushing them.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    fn call(&mut self, callable: Callable, args: Vec<PlcObject>) -> RuntimeResult<PlcObject> {
        match callable {
            Callable::Builtin(function) => function(self, args),
            Callable::Method { definition, method } => {
                let invocation = definition.nested();
                for (parameter, argument) in method.parameters.iter().zip(args) {
                    invocation.define_variable(parameter.clone(), argument);
                }
                self.in_scope(invocation, |this| {
                    for statement in &method.statements {
                        if let Flow::Return(value) = this.exec(statement)? {
                            return Ok(value);
                        }
                    }
                    Ok(PlcObject::Nil)
                })
            }
        }
    }

    fn exec_block(&mut self, statements: &[Stmt]) -> RuntimeResult<Flow> {
        for statement in statements {
            if let Flow::Return(value) = self.exec(statement)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Continue)
    }

    fn exec(&mut self, statement: &Stmt) -> RuntimeResult<Flow> {
        match statement {
            Stmt::Expression { expr, .. } => {
                self.eval(expr)?;
                Ok(Flow::Continue)
            }
            Stmt::Declaration { name, value, .. } => {
                let value = match value {
                    Some(expr) => self.eval(expr)?,
                    None => PlcObject::Nil,
                };
                self.scope.define_variable(name.clone(), value);
                Ok(Flow::Continue)
            }
            Stmt::Assignment {
                receiver, value, ..
            } => {
                match receiver {
                    Expr::Access {
                        receiver: Some(object),
                        name,
                        ..
                    } => {
                        let object = self.eval(object)?;
                        let value = self.eval(value)?;
                        object.set_field(name, value)?;
                    }
                    Expr::Access {
                        receiver: None,
                        name,
                        ..
                    } => {
                        let value = self.eval(value)?;
                        self.scope.assign(name, value)?;
                    }
                    _ => {
                        return Err(RuntimeError::new(
                            "Assignment target must be an access expression.",
                        ));
                    }
                }
                Ok(Flow::Continue)
            }
            Stmt::If {
                condition,
                then_statements,
                else_statements,
                ..
            } => {
                let branch = if self.eval_boolean(condition)? {
                    then_statements
                } else {
                    else_statements
                };
                let child = self.scope.nested();
                self.in_scope(child, |this| this.exec_block(branch))
            }
            Stmt::While {
                condition, body, ..
            } => {
                while self.eval_boolean(condition)? {
                    let child = self.scope.nested();
                    if let Flow::Return(value) =
                        self.in_scope(child, |this| this.exec_block(body))?
                    {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Continue)
            }
            Stmt::For {
                name,
                iterable,
                body,
                ..
            } => {
                let values = match self.eval(iterable)? {
                    PlcObject::Iterable(values) => values,
                    other => {
                        return Err(RuntimeError::new(format!(
                            "Expected an iterable, received {}.",
                            other.type_name()
                        )));
                    }
                };
                for value in values.iter() {
                    let child = self.scope.nested();
                    child.define_variable(name.clone(), value.clone());
                    if let Flow::Return(value) =
                        self.in_scope(child, |this| this.exec_block(body))?
                    {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Continue)
            }
            Stmt::Return { value, .. } => Ok(Flow::Return(self.eval(value)?)),
        }
    }

    fn eval(&mut self, expr: &Expr) -> RuntimeResult<PlcObject> {
        match expr {
            Expr::Literal { value, .. } => Ok(PlcObject::from(value)),
            Expr::Group { inner, .. } => self.eval(inner),
            Expr::Binary {
                op, left, right, ..
            } => self.eval_binary(*op, left, right),
            Expr::Access { receiver, name, .. } => match receiver {
                Some(receiver) => {
                    let object = self.eval(receiver)?;
                    object.get_field(name)
                }
                None => self.scope.lookup_variable(name).ok_or_else(|| {
                    RuntimeError::new(format!("The variable '{name}' is not defined."))
                }),
            },
            Expr::Function {
                receiver,
                name,
                args,
                ..
            } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval(arg)?);
                }
                match receiver {
                    Some(receiver) => {
                        // Method dispatch on the receiver's runtime type. No
                        // built-in type carries methods, so this resolves to
                        // the error path.
                        let object = self.eval(receiver)?;
                        Err(RuntimeError::new(format!(
                            "The type {} has no method '{name}/{}'.",
                            object.type_name(),
                            values.len()
                        )))
                    }
                    None => {
                        let callable = self
                            .scope
                            .lookup_function(name, values.len())
                            .ok_or_else(|| {
                                RuntimeError::new(format!(
                                    "The function '{name}/{}' is not defined.",
                                    values.len()
                                ))
                            })?;
                        self.call(callable, values)
                    }
                }
            }
        }
    }

    fn eval_binary(&mut self, op: BinOp, left: &Expr, right: &Expr) -> RuntimeResult<PlcObject> {
        match op {
            BinOp::And => {
                if !self.eval_boolean(left)? {
                    return Ok(PlcObject::Boolean(false));
                }
                Ok(PlcObject::Boolean(self.eval_boolean(right)?))
            }
            BinOp::Or => {
                if self.eval_boolean(left)? {
                    return Ok(PlcObject::Boolean(true));
                }
                Ok(PlcObject::Boolean(self.eval_boolean(right)?))
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                Ok(compare(op, &lhs, &rhs))
            }
            BinOp::Eq => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                Ok(PlcObject::Boolean(lhs == rhs))
            }
            BinOp::Ne => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                Ok(PlcObject::Boolean(lhs != rhs))
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                arithmetic(op, lhs, rhs)
            }
        }
    }

    fn eval_boolean(&mut self, expr: &Expr) -> RuntimeResult<bool> {
        match self.eval(expr)? {
            PlcObject::Boolean(value) => Ok(value),
            other => Err(RuntimeError::new(format!(
                "Expected a Boolean, received {}.",
                other.type_name()
            ))),
        }
    }

    /// Runs `f` with `scope` installed as the current scope, restoring the
    /// previous scope on every exit path.
    fn in_scope<T>(&mut self, scope: RtScope, f: impl FnOnce(&mut Self) -> T) -> T {
        let saved = std::mem::replace(&mut self.scope, scope);
        let result = f(self);
        self.scope = saved;
        result
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Natural ordering over matching runtime types; mismatched types yield nil.
fn compare(op: BinOp, lhs: &PlcObject, rhs: &PlcObject) -> PlcObject {
    let ordering = match (lhs, rhs) {
        (PlcObject::Integer(l), PlcObject::Integer(r)) => Some(l.cmp(r)),
        (PlcObject::Decimal(l), PlcObject::Decimal(r)) => l.partial_cmp(r),
        (PlcObject::Character(l), PlcObject::Character(r)) => Some(l.cmp(r)),
        (PlcObject::String(l), PlcObject::String(r)) => Some(l.cmp(r)),
        _ => None,
    };
    match ordering {
        Some(ordering) => PlcObject::Boolean(match op {
            BinOp::Lt => ordering.is_lt(),
            BinOp::Le => ordering.is_le(),
            BinOp::Gt => ordering.is_gt(),
            BinOp::Ge => ordering.is_ge(),
            _ => false,
        }),
        None => PlcObject::Nil,
    }
}

fn arithmetic(op: BinOp, lhs: PlcObject, rhs: PlcObject) -> RuntimeResult<PlcObject> {
    match (op, lhs, rhs) {
        (BinOp::Add, PlcObject::Integer(l), PlcObject::Integer(r)) => {
            Ok(PlcObject::Integer(l + r))
        }
        (BinOp::Add, PlcObject::Decimal(l), PlcObject::Decimal(r)) => {
            Ok(PlcObject::Decimal(l + r))
        }
        (BinOp::Add, PlcObject::String(l), PlcObject::String(r)) => {
            Ok(PlcObject::String(l + &r))
        }
        (BinOp::Sub, PlcObject::Integer(l), PlcObject::Integer(r)) => {
            Ok(PlcObject::Integer(l - r))
        }
        (BinOp::Sub, PlcObject::Decimal(l), PlcObject::Decimal(r)) => {
            Ok(PlcObject::Decimal(l - r))
        }
        (BinOp::Mul, PlcObject::Integer(l), PlcObject::Integer(r)) => {
            Ok(PlcObject::Integer(l * r))
        }
        (BinOp::Mul, PlcObject::Decimal(l), PlcObject::Decimal(r)) => {
            Ok(PlcObject::Decimal(l * r))
        }
        (BinOp::Div, PlcObject::Integer(l), PlcObject::Integer(r)) => {
            if r.is_zero() {
                return Err(RuntimeError::new("Division by zero."));
            }
            Ok(PlcObject::Integer(l / r))
        }
        (BinOp::Div, PlcObject::Decimal(l), PlcObject::Decimal(r)) => {
            if r.is_zero() {
                return Err(RuntimeError::new("Division by zero."));
            }
            // Banker's rounding at the dividend's scale, matching
            // BigDecimal.divide(divisor, RoundingMode.HALF_EVEN).
            let scale = l.fractional_digit_count();
            Ok(PlcObject::Decimal(
                (l / r).with_scale_round(scale, RoundingMode::HalfEven),
            ))
        }
        (op, lhs, rhs) => Err(RuntimeError::new(format!(
            "Cannot apply '{}' to {} and {}.",
            op.symbol(),
            lhs.type_name(),
            rhs.type_name()
        ))),
    }
}

fn builtin_print(
    interpreter: &mut Interpreter,
    mut args: Vec<PlcObject>,
) -> RuntimeResult<PlcObject> {
    let value = args.pop().unwrap_or(PlcObject::Nil);
    interpreter.output.push(value.to_output());
    Ok(PlcObject::Nil)
}

fn builtin_range(
    _interpreter: &mut Interpreter,
    args: Vec<PlcObject>,
) -> RuntimeResult<PlcObject> {
    match args.as_slice() {
        [PlcObject::Integer(start), PlcObject::Integer(end)] => {
            let one = num_bigint::BigInt::from(1);
            let mut values = Vec::new();
            let mut current = start.clone();
            while &current < end {
                values.push(PlcObject::Integer(current.clone()));
                current = &current + &one;
            }
            Ok(PlcObject::Iterable(Rc::new(values)))
        }
        _ => Err(RuntimeError::new("range requires two Integer bounds.")),
    }
}

/// The result of a program run: `main`'s value plus the `print` output.
#[derive(Debug)]
pub struct Evaluation {
    pub value: PlcObject,
    pub output: Vec<String>,
}

pub fn interpret(source: &Source) -> RuntimeResult<Evaluation> {
    let mut interpreter = Interpreter::new();
    let value = interpreter.evaluate(source)?;
    Ok(Evaluation {
        value,
        output: interpreter.into_output(),
    })
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use num_bigint::BigInt;

    use super::*;
    use crate::{analyzer, lexer, parser};

    fn run(input: &str) -> Evaluation {
        try_run(input).expect("program should run")
    }

    fn try_run(input: &str) -> RuntimeResult<Evaluation> {
        let tokens = lexer::lex(input).expect("lex should succeed");
        let mut source = parser::parse(&tokens).expect("parse should succeed");
        analyzer::analyze(&mut source).expect("analysis should succeed");
        interpret(&source)
    }

    fn int(value: i64) -> PlcObject {
        PlcObject::Integer(BigInt::from(value))
    }

    #[test]
    fn returns_the_value_of_main() {
        let evaluation = run("DEF main() DO RETURN 0; END");
        assert_eq!(evaluation.value, int(0));
        assert!(evaluation.output.is_empty());
    }

    #[test]
    fn fields_are_visible_and_assignable_from_methods() {
        let evaluation = run("LET x = 1; DEF main() DO x = x + 2; print(x); RETURN 0; END");
        assert_eq!(evaluation.output, vec!["3"]);
    }

    #[test]
    fn if_selects_the_matching_branch() {
        let source = r#"DEF main() DO IF TRUE DO print("t"); ELSE print("f"); END RETURN 0; END"#;
        assert_eq!(run(source).output, vec!["t"]);
        let source =
            r#"DEF main() DO IF FALSE DO print("t"); ELSE print("f"); END RETURN 0; END"#;
        assert_eq!(run(source).output, vec!["f"]);
    }

    #[test]
    fn for_iterates_over_a_range() {
        let source = indoc! {r#"
            DEF main() DO
                LET s = "";
                FOR i IN range(0, 3) DO
                    s = s + ".";
                END
                print(s);
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["..."]);
    }

    #[test]
    fn empty_range_never_enters_the_loop() {
        let source = indoc! {r#"
            DEF main() DO
                FOR i IN range(3, 3) DO
                    print(i);
                END
                RETURN 0;
            END
        "#};
        assert!(run(source).output.is_empty());
    }

    #[test]
    fn while_re_evaluates_its_condition() {
        let source = indoc! {r#"
            DEF main() DO
                LET n = 0;
                WHILE n < 3 DO
                    n = n + 1;
                END
                print(n);
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["3"]);
    }

    #[test]
    fn division_by_zero_fails() {
        let err = try_run("DEF main() DO print(1 / 0); RETURN 0; END")
            .expect_err("expected runtime failure");
        assert_eq!(err, RuntimeError::new("Division by zero."));
        let err = try_run("DEF main() DO print(1.0 / 0.0); RETURN 0; END")
            .expect_err("expected runtime failure");
        assert_eq!(err, RuntimeError::new("Division by zero."));
    }

    #[test]
    fn integer_division_truncates() {
        let evaluation = run("DEF main() DO RETURN 7 / 2; END");
        assert_eq!(evaluation.value, int(3));
    }

    #[test]
    fn decimal_division_rounds_half_even_at_the_dividend_scale() {
        assert_eq!(run("DEF main() DO print(1.0 / 3.0); RETURN 0; END").output, vec!["0.3"]);
        // 0.25 and 0.75 round to the even neighbor at scale 1.
        assert_eq!(run("DEF main() DO print(0.5 / 2.0); RETURN 0; END").output, vec!["0.2"]);
        assert_eq!(run("DEF main() DO print(1.5 / 2.0); RETURN 0; END").output, vec!["0.8"]);
        assert_eq!(
            run("DEF main() DO print(1.00 / 3.0); RETURN 0; END").output,
            vec!["0.33"]
        );
    }

    #[test]
    fn interpreter_arithmetic_is_arbitrary_precision() {
        let source = indoc! {r#"
            DEF main() DO
                LET big = 2147483647;
                print(big * big);
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["4611686014132420609"]);
    }

    #[test]
    fn string_addition_concatenates() {
        let evaluation = run(r#"DEF main() DO print("foo" + "bar"); RETURN 0; END"#);
        assert_eq!(evaluation.output, vec!["foobar"]);
    }

    #[test]
    fn comparisons_use_natural_ordering() {
        let source = indoc! {r#"
            DEF main() DO
                print(1 < 2);
                print(2.0 >= 2.0);
                print('a' < 'b');
                print("abc" < "abd");
                print(1 == 1);
                print("a" != "b");
                RETURN 0;
            END
        "#};
        assert_eq!(
            run(source).output,
            vec!["true", "true", "true", "true", "true", "true"]
        );
    }

    #[test]
    fn mismatched_comparison_types_produce_nil() {
        // Both operands satisfy Comparable statically, but differ at runtime.
        let evaluation = run(r#"DEF main() DO print(1 < "a"); RETURN 0; END"#);
        assert_eq!(evaluation.output, vec!["nil"]);
    }

    #[test]
    fn equality_is_structural() {
        let source = indoc! {r#"
            DEF main() DO
                print("ab" == "ab");
                print(1.10 == 1.10);
                print(1 == 2);
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["true", "true", "false"]);
    }

    #[test]
    fn boolean_operators_short_circuit() {
        let source = indoc! {r#"
            DEF main() DO
                print(FALSE AND 1 / 0 == 1);
                print(TRUE OR 1 / 0 == 1);
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["false", "true"]);
    }

    #[test]
    fn return_unwinds_through_nested_statements() {
        let source = indoc! {r#"
            DEF find() DO
                FOR i IN range(0, 10) DO
                    IF i == 3 DO
                        RETURN i;
                    END
                END
                RETURN -1;
            END
            DEF main() DO
                print(find());
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["3"]);
    }

    #[test]
    fn falling_off_a_method_yields_nil() {
        let source = indoc! {r#"
            DEF noop() DO
                LET unused = 0;
            END
            DEF main() DO
                print(noop());
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["nil"]);
    }

    #[test]
    fn mixed_string_addition_fails_at_runtime() {
        // The analyzer types "n = " + 1 as String, but the evaluator only
        // concatenates matching String operands.
        let err = try_run(r#"DEF main() DO print("n = " + 1); RETURN 0; END"#)
            .expect_err("expected runtime failure");
        assert_eq!(
            err,
            RuntimeError::new("Cannot apply '+' to String and Integer.")
        );
    }

    #[test]
    fn parameters_bind_positionally() {
        let source = indoc! {r#"
            DEF diff(a: Integer, b: Integer) : Integer DO
                RETURN a - b;
            END
            DEF main() DO
                print(diff(9, 4));
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["5"]);
    }

    #[test]
    fn methods_capture_their_defining_scope() {
        let source = indoc! {r#"
            LET g = 1;
            DEF get() : Integer DO
                RETURN g;
            END
            DEF main() DO
                LET g = 2;
                print(get());
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["1"]);
    }

    #[test]
    fn recursion_resolves_through_the_defining_scope() {
        let source = indoc! {r#"
            DEF factorial(n: Integer) : Integer DO
                IF n < 2 DO
                    RETURN 1;
                END
                RETURN n * factorial(n - 1);
            END
            DEF main() DO
                print(factorial(10));
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["3628800"]);
    }

    #[test]
    fn loop_scopes_are_fresh_per_iteration() {
        let source = indoc! {r#"
            DEF main() DO
                LET n = 0;
                FOR i IN range(0, 3) DO
                    LET local = i;
                    n = n + local;
                END
                print(n);
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["3"]);
    }

    #[test]
    fn print_renders_each_value_on_its_own_line() {
        let source = indoc! {r#"
            DEF main() DO
                print(NIL);
                print(TRUE);
                print('c');
                print("text");
                print(1.50);
                RETURN 0;
            END
        "#};
        assert_eq!(run(source).output, vec!["nil", "true", "c", "text", "1.50"]);
    }

    #[test]
    fn instance_fields_are_shared_through_handles() {
        use std::cell::RefCell;
        use std::collections::HashMap;
        use value::Instance;

        let instance = PlcObject::Instance(Rc::new(RefCell::new(Instance {
            ty: crate::environment::Type::Any,
            fields: HashMap::new(),
        })));
        let alias = instance.clone();
        instance
            .set_field("count", int(1))
            .expect("set_field should succeed");
        assert_eq!(alias.get_field("count"), Ok(int(1)));
        assert!(alias.get_field("missing").is_err());
        assert!(int(1).get_field("count").is_err());
    }
}
