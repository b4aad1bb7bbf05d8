use num_traits::ToPrimitive;

use crate::ast::{BinOp, Expr, Field, Literal, Method, Source, Stmt};
use crate::environment::{Function, Scope, Type, Variable};
use crate::error::AnalysisError;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Walks the tree in document order, resolving every expression's type and
/// binding a symbol on every name node. Stops at the first violation;
/// errors carry the offending node's byte offset where one exists.
pub struct Analyzer {
    scope: Scope,
}

impl Analyzer {
    pub fn new() -> Self {
        let scope = Scope::root();
        scope.define_function(Function::new(
            "print",
            "System.out.println",
            vec![Type::Any],
            Type::Nil,
        ));
        scope.define_function(Function::new(
            "range",
            "range",
            vec![Type::Integer, Type::Integer],
            Type::IntegerIterable,
        ));
        Self { scope }
    }

    pub fn analyze(&mut self, source: &mut Source) -> AnalysisResult<()> {
        for field in &mut source.fields {
            self.visit_field(field)?;
        }
        for method in &mut source.methods {
            self.visit_method(method)?;
        }
        match self.scope.lookup_function("main", 0) {
            Some(main) if main.return_type == Type::Integer => Ok(()),
            _ => Err(AnalysisError::new(
                "A main method with no parameters returning Integer is required.",
            )),
        }
    }

    fn visit_field(&mut self, field: &mut Field) -> AnalysisResult<()> {
        let declared = match &field.type_name {
            Some(name) => Some(named_type(name, field.index)?),
            None => None,
        };
        let ty = match &mut field.value {
            Some(value) => {
                self.visit_expr(value)?;
                let actual = resolved_ty(value)?;
                if let Some(declared) = declared {
                    require_assignable(declared, actual, value.index())?;
                }
                actual
            }
            None => declared.ok_or_else(|| {
                AnalysisError::new("Field declaration must have a type or a value to infer it.")
                    .with_index(field.index)
            })?,
        };
        let variable = Variable::new(field.name.clone(), field.name.clone(), ty);
        self.scope.define_variable(variable.clone());
        field.variable = Some(variable);
        Ok(())
    }

    fn visit_method(&mut self, method: &mut Method) -> AnalysisResult<()> {
        let mut parameter_types = Vec::with_capacity(method.parameters.len());
        for type_name in &method.parameter_type_names {
            parameter_types.push(match type_name {
                Some(name) => named_type(name, method.index)?,
                None => Type::Any,
            });
        }
        // An unannotated method returns Integer, the language's primary
        // type; `DEF main() DO ... END` must satisfy the main rule.
        let return_type = match &method.return_type_name {
            Some(name) => named_type(name, method.index)?,
            None => Type::Integer,
        };

        let function = Function::new(
            method.name.clone(),
            method.name.clone(),
            parameter_types.clone(),
            return_type,
        );
        self.scope.define_function(function.clone());
        method.function = Some(function);

        self.scoped(|this| {
            for (parameter, ty) in method.parameters.iter().zip(&parameter_types) {
                this.scope
                    .define_variable(Variable::new(parameter.clone(), parameter.clone(), *ty));
            }
            this.scope
                .define_variable(Variable::new("returnType", "returnType", return_type));
            for statement in &mut method.statements {
                this.visit_stmt(statement)?;
            }
            Ok(())
        })
    }

    fn visit_stmt(&mut self, statement: &mut Stmt) -> AnalysisResult<()> {
        match statement {
            Stmt::Expression { expr, index } => {
                if !matches!(expr, Expr::Function { .. }) {
                    return Err(AnalysisError::new(
                        "Expression statements must be function calls.",
                    )
                    .with_index(*index));
                }
                self.visit_expr(expr)
            }
            Stmt::Declaration {
                name,
                type_name,
                value,
                variable,
                index,
            } => {
                if type_name.is_none() && value.is_none() {
                    return Err(AnalysisError::new(
                        "Declaration must have a type or a value to infer it.",
                    )
                    .with_index(*index));
                }
                let mut ty = match type_name {
                    Some(name) => Some(named_type(name, *index)?),
                    None => None,
                };
                if let Some(value) = value {
                    self.visit_expr(value)?;
                    let actual = resolved_ty(value)?;
                    let target = *ty.get_or_insert(actual);
                    require_assignable(target, actual, value.index())?;
                }
                let ty = ty.ok_or_else(|| {
                    AnalysisError::new("Declaration has no type.").with_index(*index)
                })?;
                let bound = Variable::new(name.clone(), name.clone(), ty);
                self.scope.define_variable(bound.clone());
                *variable = Some(bound);
                Ok(())
            }
            Stmt::Assignment {
                receiver,
                value,
                index,
            } => {
                if !matches!(receiver, Expr::Access { .. }) {
                    return Err(AnalysisError::new(
                        "Assignment target must be an access expression.",
                    )
                    .with_index(*index));
                }
                self.visit_expr(receiver)?;
                self.visit_expr(value)?;
                require_assignable(resolved_ty(receiver)?, resolved_ty(value)?, value.index())
            }
            Stmt::If {
                condition,
                then_statements,
                else_statements,
                index,
            } => {
                self.visit_expr(condition)?;
                require_assignable(Type::Boolean, resolved_ty(condition)?, condition.index())?;
                if then_statements.is_empty() {
                    return Err(AnalysisError::new("If statement has no then statements.")
                        .with_index(*index));
                }
                self.scoped(|this| {
                    then_statements
                        .iter_mut()
                        .try_for_each(|statement| this.visit_stmt(statement))
                })?;
                self.scoped(|this| {
                    else_statements
                        .iter_mut()
                        .try_for_each(|statement| this.visit_stmt(statement))
                })
            }
            Stmt::For {
                name,
                iterable,
                body,
                index,
            } => {
                self.visit_expr(iterable)?;
                require_assignable(
                    Type::IntegerIterable,
                    resolved_ty(iterable)?,
                    iterable.index(),
                )?;
                if body.is_empty() {
                    return Err(
                        AnalysisError::new("For loop has an empty body.").with_index(*index)
                    );
                }
                self.scoped(|this| {
                    this.scope.define_variable(Variable::new(
                        name.clone(),
                        name.clone(),
                        Type::Integer,
                    ));
                    body.iter_mut()
                        .try_for_each(|statement| this.visit_stmt(statement))
                })
            }
            Stmt::While {
                condition, body, ..
            } => {
                self.visit_expr(condition)?;
                require_assignable(Type::Boolean, resolved_ty(condition)?, condition.index())?;
                self.scoped(|this| {
                    body.iter_mut()
                        .try_for_each(|statement| this.visit_stmt(statement))
                })
            }
            Stmt::Return { value, index } => {
                self.visit_expr(value)?;
                let return_type = self.scope.lookup_variable("returnType").ok_or_else(|| {
                    AnalysisError::new("Return outside of a method.").with_index(*index)
                })?;
                require_assignable(return_type.ty, resolved_ty(value)?, value.index())
            }
        }
    }

    fn visit_expr(&mut self, expr: &mut Expr) -> AnalysisResult<()> {
        match expr {
            Expr::Literal { value, ty, index } => {
                *ty = Some(literal_type(value, *index)?);
                Ok(())
            }
            Expr::Group { inner, ty, index } => {
                if !matches!(inner.as_ref(), Expr::Binary { .. }) {
                    return Err(AnalysisError::new(
                        "Grouped expression must be a binary expression.",
                    )
                    .with_index(*index));
                }
                self.visit_expr(inner)?;
                *ty = inner.ty();
                Ok(())
            }
            Expr::Binary {
                op,
                left,
                right,
                ty,
                index,
            } => {
                self.visit_expr(left)?;
                self.visit_expr(right)?;
                let lhs = resolved_ty(left)?;
                let rhs = resolved_ty(right)?;
                *ty = Some(binary_type(*op, lhs, rhs, *index)?);
                Ok(())
            }
            Expr::Access {
                receiver,
                name,
                variable,
                index,
            } => {
                let bound = match receiver {
                    Some(receiver) => {
                        self.visit_expr(receiver)?;
                        let receiver_type = resolved_ty(receiver)?;
                        receiver_type.field(name).ok_or_else(|| {
                            AnalysisError::new(format!(
                                "The type {receiver_type} has no field '{name}'."
                            ))
                            .with_index(*index)
                        })?
                    }
                    None => self.scope.lookup_variable(name).ok_or_else(|| {
                        AnalysisError::new(format!("The variable '{name}' is not defined."))
                            .with_index(*index)
                    })?,
                };
                *variable = Some(bound);
                Ok(())
            }
            Expr::Function {
                receiver,
                name,
                args,
                function,
                index,
            } => {
                let bound = match receiver {
                    Some(receiver) => {
                        self.visit_expr(receiver)?;
                        let receiver_type = resolved_ty(receiver)?;
                        let method = receiver_type.method(name, args.len()).ok_or_else(|| {
                            AnalysisError::new(format!(
                                "The type {receiver_type} has no method '{name}/{}'.",
                                args.len()
                            ))
                            .with_index(*index)
                        })?;
                        // Slot 0 of a method signature is the receiver.
                        for (arg, target) in
                            args.iter_mut().zip(method.parameter_types.iter().skip(1))
                        {
                            self.visit_expr(arg)?;
                            require_assignable(*target, resolved_ty(arg)?, arg.index())?;
                        }
                        method
                    }
                    None => {
                        let callee =
                            self.scope.lookup_function(name, args.len()).ok_or_else(|| {
                                AnalysisError::new(format!(
                                    "The function '{name}/{}' is not defined.",
                                    args.len()
                                ))
                                .with_index(*index)
                            })?;
                        for (arg, target) in args.iter_mut().zip(&callee.parameter_types) {
                            self.visit_expr(arg)?;
                            require_assignable(*target, resolved_ty(arg)?, arg.index())?;
                        }
                        callee
                    }
                };
                *function = Some(bound);
                Ok(())
            }
        }
    }

    /// Runs `f` inside a fresh child scope, restoring the enclosing scope
    /// on every exit path.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let child = self.scope.nested();
        let saved = std::mem::replace(&mut self.scope, child);
        let result = f(self);
        self.scope = saved;
        result
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn named_type(name: &str, index: usize) -> AnalysisResult<Type> {
    Type::from_name(name).map_err(|err| err.with_index(index))
}

fn literal_type(value: &Literal, index: usize) -> AnalysisResult<Type> {
    match value {
        Literal::Nil => Ok(Type::Nil),
        Literal::Boolean(_) => Ok(Type::Boolean),
        Literal::Character(_) => Ok(Type::Character),
        Literal::String(_) => Ok(Type::String),
        Literal::Integer(value) => {
            if value.to_i32().is_none() {
                return Err(
                    AnalysisError::new("Integer literal out of range.").with_index(index)
                );
            }
            Ok(Type::Integer)
        }
        Literal::Decimal(value) => match value.to_f64() {
            Some(double) if double.is_finite() => Ok(Type::Decimal),
            _ => Err(AnalysisError::new("Decimal literal out of range.").with_index(index)),
        },
    }
}

fn binary_type(op: BinOp, lhs: Type, rhs: Type, index: usize) -> AnalysisResult<Type> {
    match op {
        BinOp::And | BinOp::Or => {
            require_assignable(Type::Boolean, lhs, index)?;
            require_assignable(Type::Boolean, rhs, index)?;
            Ok(Type::Boolean)
        }
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
            require_assignable(Type::Comparable, lhs, index)?;
            require_assignable(Type::Comparable, rhs, index)?;
            Ok(Type::Boolean)
        }
        BinOp::Add if lhs == Type::String || rhs == Type::String => Ok(Type::String),
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
            if lhs != Type::Integer && lhs != Type::Decimal {
                return Err(AnalysisError::new(format!(
                    "The operator '{}' requires Integer or Decimal operands, received {lhs}.",
                    op.symbol()
                ))
                .with_index(index));
            }
            if lhs != rhs {
                return Err(AnalysisError::new(format!(
                    "The operator '{}' requires matching operand types, received {lhs} and {rhs}.",
                    op.symbol()
                ))
                .with_index(index));
            }
            Ok(lhs)
        }
    }
}

/// Assignability: exact match, an `Any` target, or a `Comparable` target
/// with one of the four naturally ordered types. `index` positions the
/// error at the value being checked.
pub fn require_assignable(target: Type, actual: Type, index: usize) -> AnalysisResult<()> {
    let comparable = matches!(
        actual,
        Type::Integer | Type::Decimal | Type::Character | Type::String
    );
    if target == actual || target == Type::Any || (target == Type::Comparable && comparable) {
        Ok(())
    } else {
        Err(AnalysisError::new(format!(
            "The type {actual} is not assignable to {target}."
        ))
        .with_index(index))
    }
}

pub fn analyze(source: &mut Source) -> AnalysisResult<()> {
    Analyzer::new().analyze(source)
}

fn resolved_ty(expr: &Expr) -> AnalysisResult<Type> {
    expr.ty().ok_or_else(|| {
        AnalysisError::new("Expression was not analyzed.").with_index(expr.index())
    })
}
