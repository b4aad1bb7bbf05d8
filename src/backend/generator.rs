use std::fmt;

use anyhow::{bail, Result};

use crate::ast::{BinOp, Expr, Field, Literal, Method, Source, Stmt};

/// Emits the Java translation of an analyzed source tree into a
/// caller-owned text sink. Layout is deterministic: 4-space indentation,
/// one blank line between class members, no trailing whitespace.
pub struct Generator<'w> {
    sink: &'w mut dyn fmt::Write,
}

pub fn generate(source: &Source, sink: &mut dyn fmt::Write) -> Result<()> {
    Generator { sink }.emit_source(source)
}

impl<'w> Generator<'w> {
    fn emit_source(&mut self, source: &Source) -> Result<()> {
        self.push_line(0, "public class Main {")?;
        self.blank()?;
        for field in &source.fields {
            self.emit_field(field)?;
        }
        if !source.fields.is_empty() {
            self.blank()?;
        }
        self.push_line(1, "public static void main(String[] args) {")?;
        self.push_line(2, "System.exit(new Main().main());")?;
        self.push_line(1, "}")?;
        self.blank()?;
        for method in &source.methods {
            self.emit_method(method)?;
            self.blank()?;
        }
        self.push_line(0, "}")?;
        Ok(())
    }

    fn emit_field(&mut self, field: &Field) -> Result<()> {
        let Some(variable) = &field.variable else {
            bail!("Field '{}' was not analyzed", field.name);
        };
        let mut line = format!("{} {}", variable.ty.jvm_name(), variable.jvm_name);
        if let Some(value) = &field.value {
            line.push_str(" = ");
            line.push_str(&self.expr(value)?);
        }
        line.push(';');
        self.push_line(1, &line)
    }

    fn emit_method(&mut self, method: &Method) -> Result<()> {
        let Some(function) = &method.function else {
            bail!("Method '{}' was not analyzed", method.name);
        };
        let parameters = method
            .parameters
            .iter()
            .zip(&function.parameter_types)
            .map(|(name, ty)| format!("{} {name}", ty.jvm_name()))
            .collect::<Vec<_>>()
            .join(", ");
        let signature = format!(
            "{} {}({parameters})",
            function.return_type.jvm_name(),
            function.jvm_name
        );
        self.emit_block(1, &signature, &method.statements)
    }

    fn emit_statement(&mut self, indent: usize, statement: &Stmt) -> Result<()> {
        match statement {
            Stmt::Expression { expr, .. } => {
                let rendered = self.expr(expr)?;
                self.push_line(indent, &format!("{rendered};"))
            }
            Stmt::Declaration {
                value, variable, ..
            } => {
                let Some(variable) = variable else {
                    bail!("Declaration was not analyzed");
                };
                let mut line = format!("{} {}", variable.ty.jvm_name(), variable.jvm_name);
                if let Some(value) = value {
                    line.push_str(" = ");
                    line.push_str(&self.expr(value)?);
                }
                line.push(';');
                self.push_line(indent, &line)
            }
            Stmt::Assignment {
                receiver, value, ..
            } => {
                let receiver = self.expr(receiver)?;
                let value = self.expr(value)?;
                self.push_line(indent, &format!("{receiver} = {value};"))
            }
            Stmt::If {
                condition,
                then_statements,
                else_statements,
                ..
            } => {
                let condition = self.expr(condition)?;
                if else_statements.is_empty() {
                    self.emit_block(indent, &format!("if ({condition})"), then_statements)
                } else {
                    self.push_line(indent, &format!("if ({condition}) {{"))?;
                    for statement in then_statements {
                        self.emit_statement(indent + 1, statement)?;
                    }
                    self.push_line(indent, "} else {")?;
                    for statement in else_statements {
                        self.emit_statement(indent + 1, statement)?;
                    }
                    self.push_line(indent, "}")
                }
            }
            Stmt::For {
                name,
                iterable,
                body,
                ..
            } => {
                let iterable = self.expr(iterable)?;
                self.emit_block(indent, &format!("for (int {name} : {iterable})"), body)
            }
            Stmt::While {
                condition, body, ..
            } => {
                let condition = self.expr(condition)?;
                self.emit_block(indent, &format!("while ({condition})"), body)
            }
            Stmt::Return { value, .. } => {
                let value = self.expr(value)?;
                self.push_line(indent, &format!("return {value};"))
            }
        }
    }

    /// A braced block: `<header> {` ... `}`, collapsed to `<header> {}`
    /// when the body is empty.
    fn emit_block(&mut self, indent: usize, header: &str, body: &[Stmt]) -> Result<()> {
        if body.is_empty() {
            return self.push_line(indent, &format!("{header} {{}}"));
        }
        self.push_line(indent, &format!("{header} {{"))?;
        for statement in body {
            self.emit_statement(indent + 1, statement)?;
        }
        self.push_line(indent, "}")
    }

    fn expr(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Literal { value, .. } => Ok(match value {
                Literal::Nil => "null".to_string(),
                Literal::Boolean(value) => value.to_string(),
                Literal::Integer(value) => value.to_string(),
                Literal::Decimal(value) => value.to_string(),
                Literal::Character(value) => format!("'{value}'"),
                Literal::String(value) => format!("\"{value}\""),
            }),
            Expr::Group { inner, .. } => Ok(format!("({})", self.expr(inner)?)),
            Expr::Binary {
                op, left, right, ..
            } => {
                let symbol = match op {
                    BinOp::And => "&&",
                    BinOp::Or => "||",
                    other => other.symbol(),
                };
                Ok(format!(
                    "{} {symbol} {}",
                    self.expr(left)?,
                    self.expr(right)?
                ))
            }
            Expr::Access {
                receiver,
                name,
                variable,
                ..
            } => {
                let Some(variable) = variable else {
                    bail!("Access to '{name}' was not analyzed");
                };
                match receiver {
                    Some(receiver) => Ok(format!("{}.{}", self.expr(receiver)?, variable.jvm_name)),
                    None => Ok(variable.jvm_name.clone()),
                }
            }
            Expr::Function {
                receiver,
                name,
                args,
                function,
                ..
            } => {
                let Some(function) = function else {
                    bail!("Call to '{name}' was not analyzed");
                };
                let args = args
                    .iter()
                    .map(|arg| self.expr(arg))
                    .collect::<Result<Vec<_>>>()?
                    .join(", ");
                match receiver {
                    Some(receiver) => Ok(format!(
                        "{}.{}({args})",
                        self.expr(receiver)?,
                        function.jvm_name
                    )),
                    None => Ok(format!("{}({args})", function.jvm_name)),
                }
            }
        }
    }

    fn push_line(&mut self, indent: usize, line: &str) -> Result<()> {
        for _ in 0..indent {
            self.sink.write_str("    ")?;
        }
        self.sink.write_str(line)?;
        self.sink.write_char('\n')?;
        Ok(())
    }

    fn blank(&mut self) -> Result<()> {
        self.sink.write_char('\n')?;
        Ok(())
    }
}
