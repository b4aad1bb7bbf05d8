//! End-to-end scenarios driving the full pipeline: source text through the
//! lexer, parser and analyzer into both backends.

use indoc::indoc;
use num_bigint::BigInt;

use plc::ast::{Expr, Source, Stmt};
use plc::{Evaluation, PlcObject, RuntimeError};

fn frontend(input: &str) -> Source {
    let tokens = plc::lex(input).expect("lex should succeed");
    let mut source = plc::parse(&tokens).expect("parse should succeed");
    plc::analyze(&mut source).expect("analysis should succeed");
    source
}

fn run(input: &str) -> Evaluation {
    plc::interpret(&frontend(input)).expect("program should run")
}

fn generated(input: &str) -> String {
    let mut output = String::new();
    plc::generate(&frontend(input), &mut output).expect("generation should succeed");
    output
}

#[test]
fn minimal_program_runs_and_generates() {
    let input = "DEF main() DO RETURN 0; END";
    let evaluation = run(input);
    assert_eq!(evaluation.value, PlcObject::Integer(BigInt::from(0)));
    assert!(evaluation.output.is_empty());

    let output = generated(input);
    assert!(output.starts_with("public class Main {"));
    assert!(output.contains("System.exit(new Main().main());"));
    assert!(output.contains("int main() {"));
    assert!(output.contains("return 0;"));
}

#[test]
fn fields_are_mutable_from_methods() {
    let evaluation = run("LET x = 1; DEF main() DO x = x + 2; print(x); RETURN 0; END");
    assert_eq!(evaluation.output, vec!["3"]);
    assert_eq!(evaluation.value, PlcObject::Integer(BigInt::from(0)));
}

#[test]
fn if_branches_select_at_runtime() {
    let evaluation =
        run(r#"DEF main() DO IF TRUE DO print("t"); ELSE print("f"); END RETURN 0; END"#);
    assert_eq!(evaluation.output, vec!["t"]);
}

#[test]
fn for_loops_accumulate_over_a_range() {
    let evaluation = run(indoc! {r#"
        DEF main() DO
            LET s = "";
            FOR i IN range(0, 3) DO
                s = s + ".";
            END
            print(s);
            RETURN 0;
        END
    "#});
    assert_eq!(evaluation.output, vec!["..."]);
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let source = frontend("DEF main() DO print(1 / 0); RETURN 0; END");
    let err = plc::interpret(&source).expect_err("expected runtime failure");
    assert_eq!(err, RuntimeError::new("Division by zero."));
}

#[test]
fn uninitialized_untyped_declaration_is_an_analysis_error() {
    let tokens = plc::lex("DEF main() DO LET x; RETURN 0; END").expect("lex should succeed");
    let mut source = plc::parse(&tokens).expect("parse should succeed");
    let err = plc::analyze(&mut source).expect_err("expected analysis failure");
    assert_eq!(
        err.message,
        "Declaration must have a type or a value to infer it."
    );
    // The error carries the byte offset of the declaration's LET keyword.
    assert_eq!(err.index, Some(14));
}

#[test]
fn token_indices_are_monotonically_nondecreasing() {
    let input = indoc! {r#"
        LET greeting: String = "Hello,\nWorld!";
        DEF shout(times: Integer) DO
            FOR i IN range(0, times) DO
                print(greeting);
            END
            RETURN 0;
        END
        DEF main() DO
            RETURN shout(2);
        END
    "#};
    let tokens = plc::lex(input).expect("lex should succeed");
    for window in tokens.windows(2) {
        assert!(window[0].index <= window[1].index);
    }
}

#[test]
fn lex_and_parse_are_deterministic() {
    let input = "LET x = 1; DEF main() DO x = x + 2; print(x); RETURN 0; END";
    let first_tokens = plc::lex(input).expect("lex should succeed");
    let second_tokens = plc::lex(input).expect("lex should succeed");
    assert_eq!(first_tokens, second_tokens);
    let first = plc::parse(&first_tokens).expect("parse should succeed");
    let second = plc::parse(&second_tokens).expect("parse should succeed");
    assert_eq!(first, second);
}

#[test]
fn analysis_annotates_every_node() {
    let source = frontend(indoc! {r#"
        LET count: Integer = 0;
        DEF bump(by: Integer) : Integer DO
            count = count + by;
            RETURN count;
        END
        DEF main() DO
            IF (1 < 2) DO
                print(bump(2));
            END
            WHILE count < 4 DO
                print(bump(1));
            END
            RETURN count;
        END
    "#});
    for field in &source.fields {
        assert!(field.variable.is_some(), "field {} unbound", field.name);
        if let Some(value) = &field.value {
            assert_expr_annotated(value);
        }
    }
    for method in &source.methods {
        assert!(method.function.is_some(), "method {} unbound", method.name);
        for statement in &method.statements {
            assert_stmt_annotated(statement);
        }
    }
}

fn assert_stmt_annotated(statement: &Stmt) {
    match statement {
        Stmt::Expression { expr, .. } => assert_expr_annotated(expr),
        Stmt::Declaration {
            name,
            value,
            variable,
            ..
        } => {
            assert!(variable.is_some(), "declaration {name} unbound");
            if let Some(value) = value {
                assert_expr_annotated(value);
            }
        }
        Stmt::Assignment {
            receiver, value, ..
        } => {
            assert_expr_annotated(receiver);
            assert_expr_annotated(value);
        }
        Stmt::If {
            condition,
            then_statements,
            else_statements,
            ..
        } => {
            assert_expr_annotated(condition);
            then_statements.iter().for_each(assert_stmt_annotated);
            else_statements.iter().for_each(assert_stmt_annotated);
        }
        Stmt::For { iterable, body, .. } => {
            assert_expr_annotated(iterable);
            body.iter().for_each(assert_stmt_annotated);
        }
        Stmt::While {
            condition, body, ..
        } => {
            assert_expr_annotated(condition);
            body.iter().for_each(assert_stmt_annotated);
        }
        Stmt::Return { value, .. } => assert_expr_annotated(value),
    }
}

fn assert_expr_annotated(expr: &Expr) {
    assert!(expr.ty().is_some(), "expression has no resolved type: {expr:?}");
    match expr {
        Expr::Group { inner, .. } => assert_expr_annotated(inner),
        Expr::Binary { left, right, .. } => {
            assert_expr_annotated(left);
            assert_expr_annotated(right);
        }
        Expr::Access {
            receiver, variable, ..
        } => {
            assert!(variable.is_some());
            if let Some(receiver) = receiver {
                assert_expr_annotated(receiver);
            }
        }
        Expr::Function {
            receiver,
            args,
            function,
            ..
        } => {
            assert!(function.is_some());
            if let Some(receiver) = receiver {
                assert_expr_annotated(receiver);
            }
            args.iter().for_each(assert_expr_annotated);
        }
        Expr::Literal { .. } => {}
    }
}

#[test]
fn generated_text_is_well_braced_and_clean() {
    let output = generated(indoc! {r#"
        LET limit: Integer = 3;
        DEF sum() : Integer DO
            LET total = 0;
            FOR i IN range(0, limit) DO
                IF i != 1 DO
                    total = total + i;
                ELSE
                    print(i);
                END
            END
            RETURN total;
        END
        DEF main() DO
            RETURN sum();
        END
    "#});

    let mut depth = 0i64;
    for c in output.chars() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            _ => {}
        }
        assert!(depth >= 0, "unbalanced braces");
    }
    assert_eq!(depth, 0, "unbalanced braces");

    for line in output.lines() {
        assert_eq!(line.trim_end(), line, "trailing whitespace in {line:?}");
        let leading = line.len() - line.trim_start().len();
        assert_eq!(leading % 4, 0, "indentation is not a multiple of 4: {line:?}");
    }

    assert_eq!(generated("DEF main() DO RETURN 0; END"), generated("DEF main() DO RETURN 0; END"));
}

#[test]
fn exit_value_flows_out_of_main() {
    let evaluation = run(indoc! {r#"
        DEF main() DO
            LET code = 6 * 7;
            RETURN code;
        END
    "#});
    assert_eq!(evaluation.value, PlcObject::Integer(BigInt::from(42)));
}
