use std::fs;
use std::io::{self, Read};

use anyhow::{bail, Context, Result};
use num_traits::ToPrimitive;
use plc::PlcObject;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut backend_name = "interpreter".to_string();
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--backend" | "-b" => {
                backend_name = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("Missing backend name after {arg}"))?;
            }
            _ => {
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one input file is supported");
                }
                break;
            }
        }
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let tokens = plc::lex(&source)?;
    let mut program = plc::parse(&tokens)?;
    plc::analyze(&mut program)?;

    match backend_name.as_str() {
        "interpreter" => {
            let evaluation = plc::interpret(&program)?;
            for line in &evaluation.output {
                println!("{line}");
            }
            let code = match &evaluation.value {
                PlcObject::Integer(value) => value
                    .to_i32()
                    .ok_or_else(|| anyhow::anyhow!("Exit value out of range"))?,
                other => bail!(
                    "The program's main method returned {}, expected an Integer",
                    other.type_name()
                ),
            };
            std::process::exit(code);
        }
        "generator" => {
            let mut output = String::new();
            plc::generate(&program, &mut output)?;
            print!("{output}");
            Ok(())
        }
        other => bail!("Unknown backend '{other}'"),
    }
}
