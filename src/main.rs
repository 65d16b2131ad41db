//! CLI tool to render, evaluate, check, and format templates.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};
use rift_rs::{Mode, Object, Value, compile, evaluate, format, formatter};
use tracing::Level;

#[derive(Parser)]
#[command(name = "rift", version, about = "Render and evaluate templates")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log to stderr: -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args)]
struct Variables {
    /// JSON file holding an object of variables
    #[arg(long, value_name = "FILE")]
    vars: Option<PathBuf>,

    /// Set one variable; the value is read as JSON when it parses, else as a string
    #[arg(long = "var", value_name = "NAME=VALUE")]
    var: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Render template files to stdout
    Render {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        variables: Variables,
    },

    /// Evaluate a single expression
    Eval {
        expression: String,

        #[command(flatten)]
        variables: Variables,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that template files compile
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the syntax tree of a template
    Ast {
        template: String,

        /// Parse as a bare expression instead of a template
        #[arg(long)]
        direct: bool,
    },

    /// Print template files in canonical form
    Fmt {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Render { files, variables } => {
            let vars = match load_variables(&variables) {
                Ok(vars) => vars,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::from(2);
                }
            };
            for_each_file(&files, |path, content| match format(content, &vars) {
                Ok(output) => {
                    print!("{output}");
                    true
                }
                Err(e) => {
                    eprintln!("{}: {}", path.display(), e.pretty_print());
                    false
                }
            })
        }
        Command::Eval {
            expression,
            variables,
            json,
        } => {
            let vars = match load_variables(&variables) {
                Ok(vars) => vars,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return ExitCode::from(2);
                }
            };
            match evaluate(&expression, &vars) {
                Ok(value) if json => {
                    println!("{}", serde_json::Value::from(&value));
                    ExitCode::SUCCESS
                }
                Ok(value) => {
                    println!("{value}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{}", e.pretty_print());
                    ExitCode::FAILURE
                }
            }
        }
        Command::Check { files } => for_each_file(&files, |path, content| {
            match compile(content, Mode::Template) {
                Ok(script) => {
                    let nodes = script.root().node_count();
                    eprintln!("{}: valid ({nodes} node(s))", path.display());
                    true
                }
                Err(e) => {
                    eprintln!("{}: {}", path.display(), e.pretty_print());
                    false
                }
            }
        }),
        Command::Ast { template, direct } => {
            let mode = if direct { Mode::Direct } else { Mode::Template };
            match compile(&template, mode) {
                Ok(script) => {
                    println!("{}", script.to_debug_string());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{}", e.pretty_print());
                    ExitCode::FAILURE
                }
            }
        }
        Command::Fmt { files } => for_each_file(&files, |path, content| {
            match compile(content, Mode::Template) {
                Ok(script) => {
                    print!("{}", formatter::format_template(script.root()));
                    true
                }
                Err(e) => {
                    eprintln!("{}: {}", path.display(), e.pretty_print());
                    false
                }
            }
        }),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Run `handle` on every readable file; failure if any read or handler
/// call failed.
fn for_each_file(files: &[PathBuf], mut handle: impl FnMut(&Path, &str) -> bool) -> ExitCode {
    let mut had_error = false;

    for path in files {
        tracing::debug!(path = %path.display(), "processing file");
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                had_error = true;
                continue;
            }
        };
        if !handle(path, &content) {
            had_error = true;
        }
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn load_variables(args: &Variables) -> Result<Object, String> {
    let mut vars = match &args.vars {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
            let json: serde_json::Value =
                serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))?;
            match Value::from(json) {
                Value::Object(vars) => vars,
                other => {
                    return Err(format!(
                        "{}: expected a JSON object, found {}",
                        path.display(),
                        other.type_name()
                    ));
                }
            }
        }
        None => Object::new(),
    };

    for assignment in &args.var {
        let Some((name, raw)) = assignment.split_once('=') else {
            return Err(format!("invalid --var '{assignment}', expected NAME=VALUE"));
        };
        let value = serde_json::from_str::<serde_json::Value>(raw)
            .map_or_else(|_| Value::String(raw.to_string()), Value::from);
        vars.insert(name.to_string(), value);
    }

    Ok(vars)
}
