//! # rcape
//!
//! Command-line front end for the validated Robotics Cape gateway.
//!
//! # Usage
//!
//! ```bash
//! # List every operation with its parameters
//! rcape list
//!
//! # One call against the simulated board
//! rcape -s call set_motor 3 0.5
//!
//! # Run a script on the real board, JSON output
//! rcape --config /etc/rcape/cape.toml -d roboticscape --json script moves.txt
//!
//! # Show the effective configuration
//! rcape --config cape.toml config
//! ```

use clap::{Parser, Subcommand};
use rcape_common::cape::config::GatewayConfig;
use rcape_common::cape::error::GatewayError;
use rcape_common::config::LogLevel;
use rcape_gateway::core::Gateway;
use rcape_gateway::driver_registry::DriverRegistry;
use rcape_gateway::operation::OperationSpec;
use rcape_gateway::script::{self, Outcome, ScriptRunner};
use rcape_gateway::table::{OPERATIONS, Op};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// rcape - validated command gateway for the BeagleBone Robotics Cape
#[derive(Parser, Debug)]
#[command(name = "rcape")]
#[command(version)]
#[command(about = "Validated command gateway for the BeagleBone Robotics Cape")]
#[command(long_about = None)]
struct Args {
    /// Path to the gateway configuration file (cape.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Force the simulation driver
    #[arg(short = 's', long)]
    simulate: bool,

    /// Driver to load (overrides the configuration)
    #[arg(short, long)]
    driver: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output results and logs in JSON format
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the operation table
    List,

    /// Initialize the hardware, run one operation, clean up
    Call {
        /// Operation name, with or without the rc_ prefix
        op: String,
        /// Positional arguments
        #[arg(allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run one operation per line from a file or stdin
    Script {
        /// Script file; stdin when omitted
        file: Option<PathBuf>,
        /// Continue after a failing line
        #[arg(short, long)]
        keep_going: bool,
        /// Leave initialize/cleanup to the script
        #[arg(long)]
        manual_init: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() {
    if let Err(e) = run() {
        error!("rcape failed: {}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GatewayConfig::load_file(path)?,
        None => GatewayConfig::default(),
    };
    if args.simulate {
        config.gateway.driver = "simulation".to_string();
    } else if let Some(driver) = &args.driver {
        config.gateway.driver = driver.clone();
    }

    setup_tracing(&args, config.shared.log_level);
    info!(
        service = %config.shared.service_name,
        driver = %config.gateway.driver,
        "rcape v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    match &args.command {
        Command::List => print_operations(args.json)?,
        Command::Config => print!("{}", toml::to_string_pretty(&config)?),
        Command::Call { op, args: tokens } => {
            let gateway = Gateway::from_config(&config, &DriverRegistry::with_builtin())?;
            call_once(&gateway, op, tokens, args.json)?;
        }
        Command::Script {
            file,
            keep_going,
            manual_init,
        } => {
            let gateway = Gateway::from_config(&config, &DriverRegistry::with_builtin())?;
            let input: Box<dyn BufRead> = match file {
                Some(path) => Box::new(BufReader::new(File::open(path)?)),
                None => Box::new(io::stdin().lock()),
            };
            let json = args.json;
            let runner = ScriptRunner::new(*keep_going);
            let report = |o: &Outcome| print_outcome(o, json);
            let summary = if *manual_init {
                runner.run(&gateway, input, report)?
            } else {
                runner.run_managed(&gateway, input, report)?
            };
            info!(
                executed = summary.executed,
                failed = summary.failed,
                "Script finished"
            );
            if summary.failed > 0 {
                return Err(format!(
                    "{} of {} line(s) failed",
                    summary.failed, summary.executed
                )
                .into());
            }
        }
    }

    Ok(())
}

/// Run one operation, wrapping it in initialize/cleanup unless it is one.
fn call_once(
    gateway: &Gateway,
    name: &str,
    tokens: &[String],
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let line = std::iter::once(name)
        .chain(tokens.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    let Some(cmd) = script::parse_line(&line)? else {
        return Err(GatewayError::UnknownOperation(name.to_string()).into());
    };

    let wrap = !cmd.op.spec().is_lifecycle();
    if wrap {
        gateway.initialize()?;
    }
    let result = gateway.dispatch(cmd.op, &cmd.args);
    let shutdown = if wrap { gateway.shutdown() } else { Ok(false) };

    let outcome = Outcome {
        line: 1,
        op: cmd.op.name().to_string(),
        value: result.as_ref().ok().cloned(),
        error: result.as_ref().err().map(ToString::to_string),
    };
    print_outcome(&outcome, json);
    result?;
    shutdown?;
    Ok(())
}

fn print_outcome(outcome: &Outcome, json: bool) {
    if json {
        match serde_json::to_string(outcome) {
            Ok(text) => println!("{text}"),
            Err(e) => error!("Failed to serialize outcome: {}", e),
        }
        return;
    }
    match (&outcome.value, &outcome.error) {
        (_, Some(err)) => println!("{:>4}  {:<34} error: {}", outcome.line, outcome.op, err),
        (Some(value), None) => println!("{:>4}  {:<34} {}", outcome.line, outcome.op, value),
        (None, None) => println!("{:>4}  {:<34}", outcome.line, outcome.op),
    }
}

#[derive(Serialize)]
struct OperationRow<'a> {
    name: &'a str,
    native: &'a str,
    signature: String,
    params: Vec<ParamRow<'a>>,
    result: rcape_gateway::operation::ResultKind,
    summary: &'a str,
}

#[derive(Serialize)]
struct ParamRow<'a> {
    name: &'a str,
    kind: rcape_common::cape::value::ParamKind,
    constraint: String,
}

impl<'a> From<&'a OperationSpec> for OperationRow<'a> {
    fn from(spec: &'a OperationSpec) -> Self {
        Self {
            name: spec.name,
            native: spec.native,
            signature: spec.signature(),
            params: spec
                .params
                .iter()
                .map(|p| ParamRow {
                    name: p.name,
                    kind: p.kind,
                    constraint: p.constraint.to_string(),
                })
                .collect(),
            result: spec.result,
            summary: spec.summary,
        }
    }
}

fn print_operations(json: bool) -> Result<(), serde_json::Error> {
    if json {
        let rows: Vec<OperationRow<'_>> = OPERATIONS.iter().map(OperationRow::from).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }
    for op in Op::all() {
        let spec = op.spec();
        println!("{:<58} {}", spec.signature(), spec.summary);
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and configuration.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        configured
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    // Logs go to stderr so results on stdout stay machine-readable.
    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
}
