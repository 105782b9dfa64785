use clap::{Parser as ClapParser, Subcommand};
use safe_expr::cli::{self, CliError, EvalOptions};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "safexpr")]
#[command(about = "safexpr - Evaluate sandboxed workflow expressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression
    Eval {
        /// The expression to evaluate
        expression: String,

        /// JSON bound to `context` (reads from stdin if not provided)
        #[arg(short, long)]
        context: Option<String>,

        /// JSON object of step results, keyed by step name
        #[arg(short, long)]
        steps: Option<String>,

        /// JSON object of variables for this evaluation
        #[arg(long)]
        vars: Option<String>,

        /// Time budget in milliseconds
        #[arg(long, env = "SAFEXPR_TIMEOUT_MS")]
        timeout_ms: Option<u64>,

        /// Longest accepted expression, in characters
        #[arg(long, env = "SAFEXPR_MAX_LENGTH")]
        max_length: Option<usize>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// List the step names an expression depends on
    Refs {
        /// The expression to scan
        expression: String,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'safexpr docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            expression,
            context,
            steps,
            vars,
            timeout_ms,
            max_length,
            pretty,
        } => run_eval(
            EvalOptions {
                expression,
                context,
                steps,
                vars,
                timeout_ms,
                max_length,
            },
            pretty,
        ),
        Commands::Refs { expression } => {
            for name in cli::execute_refs(&expression) {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_eval(mut options: EvalOptions, pretty: bool) -> Result<(), CliError> {
    if options.context.is_none() && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        if !buffer.trim().is_empty() {
            options.context = Some(buffer);
        }
    }

    let output = cli::execute_eval(&options)?;
    let json = if pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    }?;
    println!("{}", json);
    Ok(())
}
