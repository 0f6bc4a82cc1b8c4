mod debug_report;

use colloquy::{Options, Response, RuleStore, Session, default_store};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "COLLOQUY_LOG";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let loaded;
    let store: &RuleStore = if config.scripts.is_empty() {
        default_store()
    } else {
        loaded = match load_scripts(&config.scripts) {
            Ok(store) => store,
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(1);
            }
        };
        &loaded
    };

    if config.check {
        let problems = store.validate(&config.options.default_key);
        for problem in &problems {
            println!("{problem}");
        }
        if !problems.is_empty() {
            std::process::exit(1);
        }
        println!("ok: {} keys, {} decompositions", store.keys().len(), store.decomposition_count());
        return;
    }

    if let Err(err) = run(store, &config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

struct CliConfig {
    scripts: Vec<PathBuf>,
    options: Options,
    check: bool,
    trace: bool,
    color: bool,
}

fn load_scripts(paths: &[PathBuf]) -> colloquy::Result<RuleStore> {
    let mut builder = RuleStore::builder();
    for path in paths {
        builder.load_path(path)?;
    }
    Ok(builder.build())
}

/// Read lines until a quit phrase or end of input.
fn run(store: &RuleStore, config: &CliConfig) -> io::Result<()> {
    let mut session = Session::new(store, config.options.clone());
    let interactive = io::stdin().is_terminal();
    let mut stdout = io::stdout();

    if let Some(greeting) = session.start_session() {
        println!("{greeting}");
    }

    let mut lines = io::stdin().lock().lines();
    loop {
        if interactive {
            print!("> ");
            stdout.flush()?;
        }
        let Some(line) = lines.next().transpose()? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let (response, trace) = session.respond_verbose(&line);
        if config.trace {
            debug_report::print_turn(&line, &trace, config.color);
        }
        match response {
            Ok(Response::Reply(text)) => println!("{text}"),
            Ok(Response::Quit) => break,
            Err(err) => eprintln!("error: {err}"),
        }
    }

    if let Some(farewell) = session.end_session() {
        println!("{farewell}");
    }
    Ok(())
}

fn parse_args() -> Result<CliConfig, String> {
    let mut scripts = Vec::new();
    let mut options = Options::default();
    let mut check = false;
    let mut trace = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("colloquy {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--check" => check = true,
            "--trace" => trace = true,
            "--dedupe-keys" => options.dedupe_keys = true,
            "--script" | "-s" => {
                let value = args.next().ok_or_else(|| "error: --script expects a path".to_string())?;
                scripts.push(PathBuf::from(value));
            }
            "--seed" => {
                let value = args.next().ok_or_else(|| "error: --seed expects a value".to_string())?;
                options.seed = Some(parse_seed(&value)?);
            }
            "--default-key" => {
                options.default_key = args.next().ok_or_else(|| "error: --default-key expects a key".to_string())?;
            }
            _ if arg.starts_with("--script=") => {
                scripts.push(PathBuf::from(arg.trim_start_matches("--script=")));
            }
            _ if arg.starts_with("--seed=") => {
                options.seed = Some(parse_seed(arg.trim_start_matches("--seed="))?);
            }
            _ if arg.starts_with("--default-key=") => {
                options.default_key = arg.trim_start_matches("--default-key=").to_string();
            }
            _ => {
                return Err(format!("error: unknown argument '{arg}'\n\n{}", help_text()));
            }
        }
    }

    Ok(CliConfig { scripts, options, check, trace, color })
}

fn parse_seed(value: &str) -> Result<u64, String> {
    value.parse().map_err(|_| format!("error: invalid --seed '{value}' (expected an unsigned integer)"))
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "colloquy {version}

Rule-driven conversational engine. Reads one line of input per turn from
stdin and answers on stdout until a quit phrase or end of input.

Usage:
  colloquy [OPTIONS]

Options:
  -s, --script <path>        Load a script file, or every file in a directory.
                             Repeatable; later scripts extend earlier ones.
                             Default: the bundled doctor script.
  --seed <n>                 Seed the session's random choices.
  --default-key <key>        Key used when nothing else answers. Default: xnone
  --dedupe-keys              Try a key once per turn even if its word repeats.
  --check                    Validate the scripts and exit.
  --trace                    Print a trace of every turn.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Environment:
  {log_env}                Log filter for stderr diagnostics. Default: warn

Exit codes:
  0  Success.
  1  Script could not be loaded or failed validation.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        log_env = LOG_ENV,
    )
}
