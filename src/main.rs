//! tool-migrate: migrate and validate scripted `tool` invocations.
//!
//! Usage:
//!   tool-migrate migrate [FILE]            rewrite legacy syntax, print the script
//!   tool-migrate validate [FILE]           check every invocation against the dictionary
//!   tool-migrate suggest WORD [COMMAND]    rank corrections for a main or subcommand
//!
//! Options:
//!   --config PATH    load this file instead of ~/.config/tool-migrate/config.toml
//!   --json           machine-readable output
//!   --strict         validate: stop at the first line that does not parse
//!   --jobs N         worker threads for migrate (0 = one per CPU)
//!   -v, -vv          more logging on stderr
//!   --dump-config    print the effective configuration and exit
//!
//! Input comes from FILE or stdin; output goes to stdout.

use std::io::Read;
use std::num::NonZeroUsize;
use std::process::exit;

use tool_migrate::config::Config;
use tool_migrate::engine::Engine;
use tool_migrate::eval::Validator;
use tool_migrate::parse::ParseError;

// ─── Arguments ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Migrate,
    Validate,
    Suggest,
}

#[derive(Debug, Default)]
struct Args {
    mode: Option<Mode>,
    positional: Vec<String>,
    config: Option<String>,
    json: bool,
    strict: bool,
    jobs: Option<usize>,
    verbosity: u8,
    dump_config: bool,
}

fn usage() -> ! {
    eprintln!("usage: tool-migrate <migrate|validate|suggest> [--config PATH] [--json] [--strict] [--jobs N] [-v] [--dump-config] [ARGS]");
    exit(2);
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "migrate" if args.mode.is_none() => args.mode = Some(Mode::Migrate),
            "validate" if args.mode.is_none() => args.mode = Some(Mode::Validate),
            "suggest" if args.mode.is_none() => args.mode = Some(Mode::Suggest),
            "--config" => match iter.next() {
                Some(path) => args.config = Some(path),
                None => usage(),
            },
            "--json" => args.json = true,
            "--strict" => args.strict = true,
            "--jobs" => match iter.next().and_then(|n| n.parse().ok()) {
                Some(n) => args.jobs = Some(n),
                None => usage(),
            },
            "-v" => args.verbosity += 1,
            "-vv" => args.verbosity += 2,
            "--dump-config" => args.dump_config = true,
            "-h" | "--help" => usage(),
            other if other.starts_with('-') && other != "-" => {
                eprintln!("unknown option: {other}");
                usage();
            }
            _ => args.positional.push(arg),
        }
    }
    args
}

// ─── Helpers ─────────────────────────────────────────

fn load_config(path: Option<&str>) -> Config {
    match path {
        Some(path) => match Config::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                exit(2);
            }
        },
        None => Config::load(),
    }
}

/// Read FILE, or stdin when it is absent or `-`.
fn read_input(path: Option<&str>) -> String {
    let result = match path {
        Some(path) if path != "-" => std::fs::read_to_string(path),
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input).map(|_| input)
        }
    };
    match result {
        Ok(input) => input,
        Err(e) => {
            eprintln!("failed to read {}: {e}", path.unwrap_or("stdin"));
            exit(2);
        }
    }
}

fn jobs(requested: usize) -> NonZeroUsize {
    NonZeroUsize::new(requested)
        .or_else(|| std::thread::available_parallelism().ok())
        .unwrap_or(NonZeroUsize::MIN)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("failed to serialize output: {e}");
            exit(2);
        }
    }
}

// ─── Subcommands ─────────────────────────────────────

fn migrate(config: &Config, args: &Args) -> i32 {
    let engine = match Engine::from_config(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("invalid rule configuration: {e}");
            return 2;
        }
    };
    let input = read_input(args.positional.first().map(String::as_str));
    let jobs = jobs(args.jobs.unwrap_or(config.settings.jobs));
    let result = engine.apply_script_parallel(&input, jobs);
    log::info!(
        "migrated {} line(s): {} changed, {} change(s)",
        result.lines.len(),
        result.changed_lines().len(),
        result.change_count()
    );

    if args.json {
        print_json(&result);
    } else {
        print!("{}", result.render(engine.header()));
    }
    0
}

fn validate(config: &Config, args: &Args) -> i32 {
    let validator = Validator::from_config(config);
    let input = read_input(args.positional.first().map(String::as_str));

    let mut invalid = 0;
    let mut report = Vec::new();
    for (line_no, outcome) in validator.validate_script(&input) {
        match outcome {
            Ok(validation) => {
                if !validation.classification.is_valid() {
                    invalid += 1;
                }
                if args.json {
                    report.push(serde_json::json!({ "line": line_no, "validation": validation }));
                } else if !validation.classification.is_valid() {
                    let mut message = format!(
                        "{line_no}: [{}] {}",
                        validation.classification.label(),
                        validation.classification
                    );
                    if !validation.suggestions.is_empty() {
                        let names: Vec<&str> =
                            validation.suggestions.iter().map(|s| s.candidate.as_str()).collect();
                        message.push_str(&format!(" (did you mean: {}?)", names.join(", ")));
                    }
                    println!("{message}");
                }
            }
            Err(e) if args.strict => {
                eprintln!("{line_no}: {e}");
                return 1;
            }
            Err(ParseError::NotRecognizedInvocation { .. }) => {
                log::debug!("line {line_no}: not an invocation, skipped");
            }
            Err(e) => {
                invalid += 1;
                if args.json {
                    report.push(serde_json::json!({ "line": line_no, "error": e.to_string() }));
                } else {
                    println!("{line_no}: [ERROR] {e}");
                }
            }
        }
    }

    if args.json {
        print_json(&report);
    }
    log::info!("validation finished: {invalid} problem(s)");
    if invalid > 0 { 1 } else { 0 }
}

fn suggest(config: &Config, args: &Args) -> i32 {
    let Some(word) = args.positional.first() else {
        usage();
    };
    let validator = Validator::from_config(config);
    let dictionary = validator.dictionary();
    let max = config.suggest.max;

    let results = match args.positional.get(1) {
        Some(command) => match dictionary.subcommands(command) {
            Some(pool) => validator.suggester().rank(word, pool, max),
            None => {
                eprintln!("unrecognized command: {command}");
                return 1;
            }
        },
        None => validator.suggester().rank(word, &dictionary.main_commands(), max),
    };

    if args.json {
        print_json(&results);
    } else {
        for result in &results {
            println!("{}\t{:.3}", result.candidate, result.score);
        }
    }
    if results.is_empty() { 1 } else { 0 }
}

fn main() {
    let args = parse_args();
    tool_migrate::logging::init(args.verbosity);

    let config = load_config(args.config.as_deref());
    if args.dump_config {
        match config.to_toml() {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("failed to serialize config: {e}");
                exit(2);
            }
        }
        return;
    }

    let code = match args.mode {
        Some(Mode::Migrate) => migrate(&config, &args),
        Some(Mode::Validate) => validate(&config, &args),
        Some(Mode::Suggest) => suggest(&config, &args),
        None => usage(),
    };
    exit(code);
}
