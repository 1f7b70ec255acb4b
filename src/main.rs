mod debug_report;

use declmark::{Interface, Options, ReportOptions};
use std::io::{self, IsTerminal, Read};
use tracing_subscriber::EnvFilter;

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_tracing();

    let iface = match Interface::from_script(&config.script, config.options) {
        Ok(iface) => iface,
        Err(err) => {
            eprintln!("error: {}: {err}", config.source);
            std::process::exit(1);
        }
    };

    let report = iface.report(&config.report);
    debug_report::print_run(&config.source, &report, config.color);
}

/// Logging is off unless `DECLMARK_LOG` is set, e.g. `DECLMARK_LOG=declmark=trace`.
fn init_tracing() {
    let Ok(filter) = EnvFilter::try_from_env("DECLMARK_LOG") else {
        return;
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

struct CliConfig {
    script: String,
    source: String,
    options: Options,
    report: ReportOptions,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut path: Option<String> = None;
    let mut options = Options::default();
    let mut report = ReportOptions::default();
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("declmark {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--compact" => options.compact_default_args = true,
            "--all" => report.include_inactive = true,
            "--wrapper-prefix" => {
                options.wrapper_prefix =
                    args.next().ok_or_else(|| "error: --wrapper-prefix expects a value".to_string())?;
            }
            "--overload-prefix" => {
                options.overload_prefix =
                    args.next().ok_or_else(|| "error: --overload-prefix expects a value".to_string())?;
            }
            "--feature" | "-f" => {
                let value = args.next().ok_or_else(|| "error: --feature expects a value".to_string())?;
                report.features.push(value);
            }
            _ if arg.starts_with("--wrapper-prefix=") => {
                options.wrapper_prefix = arg.trim_start_matches("--wrapper-prefix=").to_string();
            }
            _ if arg.starts_with("--overload-prefix=") => {
                options.overload_prefix = arg.trim_start_matches("--overload-prefix=").to_string();
            }
            _ if arg.starts_with("--feature=") => {
                report.features.push(arg.trim_start_matches("--feature=").to_string());
            }
            "-" => set_path(&mut path, arg)?,
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => set_path(&mut path, arg)?,
        }
    }

    let (script, source) = match path.as_deref() {
        None | Some("-") => (read_stdin_input()?, "<stdin>".to_string()),
        Some(file) => {
            let script =
                std::fs::read_to_string(file).map_err(|err| format!("error: failed to read '{file}': {err}"))?;
            (script, file.to_string())
        }
    };

    if script.trim().is_empty() {
        return Err(format!("error: no input provided\n\n{}", help_text()));
    }

    Ok(CliConfig { script, source, options, report, color })
}

fn set_path(path: &mut Option<String>, arg: String) -> Result<(), String> {
    if path.is_some() {
        return Err("error: input provided multiple times".to_string());
    }
    *path = Some(arg);
    Ok(())
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "declmark {version}

Resolve declaration features for an interface script.

Usage:
  declmark [OPTIONS] [<script>]

Reads the script from <script>, or from stdin when it is omitted or '-'.

Options:
  -f, --feature <name>         Only report this feature (repeatable).
  --all                        Also report matched but disabled features.
  --compact                    Do not expand default arguments.
  --wrapper-prefix <prefix>    Prefix of wrapper names. Default: {wrapper}
  --overload-prefix <prefix>   Prefix of overload suffixes. Default: {overload}
  --color                      Force ANSI color output.
  --no-color                   Disable ANSI color output.
  -h, --help                   Show this help message.
  -V, --version                Print version information.

Environment:
  DECLMARK_LOG                 Log filter, e.g. 'declmark=debug'.

Exit codes:
  0  Success.
  1  The script could not be read.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        wrapper = Options::default().wrapper_prefix,
        overload = Options::default().overload_prefix,
    )
}
