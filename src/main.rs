mod cli;
mod config;
mod lib;
mod load;

use std::path::Path;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use thiserror::Error;
use tracing::{info, subscriber::set_global_default, Level};
use tracing_subscriber::EnvFilter;

use cli::{
    table::Table,
    template::{self, Session},
};
use config::{Config, ConfigError};
use lib::tag::{Part, Results};
use load::error::Record;

#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Failed to write {0}: {1}")]
    Write(String, #[source] std::io::Error),
}

fn init_tracing(verbosity: u64) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();
    if let Err(e) = set_global_default(subscriber) {
        eprintln!("Logging disabled: {}", e);
    }
}

fn file_arg() -> Arg<'static, 'static> {
    Arg::with_name("FILE")
        .help("Submission file to read")
        .required(true)
        .index(1)
}

fn output_arg() -> Arg<'static, 'static> {
    Arg::with_name("output")
        .short("o")
        .long("output")
        .value_name("OUT")
        .help("Write to OUT rather than to standard output")
}

fn app() -> App<'static, 'static> {
    App::new("ecfformat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate and format ECF results submission files")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .multiple(true)
                .help("Log more (repeat for more detail)"),
        )
        .arg(
            Arg::with_name("config")
                .short("c")
                .long("config")
                .value_name("CONFIG")
                .help("Read settings from CONFIG rather than ecfformat.toml"),
        )
        .subcommand(
            SubCommand::with_name("check")
                .about("Print the problems found in a submission")
                .arg(file_arg())
                .arg(
                    Arg::with_name("stop-at")
                        .long("stop-at")
                        .value_name("PART")
                        .validator(|s| {
                            s.parse::<Part>()
                                .map(|_| ())
                                .map_err(|()| format!("'{}' is not a part of a submission", s))
                        })
                        .help("Stop before the first PART, e.g. player-list to check event details only"),
                ),
        )
        .subcommand(
            SubCommand::with_name("format")
                .about("Rewrite a submission with one part or record per line")
                .arg(file_arg())
                .arg(output_arg()),
        )
        .subcommand(
            SubCommand::with_name("summary")
                .about("Count the records, fields and errors of each part")
                .arg(file_arg()),
        )
        .subcommand(
            SubCommand::with_name("template")
                .about("Print a blank submission to fill in")
                .arg(
                    Arg::with_name("session")
                        .long("session")
                        .value_name("FORM")
                        .possible_values(&["1", "2", "3", "multi"])
                        .default_value("1")
                        .help("Time control: sessions before the end of the game"),
                )
                .arg(
                    Arg::with_name("results")
                        .long("results")
                        .value_name("KIND")
                        .possible_values(&["match", "other", "section"])
                        .default_value("match")
                        .help("Kind of results part"),
                )
                .arg(output_arg()),
        )
}

/// Print `text` or write it to the file named by `--output`
fn emit(text: &str, sub: &ArgMatches) -> Result<(), AppError> {
    match sub.value_of("output") {
        Some(out) => {
            std::fs::write(out, text).map_err(|e| AppError::Write(out.to_string(), e))?;
            info!(file = out, "written");
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Run a subcommand, `false` if the submission has fatal errors
fn run(matches: &ArgMatches) -> Result<bool, AppError> {
    let config = Config::load(matches.value_of("config").map(Path::new))?;
    let (name, sub) = match matches.subcommand() {
        (name, Some(sub)) => (name, sub),
        _ => unreachable!(),
    };
    if name == "template" {
        let session = sub
            .value_of("session")
            .and_then(|s| s.parse::<Session>().ok())
            .unwrap_or(Session::One);
        let kind = sub
            .value_of("results")
            .and_then(|s| s.parse::<Results>().ok())
            .unwrap_or(Results::Match);
        emit(&template::skeleton(session, kind).to_string(), sub)?;
        return Ok(true);
    }
    let file = sub.value_of("FILE").unwrap_or_default();
    let stop_at = sub.value_of("stop-at").and_then(|s| s.parse::<Part>().ok());
    let mut errs = Record::new();
    let doc = load::read_document(file, &mut errs, &config, stop_at);
    eprint!("{}", errs);
    match (name, doc) {
        ("check", Some(doc)) => {
            if doc.is_valid() && !errs.is_fatal() {
                println!("{}: no errors", file);
            } else {
                println!("{}: {} field(s) in error", file, doc.count_errors());
            }
        }
        ("format", Some(doc)) => emit(&doc.to_string(), sub)?,
        ("summary", Some(doc)) => print!("{}", Table::from(&doc).with_title(file)),
        _ => (),
    }
    Ok(!errs.is_fatal())
}

fn main() {
    let matches = app().get_matches();
    init_tracing(matches.occurrences_of("verbose"));
    match run(&matches) {
        Ok(true) => (),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}
