//! Line-driven driver for the type-ahead control.
//!
//! Every stdin line is either replacement input text or a `:command`. After
//! each line the candidate list and any queued events are printed.

mod error;
mod file_source;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde_json::Value;
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::io::{AsyncBufReadExt, BufReader};
use typeahead::{
    BlurTarget, FetchOutcome, FormControl, SourceConfig, Typeahead, TypeaheadConfig,
    TypeaheadError, TypeaheadEvent,
};

use crate::error::CliError;
use crate::file_source::FileSource;

#[derive(Debug, Parser)]
#[command(name = "typeahead", about = "Drive a type-ahead control from stdin")]
struct Args {
    /// JSON file holding an array of candidates
    candidates: PathBuf,

    /// JSON file holding the control configuration (camelCase keys)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve candidates through a simulated lookup service instead of filtering locally
    #[arg(short, long)]
    remote: bool,

    /// Simulated service latency in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Where to write the debug log
    #[arg(long, default_value = "typeahead-cli.log")]
    log_file: PathBuf,
}

enum Command {
    Text(String),
    Select(usize),
    Focus,
    Blur,
    Clear,
    CreateNew,
    State,
}

impl Command {
    fn parse(line: &str) -> Result<Self, CliError> {
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Self::Text(line.to_string()));
        };
        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("select"), Some(n)) => n
                .parse()
                .map(Self::Select)
                .map_err(|_| CliError::UnknownCommand(line.to_string())),
            (Some("focus"), None) => Ok(Self::Focus),
            (Some("blur"), None) => Ok(Self::Blur),
            (Some("clear"), None) => Ok(Self::Clear),
            (Some("new"), None) => Ok(Self::CreateNew),
            (Some("state"), None) => Ok(Self::State),
            _ => Err(CliError::UnknownCommand(line.to_string())),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path)?;
    serde_json::from_str(&raw).map_err(|e| CliError::json(path.display().to_string(), e))
}

fn build(args: &Args) -> Result<Typeahead, CliError> {
    let config: TypeaheadConfig = match &args.config {
        Some(path) => read_json(path)?,
        None => TypeaheadConfig::default(),
    };

    let source = if args.remote {
        SourceConfig::remote(FileSource::new(
            args.candidates.clone(),
            Duration::from_millis(args.latency_ms),
        ))
    } else {
        let items: Vec<Value> = read_json(&args.candidates)?;
        SourceConfig::local(items)
    };

    Ok(Typeahead::new(config, source)?)
}

fn print_candidates(typeahead: &Typeahead) {
    let state = typeahead.query_state();
    if let Some(error) = &state.last_error {
        println!("! lookup failed: {}", error);
    }
    match &state.candidates {
        None => println!("(no list)"),
        Some(items) if items.is_empty() => {
            if state.has_no_suggestions {
                println!("(no suggestions)");
            }
        }
        Some(items) => {
            for (i, item) in items.iter().enumerate() {
                let marker = if i == typeahead.highlight() { '>' } else { ' ' };
                let label = typeahead
                    .display_string(item)
                    .unwrap_or_else(|_| item.to_string());
                println!("{} {:>2} {}", marker, i, label);
            }
        }
    }
}

fn print_events(typeahead: &Typeahead) {
    for event in typeahead.take_events() {
        match event {
            TypeaheadEvent::ModelChange(model) => println!("* modelChange {}", show(model.as_ref())),
            TypeaheadEvent::OptionSelected(item) => println!("* optionSelected {}", item),
            TypeaheadEvent::CreateNew(model) => println!("* createNew {}", show(model.as_ref())),
        }
    }
}

fn show(value: Option<&Value>) -> String {
    value.map_or_else(|| "null".to_string(), Value::to_string)
}

async fn run(typeahead: &Typeahead, command: Command) -> Result<(), CliError> {
    match command {
        Command::Text(text) => {
            let outcome = match typeahead.set_input_text(text).await {
                Err(TypeaheadError::Fetch(_)) => return Ok(()),
                other => other?,
            };
            if outcome == FetchOutcome::Skipped {
                println!("(waiting for more input)");
            }
        }
        Command::Select(index) => {
            let picked = typeahead.candidates().and_then(|c| c.get(index).cloned());
            match picked {
                Some(item) => typeahead.select(item)?,
                None => println!("(no candidate {})", index),
            }
        }
        Command::Focus => {
            if let Err(e) = typeahead.on_focus().await {
                if e.is_configuration() {
                    return Err(e.into());
                }
            }
        }
        Command::Blur => typeahead.on_blur(BlurTarget::Elsewhere)?,
        Command::Clear => typeahead.clear(),
        Command::CreateNew => typeahead.create_new()?,
        Command::State => {
            println!(
                "text={:?} model={} outstanding={} prefetched={}",
                typeahead.text(),
                show(typeahead.form_value().as_ref()),
                typeahead.outstanding_requests(),
                typeahead.is_prefetched()
            );
        }
    }
    Ok(())
}

async fn session(args: Args) -> Result<(), CliError> {
    let typeahead = build(&args)?;
    typeahead.register_on_change(std::sync::Arc::new(|value: Option<Value>| {
        log::info!("form value changed to {}", show(value.as_ref()));
    }));
    if let Err(e) = typeahead.initialize().await {
        if e.is_configuration() {
            return Err(e.into());
        }
    }
    print_candidates(&typeahead);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(line.trim_end()) {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        run(&typeahead, command).await?;
        print_candidates(&typeahead);
        print_events(&typeahead);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let logger = File::create(&args.log_file)
        .map_err(CliError::from)
        .and_then(|file| Ok(WriteLogger::init(LevelFilter::Debug, Config::default(), file)?));
    if let Err(e) = logger {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = session(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert!(matches!(Command::parse("app").unwrap(), Command::Text(t) if t == "app"));
        assert!(matches!(Command::parse(":select 2").unwrap(), Command::Select(2)));
        assert!(matches!(Command::parse(":state").unwrap(), Command::State));
        assert!(Command::parse(":select x").is_err());
        assert!(Command::parse(":bogus").is_err());
    }
}
