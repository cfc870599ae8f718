//! delim-template CLI
//!
//! Usage:
//!   delim-template [OPTIONS] [FILES]...
//!
//! Options:
//!   -c, --config <FILE>        Fill file with delimiters, default and values (TOML)
//!   -o, --open <S>             Open delimiter (default "{{")
//!       --close <S>            Close delimiter (defaults to the open delimiter)
//!   -d, --default <S>          Value for placeholders left unassigned
//!   -s, --set <KEY=VALUE>      Assign a value (repeatable)
//!       --strict               Fail on values that match no placeholder
//!   -l, --list                 List placeholders instead of rendering
//!   -v, --verbose              Debug logging on stderr
//!   -h, --help                 Print help

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use delim_template::{Delimiters, FillConfig, TemplateEngine, TemplateSource};

#[derive(Parser)]
#[command(name = "delim-template")]
#[command(about = "Fill delimited placeholders in text templates")]
struct Cli {
    /// Template files (reads stdin if none are given and the fill file has no template)
    inputs: Vec<PathBuf>,

    /// Fill file with delimiters, default value and values (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Open delimiter
    #[arg(short, long)]
    open: Option<String>,

    /// Close delimiter (defaults to the open delimiter when --open is given)
    #[arg(long)]
    close: Option<String>,

    /// Value for placeholders left unassigned
    #[arg(short, long)]
    default: Option<String>,

    /// Assign a value, e.g. --set name=world
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,

    /// Fail on values that match no placeholder instead of warning
    #[arg(long)]
    strict: bool,

    /// List discovered placeholders instead of rendering
    #[arg(short, long)]
    list: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_assignment(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", arg)),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Load fill file
    let mut config = match &cli.config {
        Some(path) => match FillConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading fill file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => FillConfig::default(),
    };

    // Command-line settings win over the fill file
    config.delimiters = match (cli.open.clone(), cli.close.clone()) {
        (Some(open), close) => Delimiters::from_parts(open, close),
        (None, Some(close)) => config.delimiters.clone().with_close(close),
        (None, None) => config.delimiters.clone(),
    };
    if let Some(default) = &cli.default {
        config.default = Some(default.clone());
    }

    // Read templates
    let (source, name) = match read_templates(&cli, &config) {
        Ok(read) => read,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut engine = match config.engine(source.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            eprint!("{}", e.format(&source.joined(), &name));
            std::process::exit(1);
        }
    };

    if cli.list {
        for placeholder in engine.placeholders() {
            println!("{}", placeholder);
        }
        return;
    }

    let output = if cli.strict {
        render_strict(&mut engine, &config, &cli.set)
    } else {
        engine.render_with(all_values(&config, &cli.set))
    };

    for warning in engine.take_errors() {
        eprintln!("warning: {}", warning);
    }

    for blob in output.into_vec() {
        print!("{}", blob);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Template files, the fill file's inline template, or stdin, in that order
fn read_templates(cli: &Cli, config: &FillConfig) -> io::Result<(TemplateSource, String)> {
    match cli.inputs.as_slice() {
        [] => match &config.template {
            Some(template) => Ok((template.clone(), "<fill file>".to_string())),
            None => {
                let mut buffer = String::new();
                io::stdin().read_to_string(&mut buffer)?;
                Ok((TemplateSource::Single(buffer), "<stdin>".to_string()))
            }
        },
        [path] => {
            let content = read_file(path)?;
            Ok((TemplateSource::Single(content), path.display().to_string()))
        }
        paths => {
            let blobs = paths
                .iter()
                .map(|p| read_file(p))
                .collect::<io::Result<Vec<_>>>()?;
            Ok((TemplateSource::Many(blobs), "<templates>".to_string()))
        }
    }
}

fn read_file(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
        .map_err(|e| io::Error::new(e.kind(), format!("reading '{}': {}", path.display(), e)))
}

/// Fill file values followed by `--set` values, so the command line wins
fn all_values<'a>(
    config: &'a FillConfig,
    overrides: &'a [(String, String)],
) -> impl Iterator<Item = (&'a str, &'a str)> {
    config
        .values
        .iter()
        .chain(overrides.iter().map(|(k, v)| (k, v)))
        .map(|(k, v)| (k.as_str(), v.as_str()))
}

/// Assign every value through the strict path, exiting on the first unknown name
fn render_strict(
    engine: &mut TemplateEngine,
    config: &FillConfig,
    overrides: &[(String, String)],
) -> TemplateSource {
    for (key, value) in all_values(config, overrides) {
        if let Err(e) = engine.set_value(key, value) {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
    engine.render()
}
