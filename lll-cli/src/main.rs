use anyhow::{anyhow, Context, Result};
use clap::Parser;
use lll::printf::{self, Count};
use lll::{Buffering, Destination, Level, Logger, ParamKind, ParamTable, Value};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lll")]
#[command(version = "0.1.0")]
#[command(about = "Render template-driven log lines", long_about = None)]
struct Cli {
    /// Line template, e.g. "[%T] %p %m" (omit to print only the message)
    #[arg(short, long, value_name = "TEMPLATE")]
    template: Option<String>,

    /// Positional parameter for $0-$9 as SPEC=VALUE, e.g. %d=42 or %s=main.c
    #[arg(short, long = "param", value_name = "SPEC=VALUE")]
    params: Vec<String>,

    /// Append to this file instead of writing to stdout
    #[arg(short, long, value_name = "PATH", conflicts_with = "stderr")]
    output: Option<PathBuf>,

    /// Write to stderr instead of stdout
    #[arg(long)]
    stderr: bool,

    /// Level of this message
    #[arg(short, long, default_value = "info")]
    level: Level,

    /// Most verbose level that gets written
    #[arg(long, default_value = "trace")]
    threshold: Level,

    /// Write pieces as they render instead of one buffered write
    #[arg(long)]
    direct: bool,

    /// printf-style message format
    #[arg(value_name = "FORMAT")]
    format: String,

    /// Arguments for the message format
    #[arg(value_name = "ARGS")]
    args: Vec<String>,
}

/// Split "SPEC=VALUE" at the first '='
fn split_param(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .ok_or_else(|| anyhow!("Parameter '{}' is not of the form SPEC=VALUE", raw))
}

/// Read a command-line string as the value a conversion expects
fn parse_value<'a>(conversion: char, text: &'a str) -> Result<Value<'a>> {
    match conversion {
        'e' | 'E' | 'f' | 'F' | 'g' | 'G' | 'a' | 'A' => text
            .parse::<f64>()
            .map(Value::Float64)
            .with_context(|| format!("'{}' is not a number", text)),
        's' => Ok(Value::Pointer(Some(text))),
        'c' => Ok(Value::from(text.chars().next().unwrap_or('\0'))),
        _ => parse_integer(text),
    }
}

fn parse_integer(text: &str) -> Result<Value<'_>> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => text.parse::<i64>(),
    };
    parsed
        .map(Value::Integer)
        .with_context(|| format!("'{}' is not an integer", text))
}

fn build_params(raw: &[String]) -> Result<ParamTable<'_>> {
    let mut pairs = Vec::with_capacity(raw.len());
    for param in raw {
        let (spec, text) = split_param(param)?;
        let conversion = printf::conversions(spec)
            .last()
            .map(|c| c.conversion)
            .ok_or_else(|| anyhow!("Parameter spec '{}' has no conversion", spec))?;
        let value = parse_value(conversion, text)?;
        log::debug!(
            "${} = {:?} as {:?}",
            pairs.len(),
            value,
            ParamKind::classify(spec)
        );
        pairs.push((spec, value));
    }
    if pairs.len() > lll::MAX_PARAMS {
        log::warn!(
            "Only the first {} parameters are used, {} given",
            lll::MAX_PARAMS,
            pairs.len()
        );
    }
    Ok(ParamTable::from_pairs(pairs))
}

/// Match message arguments to the conversions of the format, `*` counts included
fn build_message_args<'a>(format: &str, args: &'a [String]) -> Result<Vec<Value<'a>>> {
    let mut expected = Vec::new();
    for spec in printf::conversions(format) {
        if spec.width == Some(Count::Star) {
            expected.push('d');
        }
        if spec.precision == Some(Count::Star) {
            expected.push('d');
        }
        expected.push(spec.conversion);
    }

    if expected.len() != args.len() {
        log::warn!(
            "Message format takes {} argument(s), {} given",
            expected.len(),
            args.len()
        );
    }

    expected
        .into_iter()
        .zip(args)
        .map(|(conversion, text)| parse_value(conversion, text))
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let destination = match (&cli.output, cli.stderr) {
        (Some(path), _) => Destination::File(path.clone()),
        (None, true) => Destination::Stderr,
        (None, false) => Destination::Stdout,
    };
    log::info!("Writing to {:?}", destination);

    let mut logger = Logger::new(destination).threshold(cli.threshold);
    if let Some(template) = &cli.template {
        logger = logger.template(template.as_str());
    }
    if cli.direct {
        logger = logger.buffering(Buffering::Direct);
    }

    let params = build_params(&cli.params)?;
    let message_args = build_message_args(&cli.format, &cli.args)?;
    let message = printf::sprintf(&cli.format, &message_args);

    let written = logger.try_log(cli.level, &params, format_args!("{}", message))?;
    if !written {
        log::info!("Level {} is above threshold {}, nothing written", cli.level, cli.threshold);
    }
    Ok(())
}
