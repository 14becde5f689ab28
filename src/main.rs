use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hashtag_graph::{AppConfig, CleanStream, DegreeStream};

fn io_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .help("Input file with one JSON post per line")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT")
                .help("Output file")
                .required(true),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log every skipped line and window update")
                .action(clap::ArgAction::SetTrue),
        )
}

fn main() -> Result<()> {
    let matches = Command::new("hashtag-graph")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rolling average degree of a 60-second hashtag co-occurrence graph")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(io_args(
            Command::new("average-degree").about("Write the average degree after every post"),
        ))
        .subcommand(io_args(
            Command::new("clean").about("Write cleaned post bodies and count those with unicode"),
        ))
        .get_matches();

    match matches.subcommand() {
        Some(("average-degree", sub_matches)) => {
            let (config, input, output) = prepare(sub_matches)?;
            let mut stream = DegreeStream::new(&config)?;
            stream.run(input, output)?;
        }
        Some(("clean", sub_matches)) => {
            let (config, input, output) = prepare(sub_matches)?;
            let stream = CleanStream::new(&config.text)?;
            stream.run(input, output)?;
        }
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}

fn prepare(matches: &ArgMatches) -> Result<(AppConfig, BufReader<File>, BufWriter<File>)> {
    init_logging(matches.get_flag("verbose"));

    let config = AppConfig::load(matches.get_one::<String>("config").map(Path::new))?;

    // Both are marked required, clap rejects the call before we get here
    let input_path = matches.get_one::<String>("input").map(String::as_str).unwrap_or_default();
    let output_path = matches.get_one::<String>("output").map(String::as_str).unwrap_or_default();

    let input = File::open(input_path)
        .with_context(|| format!("Failed to open input file: {}", input_path))?;
    let output = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path))?;

    info!("Reading {} and writing {}", input_path, output_path);
    Ok((config, BufReader::new(input), BufWriter::new(output)))
}

fn init_logging(verbose: bool) {
    // Output goes to a file, logs go to stderr
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
