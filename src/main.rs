//! sqlmapper CLI - compile XML SQL mapper files

use clap::Parser;
use sqlmapper::cli::{discover_files, render_statement, Cli, Commands, LoadOptions};
use sqlmapper::error::format_xml_error;
use sqlmapper::{Error, MapperLoader};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile { options, files } => run_load(&files, &options, true),
        Commands::Check { options, files } => run_load(&files, &options, false),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load every discovered mapper as one batch
fn run_load(files: &[PathBuf], options: &LoadOptions, print: bool) -> ExitCode {
    let paths = match discover_files(files) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    if paths.is_empty() {
        eprintln!("Error: no mapper files found");
        return ExitCode::from(2);
    }

    let mut loader = MapperLoader::new(options.to_configuration());
    for path in &paths {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                eprintln!("{}: Failed to read file: {}", path.display(), e);
                return ExitCode::from(2);
            }
        };
        if let Err(e) = loader.add_mapper(&path.display().to_string(), &contents) {
            report(Some((path, &contents)), e);
            return ExitCode::from(2);
        }
    }

    match loader.finish() {
        Ok(registry) => {
            let count = registry.statements().count();
            if print {
                for statement in registry.statements() {
                    print!("{}", render_statement(statement));
                }
            } else {
                println!("{} statements compiled from {} mappers", count, paths.len());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            report(None, e);
            ExitCode::from(2)
        }
    }
}

fn report(source: Option<(&Path, &str)>, error: Error) {
    if let (Some((path, contents)), Error::XmlError { message, span: Some((offset, _)) }) =
        (source, &error)
    {
        eprintln!("{}: {}", path.display(), format_xml_error(contents, *offset, message));
        return;
    }
    match source {
        Some((path, _)) => eprintln!("{}: {:?}", path.display(), miette::Report::new(error)),
        None => eprintln!("{:?}", miette::Report::new(error)),
    }
}
