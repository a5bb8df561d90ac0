// SPDX-License-Identifier: MIT

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use serde::Serialize;
use uuid::Uuid;

use std::fs;
use std::path::{Path, PathBuf};

use sbdb_lib::layout::StoreLayout;
use sbdb_lib::report::{EntryReport, ListSummary};
use sbdb_lib::store::{DB_SUBJECTS, DBX_DEFAULT_HASHES};
use sbdb_lib::*;

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Build and inspect UEFI Secure Boot signature databases (PK, KEK, db, dbx)"
)]
struct Cli {
    /// Log verbosity. Defaults to Warn, -v for Info, -vv for Debug, -vvv for Trace
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct StoreSource {
    #[arg(long, help = "Directory holding PK.bin, KEK.bin, db.bin and dbx.bin")]
    dir: Option<PathBuf>,
    #[arg(long, help = "Path to the directory storing EFIVar files")]
    efivars: Option<PathBuf>,
    #[arg(long, help = "JSON file mapping each store to its file")]
    layout: Option<PathBuf>,
}

impl StoreSource {
    fn layout(&self) -> Result<StoreLayout> {
        if let Some(dir) = &self.dir {
            return Ok(StoreLayout::in_dir(dir));
        }
        if let Some(dir) = &self.efivars {
            return Ok(StoreLayout::efivars(dir));
        }
        if let Some(path) = &self.layout {
            return StoreLayout::from_json_file(path)
                .with_context(|| format!("Can't read layout {}", path.display()));
        }
        bail!("No store source given")
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate simulated PK, KEK, db and dbx databases
    Generate {
        #[arg(
            long,
            short,
            default_value = ".",
            help = "Directory the .bin files are written to"
        )]
        out_dir: PathBuf,
        #[arg(
            long,
            default_value_t = DBX_DEFAULT_HASHES,
            help = "Number of SHA-256 entries to put in dbx"
        )]
        dbx_hashes: usize,
        #[arg(
            long = "db-cert",
            help = "Subject of a db certificate (can be passed multiple times)"
        )]
        db_cert: Vec<String>,
    },
    /// Decode every store and report its entries as JSON
    Inspect {
        #[command(flatten)]
        source: StoreSource,
        #[arg(long, short, help = "Write the report here instead of stdout")]
        output: Option<PathBuf>,
    },
    /// Summarize the signature lists of a single database file
    Dump {
        /// Path to a raw database file
        file: PathBuf,
        #[arg(
            long,
            default_value_t = 0,
            help = "Bytes to skip before the first signature list (4 for efivarfs files)"
        )]
        attribute_header: usize,
    },
}

#[derive(Serialize)]
struct Output {
    entries: Vec<EntryReport>,
}

fn generate(out_dir: &Path, dbx_hashes: usize, db_cert: &[String]) -> Result<()> {
    let subjects: Vec<&str> = if db_cert.is_empty() {
        DB_SUBJECTS.to_vec()
    } else {
        db_cert.iter().map(String::as_str).collect()
    };
    let fixtures = StoreFixtures::simulated(&subjects, dbx_hashes)
        .context("Failed to generate certificates")?;
    let stores = SecureBootStores::build(&fixtures, Uuid::new_v4)?;

    for path in StoreLayout::in_dir(out_dir).write(&stores)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn inspect(source: &StoreSource, output: Option<&Path>) -> Result<()> {
    let stores = source.layout()?.load()?;
    let json = serde_json::to_string_pretty(&Output {
        entries: stores.report(),
    })?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Can't write {}", path.display()))?;
            log::info!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn dump(file: &Path, attribute_header: usize) -> Result<()> {
    let data = fs::read(file).with_context(|| format!("Can't read {}", file.display()))?;
    let Some(data) = data.get(attribute_header..) else {
        bail!(
            "{} is shorter than the {attribute_header} byte attribute header",
            file.display()
        );
    };
    let summaries: Vec<ListSummary> = decode_database(data).iter().map(Into::into).collect();
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter(None, level)
        .format_timestamp(None)
        .init();

    match &cli.command {
        Command::Generate {
            out_dir,
            dbx_hashes,
            db_cert,
        } => generate(out_dir, *dbx_hashes, db_cert),
        Command::Inspect { source, output } => inspect(source, output.as_deref()),
        Command::Dump {
            file,
            attribute_header,
        } => dump(file, *attribute_header),
    }
}
