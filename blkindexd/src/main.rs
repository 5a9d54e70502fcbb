#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
extern crate blkindex;
extern crate serde;
extern crate simple_logger;
extern crate toml;

use std::error;
use std::process;

use blkindex::{BlkFileStream, ChainIndexer, HashDisplay, SqliteStore};
use clap::ArgMatches;

mod config;

use config::Config;

type CmdResult = Result<(), Box<dyn error::Error>>;

fn main() {
    let matches = Config::matches().get_matches();

    simple_logger::init_with_level(config::log_level(&matches)).expect("Couldn't initialize logger");

    let config = match Config::from_args(&matches) {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            process::exit(2);
        }
    };

    let result = match matches.subcommand() {
        ("index", Some(_)) => index(&config),
        ("tip", Some(_)) => tip(&config),
        ("height", Some(height_matches)) => height(&config, height_matches),
        ("", None) => {
            println!("No subcommand was used\n{}", matches.usage());
            Ok(())
        }
        _ => unreachable!(),
    };

    if let Err(err) = result {
        error!("{}", err);
        process::exit(1);
    }
}

fn open_indexer(config: &Config) -> Result<ChainIndexer<SqliteStore>, Box<dyn error::Error>> {
    debug!("Opening index {}", config.db_path.display());
    let store = SqliteStore::open(&config.db_path)?;
    Ok(ChainIndexer::open(store)?)
}

fn index(config: &Config) -> CmdResult {
    let files = blkindex::find_blk_files(&config.blocks_dir)?;
    if files.is_empty() {
        warn!("No blk files found in {}", config.blocks_dir.display());
    }
    info!("Found {} blk files in {}", files.len(), config.blocks_dir.display());

    let mut indexer = open_indexer(config)?;
    let mut stream = BlkFileStream::new(files);
    let summary = blkindex::ingest(&mut indexer, &mut stream, &config.options)?;

    match summary.tip {
        Some((height, hash)) =>
            println!("Indexed {} blocks; tip at height {}: {}", summary.blocks, height, HashDisplay(&hash)),
        None =>
            println!("No blocks indexed"),
    }
    Ok(())
}

fn tip(config: &Config) -> CmdResult {
    let indexer = open_indexer(config)?;
    match indexer.tip() {
        Some((height, hash)) => println!("{} {}", height, HashDisplay(&hash)),
        None => println!("Empty index"),
    }
    Ok(())
}

fn height(config: &Config, matches: &ArgMatches) -> CmdResult {
    // This unwrap is safe because we require it above
    let hex = matches.value_of("hash").unwrap();
    let hash = blkindex::util::hash_from_hex(hex)?;

    let indexer = open_indexer(config)?;
    match indexer.height_of(&hash)? {
        Some(height) => println!("{}", height),
        None => {
            println!("Block {} is not indexed", HashDisplay(&hash));
            process::exit(1);
        }
    }
    Ok(())
}
