//! einfo - inspect the structure of an EPUB file

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{ArgAction, Parser};

use libepub::{DebugLevel, Epub, IterMode};

const EXIT_OPEN_FAILED: u8 = 1;
const EXIT_BAD_FLAG: u8 = 2;
const EXIT_NO_FILENAME: u8 = 3;

#[derive(Parser)]
#[command(name = "einfo")]
#[command(version, about = "Print the structure of an EPUB file", long_about = None)]
#[command(after_help = "EXAMPLES:
    einfo book.epub          Dump container, metadata, manifest and spine
    einfo -vv book.epub      Same, with warnings and info messages
    einfo -p book.epub       List the reading order with document sizes")]
struct Cli {
    /// EPUB file to inspect
    #[arg(value_name = "FILE")]
    file: String,

    /// Raise verbosity (repeat for more: warnings, info, verbose)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print the structural dump (the default when no action is given)
    #[arg(short, long)]
    dump: bool,

    /// Print the reading order: position, size in bytes and archive path
    #[arg(short, long)]
    print: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                ErrorKind::MissingRequiredArgument => EXIT_NO_FILENAME,
                _ => EXIT_BAD_FLAG,
            };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    libepub::init();
    let code = run(&cli);
    libepub::cleanup();
    ExitCode::from(code)
}

fn run(cli: &Cli) -> u8 {
    let level = DebugLevel::from_number(cli.verbose.saturating_add(1));
    let epub = match Epub::open(&cli.file, level) {
        Ok(epub) => epub,
        Err(e) => {
            eprintln!("einfo: {}: {e}", cli.file);
            return EXIT_OPEN_FAILED;
        }
    };

    if cli.dump || !cli.print {
        print!("{}", epub.dump());
    }
    if cli.print {
        print_reading_order(&epub);
    }

    match epub.close() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("einfo: {}: {e}", cli.file);
            EXIT_OPEN_FAILED
        }
    }
}

fn print_reading_order(epub: &Epub) {
    let mut pages = epub.iter(IterMode::Linear);
    let mut loaded = pages.current().map(<[u8]>::len);

    while !pages.is_exhausted() {
        let position = pages.position().unwrap_or_default();
        let path = pages.path().unwrap_or_else(|| "-".to_string());
        match loaded {
            Some(len) => println!("{position}\t{len}\t{path}"),
            None => println!("{position}\t-\t{path}"),
        }
        loaded = pages.advance().map(<[u8]>::len);
    }
}
