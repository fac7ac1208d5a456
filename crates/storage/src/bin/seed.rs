//! Seeds a database with a small demo vocabulary list.

use std::fmt;

use milim_core::parser;
use milim_core::time::Clock;
use storage::repository::{NewListRecord, Storage};

const DEMO_LIST: &str = "\
###
cat=חתול
dog=כלב
hello=שלום|שָׁלוֹם
house=בית
book=סֵפֶר|ספר
@
";

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    list_name: String,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("MILIM_DB_URL").unwrap_or_else(|_| "sqlite:milim.sqlite3".into());
        let mut list_name = "Demo".to_string();

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => db_url = require_value(&mut args, "--db")?,
                "--name" => list_name = require_value(&mut args, "--name")?,
                other => return Err(ArgsError::UnknownArg(other.to_string())),
            }
        }

        Ok(Self { db_url, list_name })
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().inspect_err(|_| {
        eprintln!("usage: seed [--db <sqlite_url>] [--name <list name>]");
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let words = parser::parse(DEMO_LIST);
    let record = NewListRecord::new(&args.list_name, Clock::Default.now(), &words);
    let id = storage.lists.insert_new_list(record).await?;

    println!(
        "seeded list '{}' (id {id}) with {} words into {}",
        args.list_name,
        words.len(),
        args.db_url
    );
    Ok(())
}
