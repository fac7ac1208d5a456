use std::fmt;
use std::io::{BufRead, Write};
use std::sync::Arc;

use milim_core::model::{ListId, MasteryState, QuizMode};
use services::{
    Clock, DatabaseSnapshot, ListService, ProgressService, SessionLoopService, SnapshotService,
};
use storage::repository::Storage;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidListId { raw: String },
    InvalidCount { raw: String },
    InvalidDbUrl { raw: String },
    MissingPath { command: &'static str },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidListId { raw } => write!(f, "invalid --list value: {raw}"),
            ArgsError::InvalidCount { raw } => write!(f, "invalid --weakest value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingPath { command } => write!(f, "{command} requires a file path"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  milim import <file> [--name <list name>]   add a vocabulary list from text");
    eprintln!("  milim lists                                show all lists");
    eprintln!("  milim show <list-id>                       print one list in text form");
    eprintln!("  milim practice [--list <id> | --weakest [n]] [--reverse]");
    eprintln!("  milim history                              daily progress records");
    eprintln!("  milim export <file>                        dump everything to JSON");
    eprintln!("  milim restore <file>                       replace the database from JSON");
    eprintln!();
    eprintln!("Global flags:");
    eprintln!("  --db <sqlite_url>   default sqlite:milim.sqlite3 (env: MILIM_DB_URL)");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Import,
    Lists,
    Show,
    Practice,
    History,
    Export,
    Restore,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "import" => Some(Self::Import),
            "lists" => Some(Self::Lists),
            "show" => Some(Self::Show),
            "practice" => Some(Self::Practice),
            "history" => Some(Self::History),
            "export" => Some(Self::Export),
            "restore" => Some(Self::Restore),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PracticeScope {
    List(ListId),
    Weakest(usize),
}

#[derive(Debug)]
struct Args {
    db_url: String,
    command: Command,
    /// Positional file path for import/show/export/restore.
    path: Option<String>,
    list_name: Option<String>,
    scope: Option<PracticeScope>,
    reverse: bool,
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut argv = std::env::args().skip(1).peekable();

        let command = match argv.peek().map(String::as_str) {
            None | Some("--help" | "-h") => {
                print_usage();
                std::process::exit(0);
            }
            Some(first) => Command::from_arg(first)
                .ok_or_else(|| ArgsError::UnknownArg(first.to_string()))?,
        };
        argv.next();

        let mut db_url =
            std::env::var("MILIM_DB_URL").unwrap_or_else(|_| "sqlite:milim.sqlite3".into());
        let mut path = None;
        let mut list_name = None;
        let mut scope = None;
        let mut reverse = false;

        while let Some(arg) = argv.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut argv, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--name" => list_name = Some(require_value(&mut argv, "--name")?),
                "--list" => {
                    let value = require_value(&mut argv, "--list")?;
                    let id = value
                        .parse::<ListId>()
                        .map_err(|_| ArgsError::InvalidListId { raw: value })?;
                    scope = Some(PracticeScope::List(id));
                }
                "--weakest" => {
                    // optional count; defaults when the next token is a flag
                    let n = match argv.peek() {
                        Some(next) if !next.starts_with("--") => {
                            let value = argv.next().unwrap_or_default();
                            value
                                .parse::<usize>()
                                .map_err(|_| ArgsError::InvalidCount { raw: value })?
                        }
                        _ => services::selection::DEFAULT_WEAKEST_COUNT,
                    };
                    scope = Some(PracticeScope::Weakest(n));
                }
                "--reverse" => reverse = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other if !other.starts_with("--") && path.is_none() => {
                    path = Some(other.to_string());
                }
                other => return Err(ArgsError::UnknownArg(other.to_string())),
            }
        }

        match command {
            Command::Import if path.is_none() => {
                return Err(ArgsError::MissingPath { command: "import" });
            }
            Command::Show if path.is_none() => {
                return Err(ArgsError::MissingPath { command: "show" });
            }
            Command::Export if path.is_none() => {
                return Err(ArgsError::MissingPath { command: "export" });
            }
            Command::Restore if path.is_none() => {
                return Err(ArgsError::MissingPath { command: "restore" });
            }
            _ => {}
        }

        Ok(Self {
            db_url,
            command,
            path,
            list_name,
            scope,
            reverse,
        })
    }
}

/// Create the database file for plain `sqlite:path` URLs so the pool can open
/// it. In-memory and query-string URLs pass through untouched.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" || db_url.contains('?') {
        return Ok(());
    }

    let Some(path) = db_url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let path = std::path::Path::new(path.trim_start_matches("//"));
    if path.as_os_str().is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().inspect_err(|e| {
        eprintln!("{e}");
        print_usage();
    })?;

    prepare_sqlite_file(&args.db_url)?;
    tracing::debug!(db = %args.db_url, "opening database");
    let storage = Storage::sqlite(&args.db_url).await?;
    let clock = Clock::Default;

    let lists = ListService::new(clock, Arc::clone(&storage.lists));

    match args.command {
        Command::Import => {
            let path = args.path.as_deref().unwrap_or_default();
            let raw = std::fs::read_to_string(path)?;
            let name = args.list_name.clone().unwrap_or_else(|| {
                std::path::Path::new(path)
                    .file_stem()
                    .map_or_else(|| "Imported".to_string(), |s| s.to_string_lossy().into_owned())
            });
            let id = lists.import_text(&name, &raw).await?;
            let list = lists.get(id).await?.ok_or("imported list vanished")?;
            println!("imported '{}' (id {id}) with {} words", list.name(), list.len());
        }
        Command::Lists => {
            let all = lists.lists().await?;
            if all.is_empty() {
                println!("no lists yet; use 'milim import <file>'");
            }
            for list in all {
                println!("{:>4}  {}  ({} words)", list.id(), list.name(), list.len());
            }
        }
        Command::Show => {
            let raw = args.path.as_deref().unwrap_or_default();
            let id = raw
                .parse::<ListId>()
                .map_err(|_| ArgsError::InvalidListId {
                    raw: raw.to_string(),
                })?;
            let list = lists.get(id).await?.ok_or("list not found")?;
            println!("### {}", list.name());
            print!("{}", ListService::render_text(&list));
        }
        Command::Practice => {
            let mode = if args.reverse {
                QuizMode::PromptIsTarget
            } else {
                QuizMode::PromptIsSource
            };
            let session_loop = SessionLoopService::new(
                clock,
                Arc::clone(&storage.lists),
                Arc::clone(&storage.progress),
            );
            let session = match args.scope {
                Some(PracticeScope::List(id)) => {
                    session_loop.start_list_session(id, mode).await?
                }
                Some(PracticeScope::Weakest(n)) => {
                    session_loop.start_weakest_session(n, mode).await?
                }
                None => {
                    session_loop
                        .start_weakest_session(services::selection::DEFAULT_WEAKEST_COUNT, mode)
                        .await?
                }
            };
            practice_loop(&session_loop, session).await?;
        }
        Command::History => {
            let progress = ProgressService::new(clock, Arc::clone(&storage.progress));
            let days = progress.history().await?;
            if days.is_empty() {
                println!("no sessions completed yet");
            }
            for day in days {
                println!(
                    "{}  {} sessions, {} words mastered",
                    day.date, day.sessions_completed, day.words_mastered
                );
            }
        }
        Command::Export => {
            let snapshots =
                SnapshotService::new(Arc::clone(&storage.lists), Arc::clone(&storage.progress));
            let snapshot = snapshots.export().await?;
            let json = snapshot.to_json()?;
            let path = args.path.as_deref().unwrap_or_default();
            std::fs::write(path, json)?;
            println!("exported {} lists to {path}", snapshot.lists.len());
        }
        Command::Restore => {
            let snapshots =
                SnapshotService::new(Arc::clone(&storage.lists), Arc::clone(&storage.progress));
            let path = args.path.as_deref().unwrap_or_default();
            let raw = std::fs::read_to_string(path)?;
            let snapshot = DatabaseSnapshot::from_json(&raw)?;
            let count = snapshot.lists.len();
            snapshots.import(snapshot).await?;
            println!("restored {count} lists from {path}");
        }
    }

    Ok(())
}

/// Interactive question/answer loop on stdin. An empty line or EOF quits
/// early without recording completion.
async fn practice_loop(
    session_loop: &SessionLoopService,
    mut session: services::SessionService,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut input = String::new();

    println!(
        "{} words this session. Empty answer quits.\n",
        session.total_words()
    );

    loop {
        let Some(word) = session.current_word() else {
            break;
        };
        let progress = session.progress();
        print!(
            "[{}/{}] {} = ",
            progress.mastered,
            progress.total,
            word.shown_text(session.mode())
        );
        stdout.flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            println!("\nstopped; progress so far is saved");
            return Ok(());
        }
        let answer = input.trim();
        if answer.is_empty() {
            println!("stopped; progress so far is saved");
            return Ok(());
        }

        let check = session_loop.answer_current(&mut session, answer).await?;
        if check.is_correct {
            match check.mastery {
                MasteryState::Mastered => println!("correct, mastered"),
                _ => println!("correct, keep the streak going"),
            }
        } else {
            println!("wrong, the answer is: {}", check.canonical_answer);
        }

        if session_loop.advance(&mut session).await?.is_complete {
            break;
        }
    }

    let progress = session.progress();
    println!(
        "\nsession complete: {} of {} words mastered",
        progress.mastered, progress.total
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
