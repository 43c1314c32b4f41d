//! The command set both front ends expose, and the one place that runs it.

use crate::config::Config;
use crate::query::list_terms;
use crate::render::{notice, set_color, write_index_result, write_search_result, write_terms};
use crate::session::{DocumentSource, Session};
use crate::{Result, ValidationError};
use clap::{Args, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

pub const LANGUAGES_HELP: &str = "Valid language codes: ar, da, de, en, es, fi, fr, he, id, it, ja, ko, nl, no, pl, pt, ru, sv, th, tr, ur, vi, zh";

/// Options every front end accepts.
#[derive(Debug, Clone, Default, Args)]
pub struct SessionArgs {
    /// Server base URL
    #[arg(long, global = true, env = "REPUSTATE_SERVER_URL", value_name = "URL")]
    pub server: Option<String>,

    /// Config file (default: ./repustate.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl SessionArgs {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if self.no_color {
            config.color = false;
        }
        Ok(config)
    }

    pub fn open_session(&self) -> Result<Session> {
        let config = self.load_config()?;
        set_color(config.color);
        Session::open(config)
    }

    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "warn,repustate_core=debug,rcli=debug,rshell=debug"
        } else {
            "warn"
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Register a user for the demo
    Register(RegisterArgs),

    /// Add a document to the semantic search index
    #[command(after_help = LANGUAGES_HELP)]
    Index(IndexArgs),

    /// Search indexed documents
    Search(SearchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct RegisterArgs {
    /// Username to register (prompted for when omitted)
    pub username: Option<String>,

    /// Register a generated id instead of a username
    #[arg(long, conflicts_with = "username")]
    pub anonymous: bool,
}

#[derive(Debug, Clone, Args)]
pub struct IndexArgs {
    /// Text to index
    #[arg(short, long)]
    pub text: Option<String>,

    /// File with text content to index
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Content language (server default when omitted)
    #[arg(short, long)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Themes, sentiments and classification paths, e.g. `pos sports Location.city`
    #[arg(value_name = "TERM")]
    pub terms: Vec<String>,

    /// Query language (server default when omitted)
    #[arg(short, long)]
    pub lang: Option<String>,

    /// List known terms, filtered by the first TERM as a prefix
    #[arg(long)]
    pub list_terms: bool,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Register(_) => "register",
            Command::Index(_) => "index",
            Command::Search(_) => "search",
        }
    }

    /// Leading text for a failure message of this command.
    pub fn failure_context(&self) -> &'static str {
        match self {
            Command::Register(_) => "Failed to register user",
            Command::Index(_) => "Failed to index document",
            Command::Search(_) => "Search failed",
        }
    }
}

/// Runs one command against the session. `input` answers prompts, `out`
/// receives everything user-facing, and `search_cmd` prefixes the example
/// searches printed after indexing.
pub async fn execute(
    session: &mut Session,
    command: Command,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
    search_cmd: &str,
) -> Result<()> {
    match command {
        Command::Register(args) => register(session, args, input, out).await,
        Command::Index(args) => {
            let source = DocumentSource::from_args(args.text, args.file)?;
            let res = session.index(&source, args.lang.as_deref()).await?;
            write_index_result(out, &res, search_cmd, &mut rand::thread_rng())?;
            Ok(())
        }
        Command::Search(args) => {
            if args.list_terms {
                let prefix = args.terms.first().map(String::as_str).unwrap_or("");
                write_terms(out, &list_terms(true, true, true, prefix))?;
                return Ok(());
            }
            let res = session.search(&args.terms, args.lang.as_deref()).await?;
            write_search_result(out, &res)?;
            Ok(())
        }
    }
}

async fn register(
    session: &mut Session,
    args: RegisterArgs,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    let registration = if args.anonymous {
        let registration = session.register_anonymous().await?;
        writeln!(
            out,
            "{}",
            notice(&format!("Registered with generated id {}", registration.user))
        )?;
        registration
    } else {
        let username = match args.username {
            Some(username) => username,
            None => prompt_username(input, out)?,
        };
        session.register(&username).await?
    };

    if let Some(previous) = &registration.replaced {
        warn!("replaced registered user {:?} with {:?}", previous, registration.user);
    }

    writeln!(
        out,
        "{}",
        notice(
            "Congratulations! You're registered and are now ready to use \
             Repustate's semantic search demo"
        )
    )?;
    Ok(())
}

fn prompt_username(input: &mut dyn BufRead, out: &mut dyn Write) -> Result<String> {
    writeln!(out, "Please enter a username and hit enter:")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(ValidationError::InvalidUsername(String::new()).into());
    }
    Ok(line.trim_end_matches(&['\n', '\r'][..]).to_string())
}
