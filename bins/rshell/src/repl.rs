use anyhow::Result;
use clap::{Parser, Subcommand};
use repustate_core::commands::{execute, Command};
use repustate_core::query::completion_candidates;
use repustate_core::render::failure;
use repustate_core::session::Session;
use rustyline::completion::{Completer, FilenameCompleter, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::io::{BufRead, Write};
use tracing::debug;

const PROMPT: &str = ">>> ";

const COMMAND_NAMES: &[&str] = &["register", "index", "search", "help", "quit", "exit"];

/// One shell line, parsed with its first word as the command name.
#[derive(Parser, Debug)]
#[command(multicall = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    #[command(flatten)]
    Api(Command),

    /// Leave the shell
    #[command(visible_aliases = ["exit", "q"])]
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum ShellControl {
    Continue,
    Exit,
}

pub struct Repl {
    session: Session,
}

impl Repl {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut rl: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
        rl.set_helper(Some(ShellHelper::new()));

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line)?;

                    let tokens = split_command_line(line);
                    let mut input = std::io::stdin().lock();
                    let mut out = std::io::stdout().lock();
                    match self.handle_tokens(&tokens, &mut input, &mut out).await {
                        Ok(ShellControl::Continue) => {}
                        Ok(ShellControl::Exit) => break,
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("^D");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_tokens(
        &mut self,
        tokens: &[String],
        input: &mut dyn BufRead,
        out: &mut dyn Write,
    ) -> Result<ShellControl> {
        if tokens.is_empty() {
            return Ok(ShellControl::Continue);
        }

        let line = match ShellLine::try_parse_from(tokens) {
            Ok(line) => line,
            Err(e) => {
                // covers `help` and `<cmd> --help` as well as usage errors
                write!(out, "{}", e)?;
                return Ok(ShellControl::Continue);
            }
        };

        match line.command {
            ShellCommand::Quit => Ok(ShellControl::Exit),
            ShellCommand::Api(command) => {
                debug!(command = command.name(), "running shell command");
                let context = command.failure_context();
                if let Err(e) = execute(&mut self.session, command, input, out, "search").await {
                    writeln!(out, "{}", failure(&format!("{}: {}", context, e)))?;
                }
                Ok(ShellControl::Continue)
            }
        }
    }
}

/// Whitespace-separated words; double quotes group words and `\` escapes
/// the next character.
fn split_command_line(line: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    out.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() || quoted {
        out.push(current);
    }

    out
}

/// Completion for everything except file paths: command names for the first
/// word, query terms for the arguments of `search`.
fn complete_words(line: &str, pos: usize) -> (usize, Vec<String>) {
    let start = line[..pos]
        .rfind(char::is_whitespace)
        .map(|i| i + 1)
        .unwrap_or(0);
    let word = &line[start..pos];
    let previous: Vec<&str> = line[..start].split_whitespace().collect();

    let candidates = match previous.split_first() {
        None => COMMAND_NAMES
            .iter()
            .filter(|name| name.starts_with(word))
            .map(|name| name.to_string())
            .collect(),
        Some((&"search", args)) if !word.starts_with('-') => {
            let terms: Vec<&str> = args.iter().copied().filter(|a| !a.starts_with('-')).collect();
            completion_candidates(&terms, word)
                .into_iter()
                .map(str::to_string)
                .collect()
        }
        _ => Vec::new(),
    };

    (start, candidates)
}

struct ShellHelper {
    files: FilenameCompleter,
}

impl ShellHelper {
    fn new() -> Self {
        Self {
            files: FilenameCompleter::new(),
        }
    }
}

impl Helper for ShellHelper {}

impl Highlighter for ShellHelper {}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Validator for ShellHelper {}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = line[..pos]
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        if matches!(line[..start].split_whitespace().last(), Some("-f" | "--file")) {
            return self.files.complete(line, pos, ctx);
        }

        let (start, words) = complete_words(line, pos);
        let pairs = words
            .into_iter()
            .map(|w| Pair {
                display: w.clone(),
                replacement: w,
            })
            .collect();
        Ok((start, pairs))
    }
}
