use clap::Parser;
use repustate_core::commands::{execute, Command, SessionArgs};
use repustate_core::render::failure;
use repustate_core::utils::{format_exit_code, EXIT_OK};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "rcli")]
#[command(about = "Repustate CLI for Semantic Search", version)]
#[command(long_about = "Command-line interface to Repustate's Semantic Search engine")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    session: SessionArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.session.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let exit_code = run(cli).await;
    debug!("exit: {}", format_exit_code(exit_code));

    std::process::exit(exit_code as i32);
}

async fn run(cli: Cli) -> u8 {
    let mut session = match cli.session.open_session() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", failure(&e.to_string()));
            return e.exit_code();
        }
    };

    let context = cli.command.failure_context();
    let mut input = std::io::stdin().lock();
    let mut out = std::io::stdout().lock();

    match execute(&mut session, cli.command, &mut input, &mut out, "rcli search").await {
        Ok(()) => EXIT_OK,
        Err(e) => {
            eprintln!("{}", failure(&format!("{}: {}", context, e)));
            e.exit_code()
        }
    }
}
