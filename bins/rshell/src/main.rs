mod repl;

use anyhow::Result;
use clap::Parser;
use repustate_core::commands::SessionArgs;
use repustate_core::render::failure;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "rshell")]
#[command(about = "Interactive shell for Repustate semantic search", version)]
struct Args {
    #[command(flatten)]
    session: SessionArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.session.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    println!("Repustate DeepSearch CLI");

    let session = match args.session.open_session() {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", failure(&e.to_string()));
            std::process::exit(e.exit_code() as i32);
        }
    };

    println!("Type 'help' for commands, 'quit' to exit\n");

    let mut repl = repl::Repl::new(session);
    repl.run().await?;

    println!("\nGoodbye!");
    Ok(())
}
