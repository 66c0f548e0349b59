use clap::Parser;
use firenotes::{Config, State, init_tracing, shutdown_signal};

mod shell;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Use in-process providers instead of the remote services
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = if args.offline {
        Config::offline()
    } else {
        Config::load()?
    };
    let state = State::new(config);

    tokio::select! {
        result = shell::run(state) => result?,
        _ = shutdown_signal() => {}
    }

    println!("Goodbye");
    Ok(())
}
