mod session;

use clap::Parser;
use session::{Session, SessionOptions};
use std::path::PathBuf;

/// Terminal scoreboard for Perfect 20.
#[derive(Debug, Parser)]
#[command(name = "p20_cli", version, about)]
struct Args {
    /// Directory holding the saved game between runs.
    #[arg(long, default_value = ".perfect20")]
    save_dir: PathBuf,

    /// Do not write the game after each change.
    #[arg(long)]
    no_autosave: bool,

    /// Comma-separated player names; starts a fresh game with them.
    #[arg(long, value_delimiter = ',')]
    players: Vec<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    log::debug!("{args:?}");
    println!("program begin");
    let mut session = Session::new(SessionOptions {
        save_dir: args.save_dir,
        autosave: !args.no_autosave,
        players: args.players,
    });
    session.start();
    println!("program end");
}
