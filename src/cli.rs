// src/cli.rs
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;

use crate::board::BoardCell;
use crate::config::AppOptions;
use crate::pipeline::Pipeline;
use crate::progress::NullProgress;
use crate::scheduler::Scheduler;
use crate::serve::{self, ServeState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Cobblemon Pokédex leaderboard: fetch, rank, render, publish", long_about = None)]
pub struct Cli {
    /// KEY=value file read before the environment (environment wins).
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Run a single refresh cycle, print the ranking and exit.
    #[arg(long)]
    pub once: bool,
    /// Refresh in the background without starting the HTTP publisher.
    #[arg(long)]
    pub no_serve: bool,
    /// HTTP port (overrides PORT / HTTP_PORT).
    #[arg(long)]
    pub port: Option<u16>,
}

pub fn run() -> Result<()> {
    run_with(Cli::parse())
}

pub fn run_with(cli: Cli) -> Result<()> {
    crate::log::init();

    let mut opts = match &cli.config {
        Some(path) => AppOptions::from_env_and_file(path)?,
        None => AppOptions::from_env()?,
    };
    if let Some(port) = cli.port {
        opts.serve.port = port;
    }
    if !opts.fetch.is_configured() {
        logw!("Config: FTP_HOST/FTP_USER not set; cycles will only rank the local snapshot");
    }

    let board = Arc::new(BoardCell::new());
    let pipeline = Pipeline::new(opts.clone(), Arc::clone(&board));

    if cli.once {
        let report = pipeline.run_cycle(&mut NullProgress)?;
        if let Some(current) = board.current() {
            for (i, row) in current.rows().iter().enumerate() {
                println!("{:>2}. {} {}", i + 1, row.name, row.count);
            }
        }
        println!("Wrote {}", report.artifact.display());
        return Ok(());
    }

    let handle = Scheduler::new(pipeline, opts.schedule.interval).spawn()?;
    if cli.no_serve {
        handle.wait();
        return Ok(());
    }

    if opts.serve.api_token.is_empty() {
        logd!("Config: API_TOKEN not set; /upload disabled");
    }
    let state = ServeState {
        board,
        artifact: opts.render.out_path.clone(),
        api_token: Arc::from(opts.serve.api_token.as_str()),
    };
    let rt = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    let served = rt.block_on(serve::serve(state, opts.serve.port));
    handle.stop();
    served?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::try_parse_from(["dex_board", "--once", "--port", "8080", "--config", "board.env"]).unwrap();
        assert!(cli.once);
        assert!(!cli.no_serve);
        assert_eq!(cli.port, Some(8080));
        assert_eq!(cli.config, Some(PathBuf::from("board.env")));
    }
}
