//! cmd

use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub struct MonitorCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Parser)]
pub enum Commands {
    #[command(name = "run", about = "run monitor server")]
    Run {
        #[arg(long, short, value_parser = verify_input_file, default_value = "config.toml", action=ArgAction::Set)]
        config: PathBuf,
    },
}

// config file must exist
fn verify_input_file(input: &str) -> anyhow::Result<PathBuf> {
    let pb = PathBuf::from(input);
    if pb.exists() {
        anyhow::Ok(pb)
    } else {
        anyhow::bail!("config file is not exist")
    }
}
