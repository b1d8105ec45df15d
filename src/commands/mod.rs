//! Entry points for each subcommand

pub mod export;
pub mod harvest;
pub mod member;
pub mod run;

use anyhow::Result;

use crate::shared::config::Command;

pub async fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => run::run_pipeline(&args).await.map(|_| ()),
        Command::Export(args) => export::export_store(&args).await.map(|_| ()),
        Command::Member(args) => member::show_member(&args).await,
        Command::Harvest(args) => harvest::harvest_links(&args).await.map(|_| ()),
    }
}
