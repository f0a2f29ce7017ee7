use std::path::PathBuf;

use hurdle_training::config::Config;

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct DefaultConfigArg {
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &DefaultConfigArg) -> anyhow::Result<()> {
    util::save_json(&Config::default(), arg.output.as_deref())
}
