//! Options command implementation.

use crate::cli::{OptionsAction, OptionsArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use docagram_extractor::AnalysisOptions;
use std::path::Path;

/// Execute the options command.
///
/// `set` and `reset` write the config file back to `config_path`.
pub fn execute_options(
    args: OptionsArgs,
    config: &mut Config,
    config_path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match args.action.unwrap_or(OptionsAction::Show) {
        OptionsAction::Show => {
            println!("{}", formatter.format_options(&config.options)?);
        }
        OptionsAction::Set { key, value } => {
            config.options.set(&key, &value).map_err(CliError::InvalidInput)?;
            config.save(config_path)?;
            println!("{}", formatter.success(&format!("Set {} = {}", key, value)));
        }
        OptionsAction::Reset => {
            config.options = AnalysisOptions::default();
            config.save(config_path)?;
            println!("{}", formatter.success("Options restored to defaults"));
        }
    }
    Ok(())
}
