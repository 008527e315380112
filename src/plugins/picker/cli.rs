use crate::plugins::registry::{CliPlugin, SimulateCliConfig};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub struct PickerCliPlugin;

impl PickerCliPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl CliPlugin for PickerCliPlugin {
    fn name(&self) -> &'static str {
        "picker"
    }

    fn augment_simulate_command(&self, cmd: Command) -> Command {
        cmd.arg(
            Arg::new("picker_no_expand_dirs")
                .long("no-expand-dirs")
                .help_heading("Picker")
                .help("Reject picked directories instead of taking the files inside them")
                .action(ArgAction::SetTrue),
        )
    }

    fn apply_simulate_matches(&self, matches: &ArgMatches, cfg: &mut SimulateCliConfig) -> anyhow::Result<()> {
        cfg.resolve_ctx.expand_dirs = !matches.get_flag("picker_no_expand_dirs");
        Ok(())
    }
}
