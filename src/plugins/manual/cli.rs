use crate::plugins::registry::{CliPlugin, SelectionInput, SelectionOrigin, SimulateCliConfig};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub struct ManualCliPlugin;

impl ManualCliPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl CliPlugin for ManualCliPlugin {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn augment_simulate_command(&self, cmd: Command) -> Command {
        cmd.arg(
            Arg::new("manual_file")
                .long("file")
                .help_heading("Manual")
                .help("File descriptor (repeatable), e.g. --file 'name=notes.pdf;size=2000000;type=application/pdf'")
                .action(ArgAction::Append)
                .num_args(1),
        )
    }

    fn apply_simulate_matches(&self, matches: &ArgMatches, cfg: &mut SimulateCliConfig) -> anyhow::Result<()> {
        if let Some(files) = matches.get_many::<String>("manual_file") {
            cfg.inputs
                .extend(files.map(|raw| SelectionInput::new(raw.clone(), SelectionOrigin::Manual)));
        }
        Ok(())
    }
}
