use crate::plugins::registry::{CliPlugin, SelectionInput, SelectionOrigin, SimulateCliConfig};
use clap::{Arg, ArgAction, ArgMatches, Command};

pub struct DropCliPlugin;

impl DropCliPlugin {
    pub fn new() -> Self {
        Self
    }
}

impl CliPlugin for DropCliPlugin {
    fn name(&self) -> &'static str {
        "dropzone"
    }

    fn augment_simulate_command(&self, cmd: Command) -> Command {
        cmd.arg(
            Arg::new("drop_uri_list")
                .long("drop")
                .help_heading("Drop zone")
                .help("Dropped text/uri-list payload (repeatable), e.g. --drop 'file:///home/me/notes.pdf'")
                .action(ArgAction::Append)
                .num_args(1),
        )
    }

    fn apply_simulate_matches(&self, matches: &ArgMatches, cfg: &mut SimulateCliConfig) -> anyhow::Result<()> {
        if let Some(drops) = matches.get_many::<String>("drop_uri_list") {
            cfg.inputs
                .extend(drops.map(|raw| SelectionInput::new(raw.clone(), SelectionOrigin::DropZone)));
        }
        Ok(())
    }
}
