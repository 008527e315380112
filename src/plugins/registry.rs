use async_trait::async_trait;
use crate::config::{ADVERTISED_EXTENSIONS, ADVERTISED_MAX_BYTES};
use crate::tracker::model::{size_label, FileDescriptor};
use clap::{ArgMatches, Command};
use futures::future::join_all;
use tracing::{debug, warn};

/// Where a raw selection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOrigin {
    Picker,
    DropZone,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionInput {
    pub raw: String,
    pub origin: SelectionOrigin,
}

impl SelectionInput {
    pub fn new(raw: impl Into<String>, origin: SelectionOrigin) -> Self {
        Self { raw: raw.into(), origin }
    }
}

#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// A picked directory stands for every regular file directly inside it.
    pub expand_dirs: bool,
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self { expand_dirs: true }
    }
}

#[derive(Debug, Default)]
pub struct ResolveResult {
    pub files: Vec<FileDescriptor>,
    pub warnings: Vec<String>,
}

#[async_trait]
pub trait SelectionResolver: Send + Sync {
    fn name(&self) -> &'static str;
    fn can_handle(&self, input: &SelectionInput) -> u8;
    async fn resolve(&self, input: &SelectionInput, ctx: &ResolveContext) -> anyhow::Result<ResolveResult>;
}

#[derive(Debug, Clone, Default)]
pub struct SimulateCliConfig {
    pub inputs: Vec<SelectionInput>,
    pub resolve_ctx: ResolveContext,
}

pub trait CliPlugin: Send + Sync {
    fn name(&self) -> &'static str;
    fn augment_simulate_command(&self, cmd: Command) -> Command;
    fn apply_simulate_matches(&self, matches: &ArgMatches, cfg: &mut SimulateCliConfig) -> anyhow::Result<()>;
}

/// Outcome of resolving a whole selection, in input order.
#[derive(Debug, Default)]
pub struct SelectionReport {
    pub files: Vec<FileDescriptor>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

pub struct PluginRegistry {
    resolvers: Vec<Box<dyn SelectionResolver>>,
    cli_plugins: Vec<Box<dyn CliPlugin>>,
}

impl PluginRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self { resolvers: vec![], cli_plugins: vec![] };

        reg.resolvers.push(Box::new(crate::plugins::dropzone::resolver::DropResolver::new()));
        reg.resolvers.push(Box::new(crate::plugins::manual::resolver::ManualResolver::new()));
        reg.resolvers.push(Box::new(crate::plugins::picker::resolver::PickerResolver::new()));

        reg.cli_plugins.push(Box::new(crate::plugins::picker::cli::PickerCliPlugin::new()));
        reg.cli_plugins.push(Box::new(crate::plugins::dropzone::cli::DropCliPlugin::new()));
        reg.cli_plugins.push(Box::new(crate::plugins::manual::cli::ManualCliPlugin::new()));
        reg
    }

    pub fn augment_simulate_command(&self, cmd: Command) -> Command {
        self.cli_plugins
            .iter()
            .fold(cmd, |c, p| p.augment_simulate_command(c))
    }

    pub fn apply_simulate_matches(&self, matches: &ArgMatches, cfg: &mut SimulateCliConfig) -> anyhow::Result<()> {
        for p in &self.cli_plugins {
            p.apply_simulate_matches(matches, cfg)?;
        }
        Ok(())
    }

    pub fn best_resolver(&self, input: &SelectionInput) -> Option<&dyn SelectionResolver> {
        self.resolvers
            .iter()
            .map(|r| (r.can_handle(input), r.as_ref()))
            .max_by_key(|(c, _)| *c)
            .and_then(|(c, r)| if c == 0 { None } else { Some(r) })
    }

    /// Resolves every input concurrently; a failing input is reported and skipped.
    pub async fn resolve_all(&self, inputs: &[SelectionInput], ctx: &ResolveContext) -> SelectionReport {
        let results = join_all(inputs.iter().map(|input| async move {
            let resolver = match self.best_resolver(input) {
                Some(r) => r,
                None => return Err(format!("no resolver for input: {}", input.raw)),
            };
            debug!(input = %input.raw, origin = ?input.origin, resolver = resolver.name(), "resolving selection");
            resolver
                .resolve(input, ctx)
                .await
                .map_err(|e| format!("{}({}): {:#}", resolver.name(), input.raw, e))
        }))
        .await;

        let mut report = SelectionReport::default();
        for r in results {
            match r {
                Ok(resolved) => {
                    report.files.extend(resolved.files);
                    report.warnings.extend(resolved.warnings);
                }
                Err(e) => {
                    warn!("{}", e);
                    report.errors.push(e);
                }
            }
        }
        let notes: Vec<String> = report.files.iter().flat_map(outside_advertised_limits).collect();
        report.warnings.extend(notes);
        report
    }
}

/// The panel advertises accepted types and a size limit but never enforces them.
pub fn outside_advertised_limits(file: &FileDescriptor) -> Vec<String> {
    let mut notes = vec![];
    let ext = file
        .name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !ADVERTISED_EXTENSIONS.contains(&ext.as_str()) {
        notes.push(format!("{} is not an advertised document type (accepted anyway)", file.name));
    }
    if file.size > ADVERTISED_MAX_BYTES {
        notes.push(format!(
            "{} is {} which is above the advertised limit (accepted anyway)",
            file.name,
            size_label(file.size)
        ));
    }
    notes
}
