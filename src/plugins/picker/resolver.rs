use async_trait::async_trait;
use crate::plugins::mime::guess_mime;
use crate::plugins::registry::{ResolveContext, ResolveResult, SelectionInput, SelectionOrigin, SelectionResolver};
use crate::tracker::model::FileDescriptor;
use anyhow::Context;
use std::path::Path;

/// Filesystem paths, as a native file picker hands them over.
pub struct PickerResolver;

impl PickerResolver {
    pub fn new() -> Self { Self }
}

#[async_trait]
impl SelectionResolver for PickerResolver {
    fn name(&self) -> &'static str { "picker-resolver" }

    fn can_handle(&self, input: &SelectionInput) -> u8 {
        // fallback for anything a picker hands over
        if input.origin != SelectionOrigin::Picker || input.raw.trim().is_empty() { 0 } else { 10 }
    }

    async fn resolve(&self, input: &SelectionInput, ctx: &ResolveContext) -> anyhow::Result<ResolveResult> {
        let files = describe_path(Path::new(input.raw.trim()), ctx).await?;
        let mut warnings = vec![];
        if files.is_empty() {
            warnings.push(format!("no files selected from {}", input.raw));
        }
        Ok(ResolveResult { files, warnings })
    }
}

/// Descriptors for a picked path: the file itself, or the regular files
/// directly inside a directory (sorted by name) when `expand_dirs` is set.
pub async fn describe_path(path: &Path, ctx: &ResolveContext) -> anyhow::Result<Vec<FileDescriptor>> {
    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("stat {}", path.display()))?;

    if meta.is_file() {
        return Ok(vec![describe_file(path, meta.len())]);
    }

    if !meta.is_dir() {
        anyhow::bail!("not a regular file: {}", path.display());
    }
    if !ctx.expand_dirs {
        anyhow::bail!("{} is a directory", path.display());
    }

    let mut entries = tokio::fs::read_dir(path)
        .await
        .with_context(|| format!("read_dir {}", path.display()))?;
    let mut files = vec![];
    while let Some(entry) = entries.next_entry().await? {
        let entry_path = entry.path();
        let md = match tokio::fs::metadata(&entry_path).await {
            Ok(md) => md,
            Err(e) => {
                tracing::warn!(path = %entry_path.display(), "skipping unreadable entry: {}", e);
                continue;
            }
        };
        if md.is_file() {
            files.push(describe_file(&entry_path, md.len()));
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn describe_file(path: &Path, size: u64) -> FileDescriptor {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let mime = guess_mime(&name);
    FileDescriptor::new(name, size, mime)
}
