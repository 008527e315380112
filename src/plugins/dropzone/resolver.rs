use async_trait::async_trait;
use crate::plugins::picker::resolver::describe_path;
use crate::plugins::registry::{ResolveContext, ResolveResult, SelectionInput, SelectionOrigin, SelectionResolver};
use url::Url;

/// `text/uri-list` payloads from a drag-and-drop surface.
pub struct DropResolver;

impl DropResolver {
    pub fn new() -> Self { Self }
}

fn uri_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
}

#[async_trait]
impl SelectionResolver for DropResolver {
    fn name(&self) -> &'static str { "drop-resolver" }

    fn can_handle(&self, input: &SelectionInput) -> u8 {
        if input.origin == SelectionOrigin::DropZone {
            return 80;
        }
        let has_file_uri = uri_lines(&input.raw)
            .any(|l| Url::parse(l).map(|u| u.scheme() == "file").unwrap_or(false));
        if has_file_uri { 60 } else { 0 }
    }

    async fn resolve(&self, input: &SelectionInput, ctx: &ResolveContext) -> anyhow::Result<ResolveResult> {
        let mut result = ResolveResult::default();

        // one bad entry must not discard the rest of the drop
        for line in uri_lines(&input.raw) {
            let url = match Url::parse(line) {
                Ok(u) => u,
                Err(e) => {
                    result.warnings.push(format!("skipping {}: {}", line, e));
                    continue;
                }
            };
            if url.scheme() != "file" {
                result.warnings.push(format!("skipping non-file uri: {}", url));
                continue;
            }
            let path = match url.to_file_path() {
                Ok(p) => p,
                Err(()) => {
                    result.warnings.push(format!("skipping uri without a local path: {}", url));
                    continue;
                }
            };
            match describe_path(&path, ctx).await {
                Ok(files) => result.files.extend(files),
                Err(e) => result.warnings.push(format!("skipping {}: {:#}", url, e)),
            }
        }

        if result.files.is_empty() {
            result.warnings.push("drop contained no readable files".to_string());
        }
        Ok(result)
    }
}
