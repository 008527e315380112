use async_trait::async_trait;
use crate::plugins::mime::guess_mime;
use crate::plugins::registry::{ResolveContext, ResolveResult, SelectionInput, SelectionOrigin, SelectionResolver};
use crate::tracker::model::FileDescriptor;
use anyhow::Context;

/// Descriptors typed out by hand: `name=<n>;size=<bytes>[;type=<mime>]`.
pub struct ManualResolver;

impl ManualResolver {
    pub fn new() -> Self { Self }
}

#[async_trait]
impl SelectionResolver for ManualResolver {
    fn name(&self) -> &'static str { "manual-resolver" }

    fn can_handle(&self, input: &SelectionInput) -> u8 {
        if input.origin == SelectionOrigin::DropZone {
            return 0;
        }
        if input.raw.trim_start().starts_with("name=") { 70 } else { 0 }
    }

    async fn resolve(&self, input: &SelectionInput, _ctx: &ResolveContext) -> anyhow::Result<ResolveResult> {
        let file = parse_descriptor(&input.raw)?;
        Ok(ResolveResult { files: vec![file], warnings: vec![] })
    }
}

pub fn parse_descriptor(raw: &str) -> anyhow::Result<FileDescriptor> {
    let mut name = None;
    let mut size = None;
    let mut mime = None;

    for part in raw.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part
            .split_once('=')
            .with_context(|| format!("expected key=value, got {:?}", part))?;
        let value = value.trim();
        match key.trim() {
            "name" => name = Some(value.to_string()),
            "size" => {
                size = Some(
                    value
                        .parse::<u64>()
                        .with_context(|| format!("invalid size {:?}", value))?,
                )
            }
            "type" | "mime" => mime = Some(value.to_string()),
            other => anyhow::bail!("unknown descriptor key {:?}", other),
        }
    }

    let name = name.filter(|n| !n.is_empty()).context("descriptor is missing a name")?;
    let size = size.context("descriptor is missing a size")?;
    let mime = mime
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| guess_mime(&name).to_string());
    Ok(FileDescriptor::new(name, size, mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_descriptor_parses() {
        let f = parse_descriptor("name=notes.pdf;size=2000000;type=application/pdf").unwrap();
        assert_eq!(f, FileDescriptor::new("notes.pdf", 2_000_000, "application/pdf"));
    }

    #[test]
    fn missing_type_is_guessed_from_name() {
        let f = parse_descriptor(" name = outline.md ; size = 12 ;").unwrap();
        assert_eq!(f.mime_type, "text/markdown");
        assert_eq!(f.size, 12);
    }

    #[test]
    fn size_is_not_validated_against_advertised_limit() {
        let f = parse_descriptor("name=huge.pdf;size=999999999999").unwrap();
        assert!(f.size > crate::config::ADVERTISED_MAX_BYTES);
    }

    #[test]
    fn malformed_descriptors_are_rejected() {
        assert!(parse_descriptor("name=a.pdf").is_err());
        assert!(parse_descriptor("size=10").is_err());
        assert!(parse_descriptor("name=;size=10").is_err());
        assert!(parse_descriptor("name=a.pdf;size=ten").is_err());
        assert!(parse_descriptor("name=a.pdf;size=1;color=red").is_err());
        assert!(parse_descriptor("name=a.pdf;size").is_err());
    }
}
