//! Read-only projection of tracked uploads into what the panel displays.

use crate::i18n::Messages;
use crate::tracker::model::{TrackedUpload, UploadId, UploadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIcon {
    Spinner,
    Check,
    Alert,
}

impl StatusIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            StatusIcon::Spinner => "◌",
            StatusIcon::Check => "✔",
            StatusIcon::Alert => "✖",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeVariant {
    Secondary,
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub variant: BadgeVariant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardAction {
    GenerateQuiz,
    CreateSummary,
    ViewContent,
}

impl CardAction {
    pub fn label(self, messages: &Messages) -> &'static str {
        match self {
            CardAction::GenerateQuiz => messages.action_generate_quiz,
            CardAction::CreateSummary => messages.action_create_summary,
            CardAction::ViewContent => messages.action_view_content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressLine {
    pub label: &'static str,
    pub percent: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCard {
    pub id: UploadId,
    pub name: String,
    pub meta: String,
    pub icon: StatusIcon,
    pub badge: StatusBadge,
    pub progress: Option<ProgressLine>,
    pub actions: Vec<CardAction>,
}

pub fn status_icon(status: UploadStatus) -> StatusIcon {
    match status {
        UploadStatus::Processing => StatusIcon::Spinner,
        UploadStatus::Completed => StatusIcon::Check,
        UploadStatus::Failed => StatusIcon::Alert,
    }
}

pub fn status_badge(status: UploadStatus, messages: &Messages) -> StatusBadge {
    match status {
        UploadStatus::Processing => StatusBadge { label: messages.badge_processing, variant: BadgeVariant::Secondary },
        UploadStatus::Completed => StatusBadge { label: messages.badge_completed, variant: BadgeVariant::Success },
        UploadStatus::Failed => StatusBadge { label: messages.badge_failed, variant: BadgeVariant::Destructive },
    }
}

/// Actions are only offered once the document is ready.
pub fn actions(status: UploadStatus) -> Vec<CardAction> {
    match status {
        UploadStatus::Completed => vec![CardAction::GenerateQuiz, CardAction::CreateSummary, CardAction::ViewContent],
        UploadStatus::Processing | UploadStatus::Failed => vec![],
    }
}

pub fn project(upload: &TrackedUpload, messages: &Messages) -> UploadCard {
    let progress = (upload.status == UploadStatus::Processing).then(|| ProgressLine {
        label: messages.processing_label,
        percent: upload.progress.round().clamp(0.0, 100.0) as u8,
    });

    UploadCard {
        id: upload.id,
        name: upload.name.clone(),
        meta: format!("{} • {}", upload.size_label, upload.mime_type),
        icon: status_icon(upload.status),
        badge: status_badge(upload.status, messages),
        progress,
        actions: actions(upload.status),
    }
}

pub fn project_all(uploads: &[TrackedUpload], messages: &Messages) -> Vec<UploadCard> {
    uploads.iter().map(|u| project(u, messages)).collect()
}

/// Plain-text rendering of a card, a few lines per upload.
pub fn render_card(card: &UploadCard, messages: &Messages) -> String {
    let mut out = format!(
        "{} {} [{}]\n    {}",
        card.icon.glyph(),
        card.name,
        card.badge.label,
        card.meta
    );
    if let Some(p) = &card.progress {
        out.push_str(&format!("\n    {} {}%", p.label, p.percent));
    }
    if !card.actions.is_empty() {
        let labels: Vec<&str> = card.actions.iter().map(|a| a.label(messages)).collect();
        out.push_str(&format!("\n    [{}]", labels.join("] [")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::EN;
    use crate::tracker::model::FileDescriptor;

    fn upload(status: UploadStatus, progress: f64) -> TrackedUpload {
        let mut u = TrackedUpload::from_descriptor(&FileDescriptor::new("notes.pdf", 2_000_000, "application/pdf"));
        u.status = status;
        u.progress = progress;
        u
    }

    #[test]
    fn processing_card_shows_rounded_progress_and_no_actions() {
        let card = project(&upload(UploadStatus::Processing, 42.6), &EN);
        assert_eq!(card.icon, StatusIcon::Spinner);
        assert_eq!(card.badge, StatusBadge { label: "Processing", variant: BadgeVariant::Secondary });
        assert_eq!(card.progress, Some(ProgressLine { label: "Processing...", percent: 43 }));
        assert!(card.actions.is_empty());
        assert_eq!(card.meta, "1.91 MB • application/pdf");
    }

    #[test]
    fn completed_card_offers_study_actions() {
        let card = project(&upload(UploadStatus::Completed, 100.0), &EN);
        assert_eq!(card.icon, StatusIcon::Check);
        assert_eq!(card.badge.variant, BadgeVariant::Success);
        assert!(card.progress.is_none());
        assert_eq!(
            card.actions,
            vec![CardAction::GenerateQuiz, CardAction::CreateSummary, CardAction::ViewContent]
        );
    }

    #[test]
    fn failed_card_renders_error_badge() {
        let card = project(&upload(UploadStatus::Failed, 30.0), &EN);
        assert_eq!(card.icon, StatusIcon::Alert);
        assert_eq!(card.badge, StatusBadge { label: "Error", variant: BadgeVariant::Destructive });
        assert!(card.progress.is_none());
        assert!(card.actions.is_empty());
    }

    #[test]
    fn rendered_card_lists_action_labels() {
        let card = project(&upload(UploadStatus::Completed, 100.0), &EN);
        let text = render_card(&card, &EN);
        assert!(text.starts_with("✔ notes.pdf [Completed]"));
        assert!(text.contains("[Generate Quiz] [Create Summary] [View Content]"));
    }
}
