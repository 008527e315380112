/// User-facing text for the upload panel and its notifications.
/// Locale is selected with the `--locale` CLI flag (e.g. `--locale zh`).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub fn from_str(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "zh_cn" | "zh-hans" | "zh-tw" | "zh_tw" => Self::Zh,
            _ => Self::En,
        }
    }
}

pub struct Messages {
    pub panel_title: &'static str,
    pub panel_subtitle: &'static str,
    pub drop_hint: &'static str,
    pub accept_hint: &'static str,
    pub list_title: &'static str,
    pub list_subtitle: &'static str,
    pub toast_title: &'static str,
    /// `{name}` is replaced by the file name.
    pub toast_description: &'static str,
    pub extracted_placeholder: &'static str,
    pub badge_processing: &'static str,
    pub badge_completed: &'static str,
    pub badge_failed: &'static str,
    pub processing_label: &'static str,
    pub action_generate_quiz: &'static str,
    pub action_create_summary: &'static str,
    pub action_view_content: &'static str,
    pub tips_title: &'static str,
    pub tips: [&'static str; 3],
    pub session_started: &'static str,
    pub session_finished: &'static str,
    pub session_cancelled: &'static str,
    pub error_prefix: &'static str,
    pub info_prefix: &'static str,
    pub toast_prefix: &'static str,
}

impl Messages {
    pub fn toast_description_for(&self, name: &str) -> String {
        self.toast_description.replace("{name}", name)
    }
}

pub static EN: Messages = Messages {
    panel_title: "Document Upload",
    panel_subtitle: "Upload your study materials for AI-powered processing",
    drop_hint: "Drop your documents here",
    accept_hint: "Support for PDF, DOCX, TXT, and more. Maximum file size: 20MB",
    list_title: "Uploaded Documents",
    list_subtitle: "Track the processing status of your uploaded files",
    toast_title: "Document processed successfully",
    toast_description: "{name} is ready for study generation",
    extracted_placeholder: "Sample extracted text from the document...",
    badge_processing: "Processing",
    badge_completed: "Completed",
    badge_failed: "Error",
    processing_label: "Processing...",
    action_generate_quiz: "Generate Quiz",
    action_create_summary: "Create Summary",
    action_view_content: "View Content",
    tips_title: "Processing Tips",
    tips: [
        "Clear, high-quality scans work best for text extraction",
        "PDFs with embedded text are processed faster than image-based files",
        "Structured documents generate better assessments",
    ],
    session_started: "Processing started",
    session_finished: "All documents processed",
    session_cancelled: "Processing cancelled",
    error_prefix: "ERR",
    info_prefix: "INFO",
    toast_prefix: "TOAST",
};

pub static ZH: Messages = Messages {
    panel_title: "文档上传",
    panel_subtitle: "上传学习资料，由 AI 进行处理",
    drop_hint: "将文档拖放到此处",
    accept_hint: "支持 PDF、DOCX、TXT 等格式，单个文件最大 20MB",
    list_title: "已上传的文档",
    list_subtitle: "跟踪已上传文件的处理状态",
    toast_title: "文档处理成功",
    toast_description: "{name} 已可用于生成学习内容",
    extracted_placeholder: "从文档中提取的示例文本……",
    badge_processing: "处理中",
    badge_completed: "已完成",
    badge_failed: "错误",
    processing_label: "处理中……",
    action_generate_quiz: "生成测验",
    action_create_summary: "生成摘要",
    action_view_content: "查看内容",
    tips_title: "处理提示",
    tips: [
        "清晰、高质量的扫描件最适合文本提取",
        "内嵌文本的 PDF 比图片型文件处理更快",
        "结构清晰的文档能生成更好的测评",
    ],
    session_started: "处理已开始",
    session_finished: "全部文档处理完成",
    session_cancelled: "处理已取消",
    error_prefix: "错误",
    info_prefix: "信息",
    toast_prefix: "通知",
};

pub fn get_messages(locale: Locale) -> &'static Messages {
    match locale {
        Locale::En => &EN,
        Locale::Zh => &ZH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_parsing_accepts_chinese_variants() {
        assert_eq!(Locale::from_str("zh"), Locale::Zh);
        assert_eq!(Locale::from_str("ZH-CN"), Locale::Zh);
        assert_eq!(Locale::from_str("fr"), Locale::En);
    }

    #[test]
    fn toast_description_names_the_file() {
        assert_eq!(
            EN.toast_description_for("notes.pdf"),
            "notes.pdf is ready for study generation"
        );
        assert!(ZH.toast_description_for("notes.pdf").starts_with("notes.pdf"));
    }
}
