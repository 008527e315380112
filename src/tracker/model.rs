use uuid::Uuid;

pub type UploadId = Uuid;

/// A file as handed over by a selection event (picker, drop surface, manual entry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self { name: name.into(), size, mime_type: mime_type.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    Processing,
    Completed,
    // nothing produces this yet; kept so renderers handle it
    #[allow(dead_code)]
    Failed,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, UploadStatus::Processing)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedUpload {
    pub id: UploadId,
    pub name: String,
    pub size_label: String,
    pub mime_type: String,
    pub status: UploadStatus,
    /// Percent in `[0, 100]`.
    pub progress: f64,
    pub extracted_summary: Option<String>,
}

impl TrackedUpload {
    pub fn from_descriptor(file: &FileDescriptor) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: file.name.clone(),
            size_label: size_label(file.size),
            mime_type: file.mime_type.clone(),
            status: UploadStatus::Processing,
            progress: 0.0,
            extracted_summary: None,
        }
    }
}

/// Megabytes with two decimals, e.g. `1.91 MB`.
pub fn size_label(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

/// What a single advancement step did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AdvanceOutcome {
    Progressed(f64),
    Completed,
    /// The upload was already terminal; nothing changed.
    Settled(UploadStatus),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub upload_id: UploadId,
    pub title: String,
    pub description: String,
}
