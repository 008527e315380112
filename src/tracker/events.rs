use crate::tracker::model::{Notification, UploadId, UploadStatus};

#[derive(Debug, Clone)]
pub enum TrackerEvent {
    UploadAdded { upload_id: UploadId, name: String, size_label: String, mime_type: String },
    StatusChanged { upload_id: UploadId, status: UploadStatus },
    Progress { upload_id: UploadId, progress: f64 },
    Notification(Notification),
    /// Every upload has reached a terminal status.
    AllSettled,
    TornDown { cancelled: usize },
}
