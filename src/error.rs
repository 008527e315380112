use crate::tracker::model::UploadId;

pub type Result<T> = std::result::Result<T, TrackerError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("unknown upload: {0}")]
    UnknownUpload(UploadId),

    /// The owning view was torn down; no new uploads are accepted.
    #[error("tracker has been shut down")]
    Closed,
}
