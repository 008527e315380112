pub mod dropzone;
pub mod manual;
pub mod mime;
pub mod picker;
pub mod registry;
