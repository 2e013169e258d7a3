pub mod constants;
pub mod frame;
pub mod timestamp;
pub mod video_metadata;
