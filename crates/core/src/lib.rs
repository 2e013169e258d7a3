pub mod display;
pub mod playback;
pub mod service;
pub mod shared;
pub mod video;
