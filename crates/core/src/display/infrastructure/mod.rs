pub mod snapshot_frame_sink;
