use crate::display::domain::overlay::OverlaySpec;
use crate::shared::frame::Frame;

/// Receives each frame the playback loop presents, together with the
/// overlay text to draw over it.
///
/// Called only from the playback thread, but shared with the controller,
/// hence `Sync` and `&self`.
pub trait FrameSink: Send + Sync {
    fn render(&self, frame: &Frame, overlay: &OverlaySpec)
        -> Result<(), Box<dyn std::error::Error>>;
}

/// Discards every frame. Used for headless playback.
pub struct NullFrameSink;

impl FrameSink for NullFrameSink {
    fn render(
        &self,
        _frame: &Frame,
        _overlay: &OverlaySpec,
    ) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
