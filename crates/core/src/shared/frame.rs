/// One decoded video frame as tightly packed RGB24 bytes, row-major.
///
/// `index` is the zero-based position of the frame in its source video.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: usize,
}

/// Bytes per pixel of every frame handed out by a video source.
pub const RGB_CHANNELS: usize = 3;

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * RGB_CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    /// Uniformly grey frame for tests.
    #[cfg(test)]
    pub(crate) fn filled(width: u32, height: u32, value: u8, index: usize) -> Self {
        let len = (width as usize) * (height as usize) * RGB_CHANNELS;
        Self::new(vec![value; len], width, height, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let frame = Frame::new(vec![7u8; 12], 2, 2, 4);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.index(), 4);
        assert_eq!(frame.data().len(), 12);
    }

    #[test]
    fn test_filled_has_rgb_length() {
        let frame = Frame::filled(4, 3, 200, 0);
        assert_eq!(frame.data().len(), 4 * 3 * RGB_CHANNELS);
        assert!(frame.data().iter().all(|&b| b == 200));
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2, 0);
    }
}
