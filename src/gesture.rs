/// Recognizes the boot-time request for interactive mode: three consecutive spaces.
///
/// Only counts bytes. The time window in which the gesture is accepted is up to the caller.
#[derive(Default, Debug)]
pub struct GestureDetector {
    spaces: u8,
}

impl GestureDetector {
    const SPACES_REQUIRED: u8 = 3;

    pub const fn new() -> Self {
        Self { spaces: 0 }
    }

    /// Feeds one received byte, returns true once the gesture is complete.
    pub fn feed(&mut self, byte: u8) -> bool {
        if byte == b' ' {
            self.spaces = self.spaces.saturating_add(1);
        } else {
            self.spaces = 0;
        }
        self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.spaces >= Self::SPACES_REQUIRED
    }
}
