//! Loading indicator for terminal UI

/// Simple ASCII loading indicator with rotating animation
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    message: String,
    frame: usize,
}

const FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

impl LoadingIndicator {
    /// Creates a new loading indicator with the specified message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frame: 0,
        }
    }

    /// Gets the current animation frame character
    pub fn current_frame(&self) -> &str {
        FRAMES[self.frame]
    }

    /// Gets the loading message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Advances to the next animation frame
    pub fn next_frame(&mut self) {
        self.frame = (self.frame + 1) % FRAMES.len();
    }
}
