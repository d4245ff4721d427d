//! Display collaborator

use crate::HalError;
use tracing::{debug, info};

/// Monochrome display driven through a draw buffer
///
/// A render is `clear_buffer` → `draw_*` → `present`.
pub trait Display: Send {
    fn initialize(&mut self) -> Result<(), HalError>;
    fn clear_buffer(&mut self) -> Result<(), HalError>;
    fn draw_text(&mut self, x: i32, y: i32, scale: u8, text: &str) -> Result<(), HalError>;
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), HalError>;
    fn present(&mut self) -> Result<(), HalError>;
}

/// A single display call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Initialize,
    ClearBuffer,
    Text { x: i32, y: i32, scale: u8, text: String },
    Line { x0: i32, y0: i32, x1: i32, y1: i32 },
    Present,
}

/// Host display that renders each presented frame to the log
pub struct LogDisplay {
    width: i32,
    height: i32,
    /// Pending draw buffer
    buffer: Vec<DrawOp>,
    /// Frames presented so far
    frames: u64,
}

impl LogDisplay {
    /// Create a display of `width` x `height` pixels
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            buffer: Vec::new(),
            frames: 0,
        }
    }

    /// Number of frames presented
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn render_line(&self, x0: i32, x1: i32) -> String {
        // 4 pixels per character keeps a 128 px bar at 32 columns
        let columns = (self.width / 4).max(1) as usize;
        let filled = ((x1 - x0).abs() / 4).clamp(0, columns as i32) as usize;
        format!("[{}{}]", "#".repeat(filled), " ".repeat(columns - filled))
    }
}

impl Default for LogDisplay {
    fn default() -> Self {
        Self::new(128, 32)
    }
}

impl Display for LogDisplay {
    fn initialize(&mut self) -> Result<(), HalError> {
        info!("Log display initialized ({}x{})", self.width, self.height);
        Ok(())
    }

    fn clear_buffer(&mut self) -> Result<(), HalError> {
        self.buffer.clear();
        Ok(())
    }

    fn draw_text(&mut self, x: i32, y: i32, scale: u8, text: &str) -> Result<(), HalError> {
        if scale == 0 {
            return Err(HalError::Display("text scale must be >= 1".to_string()));
        }
        self.buffer.push(DrawOp::Text {
            x,
            y,
            scale,
            text: text.to_string(),
        });
        Ok(())
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), HalError> {
        self.buffer.push(DrawOp::Line { x0, y0, x1, y1 });
        Ok(())
    }

    fn present(&mut self) -> Result<(), HalError> {
        self.frames += 1;
        for op in &self.buffer {
            match op {
                DrawOp::Text { text, .. } => info!(target: "display", "{}", text),
                DrawOp::Line { x0, x1, .. } => {
                    info!(target: "display", "{}", self.render_line(*x0, *x1))
                }
                _ => {}
            }
        }
        debug!("Presented frame {}", self.frames);
        Ok(())
    }
}

/// Display that records every call; clones share the same log
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Clone, Default)]
pub struct RecordingDisplay {
    ops: std::sync::Arc<std::sync::Mutex<Vec<DrawOp>>>,
    failing: bool,
}

#[cfg(any(test, feature = "test-util"))]
impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// A display whose every call records and then fails
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// All calls recorded so far
    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Recorded calls grouped into presented frames
    pub fn frames(&self) -> Vec<Vec<DrawOp>> {
        let mut frames = Vec::new();
        let mut current = Vec::new();
        for op in self.ops() {
            match op {
                DrawOp::Initialize => {}
                DrawOp::Present => frames.push(std::mem::take(&mut current)),
                other => current.push(other),
            }
        }
        frames
    }

    fn record(&self, op: DrawOp) -> Result<(), HalError> {
        self.ops.lock().unwrap_or_else(std::sync::PoisonError::into_inner).push(op);
        if self.failing {
            Err(HalError::Display("recording display set to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Display for RecordingDisplay {
    fn initialize(&mut self) -> Result<(), HalError> {
        self.record(DrawOp::Initialize)
    }

    fn clear_buffer(&mut self) -> Result<(), HalError> {
        self.record(DrawOp::ClearBuffer)
    }

    fn draw_text(&mut self, x: i32, y: i32, scale: u8, text: &str) -> Result<(), HalError> {
        self.record(DrawOp::Text {
            x,
            y,
            scale,
            text: text.to_string(),
        })
    }

    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Result<(), HalError> {
        self.record(DrawOp::Line { x0, y0, x1, y1 })
    }

    fn present(&mut self) -> Result<(), HalError> {
        self.record(DrawOp::Present)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_display_counts_frames() {
        let mut display = LogDisplay::default();
        display.initialize().unwrap();
        display.clear_buffer().unwrap();
        display.draw_text(0, 0, 1, "Distance: 12.00 cm").unwrap();
        display.draw_line(0, 10, 6, 10).unwrap();
        display.present().unwrap();

        assert_eq!(display.frames(), 1);
    }

    #[test]
    fn test_log_display_rejects_zero_scale() {
        let mut display = LogDisplay::default();
        assert!(display.draw_text(0, 0, 0, "x").is_err());
    }

    #[test]
    fn test_bar_rendering_is_clamped() {
        let display = LogDisplay::new(128, 32);
        assert_eq!(display.render_line(0, 0), format!("[{}]", " ".repeat(32)));
        assert_eq!(display.render_line(0, 128), format!("[{}]", "#".repeat(32)));
        assert_eq!(display.render_line(0, 1000), format!("[{}]", "#".repeat(32)));
    }

    #[test]
    fn test_recording_display_groups_frames() {
        let mut display = RecordingDisplay::new();
        let observer = display.clone();

        display.initialize().unwrap();
        display.clear_buffer().unwrap();
        display.draw_text(0, 0, 1, "Failed").unwrap();
        display.present().unwrap();

        let frames = observer.frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0][0], DrawOp::ClearBuffer);
    }
}
