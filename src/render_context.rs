//! Render context — manages the frame lifecycle and rendering pipeline.
//!
//! The `RenderContext` holds the current and previous frame buffers,
//! diffs them, and renders the changes to the terminal.

use crate::buffer::ScreenBuffer;
use crate::error::Result;
use crate::geometry::Size;
use crate::renderer::Renderer;
use crate::terminal::Terminal;

/// Manages the double-buffered rendering pipeline.
///
/// Each frame:
/// 1. `begin_frame()` — swap buffers, clear the current buffer
/// 2. Application writes to the current buffer
/// 3. `end_frame()` — diff, render, and write to terminal
pub struct RenderContext {
    current: ScreenBuffer,
    previous: ScreenBuffer,
    renderer: Renderer,
    size: Size,
}

impl RenderContext {
    /// Create a new render context for the given terminal.
    pub fn new(terminal: &dyn Terminal) -> Result<Self> {
        let size = terminal.size()?;
        let caps = terminal.capabilities();
        let renderer = Renderer::new(caps.color, caps.synchronized_output);
        Ok(Self {
            current: ScreenBuffer::new(size),
            previous: ScreenBuffer::new(size),
            renderer,
            size,
        })
    }

    /// Create a render context with explicit size and capabilities (for testing).
    pub fn with_size(size: Size, renderer: Renderer) -> Self {
        Self {
            current: ScreenBuffer::new(size),
            previous: ScreenBuffer::new(size),
            renderer,
            size,
        }
    }

    /// Get the current buffer dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Get a mutable reference to the current buffer for writing.
    pub fn buffer_mut(&mut self) -> &mut ScreenBuffer {
        &mut self.current
    }

    /// Get a reference to the current buffer.
    pub fn buffer(&self) -> &ScreenBuffer {
        &self.current
    }

    /// Begin a new frame: swap current → previous and clear the current buffer.
    pub fn begin_frame(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.current.clear();
    }

    /// End the frame: diff current vs previous, render to escape sequences,
    /// write to terminal and flush.
    pub fn end_frame(&mut self, terminal: &mut dyn Terminal) -> Result<()> {
        let changes = self.current.diff(&self.previous);
        let output = self.renderer.render(&changes);
        if !output.is_empty() {
            terminal.write_raw(output.as_bytes())?;
            terminal.flush()?;
        }
        Ok(())
    }

    /// Handle a terminal resize: update buffers and size.
    pub fn handle_resize(&mut self, new_size: Size) {
        self.size = new_size;
        self.current.resize(new_size);
        self.previous.resize(new_size);
    }
}
