//! Line-number gutter
//!
//! The gutter works in the same vertical units as the text view (pixels for
//! a graphical front end, rows for a terminal). It is told the geometry of
//! the blocks being shown and hands back one label per visible block; it
//! never walks the document itself.

use crate::config::GutterConfig;

/// Vertical extent of one block (line) in content coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGeometry {
    pub top: i32,
    pub height: i32,
    /// Folded or otherwise hidden blocks get no label
    pub visible: bool,
}

impl BlockGeometry {
    pub fn new(top: i32, height: i32) -> Self {
        Self {
            top,
            height,
            visible: true,
        }
    }

    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// `count` visible blocks of equal height stacked from 0
    pub fn uniform(count: usize, height: i32) -> Vec<Self> {
        (0..count)
            .map(|i| Self::new(i as i32 * height, height))
            .collect()
    }
}

/// The band of gutter coordinates currently on screen (inclusive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub top: i32,
    pub bottom: i32,
}

impl Viewport {
    pub fn new(top: i32, height: i32) -> Self {
        Self {
            top,
            bottom: top + height - 1,
        }
    }

    fn contains(&self, other: &Viewport) -> bool {
        self.top <= other.top && self.bottom >= other.bottom
    }
}

/// One line number to draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GutterLabel {
    /// 1-based
    pub line_number: usize,
    /// Top of the label in gutter coordinates
    pub y: i32,
    /// Left edge of the right-aligned text
    pub x: i32,
    pub height: i32,
    pub text: String,
}

/// What the host view asks the gutter to refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Area of the text view that changed
    pub rect: Viewport,
    /// Vertical scroll since the last update
    pub dy: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repaint {
    /// Shift existing gutter contents by `dy`
    Scroll(i32),
    /// Redraw only this band
    Band(Viewport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GutterUpdate {
    pub repaint: Repaint,
    /// The width may have changed and the host should re-layout
    pub relayout: bool,
}

/// Number of decimal digits in `max(1, line_count)`
pub fn digit_count(line_count: usize) -> usize {
    let mut remaining = line_count.max(1);
    let mut digits = 1;
    while remaining >= 10 {
        remaining /= 10;
        digits += 1;
    }
    digits
}

#[derive(Debug, Clone)]
pub struct Gutter {
    config: GutterConfig,
    /// Advance of the digit `9` in the current font
    char_width: i32,
    line_count: usize,
    digits: usize,
}

impl Gutter {
    pub fn new(config: GutterConfig, char_width: i32) -> Self {
        Self {
            config,
            char_width,
            line_count: 1,
            digits: 1,
        }
    }

    pub fn digits(&self) -> usize {
        self.digits
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// `base_margin + char_width * digits`
    pub fn width(&self) -> i32 {
        self.config.base_margin + self.char_width * self.digits as i32
    }

    /// Record the document's line count. Returns true when the width changed.
    pub fn set_line_count(&mut self, line_count: usize) -> bool {
        self.line_count = line_count;
        let digits = digit_count(line_count);
        if digits == self.digits {
            return false;
        }
        tracing::trace!(from = self.digits, to = digits, "gutter width changed");
        self.digits = digits;
        true
    }

    /// Font changed. Returns true when the width changed.
    pub fn set_char_width(&mut self, char_width: i32) -> bool {
        let changed = char_width != self.char_width;
        self.char_width = char_width;
        changed
    }

    /// Labels for every visible block that intersects `viewport`.
    ///
    /// `blocks[0]` is the geometry of line `first_line` (0-based) and the
    /// blocks follow in document order. Content coordinates are translated
    /// to gutter coordinates by subtracting `scroll_offset`.
    pub fn render(
        &self,
        first_line: usize,
        blocks: &[BlockGeometry],
        scroll_offset: i32,
        viewport: Viewport,
    ) -> Vec<GutterLabel> {
        let mut labels = Vec::new();
        for (i, block) in blocks.iter().enumerate() {
            let top = block.top - scroll_offset;
            let bottom = top + block.height;
            if top > viewport.bottom {
                break;
            }
            if !block.visible || bottom < viewport.top {
                continue;
            }
            let line_number = first_line + i + 1;
            let text = line_number.to_string();
            let text_width = self.char_width * text.chars().count() as i32;
            labels.push(GutterLabel {
                line_number,
                y: top,
                x: self.width() - self.config.right_padding - text_width,
                height: block.height,
                text,
            });
        }
        labels
    }

    /// A line number padded on the left to the current digit count.
    ///
    /// For character-cell front ends where `char_width` is one column.
    pub fn cell_text(&self, line_number: usize) -> String {
        format!("{:>width$}", line_number, width = self.digits)
    }

    /// Decide how to refresh after the text view reported a change
    pub fn handle_update(&self, request: UpdateRequest, viewport: Viewport) -> GutterUpdate {
        let repaint = if request.dy != 0 {
            Repaint::Scroll(request.dy)
        } else {
            Repaint::Band(request.rect)
        };
        GutterUpdate {
            repaint,
            relayout: request.rect.contains(&viewport),
        }
    }
}
