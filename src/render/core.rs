use std::io::Write;

use crate::error::Result;
use crate::geometry::Size;
use crate::render::ansi;
use crate::width::{display_width, truncate_to_width};

/// Full-screen line renderer that only rewrites rows whose content changed.
///
/// Each row is fitted to the terminal width (clipped or space padded) and
/// hashed with `blake3`; a row is written when its hash differs from the one
/// drawn last time.
pub struct LineRenderer {
    size: Size,
    drawn: Vec<Option<blake3::Hash>>,
}

impl LineRenderer {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            drawn: vec![None; size.height as usize],
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Adopt a new terminal size. Forces a full redraw when it changed.
    pub fn resize(&mut self, size: Size) {
        if size != self.size {
            self.size = size;
            self.invalidate();
        }
    }

    /// Forget what is on screen so the next frame is drawn in full.
    pub fn invalidate(&mut self) {
        self.drawn = vec![None; self.size.height as usize];
    }

    /// Draw `lines` as one frame. Rows past the end of `lines` are blanked,
    /// lines past the screen height are dropped. Returns the number of rows written.
    pub fn render<S>(&mut self, out: &mut dyn Write, lines: &[S]) -> Result<usize>
    where
        S: AsRef<str>,
    {
        if self.size.is_empty() {
            return Ok(0);
        }

        let mut written = 0;
        for row in 0..self.size.height {
            let text = lines.get(row as usize).map(AsRef::as_ref).unwrap_or("");
            let fitted = fit_line(text, self.size.width as usize);
            let hash = blake3::hash(fitted.as_bytes());

            let slot = &mut self.drawn[row as usize];
            if *slot == Some(hash) {
                continue;
            }
            write!(out, "{}{}", ansi::move_to(row + 1, 1), fitted)?;
            *slot = Some(hash);
            written += 1;
        }
        Ok(written)
    }
}

/// Clip or pad `line` to exactly `width` columns.
///
/// Styled lines that overflow lose their styling; lines that fit keep it and
/// get a trailing reset so attributes never bleed into the padding.
pub(crate) fn fit_line(line: &str, width: usize) -> String {
    let styled = line.contains('\x1b');
    let mut fitted = if display_width(line) > width {
        let plain = if styled {
            strip_ansi_escapes::strip_str(line)
        } else {
            line.to_string()
        };
        truncate_to_width(&plain, width)
    } else {
        let mut kept = line.to_string();
        if styled {
            kept.push_str(ansi::reset());
        }
        kept
    };

    let used = display_width(&fitted);
    fitted.extend(std::iter::repeat_n(' ', width.saturating_sub(used)));
    fitted
}
