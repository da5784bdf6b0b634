//! Display and status sink seams
//!
//! The rig renders operator screens on a 20x4 character display and
//! mirrors test traffic to an append-only human-readable status log
//! (serial console on hardware, stdout or a capture buffer on host).
//! Both are stateless rendering targets from the core's perspective.

/// Character columns of the operator display.
pub const DISPLAY_COLS: u8 = 20;

/// Character rows of the operator display.
pub const DISPLAY_ROWS: u8 = 4;

/// Row/column addressed character display.
pub trait DisplaySink {
    /// Blanks the whole display.
    fn clear(&mut self);

    /// Writes text starting at the given column and row.
    ///
    /// Text running past the last column is the implementor's concern
    /// (hardware character modules simply stop latching).
    fn write_at(&mut self, col: u8, row: u8, text: &str);
}

/// Append-only human-readable status line sink.
///
/// Lines are write-only and never parsed back.
pub trait StatusSink {
    /// Appends one status line.
    fn status_line(&mut self, line: &str);
}
