//! Source positions of tokens.

/* -------------------- *
 *       POSITION       *
 * -------------------- */
/// Represents the position of an object in source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// The starting byte offset of the position.
    pub byte_start: usize,
    /// The ending byte offset of the position.
    pub byte_end: usize,
    /// The line number of the position, starting at 1.
    pub line: u32,
    /// The column number of the position, starting at 1.
    pub col: u32,
}

impl Default for Position {
    fn default() -> Self {
        Self::new(0, 0, 1, 1)
    }
}

impl Position {
    /// Creates a new instance of [`Position`].
    #[inline]
    #[must_use]
    pub fn new(byte_start: usize, byte_end: usize, line: u32, col: u32) -> Self {
        Self { byte_start, byte_end, line, col }
    }
}


/* -------------------- *
 *     GET POSITION     *
 * -------------------- */
/// Provides methods to get information about the position of the implementing object.
pub trait GetPosition {
    /// Returns the position of the implementing object.
    #[must_use]
    fn position(&self) -> Position;

    /// Returns the line number of the position.
    #[inline]
    #[must_use]
    fn line(&self) -> u32 {
        self.position().line
    }

    /// Returns the column number of the position.
    #[inline]
    #[must_use]
    fn col(&self) -> u32 {
        self.position().col
    }

    /// Returns the byte range covered by the position.
    #[inline]
    #[must_use]
    fn byte_range(&self) -> std::ops::Range<usize> {
        let position = self.position();
        position.byte_start..position.byte_end
    }
}

impl GetPosition for Position {
    #[inline]
    fn position(&self) -> Position {
        *self
    }
}
