/// Source positions inside a catalog file
use std::ops::Range;

/// Byte offsets into a catalog source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Convert to a Range for use with ariadne
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// One-based line and column of `start`, counting columns in characters
    ///
    /// Offsets past the end of `source` resolve to its last position.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let mut offset = self.start.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

/// A value with the span it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Spanned { value, span }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "era\n\t90s\n\t2000s\n";
        assert_eq!(Span::new(0, 3).line_col(source), (1, 1));
        assert_eq!(Span::new(5, 8).line_col(source), (2, 2));
        assert_eq!(Span::new(9, 10).line_col(source), (3, 1));
        assert_eq!(Span::new(99, 99).line_col(source), (4, 1));
    }

    #[test]
    fn test_line_col_counts_characters() {
        // Multi-byte characters count as one column each
        let source = "年代\n\t90年代 x\n";
        let x = source.find('x').unwrap();
        assert_eq!(Span::new(x, x + 1).line_col(source), (2, 7));
    }
}
