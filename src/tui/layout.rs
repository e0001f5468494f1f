/// Width breakpoints for layout decisions.
///
/// Render code asks the breakpoint instead of comparing column counts itself.

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Breakpoint {
    /// < 60 cols: split pane
    Compact,
    /// 60-99 cols: half screen
    Normal,
    /// 100+ cols: full terminal
    Wide,
}

impl Breakpoint {
    pub fn from_width(width: u16) -> Self {
        match width {
            0..=59 => Breakpoint::Compact,
            60..=99 => Breakpoint::Normal,
            _ => Breakpoint::Wide,
        }
    }

    /// Check if at least this breakpoint (inclusive)
    pub fn at_least(&self, min: Breakpoint) -> bool {
        *self >= min
    }

    /// Widest a single table cell may render before it is cut with `…`
    pub fn max_cell_width(&self) -> usize {
        match self {
            Breakpoint::Compact => 16,
            Breakpoint::Normal => 28,
            Breakpoint::Wide => 40,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoint_thresholds() {
        assert_eq!(Breakpoint::from_width(40), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(59), Breakpoint::Compact);
        assert_eq!(Breakpoint::from_width(60), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(99), Breakpoint::Normal);
        assert_eq!(Breakpoint::from_width(100), Breakpoint::Wide);
        assert_eq!(Breakpoint::from_width(250), Breakpoint::Wide);
    }

    #[test]
    fn cells_shrink_on_narrow_terminals() {
        assert!(Breakpoint::Wide.at_least(Breakpoint::Normal));
        assert!(!Breakpoint::Compact.at_least(Breakpoint::Normal));
        assert!(
            Breakpoint::Compact.max_cell_width() < Breakpoint::Wide.max_cell_width()
        );
    }
}
