/// Display labels for the generator's sequential unit numbers.
///
/// The plain numbers follow the original course units; the extra entries
/// ("√2" and "4½") are units slotted in between them.
pub const UNIT_LABELS: [&str; 17] = [
    "1", "√2", "2", "3", "4", "4½", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15",
];

/// Ordered lookup from a 1-based generated position to its display label.
#[derive(Debug, Clone, Copy)]
pub struct NumberingTable {
    labels: &'static [&'static str],
}

impl Default for NumberingTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl NumberingTable {
    pub const fn standard() -> Self {
        Self {
            labels: &UNIT_LABELS,
        }
    }

    pub const fn from_labels(labels: &'static [&'static str]) -> Self {
        Self { labels }
    }

    /// Label for a 1-based position. Position 0 and anything past the end
    /// have no label.
    pub fn label(&self, position: usize) -> Option<&'static str> {
        position
            .checked_sub(1)
            .and_then(|index| self.label_at_offset(index))
    }

    /// Label for a 0-based index into the table.
    pub fn label_at_offset(&self, index: usize) -> Option<&'static str> {
        self.labels.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.labels.iter().copied()
    }

    /// `(position, label)` pairs, 1-based.
    pub fn positions(&self) -> impl Iterator<Item = (usize, &'static str)> + '_ {
        self.iter().enumerate().map(|(i, label)| (i + 1, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_labels() {
        let table = NumberingTable::standard();

        assert_eq!(table.len(), 17);
        assert_eq!(table.label(1), Some("1"));
        assert_eq!(table.label(2), Some("√2"));
        assert_eq!(table.label(3), Some("2"));
        assert_eq!(table.label(4), Some("3"));
        assert_eq!(table.label(5), Some("4"));
        assert_eq!(table.label(6), Some("4½"));
        assert_eq!(table.label(7), Some("5"));
        assert_eq!(table.label(17), Some("15"));
    }

    #[test]
    fn test_out_of_range_positions() {
        let table = NumberingTable::standard();

        assert_eq!(table.label(0), None);
        assert_eq!(table.label(18), None);
        assert_eq!(table.label(usize::MAX), None);
        assert_eq!(table.label_at_offset(17), None);
    }

    #[test]
    fn test_practice_offsets() {
        let table = NumberingTable::standard();
        let practice: Vec<_> = (0..5)
            .filter_map(|i| table.label_at_offset(10 + i))
            .collect();

        assert_eq!(practice, vec!["9", "10", "11", "12", "13"]);
    }

    #[test]
    fn test_positions_are_one_based() {
        let table = NumberingTable::from_labels(&["a", "b"]);
        let pairs: Vec<_> = table.positions().collect();

        assert_eq!(pairs, vec![(1, "a"), (2, "b")]);
        assert!(!table.is_empty());
    }
}
