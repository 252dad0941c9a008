use std::collections::BTreeMap;

use adfs_types::{
    FeedKey, OutOfRange, RoundIndex, RowIndex, RowValue, ring_buffer_cell_position, ring_buffer_row,
    validate::check_round_index,
};

use crate::decode::DecodedWrite;

/// Known state of the ring buffer table, keyed by row index.
///
/// The writer keeps one of these between batches so that rows shared with
/// feeds outside the current batch are re-emitted with their latest rounds
/// instead of being zeroed. Rows never recorded read as all-zero, which is
/// the state of a fresh store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RingBufferTable {
    rows: BTreeMap<RowIndex, RowValue>,
}

impl RingBufferTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of `row`, zero when unknown.
    pub fn row(&self, row: RowIndex) -> RowValue {
        self.rows.get(&row).copied().unwrap_or(RowValue::ZERO)
    }

    pub fn insert_row(&mut self, row: RowIndex, value: RowValue) {
        self.rows.insert(row, value);
    }

    /// Records `round` as the latest round of `feed`, returning the row
    /// that changed.
    pub fn record(&mut self, feed: FeedKey, round: RoundIndex) -> Result<RowIndex, OutOfRange> {
        let round = check_round_index(round)?;
        let row = ring_buffer_row(feed.feed_id, feed.stride)?;
        self.rows
            .entry(row)
            .or_insert(RowValue::ZERO)
            .set_cell(ring_buffer_cell_position(feed.feed_id), round.0);
        Ok(row)
    }

    /// Latest round recorded for `feed`.
    pub fn round_of(&self, feed: FeedKey) -> Result<RoundIndex, OutOfRange> {
        let row = ring_buffer_row(feed.feed_id, feed.stride)?;
        Ok(RoundIndex(
            self.row(row).cell(ring_buffer_cell_position(feed.feed_id)),
        ))
    }

    /// Folds the rows carried by a decoded write into the table.
    ///
    /// Rows whose index is outside the table's domain are skipped, the
    /// decoder has already reported them.
    pub fn apply(&mut self, write: &DecodedWrite) {
        for record in &write.ring_buffer_rows {
            if let Some(row) = record.index() {
                self.rows.insert(row, record.value);
            }
        }
    }

    /// Rows in ascending row order.
    pub fn rows(&self) -> impl Iterator<Item = (RowIndex, RowValue)> + '_ {
        self.rows.iter().map(|(row, value)| (*row, *value))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<(RowIndex, RowValue)> for RingBufferTable {
    fn from_iter<I: IntoIterator<Item = (RowIndex, RowValue)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_rows_read_as_zero() {
        let table = RingBufferTable::new();
        assert_eq!(table.row(RowIndex(42)), RowValue::ZERO);
        assert_eq!(table.round_of(FeedKey::new(3u128, 0)).unwrap(), RoundIndex(0));
    }

    #[test]
    fn record_updates_single_cell() {
        let mut table = RingBufferTable::new();
        let row = table.record(FeedKey::new(18u128, 0), RoundIndex(9)).unwrap();
        table.record(FeedKey::new(19u128, 0), RoundIndex(10)).unwrap();

        assert_eq!(row, RowIndex(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.row(row).cell(2), 9);
        assert_eq!(table.row(row).cell(3), 10);
        assert_eq!(table.round_of(FeedKey::new(18u128, 0)).unwrap(), RoundIndex(9));
    }

    #[test]
    fn same_feed_id_with_other_stride_is_a_different_row() {
        let mut table = RingBufferTable::new();
        table.record(FeedKey::new(1u128, 0), RoundIndex(1)).unwrap();
        table.record(FeedKey::new(1u128, 1), RoundIndex(2)).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.round_of(FeedKey::new(1u128, 0)).unwrap(), RoundIndex(1));
        assert_eq!(table.round_of(FeedKey::new(1u128, 1)).unwrap(), RoundIndex(2));
    }

    #[test]
    fn record_rejects_out_of_range_round() {
        let mut table = RingBufferTable::new();
        assert_eq!(
            table.record(FeedKey::new(1u128, 0), RoundIndex(8192)),
            Err(OutOfRange::RoundIndex(8192))
        );
        assert!(table.is_empty());
    }

    #[test]
    fn record_and_round_of_reject_bad_feed() {
        let mut table = RingBufferTable::new();
        assert_eq!(
            table.record(FeedKey::new(1u128 << 115, 0), RoundIndex(1)),
            Err(OutOfRange::FeedId(1 << 115))
        );
        assert_eq!(
            table.record(FeedKey::new(1u128, 32), RoundIndex(1)),
            Err(OutOfRange::Stride(32))
        );
        assert!(table.is_empty());

        assert_eq!(
            table.round_of(FeedKey::new(1u128 << 115, 0)),
            Err(OutOfRange::FeedId(1 << 115))
        );
        assert_eq!(
            table.round_of(FeedKey::new(1u128, 40)),
            Err(OutOfRange::Stride(40))
        );
    }

    #[test]
    fn rows_iterate_in_ascending_order() {
        let mut high = RowValue::ZERO;
        high.set_cell(0, 7);
        let mut low = RowValue::ZERO;
        low.set_cell(15, 3);

        let mut table = RingBufferTable::new();
        table.insert_row(RowIndex(9), high);
        table.insert_row(RowIndex(2), low);

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows, vec![(RowIndex(2), low), (RowIndex(9), high)]);
        assert_eq!(table.round_of(FeedKey::new(47u128, 0)).unwrap(), RoundIndex(3));

        // insert_row replaces the whole row
        table.insert_row(RowIndex(2), RowValue::ZERO);
        assert_eq!(table.row(RowIndex(2)), RowValue::ZERO);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn collects_from_rows() {
        let mut value = RowValue::ZERO;
        value.set_cell(4, 11);
        let table: RingBufferTable = [(RowIndex(0), value), (RowIndex(5), RowValue::ZERO)]
            .into_iter()
            .collect();

        assert_eq!(table.len(), 2);
        assert_eq!(table.round_of(FeedKey::new(4u128, 0)).unwrap(), RoundIndex(11));

        let copy: RingBufferTable = table.rows().collect();
        assert_eq!(copy, table);
    }
}
