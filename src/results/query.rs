//! Read-only queries over a [`ResultSet`]
//!
//! All queries scan the records in table order and never mutate. "Not found"
//! is `None`; a coordinate of `-1` is a real value.

use super::ResultSet;
use crate::types::{Arrow, Block, Field, ResultKind, ResultRecord};

/// Width of the sensor's reference frame in pixels.
pub const FRAME_WIDTH: i32 = 320;
/// Height of the sensor's reference frame in pixels.
pub const FRAME_HEIGHT: i32 = 240;

/// Closeness of a point to the frame center; lower is closer.
///
/// This is the sum of the rounded square roots of the per-axis distances, not
/// a Euclidean distance. Results ranked by it match what the sensor's own
/// tooling reports as "nearest to center".
pub fn center_score(x: i32, y: i32) -> u32 {
    let dx = ((x - FRAME_WIDTH / 2).abs() as f64).sqrt().round();
    let dy = ((y - FRAME_HEIGHT / 2).abs() as f64).sqrt().round();
    (dx + dy) as u32
}

impl ResultSet {
    /// Records in this cycle.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Identifiers learned on the sensor, as of this cycle.
    pub fn learned_count(&self) -> u16 {
        self.summary.learned_count
    }

    /// Ordinal check against the learned count: true for `1..=learned_count`.
    ///
    /// The sensor numbers learned identifiers from 1 upwards, so this answers
    /// "has an identifier this high been assigned", not whether a particular
    /// identifier is present in the current results.
    pub fn is_learned(&self, id: u16) -> bool {
        id >= 1 && id <= self.summary.learned_count
    }

    pub fn get(&self, index: usize) -> Option<&ResultRecord> {
        self.records.get(index)
    }

    pub fn count(&self, kind: ResultKind) -> usize {
        self.of_kind(kind).count()
    }

    pub fn count_by_id(&self, kind: ResultKind, id: u16) -> usize {
        self.matching(kind, id).count()
    }

    pub fn any_visible(&self, kind: ResultKind) -> bool {
        self.count(kind) != 0
    }

    pub fn is_visible(&self, kind: ResultKind, id: u16) -> bool {
        self.count_by_id(kind, id) != 0
    }

    /// Table index of the `n`-th (1-based) record of `kind` carrying `id`.
    pub fn nth_index(&self, kind: ResultKind, id: u16, n: usize) -> Option<usize> {
        let skip = n.checked_sub(1)?;
        self.matching(kind, id).nth(skip).map(|(index, _)| index)
    }

    /// Table index of the record of `kind` nearest the frame center.
    ///
    /// Blocks are ranked by their center, arrows by their origin. Ties go to
    /// the record that comes first.
    pub fn nearest_to_center(&self, kind: ResultKind) -> Option<usize> {
        self.of_kind(kind)
            .min_by_key(|(_, record)| {
                let (x, y) = record.anchor();
                center_score(x as i32, y as i32)
            })
            .map(|(index, _)| index)
    }

    /// Field of the record at `index`; `None` if absent or of the other kind.
    pub fn field(&self, index: usize, field: impl Into<Field>) -> Option<i32> {
        self.get(index)?.field(field)
    }

    /// Field of the `n`-th (1-based) record carrying `id`, kind taken from
    /// the selector.
    pub fn field_by_id(&self, id: u16, n: usize, field: impl Into<Field>) -> Option<i32> {
        let field = field.into();
        let index = self.nth_index(field.kind(), id, n)?;
        self.field(index, field)
    }

    /// Field of the record nearest the frame center, kind taken from the
    /// selector.
    pub fn nearest_field(&self, field: impl Into<Field>) -> Option<i32> {
        let field = field.into();
        let index = self.nearest_to_center(field.kind())?;
        self.field(index, field)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> + '_ {
        self.records.iter().filter_map(ResultRecord::as_block)
    }

    pub fn arrows(&self) -> impl Iterator<Item = &Arrow> + '_ {
        self.records.iter().filter_map(ResultRecord::as_arrow)
    }

    pub fn nearest_block(&self) -> Option<&Block> {
        self.get(self.nearest_to_center(ResultKind::Block)?)?.as_block()
    }

    pub fn nearest_arrow(&self) -> Option<&Arrow> {
        self.get(self.nearest_to_center(ResultKind::Arrow)?)?.as_arrow()
    }

    fn of_kind(&self, kind: ResultKind) -> impl Iterator<Item = (usize, &ResultRecord)> + '_ {
        self.records.iter().enumerate().filter(move |(_, record)| record.kind() == kind)
    }

    fn matching(
        &self,
        kind: ResultKind,
        id: u16,
    ) -> impl Iterator<Item = (usize, &ResultRecord)> + '_ {
        self.of_kind(kind).filter(move |(_, record)| record.id() == id)
    }
}
