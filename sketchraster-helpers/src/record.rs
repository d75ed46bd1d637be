/// Raw class identifier as stored in the upstream word column.
pub type ClassId = usize;

/// One delta-encoded drawing record: a relative pen movement plus a
/// pen-lift marker. On the wire this is the triple `[dx, dy, lift]`.
///
/// Only `lift == 1` closes the current stroke; every other value is
/// treated as pen-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "(i32, i32, i32)", into = "(i32, i32, i32)")
)]
pub struct PenMove {
    pub dx: i32,
    pub dy: i32,
    pub lift: i32,
}

impl PenMove {
    pub fn new(dx: i32, dy: i32, lift: i32) -> Self {
        PenMove { dx, dy, lift }
    }

    /// True when this movement ends the current stroke.
    pub fn lifts_pen(&self) -> bool {
        self.lift == 1
    }
}

impl From<(i32, i32, i32)> for PenMove {
    fn from((dx, dy, lift): (i32, i32, i32)) -> Self {
        PenMove { dx, dy, lift }
    }
}

impl From<PenMove> for (i32, i32, i32) {
    fn from(m: PenMove) -> Self {
        (m.dx, m.dy, m.lift)
    }
}

/// One source sketch as supplied by the record collection: the
/// delta-encoded drawing and the raw class id of its `word` column.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawRecord {
    pub word: ClassId,
    pub drawing: Vec<PenMove>,
}

impl RawRecord {
    pub fn new(word: ClassId, drawing: Vec<PenMove>) -> Self {
        RawRecord { word, drawing }
    }
}
