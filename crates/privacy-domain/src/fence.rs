use h3o::{CellIndex, LatLng};
use tracing::warn;

/// Ordered set of privacy fence cells for one device.
///
/// Order is meaningful: the matcher honors the first cell that contains a
/// point, even when several cells at different resolutions would.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceSet {
    cells: Vec<CellIndex>,
}

impl FenceSet {
    pub fn new(cells: Vec<CellIndex>) -> Self {
        Self { cells }
    }

    /// Builds a fence set from string-encoded cell indexes, keeping input
    /// order. Strings that do not parse as a cell index are dropped; they
    /// could never equal a computed cell anyway.
    pub fn parse(indexes: &[String]) -> Self {
        let cells = indexes
            .iter()
            .filter_map(|raw| match raw.parse::<CellIndex>() {
                Ok(cell) => Some(cell),
                Err(error) => {
                    warn!(index = %raw, error = %error, "skipping unparseable fence cell index");
                    None
                }
            })
            .collect();
        Self { cells }
    }

    pub fn cells(&self) -> &[CellIndex] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Returns the first fence cell containing the point.
///
/// Each candidate is compared at the fence cell's own resolution, so fences
/// of mixed granularity behave independently. The scan stops at the first
/// hit.
pub fn find_containing_cell(
    latitude: f64,
    longitude: f64,
    fence: &FenceSet,
) -> Option<CellIndex> {
    let point = LatLng::new(latitude, longitude).ok()?;
    fence
        .cells()
        .iter()
        .copied()
        .find(|cell| point.to_cell(cell.resolution()) == *cell)
}

/// Centroid of the matched cell's parent, one resolution coarser. `None`
/// when the cell is already at the coarsest resolution and has no parent.
pub fn generalized_centroid(cell: CellIndex) -> Option<(f64, f64)> {
    let parent_resolution = cell.resolution().pred()?;
    let parent = cell.parent(parent_resolution)?;
    let centroid = LatLng::from(parent);
    Some((centroid.lat(), centroid.lng()))
}
