use quince_core::{CellCoord, EdgeClamp, ViewportRect, ViewportSize};

/// Visible window over the grid that follows the tracked entity.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Viewport {
    size: ViewportSize,
    clamp: EdgeClamp,
    rect: ViewportRect,
}

impl Viewport {
    pub(crate) const fn new(size: ViewportSize, clamp: EdgeClamp) -> Self {
        Self {
            size,
            clamp,
            rect: ViewportRect::from_origin_and_size(0, 0, 0, 0),
        }
    }

    pub(crate) const fn size(&self) -> ViewportSize {
        self.size
    }

    pub(crate) const fn clamp(&self) -> EdgeClamp {
        self.clamp
    }

    pub(crate) const fn rect(&self) -> ViewportRect {
        self.rect
    }

    /// Pins the viewport to the grid origin so the previous origin is always
    /// valid for the current grid.
    pub(crate) fn reset(&mut self, columns: u32, rows: u32) {
        self.rect = ViewportRect::from_origin_and_size(
            0,
            0,
            self.size.columns().min(columns),
            self.size.rows().min(rows),
        );
    }

    /// Centres the viewport on `focus`. Returns whether the rectangle moved.
    pub(crate) fn recentre(&mut self, focus: CellCoord, columns: u32, rows: u32) -> bool {
        let width = self.size.columns().min(columns);
        let height = self.size.rows().min(rows);
        let left = centre_axis(
            focus.column(),
            self.size.columns(),
            columns,
            self.rect.left(),
            self.clamp,
        );
        let top = centre_axis(
            focus.row(),
            self.size.rows(),
            rows,
            self.rect.top(),
            self.clamp,
        );

        let rect = ViewportRect::from_origin_and_size(left, top, width, height);
        let changed = rect != self.rect;
        self.rect = rect;
        changed
    }
}

/// Computes the origin along one axis.
///
/// `extent` is the configured visible span; it is capped to `grid` so the
/// result always satisfies `origin + min(extent, grid) <= grid`.
fn centre_axis(focus: u32, extent: u32, grid: u32, previous: u32, clamp: EdgeClamp) -> u32 {
    let visible = extent.min(grid);
    let limit = grid - visible;
    let candidate = i64::from(focus) - i64::from(extent / 2);
    if candidate < 0 {
        return 0;
    }

    let candidate = u32::try_from(candidate).unwrap_or(u32::MAX);
    if candidate <= limit {
        return candidate;
    }

    match clamp {
        EdgeClamp::GridEdge => limit,
        EdgeClamp::RetainPrevious => previous.min(limit),
    }
}
