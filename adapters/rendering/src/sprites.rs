use crate::RenderingError;

/// Pixel rectangle of one cell inside a sprite sheet image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteRegion {
    /// Left edge in pixels.
    pub x: u32,
    /// Top edge in pixels.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Slices an image into a table of equally sized cells.
///
/// Cells are addressed by `(column, row)`. Partial cells along the right and
/// bottom edges are dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteSheet {
    cell_width: u32,
    cell_height: u32,
    columns: u32,
    rows: u32,
}

impl SpriteSheet {
    /// Slices an `image_width` x `image_height` image into cells.
    pub fn new(
        image_width: u32,
        image_height: u32,
        cell_width: u32,
        cell_height: u32,
    ) -> Result<Self, RenderingError> {
        if cell_width == 0 || cell_height == 0 {
            return Err(RenderingError::EmptySpriteCell {
                width: cell_width,
                height: cell_height,
            });
        }

        let columns = image_width / cell_width;
        let rows = image_height / cell_height;
        if columns == 0 || rows == 0 {
            return Err(RenderingError::SheetTooSmall {
                image_width,
                image_height,
                cell_width,
                cell_height,
            });
        }

        Ok(Self {
            cell_width,
            cell_height,
            columns,
            rows,
        })
    }

    /// Number of whole cells across the image.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of whole cells down the image.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Region of the cell at `(column, row)`, if the sheet has one.
    #[must_use]
    pub const fn region(&self, column: u32, row: u32) -> Option<SpriteRegion> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        Some(SpriteRegion {
            x: column * self.cell_width,
            y: row * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        })
    }

    /// Region of the cell at `(column, row)`, falling back to the first cell.
    #[must_use]
    pub const fn region_or_first(&self, column: u32, row: u32) -> SpriteRegion {
        match self.region(column, row) {
            Some(region) => region,
            None => SpriteRegion {
                x: 0,
                y: 0,
                width: self.cell_width,
                height: self.cell_height,
            },
        }
    }
}
