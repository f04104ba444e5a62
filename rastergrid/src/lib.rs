//! North-up raster grids for bathymetry and terrain sampling.
//!
//! A [Raster] is a regular grid of scalar samples addressed by CRS
//! coordinates. Samples are either held in memory or, for HGT tiles,
//! read straight out of a memory-mapped file.
//!
//! # References
//!
//! 1. [HGT file layout](http://fileformats.archiveteam.org/index.php?title=HGT&oldid=17250)
//! 1. [Esri ASCII raster format](https://desktop.arcgis.com/en/arcmap/latest/manage-data/raster-and-images/esri-ascii-raster-format.htm)

mod asc;
mod error;
mod hgt;

pub use crate::error::RasterError;
use geo::geometry::{Coord, Rect};
use memmap2::Mmap;
use std::fmt;

/// Base floating point type used for all coordinates.
pub type C = f64;

pub struct Raster {
    /// West edge of the westmost column.
    west: C,

    /// North edge of the northmost row.
    north: C,

    /// Cell (width, height) in CRS units.
    cell_size: (C, C),

    /// Number of (columns, rows) in this grid.
    dimensions: (usize, usize),

    /// Sentinel meaning "no measurement".
    nodata: Option<f64>,

    /// Whether CRS units are degrees of longitude/latitude.
    geographic: bool,

    /// Samples, row-major, northmost row first.
    samples: SampleStore,
}

enum SampleStore {
    InMem(Box<[f32]>),
    /// Big-endian `i16` samples of an HGT file.
    MemMap(Mmap),
}

impl SampleStore {
    fn get_unchecked(&self, index: usize) -> f32 {
        match self {
            Self::InMem(samples) => samples[index],
            Self::MemMap(raw) => {
                let start = index * std::mem::size_of::<i16>();
                f32::from(i16::from_be_bytes([raw[start], raw[start + 1]]))
            }
        }
    }
}

impl Raster {
    /// Returns an in-memory raster.
    ///
    /// `samples` are row-major with the northmost row first, and
    /// `(west, north)` is the outer corner of the first sample.
    pub fn new(
        west: C,
        north: C,
        cell_size: (C, C),
        dimensions: (usize, usize),
        samples: Vec<f32>,
        nodata: Option<f64>,
    ) -> Result<Self, RasterError> {
        let (cols, rows) = dimensions;
        if !(cell_size.0 > 0.0 && cell_size.1 > 0.0) {
            return Err(RasterError::CellSize(cell_size.0, cell_size.1));
        }
        if samples.len() != cols * rows || samples.is_empty() {
            return Err(RasterError::Dimensions {
                cols,
                rows,
                expected: cols * rows,
                found: samples.len(),
            });
        }
        Ok(Self {
            west,
            north,
            cell_size,
            dimensions,
            nodata,
            geographic: false,
            samples: SampleStore::InMem(samples.into_boxed_slice()),
        })
    }

    /// Marks this raster's coordinates as geographic (degrees).
    #[must_use]
    pub fn with_geographic(mut self, geographic: bool) -> Self {
        self.geographic = geographic;
        self
    }

    /// Returns the number of samples in this raster.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        let (cols, rows) = self.dimensions;
        cols * rows
    }

    /// Returns (columns, rows).
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }

    /// Returns cell (width, height) in CRS units.
    pub fn cell_size(&self) -> (C, C) {
        self.cell_size
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn is_geographic(&self) -> bool {
        self.geographic
    }

    /// Returns the outer bounds of this raster.
    #[allow(clippy::cast_precision_loss)]
    pub fn extent(&self) -> Rect<C> {
        let (cols, rows) = self.dimensions;
        let east = self.west + cols as C * self.cell_size.0;
        let south = self.north - rows as C * self.cell_size.1;
        Rect::new(
            Coord {
                x: self.west,
                y: south,
            },
            Coord {
                x: east,
                y: self.north,
            },
        )
    }

    /// Returns the sample of the cell containing `coord`, if any.
    ///
    /// Nodata samples are returned as-is.
    pub fn get(&self, coord: Coord<C>) -> Option<f32> {
        self.coord_to_xy(coord)
            .map(|xy| self.samples.get_unchecked(self.xy_to_linear_index(xy)))
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("extent", &self.extent())
            .field("cell_size", &self.cell_size)
            .field("dimensions", &self.dimensions)
            .field("nodata", &self.nodata)
            .field("geographic", &self.geographic)
            .field("memmap", &matches!(self.samples, SampleStore::MemMap(_)))
            .finish_non_exhaustive()
    }
}

/// Private API
impl Raster {
    fn coord_to_xy(&self, Coord { x, y }: Coord<C>) -> Option<(usize, usize)> {
        let extent = self.extent();
        if !(extent.min().x <= x && x <= extent.max().x && extent.min().y <= y && y <= extent.max().y)
        {
            return None;
        }
        let (cols, rows) = self.dimensions;
        // Points on the east/south edge belong to the last column/row.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let col = (((x - self.west) / self.cell_size.0).floor() as usize).min(cols - 1);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let row = (((self.north - y) / self.cell_size.1).floor() as usize).min(rows - 1);
        Some((col, row))
    }

    fn xy_to_linear_index(&self, (col, row): (usize, usize)) -> usize {
        self.dimensions.0 * row + col
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, Raster, RasterError};

    /// 3x2 grid, 10 unit cells, NW corner at (100, 50).
    fn small() -> Raster {
        Raster::new(
            100.0,
            50.0,
            (10.0, 10.0),
            (3, 2),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, -9999.0],
            Some(-9999.0),
        )
        .unwrap()
    }

    #[test]
    fn test_extent() {
        let raster = small();
        let extent = raster.extent();
        assert_eq!(extent.min(), Coord { x: 100.0, y: 30.0 });
        assert_eq!(extent.max(), Coord { x: 130.0, y: 50.0 });
        assert_eq!(raster.len(), 6);
    }

    #[test]
    fn test_get() {
        let raster = small();
        assert_eq!(raster.get(Coord { x: 105.0, y: 45.0 }), Some(1.0));
        assert_eq!(raster.get(Coord { x: 125.0, y: 45.0 }), Some(3.0));
        assert_eq!(raster.get(Coord { x: 115.0, y: 35.0 }), Some(5.0));
        // Nodata is not filtered here.
        assert_eq!(raster.get(Coord { x: 125.0, y: 35.0 }), Some(-9999.0));
    }

    #[test]
    fn test_edges_belong_to_grid() {
        let raster = small();
        assert_eq!(raster.get(Coord { x: 130.0, y: 30.0 }), Some(-9999.0));
        assert_eq!(raster.get(Coord { x: 100.0, y: 50.0 }), Some(1.0));
    }

    #[test]
    fn test_out_of_bounds_get_returns_none() {
        let raster = small();
        assert_eq!(raster.get(Coord { x: 99.9, y: 40.0 }), None);
        assert_eq!(raster.get(Coord { x: 130.1, y: 40.0 }), None);
        assert_eq!(raster.get(Coord { x: 110.0, y: 29.9 }), None);
        assert_eq!(raster.get(Coord { x: 110.0, y: 50.1 }), None);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = Raster::new(0.0, 0.0, (1.0, 1.0), (2, 2), vec![0.0; 3], None).unwrap_err();
        assert!(matches!(
            err,
            RasterError::Dimensions {
                expected: 4,
                found: 3,
                ..
            }
        ));
        let err = Raster::new(0.0, 0.0, (0.0, 1.0), (1, 1), vec![0.0], None).unwrap_err();
        assert!(matches!(err, RasterError::CellSize(..)));
    }

    #[test]
    fn test_debug_omits_samples() {
        let debug = format!("{:?}", small());
        assert!(debug.starts_with("Raster {"));
        assert!(debug.contains("dimensions: (3, 2)"));
        assert!(debug.contains("memmap: false"));
        assert!(!debug.contains("[1.0, 2.0"));
    }
}
