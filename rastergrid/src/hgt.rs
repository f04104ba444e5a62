//! SRTM/NASADEM height (`.hgt`) tiles.

use crate::{Raster, RasterError, SampleStore, C};
use byteorder::{BigEndian as BE, ReadBytesExt};
use geo::geometry::Coord;
use memmap2::Mmap;
use std::{fs::File, io::BufReader, mem::size_of, path::Path};

const ARCSEC_PER_DEG: C = 3600.0;

/// HGT void marker.
const HGT_NODATA: i16 = i16::MIN;

impl Raster {
    /// Returns an HGT tile read into memory from the file at `path`.
    pub fn load_hgt<P: AsRef<Path>>(path: P) -> Result<Self, RasterError> {
        let (resolution, dimensions @ (cols, rows)) = extract_resolution(&path)?;
        let sw_corner = parse_sw_corner(&path)?;

        let mut file = BufReader::new(File::open(path)?);
        let mut samples = Vec::with_capacity(cols * rows);
        for _ in 0..(cols * rows) {
            samples.push(f32::from(file.read_i16::<BE>()?));
        }

        Ok(hgt_raster(
            sw_corner,
            resolution,
            dimensions,
            SampleStore::InMem(samples.into_boxed_slice()),
        ))
    }

    /// Returns an HGT tile using the memory-mapped file as storage.
    pub fn memmap_hgt<P: AsRef<Path>>(path: P) -> Result<Self, RasterError> {
        let (resolution, dimensions) = extract_resolution(&path)?;
        let sw_corner = parse_sw_corner(&path)?;

        let samples = {
            let file = File::open(path)?;
            // The tile is opened read-only and its length was checked
            // above; truncation by another process is not guarded.
            let mmap = unsafe { Mmap::map(&file)? };
            SampleStore::MemMap(mmap)
        };

        Ok(hgt_raster(sw_corner, resolution, dimensions, samples))
    }
}

/// HGT samples are cell centres on whole arcseconds, so the outer
/// edge sits half a cell beyond the integer corner.
fn hgt_raster(
    sw_corner: Coord<i16>,
    resolution: u8,
    dimensions: (usize, usize),
    samples: SampleStore,
) -> Raster {
    let cell = C::from(resolution) / ARCSEC_PER_DEG;
    #[allow(clippy::cast_precision_loss)]
    let north = C::from(sw_corner.y) + (dimensions.1 - 1) as C * cell + cell / 2.0;
    Raster {
        west: C::from(sw_corner.x) - cell / 2.0,
        north,
        cell_size: (cell, cell),
        dimensions,
        nodata: Some(f64::from(HGT_NODATA)),
        geographic: true,
        samples,
    }
}

fn extract_resolution<P: AsRef<Path>>(path: P) -> Result<(u8, (usize, usize)), RasterError> {
    const RES_1_ARCSECONDS_FILE_LEN: u64 = 3601 * 3601 * size_of::<u16>() as u64;
    const RES_3_ARCSECONDS_FILE_LEN: u64 = 1201 * 1201 * size_of::<u16>() as u64;
    match path.as_ref().metadata().map(|m| m.len())? {
        RES_1_ARCSECONDS_FILE_LEN => Ok((1, (3601, 3601))),
        RES_3_ARCSECONDS_FILE_LEN => Ok((3, (1201, 1201))),
        invalid_len => Err(RasterError::HgtLen(invalid_len, path.as_ref().to_owned())),
    }
}

fn parse_sw_corner<P: AsRef<Path>>(path: P) -> Result<Coord<i16>, RasterError> {
    let mk_err = || RasterError::HgtName(path.as_ref().to_owned());
    let name = path
        .as_ref()
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .ok_or_else(mk_err)?;
    if name.len() != 7 || !name.is_ascii() {
        return Err(mk_err());
    }
    let lat_sign = match &name[0..1] {
        "N" | "n" => 1,
        "S" | "s" => -1,
        _ => return Err(mk_err()),
    };
    let lat = lat_sign * name[1..3].parse::<i16>().map_err(|_| mk_err())?;
    let lon_sign = match &name[3..4] {
        "E" | "e" => 1,
        "W" | "w" => -1,
        _ => return Err(mk_err()),
    };
    let lon = lon_sign * name[4..7].parse::<i16>().map_err(|_| mk_err())?;
    Ok(Coord { x: lon, y: lat })
}
