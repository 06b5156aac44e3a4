/// Read / write volumes and images as raw little-endian binary
///
/// Headered files start with the rank (`u32`), the extent along each axis
/// (`u32`, x first), and the logical starting index along each axis (`i32`,
/// x first). They are followed by the samples as `f32`, x varying fastest.

use std::fs::File;
use std::io::{Write, Read, BufWriter, BufReader};
use std::path::Path;

use ndarray::Array2;

use crate::error::{Error, Result};
use crate::image::CentredImage;
use crate::volume::VoxelVolume;

pub fn write(data: impl Iterator<Item = f32>, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut buf = BufWriter::new(file);
    write_samples(data, &mut buf)?;
    buf.flush()
}

type IORes<T> = std::io::Result<T>;
pub fn read<'a>(path: &Path) -> IORes<impl Iterator<Item = IORes<f32>> + 'a> {
    let file = File::open(path)?;
    let mut buf = BufReader::new(file);
    let mut buffer = [0; 4];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut buffer) {
            Ok(()) => Some(Ok(f32::from_le_bytes(buffer))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(e)),
        }
    }))
}

pub fn write_volume(volume: &VoxelVolume, path: &Path) -> Result<()> {
    let mut buf = BufWriter::new(File::create(path)?);
    write_header(&mut buf, &volume.dims(), &volume.starting())?;
    write_samples(volume.data().iter().map(|&x| x as f32), &mut buf)?;
    buf.flush()?;
    Ok(())
}

pub fn read_volume(path: &Path) -> Result<VoxelVolume> {
    let mut buf = BufReader::new(File::open(path)?);
    let (extents, starting) = read_header(&mut buf, 3)?;
    let samples = read_samples(&mut buf)?;
    let dims = [extents[0], extents[1], extents[2]];
    VoxelVolume::from_vec(dims, [starting[0], starting[1], starting[2]], samples)
}

pub fn write_image(image: &CentredImage<f64>, path: &Path) -> Result<()> {
    let mut buf = BufWriter::new(File::create(path)?);
    write_header(&mut buf,
                 &[image.xdim(), image.ydim()],
                 &[image.starting_x(), image.starting_y()])?;
    write_samples(image.data().iter().map(|&x| x as f32), &mut buf)?;
    buf.flush()?;
    Ok(())
}

pub fn read_image(path: &Path) -> Result<CentredImage<f64>> {
    let mut buf = BufReader::new(File::open(path)?);
    let (extents, starting) = read_header(&mut buf, 2)?;
    let samples = read_samples(&mut buf)?;
    let (xdim, ydim) = (extents[0], extents[1]);
    let len = samples.len();
    let data = Array2::from_shape_vec((ydim, xdim), samples)
        .map_err(|_| Error::ShapeMismatch { shape: vec![xdim, ydim], len })?;
    Ok(CentredImage::with_origin(data, starting[1], starting[0]))
}

fn write_samples(data: impl Iterator<Item = f32>, buf: &mut impl Write) -> std::io::Result<()> {
    for datum in data {
        buf.write_all(&datum.to_le_bytes())?;
    }
    Ok(())
}

fn write_header(buf: &mut impl Write, extents: &[usize], starting: &[i32]) -> Result<()> {
    buf.write_all(&(extents.len() as u32).to_le_bytes())?;
    for &n in extents  { buf.write_all(&(n as u32).to_le_bytes())? }
    for &s in starting { buf.write_all(&s.to_le_bytes())? }
    Ok(())
}

fn read_header(buf: &mut impl Read, rank: usize) -> Result<(Vec<usize>, Vec<i32>)> {
    let found = read_u32(buf)? as usize;
    if found != rank {
        return Err(Error::RawFormat(format!("expected rank {rank}, found {found}")))
    }
    let extents = (0..rank).map(|_| read_u32(buf).map(|n| n as usize)).collect::<Result<_>>()?;
    let starting = (0..rank).map(|_| read_u32(buf).map(|n| n as i32)).collect::<Result<_>>()?;
    Ok((extents, starting))
}

fn read_u32(buf: &mut impl Read) -> Result<u32> {
    let mut bytes = [0; 4];
    buf.read_exact(&mut bytes)
        .map_err(|e| Error::RawFormat(format!("truncated header: {e}")))?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_samples(buf: &mut impl Read) -> Result<Vec<f64>> {
    let mut bytes = vec![];
    buf.read_to_end(&mut bytes)?;
    if bytes.len() % 4 != 0 {
        return Err(Error::RawFormat(format!("{} trailing bytes after last sample", bytes.len() % 4)))
    }
    Ok(bytes.chunks_exact(4)
       .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f64)
       .collect())
}
