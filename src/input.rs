//! Loading triangles and rays, writing intersection points.
//!
//! Binary inputs start with a little endian `u32` record count, followed by the records
//! as `f32` values: 9 per triangle (three vertices), 6 per ray (origin and direction).

use std::{fs, io::Write, path::Path};

use bytemuck::Pod;
use ordered_float::OrderedFloat;
use thiserror::Error;

use crate::geometry::{Ray, Triangle, WorldPoint, WorldVector};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse obj file: {0}")]
    Obj(#[from] wavefront_obj::ParseError),

    #[error("Input truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Header declares {declared} records, but the data holds {actual}")]
    CountMismatch { declared: usize, actual: usize },
}

const HEADER_SIZE: usize = size_of::<u32>();

/// Reads triangles from an `.obj` file, or from the binary format for any other extension.
pub fn read_triangles(path: impl AsRef<Path>) -> Result<Vec<Triangle>, InputError> {
    let path = path.as_ref();
    let is_obj = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));

    if is_obj {
        parse_obj(fs::read_to_string(path)?)
    } else {
        parse_triangles(&fs::read(path)?)
    }
}

pub fn read_rays(path: impl AsRef<Path>) -> Result<Vec<Ray>, InputError> {
    parse_rays(&fs::read(path)?)
}

pub fn parse_triangles(bytes: &[u8]) -> Result<Vec<Triangle>, InputError> {
    Ok(parse_records::<[f32; 9]>(bytes)?
        .into_iter()
        .map(|v| {
            Triangle::new(
                WorldPoint::new(v[0], v[1], v[2]),
                WorldPoint::new(v[3], v[4], v[5]),
                WorldPoint::new(v[6], v[7], v[8]),
            )
        })
        .collect())
}

pub fn parse_rays(bytes: &[u8]) -> Result<Vec<Ray>, InputError> {
    Ok(parse_records::<[f32; 6]>(bytes)?
        .into_iter()
        .map(|v| {
            Ray::new(
                WorldPoint::new(v[0], v[1], v[2]),
                WorldVector::new(v[3], v[4], v[5]),
            )
        })
        .collect())
}

/// Triangles of all objects in the file, other primitives are skipped.
pub fn parse_obj(content: String) -> Result<Vec<Triangle>, InputError> {
    let parsed = wavefront_obj::obj::parse(content)?;
    let mut triangles = Vec::new();
    let mut skipped = 0usize;

    for o in parsed.objects {
        let vertex = |index: (usize, Option<usize>, Option<usize>)| {
            let v = &o.vertices[index.0];
            WorldPoint::new(v.x as f32, v.y as f32, v.z as f32)
        };
        for geometry in &o.geometry {
            for shape in &geometry.shapes {
                let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                    skipped += 1;
                    continue;
                };
                triangles.push(Triangle::new(vertex(a), vertex(b), vertex(c)));
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} non-triangle primitives");
    }

    Ok(triangles)
}

/// Reads the count header and the records following it.
/// Records are assumed to be stored in native byte order.
fn parse_records<R: Pod>(bytes: &[u8]) -> Result<Vec<R>, InputError> {
    let Some((header, data)) = bytes.split_first_chunk::<HEADER_SIZE>() else {
        return Err(InputError::Truncated {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    };
    let declared = u32::from_le_bytes(*header) as usize;
    let expected = declared * size_of::<R>();

    if data.len() < expected {
        return Err(InputError::Truncated {
            expected: HEADER_SIZE + expected,
            actual: bytes.len(),
        });
    }
    if data.len() > expected {
        return Err(InputError::CountMismatch {
            declared,
            actual: data.len() / size_of::<R>(),
        });
    }

    Ok(bytemuck::pod_collect_to_vec(data))
}

/// Writes the number of points followed by one `x y z` line per point.
pub fn write_points(mut writer: impl Write, points: &[WorldPoint]) -> std::io::Result<()> {
    writeln!(writer, "{}", points.len())?;
    for p in points {
        writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
    }
    writer.flush()
}

/// Lexicographic order, makes the output independent of the dispatch.
pub fn sort_points(points: &mut [WorldPoint]) {
    points.sort_unstable_by_key(|p| (OrderedFloat(p.x), OrderedFloat(p.y), OrderedFloat(p.z)));
}
