//! ASCII PLY with four float vertex properties.
//!
//! ```text
//! ply
//! format ascii 1.0
//! element vertex <N>
//! property float x
//! property float y
//! property float z
//! property float intensity
//! end_header
//! <x> <y> <z> <intensity>      (N lines, table row order)
//! ```
//!
//! Labels and timestamps are not representable; viewers that read this
//! format are label-agnostic.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::table::PointTable;
use crate::types::Point;

const PROPERTIES: [&str; 4] = ["x", "y", "z", "intensity"];

pub fn write_ply<W, I>(w: &mut W, points: I) -> io::Result<()>
where
    W: Write,
    I: ExactSizeIterator<Item = Point>,
{
    writeln!(w, "ply")?;
    writeln!(w, "format ascii 1.0")?;
    writeln!(w, "element vertex {}", points.len())?;
    for name in PROPERTIES {
        writeln!(w, "property float {name}")?;
    }
    writeln!(w, "end_header")?;

    for [x, y, z, i] in points {
        writeln!(w, "{x} {y} {z} {i}")?;
    }

    Ok(())
}

pub fn write_ply_file<P: AsRef<Path>>(path: P, table: &PointTable) -> Result<()> {
    super::atomic_write(path.as_ref(), |tmp| {
        let mut w = BufWriter::new(tmp);
        write_ply(&mut w, table.points())?;
        w.flush()?;
        Ok(())
    })
}

/// Parse a document produced by [`write_ply`].
pub fn parse_ply(text: &str) -> Result<Vec<Point>> {
    let bad = |msg: &str| Error::Ply(msg.to_owned());
    let mut lines = text.lines();

    if lines.next() != Some("ply") {
        return Err(bad("missing `ply` magic"));
    }
    if lines.next() != Some("format ascii 1.0") {
        return Err(bad("only `format ascii 1.0` is supported"));
    }

    let count: usize = lines
        .next()
        .and_then(|l| l.strip_prefix("element vertex "))
        .and_then(|n| n.trim().parse().ok())
        .ok_or_else(|| bad("missing `element vertex` count"))?;

    for name in PROPERTIES {
        let expected = format!("property float {name}");
        if lines.next() != Some(expected.as_str()) {
            return Err(Error::Ply(format!("expected `{expected}`")));
        }
    }
    if lines.next() != Some("end_header") {
        return Err(bad("missing `end_header`"));
    }

    let mut points = Vec::with_capacity(count);
    for line in lines.by_ref().take(count) {
        let mut p = [0f32; 4];
        let mut fields = line.split_ascii_whitespace();
        for v in p.iter_mut() {
            *v = fields
                .next()
                .and_then(|f| f.parse().ok())
                .ok_or_else(|| Error::Ply(format!("bad vertex line {line:?}")))?;
        }
        points.push(p);
    }

    if points.len() != count {
        return Err(Error::Ply(format!(
            "header declares {count} vertices, found {}",
            points.len()
        )));
    }

    Ok(points)
}
