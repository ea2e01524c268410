//! Full-fidelity JSON document: points, labels, scene objects, metadata and
//! the scene type tag. The only format that reproduces a [`Scene`] exactly.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::types::Scene;

pub fn to_json_string(scene: &Scene) -> Result<String> {
    Ok(serde_json::to_string_pretty(scene)?)
}

pub fn from_json_str(s: &str) -> Result<Scene> {
    Ok(serde_json::from_str(s)?)
}

pub fn write_json_file<P: AsRef<Path>>(path: P, scene: &Scene) -> Result<()> {
    super::atomic_write(path.as_ref(), |tmp| {
        let mut w = BufWriter::new(tmp);
        serde_json::to_writer_pretty(&mut w, scene)?;
        w.flush()?;
        Ok(())
    })
}

pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<Scene> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
