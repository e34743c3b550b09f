//! Reading point sets and writing results.
//!
//! Instance files follow the TSPLIB `NODE_COORD_SECTION` layout: a 6 line header
//! (`NAME`, `COMMENT`, `TYPE`, `DIMENSION`, `EDGE_WEIGHT_TYPE`, `NODE_COORD_SECTION`)
//! followed by `index x y` lines. Lines that do not hold exactly three fields, such as the
//! trailing `EOF`, are ignored.

use crate::error::{AcoError, AcoResult};
use crate::graph::Vertex;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

const HEADER_LINES: usize = 6;

pub fn read_vertices<R: BufRead>(reader: R) -> AcoResult<Vec<Vertex>> {
    let mut vertices = Vec::new();

    for (line_num, line) in reader.lines().enumerate().skip(HEADER_LINES) {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 {
            continue;
        }

        let parse_error = |what: &str, raw: &str| AcoError::Parse {
            line: line_num + 1,
            cause: format!("invalid {}: {}", what, raw),
        };

        let index = parts[0]
            .parse::<i64>()
            .map_err(|_| parse_error("index", parts[0]))?;
        let x = parts[1]
            .parse::<f64>()
            .map_err(|_| parse_error("x coordinate", parts[1]))?;
        let y = parts[2]
            .parse::<f64>()
            .map_err(|_| parse_error("y coordinate", parts[2]))?;

        vertices.push(Vertex::new(index, x, y));
    }

    Ok(vertices)
}

pub fn load_vertices<P: AsRef<Path>>(path: P) -> AcoResult<Vec<Vertex>> {
    let file = File::open(path)?;
    read_vertices(BufReader::new(file))
}

/// Reads a known tour as external vertex indices.
///
/// Indices may share a line. Reading stops at the first line containing `-`, which covers
/// the `-1` terminator of TSPLIB tour files.
pub fn read_tour<R: BufRead>(reader: R) -> AcoResult<Vec<i64>> {
    let mut tour = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.contains('-') {
            break;
        }
        for part in line.split_whitespace() {
            let index = part.parse::<i64>().map_err(|_| AcoError::Parse {
                line: line_num + 1,
                cause: format!("invalid index: {}", part),
            })?;
            tour.push(index);
        }
    }

    Ok(tour)
}

pub fn load_tour<P: AsRef<Path>>(path: P) -> AcoResult<Vec<i64>> {
    let file = File::open(path)?;
    read_tour(BufReader::new(file))
}

/// Writes one external vertex index per line.
pub fn write_tour<W: Write>(out: &mut W, tour: &[i64]) -> AcoResult<()> {
    for index in tour {
        writeln!(out, "{}", index)?;
    }
    Ok(())
}

pub fn save_tour<P: AsRef<Path>>(path: P, tour: &[i64]) -> AcoResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_tour(&mut out, tour)?;
    out.flush()?;
    Ok(())
}

/// Writes the best distance after each round as `iteration,best_distance` rows.
pub fn write_convergence<W: Write>(out: &mut W, history: &[f64]) -> AcoResult<()> {
    writeln!(out, "iteration,best_distance")?;
    for (i, best) in history.iter().enumerate() {
        writeln!(out, "{},{}", i + 1, best)?;
    }
    Ok(())
}

pub fn save_convergence<P: AsRef<Path>>(path: P, history: &[f64]) -> AcoResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_convergence(&mut out, history)?;
    out.flush()?;
    Ok(())
}
