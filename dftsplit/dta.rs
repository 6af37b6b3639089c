//! Text codec for the per-channel [`NormData`] record ("dta" file).
//!
//! One line per channel, four whitespace separated numbers:
//! `mag_min mag_max phs_min phs_max`. There is no header, the channel
//! count comes from the paired magnitude/phase images.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use crate::{types::NormData, DftError, Result};

const FIELDS: usize = 4;

pub fn encode<W: Write>(norms: &[NormData], mut writer: W) -> Result<()> {
    for norm in norms {
        // {:e} prints the shortest representation that parses back to the same f64
        writeln!(
            writer,
            "{:e} {:e} {:e} {:e}",
            norm.mag_min, norm.mag_max, norm.phs_min, norm.phs_max
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn decode<R: BufRead>(reader: R) -> Result<Vec<NormData>> {
    let mut norms = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        norms.push(parse_line(&line, index + 1)?);
    }

    Ok(norms)
}

fn parse_line(line: &str, line_number: usize) -> Result<NormData> {
    let malformed = |reason: String| DftError::MalformedMetadata {
        line: line_number,
        reason,
    };

    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != FIELDS {
        return Err(malformed(format!(
            "expected {FIELDS} numbers, found {}",
            tokens.len()
        )));
    }

    let mut values = [0.0; FIELDS];
    for (value, token) in values.iter_mut().zip(&tokens) {
        *value = token
            .parse::<f64>()
            .map_err(|e| malformed(format!("invalid number {token:?}: {e}")))?;
    }

    let [mag_min, mag_max, phs_min, phs_max] = values;
    if mag_min > mag_max {
        return Err(malformed(format!(
            "magnitude minimum {mag_min} exceeds maximum {mag_max}"
        )));
    }
    if phs_min > phs_max {
        return Err(malformed(format!(
            "phase minimum {phs_min} exceeds maximum {phs_max}"
        )));
    }

    Ok(NormData::new(mag_min, mag_max, phs_min, phs_max))
}

pub fn write_file(path: &Path, norms: &[NormData]) -> Result<()> {
    let file = File::create(path)?;
    encode(norms, BufWriter::new(file))
}

pub fn read_file(path: &Path) -> Result<Vec<NormData>> {
    let file = File::open(path)?;
    decode(BufReader::new(file))
}
