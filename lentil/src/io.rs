use anyhow::{anyhow, bail, Result};
use flate2::read::GzDecoder;
use log::info;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::params::TrueParams;
use crate::recovery::PosteriorDraws;
use crate::simulate::SimOut;

pub const DATASET_HEADER: &str = "unit\tlog_area\tindicator\tcount_covariate\toutcome";

///
/// Open a file for reading, and return a buffered reader
/// * `input_file` - file name--either gzipped or not
///
pub fn open_buf_reader(input_file: &str) -> Result<Box<dyn BufRead>> {
    let ext = Path::new(input_file).extension().and_then(|x| x.to_str());
    let file = File::open(input_file).map_err(|e| anyhow!("{}: {}", input_file, e))?;
    match ext {
        Some("gz") => Ok(Box::new(BufReader::new(GzDecoder::new(file)))),
        _ => Ok(Box::new(BufReader::new(file))),
    }
}

///
/// Open a file for writing, and return a buffered writer
/// * `output_file` - file name--either gzipped or not, or `stdout`/`stderr`
///
pub fn open_buf_writer(output_file: &str) -> Result<Box<dyn Write>> {
    if output_file.eq_ignore_ascii_case("stdout") {
        return Ok(Box::new(BufWriter::new(std::io::stdout())));
    }

    if output_file.eq_ignore_ascii_case("stderr") {
        return Ok(Box::new(BufWriter::new(std::io::stderr())));
    }

    let ext = Path::new(output_file).extension().and_then(|x| x.to_str());
    let file = File::create(output_file).map_err(|e| anyhow!("{}: {}", output_file, e))?;
    match ext {
        Some("gz") => {
            let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
            Ok(Box::new(BufWriter::new(encoder)))
        }
        _ => Ok(Box::new(BufWriter::new(file))),
    }
}

///
/// Read every line of the input_file into memory
///
pub fn read_lines(input_file: &str) -> Result<Vec<Box<str>>> {
    let buf = open_buf_reader(input_file)?;
    let mut lines = vec![];
    for x in buf.lines() {
        lines.push(x?.into_boxed_str());
    }
    Ok(lines)
}

///
/// Write every line into the output_file
///
/// * `lines` - anything displayable, one per line
/// * `output_file` - file name--either gzipped or not
///
pub fn write_lines<T>(lines: &[T], output_file: &str) -> Result<()>
where
    T: std::fmt::Display,
{
    let mut buf = open_buf_writer(output_file)?;
    for line in lines {
        if let Err(e) = writeln!(buf, "{}", line) {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                return Ok(());
            } else {
                return Err(anyhow!("unexpected error: {}", e));
            }
        }
    }
    buf.flush()?;
    Ok(())
}

/// One row per unit under [`DATASET_HEADER`]
pub fn dataset_lines(sim: &SimOut) -> Result<Vec<Box<str>>> {
    let n = sim.num_units();
    if sim.log_area.len() != n || sim.indicator.len() != n || sim.count_covariate.len() != n {
        bail!(
            "dataset lengths differ: log_area {}, indicator {}, count_covariate {}, outcome {}",
            sim.log_area.len(),
            sim.indicator.len(),
            sim.count_covariate.len(),
            n
        );
    }

    let mut lines = Vec::with_capacity(n + 1);
    lines.push(Box::from(DATASET_HEADER));
    let rows = sim
        .log_area
        .iter()
        .zip(sim.indicator.iter())
        .zip(sim.count_covariate.iter())
        .zip(sim.outcome.iter());
    for (i, (((a, x), c), y)) in rows.enumerate() {
        lines.push(format!("{}\t{}\t{}\t{}\t{}", i + 1, a, x, c, y).into_boxed_str());
    }
    Ok(lines)
}

pub fn write_dataset_tsv(sim: &SimOut, output_file: &str) -> Result<()> {
    write_lines(&dataset_lines(sim)?, output_file)?;
    info!("wrote {} units to {}", sim.num_units(), output_file);
    Ok(())
}

pub fn write_truth_json(sim: &SimOut, output_file: &str) -> Result<()> {
    let mut buf = open_buf_writer(output_file)?;
    serde_json::to_writer_pretty(&mut buf, &sim.params())?;
    writeln!(buf)?;
    buf.flush()?;
    info!("wrote true parameters to {}", output_file);
    Ok(())
}

pub fn read_truth_json(input_file: &str) -> Result<TrueParams> {
    let buf = open_buf_reader(input_file)?;
    Ok(serde_json::from_reader(buf)?)
}

fn is_comment_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with('%')
}

fn parse_draws<'a>(lines: impl Iterator<Item = &'a str>, source: &str) -> Result<PosteriorDraws> {
    let mut lines = lines
        .map(str::trim)
        .filter(|x| !x.is_empty() && !is_comment_line(x));

    let header: Vec<&str> = lines
        .next()
        .ok_or_else(|| anyhow!("{}: no header line", source))?
        .split_whitespace()
        .collect();

    let mut columns = [0usize; 3];
    for (col, name) in columns.iter_mut().zip(TrueParams::names()) {
        *col = header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| anyhow!("{}: missing column {}", source, name))?;
    }

    let mut draws: [Vec<f64>; 3] = Default::default();
    for (line_no, line) in lines.enumerate() {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() != header.len() {
            bail!(
                "{}: draw {} has {} fields, expected {}",
                source,
                line_no + 1,
                words.len(),
                header.len()
            );
        }
        for (out, &col) in draws.iter_mut().zip(columns.iter()) {
            let x: f64 = words[col].parse().map_err(|e| {
                anyhow!("{}: draw {}: {:?}: {}", source, line_no + 1, words[col], e)
            })?;
            out.push(x);
        }
    }

    let [intercept, slope, indicator_slope] = draws;
    PosteriorDraws::new(intercept, slope, indicator_slope)
}

/// Read posterior draws, one draw per line, columns named in a header
pub fn read_posterior_draws_tsv(input_file: &str) -> Result<PosteriorDraws> {
    let lines = read_lines(input_file)?;
    let draws = parse_draws(lines.iter().map(|x| x.as_ref()), input_file)?;
    info!("read {} posterior draws from {}", draws.num_draws(), input_file);
    Ok(draws)
}
