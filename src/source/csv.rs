use super::{Sample, Source};
use crate::error::{PulseError, Result};
use std::fs;
use std::path::Path;

/// Replays a recorded `<index>,<measured_at_ms>,<heart_rate>` file,
/// wrapping back to the first row after the last one.
#[derive(Debug, Clone)]
pub struct CsvSource {
    // (文件中的行号, 内容)
    rows: Vec<(usize, String)>,
    cursor: usize,
}

impl CsvSource {
    pub fn open(path: &Path, start_index: usize) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_text(&text, start_index)
    }

    pub fn from_text(text: &str, start_index: usize) -> Result<Self> {
        // 第一行是表头，行号从 1 开始
        let rows: Vec<(usize, String)> = text
            .lines()
            .enumerate()
            .skip(1)
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| (i + 1, line.to_owned()))
            .collect();

        if rows.is_empty() {
            return Err(PulseError::Source("csv file has no data rows".into()));
        }

        Ok(CsvSource {
            rows,
            cursor: start_index,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Source for CsvSource {
    fn fetch_one(&mut self) -> Result<Sample> {
        if self.cursor >= self.rows.len() {
            self.cursor = 0;
        }
        let idx = self.cursor;
        self.cursor += 1;

        let (line, row) = &self.rows[idx];
        parse_row(row, *line)
    }
}

fn parse_row(row: &str, line: usize) -> Result<Sample> {
    let cols: Vec<&str> = row.split(',').map(str::trim).collect();
    if cols.len() < 3 {
        return Err(PulseError::Csv {
            line,
            reason: format!("expected 3 columns, got {}", cols.len()),
        });
    }

    let measured_at = cols[1].parse::<i64>().map_err(|e| PulseError::Csv {
        line,
        reason: format!("parsing measured_at_ms: {e}"),
    })?;
    let heart_rate = cols[2].parse::<i32>().map_err(|e| PulseError::Csv {
        line,
        reason: format!("parsing heart_rate: {e}"),
    })?;

    Ok(Sample {
        measured_at,
        heart_rate,
    })
}
