use crate::error::Error;
use log::info;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use strum_macros::EnumString;

/// Which column of an .eigenvec file carries the sample id.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum IdMode {
    /// Detect from the first data row.
    Auto,
    /// Second column (FID IID PC1 ... layout).
    Iid,
    /// First column.
    Fid,
}

impl Display for IdMode {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        // lowercase so that clap default_value_t round-trips
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

/// Whitespace-delimited plink2 .eigenvec table, header optional.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenvecTable {
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<String>>,
    id_idx: usize,
    fid_idx: Option<usize>,
}

fn parses_as_float(token: &str) -> bool {
    token.parse::<f64>().is_ok()
}

fn is_empty_id(token: &str) -> bool {
    let s = token.trim();
    s.is_empty() || s.eq_ignore_ascii_case("NA") || s == "."
}

fn looks_like_header(tokens: &[String]) -> bool {
    if tokens.iter().any(|t| {
        let u = t.to_ascii_uppercase();
        matches!(u.as_str(), "FID" | "IID" | "#FID" | "#IID") || u.starts_with("PC")
    }) {
        return true;
    }
    // two or more non-numeric trailing tokens also suggests a header
    tokens[1..].iter().filter(|t| !parses_as_float(t)).count() >= 2
}

fn detect_id_columns(first_row: &[String]) -> (usize, Option<usize>) {
    if first_row.len() >= 2 && parses_as_float(&first_row[1]) {
        // IID PC1 ...
        (0, None)
    } else if first_row.len() >= 3 && parses_as_float(&first_row[2]) {
        // FID IID PC1 ...
        (1, Some(0))
    } else {
        (0, None)
    }
}

impl EigenvecTable {
    pub fn from_path(path: &Path, mode: IdMode) -> Result<Self, Error> {
        let reader = BufReader::new(File::open(path)?);
        Self::from_reader(reader, mode)
    }

    pub fn from_reader(reader: impl BufRead, mode: IdMode) -> Result<Self, Error> {
        let mut header: Option<Vec<String>> = None;
        let mut rows: Vec<Vec<String>> = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let tokens: Vec<String> = line.split_whitespace().map(|t| t.to_string()).collect();
            if header.is_none() && rows.is_empty() && looks_like_header(&tokens) {
                header = Some(tokens);
                continue;
            }
            rows.push(tokens);
        }
        if rows.is_empty() {
            return Err(Error::Format(
                "eigenvec file is empty or header-only".to_string(),
            ));
        }

        let (id_idx, fid_idx) = match mode {
            IdMode::Auto => detect_id_columns(&rows[0]),
            IdMode::Iid => {
                if rows[0].len() >= 2 {
                    (1, Some(0))
                } else {
                    (0, None)
                }
            }
            IdMode::Fid => (0, None),
        };

        // rows without a usable sample id are useless downstream
        let before = rows.len();
        rows.retain(|r| r.len() > id_idx && !is_empty_id(&r[id_idx]));
        if before > rows.len() {
            info!("dropped {} eigenvec rows with empty ids", before - rows.len());
        }
        if rows.is_empty() {
            return Err(Error::Format(
                "eigenvec file has no rows with a usable sample id".to_string(),
            ));
        }

        Ok(Self {
            header,
            rows,
            id_idx,
            fid_idx,
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), Error> {
        let mut w = BufWriter::new(File::create(path)?);
        if let Some(header) = &self.header {
            writeln!(w, "{}", header.join(" "))?;
        }
        for row in &self.rows {
            writeln!(w, "{}", row.join(" "))?;
        }
        w.flush().map_err(Error::FileOpeningError)
    }

    /// Same layout and header, different rows.
    pub fn with_rows(&self, rows: Vec<Vec<String>>) -> Self {
        Self {
            header: self.header.clone(),
            rows,
            id_idx: self.id_idx,
            fid_idx: self.fid_idx,
        }
    }

    pub fn id_idx(&self) -> usize {
        self.id_idx
    }

    pub fn fid_idx(&self) -> Option<usize> {
        self.fid_idx
    }

    pub fn sample_id(&self, row_ix: usize) -> &str {
        &self.rows[row_ix][self.id_idx]
    }

    pub fn sample_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r[self.id_idx].as_str())
    }

    pub fn num_samples(&self) -> usize {
        self.rows.len()
    }

    /// Column names of the component values, taken from the header when one
    /// exists, `PC1..PCk` otherwise.
    pub fn component_names(&self) -> Vec<String> {
        let first_pc = self.id_idx + 1;
        match &self.header {
            Some(h) if h.len() == self.rows[0].len() => h[first_pc..].to_vec(),
            _ => (1..=self.rows[0].len() - first_pc)
                .map(|i| format!("PC{}", i))
                .collect(),
        }
    }

    /// Component values of one row parsed to f32.
    pub fn components(&self, row_ix: usize) -> Result<Vec<f32>, Error> {
        let row = &self.rows[row_ix];
        row[self.id_idx + 1..]
            .iter()
            .map(|t| {
                t.parse::<f32>().map_err(|_| {
                    Error::Format(format!(
                        "non-numeric component value {:?} for sample {}",
                        t,
                        row[self.id_idx]
                    ))
                })
            })
            .collect()
    }

}
