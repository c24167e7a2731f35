use crate::error::Error;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

/// Phenotype table with a header of trait names and one row per sample.
///
/// Values stay as read: traits may be categorical, so nothing is parsed to
/// numbers here.
#[derive(Debug, Clone, PartialEq)]
pub struct PhenoTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    id_col: usize,
}

impl PhenoTable {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>, id_col: usize) -> Result<Self, Error> {
        if id_col >= header.len() {
            return Err(Error::Format(format!(
                "sample id column {} out of range for {} columns",
                id_col,
                header.len()
            )));
        }
        for (ix, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(Error::Format(format!(
                    "row {}: {} fields, header has {}",
                    ix + 2,
                    row.len(),
                    header.len()
                )));
            }
        }
        Ok(Self {
            header,
            rows,
            id_col,
        })
    }

    /// Reads a delimited phenotype file. A UTF-8 BOM on the first header
    /// cell is stripped.
    pub fn from_path(path: &Path, delimiter: u8, id_col: usize) -> Result<Self, Error> {
        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        let mut header: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record?;
            let fields: Vec<String> = record.iter().map(|f| f.to_string()).collect();
            if header.is_empty() {
                header = fields;
                if let Some(first) = header.first_mut() {
                    if let Some(stripped) = first.strip_prefix('\u{feff}') {
                        *first = stripped.to_string();
                    }
                }
            } else {
                rows.push(fields);
            }
        }
        if header.is_empty() {
            return Err(Error::Format("empty phenotype file".to_string()));
        }
        Self::new(header, rows, id_col)
    }

    pub fn write(&self, path: &Path, delimiter: u8) -> Result<(), Error> {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(path)?;
        writer.write_record(&self.header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush().map_err(Error::FileOpeningError)
    }

    pub fn write_tsv(&self, path: &Path) -> Result<(), Error> {
        self.write(path, b'\t')
    }

    pub fn id_col(&self) -> usize {
        self.id_col
    }

    pub fn sample_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r[self.id_col].as_str())
    }

    pub fn num_samples(&self) -> usize {
        self.rows.len()
    }
}

/// One-shot CSV (or other delimiter) to TSV conversion.
pub fn convert_to_tsv(input: &Path, output: &Path, delimiter: u8) -> Result<(), Error> {
    PhenoTable::from_path(input, delimiter, 0)?.write_tsv(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn tmp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("dnngp_prep_pheno_tests").join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reads_csv_with_bom() {
        let dir = tmp_dir("bom");
        let path = write_file(&dir, "p.csv", "\u{feff}sample,yield\nA,1.0\nB,2.5\n");
        let t = PhenoTable::from_path(&path, b',', 0).unwrap();
        assert_eq!(t.header, vec!["sample", "yield"]);
        assert_eq!(t.sample_ids().collect::<Vec<&str>>(), vec!["A", "B"]);
    }

    #[test]
    fn inconsistent_column_count_is_rejected() {
        let dir = tmp_dir("ragged");
        let path = write_file(&dir, "p.csv", "sample,yield\nA,1.0\nB\n");
        let res = PhenoTable::from_path(&path, b',', 0);
        assert!(matches!(res, Err(Error::Format(_))));
    }

    #[test]
    fn csv_to_tsv_is_idempotent_on_tsv_output() {
        let dir = tmp_dir("idem");
        let csv = write_file(&dir, "p.csv", "sample,yield,height\nA,1.0,x\nB,2.5,y\n");
        let tsv = dir.join("p.tsv");
        convert_to_tsv(&csv, &tsv, b',').unwrap();
        let first = fs::read_to_string(&tsv).unwrap();
        assert_eq!(first, "sample\tyield\theight\nA\t1.0\tx\nB\t2.5\ty\n");

        let tsv2 = dir.join("p2.tsv");
        convert_to_tsv(&tsv, &tsv2, b'\t').unwrap();
        assert_eq!(fs::read_to_string(&tsv2).unwrap(), first);
    }

    #[test]
    fn id_col_out_of_range_is_rejected() {
        let res = PhenoTable::new(vec!["sample".to_string()], vec![], 3);
        assert!(matches!(res, Err(Error::Format(_))));
    }
}
