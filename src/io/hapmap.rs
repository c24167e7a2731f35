use crate::error::Error;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Number of fixed metadata columns preceding the sample columns.
///
/// Standard HapMap layout: rs#, alleles, chrom, pos, strand, assembly#,
/// center, protLSID, assayLSID, panelLSID, QCcode, then one column per
/// sample.
pub const HAPMAP_META_COLS: usize = 11;

/// A single marker row of a HapMap file.
#[derive(Debug)]
pub struct HapmapMarker {
    pub id: String,
    /// Ordered unique REF/ALT candidates from the alleles column.
    pub alleles: Vec<u8>,
    pub chromosome: String,
    pub position: String,
    /// One call per sample, in header order. `None` is missing/ambiguous.
    pub genotypes: Vec<Option<(u8, u8)>>,
}

/// Fully parsed HapMap genotype table.
///
/// Marker order follows the file; every marker carries exactly one call per
/// sample.
#[derive(Debug)]
pub struct HapmapMatrix {
    pub sample_ids: Vec<String>,
    pub markers: Vec<HapmapMarker>,
}

impl HapmapMatrix {
    /// Reads a HapMap file, transparently decompressing `.gz` input.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
            Box::new(BufReader::new(GzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Self::from_reader(reader)
    }

    pub fn from_reader(mut reader: impl BufRead) -> Result<Self, Error> {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 {
            return Err(Error::Format("empty HapMap file".to_string()));
        }
        let header_fields: Vec<&str> = header.trim_end_matches(['\n', '\r'].as_slice()).split('\t').collect();
        if header_fields.len() <= HAPMAP_META_COLS {
            return Err(Error::Format(format!(
                "HapMap header has {} columns, expected at least {}",
                header_fields.len(),
                HAPMAP_META_COLS + 1
            )));
        }
        let sample_ids: Vec<String> = header_fields[HAPMAP_META_COLS..]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut markers = Vec::new();
        let mut line = String::new();
        let mut line_num = 1usize;
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_num += 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.trim_end_matches(['\n', '\r'].as_slice()).split('\t').collect();
            if fields.len() != header_fields.len() {
                return Err(Error::Format(format!(
                    "line {}: {} columns, header has {}",
                    line_num,
                    fields.len(),
                    header_fields.len()
                )));
            }
            markers.push(HapmapMarker {
                id: fields[0].to_string(),
                alleles: parse_alleles_field(fields[1]),
                chromosome: fields[2].to_string(),
                position: fields[3].to_string(),
                genotypes: fields[HAPMAP_META_COLS..]
                    .iter()
                    .map(|cell| normalize_genotype(cell))
                    .collect(),
            });
        }
        Ok(Self {
            sample_ids,
            markers,
        })
    }

    pub fn num_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn num_markers(&self) -> usize {
        self.markers.len()
    }
}

/// Parses the HapMap alleles column into ordered unique bases.
///
/// Accepts `A/C`, `AC`, `A C`, `A|C` and `A,C`. The first base is the REF
/// candidate, the rest are ALT candidates.
pub fn parse_alleles_field(raw: &str) -> Vec<u8> {
    let mut ordered = Vec::new();
    for b in raw.bytes() {
        let b = b.to_ascii_uppercase();
        if matches!(b, b'A' | b'C' | b'G' | b'T') && !ordered.contains(&b) {
            ordered.push(b);
        }
    }
    ordered
}

fn iupac_pair(code: u8) -> Option<(u8, u8)> {
    // Degenerate heterozygous pairs in sorted order.
    match code {
        b'A' | b'C' | b'G' | b'T' => Some((code, code)),
        b'R' => Some((b'A', b'G')),
        b'Y' => Some((b'C', b'T')),
        b'S' => Some((b'C', b'G')),
        b'W' => Some((b'A', b'T')),
        b'K' => Some((b'G', b'T')),
        b'M' => Some((b'A', b'C')),
        // N, gap and three-base codes carry no usable diploid call
        _ => None,
    }
}

/// Normalizes a raw genotype cell to an unphased allele pair.
///
/// Single characters go through the IUPAC table; multi-character cells such
/// as `A/G`, `AG` or `A|C` take their first two bases, a lone base is
/// duplicated to a homozygous call. Empty, `NA` and anything containing `N`
/// is missing.
pub fn normalize_genotype(raw: &str) -> Option<(u8, u8)> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("NA") {
        return None;
    }
    let upper = s.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    if bytes.len() == 1 {
        return iupac_pair(bytes[0]);
    }
    let bases: Vec<u8> = bytes
        .iter()
        .copied()
        .filter(|b| matches!(b, b'A' | b'C' | b'G' | b'T' | b'N'))
        .collect();
    match bases.len() {
        0 => None,
        1 => {
            if bases[0] == b'N' {
                None
            } else {
                Some((bases[0], bases[0]))
            }
        }
        _ => {
            let (a1, a2) = (bases[0], bases[1]);
            if a1 == b'N' || a2 == b'N' {
                None
            } else {
                Some((a1, a2))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn alleles_field_formats() {
        assert_eq!(parse_alleles_field("A/C"), vec![b'A', b'C']);
        assert_eq!(parse_alleles_field("AC"), vec![b'A', b'C']);
        assert_eq!(parse_alleles_field("a|g"), vec![b'A', b'G']);
        assert_eq!(parse_alleles_field("A,C,A"), vec![b'A', b'C']);
        assert_eq!(parse_alleles_field("N/-"), Vec::<u8>::new());
    }

    #[test]
    fn genotype_normalization() {
        assert_eq!(normalize_genotype("A"), Some((b'A', b'A')));
        assert_eq!(normalize_genotype("R"), Some((b'A', b'G')));
        assert_eq!(normalize_genotype("M"), Some((b'A', b'C')));
        assert_eq!(normalize_genotype("A/G"), Some((b'A', b'G')));
        assert_eq!(normalize_genotype("ag"), Some((b'A', b'G')));
        assert_eq!(normalize_genotype("A|C"), Some((b'A', b'C')));
        assert_eq!(normalize_genotype("N"), None);
        assert_eq!(normalize_genotype("N/N"), None);
        assert_eq!(normalize_genotype("A/N"), None);
        assert_eq!(normalize_genotype(""), None);
        assert_eq!(normalize_genotype("NA"), None);
        assert_eq!(normalize_genotype("-"), None);
    }

    fn meta(rs: &str, alleles: &str, chrom: &str, pos: &str) -> String {
        format!("{rs}\t{alleles}\t{chrom}\t{pos}\t+\tNA\tNA\tNA\tNA\tNA\tNA")
    }

    fn header(samples: &[&str]) -> String {
        format!(
            "rs#\talleles\tchrom\tpos\tstrand\tassembly#\tcenter\tprotLSID\tassayLSID\tpanelLSID\tQCcode\t{}",
            samples.join("\t")
        )
    }

    #[test]
    fn parses_small_matrix() {
        let text = format!(
            "{}\n{}\tAA\tAG\tGG\n",
            header(&["s1", "s2", "s3"]),
            meta("rs1", "A/G", "1", "100")
        );
        let m = HapmapMatrix::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(m.sample_ids, vec!["s1", "s2", "s3"]);
        assert_eq!(m.num_markers(), 1);
        let marker = &m.markers[0];
        assert_eq!(marker.id, "rs1");
        assert_eq!(marker.alleles, vec![b'A', b'G']);
        assert_eq!(
            marker.genotypes,
            vec![Some((b'A', b'A')), Some((b'A', b'G')), Some((b'G', b'G'))]
        );
    }

    #[test]
    fn short_header_is_rejected() {
        let res = HapmapMatrix::from_reader(Cursor::new("rs#\talleles\tchrom\n"));
        assert!(matches!(res, Err(Error::Format(_))));
    }

    #[test]
    fn row_width_mismatch_is_rejected() {
        let text = format!(
            "{}\n{}\tAA\tAG\n",
            header(&["s1", "s2", "s3"]),
            meta("rs1", "A/G", "1", "100")
        );
        let res = HapmapMatrix::from_reader(Cursor::new(text));
        assert!(matches!(res, Err(Error::Format(_))));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let text = format!(
            "{}\n\n{}\tAA\n",
            header(&["s1"]),
            meta("rs9", "A", "2", "5")
        );
        let m = HapmapMatrix::from_reader(Cursor::new(text)).unwrap();
        assert_eq!(m.num_markers(), 1);
    }
}
