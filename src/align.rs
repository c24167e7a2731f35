use crate::error::Error;
use crate::io::eigenvec::EigenvecTable;
use crate::io::pheno::PhenoTable;
use log::info;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct AlignOptions {
    /// Split character for composite phenotype ids like "A/B"; either part
    /// may match an eigenvec id.
    pub split_char: Option<char>,
    /// Drop samples whose numeric fields contain NaN or Inf.
    pub drop_non_finite: bool,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            split_char: Some('/'),
            drop_non_finite: false,
        }
    }
}

fn is_empty_id(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("NA") || s == "."
}

fn is_non_finite(token: &str) -> bool {
    token
        .trim()
        .parse::<f64>()
        .map(|x| !x.is_finite())
        .unwrap_or(false)
}

/// Picks the id under which a phenotype row matches the eigenvec samples.
///
/// Composite ids are split and the first matching part wins; the full id is
/// a fallback match.
fn resolve_id(raw: &str, eigen_ids: &HashSet<&str>, split_char: Option<char>) -> Option<String> {
    if let Some(sep) = split_char {
        if raw.contains(sep) {
            for part in raw.split(sep).map(str::trim).filter(|p| !p.is_empty()) {
                if eigen_ids.contains(part) {
                    return Some(part.to_string());
                }
            }
        }
    }
    if eigen_ids.contains(raw) {
        return Some(raw.to_string());
    }
    None
}

/// Intersects the samples of a phenotype table and an eigenvec table and
/// reorders both to the phenotype table's row order.
///
/// Inputs are not touched; two new tables come back with identical id
/// sequences, equal length and no duplicate ids. An empty intersection is
/// an error.
pub fn align(
    pheno: &PhenoTable,
    eigen: &EigenvecTable,
    options: &AlignOptions,
) -> Result<(PhenoTable, EigenvecTable), Error> {
    let mut eigen_rows: Vec<Vec<String>> = eigen.rows.clone();
    let mut dropped_non_finite = 0usize;
    if options.drop_non_finite {
        let id_idx = eigen.id_idx();
        let before = eigen_rows.len();
        eigen_rows.retain(|r| !r[id_idx + 1..].iter().any(|t| is_non_finite(t)));
        dropped_non_finite += before - eigen_rows.len();
    }
    let mut eigen_row_by_id: HashMap<&str, usize> = HashMap::new();
    for (ix, row) in eigen_rows.iter().enumerate() {
        // first occurrence wins
        eigen_row_by_id.entry(&row[eigen.id_idx()]).or_insert(ix);
    }
    let eigen_ids: HashSet<&str> = eigen_row_by_id.keys().copied().collect();

    let id_col = pheno.id_col();
    let mut seen: HashSet<String> = HashSet::new();
    let mut out_pheno_rows: Vec<Vec<String>> = Vec::new();
    let mut out_eigen_rows: Vec<Vec<String>> = Vec::new();
    let mut skipped_duplicates = 0usize;
    for row in &pheno.rows {
        let raw_id = row[id_col].trim();
        if is_empty_id(raw_id) {
            continue;
        }
        if options.drop_non_finite
            && row
                .iter()
                .enumerate()
                .any(|(ix, t)| ix != id_col && is_non_finite(t))
        {
            dropped_non_finite += 1;
            continue;
        }
        let Some(aligned_id) = resolve_id(raw_id, &eigen_ids, options.split_char) else {
            continue;
        };
        if !seen.insert(aligned_id.clone()) {
            skipped_duplicates += 1;
            continue;
        }
        let eigen_ix = eigen_row_by_id[aligned_id.as_str()];
        let mut pheno_row = row.clone();
        pheno_row[id_col] = aligned_id.clone();
        out_pheno_rows.push(pheno_row);
        out_eigen_rows.push(eigen_rows[eigen_ix].clone());
        let eigen_out_ix = out_eigen_rows.len() - 1;
        if let Some(fid_idx) = eigen.fid_idx() {
            out_eigen_rows[eigen_out_ix][fid_idx] = aligned_id.clone();
        }
        out_eigen_rows[eigen_out_ix][eigen.id_idx()] = aligned_id;
    }

    if out_pheno_rows.is_empty() {
        return Err(Error::Alignment(
            "no shared sample ids between phenotype and eigenvec tables".to_string(),
        ));
    }
    info!("alignment kept {} samples", out_pheno_rows.len());
    if skipped_duplicates > 0 {
        info!("skipped {} duplicate phenotype rows", skipped_duplicates);
    }
    if dropped_non_finite > 0 {
        info!("dropped {} samples with non-finite values", dropped_non_finite);
    }

    let aligned_pheno = PhenoTable::new(pheno.header.clone(), out_pheno_rows, id_col)?;
    Ok((aligned_pheno, eigen.with_rows(out_eigen_rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::eigenvec::IdMode;
    use std::io::Cursor;

    fn pheno(ids: &[&str]) -> PhenoTable {
        let rows = ids
            .iter()
            .enumerate()
            .map(|(i, id)| vec![id.to_string(), format!("{}.5", i)])
            .collect();
        PhenoTable::new(vec!["sample".to_string(), "yield".to_string()], rows, 0).unwrap()
    }

    fn eigen(ids: &[&str]) -> EigenvecTable {
        let text: String = ids
            .iter()
            .enumerate()
            .map(|(i, id)| format!("{} {}.1 {}.2\n", id, i, i))
            .collect();
        EigenvecTable::from_reader(Cursor::new(text), IdMode::Auto).unwrap()
    }

    #[test]
    fn intersection_in_phenotype_order() {
        let p = pheno(&["A", "B", "C", "D"]);
        let e = eigen(&["B", "D", "E"]);
        let (ap, ae) = align(&p, &e, &AlignOptions::default()).unwrap();
        assert_eq!(ap.sample_ids().collect::<Vec<&str>>(), vec!["B", "D"]);
        assert_eq!(ae.sample_ids().collect::<Vec<&str>>(), vec!["B", "D"]);
        // per-table field values survive
        assert_eq!(ap.rows[0], vec!["B", "1.5"]);
        assert_eq!(ap.rows[1], vec!["D", "3.5"]);
        assert_eq!(ae.rows[0], vec!["B", "0.1", "0.2"]);
        assert_eq!(ae.rows[1], vec!["D", "1.1", "1.2"]);
    }

    #[test]
    fn disjoint_tables_fail() {
        let p = pheno(&["A", "B"]);
        let e = eigen(&["C", "D"]);
        assert!(matches!(
            align(&p, &e, &AlignOptions::default()),
            Err(Error::Alignment(_))
        ));
    }

    #[test]
    fn composite_ids_match_either_part() {
        let p = pheno(&["X/B", "C/Y"]);
        let e = eigen(&["B", "C"]);
        let (ap, ae) = align(&p, &e, &AlignOptions::default()).unwrap();
        assert_eq!(ap.sample_ids().collect::<Vec<&str>>(), vec!["B", "C"]);
        assert_eq!(ae.sample_ids().collect::<Vec<&str>>(), vec!["B", "C"]);
    }

    #[test]
    fn duplicate_phenotype_rows_keep_first() {
        let mut p = pheno(&["A", "A", "B"]);
        p.rows[1][1] = "9.9".to_string();
        let e = eigen(&["A", "B"]);
        let (ap, _) = align(&p, &e, &AlignOptions::default()).unwrap();
        assert_eq!(ap.num_samples(), 2);
        assert_eq!(ap.rows[0], vec!["A", "0.5"]);
    }

    #[test]
    fn fid_and_iid_are_rewritten_to_aligned_id() {
        let p = pheno(&["X/s1"]);
        let e = EigenvecTable::from_reader(Cursor::new("f1 s1 0.1 0.2\n"), IdMode::Auto).unwrap();
        let (_, ae) = align(&p, &e, &AlignOptions::default()).unwrap();
        assert_eq!(ae.rows[0], vec!["s1", "s1", "0.1", "0.2"]);
    }

    #[test]
    fn non_finite_samples_can_be_dropped() {
        let mut p = pheno(&["A", "B"]);
        p.rows[0][1] = "NaN".to_string();
        let e = eigen(&["A", "B"]);
        let opts = AlignOptions {
            drop_non_finite: true,
            ..AlignOptions::default()
        };
        let (ap, ae) = align(&p, &e, &opts).unwrap();
        assert_eq!(ap.sample_ids().collect::<Vec<&str>>(), vec!["B"]);
        assert_eq!(ae.num_samples(), 1);
    }

    #[test]
    fn aligned_outputs_always_agree() {
        let p = pheno(&["D", "A", "C"]);
        let e = eigen(&["A", "B", "C", "D"]);
        let (ap, ae) = align(&p, &e, &AlignOptions::default()).unwrap();
        assert_eq!(ap.num_samples(), ae.num_samples());
        assert!(ap.sample_ids().eq(ae.sample_ids()));
        // phenotype order, not eigenvec order
        assert_eq!(ap.sample_ids().collect::<Vec<&str>>(), vec!["D", "A", "C"]);
    }
}
