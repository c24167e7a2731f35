use crate::error::Error;
use crate::io::hapmap::{HapmapMarker, HapmapMatrix};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// REF, ALT and per-sample GT strings for one marker.
#[derive(Debug, PartialEq)]
pub struct VcfSite {
    pub reference: u8,
    pub alternates: Vec<u8>,
    pub genotypes: Vec<String>,
}

impl VcfSite {
    /// Derives the site representation of a marker.
    ///
    /// REF is the first base of the alleles column; without one it is the
    /// first base seen in a non-missing call, falling back to `N`. ALT keeps
    /// the alleles-column order first, then any further observed bases in
    /// sorted order. Calls with bases outside the REF/ALT set are missing.
    pub fn from_marker(marker: &HapmapMarker) -> Self {
        let mut reference = marker.alleles.first().copied();
        let mut observed: Vec<u8> = Vec::new();
        for gt in marker.genotypes.iter().flatten() {
            for base in [gt.0, gt.1] {
                if reference.is_none() {
                    reference = Some(base);
                }
                if Some(base) != reference && !observed.contains(&base) {
                    observed.push(base);
                }
            }
        }
        let reference = reference.unwrap_or(b'N');

        // Alleles-column ALTs come first, extra observed bases sorted after.
        let mut alternates: Vec<u8> = Vec::new();
        if marker.alleles.len() > 1 {
            alternates.extend(marker.alleles[1..].iter().filter(|b| **b != reference));
        }
        let mut extra: Vec<u8> = observed
            .iter()
            .copied()
            .filter(|b| *b != reference && !alternates.contains(b))
            .collect();
        extra.sort_unstable();
        alternates.extend(extra);

        let index_of = |base: u8| -> Option<usize> {
            if base == reference {
                Some(0)
            } else {
                alternates.iter().position(|b| *b == base).map(|i| i + 1)
            }
        };
        let genotypes = marker
            .genotypes
            .iter()
            .map(|gt| match gt {
                Some((a1, a2)) => match (index_of(*a1), index_of(*a2)) {
                    (Some(i), Some(j)) => format!("{}/{}", i, j),
                    _ => "./.".to_string(),
                },
                None => "./.".to_string(),
            })
            .collect();

        Self {
            reference,
            alternates,
            genotypes,
        }
    }

    pub fn alt_field(&self) -> String {
        if self.alternates.is_empty() {
            ".".to_string()
        } else {
            self.alternates
                .iter()
                .map(|b| (*b as char).to_string())
                .collect::<Vec<String>>()
                .join(",")
        }
    }
}

pub fn write_vcf(path: &Path, matrix: &HapmapMatrix) -> Result<(), Error> {
    let mut w = BufWriter::new(File::create(path)?);
    write_header(&mut w, &matrix.sample_ids)?;
    for marker in &matrix.markers {
        let site = VcfSite::from_marker(marker);
        write!(
            w,
            "{}\t{}\t{}\t{}\t{}\t.\tPASS\t.\tGT",
            marker.chromosome,
            marker.position,
            if marker.id.is_empty() { "." } else { &marker.id },
            site.reference as char,
            site.alt_field(),
        )?;
        for gt in &site.genotypes {
            write!(w, "\t{}", gt)?;
        }
        writeln!(w)?;
    }
    w.flush()?;
    info!(
        "wrote {} markers x {} samples to vcf",
        matrix.num_markers(),
        matrix.num_samples()
    );
    Ok(())
}

fn write_header(w: &mut impl Write, sample_ids: &[String]) -> Result<(), Error> {
    writeln!(w, "##fileformat=VCFv4.2")?;
    writeln!(w, "##source=dnngp-prep hapmap-to-vcf")?;
    writeln!(
        w,
        "##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">"
    )?;
    write!(w, "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT")?;
    for id in sample_ids {
        write!(w, "\t{}", id)?;
    }
    writeln!(w)?;
    Ok(())
}

/// One-shot HapMap to VCF conversion.
pub fn convert_hapmap_to_vcf(input: &Path, output: &Path) -> Result<(), Error> {
    let matrix = HapmapMatrix::from_path(input)?;
    write_vcf(output, &matrix)
}
