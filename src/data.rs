use crate::error::Error;
use crate::io::eigenvec::EigenvecTable;
use crate::io::pheno::PhenoTable;
use bincode::{deserialize_from, serialize_into};
use serde::{Deserialize, Serialize};
use serde_json::to_writer;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Aligned model input: eigenvector features and phenotype traits keyed by
/// one shared sample order.
///
/// The bincode encoding of this struct is the artifact the downstream model
/// loader reads; field order is part of that contract.
#[derive(Serialize, Deserialize, PartialEq, Debug)]
pub struct PackedDataset {
    sample_ids: Vec<String>,
    component_names: Vec<String>,
    /// One row of component values per sample.
    components: Vec<Vec<f32>>,
    trait_names: Vec<String>,
    /// One row per sample; traits may be categorical, so values stay as
    /// written.
    traits: Vec<Vec<String>>,
}

impl PackedDataset {
    /// Packages two aligned tables.
    ///
    /// Only lengths and the id sequence are checked here; producing aligned
    /// inputs is the caller's contract (see [`crate::align::align`]).
    pub fn from_tables(eigen: &EigenvecTable, pheno: &PhenoTable) -> Result<Self, Error> {
        if eigen.num_samples() != pheno.num_samples() {
            return Err(Error::Serialization(format!(
                "eigenvec has {} samples, phenotype table has {}",
                eigen.num_samples(),
                pheno.num_samples()
            )));
        }
        for (ix, (eid, pid)) in eigen.sample_ids().zip(pheno.sample_ids()).enumerate() {
            if eid != pid {
                return Err(Error::Serialization(format!(
                    "sample order mismatch at row {}: {:?} vs {:?}",
                    ix, eid, pid
                )));
            }
        }

        let sample_ids: Vec<String> = pheno.sample_ids().map(|s| s.to_string()).collect();
        let components = (0..eigen.num_samples())
            .map(|ix| eigen.components(ix))
            .collect::<Result<Vec<Vec<f32>>, Error>>()?;
        let id_col = pheno.id_col();
        let trait_names: Vec<String> = pheno
            .header
            .iter()
            .enumerate()
            .filter(|(ix, _)| *ix != id_col)
            .map(|(_, name)| name.clone())
            .collect();
        let traits: Vec<Vec<String>> = pheno
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(ix, _)| *ix != id_col)
                    .map(|(_, v)| v.clone())
                    .collect()
            })
            .collect();

        Ok(Self {
            sample_ids,
            component_names: eigen.component_names(),
            components,
            trait_names,
            traits,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let mut r = BufReader::new(File::open(path)?);
        Ok(deserialize_from(&mut r)?)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), Error> {
        let mut w = BufWriter::new(File::create(path)?);
        Ok(serialize_into(&mut w, self)?)
    }

    pub fn to_json(&self, path: &Path) -> Result<(), Error> {
        Ok(to_writer(File::create(path)?, self)?)
    }

    pub fn num_samples(&self) -> usize {
        self.sample_ids.len()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn component_names(&self) -> &[String] {
        &self.component_names
    }

    pub fn components(&self, sample_ix: usize) -> &[f32] {
        &self.components[sample_ix]
    }

    pub fn trait_names(&self) -> &[String] {
        &self.trait_names
    }

    pub fn traits(&self, sample_ix: usize) -> &[String] {
        &self.traits[sample_ix]
    }
}
