pub mod eigenvec;
pub mod hapmap;
pub mod pheno;
pub mod vcf;
