use clap::{Args, Parser, Subcommand};
use dnngp_prep::io::eigenvec::IdMode;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
pub(crate) struct Cli {
    #[clap(subcommand)]
    pub(crate) cmd: SubCmd,
}

#[derive(Subcommand)]
pub(crate) enum SubCmd {
    /// Convert a HapMap genotype table to VCFv4.2
    HapmapToVcf(HapmapToVcfArgs),
    /// Convert a delimited phenotype file to TSV
    CsvToTsv(CsvToTsvArgs),
    /// Align phenotype and eigenvec tables to a shared sample order
    Align(AlignArgs),
    /// Package aligned tables into the binary model input artifact
    Pack(PackArgs),
    /// Print a runnable plink2 PCA command
    PcaCmd(PcaCmdArgs),
}

#[derive(Args, Debug)]
pub(crate) struct HapmapToVcfArgs {
    /// path to HapMap input (.hmp.txt, optionally gzipped)
    pub input: PathBuf,

    /// path to VCF output
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct CsvToTsvArgs {
    /// path to delimited phenotype input
    pub input: PathBuf,

    /// path to TSV output
    pub output: PathBuf,

    /// input field delimiter
    #[clap(short, long, default_value = ",")]
    pub delimiter: char,
}

#[derive(Args, Debug)]
pub(crate) struct AlignArgs {
    /// phenotype TSV (row per sample, header of trait names)
    #[clap(long)]
    pub pheno: PathBuf,

    /// plink2 .eigenvec file
    #[clap(long)]
    pub eigenvec: PathBuf,

    /// aligned phenotype TSV output
    #[clap(long)]
    pub out_pheno: PathBuf,

    /// aligned eigenvec output
    #[clap(long)]
    pub out_eigenvec: PathBuf,

    /// sample id column of the phenotype table (0-based)
    #[clap(long, default_value_t = 0)]
    pub id_col: usize,

    /// split char for composite phenotype ids like A/B
    #[clap(long, default_value = "/")]
    pub split_char: char,

    /// id column layout of the eigenvec file
    #[clap(long, value_enum, default_value_t = IdMode::Auto)]
    pub eigenvec_id: IdMode,

    /// drop samples with NaN/Inf values on either side
    #[clap(long)]
    pub drop_non_finite: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PackArgs {
    /// aligned .eigenvec file
    #[clap(long)]
    pub eigenvec: PathBuf,

    /// aligned phenotype TSV
    #[clap(long)]
    pub pheno: PathBuf,

    /// binary artifact output
    #[clap(long)]
    pub output: PathBuf,

    /// also write a json dump next to the artifact
    #[clap(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct PcaCmdArgs {
    /// plink2 executable path
    #[clap(long, default_value = "./plink2")]
    pub plink2: String,

    /// thread count passed to plink2
    #[clap(long, default_value_t = 30)]
    pub threads: usize,

    /// VCF file or glob pattern
    #[clap(long, default_value = "*.vcf")]
    pub vcf: String,

    /// number of principal components
    #[clap(long, default_value_t = 10)]
    pub pca: usize,

    /// output prefix
    #[clap(long, default_value = "pca10")]
    pub out: String,

    /// output directory joined with the prefix
    #[clap(long)]
    pub out_dir: Option<String>,
}
