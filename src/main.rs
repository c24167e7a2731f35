mod cli;

use clap::Parser;
use cli::{AlignArgs, Cli, CsvToTsvArgs, HapmapToVcfArgs, PackArgs, PcaCmdArgs, SubCmd};
use dnngp_prep::align::{align, AlignOptions};
use dnngp_prep::data::PackedDataset;
use dnngp_prep::error::Error;
use dnngp_prep::io::eigenvec::{EigenvecTable, IdMode};
use dnngp_prep::io::pheno::{convert_to_tsv, PhenoTable};
use dnngp_prep::io::vcf::convert_hapmap_to_vcf;
use dnngp_prep::plink::PcaCommand;
use log::{error, info};

fn main() {
    simple_logger::init_with_level(log::Level::Info).unwrap();
    let cli = Cli::parse();
    let res = match cli.cmd {
        SubCmd::HapmapToVcf(args) => hapmap_to_vcf(args),
        SubCmd::CsvToTsv(args) => csv_to_tsv(args),
        SubCmd::Align(args) => align_tables(args),
        SubCmd::Pack(args) => pack(args),
        SubCmd::PcaCmd(args) => pca_cmd(args),
    };
    if let Err(e) = res {
        error!("{}", e);
        match e {
            Error::FileOpeningError(_) => std::process::exit(exitcode::IOERR),
            _ => std::process::exit(exitcode::DATAERR),
        }
    }
}

fn hapmap_to_vcf(args: HapmapToVcfArgs) -> Result<(), Error> {
    info!("converting {:?} to {:?}", args.input, args.output);
    convert_hapmap_to_vcf(&args.input, &args.output)
}

fn csv_to_tsv(args: CsvToTsvArgs) -> Result<(), Error> {
    info!("converting {:?} to {:?}", args.input, args.output);
    convert_to_tsv(&args.input, &args.output, args.delimiter as u8)
}

fn align_tables(args: AlignArgs) -> Result<(), Error> {
    let pheno = PhenoTable::from_path(&args.pheno, b'\t', args.id_col)?;
    let eigen = EigenvecTable::from_path(&args.eigenvec, args.eigenvec_id)?;
    let options = AlignOptions {
        split_char: Some(args.split_char),
        drop_non_finite: args.drop_non_finite,
    };
    let (aligned_pheno, aligned_eigen) = align(&pheno, &eigen, &options)?;
    aligned_pheno.write_tsv(&args.out_pheno)?;
    aligned_eigen.write(&args.out_eigenvec)?;
    info!(
        "wrote aligned tables to {:?} and {:?}",
        args.out_pheno, args.out_eigenvec
    );
    Ok(())
}

fn pack(args: PackArgs) -> Result<(), Error> {
    let eigen = EigenvecTable::from_path(&args.eigenvec, IdMode::Auto)?;
    let pheno = PhenoTable::from_path(&args.pheno, b'\t', 0)?;
    let dataset = PackedDataset::from_tables(&eigen, &pheno)?;
    dataset.to_file(&args.output)?;
    info!(
        "packed {} samples x {} components into {:?}",
        dataset.num_samples(),
        dataset.component_names().len(),
        args.output
    );
    if args.json {
        let json_path = args.output.with_extension("json");
        dataset.to_json(&json_path)?;
        info!("wrote json dump to {:?}", json_path);
    }
    Ok(())
}

fn pca_cmd(args: PcaCmdArgs) -> Result<(), Error> {
    let cmd = PcaCommand {
        plink2_path: args.plink2,
        threads: args.threads,
        vcf: args.vcf,
        components: args.pca,
        out_prefix: args.out,
        out_dir: args.out_dir,
    };
    println!("{}", cmd.render());
    Ok(())
}
