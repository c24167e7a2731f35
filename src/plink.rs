//! Builds a runnable plink2 PCA command line.
//!
//! plink2 itself is not reimplemented; it turns the VCF written by
//! [`crate::io::vcf`] into the `.eigenvec`/`.eigenval` pair consumed by the
//! alignment step.

#[derive(Debug, Clone)]
pub struct PcaCommand {
    pub plink2_path: String,
    pub threads: usize,
    pub vcf: String,
    pub components: usize,
    pub out_prefix: String,
    pub out_dir: Option<String>,
}

fn needs_quotes(value: &str) -> bool {
    value.chars().any(|c| c.is_whitespace() || "<>|&()".contains(c))
}

fn quote(value: &str) -> String {
    if needs_quotes(value) {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}

impl PcaCommand {
    pub fn render(&self) -> String {
        // glob patterns stay unquoted so the shell can expand them
        let vcf_token = if self.vcf.contains('*') || self.vcf.contains('?') {
            self.vcf.clone()
        } else {
            quote(&self.vcf)
        };
        let out = match &self.out_dir {
            Some(dir) => quote(&format!(
                "{}/{}",
                dir.trim_end_matches(['/', '\\']),
                self.out_prefix
            )),
            None => quote(&self.out_prefix),
        };
        format!(
            "{} --threads {} --vcf {} --pca {} --out {}",
            quote(&self.plink2_path),
            self.threads,
            vcf_token,
            self.components,
            out
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd() -> PcaCommand {
        PcaCommand {
            plink2_path: "./plink2".to_string(),
            threads: 30,
            vcf: "maize.vcf".to_string(),
            components: 10,
            out_prefix: "pca10".to_string(),
            out_dir: None,
        }
    }

    #[test]
    fn renders_basic_command() {
        assert_eq!(
            cmd().render(),
            "./plink2 --threads 30 --vcf maize.vcf --pca 10 --out pca10"
        );
    }

    #[test]
    fn quotes_paths_with_spaces() {
        let mut c = cmd();
        c.plink2_path = "C:/my tools/plink2.exe".to_string();
        c.vcf = "geno (selected).vcf".to_string();
        assert_eq!(
            c.render(),
            "\"C:/my tools/plink2.exe\" --threads 30 --vcf \"geno (selected).vcf\" --pca 10 --out pca10"
        );
    }

    #[test]
    fn glob_patterns_stay_unquoted() {
        let mut c = cmd();
        c.vcf = "*.vcf".to_string();
        assert!(c.render().contains("--vcf *.vcf"));
    }

    #[test]
    fn out_dir_is_joined_with_prefix() {
        let mut c = cmd();
        c.out_dir = Some("results/".to_string());
        assert!(c.render().ends_with("--out results/pca10"));
    }
}
