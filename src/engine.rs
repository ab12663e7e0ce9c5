use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::EbdError;

pub const ENGINE_BINARY: &str = "ExpressBetaDiversity";
pub const TABLE_FILENAME: &str = "otu_table.tsv";
pub const TREE_FILENAME: &str = "tree.newick";
pub const OUTPUT_FILENAME: &str = "output.diss";

// Intentionally surjective: several public metric names are synonyms at the
// engine level (jaccard, soergel, ruzicka and unweighted_unifrac all select
// the engine's Soergel code).
const ENGINE_CODES: &[(&str, &str)] = &[
    ("braycurtis", "Bray-Curtis"),
    ("sorensen", "Bray-Curtis"),
    ("canberra", "Canberra"),
    ("chi_squared", "Chi-squared"),
    ("coeff_similarity", "CS"),
    ("complete_tree", "CT"),
    ("euclidean", "Euclidean"),
    ("f_st", "Fst"),
    ("p_st", "Fst"),
    ("gower", "Gower"),
    ("hellinger", "Hellinger"),
    ("kulczynski", "Kulczynski"),
    ("lennon", "Lennon"),
    ("manhattan", "Manhattan"),
    ("weighted_unifrac", "Manhattan"),
    ("mnnd", "MNND"),
    ("mpd", "MPD"),
    ("morisita_horn", "Morisita-Horn"),
    ("normalized_weighted_unifrac", "NWU"),
    ("pearson", "Pearson"),
    ("raohp", "RaoHp"),
    ("soergel", "Soergel"),
    ("jaccard", "Soergel"),
    ("unweighted_unifrac", "Soergel"),
    ("ruzicka", "Soergel"),
    ("tamas_coeff", "TC"),
    ("weighted_corr", "WC"),
    ("whittaker", "Whittaker"),
    ("yue_clayton", "Yue-Clayton"),
];

pub fn engine_code(metric: &str) -> Option<&'static str> {
    ENGINE_CODES
        .iter()
        .find(|(name, _)| *name == metric)
        .map(|(_, code)| *code)
}

pub fn engine_args(code: &str, weighted: bool, phylogenetic: bool) -> Vec<String> {
    let mut args = Vec::new();
    if phylogenetic {
        args.push("-t".to_string());
        args.push(TREE_FILENAME.to_string());
    }
    args.push("-s".to_string());
    args.push(TABLE_FILENAME.to_string());
    if weighted {
        args.push("-w".to_string());
    }
    args.push("-c".to_string());
    args.push(code.to_string());
    args
}

pub trait EngineRunner: Send + Sync {
    fn run(&self, workdir: &Path, args: &[String]) -> Result<(), EbdError>;
}

#[derive(Debug, Clone)]
pub struct SystemEngine {
    binary: PathBuf,
}

impl SystemEngine {
    pub fn new() -> Result<Self, EbdError> {
        let binary = find_in_path(ENGINE_BINARY)
            .ok_or_else(|| EbdError::MissingTool(ENGINE_BINARY.to_string()))?;
        Ok(Self { binary })
    }

    pub fn with_binary(binary: PathBuf) -> Self {
        Self { binary }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl EngineRunner for SystemEngine {
    fn run(&self, workdir: &Path, args: &[String]) -> Result<(), EbdError> {
        tracing::info!(
            command = %format!("{} {}", self.binary.display(), args.join(" ")),
            workdir = %workdir.display(),
            "running external distance engine"
        );
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(workdir)
            .output()
            .map_err(|err| EbdError::Filesystem(format!("spawn {ENGINE_BINARY}: {err}")))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(EbdError::ExternalTool {
            tool: ENGINE_BINARY.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr,
        })
    }
}

fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    for path in std::env::split_paths(&path_var) {
        let exe = path.join(format!("{name}.exe"));
        if exe.exists() {
            return Some(exe);
        }
        let plain = path.join(name);
        if plain.exists() {
            return Some(plain);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{NON_PHYLOGENETIC_METRICS, PHYLOGENETIC_METRICS};

    #[test]
    fn every_vocabulary_member_has_an_engine_code() {
        for metric in PHYLOGENETIC_METRICS.iter().chain(NON_PHYLOGENETIC_METRICS) {
            assert!(engine_code(metric).is_some(), "no engine code for {metric}");
        }
    }

    #[test]
    fn synonym_groups_map_to_shared_codes() {
        for metric in ["jaccard", "soergel", "ruzicka", "unweighted_unifrac"] {
            assert_eq!(engine_code(metric), Some("Soergel"));
        }
        assert_eq!(engine_code("braycurtis"), Some("Bray-Curtis"));
        assert_eq!(engine_code("sorensen"), Some("Bray-Curtis"));
        assert_eq!(engine_code("f_st"), Some("Fst"));
        assert_eq!(engine_code("p_st"), Some("Fst"));
        assert_eq!(engine_code("weighted_unifrac"), Some("Manhattan"));
        assert_eq!(engine_code("normalized_weighted_unifrac"), Some("NWU"));
        assert_eq!(engine_code("nearest_neighbour"), None);
    }

    #[test]
    fn args_for_plain_metric() {
        let args = engine_args("Bray-Curtis", false, false);
        assert_eq!(args, ["-s", TABLE_FILENAME, "-c", "Bray-Curtis"]);
    }

    #[test]
    fn args_for_weighted_phylogenetic_metric() {
        let args = engine_args("Soergel", true, true);
        assert_eq!(
            args,
            ["-t", TREE_FILENAME, "-s", TABLE_FILENAME, "-w", "-c", "Soergel"]
        );
    }
}
