use clap::Args;
use miette::{miette, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use walkdir::WalkDir;

use super::unpack::{default_destination, unpack_one};

#[derive(Args)]
pub struct BatchArgs {
    /// A directory to search for RSB files
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,
}

impl BatchArgs {
    pub fn handle(&self) -> Result<()> {
        let sources = find_bundles(&self.directory);
        info!("found {} bundles in {}", sources.len(), self.directory.display());

        let mut failed = 0;
        for source in &sources {
            if let Err(report) = unpack_one(source, &default_destination(source)) {
                error!("{report:?}");
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(miette!(
                "{failed} of {} bundles failed to unpack",
                sources.len()
            ));
        }
        Ok(())
    }
}

/// Files below `directory` with an `rsb` or `obb` extension, in path order
pub fn find_bundles(directory: &Path) -> Vec<PathBuf> {
    let mut sources: Vec<_> = WalkDir::new(directory)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| is_bundle(path))
        .collect();
    sources.sort();
    sources
}

fn is_bundle(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ext.eq_ignore_ascii_case("rsb") || ext.eq_ignore_ascii_case("obb")
        })
}
