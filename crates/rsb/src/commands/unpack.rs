use clap::Args;
use miette::{Context, Result};
use std::{
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::info;

#[derive(Args)]
pub struct UnpackArgs {
    /// An input RSB file
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// A target directory [default: <SOURCE>.bundle]
    #[arg(value_name = "DESTINATION")]
    destination: Option<PathBuf>,
}

impl UnpackArgs {
    pub fn handle(&self) -> Result<()> {
        let destination = self
            .destination
            .clone()
            .unwrap_or_else(|| default_destination(&self.source));

        unpack_one(&self.source, &destination)
    }
}

/// `<source>.bundle`, next to the source file
pub fn default_destination(source: &Path) -> PathBuf {
    let mut name = source.as_os_str().to_owned();
    name.push(".bundle");
    PathBuf::from(name)
}

pub fn unpack_one(source: &Path, destination: &Path) -> Result<()> {
    info!("unpacking {}", source.display());
    info!("writing to {}", destination.display());

    let started = Instant::now();
    rsb_bundle::unpack_fs(source, destination)
        .context(format!("path: {}", source.display()))?;

    info!("finished in {:.2?}", started.elapsed());
    Ok(())
}
