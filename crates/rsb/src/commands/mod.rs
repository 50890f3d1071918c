pub mod batch;
pub mod unpack;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Unpack an RSB file into a directory, skipping packets that cannot be read
    Unpack(unpack::UnpackArgs),
    /// Unpack every RSB or OBB file found below a directory
    Batch(batch::BatchArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Unpack(unpack) => unpack.handle(),
            Commands::Batch(batch) => batch.handle(),
        }
    }
}
