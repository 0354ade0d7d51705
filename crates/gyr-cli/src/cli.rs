use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "gyr",
    about = "Pin scheme-prefixed references in YAML documents to immutable identifiers",
    version,
)]
pub struct Cli {
    /// Input files; `-` reads stdin. With no files, stdin is read.
    pub files: Vec<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// One input stream to decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Cli {
    /// The inputs to read, in argument order. `-` maps to stdin, and an
    /// empty file list means stdin alone.
    pub fn inputs(&self) -> Vec<Input> {
        if self.files.is_empty() {
            return vec![Input::Stdin];
        }
        self.files
            .iter()
            .map(|path| {
                if path.as_os_str() == "-" {
                    Input::Stdin
                } else {
                    Input::File(path.clone())
                }
            })
            .collect()
    }
}
