use clap::{Parser, Subcommand};
use sortbox::constants::{DEFAULT_SPLIT_SEED, DEFAULT_TRAIN_RATIO};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sortbox")]
#[command(about = "Sort images into OK/NG buckets and curate their bounding boxes", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive sorting session on a folder
    Sort {
        /// Folder holding the images
        folder: PathBuf,
    },

    /// Print the box count per label of a sidecar folder
    Stats {
        /// Folder holding the sidecar files
        dir: PathBuf,
    },

    /// Find the least frequent label and the files that use it
    Minority {
        /// Folder holding the sidecar files
        dir: PathBuf,
    },

    /// Rename a label in every sidecar of a folder
    Relabel {
        /// Folder holding the sidecar files
        dir: PathBuf,

        /// Label to replace
        #[arg(long)]
        from: String,

        /// New label
        #[arg(long)]
        to: String,
    },

    /// Convert labelme JSON files into sidecars
    ImportLabelme {
        /// Folder holding the labelme JSON files
        json_dir: PathBuf,

        /// Where sidecars are written (default: the JSON folder)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Class names in id order, comma separated
        #[arg(long, value_delimiter = ',', required = true)]
        classes: Vec<String>,
    },

    /// Write Train.txt and Valid.txt image lists for a sorted folder
    Split {
        /// Folder holding the labeled images
        dir: PathBuf,

        /// Where the lists are written
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Share of images in the training list
        #[arg(long, default_value_t = DEFAULT_TRAIN_RATIO)]
        train_ratio: f32,

        /// Shuffle seed
        #[arg(long, default_value_t = DEFAULT_SPLIT_SEED)]
        seed: u64,
    },

    /// Show or write the configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        write_default: bool,
    },
}
