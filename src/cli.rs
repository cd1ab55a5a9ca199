use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "dexviewer")]
#[command(about = "Disassemble the DEX sections of an APK and browse its classes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Package opened when no APK is given (falls back to DEXVIEWER_SAMPLE_APK)
    #[arg(long, value_name = "FILE", global = true)]
    pub sample: Option<PathBuf>,

    /// Show every class of the sample instead of only the app's own
    #[arg(long, global = true)]
    pub all_classes: bool,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// List classes, optionally filtered by class or method name
    List {
        apk: Option<PathBuf>,

        #[arg(short, long)]
        query: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Print the disassembly of one class
    Show {
        class_name: String,

        apk: Option<PathBuf>,

        #[arg(long)]
        json: bool,
    },
    /// List the calls a class makes and whether their targets are in the package
    Refs {
        class_name: String,

        apk: Option<PathBuf>,
    },
}
