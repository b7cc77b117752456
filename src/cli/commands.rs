use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `skillproof` - verify that a repository backs up a claimed skill.
#[derive(Parser, Debug)]
#[command(name = "skillproof")]
#[command(version)]
#[command(
    about = "Score a public GitHub repository against a claimed programming skill.",
    long_about = None
)]
pub struct Cli {
    /// Config file (default: ~/.skillproof/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify a repository and print the result as JSON
    Verify {
        /// Repository URL (https://github.com/owner/repo or owner/repo)
        url: String,

        /// Skill the repository should demonstrate
        #[arg(short, long, default_value = "General")]
        skill: String,

        /// Recipient identity bound into the attestation (e.g. a wallet address)
        #[arg(short, long)]
        recipient: Option<String>,

        /// Sign the result when a certificate is recommended
        #[arg(long)]
        attest: bool,
    },

    /// Check an attestation signature against the configured key
    CheckAttestation {
        /// Canonical payload string exactly as signed
        #[arg(long)]
        payload: String,

        /// Hex HMAC-SHA256 signature
        #[arg(long)]
        signature: String,
    },
}
