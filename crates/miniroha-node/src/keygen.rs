//! Standalone key generation utility: prints a fresh Ed25519 keypair, or
//! writes the seed to a file for `miniroha-node --keyfile` to load later.

use std::path::PathBuf;

use clap::Parser;
use miniroha_crypto::KeyPair;

#[derive(Parser, Debug)]
#[command(name = "keygen", about = "Generate an Ed25519 keypair for a Miniroha validator")]
struct Args {
    /// Write the base58 seed to this file instead of printing it.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let kp = KeyPair::generate();
    println!("public_key: {}", kp.public_key_b58());
    match args.out {
        Some(path) => {
            std::fs::write(&path, kp.seed_b58())?;
            println!("seed written to {}", path.display());
        }
        None => println!("seed: {}", kp.seed_b58()),
    }
    Ok(())
}
