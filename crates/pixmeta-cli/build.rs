use clap::CommandFactory;
use clap_complete::{generate_to, Shell};
use std::env;
use std::io::Error;
use std::path::PathBuf;

// Same argument definitions as the binary
include!("src/cli.rs");

const SHELLS: [Shell; 5] = [
    Shell::Bash,
    Shell::Elvish,
    Shell::Fish,
    Shell::PowerShell,
    Shell::Zsh,
];

fn main() -> Result<(), Error> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let Some(outdir) = env::var_os("OUT_DIR") else {
        return Ok(());
    };
    let completions = PathBuf::from(outdir).join("completions");
    std::fs::create_dir_all(&completions)?;

    let mut cmd = Cli::command();
    for shell in SHELLS {
        generate_to(shell, &mut cmd, "pixmeta", &completions)?;
    }

    Ok(())
}
