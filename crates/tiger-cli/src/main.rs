use clap::{Parser, Subcommand};
use std::path::Path;

use tiger_pool::WorkerPool;

#[derive(Parser)]
#[command(name = "tiger")]
#[command(about = "Tiger — constrained markup to static HTML compiler")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile .tiger files to HTML, in parallel
    Build {
        /// Input .tiger files
        paths: Vec<String>,
    },

    /// Check a .tiger file for errors without generating output
    Check {
        /// Input .tiger file
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Build { paths } => cmd_build(&paths),
        Command::Check { path } => cmd_check(&path),
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn output_path(path: &str) -> std::path::PathBuf {
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "out".to_string());
    let dir = Path::new(path).parent().unwrap_or(Path::new("."));
    dir.join(format!("{stem}.html"))
}

fn cmd_build(paths: &[String]) {
    if paths.is_empty() {
        eprintln!("Error: no input files");
        std::process::exit(1);
    }

    let sources: Vec<String> = paths.iter().map(|p| read_source(p)).collect();

    // Chunked submission keeps projects of any size below the pool's
    // queue capacity; one file failing must not abort the rest.
    let pool = WorkerPool::new();
    let results = pool.submit_each(&sources);

    let mut failed = false;
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(html) => {
                let out = output_path(path);
                if let Err(e) = std::fs::write(&out, &html) {
                    eprintln!("Error writing {}: {e}", out.display());
                    failed = true;
                    continue;
                }
                eprintln!("Built: {}", out.display());
            }
            Err(e) => {
                eprintln!("Error compiling {path}: {e}");
                failed = true;
            }
        }
    }

    pool.shutdown();

    if failed {
        std::process::exit(1);
    }
}

fn cmd_check(path: &str) {
    let source = read_source(path);

    if let Err(e) = tiger_codegen::compile(&source) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    eprintln!("OK: {path}");
}
