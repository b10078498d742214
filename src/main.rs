//! formtree CLI
//!
//! Entry point for the `formtree` command-line tool. Documents are element
//! trees stored as JSON files; data flows in and out as JSON. An optional
//! TOML options file supplies per-operation overrides.

use clap::{Parser, Subcommand};
use formtree::path::render;
use formtree::{compile_name, Element, OptionsOverlay};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "formtree")]
#[command(about = "Declarative serialization between element trees and nested data", version)]
struct Cli {
    /// Path to a TOML options file applied to the operation
    #[arg(long, short = 'c', global = true)]
    options: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a data tree from a document's fields
    Extract {
        /// Path to the document (JSON element tree)
        document: PathBuf,

        /// Compact output instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Insert a data tree's values into a document's fields
    Insert {
        /// Path to the document (JSON element tree)
        document: PathBuf,

        /// Path to the data (JSON)
        data: PathBuf,

        /// Where to write the updated document (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Rewrite the document file in place
        #[arg(long, conflicts_with = "output")]
        in_place: bool,
    },

    /// Explain how a name or a document's fields map into the data tree
    Explain {
        /// A single name string to compile
        #[arg(long, conflicts_with = "document")]
        name: Option<String>,

        /// Path to a document whose field plan should be reported
        document: Option<PathBuf>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },
}

fn main() {
    // Keep stdout clean for data; diagnostics go to stderr.
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let overrides = cli.options.as_deref().map(load_overrides);

    match cli.command {
        Commands::Extract { document, compact } => {
            run_extract(&document, overrides.as_ref(), compact);
        }
        Commands::Insert {
            document,
            data,
            output,
            in_place,
        } => {
            run_insert(&document, &data, output, in_place, overrides.as_ref());
        }
        Commands::Explain {
            name,
            document,
            human,
        } => {
            run_explain(name, document, human, overrides.as_ref());
        }
    }
}

fn load_overrides(path: &Path) -> OptionsOverlay {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Error reading options file {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    match toml::from_str(&contents) {
        Ok(overlay) => overlay,
        Err(e) => {
            eprintln!("Error parsing options file {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn load_document(path: &Path) -> Element {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Error reading document {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    match serde_json::from_str(&contents) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error parsing document {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn load_data(path: &Path) -> serde_json::Value {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("Error reading data {}: {}", path.display(), e);
            process::exit(1);
        }
    };
    match serde_json::from_str(&contents) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Error parsing data {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

fn run_extract(document: &Path, overrides: Option<&OptionsOverlay>, compact: bool) {
    let root = load_document(document);

    let data = match formtree::extract(&root, overrides) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            process::exit(1);
        }
    };

    let rendered = if compact {
        serde_json::to_string(&data)
    } else {
        serde_json::to_string_pretty(&data)
    };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_insert(
    document: &Path,
    data: &Path,
    output: Option<PathBuf>,
    in_place: bool,
    overrides: Option<&OptionsOverlay>,
) {
    let mut root = load_document(document);
    let data = load_data(data);

    if let Err(e) = formtree::insert(&mut root, &data, overrides) {
        eprintln!("Insertion failed: {}", e);
        process::exit(1);
    }

    let rendered = match serde_json::to_string_pretty(&root) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Error serializing document: {}", e);
            process::exit(1);
        }
    };

    let target = if in_place {
        Some(document.to_path_buf())
    } else {
        output
    };
    match target {
        Some(path) => {
            if let Err(e) = fs::write(&path, rendered + "\n") {
                eprintln!("Error writing {}: {}", path.display(), e);
                process::exit(1);
            }
        }
        None => println!("{}", rendered),
    }
}

fn run_explain(
    name: Option<String>,
    document: Option<PathBuf>,
    human: bool,
    overrides: Option<&OptionsOverlay>,
) {
    if let Some(name) = name {
        let template = match compile_name(&name) {
            Ok(template) => template,
            Err(e) => {
                eprintln!("Error compiling name: {}", e);
                process::exit(1);
            }
        };
        if human {
            match template {
                Some(template) => println!("{} -> {}", name, template),
                None => println!("{} -> (no contribution)", name),
            }
        } else {
            let report = serde_json::json!({
                "name": name,
                "template": template.map(|t| t.to_string()),
            });
            println!("{}", report);
        }
        return;
    }

    let Some(document) = document else {
        eprintln!("Explain requires either --name or a document path");
        process::exit(2);
    };
    let root = load_document(&document);

    let plans = match formtree::plan(&root, overrides) {
        Ok(plans) => plans,
        Err(e) => {
            eprintln!("Explain failed: {}", e);
            process::exit(1);
        }
    };

    if human {
        for plan in &plans {
            let path = match &plan.path {
                Some(path) => render(path),
                None => "(unresolved)".to_string(),
            };
            println!("{}: {} -> {}", plan.element, plan.template, path);
        }
    } else {
        match serde_json::to_string_pretty(&plans) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }
}
