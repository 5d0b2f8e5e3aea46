//! OpenAPI model CLI
//!
//! Command-line interface for rendering documentation, example payloads,
//! and stable operation codes from an OpenAPI document.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use oas_model::{load_document_auto, operation_codes, render_markdown, schema_example, Document};

#[derive(Parser)]
#[command(name = "oas-model")]
#[command(about = "Compile OpenAPI documents into docs, examples, and stable operation codes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render markdown documentation for every tag and operation
    Markdown {
        /// Document source: file path or URL (http:// or https://)
        source: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the stable operation code table, grouped by tag
    Codes {
        /// Document source: file path or URL
        source: String,

        /// Output as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Print an example payload for a named schema
    Example {
        /// Document source: file path or URL
        source: String,

        /// Schema name to generate an example for
        #[arg(long, short)]
        schema: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Verify that every reference resolves to a schema
    Check {
        /// Document source: file path or URL
        source: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Markdown { source, output } => run_markdown(&source, output),
        Commands::Codes { source, json } => run_codes(&source, json),
        Commands::Example {
            source,
            schema,
            pretty,
        } => run_example(&source, &schema, pretty),
        Commands::Check { source } => run_check(&source),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn load(source: &str) -> Result<Document, u8> {
    let value = load_document_auto(source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    Document::from_value(value).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn run_markdown(source: &str, output: Option<PathBuf>) -> Result<(), u8> {
    let doc = load(source)?;
    let markdown = render_markdown(&doc).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &markdown).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", markdown);
        }
    }

    Ok(())
}

fn run_codes(source: &str, json: bool) -> Result<(), u8> {
    let doc = load(source)?;
    let codes = operation_codes(&doc).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if json {
        let mut grouped = serde_json::Map::new();
        for tag in &doc.tags {
            let mut entries = serde_json::Map::new();
            for op in doc.tag_operations(tag) {
                entries.insert(op.id.clone(), codes[&op.id].clone().into());
            }
            grouped.insert(tag.name.clone(), entries.into());
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::Value::Object(grouped)).unwrap()
        );
    } else {
        for tag in &doc.tags {
            println!("## {} {}", tag.name, tag.description);
            for op in doc.tag_operations(tag) {
                println!("  {} = {}", op.id, codes[&op.id]);
            }
        }
    }

    Ok(())
}

fn run_example(source: &str, schema: &str, pretty: bool) -> Result<(), u8> {
    let doc = load(source)?;
    let value = schema_example(&doc, schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    println!("{}", json_output);
    Ok(())
}

fn run_check(source: &str) -> Result<(), u8> {
    let doc = load(source)?;
    match doc.verify() {
        Ok(()) => {
            println!(
                "All references resolved ({} schemas, {} enums, {} operations)",
                doc.schemas.len(),
                doc.enums.len(),
                doc.operations.len()
            );
            Ok(())
        }
        Err(e) => {
            eprintln!("Check failed:");
            for dangling in doc.dangling() {
                eprintln!("  {}", dangling);
            }
            Err(e.exit_code() as u8)
        }
    }
}
