use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docstruct::{log_filter, ReportEnvelope};
use docstruct_core::{source_for_path, ConsistencyEngine, DocumentProfile, DocumentType, ProfileManager};

#[derive(Parser)]
#[command(name = "docstruct")]
#[command(about = "Structural and terminology consistency checker for regulatory documents")]
struct Args {
    /// Paragraph stream to check (.json records, .xml WordprocessingML body, or plain text)
    #[arg(short, long)]
    input: Option<String>,

    /// Document type, e.g. "Advisory Circular", "order" or "AC"
    #[arg(short = 't', long, default_value = "Other")]
    doc_type: String,

    /// Path to custom profile file (YAML format)
    #[arg(short, long)]
    profile: Option<String>,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<String>,

    /// Show document types and built-in profiles and exit
    #[arg(long)]
    show_profiles: bool,

    /// Exit with status 1 when any Error finding is reported
    #[arg(long)]
    fail_on_error: bool,

    /// Print finding counts per severity
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    eprintln!("🦀 Docstruct Consistency Checker");

    if args.show_profiles {
        show_profiles();
        return Ok(());
    }

    let Some(input) = args.input.as_deref() else {
        eprintln!("⚠️  No input given. Use --input <path> or --show-profiles.");
        std::process::exit(2);
    };

    let input_path = Path::new(input);
    if !input_path.exists() {
        eprintln!("⚠️  Input not found at: {input}");
        eprintln!("   Please check the file path.");
        std::process::exit(2);
    }

    let Some(doc_type) = DocumentType::parse_name(&args.doc_type) else {
        bail!(
            "Unknown document type '{}'. Run with --show-profiles to list them.",
            args.doc_type
        );
    };

    let profile = DocumentProfile::load_with_fallback(args.profile.as_deref(), doc_type);
    if let Some(profile_path) = &args.profile {
        eprintln!("📋 Profile from: {profile_path}");
    } else {
        eprintln!("📋 Using built-in {doc_type} profile");
    }

    let source = source_for_path(input_path);
    let paragraphs = source
        .read_file(input_path)
        .with_context(|| format!("reading {input} with {}", source.name()))?;
    eprintln!("📄 Checking: {input} ({} paragraphs via {})", paragraphs.len(), source.name());

    let engine = ConsistencyEngine::new(&profile).context("compiling profile")?;
    eprintln!("🔑 Profile fingerprint: {}", engine.profile().fingerprint);
    let report = match engine.run(&paragraphs) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("❌ Check failed: {e}");
            std::process::exit(1);
        }
    };

    let has_errors = report.has_errors();
    eprintln!("✅ Check complete: {} findings", report.findings.len());

    let envelope = ReportEnvelope::new(input_path, source.name(), report);
    if args.summary {
        eprintln!("📊 Findings:");
        for line in envelope.summary_lines() {
            eprintln!("{line}");
        }
    }

    let json = envelope.to_json()?;
    match &args.output {
        Some(output_path) => {
            fs::write(output_path, json).with_context(|| format!("writing {output_path}"))?;
            eprintln!("💾 Report saved to: {output_path}");
        }
        None => println!("{json}"),
    }

    if args.fail_on_error && has_errors {
        std::process::exit(1);
    }

    Ok(())
}

fn show_profiles() {
    let manager = ProfileManager::new();

    eprintln!("\n📋 Document types and built-in profiles:");
    for doc_type in manager.document_types() {
        let profile = manager.get_profile(&doc_type);
        eprintln!(
            "  {:<26} {:?} numbering, {} required headings",
            doc_type.display_name(),
            profile.numbering_convention(),
            profile.required_headings.len()
        );
    }

    eprintln!("\n📁 Example profile files in ./profiles/:");
    eprintln!("  advisory-circular.yaml  - Hyphenated numbering, trimmed acronym vocabulary");
    eprintln!("  policy-statement.yaml   - Policy statement headings, extra common words");

    eprintln!("\n📝 Usage Examples:");
    eprintln!("  cargo run -- -i document.json -t \"Advisory Circular\"");
    eprintln!("  cargo run -- -i document.xml -t order --summary --fail-on-error");
    eprintln!("  cargo run -- -i document.json -p profiles/policy-statement.yaml -o report.json");
}
