use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use paperdigest_core::summarizer::select;
use paperdigest_core::{PdfBackend, Settings, Summarizer, SummaryLength, config_file};
use paperdigest_ingest::{DigestOptions, digest_directory, read_document};
use paperdigest_portal::{DownloadEvent, PortalClient};

mod output;

use output::ColorMode;

/// Paper digest - search a publication portal and summarize what it returns
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a text file, a PDF, or standard input ("-")
    Summarize {
        /// Path to the document, or "-" to read text from stdin
        input: PathBuf,

        /// Number of sentences to keep
        #[arg(short, long, allow_negative_numbers = true)]
        length: Option<SummaryLength>,

        /// Show every sentence with its score instead of only the summary
        #[arg(long)]
        scores: bool,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Path to output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Search the portal for a topic, download the PDFs and summarize them
    Search {
        /// Search topic
        topic: String,

        #[command(flatten)]
        digest: DigestArgs,

        /// Portal base URL (defaults to IEEE Xplore)
        #[arg(long)]
        portal_url: Option<String>,

        /// Only download the first N search results
        #[arg(long)]
        max_records: Option<usize>,
    },

    /// Summarize PDFs already present in a directory (the files are kept)
    Digest {
        /// Directory containing the PDFs
        dir: PathBuf,

        #[command(flatten)]
        digest: DigestArgs,

        /// Delete each PDF after it has been summarized
        #[arg(long, conflicts_with = "keep_pdfs")]
        remove_pdfs: bool,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug)]
struct DigestArgs {
    /// Sentences kept per document
    #[arg(short, long, allow_negative_numbers = true)]
    length: Option<SummaryLength>,

    /// Sentences kept in the summary of all documents
    #[arg(long, allow_negative_numbers = true)]
    aggregate_length: Option<SummaryLength>,

    /// Directory the PDFs are downloaded to
    #[arg(long)]
    pdf_dir: Option<PathBuf>,

    /// Keep PDFs after summarizing them
    #[arg(long)]
    keep_pdfs: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Path to output file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write a default config to the platform config directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    // Resolve configuration: CLI flags > env vars > config file > defaults
    let settings = Settings::load()?;

    match cli.command {
        Command::Summarize {
            input,
            length,
            scores,
            no_color,
            output,
        } => summarize(&settings, &input, length, scores, no_color, output),
        Command::Search {
            topic,
            digest,
            portal_url,
            max_records,
        } => {
            let mut settings = settings;
            if let Some(url) = portal_url {
                settings.portal_url = url.trim_end_matches('/').to_string();
            }
            if max_records.is_some() {
                settings.max_records = max_records;
            }
            search(apply_digest_args(settings, &digest), &topic, &digest).await
        }
        Command::Digest {
            dir,
            digest,
            remove_pdfs,
        } => digest_existing(digest_settings(settings, dir, &digest, remove_pdfs), &digest).await,
        Command::Config { action } => config(&settings, action),
    }
}

fn apply_digest_args(mut settings: Settings, args: &DigestArgs) -> Settings {
    if let Some(length) = args.length {
        settings.length = length;
    }
    if let Some(length) = args.aggregate_length {
        settings.aggregate_length = length;
    }
    if let Some(dir) = &args.pdf_dir {
        settings.pdf_dir = dir.clone();
    }
    if args.keep_pdfs {
        settings.keep_pdfs = true;
    }
    settings
}

/// Settings for digesting a directory the user already owns: its PDFs stay
/// on disk unless `--remove-pdfs` is given.
fn digest_settings(settings: Settings, dir: PathBuf, args: &DigestArgs, remove_pdfs: bool) -> Settings {
    let mut settings = apply_digest_args(settings, args);
    settings.pdf_dir = dir;
    settings.keep_pdfs = !remove_pdfs;
    settings
}

fn open_writer(output: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    })
}

fn summarize(
    settings: &Settings,
    input: &Path,
    length: Option<SummaryLength>,
    scores: bool,
    no_color: bool,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let length = length.unwrap_or(settings.length);
    let color = ColorMode(!no_color && output.is_none());
    let mut writer = open_writer(output.as_deref())?;

    let text = if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        if !input.exists() {
            anyhow::bail!("File not found: {}", input.display());
        }
        read_document(input, &paperdigest_ingest::default_backend())?
    };
    tracing::debug!(input = %input.display(), chars = text.len(), "document loaded");

    let summarizer = Summarizer::default();
    if scores {
        let ranked = summarizer.rank(&text);
        let selected = select(&ranked, length.get());
        let table = summarizer.frequency_table(&text);
        output::print_ranked(&mut writer, &ranked, &selected, &table, color)?;
    } else {
        writeln!(writer, "{}", summarizer.summarize(&text, length.get()))?;
    }
    Ok(())
}

async fn search(settings: Settings, topic: &str, args: &DigestArgs) -> anyhow::Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let color = ColorMode(!args.no_color && args.output.is_none());
    let mut writer = open_writer(args.output.as_deref())?;

    let client = PortalClient::new((&settings).into())?;
    let records = client.search(topic).await?;
    tracing::info!(topic = topic.trim(), records = records.len(), "search finished");
    if records.is_empty() {
        writeln!(writer, "No results for \"{}\".", topic.trim())?;
        return Ok(());
    }

    let bar = ProgressBar::new(records.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{pos}/{len}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    let downloads = client
        .download_all(&records, &settings.pdf_dir, |event| match event {
            DownloadEvent::Fetching { url, .. } => bar.set_message(url),
            DownloadEvent::Saved { .. } | DownloadEvent::Skipped { .. } => bar.inc(1),
        })
        .await?;
    bar.finish_and_clear();

    output::print_download_summary(&mut writer, &downloads, color)?;

    let report = run_digest(&settings, paperdigest_ingest::default_backend()).await?;
    output::print_digest(&mut writer, &report, color)?;
    Ok(())
}

async fn digest_existing(settings: Settings, args: &DigestArgs) -> anyhow::Result<()> {
    if !settings.pdf_dir.is_dir() {
        anyhow::bail!("Directory not found: {}", settings.pdf_dir.display());
    }
    let color = ColorMode(!args.no_color && args.output.is_none());
    let mut writer = open_writer(args.output.as_deref())?;
    tracing::info!(
        dir = %settings.pdf_dir.display(),
        keep_pdfs = settings.keep_pdfs,
        "digesting existing PDFs"
    );

    let report = run_digest(&settings, paperdigest_ingest::default_backend()).await?;
    output::print_digest(&mut writer, &report, color)?;
    Ok(())
}

/// MuPDF extraction is blocking; keep it off the async runtime.
async fn run_digest(
    settings: &Settings,
    backend: impl PdfBackend + 'static,
) -> anyhow::Result<paperdigest_ingest::DigestReport> {
    let dir = settings.pdf_dir.clone();
    let options = DigestOptions::from(settings);
    let report = tokio::task::spawn_blocking(move || {
        digest_directory(&dir, &backend, &Summarizer::default(), &options)
    })
    .await??;
    let failed = report.failed_count();
    if failed > 0 {
        tracing::warn!(failed, total = report.documents.len(), "some documents could not be read");
    }
    Ok(report)
}

fn config(settings: &Settings, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&settings.to_config_file())?);
        }
        ConfigAction::Init { force } => {
            let Some(path) = config_file::config_path() else {
                anyhow::bail!("Could not determine config directory");
            };
            if path.exists() && !force {
                anyhow::bail!(
                    "Config already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            config_file::save_to_path(&Settings::default().to_config_file(), &path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn negative_length_is_rejected_by_the_parser() {
        let err = Cli::try_parse_from(["paperdigest", "summarize", "paper.txt", "--length", "-2"])
            .unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn digest_flags_override_settings() {
        let cli = Cli::try_parse_from([
            "paperdigest",
            "search",
            "graph learning",
            "--length",
            "3",
            "--keep-pdfs",
            "--pdf-dir",
            "/tmp/p",
        ])
        .unwrap();
        let Command::Search { topic, digest, .. } = cli.command else {
            panic!("expected search");
        };
        assert_eq!(topic, "graph learning");
        let settings = apply_digest_args(Settings::default(), &digest);
        assert_eq!(settings.length.get(), 3);
        assert_eq!(settings.aggregate_length.get(), 10);
        assert!(settings.keep_pdfs);
        assert_eq!(settings.pdf_dir, PathBuf::from("/tmp/p"));
    }

    struct TextBackend;

    impl PdfBackend for TextBackend {
        fn extract_text(&self, path: &Path) -> Result<String, paperdigest_core::BackendError> {
            Ok(std::fs::read_to_string(path)?)
        }
    }

    fn parse_digest(args: &[&str]) -> Settings {
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Digest {
            dir,
            digest,
            remove_pdfs,
        } = cli.command
        else {
            panic!("expected digest");
        };
        digest_settings(Settings::default(), dir, &digest, remove_pdfs)
    }

    fn thesis_dir() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("my_thesis.pdf");
        std::fs::write(&pdf, "Cats are mammals. Dogs are mammals too. The sky is blue.").unwrap();
        (dir, pdf)
    }

    #[tokio::test]
    async fn digest_leaves_user_pdfs_in_place() {
        let (dir, pdf) = thesis_dir();
        let settings = parse_digest(&["paperdigest", "digest", dir.path().to_str().unwrap()]);
        assert!(settings.keep_pdfs);

        let report = run_digest(&settings, TextBackend).await.unwrap();
        assert_eq!(report.summaries().count(), 1);
        assert!(pdf.exists());
    }

    #[tokio::test]
    async fn remove_pdfs_deletes_summarized_files() {
        let (dir, pdf) = thesis_dir();
        let settings = parse_digest(&[
            "paperdigest",
            "digest",
            dir.path().to_str().unwrap(),
            "--remove-pdfs",
        ]);
        assert!(!settings.keep_pdfs);

        let report = run_digest(&settings, TextBackend).await.unwrap();
        assert_eq!(report.summaries().count(), 1);
        assert!(!pdf.exists());
    }

    #[test]
    fn keep_and_remove_pdfs_conflict() {
        let result = Cli::try_parse_from([
            "paperdigest",
            "digest",
            "pdfs",
            "--keep-pdfs",
            "--remove-pdfs",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn summarize_writes_to_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("doc.txt");
        let out = dir.path().join("out.txt");
        std::fs::write(
            &input,
            "Cats are mammals. Dogs are mammals too. The sky is blue. Cats and dogs are common pets.",
        )
        .unwrap();
        summarize(
            &Settings::default(),
            &input,
            Some(SummaryLength::new(2)),
            false,
            true,
            Some(out.clone()),
        )
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "Cats are mammals. Cats and dogs are common pets.\n"
        );
    }

    #[test]
    fn summarize_missing_file_fails() {
        let err = summarize(
            &Settings::default(),
            Path::new("/nonexistent/doc.txt"),
            None,
            false,
            true,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
