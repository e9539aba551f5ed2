use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;

use atty::Stream;
use clap::{Parser, Subcommand};
use gallgloss_rs::{
    GlossarySource, JsonGlossaryFile, Segment, link_from_stems, make_link, render_markdown,
    stem_text,
};
use serde_json::json;
use termimad::{FmtText, MadSkin, terminal_size};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gallgloss-rs", about = "Link glossary terms in free text", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable tables.
    #[arg(long, global = true)]
    json: bool,

    /// Path to a JSON array of glossary entries.
    #[arg(long, global = true, env = "GALLGLOSS_GLOSSARY")]
    glossary: Option<PathBuf>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List glossary entries with their normalized stems.
    Stems,
    /// Split text into plain and glossary-linked segments.
    Annotate {
        /// Text to annotate. Read from stdin when omitted.
        text: Vec<String>,
        /// Link to anchors on the current page instead of the glossary page.
        #[arg(long)]
        same_document: bool,
        /// Print the result as markdown with inline links.
        #[arg(long)]
        markdown: bool,
    },
    /// Show the link that would be built for an anchor.
    Link {
        anchor: String,
        text: String,
        #[arg(long)]
        same_document: bool,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    match cli.command {
        Command::Stems => {
            let source = glossary_source(cli.glossary)?;
            runtime.block_on(handle_stems(&source, cli.json))
        }
        Command::Annotate {
            text,
            same_document,
            markdown,
        } => {
            let source = glossary_source(cli.glossary)?;
            let text = if text.is_empty() {
                read_stdin()?
            } else {
                text.join(" ")
            };
            runtime.block_on(handle_annotate(
                &source,
                &text,
                same_document,
                markdown,
                cli.json,
            ))
        }
        Command::Link {
            anchor,
            text,
            same_document,
        } => handle_link(&anchor, &text, same_document, cli.json),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "gallgloss_rs=debug"
    } else {
        "gallgloss_rs=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn glossary_source(path: Option<PathBuf>) -> Result<JsonGlossaryFile, Box<dyn Error>> {
    let path = path.ok_or("No glossary given; pass --glossary or set GALLGLOSS_GLOSSARY")?;
    debug!(path = %path.display(), "using glossary file");
    Ok(JsonGlossaryFile::new(path))
}

fn read_stdin() -> Result<String, Box<dyn Error>> {
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

async fn handle_stems(source: &JsonGlossaryFile, as_json: bool) -> Result<(), Box<dyn Error>> {
    let entries = source.fetch_all().await?;
    let stems = stem_text(&entries);

    if as_json {
        let payload: Vec<_> = stems
            .iter()
            .map(|stem| {
                json!({
                    "id": stem.entry.id,
                    "word": stem.entry.word,
                    "stem": stem.stem,
                    "matchable": stem.is_matchable(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if stems.is_empty() {
        println!("Glossary is empty.");
        return Ok(());
    }
    let width = stems
        .iter()
        .map(|stem| stem.stem.len())
        .max()
        .unwrap_or(4)
        .max("STEM".len());
    println!("{:<width$}  {}", "STEM", "ID", width = width);
    println!("{:-<width$}  {}", "", "----------", width = width);
    for stem in &stems {
        let label = if stem.is_matchable() {
            stem.stem.as_str()
        } else {
            "<blank>"
        };
        println!("{:<width$}  {}", label, stem.entry.id, width = width);
    }
    Ok(())
}

async fn handle_annotate(
    source: &JsonGlossaryFile,
    text: &str,
    same_document: bool,
    markdown: bool,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let entries = source.fetch_all().await?;
    let stems = stem_text(&entries);
    let segments = link_from_stems(text, same_document)(&stems);

    if as_json {
        println!("{}", segments_to_json(&segments)?);
    } else if markdown {
        render_markdown_block(&render_markdown(&segments));
    } else {
        print_segment_table(&segments);
    }
    Ok(())
}

fn handle_link(
    anchor: &str,
    text: &str,
    same_document: bool,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let link = make_link(anchor, text, same_document);
    if as_json {
        println!("{}", serde_json::to_string_pretty(&link)?);
    } else {
        println!("{} -> {}", link.text, link.href);
    }
    Ok(())
}

fn segments_to_json(segments: &[Segment]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(segments)
}

fn print_segment_table(segments: &[Segment]) {
    if segments.is_empty() {
        println!("Nothing to annotate.");
        return;
    }
    for (idx, segment) in segments.iter().enumerate() {
        match segment {
            Segment::PlainText(text) => println!("{idx:>3}  text  {text:?}"),
            Segment::GlossaryLink(link) => {
                println!(
                    "{idx:>3}  link  {:?} -> {} ({})",
                    link.display_text,
                    link.link().href,
                    snippet(&link.entry.definition, 60)
                );
            }
        }
    }
}

fn snippet(text: &str, max_chars: usize) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let mut cut: String = trimmed.chars().take(max_chars).collect();
    cut.push('…');
    cut
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn render_markdown_block(body: &str) {
    if stdout_is_tty() {
        let skin = MadSkin::default();
        let formatted = FmtText::from(&skin, body, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{body}");
    }
}
