//! docview-pdf CLI - shows what a viewer gets from the PDF backend

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use docview_pdf::plugin::DocumentBackend;
use docview_pdf::{Document, Link, LinkType, Page, PdfPlugin};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "docview-pdf")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Inspect PDF information, outline, links and page labels", long_about = None)]
struct Cli {
    /// Password for encrypted documents
    #[arg(short, long, global = true, env = "DOCVIEW_PDF_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show the outline (table of contents)
    #[command(alias = "toc")]
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// List link annotations
    Links {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Only this page (1-based)
        #[arg(long)]
        page: Option<u32>,
    },

    /// List page sizes and labels
    Labels {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Write the document to another file
    Save {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let password = cli.password.as_deref();

    let result = match cli.command {
        Commands::Info { input } => cmd_info(&input, password, cli.json),
        Commands::Outline { input } => cmd_outline(&input, password, cli.json),
        Commands::Links { input, page } => cmd_links(&input, password, page, cli.json),
        Commands::Labels { input } => cmd_labels(&input, password, cli.json),
        Commands::Save { input, output } => cmd_save(&input, &output, password),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// An opened document together with the backend that opened it.
struct Session {
    backend: PdfPlugin,
    document: Document,
}

impl Session {
    fn open(input: &Path, password: Option<&str>) -> CliResult<Self> {
        let backend = PdfPlugin::new();
        let mut document = Document::new(input);
        if let Some(password) = password {
            document = document.with_password(password);
        }

        backend
            .document_open(&mut document)
            .map_err(|e| format!("cannot open {}: {} [{}]", input.display(), e, e.code()))?;
        log::debug!("{:?}", document);
        Ok(Self { backend, document })
    }

    fn pages(&self) -> impl Iterator<Item = Page> {
        (0..self.document.page_count()).map(Page::new)
    }

    fn close(mut self) -> CliResult<()> {
        self.backend.document_free(&mut self.document)?;
        Ok(())
    }
}

fn cmd_info(input: &Path, password: Option<&str>, json: bool) -> CliResult<()> {
    let session = Session::open(input, password)?;
    let entries = session
        .backend
        .document_get_information(&session.document)?;

    if json {
        let info = serde_json::json!({
            "file": input.display().to_string(),
            "page_count": session.document.page_count(),
            "information": entries,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return session.close();
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), session.document.page_count());

    for entry in &entries {
        match entry.as_datetime() {
            Some(date) => println!(
                "{}: {} {}",
                entry.kind.label().bold(),
                entry.value,
                format!("({})", date).dimmed()
            ),
            None => println!("{}: {}", entry.kind.label().bold(), entry.value),
        }
    }

    session.close()
}

fn cmd_outline(input: &Path, password: Option<&str>, json: bool) -> CliResult<()> {
    let session = Session::open(input, password)?;
    let index = session
        .backend
        .document_index_generate(&session.document)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return session.close();
    }

    if index.is_leaf() {
        println!("{}", "No outline".yellow());
        return session.close();
    }

    index.walk(|depth, element| {
        let target = element.link.as_ref().map(describe).unwrap_or_default();
        println!(
            "{}{} {}",
            "  ".repeat(depth - 1),
            element.title,
            target.dimmed()
        );
    });
    println!(
        "\n{} {} entries",
        "Total:".green().bold(),
        index.descendant_count()
    );

    session.close()
}

fn cmd_links(
    input: &Path,
    password: Option<&str>,
    page: Option<u32>,
    json: bool,
) -> CliResult<()> {
    let session = Session::open(input, password)?;
    let pages: Vec<Page> = match page {
        Some(0) => return Err("page numbers start at 1".into()),
        Some(n) => vec![Page::new(n - 1)],
        None => session.pages().collect(),
    };

    let mut all = Vec::new();
    for page in &pages {
        let links = session.backend.page_links_get(&session.document, page)?;
        all.push((page.index() + 1, links));
    }

    if json {
        let value: Vec<_> = all
            .iter()
            .map(|(page, links)| serde_json::json!({ "page": page, "links": links }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return session.close();
    }

    let mut count = 0;
    for (page, links) in &all {
        for link in links {
            let p = &link.position;
            println!(
                "{} {} {}",
                format!("p.{}", page).bold(),
                format!("[{:.1}, {:.1}, {:.1}, {:.1}]", p.x1, p.y1, p.x2, p.y2).dimmed(),
                describe(link)
            );
            count += 1;
        }
    }
    println!("\n{} {} links", "Total:".green().bold(), count);

    session.close()
}

fn cmd_labels(input: &Path, password: Option<&str>, json: bool) -> CliResult<()> {
    let session = Session::open(input, password)?;

    let mut rows = Vec::new();
    for mut page in session.pages() {
        session.backend.page_init(&session.document, &mut page)?;
        let label = session.backend.page_get_label(&session.document, &page)?;
        session.backend.page_clear(&session.document, &mut page)?;
        rows.push((page, label));
    }

    if json {
        let value: Vec<_> = rows
            .iter()
            .map(|(page, label)| {
                serde_json::json!({
                    "page": page.index() + 1,
                    "label": label,
                    "width": page.width(),
                    "height": page.height(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return session.close();
    }

    for (page, label) in &rows {
        println!(
            "{:>5}  {:<12} {}",
            page.index() + 1,
            label.as_deref().unwrap_or("-"),
            format!("{:.1} x {:.1}", page.width(), page.height()).dimmed()
        );
    }

    session.close()
}

fn cmd_save(input: &Path, output: &Path, password: Option<&str>) -> CliResult<()> {
    let session = Session::open(input, password)?;
    session
        .backend
        .document_save_as(&session.document, output)?;
    println!("{} {}", "Saved to".green(), output.display());
    session.close()
}

fn cmd_version() {
    println!("{} {}", "docview-pdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF backend inspector (library {})", docview_pdf::VERSION);
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docview-pdf".dimmed());
    println!("License: MIT");
}

/// Short description of where a link goes.
fn describe(link: &Link) -> String {
    let target = &link.target;
    match link.link_type {
        LinkType::GotoDest => {
            let mut s = format!("-> page {}", target.page_number + 1);
            if target.top >= 0.0 {
                s.push_str(&format!(" @ {:.0}", target.top));
            }
            s
        }
        LinkType::Uri | LinkType::GotoRemote | LinkType::Launch | LinkType::Named => {
            format!("-> {}", target.value.as_deref().unwrap_or_default())
        }
        LinkType::None | LinkType::Invalid => String::new(),
    }
}
