use std::io::Write;

use doccrawl_core::{Article, CategoryReport, Config, CrawlEvent, CrawlSummary, Issue, Locale};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the resolved directories before the crawl starts.
pub fn print_run_header(w: &mut dyn Write, config: &Config, color: ColorMode) -> std::io::Result<()> {
    let lines = [
        ("Documents", config.documents_dir.display().to_string()),
        ("PDFs", config.pdfs_dir.display().to_string()),
        ("Output", config.output_dir.display().to_string()),
        ("Missing-PDF log", config.missing_pdf_log.display().to_string()),
    ];
    for (label, value) in lines {
        if color.enabled() {
            writeln!(w, "{:>16}: {}", label.bold(), value)?;
        } else {
            writeln!(w, "{:>16}: {}", label, value)?;
        }
    }
    if !config.categories.is_empty() {
        writeln!(w, "{:>16}: {}", "Categories", config.categories.join(", "))?;
    }
    writeln!(
        w,
        "{:>16}: {} categories, {} documents",
        "Workers", config.category_workers, config.document_workers
    )?;
    writeln!(w)?;
    Ok(())
}

/// Print a real-time progress event.
pub fn print_progress(
    w: &mut dyn Write,
    event: &CrawlEvent,
    color: ColorMode,
) -> std::io::Result<()> {
    match event {
        CrawlEvent::CategoryStarted {
            category,
            documents,
        } => {
            if color.enabled() {
                writeln!(w, "{} ({} documents)", category.bold(), documents)?;
            } else {
                writeln!(w, "{} ({} documents)", category, documents)?;
            }
        }
        CrawlEvent::DocumentProcessed {
            category,
            document,
            articles,
            pdfs,
        } => {
            let name = document
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| document.display().to_string());
            let pdf_note = format!("{pdfs}/{articles} PDFs");
            if color.enabled() {
                let pdf_note = if pdfs < articles {
                    pdf_note.yellow().to_string()
                } else {
                    pdf_note.green().to_string()
                };
                writeln!(
                    w,
                    "  [{}] {} -> {} articles, {}",
                    category.dimmed(),
                    name,
                    articles,
                    pdf_note
                )?;
            } else {
                writeln!(
                    w,
                    "  [{}] {} -> {} articles, {}",
                    category, name, articles, pdf_note
                )?;
            }
        }
        CrawlEvent::DocumentSkipped {
            category,
            document,
            reason,
        } => {
            if color.enabled() {
                writeln!(
                    w,
                    "  [{}] {} {} ({})",
                    category.dimmed(),
                    "SKIPPED".yellow(),
                    document.display(),
                    reason
                )?;
            } else {
                writeln!(
                    w,
                    "  [{}] SKIPPED {} ({})",
                    category,
                    document.display(),
                    reason
                )?;
            }
        }
        CrawlEvent::CategoryFinished { report } => {
            if let Some(err) = &report.error {
                if color.enabled() {
                    writeln!(w, "{} {}: {}", "FAILED".red(), report.category, err)?;
                } else {
                    writeln!(w, "FAILED {}: {}", report.category, err)?;
                }
            } else if let Some(path) = &report.output {
                writeln!(w, "Wrote {}", path.display())?;
            }
        }
    }
    Ok(())
}

/// Print the final crawl summary table.
pub fn print_summary(
    w: &mut dyn Write,
    summary: &CrawlSummary,
    color: ColorMode,
) -> std::io::Result<()> {
    let heading = "═══ Crawl Summary ═══";
    if color.enabled() {
        writeln!(w, "{}", heading.bold())?;
    } else {
        writeln!(w, "{}", heading)?;
    }
    writeln!(w)?;

    if summary.categories.is_empty() {
        writeln!(w, "No categories found.")?;
        return Ok(());
    }

    for report in &summary.categories {
        print_category_line(w, report, color)?;
    }

    let issues: usize = summary.categories.iter().map(|c| c.issues).sum();
    let without_pdf: usize = summary
        .categories
        .iter()
        .map(|c| c.articles_without_pdf)
        .sum();
    let skipped: usize = summary
        .categories
        .iter()
        .map(|c| c.skipped_documents.len())
        .sum();
    let failed = summary.failed().count();

    writeln!(w)?;
    writeln!(
        w,
        "  {} categories, {} issues, {} articles",
        summary.categories.len(),
        issues,
        summary.total_articles()
    )?;
    writeln!(w, "  Output files:          {}", summary.outputs().count())?;
    if color.enabled() {
        writeln!(
            w,
            "  Articles without PDF:  {}",
            count_colored(without_pdf, |s| s.yellow().to_string())
        )?;
        writeln!(
            w,
            "  Skipped documents:     {}",
            count_colored(skipped, |s| s.yellow().to_string())
        )?;
        writeln!(
            w,
            "  Failed categories:     {}",
            count_colored(failed, |s| s.red().to_string())
        )?;
    } else {
        writeln!(w, "  Articles without PDF:  {}", without_pdf)?;
        writeln!(w, "  Skipped documents:     {}", skipped)?;
        writeln!(w, "  Failed categories:     {}", failed)?;
    }
    Ok(())
}

fn count_colored(n: usize, paint: impl Fn(&str) -> String) -> String {
    let s = n.to_string();
    if n > 0 { paint(&s) } else { s }
}

fn print_category_line(
    w: &mut dyn Write,
    report: &CategoryReport,
    color: ColorMode,
) -> std::io::Result<()> {
    let counts = format!(
        "{} docs, {} issues, {} articles",
        report.documents, report.issues, report.articles
    );
    let status = match (&report.error, &report.output) {
        (Some(err), _) => format!("failed: {err}"),
        (None, Some(path)) => path.display().to_string(),
        (None, None) => "no output".to_string(),
    };

    if color.enabled() {
        let status = if report.error.is_some() {
            status.red().to_string()
        } else if report.output.is_none() {
            status.dimmed().to_string()
        } else {
            status
        };
        writeln!(w, "  {:<24} {:<40} {}", report.category.bold(), counts, status)?;
    } else {
        writeln!(w, "  {:<24} {:<40} {}", report.category, counts, status)?;
    }

    for skipped in &report.skipped_documents {
        writeln!(
            w,
            "      skipped {}: {}",
            skipped.path.display(),
            skipped.reason
        )?;
    }
    if report.missing_pdf_dirs > 0 {
        writeln!(
            w,
            "      {} issue(s) without a PDF directory",
            report.missing_pdf_dirs
        )?;
    }
    Ok(())
}

/// Print the fields extracted from one document.
pub fn print_inspection(
    w: &mut dyn Write,
    file_name: &str,
    issue: &Issue,
    color: ColorMode,
) -> std::io::Result<()> {
    let header = format!(
        "{}: volume {}, number {}, year {}",
        file_name,
        issue.volume.as_deref().unwrap_or("?"),
        issue.number.as_deref().unwrap_or("?"),
        issue.year.as_deref().unwrap_or("?"),
    );
    if color.enabled() {
        writeln!(w, "{}", header.bold())?;
    } else {
        writeln!(w, "{}", header)?;
    }
    writeln!(w, "Found {} articles", issue.articles.len())?;

    for (i, article) in issue.articles.iter().enumerate() {
        writeln!(w)?;
        print_article(w, i + 1, article, color)?;
    }
    Ok(())
}

fn print_article(
    w: &mut dyn Write,
    index: usize,
    article: &Article,
    color: ColorMode,
) -> std::io::Result<()> {
    let language = match article.primary_language() {
        "" => "none",
        lang => lang,
    };
    if color.enabled() {
        writeln!(
            w,
            "[{}] {} ({})",
            index,
            article.display_title().bold(),
            language.cyan()
        )?;
    } else {
        writeln!(w, "[{}] {} ({})", index, article.display_title(), language)?;
    }

    for locale in [Locale::Tr, Locale::En] {
        let tag = locale.as_str();
        field(w, &format!("title_{tag}"), article.title(locale), color)?;
        field(w, &format!("abstract_{tag}"), article.abstract_text(locale), color)?;
        field(w, &format!("keywords_{tag}"), article.keywords(locale), color)?;
    }

    let pages = match (&article.first_page, &article.last_page) {
        (Some(first), Some(last)) => Some(format!("{first}-{last}")),
        (Some(first), None) => Some(first.clone()),
        _ => None,
    };
    field(w, "pages", pages.as_deref(), color)?;

    let authors: Vec<String> = article
        .authors
        .iter()
        .map(|a| {
            [a.first_name.as_deref(), a.last_name.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    let authors = (!authors.is_empty()).then(|| authors.join("; "));
    field(w, "authors", authors.as_deref(), color)?;

    writeln!(w, "    {:<12} {}", "citations", article.citations.len())?;
    Ok(())
}

fn field(
    w: &mut dyn Write,
    label: &str,
    value: Option<&str>,
    color: ColorMode,
) -> std::io::Result<()> {
    match value {
        Some(v) => {
            let short = truncate(v, 80);
            writeln!(w, "    {:<12} {}", label, short)
        }
        None if color.enabled() => writeln!(w, "    {:<12} {}", label, "(not found)".dimmed()),
        None => writeln!(w, "    {:<12} (not found)", label),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        s.to_string()
    }
}
