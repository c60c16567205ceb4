//! Markdown rendering of summary documents.

use std::fmt::Write as _;

use super::model::{Author, ProductSummary, Rating, TableOfContents};

/// Everything gathered for one item's summary.
///
/// `None` sections are the ones whose lookup was disabled or failed; they are
/// left out of the rendered document.
#[derive(Debug, Clone, Default)]
pub struct SummaryDocument {
    /// Provider identifier.
    pub item_id: String,
    /// Title used when the summary record has none.
    pub display_name: String,
    /// Product summary record.
    pub summary: Option<ProductSummary>,
    /// Table of contents.
    pub toc: Option<TableOfContents>,
    /// Aggregate rating.
    pub rating: Option<Rating>,
    /// Author records that could be fetched.
    pub authors: Vec<Author>,
    /// Store page link.
    pub shop_link: String,
    /// Web reader link.
    pub reader_link: String,
}

impl SummaryDocument {
    /// Renders the document as Markdown.
    #[must_use]
    pub fn render(&self) -> String {
        let summary = self.summary.clone().unwrap_or_default();
        let title = non_empty(summary.title.as_deref()).unwrap_or(self.display_name.as_str());

        let mut out = String::new();
        let _ = writeln!(out, "# {}\n", title.trim());
        if let Some(one_liner) = non_empty(summary.one_liner.as_deref()) {
            let _ = writeln!(out, "_{}_\n", one_liner.trim());
        }

        let mut facts = Vec::new();
        if let Some(date) = non_empty(summary.publication_date.as_deref()) {
            facts.push(format!("- **Published:** {}", date_only(date)));
        }
        if let Some(pages) = summary.pages {
            facts.push(format!("- **Pages:** {pages}"));
        }
        if let Some(isbn) = non_empty(summary.isbn13.as_deref()) {
            facts.push(format!("- **ISBN:** {isbn}"));
        }
        if let Some(category) = non_empty(summary.category.as_deref()) {
            facts.push(format!("- **Category:** {category}"));
        }
        if let Some(rating) = self.rating.as_ref().and_then(render_rating) {
            facts.push(format!("- **Rating:** {rating}"));
        }
        if !facts.is_empty() {
            let _ = writeln!(out, "{}\n", facts.join("\n"));
        }
        let _ = writeln!(
            out,
            "[Store page]({}) | [Read online]({})\n",
            self.shop_link, self.reader_link
        );

        for (heading, body) in [
            ("About", summary.about.as_deref()),
            ("What you will learn", summary.learn.as_deref()),
            ("Key features", summary.features.as_deref()),
        ] {
            if let Some(body) = non_empty(body) {
                let _ = writeln!(out, "## {heading}\n\n{}\n", body.trim());
            }
        }

        if let Some(toc) = &self.toc
            && !toc.chapters.is_empty()
        {
            out.push_str("## Table of contents\n\n");
            for (index, chapter) in toc.chapters.iter().enumerate() {
                let title = non_empty(chapter.title.as_deref()).unwrap_or("Untitled");
                let _ = writeln!(out, "{}. {}", index + 1, title.trim());
                for section in &chapter.sections {
                    if let Some(title) = non_empty(section.title.as_deref()) {
                        let _ = writeln!(out, "   - {}", title.trim());
                    }
                }
            }
            out.push('\n');
        }

        let authors: Vec<&Author> = self
            .authors
            .iter()
            .filter(|a| non_empty(a.name.as_deref()).is_some())
            .collect();
        if !authors.is_empty() {
            out.push_str("## Authors\n\n");
            for author in authors {
                let _ = writeln!(out, "### {}\n", author.name.as_deref().unwrap_or_default());
                if let Some(bio) = non_empty(author.description.as_deref()) {
                    let _ = writeln!(out, "{}\n", bio.trim());
                }
            }
        }

        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out.push('\n');
        out
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// `2021-03-05T00:00:00.000Z` reads better as `2021-03-05`.
fn date_only(value: &str) -> &str {
    value.split_once('T').map_or(value, |(date, _)| date)
}

fn render_rating(rating: &Rating) -> Option<String> {
    let average = rating.rating?;
    Some(match rating.count {
        Some(count) => format!("{average:.1} / 5 ({count} reviews)"),
        None => format!("{average:.1} / 5"),
    })
}
