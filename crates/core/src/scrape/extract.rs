//! Turns the markup of the leaderboard table into [`Entry`] rows.
//!
//! Columns are positional: 0 character, 1 guild, 3 realm, 5 date (an element carrying an
//! `aria-label`). Columns 2 and 4 are not part of the row shape.

use crate::domain::entry::{Entry, Link};
use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

const CHARACTER_COLUMN: usize = 0;
const GUILD_COLUMN: usize = 1;
const REALM_COLUMN: usize = 3;
const DATE_COLUMN: usize = 5;

struct RowSelectors {
    row: Selector,
    cell: Selector,
    link: Selector,
    date: Selector,
}

impl RowSelectors {
    fn compile() -> Result<Self> {
        Ok(Self {
            row: parse_selector("tr")?,
            cell: parse_selector("td")?,
            link: parse_selector("a")?,
            date: parse_selector("span")?,
        })
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid CSS selector {css:?}: {e}"))
}

/// Extracts every row after the header row, in document order.
///
/// `table_html` may be either the inner markup of a `<table>` (what the fetcher returns) or a
/// complete table element. Malformed rows never fail extraction; missing cells come out as
/// empty names with no url.
pub fn extract_entries(table_html: &str) -> Result<Vec<Entry>> {
    let selectors = RowSelectors::compile()?;
    let document = Html::parse_fragment(&format!("<table>{table_html}</table>"));

    let entries = document
        .select(&selectors.row)
        .skip(1)
        .map(|row| extract_row(&selectors, row))
        .collect();

    Ok(entries)
}

fn extract_row(selectors: &RowSelectors, row: ElementRef<'_>) -> Entry {
    let cells: Vec<ElementRef<'_>> = row.select(&selectors.cell).collect();
    let cell = |idx: usize| cells.get(idx).copied();

    Entry {
        character: cell_link(selectors, cell(CHARACTER_COLUMN)),
        guild: cell_link(selectors, cell(GUILD_COLUMN)),
        realm: cell_link(selectors, cell(REALM_COLUMN)),
        date: cell(DATE_COLUMN).and_then(|c| cell_date(selectors, c)),
    }
}

fn cell_link(selectors: &RowSelectors, cell: Option<ElementRef<'_>>) -> Link {
    let Some(anchor) = cell.and_then(|c| c.select(&selectors.link).next()) else {
        return Link::default();
    };

    let name = anchor.text().collect::<String>().trim().to_string();
    let url = anchor
        .value()
        .attr("href")
        .filter(|href| !href.is_empty())
        .map(str::to_string);
    Link { name, url }
}

fn cell_date(selectors: &RowSelectors, cell: ElementRef<'_>) -> Option<String> {
    cell.select(&selectors.date)
        .next()?
        .value()
        .attr("aria-label")
        .filter(|label| !label.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "<tr><th>Character</th><th>Guild</th><th>Raid</th><th>Realm</th><th>Ilvl</th><th>Date</th></tr>";

    fn row(character: &str, guild: &str, realm: &str, date: &str) -> String {
        format!(
            "<tr><td>{character}</td><td>{guild}</td><td>ignored</td><td>{realm}</td><td>480</td><td>{date}</td></tr>"
        )
    }

    #[test]
    fn skips_header_and_maps_columns_by_position() {
        let html = format!(
            "<tbody>{HEADER}{}</tbody>",
            row(
                "<a href=\"/character/eu/sanguino/kaelis\"> Kaelis </a>",
                "<a href=\"/guild/eu/sanguino/vanguard\">Vanguard</a>",
                "<a href=\"/gearscore/eu/sanguino\">Sanguino</a>",
                "<span aria-label=\"Oct 16, 2026 10:00\">5 min ago</span>",
            )
        );

        let entries = extract_entries(&html).unwrap();
        assert_eq!(entries.len(), 1);
        let e = &entries[0];
        assert_eq!(e.character.name, "Kaelis");
        assert_eq!(e.character.url.as_deref(), Some("/character/eu/sanguino/kaelis"));
        assert_eq!(e.guild.name, "Vanguard");
        assert_eq!(e.realm.name, "Sanguino");
        assert_eq!(e.realm.url.as_deref(), Some("/gearscore/eu/sanguino"));
        assert_eq!(e.date.as_deref(), Some("Oct 16, 2026 10:00"));
    }

    #[test]
    fn missing_links_yield_empty_name_and_no_url() {
        let html = format!(
            "{HEADER}{}",
            row("<a href=\"/c\">Solo</a>", "no link here", "", "<span>now</span>")
        );

        let entries = extract_entries(&html).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].character.name, "Solo");
        assert_eq!(entries[0].guild, Link::default());
        assert_eq!(entries[0].realm, Link::default());
        assert_eq!(entries[0].date, None);
    }

    #[test]
    fn short_rows_do_not_fail_extraction() {
        let html = format!("{HEADER}<tr><td><a>NoHref</a></td></tr>");

        let entries = extract_entries(&html).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].character, Link::new("NoHref", None));
        assert_eq!(entries[0].date, None);
    }

    #[test]
    fn keeps_document_order() {
        let html = format!(
            "{HEADER}{}{}",
            row("<a href=\"/1\">First</a>", "", "", "<span aria-label=\"d1\"></span>"),
            row("<a href=\"/2\">Second</a>", "", "", "<span aria-label=\"d2\"></span>"),
        );

        let names: Vec<_> = extract_entries(&html)
            .unwrap()
            .into_iter()
            .map(|e| e.character.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn accepts_a_complete_table_element() {
        let html = format!(
            "<table class=\"rating\">{HEADER}{}</table>",
            row("<a href=\"/1\">Whole</a>", "", "", "")
        );

        let entries = extract_entries(&html).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].character.name, "Whole");
    }

    #[test]
    fn header_only_table_is_empty() {
        assert!(extract_entries(HEADER).unwrap().is_empty());
        assert!(extract_entries("").unwrap().is_empty());
    }
}
