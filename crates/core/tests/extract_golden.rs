use lfgwatch_core::diff::compute_new;
use lfgwatch_core::domain::entry::Entry;
use lfgwatch_core::scrape::extract::extract_entries;

const TABLE_HTML: &str = include_str!("fixtures/rating_table.html");
const TABLE_JSON: &str = include_str!("fixtures/rating_table.json");

fn golden() -> Vec<Entry> {
    serde_json::from_str(TABLE_JSON).expect("golden fixture must parse")
}

#[test]
fn saved_table_matches_golden_entries() {
    let entries = extract_entries(TABLE_HTML).unwrap();
    assert_eq!(entries, golden());
}

#[test]
fn golden_entries_serialize_to_the_snapshot_format() {
    let entries = extract_entries(TABLE_HTML).unwrap();
    let mut text = serde_json::to_string_pretty(&entries).unwrap();
    text.push('\n');
    assert_eq!(text, TABLE_JSON);
}

#[test]
fn rescraping_the_same_table_finds_nothing_new() {
    let entries = extract_entries(TABLE_HTML).unwrap();
    assert!(compute_new(&entries, &entries).is_empty());
}

#[test]
fn a_newer_listing_on_top_is_the_only_new_entry() {
    let previous = golden();
    let fresh = r#"<tr><th>h</th></tr>
        <tr>
          <td><a href="/character/eu/sanguino/Ysera">Ysera</a></td>
          <td></td><td></td>
          <td><a href="/gearscore/eu/sanguino">Sanguino</a></td>
          <td></td>
          <td><span aria-label="Oct 16, 2026 10:05">now</span></td>
        </tr>"#;
    let mut current = extract_entries(fresh).unwrap();
    current.extend(previous.iter().cloned());

    let new = compute_new(&previous, &current);
    assert_eq!(new.len(), 1);
    assert_eq!(new[0].character.name, "Ysera");
}
