//! Plain-text rendering of catalog listings.

use papercat_core::models::Record;

/// Tags per row in the `tags` grid.
pub const TAG_COLUMNS: usize = 8;

/// Prints position, name, and tags in aligned columns.
pub fn print_listing(rows: &[(usize, &Record)]) {
    if rows.is_empty() {
        println!("no matching entries");
        return;
    }
    let name_width = rows.iter().map(|(_, r)| r.name().len()).max().unwrap_or(0);
    for (position, record) in rows {
        println!(
            "{position:>4}  {name:<name_width$}  [{tags}]",
            name = record.name(),
            tags = record.tags().join(",")
        );
    }
}

/// Prints the tag inventory in rows of eight.
pub fn print_tag_grid(tags: &[String]) {
    if tags.is_empty() {
        println!("no tags");
        return;
    }
    println!();
    for chunk in tags.chunks(TAG_COLUMNS) {
        println!("{}", chunk.join("  "));
    }
    println!();
}
