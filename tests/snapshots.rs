//! Snapshot tests — rendered report regression detection.

mod common;

use common::{book, sample_catalog};
use insta::{assert_json_snapshot, assert_snapshot};

use book_catalog::application::report::ReportService;
use book_catalog::domain::model::catalog::{BookPatch, Catalog};

// =============================================================================
// Text reports
// =============================================================================

#[test]
fn snapshot_catalog_listing() {
    let catalog = Catalog::from_books(vec![
        book("Emma", "Jane Austen", 12.0, 1815),
        book("Dune", "Frank Herbert", 25.0, 1965),
    ]);
    let out = ReportService::render_catalog(catalog.books());
    assert_snapshot!(out, @r###"
Book #1
Title: Emma
Author: Jane Austen
Price: $12.00
Year: 1815

Book #2
Title: Dune
Author: Frank Herbert
Price: $25.00
Year: 1965
"###);
}

#[test]
fn snapshot_author_listing() {
    let catalog = sample_catalog();
    let books = catalog.filter_by_author("austen");
    let out = ReportService::render_author_listing("austen", &books);
    assert_snapshot!(out, @r###"
Books by austen:

Book #1
Title: Emma
Price: $12.00
Year: 1815

Book #2
Title: Persuasion
Price: $9.00
Year: 1817
"###);
}

#[test]
fn snapshot_statistics() {
    let catalog = sample_catalog();
    let out = ReportService::render_statistics(catalog.statistics().as_ref());
    assert_snapshot!(out, @r###"
Total books: 4
Average price: $19.00
Oldest book: "Emma" (1815)
Most expensive book: "Emma" ($30.00)
"###);
}

#[test]
fn snapshot_edit_with_rejection() {
    let mut catalog = sample_catalog();
    let outcome = catalog
        .edit_by_title(
            "dune",
            BookPatch {
                title: Some("Dune Messiah".into()),
                year: Some("nineteen".into()),
                ..BookPatch::default()
            },
        )
        .unwrap();
    let out = ReportService::render_edit(&outcome);
    assert_snapshot!(out, @r###"
Invalid year, keeping current value (year is not a valid number: 'nineteen').
Book edited successfully.
Title: Dune Messiah
Author: Frank Herbert
Price: $25.00
Year: 1965
"###);
}

// =============================================================================
// Persisted format
// =============================================================================

#[test]
fn snapshot_persisted_json() {
    let catalog = Catalog::from_books(vec![book("Emma", "Jane Austen", 12.5, 1815)]);
    assert_json_snapshot!(catalog, @r###"
    [
      {
        "title": "Emma",
        "author": "Jane Austen",
        "price": 12.5,
        "year": 1815
      }
    ]
    "###);
}
