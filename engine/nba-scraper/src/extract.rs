//! # Entity Extraction
//!
//! Turns raw markup into ordered field-sets. Two schemas cover every page the
//! pipeline reads:
//!
//! - [`RowSchema`]: header cells plus rows located by a positional index attribute
//!   (`tr[data-idx]`), scanned up to a fixed bound.
//! - [`LabeledRowSchema`]: inside one card, the single row whose first cell carries
//!   a fixed label, zipped with the card's column headers.
//!
//! A missing section, row or card is an ordinary outcome: extraction returns an
//! empty `Vec` or `None`, never an error.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

use crate::error::{Result, ScraperError};
use crate::types::FieldSet;

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| ScraperError::Selector(css.to_string()))
}

/// Whitespace-normalised text of an element, skipping any subtree rooted at `excluded_tag`
pub fn element_text(element: ElementRef<'_>, excluded_tag: Option<&str>) -> String {
    let mut raw = String::new();
    collect_text(element, excluded_tag, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, excluded_tag: Option<&str>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if Some(el.name()) == excluded_tag => {}
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_text(child_el, excluded_tag, out);
                }
            }
            _ => {}
        }
    }
}

/// Zip positional headers with positional values; columns with a blank header are dropped
fn zip_fields(headers: &[String], values: Vec<String>) -> FieldSet {
    headers
        .iter()
        .zip(values)
        .filter(|(header, _)| !header.is_empty())
        .map(|(header, value)| (header.clone(), value))
        .collect()
}

/// Header cells + index-attributed rows
#[derive(Debug, Clone)]
pub struct RowSchema {
    header: Selector,
    row: Selector,
    cell: Selector,
    index_attr: String,
    max_rows: usize,
    excluded_tag: Option<String>,
}

impl RowSchema {
    /// Schema of the roster table: `th.Table__TH` headers, `tr[data-idx]` rows, `td` cells,
    /// with the jersey-number `<span>` left out of the cell text.
    pub fn roster(max_rows: usize) -> Result<Self> {
        Ok(Self {
            header: selector("th.Table__TH")?,
            row: selector("tr[data-idx]")?,
            cell: selector("td")?,
            index_attr: "data-idx".to_string(),
            max_rows,
            excluded_tag: Some("span".to_string()),
        })
    }

    /// Header texts in document order, blanks included to keep positions aligned
    fn headers(&self, document: &Html) -> Vec<String> {
        document.select(&self.header).map(|th| element_text(th, None)).collect()
    }

    /// First row at each index in `[0, max_rows)`, ordered by index.
    /// Indices with no matching row are simply absent.
    fn rows<'a>(&self, document: &'a Html) -> Vec<(usize, ElementRef<'a>)> {
        let mut by_index = BTreeMap::new();
        for row in document.select(&self.row) {
            let index =
                row.value().attr(&self.index_attr).and_then(|v| v.trim().parse::<usize>().ok());
            if let Some(index) = index.filter(|i| *i < self.max_rows) {
                by_index.entry(index).or_insert(row);
            }
        }
        by_index.into_iter().collect()
    }

    /// Cell texts of one row zipped with the headers
    fn field_set(&self, headers: &[String], row: ElementRef<'_>) -> FieldSet {
        let values = row
            .select(&self.cell)
            .map(|td| element_text(td, self.excluded_tag.as_deref()))
            .collect();
        zip_fields(headers, values)
    }

    /// One entry per matched, non-empty row, in index order
    pub fn extract<'a>(&self, document: &'a Html) -> Vec<ExtractedRow<'a>> {
        let headers = self.headers(document);
        self.rows(document)
            .into_iter()
            .map(|(index, element)| ExtractedRow {
                index,
                element,
                fields: self.field_set(&headers, element),
            })
            .filter(|row| !row.fields.is_empty())
            .collect()
    }
}

/// A table row matched by a [`RowSchema`]
#[derive(Debug, Clone)]
pub struct ExtractedRow<'a> {
    pub index: usize,
    pub element: ElementRef<'a>,
    pub fields: FieldSet,
}

/// One labelled row inside a bounded card
#[derive(Debug, Clone)]
pub struct LabeledRowSchema {
    card: Selector,
    header: Selector,
    row: Selector,
    cell: Selector,
    index_attr: String,
    label: String,
}

impl LabeledRowSchema {
    pub fn new(card_css: &str, label: &str) -> Result<Self> {
        Ok(Self {
            card: selector(card_css)?,
            header: selector("th")?,
            row: selector("tr")?,
            cell: selector("td")?,
            index_attr: "data-idx".to_string(),
            label: label.to_string(),
        })
    }

    /// The labelled row as a field-set, or `None` when the card or the row is missing.
    ///
    /// Cards split across a fixed label table and a scrolling value table repeat the
    /// row's `data-idx` in both; every row sharing that index contributes its cells in order.
    pub fn extract_document(&self, document: &Html) -> Option<FieldSet> {
        let card = document.select(&self.card).next()?;

        let target = card.select(&self.row).find(|tr| {
            tr.select(&self.cell).next().map(|td| element_text(td, None)).as_deref()
                == Some(self.label.as_str())
        })?;

        let headers: Vec<String> =
            card.select(&self.header).map(|th| element_text(th, None)).collect();

        let rows: Vec<ElementRef<'_>> = match target.value().attr(&self.index_attr) {
            Some(index) => card
                .select(&self.row)
                .filter(|tr| tr.value().attr(&self.index_attr) == Some(index))
                .collect(),
            None => vec![target],
        };

        let values = rows
            .iter()
            .flat_map(|tr| tr.select(&self.cell).map(|td| element_text(td, None)))
            .collect();

        let fields = zip_fields(&headers, values);
        (!fields.is_empty()).then_some(fields)
    }

    pub fn extract(&self, markup: &str) -> Option<FieldSet> {
        self.extract_document(&Html::parse_document(markup))
    }
}
