use crate::numbering::NumberingTable;
use crate::parsing::dom;
use crate::parsing::selector::{Selector, SelectorError};
use log::{debug, trace};
use markup5ever_rcdom::Handle;
use once_cell::sync::Lazy;
use regex::Regex;

/// Elements whose text starts with a generated unit number. Add a selector
/// here when generated numbers show up somewhere new.
pub const RENUMBER_SELECTORS: [&str; 3] = [
    // main TOC
    ".toctree-wrapper ul li a",
    // section numbers inside chapters
    "span.section-number",
    // dropdown menu
    "li.dropdown.globaltoc-container a",
];

static CHAPTER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+)(\.| )(.*)$").expect("chapter number pattern is valid"));

pub static RENUMBER_TARGETS: Lazy<Vec<Selector>> = Lazy::new(|| {
    compile_selectors(&RENUMBER_SELECTORS).expect("built-in renumber selectors are valid")
});

pub fn compile_selectors(selectors: &[&str]) -> Result<Vec<Selector>, SelectorError> {
    selectors.iter().map(|s| Selector::parse(s)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    Rewritten,
    NoMatch,
    OutOfRange(usize),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenumberReport {
    pub examined: usize,
    pub rewritten: usize,
    pub unmatched: usize,
    pub out_of_range: usize,
}

impl RenumberReport {
    fn record(&mut self, outcome: Rewrite) {
        self.examined += 1;
        match outcome {
            Rewrite::Rewritten => self.rewritten += 1,
            Rewrite::NoMatch => self.unmatched += 1,
            Rewrite::OutOfRange(_) => self.out_of_range += 1,
        }
    }
}

fn classify(text: &str, table: &NumberingTable) -> Result<String, Rewrite> {
    let caps = CHAPTER_NUMBER.captures(text).ok_or(Rewrite::NoMatch)?;
    let digits = &caps[1];
    // too many digits to parse is as out of range as any other big number
    let position: usize = digits.parse().map_err(|_| Rewrite::OutOfRange(usize::MAX))?;
    let label = table
        .label(position)
        .ok_or(Rewrite::OutOfRange(position))?;
    Ok(format!("{label}{}{}", &caps[2], &caps[3]))
}

/// Replaces the leading unit number of `text` with its display label.
///
/// Returns `None` when the text does not start with a number followed by
/// `.` or a space, or when the table has no label for that number.
pub fn rewrite_label(text: &str, table: &NumberingTable) -> Option<String> {
    classify(text, table).ok()
}

/// The element's text as a reader sees it: runs of HTML whitespace collapse
/// to one space, leading whitespace is dropped, and trailing whitespace is
/// dropped when it holds a line break (source indentation). A lone trailing
/// space, as in `<span class="section-number">2.1. </span>`, is kept.
pub fn rendered_text(raw: &str) -> String {
    let body = raw.trim_ascii();
    let tail = &raw.trim_ascii_start()[body.len()..];
    let mut text = body.split_ascii_whitespace().collect::<Vec<_>>().join(" ");
    if !tail.is_empty() && !tail.contains(['\n', '\r']) {
        text.push(' ');
    }
    text
}

/// Rewrites the element's text in place. Elements that don't match are
/// left untouched, markup included.
pub fn renumber_element(node: &Handle, table: &NumberingTable) -> Rewrite {
    let text = rendered_text(&dom::text_content(node));
    match classify(&text, table) {
        Ok(new_text) => {
            trace!("Renumbered {text:?} -> {new_text:?}");
            dom::set_text_content(node, &new_text);
            Rewrite::Rewritten
        }
        Err(Rewrite::OutOfRange(position)) => {
            debug!("No display label for unit {position} in {text:?}");
            Rewrite::OutOfRange(position)
        }
        Err(other) => other,
    }
}

pub fn renumber_with(
    root: &Handle,
    selectors: &[Selector],
    table: &NumberingTable,
) -> RenumberReport {
    let mut report = RenumberReport::default();
    for selector in selectors {
        for node in selector.query_all(root) {
            report.record(renumber_element(&node, table));
        }
    }
    report
}

/// Runs every renumber selector, in order, against the document.
pub fn renumber_document(root: &Handle, table: &NumberingTable) -> RenumberReport {
    renumber_with(root, &RENUMBER_TARGETS, table)
}
