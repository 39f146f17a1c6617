//! Condensed table of contents for the landing page.
//!
//! The primary TOC lists sixteen visible units: ten main units, five
//! practice units and the stories unit. The mini TOC shows the main units
//! and the stories unit as "Unit ..." entries and folds the practice units
//! into a single row.

use crate::numbering::NumberingTable;
use crate::parsing::dom;
use crate::parsing::selector::Selector;
use log::{debug, info};
use markup5ever_rcdom::Handle;
use once_cell::sync::Lazy;
use thiserror::Error;

pub const PRIMARY_TOC_UNITS: &str = "#table-of-contents .toctree-wrapper > ul > li";
pub const PLACEHOLDER_ID: &str = "ap-csa-java-course";

pub const MAIN_UNITS: usize = 10;
pub const PRACTICE_UNITS: usize = 5;
/// Main units, practice units and the stories unit. Anything after these is
/// hidden from the mini TOC.
pub const REQUIRED_UNITS: usize = MAIN_UNITS + PRACTICE_UNITS + 1;

const UNIT_PREFIX: &str = "Unit ";
const PRACTICE_PREFIX: &str = "Practice units: ";
const PRACTICE_SEPARATOR: &str = ", ";

static UNITS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(PRIMARY_TOC_UNITS).expect("primary TOC selector is valid"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MiniTocError {
    #[error("primary TOC has {found} units, need at least {}", REQUIRED_UNITS)]
    NotEnoughUnits { found: usize },

    #[error("primary TOC unit {index} has no link")]
    MissingLink { index: usize },

    #[error("numbering table has no label at offset {index}")]
    MissingLabel { index: usize },

    #[error("no element with id {:?} to hold the mini TOC", PLACEHOLDER_ID)]
    MissingPlaceholder,

    #[error("element {:?} has no list to replace", PLACEHOLDER_ID)]
    MissingPlaceholderList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiniTocOutcome {
    /// The page has no primary TOC.
    NotApplicable,
    Installed { entries: usize },
}

/// Top-level items of the primary TOC, in order.
pub fn collect_units(root: &Handle) -> Vec<Handle> {
    UNITS_SELECTOR.query_all(root)
}

fn unit_link(unit: &Handle, index: usize) -> Result<Handle, MiniTocError> {
    dom::first_descendant_element(unit, "a").ok_or(MiniTocError::MissingLink { index })
}

fn unit_entry(unit: &Handle, index: usize) -> Result<Handle, MiniTocError> {
    let entry = dom::shallow_clone(unit);
    let link = dom::deep_clone(&unit_link(unit, index)?);
    dom::prepend_text(&link, UNIT_PREFIX);
    dom::append_child(&entry, link);
    Ok(entry)
}

fn practice_entry(
    practice: &[Handle],
    first_index: usize,
    table: &NumberingTable,
) -> Result<Handle, MiniTocError> {
    let entry = dom::shallow_clone(&practice[0]);
    dom::append_text(&entry, PRACTICE_PREFIX);
    for (i, unit) in practice.iter().enumerate() {
        let index = first_index + i;
        let label = table
            .label_at_offset(index)
            .ok_or(MiniTocError::MissingLabel { index })?;
        let link = dom::deep_clone(&unit_link(unit, index)?);
        dom::set_text_content(&link, label);
        dom::append_child(&entry, link);
        if i + 1 < practice.len() {
            dom::append_text(&entry, PRACTICE_SEPARATOR);
        }
    }
    Ok(entry)
}

/// Builds the mini TOC list from the primary TOC units. The units are only
/// cloned, never modified.
pub fn build_mini_toc(units: &[Handle], table: &NumberingTable) -> Result<Handle, MiniTocError> {
    if units.len() < REQUIRED_UNITS {
        return Err(MiniTocError::NotEnoughUnits { found: units.len() });
    }
    if units.len() > REQUIRED_UNITS {
        debug!(
            "Ignoring {} hidden units after the stories unit",
            units.len() - REQUIRED_UNITS
        );
    }

    let list = dom::new_list();

    for (index, unit) in units[..MAIN_UNITS].iter().enumerate() {
        dom::append_child(&list, unit_entry(unit, index)?);
    }

    let practice = &units[MAIN_UNITS..MAIN_UNITS + PRACTICE_UNITS];
    dom::append_child(&list, practice_entry(practice, MAIN_UNITS, table)?);

    let stories = REQUIRED_UNITS - 1;
    dom::append_child(&list, unit_entry(&units[stories], stories)?);

    Ok(list)
}

/// Swaps the placeholder's list for `mini`.
pub fn install_mini_toc(root: &Handle, mini: Handle) -> Result<(), MiniTocError> {
    let container =
        dom::find_element_by_id(root, PLACEHOLDER_ID).ok_or(MiniTocError::MissingPlaceholder)?;
    let placeholder = dom::first_descendant_element(&container, "ul")
        .ok_or(MiniTocError::MissingPlaceholderList)?;
    if dom::replace_node(&placeholder, mini) {
        Ok(())
    } else {
        Err(MiniTocError::MissingPlaceholderList)
    }
}

/// Rebuilds the mini TOC when the page carries the primary TOC.
pub fn rebuild_mini_toc(
    root: &Handle,
    table: &NumberingTable,
) -> Result<MiniTocOutcome, MiniTocError> {
    let units = collect_units(root);
    if units.is_empty() {
        return Ok(MiniTocOutcome::NotApplicable);
    }

    let mini = build_mini_toc(&units, table)?;
    let entries = mini.children.borrow().len();
    install_mini_toc(root, mini)?;
    info!("Installed mini TOC with {entries} entries");
    Ok(MiniTocOutcome::Installed { entries })
}
