use crate::error::{Result, TocError};
use crate::mini_toc::{MiniTocError, MiniTocOutcome, rebuild_mini_toc};
use crate::numbering::NumberingTable;
use crate::parsing::dom;
use crate::renumber::{RenumberReport, renumber_document};
use log::{debug, warn};
use markup5ever_rcdom::RcDom;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageReport {
    pub renumber: RenumberReport,
    pub mini_toc: std::result::Result<MiniTocOutcome, MiniTocError>,
}

impl PageReport {
    pub fn changed(&self) -> bool {
        self.renumber.rewritten > 0 || self.mini_toc_installed()
    }

    pub fn mini_toc_installed(&self) -> bool {
        matches!(self.mini_toc, Ok(MiniTocOutcome::Installed { .. }))
    }
}

/// Applies the page-load transformation: renumber first, then rebuild the
/// mini TOC from the renumbered primary TOC.
#[derive(Debug, Default, Clone, Copy)]
pub struct PageTransformer {
    table: NumberingTable,
}

impl PageTransformer {
    pub fn new(table: NumberingTable) -> Self {
        Self { table }
    }

    pub fn transform_document(&self, dom: &RcDom) -> PageReport {
        let renumber = renumber_document(&dom.document, &self.table);
        debug!(
            "Renumbered {} of {} labels ({} out of range)",
            renumber.rewritten, renumber.examined, renumber.out_of_range
        );

        let mini_toc = rebuild_mini_toc(&dom.document, &self.table);
        if let Err(e) = &mini_toc {
            warn!("Skipping mini TOC: {e}");
        }

        PageReport { renumber, mini_toc }
    }

    /// Parses, transforms and re-serializes a whole page.
    pub fn transform_html(&self, html: &str) -> Result<(String, PageReport)> {
        let dom = dom::parse_html(html);
        let report = self.transform_document(&dom);
        let output = dom::serialize_document(&dom).map_err(TocError::Serialize)?;
        Ok((output, report))
    }
}
