pub mod cli;
pub mod error;
pub mod mini_toc;
pub mod numbering;
pub mod page;
pub mod panic_handler;
pub mod parsing;
pub mod renumber;
pub mod settings;
pub mod site;

pub use error::{Result, TocError};
pub use numbering::NumberingTable;
pub use page::{PageReport, PageTransformer};
pub use site::{SiteProcessor, SiteReport};
