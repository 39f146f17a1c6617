use crate::error::{Result, TocError};
use crate::page::{PageReport, PageTransformer};
use crate::settings::Settings;
use log::{debug, error, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: TocError,
}

#[derive(Debug, Default)]
pub struct SiteReport {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub labels_rewritten: usize,
    pub mini_tocs_installed: usize,
    pub failures: Vec<FileFailure>,
}

impl SiteReport {
    fn record(&mut self, page: &PageReport) {
        self.files_scanned += 1;
        if page.changed() {
            self.files_changed += 1;
        }
        self.labels_rewritten += page.renumber.rewritten;
        if page.mini_toc_installed() {
            self.mini_tocs_installed += 1;
        }
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for SiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} pages scanned, {} changed, {} labels renumbered, {} mini TOCs rebuilt, {} failed",
            self.files_scanned,
            self.files_changed,
            self.labels_rewritten,
            self.mini_tocs_installed,
            self.failures.len()
        )
    }
}

pub struct SiteProcessor {
    settings: Settings,
    transformer: PageTransformer,
    dry_run: bool,
}

impl SiteProcessor {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            transformer: PageTransformer::default(),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Processes a page or a site directory. Pages are rewritten in place
    /// unless `output` names a directory to mirror them into.
    pub fn process_path(&self, input: &Path, output: Option<&Path>) -> Result<SiteReport> {
        let metadata = fs::metadata(input).map_err(|e| TocError::io(input, e))?;
        let mut report = SiteReport::default();

        if metadata.is_dir() {
            info!("Processing site directory {}", input.display());
            for page in self.discover_pages(input) {
                let target = match output {
                    Some(out) => Some(out.join(page.strip_prefix(input).unwrap_or(&page))),
                    None => None,
                };
                self.process_page_into(&page, target.as_deref(), &mut report);
            }
        } else {
            let target = output.map(|out| match input.file_name() {
                Some(name) => out.join(name),
                None => out.to_path_buf(),
            });
            self.process_page_into(input, target.as_deref(), &mut report);
        }

        info!("{report}");
        Ok(report)
    }

    /// Pages under `root` in a stable order, skipping excluded directories.
    pub fn discover_pages(&self, root: &Path) -> Vec<PathBuf> {
        let mut pages: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| self.settings.is_excluded_dir(name))
            })
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    error!("Failed to walk {}: {e}", root.display());
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.settings.is_page(entry.path()))
            .map(|entry| entry.into_path())
            .collect();
        pages.sort();
        pages
    }

    fn process_page_into(&self, page: &Path, target: Option<&Path>, report: &mut SiteReport) {
        match self.process_page(page, target) {
            Ok(page_report) => report.record(&page_report),
            Err(e) => {
                error!("Failed to process {}: {e}", page.display());
                report.failures.push(FileFailure {
                    path: page.to_path_buf(),
                    error: e,
                });
            }
        }
    }

    fn process_page(&self, page: &Path, target: Option<&Path>) -> Result<PageReport> {
        let html = fs::read_to_string(page).map_err(|e| TocError::io(page, e))?;
        let (output, page_report) = self.transformer.transform_html(&html)?;
        debug!(
            "{}: {} labels renumbered, mini TOC {:?}",
            page.display(),
            page_report.renumber.rewritten,
            page_report.mini_toc
        );

        if self.dry_run {
            return Ok(page_report);
        }

        match target {
            Some(target) => {
                if page_report.changed() {
                    write_file(target, &output)?;
                } else if self.settings.copy_unchanged {
                    write_file(target, &html)?;
                }
            }
            None if page_report.changed() => write_file(page, &output)?,
            None => {}
        }
        Ok(page_report)
    }
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| TocError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| TocError::io(path, e))
}
