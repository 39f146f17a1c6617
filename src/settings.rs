use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_SETTINGS_FILE: &str = "tocnum.json";

/// Batch-processing settings. The numbering itself is not configurable.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// File extensions treated as pages, without the dot.
    pub extensions: Vec<String>,

    /// Directory names skipped while walking a site.
    pub exclude_dirs: Vec<String>,

    /// Copy pages that need no changes when writing to an output directory.
    pub copy_unchanged: bool,

    #[serde(skip)]
    file_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::ephemeral()
    }
}

impl Settings {
    pub fn ephemeral() -> Self {
        Self {
            extensions: vec!["html".to_string(), "htm".to_string()],
            exclude_dirs: vec![
                "_static".to_string(),
                "_sources".to_string(),
                "_images".to_string(),
            ],
            copy_unchanged: true,
            file_path: None,
        }
    }

    pub fn with_file(file_path: &str) -> Self {
        Self {
            file_path: Some(file_path.to_string()),
            ..Self::ephemeral()
        }
    }

    pub fn load_or_ephemeral(file_path: Option<&str>) -> Self {
        match file_path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                log::error!("Failed to load settings from {path}: {e}");
                Self::with_file(path)
            }),
            None => Self::ephemeral(),
        }
    }

    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let path = Path::new(file_path);
        if path.exists() {
            let content = fs::read_to_string(path)?;

            match serde_json::from_str::<Self>(&content) {
                Ok(mut settings) => {
                    settings.file_path = Some(file_path.to_string());
                    Ok(settings)
                }
                Err(e) => {
                    log::error!("Failed to parse settings file: {e}");
                    Err(anyhow::anyhow!("Failed to parse settings: {}", e))
                }
            }
        } else {
            Ok(Self::with_file(file_path))
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        self.file_path.as_deref()
    }

    pub fn is_page(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|dir| dir == name)
    }
}
