//! Demo Catalog Loader
//!
//! A catalog document bundles the fixture data the dashboard is seeded
//! from: the roster, the template catalog, and the form schemas, as one
//! YAML document. Every load validates the content and computes a
//! canonical hash of the **raw file bytes** — not a serde
//! re-serialization — so the same bytes always hash the same regardless
//! of serde_yaml version or map ordering quirks.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use appraisal_types::{Employee, EvaluationForm, WorkflowTemplate};

use crate::validate;

/// The fixture document: everything the store needs except a clock and
/// a seed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DemoCatalog {
    #[serde(default)]
    pub employees: Vec<Employee>,

    #[serde(default)]
    pub templates: Vec<WorkflowTemplate>,

    #[serde(default)]
    pub forms: Vec<EvaluationForm>,
}

/// Errors from catalog loading.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error loading catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in catalog '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid catalog '{path}': {issues}")]
    Invalid { path: String, issues: String },
}

/// Deterministic hex digest of the raw catalog bytes.
pub fn catalog_hash(raw_bytes: &[u8]) -> String {
    let hash = Sha256::digest(raw_bytes);
    format!("{:x}", hash)
}

/// Load and validate a catalog from raw YAML bytes.
///
/// Two-pass: hash the raw bytes first, then deserialize. Returns
/// `(catalog, hash)`.
pub fn load_catalog_from_bytes(raw_bytes: &[u8]) -> Result<(DemoCatalog, String), CatalogError> {
    load_named_catalog(raw_bytes, "<bytes>")
}

/// Load and validate a catalog from a YAML file.
pub fn load_catalog_from_file(path: &Path) -> Result<(DemoCatalog, String), CatalogError> {
    let raw_bytes = std::fs::read(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_named_catalog(&raw_bytes, &path.display().to_string())
}

/// Load all catalogs from a directory (non-recursive, `*.yaml`/`*.yml`),
/// sorted by file name for deterministic ordering.
pub fn load_catalogs_from_dir(dir: &Path) -> Result<Vec<(DemoCatalog, String)>, CatalogError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CatalogError::Io {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CatalogError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "yaml" || ext == "yml" {
                paths.push(path);
            }
        }
    }
    paths.sort();

    let mut catalogs = Vec::new();
    for path in paths {
        catalogs.push(load_catalog_from_file(&path)?);
    }
    Ok(catalogs)
}

fn load_named_catalog(raw_bytes: &[u8], name: &str) -> Result<(DemoCatalog, String), CatalogError> {
    let hash = catalog_hash(raw_bytes);
    let catalog: DemoCatalog =
        serde_yaml::from_slice(raw_bytes).map_err(|e| CatalogError::Parse {
            path: name.to_string(),
            source: e,
        })?;

    let mut issues = Vec::new();
    for template in &catalog.templates {
        issues.extend(validate::validate_template(template));
    }
    for form in &catalog.forms {
        issues.extend(validate::validate_form(form));
    }
    for employee in &catalog.employees {
        issues.extend(validate::validate_employee(employee));
    }
    if !issues.is_empty() {
        return Err(CatalogError::Invalid {
            path: name.to_string(),
            issues: validate::summarize(&issues),
        });
    }

    Ok((catalog, hash))
}
