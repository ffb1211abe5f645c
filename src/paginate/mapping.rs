//! Per-page column mapping onto the canonical header.

use csv_async::ByteRecord;
use thiserror::Error;

/// Canonical columns absent from a page header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page header is missing canonical column(s): {}", .missing.join(", "))]
pub struct MissingColumns {
    /// Canonical column names not found in the page header, in canonical order.
    pub missing: Vec<String>,
}

/// Maps canonical column positions to positions in one page's rows.
///
/// `indices()[i]` is the field of a page row that belongs in canonical
/// column `i`. Recomputed for every page, since the server may reorder
/// columns between requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    indices: Vec<usize>,
    identity: bool,
}

impl ColumnMapping {
    /// Mapping for a page whose header is the canonical header itself.
    #[must_use]
    pub fn identity(width: usize) -> Self {
        Self {
            indices: (0..width).collect(),
            identity: true,
        }
    }

    /// Locates every canonical column in `page_header`.
    ///
    /// When a name occurs more than once in the page header the first
    /// occurrence wins. Page columns unknown to the canonical header are
    /// not projected.
    ///
    /// # Errors
    ///
    /// Returns [`MissingColumns`] listing every canonical name the page lacks.
    pub fn resolve(canonical: &ByteRecord, page_header: &ByteRecord) -> Result<Self, MissingColumns> {
        let mut indices = Vec::with_capacity(canonical.len());
        let mut missing = Vec::new();

        for name in canonical {
            match page_header.iter().position(|field| field == name) {
                Some(index) => indices.push(index),
                None => missing.push(String::from_utf8_lossy(name).into_owned()),
            }
        }

        if !missing.is_empty() {
            return Err(MissingColumns { missing });
        }

        let identity = page_header.len() == indices.len()
            && indices.iter().enumerate().all(|(pos, &index)| pos == index);
        Ok(Self { indices, identity })
    }

    /// Page-row field index for each canonical column.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// True when page rows are already in canonical order and width.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Writes `row` into `out` in canonical column order.
    ///
    /// `out` is cleared first so one buffer can be reused across rows.
    pub fn apply_into(&self, row: &ByteRecord, out: &mut ByteRecord) {
        out.clear();
        for &index in &self.indices {
            out.push_field(row.get(index).unwrap_or_default());
        }
    }
}
