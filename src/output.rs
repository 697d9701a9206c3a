//! Output types returned by the document assembler.

use crate::pipeline::plan::PageSpec;
use serde::{Deserialize, Serialize};

/// A rendered order document plus what went into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOutput {
    /// The complete PDF. Left out of the JSON form.
    #[serde(skip)]
    pub pdf: Vec<u8>,

    /// The dynamic pages that were planned and rendered, in order.
    pub pages: Vec<PageSpec>,

    pub stats: RenderStats,
}

/// Summary numbers for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Logical pages: the instructions page plus every planned page.
    pub planned_pages: usize,

    /// Pages in the PDF. Larger than `planned_pages` when long text
    /// continued onto extra pages.
    pub physical_pages: usize,

    /// Size of the finished document in bytes.
    pub bytes: usize,

    /// Wall-clock render time, including serialisation.
    pub duration_ms: u64,
}
