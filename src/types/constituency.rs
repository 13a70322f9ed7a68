use std::{collections::HashMap, sync::Arc};

use anyhow::{Result, ensure};
use polars::frame::DataFrame;

/// Stable key for a constituency.
/// Keep the original ONS code text (e.g. "E14000530") but avoid repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstCode(Arc<str>);

impl ConstCode {
    pub fn new(code: &str) -> Self { Self(Arc::from(code)) }

    #[inline] pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for ConstCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConstCode {
    fn from(code: &str) -> Self { Self::new(code) }
}

/// A single constituency, enumerated once from the post-stratification frame.
#[derive(Debug, Clone)]
pub struct Constituency {
    pub code: ConstCode,
    pub name: Option<Arc<str>>, // Common name
}

/// Registry of known constituencies with per-constituency contiguous indices.
#[derive(Debug, Default)]
pub struct ConstituencyIndex {
    pub index: HashMap<ConstCode, u32>, // Map between codes and contiguous indices.
    pub entries: Vec<Constituency>,
}

impl ConstituencyIndex {
    /// Enumerate constituencies from the frame's `const_code` / `const_name` columns,
    /// in first-appearance order.
    pub fn from_frame(frame: &DataFrame) -> Result<Self> {
        let codes = frame.column("const_code")?.str()?;
        let names = frame.column("const_name").ok().and_then(|c| c.str().ok());

        let mut this = Self::default();
        for i in 0..codes.len() {
            let Some(code) = codes.get(i) else { continue };
            let code = ConstCode::new(code);
            if this.index.contains_key(&code) { continue }

            let name = names.as_ref().and_then(|c| c.get(i)).map(Arc::from);
            this.index.insert(code.clone(), this.entries.len() as u32);
            this.entries.push(Constituency { code, name });
        }
        ensure!(!this.entries.is_empty(), "[types] frame contains no constituencies");
        Ok(this)
    }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    #[inline] pub fn contains(&self, code: &ConstCode) -> bool { self.index.contains_key(code) }

    /// Contiguous index of a code, if known.
    #[inline]
    pub fn position(&self, code: &ConstCode) -> Option<u32> {
        self.index.get(code).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constituency> + '_ {
        self.entries.iter()
    }
}
