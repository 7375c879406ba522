use std::{collections::HashMap, rc::Rc};

use sha2::{Digest, Sha256};
use tracing::trace;

use crate::{diagnostics::SpecificationError, template::Template};

/// Shares built templates between loads of the same specification text.
///
/// Entries are keyed by the SHA-256 digest of the raw text, so two loads of
/// byte-identical documents return the same `Rc<Template>`.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<[u8; 32], Rc<Template>>,
    hits: usize,
    misses: usize,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached template for `source`, building it on a miss.
    /// A failed build is not cached.
    pub fn load(&mut self, source: &str) -> Result<Rc<Template>, SpecificationError> {
        let key = hash_bytes(source.as_bytes());
        if let Some(template) = self.entries.get(&key) {
            self.hits += 1;
            trace!(key = %to_hex(&key), "template cache hit");
            return Ok(Rc::clone(template));
        }
        self.misses += 1;
        let template = Template::from_json(source)?;
        trace!(key = %to_hex(&key), "template cache miss");
        self.entries.insert(key, Rc::clone(&template));
        Ok(template)
    }

    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(&hash_bytes(source.as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub fn hash_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

fn to_hex(bytes: &[u8; 32]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
