//! Named, lazily populated LUT cache.

use crate::lut::{linear_lut, Lut};
use crate::Result;
use lazy_static::lazy_static;
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub const SIMPLE_CHARS: &str = " .'-:;!~*+em68g#WM@";
pub const SIMPLE_EDGES: [u8; 18] = [
    15, 25, 45, 60, 75, 90, 100, 115, 135, 155, 170, 185, 205, 220, 235, 245, 250, 253,
];
pub const BINARY_CHARS: &str = " @";
pub const BINARY_EDGES: [u8; 1] = [128];

/// Cache of LUTs keyed by uppercased name or palette string.
///
/// Entries are never evicted. A LUT is fully built before it is inserted,
/// so readers only ever see complete tables.
pub struct LutRegistry {
    luts: RwLock<HashMap<String, Arc<Lut>>>,
}

impl LutRegistry {
    /// Registry holding the `SIMPLE` and `BINARY` built-ins.
    pub fn new() -> Result<Self> {
        let registry = Self::empty();
        registry.insert("SIMPLE", Lut::new(SIMPLE_CHARS, &SIMPLE_EDGES)?);
        registry.insert("BINARY", Lut::new(BINARY_CHARS, &BINARY_EDGES)?);
        Ok(registry)
    }

    pub fn empty() -> Self {
        Self { luts: RwLock::new(HashMap::new()) }
    }

    /// Register a LUT under `name` (uppercased), replacing any previous entry.
    pub fn insert(&self, name: &str, lut: Lut) -> Arc<Lut> {
        let lut = Arc::new(lut);
        let mut luts = self.luts.write().unwrap_or_else(|e| e.into_inner());
        luts.insert(name.to_uppercase(), Arc::clone(&lut));
        lut
    }

    pub fn contains(&self, name: &str) -> bool {
        let luts = self.luts.read().unwrap_or_else(|e| e.into_inner());
        luts.contains_key(&name.to_uppercase())
    }

    /// Look up `name_or_palette`; unknown strings become a linear LUT over
    /// their own characters and are cached under the uppercased string.
    pub fn get(&self, name_or_palette: &str) -> Result<Arc<Lut>> {
        let key = name_or_palette.to_uppercase();
        {
            let luts = self.luts.read().unwrap_or_else(|e| e.into_inner());
            if let Some(lut) = luts.get(&key) {
                return Ok(Arc::clone(lut));
            }
        }

        let built = linear_lut(name_or_palette)?;
        let mut luts = self.luts.write().unwrap_or_else(|e| e.into_inner());
        // another caller may have won the race while we were building
        let lut = luts.entry(key).or_insert_with(|| {
            debug!("registered linear LUT for palette {:?}", name_or_palette);
            Arc::new(built)
        });
        Ok(Arc::clone(lut))
    }

    pub fn len(&self) -> usize {
        self.luts.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

lazy_static! {
    static ref GLOBAL: LutRegistry = LutRegistry::new()
        .expect("built-in LUT definitions are valid");
}

/// Process-wide registry.
pub fn global() -> &'static LutRegistry {
    &GLOBAL
}

/// Resolve a LUT through the process-wide registry.
pub fn get_lut(name_or_palette: &str) -> Result<Arc<Lut>> {
    global().get(name_or_palette)
}
