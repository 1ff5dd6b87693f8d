//! Import registry for the emitted module
//!
//! Components request the symbols they need while translating; the
//! registry deduplicates and renders exactly what was requested. Modules
//! appear in first-request order and so do symbols within a module, which
//! keeps emission stable across runs.

use indexmap::IndexMap;

/// Names that never need an import in the emission target.
const BUILTINS: &[&str] = &["int", "str", "float", "bool", "None"];

/// Tracks which symbols the generated module imports from which modules.
#[derive(Debug, Clone, Default)]
pub struct ImportRegistry {
    modules: IndexMap<&'static str, Vec<&'static str>>,
}

impl ImportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a symbol from `typing`. Builtins are skipped.
    pub fn require_typing(&mut self, symbol: &'static str) {
        if BUILTINS.contains(&symbol) {
            return;
        }
        self.add("typing", &[symbol]);
    }

    /// Require the `Enum` base class.
    pub fn require_enum_base(&mut self) {
        self.add("enum", &["Enum"]);
    }

    /// Require the dataclass machinery (`dataclass` and `field`).
    pub fn require_dataclass(&mut self) {
        self.add("dataclasses", &["dataclass", "field"]);
    }

    /// Require the JSON serialization mixin; implies the dataclass import.
    pub fn require_json_mixin(&mut self) {
        self.require_dataclass();
        self.add("fastclasses_json", &["dataclass_json", "JSONMixin"]);
    }

    fn add(&mut self, module: &'static str, symbols: &[&'static str]) {
        let names = self.modules.entry(module).or_default();
        for symbol in symbols {
            if !names.contains(symbol) {
                names.push(symbol);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Render one `from <module> import <symbols>` line per module.
    pub fn render_lines(&self) -> Vec<String> {
        self.modules
            .iter()
            .map(|(module, symbols)| format!("from {} import {}", module, symbols.join(", ")))
            .collect()
    }
}
