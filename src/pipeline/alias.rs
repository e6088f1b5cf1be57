//! SKU alias normalization.
//!
//! The feed spells the same SKU several ways ("一年会员" vs "1年会员",
//! first-period variants of subscription SKUs, etc.). Every consumer must see
//! one canonical label per SKU, so the mapping lives in an injectable table
//! rather than being hard-coded at each call site.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Versioned raw-label -> canonical-label mapping.
///
/// `canonical` is a total function: labels without an entry pass through
/// unchanged, so unknown SKUs become their own canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasTable {
    pub version: u32,
    aliases: BTreeMap<String, String>,
}

impl AliasTable {
    /// The alias table shipped with the original membership feed.
    pub fn builtin() -> Self {
        let pairs = [
            ("1个月会员", "1个月会员"),
            ("一个月会员", "1个月会员"),
            ("1年会员", "1年会员"),
            ("一年会员", "1年会员"),
            ("2年会员", "2年会员"),
            ("两年会员", "2年会员"),
            ("其他活动兑换", "其他活动兑换"),
            ("抽奖兑换", "抽奖兑换"),
            ("花瓣兑换", "花瓣兑换"),
            ("连续包季", "连续包季"),
            ("连续包年", "连续包年"),
            ("连续包年首年", "连续包年"),
            ("连续包月", "连续包月"),
            ("连续包月首月", "连续包月"),
        ];
        Self {
            version: 1,
            aliases: pairs
                .into_iter()
                .map(|(raw, canonical)| (raw.to_string(), canonical.to_string()))
                .collect(),
        }
    }

    /// Load a custom table from JSON (`{"version": N, "aliases": {...}}`).
    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| {
            AppError::input(format!("Failed to open alias table '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(file).map_err(|e| {
            AppError::input(format!("Invalid alias table '{}': {e}", path.display()))
        })
    }

    /// Resolve a raw SKU label to its canonical form (identity fallback).
    pub fn canonical<'a>(&'a self, raw: &'a str) -> &'a str {
        self.aliases.get(raw).map(String::as_str).unwrap_or(raw)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_collapse_to_one_canonical_label() {
        let table = AliasTable::builtin();
        assert_eq!(table.canonical("一年会员"), "1年会员");
        assert_eq!(table.canonical("1年会员"), "1年会员");
        assert_eq!(table.canonical("连续包年首年"), "连续包年");
        assert_eq!(table.canonical("连续包月首月"), "连续包月");
        assert_eq!(table.canonical("两年会员"), "2年会员");
    }

    #[test]
    fn unknown_labels_pass_through_unchanged() {
        let table = AliasTable::builtin();
        assert_eq!(table.canonical("未知SKU"), "未知SKU");
        assert_eq!(table.canonical(""), "");
    }

    #[test]
    fn json_round_trips_with_version() {
        let table = AliasTable::builtin();
        let json = serde_json::to_string(&table).unwrap();
        let back: AliasTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, 1);
        assert_eq!(back.canonical("一个月会员"), "1个月会员");
    }

    #[test]
    fn custom_table_loads_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.json");
        std::fs::write(
            &path,
            r#"{"version": 7, "aliases": {"年费VIP": "1年会员"}}"#,
        )
        .unwrap();

        let table = AliasTable::from_json_file(&path).unwrap();
        assert_eq!(table.version, 7);
        assert_eq!(table.len(), 1);
        assert_eq!(table.canonical("年费VIP"), "1年会员");
        // Built-in synonyms are replaced, not merged.
        assert_eq!(table.canonical("一年会员"), "一年会员");
    }

    #[test]
    fn malformed_alias_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = AliasTable::from_json_file(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);

        let missing = AliasTable::from_json_file(&dir.path().join("absent.json")).unwrap_err();
        assert_eq!(missing.exit_code(), 2);
    }
}
