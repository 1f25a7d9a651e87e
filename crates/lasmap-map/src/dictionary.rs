//! The alias dictionary: field names resolved to canonical base names.
//!
//! Every known field name has one entry. A mapped entry points at a base
//! name, an ignored entry points nowhere, and a base name always points at
//! itself. All keys are [`NameKey`]s; the spelling seen first is the one that
//! is kept for display.
//!
//! The dictionary upholds four invariants after every public call, including
//! calls that report failure:
//!
//! 1. every base name has a self-mapping entry;
//! 2. no base name is ignored;
//! 3. removing a base name removes every field that mapped to it;
//! 4. no field maps to a name that is not a base name.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use lasmap_model::{
    Classification, DictionaryRecord, DictionaryStats, NameKey, RecordStatus, clean_name,
    same_name,
};

use crate::error::{InvariantViolation, MapError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldEntry {
    /// Spelling of the first insertion.
    name: String,
    /// `None` means ignored.
    base: Option<NameKey>,
}

/// Bidirectional field-name / base-name mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasDictionary {
    fields: HashMap<NameKey, FieldEntry>,
    bases: BTreeSet<NameKey>,
    descriptions: HashMap<NameKey, String>,
}

/// A base name with the field names that resolve to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseGroup {
    pub base: String,
    /// Aliases sorted case-insensitively; never contains the base itself.
    pub aliases: Vec<String>,
}

/// Outcome of a bulk load from codec records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub bases: usize,
    pub aliases: usize,
    pub ignored: usize,
    /// Records the dictionary refused (alias of an unknown base, ignored base, ...).
    pub rejected: Vec<DictionaryRecord>,
}

impl AliasDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a dictionary from codec records.
    ///
    /// Base records are applied first so that an alias listed before its base
    /// still resolves; alias and ignore records then follow in input order.
    pub fn from_records(records: &[DictionaryRecord]) -> (Self, LoadReport) {
        let mut dictionary = Self::new();
        let mut report = LoadReport::default();

        for record in records.iter().filter(|r| r.status == RecordStatus::Base) {
            let name = if clean_name(&record.field_name).is_empty() {
                &record.primary_name
            } else {
                &record.field_name
            };
            if dictionary
                .add_base_name(name, std::iter::empty::<&str>())
                .is_some()
            {
                dictionary.set_description(name, record.description.as_deref());
                report.bases += 1;
            } else {
                report.rejected.push(record.clone());
            }
        }

        for record in records {
            let applied = match record.status {
                RecordStatus::Base => continue,
                RecordStatus::Alias => {
                    dictionary.add_alias_to_base(&record.primary_name, &record.field_name)
                }
                RecordStatus::Ignore => dictionary.add_ignored(&record.field_name),
            };
            if applied {
                dictionary.set_description(&record.field_name, record.description.as_deref());
                match record.status {
                    RecordStatus::Alias => report.aliases += 1,
                    _ => report.ignored += 1,
                }
            } else {
                warn!(
                    field = %record.field_name,
                    primary = %record.primary_name,
                    status = %record.status,
                    "dictionary record rejected"
                );
                report.rejected.push(record.clone());
            }
        }

        debug!(
            bases = report.bases,
            aliases = report.aliases,
            ignored = report.ignored,
            rejected = report.rejected.len(),
            "dictionary loaded"
        );
        (dictionary, report)
    }

    /// Number of field entries, base names included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks a name up. This is the only way to ask for a name's status.
    pub fn classify(&self, name: &str) -> Classification {
        let Ok(key) = NameKey::new(name) else {
            return Classification::Unknown;
        };
        match self.fields.get(&key) {
            None => Classification::Unknown,
            Some(FieldEntry { base: None, .. }) => Classification::Ignored,
            Some(FieldEntry {
                base: Some(base), ..
            }) => Classification::Mapped(self.stored_name(base).to_string()),
        }
    }

    pub fn is_base_name(&self, name: &str) -> bool {
        NameKey::new(name).is_ok_and(|key| self.bases.contains(&key))
    }

    /// The stored spelling of a known field name.
    pub fn stored_spelling(&self, name: &str) -> Option<&str> {
        let key = NameKey::new(name).ok()?;
        self.fields.get(&key).map(|entry| entry.name.as_str())
    }

    /// Adds (or re-affirms) a base name and maps `aliases` to it.
    ///
    /// A name that was ignored or aliased elsewhere becomes a base. Aliases
    /// that are blank, equal to `name`, or themselves other base names are
    /// skipped. Returns the number of aliases mapped, or `None` for a blank
    /// name.
    pub fn add_base_name<I, S>(&mut self, name: &str, aliases: I) -> Option<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let key = NameKey::new(name).ok()?;
        self.bases.insert(key.clone());
        self.put_entry(key.clone(), clean_name(name), Some(key.clone()));

        let mut mapped = 0;
        for alias in aliases {
            let alias = alias.as_ref();
            let Ok(alias_key) = NameKey::new(alias) else {
                continue;
            };
            if alias_key == key {
                continue;
            }
            if self.bases.contains(&alias_key) {
                warn!(alias = %alias, base = %name, "alias is itself a base name; skipped");
                continue;
            }
            self.put_entry(alias_key, clean_name(alias), Some(key.clone()));
            mapped += 1;
        }
        Some(mapped)
    }

    /// Maps `field_name` to an existing base name.
    ///
    /// Re-parents an alias of another base and un-ignores an ignored name.
    /// Fails when `base_name` is not a base or `field_name` is a different
    /// base name.
    pub fn add_alias_to_base(&mut self, base_name: &str, field_name: &str) -> bool {
        let (Ok(base_key), Ok(field_key)) = (NameKey::new(base_name), NameKey::new(field_name))
        else {
            return false;
        };
        if !self.bases.contains(&base_key) {
            debug!(base = %base_name, field = %field_name, "alias target is not a base name");
            return false;
        }
        if field_key == base_key {
            return true;
        }
        if self.bases.contains(&field_key) {
            debug!(base = %base_name, field = %field_name, "field is a base name");
            return false;
        }
        self.put_entry(field_key, clean_name(field_name), Some(base_key));
        true
    }

    /// Marks a name as ignored. Base names cannot be ignored.
    pub fn add_ignored(&mut self, name: &str) -> bool {
        let Ok(key) = NameKey::new(name) else {
            return false;
        };
        if self.bases.contains(&key) {
            debug!(name = %name, "cannot ignore a base name");
            return false;
        }
        self.put_entry(key, clean_name(name), None);
        true
    }

    /// Removes a base name together with every field that maps to it.
    pub fn remove_base_name(&mut self, name: &str) -> bool {
        let Ok(key) = NameKey::new(name) else {
            return false;
        };
        if !self.bases.remove(&key) {
            return false;
        }
        let before = self.fields.len();
        self.fields.retain(|_, entry| entry.base.as_ref() != Some(&key));
        let fields = &self.fields;
        self.descriptions.retain(|field, _| fields.contains_key(field));
        debug!(base = %name, removed = before - self.fields.len(), "base name removed");
        true
    }

    /// Removes a single alias or ignored entry. Base names must go through
    /// [`AliasDictionary::remove_base_name`].
    pub fn remove_field_name(&mut self, name: &str) -> bool {
        let Ok(key) = NameKey::new(name) else {
            return false;
        };
        if self.bases.contains(&key) {
            return false;
        }
        self.descriptions.remove(&key);
        self.fields.remove(&key).is_some()
    }

    /// Renames a base name, moving its aliases along.
    ///
    /// Either the whole rename happens or the dictionary is left exactly as
    /// it was. A rename that only changes casing updates the stored spelling.
    pub fn rename_base_name(&mut self, old: &str, new: &str) -> Result<()> {
        let old_key = NameKey::new(old)
            .ok()
            .filter(|key| self.bases.contains(key))
            .ok_or_else(|| MapError::BaseNameNotFound(clean_name(old).to_string()))?;
        let new_key = NameKey::new(new).map_err(|_| MapError::InvalidName(new.to_string()))?;
        let new_name = clean_name(new);

        if new_key == old_key {
            if let Some(entry) = self.fields.get_mut(&old_key) {
                entry.name = new_name.to_string();
            }
            return Ok(());
        }
        if self.bases.contains(&new_key) {
            return Err(MapError::BaseNameExists(new_name.to_string()));
        }

        let snapshot = self.clone();
        let aliases = self.aliases_of(old);
        let description = self.descriptions.get(&old_key).cloned();

        let renamed =
            self.add_base_name(new_name, &aliases).is_some() && self.remove_base_name(old);
        let moved = aliases.iter().all(|alias| {
            self.classify(alias)
                .base_name()
                .is_some_and(|base| same_name(base, new_name))
        });
        if !renamed || !moved || self.validate().is_err() {
            *self = snapshot;
            return Err(MapError::RenameFailed {
                old: old.to_string(),
                new: new.to_string(),
            });
        }

        if let Some(entry) = self.fields.get_mut(&new_key) {
            entry.name = new_name.to_string();
        }
        if let Some(description) = description {
            self.descriptions.entry(new_key).or_insert(description);
        }
        debug!(old = %old, new = %new_name, aliases = aliases.len(), "base name renamed");
        Ok(())
    }

    /// Aliases of a base name (excluding the base itself), sorted.
    pub fn aliases_of(&self, base: &str) -> Vec<String> {
        let Ok(base_key) = NameKey::new(base) else {
            return Vec::new();
        };
        if !self.bases.contains(&base_key) {
            return Vec::new();
        }
        let mut aliases: Vec<(&NameKey, &FieldEntry)> = self
            .fields
            .iter()
            .filter(|(key, entry)| **key != base_key && entry.base.as_ref() == Some(&base_key))
            .collect();
        aliases.sort_by(|a, b| a.0.cmp(b.0));
        aliases
            .into_iter()
            .map(|(_, entry)| entry.name.clone())
            .collect()
    }

    /// All base names in alphabetical (case-insensitive) order.
    pub fn base_names(&self) -> Vec<String> {
        self.bases
            .iter()
            .map(|key| self.stored_name(key).to_string())
            .collect()
    }

    /// All ignored names in alphabetical (case-insensitive) order.
    pub fn ignored_names(&self) -> Vec<String> {
        let mut ignored: Vec<(&NameKey, &FieldEntry)> = self
            .fields
            .iter()
            .filter(|(_, entry)| entry.base.is_none())
            .collect();
        ignored.sort_by(|a, b| a.0.cmp(b.0));
        ignored
            .into_iter()
            .map(|(_, entry)| entry.name.clone())
            .collect()
    }

    /// Base names with their aliases, in save order.
    pub fn grouped(&self) -> Vec<BaseGroup> {
        self.bases
            .iter()
            .map(|key| BaseGroup {
                base: self.stored_name(key).to_string(),
                aliases: self.aliases_of(key.as_str()),
            })
            .collect()
    }

    pub fn statistics(&self) -> DictionaryStats {
        let mut stats = DictionaryStats {
            base_count: self.bases.len(),
            ..DictionaryStats::default()
        };
        for (key, entry) in &self.fields {
            match &entry.base {
                None => stats.ignored_count += 1,
                Some(base) if base != key => stats.alias_count += 1,
                Some(_) => {}
            }
        }
        stats
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        let key = NameKey::new(name).ok()?;
        self.descriptions.get(&key).map(String::as_str)
    }

    /// Attaches a free-text description to a known field name.
    pub fn set_description(&mut self, name: &str, description: Option<&str>) {
        let Ok(key) = NameKey::new(name) else {
            return;
        };
        match description.map(str::trim).filter(|text| !text.is_empty()) {
            Some(text) if self.fields.contains_key(&key) => {
                self.descriptions.insert(key, text.to_string());
            }
            Some(_) => {}
            None => {
                self.descriptions.remove(&key);
            }
        }
    }

    /// Checks invariants 1, 2 and 4.
    pub fn validate(&self) -> std::result::Result<(), InvariantViolation> {
        for base in &self.bases {
            match self.fields.get(base) {
                None => return Err(InvariantViolation::MissingSelfMapping(base.to_string())),
                Some(FieldEntry { base: None, name }) => {
                    return Err(InvariantViolation::IgnoredBase(name.clone()));
                }
                Some(FieldEntry {
                    base: Some(target),
                    name,
                }) if target != base => {
                    return Err(InvariantViolation::MissingSelfMapping(name.clone()));
                }
                Some(_) => {}
            }
        }
        for entry in self.fields.values() {
            if let Some(base) = &entry.base
                && !self.bases.contains(base)
            {
                return Err(InvariantViolation::DanglingAlias {
                    field: entry.name.clone(),
                    base: base.to_string(),
                });
            }
        }
        Ok(())
    }

    fn stored_name<'a>(&'a self, key: &'a NameKey) -> &'a str {
        self.fields
            .get(key)
            .map_or(key.as_str(), |entry| entry.name.as_str())
    }

    /// Inserts or retargets an entry, keeping an existing spelling.
    fn put_entry(&mut self, key: NameKey, name: &str, base: Option<NameKey>) {
        match self.fields.get_mut(&key) {
            Some(entry) => entry.base = base,
            None => {
                self.fields.insert(
                    key,
                    FieldEntry {
                        name: name.to_string(),
                        base,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AliasDictionary {
        let mut dictionary = AliasDictionary::new();
        assert_eq!(dictionary.add_base_name("GR", ["GRC", "SGR"]), Some(2));
        assert_eq!(dictionary.add_base_name("CAL", ["CALI"]), Some(1));
        assert!(dictionary.add_ignored("SP"));
        dictionary
    }

    #[test]
    fn classify_is_case_insensitive_and_trimmed() {
        let dictionary = sample();
        assert_eq!(
            dictionary.classify("  grc "),
            Classification::Mapped("GR".to_string())
        );
        assert_eq!(dictionary.classify("sp"), Classification::Ignored);
        assert_eq!(dictionary.classify("RHOB"), Classification::Unknown);
        assert_eq!(dictionary.classify("   "), Classification::Unknown);
    }

    #[test]
    fn base_name_maps_to_itself() {
        let dictionary = sample();
        assert_eq!(
            dictionary.classify("gr"),
            Classification::Mapped("GR".to_string())
        );
        assert!(dictionary.is_base_name("cal"));
    }

    #[test]
    fn first_spelling_wins() {
        let mut dictionary = AliasDictionary::new();
        dictionary.add_base_name("Gr", std::iter::empty::<&str>());
        dictionary.add_base_name("GR", ["grc"]);
        assert_eq!(dictionary.base_names(), vec!["Gr".to_string()]);
        assert_eq!(dictionary.aliases_of("GR"), vec!["grc".to_string()]);
    }

    #[test]
    fn add_base_name_counts_mapped_aliases() {
        let mut dictionary = sample();
        assert_eq!(
            dictionary.add_base_name("CALIPER", ["CAL", "caliper", " ", "CLDC"]),
            Some(1)
        );
        assert_eq!(
            dictionary.classify("CAL"),
            Classification::Mapped("CAL".to_string())
        );
        assert_eq!(dictionary.add_base_name("  ", ["X"]), None);
        assert!(dictionary.validate().is_ok());
    }

    #[test]
    fn alias_to_unknown_base_fails() {
        let mut dictionary = sample();
        assert!(!dictionary.add_alias_to_base("NPHI", "NPOR"));
        assert_eq!(dictionary.classify("NPOR"), Classification::Unknown);
    }

    #[test]
    fn alias_reparents_and_unignores() {
        let mut dictionary = sample();
        assert!(dictionary.add_alias_to_base("CAL", "SGR"));
        assert_eq!(
            dictionary.classify("SGR"),
            Classification::Mapped("CAL".to_string())
        );
        assert!(dictionary.add_alias_to_base("GR", "SP"));
        assert_eq!(
            dictionary.classify("SP"),
            Classification::Mapped("GR".to_string())
        );
    }

    #[test]
    fn base_name_cannot_become_alias_of_another_base() {
        let mut dictionary = sample();
        assert!(!dictionary.add_alias_to_base("GR", "CAL"));
        assert!(dictionary.is_base_name("CAL"));
        assert!(dictionary.validate().is_ok());
    }

    #[test]
    fn ignoring_a_base_name_fails() {
        let mut dictionary = sample();
        assert!(!dictionary.add_ignored("GR"));
        assert_eq!(
            dictionary.classify("GR"),
            Classification::Mapped("GR".to_string())
        );
    }

    #[test]
    fn adding_base_unignores_name() {
        let mut dictionary = sample();
        assert_eq!(
            dictionary.add_base_name("SP", std::iter::empty::<&str>()),
            Some(0)
        );
        assert_eq!(
            dictionary.classify("SP"),
            Classification::Mapped("SP".to_string())
        );
        assert!(dictionary.validate().is_ok());
    }

    #[test]
    fn remove_field_name_refuses_bases_and_missing() {
        let mut dictionary = sample();
        assert!(!dictionary.remove_field_name("GR"));
        assert!(!dictionary.remove_field_name("RHOB"));
        assert!(dictionary.remove_field_name("grc"));
        assert_eq!(dictionary.classify("GRC"), Classification::Unknown);
    }

    #[test]
    fn statistics_exclude_self_mappings() {
        let stats = sample().statistics();
        assert_eq!(stats.base_count, 2);
        assert_eq!(stats.alias_count, 3);
        assert_eq!(stats.ignored_count, 1);
    }

    #[test]
    fn rename_to_existing_base_is_rejected_and_leaves_state() {
        let mut dictionary = sample();
        let before = dictionary.clone();
        let err = dictionary.rename_base_name("GR", "cal").unwrap_err();
        assert_eq!(err, MapError::BaseNameExists("cal".to_string()));
        assert_eq!(dictionary, before);
    }

    #[test]
    fn rename_changes_casing_only() {
        let mut dictionary = sample();
        dictionary.rename_base_name("GR", "Gr").unwrap();
        assert_eq!(
            dictionary.classify("GRC"),
            Classification::Mapped("Gr".to_string())
        );
    }

    #[test]
    fn rename_onto_own_alias() {
        let mut dictionary = sample();
        dictionary.rename_base_name("GR", "SGR").unwrap();
        assert!(dictionary.is_base_name("SGR"));
        assert!(!dictionary.is_base_name("GR"));
        assert_eq!(dictionary.aliases_of("SGR"), vec!["GRC".to_string()]);
        assert_eq!(dictionary.classify("GR"), Classification::Unknown);
    }

    #[test]
    fn descriptions_follow_entries() {
        let mut dictionary = sample();
        dictionary.set_description("GRC", Some("Corrected gamma ray"));
        dictionary.set_description("NOPE", Some("ignored"));
        assert_eq!(dictionary.description("grc"), Some("Corrected gamma ray"));
        assert_eq!(dictionary.description("NOPE"), None);
        dictionary.remove_base_name("GR");
        assert_eq!(dictionary.description("GRC"), None);
    }

    #[test]
    fn from_records_accepts_alias_before_base() {
        let records = vec![
            DictionaryRecord::alias("CALI", "CAL"),
            DictionaryRecord::base("CAL"),
            DictionaryRecord::ignore("SP"),
            DictionaryRecord::alias("NPOR", "NPHI"),
        ];
        let (dictionary, report) = AliasDictionary::from_records(&records);
        assert_eq!(report.bases, 1);
        assert_eq!(report.aliases, 1);
        assert_eq!(report.ignored, 1);
        assert_eq!(report.rejected, vec![DictionaryRecord::alias("NPOR", "NPHI")]);
        assert_eq!(
            dictionary.classify("cali"),
            Classification::Mapped("CAL".to_string())
        );
    }
}
