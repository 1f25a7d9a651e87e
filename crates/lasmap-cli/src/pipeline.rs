//! Command implementations shared by the binaries and the tests.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info, info_span, warn};

use lasmap_ingest::{
    DiscoveryOptions, LoadedDictionary, load_dictionary, load_directory, save_dictionary,
};
use lasmap_map::{
    AliasDictionary, BatchPropagator, ChangeSession, SessionOptions, classify_batch,
};
use lasmap_model::{Assignment, same_name};

use crate::types::{
    DictionaryEdit, EditOutcome, PendingChange, PropagateResult, ScanResult, StatsResult,
};

fn open_dictionary(path: &Path) -> Result<LoadedDictionary> {
    load_dictionary(path).with_context(|| format!("load dictionary {}", path.display()))
}

/// Classifies every LAS file of `dir` against the dictionary.
pub fn scan_directory(
    dir: &Path,
    dictionary_path: &Path,
    options: &DiscoveryOptions,
) -> Result<ScanResult> {
    let span = info_span!("scan", dir = %dir.display());
    let _guard = span.enter();

    let loaded = open_dictionary(dictionary_path)?;
    let parsed = load_directory(dir, options)
        .with_context(|| format!("read LAS files in {}", dir.display()))?;
    let batch = classify_batch(&loaded.dictionary, parsed);
    let totals = batch.totals();
    info!(
        files = totals.files,
        failed = totals.failed_files,
        mapped = totals.mapped,
        ignored = totals.ignored,
        unknown = totals.unknown,
        "scan complete"
    );

    Ok(ScanResult {
        directory: dir.to_path_buf(),
        dictionary: dictionary_path.to_path_buf(),
        dictionary_report: loaded.report,
        unknown: batch.unknown_mnemonics(),
        batch,
    })
}

pub fn dictionary_stats(dictionary_path: &Path) -> Result<StatsResult> {
    let loaded = open_dictionary(dictionary_path)?;
    Ok(StatsResult {
        dictionary: dictionary_path.to_path_buf(),
        stats: loaded.dictionary.statistics(),
        dictionary_report: loaded.report,
    })
}

fn apply_edit(dictionary: &mut AliasDictionary, edit: &DictionaryEdit) -> Result<String> {
    let description = match edit {
        DictionaryEdit::AddBase { name, aliases } => {
            let blocked: Vec<&str> = aliases
                .iter()
                .map(String::as_str)
                .filter(|alias| dictionary.is_base_name(alias) && !same_name(alias, name))
                .collect();
            if !blocked.is_empty() {
                bail!(
                    "cannot alias {} to '{name}': already base name(s)",
                    blocked.join(", ")
                );
            }
            let Some(mapped) = dictionary.add_base_name(name, aliases) else {
                bail!("'{name}' is not a valid base name");
            };
            match mapped {
                0 => format!("added base name '{name}'"),
                count => format!("added base name '{name}' with {count} alias(es)"),
            }
        }
        DictionaryEdit::AddAlias { base, field } => {
            if !dictionary.add_alias_to_base(base, field) {
                bail!("cannot map '{field}' to '{base}': '{base}' is not a base name or '{field}' is one");
            }
            format!("mapped '{field}' to '{base}'")
        }
        DictionaryEdit::Ignore { name } => {
            if !dictionary.add_ignored(name) {
                bail!("cannot ignore '{name}': it is a base name");
            }
            format!("ignoring '{name}'")
        }
        DictionaryEdit::RemoveBase { name } => {
            let aliases = dictionary.aliases_of(name).len();
            if !dictionary.remove_base_name(name) {
                bail!("'{name}' is not a base name");
            }
            format!("removed base name '{name}' and {aliases} alias(es)")
        }
        DictionaryEdit::RemoveField { name } => {
            if !dictionary.remove_field_name(name) {
                bail!("cannot remove '{name}': unknown, or a base name (use remove-base)");
            }
            format!("removed '{name}'")
        }
        DictionaryEdit::Rename { old, new } => {
            dictionary
                .rename_base_name(old, new)
                .with_context(|| format!("rename '{old}'"))?;
            format!("renamed base name '{old}' to '{new}'")
        }
    };
    Ok(description)
}

/// Applies one edit to the dictionary file and saves it.
///
/// A dictionary file that does not exist yet starts out empty.
pub fn edit_dictionary(dictionary_path: &Path, edit: &DictionaryEdit) -> Result<EditOutcome> {
    let mut dictionary = if dictionary_path.exists() {
        open_dictionary(dictionary_path)?.dictionary
    } else {
        warn!(path = %dictionary_path.display(), "dictionary not found; starting empty");
        AliasDictionary::new()
    };

    let description = apply_edit(&mut dictionary, edit)?;
    save_dictionary(dictionary_path, &dictionary)
        .with_context(|| format!("save dictionary {}", dictionary_path.display()))?;
    info!(edit = %description, "dictionary edited");

    Ok(EditOutcome {
        dictionary: dictionary_path.to_path_buf(),
        description,
        stats: dictionary.statistics(),
    })
}

/// Parses a `FIELD=VALUE` assignment. The value uses the cell syntax:
/// a base name, `[IGNORE]`, `[NEW BASE]` or empty to clear.
pub fn parse_assignment(text: &str) -> Result<(String, Assignment)> {
    let (field, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FIELD=VALUE, found '{text}'"))?;
    let field = field.trim();
    if field.is_empty() {
        bail!("missing field name in '{text}'");
    }
    Ok((field.to_string(), Assignment::parse(value)))
}

pub struct PropagateRequest<'a> {
    pub dir: &'a Path,
    pub dictionary: &'a Path,
    /// File name or path of the reference file.
    pub reference: &'a str,
    pub assignments: &'a [(String, Assignment)],
    pub options: DiscoveryOptions,
    pub dry_run: bool,
}

/// Loads a directory into a session, applies `assignments` to the reference
/// file, copies the reference file's values to every other file and commits.
pub fn propagate(request: &PropagateRequest<'_>) -> Result<PropagateResult> {
    let span = info_span!("propagate", reference = %request.reference);
    let _guard = span.enter();

    let mut dictionary = open_dictionary(request.dictionary)?.dictionary;
    let parsed = load_directory(request.dir, &request.options)
        .with_context(|| format!("read LAS files in {}", request.dir.display()))?;

    let mut session = ChangeSession::new(SessionOptions::default());
    session.load(&dictionary, parsed);

    let reference = session
        .find_file(request.reference)
        .ok_or_else(|| anyhow!("reference file '{}' is not in {}", request.reference, request.dir.display()))?;
    if let Some(error) = &reference.error {
        bail!("reference file '{}' could not be read: {error}", reference.name());
    }
    let reference_id = reference.id;
    let reference_name = reference.name();

    let mut targets = Vec::new();
    for (field, value) in request.assignments {
        let before = targets.len();
        targets.extend(
            reference
                .row_ids()
                .zip(reference.rows.iter())
                .filter(|(_, row)| lasmap_model::same_name(&row.field_name, field))
                .map(|(id, _)| (id, value.clone())),
        );
        if targets.len() == before {
            warn!(field = %field, file = %reference_name, "field not present in reference file");
        }
    }
    let mut assigned_rows = 0;
    for (id, value) in targets {
        if session.record_assignment(id, value)? {
            assigned_rows += 1;
        }
    }

    let propagated_rows = BatchPropagator::new(&session, reference_id)?.apply(&mut session)?;
    let pending = pending_changes(&session);
    let summary = session.summary();

    let commit = if request.dry_run {
        info!(pending = pending.len(), "dry run; dictionary not saved");
        None
    } else {
        let report = session.commit(&mut dictionary);
        for failure in &report.failures {
            warn!(row = %failure.row, "{}", failure.message());
        }
        save_dictionary(request.dictionary, &dictionary).with_context(|| {
            format!("save dictionary {}", request.dictionary.display())
        })?;
        Some(report)
    };

    for event in session.drain_events() {
        debug!(?event, "session event");
    }

    Ok(PropagateResult {
        reference: reference_name,
        assigned_rows,
        propagated_rows,
        pending,
        summary,
        commit,
    })
}

fn pending_changes(session: &ChangeSession) -> Vec<PendingChange> {
    session
        .pending_changes()
        .into_iter()
        .filter_map(|(id, row)| {
            let file = session.file(id.file)?;
            Some(PendingChange {
                file: file.name(),
                field: row.field_name.clone(),
                from: row.original().to_string(),
                to: row.assigned().to_string(),
            })
        })
        .collect()
}
