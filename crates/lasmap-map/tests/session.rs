use std::path::PathBuf;

use lasmap_map::{AliasDictionary, BatchPropagator, ChangeSession, MapError, SessionOptions};
use lasmap_model::{Assignment, Classification, FileId, LogFile, RowId};

fn row(file: usize, index: usize) -> RowId {
    RowId::new(FileId::new(file), index)
}

fn file(path: &str, names: &[&str]) -> LogFile {
    LogFile::from_mnemonics(path, names.iter().copied())
}

fn load(dictionary: &AliasDictionary, files: Vec<LogFile>) -> ChangeSession {
    let mut session = ChangeSession::new(SessionOptions::default());
    session.load_files(dictionary, files);
    session
}

fn assigned(session: &ChangeSession, id: RowId) -> Assignment {
    session.row(id).unwrap().assigned().clone()
}

#[test]
fn ignore_then_commit_updates_other_files() {
    let mut dictionary = AliasDictionary::new();
    let mut session = load(&dictionary, vec![file("a.las", &["XX"]), file("b.las", &["xx"])]);

    session.record_assignment(row(0, 0), Assignment::Ignore).unwrap();
    assert!(session.summary().has_unsaved_changes());

    let report = session.commit(&mut dictionary);
    assert!(report.is_clean());
    assert_eq!(report.applied, 1);
    assert_eq!(report.reclassified, 1);
    assert_eq!(dictionary.classify("XX"), Classification::Ignored);
    assert_eq!(assigned(&session, row(1, 0)), Assignment::Ignore);
    assert!(!session.summary().has_unsaved_changes());
    assert!(!session.can_undo());
}

#[test]
fn free_text_base_name_creates_it() {
    let mut dictionary = AliasDictionary::new();
    let mut session = load(&dictionary, vec![file("a.las", &["PE"]), file("b.las", &["PEF"])]);

    session
        .record_assignment(row(0, 0), Assignment::parse("PEF"))
        .unwrap();
    let report = session.commit(&mut dictionary);

    assert!(report.is_clean());
    assert!(dictionary.is_base_name("PEF"));
    assert_eq!(
        dictionary.classify("pe"),
        Classification::Mapped("PEF".to_string())
    );
    assert_eq!(assigned(&session, row(1, 0)), Assignment::base("PEF"));
    assert_eq!(session.summary().unknown, 0);
}

#[test]
fn free_text_base_on_a_base_name_row_is_rejected() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("CAL", ["CALI"]);
    let mut session = load(&dictionary, vec![file("a.las", &["CAL", "CALI"])]);

    session
        .record_assignment(row(0, 0), Assignment::parse("CALIPER"))
        .unwrap();
    let report = session.commit(&mut dictionary);

    assert!(!report.is_clean());
    assert_eq!(report.applied, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].field_name, "CAL");
    assert!(!dictionary.is_base_name("CALIPER"));
    assert_eq!(dictionary.base_names(), vec!["CAL".to_string()]);
    assert_eq!(assigned(&session, row(0, 0)), Assignment::base("CAL"));
    assert!(!session.summary().has_unsaved_changes());
}

#[test]
fn marker_text_typed_as_a_base_is_read_as_the_marker() {
    let mut dictionary = AliasDictionary::new();
    let mut session = load(&dictionary, vec![file("a.las", &["SP"])]);

    session
        .record_assignment(row(0, 0), Assignment::Base("[ignore]".to_string()))
        .unwrap();
    assert_eq!(assigned(&session, row(0, 0)), Assignment::Ignore);

    let report = session.commit(&mut dictionary);
    assert!(report.is_clean());
    assert_eq!(dictionary.classify("SP"), Classification::Ignored);
    assert!(dictionary.base_names().is_empty());
}

#[test]
fn new_base_marker_promotes_the_field() {
    let mut dictionary = AliasDictionary::new();
    let mut session = load(&dictionary, vec![file("a.las", &["RHOB"])]);

    session
        .record_assignment(row(0, 0), Assignment::parse("[new base]"))
        .unwrap();
    session.commit(&mut dictionary);

    assert!(dictionary.is_base_name("RHOB"));
    assert_eq!(assigned(&session, row(0, 0)), Assignment::base("RHOB"));
    assert!(!session.row(row(0, 0)).unwrap().is_modified());
}

#[test]
fn cleared_mapping_removes_the_alias() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("GR", ["GRC"]);
    let mut session = load(&dictionary, vec![file("a.las", &["GRC", "GR"])]);

    session.record_assignment(row(0, 0), Assignment::Unset).unwrap();
    let report = session.commit(&mut dictionary);

    assert!(report.is_clean());
    assert_eq!(dictionary.classify("GRC"), Classification::Unknown);
    assert!(dictionary.is_base_name("GR"));
}

#[test]
fn rejected_commit_is_reported_and_row_rederived() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("GR", ["GRC"]);
    let mut session = load(&dictionary, vec![file("a.las", &["GR"])]);

    session.record_assignment(row(0, 0), Assignment::Ignore).unwrap();
    let report = session.commit(&mut dictionary);

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].field_name, "GR");
    assert_eq!(assigned(&session, row(0, 0)), Assignment::base("GR"));
    assert!(dictionary.validate().is_ok());
    assert!(!session.summary().has_unsaved_changes());
}

#[test]
fn rename_repoints_rows_across_files() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("GR", ["GRC"]);
    let mut session = load(
        &dictionary,
        vec![file("a.las", &["GR", "GRC"]), file("b.las", &["GRC", "GAMMA"])],
    );

    let repointed = session
        .rename_base_name(&mut dictionary, "GR", "GAMMA")
        .unwrap();

    assert_eq!(repointed, 3);
    assert_eq!(
        dictionary.classify("GRC"),
        Classification::Mapped("GAMMA".to_string())
    );
    assert_eq!(dictionary.classify("GR"), Classification::Unknown);
    for id in [row(0, 0), row(0, 1), row(1, 0), row(1, 1)] {
        assert_eq!(assigned(&session, id), Assignment::base("GAMMA"), "{id}");
    }
    // The old base name itself is no longer in the dictionary.
    assert!(session.row(row(0, 0)).unwrap().is_modified());
    assert_eq!(session.summary().modified, 1);
    assert!(!session.can_undo());

    session.commit(&mut dictionary);
    assert_eq!(
        dictionary.classify("GR"),
        Classification::Mapped("GAMMA".to_string())
    );
}

#[test]
fn rename_failure_leaves_session_untouched() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("GR", ["GRC"]);
    dictionary.add_base_name("CAL", ["CALI"]);
    let mut session = load(&dictionary, vec![file("a.las", &["GRC"])]);
    let before = session.files().to_vec();

    let err = session
        .rename_base_name(&mut dictionary, "GR", "CAL")
        .unwrap_err();
    assert_eq!(err, MapError::BaseNameExists("CAL".to_string()));
    assert_eq!(session.files(), before.as_slice());
}

#[test]
fn propagation_is_a_single_undo_unit() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("CAL", std::iter::empty::<&str>());
    let mut session = load(
        &dictionary,
        vec![
            file("ref.las", &["CALI", "DEPT"]),
            file("one.las", &["CALI"]),
            file("two.las", &["DEPT", "cali"]),
        ],
    );

    session
        .record_assignment(row(0, 0), Assignment::base("CAL"))
        .unwrap();
    let propagator = BatchPropagator::new(&session, FileId::new(0)).unwrap();
    assert_eq!(propagator.apply(&mut session).unwrap(), 2);
    assert_eq!(session.undo_depth(), 2);
    assert_eq!(session.summary().modified, 3);

    assert_eq!(session.undo_last(), 2);
    assert_eq!(assigned(&session, row(1, 0)), Assignment::Unset);
    assert_eq!(assigned(&session, row(2, 1)), Assignment::Unset);
    assert_eq!(assigned(&session, row(0, 0)), Assignment::base("CAL"));

    assert_eq!(session.undo_last(), 1);
    assert!(!session.can_undo());
    assert!(!session.summary().has_unsaved_changes());
}

#[test]
fn propagation_then_commit() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("CAL", std::iter::empty::<&str>());
    let mut session = load(&dictionary, vec![file("ref.las", &["CALI"]), file("one.las", &["CALI"])]);

    session
        .record_assignment(row(0, 0), Assignment::base("cal"))
        .unwrap();
    BatchPropagator::new(&session, FileId::new(0))
        .unwrap()
        .apply(&mut session)
        .unwrap();
    let report = session.commit(&mut dictionary);

    assert_eq!(report.applied, 2);
    assert_eq!(dictionary.aliases_of("CAL"), vec!["CALI".to_string()]);
}

#[test]
fn failed_files_are_excluded() {
    let dictionary = AliasDictionary::new();
    let mut session = ChangeSession::new(SessionOptions::default());
    session.load(
        &dictionary,
        vec![
            (
                PathBuf::from("a.las"),
                Ok(LogFile::from_mnemonics("a.las", ["GR"])),
            ),
            (PathBuf::from("b.las"), Err("missing ~C section".to_string())),
        ],
    );

    let summary = session.summary();
    assert_eq!(summary.files, 2);
    assert_eq!(summary.failed_files, 1);
    assert_eq!(summary.rows, 1);
    assert_eq!(
        session.record_assignment(row(1, 0), Assignment::Ignore),
        Err(MapError::FailedFile {
            file: FileId::new(1),
            message: "missing ~C section".to_string(),
        })
    );
    assert!(BatchPropagator::new(&session, FileId::new(1)).is_err());
}

#[test]
fn resync_keeps_pending_edits() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("GR", ["GRC"]);
    let mut session = load(&dictionary, vec![file("a.las", &["GRC", "SP"])]);
    session.record_assignment(row(0, 1), Assignment::Ignore).unwrap();

    dictionary.remove_base_name("GR");
    session.resync(&dictionary);

    assert_eq!(assigned(&session, row(0, 0)), Assignment::Unset);
    assert!(!session.row(row(0, 0)).unwrap().is_modified());
    assert_eq!(assigned(&session, row(0, 1)), Assignment::Ignore);
    assert_eq!(session.summary().modified, 1);
    assert!(!session.can_undo());
}

#[test]
fn duplicate_mnemonics_are_separate_rows() {
    let dictionary = AliasDictionary::new();
    let mut session = load(&dictionary, vec![file("a.las", &["XX", "XX"])]);
    session.record_assignment(row(0, 1), Assignment::Ignore).unwrap();
    assert_eq!(assigned(&session, row(0, 0)), Assignment::Unset);
    assert_eq!(session.summary().modified, 1);
}

#[test]
fn undo_limit_drops_oldest_edits() {
    let dictionary = AliasDictionary::new();
    let mut session = ChangeSession::new(SessionOptions::default().with_undo_limit(1));
    session.load_files(
        &dictionary,
        vec![LogFile::from_mnemonics("a.las", ["A", "B"])],
    );
    session.record_assignment(row(0, 0), Assignment::Ignore).unwrap();
    session.record_assignment(row(0, 1), Assignment::Ignore).unwrap();

    assert_eq!(session.undo_depth(), 1);
    assert_eq!(session.undo_last(), 1);
    assert_eq!(assigned(&session, row(0, 0)), Assignment::Ignore);
    assert_eq!(assigned(&session, row(0, 1)), Assignment::Unset);
}
