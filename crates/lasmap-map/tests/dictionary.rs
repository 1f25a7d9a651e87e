use lasmap_map::{AliasDictionary, ChangeSession, SessionOptions, classify_curves};
use lasmap_model::{Assignment, Classification, CurveInfo, FileId, LogFile, RowId};
use proptest::prelude::*;

const NAMES: &[&str] = &[
    "GR", "gr", "GRC", " grc ", "CAL", "CALI", "SP", "NPHI", "NPOR", "RHOB", "DT", "",
];

#[derive(Debug, Clone)]
enum Op {
    AddBase(String, Vec<String>),
    AddAlias(String, String),
    Ignore(String),
    RemoveBase(String),
    RemoveField(String),
    Rename(String, String),
}

fn name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES).prop_map(str::to_string)
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (name(), prop::collection::vec(name(), 0..4)).prop_map(|(n, a)| Op::AddBase(n, a)),
        (name(), name()).prop_map(|(b, f)| Op::AddAlias(b, f)),
        name().prop_map(Op::Ignore),
        name().prop_map(Op::RemoveBase),
        name().prop_map(Op::RemoveField),
        (name(), name()).prop_map(|(o, n)| Op::Rename(o, n)),
    ]
}

fn apply(dictionary: &mut AliasDictionary, op: &Op) {
    match op {
        Op::AddBase(name, aliases) => {
            dictionary.add_base_name(name, aliases);
        }
        Op::AddAlias(base, field) => {
            dictionary.add_alias_to_base(base, field);
        }
        Op::Ignore(name) => {
            dictionary.add_ignored(name);
        }
        Op::RemoveBase(name) => {
            dictionary.remove_base_name(name);
        }
        Op::RemoveField(name) => {
            dictionary.remove_field_name(name);
        }
        Op::Rename(old, new) => {
            let before = dictionary.clone();
            if dictionary.rename_base_name(old, new).is_err() {
                assert_eq!(*dictionary, before, "failed rename must not change state");
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]

    #[test]
    fn invariants_hold_after_any_sequence(ops in prop::collection::vec(op(), 0..40)) {
        let mut dictionary = AliasDictionary::new();
        for op in &ops {
            apply(&mut dictionary, op);
            prop_assert!(dictionary.validate().is_ok(), "{:?} after {:?}", dictionary.validate(), op);
        }
        for base in dictionary.base_names() {
            prop_assert_eq!(dictionary.classify(&base), Classification::Mapped(base.clone()));
        }
        for ignored in dictionary.ignored_names() {
            prop_assert!(!dictionary.is_base_name(&ignored));
        }
    }

    #[test]
    fn removing_a_base_leaves_nothing_pointing_at_it(
        ops in prop::collection::vec(op(), 0..30),
        victim in name(),
    ) {
        let mut dictionary = AliasDictionary::new();
        for op in &ops {
            apply(&mut dictionary, op);
        }
        let aliases = dictionary.aliases_of(&victim);
        if dictionary.remove_base_name(&victim) {
            prop_assert_eq!(dictionary.classify(&victim), Classification::Unknown);
            for alias in aliases {
                prop_assert_eq!(dictionary.classify(&alias), Classification::Unknown);
            }
        }
    }

    #[test]
    fn classification_is_total(
        ops in prop::collection::vec(op(), 0..30),
        mnemonics in prop::collection::vec(name(), 0..20),
    ) {
        let mut dictionary = AliasDictionary::new();
        for op in &ops {
            apply(&mut dictionary, op);
        }
        let curves: Vec<CurveInfo> = mnemonics.iter().map(CurveInfo::new).collect();
        let result = classify_curves(&dictionary, &curves);
        prop_assert_eq!(result.total(), curves.len());
        for (entry, class) in result.in_input_order() {
            prop_assert_eq!(class, dictionary.classify(&entry.curve.mnemonic));
        }
    }

    #[test]
    fn undoing_everything_restores_the_session(
        edits in prop::collection::vec((0usize..6, name()), 0..25),
    ) {
        let mut dictionary = AliasDictionary::new();
        dictionary.add_base_name("GR", ["GRC"]);
        dictionary.add_ignored("SP");
        let mut session = ChangeSession::new(SessionOptions::default());
        session.load_files(
            &dictionary,
            vec![LogFile::from_mnemonics("a.las", ["DEPT", "GR", "GRC", "SP", "CALI", "GRC"])],
        );
        let initial = session.files().to_vec();

        for (index, text) in edits {
            let row = RowId::new(FileId::new(0), index);
            session.record_assignment(row, Assignment::parse(&text)).unwrap();
        }
        while session.can_undo() {
            session.undo_last();
        }
        prop_assert_eq!(session.files(), initial.as_slice());
        prop_assert!(!session.summary().has_unsaved_changes());
    }
}

#[test]
fn re_adding_a_base_is_idempotent() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("CAL", ["CALI", "CLDC"]);
    let once = dictionary.clone();
    dictionary.add_base_name("cal", ["CALI", "cldc"]);
    assert_eq!(dictionary, once);
}

#[test]
fn cascading_delete_removes_aliases() {
    let mut dictionary = AliasDictionary::new();
    dictionary.add_base_name("NPHI", ["NPOR", "TNPH"]);
    dictionary.add_base_name("GR", ["GRC"]);
    assert!(dictionary.remove_base_name("nphi"));
    assert_eq!(dictionary.classify("TNPH"), Classification::Unknown);
    assert_eq!(dictionary.classify("NPHI"), Classification::Unknown);
    assert_eq!(
        dictionary.classify("GRC"),
        Classification::Mapped("GR".to_string())
    );
    assert!(!dictionary.remove_base_name("NPHI"));
}
