use lasmap_ingest::{LegacyFiles, convert_legacy, convert_legacy_to_csv, load_dictionary};
use lasmap_model::Classification;
use std::path::PathBuf;
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    ignored: PathBuf,
    primary: PathBuf,
    aliases: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("ignored.txt"), "SP\n\nBS\nCALI\n").expect("ignored");
        std::fs::write(dir.path().join("primary.txt"), "GR\nCAL\n").expect("primary");
        std::fs::write(
            dir.path().join("aliases.csv"),
            "GR,GRC,SGR\nCAL,CALI,\nNPHI,NPOR\n",
        )
        .expect("aliases");
        Self {
            ignored: dir.path().join("ignored.txt"),
            primary: dir.path().join("primary.txt"),
            aliases: dir.path().join("aliases.csv"),
            dir,
        }
    }

    fn files(&self) -> LegacyFiles<'_> {
        LegacyFiles {
            ignored: &self.ignored,
            primary: &self.primary,
            aliases: &self.aliases,
        }
    }
}

#[test]
fn converts_three_files() {
    let fixture = Fixture::new();
    let (dictionary, report) = convert_legacy(&fixture.files()).expect("convert");

    assert_eq!(report.primary_names, 2);
    assert_eq!(report.alias_rows, 3);
    assert_eq!(report.ignored_names, 3);
    assert!(dictionary.is_base_name("NPHI"));
    assert_eq!(dictionary.aliases_of("GR"), vec!["GRC", "SGR"]);
    assert_eq!(dictionary.classify("SP"), Classification::Ignored);
    // Listed as ignored and as an alias: the alias wins.
    assert_eq!(
        dictionary.classify("CALI"),
        Classification::Mapped("CAL".to_string())
    );
    assert!(dictionary.validate().is_ok());
}

#[test]
fn writes_dictionary_csv() {
    let fixture = Fixture::new();
    let output = fixture.dir.path().join("out.csv");
    convert_legacy_to_csv(&fixture.files(), &output).expect("convert");

    let loaded = load_dictionary(&output).expect("load output");
    assert_eq!(loaded.dictionary.statistics().base_count, 3);
    assert_eq!(loaded.dictionary.statistics().alias_count, 4);
    assert_eq!(loaded.dictionary.statistics().ignored_count, 2);
}

#[test]
fn missing_input_is_an_error() {
    let fixture = Fixture::new();
    let mut files = fixture.files();
    let missing = fixture.dir.path().join("nope.txt");
    files.primary = &missing;
    assert!(convert_legacy(&files).is_err());
}
