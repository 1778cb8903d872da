//! Batch runs from roster files to the packaged archive

use std::cell::{Cell, RefCell};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use certforge_core::{
    expected_pdf_path, BatchDriver, CertError, ConvertError, DocumentConverter, MissPolicy, RecordStage,
    RunConfig,
};
use certforge_data::load_roster_file;
use certforge_pptx::test_utils::build_pptx;
use tempfile::TempDir;
use zip::ZipArchive;

/// Writes a stub PDF, optionally failing for one call
struct FakeConverter {
    fail_on_call: Option<usize>,
    calls: Cell<usize>,
}

impl FakeConverter {
    fn new() -> Self {
        Self {
            fail_on_call: None,
            calls: Cell::new(0),
        }
    }

    fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            calls: Cell::new(0),
        }
    }
}

impl DocumentConverter for FakeConverter {
    fn convert(&self, input: &Path, out_dir: &Path) -> Result<PathBuf, ConvertError> {
        let call = self.calls.get() + 1;
        self.calls.set(call);

        if self.fail_on_call == Some(call) {
            return Err(ConvertError::Exit {
                code: 1,
                stderr: "Error: source file could not be loaded".to_string(),
            });
        }

        let pdf = expected_pdf_path(input, out_dir);
        fs::write(&pdf, b"%PDF-1.4\n%stub\n").map_err(|source| ConvertError::Spawn {
            program: "fake".to_string(),
            source,
        })?;
        Ok(pdf)
    }
}

/// Notes, at each call, whether the previous call's input is still on disk
#[derive(Default)]
struct RecordingConverter {
    inputs: RefCell<Vec<PathBuf>>,
    previous_input_existed: RefCell<Vec<bool>>,
}

impl DocumentConverter for RecordingConverter {
    fn convert(&self, input: &Path, out_dir: &Path) -> Result<PathBuf, ConvertError> {
        if let Some(previous) = self.inputs.borrow().last() {
            self.previous_input_existed
                .borrow_mut()
                .push(previous.exists());
        }
        self.inputs.borrow_mut().push(input.to_path_buf());

        let pdf = expected_pdf_path(input, out_dir);
        fs::write(&pdf, b"%PDF-1.4\n").map_err(|source| ConvertError::Spawn {
            program: "recording".to_string(),
            source,
        })?;
        Ok(pdf)
    }
}

fn write_roster(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("asistentes.csv");
    fs::write(&path, content).unwrap();
    path
}

fn archive_names(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn test_roster_to_archive() {
    let dir = TempDir::new().unwrap();
    let roster_path = write_roster(dir.path(), "Apellido,Nombre\n garcia , ANA \nLopez,Juan\n");
    let config = RunConfig::default();
    let roster = load_roster_file(&roster_path, &config.roster_options()).unwrap();

    let converter = FakeConverter::new();
    let destination = dir.path().join("certificados.pdf.zip");
    let report = BatchDriver::new(&config, &converter)
        .run(
            &build_pptx(&[&["Nombre y apellido"]]),
            &roster.records,
            &destination,
            |_| {},
        )
        .unwrap();

    assert_eq!(report.pdf_count(), 2);
    assert_eq!(
        archive_names(&destination),
        vec!["Certificado_Garcia_Ana.pdf", "Certificado_Lopez_Juan.pdf"]
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = TempDir::new().unwrap();
    let roster_path = write_roster(
        dir.path(),
        "Nombre y Apellido\nAna Garcia\nJuan Lopez\nEva Perez\n",
    );
    let config = RunConfig::default();
    let roster = load_roster_file(&roster_path, &config.roster_options()).unwrap();
    let template = build_pptx(&[&["Nombre y apellido"]]);
    let converter = FakeConverter::new();

    let first = BatchDriver::new(&config, &converter)
        .run(&template, &roster.records, &dir.path().join("a.zip"), |_| {})
        .unwrap();
    let second = BatchDriver::new(&config, &converter)
        .run(&template, &roster.records, &dir.path().join("b.zip"), |_| {})
        .unwrap();

    assert_eq!(first.pdf_count(), second.pdf_count());
    assert_eq!(first.packaged, second.packaged);
    assert_eq!(
        archive_names(&dir.path().join("a.zip")),
        archive_names(&dir.path().join("b.zip"))
    );
}

#[test]
fn test_nobody_attended() {
    let dir = TempDir::new().unwrap();
    let roster_path = write_roster(
        dir.path(),
        "Apellido,Nombre,Asistió\nGarcia,Ana,NO\nLopez,Juan,\n",
    );
    let config = RunConfig::default();
    let roster = load_roster_file(&roster_path, &config.roster_options()).unwrap();
    assert!(roster.is_empty());

    let converter = FakeConverter::new();
    let destination = dir.path().join("certificados.pdf.zip");
    let report = BatchDriver::new(&config, &converter)
        .run(&build_pptx(&[&["Nombre y apellido"]]), &roster.records, &destination, |_| {})
        .unwrap();

    assert_eq!(report.pdf_count(), 0);
    assert!(report.outcomes.is_empty());
    assert_eq!(converter.calls.get(), 0);
    assert!(archive_names(&destination).is_empty());
}

#[test]
fn test_identifier_mode_requires_column() {
    let dir = TempDir::new().unwrap();
    let roster_path = write_roster(dir.path(), "Apellido,Nombre\nGarcia,Ana\n");
    let mut config = RunConfig::default();
    config.identifier.enabled = true;

    let err: CertError = load_roster_file(&roster_path, &config.roster_options())
        .unwrap_err()
        .into();
    assert!(matches!(err, CertError::Roster(_)));
    assert!(err.to_string().contains("Dni"));
    assert!(!dir.path().join("certificados.pdf.zip").exists());
}

#[test]
fn test_conversion_failure_skips_one_record() {
    let dir = TempDir::new().unwrap();
    let roster_path = write_roster(dir.path(), "Apellido,Nombre\nGarcia,Ana\nLopez,Juan\nPerez,Eva\n");
    let config = RunConfig::default();
    let roster = load_roster_file(&roster_path, &config.roster_options()).unwrap();

    let converter = FakeConverter::failing_on(2);
    let destination = dir.path().join("certificados.pdf.zip");
    let report = BatchDriver::new(&config, &converter)
        .run(&build_pptx(&[&["Nombre y apellido"]]), &roster.records, &destination, |_| {})
        .unwrap();

    assert_eq!(report.pdf_count(), 2);
    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].full_name, "Lopez Juan");
    assert!(matches!(failures[0].stage, RecordStage::Failed(ref reason) if reason.contains("code 1")));
    assert_eq!(
        archive_names(&destination),
        vec!["Certificado_Garcia_Ana.pdf", "Certificado_Perez_Eva.pdf"]
    );
}

#[test]
fn test_identifier_rows_with_same_name_get_distinct_files() {
    let dir = TempDir::new().unwrap();
    let roster_path = write_roster(
        dir.path(),
        "Apellido,Nombre,Dni\nGarcia,Ana,30111222\nGarcia,Ana,40222333\n",
    );
    let mut config = RunConfig::default();
    config.identifier.enabled = true;
    let roster = load_roster_file(&roster_path, &config.roster_options()).unwrap();
    assert_eq!(roster.len(), 2);

    let converter = FakeConverter::new();
    let destination = dir.path().join("certificados.pdf.zip");
    BatchDriver::new(&config, &converter)
        .run(
            &build_pptx(&[&["Nombre y apellido", "DNI Numero de DNI"]]),
            &roster.records,
            &destination,
            |_| {},
        )
        .unwrap();

    assert_eq!(
        archive_names(&destination),
        vec!["Certificado_Garcia_Ana.pdf", "Certificado_Garcia_Ana_2.pdf"]
    );
}

#[test]
fn test_intermediates_removed_after_conversion() {
    let dir = TempDir::new().unwrap();
    let work_root = TempDir::new().unwrap();
    let roster_path = write_roster(dir.path(), "Apellido,Nombre\nGarcia,Ana\nLopez,Juan\nPerez,Eva\n");
    let mut config = RunConfig::default();
    config.output.work_root = Some(work_root.path().to_path_buf());
    let roster = load_roster_file(&roster_path, &config.roster_options()).unwrap();

    let converter = RecordingConverter::default();
    let destination = dir.path().join("certificados.pdf.zip");
    let report = BatchDriver::new(&config, &converter)
        .run(&build_pptx(&[&["Nombre y apellido"]]), &roster.records, &destination, |_| {})
        .unwrap();

    assert_eq!(report.pdf_count(), 3);
    assert_eq!(*converter.previous_input_existed.borrow(), vec![false, false]);

    let inputs = converter.inputs.borrow();
    assert_eq!(inputs.len(), 3);
    assert!(inputs.iter().all(|input| input.starts_with(work_root.path())));
    assert!(!inputs[2].exists());
    assert!(!inputs[0].parent().unwrap().exists());
    assert_eq!(fs::read_dir(work_root.path()).unwrap().count(), 0);
    assert!(destination.exists());
}

#[test]
fn test_work_dir_removed_when_run_aborts() {
    let dir = TempDir::new().unwrap();
    let work_root = TempDir::new().unwrap();
    let roster_path = write_roster(dir.path(), "Apellido,Nombre\nGarcia,Ana\n");
    let mut config = RunConfig::default();
    config.output.work_root = Some(work_root.path().to_path_buf());
    config.on_missing_sentinel = MissPolicy::Abort;
    let roster = load_roster_file(&roster_path, &config.roster_options()).unwrap();

    let converter = RecordingConverter::default();
    let destination = dir.path().join("certificados.pdf.zip");
    let err = BatchDriver::new(&config, &converter)
        .run(&build_pptx(&[&["Sin marcador"]]), &roster.records, &destination, |_| {})
        .unwrap_err();

    assert!(matches!(err, CertError::Template(ref e) if e.is_sentinel_miss()));
    assert!(converter.inputs.borrow().is_empty());
    assert_eq!(fs::read_dir(work_root.path()).unwrap().count(), 0);
    assert!(!destination.exists());
}
