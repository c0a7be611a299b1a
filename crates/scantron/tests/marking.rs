use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use image::{Rgb, RgbImage};
use tempfile::TempDir;

use scantron::dataset;
use scantron::mark::{encode, ExportFormat, MarkStyle};
use scantron::{
    AnnotateError, AnswerKeyEntry, DataError, MarkOutcome, MarkReport, QuestionId,
    ReferenceAssets, RunConfig, ScantronError, ValidationError,
};

const TWO_OPTIONS: &str = "Question,Answer,X,Y\n1,A,10,20\n1,B,30,20\n";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn write_blank_sheet(dir: &Path) -> PathBuf {
    let path = dir.join("sheet.png");
    RgbImage::from_pixel(60, 40, Rgb([255, 255, 255]))
        .save(&path)
        .expect("save sheet");
    path
}

fn load_assets(dir: &Path, coords: &str) -> ReferenceAssets {
    let coords = write(dir, "coordinates.csv", coords);
    let sheet = write_blank_sheet(dir);
    ReferenceAssets::load(coords, sheet).expect("assets")
}

#[test]
fn scenario_a_marks_the_requested_option() {
    let dir = TempDir::new().expect("tempdir");
    let assets = load_assets(dir.path(), TWO_OPTIONS);

    let (annotated, outcomes) = assets
        .annotate(&[AnswerKeyEntry::new(1, "A")], &MarkStyle::default())
        .expect("annotate");

    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        MarkOutcome::Marked { x, y, .. } => {
            assert_relative_eq!(*x, 10.0);
            assert_relative_eq!(*y, 20.0);
        }
        other => panic!("expected a marker, got {other:?}"),
    }
    assert_eq!(annotated.markers().len(), 1);
    assert!(annotated.image().get_pixel(10, 20).0[0] < 128);
    assert_eq!(annotated.image().get_pixel(30, 20).0[0], 255);
}

#[test]
fn scenario_b_unknown_lowercase_option_is_unresolved() {
    let dir = TempDir::new().expect("tempdir");
    let assets = load_assets(dir.path(), "Question,Answer,X,Y\n1,A,10,20\n");

    let (annotated, outcomes) = assets
        .annotate(&[AnswerKeyEntry::new(1, "b")], &MarkStyle::default())
        .expect("annotate");

    assert_eq!(
        outcomes,
        [MarkOutcome::Unresolved {
            question_id: QuestionId::Int(1),
            answer_label: "b".to_string(),
        }]
    );
    assert!(annotated.markers().is_empty());
    assert_eq!(annotated.image(), assets.image());
}

#[test]
fn scenario_c_mixed_key_keeps_order_and_places_one_marker() {
    let dir = TempDir::new().expect("tempdir");
    let assets = load_assets(dir.path(), TWO_OPTIONS);
    let key = write(dir.path(), "key.csv", "Question,Answer\n7,A\n1,b\n");
    let key = dataset::load_answer_key(key).expect("key");

    let (annotated, outcomes) = assets
        .annotate(key.entries(), &MarkStyle::default())
        .expect("annotate");

    let lines: Vec<String> = outcomes.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        [
            "Coordinate for Q7 Option A not found.",
            "Highlighted Q1 Option b at (x=30.00, y=20.00)",
        ]
    );
    assert_eq!(annotated.markers().len(), 1);
}

#[test]
fn scenario_d_empty_key_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    let assets = load_assets(dir.path(), TWO_OPTIONS);

    let err = assets.annotate(&[], &MarkStyle::default()).unwrap_err();
    assert!(matches!(
        err,
        AnnotateError::Validation(ValidationError::EmptyAnswerKey)
    ));
}

#[test]
fn scenario_e_missing_x_column_fails_at_load() {
    let dir = TempDir::new().expect("tempdir");
    let coords = write(dir.path(), "coordinates.csv", "Question,Answer,Y\n1,A,20\n");
    let sheet = write_blank_sheet(dir.path());

    let err = ReferenceAssets::load(&coords, sheet).unwrap_err();
    match err {
        ScantronError::Data(DataError::MissingColumn { dataset, column }) => {
            assert_eq!(column, "X");
            assert!(dataset.ends_with("coordinates.csv"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn numeric_and_text_question_ids_do_not_cross_match() {
    let dir = TempDir::new().expect("tempdir");
    let coords = write(
        dir.path(),
        "coordinates.json",
        r#"[{"Question": "1", "Answer": "A", "X": 10, "Y": 20}]"#,
    );
    let index = dataset::load_coordinate_index(coords).expect("index");

    assert!(index.resolve(&QuestionId::Int(1), "A").is_none());
    assert!(index.resolve(&QuestionId::from("1"), "a").is_some());
}

#[test]
fn unreadable_reference_image_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let coords = write(dir.path(), "coordinates.csv", TWO_OPTIONS);
    let bogus = write(dir.path(), "sheet.jpg", "definitely not a jpeg");

    let err = ReferenceAssets::load(coords, bogus).unwrap_err();
    assert!(matches!(err, ScantronError::Image(_)), "got {err}");
}

#[test]
fn run_writes_image_and_report() {
    let dir = TempDir::new().expect("tempdir");
    let coords = write(dir.path(), "coordinates.csv", TWO_OPTIONS);
    let sheet = write_blank_sheet(dir.path());
    let key = write(dir.path(), "key.csv", "Question,Answer\n1,B\n2,A\n");

    let mut cfg = RunConfig::new(
        coords.to_string_lossy(),
        sheet.to_string_lossy(),
        key.to_string_lossy(),
    );
    let output = dir.path().join("out").join("marked.png");
    let report_path = dir.path().join("out").join("report.json");
    cfg.output_path = Some(output.to_string_lossy().into_owned());
    cfg.report_path = Some(report_path.to_string_lossy().into_owned());

    let summary = scantron::run(&cfg).expect("run");
    assert_eq!(summary.report.marked, 1);
    assert_eq!(summary.report.unresolved, 1);
    assert_eq!(summary.report.format, ExportFormat::Png);

    let written = image::open(&output).expect("decode output").to_rgb8();
    assert_eq!(written.dimensions(), (60, 40));
    assert!(written.get_pixel(30, 20).0[0] < 128);
    assert_eq!(written.get_pixel(10, 20).0[0], 255);

    let report = MarkReport::load_json(&report_path).expect("report");
    assert_eq!(report, summary.report);
}

#[test]
fn failed_report_write_leaves_no_image() {
    let dir = TempDir::new().expect("tempdir");
    let coords = write(dir.path(), "coordinates.csv", TWO_OPTIONS);
    let sheet = write_blank_sheet(dir.path());
    let key = write(dir.path(), "key.csv", "Question,Answer\n1,A\n");
    let blocked = dir.path().join("report.json");
    fs::create_dir(&blocked).expect("directory in the report's place");

    let mut cfg = RunConfig::new(
        coords.to_string_lossy(),
        sheet.to_string_lossy(),
        key.to_string_lossy(),
    );
    let output = dir.path().join("marked.png");
    cfg.output_path = Some(output.to_string_lossy().into_owned());
    cfg.report_path = Some(blocked.to_string_lossy().into_owned());

    let err = scantron::run(&cfg).unwrap_err();
    assert!(matches!(err, ScantronError::Write { .. }), "got {err}");
    assert!(!output.exists());
}

#[test]
fn encoding_is_repeatable() {
    let dir = TempDir::new().expect("tempdir");
    let assets = load_assets(dir.path(), TWO_OPTIONS);
    let key = [AnswerKeyEntry::new(1, "a"), AnswerKeyEntry::new(1, "b")];
    let style = MarkStyle::default();

    let (first, _) = assets.annotate(&key, &style).expect("first");
    let (second, _) = assets.annotate(&key, &style).expect("second");
    assert_eq!(
        encode(&first, ExportFormat::Png, 90).expect("png"),
        encode(&second, ExportFormat::Png, 90).expect("png")
    );
}
