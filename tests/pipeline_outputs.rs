use std::fs;
use std::path::Path;

use analysis_corpus::{CorpusError, OutputPaths, Pipeline, PipelineConfig};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

fn pinned() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 11, 9, 30, 0).unwrap()
}

fn write_record(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body.as_bytes()).unwrap();
}

const FIXTURES: &[(&str, &str)] = &[
    (
        "augustine_01_aristoteles.json",
        r#"{
            "metadata": {"model": "m1", "run": "11jan2026"},
            "aristotelian_modes_analysis": {
                "logos": {"score": 8, "analysis": "clear\nline"},
                "pathos": {"score": 6},
                "ethos": {"score": 7}
            },
            "overall_picture": {"overall_rhetorical_score": 7}
        }"#,
    ),
    (
        "augustine_01_kolb.json",
        r#"{
            "metadata": {"model": "m2"},
            "kolb_phases_analysis": {"phase_1_concrete_experience": {"score": 5}},
            "overall_picture": {"overall_kolb_score": 6}
        }"#,
    ),
    (
        "barth_01_aristoteles.json",
        r#"[{
            "aristotelian_modes_analysis": {"logos": {"score": 4}},
            "overall_picture": {"overall_rhetorical_score": 5}
        }]"#,
    ),
    (
        "barth_02_kolb.json",
        r#"{"overall_picture": {"overall_kolb_score": 9}}"#,
    ),
    (
        "barth_02_B_kolb.json",
        r#"{"overall_picture": {"overall_kolb_score": 1}}"#,
    ),
    ("barth_03_dekker.json", "{ not json"),
    ("statistics.json", "{}"),
    ("notes.txt", "ignored"),
];

fn fixture_dir(root: &Path, reverse: bool) -> std::path::PathBuf {
    let dir = root.join(if reverse { "docs_reversed" } else { "docs" });
    fs::create_dir_all(&dir).unwrap();
    let mut fixtures: Vec<&(&str, &str)> = FIXTURES.iter().collect();
    if reverse {
        fixtures.reverse();
    }
    for (name, body) in fixtures {
        write_record(&dir, name, body);
    }
    dir
}

fn run(input: &Path, out: &Path) -> OutputPaths {
    let outputs = OutputPaths::under(out);
    Pipeline::new(PipelineConfig::new(input).with_outputs(outputs.clone()))
        .run(pinned())
        .unwrap();
    outputs
}

#[test]
fn repeated_runs_are_byte_identical() {
    let temp = tempfile::tempdir().unwrap();
    let first_input = fixture_dir(temp.path(), false);
    let second_input = fixture_dir(temp.path(), true);
    let first = run(&first_input, &temp.path().join("out_a"));
    let second = run(&second_input, &temp.path().join("out_b"));

    for (a, b) in [
        (&first.export, &second.export),
        (&first.statistics, &second.statistics),
        (&first.distribution, &second.distribution),
        (&first.completeness, &second.completeness),
    ] {
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap(), "{}", a.display());
    }
}

#[test]
fn export_has_one_quoted_row_per_primary_case() {
    let temp = tempfile::tempdir().unwrap();
    let input = fixture_dir(temp.path(), false);
    let outputs = run(&input, &temp.path().join("out"));

    let text = fs::read_to_string(&outputs.export).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);

    let header: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(&header[..3], &["\"subject_id\"", "\"case_id\"", "\"case_key\""]);
    let data_columns: Vec<&str> = header[3..].iter().map(|c| c.trim_matches('"')).collect();
    let mut sorted = data_columns.clone();
    sorted.sort();
    assert_eq!(sorted, data_columns);
    assert!(header.contains(&"\"metadata.model\""));
    assert!(header.contains(&"\"aristoteles.logos.score\""));

    assert!(lines[1].starts_with("\"augustine\"\t\"01\"\t\"augustine_01\""));
    assert!(lines[2].starts_with("\"barth\"\t\"01\"\t\"barth_01\""));
    assert!(lines[3].starts_with("\"barth\"\t\"02\"\t\"barth_02\""));
    assert!(!text.contains("02_B"));

    let model_idx = header.iter().position(|c| *c == "\"metadata.model\"").unwrap();
    let augustine: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(augustine[model_idx], "\"m1\"");
    assert!(text.contains("\"clear line\""));
    for line in &lines {
        assert_eq!(line.split('\t').count(), header.len());
    }
}

#[test]
fn statistics_skip_repeat_runs_and_carry_the_timestamp() {
    let temp = tempfile::tempdir().unwrap();
    let input = fixture_dir(temp.path(), false);
    let outputs = run(&input, &temp.path().join("out"));

    let stats: Value = serde_json::from_str(&fs::read_to_string(&outputs.statistics).unwrap()).unwrap();
    assert_eq!(stats["generated_at"], "2026-01-11T09:30:00Z");
    assert_eq!(stats["subjects"], serde_json::json!(["augustine", "barth"]));
    assert_eq!(stats["summary"]["aristoteles_Logos"]["augustine"]["mean"], 8.0);
    assert_eq!(stats["summary"]["aristoteles_Logos"]["barth"]["count"], 1);
    assert_eq!(stats["summary"]["kolb_Overall"]["barth"]["mean"], 9.0);
    assert_eq!(stats["summary"]["kolb_Overall"]["barth"]["stdDev"], 0.0);

    let violin: Value =
        serde_json::from_str(&fs::read_to_string(&outputs.distribution).unwrap()).unwrap();
    assert_eq!(violin["case_counts"]["barth"], 2);
    assert_eq!(
        violin["summary"]["aristoteles_Overall"]["augustine"]["values"],
        serde_json::json!([7.0])
    );
}

#[test]
fn completeness_reports_read_errors_and_missing_files() {
    let temp = tempfile::tempdir().unwrap();
    let input = fixture_dir(temp.path(), false);
    let outputs = run(&input, &temp.path().join("out"));

    let text = fs::read_to_string(&outputs.completeness).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "subject_id\tcase_id\tcase_key\tdomain\tissue_kind\tfield\tdescription"
    );
    assert!(lines.iter().any(|line| line.starts_with("barth\t03\tbarth_03\tdekker\tread_error\t\tError reading file: ")));
    assert!(lines.contains(
        &"barth\t02_B\tbarth_02_B\taristoteles\tmissing_file\t\tFile barth_02_B_aristoteles.json does not exist"
    ));
    assert!(lines.iter().any(|line| {
        line.starts_with("augustine\t01\taugustine_01\tkolb\tmissing_field\treflective_observation.score\t")
    }));
    // Five cases known from filenames, nine expected domains each.
    let missing_files = lines
        .iter()
        .filter(|line| line.contains("\tmissing_file\t"))
        .count();
    assert_eq!(missing_files, 7 + 8 + 8 + 8 + 8);
}

#[test]
fn empty_input_creates_no_outputs() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("docs");
    fs::create_dir(&input).unwrap();
    write_record(&input, "violin_data.json", "{}");
    let outputs = OutputPaths::under(temp.path().join("out"));
    let err = Pipeline::new(PipelineConfig::new(&input).with_outputs(outputs.clone()))
        .run(pinned())
        .unwrap_err();
    assert!(matches!(err, CorpusError::EmptyCorpus { .. }));
    assert!(!outputs.export.exists());
    assert!(!outputs.completeness.exists());
}

#[test]
fn repeat_runs_alone_create_no_outputs() {
    let temp = tempfile::tempdir().unwrap();
    let input = temp.path().join("docs");
    fs::create_dir(&input).unwrap();
    write_record(
        &input,
        "solle_01_B_kolb.json",
        r#"{"overall_picture": {"overall_kolb_score": 8}}"#,
    );
    let outputs = OutputPaths::under(temp.path().join("out"));
    let err = Pipeline::new(PipelineConfig::new(&input).with_outputs(outputs.clone()))
        .run(pinned())
        .unwrap_err();
    assert!(matches!(err, CorpusError::EmptyCorpus { .. }));
    for path in [
        &outputs.export,
        &outputs.statistics,
        &outputs.distribution,
        &outputs.completeness,
    ] {
        assert!(!path.exists(), "{}", path.display());
    }
}
