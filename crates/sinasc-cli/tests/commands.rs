use std::fs;
use std::path::Path;

use sinasc_cli::cli::{
    CleanArgs, DescribeArgs, FrequencyArgs, InitConfigArgs, MappingArg, MeansArgs, SummaryArgs,
};
use sinasc_cli::commands::{
    ALL_GROUP, run_clean, run_describe, run_frequency, run_init_config, run_means, run_summary,
};
use sinasc_common::ScalarValue;
use sinasc_config::{RuleConfig, load, save};

fn write_rules(path: &Path) {
    let rules = RuleConfig::empty()
        .with_index_column("CONTADOR")
        .with_restriction("SEXO", [ScalarValue::Int(1), ScalarValue::Int(2)]);
    save(&rules, path).unwrap();
}

fn clean_args(dir: &Path) -> CleanArgs {
    CleanArgs {
        input: dir.join("raw.csv"),
        output: dir.join("out").join("cleaned.csv"),
        config: dir.join("rules.toml"),
        chunk_size: None,
        scope: None,
        strict: false,
        remove_list: None,
    }
}

#[test]
fn init_config_keeps_existing_file_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    let args = InitConfigArgs {
        config: path.clone(),
        force: false,
    };

    let first = run_init_config(&args).unwrap();
    assert!(first.written);
    assert_eq!(first.config, RuleConfig::default());

    write_rules(&path);
    let second = run_init_config(&args).unwrap();
    assert!(!second.written);
    assert_eq!(second.config.restrictions.len(), 1);

    let forced = run_init_config(&InitConfigArgs {
        config: path.clone(),
        force: true,
    })
    .unwrap();
    assert!(forced.written);
    assert_eq!(load(&path).unwrap(), RuleConfig::default());
}

#[test]
fn clean_applies_rules_and_overrides() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("raw.csv"),
        "CONTADOR;SEXO;IDADEMAE\n1;1;20\n2;0;30\n3;2;25\n",
    )
    .unwrap();
    write_rules(&dir.path().join("rules.toml"));
    fs::write(dir.path().join("remove.txt"), "IDADEMAE\n\n").unwrap();

    let mut args = clean_args(dir.path());
    args.chunk_size = Some(1);
    args.remove_list = Some(dir.path().join("remove.txt"));
    let result = run_clean(&args).unwrap();

    assert_eq!(result.report.rows_read, 3);
    assert_eq!(result.report.rows_written, 2);
    assert_eq!(result.report.chunks, 3);
    let written = fs::read_to_string(&args.output).unwrap();
    assert_eq!(written, "CONTADOR;SEXO\n1;1\n3;2\n");
}

#[test]
fn clean_creates_missing_rule_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("raw.csv"), "CONTADOR;SEXO\n1;1\n").unwrap();
    let args = clean_args(dir.path());
    run_clean(&args).unwrap();
    assert_eq!(load(&args.config).unwrap(), RuleConfig::default());
}

#[test]
fn strict_clean_reports_the_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("raw.csv"), "CONTADOR;IDADEMAE\n1;20\n").unwrap();
    write_rules(&dir.path().join("rules.toml"));
    let mut args = clean_args(dir.path());
    args.strict = true;
    let message = format!("{:#}", run_clean(&args).unwrap_err());
    assert!(message.contains("SEXO"), "{message}");
}

#[test]
fn frequency_by_state_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cleaned.csv");
    fs::write(
        &input,
        "CODMUNNASC;IDADEMAE\n120001;20\n120002;22\n310620;25\n310630;31\n",
    )
    .unwrap();
    let output = dir.path().join("freq.csv");
    let tables = run_frequency(&FrequencyArgs {
        input,
        column: "IDADEMAE".to_string(),
        width: 5,
        by_state: Some("CODMUNNASC".to_string()),
        output: Some(output.clone()),
        json: false,
    })
    .unwrap();

    assert_eq!(tables.len(), 2);
    let text = fs::read_to_string(output).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r"
    IDADEMAE;AC;MG
    20 a 25;1;0
    25 a 30;0;0.5
    30 a 35;0;0.5
    35 a 40;0;0
    ");
}

#[test]
fn frequency_of_missing_column_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cleaned.csv");
    fs::write(&input, "IDADEMAE\n20\n").unwrap();
    let err = run_frequency(&FrequencyArgs {
        input,
        column: "PESO".to_string(),
        width: 1,
        by_state: None,
        output: None,
        json: false,
    })
    .unwrap_err();
    assert!(format!("{err:#}").contains("PESO"));
}

#[test]
fn describe_writes_one_file_per_group() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cleaned.csv");
    fs::write(&input, "X;Y\n2;7\n4;\n6;\n").unwrap();
    let output_dir = dir.path().join("describe");
    let groups = run_describe(&DescribeArgs {
        input,
        columns: vec!["X".to_string(), "Y".to_string()],
        by_state: None,
        output_dir: Some(output_dir.clone()),
        json: false,
    })
    .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].0, ALL_GROUP);
    let text = fs::read_to_string(output_dir.join(format!("describe_{ALL_GROUP}.csv"))).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r"
    column;count;mean;std;min;25%;50%;75%;max
    X;3;4;2;2;3;4;5;6
    Y;1;7;;7;7;7;7;7
    ");
}

#[test]
fn summary_by_region() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cleaned.csv");
    fs::write(&input, "CODMUNNASC;PESO\n110001;3000\n120001;3500\n230440;2800\n").unwrap();
    let rows = run_summary(&SummaryArgs {
        input,
        column: "PESO".to_string(),
        geo: "CODMUNNASC".to_string(),
        mapping: MappingArg::Region,
        output: None,
        json: false,
    })
    .unwrap();

    let labels: Vec<&str> = rows.iter().map(|row| row.label.as_str()).collect();
    assert_eq!(
        labels,
        vec!["Norte", "Nordeste", "Sudeste", "Sul", "Centro-Oeste"]
    );
    assert_eq!(rows[0].total_sum, 6500.0);
    assert_eq!(rows[0].count, 2);
    assert_eq!(rows[1].mean, Some(2800.0));
}

#[test]
fn means_by_state_cover_every_state() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("cleaned.csv");
    fs::write(
        &input,
        "CODMUNNASC;RACACORMAE;CONSPRENAT\n120001;1;7\n120001;1;8\n355030;4;6\n",
    )
    .unwrap();
    let groups = run_means(&MeansArgs {
        input,
        category: "RACACORMAE".to_string(),
        columns: vec!["CONSPRENAT".to_string()],
        by_state: Some("CODMUNNASC".to_string()),
        json: false,
    })
    .unwrap();

    assert_eq!(groups.len(), 27);
    assert_eq!(groups[0].0, "AC");
    assert_eq!(groups[0].1[0].means[0].1, Some(7.5));
}
