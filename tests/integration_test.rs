use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use wine_report::config::Config;
use wine_report::error::ReportError;
use wine_report::pipeline;

fn write_fixtures(dir: &Path) -> Result<()> {
    fs::write(
        dir.join("exports.csv"),
        "year,country,volume,value_usd\n\
         2021,Estados Unidos,1000000,5000000\n\
         2021,Alemanha,400000,1600000\n\
         2022,Estados Unidos,1100000,5700000\n\
         2022,Alemanha,450000,1900000\n\
         2023,Estados Unidos,1250000,6600000\n\
         2023,Alemanha,500000,2200000\n",
    )?;
    fs::write(
        dir.join("climate.csv"),
        "year,region,avg_temperature,precipitation_mm,sunny_days\n\
         2021,Serra Gaúcha,24.1,1250,240\n\
         2022,Serra Gaúcha,24.9,1180,251\n\
         2023,Serra Gaúcha,25.6,1120,260\n",
    )?;
    fs::write(
        dir.join("demographics.csv"),
        "year,country,population,income_per_capita\n\
         2021,Brasil,213000000,9100\n\
         2022,Brasil,215000000,9300\n\
         2023,Brasil,217000000,9550\n",
    )?;
    fs::write(
        dir.join("economics.csv"),
        "year,country,gdp,exchange_rate,inflation_rate\n\
         2021,Brasil,1800000000000,5.4,10.1\n\
         2022,Brasil,1900000000000,5.2,5.8\n\
         2023,Brasil,2100000000000,5.0,4.6\n",
    )?;
    fs::write(
        dir.join("ratings.csv"),
        "year,variety,avg_score,avg_price\n\
         2021,Merlot,85.0,21.0\n\
         2022,Merlot,86.5,22.5\n\
         2023,Merlot,88.0,24.0\n",
    )?;
    Ok(())
}

fn write_config(dir: &Path, extra_report_keys: &str) -> Result<Config> {
    let config_path = dir.join("config.toml");
    fs::write(
        &config_path,
        format!(
            r#"
[inputs]
exports = "{dir}/exports.csv"
climate = "{dir}/climate.csv"
demographics = "{dir}/demographics.csv"
economics = "{dir}/economics.csv"
ratings = "{dir}/ratings.csv"

[analysis]
start_year = 2021
end_year = 2023
projection_until = 2026
top_markets = 3

[report]
output_path = "{dir}/report.txt"
{extra}
"#,
            dir = dir.display(),
            extra = extra_report_keys,
        ),
    )?;
    Ok(Config::load(&config_path)?)
}

#[test]
fn test_full_pipeline_writes_report() -> Result<()> {
    let temp_dir = tempdir()?;
    let dir = temp_dir.path();
    write_fixtures(dir)?;
    let config = write_config(dir, &format!("summary_json_path = \"{}/summary.json\"", dir.display()))?;

    let result = pipeline::run(&config)?;
    assert_eq!(result.records_loaded, 18);
    assert_eq!(result.sections_written, 5);

    let report = fs::read_to_string(dir.join("report.txt"))?;
    assert!(report.contains("Resumo Executivo"));
    assert!(report.contains("Metodologia"));
    assert!(report.contains("Principais Descobertas"));
    assert!(report.contains("Projeções Futuras"));
    assert!(report.contains("Conclusões"));

    // 4.7M liters total across both countries and all three years
    assert!(report.contains("Volume total exportado: 4.7 milhões de litros"));
    // Top market by value is Estados Unidos
    assert!(report.contains("1. Estados Unidos"));

    let summary: serde_json::Value = serde_json::from_str(&fs::read_to_string(dir.join("summary.json"))?)?;
    assert_eq!(summary["total"]["count"], 6);
    assert!(summary["yearly"]["2022"]["volume_liters"].as_f64().unwrap() > 0.0);
    Ok(())
}

#[test]
fn test_section_toggles_respected() -> Result<()> {
    let temp_dir = tempdir()?;
    let dir = temp_dir.path();
    write_fixtures(dir)?;
    let config = write_config(dir, "projecoes_futuras = false\nmetodologia = false")?;

    let result = pipeline::run(&config)?;
    assert_eq!(result.sections_written, 3);

    let report = fs::read_to_string(dir.join("report.txt"))?;
    assert!(!report.contains("Projeções Futuras"));
    assert!(!report.contains("Metodologia"));
    Ok(())
}

#[test]
fn test_malformed_row_aborts_with_dataset_and_line() -> Result<()> {
    let temp_dir = tempdir()?;
    let dir = temp_dir.path();
    write_fixtures(dir)?;
    fs::write(
        dir.join("exports.csv"),
        "year,country,volume,value_usd\n\
         2021,Estados Unidos,1000000,5000000\n\
         2022,Estados Unidos,not-a-number,5700000\n",
    )?;
    let config = write_config(dir, "")?;

    let err = pipeline::run(&config).unwrap_err();
    match err {
        ReportError::Parse { line, .. } => assert_eq!(line, 3),
        other => panic!("expected Parse error, got {:?}", other),
    }
    let message = format!("{}", pipeline::run(&config).unwrap_err());
    assert!(message.contains("export dataset"));
    assert!(message.contains("line 3"));
    Ok(())
}

#[test]
fn test_empty_export_dataset_is_not_an_error_without_projections() -> Result<()> {
    let temp_dir = tempdir()?;
    let dir = temp_dir.path();
    write_fixtures(dir)?;
    fs::write(dir.join("exports.csv"), "year,country,volume,value_usd\n")?;
    let config = write_config(
        dir,
        "projecoes_futuras = false\nprincipais_descobertas = false",
    )?;

    let result = pipeline::run(&config)?;
    assert_eq!(result.sections_written, 3);

    let report = fs::read_to_string(dir.join("report.txt"))?;
    assert!(report.contains("Volume total exportado: 0.0 milhões de litros"));
    Ok(())
}

#[test]
fn test_projection_on_short_history_is_insufficient_data() -> Result<()> {
    let temp_dir = tempdir()?;
    let dir = temp_dir.path();
    write_fixtures(dir)?;
    fs::write(
        dir.join("exports.csv"),
        "year,country,volume,value_usd\n\
         2022,Estados Unidos,1000000,5000000\n\
         2023,Estados Unidos,1100000,5700000\n",
    )?;
    let config = write_config(dir, "principais_descobertas = false")?;

    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, ReportError::InsufficientData { .. }));
    Ok(())
}
