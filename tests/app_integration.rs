use chrono::NaiveDate;
use realprice::cli::adjust::AdjustOptions;
use realprice::cli::rate::RateOptions;
use realprice::{AppCommand, TableSource};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const API_KEY: &str = "abcdef0123456789abcdef0123456789";

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_fred_mock_server(series_id: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/fred/series/observations"))
            .and(query_param("series_id", series_id))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn write_config(dir: &TempDir, providers: &str) -> String {
    let config_path = dir.path().join("config.yaml");
    let config_content = format!(
        r#"
{providers}
growth_rate: 0.02
data_path: "{}"
"#,
        dir.path().join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path.to_string_lossy().to_string()
}

fn fred_providers(base_url: &str, api_key: Option<&str>) -> String {
    let api_key = api_key.map_or(String::new(), |key| format!("    api_key: \"{key}\"\n"));
    format!("providers:\n  fred:\n    base_url: \"{base_url}\"\n{api_key}    series_id: \"CPIAUCSL\"")
}

fn write_table(path: &Path) {
    fs::write(
        path,
        "observation_date,CPIAUCSL\n2020-01-01,100\n2021-01-01,110\n,\n",
    )
    .expect("Failed to write table");
}

#[test_log::test(tokio::test)]
async fn test_adjust_with_local_table_file() {
    let dir = TempDir::new().unwrap();
    let table_path = dir.path().join("cpi.csv");
    write_table(&table_path);
    // The table file wins over the configured provider, so no key is needed
    let config_path = write_config(&dir, &fred_providers("http://127.0.0.1:9", None));

    let command = AppCommand::Adjust(
        TableSource {
            table_path: Some(table_path),
            series_id: None,
        },
        AdjustOptions {
            from: vec![date(2020, 1, 1), date(2020, 7, 2)],
            to: vec![date(2021, 1, 1)],
            prices: vec![50.0],
            ..Default::default()
        },
    );

    let result = realprice::run_command(command, Some(&config_path)).await;
    assert!(result.is_ok(), "Adjust failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_adjust_with_fred_mock() {
    let mock_response = r#"{
        "observations": [
            {"date": "2020-01-01", "value": "258.687"},
            {"date": "2021-01-01", "value": "262.200"},
            {"date": "2022-01-01", "value": "281.933"}
        ]
    }"#;
    let mock_server = test_utils::create_fred_mock_server("CPIAUCSL", mock_response).await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &fred_providers(&mock_server.uri(), Some(API_KEY)));

    let command = AppCommand::Adjust(
        TableSource::default(),
        AdjustOptions {
            from: vec![date(2020, 6, 1)],
            to: vec![date(2023, 6, 1)],
            prices: vec![10.0, 20.0, 30.0],
            ..Default::default()
        },
    );

    let result = realprice::run_command(command, Some(&config_path)).await;
    assert!(result.is_ok(), "Adjust failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_adjust_rejects_two_date_ranges() {
    let dir = TempDir::new().unwrap();
    let table_path = dir.path().join("cpi.csv");
    write_table(&table_path);
    let config_path = write_config(&dir, "");

    let command = AppCommand::Adjust(
        TableSource {
            table_path: Some(table_path),
            series_id: None,
        },
        AdjustOptions {
            from: vec![date(2020, 1, 1), date(2020, 6, 1)],
            to: vec![date(2021, 1, 1), date(2021, 6, 1)],
            prices: vec![50.0],
            ..Default::default()
        },
    );

    let err = realprice::run_command(command, Some(&config_path))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cannot both be ranges"), "{err}");
}

#[test_log::test(tokio::test)]
async fn test_missing_api_key_is_reported() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &fred_providers("http://127.0.0.1:9", None));

    let command = AppCommand::Rate(
        TableSource::default(),
        RateOptions {
            from: date(2020, 1, 1),
            to: Some(date(2021, 1, 1)),
            growth_rate: None,
        },
    );

    let err = realprice::run_command(command, Some(&config_path))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No FRED API key configured"), "{err}");
}

#[test_log::test(tokio::test)]
async fn test_rate_with_local_series_directory() {
    let dir = TempDir::new().unwrap();
    let series_dir = dir.path().join("series");
    fs::create_dir_all(&series_dir).unwrap();
    write_table(&series_dir.join("CPIAUCSL.csv"));

    let providers = format!(
        "providers:\n  local:\n    directory: \"{}\"",
        series_dir.display()
    );
    let config_path = write_config(&dir, &providers);

    let command = AppCommand::Rate(
        TableSource::default(),
        RateOptions {
            from: date(2020, 1, 1),
            to: Some(date(2021, 1, 1)),
            growth_rate: None,
        },
    );

    let result = realprice::run_command(command, Some(&config_path)).await;
    assert!(result.is_ok(), "Rate failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_series_export_round_trips_through_table_file() {
    let mock_response = r#"{
        "observations": [
            {"date": "2024-01-01", "value": "308.417"},
            {"date": "2024-02-01", "value": "."},
            {"date": "2024-03-01", "value": "312.230"}
        ]
    }"#;
    let mock_server = test_utils::create_fred_mock_server("CPIAUCSL", mock_response).await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &fred_providers(&mock_server.uri(), Some(API_KEY)));
    let output = dir.path().join("export.csv");

    let command = AppCommand::Series {
        series_ids: vec![],
        output: Some(output.clone()),
        refresh: false,
    };
    let result = realprice::run_command(command, Some(&config_path)).await;
    assert!(result.is_ok(), "Series failed with: {:?}", result.err());

    let table = realprice::providers::csv_table::read_table(&output).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.last().unwrap().index, 312.23);
}

#[test_log::test(tokio::test)]
async fn test_refresh_and_clear_cache() {
    let mock_response = r#"{"observations": [{"date": "2024-01-01", "value": "308.417"}]}"#;
    let mock_server = test_utils::create_fred_mock_server("CPIAUCSL", mock_response).await;

    let dir = TempDir::new().unwrap();
    let config_path = write_config(&dir, &fred_providers(&mock_server.uri(), Some(API_KEY)));

    let command = AppCommand::Series {
        series_ids: vec!["CPIAUCSL".to_string()],
        output: None,
        refresh: true,
    };
    let result = realprice::run_command(command, Some(&config_path)).await;
    assert!(result.is_ok(), "Series failed with: {:?}", result.err());

    let result = realprice::run_command(AppCommand::ClearCache, Some(&config_path)).await;
    assert!(result.is_ok(), "Clearing cache failed with: {:?}", result.err());
    assert!(dir.path().join("data").join("cache").exists());
}
