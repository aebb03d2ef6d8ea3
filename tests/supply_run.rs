//! Integration tests for run_supply
//!
//! These tests drive a full supply against a mock GeoNames server:
//! - Loading every kind from allCountries
//! - Re-running over an existing database
//! - Per-country downloads when the policy has an allow-list
//! - Failure reporting and cancellation

mod helpers;

use geonames_sync::{run_supply, EntityKind, LoggingTranslations, Policy, SupplyOptions};
use helpers::*;
use httptest::{matchers::*, responders::*, Expectation, Server};
use tokio_util::sync::CancellationToken;

fn serve_country_info(server: &Server) {
    serve(
        server,
        "/dump/countryInfo.txt",
        body(&[
            "#ISO\tISO3\tISO-Numeric\tfips\tCountry".to_string(),
            country_info("3175395", "IT", "Italy", "EU"),
            country_info("3017382", "FR", "France", "EU"),
        ]),
    );
}

fn world() -> Vec<String> {
    vec![
        continent("6255148", "Europe"),
        country("3175395", "IT", "Italian Republic"),
        country("3017382", "FR", "French Republic"),
        division("3174976", "IT", "07", "Lazio"),
        division("3012874", "FR", "11", "Ile-de-France"),
        city("3169070", "IT", "07", "Rome", "2318895"),
        city("2988507", "FR", "11", "Paris", "2138551"),
        // Below the default population threshold
        city("3171140", "IT", "07", "Pescorocchiano", "120"),
    ]
}

fn serve_world(server: &Server) {
    serve_country_info(server);
    serve(
        server,
        "/dump/allCountries.zip",
        zipped("allCountries.txt", &body(&world())),
    );
}

#[tokio::test]
async fn test_supply_loads_every_kind() {
    let server = Server::run();
    serve_world(&server);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, dir.path(), Policy::default());

    let run = run_supply(
        config,
        SupplyOptions::default(),
        CancellationToken::new(),
        &LoggingTranslations,
    )
    .await
    .expect("supply should succeed");

    assert_eq!(run.report.get(EntityKind::Continent).inserted, 1);
    assert_eq!(run.report.get(EntityKind::Country).inserted, 2);
    assert_eq!(run.report.get(EntityKind::Division).inserted, 2);
    assert_eq!(run.report.get(EntityKind::City).inserted, 2);
    assert_eq!(run.report.get(EntityKind::City).skipped, 1);
    assert_eq!(run.db_path, dir.path().join("world.db"));

    let pool = open_db(&run.db_path).await;
    assert_eq!(count(&pool, "continents").await, 1);
    assert_eq!(count(&pool, "countries").await, 2);
    assert_eq!(count(&pool, "divisions").await, 2);
    assert_eq!(count(&pool, "cities").await, 2);

    let (division, country): (String, String) = sqlx::query_as(
        "SELECT d.name, c.code FROM cities ci \
         JOIN divisions d ON d.id = ci.division_id \
         JOIN countries c ON c.id = ci.country_id \
         WHERE ci.geoname_id = 3169070",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(division, "Lazio");
    assert_eq!(country, "IT");

    // Staged downloads were removed
    let staging = dir.path().join("staging");
    assert!(std::fs::read_dir(&staging).unwrap().next().is_none());
}

#[tokio::test]
async fn test_second_supply_updates_in_place() {
    let server = Server::run();
    serve_world(&server);
    let dir = tempfile::tempdir().unwrap();

    let config = test_config(&server, dir.path(), Policy::default());
    run_supply(
        config,
        SupplyOptions::default(),
        CancellationToken::new(),
        &LoggingTranslations,
    )
    .await
    .expect("first supply should succeed");

    let config = test_config(&server, dir.path(), Policy::default());
    let run = run_supply(
        config,
        SupplyOptions::default(),
        CancellationToken::new(),
        &LoggingTranslations,
    )
    .await
    .unwrap();

    assert_eq!(run.report.get(EntityKind::City).inserted, 0);
    assert_eq!(run.report.get(EntityKind::City).updated, 2);
    assert_eq!(run.report.get(EntityKind::Country).updated, 2);

    let pool = open_db(&run.db_path).await;
    assert_eq!(count(&pool, "countries").await, 2);
    assert_eq!(count(&pool, "cities").await, 2);
}

#[tokio::test]
async fn test_allow_list_downloads_only_listed_countries() {
    let server = Server::run();
    serve_country_info(&server);
    serve(
        &server,
        "/dump/no-country.zip",
        zipped("no-country.txt", &body(&[continent("6255148", "Europe")])),
    );
    serve(
        &server,
        "/dump/IT.zip",
        zipped(
            "IT.txt",
            &body(&[
                country("3175395", "IT", "Italian Republic"),
                division("3174976", "IT", "07", "Lazio"),
                city("3169070", "IT", "07", "Rome", "2318895"),
            ]),
        ),
    );
    // Neither the full dump nor other countries may be requested
    server.expect(
        Expectation::matching(request::method_path("GET", "/dump/allCountries.zip"))
            .times(0)
            .respond_with(status_code(404)),
    );
    server.expect(
        Expectation::matching(request::method_path("GET", "/dump/FR.zip"))
            .times(0)
            .respond_with(status_code(404)),
    );

    let dir = tempfile::tempdir().unwrap();
    let policy = Policy {
        countries: vec!["it".to_string()],
        ..Default::default()
    };
    let options = SupplyOptions {
        keep_files: true,
        ..Default::default()
    };
    let config = test_config(&server, dir.path(), policy);

    let run = run_supply(config, options, CancellationToken::new(), &LoggingTranslations)
        .await
        .expect("supply should succeed");

    assert_eq!(run.report.get(EntityKind::Country).inserted, 1);
    assert_eq!(run.report.get(EntityKind::City).inserted, 1);
    let staging = dir.path().join("staging");
    assert!(staging.join("IT.txt").exists());
    assert!(staging.join("no-country.txt").exists());
    assert!(staging.join("countryInfo.txt").exists());
}

#[tokio::test]
async fn test_failed_download_names_the_stage() {
    let server = Server::run();
    serve_country_info(&server);
    server.expect(
        Expectation::matching(request::method_path("GET", "/dump/allCountries.zip"))
            .times(1)
            .respond_with(status_code(404)),
    );
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, dir.path(), Policy::default());

    let error = run_supply(
        config,
        SupplyOptions::default(),
        CancellationToken::new(),
        &LoggingTranslations,
    )
    .await
    .expect_err("supply should fail");

    let message = format!("{:#}", error);
    assert!(message.starts_with("Supply failed"), "{}", message);
    assert!(message.contains("download_dumps stage failed"), "{}", message);
    assert!(message.contains("404"), "{}", message);
}

#[tokio::test]
async fn test_cancelled_run_stops_before_downloading() {
    let server = Server::run();
    serve_world(&server);
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&server, dir.path(), Policy::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let error = run_supply(config, SupplyOptions::default(), cancel, &LoggingTranslations)
        .await
        .expect_err("a cancelled supply should fail");

    let message = format!("{:#}", error);
    assert!(
        message.contains("download_country_info stage failed"),
        "{}",
        message
    );
    assert!(!dir.path().join("staging").join("countryInfo.txt").exists());
}
