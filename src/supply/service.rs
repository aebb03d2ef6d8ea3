// supply/service.rs
// Runs the suppliers in hierarchy order for full and incremental supply

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use sqlx::SqlitePool;

use crate::config::Policy;
use crate::error_handling::SupplyError;
use crate::models::EntityKind;
use crate::reader::{FileReader, COUNTRY_INFO, DELETES, GEONAMES};
use crate::storage::delete_by_geoname_ids;

use super::country_info::CountryInfoTable;
use super::pipeline::supply_file;
use super::registry::SupplierRegistry;
use super::report::{KindReport, SupplyReport};
use super::Supplier;

/// Local source files of a full supply.
#[derive(Debug, Clone, Default)]
pub struct SupplyFiles {
    /// `countryInfo.txt`; required when countries are enabled and no table
    /// was loaded with [`SupplyService::add_country_info`]
    pub country_info: Option<PathBuf>,
    /// Main dump files: `allCountries.txt`, or the per-country dumps
    pub geonames: Vec<PathBuf>,
}

/// Entry point for full and incremental supply.
///
/// Every write goes through the suppliers, one entity kind at a time and
/// parents first, so a child stage always sees the rows its parent stage
/// committed.
pub struct SupplyService {
    pool: SqlitePool,
    policy: Arc<Policy>,
    country_info: Arc<CountryInfoTable>,
    batch_size: usize,
}

impl SupplyService {
    pub fn new(pool: SqlitePool, policy: Policy, batch_size: usize) -> Self {
        Self {
            pool,
            policy: Arc::new(policy),
            country_info: Arc::new(CountryInfoTable::default()),
            batch_size,
        }
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn country_info(&self) -> &CountryInfoTable {
        &self.country_info
    }

    /// (Re)loads the country-info side table. Nothing is written to the store.
    pub async fn add_country_info(&mut self, path: &Path) -> Result<usize, SupplyError> {
        let table = CountryInfoTable::load(&FileReader::new(path, &COUNTRY_INFO)).await?;
        let loaded = table.len();
        self.country_info = Arc::new(table);
        Ok(loaded)
    }

    /// Full load of every enabled kind, parents first.
    pub async fn supply(&mut self, files: &SupplyFiles) -> Result<SupplyReport, SupplyError> {
        self.policy.validate()?;
        if let Some(path) = &files.country_info {
            self.add_country_info(path).await?;
        }
        let readers: Vec<FileReader> = files
            .geonames
            .iter()
            .map(|path| FileReader::new(path, &GEONAMES))
            .collect();
        self.run_enabled(&readers).await
    }

    /// Applies a modifications feed.
    ///
    /// The feed mixes every kind, so it is read once per enabled kind in
    /// hierarchy order; a country added by the feed is visible to the
    /// divisions and cities of the same feed.
    pub async fn modify(&self, path: &Path) -> Result<SupplyReport, SupplyError> {
        info!("Applying modifications from {}", path.display());
        self.run_enabled(&[FileReader::new(path, &GEONAMES)]).await
    }

    /// Applies a deletes feed, children first.
    pub async fn delete(&self, path: &Path) -> Result<SupplyReport, SupplyError> {
        info!("Applying deletes from {}", path.display());
        let reader = FileReader::new(path, &DELETES);
        let mut ids = Vec::new();
        let mut stream = reader.open().await?;
        while let Some(record) = stream.next_record().await? {
            ids.push(record.required_integer("geonameid")?);
        }
        ids.sort_unstable();
        ids.dedup();

        let mut report = SupplyReport::default();
        for kind in EntityKind::reverse_hierarchy() {
            if !self.policy.is_enabled(kind) {
                continue;
            }
            let deleted = delete_by_geoname_ids(&self.pool, kind, &ids).await?;
            info!("{}: {} deleted", kind, deleted);
            report.record(
                kind,
                &KindReport {
                    deleted,
                    ..Default::default()
                },
            );
        }
        Ok(report)
    }

    async fn run_enabled(&self, readers: &[FileReader]) -> Result<SupplyReport, SupplyError> {
        if self.policy.is_enabled(EntityKind::Country) && self.country_info.is_empty() {
            return Err(SupplyError::Config(
                "countries are enabled but no country info is loaded".to_string(),
            ));
        }

        let registry = SupplierRegistry::new(
            Arc::clone(&self.policy),
            Arc::clone(&self.country_info),
        );
        let mut report = SupplyReport::default();
        for kind in self.policy.enabled_kinds() {
            info!("Supplying {}", kind);
            let mut supplier = registry.build(kind);
            // Parent maps are loaded after the previous kind committed
            supplier.init(&self.pool).await?;

            let mut kind_report = KindReport::default();
            for reader in readers {
                let file_report = supply_file(
                    &self.pool,
                    &supplier,
                    reader,
                    &self.country_info,
                    self.batch_size,
                )
                .await?;
                kind_report.merge(&file_report);
            }
            report.record(kind, &kind_report);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntityToggles;
    use crate::storage::test_helpers::{
        create_test_pool, create_test_pool_with, insert_test_continent, insert_test_country,
        insert_test_division,
    };
    use crate::storage::{count_rows, table_exists};
    use crate::supply::test_data;
    use sqlx::Row;

    fn fixtures(dir: &Path) -> SupplyFiles {
        let country_info = test_data::write_file(
            dir,
            "countryInfo.txt",
            &[
                "#ISO\tISO3\t...".to_string(),
                test_data::country_info("3175395", "IT", "Italy", "EU"),
                test_data::country_info("3017382", "FR", "France", "EU"),
            ],
        );
        let all = test_data::write_file(
            dir,
            "allCountries.txt",
            &[
                test_data::continent("6255148", "Europe"),
                test_data::country("3175395", "IT", "Italian Republic"),
                test_data::country("3017382", "FR", "French Republic"),
                test_data::division("3174976", "IT", "07", "Lazio"),
                test_data::division("3012874", "FR", "11", "Ile-de-France"),
                test_data::city("3169070", "IT", "07", "Rome", "2318895"),
                test_data::city("3178229", "IT", "07", "Civita", "11"),
                test_data::city("2988507", "FR", "11", "Paris", "2138551"),
            ],
        );
        SupplyFiles {
            country_info: Some(country_info),
            geonames: vec![all],
        }
    }

    async fn city_names(pool: &SqlitePool) -> Vec<String> {
        sqlx::query("SELECT name FROM cities ORDER BY name")
            .fetch_all(pool)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.get::<String, _>("name"))
            .collect()
    }

    #[tokio::test]
    async fn test_full_supply() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let mut service = SupplyService::new(pool.clone(), Policy::default(), 2);

        let report = service.supply(&fixtures(dir.path())).await.unwrap();

        assert_eq!(report.get(EntityKind::Continent).inserted, 1);
        assert_eq!(report.get(EntityKind::Country).inserted, 2);
        assert_eq!(report.get(EntityKind::Division).inserted, 2);
        assert_eq!(report.get(EntityKind::City).inserted, 2);
        assert_eq!(report.get(EntityKind::City).skipped, 1);
        assert_eq!(city_names(&pool).await, vec!["Paris", "Rome"]);
    }

    #[tokio::test]
    async fn test_second_supply_only_updates() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let mut service = SupplyService::new(pool.clone(), Policy::default(), 1000);
        let files = fixtures(dir.path());

        service.supply(&files).await.unwrap();
        let report = service.supply(&files).await.unwrap();

        for kind in EntityKind::hierarchy() {
            assert_eq!(report.get(kind).inserted, 0, "{}", kind);
        }
        assert_eq!(report.get(EntityKind::City).updated, 2);
        assert_eq!(count_rows(&pool, EntityKind::City).await.unwrap(), 2);
        assert_eq!(count_rows(&pool, EntityKind::Country).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_rows_keep_the_last() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let mut service = SupplyService::new(pool.clone(), Policy::default(), 1000);
        let mut files = fixtures(dir.path());
        files.geonames.push(test_data::write_file(
            dir.path(),
            "fix.txt",
            &[
                test_data::city("3169070", "IT", "07", "Roma", "2318895"),
                test_data::city("3169070", "IT", "07", "Rome", "2318895"),
                test_data::city("3169070", "IT", "07", "Roma", "2318895"),
            ],
        ));

        let report = service.supply(&files).await.unwrap();
        assert_eq!(report.get(EntityKind::City).inserted, 2);
        assert_eq!(report.get(EntityKind::City).updated, 1);
        assert_eq!(city_names(&pool).await, vec!["Paris", "Roma"]);
    }

    #[tokio::test]
    async fn test_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let policy = Policy {
            countries: vec!["it".to_string()],
            ..Default::default()
        };
        let mut service = SupplyService::new(pool.clone(), policy, 1000);

        let report = service.supply(&fixtures(dir.path())).await.unwrap();

        assert_eq!(report.get(EntityKind::Country).inserted, 1);
        assert_eq!(report.get(EntityKind::Country).skipped, 1);
        assert_eq!(report.get(EntityKind::Division).inserted, 1);
        assert_eq!(city_names(&pool).await, vec!["Rome"]);
    }

    #[tokio::test]
    async fn test_zero_threshold_includes_small_cities() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let policy = Policy {
            population_threshold: 0,
            ..Default::default()
        };
        let mut service = SupplyService::new(pool.clone(), policy, 1000);

        service.supply(&fixtures(dir.path())).await.unwrap();
        assert_eq!(city_names(&pool).await, vec!["Civita", "Paris", "Rome"]);
    }

    #[tokio::test]
    async fn test_disabled_city_has_no_table() {
        let dir = tempfile::tempdir().unwrap();
        let policy = Policy {
            entities: EntityToggles {
                city: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let pool = create_test_pool_with(&policy).await;
        let mut service = SupplyService::new(pool.clone(), policy, 1000);

        let report = service.supply(&fixtures(dir.path())).await.unwrap();

        assert!(!table_exists(&pool, EntityKind::City).await.unwrap());
        assert_eq!(report.get(EntityKind::City), KindReport::default());
        assert_eq!(count_rows(&pool, EntityKind::Division).await.unwrap(), 2);
        assert_eq!(count_rows(&pool, EntityKind::Country).await.unwrap(), 2);
        assert_eq!(count_rows(&pool, EntityKind::Continent).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cities_without_divisions() {
        let dir = tempfile::tempdir().unwrap();
        let policy = Policy {
            entities: EntityToggles {
                division: false,
                ..Default::default()
            },
            ..Default::default()
        };
        let pool = create_test_pool_with(&policy).await;
        let mut service = SupplyService::new(pool.clone(), policy, 1000);

        let report = service.supply(&fixtures(dir.path())).await.unwrap();

        assert!(!table_exists(&pool, EntityKind::Division).await.unwrap());
        assert_eq!(report.get(EntityKind::City).inserted, 2);
        assert_eq!(city_names(&pool).await, vec!["Paris", "Rome"]);
        let detached: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cities WHERE division_id IS NULL")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(detached, 2);
    }

    #[tokio::test]
    async fn test_countries_need_country_info() {
        let pool = create_test_pool().await;
        let mut service = SupplyService::new(pool, Policy::default(), 1000);
        let result = service.supply(&SupplyFiles::default()).await;
        assert!(matches!(result, Err(SupplyError::Config(_))));
    }

    #[tokio::test]
    async fn test_country_before_continent_is_a_referential_error() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let mut service = SupplyService::new(pool.clone(), Policy::default(), 1000);
        let mut files = fixtures(dir.path());
        // No continent row in the dump
        files.geonames = vec![test_data::write_file(
            dir.path(),
            "IT.txt",
            &[test_data::country("3175395", "IT", "Italian Republic")],
        )];

        match service.supply(&files).await {
            Err(SupplyError::Referential(e)) => {
                assert_eq!(e.parent, EntityKind::Continent);
                assert_eq!(e.key, "EU");
            }
            other => panic!("expected a referential error, got {:?}", other.map(|_| ())),
        }
        assert_eq!(count_rows(&pool, EntityKind::Country).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_modify_renames_division_only() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let europe = insert_test_continent(&pool, 6255148, "EU").await;
        let italy = insert_test_country(&pool, 3175395, "IT", europe).await;
        insert_test_division(&pool, 3164603, italy, "07", "Latium").await;

        let mut service = SupplyService::new(pool.clone(), Policy::default(), 1000);
        let info = test_data::write_file(
            dir.path(),
            "countryInfo.txt",
            &[test_data::country_info("3175395", "IT", "Italy", "EU")],
        );
        service.add_country_info(&info).await.unwrap();

        let feed = test_data::write_file(
            dir.path(),
            "modifications-2024-03-01.txt",
            &[test_data::division("3164603", "IT", "07", "Lazio")],
        );
        let report = service.modify(&feed).await.unwrap();

        assert_eq!(report.get(EntityKind::Division).updated, 1);
        for kind in [EntityKind::Continent, EntityKind::Country, EntityKind::City] {
            assert_eq!(report.get(kind).written(), 0, "{}", kind);
        }
        let name: String =
            sqlx::query_scalar("SELECT name FROM divisions WHERE geoname_id = 3164603")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(name, "Lazio");

        // Untouched rows keep the helper's zero timestamps
        let touched: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM countries WHERE updated_at_ms != 0)
                  + (SELECT COUNT(*) FROM continents WHERE updated_at_ms != 0)",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(touched, 0);
        assert_eq!(count_rows(&pool, EntityKind::City).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_modify_respects_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        insert_test_continent(&pool, 6255148, "EU").await;

        let policy = Policy {
            countries: vec!["FR".to_string()],
            ..Default::default()
        };
        let mut service = SupplyService::new(pool.clone(), policy, 1000);
        let info = test_data::write_file(
            dir.path(),
            "countryInfo.txt",
            &[test_data::country_info("3175395", "IT", "Italy", "EU")],
        );
        service.add_country_info(&info).await.unwrap();

        let feed = test_data::write_file(
            dir.path(),
            "modifications-2024-03-01.txt",
            &[test_data::country("3175395", "IT", "Italian Republic")],
        );
        let report = service.modify(&feed).await.unwrap();

        let countries = report.get(EntityKind::Country);
        assert_eq!(countries.skipped, 1);
        assert_eq!(countries.written(), 0);
        assert_eq!(count_rows(&pool, EntityKind::Country).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_modify_adds_parent_and_child_from_one_feed() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        insert_test_continent(&pool, 6255148, "EU").await;

        let mut service = SupplyService::new(pool.clone(), Policy::default(), 1000);
        let info = test_data::write_file(
            dir.path(),
            "countryInfo.txt",
            &[test_data::country_info("3042058", "LI", "Liechtenstein", "EU")],
        );
        service.add_country_info(&info).await.unwrap();

        // Child rows come first in the feed
        let feed = test_data::write_file(
            dir.path(),
            "modifications.txt",
            &[
                test_data::city("3042030", "LI", "11", "Vaduz", "5197"),
                test_data::division("3042034", "LI", "11", "Vaduz"),
                test_data::country("3042058", "LI", "Principality of Liechtenstein"),
            ],
        );
        let report = service.modify(&feed).await.unwrap();

        assert_eq!(report.get(EntityKind::Country).inserted, 1);
        assert_eq!(report.get(EntityKind::Division).inserted, 1);
        assert_eq!(report.get(EntityKind::City).inserted, 1);
        let division_id: Option<i64> =
            sqlx::query_scalar("SELECT division_id FROM cities WHERE geoname_id = 3042030")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(division_id.is_some());
    }

    #[tokio::test]
    async fn test_delete_children_first() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let mut service = SupplyService::new(pool.clone(), Policy::default(), 1000);
        service.supply(&fixtures(dir.path())).await.unwrap();

        let feed = test_data::write_file(
            dir.path(),
            "deletes-2024-03-01.txt",
            &[
                "3174976\tLazio\tduplicate".to_string(),
                "3169070\tRome\tduplicate".to_string(),
            ],
        );
        let report = service.delete(&feed).await.unwrap();

        assert_eq!(report.get(EntityKind::City).deleted, 1);
        assert_eq!(report.get(EntityKind::Division).deleted, 1);
        let remaining: i64 = sqlx::query_scalar(
            "SELECT (SELECT COUNT(*) FROM cities WHERE geoname_id = 3169070)
                  + (SELECT COUNT(*) FROM divisions WHERE geoname_id = 3174976)",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(remaining, 0);
        assert_eq!(count_rows(&pool, EntityKind::City).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleting_a_division_detaches_its_cities() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let policy = Policy {
            population_threshold: 0,
            ..Default::default()
        };
        let mut service = SupplyService::new(pool.clone(), policy, 1000);
        service.supply(&fixtures(dir.path())).await.unwrap();

        let feed = test_data::write_file(
            dir.path(),
            "deletes.txt",
            &["3174976\tLazio\t".to_string()],
        );
        service.delete(&feed).await.unwrap();

        let detached: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cities WHERE division_id IS NULL",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(detached, 2);
    }

    #[tokio::test]
    async fn test_add_country_info_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_test_pool().await;
        let mut service = SupplyService::new(pool.clone(), Policy::default(), 1000);
        let files = fixtures(dir.path());

        let loaded = service
            .add_country_info(files.country_info.as_ref().unwrap())
            .await
            .unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(service.country_info().len(), 2);
        assert_eq!(count_rows(&pool, EntityKind::Country).await.unwrap(), 0);
    }
}
