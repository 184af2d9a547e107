use openjobmarket::config::Config;
use openjobmarket::db::Store;

const ADMIN_API_KEY: &str = "ojm_default_api_key_please_regenerate";

#[tokio::test]
async fn store_opens_and_migrates_in_memory() {
    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("store should open");

    store.ping().await.expect("ping should succeed");

    assert_eq!(store.count_jobs().await.unwrap(), 0);
    assert_eq!(store.open_report_count().await.unwrap(), 0);
}

#[tokio::test]
async fn migration_seeds_default_admin() {
    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .unwrap();

    let admin = store
        .get_user_by_username("admin")
        .await
        .unwrap()
        .expect("admin user seeded by migration");
    assert!(admin.is_admin);
    assert_eq!(admin.profile_id, None);

    assert!(store.verify_user_password("admin", "password").await.unwrap());
    assert!(!store.verify_user_password("admin", "nope").await.unwrap());

    let by_key = store.verify_api_key(ADMIN_API_KEY).await.unwrap();
    assert_eq!(by_key.map(|u| u.username), Some("admin".to_string()));
}

#[test]
fn default_config_is_valid() {
    let config = Config::default();
    config.validate().expect("default config should validate");
}
