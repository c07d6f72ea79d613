use sprout::domain::config::ApiConfig;
use sprout::storage::Storage;
use tempfile::TempDir;

#[tokio::test]
async fn init_registers_enabled_features() {
    let dir = TempDir::new().unwrap();
    let storage = Storage::builder().root(dir.path()).connect().await.unwrap();

    let slices = sprout::init(&ApiConfig::default(), &storage).unwrap();

    assert_eq!(slices.len(), sprout::features::ENABLED.len());
    #[cfg(feature = "early-access")]
    assert!(slices.iter().any(|s| s.id == std::any::TypeId::of::<sprout::features::early_access::EarlyAccess>()));
}

#[test]
fn router_documents_every_route() {
    let (_, api) = sprout::server::router::api_router().split_for_parts();

    assert!(api.paths.paths.contains_key("/health"));
    #[cfg(feature = "early-access")]
    assert!(api.paths.paths.contains_key("/api/early-access"));
    assert!(sprout::features::is_enabled("early-access") == cfg!(feature = "early-access"));
}
