use std::collections::HashSet;
use std::path::Path;

use axum::{Router, routing::get};
use clap::Parser;

use clean_eats::config::Config;
use clean_eats::data::loader::{load_file, load_source};

const EXPORT: &str = "\
CAMIS,DBA,BORO,BUILDING,STREET,ZIPCODE,CUISINE DESCRIPTION,INSPECTION DATE,SCORE,GRADE
40511702,LOTUS OF SIAM,Manhattan,123,BROADWAY,10001,Thai,03/04/2019,7,A
";

/// Serves the city export the way the open data portal does, with the
/// format only visible in the path.
async fn spawn_portal() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/api/views/x/rows.csv", get(|| async { EXPORT }));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn dataset_downloads_from_url() {
    let base = spawn_portal().await;
    let ds = load_source(&format!("{base}/api/views/x/rows.csv?accessType=DOWNLOAD"))
        .await
        .unwrap();

    assert_eq!(ds.len(), 1);
    assert_eq!(ds.records[0].name, "LOTUS OF SIAM");
    assert_eq!(ds.records[0].address.full(), "123 BROADWAY, Manhattan 10001");
}

#[tokio::test]
async fn failed_download_is_an_error() {
    let base = spawn_portal().await;
    let err = load_source(&format!("{base}/api/views/y/rows.csv"))
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("404"), "{err:#}");
}

#[tokio::test]
async fn missing_dataset_stops_startup() {
    let config = Config::try_parse_from([
        "clean-eats",
        "--dataset",
        "/nonexistent/inspections.csv",
        "--bind",
        "127.0.0.1:0",
    ])
    .unwrap();

    let err = clean_eats::run(config).await.unwrap_err();
    assert!(err.to_string().contains("loading inspection dataset"), "{err:#}");
}

#[test]
fn bundled_sample_is_generator_output() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/inspections.csv");
    let ds = load_file(&path).unwrap();

    // `generate_sample` with its fixed seed: 120 restaurants over 8 cuisines.
    let restaurants: HashSet<_> = ds.records.iter().map(|r| r.restaurant_key()).collect();
    assert_eq!(ds.len(), 296);
    assert_eq!(restaurants.len(), 120);
    assert_eq!(ds.cuisines.len(), 8);
    assert_eq!(ds.records[0].name, "BLUE THAI 1");
}
