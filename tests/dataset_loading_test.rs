use anyhow::Result;
use tempfile::TempDir;
use tester_match::config::toml_config::DatasetConfig;
use tester_match::domain::ports::DomainStore;
use tester_match::{load_store, MatchError, MatchRequest, MatchService};

fn write_dataset(dir: &TempDir, bugs: &str, ownership: &str) -> Result<DatasetConfig> {
    std::fs::write(
        dir.path().join("devices.csv"),
        "deviceId,description\n1,iPhone 4\n2,Galaxy S3\n",
    )?;
    std::fs::write(
        dir.path().join("testers.csv"),
        "testerId,firstName,lastName,country,lastLogin\n\
         1,Miguel,Bautista,US,2013-08-04 23:57:38\n\
         2,Taybin,Rutkin,GB,2013-01-12 13:27:18\n",
    )?;
    std::fs::write(dir.path().join("bugs.csv"), bugs)?;
    std::fs::write(dir.path().join("tester_device.csv"), ownership)?;

    Ok(DatasetConfig {
        dir: dir.path().to_str().unwrap().to_string(),
        ..DatasetConfig::default()
    })
}

#[tokio::test]
async fn test_load_and_rank_from_csv() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dataset = write_dataset(
        &temp_dir,
        "bugId,deviceId,testerId\n1,1,1\n2,2,1\n3,2,2\n\n",
        "testerId,deviceId\n1,1\n2,2\n",
    )?;

    let store = load_store(&dataset).await?;
    assert_eq!(store.tester_activity()?.len(), 2);
    assert_eq!(store.devices()?.len(), 2);

    let service = MatchService::new(store);
    let ranked = service.match_testers(&MatchRequest::new(["GB"], Vec::<String>::new()))?;
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].last_name, "Rutkin");
    assert_eq!(ranked[0].experience, 1);
    Ok(())
}

#[tokio::test]
async fn test_dangling_bug_reference_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dataset = write_dataset(
        &temp_dir,
        "bugId,deviceId,testerId\n1,9,1\n",
        "testerId,deviceId\n1,1\n",
    )?;

    match load_store(&dataset).await {
        Err(MatchError::IntegrityError { message }) => assert!(message.contains("device 9")),
        other => panic!("expected IntegrityError, got {:?}", other.map(|_| ())),
    }
    Ok(())
}

#[tokio::test]
async fn test_dangling_ownership_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dataset = write_dataset(
        &temp_dir,
        "bugId,deviceId,testerId\n",
        "testerId,deviceId\n7,1\n",
    )?;

    let err = load_store(&dataset).await.unwrap_err();
    assert!(matches!(err, MatchError::IntegrityError { .. }));
    Ok(())
}

#[tokio::test]
async fn test_missing_dataset_dir() {
    let dataset = DatasetConfig {
        dir: "/nonexistent/tester-match-data".to_string(),
        ..DatasetConfig::default()
    };

    let err = load_store(&dataset).await.unwrap_err();
    assert!(matches!(err, MatchError::IoError(_)));
}
