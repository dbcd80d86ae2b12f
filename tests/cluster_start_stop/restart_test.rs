use std::time::Duration;
use std::time::Instant;

use quorum_agent::create_server;
use quorum_agent::start_instance;
use quorum_agent::stop_instance;
use quorum_agent::InstanceManager;
use quorum_agent::NodeAddress;

use crate::common::cluster_manager;
use crate::common::is_listening;

/// A member can be stopped and started again with a new peer set; its
/// address pair and working directory survive the cycle.
#[tokio::test]
async fn test_restart_with_new_generation() {
    crate::enable_logger();
    let root = tempfile::tempdir().unwrap();
    let (manager, config, launches) = cluster_manager(root.path(), 2);

    let a = create_server(&manager, &config, 0).await.unwrap();
    let b = create_server(&manager, &config, 1).await.unwrap();
    let a = a.parse::<NodeAddress>().unwrap();
    let b = b.parse::<NodeAddress>().unwrap();

    start_instance(&manager, &config, &a.peer.to_string(), 0).await.unwrap();
    stop_instance(&manager, &config, 0).await.unwrap();

    let second_generation = format!("{},{}", a.peer, b.peer);
    start_instance(&manager, &config, &second_generation, 0).await.unwrap();
    assert!(is_listening(&a.client.to_string()).await);

    let launched = launches.lock().clone();
    assert_eq!(launched.len(), 2);
    assert_eq!(launched[0].peers.len(), 1);
    assert_eq!(launched[1].peers.len(), 2);
    assert_eq!(launched[0].data_dir, launched[1].data_dir);
    assert_eq!(launched[0].client_port, launched[1].client_port);

    manager.shutdown_all().await.unwrap();
}

/// Stopping an idle member still answers `stopped`, promptly.
#[tokio::test]
async fn test_stop_idle_member() {
    crate::enable_logger();
    let root = tempfile::tempdir().unwrap();
    let (manager, config, launches) = cluster_manager(root.path(), 1);
    create_server(&manager, &config, 0).await.unwrap();

    let started_at = Instant::now();
    stop_instance(&manager, &config, 0).await.unwrap();

    assert!(started_at.elapsed() < Duration::from_secs(2));
    assert!(launches.lock().is_empty());
    manager.reset_status("server0").await.unwrap();
    manager.shutdown_all().await.unwrap();
}
