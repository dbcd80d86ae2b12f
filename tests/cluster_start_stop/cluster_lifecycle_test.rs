use quorum_agent::create_server;
use quorum_agent::start_instance;
use quorum_agent::stop_instance;
use quorum_agent::Endpoint;
use quorum_agent::Error;
use quorum_agent::InstanceManager;
use quorum_agent::NodeAddress;
use quorum_agent::OrchestratorError;

use crate::common::cluster_manager;
use crate::common::is_listening;

const CLUSTER_SIZE: u32 = 3;

/// Case 1: create three agents, start them as one cluster generation, stop
/// them, then tear everything down.
#[tokio::test]
async fn test_three_node_cluster_start_stop_case1() {
    crate::enable_logger();
    let root = tempfile::tempdir().unwrap();
    let (manager, config, launches) = cluster_manager(root.path(), CLUSTER_SIZE as usize);

    let mut addresses = Vec::new();
    for i in 0..CLUSTER_SIZE {
        let report = create_server(&manager, &config, i).await.unwrap();
        addresses.push(report.parse::<NodeAddress>().unwrap());
    }
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), CLUSTER_SIZE as usize);

    let peer_spec = addresses
        .iter()
        .map(|address| address.peer.to_string())
        .collect::<Vec<_>>()
        .join(",");
    for i in 0..CLUSTER_SIZE {
        start_instance(&manager, &config, &peer_spec, i).await.unwrap();
    }
    for address in &addresses {
        assert!(is_listening(&address.client.to_string()).await);
    }

    // Every member saw the same peer set, numbered by list position
    let launched = launches.lock().clone();
    assert_eq!(launched.len(), CLUSTER_SIZE as usize);
    for (i, spec) in launched.iter().enumerate() {
        assert_eq!(spec.server_id, i as u32);
        assert_eq!(spec.client_port, addresses[i].client.port);
        for (id, address) in addresses.iter().enumerate() {
            assert_eq!(spec.peers.get(id as u32), Some(&address.peer));
        }
    }

    for i in 0..CLUSTER_SIZE {
        stop_instance(&manager, &config, i).await.unwrap();
    }
    for address in &addresses {
        assert!(!is_listening(&address.client.to_string()).await);
    }

    manager.shutdown_all().await.unwrap();
    assert!(manager.is_empty());
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

/// Case 2: teardown of running members stops them without a stop request.
#[tokio::test]
async fn test_teardown_while_running_case2() {
    crate::enable_logger();
    let root = tempfile::tempdir().unwrap();
    let (manager, config, _launches) = cluster_manager(root.path(), 1);

    let address = create_server(&manager, &config, 0)
        .await
        .unwrap()
        .parse::<NodeAddress>()
        .unwrap();
    start_instance(&manager, &config, &address.peer.to_string(), 0)
        .await
        .unwrap();
    assert!(is_listening(&address.client.to_string()).await);

    manager.remove_instance("server0").await.unwrap();

    assert!(!is_listening(&address.client.to_string()).await);
    assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
}

/// Case 3: a malformed request is dropped silently and the waiter times out.
#[tokio::test]
async fn test_malformed_request_gets_no_report_case3() {
    crate::enable_logger();
    let root = tempfile::tempdir().unwrap();
    let (manager, mut config, _launches) = cluster_manager(root.path(), 1);
    config.start_timeout_ms = 300;

    create_server(&manager, &config, 0).await.unwrap();
    manager.reset_status("server0").await.unwrap();
    manager.reconfigure_instance("server0", "nospacehere").await.unwrap();

    let result = manager.get_status("server0", config.start_timeout()).await;
    assert!(matches!(
        result,
        Err(Error::Orchestrator(OrchestratorError::StatusTimeout { .. }))
    ));

    // The agent is still usable afterwards
    let peer = Endpoint::new("127.0.0.1", 3001).to_string();
    start_instance(&manager, &config, &peer, 0).await.unwrap();
    stop_instance(&manager, &config, 0).await.unwrap();
    manager.shutdown_all().await.unwrap();
}
