use std::time::Duration;

use mockall::predicate::eq;
use mockall::Sequence;

use super::*;
use crate::Error;

fn config() -> OrchestrationConfig {
    OrchestrationConfig::default()
}

#[tokio::test]
async fn test_create_server_assigns_and_returns_address() {
    let mut im = MockInstanceManager::new();
    let mut seq = Sequence::new();
    im.expect_assign_instance()
        .with(eq("server2"), eq(QUORUM_PEER_KIND), eq("2"), eq(50u32))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _, _| Ok(()));
    im.expect_get_status()
        .with(eq("server2"), eq(Duration::from_millis(3000)))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("127.0.0.1:4000,127.0.0.1:4001".to_string()));

    let address = create_server(&im, &config(), 2).await.unwrap();

    assert_eq!(address, "127.0.0.1:4000,127.0.0.1:4001");
}

#[tokio::test]
async fn test_create_server_propagates_assignment_failure() {
    let mut im = MockInstanceManager::new();
    im.expect_assign_instance()
        .times(1)
        .returning(|name, _, _, _| Err(OrchestratorError::NoAvailableContainers(name.to_string()).into()));
    im.expect_get_status().never();

    let result = create_server(&im, &config(), 0).await;

    assert!(matches!(
        result,
        Err(Error::Orchestrator(OrchestratorError::NoAvailableContainers(_)))
    ));
}

#[tokio::test]
async fn test_start_instance_resets_reconfigures_then_waits() {
    let mut im = MockInstanceManager::new();
    let mut seq = Sequence::new();
    im.expect_reset_status()
        .with(eq("server1"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    im.expect_reconfigure_instance()
        .with(eq("server1"), eq("127.0.0.1:3001,127.0.0.1:3002 start"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    im.expect_get_status()
        .with(eq("server1"), eq(Duration::from_millis(5000)))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("started".to_string()));

    start_instance(&im, &config(), "127.0.0.1:3001,127.0.0.1:3002", 1)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_start_instance_rejects_unexpected_status() {
    let mut im = MockInstanceManager::new();
    im.expect_reset_status().returning(|_| Ok(()));
    im.expect_reconfigure_instance().returning(|_, _| Ok(()));
    im.expect_get_status().returning(|_, _| Ok("stopped".to_string()));

    let result = start_instance(&im, &config(), "127.0.0.1:3001", 0).await;

    match result {
        Err(Error::Orchestrator(OrchestratorError::UnexpectedStatus {
            name,
            expected,
            actual,
        })) => {
            assert_eq!(name, "server0");
            assert_eq!(expected, "started");
            assert_eq!(actual, "stopped");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_stop_instance_sends_index_as_peer_list() {
    let mut im = MockInstanceManager::new();
    let mut seq = Sequence::new();
    im.expect_reset_status()
        .with(eq("server3"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    im.expect_reconfigure_instance()
        .with(eq("server3"), eq("3 stop"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok(()));
    im.expect_get_status()
        .with(eq("server3"), eq(Duration::from_millis(3000)))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _| Ok("stopped".to_string()));

    stop_instance(&im, &config(), 3).await.unwrap();
}

#[tokio::test]
async fn test_stop_instance_propagates_status_timeout() {
    let mut im = MockInstanceManager::new();
    im.expect_reset_status().returning(|_| Ok(()));
    im.expect_reconfigure_instance().returning(|_, _| Ok(()));
    im.expect_get_status().returning(|name, duration| {
        Err(OrchestratorError::StatusTimeout {
            name: name.to_string(),
            duration,
        }
        .into())
    });

    let result = stop_instance(&im, &config(), 0).await;

    assert!(matches!(
        result,
        Err(Error::Orchestrator(OrchestratorError::StatusTimeout { .. }))
    ));
}

#[tokio::test]
async fn test_helpers_honor_configured_prefix_and_timeouts() {
    let config = OrchestrationConfig {
        name_prefix: "zk".to_string(),
        assign_weight: 10,
        create_timeout_ms: 100,
        ..Default::default()
    };
    let mut im = MockInstanceManager::new();
    im.expect_assign_instance()
        .with(eq("zk4"), eq(QUORUM_PEER_KIND), eq("4"), eq(10u32))
        .times(1)
        .returning(|_, _, _, _| Ok(()));
    im.expect_get_status()
        .with(eq("zk4"), eq(Duration::from_millis(100)))
        .times(1)
        .returning(|_, _| Ok("h:1,h:2".to_string()));

    assert_eq!(create_server(&im, &config, 4).await.unwrap(), "h:1,h:2");
}
