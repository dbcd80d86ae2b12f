use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::MockProcessLauncher;
use crate::MockQuorumProcess;
use crate::Reporter;
use crate::Result;

/// Keeps every report in delivery order.
#[derive(Default)]
pub(crate) struct RecordingReporter {
    reports: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn report(
        &self,
        status: &str,
    ) -> Result<()> {
        self.reports.lock().push(status.to_string());
        Ok(())
    }
}

/// Process handle whose shutdown always succeeds.
pub(crate) fn mock_process(server_id: u32) -> MockQuorumProcess {
    let mut process = MockQuorumProcess::new();
    process.expect_server_id().return_const(server_id);
    process.expect_shutdown().returning(|| Ok(()));
    process
}

/// Launcher that hands out [`mock_process`] handles without listening anywhere.
pub(crate) fn mock_launcher(times: usize) -> MockProcessLauncher {
    let mut launcher = MockProcessLauncher::new();
    launcher
        .expect_launch()
        .times(times)
        .returning(|spec| Ok(Box::new(mock_process(spec.server_id))));
    launcher
}
