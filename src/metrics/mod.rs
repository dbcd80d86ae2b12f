use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounterVec;
use prometheus::Opts;
use prometheus::Registry;
use tracing::warn;


lazy_static! {
    pub static ref REPORTS_SENT: IntCounterVec = IntCounterVec::new(
        Opts::new("reports_total", "Reports delivered upstream by kind"),
        &["report"]
    )
    .expect("metric can not be created");

    pub static ref PROCESS_TRANSITIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("process_transitions_total", "Consensus process lifecycle transitions"),
        &["transition"]
    )
    .expect("metric can not be created");

    pub static ref READINESS_POLLS: IntCounterVec = IntCounterVec::new(
        Opts::new("readiness_polls_total", "Readiness polls by mode and outcome"),
        &["mode", "outcome"]
    )
    .expect("metric can not be created");

    pub static ref PROTOCOL_REJECTIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("protocol_rejections_total", "Configuration requests ignored by the agent"),
        &["reason"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = {
        let registry = Registry::new_custom(Some("quorum_agent".to_string()), None)
            .expect("registry can be created");
        register_custom_metrics(&registry);
        registry
    };
}

pub(crate) fn register_custom_metrics(registry: &Registry) {
    registry
        .register(Box::new(REPORTS_SENT.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(PROCESS_TRANSITIONS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(READINESS_POLLS.clone()))
        .expect("collector can be registered");
    registry
        .register(Box::new(PROTOCOL_REJECTIONS.clone()))
        .expect("collector can be registered");
}

/// Prometheus text exposition of the agent registry
pub fn gather_metrics() -> String {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        warn!("could not encode agent metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_else(|e| {
        warn!("agent metrics could not be from_utf8'd: {}", e);
        String::default()
    })
}
