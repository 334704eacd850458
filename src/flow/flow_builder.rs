use url::Url;

use crate::error::CompileError;
use crate::evidence::evidence_model::EvidenceEvent;
use crate::flow::flow_model::{DEFAULT_FLOW_NAME, Flow};
use crate::segment::segmenter::{SegmenterConfig, segment_events, segment_events_traced};
use crate::trace::logger::TraceLogger;

/// Build a flow: segmented steps named after the first event's host.
pub fn build_flow(events: &[EvidenceEvent], config: &SegmenterConfig) -> Result<Flow, CompileError> {
    Ok(Flow {
        name: flow_name(events)?,
        steps: segment_events(events, config),
    })
}

/// [`build_flow`] with a segmentation trace.
pub fn build_flow_traced(
    events: &[EvidenceEvent],
    config: &SegmenterConfig,
    tracer: &TraceLogger,
) -> Result<Flow, CompileError> {
    Ok(Flow {
        name: flow_name(events)?,
        steps: segment_events_traced(events, config, tracer),
    })
}

/// Hostname of the first event's URL, or the default name when that URL is
/// absent or empty. A non-empty URL that does not parse is an error.
pub fn flow_name(events: &[EvidenceEvent]) -> Result<String, CompileError> {
    let url = match events.first().and_then(|e| e.page_url()) {
        Some(url) => url,
        None => return Ok(DEFAULT_FLOW_NAME.to_string()),
    };

    let parsed = Url::parse(url).map_err(|e| CompileError::InvalidUrl {
        url: url.to_string(),
        source: e,
    })?;

    Ok(parsed.host_str().unwrap_or_default().to_string())
}
