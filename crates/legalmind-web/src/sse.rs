//! Server-Sent Events for live updates

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use legalmind_core::{AnalysisEvent, EventBus};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Create an SSE stream from the event bus
///
/// Lagged receivers silently skip the events they missed.
pub fn create_sse_stream(event_bus: &EventBus) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(event_bus.subscribe());

    let sse_stream = stream.filter_map(|result: Result<AnalysisEvent, _>| {
        result.ok().map(|event| Ok(to_sse_event(&event)))
    });

    Sse::new(sse_stream).keep_alive(KeepAlive::default())
}

fn to_sse_event(event: &AnalysisEvent) -> Event {
    let data = serde_json::json!({ "fingerprint": event.fingerprint() });
    Event::default().event(event.kind()).data(data.to_string())
}
