use quill_types::StreamEvent;
use serde_json::json;

/// Event name and JSON data for one frame.
///
/// `error` events carry `{"error": message}`.
pub fn event_payload(event: &StreamEvent) -> serde_json::Result<(&'static str, String)> {
    let data = match event {
        StreamEvent::SearchIteration(iteration) => serde_json::to_string(iteration)?,
        StreamEvent::ChatResponse(response) => serde_json::to_string(response)?,
        StreamEvent::Error { message } => json!({ "error": message }).to_string(),
    };
    Ok((event.event_name(), data))
}

/// Full wire frame, terminated by a blank line.
pub fn encode_frame(event: &StreamEvent) -> serde_json::Result<String> {
    let (name, data) = event_payload(event)?;
    Ok(format!("event: {name}\ndata: {data}\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_frame() {
        let frame = encode_frame(&StreamEvent::error("nope")).unwrap();
        assert_eq!(frame, "event: error\ndata: {\"error\":\"nope\"}\n\n");
    }
}
