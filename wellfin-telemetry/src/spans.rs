//! Span helpers for the outbound calls the API makes.

use tracing::Span;

/// Span for one generative-model call.
///
/// ```
/// use wellfin_telemetry::model_call_span;
/// let span = model_call_span("gemini-1.5-flash", "task analysis");
/// let _enter = span.enter();
/// ```
pub fn model_call_span(model_name: &str, operation: &str) -> Span {
    tracing::info_span!(
        "model.call",
        model.name = model_name,
        operation = operation,
        otel.kind = "client"
    )
}

/// Span for one push-notification send.
pub fn notification_send_span(kind: &str, recipients: usize) -> Span {
    tracing::info_span!(
        "notification.send",
        notification.kind = kind,
        notification.recipients = recipients,
        otel.kind = "client"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_can_be_entered() {
        let span = model_call_span("gemini-1.5-flash", "schedule optimization");
        let _enter = span.enter();
        let span = notification_send_span("habit_reminder", 1);
        let _enter = span.enter();
    }
}
