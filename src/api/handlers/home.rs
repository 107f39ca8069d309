/*
 * Responsibility
 * - Any method on / (the only route)
 * - One INFO log line per call, then a constant body
 */
use axum::http::StatusCode;

/// Response body, returned byte-for-byte. Served as `text/plain`.
pub const HELLO_BODY: &str = r#"{"message":"Hello World!"}"#;

pub const HELLO_LOG_MESSAGE: &str = "Hello World Logging...";

pub async fn home() -> (StatusCode, &'static str) {
    tracing::info!("{}", HELLO_LOG_MESSAGE);
    (StatusCode::OK, HELLO_BODY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use axum::response::IntoResponse;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::{Layer, registry};

    #[derive(Debug)]
    struct Record {
        level: Level,
        target: String,
        message: String,
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<Record>>>);

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Capture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.0.lock().unwrap().push(Record {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                message: visitor.0,
            });
        }
    }

    #[tokio::test]
    async fn home_returns_ok_with_constant_body() {
        let (status, body) = home().await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"message":"Hello World!"}"#);

        let json: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(json["message"], "Hello World!");
    }

    #[tokio::test]
    async fn home_is_served_as_plain_text() {
        let resp = home().await.into_response();

        assert_eq!(
            resp.headers().get("content-type").unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn home_logs_once_per_call_at_info() {
        let capture = Capture::default();
        let _guard = tracing::subscriber::set_default(registry().with(capture.clone()));

        for _ in 0..3 {
            let (status, body) = home().await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, HELLO_BODY);
        }

        let records = capture.0.lock().unwrap();
        assert_eq!(records.len(), 3, "{records:?}");
        for record in records.iter() {
            assert_eq!(record.level, Level::INFO);
            assert_eq!(record.message, "Hello World Logging...");
            assert!(record.target.ends_with("handlers::home"), "{}", record.target);
        }
    }
}
