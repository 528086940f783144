//! Span propagation through `Task::instrument`

#![cfg(feature = "tracing")]

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use undertow::{Repeat, Task};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (captured, tracing::subscriber::set_default(subscriber))
}

#[tokio::test]
async fn instrumented_task_runs_inside_span_on_every_invocation() {
    let (captured, _guard) = capture();

    let task = Task::from_fn(|| {
        tracing::info!("loading profile");
        7
    })
    .instrument(tracing::info_span!("fetch_profile", user = 42));

    assert_eq!(task.run().await, 7);
    assert_eq!(task.run().await, 7);

    let logs = captured.contents();
    let lines: Vec<&str> = logs
        .lines()
        .filter(|l| l.contains("loading profile"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l.contains("fetch_profile") && l.contains("user=42")));
}

#[tokio::test]
async fn repeat_traces_each_run() {
    let (captured, _guard) = capture();

    Task::of(()).repeat(Repeat::times(2)).run().await;

    let logs = captured.contents();
    assert_eq!(logs.matches("repeating task").count(), 2);
}
