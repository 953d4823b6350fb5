//! Log events emitted while restyling a file

use std::io;
use std::sync::{Arc, Mutex};

use styler_core::{
    CommentStore, Config, Context, Meta, Node, Result, Rule, RuleEngine, SourceFile, Step,
    StylerError, Zipper,
};
use tracing_subscriber::fmt::writer::MakeWriter;

#[derive(Clone, Default)]
struct CapturedLogs {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn as_string(&self) -> String {
        match self.inner.lock() {
            Ok(guard) => String::from_utf8_lossy(&guard).to_string(),
            Err(_) => String::new(),
        }
    }
}

struct CapturedWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut guard) = self.inner.lock() {
            guard.extend_from_slice(buf);
            Ok(buf.len())
        } else {
            Err(io::Error::other("failed to lock captured logs"))
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct RejectTodo;

impl Rule for RejectTodo {
    fn id(&self) -> &'static str {
        "reject_todo"
    }

    fn run(&self, zipper: &mut Zipper, _ctx: &mut Context<'_>) -> Result<Step> {
        if zipper.node().is_call_to("todo") {
            return Err(StylerError::config_error("todo() is not allowed"));
        }
        Ok(Step::Continue)
    }
}

fn capture<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(logs.clone())
        .finish();
    let value = tracing::subscriber::with_default(subscriber, f);
    (value, logs.as_string())
}

#[test]
fn skipped_rule_failure_is_logged_with_rule_and_file() {
    let ast = Node::block(
        Meta::at(1),
        vec![Node::call("todo", Meta::at(1), vec![]), Node::call("done", Meta::at(2), vec![])],
    );
    let file = SourceFile::new("lib/tasks.ex", ast, CommentStore::default());
    let engine = RuleEngine::new(vec![Box::new(RejectTodo)]);

    let (result, logs) = capture(|| engine.rewrite(file, &Config::default()));

    assert!(result.is_ok());
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("skipping failed rule"), "{logs}");
    assert!(logs.contains("'reject_todo'"), "{logs}");
    assert!(logs.contains("lib/tasks.ex"), "{logs}");
}

#[test]
fn file_start_and_finish_are_logged_at_debug() {
    let file = SourceFile::new("lib/empty.ex", Node::nil(), CommentStore::default());

    let (_, logs) = capture(|| RuleEngine::default().rewrite(file, &Config::default()));

    assert!(logs.contains("restyling file"), "{logs}");
    assert!(logs.contains("finished file"), "{logs}");
}
