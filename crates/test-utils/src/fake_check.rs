use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

use checkset::engine::TaskOutcome;
use checkset::exec::{Check, CheckContext};

/// What a [`FakeCheck`] does once its delay has elapsed.
#[derive(Debug, Clone)]
pub enum Behaviour {
    Pass,
    Fail(String),
    Panic(String),
}

/// One entry of the shared execution log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(String),
    Finished(String),
}

/// Shared record of which fake checks ran, in what order, and how many ran
/// at the same time.
#[derive(Debug, Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
    threads: Mutex<Vec<(String, ThreadId)>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn start(&self, task: &str) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(Event::Started(task.to_string()));
        self.threads
            .lock()
            .unwrap()
            .push((task.to_string(), thread::current().id()));
    }

    fn finish(&self, task: &str) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Finished(task.to_string()));
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Tasks in the order they started.
    pub fn started(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Started(t) => Some(t),
                Event::Finished(_) => None,
            })
            .collect()
    }

    pub fn ran(&self, task: &str) -> bool {
        self.started().iter().any(|t| t == task)
    }

    /// Position of `event` in the log.
    pub fn position(&self, event: &Event) -> Option<usize> {
        self.events().iter().position(|e| e == event)
    }

    /// Assert that `before` finished before `after` started.
    pub fn assert_ordered(&self, before: &str, after: &str) {
        let finished = self
            .position(&Event::Finished(before.to_string()))
            .unwrap_or_else(|| panic!("{before} never finished"));
        let started = self
            .position(&Event::Started(after.to_string()))
            .unwrap_or_else(|| panic!("{after} never started"));
        assert!(
            finished < started,
            "{after} started before {before} finished: {:?}",
            self.events()
        );
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    /// Worker thread each task ran on.
    pub fn thread_of(&self, task: &str) -> Option<ThreadId> {
        self.threads
            .lock()
            .unwrap()
            .iter()
            .find(|(t, _)| t == task)
            .map(|(_, id)| *id)
    }
}

/// A scripted check that reports to a [`Recorder`].
#[derive(Debug, Clone)]
pub struct FakeCheck {
    behaviour: Behaviour,
    delay: Duration,
    log_line: Option<String>,
    recorder: Arc<Recorder>,
}

impl FakeCheck {
    pub fn new(behaviour: Behaviour, recorder: &Arc<Recorder>) -> Self {
        Self {
            behaviour,
            delay: Duration::ZERO,
            log_line: None,
            recorder: Arc::clone(recorder),
        }
    }

    pub fn pass(recorder: &Arc<Recorder>) -> Self {
        Self::new(Behaviour::Pass, recorder)
    }

    pub fn fail(recorder: &Arc<Recorder>, diagnostic: &str) -> Self {
        Self::new(Behaviour::Fail(diagnostic.to_string()), recorder)
    }

    pub fn panics(recorder: &Arc<Recorder>, message: &str) -> Self {
        Self::new(Behaviour::Panic(message.to_string()), recorder)
    }

    /// Sleep this long (on the worker thread) before finishing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Log this line through the shard logger while running.
    pub fn logging(mut self, line: &str) -> Self {
        self.log_line = Some(line.to_string());
        self
    }
}

impl Check for FakeCheck {
    fn execute(&self, ctx: &CheckContext<'_>) -> TaskOutcome {
        self.recorder.start(ctx.task);
        if let Some(line) = &self.log_line {
            ctx.logger.log(line);
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.recorder.finish(ctx.task);

        match &self.behaviour {
            Behaviour::Pass => TaskOutcome::Success,
            Behaviour::Fail(diagnostic) => TaskOutcome::failed(diagnostic.clone()),
            Behaviour::Panic(message) => panic!("{message}"),
        }
    }

    fn describe(&self) -> String {
        format!("fake {:?}", self.behaviour)
    }
}
