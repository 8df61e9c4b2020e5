//! Bounded fan-out of counting tasks and fan-in of their outcomes.

use std::io;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::archive::{Shape, classify, sniff_layers, tar_members, zip_members};
use crate::config::Config;
use crate::counter::CounterKind;
use crate::entry::{Entry, Stream, count_stream};
use crate::error::{EngineError, ErrorCenter, Outcome};
use crate::order::Order;
use crate::results::ResultSet;

/// Counting semaphore backed by a bounded channel: a permit is a message in
/// flight. `None` means no bound.
#[derive(Clone)]
pub(crate) struct Semaphore {
    slots: Option<(Sender<()>, Receiver<()>)>,
}

impl Semaphore {
    pub(crate) fn new(max: usize) -> Self {
        let slots = (max > 0).then(|| crossbeam_channel::bounded(max));
        Self { slots }
    }

    /// Blocks while all permits are taken.
    pub(crate) fn acquire(&self) -> Permit {
        match &self.slots {
            Some((tx, rx)) => {
                // cannot fail: `self` keeps a receiver alive
                let _ = tx.send(());
                Permit {
                    slot: Some(rx.clone()),
                }
            }
            None => Permit { slot: None },
        }
    }
}

/// Held for the whole life of a task; released on drop, whatever the outcome.
pub(crate) struct Permit {
    slot: Option<Receiver<()>>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        if let Some(rx) = self.slot.take() {
            let _ = rx.try_recv();
        }
    }
}

/// Schedules one thread per counting task and reports every outcome on the
/// shared channel. The channel closes once the last clone is dropped, which
/// happens only after every task has finished.
#[derive(Clone)]
pub(crate) struct Executor {
    config: Arc<Config>,
    permits: Semaphore,
    tx: Sender<Outcome>,
}

impl Executor {
    pub(crate) fn new(config: Arc<Config>, tx: Sender<Outcome>) -> Self {
        let permits = Semaphore::new(config.max_concurrency);
        Self {
            config,
            permits,
            tx,
        }
    }

    pub(crate) fn send(&self, outcome: Outcome) {
        let _ = self.tx.send(outcome);
    }

    pub(crate) fn schedule(&self, entry: Entry) {
        let permit = self.permits.acquire();
        log::debug!("{}: scheduled at {}", entry.name(), entry.order());
        let name = entry.name().to_owned();
        let worker = self.clone();
        let spawned = thread::Builder::new()
            .name("wildcount-worker".into())
            .spawn(move || worker.process(entry, permit));
        if let Err(source) = spawned {
            self.send(Err(EngineError::Spawn { name, source }));
        }
    }

    fn kind(&self) -> CounterKind {
        self.config.kind
    }

    fn process(&self, entry: Entry, permit: Permit) {
        if self.config.read.no_extract {
            self.send(entry.count(self.kind()));
            return;
        }
        let classified = match classify(entry, self.config.prefix_size) {
            Ok(classified) => classified,
            Err(err) => return self.send(Err(err)),
        };
        let (entry, stream) = (classified.entry, classified.stream);
        if classified.shape == Shape::Zip {
            match zip_members(entry.name(), entry.order(), stream) {
                Ok(members) => {
                    // members wait for their own permits; holding ours here
                    // would starve them when the bound is small
                    drop(permit);
                    for member in members {
                        self.schedule(member);
                    }
                }
                Err(err) => self.send(Err(err)),
            }
            return;
        }
        self.walk(entry.name(), entry.order(), classified.shape, stream);
    }

    /// Counts an already opened stream in the current task, descending into
    /// any containers it holds.
    fn walk(&self, name: &str, order: &Order, shape: Shape, mut stream: Stream<'_>) {
        match shape {
            Shape::Leaf => self.send(count_stream(name, order, stream, self.kind())),
            Shape::Zip => match zip_members(name, order, stream) {
                Ok(members) => {
                    for member in members {
                        match member.open() {
                            Ok(inner) => self.expand_inline(member.name(), member.order(), inner),
                            Err(err) => self.send(Err(err)),
                        }
                    }
                }
                Err(err) => self.send(Err(err)),
            },
            Shape::Tar => {
                let walked = tar_members(name, order, &mut stream, |member, order, inner| {
                    self.expand_inline(&member, &order, inner);
                })
                .and_then(|()| {
                    // trailing padding still has to pass through tee copies
                    io::copy(&mut stream, &mut io::sink())
                        .map(drop)
                        .map_err(|err| EngineError::read(name, err))
                });
                if let Err(err) = walked {
                    self.send(Err(err));
                }
            }
        }
    }

    fn expand_inline(&self, name: &str, order: &Order, stream: Stream<'_>) {
        match sniff_layers(name, stream, self.config.prefix_size) {
            Ok(layers) => self.walk(name, order, layers.shape, layers.stream),
            Err(err) => self.send(Err(err)),
        }
    }
}

/// Drains the outcome channel until every sender is gone.
pub(crate) fn collect(rx: Receiver<Outcome>, kind: CounterKind) -> (ResultSet, ErrorCenter) {
    let mut results = ResultSet::new(kind);
    let mut errors = ErrorCenter::new();
    for outcome in rx {
        match outcome {
            Ok(records) => results.extend(records),
            Err(err) => {
                log::debug!("{err}");
                errors.push(err);
            }
        }
    }
    (results, errors)
}
