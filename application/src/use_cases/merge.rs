//! K-way merge of per-party generation streams.
//!
//! [`StreamMerger`] launches every job concurrently and funnels their
//! events into one merged sequence with first-arrived-first-delivered
//! semantics across jobs. Events from different jobs interleave in any
//! order; events within one job keep that job's emission order.
//!
//! Each job runs on its own task in a [`JoinSet`]; a single consumer drains
//! a shared bounded channel. Dropping the [`MergedStream`] drops the
//! `JoinSet`, which aborts every still-running producer task — cancellation
//! propagates to the underlying generation streams and no orphaned work
//! continues.

use crate::ports::generation::AnswerStream;
use futures::future::BoxFuture;
use hustings_domain::{Annotation, GenerationError, GenerationEvent};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Channel capacity of the merged funnel. Producers suspend when the
/// consumer falls this far behind, keeping execution consumer-driven.
const MERGE_BUFFER: usize = 32;

/// One per-party job: an identifying tag plus a thunk that opens the
/// party's generation stream when the merger launches it.
pub struct MergeJob {
    pub party_slug: String,
    pub open: BoxFuture<'static, Result<AnswerStream, GenerationError>>,
}

impl MergeJob {
    pub fn new(
        party_slug: impl Into<String>,
        open: BoxFuture<'static, Result<AnswerStream, GenerationError>>,
    ) -> Self {
        Self {
            party_slug: party_slug.into(),
            open,
        }
    }
}

/// A job-tagged event in the merged sequence.
///
/// `index` is the job's position in the list passed to
/// [`StreamMerger::run`] — the same index the orchestrator assigns to the
/// party's answer row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedEvent {
    pub index: usize,
    pub kind: JobEvent,
}

/// Lifecycle events of one job inside the merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobEvent {
    /// The job's generation stream opened successfully.
    Started,
    /// An incremental chunk from the job's stream.
    Delta {
        text: String,
        annotations: Vec<Annotation>,
    },
    /// The job's final content. Terminal for that job.
    Completed {
        text: String,
        annotations: Vec<Annotation>,
    },
    /// The job failed — either it never opened or it broke mid-stream.
    /// Terminal for that job; sibling jobs keep running.
    Failed(GenerationError),
}

impl JobEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobEvent::Completed { .. } | JobEvent::Failed(_))
    }
}

/// The merged, lazy event sequence.
///
/// Ends (returns `None`) after the last event from the last job to finish.
/// Dropping it aborts all still-running jobs.
pub struct MergedStream {
    receiver: mpsc::Receiver<MergedEvent>,
    // Held for abort-on-drop; tasks park here until the stream is dropped
    // or they finish.
    _tasks: JoinSet<()>,
}

impl MergedStream {
    /// Await the next merged event, `None` once every job is terminal.
    pub async fn next(&mut self) -> Option<MergedEvent> {
        self.receiver.recv().await
    }
}

/// Multi-producer funnel over K per-party jobs.
pub struct StreamMerger;

impl StreamMerger {
    /// Launch all jobs concurrently and return the merged sequence.
    ///
    /// Every job produces `Started`, zero or more `Delta`s, then exactly
    /// one `Completed` or `Failed` — except a job that fails to open, which
    /// produces a single `Failed` with no `Started` before it.
    pub fn run(jobs: Vec<MergeJob>) -> MergedStream {
        let (tx, rx) = mpsc::channel(MERGE_BUFFER);
        let mut tasks = JoinSet::new();

        debug!("Merging {} generation streams", jobs.len());

        for (index, job) in jobs.into_iter().enumerate() {
            let tx = tx.clone();
            tasks.spawn(async move {
                Self::drive_job(index, job, tx).await;
            });
        }

        // The producers hold the only senders: the channel closes when the
        // last job finishes.
        drop(tx);

        MergedStream {
            receiver: rx,
            _tasks: tasks,
        }
    }

    /// Forward one job's events into the funnel until a terminal event.
    ///
    /// A send error means the consumer dropped the merged stream; the task
    /// returns immediately and its stream handle is released.
    async fn drive_job(index: usize, job: MergeJob, tx: mpsc::Sender<MergedEvent>) {
        let slug = job.party_slug;

        let mut stream = match job.open.await {
            Ok(stream) => stream,
            Err(err) => {
                warn!("Generation stream for '{}' failed to open: {}", slug, err);
                let _ = tx
                    .send(MergedEvent {
                        index,
                        kind: JobEvent::Failed(err),
                    })
                    .await;
                return;
            }
        };

        if tx
            .send(MergedEvent {
                index,
                kind: JobEvent::Started,
            })
            .await
            .is_err()
        {
            return;
        }

        while let Some(event) = stream.next().await {
            let kind = match event {
                GenerationEvent::Delta { text, annotations } => JobEvent::Delta { text, annotations },
                GenerationEvent::Completed { text, annotations } => {
                    JobEvent::Completed { text, annotations }
                }
                GenerationEvent::Failed(err) => {
                    warn!("Generation stream for '{}' failed: {}", slug, err);
                    JobEvent::Failed(err)
                }
            };
            let terminal = kind.is_terminal();

            if tx.send(MergedEvent { index, kind }).await.is_err() {
                return;
            }
            if terminal {
                return;
            }
        }

        // The stream's channel closed without a terminal event.
        let _ = tx
            .send(MergedEvent {
                index,
                kind: JobEvent::Failed(GenerationError::Transport(
                    "generation stream ended without completing".to_string(),
                )),
            })
            .await;
    }
}
