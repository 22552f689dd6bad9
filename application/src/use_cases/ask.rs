//! Ask Question use case.
//!
//! The per-ask state machine: `Created → Answering → Completed`. Creates
//! the question row, drives the [`StreamMerger`] over the full respondent
//! set, persists each answer's lifecycle transitions and emits the
//! [`AskEvent`] protocol as one lazy sequence.
//!
//! Persistence happens before the matching event is handed out: once the
//! consumer sees an event, the transition behind it has already been
//! committed. Delta content is the one exception — it accumulates in
//! memory and reaches the store only at the answer's terminal transition.

use crate::ports::generation::GenerationGateway;
use crate::ports::store::{AnswerRepository, PartyRepository, QuestionRepository, StoreError};
use crate::use_cases::merge::{JobEvent, MergeJob, MergedEvent, StreamMerger};
use hustings_domain::{AskEvent, Answer, AnswerWithParty, Party, PartyAssistant, Question};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, error, info};

/// Buffer between the orchestrator task and the transport consumer.
const ASK_BUFFER: usize = 32;

/// Errors that abort an ask before any generation stream launches.
#[derive(Error, Debug)]
pub enum AskError {
    /// Empty respondent set — the ask never starts and no question row is
    /// created.
    #[error("No parties given, cannot create question and answers")]
    NoParties,

    /// A slug had no default assistant bound; fatal precondition.
    #[error("No default assistant bound for party '{0}'")]
    NoDefaultAssistant(String),

    /// Registry or question-row persistence failed (includes unknown
    /// slugs, surfaced as [`StoreError::PartyNotFound`]).
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A respondent with its assistant binding resolved and validated.
struct Respondent {
    party: Party,
    assistant: PartyAssistant,
}

/// Per-respondent accumulation state while the merger runs.
struct Slot {
    party: Party,
    answer: Option<Answer>,
    content: String,
}

/// The live event sequence of one ask.
///
/// Consuming it fully drives the ask to completion; dropping it cancels
/// the orchestrator task and, through the merger's abort-on-drop, every
/// still-running generation stream.
pub struct AskStream {
    receiver: mpsc::Receiver<AskEvent>,
    _task: AbortOnDropHandle<()>,
}

impl AskStream {
    /// Await the next event, `None` once the ask is finished (or aborted
    /// by a store failure).
    pub async fn next(&mut self) -> Option<AskEvent> {
        self.receiver.recv().await
    }
}

/// Use case for running one ask end to end.
pub struct AskQuestionUseCase {
    gateway: Arc<dyn GenerationGateway>,
    parties: Arc<dyn PartyRepository>,
    questions: Arc<dyn QuestionRepository>,
    answers: Arc<dyn AnswerRepository>,
}

impl AskQuestionUseCase {
    pub fn new(
        gateway: Arc<dyn GenerationGateway>,
        parties: Arc<dyn PartyRepository>,
        questions: Arc<dyn QuestionRepository>,
        answers: Arc<dyn AnswerRepository>,
    ) -> Self {
        Self {
            gateway,
            parties,
            questions,
            answers,
        }
    }

    /// Start an ask for the given respondent ordering.
    ///
    /// `party_slugs` is already ordered for display (the transport shuffles
    /// once at the boundary); answer indexes follow this ordering. All
    /// slugs are resolved before the question row is created, so a bad
    /// slug leaves nothing behind.
    pub async fn ask(
        &self,
        user_id: &str,
        content: &str,
        party_slugs: Vec<String>,
    ) -> Result<AskStream, AskError> {
        if party_slugs.is_empty() {
            return Err(AskError::NoParties);
        }

        let mut respondents = Vec::with_capacity(party_slugs.len());
        for slug in &party_slugs {
            let resolved = self.parties.find_by_slug(slug).await?;
            let assistant = resolved
                .default_assistant
                .ok_or_else(|| AskError::NoDefaultAssistant(slug.clone()))?;
            respondents.push(Respondent {
                party: resolved.party,
                assistant,
            });
        }

        let question = self.questions.create(user_id, content).await?;
        info!(
            "Created question {} ('{}') for {} parties",
            question.slug,
            question.content,
            respondents.len()
        );

        let (tx, rx) = mpsc::channel(ASK_BUFFER);
        let gateway = Arc::clone(&self.gateway);
        let questions = Arc::clone(&self.questions);
        let answers = Arc::clone(&self.answers);

        let task = tokio::spawn(async move {
            run_ask(gateway, questions, answers, question, respondents, tx).await;
        });

        Ok(AskStream {
            receiver: rx,
            _task: AbortOnDropHandle::new(task),
        })
    }
}

/// The orchestrator task: drives the merger and owns all row mutations.
///
/// Returning early on a failed send means the consumer dropped the stream;
/// dropping the merged stream aborts every producer. Returning early on a
/// store error ends the event stream abruptly, which the transport
/// surfaces as a broken response.
async fn run_ask(
    gateway: Arc<dyn GenerationGateway>,
    questions: Arc<dyn QuestionRepository>,
    answers: Arc<dyn AnswerRepository>,
    question: Question,
    respondents: Vec<Respondent>,
    tx: mpsc::Sender<AskEvent>,
) {
    if tx
        .send(AskEvent::QuestionCreated {
            question: question.clone(),
        })
        .await
        .is_err()
    {
        return;
    }

    let mut slots = Vec::with_capacity(respondents.len());
    let mut jobs = Vec::with_capacity(respondents.len());
    for respondent in respondents {
        let gateway = Arc::clone(&gateway);
        let assistant_id = respondent.assistant.backend_assistant_id.clone();
        let question_content = question.content.clone();
        jobs.push(MergeJob::new(
            respondent.party.slug.clone(),
            Box::pin(async move {
                gateway
                    .stream_answer(&assistant_id, &question_content)
                    .await
            }),
        ));
        slots.push((
            Slot {
                party: respondent.party,
                answer: None,
                content: String::new(),
            },
            respondent.assistant,
        ));
    }

    let mut merged = StreamMerger::run(jobs);
    let mut finished: Vec<AnswerWithParty> = Vec::new();

    while let Some(MergedEvent { index, kind }) = merged.next().await {
        let (slot, assistant) = &mut slots[index];
        let event = match kind {
            JobEvent::Started => {
                let answer = match answers
                    .create(question.id, assistant.id, index as i64)
                    .await
                {
                    Ok(answer) => answer,
                    Err(err) => {
                        error!("Failed to create answer row: {}", err);
                        return;
                    }
                };
                slot.answer = Some(answer.clone());
                AskEvent::AnswerStarted {
                    answer: AnswerWithParty {
                        answer,
                        party: slot.party.clone(),
                    },
                }
            }
            JobEvent::Delta { text, annotations } => {
                let Some(answer) = &slot.answer else {
                    // A delta can only follow Started for the same job.
                    debug!("Dropping delta for unstarted answer (index {})", index);
                    continue;
                };
                slot.content.push_str(&text);
                AskEvent::AnswerDelta {
                    answer_id: answer.id,
                    delta: text,
                    annotations,
                }
            }
            JobEvent::Completed { text, annotations } => {
                let Some(answer) = &slot.answer else {
                    debug!("Dropping completion for unstarted answer (index {})", index);
                    continue;
                };
                let updated = match answers.complete(answer.id, &text, &annotations).await {
                    Ok(updated) => updated,
                    Err(err) => {
                        error!("Failed to persist completed answer: {}", err);
                        return;
                    }
                };
                let with_party = AnswerWithParty {
                    answer: updated,
                    party: slot.party.clone(),
                };
                finished.push(with_party.clone());
                AskEvent::AnswerCompleted { answer: with_party }
            }
            JobEvent::Failed(err) => match &slot.answer {
                Some(answer) => {
                    // Keep whatever text accumulated; completed stays false.
                    let updated = match answers.store_partial(answer.id, &slot.content).await {
                        Ok(updated) => updated,
                        Err(store_err) => {
                            error!("Failed to persist partial answer: {}", store_err);
                            return;
                        }
                    };
                    let answer_id = updated.id;
                    finished.push(AnswerWithParty {
                        answer: updated,
                        party: slot.party.clone(),
                    });
                    AskEvent::AnswerFailed {
                        answer_id: Some(answer_id),
                        party_slug: slot.party.slug.clone(),
                        error: err.to_string(),
                    }
                }
                None => AskEvent::AnswerFailed {
                    answer_id: None,
                    party_slug: slot.party.slug.clone(),
                    error: err.to_string(),
                },
            },
        };

        if tx.send(event).await.is_err() {
            return;
        }
    }

    let updated_question = match questions.mark_completed(question.id).await {
        Ok(updated) => updated,
        Err(err) => {
            error!("Failed to mark question completed: {}", err);
            return;
        }
    };
    info!("Question {} completed", updated_question.slug);

    finished.sort_by_key(|a| a.answer.index);
    let _ = tx
        .send(AskEvent::QuestionCompleted {
            question: updated_question,
            answers: finished,
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::generation::AnswerStream;
    use async_trait::async_trait;
    use chrono::Utc;
    use hustings_domain::{
        Annotation, GenerationError, GenerationEvent, PartyWithAssistant, QuestionWithAnswers,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    // ==================== Test Mocks ====================

    /// Gateway scripted per assistant id. An id absent from the script
    /// fails to open; a `None` script entry parks forever.
    struct MockGateway {
        scripts: Mutex<HashMap<String, Option<Vec<GenerationEvent>>>>,
        park_guard: Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl MockGateway {
        fn new() -> Self {
            Self {
                scripts: Mutex::new(HashMap::new()),
                park_guard: Mutex::new(None),
            }
        }

        fn script(self, assistant_id: &str, events: Vec<GenerationEvent>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(assistant_id.to_string(), Some(events));
            self
        }

        fn parked(self, assistant_id: &str, guard: oneshot::Receiver<()>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(assistant_id.to_string(), None);
            *self.park_guard.lock().unwrap() = Some(guard);
            self
        }
    }

    #[async_trait]
    impl GenerationGateway for MockGateway {
        async fn stream_answer(
            &self,
            backend_assistant_id: &str,
            _question: &str,
        ) -> Result<AnswerStream, GenerationError> {
            let script = self
                .scripts
                .lock()
                .unwrap()
                .get(backend_assistant_id)
                .cloned();
            match script {
                None => Err(GenerationError::BackendUnavailable(format!(
                    "unknown assistant '{}'",
                    backend_assistant_id
                ))),
                Some(None) => {
                    // Emits nothing; drops the guard only once the consumer
                    // side goes away, so tests can observe cancellation.
                    let guard = self.park_guard.lock().unwrap().take();
                    let (tx, rx) = mpsc::channel::<GenerationEvent>(1);
                    tokio::spawn(async move {
                        tx.closed().await;
                        drop(guard);
                    });
                    Ok(AnswerStream::new(rx))
                }
                Some(Some(events)) => {
                    let (tx, rx) = mpsc::channel(8);
                    tokio::spawn(async move {
                        for event in events {
                            if tx.send(event).await.is_err() {
                                return;
                            }
                        }
                    });
                    Ok(AnswerStream::new(rx))
                }
            }
        }
    }

    struct MockParties {
        by_slug: HashMap<String, PartyWithAssistant>,
    }

    impl MockParties {
        fn new(entries: Vec<(&str, Option<&str>)>) -> Self {
            let mut by_slug = HashMap::new();
            for (i, (slug, assistant)) in entries.into_iter().enumerate() {
                let id = i as i64 + 1;
                by_slug.insert(
                    slug.to_string(),
                    PartyWithAssistant {
                        party: Party {
                            id,
                            slug: slug.to_string(),
                            name: Some(slug.to_uppercase()),
                            url: None,
                            logo_image_url: None,
                            manifesto_url: None,
                            default_assistant_id: assistant.map(|_| id),
                        },
                        default_assistant: assistant.map(|a| PartyAssistant {
                            id,
                            created_at: Utc::now(),
                            backend_assistant_id: a.to_string(),
                            party_id: id,
                        }),
                    },
                );
            }
            Self { by_slug }
        }
    }

    #[async_trait]
    impl PartyRepository for MockParties {
        async fn find_by_slug(&self, slug: &str) -> Result<PartyWithAssistant, StoreError> {
            self.by_slug
                .get(slug)
                .cloned()
                .ok_or_else(|| StoreError::PartyNotFound(slug.to_string()))
        }

        async fn all_slugs(&self) -> Result<Vec<String>, StoreError> {
            Ok(self.by_slug.keys().cloned().collect())
        }

        async fn list(&self) -> Result<Vec<Party>, StoreError> {
            Ok(self.by_slug.values().map(|p| p.party.clone()).collect())
        }

        async fn upsert(
            &self,
            _slug: &str,
            _name: Option<&str>,
            _url: Option<&str>,
            _logo_image_url: Option<&str>,
            _manifesto_url: Option<&str>,
        ) -> Result<Party, StoreError> {
            unimplemented!("not used by ask tests")
        }

        async fn set_default_assistant(
            &self,
            _slug: &str,
            _backend_assistant_id: &str,
        ) -> Result<(), StoreError> {
            unimplemented!("not used by ask tests")
        }
    }

    #[derive(Default)]
    struct MockQuestions {
        rows: Mutex<Vec<Question>>,
    }

    #[async_trait]
    impl QuestionRepository for MockQuestions {
        async fn create(&self, user_id: &str, content: &str) -> Result<Question, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let question = Question {
                id: rows.len() as i64 + 1,
                slug: format!("q-{}", rows.len() + 1),
                created_at: Utc::now(),
                content: content.to_string(),
                user_id: user_id.to_string(),
                completed: false,
            };
            rows.push(question.clone());
            Ok(question)
        }

        async fn mark_completed(&self, question_id: i64) -> Result<Question, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let question = rows
                .iter_mut()
                .find(|q| q.id == question_id)
                .ok_or_else(|| StoreError::QuestionNotFound(question_id.to_string()))?;
            question.completed = true;
            Ok(question.clone())
        }

        async fn recent_for_user(
            &self,
            _user_id: &str,
            _limit: usize,
        ) -> Result<Vec<QuestionWithAnswers>, StoreError> {
            Ok(vec![])
        }

        async fn find_by_slug(
            &self,
            _user_id: &str,
            slug: &str,
        ) -> Result<QuestionWithAnswers, StoreError> {
            Err(StoreError::QuestionNotFound(slug.to_string()))
        }
    }

    #[derive(Default)]
    struct MockAnswers {
        rows: Mutex<Vec<Answer>>,
        fail_create: bool,
    }

    #[async_trait]
    impl AnswerRepository for MockAnswers {
        async fn create(
            &self,
            question_id: i64,
            party_assistant_id: i64,
            index: i64,
        ) -> Result<Answer, StoreError> {
            if self.fail_create {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            let mut rows = self.rows.lock().unwrap();
            let answer = Answer {
                id: rows.len() as i64 + 1,
                created_at: Utc::now(),
                question_id,
                party_assistant_id,
                content: String::new(),
                annotations: vec![],
                completed: false,
                index,
            };
            rows.push(answer.clone());
            Ok(answer)
        }

        async fn complete(
            &self,
            answer_id: i64,
            content: &str,
            annotations: &[Annotation],
        ) -> Result<Answer, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let answer = rows
                .iter_mut()
                .find(|a| a.id == answer_id)
                .ok_or_else(|| StoreError::Backend("missing answer".to_string()))?;
            answer.content = content.to_string();
            answer.annotations = annotations.to_vec();
            answer.completed = true;
            Ok(answer.clone())
        }

        async fn store_partial(&self, answer_id: i64, content: &str) -> Result<Answer, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let answer = rows
                .iter_mut()
                .find(|a| a.id == answer_id)
                .ok_or_else(|| StoreError::Backend("missing answer".to_string()))?;
            answer.content = content.to_string();
            Ok(answer.clone())
        }
    }

    fn delta(text: &str) -> GenerationEvent {
        GenerationEvent::Delta {
            text: text.to_string(),
            annotations: vec![],
        }
    }

    fn completed(text: &str) -> GenerationEvent {
        GenerationEvent::Completed {
            text: text.to_string(),
            annotations: vec![],
        }
    }

    struct Fixture {
        use_case: AskQuestionUseCase,
        questions: Arc<MockQuestions>,
        answers: Arc<MockAnswers>,
    }

    fn fixture(gateway: MockGateway, parties: MockParties) -> Fixture {
        let questions = Arc::new(MockQuestions::default());
        let answers = Arc::new(MockAnswers::default());
        Fixture {
            use_case: AskQuestionUseCase::new(
                Arc::new(gateway),
                Arc::new(parties),
                Arc::clone(&questions) as Arc<dyn QuestionRepository>,
                Arc::clone(&answers) as Arc<dyn AnswerRepository>,
            ),
            questions,
            answers,
        }
    }

    async fn collect(mut stream: AskStream) -> Vec<AskEvent> {
        let mut events = Vec::new();
        while let Some(event) = stream.next().await {
            events.push(event);
        }
        events
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn completed_ask_emits_full_protocol() {
        let gateway = MockGateway::new()
            .script("asst-green", vec![delta("We "), delta("will."), completed("We will.")])
            .script("asst-labour", vec![delta("No."), completed("No.")]);
        let parties = MockParties::new(vec![
            ("green", Some("asst-green")),
            ("labour", Some("asst-labour")),
        ]);
        let f = fixture(gateway, parties);

        let stream = f
            .use_case
            .ask("u1", "Will you cut taxes?", vec!["green".into(), "labour".into()])
            .await
            .unwrap();
        let events = collect(stream).await;

        // Exactly one created, K started, K terminal, one completed.
        assert_eq!(events[0].kind(), "question.created");
        assert_eq!(events.last().unwrap().kind(), "question.completed");
        let count = |kind: &str| events.iter().filter(|e| e.kind() == kind).count();
        assert_eq!(count("question.created"), 1);
        assert_eq!(count("answer.started"), 2);
        assert_eq!(count("answer.completed"), 2);
        assert_eq!(count("question.completed"), 1);

        // The final event carries both answers, index-sorted.
        match events.last().unwrap() {
            AskEvent::QuestionCompleted { question, answers } => {
                assert!(question.completed);
                assert_eq!(answers.len(), 2);
                assert_eq!(answers[0].answer.index, 0);
                assert_eq!(answers[0].party.slug, "green");
                assert_eq!(answers[1].answer.index, 1);
                assert_eq!(answers[1].party.slug, "labour");
            }
            other => panic!("expected question.completed, got {}", other.kind()),
        }

        // Store reflects the terminal state.
        assert!(f.questions.rows.lock().unwrap()[0].completed);
        let stored = f.answers.rows.lock().unwrap();
        assert!(stored.iter().all(|a| a.completed));
    }

    #[tokio::test]
    async fn index_follows_given_ordering() {
        let gateway = MockGateway::new()
            .script("asst-green", vec![completed("g")])
            .script("asst-labour", vec![completed("l")]);
        let parties = MockParties::new(vec![
            ("green", Some("asst-green")),
            ("labour", Some("asst-labour")),
        ]);
        let f = fixture(gateway, parties);

        // Reversed ordering: labour gets index 0.
        let stream = f
            .use_case
            .ask("u1", "q", vec!["labour".into(), "green".into()])
            .await
            .unwrap();
        let events = collect(stream).await;

        let started_labour = events.iter().find_map(|e| match e {
            AskEvent::AnswerStarted { answer } if answer.party.slug == "labour" => {
                Some(answer.answer.index)
            }
            _ => None,
        });
        assert_eq!(started_labour, Some(0));
    }

    #[tokio::test]
    async fn within_respondent_order_is_preserved() {
        let gateway = MockGateway::new()
            .script("asst-green", vec![delta("1"), delta("2"), completed("12")])
            .script("asst-labour", vec![delta("a"), completed("a")]);
        let parties = MockParties::new(vec![
            ("green", Some("asst-green")),
            ("labour", Some("asst-labour")),
        ]);
        let f = fixture(gateway, parties);

        let stream = f
            .use_case
            .ask("u1", "q", vec!["green".into(), "labour".into()])
            .await
            .unwrap();
        let events = collect(stream).await;

        // Map answer id -> party slug from the started events, then check
        // each answer's own timeline: started, deltas, terminal.
        let mut id_for_slug = HashMap::new();
        for event in &events {
            if let AskEvent::AnswerStarted { answer } = event {
                id_for_slug.insert(answer.party.slug.clone(), answer.answer.id);
            }
        }
        for (_, id) in id_for_slug {
            let timeline: Vec<&str> = events
                .iter()
                .filter(|e| match e {
                    AskEvent::AnswerStarted { answer } => answer.answer.id == id,
                    AskEvent::AnswerDelta { answer_id, .. } => *answer_id == id,
                    AskEvent::AnswerCompleted { answer } => answer.answer.id == id,
                    AskEvent::AnswerFailed { answer_id, .. } => *answer_id == Some(id),
                    _ => false,
                })
                .map(|e| e.kind())
                .collect();
            assert_eq!(timeline.first(), Some(&"answer.started"));
            assert_eq!(timeline.last(), Some(&"answer.completed"));
            assert!(timeline[1..timeline.len() - 1]
                .iter()
                .all(|k| *k == "answer.delta"));
        }
    }

    #[tokio::test]
    async fn empty_party_set_fails_without_side_effects() {
        let f = fixture(MockGateway::new(), MockParties::new(vec![]));

        let result = f.use_case.ask("u1", "q", vec![]).await;

        assert!(matches!(result, Err(AskError::NoParties)));
        assert!(f.questions.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_slug_fails_before_question_creation() {
        let f = fixture(
            MockGateway::new(),
            MockParties::new(vec![("green", Some("asst-green"))]),
        );

        let result = f.use_case.ask("u1", "q", vec!["green".into(), "snp".into()]).await;

        assert!(matches!(
            result,
            Err(AskError::Store(StoreError::PartyNotFound(_)))
        ));
        assert!(f.questions.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_assistant_is_fatal() {
        let f = fixture(
            MockGateway::new().script("unused", vec![]),
            MockParties::new(vec![("green", None)]),
        );

        let result = f.use_case.ask("u1", "q", vec!["green".into()]).await;

        assert!(matches!(result, Err(AskError::NoDefaultAssistant(slug)) if slug == "green"));
        assert!(f.questions.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mid_stream_failure_keeps_partial_and_siblings() {
        let gateway = MockGateway::new()
            .script(
                "asst-green",
                vec![
                    delta("We "),
                    delta("believe"),
                    GenerationEvent::Failed(GenerationError::MalformedResponse(
                        "unknown content type".to_string(),
                    )),
                ],
            )
            .script("asst-labour", vec![delta("No."), completed("No.")]);
        let parties = MockParties::new(vec![
            ("green", Some("asst-green")),
            ("labour", Some("asst-labour")),
        ]);
        let f = fixture(gateway, parties);

        let stream = f
            .use_case
            .ask("u1", "q", vec!["green".into(), "labour".into()])
            .await
            .unwrap();
        let events = collect(stream).await;

        let failed = events
            .iter()
            .find_map(|e| match e {
                AskEvent::AnswerFailed {
                    answer_id,
                    party_slug,
                    ..
                } => Some((answer_id.clone(), party_slug.clone())),
                _ => None,
            })
            .expect("expected an answer.failed event");
        assert_eq!(failed.1, "green");

        // The failed answer retained its two deltas, completed stays false.
        let stored = f.answers.rows.lock().unwrap();
        let green = stored
            .iter()
            .find(|a| Some(a.id) == failed.0)
            .expect("failed answer row");
        assert_eq!(green.content, "We believe");
        assert!(!green.completed);

        // question.completed still fired, carrying both answers.
        match events.last().unwrap() {
            AskEvent::QuestionCompleted { answers, .. } => {
                assert_eq!(answers.len(), 2);
                assert_eq!(answers.iter().filter(|a| a.answer.completed).count(), 1);
            }
            other => panic!("expected question.completed, got {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn open_failure_surfaces_without_answer_row() {
        // "reform" isn't scripted, so its stream never opens.
        let gateway = MockGateway::new().script("asst-green", vec![completed("ok")]);
        let parties = MockParties::new(vec![
            ("green", Some("asst-green")),
            ("reform", Some("asst-reform")),
        ]);
        let f = fixture(gateway, parties);

        let stream = f
            .use_case
            .ask("u1", "q", vec!["green".into(), "reform".into()])
            .await
            .unwrap();
        let events = collect(stream).await;

        assert!(events.iter().any(|e| matches!(
            e,
            AskEvent::AnswerFailed {
                answer_id: None,
                party_slug,
                ..
            } if party_slug == "reform"
        )));
        assert_eq!(events.last().unwrap().kind(), "question.completed");
        // Only green got an answer row.
        assert_eq!(f.answers.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn store_failure_aborts_the_ask() {
        let gateway = MockGateway::new().script("asst-green", vec![completed("ok")]);
        let parties = MockParties::new(vec![("green", Some("asst-green"))]);
        let questions = Arc::new(MockQuestions::default());
        let answers = Arc::new(MockAnswers {
            rows: Mutex::new(vec![]),
            fail_create: true,
        });
        let use_case = AskQuestionUseCase::new(
            Arc::new(gateway),
            Arc::new(parties),
            Arc::clone(&questions) as Arc<dyn QuestionRepository>,
            answers as Arc<dyn AnswerRepository>,
        );

        let stream = use_case.ask("u1", "q", vec!["green".into()]).await.unwrap();
        let events = collect(stream).await;

        // Stream ends abruptly: no terminal question event, question row
        // left completed = false (recoverable inconsistency).
        assert!(events.iter().all(|e| e.kind() != "question.completed"));
        assert!(!questions.rows.lock().unwrap()[0].completed);
    }

    #[tokio::test]
    async fn dropping_the_stream_cancels_generation() {
        let (mut guard_tx, guard_rx) = oneshot::channel();
        let gateway = MockGateway::new().parked("asst-green", guard_rx);
        let parties = MockParties::new(vec![("green", Some("asst-green"))]);
        let f = fixture(gateway, parties);

        let mut stream = f.use_case.ask("u1", "q", vec!["green".into()]).await.unwrap();
        // Drain the created event, then walk away.
        let first = stream.next().await.unwrap();
        assert_eq!(first.kind(), "question.created");
        drop(stream);

        tokio::time::timeout(Duration::from_secs(1), guard_tx.closed())
            .await
            .expect("generation work was not cancelled");
    }
}
