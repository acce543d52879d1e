//! End-to-end pipeline tests: record sessions with the mock provider, then
//! score them against an answer key and write the summary.

use std::sync::Arc;
use std::time::Duration;

use barexam_core::answer_key::AnswerKey;
use barexam_core::data::QuestionSource;
use barexam_core::model::SamplingConfig;
use barexam_core::retry::RetryPolicy;
use barexam_core::scorer::Scorer;
use barexam_core::session::{NoopReporter, RunnerConfig, SessionRunner};
use barexam_core::store::SessionStore;
use barexam_core::sweep::ParameterGrid;
use barexam_providers::mock::{MockProvider, MockReply};
use barexam_report::{accuracy_by_config, write_summary_csv};

const QUESTIONS: &str = "\
question_category,question_number,question_prompt,choice_a,choice_b,choice_c,choice_d
Evidence,7,7. Is the statement admissible hearsay?,Yes,No,Only for impeachment,Only if the declarant testifies
";

fn sampling() -> SamplingConfig {
    SamplingConfig {
        temperature: 0.5,
        max_tokens: 16,
        top_p: 1.0,
        best_of: 2,
        frequency_penalty: 0.0,
        presence_penalty: 0.0,
    }
}

struct Fixture {
    dir: tempfile::TempDir,
    source: QuestionSource,
    store: SessionStore,
    key: AnswerKey,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let questions = dir.path().join("questions.csv");
    std::fs::write(&questions, QUESTIONS).unwrap();
    let key = AnswerKey::from_reader("category,number,answer\nEvidence,7,C\n".as_bytes()).unwrap();
    let store = SessionStore::new(dir.path().join("sessions"));
    Fixture {
        source: QuestionSource::new(questions),
        store,
        key,
        dir,
    }
}

fn runner(provider: MockProvider, store: &SessionStore, samples: u32) -> SessionRunner {
    SessionRunner::new(
        Arc::new(provider),
        store.clone(),
        RunnerConfig {
            model: "test-model".into(),
            samples_per_config: samples,
            retry: RetryPolicy {
                max_retries: 1,
                delay: Duration::from_secs(10),
            },
        },
    )
}

#[tokio::test(start_paused = true)]
async fn e2e_unanswered_question_scores_all_false() {
    let f = fixture();
    let runner = runner(MockProvider::failing("service unavailable"), &f.store, 1);

    let summary = runner
        .run(&ParameterGrid::single(sampling()), &f.source, &NoopReporter)
        .await
        .unwrap();
    assert_eq!(summary.failed_attempts, 1);

    let report = Scorer::new(&f.key).score_store(&f.store).unwrap();
    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.exam_session, "bar-exam-001");
    assert_eq!(row.answer, None);
    assert!(!row.first_correct && !row.top_two_correct && !row.top_three_correct);
    assert_eq!(row.temperature, 0.5);
    assert!(row.session_duration.is_some());
}

#[tokio::test(start_paused = true)]
async fn e2e_ranked_answers_are_scored() {
    let f = fixture();
    let provider = MockProvider::new(
        vec![
            MockReply::text("First Choice: (C)\nSecond Choice: A\nThird Choice: B"),
            MockReply::text("First Choice: A\nSecond Choice: B\nThird Choice: C."),
        ],
        MockReply::text("no idea"),
    );
    let runner = runner(provider, &f.store, 3);

    runner
        .run(&ParameterGrid::single(sampling()), &f.source, &NoopReporter)
        .await
        .unwrap();

    let report = Scorer::new(&f.key).score_store(&f.store).unwrap();
    assert_eq!(report.sessions, 3);

    let first = &report.rows[0];
    assert_eq!(first.answer.as_deref(), Some("C"));
    assert!(first.first_correct && first.top_two_correct);

    let second = &report.rows[1];
    assert_eq!(second.third_answer.as_deref(), Some("C"));
    assert!(!second.top_two_correct && second.top_three_correct);

    let third = &report.rows[2];
    assert_eq!(third.answer, None);
    assert!(!third.top_three_correct);

    let stats = accuracy_by_config(&report.rows);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].sessions, 3);
    assert!((stats[0].top_three_accuracy - 2.0 / 3.0).abs() < 1e-9);

    let path = f.dir.path().join("all_exam_summary.csv");
    write_summary_csv(&report.rows, &path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.lines().nth(3).unwrap().starts_with("bar-exam-003,Evidence,7,,,,C,"));
}

#[tokio::test(start_paused = true)]
async fn e2e_multi_candidate_response_is_skipped() {
    let f = fixture();
    let provider = MockProvider::new(
        vec![MockReply::Candidates(vec![
            "First Choice: C".into(),
            "First Choice: A".into(),
        ])],
        MockReply::text("First Choice: C"),
    );
    let runner = runner(provider, &f.store, 2);

    runner
        .run(&ParameterGrid::single(sampling()), &f.source, &NoopReporter)
        .await
        .unwrap();

    let report = Scorer::new(&f.key).score_store(&f.store).unwrap();
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].session, "bar-exam-001");
    assert_eq!(report.skipped[0].number, 7);
    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].exam_session, "bar-exam-002");
}

#[tokio::test(start_paused = true)]
async fn e2e_missing_key_entry_aborts_scoring() {
    let f = fixture();
    let runner = runner(MockProvider::with_fixed_response("First Choice: C"), &f.store, 1);
    runner
        .run(&ParameterGrid::single(sampling()), &f.source, &NoopReporter)
        .await
        .unwrap();

    let other_key = AnswerKey::from_reader("category,number,answer\nTorts,7,C\n".as_bytes()).unwrap();
    let err = Scorer::new(&other_key).score_store(&f.store).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("bar-exam-001"));
    assert!(message.contains("category=Evidence, number=7"));
}
