use soroban_core::model::{
    Difficulty, GameAnswer, GameSession, GameSettings, GameStats, MathProblem, Operator,
    ProblemId, SessionId,
};
use soroban_core::time::fixed_now;
use storage::repository::{GameSessionRepository, GameStatsRepository, Storage, StorageError};
use storage::sqlite::SqliteRepository;

fn problem(number1: u64, number2: u64, operator: Operator) -> MathProblem {
    let correct_answer = match operator {
        Operator::Add => number1 + number2,
        Operator::Subtract => number1 - number2,
    };
    MathProblem {
        id: ProblemId::new(),
        number1,
        number2,
        operator,
        correct_answer,
        difficulty: Difficulty::Beginner,
    }
}

fn build_session() -> GameSession {
    GameSession::new(
        SessionId::new(),
        GameSettings::default(),
        vec![problem(12, 30, Operator::Add), problem(50, 8, Operator::Subtract)],
        fixed_now(),
    )
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_problems_and_answers() {
    let repo = connect("memdb_session_roundtrip").await;
    let mut session = build_session();
    repo.create_session(&session).await.unwrap();

    let fetched = repo.get_session(session.id).await.unwrap();
    assert_eq!(fetched, session);
    assert!(!fetched.is_complete());

    let answers = vec![
        GameAnswer::grade(&session.problems[0], Some(42), 4),
        GameAnswer::grade(&session.problems[1], Some(40), 6),
    ];
    session
        .complete(answers, fixed_now() + chrono::Duration::seconds(10))
        .unwrap();
    repo.update_session(&session).await.unwrap();

    let fetched = repo.get_session(session.id).await.unwrap();
    assert_eq!(fetched.score, 1);
    assert_eq!(fetched.total_time, 10);
    assert_eq!(fetched.end_time, session.end_time);
    assert_eq!(fetched.answers, session.answers);
}

#[tokio::test]
async fn sqlite_rejects_duplicates_and_reports_missing() {
    let repo = connect("memdb_session_errors").await;
    let session = build_session();
    repo.create_session(&session).await.unwrap();

    assert!(matches!(
        repo.create_session(&session).await,
        Err(StorageError::Conflict)
    ));
    assert!(matches!(
        repo.get_session(SessionId::new()).await,
        Err(StorageError::NotFound)
    ));
    assert!(matches!(
        repo.update_session(&build_session()).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_stats_default_then_upsert() {
    let repo = connect("memdb_stats").await;
    assert_eq!(repo.get_stats().await.unwrap(), GameStats::default());

    let mut stats = GameStats {
        total_questions: 20,
        correct_answers: 15,
        accuracy: 75.0,
        average_time: 3.5,
        games_played: 2,
    };
    repo.update_stats(&stats).await.unwrap();
    assert_eq!(repo.get_stats().await.unwrap(), stats);

    stats.games_played = 3;
    repo.update_stats(&stats).await.unwrap();
    assert_eq!(repo.get_stats().await.unwrap().games_played, 3);
}

#[tokio::test]
async fn migrations_are_idempotent_and_storage_wires_both_repos() {
    let url = "sqlite:file:memdb_storage_wiring?mode=memory&cache=shared";
    let storage = Storage::sqlite(url).await.expect("storage");
    let repo = SqliteRepository::connect(url).await.expect("connect");
    repo.migrate().await.expect("second migrate");

    let session = build_session();
    storage.sessions.create_session(&session).await.unwrap();
    let fetched = repo.get_session(session.id).await.unwrap();
    assert_eq!(fetched.id, session.id);
    assert_eq!(storage.stats.get_stats().await.unwrap().games_played, 0);
}
