use nhl_stats_ingestion::fetch::fetch_season;
use nhl_stats_ingestion::schedule::resolve_schedule;
use nhl_stats_ingestion::testing::{
    boxscore, linescore_with_shootout, team, RecordingPacer, StubSource,
};
use nhl_stats_ingestion::{GameId, GameResult, GameStore, IngestError, Ingestor, Venue};

const CHICAGO: u32 = 16;
const DETROIT: u32 = 17;

/// Chicago's 2016 schedule: two regular-season games around a preseason one.
fn chicago_source() -> StubSource {
    StubSource::new()
        .with_teams(vec![team("Chicago Blackhawks", CHICAGO)])
        .with_schedule(CHICAGO, &[2016020001, 2016010099, 2016020015])
        .with_boxscore(GameId(2016020001), boxscore(CHICAGO, 2, 19, 2))
        .with_linescore(GameId(2016020001), linescore_with_shootout(1, 0))
        .with_boxscore(GameId(2016020015), boxscore(5, 4, CHICAGO, 1))
}

#[tokio::test]
async fn test_fetch_season_only_resolves_regular_season_in_order() {
    let source = chicago_source();
    let pacer = RecordingPacer::sharing(source.log());

    let schedule = resolve_schedule(&source, CHICAGO, 2016).await.unwrap();
    assert_eq!(schedule, vec![GameId(2016020001), GameId(2016020015)]);

    let records = fetch_season(&source, &pacer, CHICAGO, 2016, &schedule)
        .await
        .unwrap();

    assert_eq!(
        source.calls(),
        vec![
            "schedule:16:2016-09-01:2017-05-31",
            "wait",
            "boxscore:2016020001",
            "wait",
            "linescore:2016020001",
            "wait",
            "boxscore:2016020015",
        ]
    );
    assert_eq!(pacer.waits(), 3);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].venue, Venue::Home);
    assert_eq!(records[0].result, GameResult::Win);
    assert_eq!(records[1].venue, Venue::Away);
    assert_eq!(records[1].result, GameResult::Loss);
    assert!(records.iter().all(|r| r.season == 2016));
}

#[tokio::test]
async fn test_every_remote_call_of_a_run_is_paced() {
    let source = chicago_source();
    let pacer = RecordingPacer::sharing(source.log());
    let store = GameStore::in_memory().await.unwrap();
    let ingestor = Ingestor::new(source, pacer, store);

    ingestor.ingest(2016, &[]).await.unwrap();

    let calls = ingestor.source().calls();
    assert_eq!(
        calls,
        vec![
            "wait",
            "teams",
            "wait",
            "schedule:16:2016-09-01:2017-05-31",
            "wait",
            "boxscore:2016020001",
            "wait",
            "linescore:2016020001",
            "wait",
            "boxscore:2016020015",
        ]
    );
    assert_eq!(ingestor.pacer().waits(), 5);
}

#[tokio::test]
async fn test_ingest_stores_every_regular_season_game() {
    let store = GameStore::in_memory().await.unwrap();
    let ingestor = Ingestor::new(chicago_source(), RecordingPacer::new(), store);

    let report = ingestor.ingest(2016, &[]).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.inserted(), 2);
    let stored = ingestor.store().games("Chicago Blackhawks").await.unwrap();
    assert_eq!(
        stored.iter().map(|r| r.game_id).collect::<Vec<_>>(),
        vec![GameId(2016020001), GameId(2016020015)]
    );
}

#[tokio::test]
async fn test_repeated_ingestion_leaves_row_count_unchanged() {
    let store = GameStore::in_memory().await.unwrap();
    let ingestor = Ingestor::new(chicago_source(), RecordingPacer::new(), store);

    ingestor.ingest(2016, &[]).await.unwrap();
    let first = ingestor.store().count("Chicago Blackhawks").await.unwrap();

    let second_report = ingestor.ingest(2016, &[]).await.unwrap();
    let second = ingestor.store().count("Chicago Blackhawks").await.unwrap();

    assert_eq!(first, 2);
    assert_eq!(second, first);
    assert_eq!(second_report.inserted(), 0);
    assert_eq!(second_report.already_present(), 2);
}

#[tokio::test]
async fn test_team_not_in_game_persists_nothing() {
    let source = StubSource::new()
        .with_teams(vec![team("Chicago Blackhawks", CHICAGO)])
        .with_schedule(CHICAGO, &[2016020001, 2016020002])
        .with_boxscore(GameId(2016020001), boxscore(CHICAGO, 3, 1, 0))
        .with_boxscore(GameId(2016020002), boxscore(1, 3, 2, 0));
    let store = GameStore::in_memory().await.unwrap();
    let ingestor = Ingestor::new(source, RecordingPacer::new(), store);

    let report = ingestor.ingest(2016, &[]).await.unwrap();

    assert_eq!(report.failed_teams(), vec!["Chicago Blackhawks"]);
    assert!(matches!(
        report.failed[0].error,
        IngestError::TeamNotInGame { team_id: CHICAGO, .. }
    ));
    assert_eq!(ingestor.store().count("Chicago Blackhawks").await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_team_does_not_stop_the_next() {
    let source = StubSource::new()
        .with_teams(vec![
            team("Chicago Blackhawks", CHICAGO),
            team("Detroit Red Wings", DETROIT),
        ])
        // No schedule for Chicago: its schedule request fails.
        .with_schedule(DETROIT, &[2016020003])
        .with_boxscore(GameId(2016020003), boxscore(DETROIT, 1, 4, 3));
    let store = GameStore::in_memory().await.unwrap();
    let ingestor = Ingestor::new(source, RecordingPacer::new(), store);

    let report = ingestor.ingest(2016, &[]).await.unwrap();

    assert_eq!(report.failed_teams(), vec!["Chicago Blackhawks"]);
    assert!(report.failed[0].error.is_source_unavailable());
    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.completed[0].team.name, "Detroit Red Wings");
    assert_eq!(ingestor.store().count("Detroit Red Wings").await.unwrap(), 1);
}

#[tokio::test]
async fn test_directory_failure_aborts_the_run() {
    let store = GameStore::in_memory().await.unwrap();
    let ingestor = Ingestor::new(StubSource::new(), RecordingPacer::new(), store);

    let err = ingestor.ingest(2016, &[]).await.unwrap_err();

    assert!(err.is_source_unavailable());
    assert_eq!(ingestor.source().calls(), vec!["teams"]);
}

#[tokio::test]
async fn test_team_filter_and_multiple_seasons() {
    let source = StubSource::new()
        .with_teams(vec![
            team("Chicago Blackhawks", CHICAGO),
            team("Detroit Red Wings", DETROIT),
        ])
        .with_schedule(DETROIT, &[2016020003])
        .with_boxscore(GameId(2016020003), boxscore(DETROIT, 1, 4, 3));
    let store = GameStore::in_memory().await.unwrap();
    let ingestor = Ingestor::new(source, RecordingPacer::new(), store);

    let report = ingestor
        .ingest_seasons(
            &[2016, 2017],
            &["Detroit Red Wings".to_string(), "Hartford Whalers".to_string()],
        )
        .await
        .unwrap();

    // The stub serves the same schedule for both seasons; the second pass
    // only finds the game already stored.
    assert_eq!(report.completed.len(), 2);
    assert_eq!(report.inserted(), 1);
    assert_eq!(report.already_present(), 1);
    assert_eq!(report.unknown_teams, vec!["Hartford Whalers".to_string()]);
    assert!(!report.is_clean());
    assert!(!ingestor
        .source()
        .calls()
        .iter()
        .any(|call| call.starts_with("schedule:16:")));
    assert!(ingestor
        .source()
        .calls()
        .contains(&"schedule:17:2017-09-01:2018-05-31".to_string()));
}
