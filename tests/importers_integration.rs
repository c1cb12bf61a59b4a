use httpmock::prelude::*;
use serde_json::json;
use stats_backfill::importers::{import_games, import_players, SeasonDays};
use stats_backfill::ingest::{MockIngestor, UpdateType};
use stats_backfill::stats::StatsClient;

#[tokio::test]
async fn import_players_wraps_each_record_in_a_player_envelope() {
    let server = MockServer::start();
    let tribute_mock = server.mock(|when, then| {
        when.method(GET).path("/api/getTribute");
        then.status(200).json_body(json!([
            {"playerId": "aaa", "peanuts": 14},
            {"playerId": "bbb", "peanuts": 3}
        ]));
    });
    let players_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/database/players")
            .query_param("ids", "aaa,bbb");
        then.status(200).json_body(json!([
            {"id": "aaa", "name": "One"},
            {"id": "bbb", "name": "Two"}
        ]));
    });

    let mut ingestor = MockIngestor::new();
    ingestor
        .expect_submit_updates()
        .withf(|updates| {
            updates.len() == 2
                && updates.iter().all(|u| u.kind == UpdateType::Player)
                && updates[0].timestamp == updates[1].timestamp
        })
        .return_once(|_| Ok(()));

    let stats = StatsClient::new(server.url(""));
    let report = import_players(&stats, &ingestor)
        .await
        .expect("Import should succeed");

    tribute_mock.assert();
    players_mock.assert();
    assert_eq!(report.records, 2, "Both fetched players should be wrapped");
    assert_eq!(report.batches, 1, "Exactly one batch should be submitted");
}

#[tokio::test]
async fn import_players_submits_nothing_for_an_empty_tribute_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/getTribute");
        then.status(200).json_body(json!([]));
    });

    let mut ingestor = MockIngestor::new();
    ingestor.expect_submit_updates().times(0);

    let stats = StatsClient::new(server.url(""));
    let report = import_players(&stats, &ingestor)
        .await
        .expect("Import should succeed with nothing to do");

    assert_eq!(report.records, 0);
    assert_eq!(report.batches, 0, "An empty run must not POST");
}

#[tokio::test]
async fn import_players_fails_fast_on_a_stats_api_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/getTribute");
        then.status(500);
    });

    let ingestor = MockIngestor::new();
    let stats = StatsClient::new(server.url(""));
    let err = import_players(&stats, &ingestor).await.unwrap_err();
    assert!(
        err.contains("Fetching tributes failed"),
        "Expected a tribute fetch error, got: {err}"
    );
}

#[tokio::test]
async fn import_games_submits_one_batch_per_non_empty_season() {
    let server = MockServer::start();
    let s0_day0 = server.mock(|when, then| {
        when.method(GET)
            .path("/database/games")
            .query_param("season", "0")
            .query_param("day", "0");
        then.status(200)
            .json_body(json!([{"id": "g1"}, {"id": "g2"}]));
    });
    let s0_day1 = server.mock(|when, then| {
        when.method(GET)
            .path("/database/games")
            .query_param("season", "0")
            .query_param("day", "1");
        then.status(200).json_body(json!([{"id": "g3"}]));
    });
    let s1_day0 = server.mock(|when, then| {
        when.method(GET)
            .path("/database/games")
            .query_param("season", "1")
            .query_param("day", "0");
        then.status(200).json_body(json!([]));
    });

    let mut ingestor = MockIngestor::new();
    ingestor
        .expect_submit_game_updates()
        .withf(|updates| {
            updates.len() == 3 && updates.iter().all(|u| u.kind == UpdateType::Game)
        })
        .return_once(|_| Ok(()));

    let seasons = [
        SeasonDays { season: 0, days: 2 },
        SeasonDays { season: 1, days: 1 },
    ];
    let stats = StatsClient::new(server.url(""));
    let report = import_games(&stats, &ingestor, &seasons)
        .await
        .expect("Import should succeed");

    s0_day0.assert();
    s0_day1.assert();
    s1_day0.assert();
    assert_eq!(report.records, 3);
    assert_eq!(report.batches, 1, "The empty season must not submit a batch");
}

#[tokio::test]
async fn import_games_fails_fast_when_a_day_fetch_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/database/games")
            .query_param("season", "0")
            .query_param("day", "0");
        then.status(502);
    });

    let ingestor = MockIngestor::new();
    let seasons = [SeasonDays { season: 0, days: 3 }];
    let stats = StatsClient::new(server.url(""));
    let err = import_games(&stats, &ingestor, &seasons).await.unwrap_err();
    assert!(
        err.contains("season 0 day 0"),
        "Expected the failing fetch to be named, got: {err}"
    );
}
