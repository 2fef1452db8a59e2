//! Ingestion orchestration: directory → schedule → paced fetch → store.

use std::collections::HashSet;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::error::{IngestError, Result};
use crate::fetch::fetch_season;
use crate::model::TeamEntry;
use crate::pacing::Pacer;
use crate::schedule::resolve_schedule;
use crate::source::StatsSource;
use crate::store::{GameStore, UpsertOutcome};

/// Outcome of one team's season that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSummary {
    pub team: TeamEntry,
    pub season: i32,
    pub inserted: usize,
    pub already_present: usize,
    pub failed_inserts: usize,
}

#[derive(Debug)]
pub struct TeamFailure {
    pub team: TeamEntry,
    pub season: i32,
    pub error: IngestError,
}

#[derive(Debug, Default)]
pub struct IngestReport {
    pub completed: Vec<TeamSummary>,
    pub failed: Vec<TeamFailure>,
    /// Filter names that matched no directory entry.
    pub unknown_teams: Vec<String>,
}

impl IngestReport {
    pub fn inserted(&self) -> usize {
        self.completed.iter().map(|s| s.inserted).sum()
    }

    pub fn already_present(&self) -> usize {
        self.completed.iter().map(|s| s.already_present).sum()
    }

    pub fn failed_teams(&self) -> Vec<&str> {
        self.failed.iter().map(|f| f.team.name.as_str()).collect()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
            && self.unknown_teams.is_empty()
            && self.completed.iter().all(|s| s.failed_inserts == 0)
    }
}

/// Directory entries whose names appear in `filter`, in directory order, plus
/// the filter names that matched nothing. An empty filter selects every team.
pub fn select_teams(teams: Vec<TeamEntry>, filter: &[String]) -> (Vec<TeamEntry>, Vec<String>) {
    if filter.is_empty() {
        return (teams, Vec::new());
    }

    let known: HashSet<&str> = teams.iter().map(|t| t.name.as_str()).collect();
    let unknown = filter
        .iter()
        .filter(|name| !known.contains(name.as_str()))
        .cloned()
        .collect();

    let wanted: HashSet<&str> = filter.iter().map(String::as_str).collect();
    let selected = teams
        .into_iter()
        .filter(|t| wanted.contains(t.name.as_str()))
        .collect();
    (selected, unknown)
}

pub struct Ingestor<S, P> {
    source: S,
    pacer: P,
    store: GameStore,
}

impl<S, P> Ingestor<S, P>
where
    S: StatsSource,
    P: Pacer,
{
    pub fn new(source: S, pacer: P, store: GameStore) -> Self {
        Self {
            source,
            pacer,
            store,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    /// The league's teams. Any failure here aborts the run.
    pub async fn list_teams(&self) -> Result<Vec<TeamEntry>> {
        self.pacer.wait().await;
        self.source.teams().await
    }

    pub async fn ingest(&self, season_start_year: i32, team_filter: &[String]) -> Result<IngestReport> {
        self.ingest_seasons(&[season_start_year], team_filter).await
    }

    /// Ingest each season in turn for every selected team. A team that fails
    /// is recorded in the report and the run moves on to the next one.
    pub async fn ingest_seasons(&self, seasons: &[i32], team_filter: &[String]) -> Result<IngestReport> {
        let start = Instant::now();
        let teams = self.list_teams().await?;
        let (teams, unknown_teams) = select_teams(teams, team_filter);

        for name in &unknown_teams {
            warn!("Team '{}' not found in the directory, skipping", name);
        }

        let mut report = IngestReport {
            unknown_teams,
            ..IngestReport::default()
        };

        for &season in seasons {
            info!("Ingesting season {} for {} teams", season, teams.len());
            for team in &teams {
                match self.ingest_team(team, season).await {
                    Ok(summary) => {
                        info!(
                            "{} {}: {} inserted, {} already present",
                            team.name, season, summary.inserted, summary.already_present
                        );
                        report.completed.push(summary);
                    }
                    Err(e) => {
                        error!("{} {} failed: {}", team.name, season, e);
                        report.failed.push(TeamFailure {
                            team: team.clone(),
                            season,
                            error: e,
                        });
                    }
                }
            }
        }

        info!(
            "Ingestion finished in {:?}: {} inserted, {} already present, {} teams failed",
            start.elapsed(),
            report.inserted(),
            report.already_present(),
            report.failed.len()
        );
        Ok(report)
    }

    /// One team, one season. Nothing is written unless every game resolved.
    pub async fn ingest_team(&self, team: &TeamEntry, season_start_year: i32) -> Result<TeamSummary> {
        self.pacer.wait().await;
        let schedule = resolve_schedule(&self.source, team.id, season_start_year).await?;
        let records =
            fetch_season(&self.source, &self.pacer, team.id, season_start_year, &schedule).await?;

        self.store.ensure_table(&team.name).await?;

        let mut summary = TeamSummary {
            team: team.clone(),
            season: season_start_year,
            inserted: 0,
            already_present: 0,
            failed_inserts: 0,
        };

        for record in &records {
            match self.store.upsert_game(&team.name, record).await {
                Ok(UpsertOutcome::Inserted) => summary.inserted += 1,
                Ok(UpsertOutcome::AlreadyPresent) => {
                    info!("{}: game {} already present", team.name, record.game_id);
                    summary.already_present += 1;
                }
                Err(e) => {
                    error!("{}: failed to store game {}: {}", team.name, record.game_id, e);
                    summary.failed_inserts += 1;
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_id::GameId;
    use crate::testing::{boxscore, team, RecordingPacer, StubSource};

    #[test]
    fn test_empty_filter_selects_all() {
        let teams = vec![team("Boston Bruins", 6), team("Buffalo Sabres", 7)];
        let (selected, unknown) = select_teams(teams.clone(), &[]);
        assert_eq!(selected, teams);
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_filter_keeps_directory_order_and_reports_unknown() {
        let teams = vec![
            team("Boston Bruins", 6),
            team("Buffalo Sabres", 7),
            team("Chicago Blackhawks", 16),
        ];
        let filter = vec![
            "Chicago Blackhawks".to_string(),
            "Quebec Nordiques".to_string(),
            "Boston Bruins".to_string(),
        ];
        let (selected, unknown) = select_teams(teams, &filter);
        assert_eq!(
            selected.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![6, 16]
        );
        assert_eq!(unknown, vec!["Quebec Nordiques".to_string()]);
    }

    #[test]
    fn test_ingest_team_counts_inserted_and_present() {
        tokio_test::block_on(async {
            let boston = team("Boston Bruins", 6);
            let source = StubSource::new()
                .with_schedule(6, &[2016020001, 2016020002])
                .with_boxscore(GameId(2016020001), boxscore(6, 3, 8, 1))
                .with_boxscore(GameId(2016020002), boxscore(3, 2, 6, 0));
            let store = GameStore::in_memory().await.unwrap();
            let pacer = RecordingPacer::sharing(source.log());
            let ingestor = Ingestor::new(source, pacer, store);

            let first = ingestor.ingest_team(&boston, 2016).await.unwrap();
            assert_eq!((first.inserted, first.already_present), (2, 0));

            let second = ingestor.ingest_team(&boston, 2016).await.unwrap();
            assert_eq!((second.inserted, second.already_present), (0, 2));
            // One schedule request and two boxscores per run.
            assert_eq!(ingestor.pacer().waits(), 6);
            let calls = ingestor.source().calls();
            assert_eq!(calls[0], "wait");
            assert_eq!(calls[1], "schedule:6:2016-09-01:2017-05-31");
        });
    }
}
