pub mod rapidapi;

use crate::dao::models::{FixtureId, FixtureSnapshot, Injury, StandingsTable, TeamId};
use crate::dao::upstream::UpstreamResult;
use futures::future::BoxFuture;

/// Abstraction over the sports-data provider.
///
/// Implementations own the translation of their wire format into
/// [`FixtureSnapshot`]; nothing outside this boundary sees provider payloads.
pub trait FixtureSource: Send + Sync {
    /// Next scheduled fixture of the followed club, `None` when nothing is scheduled.
    fn next_fixture(&self) -> BoxFuture<'static, UpstreamResult<Option<FixtureSnapshot>>>;
    /// Current detail of a fixture, including events, lineups and statistics.
    fn fixture(&self, id: FixtureId) -> BoxFuture<'static, UpstreamResult<FixtureSnapshot>>;
    /// Players missing or doubtful for a fixture.
    fn injuries(&self, id: FixtureId) -> BoxFuture<'static, UpstreamResult<Vec<Injury>>>;
    /// Past and future meetings between two teams.
    fn head_to_head(
        &self,
        team_a: TeamId,
        team_b: TeamId,
    ) -> BoxFuture<'static, UpstreamResult<Vec<FixtureSnapshot>>>;
    /// Current standings of a competition.
    fn standings(&self, competition_id: u64) -> BoxFuture<'static, UpstreamResult<StandingsTable>>;
}
