//! OpenLigaDB payloads used by the secondary lookups.
//!
//! OpenLigaDB responses are loosely populated, so every field defaults.

use serde::{Deserialize, Serialize};

/// A team as it appears inside match data and team lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    #[serde(rename = "teamId", alias = "teamID", alias = "TeamId", default)]
    pub team_id: Option<i64>,
    #[serde(rename = "teamName", default)]
    pub team_name: Option<String>,
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
    #[serde(rename = "teamIconUrl", alias = "teamIconURL", alias = "TeamIconUrl", default)]
    pub team_icon_url: Option<String>,
    #[serde(rename = "teamGroupName", default)]
    pub team_group_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchGroup {
    #[serde(rename = "groupName", default)]
    pub group_name: Option<String>,
    #[serde(rename = "groupOrderID", default)]
    pub group_order_id: Option<i64>,
    #[serde(rename = "groupID", default)]
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "resultID", default)]
    pub result_id: Option<i64>,
    #[serde(rename = "resultName", default)]
    pub result_name: Option<String>,
    #[serde(rename = "resultTypeID", default)]
    pub result_type_id: Option<i64>,
    #[serde(rename = "resultOrderID", default)]
    pub result_order_id: Option<i64>,
    #[serde(rename = "pointsTeam1", default)]
    pub points_team1: Option<i64>,
    #[serde(rename = "pointsTeam2", default)]
    pub points_team2: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(rename = "goalID", default)]
    pub goal_id: Option<i64>,
    #[serde(rename = "scoreTeam1", default)]
    pub score_team1: Option<i64>,
    #[serde(rename = "scoreTeam2", default)]
    pub score_team2: Option<i64>,
    #[serde(rename = "matchMinute", default)]
    pub match_minute: Option<i64>,
    #[serde(rename = "goalGetterName", default)]
    pub goal_getter_name: Option<String>,
    #[serde(rename = "isPenalty", default)]
    pub is_penalty: Option<bool>,
    #[serde(rename = "isOwnGoal", default)]
    pub is_own_goal: Option<bool>,
    #[serde(rename = "isOvertime", default)]
    pub is_overtime: Option<bool>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "locationCity", default)]
    pub location_city: Option<String>,
    #[serde(rename = "locationStadium", default)]
    pub location_stadium: Option<String>,
}

/// Full match record from `/getmatchdata/{matchId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchDetail {
    #[serde(rename = "matchID", default)]
    pub match_id: Option<i64>,
    #[serde(rename = "matchDateTimeUTC", default)]
    pub match_date_time_utc: Option<String>,
    #[serde(rename = "matchIsFinished", default)]
    pub match_is_finished: bool,
    #[serde(rename = "leagueShortcut", default)]
    pub league_shortcut: Option<String>,
    #[serde(rename = "leagueSeason", default)]
    pub league_season: Option<i32>,
    #[serde(default)]
    pub team1: Option<TeamInfo>,
    #[serde(default)]
    pub team2: Option<TeamInfo>,
    #[serde(default)]
    pub group: Option<MatchGroup>,
    #[serde(rename = "matchResults", default)]
    pub match_results: Option<Vec<MatchResult>>,
    #[serde(default)]
    pub goals: Option<Vec<Goal>>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(rename = "numberOfViewers", default)]
    pub number_of_viewers: Option<i64>,
    #[serde(rename = "lastUpdateDateTime", default)]
    pub last_update_date_time: Option<String>,
}

/// OpenLigaDB result type for the final score ("Endergebnis").
const FINAL_RESULT_TYPE: i64 = 2;

impl MatchDetail {
    /// Final score: the result of type 2 when present, otherwise the last
    /// reported result.
    pub fn final_score(&self) -> Option<(i64, i64)> {
        let results = self.match_results.as_deref().unwrap_or_default();
        let result = results
            .iter()
            .find(|r| r.result_type_id == Some(FINAL_RESULT_TYPE))
            .or_else(|| results.last())?;
        Some((result.points_team1?, result.points_team2?))
    }

    /// Goals ordered by match minute (unknown minutes first).
    pub fn goals_by_minute(&self) -> Vec<Goal> {
        let mut goals = self.goals.clone().unwrap_or_default();
        goals.sort_by_key(|g| g.match_minute.unwrap_or(0));
        goals
    }

    /// Results ordered by their upstream order id.
    pub fn results_in_order(&self) -> Vec<MatchResult> {
        let mut results = self.match_results.clone().unwrap_or_default();
        results.sort_by_key(|r| r.result_order_id.unwrap_or(0));
        results
    }
}

/// One row of `/getbltable/{league}/{season}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    #[serde(rename = "teamInfoId", default)]
    pub team_info_id: Option<i64>,
    #[serde(rename = "teamName", default)]
    pub team_name: Option<String>,
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
    #[serde(rename = "teamIconUrl", default)]
    pub team_icon_url: Option<String>,
    #[serde(default)]
    pub points: i64,
    #[serde(default)]
    pub matches: i64,
    #[serde(default)]
    pub won: i64,
    #[serde(default)]
    pub draw: i64,
    #[serde(default)]
    pub lost: i64,
    #[serde(default)]
    pub goals: i64,
    #[serde(rename = "opponentGoals", default)]
    pub opponent_goals: i64,
    #[serde(rename = "goalDiff", default)]
    pub goal_diff: i64,
}
