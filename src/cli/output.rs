//! Output formatting utilities for CLI.

use serde::Serialize;
use swarm::autoplay::GameResult;
use swarm::game::{Faction, FactionId, MAX_FACTION_ID, Outcome, Snapshot};

/// JSON-serializable output of the `run` command.
#[derive(Debug, Serialize)]
pub(super) struct JsonRunOutput<'a> {
    /// Game result.
    pub(super) result: &'a GameResult,
    /// Final state.
    pub(super) snapshot: &'a Snapshot,
}

fn outcome_label(outcome: Option<Outcome>) -> &'static str {
    match outcome {
        Some(Outcome::Win) => "player wins",
        Some(Outcome::Lose) => "player loses",
        None => "unfinished",
    }
}

/// Format a game result and its final state as human-readable text.
pub(super) fn format_text(result: &GameResult, snapshot: &Snapshot) -> String {
    let mut output = String::new();

    output.push_str(&format!("Game Result (seed: {})\n", result.seed));
    output.push_str(&format!("  Outcome: {}\n", outcome_label(result.outcome)));
    output.push_str(&format!(
        "  Turns: {}  Time: {}  Captures: {}\n\n",
        result.turns_played,
        swarm::game::format_clock(result.elapsed),
        result.captures
    ));

    for stats in &result.factions {
        output.push_str(&format!(
            "  {:<8} {} territories\n",
            stats.faction.to_string(),
            stats.territories
        ));
    }

    output.push_str("\nTerritories:\n");
    for t in &snapshot.territories {
        output.push_str(&format!(
            "  {:>2} {:<14} {:<8} {:>4} units ({}/{}/{})",
            t.id,
            t.name,
            t.owner.to_string(),
            t.total,
            t.garrison.units.shield,
            t.garrison.units.sword,
            t.garrison.units.archer,
        ));
        if t.garrison.giants.total() > 0 {
            output.push_str(&format!(" +{} giants", t.garrison.giants.total()));
        }
        output.push('\n');
    }

    output
}

/// Tournament statistics for aggregated results.
#[derive(Debug, Default)]
pub(super) struct TournamentStats {
    /// Total games played.
    pub(super) games_played: u64,
    /// Games the player won.
    pub(super) wins: u64,
    /// Games the player lost.
    pub(super) losses: u64,
    /// Games that hit a limit.
    pub(super) unfinished: u64,
    /// Games whose map could not be built.
    pub(super) failed: u64,
    /// Territory sum per faction id.
    territory_sums: Vec<f64>,
    /// Territory sum of squares for std dev calculation.
    territory_sq_sums: Vec<f64>,
    /// Games each faction took part in.
    appearances: Vec<u64>,
    /// Games each faction ended with nothing.
    eliminations: Vec<u64>,
    /// Total turns across all games.
    total_turns: u64,
    /// Total captures across all games.
    total_captures: u64,
}

impl TournamentStats {
    /// Create empty stats.
    pub(super) fn new() -> Self {
        let slots = usize::from(MAX_FACTION_ID) + 1;
        Self {
            territory_sums: vec![0.0; slots],
            territory_sq_sums: vec![0.0; slots],
            appearances: vec![0; slots],
            eliminations: vec![0; slots],
            ..Self::default()
        }
    }

    /// Add a game result to the stats.
    pub(super) fn add_result(&mut self, result: &GameResult) {
        self.games_played += 1;
        self.total_turns += u64::from(result.turns_played);
        self.total_captures += u64::from(result.captures);

        match result.outcome {
            Some(Outcome::Win) => self.wins += 1,
            Some(Outcome::Lose) => self.losses += 1,
            None => self.unfinished += 1,
        }

        for stats in &result.factions {
            let idx = usize::from(stats.faction.id());
            if idx < self.appearances.len() {
                let owned = stats.territories as f64;
                self.territory_sums[idx] += owned;
                self.territory_sq_sums[idx] += owned * owned;
                self.appearances[idx] += 1;
                if stats.territories == 0 {
                    self.eliminations[idx] += 1;
                }
            }
        }
    }

    /// Count a game that failed to start.
    pub(super) fn add_failure(&mut self) {
        self.failed += 1;
    }

    /// Merge stats gathered on another thread.
    pub(super) fn merge(&mut self, other: &Self) {
        self.games_played += other.games_played;
        self.wins += other.wins;
        self.losses += other.losses;
        self.unfinished += other.unfinished;
        self.failed += other.failed;
        self.total_turns += other.total_turns;
        self.total_captures += other.total_captures;
        for i in 0..self.appearances.len() {
            self.territory_sums[i] += other.territory_sums.get(i).copied().unwrap_or(0.0);
            self.territory_sq_sums[i] += other.territory_sq_sums.get(i).copied().unwrap_or(0.0);
            self.appearances[i] += other.appearances.get(i).copied().unwrap_or(0);
            self.eliminations[i] += other.eliminations.get(i).copied().unwrap_or(0);
        }
    }

    /// Factions that appeared in at least one game.
    pub(super) fn factions(&self) -> Vec<Faction> {
        (0..self.appearances.len())
            .filter(|&i| self.appearances[i] > 0)
            .filter_map(|i| FactionId::try_from(i).ok().and_then(Faction::from_id))
            .collect()
    }

    /// Player win rate (0.0-1.0).
    pub(super) fn win_rate(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.wins as f64 / self.games_played as f64
    }

    /// Average territories held at the end by a faction.
    pub(super) fn avg_territories(&self, faction: Faction) -> f64 {
        let idx = usize::from(faction.id());
        let n = self.appearances.get(idx).copied().unwrap_or(0);
        if n == 0 {
            return 0.0;
        }
        self.territory_sums[idx] / n as f64
    }

    /// Standard deviation of territories held at the end by a faction.
    pub(super) fn territories_std_dev(&self, faction: Faction) -> f64 {
        let idx = usize::from(faction.id());
        let n = self.appearances.get(idx).copied().unwrap_or(0);
        if n == 0 {
            return 0.0;
        }
        let mean = self.avg_territories(faction);
        let variance = (self.territory_sq_sums[idx] / n as f64) - (mean * mean);
        if variance < 0.0 { 0.0 } else { variance.sqrt() }
    }

    /// Games a faction ended with no territory.
    pub(super) fn eliminations(&self, faction: Faction) -> u64 {
        self.eliminations
            .get(usize::from(faction.id()))
            .copied()
            .unwrap_or(0)
    }

    /// Average game length.
    pub(super) fn avg_turns(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_turns as f64 / self.games_played as f64
    }

    /// Average captures per game.
    pub(super) fn avg_captures(&self) -> f64 {
        if self.games_played == 0 {
            return 0.0;
        }
        self.total_captures as f64 / self.games_played as f64
    }
}

/// JSON-serializable tournament result.
#[derive(Debug, Serialize)]
pub(super) struct JsonTournamentResult {
    /// Total games played.
    games_played: u64,
    /// Player wins.
    wins: u64,
    /// Player losses.
    losses: u64,
    /// Games that hit a limit.
    unfinished: u64,
    /// Games that failed to start.
    failed: u64,
    /// Player win rate (0.0-1.0).
    win_rate: f64,
    /// Average game length in turns.
    avg_turns: f64,
    /// Average captures per game.
    avg_captures: f64,
    /// Per-faction statistics.
    factions: Vec<JsonFactionStats>,
}

/// JSON-serializable per-faction tournament stats.
#[derive(Debug, Serialize)]
pub(super) struct JsonFactionStats {
    /// Faction label.
    faction: String,
    /// Average territories at the end.
    avg_territories: f64,
    /// Territory standard deviation.
    territories_std_dev: f64,
    /// Games ended with no territory.
    eliminations: u64,
}

impl JsonTournamentResult {
    /// Create from stats.
    pub(super) fn from_stats(stats: &TournamentStats) -> Self {
        let factions = stats
            .factions()
            .into_iter()
            .map(|faction| JsonFactionStats {
                faction: faction.to_string(),
                avg_territories: stats.avg_territories(faction),
                territories_std_dev: stats.territories_std_dev(faction),
                eliminations: stats.eliminations(faction),
            })
            .collect();

        Self {
            games_played: stats.games_played,
            wins: stats.wins,
            losses: stats.losses,
            unfinished: stats.unfinished,
            failed: stats.failed,
            win_rate: stats.win_rate(),
            avg_turns: stats.avg_turns(),
            avg_captures: stats.avg_captures(),
            factions,
        }
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Format tournament stats as human-readable text.
pub(super) fn format_tournament_text(stats: &TournamentStats) -> String {
    let mut output = String::new();
    let games = stats.games_played;

    output.push_str(&format!("Tournament Results ({games} games)\n"));
    output.push_str("========================================\n\n");

    output.push_str("Player Results:\n");
    output.push_str(&format!("  Wins: {} ({:.1}%)\n", stats.wins, percent(stats.wins, games)));
    output.push_str(&format!(
        "  Losses: {} ({:.1}%)\n",
        stats.losses,
        percent(stats.losses, games)
    ));
    output.push_str(&format!(
        "  Unfinished: {} ({:.1}%)\n",
        stats.unfinished,
        percent(stats.unfinished, games)
    ));
    if stats.failed > 0 {
        output.push_str(&format!("  Failed to start: {}\n", stats.failed));
    }

    output.push_str("\nTerritories at End:\n");
    for faction in stats.factions() {
        output.push_str(&format!(
            "  {:<8} {:.1} (+/- {:.1}), eliminated in {} games\n",
            faction.to_string(),
            stats.avg_territories(faction),
            stats.territories_std_dev(faction),
            stats.eliminations(faction)
        ));
    }

    output.push_str(&format!("\nAverage Game Length: {:.0} turns\n", stats.avg_turns()));
    output.push_str(&format!("Average Captures: {:.1}\n", stats.avg_captures()));

    output
}

/// Format tournament stats as CSV.
pub(super) fn format_tournament_csv(stats: &TournamentStats) -> String {
    let mut output = String::new();

    // Header
    output.push_str("faction,games,avg_territories,territories_std_dev,eliminations\n");

    // Data rows
    for faction in stats.factions() {
        output.push_str(&format!(
            "{},{},{:.2},{:.2},{}\n",
            faction,
            stats.games_played,
            stats.avg_territories(faction),
            stats.territories_std_dev(faction),
            stats.eliminations(faction)
        ));
    }

    output
}
