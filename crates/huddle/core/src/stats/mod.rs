//! Aggregation engine.
//!
//! Pure functions deriving display statistics from raw [`GameStat`] rows:
//!
//! ```text
//! [ GameStat rows ] ──▶ season_totals ──▶ Averages ──▶ rating ──▶ suggest_lineup
//!                                            ▲
//! [ TeamSeasonStats cache ] ─────────────────┘  (team_season_averages only)
//! ```
//!
//! Nothing here reads or writes storage, so every function is safe to call
//! again at any time. Callers never see an absent aggregate: no games means
//! an all-zero [`Averages`].
//!
//! [`GameStat`]: crate::model::GameStat
mod averages;
mod drift;
mod rating;
mod totals;

pub use averages::{Averages, player_averages, team_season_averages};
pub use drift::{CacheDrift, team_cache_drift};
pub use rating::{efficiency, overall_rating, suggest_lineup};
pub use totals::{SeasonTotals, season_totals};
