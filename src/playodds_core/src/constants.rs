/// Provider outcome code for a game that has not been decided
pub const OUTCOME_PENDING: u8 = 0;

/// Provider outcome code for a home win
pub const OUTCOME_HOME_WIN: u8 = 1;

/// Provider outcome code for an away win
pub const OUTCOME_AWAY_WIN: u8 = 2;

/// Provider outcome code for a tie
pub const OUTCOME_TIE: u8 = 3;

/// Provider seeding tiebreak codes
pub const TIEBREAK_HEAD_TO_HEAD: i32 = 0;
pub const TIEBREAK_POINTS_FOR: i32 = 1;
pub const TIEBREAK_DIVISION_RECORD: i32 = 2;
pub const TIEBREAK_POINTS_AGAINST: i32 = 3;

/// Completed games a team needs before its scoring spread is meaningful
pub const MIN_COMPLETED_GAMES: usize = 3;

/// Earliest current week at which the season can be simulated
pub const MIN_SIMULATION_WEEK: u32 = 3;

/// Trials run when the caller does not ask for a specific count
pub const DEFAULT_TRIALS: usize = 1000;
