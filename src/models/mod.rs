pub mod game;

pub use game::{
    ApiResponse, CastSubmission, LiveEntry, LiveLeaderboardResponse, SnapshotEntry,
    SnapshotPeriod, SnapshotRow,
};
