use std::fmt;

use thiserror::Error;

use crate::shared::errors::AppError;

/// Steps of the per-pack pipeline, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolve,
    FetchRecord,
    FetchMembers,
    FetchProfiles,
    Persist,
    Aggregate,
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Resolve => "resolve",
            Stage::FetchRecord => "fetch-record",
            Stage::FetchMembers => "fetch-members",
            Stage::FetchProfiles => "fetch-profiles",
            Stage::Persist => "persist",
            Stage::Aggregate => "aggregate",
            Stage::Export => "export",
        };
        f.write_str(name)
    }
}

/// Why a pack was given up on. The run continues with the next line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("could not resolve handle {0}")]
    UnresolvedHandle(String),
    #[error("could not fetch starter pack record {0}")]
    RecordUnavailable(String),
    #[error("no members found in list {0}")]
    NoMembers(String),
    #[error("no member profiles could be fetched")]
    NoProfiles,
    #[error("store write failed: {0}")]
    StoreFailure(String),
    #[error("no member entries were written")]
    NothingWritten,
    #[error("stored pack {0} has no members")]
    EmptyAggregate(String),
}

/// Result of running one stage
#[derive(Debug)]
pub enum StageOutcome<T> {
    Continue(T),
    Skip(SkipReason),
    Fatal(AppError),
}

/// Why the stage sequence stopped early
#[derive(Debug)]
pub enum Halt {
    Skip { stage: Stage, reason: SkipReason },
    Fatal { stage: Stage, error: AppError },
}

impl<T> StageOutcome<T> {
    /// Value to carry into the next stage, or the halt tagged with `stage`
    pub fn at(self, stage: Stage) -> Result<T, Halt> {
        match self {
            StageOutcome::Continue(value) => Ok(value),
            StageOutcome::Skip(reason) => Err(Halt::Skip { stage, reason }),
            StageOutcome::Fatal(error) => Err(Halt::Fatal { stage, error }),
        }
    }
}
