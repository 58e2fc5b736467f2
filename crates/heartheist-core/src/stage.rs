//! Stage sequencing.
//!
//! The experience is a fixed run of four scenes. A [`StageCursor`] is a plain
//! `Copy` value: handlers read it out of the visitor's session, apply a
//! [`StageAction`], and store the returned cursor back. Nothing here holds
//! state of its own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One named scene, in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Vault,
    Puzzle,
    Rain,
    Finale,
}

impl Stage {
    /// Every stage in play order.
    pub const ALL: [Self; 4] = [Self::Vault, Self::Puzzle, Self::Rain, Self::Finale];

    /// Lowercase name, also the scene file stem.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vault => "vault",
            Self::Puzzle => "puzzle",
            Self::Rain => "rain",
            Self::Finale => "finale",
        }
    }

    /// Position in [`Stage::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Vault => 0,
            Self::Puzzle => 1,
            Self::Rain => 2,
            Self::Finale => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown stage '{s}' (expected vault, puzzle, rain or finale)"))
    }
}

/// Index into [`Stage::ALL`]; always in bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StageCursor(usize);

impl StageCursor {
    const LAST: usize = Stage::ALL.len() - 1;

    /// Cursor at the first stage.
    #[must_use]
    pub fn start() -> Self {
        Self(0)
    }

    /// Cursor at `index`, clamped to the last stage.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(index.min(Self::LAST))
    }

    /// Cursor positioned on `stage`.
    #[must_use]
    pub fn at(stage: Stage) -> Self {
        Self(stage.index())
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }

    #[must_use]
    pub fn stage(self) -> Stage {
        Stage::ALL[self.0]
    }

    #[must_use]
    pub fn is_last(self) -> bool {
        self.0 == Self::LAST
    }

    /// Number of stages in the run.
    #[must_use]
    pub fn total() -> usize {
        Stage::ALL.len()
    }

    /// Move forward one stage; stays put on the finale.
    #[must_use]
    pub fn advance(self) -> Self {
        Self((self.0 + 1).min(Self::LAST))
    }

    /// Same as [`advance`](Self::advance). The UI labels differ; the move does not.
    #[must_use]
    pub fn skip(self) -> Self {
        self.advance()
    }

    /// Back to the vault.
    #[must_use]
    pub fn restart(self) -> Self {
        Self::start()
    }

    /// Straight to the finale.
    #[must_use]
    pub fn jump_to_last(self) -> Self {
        Self(Self::LAST)
    }
}

/// A button press on the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageAction {
    Advance,
    Skip,
    Restart,
    Finale,
}

impl StageAction {
    /// Apply the action to a cursor and return the new cursor.
    #[must_use]
    pub fn apply(self, cursor: StageCursor) -> StageCursor {
        match self {
            Self::Advance => cursor.advance(),
            Self::Skip => cursor.skip(),
            Self::Restart => cursor.restart(),
            Self::Finale => cursor.jump_to_last(),
        }
    }
}

impl FromStr for StageAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "advance" | "continue" => Ok(Self::Advance),
            "skip" => Ok(Self::Skip),
            "restart" => Ok(Self::Restart),
            "finale" => Ok(Self::Finale),
            other => Err(format!("unknown stage action '{other}'")),
        }
    }
}
