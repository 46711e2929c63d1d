//! Fixed-layout analysis engine records
//!
//! These records are embedded inside game history entries. Layouts follow
//! Delphi record alignment: 32-bit fields start on 4-byte boundaries, so
//! short leading arrays are followed by padding. Floats are IEEE-754
//! single precision.

use crate::codec::{ByteCursor, CodecResult};
use serde::Serialize;

/// Positions and evaluations tracked per best-move candidate list
pub const MAX_CANDIDATES: usize = 32;

/// Points on the board including both bars
pub const BOARD_POINTS: usize = 26;

/// Probabilities and equities in one evaluation
pub const EVAL_VALUES: usize = 7;

/// Clock settings of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSetting {
    /// Clock type
    pub clock_type: i32,
    /// Time applies per game rather than per match
    pub per_game: bool,
    /// Initial time
    pub time1: i32,
    /// Time added per move
    pub time2: i32,
    /// Penalty points on timeout
    pub penalty: i32,
    /// Time left for player 1
    pub time_left1: i32,
    /// Time left for player 2
    pub time_left2: i32,
    /// Penalty in money sessions
    pub penalty_money: i32,
}

impl TimeSetting {
    /// Encoded size in bytes
    pub const SIZE: usize = 32;

    /// Decode from the cursor position
    pub fn decode(cursor: &mut ByteCursor<'_>) -> CodecResult<Self> {
        let clock_type = cursor.read_i32()?;
        let per_game = cursor.read_bool()?;
        cursor.skip(3)?;
        Ok(Self {
            clock_type,
            per_game,
            time1: cursor.read_i32()?,
            time2: cursor.read_i32()?,
            penalty: cursor.read_i32()?,
            time_left1: cursor.read_i32()?,
            time_left2: cursor.read_i32()?,
            penalty_money: cursor.read_i32()?,
        })
    }
}

/// Engine level an evaluation was computed at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvalLevel {
    /// Search level
    pub level: i16,
    /// Evaluation is a cube decision
    pub is_double: bool,
}

impl EvalLevel {
    /// Encoded size in bytes
    pub const SIZE: usize = 4;

    /// Decode from the cursor position
    pub fn decode(cursor: &mut ByteCursor<'_>) -> CodecResult<Self> {
        let level = cursor.read_i16()?;
        let is_double = cursor.read_bool()?;
        cursor.skip(1)?;
        Ok(Self { level, is_double })
    }
}

/// Engine state for a checker play analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestMoveRecord {
    /// Position before the move
    pub pos: [i8; BOARD_POINTS],
    /// Dice rolled
    pub dice: [i8; 2],
    /// Analysis level
    pub level: i32,
    /// Score of both players
    pub score: [i32; 2],
    /// Cube value
    pub cube: i32,
    /// Cube owner
    pub cube_pos: i32,
    /// Crawford game flag
    pub crawford: i32,
    /// Jacoby rule flag
    pub jacoby: i32,
    /// Number of candidate moves analyzed
    pub n_moves: i32,
    /// Position after each candidate
    pub pos_played: [[i8; BOARD_POINTS]; MAX_CANDIDATES],
    /// Each candidate as four from/to pairs
    pub moves: [[i8; 8]; MAX_CANDIDATES],
    /// Level of each candidate's evaluation
    pub eval_level: [EvalLevel; MAX_CANDIDATES],
    /// Evaluation of each candidate
    pub eval: [[f32; EVAL_VALUES]; MAX_CANDIDATES],
    /// Unused
    pub unused: i8,
    /// Match equity table in use
    pub met: i8,
    /// Candidate chosen at level 0
    pub choice0: i8,
    /// Candidate chosen at level 3
    pub choice3: i8,
}

impl BestMoveRecord {
    /// Encoded size in bytes
    pub const SIZE: usize = 2184;

    /// Decode from the cursor position
    pub fn decode(cursor: &mut ByteCursor<'_>) -> CodecResult<Self> {
        let pos = cursor.read_i8_array()?;
        let dice = cursor.read_i8_array()?;
        let level = cursor.read_i32()?;
        let score = [cursor.read_i32()?, cursor.read_i32()?];
        let cube = cursor.read_i32()?;
        let cube_pos = cursor.read_i32()?;
        let crawford = cursor.read_i32()?;
        let jacoby = cursor.read_i32()?;
        let n_moves = cursor.read_i32()?;
        cursor.skip(8)?;

        let mut pos_played = [[0i8; BOARD_POINTS]; MAX_CANDIDATES];
        for slot in &mut pos_played {
            *slot = cursor.read_i8_array()?;
        }
        let mut moves = [[0i8; 8]; MAX_CANDIDATES];
        for slot in &mut moves {
            *slot = cursor.read_i8_array()?;
        }
        let mut eval_level = [EvalLevel::default(); MAX_CANDIDATES];
        for slot in &mut eval_level {
            *slot = EvalLevel::decode(cursor)?;
        }
        let mut eval = [[0f32; EVAL_VALUES]; MAX_CANDIDATES];
        for row in &mut eval {
            *row = read_eval(cursor)?;
        }

        Ok(Self {
            pos,
            dice,
            level,
            score,
            cube,
            cube_pos,
            crawford,
            jacoby,
            n_moves,
            pos_played,
            moves,
            eval_level,
            eval,
            unused: cursor.read_i8()?,
            met: cursor.read_i8()?,
            choice0: cursor.read_i8()?,
            choice3: cursor.read_i8()?,
        })
    }
}

/// Engine state for a cube decision analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoubleActionRecord {
    /// Position at the decision
    pub pos: [i8; BOARD_POINTS],
    /// Analysis level
    pub level: i32,
    /// Score of both players
    pub score: [i32; 2],
    /// Cube value
    pub cube: i32,
    /// Cube owner
    pub cube_pos: i32,
    /// Jacoby rule flag
    pub jacoby: i32,
    /// Crawford game flag
    pub crawford: i32,
    /// Match equity table in use
    pub met: i32,
    /// Whether doubling was considered
    pub flag_double: i32,
    /// Whether beavers are allowed
    pub is_beaver: i32,
    /// No-double evaluation
    pub eval: [f32; EVAL_VALUES],
    /// Equity of no double
    pub equ_b: f32,
    /// Equity of double/take
    pub equ_double: f32,
    /// Equity of double/pass
    pub equ_drop: f32,
    /// Requested analysis level
    pub level_request: i32,
    /// Decision at level 3
    pub double_choice3: i32,
    /// Double/take evaluation
    pub eval_double: [f32; EVAL_VALUES],
}

impl DoubleActionRecord {
    /// Encoded size in bytes
    pub const SIZE: usize = 144;

    /// Decode from the cursor position
    pub fn decode(cursor: &mut ByteCursor<'_>) -> CodecResult<Self> {
        let pos = cursor.read_i8_array()?;
        cursor.skip(2)?;
        Ok(Self {
            pos,
            level: cursor.read_i32()?,
            score: [cursor.read_i32()?, cursor.read_i32()?],
            cube: cursor.read_i32()?,
            cube_pos: cursor.read_i32()?,
            jacoby: cursor.read_i32()?,
            crawford: cursor.read_i32()?,
            met: cursor.read_i32()?,
            flag_double: cursor.read_i32()?,
            is_beaver: cursor.read_i32()?,
            eval: read_eval(cursor)?,
            equ_b: cursor.read_f32()?,
            equ_double: cursor.read_f32()?,
            equ_drop: cursor.read_f32()?,
            level_request: cursor.read_i32()?,
            double_choice3: cursor.read_i32()?,
            eval_double: read_eval(cursor)?,
        })
    }
}

fn read_eval(cursor: &mut ByteCursor<'_>) -> CodecResult<[f32; EVAL_VALUES]> {
    let mut eval = [0f32; EVAL_VALUES];
    for value in &mut eval {
        *value = cursor.read_f32()?;
    }
    Ok(eval)
}
