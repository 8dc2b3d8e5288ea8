//! Affine-gap Smith-Waterman alignment of one allele against one contig region.
//!
//! Alignment runs in two passes. The first pass scores the full local
//! alignment matrix in memory linear in the allele length, remembering for
//! every cell where its best path started. The second pass re-aligns only the
//! window between that start and the best-scoring end cell, with full
//! traceback, to recover the edit script. Both passes reuse the scratch
//! vectors of an [`AlignmentBuffer`].

use std::time::Instant;

use thiserror::Error;

use crate::core::alignment::EditOp;
use crate::utils::nucleotide::is_identity;

use super::scoring::ScoringScheme;

/// Largest traceback window, in cells, the second pass will allocate
pub const MAX_TRACEBACK_CELLS: usize = 1 << 27;

/// Rows between deadline checks
const DEADLINE_CHECK_ROWS: usize = 64;

const NEG_INF: i32 = i32::MIN / 4;

/// Traceback states
const STATE_MATCH: u8 = 0;
const STATE_INSERTION: u8 = 1;
const STATE_DELETION: u8 = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("Alignment exceeded its time limit")]
    Timeout,

    #[error("Traceback window of {cells} cells exceeds the limit of {limit}")]
    MatrixTooLarge { cells: usize, limit: usize },
}

/// Best local alignment between a query region and a reference sequence.
///
/// Coordinates are zero-based, half-open, relative to the sequences passed
/// to [`align_local`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAlignment {
    pub query_start: usize,
    pub query_end: usize,
    pub reference_start: usize,
    pub reference_end: usize,
    pub score: i32,
    pub edit_script: Vec<EditOp>,
}

/// Reusable scratch space for [`align_local`].
///
/// One buffer per worker avoids reallocating the DP rows for every allele.
#[derive(Debug, Default)]
pub struct AlignmentBuffer {
    h: Vec<i32>,
    f: Vec<i32>,
    h_origin: Vec<(usize, usize)>,
    f_origin: Vec<(usize, usize)>,
    rows: [Vec<i32>; 6],
    traceback: Vec<u8>,
}

impl AlignmentBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_deadline(row: usize, deadline: Option<Instant>) -> Result<(), AlignmentError> {
    if row.saturating_sub(1) % DEADLINE_CHECK_ROWS == 0 {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(AlignmentError::Timeout);
            }
        }
    }
    Ok(())
}

/// End cell, start cell and score of the best local alignment
struct BestCell {
    score: i32,
    start: (usize, usize),
    end: (usize, usize),
}

/// First pass: linear-memory Gotoh scoring with start tracking.
///
/// Ties keep the first best cell in row-major order.
fn best_local_cell(
    query: &[u8],
    reference: &[u8],
    scheme: &ScoringScheme,
    buffer: &mut AlignmentBuffer,
    deadline: Option<Instant>,
) -> Result<Option<BestCell>, AlignmentError> {
    let m = reference.len();
    let gap_first = scheme.gap_first();
    let gap_extend = scheme.gap_extend;

    let h = &mut buffer.h;
    let f = &mut buffer.f;
    let h_origin = &mut buffer.h_origin;
    let f_origin = &mut buffer.f_origin;
    h.clear();
    h.resize(m + 1, 0);
    f.clear();
    f.resize(m + 1, NEG_INF);
    h_origin.clear();
    h_origin.resize(m + 1, (0, 0));
    f_origin.clear();
    f_origin.resize(m + 1, (0, 0));

    let mut best = BestCell {
        score: 0,
        start: (0, 0),
        end: (0, 0),
    };

    for i in 1..=query.len() {
        check_deadline(i, deadline)?;
        let q = query[i - 1];

        let mut diag = 0;
        let mut diag_origin = (0, 0);
        let mut e = NEG_INF;
        let mut e_origin = (0, 0);

        for j in 1..=m {
            let up = h[j];
            let up_origin = h_origin[j];

            let f_open = up - gap_first;
            let f_extend = f[j] - gap_extend;
            if f_open >= f_extend {
                f[j] = f_open;
                f_origin[j] = up_origin;
            } else {
                f[j] = f_extend;
            }

            let e_open = h[j - 1] - gap_first;
            let e_extend = e - gap_extend;
            if e_open >= e_extend {
                e = e_open;
                e_origin = h_origin[j - 1];
            } else {
                e = e_extend;
            }

            let substitution = scheme.substitution(q, reference[j - 1]);
            let (mut score, mut origin) = if diag > 0 {
                (diag + substitution, diag_origin)
            } else {
                (substitution, (i - 1, j - 1))
            };
            if e > score {
                score = e;
                origin = e_origin;
            }
            if f[j] > score {
                score = f[j];
                origin = f_origin[j];
            }
            if score < 0 {
                score = 0;
            }

            diag = up;
            diag_origin = up_origin;
            h[j] = score;
            h_origin[j] = origin;

            if score > best.score {
                best = BestCell {
                    score,
                    start: origin,
                    end: (i, j),
                };
            }
        }
    }

    Ok((best.score > 0).then_some(best))
}

/// Second pass: global affine alignment of the window with full traceback.
///
/// Returns the columns in query order. The window's optimal global score
/// equals the local score found by the first pass.
fn traceback_window(
    query: &[u8],
    reference: &[u8],
    scheme: &ScoringScheme,
    buffer: &mut AlignmentBuffer,
    deadline: Option<Instant>,
) -> Result<Vec<EditOp>, AlignmentError> {
    let n = query.len();
    let m = reference.len();
    let width = m + 1;
    let cells = (n + 1).saturating_mul(width);
    if cells > MAX_TRACEBACK_CELLS {
        return Err(AlignmentError::MatrixTooLarge {
            cells,
            limit: MAX_TRACEBACK_CELLS,
        });
    }

    let gap_first = scheme.gap_first();
    let gap_extend = scheme.gap_extend;

    let traceback = &mut buffer.traceback;
    traceback.clear();
    traceback.resize(cells, 0);

    let [prev_m, prev_x, prev_y, cur_m, cur_x, cur_y] = &mut buffer.rows;
    for row in [&mut *prev_m, &mut *prev_x, &mut *prev_y, &mut *cur_m, &mut *cur_x, &mut *cur_y] {
        row.clear();
        row.resize(width, NEG_INF);
    }

    // Row 0: leading deletions only
    prev_m[0] = 0;
    for j in 1..=m {
        prev_y[j] = leading_gap(scheme, j);
        let from = if j == 1 { STATE_MATCH } else { STATE_DELETION };
        traceback[j] = from << 4;
    }

    for i in 1..=n {
        check_deadline(i, deadline)?;
        let q = query[i - 1];

        cur_m[0] = NEG_INF;
        cur_y[0] = NEG_INF;
        cur_x[0] = leading_gap(scheme, i);
        let from = if i == 1 { STATE_MATCH } else { STATE_INSERTION };
        traceback[i * width] = from << 2;

        for j in 1..=m {
            let (m_score, m_from) = best_of([prev_m[j - 1], prev_x[j - 1], prev_y[j - 1]]);
            cur_m[j] = m_score + scheme.substitution(q, reference[j - 1]);

            let (x_score, x_from) = best_of([
                prev_m[j] - gap_first,
                prev_x[j] - gap_extend,
                prev_y[j] - gap_first,
            ]);
            cur_x[j] = x_score;

            let (y_score, y_from) = best_of([
                cur_m[j - 1] - gap_first,
                cur_x[j - 1] - gap_first,
                cur_y[j - 1] - gap_extend,
            ]);
            cur_y[j] = y_score;

            traceback[i * width + j] = m_from | (x_from << 2) | (y_from << 4);
        }

        std::mem::swap(prev_m, cur_m);
        std::mem::swap(prev_x, cur_x);
        std::mem::swap(prev_y, cur_y);
    }

    let (_, mut state) = best_of([prev_m[m], prev_x[m], prev_y[m]]);
    let (mut i, mut j) = (n, m);
    let mut ops = Vec::with_capacity(n.max(m));

    while i > 0 || j > 0 {
        let from = (traceback[i * width + j] >> (2 * state)) & 0b11;
        match state {
            STATE_MATCH if i > 0 && j > 0 => {
                ops.push(if is_identity(query[i - 1], reference[j - 1]) {
                    EditOp::Match
                } else {
                    EditOp::Mismatch
                });
                i -= 1;
                j -= 1;
            }
            STATE_INSERTION if i > 0 => {
                ops.push(EditOp::Insertion);
                i -= 1;
            }
            STATE_DELETION if j > 0 => {
                ops.push(EditOp::Deletion);
                j -= 1;
            }
            _ => break,
        }
        state = from;
    }

    ops.reverse();
    Ok(ops)
}

/// Score of a gap of `len` positions at the start of the window
fn leading_gap(scheme: &ScoringScheme, len: usize) -> i32 {
    let extend = scheme
        .gap_extend
        .saturating_mul(i32::try_from(len).unwrap_or(i32::MAX));
    NEG_INF.max(-scheme.gap_open.saturating_add(extend))
}

/// Highest of three state scores; ties prefer match, then insertion
#[inline]
fn best_of(scores: [i32; 3]) -> (i32, u8) {
    let mut best = (scores[0], STATE_MATCH);
    if scores[1] > best.0 {
        best = (scores[1], STATE_INSERTION);
    }
    if scores[2] > best.0 {
        best = (scores[2], STATE_DELETION);
    }
    best
}

/// Find the best local alignment of `reference` within `query`.
///
/// Returns `Ok(None)` when no positive-scoring alignment exists.
///
/// # Errors
///
/// Returns `AlignmentError::Timeout` if `deadline` passes during alignment,
/// or `AlignmentError::MatrixTooLarge` if the traceback window is too big.
pub fn align_local(
    query: &[u8],
    reference: &[u8],
    scheme: &ScoringScheme,
    buffer: &mut AlignmentBuffer,
    deadline: Option<Instant>,
) -> Result<Option<LocalAlignment>, AlignmentError> {
    if query.is_empty() || reference.is_empty() {
        return Ok(None);
    }

    let Some(best) = best_local_cell(query, reference, scheme, buffer, deadline)? else {
        return Ok(None);
    };

    let (query_start, reference_start) = best.start;
    let (query_end, reference_end) = best.end;
    let edit_script = traceback_window(
        &query[query_start..query_end],
        &reference[reference_start..reference_end],
        scheme,
        buffer,
        deadline,
    )?;

    Ok(Some(LocalAlignment {
        query_start,
        query_end,
        reference_start,
        reference_end,
        score: best.score,
        edit_script,
    }))
}
