use crate::core::{Board, PieceKind, Rotation};

/// Afterstate of one simulated placement.
#[derive(Debug, Clone)]
pub struct PlacementOutcome {
    /// Board after the lock and line clear.
    pub board: Board,
    pub lines_cleared: usize,
    /// Cells of the placed piece that sat inside cleared rows.
    pub piece_cells_cleared: usize,
    /// Lowest row the piece occupied, pre-clear.
    pub piece_low_row: usize,
    /// Highest row the piece occupied, pre-clear.
    pub piece_high_row: usize,
}

/// Pure lock-and-clear simulation.
///
/// Clones the board, locks the piece, clears completed rows, and reports
/// the pre-clear piece row span plus how many of the piece's own cells were
/// erased. Returns `None` when the placement collides; never touches its
/// input.
#[must_use]
pub fn simulate(
    board: &Board,
    kind: PieceKind,
    rotation: Rotation,
    x: i16,
    y: i16,
) -> Option<PlacementOutcome> {
    if board.collides(kind, rotation, x, y) {
        return None;
    }
    let mut after = board.clone();
    let cells = after.place_piece(kind, rotation, x, y, None);
    let piece_low_row = cells.iter().map(|&(_, cy)| cy).min().unwrap_or(0);
    let piece_high_row = cells.iter().map(|&(_, cy)| cy).max().unwrap_or(0);
    let cleared = after.clear_lines();
    let piece_cells_cleared = cells
        .iter()
        .filter(|(_, cy)| cleared.rows.contains(cy))
        .count();
    Some(PlacementOutcome {
        board: after,
        lines_cleared: cleared.count,
        piece_cells_cleared,
        piece_low_row,
        piece_high_row,
    })
}
