use stackbot_engine::{Board, PlacementOutcome};

/// The eight afterstate features of the evaluation model.
///
/// All values are extracted from the post-clear board except
/// `landing_height` and `eroded_piece_cells`, which come from the placement
/// itself. Field order is the weight-vector order and must never change
/// behind persisted weight files.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureVector {
    /// Midpoint of the rows the piece occupied before clearing.
    pub landing_height: f32,
    /// Lines cleared times the piece's own cells erased by them.
    pub eroded_piece_cells: f32,
    /// Occupied/empty flips along each row, side walls counted as filled.
    pub row_transitions: f32,
    /// Occupied/empty flips along each column, floor counted as filled.
    pub column_transitions: f32,
    /// Empty cells below the top of their column.
    pub holes: f32,
    /// Filled cells directly above each hole, summed over all holes.
    pub hole_depth: f32,
    /// Rows containing at least one hole.
    pub rows_with_holes: f32,
    /// Sum over wells of `depth * (depth + 1) / 2`.
    pub cumulative_wells: f32,
}

impl FeatureVector {
    pub const LEN: usize = 8;

    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "board metrics are tiny")]
    pub fn from_outcome(outcome: &PlacementOutcome) -> Self {
        let board = &outcome.board;
        Self {
            landing_height: (outcome.piece_low_row + outcome.piece_high_row) as f32 / 2.0,
            eroded_piece_cells: (outcome.lines_cleared * outcome.piece_cells_cleared) as f32,
            row_transitions: row_transitions(board) as f32,
            column_transitions: column_transitions(board) as f32,
            holes: holes(board) as f32,
            hole_depth: hole_depth(board) as f32,
            rows_with_holes: rows_with_holes(board) as f32,
            cumulative_wells: cumulative_wells(board) as f32,
        }
    }

    /// The feature values in weight-vector order.
    #[must_use]
    pub fn as_array(&self) -> [f32; Self::LEN] {
        [
            self.landing_height,
            self.eroded_piece_cells,
            self.row_transitions,
            self.column_transitions,
            self.holes,
            self.hole_depth,
            self.rows_with_holes,
            self.cumulative_wells,
        ]
    }
}

fn row_transitions(board: &Board) -> usize {
    let mut transitions = 0;
    for y in 0..board.max_height() {
        // Both walls count as filled, so a lone empty cell at either edge
        // is two transitions.
        let mut prev = true;
        for x in 0..board.width() {
            let cell = board.get(x, y);
            if cell != prev {
                transitions += 1;
            }
            prev = cell;
        }
        if !prev {
            transitions += 1;
        }
    }
    transitions
}

fn column_transitions(board: &Board) -> usize {
    let mut transitions = 0;
    for x in 0..board.width() {
        let height = board.column_height(x);
        let mut prev = true;
        for y in 0..height {
            let cell = board.get(x, y);
            if cell != prev {
                transitions += 1;
            }
            prev = cell;
        }
        // The topmost cell of a non-empty column is filled, and the cell
        // above it is empty.
        if height > 0 && height < board.total_height() {
            transitions += 1;
        }
    }
    transitions
}

fn holes(board: &Board) -> usize {
    (0..board.width())
        .map(|x| {
            let height = board.column_height(x);
            let filled = (0..height).filter(|&y| board.get(x, y)).count();
            height - filled
        })
        .sum()
}

fn hole_depth(board: &Board) -> usize {
    let mut depth = 0;
    for x in 0..board.width() {
        let mut filled_above = 0;
        for y in (0..board.column_height(x)).rev() {
            if board.get(x, y) {
                filled_above += 1;
            } else {
                depth += filled_above;
            }
        }
    }
    depth
}

fn rows_with_holes(board: &Board) -> usize {
    (0..board.max_height())
        .filter(|&y| (0..board.width()).any(|x| !board.get(x, y) && board.column_height(x) > y))
        .count()
}

fn cumulative_wells(board: &Board) -> usize {
    let mut total = 0;
    for x in 0..board.width() {
        let own = board.column_height(x);
        let left = if x == 0 {
            usize::MAX
        } else {
            board.column_height(x - 1)
        };
        let right = if x + 1 == board.width() {
            usize::MAX
        } else {
            board.column_height(x + 1)
        };
        let depth = left.min(right).saturating_sub(own);
        total += depth * (depth + 1) / 2;
    }
    total
}

#[cfg(test)]
mod tests {
    use stackbot_engine::{PieceKind, Rotation, simulate};

    use super::*;

    #[test]
    fn test_empty_board_is_all_zero() {
        let board = Board::new(10, 24);
        let outcome = PlacementOutcome {
            board,
            lines_cleared: 0,
            piece_cells_cleared: 0,
            piece_low_row: 0,
            piece_high_row: 0,
        };
        assert_eq!(FeatureVector::from_outcome(&outcome), FeatureVector::default());
    }

    #[test]
    fn test_hole_features_from_buried_cell() {
        // Column 0 has a block at row 2 over two empty rows.
        let mut board = Board::new(10, 24);
        board.set(0, 2, true);
        assert_eq!(holes(&board), 2);
        assert_eq!(hole_depth(&board), 2);
        assert_eq!(rows_with_holes(&board), 2);
    }

    #[test]
    fn test_hole_depth_counts_each_cover() {
        // Two blocks stacked over one hole: the hole is covered twice.
        let mut board = Board::new(10, 24);
        board.set(3, 1, true);
        board.set(3, 2, true);
        assert_eq!(holes(&board), 1);
        assert_eq!(hole_depth(&board), 2);
        assert_eq!(rows_with_holes(&board), 1);
    }

    #[test]
    fn test_row_transitions_counts_walls() {
        // One block in the middle of the bottom row: wall->empty, empty->
        // block, block->empty, empty->wall.
        let mut board = Board::new(10, 24);
        board.set(4, 0, true);
        assert_eq!(row_transitions(&board), 4);
        assert_eq!(column_transitions(&board), 1);
    }

    #[test]
    fn test_cumulative_wells_quadratic_depth() {
        // Three-deep well against the left wall.
        let board = Board::from_ascii(
            24,
            r"
            .#........
            .#........
            .#........
            ",
        );
        assert_eq!(cumulative_wells(&board), 6);
    }

    #[test]
    fn test_landing_and_erosion_from_simulation() {
        let board = Board::from_ascii(
            24,
            r"
            ....######
            ",
        );
        let outcome = simulate(&board, PieceKind::I, Rotation::ZERO, 0, -2).unwrap();
        let features = FeatureVector::from_outcome(&outcome);
        assert!((features.landing_height - 0.0).abs() < f32::EPSILON);
        // One line cleared, all four piece cells were in it.
        assert!((features.eroded_piece_cells - 4.0).abs() < f32::EPSILON);
        assert!((features.holes - 0.0).abs() < f32::EPSILON);
    }
}
