use arrayvec::ArrayVec;

use super::piece::{PieceKind, Rotation};

/// Result of a line-clear pass.
///
/// `rows` holds the pre-compaction indices of the cleared rows, bottom to
/// top. In normal play at most 4 rows clear at once, but test fixtures can
/// fill arbitrarily many, so this is a `Vec` rather than a bounded list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineClear {
    pub count: usize,
    pub rows: Vec<usize>,
}

/// Playfield grid with a per-column height cache.
///
/// Rows are stored bottom-up (`row 0` is the floor) as one `u16` bitmask
/// per row, bit `x` for column `x`. The height cache always equals the
/// topmost filled row + 1 per column; every mutation re-checks this in
/// debug builds.
///
/// Boards are cloned constantly during planning; a clone is a fully
/// independent deep copy with no aliasing to its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    total_height: usize,
    rows: Vec<u16>,
    heights: Vec<u8>,
}

impl Board {
    /// Creates an empty board. `total_height` includes any buffer rows
    /// above the visible play area.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `4..=16` or `total_height` exceeds 255.
    #[must_use]
    pub fn new(width: usize, total_height: usize) -> Self {
        assert!((4..=16).contains(&width), "width must be in 4..=16");
        assert!(total_height <= 255, "total height must fit in a u8");
        Self {
            width,
            total_height,
            rows: vec![0; total_height],
            heights: vec![0; width],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn total_height(&self) -> usize {
        self.total_height
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> bool {
        assert!(x < self.width && y < self.total_height);
        self.rows[y] & (1 << x) != 0
    }

    pub fn set(&mut self, x: usize, y: usize, filled: bool) {
        assert!(x < self.width && y < self.total_height);
        if filled {
            self.rows[y] |= 1 << x;
            let top = u8::try_from(y + 1).unwrap();
            if self.heights[x] < top {
                self.heights[x] = top;
            }
        } else {
            self.rows[y] &= !(1 << x);
            if usize::from(self.heights[x]) == y + 1 {
                self.heights[x] = self.scan_column_height(x);
            }
        }
        self.debug_check_heights();
    }

    /// Height of a column: topmost filled row + 1, or 0 when empty.
    #[must_use]
    pub fn column_height(&self, x: usize) -> usize {
        usize::from(self.heights[x])
    }

    #[must_use]
    pub fn max_height(&self) -> usize {
        self.heights.iter().map(|&h| usize::from(h)).max().unwrap_or(0)
    }

    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows[y] == self.full_row_mask()
    }

    /// Checks whether the piece state collides: any occupied cell outside
    /// `[0, width) × [0, total_height)`, or overlapping a filled cell.
    #[must_use]
    #[expect(clippy::cast_sign_loss, reason = "negative coordinates return early")]
    pub fn collides(&self, kind: PieceKind, rotation: Rotation, x: i16, y: i16) -> bool {
        for &(dx, dy) in kind.cells(rotation) {
            let cx = x + i16::from(dx);
            let cy = y + i16::from(dy);
            if cx < 0 || cy < 0 {
                return true;
            }
            let (cx, cy) = (cx as usize, cy as usize);
            if cx >= self.width || cy >= self.total_height {
                return true;
            }
            if self.rows[cy] & (1 << cx) != 0 {
                return true;
            }
        }
        false
    }

    /// Locks a piece onto the board and returns the absolute cells written.
    ///
    /// With `truncate: Some(h)`, cells at row `h` or above are silently
    /// dropped instead of written, the overflow rule of classic rule sets.
    pub fn place_piece(
        &mut self,
        kind: PieceKind,
        rotation: Rotation,
        x: i16,
        y: i16,
        truncate: Option<usize>,
    ) -> ArrayVec<(usize, usize), 4> {
        debug_assert!(
            !self.collides(kind, rotation, x, y),
            "piece must not collide when locked"
        );
        let mut written = ArrayVec::new();
        for &(dx, dy) in kind.cells(rotation) {
            let cx = usize::try_from(x + i16::from(dx)).unwrap();
            let cy = usize::try_from(y + i16::from(dy)).unwrap();
            if truncate.is_some_and(|h| cy >= h) {
                continue;
            }
            self.rows[cy] |= 1 << cx;
            let top = u8::try_from(cy + 1).unwrap();
            if self.heights[cx] < top {
                self.heights[cx] = top;
            }
            written.push((cx, cy));
        }
        self.debug_check_heights();
        written
    }

    /// Clears filled rows in a single compaction pass.
    ///
    /// Full rows are skipped, non-full rows are copied down to a write
    /// cursor, and the vacated top rows are zeroed. The height cache is
    /// rebuilt afterward by scanning each column from the top.
    pub fn clear_lines(&mut self) -> LineClear {
        let mut cleared = LineClear::default();
        let mut write = 0;
        for y in 0..self.total_height {
            if self.is_row_full(y) {
                cleared.count += 1;
                cleared.rows.push(y);
                continue;
            }
            if write != y {
                self.rows[write] = self.rows[y];
            }
            write += 1;
        }
        if cleared.count > 0 {
            self.rows[write..].fill(0);
            for x in 0..self.width {
                self.heights[x] = self.scan_column_height(x);
            }
        }
        self.debug_check_heights();
        cleared
    }

    /// Fast structural hash over the row bitmasks.
    ///
    /// Used only as a memoization key; collisions are a tolerated risk,
    /// never a correctness dependency.
    #[must_use]
    pub fn hash(&self) -> u64 {
        // FNV-1a over the row words.
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for &row in &self.rows {
            h ^= u64::from(row);
            h = h.wrapping_mul(0x0000_0100_0000_01b3);
        }
        h ^ self.width as u64
    }

    /// Creates a board from ASCII art for testing. `#` is a filled cell,
    /// `.` is empty. Rows are listed top to bottom and occupy the bottom
    /// rows of the board; rows above stay empty (buffer space).
    ///
    /// # Panics
    ///
    /// Panics if rows differ in width or do not fit in `total_height`.
    #[must_use]
    pub fn from_ascii(total_height: usize, art: &str) -> Self {
        let lines: Vec<Vec<char>> = art
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.chars().filter(|c| *c == '#' || *c == '.').collect())
            .collect();
        let width = lines.first().map_or(0, Vec::len);
        let mut board = Self::new(width, total_height);
        assert!(lines.len() <= total_height, "too many rows for the board");
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.len(), width, "ragged row {i} in ASCII board");
            let y = lines.len() - 1 - i;
            for (x, &ch) in line.iter().enumerate() {
                if ch == '#' {
                    board.rows[y] |= 1 << x;
                }
            }
        }
        for x in 0..width {
            board.heights[x] = board.scan_column_height(x);
        }
        board.debug_check_heights();
        board
    }

    fn full_row_mask(&self) -> u16 {
        (1 << self.width) - 1
    }

    fn scan_column_height(&self, x: usize) -> u8 {
        for y in (0..self.total_height).rev() {
            if self.rows[y] & (1 << x) != 0 {
                return u8::try_from(y + 1).unwrap();
            }
        }
        0
    }

    fn debug_check_heights(&self) {
        #[cfg(debug_assertions)]
        for x in 0..self.width {
            debug_assert_eq!(
                self.heights[x],
                self.scan_column_height(x),
                "height cache diverged at column {x}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(10, 24);
        for y in 0..24 {
            for x in 0..10 {
                assert!(!board.get(x, y));
            }
            assert!(!board.is_row_full(y));
        }
        assert_eq!(board.max_height(), 0);
    }

    #[test]
    fn test_set_updates_height_cache() {
        let mut board = Board::new(10, 24);
        board.set(3, 5, true);
        assert_eq!(board.column_height(3), 6);
        assert_eq!(board.max_height(), 6);
        board.set(3, 2, true);
        assert_eq!(board.column_height(3), 6);
        board.set(3, 5, false);
        assert_eq!(board.column_height(3), 3);
        board.set(3, 2, false);
        assert_eq!(board.column_height(3), 0);
    }

    #[test]
    fn test_clone_is_alias_free() {
        let mut board = Board::new(10, 24);
        board.set(0, 0, true);
        let clone = board.clone();
        assert_eq!(clone, board);

        let mut mutated = clone.clone();
        mutated.set(5, 5, true);
        assert!(!clone.get(5, 5));
        assert!(!board.get(5, 5));
    }

    #[test]
    fn test_collides_out_of_bounds() {
        let board = Board::new(10, 24);
        // O-piece cells are at offsets (1..=2, 1..=2).
        assert!(!board.collides(PieceKind::O, Rotation::ZERO, 0, 0));
        assert!(board.collides(PieceKind::O, Rotation::ZERO, -2, 0));
        assert!(board.collides(PieceKind::O, Rotation::ZERO, 8, 0));
        assert!(board.collides(PieceKind::O, Rotation::ZERO, 0, -2));
        assert!(board.collides(PieceKind::O, Rotation::ZERO, 0, 23));
    }

    #[test]
    fn test_collides_with_filled_cells() {
        let mut board = Board::new(10, 24);
        assert!(!board.collides(PieceKind::O, Rotation::ZERO, 0, 0));
        board.set(1, 1, true);
        assert!(board.collides(PieceKind::O, Rotation::ZERO, 0, 0));
    }

    #[test]
    fn test_place_piece_reports_cells() {
        let mut board = Board::new(10, 24);
        let cells = board.place_piece(PieceKind::O, Rotation::ZERO, 0, -1, None);
        let mut cells: Vec<_> = cells.into_iter().collect();
        cells.sort_unstable();
        assert_eq!(cells, vec![(1, 0), (1, 1), (2, 0), (2, 1)]);
        assert_eq!(board.column_height(1), 2);
        assert_eq!(board.column_height(2), 2);
    }

    #[test]
    fn test_place_piece_truncates_overflow() {
        let mut board = Board::new(10, 24);
        let cells = board.place_piece(PieceKind::O, Rotation::ZERO, 0, 19, Some(21));
        assert_eq!(cells.len(), 2);
        assert!(board.get(1, 20));
        assert!(!board.get(1, 21));
        assert_eq!(board.column_height(1), 21);
    }

    #[test]
    fn test_clear_lines_reports_indices() {
        let mut board = Board::from_ascii(
            8,
            r"
            #.....
            ######
            .....#
            ######
            ",
        );
        let cleared = board.clear_lines();
        assert_eq!(cleared.count, 2);
        assert_eq!(cleared.rows, vec![0, 2]);

        // Survivors compact downward: row 1 -> 0, row 3 -> 1.
        assert!(board.get(5, 0));
        assert!(!board.is_row_full(0));
        assert!(board.get(0, 1));
        assert_eq!(board.column_height(5), 1);
        assert_eq!(board.column_height(0), 2);
        assert_eq!(board.max_height(), 2);
    }

    #[test]
    fn test_clear_lines_noop_on_partial_rows() {
        let mut board = Board::from_ascii(
            8,
            r"
            #####.
            ",
        );
        let cleared = board.clear_lines();
        assert_eq!(cleared, LineClear::default());
        assert_eq!(board.column_height(0), 1);
    }

    #[test]
    fn test_hash_distinguishes_simple_boards() {
        let empty = Board::new(10, 24);
        let mut one = empty.clone();
        one.set(4, 0, true);
        assert_ne!(empty.hash(), one.hash());
        assert_eq!(one.hash(), one.clone().hash());
    }

    #[test]
    fn test_from_ascii_orientation() {
        let board = Board::from_ascii(
            6,
            r"
            #....
            .....
            ....#
            ",
        );
        // Top line lands on the highest of the occupied rows.
        assert!(board.get(0, 2));
        assert!(board.get(4, 0));
        assert_eq!(board.column_height(0), 3);
        assert_eq!(board.column_height(4), 1);
    }
}
