use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece types in table order.
    pub const ALL: [PieceKind; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Relative cell offsets of this piece in the given rotation state.
    ///
    /// Offsets are `(dx, dy)` within the piece's bounding box, with `dy`
    /// increasing upward to match the board's bottom-row-0 layout.
    #[must_use]
    pub fn cells(self, rotation: Rotation) -> &'static CellList {
        &PIECE_CELLS[self as usize][rotation.as_usize()]
    }

    /// Side length of the bounding box (3, except 4 for the I-piece).
    #[must_use]
    pub const fn bounding_box(self) -> i16 {
        match self {
            PieceKind::I => 4,
            _ => 3,
        }
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// Rotation state of a piece.
///
/// One of four states: `0` (spawn), `1` (90° clockwise), `2` (180°),
/// `3` (270° clockwise). Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Rotation(u8);

impl Rotation {
    pub const ZERO: Self = Rotation(0);

    /// All rotation states in order.
    pub const ALL: [Rotation; 4] = [Rotation(0), Rotation(1), Rotation(2), Rotation(3)];

    #[must_use]
    pub const fn new(state: u8) -> Self {
        Rotation(state % 4)
    }

    #[must_use]
    pub const fn cw(self) -> Self {
        Rotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn ccw(self) -> Self {
        Rotation((self.0 + 3) % 4)
    }

    #[must_use]
    pub const fn index(self) -> u8 {
        self.0
    }

    pub(crate) const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Direction of a rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spin {
    Cw,
    Ccw,
}

/// A piece in flight: kind, rotation state, and bounding-box origin.
///
/// The origin is the bottom-left corner of the bounding box and may leave
/// the board transiently (kick trials, slides past the edge); collision
/// testing rejects any occupied cell outside the board, so such states are
/// simply unreachable unless every cell stays in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceState {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i16,
    pub y: i16,
}

impl PieceState {
    #[must_use]
    pub const fn new(kind: PieceKind, rotation: Rotation, x: i16, y: i16) -> Self {
        Self {
            kind,
            rotation,
            x,
            y,
        }
    }

    /// Absolute cell coordinates occupied by this state.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        self.kind
            .cells(self.rotation)
            .iter()
            .map(move |&(dx, dy)| (self.x + i16::from(dx), self.y + i16::from(dy)))
    }

    #[must_use]
    pub const fn left(self) -> Self {
        Self { x: self.x - 1, ..self }
    }

    #[must_use]
    pub const fn right(self) -> Self {
        Self { x: self.x + 1, ..self }
    }

    #[must_use]
    pub const fn down(self) -> Self {
        Self { y: self.y - 1, ..self }
    }

    #[must_use]
    pub const fn with_rotation(self, rotation: Rotation) -> Self {
        Self { rotation, ..self }
    }

    #[must_use]
    pub const fn offset(self, dx: i16, dy: i16) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }
}

/// Cell offsets of a piece within its bounding box, `dy` up.
pub type CellList = [(i8, i8); 4];

/// Generates all 4 rotation states from the spawn-state cell list by
/// rotating 90° clockwise about the bounding box.
///
/// With `dy` pointing up, a clockwise turn maps `(x, y)` to
/// `(y, size - 1 - x)`.
const fn cell_rotations(size: i8, spawn: CellList) -> [CellList; 4] {
    let mut states = [spawn; 4];
    let mut i = 1;
    while i < 4 {
        let mut rotated = [(0, 0); 4];
        let mut c = 0;
        while c < 4 {
            let (x, y) = states[i - 1][c];
            rotated[c] = (y, size - 1 - x);
            c += 1;
        }
        states[i] = rotated;
        i += 1;
    }
    states
}

/// Shape table: per (kind, rotation) cell offsets, built once at compile
/// time from the guideline spawn shapes (flat side down, in the upper rows
/// of the box). The O-piece is rotation-invariant, so all four of its
/// states share one cell list.
const PIECE_CELLS: [[CellList; 4]; PieceKind::LEN] = {
    const O_CELLS: CellList = [(1, 1), (2, 1), (1, 2), (2, 2)];
    [
        // I-piece
        cell_rotations(4, [(0, 2), (1, 2), (2, 2), (3, 2)]),
        // O-piece
        [O_CELLS; 4],
        // S-piece
        cell_rotations(3, [(0, 1), (1, 1), (1, 2), (2, 2)]),
        // Z-piece
        cell_rotations(3, [(1, 1), (2, 1), (0, 2), (1, 2)]),
        // J-piece
        cell_rotations(3, [(0, 1), (1, 1), (2, 1), (0, 2)]),
        // L-piece
        cell_rotations(3, [(0, 1), (1, 1), (2, 1), (2, 2)]),
        // T-piece
        cell_rotations(3, [(0, 1), (1, 1), (2, 1), (1, 2)]),
    ]
};
