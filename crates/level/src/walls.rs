//! Wall line parsing.
//!
//! Lines run top to bottom and alternate between horizontal edges (even
//! index) and vertical edges (odd index). Every edge is a pair of
//! characters: a wall marker (`#`, `-`, `|`), a door marker `D` followed by
//! a 1-based door index digit, or blank.

use crate::error::LevelError;

/// Contents of one edge slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallToken {
    #[default]
    Empty,
    Wall,
    /// 1-based index into the document's door list.
    Door(u8),
}

impl WallToken {
    fn from_pair(first: Option<char>, second: Option<char>) -> WallToken {
        match first {
            Some('#' | '-' | '|') => WallToken::Wall,
            Some('D') => match second.and_then(|c| c.to_digit(36)) {
                Some(n) if n > 0 => WallToken::Door(n as u8),
                _ => WallToken::Empty,
            },
            _ => WallToken::Empty,
        }
    }
}

/// Edge grid for a `width` x `height` level.
#[derive(Debug, Clone)]
pub struct WallGrid {
    width: u32,
    height: u32,
    /// `(height + 1) * width` edges; row `r` is the south edge of row `r`.
    horizontal: Vec<WallToken>,
    /// `height * (width + 1)` edges; column `x` is the west edge of column `x`.
    vertical: Vec<WallToken>,
}

impl WallGrid {
    pub fn parse(width: u32, height: u32, lines: &[String]) -> Result<Self, LevelError> {
        let expected = 2 * height as usize + 1;
        if lines.len() != expected {
            return Err(LevelError::MalformedWalls(format!(
                "expected {} lines for height {}, found {}",
                expected,
                height,
                lines.len()
            )));
        }

        let w = width as usize;
        let h = height as usize;
        let mut horizontal = vec![WallToken::Empty; (h + 1) * w];
        let mut vertical = vec![WallToken::Empty; h * (w + 1)];

        for (k, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            let pair = |i: usize| {
                WallToken::from_pair(chars.get(2 * i).copied(), chars.get(2 * i + 1).copied())
            };
            if k % 2 == 0 {
                // North edge of row h - 1 - k/2, i.e. south edge of row h - k/2.
                let r = h - k / 2;
                for x in 0..w {
                    horizontal[r * w + x] = pair(x);
                }
            } else {
                let y = h - 1 - k / 2;
                for x in 0..=w {
                    vertical[y * (w + 1) + x] = pair(x);
                }
            }
        }

        Ok(Self {
            width,
            height,
            horizontal,
            vertical,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Edge on the south side of `(x, row)`; `row == height` is the top border.
    pub fn south_edge(&self, x: u32, row: u32) -> WallToken {
        if x >= self.width || row > self.height {
            return WallToken::Empty;
        }
        self.horizontal[(row * self.width + x) as usize]
    }

    /// Edge on the west side of `(column, y)`; `column == width` is the right border.
    pub fn west_edge(&self, column: u32, y: u32) -> WallToken {
        if column > self.width || y >= self.height {
            return WallToken::Empty;
        }
        self.vertical[(y * (self.width + 1) + column) as usize]
    }
}
