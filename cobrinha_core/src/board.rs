use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;

/// 5x5 grid.
pub const BOARD_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub revealed: bool,
}

/// Draw `mine_count` distinct positions uniformly at random.
///
/// Rejection sampling: keep drawing uniform indices until enough distinct
/// ones accumulate. Every subset of the requested size is equally likely.
pub fn draw_mine_indices(rng: &mut dyn RandomSource, mine_count: usize) -> BTreeSet<usize> {
    debug_assert!((1..BOARD_SIZE).contains(&mine_count));
    let mut mines = BTreeSet::new();
    while mines.len() < mine_count {
        let idx = (rng.next_float() * BOARD_SIZE as f64) as usize;
        mines.insert(idx);
    }
    mines
}

/// One round's grid. Dealt fresh per round; revealed cells never flip back
/// until the next deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Cell>,
}

impl Board {
    pub fn deal(rng: &mut dyn RandomSource, mine_count: usize) -> Self {
        let mines = draw_mine_indices(rng, mine_count);
        let cells = (0..BOARD_SIZE)
            .map(|i| Cell {
                is_mine: mines.contains(&i),
                revealed: false,
            })
            .collect();
        Self { cells }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn is_mine(&self, index: usize) -> bool {
        self.cells.get(index).map_or(false, |c| c.is_mine)
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.cells.get(index).map_or(false, |c| c.revealed)
    }

    pub(crate) fn reveal(&mut self, index: usize) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.revealed = true;
        }
    }

    pub fn mine_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_mine).count()
    }

    pub fn mine_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_mine)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn revealed_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.revealed)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededSource;

    #[test]
    fn deal_places_exact_mine_count() {
        let mut rng = SeededSource::new(1);
        for mine_count in [1, 3, 12, 24] {
            let board = Board::deal(&mut rng, mine_count);
            assert_eq!(board.mine_count(), mine_count);
            assert_eq!(board.cells().len(), BOARD_SIZE);
            assert!(board.revealed_indices().is_empty());
        }
    }

    #[test]
    fn drawn_indices_are_in_range() {
        let mut rng = SeededSource::new(2);
        for _ in 0..100 {
            let mines = draw_mine_indices(&mut rng, 5);
            assert_eq!(mines.len(), 5);
            assert!(mines.iter().all(|&i| i < BOARD_SIZE));
        }
    }

    #[test]
    fn reveal_out_of_range_is_ignored() {
        let mut rng = SeededSource::new(3);
        let mut board = Board::deal(&mut rng, 3);
        board.reveal(BOARD_SIZE + 10);
        assert!(board.revealed_indices().is_empty());
    }

    #[test]
    fn reveal_marks_cell_permanently() {
        let mut rng = SeededSource::new(4);
        let mut board = Board::deal(&mut rng, 3);
        board.reveal(7);
        board.reveal(7);
        assert_eq!(board.revealed_indices(), vec![7]);
    }
}
