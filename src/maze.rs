use crate::collision::Aabb;
use crate::constants::{CELL_SIZE, FREE_CELL_ATTEMPTS, MIN_MAZE_DIM, WALL_HEIGHT};
use crate::error::GameError;
use crate::rng::Rng;
use crate::types::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Wall,
    Path,
}

#[derive(Clone, Debug)]
pub struct Maze {
    pub width: i32,
    pub height: i32,
    grid: Vec<Vec<Cell>>,
    walls: Vec<Aabb>,
}

impl Maze {
    pub fn generate(width: i32, height: i32, seed: u32) -> Result<Self, GameError> {
        if width < MIN_MAZE_DIM || height < MIN_MAZE_DIM || width % 2 == 0 || height % 2 == 0 {
            return Err(GameError::InvalidConfiguration { width, height });
        }

        let mut rng = Rng::new(seed);
        let mut grid = vec![vec![Cell::Wall; width as usize]; height as usize];

        // Iterative backtracking carve, stepping two cells at a time so
        // every odd-coordinate cell is reached and the border survives.
        grid[1][1] = Cell::Path;
        let mut stack: Vec<(i32, i32)> = vec![(1, 1)];
        while let Some(&(cx, cy)) = stack.last() {
            let neighbors = unvisited_neighbors(&grid, width, height, cx, cy);
            if neighbors.is_empty() {
                stack.pop();
                continue;
            }
            let (nx, ny) = neighbors[rng.pick_index(neighbors.len())];
            grid[((cy + ny) / 2) as usize][((cx + nx) / 2) as usize] = Cell::Path;
            grid[ny as usize][nx as usize] = Cell::Path;
            stack.push((nx, ny));
        }

        // The exit is forced open regardless of the carve outcome; the
        // resulting one-cell stub off the spanning tree is intentional.
        grid[(height - 2) as usize][(width - 1) as usize] = Cell::Path;

        let walls = build_wall_volumes(&grid);
        Ok(Self {
            width,
            height,
            grid,
            walls,
        })
    }

    pub fn cell(&self, x: i32, y: i32) -> Cell {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return Cell::Wall;
        }
        self.grid[y as usize][x as usize]
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.cell(x, y) == Cell::Wall
    }

    pub fn walls(&self) -> &[Aabb] {
        &self.walls
    }

    pub fn cell_to_world(&self, x: i32, y: i32) -> Vec3 {
        Vec3::new(x as f32 * CELL_SIZE, 0.0, y as f32 * CELL_SIZE)
    }

    pub fn start_position(&self) -> Vec3 {
        self.cell_to_world(1, 1)
    }

    pub fn exit_position(&self) -> Vec3 {
        self.cell_to_world(self.width - 1, self.height - 2)
    }

    pub fn random_free_position(&self, rng: &mut Rng) -> Result<Vec3, GameError> {
        for _ in 0..FREE_CELL_ATTEMPTS {
            let x = rng.int(0, self.width - 1);
            let y = rng.int(0, self.height - 1);
            if self.cell(x, y) == Cell::Wall || (x == 1 && y == 1) {
                continue;
            }
            return Ok(self.cell_to_world(x, y));
        }
        Err(GameError::ExhaustedFreeCellSearch {
            attempts: FREE_CELL_ATTEMPTS,
        })
    }

    #[cfg(test)]
    pub(crate) fn set_cell(&mut self, x: i32, y: i32, cell: Cell) {
        self.grid[y as usize][x as usize] = cell;
        self.walls = build_wall_volumes(&self.grid);
    }
}

fn unvisited_neighbors(
    grid: &[Vec<Cell>],
    width: i32,
    height: i32,
    x: i32,
    y: i32,
) -> Vec<(i32, i32)> {
    let mut neighbors = Vec::new();
    for (dx, dy) in [(0, -2), (0, 2), (-2, 0), (2, 0)] {
        let nx = x + dx;
        let ny = y + dy;
        if nx > 0
            && nx < width - 1
            && ny > 0
            && ny < height - 1
            && grid[ny as usize][nx as usize] == Cell::Wall
        {
            neighbors.push((nx, ny));
        }
    }
    neighbors
}

fn build_wall_volumes(grid: &[Vec<Cell>]) -> Vec<Aabb> {
    let mut walls = Vec::new();
    for (y, row) in grid.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            if *cell == Cell::Wall {
                walls.push(Aabb::from_center_half_extents(
                    Vec3::new(x as f32 * CELL_SIZE, WALL_HEIGHT / 2.0, y as f32 * CELL_SIZE),
                    Vec3::new(CELL_SIZE / 2.0, WALL_HEIGHT / 2.0, CELL_SIZE / 2.0),
                ));
            }
        }
    }
    walls
}
