//! Built-in level plans.
//!
//! Top-down plans use `Legend::top_down`, platformer plans
//! `Legend::platformer`.

pub const TOP_DOWN_LEVELS: [&str; 2] = [
    "
................
.##############.
.#....$.......#.
.#............#.
.#......#######.
.#............#.
.#......@.....#.
.#............#.
.##############.
................
",
    "
................
.##############.
.#....$.......#.
.#............#.
.#......#######.
.#............#.
.#..#...@.....#.
.#..#.........#.
.##############.
................
",
];

pub const PLATFORMER_LEVELS: [&str; 2] = [
    "
......................
..#................#..
..#..............=.#..
..#.........o.o....#..
..#.@......#####...#..
..#####............#..
......#++++++++++++#..
......##############..
......................
",
    "
..........................
..o..........o............
.####.......###.....v.....
......................o...
...@.....o......|...####..
#######..####.............
......#++#..#+++++++++#...
......####..###########...
",
];

pub fn top_down_plans() -> Vec<String> {
    TOP_DOWN_LEVELS.iter().map(|plan| plan.to_string()).collect()
}

pub fn platformer_plans() -> Vec<String> {
    PLATFORMER_LEVELS.iter().map(|plan| plan.to_string()).collect()
}
