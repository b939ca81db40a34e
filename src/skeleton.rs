use crate::mask::{BinaryMask, SkeletonMask};

// Neighbour offsets starting north and going clockwise: P2, P3, .. P9.
const NEIGHBOURS: [(i64, i64); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/**
 * Thins every ridge of the mask down to a one-pixel-wide, 8-connected centre line with the
 * Zhang-Suen algorithm, then removes the staircase corners it leaves on curves. Pixels are only
 * ever removed, never added, and no ridge is split or erased. Pixels outside the image count as
 * background.
 */
pub fn skeletonize(mask: &BinaryMask) -> SkeletonMask {
    let (width, height) = mask.dimensions();
    let w = width as i64;
    let h = height as i64;

    let mut grid: Vec<bool> = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            grid.push(mask.get(x, y));
        }
    }

    thin(&mut grid, w, h);
    remove_staircases(&mut grid, w, h);

    let mut skeleton = BinaryMask::new(width, height);
    for y in 0..height {
        for x in 0..width {
            if grid[(y * width + x) as usize] {
                skeleton.set(x, y, true);
            }
        }
    }
    skeleton
}

fn neighbours(grid: &[bool], w: i64, h: i64, x: i64, y: i64) -> [bool; 8] {
    let mut p = [false; 8];
    for (i, (dx, dy)) in NEIGHBOURS.iter().enumerate() {
        let (nx, ny) = (x + dx, y + dy);
        p[i] = nx >= 0 && ny >= 0 && nx < w && ny < h && grid[(ny * w + nx) as usize];
    }
    p
}

/// Number of 8-connected groups among the set neighbours (Yokoi connectivity number).
fn connectivity(p: &[bool; 8]) -> usize {
    [0usize, 2, 4, 6]
        .iter()
        .filter(|&&k| !p[k] && (p[k + 1] || p[(k + 2) % 8]))
        .count()
}

fn thin(grid: &mut [bool], w: i64, h: i64) {
    let mut marked = vec![false; grid.len()];
    let mut to_clear: Vec<(i64, i64)> = Vec::new();
    loop {
        let mut changed = false;
        for pass in 0..2 {
            to_clear.clear();
            for y in 0..h {
                for x in 0..w {
                    if !grid[(y * w + x) as usize] {
                        continue;
                    }
                    let p = neighbours(grid, w, h, x, y);

                    let b = p.iter().filter(|&&v| v).count();
                    if !(2..=6).contains(&b) {
                        continue;
                    }
                    let a = (0..8).filter(|&i| !p[i] && p[(i + 1) % 8]).count();
                    if a != 1 {
                        continue;
                    }

                    let (p2, p4, p6, p8) = (p[0], p[2], p[4], p[6]);
                    let keep = if pass == 0 {
                        (p2 && p4 && p6) || (p4 && p6 && p8)
                    } else {
                        (p2 && p4 && p8) || (p2 && p6 && p8)
                    };
                    if !keep {
                        to_clear.push((x, y));
                        marked[(y * w + x) as usize] = true;
                    }
                }
            }

            // A candidate whose ridge neighbours are all candidates too sits in a blob that this
            // pass would erase completely, such as a 2x2 square; it stays.
            let deletable: Vec<usize> = to_clear
                .iter()
                .filter(|&&(x, y)| {
                    NEIGHBOURS.iter().any(|(dx, dy)| {
                        let (nx, ny) = (x + dx, y + dy);
                        if nx < 0 || ny < 0 || nx >= w || ny >= h {
                            return false;
                        }
                        let i = (ny * w + nx) as usize;
                        grid[i] && !marked[i]
                    })
                })
                .map(|&(x, y)| (y * w + x) as usize)
                .collect();
            for &(x, y) in to_clear.iter() {
                marked[(y * w + x) as usize] = false;
            }
            if !deletable.is_empty() {
                changed = true;
                for i in deletable {
                    grid[i] = false;
                }
            }
        }
        if !changed {
            break;
        }
    }
}

/**
 * Deletes the corner pixel of every 4-connected step: a pixel with two ridge neighbours 90
 * degrees apart (north and east, east and south, ...) whose opposite diagonal is clear. Such a
 * pixel has three ridge neighbours on an otherwise plain curve and would read as a bifurcation.
 * Deletion is sequential and only ever removes pixels whose neighbours stay in one 8-connected
 * group, so ridges are neither split nor shortened.
 */
fn remove_staircases(grid: &mut [bool], w: i64, h: i64) {
    loop {
        let mut changed = false;
        for y in 0..h {
            for x in 0..w {
                let i = (y * w + x) as usize;
                if !grid[i] {
                    continue;
                }
                let p = neighbours(grid, w, h, x, y);
                let (n, e, s, west) = (p[0], p[2], p[4], p[6]);
                if n && e && s && west {
                    continue;
                }
                // (first side, second side, opposite diagonal)
                let corner = [(0usize, 2usize, 5usize), (2, 4, 7), (4, 6, 1), (6, 0, 3)]
                    .iter()
                    .any(|&(a, b, d)| p[a] && p[b] && !p[d]);
                if corner && connectivity(&p) == 1 {
                    grid[i] = false;
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
}
