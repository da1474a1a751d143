//! Iterative cycle detection (white/gray/black colouring).
//!
//! A back edge into a node on the current path closes a cycle; edges into
//! fully explored (black) nodes are cross edges and are ignored. Each node
//! turns gray at most once, so the walk is O(V + E) and needs no recursion.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Find cycles over an index-based adjacency list.
///
/// Traversal starts from each entry of `starts` that is still unvisited, in
/// order, and follows children in adjacency order. Each cycle is returned
/// as the path from the re-entered node to the node closing it.
pub(crate) fn find_cycles(
    children: &[Vec<usize>],
    starts: impl IntoIterator<Item = usize>,
) -> Vec<Vec<usize>> {
    let mut color = vec![Color::White; children.len()];
    let mut cycles = Vec::new();
    // (node, next child position); the stack doubles as the current path
    let mut stack: Vec<(usize, usize)> = Vec::new();

    for start in starts {
        if color[start] != Color::White {
            continue;
        }
        color[start] = Color::Gray;
        stack.push((start, 0));

        while let Some(&(node, next)) = stack.last() {
            let Some(&child) = children[node].get(next) else {
                color[node] = Color::Black;
                stack.pop();
                continue;
            };
            if let Some(top) = stack.last_mut() {
                top.1 += 1;
            }

            match color[child] {
                Color::White => {
                    color[child] = Color::Gray;
                    stack.push((child, 0));
                }
                Color::Gray => {
                    if let Some(pos) = stack.iter().rposition(|&(n, _)| n == child) {
                        cycles.push(stack[pos..].iter().map(|&(n, _)| n).collect());
                    }
                }
                Color::Black => {}
            }
        }
    }

    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle() {
        let children = vec![vec![1], vec![2], vec![0]];
        assert_eq!(find_cycles(&children, 0..3), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_chain_has_no_cycle() {
        let children = vec![vec![1], vec![2], vec![]];
        assert!(find_cycles(&children, 0..3).is_empty());
    }

    #[test]
    fn test_cross_edge_is_not_a_cycle() {
        // 0 -> 1 -> 3, 0 -> 2 -> 3
        let children = vec![vec![1, 2], vec![3], vec![3], vec![]];
        assert!(find_cycles(&children, [0]).is_empty());
    }

    #[test]
    fn test_self_loop() {
        let children = vec![vec![0]];
        assert_eq!(find_cycles(&children, [0]), vec![vec![0]]);
    }

    #[test]
    fn test_unreached_component_is_searched() {
        // 0 alone; 1 <-> 2 only reachable when started directly
        let children = vec![vec![], vec![2], vec![1]];
        assert_eq!(find_cycles(&children, [0, 1, 2]), vec![vec![1, 2]]);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let n = 200_000;
        let mut children: Vec<Vec<usize>> = (0..n).map(|i| vec![i + 1]).collect();
        children[n - 1] = vec![0];
        let cycles = find_cycles(&children, [0]);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), n);
    }
}
