use crate::game::Position;

/// Order `targets` by repeatedly stepping to the nearest unvisited one.
///
/// The route starts at `start`; distance is Manhattan and ties go to the
/// target that appears first in `targets`. This is a greedy approximation,
/// not an optimal tour. No targets gives an empty route.
pub fn plan_route(start: Position, targets: &[Position]) -> Vec<Position> {
    if targets.is_empty() {
        return Vec::new();
    }

    let mut route = Vec::with_capacity(targets.len() + 1);
    route.push(start);

    let mut unvisited: Vec<Position> = targets.to_vec();
    let mut current = start;

    while !unvisited.is_empty() {
        let mut nearest = 0;
        let mut best = u32::MAX;
        for (i, target) in unvisited.iter().enumerate() {
            let dist = current.manhattan_distance(*target);
            if dist < best {
                best = dist;
                nearest = i;
            }
        }

        // `remove` keeps the remaining order, which the tie-break depends on
        current = unvisited.remove(nearest);
        route.push(current);
    }

    route
}
