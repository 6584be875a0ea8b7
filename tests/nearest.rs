use kdnn::{KdPoint, KdTree, NnSolver};
use rand::Rng;

fn random_points(dimension_count: usize, count: usize) -> Vec<KdPoint> {
    let mut rng = rand::thread_rng();

    (0..count)
        .map(|_| {
            KdPoint::new(
                (0..dimension_count)
                    .map(|_| rng.gen_range(-1000.0..1000.0))
                    .collect(),
            )
        })
        .collect()
}

/// Linear scan reference: nearest point to `target`, excluding `target`'s
/// own slot by identity, exactly like the solver's contract.
fn brute_force_nearest<'t>(points: &'t [KdPoint], target: &KdPoint) -> Option<&'t KdPoint> {
    let mut best: Option<&KdPoint> = None;
    let mut best_distance_squared = f64::INFINITY;

    for point in points {
        if std::ptr::eq(point, target) {
            continue;
        }

        let distance_squared = point.distance_squared(target);
        if distance_squared < best_distance_squared {
            best = Some(point);
            best_distance_squared = distance_squared;
        }
    }

    best
}

#[test]
fn test_find_nearest_for_explicit_data() {
    let points = vec![
        KdPoint::new(vec![0.0, 0.0]),
        KdPoint::new(vec![5.0, 5.0]),
        KdPoint::new(vec![8.0, 5.0]),
        KdPoint::new(vec![-30.0, -30.0]),
        KdPoint::new(vec![-40.0, -40.0]),
        KdPoint::new(vec![0.01, 0.01]),
    ];

    let tree = KdTree::build(2, points).unwrap();
    let solver = NnSolver::new(&tree);

    let expected_neighbour = [5, 2, 1, 4, 3, 0];

    for (i, &expected) in expected_neighbour.iter().enumerate() {
        let nearest = solver.find_nearest(&tree.points()[i]).unwrap();
        assert!(
            std::ptr::eq(nearest, &tree.points()[expected]),
            "nearest of point {} should be point {}, got {:?}",
            i,
            expected,
            nearest
        );
    }
}

#[test]
fn test_find_nearest_never_returns_the_target_slot() {
    let points = random_points(3, 10_000);
    let tree = KdTree::build(3, points).unwrap();
    let solver = NnSolver::new(&tree);

    for point in tree.points() {
        let nearest = solver.find_nearest(point).unwrap();
        assert!(!std::ptr::eq(nearest, point));
    }
}

#[test]
fn test_coordinate_equal_distinct_query_gets_zero_distance_match() {
    let points = random_points(3, 1_000);
    let tree = KdTree::build(3, points).unwrap();
    let solver = NnSolver::new(&tree);

    for stored in tree.points().iter().step_by(97) {
        // A deep copy is a different identity, so the stored instance at the
        // same coordinates is a legitimate zero-distance answer.
        let query = stored.clone();
        let nearest = solver.find_nearest(&query).unwrap();

        assert_eq!(nearest.distance_squared(&query), 0.0);
    }
}

#[test]
fn test_find_nearest_matches_brute_force() {
    let points = random_points(3, 2_000);
    let tree = KdTree::build(3, points).unwrap();
    let solver = NnSolver::new(&tree);

    // Tree members ask for their nearest other point.
    for target in tree.points().iter().step_by(13) {
        let nearest = solver.find_nearest(target).unwrap();
        let reference = brute_force_nearest(tree.points(), target).unwrap();

        assert_eq!(
            nearest.distance_squared(target),
            reference.distance_squared(target)
        );
    }

    // Free-standing queries may match any stored point, including exactly.
    for query in random_points(3, 500) {
        let nearest = solver.find_nearest(&query).unwrap();
        let reference = brute_force_nearest(tree.points(), &query).unwrap();

        assert_eq!(
            nearest.distance_squared(&query),
            reference.distance_squared(&query)
        );
    }
}

#[test]
fn test_equal_distances_keep_the_first_found_candidate() {
    // Two points equidistant from the query. The search reaches the deeper
    // node first (descend always ends at a leaf), and the strict less-than
    // update rule must keep it when the root is re-checked on the unwind.
    let points = vec![KdPoint::new(vec![1.0]), KdPoint::new(vec![-1.0])];
    let tree = KdTree::build(1, points).unwrap();
    let solver = NnSolver::new(&tree);

    let root = tree.node(tree.root_handle());
    let leaf_handle = root.left().or(root.right()).unwrap();
    let leaf_point = &tree.points()[tree.node(leaf_handle).point_index()];

    let query = KdPoint::new(vec![0.0]);

    for _ in 0..5 {
        let nearest = solver.find_nearest(&query).unwrap();
        assert!(std::ptr::eq(nearest, leaf_point));
    }
}

#[test]
fn test_single_point_tree_excludes_itself() {
    let tree = KdTree::build(2, vec![KdPoint::new(vec![3.0, 4.0])]).unwrap();
    let solver = NnSolver::new(&tree);

    // The only stored point is the target's own slot, so there is no answer.
    assert!(solver.find_nearest(&tree.points()[0]).is_none());

    // A distinct instance at the same coordinates does get the stored point.
    let query = KdPoint::new(vec![3.0, 4.0]);
    let nearest = solver.find_nearest(&query).unwrap();
    assert!(std::ptr::eq(nearest, &tree.points()[0]));
}

#[test]
fn test_degenerate_collinear_points_stay_exact() {
    // All points on one axis line defeats any balance heuristic; the search
    // must stay exact even on a deep, skewed tree.
    let points: Vec<KdPoint> = (0..512).map(|i| KdPoint::new(vec![i as f64, 0.0])).collect();
    let tree = KdTree::build(2, points).unwrap();
    let solver = NnSolver::new(&tree);

    let query = KdPoint::new(vec![205.4, 0.0]);
    let nearest = solver.find_nearest(&query).unwrap();

    assert_eq!(nearest.axis_value(0), 205.0);
}
