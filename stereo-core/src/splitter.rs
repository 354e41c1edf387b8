/// Grouping of projected samples into drawable polylines
use crate::projection::ProjectedPoint;

/// Fraction of the jump threshold above which consecutive samples are
/// treated as a wrap-around across the projection discontinuity
const JUMP_DIVISOR: f64 = 3.0;

/// Split `points` into runs that can be connected with straight lines.
///
/// Hidden points end the current run and are dropped. A visible point
/// farther than `threshold / 3` from its predecessor starts a new run.
/// Returned groups are never empty; groups of one point are left for the
/// caller to skip.
pub fn split_into_groups(points: &[ProjectedPoint], threshold: f64) -> Vec<Vec<ProjectedPoint>> {
    let max_jump = threshold / JUMP_DIVISOR;
    let mut groups = Vec::new();
    let mut current: Vec<ProjectedPoint> = Vec::new();

    for point in points {
        if !point.visible {
            if !current.is_empty() {
                groups.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.last() {
            if point.screen_distance(prev) > max_jump {
                groups.push(std::mem::take(&mut current));
            }
        }
        current.push(*point);
    }

    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible(x: f64, y: f64) -> ProjectedPoint {
        ProjectedPoint {
            x,
            y,
            u: 0.0,
            v: 0.0,
            visible: true,
        }
    }

    #[test]
    fn test_slow_sequence_stays_whole() {
        let points: Vec<_> = (0..50).map(|i| visible(i as f64 * 2.0, 100.0)).collect();
        let groups = split_into_groups(&points, 800.0);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], points);
    }

    #[test]
    fn test_hidden_points_break_and_are_dropped() {
        let points = vec![
            ProjectedPoint::hidden(),
            visible(0.0, 0.0),
            visible(1.0, 0.0),
            ProjectedPoint::hidden(),
            ProjectedPoint::hidden(),
            visible(2.0, 0.0),
            ProjectedPoint::hidden(),
        ];
        let groups = split_into_groups(&points, 800.0);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
        for group in &groups {
            assert!(!group.is_empty());
            assert!(group.iter().all(|p| p.visible));
        }
    }

    #[test]
    fn test_large_jump_starts_new_group() {
        // Threshold 300 allows jumps up to 100 px
        let points = vec![
            visible(0.0, 0.0),
            visible(30.0, 40.0),
            visible(500.0, 40.0),
            visible(510.0, 40.0),
        ];
        let groups = split_into_groups(&points, 300.0);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], points[..2].to_vec());
        assert_eq!(groups[1], points[2..].to_vec());
    }

    #[test]
    fn test_empty_and_all_hidden() {
        assert!(split_into_groups(&[], 100.0).is_empty());
        let hidden = vec![ProjectedPoint::hidden(); 4];
        assert!(split_into_groups(&hidden, 100.0).is_empty());
    }
}
