pub fn square_distance(p1: &(f64, f64), p2: &(f64, f64)) -> f64 {
    (p1.0 - p2.0).powi(2) + (p1.1 - p2.1).powi(2)
}

pub fn distance(p1: &(f64, f64), p2: &(f64, f64)) -> f64 {
    square_distance(p1, p2).sqrt()
}

/// `n` evenly spaced values from `start` to `end`, both included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Corner coordinates ((min_x, min_y), (max_x, max_y)) of the given sites.
pub fn corners_of<'a>(sites: impl Iterator<Item = &'a (f64, f64)>) -> ((f64, f64), (f64, f64)) {
    sites.fold(
        ((f64::MAX, f64::MAX), (f64::MIN, f64::MIN)),
        |((min_x, min_y), (max_x, max_y)), (x, y)| {
            ((min_x.min(*x), min_y.min(*y)), (max_x.max(*x), max_y.max(*y)))
        },
    )
}

/// Whether every site lies on one straight line (or there are fewer than three).
pub fn all_collinear(sites: &[(f64, f64)]) -> bool {
    let Some(first) = sites.first() else {
        return true;
    };
    let Some(second) = sites.iter().find(|site| square_distance(first, site) > 0.0) else {
        return true;
    };
    let scale = square_distance(first, second);
    sites.iter().all(|site| {
        let cross =
            (second.0 - first.0) * (site.1 - first.1) - (second.1 - first.1) * (site.0 - first.0);
        cross.abs() <= 1e-12 * scale.max(square_distance(first, site)).max(1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 0), Vec::<f64>::new());
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert_eq!(linspace(0.0, 4.0, 5), vec![0.0, 1.0, 2.0, 3.0, 4.0]);

        let axis = linspace(-10.0, 20.0, 100);
        assert_eq!(axis.len(), 100);
        assert_eq!(axis[0], -10.0);
        assert_eq!(axis[99], 20.0);
        assert!(axis.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_corners_of() {
        let sites = [(0.0, 0.0), (10.0, -2.0), (5.0, 8.0)];
        assert_eq!(corners_of(sites.iter()), ((0.0, -2.0), (10.0, 8.0)));
    }

    #[test]
    fn test_all_collinear() {
        assert!(all_collinear(&[]));
        assert!(all_collinear(&[(1.0, 1.0), (1.0, 1.0)]));
        assert!(all_collinear(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]));
        assert!(!all_collinear(&[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)]));
    }
}
