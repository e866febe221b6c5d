//! Path morphing between two outlines.
//!
//! Both outlines are brought to the same subpath count (padding the shorter
//! one with subpaths collapsed onto its centroid) and every subpath is
//! resampled by arc length to the same point count; the morph is then a
//! point-wise lerp.

use crate::math::{self, Vec3};
use crate::shape::Bounds;

use super::functions::lerp_vec3;

/// Resample a polyline to `n` points spaced evenly by arc length.
pub fn resample(points: &[Vec3], n: usize) -> Vec<Vec3> {
    let n = n.max(2);
    match points.len() {
        0 => return vec![[0.0; 3]; n],
        1 => return vec![points[0]; n],
        _ => {}
    }
    let mut cumulative = Vec::with_capacity(points.len());
    cumulative.push(0.0f32);
    for w in points.windows(2) {
        let prev = *cumulative.last().unwrap_or(&0.0);
        cumulative.push(prev + math::length(math::sub(w[1], w[0])));
    }
    let total = *cumulative.last().unwrap_or(&0.0);
    if total <= f32::EPSILON {
        return vec![points[0]; n];
    }

    let mut out = Vec::with_capacity(n);
    let mut seg = 0usize;
    for i in 0..n {
        let target = total * (i as f32) / ((n - 1) as f32);
        while seg + 2 < cumulative.len() && cumulative[seg + 1] < target {
            seg += 1;
        }
        let (d0, d1) = (cumulative[seg], cumulative[seg + 1]);
        let local = if d1 > d0 { (target - d0) / (d1 - d0) } else { 0.0 };
        out.push(lerp_vec3(points[seg], points[seg + 1], local.clamp(0.0, 1.0)));
    }
    out
}

fn centroid(subpaths: &[Vec<Vec3>]) -> Vec3 {
    Bounds::from_points(subpaths.iter().flatten())
        .map(|b| b.center())
        .unwrap_or([0.0; 3])
}

/// Bring both outlines to matching subpath and point counts.
pub fn align(
    from: &[Vec<Vec3>],
    to: &[Vec<Vec3>],
    samples: usize,
) -> (Vec<Vec<Vec3>>, Vec<Vec<Vec3>>) {
    let count = from.len().max(to.len());
    let pad = |outline: &[Vec<Vec3>]| -> Vec<Vec<Vec3>> {
        let c = centroid(outline);
        (0..count)
            .map(|i| match outline.get(i) {
                Some(sp) => resample(sp, samples),
                None => vec![c; samples.max(2)],
            })
            .collect()
    };
    (pad(from), pad(to))
}

/// Point-wise blend of two outlines at `t`.
pub fn morph(from: &[Vec<Vec3>], to: &[Vec<Vec3>], t: f32, samples: usize) -> Vec<Vec<Vec3>> {
    let (a, b) = align(from, to, samples);
    a.iter()
        .zip(b.iter())
        .map(|(sa, sb)| {
            sa.iter()
                .zip(sb.iter())
                .map(|(pa, pb)| lerp_vec3(*pa, *pb, t))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resample_spaces_by_arc_length() {
        let pts = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 3.0, 0.0]];
        let r = resample(&pts, 5);
        assert_eq!(r.len(), 5);
        assert_eq!(r[0], [0.0, 0.0, 0.0]);
        assert_eq!(r[1], [1.0, 0.0, 0.0]);
        assert!((r[4][1] - 3.0).abs() < 1e-5);
    }

    #[test]
    fn align_pads_missing_subpaths_at_centroid() {
        let from = vec![vec![[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]]];
        let to = vec![
            vec![[0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            vec![[2.0, 0.0, 0.0], [3.0, 0.0, 0.0]],
        ];
        let (a, b) = align(&from, &to, 4);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert!(a[1].iter().all(|p| *p == [0.0, 0.0, 0.0]));
    }

    #[test]
    fn morph_endpoints_match_inputs() {
        let from = vec![vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]];
        let to = vec![vec![[0.0, 2.0, 0.0], [1.0, 2.0, 0.0]]];
        let mid = morph(&from, &to, 0.5, 2);
        assert_eq!(mid[0][0], [0.0, 1.0, 0.0]);
        let end = morph(&from, &to, 1.0, 2);
        assert_eq!(end, to);
    }
}
