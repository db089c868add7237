use crate::{Aabb, PointXYZRGB};

/// Struct-of-arrays point buffer.
///
/// When `colors` is present it holds exactly one color per point. Clouds grow
/// through [`PointCloud::push`], [`PointCloud::push_colored`] and
/// [`PointCloud::append`], all of which are amortized O(1) per point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub colors: Option<Colors>,
}

/// Per-point RGB, each channel normalized to `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Colors {
    pub r: Vec<f32>,
    pub g: Vec<f32>,
    pub b: Vec<f32>,
}

impl Colors {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            r: Vec::with_capacity(n),
            g: Vec::with_capacity(n),
            b: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.r.len()
    }

    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    pub fn get(&self, i: usize) -> [f32; 3] {
        [self.r[i], self.g[i], self.b[i]]
    }

    fn push(&mut self, c: [f32; 3]) {
        self.r.push(c[0]);
        self.g.push(c[1]);
        self.b.push(c[2]);
    }
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            colors: None,
        }
    }

    /// Empty cloud with room for `n` points. Colors are allocated when
    /// `colored` is set.
    pub fn with_capacity(n: usize, colored: bool) -> Self {
        Self {
            x: Vec::with_capacity(n),
            y: Vec::with_capacity(n),
            z: Vec::with_capacity(n),
            colors: colored.then(|| Colors::with_capacity(n)),
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            colors: None,
        }
    }

    pub fn from_xyz_rgb(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>, colors: Colors) -> Self {
        let mut cloud = Self::from_xyz(x, y, z);
        assert_eq!(
            cloud.len(),
            colors.len(),
            "colors must have one entry per point"
        );
        assert_eq!(colors.r.len(), colors.g.len(), "r and g must have same length");
        assert_eq!(colors.r.len(), colors.b.len(), "r and b must have same length");
        cloud.colors = Some(colors);
        cloud
    }

    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn has_colors(&self) -> bool {
        self.colors.is_some()
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_xyz(&self.x, &self.y, &self.z)
    }

    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    pub fn color(&self, i: usize) -> Option<[f32; 3]> {
        self.colors.as_ref().map(|c| c.get(i))
    }

    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    /// Points in buffer order. Uncolored clouds report black.
    pub fn iter_colored(&self) -> impl Iterator<Item = PointXYZRGB> + '_ {
        (0..self.len()).map(move |i| {
            let [r, g, b] = self.color(i).unwrap_or([0.0; 3]);
            PointXYZRGB {
                x: self.x[i],
                y: self.y[i],
                z: self.z[i],
                r,
                g,
                b,
            }
        })
    }

    /// Append an uncolored point.
    ///
    /// # Panics
    ///
    /// Panics if the cloud carries colors.
    pub fn push(&mut self, p: [f32; 3]) {
        assert!(
            self.colors.is_none(),
            "cannot push an uncolored point into a colored cloud"
        );
        self.x.push(p[0]);
        self.y.push(p[1]);
        self.z.push(p[2]);
    }

    /// Append a colored point. An empty uncolored cloud becomes colored.
    ///
    /// # Panics
    ///
    /// Panics if the cloud already holds uncolored points.
    pub fn push_colored(&mut self, p: [f32; 3], c: [f32; 3]) {
        if self.colors.is_none() {
            assert!(
                self.is_empty(),
                "cannot push a colored point into an uncolored cloud"
            );
            self.colors = Some(Colors::default());
        }
        self.x.push(p[0]);
        self.y.push(p[1]);
        self.z.push(p[2]);
        if let Some(colors) = self.colors.as_mut() {
            colors.push(c);
        }
    }

    /// Move every point of `other` onto the end of `self`.
    ///
    /// An empty `self` adopts the color layout of `other`.
    ///
    /// # Panics
    ///
    /// Panics if both clouds are non-empty and only one of them has colors.
    pub fn append(&mut self, other: &mut PointCloud) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            match (&mut self.colors, &other.colors) {
                (None, Some(_)) => self.colors = Some(Colors::default()),
                (Some(_), None) => self.colors = None,
                _ => {}
            }
        }
        assert_eq!(
            self.colors.is_some(),
            other.colors.is_some(),
            "cannot append clouds with different color layouts"
        );

        self.x.append(&mut other.x);
        self.y.append(&mut other.y);
        self.z.append(&mut other.z);
        if let (Some(dst), Some(src)) = (self.colors.as_mut(), other.colors.as_mut()) {
            dst.r.append(&mut src.r);
            dst.g.append(&mut src.g);
            dst.b.append(&mut src.b);
        }
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Colors, PointCloud};
    use proptest::prelude::*;

    fn colored(x: Vec<f32>, c: f32) -> PointCloud {
        let n = x.len();
        PointCloud::from_xyz_rgb(
            x,
            vec![0.0; n],
            vec![0.0; n],
            Colors {
                r: vec![c; n],
                g: vec![c; n],
                b: vec![c; n],
            },
        )
    }

    #[test]
    fn new_is_empty() {
        let cloud = PointCloud::new();
        assert!(cloud.is_empty());
        assert_eq!(cloud.len(), 0);
        assert!(!cloud.has_colors());
    }

    #[test]
    fn from_xyz_builds_cloud() {
        let cloud = PointCloud::from_xyz(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.point(0), [1.0, 3.0, 5.0]);
        assert_eq!(cloud.point(1), [2.0, 4.0, 6.0]);
        assert_eq!(cloud.color(0), None);
    }

    #[test]
    fn iter_points_yields_xyz_tuples() {
        let cloud = PointCloud::from_xyz(vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]);
        let pts: Vec<[f32; 3]> = cloud.iter_points().collect();
        assert_eq!(pts, vec![[1.0, 3.0, 5.0], [2.0, 4.0, 6.0]]);
    }

    #[test]
    fn iter_colored_pairs_position_and_color() {
        let cloud = colored(vec![1.0, 2.0], 0.5);
        let pts: Vec<_> = cloud.iter_colored().collect();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1].position(), [2.0, 0.0, 0.0]);
        assert_eq!(pts[1].color(), [0.5, 0.5, 0.5]);
    }

    #[test]
    fn push_colored_on_empty_cloud_enables_colors() {
        let mut cloud = PointCloud::new();
        cloud.push_colored([1.0, 2.0, 3.0], [0.1, 0.2, 0.3]);
        assert_eq!(cloud.len(), 1);
        assert_eq!(cloud.color(0), Some([0.1, 0.2, 0.3]));
    }

    #[test]
    #[should_panic]
    fn push_colored_into_uncolored_cloud_panics() {
        let mut cloud = PointCloud::from_xyz(vec![1.0], vec![2.0], vec![3.0]);
        cloud.push_colored([0.0; 3], [1.0; 3]);
    }

    #[test]
    fn append_preserves_order_and_drains_source() {
        let mut a = colored(vec![0.0, 1.0], 0.25);
        let mut b = colored(vec![2.0, 3.0], 0.75);
        a.append(&mut b);
        assert!(b.is_empty());
        assert_eq!(a.x, vec![0.0, 1.0, 2.0, 3.0]);
        let colors = a.colors.as_ref().unwrap();
        assert_eq!(colors.r, vec![0.25, 0.25, 0.75, 0.75]);
    }

    #[test]
    fn append_into_empty_adopts_color_layout() {
        let mut a = PointCloud::new();
        let mut b = colored(vec![5.0], 1.0);
        a.append(&mut b);
        assert_eq!(a.len(), 1);
        assert_eq!(a.color(0), Some([1.0, 1.0, 1.0]));
    }

    #[test]
    fn append_empty_is_noop() {
        let mut a = colored(vec![5.0], 1.0);
        let mut b = PointCloud::new();
        a.append(&mut b);
        assert_eq!(a.len(), 1);
        assert!(a.has_colors());
    }

    #[test]
    #[should_panic]
    fn append_mixed_layouts_panics() {
        let mut a = colored(vec![5.0], 1.0);
        let mut b = PointCloud::from_xyz(vec![1.0], vec![1.0], vec![1.0]);
        a.append(&mut b);
    }

    #[test]
    fn aabb_ignores_nan() {
        let cloud = PointCloud::from_xyz(
            vec![0.0, f32::NAN, 2.0],
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
        );
        let aabb = cloud.aabb();
        assert!(aabb.contains(&[0.0, 1.0, 4.0]));
        assert!(aabb.contains(&[2.0, 3.0, 6.0]));
        assert!(!aabb.contains(&[f32::NAN, 2.0, 5.0]));
    }

    #[test]
    #[should_panic]
    fn from_xyz_panics_on_mismatch() {
        let _ = PointCloud::from_xyz(vec![1.0], vec![2.0, 3.0], vec![4.0]);
    }

    #[test]
    #[should_panic]
    fn from_xyz_rgb_panics_on_color_mismatch() {
        let _ = PointCloud::from_xyz_rgb(
            vec![1.0, 2.0],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            Colors {
                r: vec![1.0],
                g: vec![1.0],
                b: vec![1.0],
            },
        );
    }

    proptest! {
        #[test]
        fn append_length_is_sum(
            a in prop::collection::vec(-10.0f32..10.0f32, 0..200),
            b in prop::collection::vec(-10.0f32..10.0f32, 0..200),
        ) {
            let mut ca = colored(a.clone(), 0.1);
            let mut cb = colored(b.clone(), 0.9);
            ca.append(&mut cb);
            prop_assert_eq!(ca.len(), a.len() + b.len());
            if !ca.is_empty() {
                prop_assert_eq!(ca.colors.as_ref().unwrap().len(), ca.len());
            }
        }

        #[test]
        fn aabb_contains_all_finite_points(
            pts in prop::collection::vec((-1000.0f32..1000.0f32, -1000.0f32..1000.0f32, -1000.0f32..1000.0f32), 1..500)
        ) {
            let cloud = PointCloud::from_xyz(
                pts.iter().map(|p| p.0).collect(),
                pts.iter().map(|p| p.1).collect(),
                pts.iter().map(|p| p.2).collect(),
            );
            let aabb = cloud.aabb();
            for p in cloud.iter_points() {
                prop_assert!(aabb.contains(&p));
            }
        }
    }
}
