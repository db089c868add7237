/// A single colored point as handed to renderers and exporters.
///
/// Colors are normalized to `[0, 1]` per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointXYZRGB {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl PointXYZRGB {
    pub fn position(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn color(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}
