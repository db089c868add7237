use crate::decode::DecodeError;

/// Depth resolutions emitted by capture devices, in lookup priority order.
///
/// Several entries could in principle share a pixel count, so a table hit is
/// a best guess: the first entry wins and the hit is flagged as ambiguous.
pub const KNOWN_RESOLUTIONS: [(usize, usize); 6] = [
    (160, 120),
    (160, 90),
    (640, 360),
    (640, 480),
    (1280, 720),
    (192, 144),
];

/// How a [`Resolution`] was recovered from a bare pixel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Matched an entry of [`KNOWN_RESOLUTIONS`]. `ambiguous` is set when
    /// more than one entry has the same pixel count.
    Table { ambiguous: bool },
    /// No table entry matched; an exact near-4:3 factorization was found.
    AspectFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: usize,
    pub height: usize,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }
}

/// First [`KNOWN_RESOLUTIONS`] entry whose pixel count equals `num_pixels`.
pub fn lookup_known_resolution(num_pixels: usize) -> Option<Resolution> {
    let mut matches = KNOWN_RESOLUTIONS
        .iter()
        .filter(|(w, h)| w * h == num_pixels);

    let &(width, height) = matches.next()?;
    let ambiguous = matches.next().is_some();

    Some(Resolution {
        width,
        height,
        source: ResolutionSource::Table { ambiguous },
    })
}

/// Assume a 4:3 frame: `height = floor(sqrt(3n / 4))`, `width = n / height`.
///
/// Only an exact factorization (`width * height == n`) is accepted.
pub fn infer_aspect_fallback(num_pixels: usize) -> Option<Resolution> {
    let height = ((3.0 * num_pixels as f64) / 4.0).sqrt() as usize;
    if height == 0 {
        return None;
    }

    let width = num_pixels / height;
    if width * height != num_pixels {
        return None;
    }

    Some(Resolution {
        width,
        height,
        source: ResolutionSource::AspectFallback,
    })
}

/// Table lookup first, aspect-ratio fallback second.
pub fn infer_resolution(num_pixels: usize) -> Result<Resolution, DecodeError> {
    if let Some(res) = lookup_known_resolution(num_pixels) {
        if res.source == (ResolutionSource::Table { ambiguous: true }) {
            tracing::warn!(
                num_pixels,
                width = res.width,
                height = res.height,
                "several known resolutions share this pixel count, using the first"
            );
        }
        return Ok(res);
    }

    match infer_aspect_fallback(num_pixels) {
        Some(res) => {
            tracing::warn!(
                num_pixels,
                width = res.width,
                height = res.height,
                "no known depth resolution matched, assuming 4:3"
            );
            Ok(res)
        }
        None => Err(DecodeError::UnknownResolution { num_pixels }),
    }
}
