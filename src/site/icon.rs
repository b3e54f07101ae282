//! Icon Candidates
//!
//! Scores `<link rel="icon">`-style declarations by the sizes they advertise.

use std::cmp::Ordering;

use tracing::warn;
use url::Url;

// == Size Class ==
/// How an icon's dimensions are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// No usable size information
    Unknown,
    /// Fixed pixel dimensions
    Fixed,
    /// Scale-independent (`sizes="any"` or an SVG)
    AnySize,
}

// == Icon Candidate ==
/// An icon link together with the best size it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconCandidate {
    pub link: Url,
    pub width: u32,
    pub height: u32,
    pub size_class: SizeClass,
}

impl IconCandidate {
    /// Builds a candidate from an absolute link and the raw `sizes` attribute.
    ///
    /// The first `any` token wins outright. Otherwise the `HxW` token with the
    /// largest area is kept, the earliest one on ties. With no usable token the
    /// icon counts as `AnySize` if it is an SVG and `Unknown` otherwise.
    pub fn from_sizes(link: Url, sizes: &str) -> Self {
        let mut best: Option<(u32, u32)> = None;

        for token in sizes.split_whitespace() {
            if token == "any" {
                return Self::any_size(link);
            }

            let Some((height, width)) = parse_size(token) else {
                warn!("Found invalid size property: {}", token);
                continue;
            };

            let larger = best.map_or(true, |(h, w)| area(height, width) > area(h, w));
            if larger {
                best = Some((height, width));
            }
        }

        match best {
            Some((height, width)) => Self {
                link,
                width,
                height,
                size_class: SizeClass::Fixed,
            },
            None if is_svg(&link) => Self::any_size(link),
            None => Self {
                link,
                width: 0,
                height: 0,
                size_class: SizeClass::Unknown,
            },
        }
    }

    fn any_size(link: Url) -> Self {
        Self {
            link,
            width: 0,
            height: 0,
            size_class: SizeClass::AnySize,
        }
    }

    /// Product of the declared dimensions.
    pub fn area(&self) -> u64 {
        area(self.height, self.width)
    }

    /// Whether the icon is good enough for an installed app.
    pub fn is_acceptable(&self, min_pixels: u32) -> bool {
        match self.size_class {
            SizeClass::AnySize => true,
            SizeClass::Fixed => self.width >= min_pixels && self.height >= min_pixels,
            SizeClass::Unknown => false,
        }
    }

    /// Ranks two candidates: any `AnySize` beats every `Fixed`, larger area
    /// beats smaller, `Unknown` ranks last.
    pub fn rank(&self, other: &Self) -> Ordering {
        let class = |c: &Self| match c.size_class {
            SizeClass::Unknown => 0,
            SizeClass::Fixed => 1,
            SizeClass::AnySize => 2,
        };
        class(self)
            .cmp(&class(other))
            .then_with(|| self.area().cmp(&other.area()))
    }
}

fn area(height: u32, width: u32) -> u64 {
    u64::from(height) * u64::from(width)
}

/// Parses a `HEIGHTxWIDTH` token. Zero dimensions count as unparseable.
fn parse_size(token: &str) -> Option<(u32, u32)> {
    let (height, width) = token.split_once(['x', 'X'])?;
    let height: u32 = height.parse().ok()?;
    let width: u32 = width.parse().ok()?;
    (height > 0 && width > 0).then_some((height, width))
}

fn is_svg(link: &Url) -> bool {
    link.path().to_ascii_lowercase().ends_with(".svg")
}
