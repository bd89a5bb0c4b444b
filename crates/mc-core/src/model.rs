//! Blocks, links and the inbound snapshot contract.
//!
//! Records mirror what the external store supplies. Kinds the engine
//! doesn't know deserialize to an `Unknown`/`Other` variant so a stale
//! or newer store never breaks a load; renderers skip what they can't draw.

use crate::error::Result;
use crate::geometry::{Point, Rect, Shape};
use crate::id::{BlockId, LinkId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Kinds ───────────────────────────────────────────────────────────────

/// Silhouette of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Cloud,
    #[default]
    RoundedRect,
    Square,
    Oval,
    Circle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Cloud,
        ShapeKind::RoundedRect,
        ShapeKind::Square,
        ShapeKind::Oval,
        ShapeKind::Circle,
    ];

    /// Next kind in the shape-button cycle.
    pub fn next(self) -> ShapeKind {
        let i = ShapeKind::ALL.iter().position(|&k| k == self).unwrap_or(0);
        ShapeKind::ALL[(i + 1) % ShapeKind::ALL.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Cloud => "cloud",
            ShapeKind::RoundedRect => "rounded-rect",
            ShapeKind::Square => "square",
            ShapeKind::Oval => "oval",
            ShapeKind::Circle => "circle",
        }
    }
}

/// Semantic color of a block or link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorKind {
    Green,
    Orange,
    Yellow,
    Blue,
    Violet,
    Mauve,
    /// Anything the palette doesn't know. Never drawn.
    #[serde(other)]
    Unknown,
}

impl ColorKind {
    pub const ALL: [ColorKind; 6] = [
        ColorKind::Green,
        ColorKind::Orange,
        ColorKind::Yellow,
        ColorKind::Blue,
        ColorKind::Violet,
        ColorKind::Mauve,
    ];

    /// Next color in the color-button cycle. `Unknown` restarts at green.
    pub fn next(self) -> ColorKind {
        match ColorKind::ALL.iter().position(|&k| k == self) {
            Some(i) => ColorKind::ALL[(i + 1) % ColorKind::ALL.len()],
            None => ColorKind::Green,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorKind::Green => "green",
            ColorKind::Orange => "orange",
            ColorKind::Yellow => "yellow",
            ColorKind::Blue => "blue",
            ColorKind::Violet => "violet",
            ColorKind::Mauve => "mauve",
            ColorKind::Unknown => "unknown",
        }
    }

    pub fn parse(s: &str) -> ColorKind {
        ColorKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .unwrap_or(ColorKind::Unknown)
    }
}

/// Semantic type of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    Simple,
    #[serde(alias = "logique")]
    Logical,
    Tension,
    /// Always eligible for display, whatever the visibility mode.
    #[serde(alias = "ancree")]
    Anchored,
    /// Types added by the store after this build. Drawn like `Simple`.
    #[serde(other)]
    Other,
}

impl LinkKind {
    /// Color a freshly created link of this kind gets.
    pub fn default_color(self) -> ColorKind {
        match self {
            LinkKind::Simple | LinkKind::Logical | LinkKind::Other => ColorKind::Blue,
            LinkKind::Tension => ColorKind::Orange,
            LinkKind::Anchored => ColorKind::Violet,
        }
    }

    pub fn is_anchored(self) -> bool {
        self == LinkKind::Anchored
    }
}

/// Content attached to a block, shown as an icon badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    #[serde(alias = "texte")]
    Text,
    Note,
    #[serde(alias = "tableau")]
    Table,
    Pdf,
    Image,
    #[serde(alias = "video_ref")]
    Video,
    Url,
    #[serde(alias = "fichier")]
    File,
    Citation,
    Audio,
    Code,
    Docx,
    #[serde(other)]
    Other,
}

impl ContentKind {
    /// Inline text kinds carry no badge.
    pub fn has_badge(self) -> bool {
        !matches!(
            self,
            ContentKind::Text | ContentKind::Note | ContentKind::Table | ContentKind::Other
        )
    }
}

// ─── Records ─────────────────────────────────────────────────────────────

/// A positioned, sized, shaped, colored node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Top-left corner, world coordinates.
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    #[serde(default)]
    pub shape: ShapeKind,
    pub color: ColorKind,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub content: SmallVec<[ContentKind; 4]>,
    /// UI-local selection flag.
    #[serde(skip)]
    pub selected: bool,
}

impl Block {
    pub fn new(id: BlockId, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id,
            x,
            y,
            w,
            h,
            shape: ShapeKind::default(),
            color: ColorKind::Blue,
            title: String::new(),
            subtitle: None,
            content: SmallVec::new(),
            selected: false,
        }
    }

    pub fn with_shape(mut self, shape: ShapeKind) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_color(mut self, color: ColorKind) -> Self {
        self.color = color;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// The block's silhouette for geometry queries.
    pub fn shape(&self) -> Shape {
        Shape::new(self.shape, self.bounds())
    }
}

/// A directed connection between two blocks.
///
/// Endpoints are weak: a link whose source or target is missing from
/// the scene is neither drawn nor hit-tested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: BlockId,
    pub target: BlockId,
    #[serde(default)]
    pub kind: LinkKind,
    pub color: ColorKind,
}

impl Link {
    pub fn new(id: LinkId, source: BlockId, target: BlockId, kind: LinkKind) -> Self {
        Self {
            id,
            source,
            target,
            kind,
            color: kind.default_color(),
        }
    }

    pub fn touches(&self, block: BlockId) -> bool {
        self.source == block || self.target == block
    }
}

/// Which links are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "color")]
pub enum LinkVisibility {
    /// Links touching a selected block, plus anchored links.
    #[default]
    Selection,
    All,
    /// Only links of one color.
    Color(ColorKind),
}

impl LinkVisibility {
    /// Parse the host's mode string: `selection`, `all`, or a color name.
    pub fn parse(s: &str) -> Option<LinkVisibility> {
        match s {
            "selection" => Some(LinkVisibility::Selection),
            "all" => Some(LinkVisibility::All),
            other => match ColorKind::parse(other) {
                ColorKind::Unknown => None,
                c => Some(LinkVisibility::Color(c)),
            },
        }
    }
}

// ─── Snapshot ────────────────────────────────────────────────────────────

/// Full collection handed over by the external store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| crate::error::CanvasError::Encode(e.to_string()))
    }

    /// Compact MessagePack encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}
