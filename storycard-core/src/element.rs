//! Canvas elements - the building blocks of a story card.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest scale an element may take.
pub const MIN_SCALE: f32 = 0.5;

/// Largest scale an element may take.
pub const MAX_SCALE: f32 = 3.0;

/// Clamp a scale factor into `[MIN_SCALE, MAX_SCALE]`.
///
/// Non-finite input collapses to `1.0` so a bad ratio can never leak through.
#[must_use]
pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        1.0
    }
}

/// A 2D vector in logical units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component (positive is down).
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Distance between two points.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// The closed set of seeded card elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FixedKind {
    /// Date line.
    Date,
    /// Headline stat (total study time).
    MainStat,
    /// Session count sub-stat.
    Session,
    /// Average session time sub-stat.
    AvgTime,
    /// Free-form message line.
    Message,
}

impl FixedKind {
    /// All fixed kinds in layout order.
    pub const ALL: [Self; 5] = [
        Self::Date,
        Self::MainStat,
        Self::Session,
        Self::AvgTime,
        Self::Message,
    ];

    /// Stable lowercase name, as used in scripts and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::MainStat => "mainStat",
            Self::Session => "session",
            Self::AvgTime => "avgTime",
            Self::Message => "message",
        }
    }

    /// Vertical half-extent of the rendered element, used for menu placement.
    #[must_use]
    pub const fn half_extent(self) -> f32 {
        match self {
            Self::MainStat => 60.0,
            Self::Message => 30.0,
            Self::Date | Self::Session | Self::AvgTime => 20.0,
        }
    }

    /// Default layout position relative to the canvas center.
    #[must_use]
    pub const fn default_position(self) -> Vec2 {
        match self {
            Self::Date => Vec2::new(0.0, -220.0),
            Self::MainStat => Vec2::new(0.0, -80.0),
            Self::Session => Vec2::new(-80.0, 60.0),
            Self::AvgTime => Vec2::new(80.0, 60.0),
            Self::Message => Vec2::new(0.0, 180.0),
        }
    }

    /// Base font size before scaling.
    #[must_use]
    pub const fn font_size(self) -> f32 {
        match self {
            Self::Date | Self::Session | Self::AvgTime => 18.0,
            Self::MainStat => 56.0,
            Self::Message => 22.0,
        }
    }
}

impl std::fmt::Display for FixedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FixedKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown fixed element: {s}"))
    }
}

/// Unique identifier of a user-added text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomId(Uuid);

impl CustomId {
    /// Create a new unique id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CustomId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CustomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of any element on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ElementId {
    /// One of the seeded elements.
    Fixed(FixedKind),
    /// A user-added text element.
    Custom(CustomId),
}

impl From<FixedKind> for ElementId {
    fn from(kind: FixedKind) -> Self {
        Self::Fixed(kind)
    }
}

impl From<CustomId> for ElementId {
    fn from(id: CustomId) -> Self {
        Self::Custom(id)
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(kind) => write!(f, "{kind}"),
            Self::Custom(id) => write!(f, "custom:{id}"),
        }
    }
}

/// Position and scale of an element, split into committed and in-flight parts.
///
/// `position` and `scale` are only changed by [`Transform::flatten`]; gesture
/// progress lives in the pending fields until the gesture commits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Committed offset from the canvas center.
    pub position: Vec2,
    /// Committed scale.
    pub scale: f32,
    /// Last-known vertical offset, tracked live during drags.
    pub current_offset_y: f32,
    #[serde(skip)]
    pending_delta: Option<Vec2>,
    #[serde(skip)]
    pending_scale: Option<f32>,
}

impl Transform {
    /// Transform at `position` with unit scale.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            scale: 1.0,
            current_offset_y: position.y,
            pending_delta: None,
            pending_scale: None,
        }
    }

    /// Position including any in-flight drag.
    #[must_use]
    pub fn effective_position(&self) -> Vec2 {
        self.pending_delta
            .map_or(self.position, |delta| self.position + delta)
    }

    /// Scale including any in-flight pinch.
    #[must_use]
    pub fn effective_scale(&self) -> f32 {
        self.pending_scale.unwrap_or(self.scale)
    }

    /// Whether a gesture has uncommitted progress.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending_delta.is_some() || self.pending_scale.is_some()
    }

    /// Record the drag so far: the element should sit at `target`.
    pub fn set_pending_target(&mut self, target: Vec2) {
        let delta = target - self.position;
        self.pending_delta = Some(delta);
        self.current_offset_y = target.y;
    }

    /// Record the pinch so far.
    pub fn set_pending_scale(&mut self, scale: f32) {
        self.pending_scale = Some(clamp_scale(scale));
    }

    /// Merge pending values into the committed ones. Runs once per gesture.
    pub fn flatten(&mut self) {
        if let Some(delta) = self.pending_delta.take() {
            self.position = self.position + delta;
        }
        if let Some(scale) = self.pending_scale.take() {
            self.scale = clamp_scale(scale);
        }
        self.current_offset_y = self.position.y;
    }

    /// Drop pending values, returning to the last committed state.
    pub fn discard_pending(&mut self) {
        self.pending_delta = None;
        self.pending_scale = None;
        self.current_offset_y = self.position.y;
    }

    /// Set the committed scale directly (style updates).
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = clamp_scale(scale);
    }
}

/// Visual style of a custom text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Text color as hex.
    pub color: String,
    /// Font size in logical pixels.
    pub font_size: f32,
}

/// A partial style update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylePatch {
    /// New text color.
    pub color: Option<String>,
    /// New font size.
    pub font_size: Option<f32>,
    /// New scale (clamped).
    pub scale: Option<f32>,
}

/// A seeded element: visible by default, hidden instead of deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedElement {
    /// Which seeded element this is.
    pub kind: FixedKind,
    /// Whether the element is drawn.
    pub visible: bool,
    /// Caller-supplied display text.
    pub text: String,
    /// Position and scale.
    pub transform: Transform,
}

/// A user-added text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTextElement {
    /// Stable identifier.
    pub id: CustomId,
    /// Text content (may be empty).
    pub text: String,
    /// Color and font size.
    pub style: TextStyle,
    /// Position and scale.
    pub transform: Transform,
}

/// Any element on the card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum CanvasElement {
    /// A seeded element.
    Fixed(FixedElement),
    /// A user-added text element.
    Custom(CustomTextElement),
}

impl CanvasElement {
    /// The element's id.
    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Self::Fixed(fixed) => ElementId::Fixed(fixed.kind),
            Self::Custom(custom) => ElementId::Custom(custom.id),
        }
    }

    /// The element's transform.
    #[must_use]
    pub fn transform(&self) -> &Transform {
        match self {
            Self::Fixed(fixed) => &fixed.transform,
            Self::Custom(custom) => &custom.transform,
        }
    }

    /// Mutable access to the element's transform.
    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Self::Fixed(fixed) => &mut fixed.transform,
            Self::Custom(custom) => &mut custom.transform,
        }
    }

    /// Whether the element is drawn. Custom elements are always visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        match self {
            Self::Fixed(fixed) => fixed.visible,
            Self::Custom(_) => true,
        }
    }

    /// Display text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Fixed(fixed) => &fixed.text,
            Self::Custom(custom) => &custom.text,
        }
    }

    /// Unscaled font size.
    #[must_use]
    pub fn font_size(&self) -> f32 {
        match self {
            Self::Fixed(fixed) => fixed.kind.font_size(),
            Self::Custom(custom) => custom.style.font_size,
        }
    }

    /// Vertical half-extent used to decide where the action menu goes.
    #[must_use]
    pub fn half_extent(&self) -> f32 {
        match self {
            Self::Fixed(fixed) => fixed.kind.half_extent(),
            Self::Custom(custom) => {
                custom.style.font_size * custom.transform.effective_scale() / 2.0
            }
        }
    }
}

/// Card background supplied by the theme collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Background {
    /// Vertical two-stop gradient.
    Gradient {
        /// Top color as hex.
        from: String,
        /// Bottom color as hex.
        to: String,
    },
    /// An opaque image reference (URI).
    Image {
        /// Image source URI.
        src: String,
    },
}

impl Default for Background {
    fn default() -> Self {
        Self::Gradient {
            from: "#1E1B4B".to_string(),
            to: "#7C3AED".to_string(),
        }
    }
}

/// Initial values for the fixed elements, supplied when the editor opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardSeed {
    /// Formatted date line.
    pub date: String,
    /// Headline stat text.
    pub main_stat: String,
    /// Session count text.
    pub session: String,
    /// Average time text.
    pub avg_time: String,
    /// Message text.
    pub message: String,
    /// Background.
    pub background: Background,
}

impl CardSeed {
    /// Seed text for a fixed element.
    #[must_use]
    pub fn text_for(&self, kind: FixedKind) -> &str {
        match kind {
            FixedKind::Date => &self.date,
            FixedKind::MainStat => &self.main_stat,
            FixedKind::Session => &self.session,
            FixedKind::AvgTime => &self.avg_time,
            FixedKind::Message => &self.message,
        }
    }
}
