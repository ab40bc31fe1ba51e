//! Core types used throughout Blueprint Studio
//!
//! This module contains the fundamental types shared by the data model, the
//! store, the exporter and the canvas: identifiers, canvas geometry, and the
//! closed enumerations whose serialized spellings are part of the blueprint
//! format and of the hosted data service's columns.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Unique Identifiers
// ============================================================================

/// Identifier of a project
pub type ProjectId = uuid::Uuid;

/// Identifier of the user owning a project
pub type UserId = uuid::Uuid;

/// Identifier of a data model block
pub type ModelId = uuid::Uuid;

/// Identifier of a library field
pub type FieldId = uuid::Uuid;

/// Identifier of a model-field attachment
pub type ModelFieldId = uuid::Uuid;

/// Identifier of a relationship
pub type RelationshipId = uuid::Uuid;

/// Identifier of a row-level-security policy
pub type PolicyId = uuid::Uuid;

/// Identifier of a model nesting
pub type NestingId = uuid::Uuid;

/// Identifier of a visual group overlay
pub type GroupId = uuid::Uuid;

// ============================================================================
// Geometry Types
// ============================================================================

/// Position on the 2D canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a position at the origin (0, 0)
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Add an offset to this position
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Point halfway between two positions
    pub fn midpoint(&self, other: &Position) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Minimum zoom level (10%)
pub const MIN_ZOOM: f64 = 0.1;

/// Maximum zoom level (300%)
pub const MAX_ZOOM: f64 = 3.0;

/// Pan offset and zoom of the canvas, as persisted in a project's canvas state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Viewport {
    /// Create a viewport; the zoom is clamped to the supported range
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self {
            x,
            y,
            zoom: clamp_zoom(zoom),
        }
    }

    /// The pan offset as a position
    pub fn offset(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Copy of this viewport with a new (clamped) zoom
    pub fn with_zoom(&self, zoom: f64) -> Self {
        Self {
            zoom: clamp_zoom(zoom),
            ..*self
        }
    }

    /// Copy of this viewport with a new pan offset
    pub fn with_offset(&self, offset: Position) -> Self {
        Self {
            x: offset.x,
            y: offset.y,
            ..*self
        }
    }

    /// Convert a client-space point into canvas coordinates.
    ///
    /// `origin` is the client-space top-left corner of the canvas element.
    pub fn screen_to_canvas(&self, point: Position, origin: Position) -> Position {
        Position::new(
            (point.x - origin.x - self.x) / self.zoom,
            (point.y - origin.y - self.y) / self.zoom,
        )
    }

    /// Convert canvas coordinates back into client space
    pub fn canvas_to_screen(&self, point: Position, origin: Position) -> Position {
        Position::new(
            point.x * self.zoom + self.x + origin.x,
            point.y * self.zoom + self.y + origin.y,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`.
///
/// Non-finite input falls back to 1.0.
pub fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        1.0
    }
}

// ============================================================================
// Data Types
// ============================================================================

/// The fixed set of field data types offered by the toolbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Text,
    Email,
    Phone,
    Number,
    Currency,
    Date,
    Time,
    Datetime,
    Boolean,
    Uuid,
    Url,
    Json,
}

impl DataType {
    /// Every data type, in toolbox order
    pub const ALL: [DataType; 12] = [
        DataType::Text,
        DataType::Email,
        DataType::Phone,
        DataType::Number,
        DataType::Currency,
        DataType::Date,
        DataType::Time,
        DataType::Datetime,
        DataType::Boolean,
        DataType::Uuid,
        DataType::Url,
        DataType::Json,
    ];

    /// The serialized identifier (`"text"`, `"email"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Email => "email",
            DataType::Phone => "phone",
            DataType::Number => "number",
            DataType::Currency => "currency",
            DataType::Date => "date",
            DataType::Time => "time",
            DataType::Datetime => "datetime",
            DataType::Boolean => "boolean",
            DataType::Uuid => "uuid",
            DataType::Url => "url",
            DataType::Json => "json",
        }
    }

    /// Get the display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            DataType::Text => "Text",
            DataType::Email => "Email",
            DataType::Phone => "Phone",
            DataType::Number => "Number",
            DataType::Currency => "Currency",
            DataType::Date => "Date",
            DataType::Time => "Time",
            DataType::Datetime => "Date & Time",
            DataType::Boolean => "Boolean",
            DataType::Uuid => "UUID",
            DataType::Url => "URL",
            DataType::Json => "JSON",
        }
    }

    /// Short description shown in the toolbox
    pub fn description(&self) -> &'static str {
        match self {
            DataType::Text => "Short or long text strings",
            DataType::Email => "Email address with validation",
            DataType::Phone => "Phone number",
            DataType::Number => "Integer or decimal numbers",
            DataType::Currency => "Monetary values",
            DataType::Date => "Calendar date",
            DataType::Time => "Time of day",
            DataType::Datetime => "Date and time combined",
            DataType::Boolean => "True or false value",
            DataType::Uuid => "Unique identifier",
            DataType::Url => "Web address",
            DataType::Json => "Structured data object",
        }
    }

    /// Toolbox glyph
    pub fn symbol(&self) -> &'static str {
        match self {
            DataType::Text => "T",
            DataType::Email => "@",
            DataType::Phone => "📞",
            DataType::Number => "#",
            DataType::Currency => "$",
            DataType::Date => "📅",
            DataType::Time => "🕐",
            DataType::Datetime => "📆",
            DataType::Boolean => "✓",
            DataType::Uuid => "🔑",
            DataType::Url => "🔗",
            DataType::Json => "{}",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        DataType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| EngineError::unknown_variant("data type", s))
    }
}

// ============================================================================
// Relationship Cardinality
// ============================================================================

/// Cardinality of a relationship between two models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Cardinality {
    /// One record relates to exactly one other record
    #[serde(rename = "1:1")]
    OneToOne,
    /// One record relates to many others
    #[default]
    #[serde(rename = "1:M")]
    OneToMany,
    /// Many records relate to many others
    #[serde(rename = "M:M")]
    ManyToMany,
}

impl Cardinality {
    /// The cycle order used by the canvas label
    pub const ALL: [Cardinality; 3] = [
        Cardinality::OneToOne,
        Cardinality::OneToMany,
        Cardinality::ManyToMany,
    ];

    /// The serialized literal (`"1:1"`, `"1:M"`, `"M:M"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "1:1",
            Cardinality::OneToMany => "1:M",
            Cardinality::ManyToMany => "M:M",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "One to One",
            Cardinality::OneToMany => "One to Many",
            Cardinality::ManyToMany => "Many to Many",
        }
    }

    /// Next cardinality in the cycle `1:1 -> 1:M -> M:M -> 1:1`
    pub fn next(&self) -> Self {
        match self {
            Cardinality::OneToOne => Cardinality::OneToMany,
            Cardinality::OneToMany => Cardinality::ManyToMany,
            Cardinality::ManyToMany => Cardinality::OneToOne,
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        Cardinality::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::unknown_variant("cardinality", s))
    }
}

// ============================================================================
// Security Policy Operations
// ============================================================================

/// Operation a row-level-security note applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyOperation {
    Create,
    #[default]
    Read,
    Update,
    Delete,
}

impl PolicyOperation {
    /// Grouping order used by the security editor
    pub const ALL: [PolicyOperation; 4] = [
        PolicyOperation::Create,
        PolicyOperation::Read,
        PolicyOperation::Update,
        PolicyOperation::Delete,
    ];

    /// The serialized literal (`"CREATE"`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyOperation::Create => "CREATE",
            PolicyOperation::Read => "READ",
            PolicyOperation::Update => "UPDATE",
            PolicyOperation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for PolicyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyOperation {
    type Err = EngineError;

    fn from_str(s: &str) -> EngineResult<Self> {
        PolicyOperation::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::unknown_variant("policy operation", s))
    }
}

// ============================================================================
// CRUD Actions
// ============================================================================

/// One of the four CRUD action flags of a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudAction {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudAction {
    /// All actions in editor order
    pub const ALL: [CrudAction; 4] = [
        CrudAction::Create,
        CrudAction::Read,
        CrudAction::Update,
        CrudAction::Delete,
    ];

    /// Get the display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            CrudAction::Create => "Create",
            CrudAction::Read => "Read",
            CrudAction::Update => "Update",
            CrudAction::Delete => "Delete",
        }
    }

    /// Short description shown next to the toggle
    pub fn description(&self) -> &'static str {
        match self {
            CrudAction::Create => "Allow creating new records",
            CrudAction::Read => "Allow reading/querying records",
            CrudAction::Update => "Allow modifying existing records",
            CrudAction::Delete => "Allow deleting records",
        }
    }
}

impl fmt::Display for CrudAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_position_arithmetic() {
        let a = Position::new(10.0, 20.0);
        let b = Position::new(4.0, 5.0);
        assert_eq!(a + b, Position::new(14.0, 25.0));
        assert_eq!(a - b, Position::new(6.0, 15.0));
        assert_eq!(a.offset(1.0, -1.0), Position::new(11.0, 19.0));
        assert_eq!(a.midpoint(&b), Position::new(7.0, 12.5));
    }

    #[test]
    fn test_viewport_clamps_zoom() {
        assert_eq!(Viewport::new(0.0, 0.0, 10.0).zoom, MAX_ZOOM);
        assert_eq!(Viewport::new(0.0, 0.0, 0.01).zoom, MIN_ZOOM);
        assert_eq!(Viewport::default().with_zoom(f64::NAN).zoom, 1.0);
    }

    #[test]
    fn test_viewport_coordinate_conversion() {
        let viewport = Viewport::new(100.0, 50.0, 2.0);
        let origin = Position::new(10.0, 20.0);

        let canvas = viewport.screen_to_canvas(Position::new(310.0, 170.0), origin);
        assert_eq!(canvas, Position::new(100.0, 50.0));

        let back = viewport.canvas_to_screen(canvas, origin);
        assert_eq!(back, Position::new(310.0, 170.0));
    }

    #[test]
    fn test_viewport_serialization() {
        let json = serde_json::to_string(&Viewport::default()).unwrap();
        assert_eq!(json, r#"{"x":0.0,"y":0.0,"zoom":1.0}"#);
    }

    #[test]
    fn test_data_type_roundtrip_names() {
        for data_type in DataType::ALL {
            let json = serde_json::to_string(&data_type).unwrap();
            assert_eq!(json, format!("\"{}\"", data_type.as_str()));
            assert_eq!(data_type.as_str().parse::<DataType>().unwrap(), data_type);
        }
        assert!("varchar".parse::<DataType>().is_err());
        assert_eq!(DataType::Datetime.display_name(), "Date & Time");
    }

    #[test]
    fn test_cardinality_cycle() {
        assert_eq!(Cardinality::OneToOne.next(), Cardinality::OneToMany);
        assert_eq!(Cardinality::OneToMany.next(), Cardinality::ManyToMany);
        assert_eq!(Cardinality::ManyToMany.next(), Cardinality::OneToOne);

        for start in Cardinality::ALL {
            assert_eq!(start.next().next().next(), start);
        }
    }

    #[test]
    fn test_cardinality_literals() {
        assert_eq!(
            serde_json::to_string(&Cardinality::OneToMany).unwrap(),
            "\"1:M\""
        );
        let parsed: Cardinality = serde_json::from_str("\"M:M\"").unwrap();
        assert_eq!(parsed, Cardinality::ManyToMany);
        assert_eq!("1:m".parse::<Cardinality>().unwrap(), Cardinality::OneToMany);
    }

    #[test]
    fn test_policy_operation_literals() {
        assert_eq!(
            serde_json::to_string(&PolicyOperation::Update).unwrap(),
            "\"UPDATE\""
        );
        assert_eq!(PolicyOperation::default(), PolicyOperation::Read);
        assert_eq!(
            "delete".parse::<PolicyOperation>().unwrap(),
            PolicyOperation::Delete
        );
    }

    #[test]
    fn test_crud_action_keys() {
        assert_eq!(serde_json::to_string(&CrudAction::Read).unwrap(), "\"read\"");
        assert_eq!(CrudAction::Delete.description(), "Allow deleting records");
    }
}
