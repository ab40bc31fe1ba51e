//! # Canvas Interaction Surface
//!
//! Translates pointer, wheel and drop input into viewport changes and store
//! commits. Everything transient (pan anchor, dragged block position,
//! connection source) lives here and never reaches the store until a gesture
//! completes; completed gestures come back as a [`CanvasCommit`] for the
//! workspace to persist.
//!
//! Coordinates:
//! - *client* points are pointer positions in window space
//! - *canvas* points are in the zoomed, panned model space
//! - `origin` is the client-space top-left corner of the canvas element

use blueprint_core::{Cardinality, DataType, FieldId, ModelId, Position, RelationshipId, Viewport};
use blueprint_ir::{DataModel, NewModel, ProjectGraph, Relationship};
use tracing::{debug, warn};

// ============================================================================
// Constants
// ============================================================================

/// Wheel factor when scrolling down (positive delta)
pub const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Wheel factor when scrolling up
pub const WHEEL_ZOOM_IN: f64 = 1.1;

/// Zoom button step
pub const BUTTON_ZOOM_STEP: f64 = 1.2;

/// Offset from a block's origin to where relationship lines attach
pub const LINE_ANCHOR_OFFSET: Position = Position { x: 120.0, y: 30.0 };

/// Minimum rendered width of a model block
pub const BLOCK_WIDTH: f64 = 240.0;

const BLOCK_HEADER_HEIGHT: f64 = 56.0;
const BLOCK_ROW_HEIGHT: f64 = 28.0;
const BLOCK_FOOTER_HEIGHT: f64 = 44.0;

// ============================================================================
// Input
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

impl PointerButton {
    /// Map a DOM-style button index
    pub fn from_index(index: i16) -> Option<Self> {
        match index {
            0 => Some(Self::Primary),
            1 => Some(Self::Middle),
            2 => Some(Self::Secondary),
            _ => None,
        }
    }
}

/// A pointer press or move in client coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client: Position,
    pub button: PointerButton,
    pub alt: bool,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, button: PointerButton) -> Self {
        Self {
            client: Position::new(x, y),
            button,
            alt: false,
        }
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Middle button, or primary with alt held
    pub fn starts_pan(&self) -> bool {
        self.button == PointerButton::Middle || (self.button == PointerButton::Primary && self.alt)
    }
}

/// What a press landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas
    Canvas,
    /// The body of a model block
    Block(ModelId),
    /// One of a block's control buttons (edit, delete, connect)
    BlockControl(ModelId),
}

/// A drag-and-drop payload from the library or the data-type toolbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPayload {
    /// A library model to clone (`modelId`)
    Model(ModelId),
    /// A library field (`fieldId`)
    Field(FieldId),
    /// A bare data type (`dataType`)
    DataType(DataType),
}

impl DropPayload {
    /// Parse one `(key, value)` transfer entry. Unknown keys and malformed
    /// values yield `None`.
    pub fn parse(key: &str, value: &str) -> Option<Self> {
        match key {
            "modelId" => value.parse().ok().map(Self::Model),
            "fieldId" => value.parse().ok().map(Self::Field),
            "dataType" => value.parse().ok().map(Self::DataType),
            _ => None,
        }
    }

    /// First recognised entry of a transfer, checking `modelId`, then
    /// `fieldId`, then `dataType`
    pub fn from_transfer<'a>(entries: &[(&'a str, &'a str)]) -> Option<Self> {
        ["modelId", "fieldId", "dataType"].iter().find_map(|wanted| {
            entries
                .iter()
                .filter(|(key, _)| key == wanted)
                .find_map(|(key, value)| Self::parse(key, value))
        })
    }
}

// ============================================================================
// Gesture state
// ============================================================================

/// State for canvas panning
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanState {
    /// Pointer position minus pan offset at press time
    anchor: Option<Position>,
}

impl PanState {
    pub fn start(&mut self, client: Position, viewport: &Viewport) {
        self.anchor = Some(client - viewport.offset());
    }

    pub fn is_active(&self) -> bool {
        self.anchor.is_some()
    }

    /// Pan offset for the current pointer position
    pub fn offset_for(&self, client: Position) -> Option<Position> {
        self.anchor.map(|anchor| client - anchor)
    }

    pub fn stop(&mut self) -> bool {
        self.anchor.take().is_some()
    }
}

/// An in-progress block drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub model_id: ModelId,
    /// Pointer minus block origin, in canvas coordinates
    pub grab_offset: Position,
    /// Where the block is drawn right now
    pub position: Position,
}

impl DragState {
    pub fn start(model: &DataModel, pointer: Position) -> Self {
        Self {
            model_id: model.id,
            grab_offset: pointer - model.canvas_position,
            position: model.canvas_position,
        }
    }

    pub fn update(&mut self, pointer: Position) {
        self.position = pointer - self.grab_offset;
    }
}

// ============================================================================
// Output
// ============================================================================

/// A completed gesture that must be persisted
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCommit {
    /// Save the viewport into the project's canvas state
    Viewport(Viewport),
    /// Save a dragged block's final position
    MoveModel { model_id: ModelId, position: Position },
    /// Create a model cloned from a library template
    CreateModel(NewModel),
    /// Attach a library field to the block it was dropped on
    AttachField { model_id: ModelId, field_id: FieldId },
    /// Advance a relationship's cardinality
    SetCardinality {
        relationship_id: RelationshipId,
        cardinality: Cardinality,
    },
    /// Open the relationship dialog pre-filled with both ends
    OpenRelationshipDialog { source: ModelId, target: ModelId },
    /// Nothing to persist; show a status message
    Notice(String),
}

/// Geometry of one relationship connector
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipLine {
    pub relationship_id: RelationshipId,
    pub start: Position,
    /// The arrowhead end
    pub end: Position,
    /// Where the cardinality label sits
    pub label_at: Position,
    pub cardinality: Cardinality,
}

/// Axis-aligned rectangle in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

// ============================================================================
// CanvasSurface
// ============================================================================

/// Headless canvas: viewport plus transient gesture state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanvasSurface {
    pub viewport: Viewport,
    /// Client-space top-left corner of the canvas element
    pub origin: Position,
    pan: PanState,
    drag: Option<DragState>,
    connecting_from: Option<ModelId>,
}

impl CanvasSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin(mut self, origin: Position) -> Self {
        self.origin = origin;
        self
    }

    /// Adopt the viewport persisted on a freshly loaded project and drop any
    /// gesture in progress
    pub fn sync_viewport(&mut self, viewport: Viewport) {
        self.viewport = Viewport::new(viewport.x, viewport.y, viewport.zoom);
        self.pan = PanState::default();
        self.drag = None;
        self.connecting_from = None;
    }

    pub fn to_canvas(&self, client: Position) -> Position {
        self.viewport.screen_to_canvas(client, self.origin)
    }

    pub fn is_panning(&self) -> bool {
        self.pan.is_active()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    /// Zoom as a whole percentage for the status readout
    pub fn zoom_percent(&self) -> u32 {
        (self.viewport.zoom * 100.0).round() as u32
    }

    // ========================================================================
    // Zoom
    // ========================================================================

    fn zoom_by(&mut self, factor: f64) -> CanvasCommit {
        self.viewport = self.viewport.with_zoom(self.viewport.zoom * factor);
        debug!(zoom = self.viewport.zoom, "zoomed");
        CanvasCommit::Viewport(self.viewport)
    }

    /// Mouse wheel: positive delta zooms out
    pub fn wheel(&mut self, delta_y: f64) -> CanvasCommit {
        let factor = if delta_y > 0.0 {
            WHEEL_ZOOM_OUT
        } else {
            WHEEL_ZOOM_IN
        };
        self.zoom_by(factor)
    }

    pub fn zoom_in(&mut self) -> CanvasCommit {
        self.zoom_by(BUTTON_ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> CanvasCommit {
        self.zoom_by(1.0 / BUTTON_ZOOM_STEP)
    }

    pub fn reset_view(&mut self) -> CanvasCommit {
        self.viewport = Viewport::default();
        CanvasCommit::Viewport(self.viewport)
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    /// Press. Pan gestures win over block drags; presses on block controls
    /// start nothing.
    pub fn pointer_down(
        &mut self,
        event: PointerEvent,
        target: PointerTarget,
        graph: &ProjectGraph,
    ) {
        if event.starts_pan() {
            self.pan.start(event.client, &self.viewport);
            return;
        }
        if event.button != PointerButton::Primary {
            return;
        }
        if let PointerTarget::Block(model_id) = target {
            if let Some(model) = graph.model(model_id) {
                self.drag = Some(DragState::start(model, self.to_canvas(event.client)));
            }
        }
    }

    /// Move. Touches only local state.
    pub fn pointer_move(&mut self, client: Position) {
        if let Some(offset) = self.pan.offset_for(client) {
            self.viewport = self.viewport.with_offset(offset);
        } else if self.drag.is_some() {
            let pointer = self.to_canvas(client);
            if let Some(drag) = self.drag.as_mut() {
                drag.update(pointer);
            }
        }
    }

    /// Release. Ends the active gesture with exactly one commit.
    pub fn pointer_up(&mut self) -> Option<CanvasCommit> {
        if self.pan.stop() {
            return Some(CanvasCommit::Viewport(self.viewport));
        }
        self.drag.take().map(|drag| CanvasCommit::MoveModel {
            model_id: drag.model_id,
            position: drag.position,
        })
    }

    /// Pointer left the canvas: ends a pan like a release. Block drags keep
    /// tracking until the button comes up.
    pub fn pointer_leave(&mut self) -> Option<CanvasCommit> {
        self.pan
            .stop()
            .then_some(CanvasCommit::Viewport(self.viewport))
    }

    // ========================================================================
    // Drop
    // ========================================================================

    /// Handle a drop at a client point
    pub fn drop_payload(
        &mut self,
        payload: DropPayload,
        client: Position,
        graph: &ProjectGraph,
    ) -> Option<CanvasCommit> {
        let point = self.to_canvas(client);
        match payload {
            DropPayload::Model(template_id) => match graph.model(template_id) {
                Some(template) => Some(CanvasCommit::CreateModel(
                    template.clone_at(graph.project_id(), point),
                )),
                None => {
                    warn!(model = %template_id, "dropped model template no longer exists");
                    None
                }
            },
            DropPayload::Field(field_id) => {
                let field = graph.field(field_id)?;
                match self.block_at(graph, point) {
                    Some(model_id) => Some(CanvasCommit::AttachField { model_id, field_id }),
                    None => Some(CanvasCommit::Notice(format!(
                        "Drop \"{}\" onto a model to add it",
                        field.name
                    ))),
                }
            }
            DropPayload::DataType(data_type) => Some(CanvasCommit::Notice(format!(
                "Open a model's field editor to add a {} field",
                data_type.display_name()
            ))),
        }
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Where a block is drawn, honouring an in-progress drag
    pub fn model_position(&self, model: &DataModel) -> Position {
        match &self.drag {
            Some(drag) if drag.model_id == model.id => drag.position,
            _ => model.canvas_position,
        }
    }

    pub fn block_bounds(&self, graph: &ProjectGraph, model: &DataModel) -> Bounds {
        let rows = graph.attachments_for_model(model.id).len().max(1) as f64;
        let origin = self.model_position(model);
        Bounds {
            x: origin.x,
            y: origin.y,
            width: BLOCK_WIDTH,
            height: BLOCK_HEADER_HEIGHT + rows * BLOCK_ROW_HEIGHT + BLOCK_FOOTER_HEIGHT,
        }
    }

    /// Topmost block under a canvas point. Later models draw on top.
    pub fn block_at(&self, graph: &ProjectGraph, point: Position) -> Option<ModelId> {
        graph
            .models
            .iter()
            .rev()
            .find(|model| self.block_bounds(graph, model).contains(point))
            .map(|model| model.id)
    }

    /// Connector geometry for every relationship whose ends both exist
    pub fn relationship_lines(&self, graph: &ProjectGraph) -> Vec<RelationshipLine> {
        graph
            .relationships
            .iter()
            .filter_map(|rel| self.relationship_line(graph, rel))
            .collect()
    }

    fn relationship_line(&self, graph: &ProjectGraph, rel: &Relationship) -> Option<RelationshipLine> {
        let source = graph.model(rel.source_model_id)?;
        let target = graph.model(rel.target_model_id)?;
        let start = self.model_position(source) + LINE_ANCHOR_OFFSET;
        let end = self.model_position(target) + LINE_ANCHOR_OFFSET;
        Some(RelationshipLine {
            relationship_id: rel.id,
            start,
            end,
            label_at: start.midpoint(&end),
            cardinality: rel.cardinality,
        })
    }

    /// Clicking a cardinality label advances it one step
    pub fn cycle_cardinality(&self, relationship: &Relationship) -> CanvasCommit {
        CanvasCommit::SetCardinality {
            relationship_id: relationship.id,
            cardinality: relationship.cardinality.next(),
        }
    }

    // ========================================================================
    // Connection mode
    // ========================================================================

    pub fn start_connection(&mut self, source: ModelId) {
        self.connecting_from = Some(source);
    }

    pub fn connecting_from(&self) -> Option<ModelId> {
        self.connecting_from
    }

    /// Finish on a target block. Finishing on the source itself keeps the
    /// mode active.
    pub fn finish_connection(&mut self, target: ModelId) -> Option<CanvasCommit> {
        let source = self.connecting_from?;
        if source == target {
            return None;
        }
        self.connecting_from = None;
        Some(CanvasCommit::OpenRelationshipDialog { source, target })
    }

    pub fn cancel_connection(&mut self) {
        self.connecting_from = None;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::{MAX_ZOOM, MIN_ZOOM, UserId};
    use blueprint_ir::{CrudActions, DataField, ModelField, Project};
    use pretty_assertions::assert_eq;

    fn graph_with(models: Vec<DataModel>) -> ProjectGraph {
        let mut graph = ProjectGraph::new(Project::new(UserId::new_v4(), "Shop"));
        graph.models = models;
        graph
    }

    fn committed_viewport(commit: CanvasCommit) -> Viewport {
        match commit {
            CanvasCommit::Viewport(viewport) => viewport,
            other => panic!("expected viewport commit, got {other:?}"),
        }
    }

    #[test]
    fn test_wheel_zoom_direction() {
        let mut canvas = CanvasSurface::new();
        let down = committed_viewport(canvas.wheel(120.0));
        assert!((down.zoom - 0.9).abs() < 1e-9);

        let mut canvas = CanvasSurface::new();
        let up = committed_viewport(canvas.wheel(-120.0));
        assert!((up.zoom - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_always_clamped() {
        let mut canvas = CanvasSurface::new();
        for _ in 0..100 {
            canvas.zoom_in();
        }
        assert_eq!(canvas.viewport.zoom, MAX_ZOOM);
        for _ in 0..200 {
            canvas.wheel(1.0);
        }
        assert_eq!(canvas.viewport.zoom, MIN_ZOOM);
        canvas.zoom_out();
        assert_eq!(canvas.viewport.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_reset_view() {
        let mut canvas = CanvasSurface::new();
        canvas.zoom_in();
        canvas.viewport = canvas.viewport.with_offset(Position::new(50.0, 50.0));
        assert_eq!(committed_viewport(canvas.reset_view()), Viewport::default());
    }

    #[test]
    fn test_pan_tracks_pointer_and_commits_once() {
        let graph = graph_with(vec![]);
        let mut canvas = CanvasSurface::new();
        canvas.viewport = Viewport::new(10.0, 20.0, 1.0);

        canvas.pointer_down(
            PointerEvent::new(100.0, 100.0, PointerButton::Middle),
            PointerTarget::Canvas,
            &graph,
        );
        assert!(canvas.is_panning());
        canvas.pointer_move(Position::new(130.0, 90.0));
        canvas.pointer_move(Position::new(150.0, 80.0));
        assert_eq!(canvas.viewport.offset(), Position::new(60.0, 0.0));

        let commit = canvas.pointer_up();
        assert_eq!(commit, Some(CanvasCommit::Viewport(Viewport::new(60.0, 0.0, 1.0))));
        assert_eq!(canvas.pointer_up(), None);
    }

    #[test]
    fn test_alt_primary_pans_and_leave_ends_pan() {
        let graph = graph_with(vec![]);
        let mut canvas = CanvasSurface::new();
        canvas.pointer_down(
            PointerEvent::new(0.0, 0.0, PointerButton::Primary).with_alt(),
            PointerTarget::Canvas,
            &graph,
        );
        canvas.pointer_move(Position::new(-40.0, 25.0));
        let commit = canvas.pointer_leave();
        assert_eq!(commit, Some(CanvasCommit::Viewport(Viewport::new(-40.0, 25.0, 1.0))));
        assert!(!canvas.is_panning());
    }

    #[test]
    fn test_drag_commits_single_move() {
        let model = DataModel::new(UserId::new_v4(), "Customer").at(100.0, 100.0);
        let model_id = model.id;
        let graph = graph_with(vec![model]);
        let mut canvas = CanvasSurface::new();

        canvas.pointer_down(
            PointerEvent::new(110.0, 105.0, PointerButton::Primary),
            PointerTarget::Block(model_id),
            &graph,
        );
        for step in 1..=5 {
            canvas.pointer_move(Position::new(110.0 + 10.0 * step as f64, 105.0));
        }
        assert_eq!(
            canvas.model_position(&graph.models[0]),
            Position::new(150.0, 100.0)
        );

        assert_eq!(
            canvas.pointer_up(),
            Some(CanvasCommit::MoveModel {
                model_id,
                position: Position::new(150.0, 100.0)
            })
        );
        assert_eq!(canvas.pointer_up(), None);
    }

    #[test]
    fn test_press_on_block_control_does_not_drag() {
        let model = DataModel::new(UserId::new_v4(), "Customer");
        let model_id = model.id;
        let graph = graph_with(vec![model]);
        let mut canvas = CanvasSurface::new();

        canvas.pointer_down(
            PointerEvent::new(0.0, 0.0, PointerButton::Primary),
            PointerTarget::BlockControl(model_id),
            &graph,
        );
        canvas.pointer_move(Position::new(50.0, 50.0));
        assert_eq!(canvas.pointer_up(), None);
    }

    #[test]
    fn test_drop_model_template_at_canvas_point() {
        let template = DataModel::new(UserId::new_v4(), "Customer")
            .at(100.0, 100.0)
            .with_actions(CrudActions {
                delete: false,
                ..CrudActions::all()
            });
        let template_id = template.id;
        let graph = graph_with(vec![template]);

        let mut canvas = CanvasSurface::new().with_origin(Position::new(100.0, 50.0));
        canvas.viewport = Viewport::new(20.0, 10.0, 2.0);

        let commit = canvas.drop_payload(
            DropPayload::Model(template_id),
            Position::new(500.0, 300.0),
            &graph,
        );
        match commit {
            Some(CanvasCommit::CreateModel(new_model)) => {
                assert_eq!(new_model.name, "Customer");
                assert_eq!(new_model.canvas_position, Position::new(190.0, 120.0));
                assert!(!new_model.crud_actions.delete);
                assert_eq!(new_model.project_id, graph.project_id());
            }
            other => panic!("expected model creation, got {other:?}"),
        }
    }

    #[test]
    fn test_drop_field_on_block_or_empty_canvas() {
        let model = DataModel::new(UserId::new_v4(), "Customer").at(0.0, 0.0);
        let model_id = model.id;
        let mut graph = graph_with(vec![model]);
        let field = DataField::new(graph.project_id(), "email", DataType::Email).reusable();
        let field_id = field.id;
        graph.fields.push(field);
        let mut canvas = CanvasSurface::new();

        assert_eq!(
            canvas.drop_payload(DropPayload::Field(field_id), Position::new(50.0, 40.0), &graph),
            Some(CanvasCommit::AttachField { model_id, field_id })
        );
        assert!(matches!(
            canvas.drop_payload(DropPayload::Field(field_id), Position::new(900.0, 900.0), &graph),
            Some(CanvasCommit::Notice(_))
        ));
        assert_eq!(
            canvas.drop_payload(
                DropPayload::Field(FieldId::new_v4()),
                Position::new(50.0, 40.0),
                &graph
            ),
            None
        );
    }

    #[test]
    fn test_drop_payload_parsing() {
        let id = ModelId::new_v4();
        let id_text = id.to_string();
        assert_eq!(
            DropPayload::from_transfer(&[("dataType", "email"), ("modelId", &id_text)]),
            Some(DropPayload::Model(id))
        );
        assert_eq!(
            DropPayload::parse("dataType", "currency"),
            Some(DropPayload::DataType(DataType::Currency))
        );
        assert_eq!(DropPayload::parse("modelId", "not-a-uuid"), None);
        assert_eq!(DropPayload::from_transfer(&[("text/plain", "hello")]), None);
    }

    #[test]
    fn test_relationship_lines_skip_dangling() {
        let customer = DataModel::new(UserId::new_v4(), "Customer").at(0.0, 0.0);
        let order = DataModel::new(UserId::new_v4(), "Order").at(400.0, 200.0);
        let mut graph = graph_with(vec![customer.clone(), order.clone()]);
        let project_id = graph.project_id();
        graph.relationships = vec![
            Relationship::new(project_id, customer.id, order.id, Cardinality::OneToMany),
            Relationship::new(project_id, customer.id, ModelId::new_v4(), Cardinality::OneToOne),
        ];

        let lines = CanvasSurface::new().relationship_lines(&graph);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].start, Position::new(120.0, 30.0));
        assert_eq!(lines[0].end, Position::new(520.0, 230.0));
        assert_eq!(lines[0].label_at, Position::new(320.0, 130.0));
        assert_eq!(lines[0].cardinality, Cardinality::OneToMany);
    }

    #[test]
    fn test_cardinality_cycles() {
        let mut rel = Relationship::new(
            UserId::new_v4(),
            ModelId::new_v4(),
            ModelId::new_v4(),
            Cardinality::OneToOne,
        );
        let canvas = CanvasSurface::new();
        let mut seen = Vec::new();
        for _ in 0..3 {
            if let CanvasCommit::SetCardinality { cardinality, .. } = canvas.cycle_cardinality(&rel) {
                seen.push(cardinality);
                rel.cardinality = cardinality;
            }
        }
        assert_eq!(
            seen,
            vec![
                Cardinality::OneToMany,
                Cardinality::ManyToMany,
                Cardinality::OneToOne
            ]
        );
    }

    #[test]
    fn test_connection_mode() {
        let (a, b) = (ModelId::new_v4(), ModelId::new_v4());
        let mut canvas = CanvasSurface::new();
        assert_eq!(canvas.finish_connection(b), None);

        canvas.start_connection(a);
        assert_eq!(canvas.finish_connection(a), None);
        assert_eq!(
            canvas.finish_connection(b),
            Some(CanvasCommit::OpenRelationshipDialog { source: a, target: b })
        );
        assert_eq!(canvas.connecting_from(), None);

        canvas.start_connection(a);
        canvas.cancel_connection();
        assert_eq!(canvas.connecting_from(), None);
    }

    #[test]
    fn test_block_hit_test_grows_with_fields() {
        let model = DataModel::new(UserId::new_v4(), "Customer").at(0.0, 0.0);
        let model_id = model.id;
        let mut graph = graph_with(vec![model]);
        let canvas = CanvasSurface::new();
        let probe = Position::new(10.0, 200.0);
        assert_eq!(canvas.block_at(&graph, probe), None);

        for i in 0..5 {
            graph
                .model_fields
                .push(ModelField::new(model_id, FieldId::new_v4(), i));
        }
        assert_eq!(canvas.block_at(&graph, probe), Some(model_id));
    }
}
