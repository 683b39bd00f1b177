use crate::board::geometry::{BoardGeometry, Rescale};
use crate::board::input::{Modifiers, PointerId};
use crate::board::square::Square;
use crate::board::surface::DrawOp;
use eframe::egui::{Color32, Stroke};
use serde::{Deserialize, Serialize};

/// Shape used when an annotation starts and ends on the same square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Rectangle,
    #[default]
    Circle,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Rectangle(Square),
    Circle(Square),
    Cross(Square),
    Arrow { from: Square, to: Square },
}

/// Identity used to find the annotation a new one replaces or toggles.
/// Only one non-arrow mark may occupy a square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKey {
    Square(Square),
    Arrow(Square, Square),
}

impl Mark {
    pub fn marker(shape: MarkerShape, square: Square) -> Self {
        match shape {
            MarkerShape::Rectangle => Self::Rectangle(square),
            MarkerShape::Circle => Self::Circle(square),
            MarkerShape::Cross => Self::Cross(square),
        }
    }

    pub fn key(self) -> AnnotationKey {
        match self {
            Self::Rectangle(square) | Self::Circle(square) | Self::Cross(square) => {
                AnnotationKey::Square(square)
            }
            Self::Arrow { from, to } => AnnotationKey::Arrow(from, to),
        }
    }

    pub fn is_arrow(self) -> bool {
        matches!(self, Self::Arrow { .. })
    }

    /// Committed stroke width for this mark on a board with `square_size`.
    pub fn committed_width(self, square_size: f32) -> f32 {
        if self.is_arrow() {
            square_size / 5.0
        } else {
            square_size / 7.0
        }
    }
}

pub fn preview_width(square_size: f32) -> f32 {
    square_size / 14.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Annotation {
    pub mark: Mark,
    pub color: Color32,
    /// Pixels; follows the board on resize.
    pub stroke_width: f32,
}

impl Annotation {
    pub fn committed(mark: Mark, color: Color32, square_size: f32) -> Self {
        Self {
            mark,
            color,
            stroke_width: mark.committed_width(square_size),
        }
    }

    /// Same shape, same endpoints, same color.
    pub fn same_as(&self, other: &Annotation) -> bool {
        self.mark == other.mark && self.color == other.color
    }

    pub fn to_ops(&self, geometry: &BoardGeometry) -> Vec<DrawOp> {
        let stroke = Stroke::new(self.stroke_width, self.color);
        let inset = self.stroke_width / 2.0;
        match self.mark {
            Mark::Rectangle(square) => vec![DrawOp::RoundedRect {
                rect: geometry.square_rect(square).shrink(inset),
                rounding: self.stroke_width,
                stroke,
            }],
            Mark::Circle(square) => vec![DrawOp::Ring {
                rect: geometry.square_rect(square).shrink(inset),
                stroke,
            }],
            Mark::Cross(square) => vec![DrawOp::Cross {
                rect: geometry
                    .square_rect(square)
                    .shrink(geometry.square_size() / 5.0),
                stroke,
            }],
            Mark::Arrow { from, to } => vec![DrawOp::Arrow {
                from: geometry.square_center(from),
                to: geometry.square_center(to),
                head_length: geometry.square_size() * 0.4,
                stroke,
            }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Added,
    Replaced,
    Removed,
}

/// Committed annotations in z-order.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    items: Vec<Annotation>,
    revision: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `annotation`, replaces the one sharing its key in place, or
    /// removes that one when both are the same.
    pub fn commit(&mut self, annotation: Annotation) -> CommitOutcome {
        let key = annotation.mark.key();
        let outcome = match self.items.iter().position(|item| item.mark.key() == key) {
            Some(index) if self.items[index].same_as(&annotation) => {
                self.items.remove(index);
                CommitOutcome::Removed
            }
            Some(index) => {
                self.items[index] = annotation;
                CommitOutcome::Replaced
            }
            None => {
                self.items.push(annotation);
                CommitOutcome::Added
            }
        };
        self.revision += 1;
        tracing::debug!(?key, ?outcome, total = self.items.len(), "annotation committed");
        outcome
    }

    /// Programmatic equivalent of authoring `mark` by hand.
    pub fn toggle(&mut self, mark: Mark, color: Color32, square_size: f32) -> CommitOutcome {
        self.commit(Annotation::committed(mark, color, square_size))
    }

    /// Returns `true` if anything was removed.
    pub fn clear(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        self.items.clear();
        self.revision += 1;
        true
    }

    pub fn get(&self, key: AnnotationKey) -> Option<&Annotation> {
        self.items.iter().find(|item| item.mark.key() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Recomputes every stroke width for `square_size`. Used when the board
    /// gets its first real size, since marks toggled before that were sized
    /// against an empty board.
    pub fn restroke(&mut self, square_size: f32) {
        for item in &mut self.items {
            item.stroke_width = item.mark.committed_width(square_size);
        }
    }

    /// Bumped on every change to the set.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn to_ops(&self, geometry: &BoardGeometry) -> Vec<DrawOp> {
        self.items
            .iter()
            .flat_map(|item| item.to_ops(geometry))
            .collect()
    }
}

impl Rescale for AnnotationStore {
    fn rescale(&mut self, factor: f32) {
        for item in &mut self.items {
            item.stroke_width.rescale(factor);
        }
    }
}

/// Colors picked by the modifier held when an annotation starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationColors {
    pub primary: Color32,
    pub info: Color32,
    pub warning: Color32,
    pub danger: Color32,
}

impl AnnotationColors {
    /// Alt beats shift beats ctrl.
    pub fn for_modifiers(&self, modifiers: Modifiers) -> Color32 {
        if modifiers.alt {
            self.warning
        } else if modifiers.shift {
            self.info
        } else if modifiers.ctrl {
            self.danger
        } else {
            self.primary
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drawing {
    pointer: PointerId,
    start: Square,
    end: Square,
    color: Color32,
}

/// The single annotation being drawn with the secondary button.
#[derive(Debug, Clone, Default)]
pub struct AnnotationAuthor {
    drawing: Option<Drawing>,
    marker: MarkerShape,
}

impl AnnotationAuthor {
    pub fn new(marker: MarkerShape) -> Self {
        Self {
            drawing: None,
            marker,
        }
    }

    pub fn set_marker(&mut self, marker: MarkerShape) {
        self.marker = marker;
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing.is_some()
    }

    pub fn owner(&self) -> Option<PointerId> {
        self.drawing.map(|drawing| drawing.pointer)
    }

    pub fn begin(&mut self, square: Square, color: Color32, pointer: PointerId) {
        self.drawing = Some(Drawing {
            pointer,
            start: square,
            end: square,
            color,
        });
    }

    /// Follows the pointer. Returns `true` when the shape changed.
    pub fn track(&mut self, square: Option<Square>, pointer: PointerId) -> bool {
        let Some(drawing) = self.drawing.as_mut().filter(|d| d.pointer == pointer) else {
            return false;
        };
        match square {
            Some(square) if square != drawing.end => {
                drawing.end = square;
                true
            }
            _ => false,
        }
    }

    /// Ends the gesture. A release off the board yields nothing.
    pub fn finish(
        &mut self,
        square: Option<Square>,
        pointer: PointerId,
        square_size: f32,
    ) -> Option<Annotation> {
        if self.owner() != Some(pointer) {
            return None;
        }
        let mut drawing = self.drawing.take()?;
        drawing.end = square?;
        Some(Annotation::committed(
            self.mark_of(&drawing),
            drawing.color,
            square_size,
        ))
    }

    /// Returns `true` if a drawing was in progress.
    pub fn cancel(&mut self) -> bool {
        self.drawing.take().is_some()
    }

    /// Thin, faded rendition of the annotation being drawn.
    pub fn preview(&self, square_size: f32) -> Option<Annotation> {
        let drawing = self.drawing.as_ref()?;
        Some(Annotation {
            mark: self.mark_of(drawing),
            color: drawing.color.gamma_multiply(0.6),
            stroke_width: preview_width(square_size),
        })
    }

    fn mark_of(&self, drawing: &Drawing) -> Mark {
        if drawing.start == drawing.end {
            Mark::marker(self.marker, drawing.start)
        } else {
            Mark::Arrow {
                from: drawing.start,
                to: drawing.end,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUSE: PointerId = PointerId(0);

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn colors() -> AnnotationColors {
        AnnotationColors {
            primary: Color32::GREEN,
            info: Color32::BLUE,
            warning: Color32::YELLOW,
            danger: Color32::RED,
        }
    }

    fn author(
        author: &mut AnnotationAuthor,
        path: &[&str],
        color: Color32,
    ) -> Option<Annotation> {
        author.begin(sq(path[0]), color, MOUSE);
        for name in &path[1..] {
            author.track(Some(sq(name)), MOUSE);
        }
        let last = path.last().map(|name| sq(name));
        author.finish(last, MOUSE, 50.0)
    }

    #[test]
    fn same_square_gesture_is_a_marker_keyed_on_that_square() {
        let mut authoring = AnnotationAuthor::default();
        let annotation = author(&mut authoring, &["e5"], Color32::GREEN).expect("annotation");
        assert_eq!(annotation.mark, Mark::Circle(sq("e5")));
        assert_eq!(annotation.mark.key(), AnnotationKey::Square(sq("e5")));
        assert!((annotation.stroke_width - 50.0 / 7.0).abs() < f32::EPSILON);
        assert!(!authoring.is_drawing());
    }

    #[test]
    fn returning_to_start_square_reverts_to_marker() {
        let mut authoring = AnnotationAuthor::new(MarkerShape::Cross);
        let annotation =
            author(&mut authoring, &["e5", "e6", "e7", "e5"], Color32::GREEN).expect("annotation");
        assert_eq!(annotation.mark, Mark::Cross(sq("e5")));
    }

    #[test]
    fn leaving_start_square_turns_into_arrow() {
        let mut authoring = AnnotationAuthor::default();
        authoring.begin(sq("e2"), Color32::GREEN, MOUSE);
        assert!(authoring.track(Some(sq("e3")), MOUSE));
        assert!(authoring.track(Some(sq("e4")), MOUSE));
        assert!(!authoring.track(Some(sq("e4")), MOUSE));
        assert!(!authoring.track(Some(sq("a1")), PointerId(3)));

        let preview = authoring.preview(50.0).expect("preview");
        assert_eq!(
            preview.mark,
            Mark::Arrow {
                from: sq("e2"),
                to: sq("e4")
            }
        );
        assert!((preview.stroke_width - 50.0 / 14.0).abs() < f32::EPSILON);

        let committed = authoring
            .finish(Some(sq("e4")), MOUSE, 50.0)
            .expect("annotation");
        assert_eq!(committed.mark.key(), AnnotationKey::Arrow(sq("e2"), sq("e4")));
        assert!((committed.stroke_width - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn release_off_board_commits_nothing() {
        let mut authoring = AnnotationAuthor::default();
        authoring.begin(sq("e2"), Color32::GREEN, MOUSE);
        assert_eq!(authoring.finish(None, MOUSE, 50.0), None);
        assert!(!authoring.is_drawing());
    }

    #[test]
    fn identical_arrow_toggles_off() {
        let mut store = AnnotationStore::new();
        let arrow = Mark::Arrow {
            from: sq("g1"),
            to: sq("f3"),
        };
        assert_eq!(store.toggle(arrow, Color32::GREEN, 50.0), CommitOutcome::Added);
        assert_eq!(store.len(), 1);
        assert_eq!(store.toggle(arrow, Color32::GREEN, 50.0), CommitOutcome::Removed);
        assert!(store.is_empty());
    }

    #[test]
    fn same_key_with_other_color_replaces_in_place() {
        let mut store = AnnotationStore::new();
        store.toggle(Mark::Circle(sq("a1")), Color32::GREEN, 50.0);
        store.toggle(Mark::Circle(sq("e5")), Color32::GREEN, 50.0);
        store.toggle(Mark::Circle(sq("h8")), Color32::GREEN, 50.0);

        assert_eq!(
            store.toggle(Mark::Rectangle(sq("e5")), Color32::RED, 50.0),
            CommitOutcome::Replaced
        );
        let marks: Vec<Mark> = store.iter().map(|item| item.mark).collect();
        assert_eq!(
            marks,
            vec![
                Mark::Circle(sq("a1")),
                Mark::Rectangle(sq("e5")),
                Mark::Circle(sq("h8"))
            ]
        );
    }

    #[test]
    fn arrows_with_distinct_endpoints_coexist() {
        let mut store = AnnotationStore::new();
        store.toggle(
            Mark::Arrow {
                from: sq("e2"),
                to: sq("e4"),
            },
            Color32::GREEN,
            50.0,
        );
        store.toggle(
            Mark::Arrow {
                from: sq("e4"),
                to: sq("e2"),
            },
            Color32::GREEN,
            50.0,
        );
        store.toggle(Mark::Circle(sq("e2")), Color32::GREEN, 50.0);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn modifier_precedence_is_alt_shift_ctrl() {
        let colors = colors();
        let all = Modifiers {
            alt: true,
            shift: true,
            ctrl: true,
        };
        assert_eq!(colors.for_modifiers(all), Color32::YELLOW);
        assert_eq!(
            colors.for_modifiers(Modifiers {
                alt: false,
                ..all
            }),
            Color32::BLUE
        );
        assert_eq!(
            colors.for_modifiers(Modifiers {
                ctrl: true,
                ..Modifiers::default()
            }),
            Color32::RED
        );
        assert_eq!(colors.for_modifiers(Modifiers::default()), Color32::GREEN);
    }

    #[test]
    fn clear_bumps_revision_only_when_something_was_removed() {
        let mut store = AnnotationStore::new();
        assert!(!store.clear());
        assert_eq!(store.revision(), 0);
        store.toggle(Mark::Cross(sq("d4")), Color32::RED, 50.0);
        assert!(store.clear());
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn rescale_round_trip_restores_stroke_width() {
        let mut store = AnnotationStore::new();
        store.toggle(Mark::Circle(sq("d4")), Color32::RED, 50.0);
        store.rescale(80.0 / 50.0);
        store.rescale(50.0 / 80.0);
        let width = store.iter().next().unwrap().stroke_width;
        assert!((width - 50.0 / 7.0).abs() < 1e-4);
    }

    #[test]
    fn restroke_sizes_marks_from_their_shape() {
        let mut store = AnnotationStore::new();
        store.toggle(Mark::Circle(sq("e4")), Color32::RED, 0.0);
        store.toggle(
            Mark::Arrow {
                from: sq("e2"),
                to: sq("e4"),
            },
            Color32::RED,
            0.0,
        );
        store.restroke(70.0);
        let widths: Vec<f32> = store.iter().map(|item| item.stroke_width).collect();
        assert_eq!(widths, vec![10.0, 14.0]);
    }
}
