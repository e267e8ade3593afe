//! Collision engine
//!
//! Holds one descriptor map per collider kind plus the named handler table.
//! A physics update runs a fixed number of detection passes. Each pass
//! resolves every enabled collider into world space, tests all pairs,
//! accumulates corrections per entity and applies their average once the
//! pair loop is done. Handlers run after the last pass.

use super::collider::{CircleColliderData, LineColliderData, PolygonColliderData, Resolved};
use super::geometry::{self, Circle, Segment};
use crate::config::PhysicsConfig;
use crate::ecs::components::{ColliderComponent, TransformComponent};
use crate::ecs::{ComponentHandle, ComponentStore, EcsError, EcsResult, Entity, World};
use crate::foundation::math::Vec2;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::rc::Rc;

/// Content-code callback: `(world, me, partner)`
pub type CollisionHandler = Rc<dyn Fn(&mut World, Entity, Entity) -> EcsResult<()>>;

/// Entity -> every entity it touched
pub type CollisionEvents = BTreeMap<Entity, BTreeSet<Entity>>;

/// What one detection pass found and did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassReport {
    /// Symmetric contact map
    pub events: CollisionEvents,
    /// Averaged correction applied to each entity's position
    pub corrections: BTreeMap<Entity, Vec2>,
}

impl PassReport {
    /// Whether `a` and `b` touched in this pass
    pub fn collided(&self, a: Entity, b: Entity) -> bool {
        self.events.get(&a).is_some_and(|partners| partners.contains(&b))
    }

    /// Number of distinct colliding pairs
    pub fn pair_count(&self) -> usize {
        self.events.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    fn record(&mut self, a: Entity, b: Entity) {
        self.events.entry(a).or_default().insert(b);
        self.events.entry(b).or_default().insert(a);
    }
}

/// Outcome of a full physics update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicsReport {
    /// One report per pass, in order
    pub passes: Vec<PassReport>,
    /// Handler invocations made during dispatch
    pub handler_calls: usize,
}

impl PhysicsReport {
    /// Whether `a` and `b` touched in any pass
    pub fn collided(&self, a: Entity, b: Entity) -> bool {
        self.passes.iter().any(|pass| pass.collided(a, b))
    }
}

#[derive(Default)]
struct CorrectionAccumulator {
    entries: BTreeMap<Entity, (ComponentHandle<TransformComponent>, Vec2, u32)>,
}

impl CorrectionAccumulator {
    fn push(&mut self, entity: Entity, transform: ComponentHandle<TransformComponent>, correction: Vec2) {
        let entry = self
            .entries
            .entry(entity)
            .or_insert((transform, Vec2::zeros(), 0));
        entry.1 += correction;
        entry.2 += 1;
    }

    fn apply(self, store: &mut ComponentStore) -> EcsResult<BTreeMap<Entity, Vec2>> {
        let mut applied = BTreeMap::new();
        for (entity, (handle, sum, count)) in self.entries {
            #[allow(clippy::cast_precision_loss)]
            let average = sum / count as f32;
            store.resolve_mut(handle)?.translate(average);
            applied.insert(entity, average);
        }
        Ok(applied)
    }
}

/// Collider registry and pairwise solver
pub struct CollisionEngine {
    config: PhysicsConfig,
    circles: BTreeMap<Entity, CircleColliderData>,
    lines: BTreeMap<Entity, LineColliderData>,
    polygons: BTreeMap<Entity, PolygonColliderData>,
    handlers: HashMap<String, CollisionHandler>,
}

impl fmt::Debug for CollisionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionEngine")
            .field("config", &self.config)
            .field("circles", &self.circles.len())
            .field("lines", &self.lines.len())
            .field("polygons", &self.polygons.len())
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CollisionEngine {
    /// Create an empty engine
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config,
            circles: BTreeMap::new(),
            lines: BTreeMap::new(),
            polygons: BTreeMap::new(),
            handlers: HashMap::new(),
        }
    }

    /// Current physics settings
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Replace the physics settings
    pub fn set_config(&mut self, config: PhysicsConfig) {
        self.config = config;
    }

    // ----------------------------------------------------------------------
    // Handlers
    // ----------------------------------------------------------------------

    /// Register (or replace) a named handler
    pub fn register_handler(&mut self, name: impl Into<String>, handler: CollisionHandler) {
        let name = name.into();
        log::debug!("Registered collision handler '{}'", name);
        self.handlers.insert(name, handler);
    }

    /// Whether a handler is registered under `name`
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    // ----------------------------------------------------------------------
    // Descriptor maps
    // ----------------------------------------------------------------------

    /// Register a circle collider
    pub fn load_circle_collider_data(&mut self, data: CircleColliderData) {
        self.circles.insert(data.handles.entity, data);
    }

    /// Register a line collider
    pub fn load_line_collider_data(&mut self, data: LineColliderData) {
        self.lines.insert(data.handles.entity, data);
    }

    /// Register a polygon collider
    pub fn load_polygon_collider_data(&mut self, data: PolygonColliderData) {
        self.polygons.insert(data.handles.entity, data);
    }

    /// Forget `entity`'s circle collider
    pub fn remove_circle_collider_data(&mut self, entity: Entity) -> Option<CircleColliderData> {
        self.circles.remove(&entity)
    }

    /// Forget `entity`'s line collider
    pub fn remove_line_collider_data(&mut self, entity: Entity) -> Option<LineColliderData> {
        self.lines.remove(&entity)
    }

    /// Forget `entity`'s polygon collider
    pub fn remove_polygon_collider_data(&mut self, entity: Entity) -> Option<PolygonColliderData> {
        self.polygons.remove(&entity)
    }

    /// Registered circle colliders in entity order
    pub fn circle_colliders(&self) -> impl Iterator<Item = &CircleColliderData> {
        self.circles.values()
    }

    /// Registered line colliders in entity order
    pub fn line_colliders(&self) -> impl Iterator<Item = &LineColliderData> {
        self.lines.values()
    }

    /// Registered polygon colliders in entity order
    pub fn polygon_colliders(&self) -> impl Iterator<Item = &PolygonColliderData> {
        self.polygons.values()
    }

    /// Total registered colliders of every kind
    pub fn collider_count(&self) -> usize {
        self.circles.len() + self.lines.len() + self.polygons.len()
    }

    // ----------------------------------------------------------------------
    // Detection
    // ----------------------------------------------------------------------

    /// Run one detection + correction pass against `store`
    pub fn detection_pass(&self, store: &mut ComponentStore) -> EcsResult<PassReport> {
        let circles = resolve_all(self.circles.values(), |data| data.resolve(store))?;
        let lines = resolve_all(self.lines.values(), |data| data.resolve(store))?;
        let polygons = resolve_all(self.polygons.values(), |data| data.resolve(store))?;

        let mut report = PassReport::default();
        let mut corrections = CorrectionAccumulator::default();

        for (i, a) in circles.iter().enumerate() {
            for b in &circles[i + 1..] {
                circle_circle(a, b, &mut report, &mut corrections);
            }
        }

        for circle in &circles {
            for line in &lines {
                if circle.entity == line.entity {
                    continue;
                }
                if geometry::circle_segment_intersect(&circle.shape, &line.shape) {
                    report.record(circle.entity, line.entity);
                    if line.sends() && circle.receives() {
                        let correction =
                            geometry::circle_segment_correction(&circle.shape, &line.shape);
                        corrections.push(circle.entity, circle.transform, correction);
                    }
                }
            }

            for polygon in &polygons {
                if circle.entity == polygon.entity {
                    continue;
                }
                circle_polygon(circle, polygon, &mut report, &mut corrections);
            }
        }

        for (i, a) in lines.iter().enumerate() {
            for b in &lines[i + 1..] {
                if a.entity != b.entity && geometry::segments_intersect(&a.shape, &b.shape) {
                    report.record(a.entity, b.entity);
                }
            }
        }

        report.corrections = corrections.apply(store)?;
        log::trace!(
            "Detection pass: {} pairs, {} corrections",
            report.pair_count(),
            report.corrections.len()
        );
        Ok(report)
    }

    /// Work out which handler runs for which contact, in call order
    ///
    /// Every entity with a handler is called once per partner per pass, or
    /// once per partner overall with `dedupe_handler_calls`.
    pub(crate) fn plan_dispatch(
        &self,
        store: &ComponentStore,
        passes: &[PassReport],
    ) -> EcsResult<Vec<(CollisionHandler, Entity, Entity)>> {
        let merged;
        let event_sets: Vec<&CollisionEvents> = if self.config.dedupe_handler_calls {
            let mut union = CollisionEvents::new();
            for pass in passes {
                for (entity, partners) in &pass.events {
                    union.entry(*entity).or_default().extend(partners);
                }
            }
            merged = union;
            vec![&merged]
        } else {
            passes.iter().map(|pass| &pass.events).collect()
        };

        let mut calls = Vec::new();
        for events in event_sets {
            for (&me, partners) in events {
                let Some(handler) = self.handler_of(store, me)? else {
                    continue;
                };
                calls.extend(partners.iter().map(|&partner| (Rc::clone(&handler), me, partner)));
            }
        }
        Ok(calls)
    }

    fn handler_of(&self, store: &ComponentStore, entity: Entity) -> EcsResult<Option<CollisionHandler>> {
        let collider = store.get::<ColliderComponent>(entity)?;
        if !collider.enabled {
            return Ok(None);
        }
        match &collider.handler {
            None => Ok(None),
            Some(name) => self
                .handlers
                .get(name)
                .cloned()
                .map(Some)
                .ok_or_else(|| EcsError::UnknownCollisionHandler {
                    entity,
                    name: name.clone(),
                }),
        }
    }
}

fn resolve_all<'a, D: 'a, S>(
    descriptors: impl Iterator<Item = &'a D>,
    mut resolve: impl FnMut(&'a D) -> EcsResult<Option<Resolved<S>>>,
) -> EcsResult<Vec<Resolved<S>>> {
    let mut resolved = Vec::new();
    for data in descriptors {
        if let Some(collider) = resolve(data)? {
            resolved.push(collider);
        }
    }
    Ok(resolved)
}

fn circle_circle(
    a: &Resolved<Circle>,
    b: &Resolved<Circle>,
    report: &mut PassReport,
    corrections: &mut CorrectionAccumulator,
) {
    if a.entity == b.entity || !geometry::circles_overlap(&a.shape, &b.shape) {
        return;
    }
    report.record(a.entity, b.entity);

    let axis = geometry::separation_axis(a.shape.center, b.shape.center);
    let correction = axis * geometry::circle_penetration(&a.shape, &b.shape);
    let a_moves = a.receives() && b.sends();
    let b_moves = b.receives() && a.sends();
    match (a_moves, b_moves) {
        (true, true) => {
            corrections.push(a.entity, a.transform, -correction * 0.5);
            corrections.push(b.entity, b.transform, correction * 0.5);
        }
        (true, false) => corrections.push(a.entity, a.transform, -correction),
        (false, true) => corrections.push(b.entity, b.transform, correction),
        (false, false) => {}
    }
}

fn circle_polygon(
    circle: &Resolved<Circle>,
    polygon: &Resolved<Vec<Segment>>,
    report: &mut PassReport,
    corrections: &mut CorrectionAccumulator,
) {
    let correct = polygon.sends() && circle.receives();
    let mut hit = false;
    for edge in &polygon.shape {
        if geometry::circle_segment_intersect(&circle.shape, edge) {
            hit = true;
            if correct {
                let correction = geometry::circle_segment_correction(&circle.shape, edge);
                corrections.push(circle.entity, circle.transform, correction);
            }
        }
    }
    if hit {
        report.record(circle.entity, polygon.entity);
    }
}
