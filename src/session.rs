//! =============================================================================
//! SESSION.RS - Machine à états du color picker
//! SESSION.RS - Color picker state machine
//! =============================================================================
//!
//! # Flux d'exécution / Execution flow
//! 1. `PixelMagnifier::activate` capture la surface et envoie `Down`
//!    `PixelMagnifier::activate` captures the surface and sends `Down`
//! 2. Chaque `Move` recalcule le point focal et rééchantillonne la grille
//!    Every `Move` recomputes the focal point and resamples the grid
//! 3. `Up` appelle le callback avec la couleur centrale, `Cancel` non
//!    `Up` calls the callback with the center color, `Cancel` does not
//! 4. La fin de la transition de disparition libère tout
//!    The end of the dismiss transition releases everything
//!
//! ```text
//! Inactive --Down--> Appearing --tick--> Active
//!                        |                 |
//!                        +---Up/Cancel-----+--> Dismissing --tick--> Inactive
//! ```

use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::capture::{capture, SurfaceProvider};
use crate::common::Color;
use crate::config::MagnifierConfig;
use crate::error::{CaptureError, ConfigError};
use crate::geometry::{ActiveRegion, Point};
use crate::grid::SampleGrid;
use crate::surface::PixelSurface;
use crate::view::{MagnifierView, TransitionKind};

/// Callback appelé avec la couleur sélectionnée
/// Callback called with the selected color
pub type ColorCallback = Box<dyn FnOnce(Color)>;

// =============================================================================
// ÉTATS ET ÉVÉNEMENTS
// STATES AND EVENTS
// =============================================================================

/// État du cycle de vie d'une session / Session lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickerState {
    Inactive,
    Appearing,
    Active,
    Dismissing,
}

impl PickerState {
    /// Les entrées pointeur sont acceptées / Pointer input is accepted
    pub fn accepts_input(self) -> bool {
        matches!(self, Self::Appearing | Self::Active)
    }
}

/// Événement pointeur discret / Discrete pointer event
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Appui, en coordonnées logiques de la surface / Press, in surface logical coordinates
    Down(Point),
    /// Translation depuis l'appui / Translation since the press
    Move(Point),
    Up,
    /// Geste annulé ou échoué / Gesture cancelled or failed
    Cancel,
}

// =============================================================================
// SESSION
// =============================================================================

/// Session de sélection : surface, grille, point focal et callback
/// Picking session: surface, grid, focal point and callback
pub struct PickerSession {
    state: PickerState,
    config: MagnifierConfig,
    surface: Option<PixelSurface>,
    region: ActiveRegion,
    anchor: Point,
    focal: Point,
    grid: Option<SampleGrid>,
    view: Option<MagnifierView>,
    on_selected: Option<ColorCallback>,
}

impl fmt::Debug for PickerSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerSession")
            .field("state", &self.state)
            .field("region", &self.region)
            .field("anchor", &self.anchor)
            .field("focal", &self.focal)
            .field("has_surface", &self.surface.is_some())
            .field("has_callback", &self.on_selected.is_some())
            .finish()
    }
}

impl PickerSession {
    /// Session inactive prête à recevoir `Down`
    /// Inactive session ready to receive `Down`
    pub fn new(
        config: MagnifierConfig,
        surface: PixelSurface,
        region: ActiveRegion,
        on_selected: ColorCallback,
    ) -> Self {
        Self {
            state: PickerState::Inactive,
            config,
            surface: Some(surface),
            region,
            anchor: Point::default(),
            focal: Point::default(),
            grid: None,
            view: None,
            on_selected: Some(on_selected),
        }
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn focal_point(&self) -> Point {
        self.focal
    }

    pub fn grid(&self) -> Option<&SampleGrid> {
        self.grid.as_ref()
    }

    pub fn view(&self) -> Option<&MagnifierView> {
        self.view.as_ref()
    }

    pub fn surface(&self) -> Option<&PixelSurface> {
        self.surface.as_ref()
    }

    /// Couleur de la cellule centrale / Center cell color
    pub fn selected_color(&self) -> Option<Color> {
        self.grid.as_ref().map(SampleGrid::selected)
    }

    /// Traite un événement pointeur ; les événements hors état sont ignorés
    /// Handles a pointer event; out-of-state events are ignored
    pub fn handle(&mut self, event: PointerEvent) -> PickerState {
        match (self.state, event) {
            (PickerState::Inactive, PointerEvent::Down(location)) => self.appear(location),
            (state, PointerEvent::Move(translation)) if state.accepts_input() => {
                self.move_focal(translation);
            }
            (state, PointerEvent::Up) if state.accepts_input() => self.complete(),
            (state, PointerEvent::Cancel) if state.accepts_input() => self.cancel(),
            (state, event) => {
                trace!(?state, ?event, "pointer event ignored");
            }
        }
        self.state
    }

    /// Avance les transitions cosmétiques / Advances the cosmetic transitions
    pub fn tick(&mut self, dt: Duration) -> PickerState {
        let finished = self.view.as_mut().and_then(|view| view.advance(dt));
        match (self.state, finished) {
            (PickerState::Appearing, Some(TransitionKind::Appear)) => {
                self.set_state(PickerState::Active);
            }
            (PickerState::Dismissing, Some(TransitionKind::Dismiss)) => self.release(),
            _ => {}
        }
        self.state
    }

    fn appear(&mut self, location: Point) {
        // Surface libérée : la session est terminée / Surface released: the session is over
        let Some(surface) = self.surface.as_ref() else {
            trace!("pointer down on a finished session ignored");
            return;
        };

        let scale = surface.scale_factor();
        self.anchor = location;
        self.focal = self.region.clamp_and_snap(location, scale);

        let size = self.config.grid_size();
        let mut grid = SampleGrid::new(size);
        grid.resample(surface, &self.region, self.focal);

        let mut view = MagnifierView::new(&self.config, size);
        view.apply_samples(&grid, self.focal);
        view.begin_appear();

        self.grid = Some(grid);
        self.view = Some(view);
        self.set_state(PickerState::Appearing);
    }

    fn move_focal(&mut self, translation: Point) {
        let (Some(surface), Some(grid), Some(view)) =
            (self.surface.as_ref(), self.grid.as_mut(), self.view.as_mut())
        else {
            return;
        };

        self.focal = self
            .region
            .clamp_and_snap(self.anchor.offset(translation), surface.scale_factor());
        grid.resample(surface, &self.region, self.focal);
        view.apply_samples(grid, self.focal);
    }

    fn complete(&mut self) {
        let color = self.selected_color().unwrap_or(Color::BLACK);
        if let Some(on_selected) = self.on_selected.take() {
            debug!(color = %color.hex(), "color selected");
            on_selected(color);
        }
        self.dismiss();
    }

    fn cancel(&mut self) {
        // Le callback n'est jamais appelé / The callback is never called
        self.on_selected = None;
        debug!("picker cancelled");
        self.dismiss();
    }

    fn dismiss(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.begin_dismiss();
        }
        self.set_state(PickerState::Dismissing);
    }

    fn release(&mut self) {
        self.surface = None;
        self.grid = None;
        self.view = None;
        self.on_selected = None;
        self.set_state(PickerState::Inactive);
    }

    fn set_state(&mut self, state: PickerState) {
        debug!(from = ?self.state, to = ?state, "picker state");
        self.state = state;
    }
}

// =============================================================================
// POIGNÉE DE SESSION
// SESSION HANDLE
// =============================================================================

/// Poignée détenue par l'hôte pour piloter une session
/// Handle owned by the host to drive one session
#[derive(Debug)]
pub struct SessionHandle {
    session: PickerSession,
}

impl SessionHandle {
    /// Mouvement du pointeur (translation depuis l'appui)
    /// Pointer move (translation since the press)
    pub fn update_focal(&mut self, translation: Point) {
        self.session.handle(PointerEvent::Move(translation));
    }

    /// Relâchement : appelle le callback une fois puis disparaît
    /// Pointer up: calls the callback once then dismisses
    pub fn complete(&mut self) {
        self.session.handle(PointerEvent::Up);
    }

    /// Annulation : disparaît sans appeler le callback
    /// Cancel: dismisses without calling the callback
    pub fn cancel(&mut self) {
        self.session.handle(PointerEvent::Cancel);
    }

    pub fn handle(&mut self, event: PointerEvent) -> PickerState {
        self.session.handle(event)
    }

    pub fn tick(&mut self, dt: Duration) -> PickerState {
        self.session.tick(dt)
    }

    pub fn state(&self) -> PickerState {
        self.session.state()
    }

    /// Session terminée et ressources libérées / Session over and resources released
    pub fn is_finished(&self) -> bool {
        self.session.state() == PickerState::Inactive && self.session.surface().is_none()
    }

    pub fn focal_point(&self) -> Point {
        self.session.focal_point()
    }

    pub fn grid(&self) -> Option<&SampleGrid> {
        self.session.grid()
    }

    pub fn view(&self) -> Option<&MagnifierView> {
        self.session.view()
    }

    pub fn selected_color(&self) -> Option<Color> {
        self.session.selected_color()
    }

    pub fn session(&self) -> &PickerSession {
        &self.session
    }
}

// =============================================================================
// LOUPE
// MAGNIFIER
// =============================================================================

/// Point d'entrée : crée des sessions de sélection
/// Entry point: creates picking sessions
#[derive(Clone, Debug, Default)]
pub struct PixelMagnifier {
    config: MagnifierConfig,
}

impl PixelMagnifier {
    pub fn new(config: MagnifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MagnifierConfig {
        &self.config
    }

    /// Capture la source et démarre une session à `location`
    /// Captures the source and starts a session at `location`
    ///
    /// `location` is the pointer-down position in the source's logical
    /// coordinates. On capture failure no session exists.
    pub fn activate<F>(
        &self,
        source: &dyn SurfaceProvider,
        region: ActiveRegion,
        location: Point,
        on_selected: F,
    ) -> Result<SessionHandle, CaptureError>
    where
        F: FnOnce(Color) + 'static,
    {
        let surface = capture(source)?;
        let mut session = PickerSession::new(
            self.config.clone(),
            surface,
            region,
            Box::new(on_selected),
        );
        session.handle(PointerEvent::Down(location));
        Ok(SessionHandle { session })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::geometry::Rect;
    use crate::surface::ChannelOrder;

    fn small_config() -> MagnifierConfig {
        MagnifierConfig {
            content_diameter: 60.0,
            ..MagnifierConfig::default()
        }
    }

    fn gradient() -> PixelSurface {
        let mut bytes = Vec::new();
        for y in 0..8u8 {
            for x in 0..8u8 {
                bytes.extend_from_slice(&[x * 10, y * 10, 0]);
            }
        }
        PixelSurface::packed(8, 8, ChannelOrder::Rgb, bytes).unwrap()
    }

    fn session(calls: Rc<RefCell<Vec<Color>>>) -> PickerSession {
        PickerSession::new(
            small_config(),
            gradient(),
            ActiveRegion::new(Rect::new(0.0, 0.0, 8.0, 8.0)),
            Box::new(move |color| calls.borrow_mut().push(color)),
        )
    }

    #[test]
    fn test_down_appears() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut s = session(calls);
        assert_eq!(s.handle(PointerEvent::Down(Point::new(2.0, 3.0))), PickerState::Appearing);
        assert_eq!(s.grid().unwrap().size(), 3);
        assert_eq!(s.selected_color().unwrap().to_rgb8(), (20, 30, 0));
    }

    #[test]
    fn test_move_accepted_while_appearing() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut s = session(calls);
        s.handle(PointerEvent::Down(Point::new(2.0, 3.0)));
        s.handle(PointerEvent::Move(Point::new(1.0, 1.0)));
        assert_eq!(s.state(), PickerState::Appearing);
        assert_eq!(s.focal_point(), Point::new(3.0, 4.0));
        assert_eq!(s.selected_color().unwrap().to_rgb8(), (30, 40, 0));
    }

    #[test]
    fn test_appear_completes_on_tick() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut s = session(calls);
        s.handle(PointerEvent::Down(Point::new(2.0, 3.0)));
        assert_eq!(s.tick(Duration::from_millis(100)), PickerState::Appearing);
        assert_eq!(s.tick(Duration::from_millis(200)), PickerState::Active);
    }

    #[test]
    fn test_up_calls_once_and_releases() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut s = session(Rc::clone(&calls));
        s.handle(PointerEvent::Down(Point::new(2.0, 3.0)));
        s.tick(Duration::from_secs(1));
        assert_eq!(s.handle(PointerEvent::Up), PickerState::Dismissing);
        assert_eq!(s.handle(PointerEvent::Up), PickerState::Dismissing);
        assert_eq!(calls.borrow().len(), 1);

        assert_eq!(s.tick(Duration::from_secs(1)), PickerState::Inactive);
        assert!(s.surface().is_none());
        assert!(s.grid().is_none());
        assert!(s.view().is_none());

        // Pas de nouvelle session sans nouvelle capture / No new session without a new capture
        assert_eq!(s.handle(PointerEvent::Down(Point::new(1.0, 1.0))), PickerState::Inactive);
        assert_eq!(calls.borrow().len(), 1);
    }

    #[test]
    fn test_move_ignored_when_dismissing() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut s = session(calls);
        s.handle(PointerEvent::Down(Point::new(2.0, 3.0)));
        s.handle(PointerEvent::Cancel);
        let before = s.grid().cloned();
        s.handle(PointerEvent::Move(Point::new(3.0, 3.0)));
        assert_eq!(s.grid().cloned(), before);
        assert_eq!(s.state(), PickerState::Dismissing);
    }

    #[test]
    fn test_events_before_down_ignored() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut s = session(Rc::clone(&calls));
        assert_eq!(s.handle(PointerEvent::Up), PickerState::Inactive);
        assert_eq!(s.handle(PointerEvent::Move(Point::new(1.0, 0.0))), PickerState::Inactive);
        assert!(calls.borrow().is_empty());
    }
}
