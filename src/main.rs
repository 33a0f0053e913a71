//! Rewind Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use rewind_runner::consts::*;
    use rewind_runner::platform::{InputState, KeyAction};
    use rewind_runner::renderer::{CanvasSurface, render};
    use rewind_runner::sim::{GameEvent, GameState, tick};
    use rewind_runner::{HighScore, Settings};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        settings: Settings,
        input: InputState,
        canvas: HtmlCanvasElement,
        surface: CanvasSurface,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        fn new(seed: u64, canvas: HtmlCanvasElement, surface: CanvasSurface) -> Self {
            let settings = Settings::load();
            let mut state = GameState::new(
                seed,
                canvas.client_width() as f32,
                canvas.client_height() as f32,
            )
            .with_high_score(HighScore::load());
            settings.apply_to(&mut state);

            let mut game = Self {
                state,
                settings,
                input: InputState::new(),
                canvas,
                surface,
                accumulator: 0.0,
                last_time: 0.0,
            };
            game.resize();
            game
        }

        /// Match the backing store to the CSS size and device pixel ratio
        fn resize(&mut self) {
            let dpr = web_sys::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
            let css_w = self.canvas.client_width().max(1);
            let css_h = self.canvas.client_height().max(1);
            self.canvas.set_width((css_w as f64 * dpr) as u32);
            self.canvas.set_height((css_h as f64 * dpr) as u32);
            self.surface.set_pixel_ratio(dpr);
            self.state.resize(css_w as f32, css_h as f32);
            log::debug!("Viewport {}x{} @{}x", css_w, css_h, dpr);
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_FRAME_DT);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.to_tick_input();
                tick(&mut self.state, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.clear_one_shots();
            }
            if substeps == MAX_SUBSTEPS {
                self.accumulator = 0.0;
            }

            for event in self.state.drain_events() {
                self.handle_event(event);
            }
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::GameOver {
                    new_high_score: true,
                    ..
                } => self.state.high_score.save(),
                GameEvent::OpenDonationLink => open_donation_link(),
                other => log::trace!("{:?}", other),
            }
        }

        fn render(&mut self) {
            self.surface.begin_frame();
            render(&self.state, &mut self.surface, &self.settings);
        }

        fn on_key_down(&mut self, key: &str, repeat: bool) -> bool {
            match self.input.key_down(key, repeat) {
                Some(KeyAction::CycleQuality) => {
                    let next = self.settings.quality.cycle();
                    self.settings.apply_preset(next);
                    self.settings.apply_to(&mut self.state);
                    self.settings.save();
                    log::info!("Quality: {}", next.as_str());
                    true
                }
                Some(KeyAction::ToggleReducedMotion) => {
                    self.settings.reduced_motion = !self.settings.reduced_motion;
                    self.settings.save();
                    log::info!("Reduced motion: {}", self.settings.reduced_motion);
                    true
                }
                Some(_) => true,
                None => repeat && rewind_runner::platform::map_key(key).is_some(),
            }
        }

        /// Canvas-relative CSS position of a client coordinate
        fn canvas_pos(&self, client_x: i32, client_y: i32) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            Vec2::new(
                client_x as f32 - rect.left() as f32,
                client_y as f32 - rect.top() as f32,
            )
        }
    }

    fn open_donation_link() {
        let Some(window) = web_sys::window() else {
            return;
        };
        match window.open_with_url_and_target(DONATION_URL, "_blank") {
            Ok(_) => log::info!("Opened donation page"),
            Err(e) => log::warn!("Could not open donation page: {:?}", e),
        }
    }

    fn now_seconds() -> f64 {
        js_sys::Date::now() / 1000.0
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Rewind Runner starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let surface = CanvasSurface::new(&canvas)?;

        // Initialize game
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, canvas.clone(), surface)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&window, &canvas, game.clone())?;

        // Start game loop
        request_animation_frame(game);

        log::info!("Rewind Runner running!");
        Ok(())
    }

    fn setup_input_handlers(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Game>>,
    ) -> Result<(), JsValue> {
        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if game.borrow_mut().on_key_down(&event.key(), event.repeat()) {
                    event.prevent_default();
                }
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().input.key_up(&event.key());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch start: steer, tap and double-tap dash
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.changed_touches().get(0) {
                    let mut g = game.borrow_mut();
                    let pos = g.canvas_pos(touch.client_x(), touch.client_y());
                    g.input.touch_start(pos, now_seconds());
                }
            });
            canvas.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let mut g = game.borrow_mut();
                    let pos = g.canvas_pos(touch.client_x(), touch.client_y());
                    g.input.touch_move(pos);
                }
            });
            canvas.add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Touch end: keep following any finger still down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                match event.touches().get(0) {
                    Some(touch) => {
                        let pos = g.canvas_pos(touch.client_x(), touch.client_y());
                        g.input.touch_move(pos);
                    }
                    None => g.input.touch_end(),
                }
            });
            canvas.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref())?;
            canvas.add_event_listener_with_callback("touchcancel", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Mouse click
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                let pos = g.canvas_pos(event.client_x(), event.client_y());
                g.input.pointer_press(pos);
            });
            canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Resize
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Window blur: drop held keys so the arrow doesn't keep drifting
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().input.release_all();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window, game loop stopped");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod autopilot {
    //! Headless bot that plays a session without a browser

    use rewind_runner::consts::*;
    use rewind_runner::sim::{GamePhase, GameState, TickInput};

    /// Vertical gap beyond which the bot spends a dash
    const DASH_GAP: f32 = 150.0;

    /// Steer toward the incoming projectile closest to the player
    pub fn steer(state: &GameState) -> TickInput {
        match state.phase {
            GamePhase::Menu => TickInput {
                confirm: true,
                ..Default::default()
            },
            GamePhase::GameOver => TickInput::default(),
            GamePhase::Playing => {
                let player = state.player.pos;
                let target = state
                    .projectiles
                    .iter()
                    .filter(|p| !p.caught && p.pos.x >= player.x - CATCH_DIST)
                    .min_by(|a, b| a.pos.x.total_cmp(&b.pos.x));

                match target {
                    Some(p) => {
                        let gap = p.pos.y - player.y;
                        let dash = gap.abs() > DASH_GAP && state.player.dash_readiness() >= 1.0;
                        TickInput {
                            up: gap < 0.0,
                            down: gap > 0.0,
                            touch_target: Some(p.pos.y),
                            dash,
                            ..Default::default()
                        }
                    }
                    None => TickInput {
                        touch_target: Some(state.height / 2.0),
                        ..Default::default()
                    },
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use glam::Vec2;
        use rewind_runner::sim::Projectile;

        #[test]
        fn test_starts_from_menu() {
            let state = GameState::new(1, 800.0, 600.0);
            assert!(steer(&state).confirm);
        }

        #[test]
        fn test_targets_nearest_projectile_and_dashes_when_far() {
            let mut state = GameState::new(1, 800.0, 600.0);
            state.phase = GamePhase::Playing;
            state
                .projectiles
                .push(Projectile::new(Vec2::new(500.0, 100.0), 200.0));
            state
                .projectiles
                .push(Projectile::new(Vec2::new(200.0, 500.0), 200.0));

            let input = steer(&state);
            assert_eq!(input.touch_target, Some(500.0));
            assert!(input.dash);

            state.player.dash_cooldown = DASH_COOLDOWN;
            assert!(!steer(&state).dash);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use rewind_runner::consts::*;
    use rewind_runner::sim::{GameEvent, GamePhase, GameState, tick};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Rewind Runner (native) starting...");
    log::info!("Native mode runs a headless autopilot session - use `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0x5EED);
    let mut state = GameState::new(seed, 800.0, 600.0);

    // Two minutes of simulated play at most
    let max_ticks = (120.0 / SIM_DT) as u64;
    for _ in 0..max_ticks {
        let input = autopilot::steer(&state);
        tick(&mut state, &input, SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::Missed { lives_left } => log::info!("Missed, {} lives left", lives_left),
                GameEvent::FastForwardStarted => log::info!("Fast forward at score {}", state.score),
                GameEvent::EnemyRevived => log::debug!("Enemy revived"),
                other => log::debug!("{:?}", other),
            }
        }

        if state.phase == GamePhase::GameOver {
            break;
        }
    }

    log::info!(
        "Autopilot finished: score {}, max combo {}, lives {}, {:.1}s simulated",
        state.score,
        state.max_combo,
        state.lives,
        state.clock
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
