//! Rendering collaborator interface
//!
//! The simulation never draws. A host implements [`Renderer`] and hands it to
//! [`WorldPainter`], which picks animations from simulation state and falls
//! back to flat rectangles when an animation asset is missing.

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::{Enemy, EnemyId, GameState, Lifecycle};

/// Drawing surface supplied by the host
pub trait Renderer {
    fn has_animation(&self, name: &str) -> bool;
    fn draw_animation(&mut self, name: &str, x: f32, y: f32, w: f32, h: f32);
    /// Restart `name` from its first frame
    fn reset_animation(&mut self, name: &str);
    fn is_animation_finished(&self, name: &str) -> bool;
    fn draw_texture(&mut self, name: &str, x: f32, y: f32, w: f32, h: f32);
    fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32);
    fn set_color(&mut self, rgba: [f32; 4]);
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const HIT_FLASH: [f32; 4] = [1.0, 0.3, 0.3, 1.0];
const PLAYER_FALLBACK: [f32; 4] = [0.3, 0.6, 1.0, 1.0];
const GEM_COLOR: [f32; 4] = [0.3, 1.0, 0.5, 1.0];
const PROJECTILE_COLOR: [f32; 4] = [1.0, 0.9, 0.4, 1.0];

/// Fallback color from remaining health (green at full, red near zero)
fn health_color(fraction: f32, alpha: f32) -> [f32; 4] {
    let t = fraction.clamp(0.0, 1.0);
    [1.0 - 0.7 * t, 0.2 + 0.6 * t, 0.2, alpha]
}

fn enemy_animation(enemy: &Enemy) -> String {
    let state = match enemy.lifecycle() {
        Lifecycle::Alive if enemy.is_flashing() => "hit",
        Lifecycle::Alive => "walk",
        Lifecycle::Dying | Lifecycle::Removable => "death",
    };
    format!("{}_{}", enemy.kind.as_str(), state)
}

/// Draws a [`GameState`] through a [`Renderer`]
#[derive(Debug, Default)]
pub struct WorldPainter {
    /// Animation names already reported missing
    warned: HashSet<String>,
    /// Enemies whose death animation has been started
    dying: HashSet<EnemyId>,
}

impl WorldPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw one frame. `camera` is the world point at the screen origin.
    pub fn paint<R: Renderer>(&mut self, renderer: &mut R, state: &GameState, camera: Vec2) {
        for gem in &state.gems {
            let p = gem.pos - camera;
            renderer.set_color(GEM_COLOR);
            renderer.draw_texture("gem", p.x - 4.0, p.y - 4.0, 8.0, 8.0);
        }

        self.dying.retain(|id| state.swarm.get(*id).is_some());
        for enemy in state.swarm.iter() {
            self.paint_enemy(renderer, enemy, camera);
        }

        renderer.set_color(PROJECTILE_COLOR);
        for projectile in state.projectiles.iter().filter(|p| p.is_active()) {
            let p = projectile.pos - camera;
            let r = projectile.radius;
            renderer.draw_texture("projectile", p.x - r, p.y - r, r * 2.0, r * 2.0);
        }

        let player = &state.player;
        let p = player.pos - camera;
        let size = player.radius * 2.0;
        self.animation_or_rect(
            renderer,
            "player_walk",
            (p.x - player.radius, p.y - player.radius, size, size),
            PLAYER_FALLBACK,
        );
    }

    fn paint_enemy<R: Renderer>(&mut self, renderer: &mut R, enemy: &Enemy, camera: Vec2) {
        let name = enemy_animation(enemy);
        if !enemy.is_alive() && self.dying.insert(enemy.id) {
            renderer.reset_animation(&name);
        } else if !enemy.is_alive()
            && renderer.has_animation(&name)
            && renderer.is_animation_finished(&name)
        {
            return;
        }

        let p = enemy.pos - camera;
        let size = enemy.radius * 2.0;
        let rect = (p.x - enemy.radius, p.y - enemy.radius, size, size);
        let alpha = if enemy.is_alive() { 1.0 } else { 0.5 };
        let fallback = health_color(enemy.health() / enemy.max_health(), alpha);

        renderer.set_color(if enemy.is_flashing() { HIT_FLASH } else { WHITE });
        self.animation_or_rect(renderer, &name, rect, fallback);
    }

    fn animation_or_rect<R: Renderer>(
        &mut self,
        renderer: &mut R,
        name: &str,
        (x, y, w, h): (f32, f32, f32, f32),
        fallback: [f32; 4],
    ) {
        if renderer.has_animation(name) {
            renderer.draw_animation(name, x, y, w, h);
            return;
        }
        if self.warned.insert(name.to_string()) {
            log::warn!("missing animation '{name}', drawing a placeholder");
        }
        renderer.set_color(fallback);
        renderer.draw_rect(x, y, w, h);
    }
}
