#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Social Defence experience.

use social_defence_core::{Command, Viewport};
use social_defence_world::{query, World};

/// Produces data required to greet the player and open the session.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Builds the command batch that opens a session inside the given window.
    #[must_use]
    pub fn initial_commands(&self, container_width: f32) -> Vec<Command> {
        vec![Command::ConfigureViewport {
            viewport: Viewport::from_container_width(container_width),
        }]
    }
}
