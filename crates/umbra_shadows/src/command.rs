//! Shadow Command Abstraction
//!
//! The shadow renderer never touches a graphics API. It records what it
//! wants done as [`ShadowCommand`]s and the host backend replays them in
//! order.
//!
//! # Command Types
//!
//! - Atlas management: acquire, alias, release
//! - Pass state: pancaking, view/projection, viewport, depth bias
//! - Draws: one shadow caster draw per tile
//! - Keywords: global shader keyword toggles

use serde::{Serialize, Deserialize};

use crate::atlas::AtlasKind;
use crate::host::ShadowSplit;
use crate::keywords::KeywordState;
use crate::matrix::Mat4;
use crate::tile::TileViewport;

/// A shadow pass command ready for backend submission
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ShadowCommand {
    /// Open a profiling sample
    BeginSample(String),

    /// Close the last profiling sample
    EndSample(String),

    /// Get a square depth texture, clear it and make it the render target
    AcquireAtlas {
        /// Atlas being acquired
        atlas: AtlasKind,
        /// Width and height in pixels
        size: u32,
    },

    /// Bind the directional atlas in place of the other atlas
    AliasOtherAtlasToDirectional,

    /// Clamp casters behind the near plane onto it
    SetShadowPancaking(bool),

    /// Set the view and projection for subsequent draws
    SetViewProjection {
        /// Light view matrix
        view: Mat4,
        /// Light projection matrix
        projection: Mat4,
    },

    /// Restrict rendering to one tile
    SetViewport(TileViewport),

    /// Set rasterizer depth bias
    SetDepthBias {
        /// Constant bias
        bias: f32,
        /// Slope-scaled bias
        slope_bias: f32,
    },

    /// Draw the shadow casters of a light for one split
    DrawShadows {
        /// Index into the host's visible light list
        visible_light_index: usize,
        /// Split the casters were culled with
        split: ShadowSplit,
    },

    /// Toggle a global shader keyword
    SetKeyword(KeywordState),

    /// Return an atlas to the host's texture pool
    ReleaseAtlas(AtlasKind),
}

impl ShadowCommand {
    /// Check if this command draws geometry
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawShadows { .. })
    }
}

/// Ordered list of shadow commands for one frame
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowCommandList {
    commands: Vec<ShadowCommand>,
}

impl ShadowCommandList {
    /// Create an empty command list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command
    pub fn push(&mut self, command: ShadowCommand) {
        self.commands.push(command);
    }

    /// Append keyword toggles
    pub fn set_keywords(&mut self, states: impl IntoIterator<Item = KeywordState>) {
        self.commands.extend(states.into_iter().map(ShadowCommand::SetKeyword));
    }

    /// Commands in submission order
    pub fn iter(&self) -> impl Iterator<Item = &ShadowCommand> {
        self.commands.iter()
    }

    /// Number of commands
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Remove all commands
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of shadow caster draws
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }

    /// Viewports in the order they were set
    pub fn viewports(&self) -> Vec<TileViewport> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                ShadowCommand::SetViewport(viewport) => Some(*viewport),
                _ => None,
            })
            .collect()
    }

    /// Final state of a keyword, `None` if never set
    pub fn keyword(&self, keyword: &str) -> Option<bool> {
        self.commands.iter().rev().find_map(|c| match c {
            ShadowCommand::SetKeyword(state) if state.keyword == keyword => Some(state.enabled),
            _ => None,
        })
    }

    /// Consume into the underlying vector
    pub fn into_vec(self) -> Vec<ShadowCommand> {
        self.commands
    }
}

impl<'a> IntoIterator for &'a ShadowCommandList {
    type Item = &'a ShadowCommand;
    type IntoIter = std::slice::Iter<'a, ShadowCommand>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
