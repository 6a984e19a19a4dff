use crate::edge::{EdgeType, SenseType};
use crate::error::{Result, SweepError};
use crate::geometry::BoundaryShape;

/// How one-directional edges are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WallDirectionMode {
    /// Directional edges are see-through from the side they name.
    #[default]
    Normal,
    /// Directional edges are see-through from the opposite side.
    Reverse,
    /// Direction is ignored.
    Both,
}

/// Whether edges of one type take part in a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum EdgeInclusion {
    #[default]
    Never = 0,
    /// Included when the edge restricts the sweep's sense.
    Maybe = 1,
    /// Included unconditionally.
    Always = 2,
}

/// Inclusion mode per [`EdgeType`], fixed for one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeTypeModes {
    pub wall: EdgeInclusion,
    pub darkness: EdgeInclusion,
    pub inner_bounds: EdgeInclusion,
    pub outer_bounds: EdgeInclusion,
}

impl EdgeTypeModes {
    #[must_use]
    pub fn get(&self, edge_type: EdgeType) -> EdgeInclusion {
        match edge_type {
            EdgeType::Wall => self.wall,
            EdgeType::Darkness => self.darkness,
            EdgeType::InnerBounds => self.inner_bounds,
            EdgeType::OuterBounds => self.outer_bounds,
        }
    }
}

/// Parameters of one perception polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// The sense whose restrictions apply.
    pub sense: SenseType,
    /// Maximum reach, `None` for unlimited.
    pub radius: Option<f64>,
    /// Cone aperture in degrees. 360 sweeps the full circle.
    pub angle: f64,
    /// Cone direction in degrees, 0 due east, increasing clockwise on screen.
    pub rotation: f64,
    /// Size of the source itself, added to threshold distances.
    pub external_radius: f64,
    /// Extra shapes the polygon is constrained to.
    pub boundary_shapes: Vec<BoundaryShape>,
    /// Let proximity thresholds make edges transparent.
    pub use_threshold: bool,
    /// Bound the sweep by the inner scene rectangle rather than the canvas.
    pub use_inner_bounds: bool,
    pub include_darkness: bool,
    /// Ignore walls entirely; only scene bounds restrict.
    pub universal: bool,
    pub wall_direction_mode: WallDirectionMode,
    /// Vertex count override for the radius circle.
    pub density: Option<usize>,
    /// Darkness edges with a lower priority than this are ignored.
    pub priority: i32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sense: SenseType::Sight,
            radius: None,
            angle: 360.0,
            rotation: 0.0,
            external_radius: 0.0,
            boundary_shapes: Vec::new(),
            use_threshold: false,
            use_inner_bounds: false,
            include_darkness: false,
            universal: false,
            wall_direction_mode: WallDirectionMode::Normal,
            density: None,
            priority: 0,
        }
    }
}

impl SweepConfig {
    #[must_use]
    pub fn new(sense: SenseType) -> Self {
        Self {
            sense,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Restricts the sweep to a cone of `angle` degrees centred on
    /// `rotation`.
    #[must_use]
    pub fn with_cone(mut self, angle: f64, rotation: f64) -> Self {
        self.angle = angle;
        self.rotation = rotation;
        self
    }

    #[must_use]
    pub fn with_external_radius(mut self, external_radius: f64) -> Self {
        self.external_radius = external_radius;
        self
    }

    #[must_use]
    pub fn with_boundary_shape(mut self, shape: BoundaryShape) -> Self {
        self.boundary_shapes.push(shape);
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, use_threshold: bool) -> Self {
        self.use_threshold = use_threshold;
        self
    }

    #[must_use]
    pub fn with_inner_bounds(mut self, use_inner_bounds: bool) -> Self {
        self.use_inner_bounds = use_inner_bounds;
        self
    }

    #[must_use]
    pub fn with_darkness(mut self, include_darkness: bool) -> Self {
        self.include_darkness = include_darkness;
        self
    }

    #[must_use]
    pub fn with_universal(mut self, universal: bool) -> Self {
        self.universal = universal;
        self
    }

    #[must_use]
    pub fn with_wall_direction_mode(mut self, mode: WallDirectionMode) -> Self {
        self.wall_direction_mode = mode;
        self
    }

    #[must_use]
    pub fn with_density(mut self, density: usize) -> Self {
        self.density = Some(density);
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// `true` when a finite reach is configured.
    #[must_use]
    pub fn has_limited_radius(&self) -> bool {
        self.radius.is_some()
    }

    /// `true` when the sweep covers less than a full turn.
    #[must_use]
    pub fn has_limited_angle(&self) -> bool {
        self.angle < 360.0
    }

    /// Checks that the numeric parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::InvalidConfig` describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if let Some(r) = self.radius {
            if !r.is_finite() || r <= 0.0 {
                return Err(SweepError::InvalidConfig(format!("radius {r} must be positive")).into());
            }
        }
        if !self.angle.is_finite() || self.angle <= 0.0 {
            return Err(
                SweepError::InvalidConfig(format!("angle {} must be positive", self.angle)).into(),
            );
        }
        if !self.rotation.is_finite() {
            return Err(SweepError::InvalidConfig("rotation must be finite".into()).into());
        }
        if !self.external_radius.is_finite() || self.external_radius < 0.0 {
            return Err(SweepError::InvalidConfig(
                "external radius must be non-negative".into(),
            )
            .into());
        }
        Ok(())
    }

    /// The inclusion mode for each edge type under this configuration.
    #[must_use]
    pub fn edge_type_modes(&self, has_padding: bool) -> EdgeTypeModes {
        let mut modes = EdgeTypeModes::default();
        if !self.universal {
            modes.wall = EdgeInclusion::Maybe;
        }
        if self.include_darkness {
            modes.darkness = EdgeInclusion::Maybe;
        }
        if self.use_inner_bounds && has_padding {
            modes.inner_bounds = EdgeInclusion::Always;
        } else {
            modes.outer_bounds = EdgeInclusion::Always;
        }
        modes
    }
}
