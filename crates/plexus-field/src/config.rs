//! All the variables that can be configured for the particle field

use color_eyre::eyre::{bail, Result};
use palette::WithAlpha as _;

/// An RGBA colour.
pub type Colour = palette::Srgba;

/// Whether the density tier is picked once or on every resize.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DensityPolicy {
    /// The particle count is chosen once, from the viewport width at startup. Resizes only
    /// change the bounds.
    #[default]
    Fixed,
    /// The particle count is chosen again from the new viewport width on every resize.
    Responsive,
}

/// How the linker finds the pairs of particles that are close enough to be joined.
#[derive(serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum LinkStrategy {
    /// Test every pair. Fine for tens of particles.
    #[default]
    Pairwise,
    /// Bucket particles into a uniform grid and only test neighbouring buckets.
    Grid,
}

/// All the config for the particle field
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    /// Viewports narrower than this many pixels get the narrow particle count.
    pub breakpoint: f32,
    /// The number of particles for narrow viewports.
    pub narrow_particle_count: usize,
    /// The number of particles for wide viewports.
    pub wide_particle_count: usize,
    /// Particles closer than this are joined by a line.
    pub connection_distance: f32,
    /// Particles closer than this to the pointer are repelled by it and joined to it.
    pub interaction_radius: f32,
    /// The base speed of particles in pixels per tick.
    pub speed: f32,
    /// The smallest possible particle radius.
    pub min_radius: f32,
    /// The largest possible particle radius.
    pub max_radius: f32,
    /// Whether the density tier follows resizes.
    pub density_policy: DensityPolicy,
    /// How pairs of close particles are found.
    pub link_strategy: LinkStrategy,
    /// Colours and opacities
    pub appearance: Appearance,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            breakpoint: 768.0,
            narrow_particle_count: 40,
            wide_particle_count: 80,
            connection_distance: 150.0,
            interaction_radius: 150.0,
            speed: 0.5,
            min_radius: 1.0,
            max_radius: 3.0,
            density_policy: DensityPolicy::default(),
            link_strategy: LinkStrategy::default(),
            appearance: Appearance::default(),
        }
    }
}

impl Config {
    /// The density tier for the given viewport width.
    #[must_use]
    pub fn particle_count_for(&self, viewport_width: f32) -> usize {
        if viewport_width < self.breakpoint {
            self.narrow_particle_count
        } else {
            self.wide_particle_count
        }
    }

    /// Derive the immutable per-session field config from the viewport width.
    #[must_use]
    pub fn field_config(&self, viewport_width: f32) -> FieldConfig {
        FieldConfig {
            particle_count: self.particle_count_for(viewport_width),
            connection_distance: self.connection_distance,
            interaction_radius: self.interaction_radius,
            speed: self.speed,
            min_radius: self.min_radius,
            max_radius: self.max_radius,
        }
    }

    /// Reject values that would make the simulation misbehave.
    pub fn validate(&self) -> Result<()> {
        let non_negatives = [
            ("breakpoint", self.breakpoint),
            ("connection_distance", self.connection_distance),
            ("interaction_radius", self.interaction_radius),
            ("speed", self.speed),
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
        ];
        for (name, value) in non_negatives {
            if !value.is_finite() || value < 0.0 {
                bail!("`{name}` must be a non-negative number, got: {value}");
            }
        }

        if self.min_radius > self.max_radius {
            bail!(
                "`min_radius` ({}) can't be bigger than `max_radius` ({})",
                self.min_radius,
                self.max_radius
            );
        }

        self.appearance.validate()
    }
}

/// The config that the field actually runs with. It's derived once at startup and then doesn't
/// change for the rest of the session.
#[derive(bon::Builder, Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub struct FieldConfig {
    /// How many particles to seed the field with.
    #[builder(default = 80)]
    pub particle_count: usize,
    /// `D`: particles closer than this are linked.
    #[builder(default = 150.0)]
    pub connection_distance: f32,
    /// `R`: the pointer repels and links particles closer than this.
    #[builder(default = 150.0)]
    pub interaction_radius: f32,
    /// Base particle speed in pixels per tick.
    #[builder(default = 0.5)]
    pub speed: f32,
    /// Smallest particle radius.
    #[builder(default = 1.0)]
    pub min_radius: f32,
    /// Largest particle radius.
    #[builder(default = 3.0)]
    pub max_radius: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// How the field looks.
#[derive(serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
#[non_exhaustive]
pub struct Appearance {
    /// The RGB colour of particles and links.
    pub colour: (u8, u8, u8),
    /// Opacity of the particles themselves.
    pub particle_opacity: f32,
    /// Opacity of a link between two particles at zero distance.
    pub link_opacity: f32,
    /// Opacity of a link between a particle and the pointer at zero distance.
    pub pointer_link_opacity: f32,
    /// Width of the link lines.
    pub line_width: f32,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            colour: (56, 189, 248),
            particle_opacity: 0.5,
            link_opacity: 0.15,
            pointer_link_opacity: 0.2,
            line_width: 1.0,
        }
    }
}

impl Appearance {
    /// The base colour with the given opacity.
    #[must_use]
    pub fn colour_with_opacity(&self, opacity: f32) -> Colour {
        palette::Srgb::new(self.colour.0, self.colour.1, self.colour.2)
            .into_format::<f32>()
            .with_alpha(opacity)
    }

    /// The fill colour of a particle.
    #[must_use]
    pub fn particle_colour(&self) -> Colour {
        self.colour_with_opacity(self.particle_opacity)
    }

    /// Opacities must be between 0 and 1.
    fn validate(&self) -> Result<()> {
        let opacities = [
            ("particle_opacity", self.particle_opacity),
            ("link_opacity", self.link_opacity),
            ("pointer_link_opacity", self.pointer_link_opacity),
        ];
        for (name, value) in opacities {
            if !(0.0..=1.0).contains(&value) {
                bail!("`{name}` must be between 0.0 and 1.0, got: {value}");
            }
        }

        if !self.line_width.is_finite() || self.line_width <= 0.0 {
            bail!("`line_width` must be positive, got: {}", self.line_width);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn narrow_viewports_get_half_the_particles() {
        let config = Config::default();
        assert_eq!(config.particle_count_for(500.0), 40);
        assert_eq!(config.particle_count_for(767.9), 40);
        assert_eq!(config.particle_count_for(768.0), 80);
        assert_eq!(config.particle_count_for(1024.0), 80);
    }

    #[test]
    fn field_config_carries_the_tunables() {
        let config = Config::default();
        let field_config = config.field_config(1024.0);
        assert_eq!(field_config, FieldConfig::default());
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
                wide_particle_count = 120
                link_strategy = "grid"

                [appearance]
                pointer_link_opacity = 0.4
            "#,
        )
        .unwrap();

        assert_eq!(config.wide_particle_count, 120);
        assert_eq!(config.narrow_particle_count, 40);
        assert_eq!(config.link_strategy, LinkStrategy::Grid);
        assert_eq!(config.density_policy, DensityPolicy::Fixed);
        assert!((config.appearance.pointer_link_opacity - 0.4).abs() < f32::EPSILON);
        assert!((config.appearance.link_opacity - 0.15).abs() < f32::EPSILON);
    }

    #[test]
    fn inverted_radius_range_is_rejected() {
        let config = Config {
            min_radius: 4.0,
            max_radius: 2.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_opacity_is_rejected() {
        let mut config = Config::default();
        config.appearance.link_opacity = 1.5;
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn particle_colour_is_translucent_cyan() {
        let colour = Appearance::default().particle_colour();
        assert!((colour.red - 56.0 / 255.0).abs() < 0.001);
        assert!((colour.green - 189.0 / 255.0).abs() < 0.001);
        assert!((colour.blue - 248.0 / 255.0).abs() < 0.001);
        assert!((colour.alpha - 0.5).abs() < f32::EPSILON);
    }
}
