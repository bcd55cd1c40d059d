//! Chart configuration: per-chart defaults, JSON overrides and validation.
//!
//! Every option is optional in the file; omitted options keep the defaults of
//! the chart they apply to. Validation runs before any layout work.

use eframe::egui::{Color32, Rect, pos2};
use serde::Deserialize;

use crate::charts::ChartKind;
use crate::error::{Error, Result};
use crate::palette::parse_palette;
use crate::physics::{LinkStyle, SimulationSettings};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Margins {
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartConfig {
    /// `None` sizes the chart from its data (the heatmap's one column per
    /// year).
    pub width: Option<f32>,
    pub height: f32,
    pub margins: Margins,
    /// Replaces the chart's default colors when set.
    pub color_palette: Option<Vec<Color32>>,
    /// Replaces the value domain computed from the data.
    pub domain_override: Option<[f64; 2]>,
    pub padding_fraction: f64,
    pub simulation: SimulationSettings,
    pub legend_bucket_count: usize,
}

const DEFAULT_WIDTH: f32 = 875.0;

/// Upper bound on legend buckets. The built-in ramps still yield one
/// distinct color per bucket well past this.
pub const MAX_LEGEND_BUCKETS: usize = 64;

impl ChartConfig {
    pub fn defaults(kind: ChartKind) -> Self {
        let base = Self {
            width: Some(DEFAULT_WIDTH),
            height: 450.0,
            margins: Margins::new(40.0, 40.0, 40.0, 70.0),
            color_palette: None,
            domain_override: None,
            padding_fraction: 0.0,
            simulation: SimulationSettings::default(),
            legend_bucket_count: 7,
        };

        match kind {
            ChartKind::Bar | ChartKind::Scatter => base,
            ChartKind::Heatmap => Self {
                width: None,
                height: 550.0,
                margins: Margins::new(40.0, 40.0, 80.0, 70.0),
                legend_bucket_count: 11,
                ..base
            },
            ChartKind::Choropleth | ChartKind::Treemap(_) => Self {
                width: Some(975.0),
                height: 610.0,
                margins: Margins::ZERO,
                ..base
            },
            ChartKind::Network => Self {
                width: Some(928.0),
                height: 600.0,
                margins: Margins::ZERO,
                simulation: SimulationSettings {
                    charge_strength: -400.0,
                    link_shape: LinkStyle::Arc,
                    ..SimulationSettings::default()
                },
                ..base
            },
        }
    }

    /// Width for charts with a fixed size.
    pub fn width(&self) -> f32 {
        self.width.unwrap_or(DEFAULT_WIDTH)
    }

    /// The plotting area inside the margins.
    pub fn inner(&self, width: f32) -> Rect {
        Rect::from_min_max(
            pos2(self.margins.left, self.margins.top),
            pos2(width - self.margins.right, self.height - self.margins.bottom),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(width) = self.width
            && !(width.is_finite() && width > 0.0)
        {
            return Err(invalid("width", format!("{width} is not a positive size")));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(invalid("height", format!("{} is not a positive size", self.height)));
        }

        let Margins {
            top,
            right,
            bottom,
            left,
        } = self.margins;
        if [top, right, bottom, left]
            .iter()
            .any(|margin| !margin.is_finite() || *margin < 0.0)
        {
            return Err(invalid("margins", "margins must be non-negative".to_owned()));
        }
        if top + bottom >= self.height
            || self.width.is_some_and(|width| left + right >= width)
        {
            return Err(invalid(
                "margins",
                "margins leave no room for the plot".to_owned(),
            ));
        }

        if let Some(palette) = &self.color_palette
            && palette.is_empty()
        {
            return Err(invalid("colorPalette", "palette has no entries".to_owned()));
        }
        if let Some([low, high]) = self.domain_override
            && !(low.is_finite() && high.is_finite() && low != high)
        {
            return Err(invalid(
                "domainOverride",
                format!("[{low}, {high}] is not a usable domain"),
            ));
        }
        if !(0.0..1.0).contains(&self.padding_fraction) {
            return Err(invalid(
                "paddingFraction",
                format!("{} is outside [0, 1)", self.padding_fraction),
            ));
        }
        if !(1..=MAX_LEGEND_BUCKETS).contains(&self.legend_bucket_count) {
            return Err(invalid(
                "legendBucketCount",
                format!(
                    "{} is outside 1..={MAX_LEGEND_BUCKETS}",
                    self.legend_bucket_count
                ),
            ));
        }

        self.simulation.validate()
    }

    /// Applies file overrides on top of these values and validates the
    /// result.
    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if let Some(width) = overrides.width {
            self.width = Some(width);
        }
        if let Some(height) = overrides.height {
            self.height = height;
        }
        if let Some(margins) = overrides.margins {
            self.margins = margins;
        }
        if let Some(palette) = &overrides.color_palette {
            self.color_palette = Some(parse_palette(palette)?);
        }
        if overrides.domain_override.is_some() {
            self.domain_override = overrides.domain_override;
        }
        if let Some(padding) = overrides.padding_fraction {
            self.padding_fraction = padding;
        }
        if let Some(count) = overrides.legend_bucket_count {
            self.legend_bucket_count = count;
        }
        if let Some(simulation) = &overrides.simulation {
            simulation.apply(&mut self.simulation);
        }

        self.validate()?;
        Ok(self)
    }
}

fn invalid(option: &'static str, reason: String) -> Error {
    Error::InvalidConfig { option, reason }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigOverrides {
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub margins: Option<Margins>,
    pub color_palette: Option<Vec<String>>,
    pub domain_override: Option<[f64; 2]>,
    pub padding_fraction: Option<f64>,
    pub simulation: Option<SimulationOverrides>,
    pub legend_bucket_count: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SimulationOverrides {
    pub charge_strength: Option<f32>,
    pub link_distance: Option<f32>,
    pub decay_rate: Option<f32>,
    pub velocity_decay: Option<f32>,
    pub centering_strength: Option<f32>,
    pub collision_radius: Option<f32>,
    pub reheat_target: Option<f32>,
    pub alpha_min: Option<f32>,
}

impl SimulationOverrides {
    fn apply(&self, settings: &mut SimulationSettings) {
        let fields = [
            (self.charge_strength, &mut settings.charge_strength),
            (self.link_distance, &mut settings.link_distance),
            (self.decay_rate, &mut settings.alpha_decay),
            (self.velocity_decay, &mut settings.velocity_decay),
            (self.centering_strength, &mut settings.centering_strength),
            (self.reheat_target, &mut settings.reheat_target),
            (self.alpha_min, &mut settings.alpha_min),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if self.collision_radius.is_some() {
            settings.collision_radius = self.collision_radius;
        }
    }
}

/// Top-level config file: one optional section per chart. The treemap
/// section applies to all three treemap datasets.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    pub bar: ConfigOverrides,
    pub scatter: ConfigOverrides,
    pub heatmap: ConfigOverrides,
    pub choropleth: ConfigOverrides,
    pub treemap: ConfigOverrides,
    pub network: ConfigOverrides,
}

impl ConfigFile {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn overrides(&self, kind: ChartKind) -> &ConfigOverrides {
        match kind {
            ChartKind::Bar => &self.bar,
            ChartKind::Scatter => &self.scatter,
            ChartKind::Heatmap => &self.heatmap,
            ChartKind::Choropleth => &self.choropleth,
            ChartKind::Treemap(_) => &self.treemap,
            ChartKind::Network => &self.network,
        }
    }

    /// Defaults for `kind` with this file's overrides applied.
    pub fn resolve(&self, kind: ChartKind) -> Result<ChartConfig> {
        ChartConfig::defaults(kind).with_overrides(self.overrides(kind))
    }
}
