use chrono::NaiveDate;
use clap::{Args, Subcommand};
use sky_core::{FilterPredicate, RenderMode};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Fetch records for a filter and draw them as clusters or a heat map.
    Map(MapArgs),
    /// List regions with their record counts.
    Regions,
    /// Show the AI research report for one record.
    Research(ResearchArgs),
    /// Research service availability.
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct MapArgs {
    /// Shape tag, e.g. disk, light, triangle.
    #[arg(long)]
    pub shape: Option<String>,
    /// Region (state) code, e.g. NM.
    #[arg(long)]
    pub region: Option<String>,
    /// City substring.
    #[arg(long)]
    pub city: Option<String>,
    /// Provenance source tag.
    #[arg(long)]
    pub source: Option<String>,
    /// Earliest date, YYYY-MM-DD.
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Latest date, YYYY-MM-DD.
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Page size sent upstream (defaults to map.default_page_size).
    #[arg(long)]
    pub limit: Option<u32>,
    /// Presentation: markers or heat.
    #[arg(long, default_value = "markers")]
    pub mode: RenderMode,
    /// Fixed zoom level instead of fitting to the records.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=18))]
    pub zoom: Option<u8>,
    /// Heat raster width in columns.
    #[arg(long, default_value_t = 72)]
    pub width: usize,
    /// Heat raster height in rows.
    #[arg(long, default_value_t = 24)]
    pub height: usize,
}

impl MapArgs {
    /// The predicate these flags describe. Page size is left unset when
    /// `--limit` is absent so the configured default applies.
    #[must_use]
    pub fn predicate(&self) -> FilterPredicate {
        let mut predicate = FilterPredicate::match_all().with_dates(self.from, self.to);
        if let Some(shape) = &self.shape {
            predicate = predicate.with_shape(shape.as_str());
        }
        if let Some(region) = &self.region {
            predicate = predicate.with_region(region.as_str());
        }
        if let Some(city) = &self.city {
            predicate = predicate.with_city(city.as_str());
        }
        if let Some(source) = &self.source {
            predicate = predicate.with_source(source.as_str());
        }
        if let Some(limit) = self.limit {
            predicate = predicate.with_page_size(limit);
        }
        predicate
    }
}

#[derive(Clone, Debug, Args)]
pub struct ResearchArgs {
    /// Record id.
    pub id: String,
    /// Follow the quick report with the full, cited report.
    #[arg(long)]
    pub full: bool,
}
